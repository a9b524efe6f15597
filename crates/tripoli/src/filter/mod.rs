// Composition filter enforcing backoff memory and grammar reachability.

pub mod state;

use std::sync::Arc;

use tracing::trace;
use tripoli_core::{NO_STATE_ID, RuleId, RuleKind, StateId};
use tripoli_fst::compose::{ComposeFilter, FilterOutcome};
use tripoli_fst::{Arc as LatticeArc, Automaton, RuleArc};

use self::state::FilterState;
use crate::pdt_info::{PdtInfo, RuleSet};

static NO_RULES: RuleSet = RuleSet::new();

/// Composition filter for a lattice (left) and a backoff n-gram PDT (right).
///
/// Decisions are keyed on the PDT arc's rule-id:
/// - lexical backoff: the rules of the context state being left become
///   disallowed, and the state is recorded
/// - syntactic backoff: the unigram rules seen with the arc's input label
///   become disallowed, and the label is recorded
/// - dummy and portal arcs pass the filter state through
/// - an ordinary rule is rejected if it is disallowed on this path, or if its
///   right-hand head cannot reach the terminal on the lattice arc's output
///
/// Clones share the same [`PdtInfo`] and grammar.
#[derive(Debug)]
pub struct TripoliFilter<P> {
    info: Arc<PdtInfo<P>>,
    s1: StateId,
    s2: StateId,
    state: FilterState,
}

impl<P> TripoliFilter<P> {
    pub fn new(info: Arc<PdtInfo<P>>) -> Self {
        Self {
            info,
            s1: NO_STATE_ID,
            s2: NO_STATE_ID,
            state: FilterState::start(),
        }
    }

    pub fn info(&self) -> &PdtInfo<P> {
        &self.info
    }

    /// Lattice and PDT states the filter is positioned at.
    pub fn position(&self) -> (StateId, StateId) {
        (self.s1, self.s2)
    }

    pub fn current(&self) -> &FilterState {
        &self.state
    }

    fn check_rule(&self, r: RuleId, arc1: &LatticeArc) -> FilterOutcome<FilterState> {
        if self.state.contains(r) {
            trace!(rule = r, s2 = self.s2, "rule disallowed after backoff");
            return FilterOutcome::Rejected;
        }
        // lone PDT move: no lexical item to test
        if arc1.is_epsilon_loop() {
            return FilterOutcome::Active(self.state.clone());
        }
        match self.info.grammar().rule_can_reach(r, arc1.olabel) {
            Ok(true) => FilterOutcome::Active(self.state.clone()),
            Ok(false) => {
                trace!(rule = r, term = arc1.olabel, "rule cannot reach terminal");
                FilterOutcome::Rejected
            }
            Err(e) => {
                trace!(rule = r, term = arc1.olabel, error = %e, "reachability lookup failed");
                FilterOutcome::Rejected
            }
        }
    }
}

impl<P> Clone for TripoliFilter<P> {
    fn clone(&self) -> Self {
        Self {
            info: Arc::clone(&self.info),
            s1: self.s1,
            s2: self.s2,
            state: self.state.clone(),
        }
    }
}

impl<P: Automaton<Arc = RuleArc>> ComposeFilter for TripoliFilter<P> {
    type State = FilterState;

    fn start(&self) -> FilterState {
        FilterState::start()
    }

    fn set_state(&mut self, s1: StateId, s2: StateId, state: &FilterState) {
        if self.s1 == s1 && self.s2 == s2 && self.state == *state {
            return;
        }
        self.s1 = s1;
        self.s2 = s2;
        self.state = state.clone();
    }

    fn filter_arc(&self, arc1: &LatticeArc, arc2: &RuleArc) -> FilterOutcome<FilterState> {
        match arc2.kind() {
            RuleKind::LexicalBackoff => {
                let rules = self.info.context_rule_set(self.s2).unwrap_or(&NO_RULES);
                FilterOutcome::Active(self.state.add_state(self.s2, rules))
            }
            RuleKind::SyntacticBackoff => {
                let rules = self.info.unigram_rule_set(arc2.ilabel).unwrap_or(&NO_RULES);
                FilterOutcome::Active(self.state.add_label(arc2.ilabel, rules))
            }
            RuleKind::Dummy | RuleKind::Portal => FilterOutcome::Active(self.state.clone()),
            RuleKind::Rule(r) => self.check_rule(r, arc1),
            RuleKind::Invalid(r) => {
                trace!(rule = r, "invalid rule-id on PDT arc");
                FilterOutcome::Rejected
            }
        }
    }
}
