// Per-state rule indices of a backoff n-gram PDT.

use std::collections::BTreeSet;
use std::sync::Arc;

use hashbrown::HashMap;
use tracing::debug;
use tripoli_core::{EPSILON, Label, RuleId, StateId, StateInfo, StateTag};
use tripoli_fst::{Automaton, RuleArc};

use crate::grammar::Grammar;

/// Ordered set of rule-ids.
pub type RuleSet = BTreeSet<RuleId>;

/// Error type for [`PdtInfo`] construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PdtInfoError {
    #[error("invalid state info for {tag:?} state {state}: {info:?}")]
    InvalidStateInfo {
        state: StateId,
        tag: StateTag,
        info: StateInfo,
    },
    #[error("PDT has {pdt_states} states but {infos} state infos were given")]
    StateCountMismatch { pdt_states: usize, infos: usize },
}

/// A PDT together with its grammar, its state annotations and the rule
/// indices the composition filter consults.
///
/// Built once; read-only afterwards and safe to share between filter clones.
#[derive(Debug)]
pub struct PdtInfo<P> {
    grammar: Arc<Grammar>,
    pdt: P,
    state_info: Vec<StateInfo>,
    // context state description -> state id
    state_index: HashMap<StateInfo, StateId>,
    // context state -> rules on its outgoing arcs
    context_rules: HashMap<StateId, RuleSet>,
    // input label -> rules seen with it from the unigram state
    unigram_rules: HashMap<Label, RuleSet>,
}

impl<P: Automaton<Arc = RuleArc>> PdtInfo<P> {
    /// Validate `state_info` against `grammar` and index the PDT's rules.
    ///
    /// `state_info[s]` annotates PDT state `s`. Trigram states need two
    /// terminal context symbols, bigram states one terminal in the second
    /// slot, and all other states none.
    pub fn new(
        grammar: Arc<Grammar>,
        pdt: P,
        state_info: Vec<StateInfo>,
    ) -> Result<Self, PdtInfoError> {
        if state_info.len() != pdt.num_states() {
            return Err(PdtInfoError::StateCountMismatch {
                pdt_states: pdt.num_states(),
                infos: state_info.len(),
            });
        }

        let mut info = Self {
            grammar,
            pdt,
            state_info: Vec::new(),
            state_index: HashMap::new(),
            context_rules: HashMap::new(),
            unigram_rules: HashMap::new(),
        };

        for (idx, si) in state_info.iter().enumerate() {
            let state = idx as StateId;
            if !info.is_valid(si) {
                return Err(PdtInfoError::InvalidStateInfo {
                    state,
                    tag: si.tag,
                    info: *si,
                });
            }
            if si.tag.is_context() {
                info.collect_rules(state);
                info.state_index.entry(*si).or_insert(state);
            }
            if si.tag == StateTag::Unigram {
                info.collect_unigram_rules(state);
            }
        }
        info.state_info = state_info;

        debug!(
            states = info.state_info.len(),
            context_states = info.context_rules.len(),
            unigram_labels = info.unigram_rules.len(),
            "PDT info built"
        );
        Ok(info)
    }

    fn is_valid(&self, si: &StateInfo) -> bool {
        let term = |s: Option<_>| s.is_some_and(|s| self.grammar.is_term(s));
        match si.tag {
            StateTag::Trigram => term(si.fst) && term(si.snd),
            StateTag::Bigram => si.fst.is_none() && term(si.snd),
            StateTag::Unigram | StateTag::Dummy | StateTag::Portal => {
                si.fst.is_none() && si.snd.is_none()
            }
        }
    }

    fn collect_rules(&mut self, state: StateId) {
        let rules = self.context_rules.entry(state).or_default();
        rules.extend(
            self.pdt
                .arcs(state)
                .iter()
                .filter(|arc| arc.kind().is_rule())
                .map(|arc| arc.rule),
        );
    }

    fn collect_unigram_rules(&mut self, state: StateId) {
        for arc in self.pdt.arcs(state) {
            if arc.ilabel == EPSILON || !arc.kind().is_rule() {
                continue;
            }
            self.unigram_rules
                .entry(arc.ilabel)
                .or_default()
                .insert(arc.rule);
        }
    }
}

impl<P> PdtInfo<P> {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The shared grammar handle.
    pub fn shared_grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn pdt(&self) -> &P {
        &self.pdt
    }

    /// Rules on the outgoing arcs of context state `state`.
    ///
    /// `None` unless `state` is a trigram, bigram or unigram state.
    pub fn context_rule_set(&self, state: StateId) -> Option<&RuleSet> {
        self.context_rules.get(&state)
    }

    /// Rules on the unigram state's outgoing arcs with input `label`.
    pub fn unigram_rule_set(&self, label: Label) -> Option<&RuleSet> {
        self.unigram_rules.get(&label)
    }

    pub fn state_info(&self, state: StateId) -> Option<&StateInfo> {
        usize::try_from(state)
            .ok()
            .and_then(|i| self.state_info.get(i))
    }

    pub fn state_infos(&self) -> &[StateInfo] {
        &self.state_info
    }

    /// The context state described by `info`, if there is one.
    pub fn context_state(&self, info: &StateInfo) -> Option<StateId> {
        self.state_index.get(info).copied()
    }

    pub fn num_context_states(&self) -> usize {
        self.context_rules.len()
    }
}
