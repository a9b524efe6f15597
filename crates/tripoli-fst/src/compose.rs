// Composition filter contract and a breadth-first product construction.

use std::collections::VecDeque;
use std::hash::Hash;

use hashbrown::HashMap;
use tracing::debug;
use tripoli_core::{EPSILON, StateId};

use crate::parens::Parens;
use crate::{Arc, Automaton, FstError, RuleArc, VectorFst};

/// Result of asking a filter about a candidate pair of arcs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterOutcome<S> {
    /// The pair is allowed and leads to this filter state.
    Active(S),
    /// The pair is not allowed; the product transition is pruned.
    Rejected,
}

impl<S> FilterOutcome<S> {
    pub fn is_rejected(&self) -> bool {
        matches!(self, FilterOutcome::Rejected)
    }

    pub fn into_active(self) -> Option<S> {
        match self {
            FilterOutcome::Active(s) => Some(s),
            FilterOutcome::Rejected => None,
        }
    }
}

/// Plug-in consulted on every candidate pair of arcs during composition.
///
/// The driver positions the filter at a product state with [`set_state`]
/// and then asks [`filter_arc`] about each candidate transition leaving it.
/// When one side does not move, it is represented by an epsilon self-loop
/// ([`Arc::epsilon_loop`] or [`RuleArc::epsilon_loop`]).
///
/// Filters are cloned to explore independent branches; clones must share
/// any read-only data they consult.
///
/// [`set_state`]: ComposeFilter::set_state
/// [`filter_arc`]: ComposeFilter::filter_arc
pub trait ComposeFilter: Clone {
    type State: Clone + Eq + Hash;

    /// Filter state at the start of composition.
    fn start(&self) -> Self::State;

    /// Position the filter at lattice state `s1`, PDT state `s2` and filter state `state`.
    fn set_state(&mut self, s1: StateId, s2: StateId, state: &Self::State);

    /// Decide whether `arc1` (lattice) and `arc2` (PDT) may be taken together
    /// from the current position.
    fn filter_arc(&self, arc1: &Arc, arc2: &RuleArc) -> FilterOutcome<Self::State>;
}

/// Filter that allows every transition and carries no memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialFilter;

impl ComposeFilter for TrivialFilter {
    type State = ();

    fn start(&self) {}

    fn set_state(&mut self, _s1: StateId, _s2: StateId, _state: &()) {}

    fn filter_arc(&self, _arc1: &Arc, _arc2: &RuleArc) -> FilterOutcome<()> {
        FilterOutcome::Active(())
    }
}

/// Limits for [`compose`].
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    /// Maximum number of product states before composition gives up.
    pub max_states: usize,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            max_states: 1_000_000,
        }
    }
}

struct Product<S> {
    out: VectorFst<RuleArc>,
    index: HashMap<(StateId, StateId, S), StateId>,
    queue: VecDeque<(StateId, StateId, S, StateId)>,
    max_states: usize,
}

impl<S: Clone + Eq + Hash> Product<S> {
    fn state_of(&mut self, s1: StateId, s2: StateId, f: S) -> Result<StateId, FstError> {
        let key = (s1, s2, f);
        if let Some(&q) = self.index.get(&key) {
            return Ok(q);
        }
        if self.out.num_states() >= self.max_states {
            return Err(FstError::TooManyStates(self.max_states));
        }
        let q = self.out.add_state();
        self.queue.push_back((key.0, key.1, key.2.clone(), q));
        self.index.insert(key, q);
        Ok(q)
    }
}

/// Compose a lattice with a PDT under `filter`.
///
/// A lattice arc and a PDT arc match when the lattice output label equals the
/// PDT input label and is not epsilon. PDT arcs whose input is epsilon or a
/// parenthesis move on the PDT side alone; lattice arcs with epsilon output
/// move on the lattice side alone. Every candidate transition, including lone
/// moves, is offered to the filter, and rejected ones are dropped.
///
/// Only the accessible part of the product is built. Parentheses are kept on
/// the result's arcs; balancing them is left to later PDT algorithms.
pub fn compose<F1, F2, CF>(
    fst1: &F1,
    fst2: &F2,
    parens: &Parens,
    filter: &mut CF,
    options: &ComposeOptions,
) -> Result<VectorFst<RuleArc>, FstError>
where
    F1: Automaton<Arc = Arc>,
    F2: Automaton<Arc = RuleArc>,
    CF: ComposeFilter,
{
    let mut product = Product {
        out: VectorFst::new(),
        index: HashMap::new(),
        queue: VecDeque::new(),
        max_states: options.max_states,
    };
    let (Some(start1), Some(start2)) = (fst1.start(), fst2.start()) else {
        return Ok(product.out);
    };
    let start = product.state_of(start1, start2, filter.start())?;
    product.out.set_start(start)?;

    let mut rejected = 0usize;
    while let Some((s1, s2, f, q)) = product.queue.pop_front() {
        filter.set_state(s1, s2, &f);

        if let (Some(w1), Some(w2)) = (fst1.final_weight(s1), fst2.final_weight(s2)) {
            product.out.set_final(q, w1 + w2)?;
        }

        // PDT side alone
        let idle1 = Arc::epsilon_loop(s1);
        for arc2 in fst2.arcs(s2) {
            if arc2.ilabel != EPSILON && !parens.is_paren(arc2.ilabel) {
                continue;
            }
            match filter.filter_arc(&idle1, arc2) {
                FilterOutcome::Active(nf) => {
                    let next = product.state_of(s1, arc2.nextstate, nf)?;
                    let arc = RuleArc::new(EPSILON, arc2.olabel, arc2.weight, next, arc2.rule);
                    product.out.add_arc(q, arc)?;
                }
                FilterOutcome::Rejected => rejected += 1,
            }
        }

        // Lattice side alone
        let idle2 = RuleArc::epsilon_loop(s2);
        for arc1 in fst1.arcs(s1).iter().filter(|a| a.olabel == EPSILON) {
            match filter.filter_arc(arc1, &idle2) {
                FilterOutcome::Active(nf) => {
                    let next = product.state_of(arc1.nextstate, s2, nf)?;
                    let arc = RuleArc::new(arc1.ilabel, EPSILON, arc1.weight, next, idle2.rule);
                    product.out.add_arc(q, arc)?;
                }
                FilterOutcome::Rejected => rejected += 1,
            }
        }

        // Matched moves
        for arc1 in fst1.arcs(s1).iter().filter(|a| a.olabel != EPSILON) {
            for arc2 in fst2.arcs(s2).iter().filter(|a| a.ilabel == arc1.olabel) {
                match filter.filter_arc(arc1, arc2) {
                    FilterOutcome::Active(nf) => {
                        let next = product.state_of(arc1.nextstate, arc2.nextstate, nf)?;
                        let arc = RuleArc::new(
                            arc1.ilabel,
                            arc2.olabel,
                            arc1.weight + arc2.weight,
                            next,
                            arc2.rule,
                        );
                        product.out.add_arc(q, arc)?;
                    }
                    FilterOutcome::Rejected => rejected += 1,
                }
            }
        }
    }

    debug!(
        states = product.out.num_states(),
        arcs = product.out.num_arcs(),
        rejected,
        "composition finished"
    );
    Ok(product.out)
}
