// Vector-backed mutable automaton.

use tripoli_core::StateId;

use crate::{Automaton, FstError, Weight};

#[derive(Debug, Clone)]
struct VectorState<A> {
    arcs: Vec<A>,
    final_weight: Option<Weight>,
}

impl<A> Default for VectorState<A> {
    fn default() -> Self {
        Self {
            arcs: Vec::new(),
            final_weight: None,
        }
    }
}

/// Automaton whose states and arcs live in vectors.
///
/// Used both for lattices (`VectorFst<Arc>`) and PDTs (`VectorFst<RuleArc>`).
#[derive(Debug, Clone)]
pub struct VectorFst<A> {
    states: Vec<VectorState<A>>,
    start: Option<StateId>,
}

impl<A> Default for VectorFst<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> VectorFst<A> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            start: None,
        }
    }

    /// Add a state and return its id.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(VectorState::default());
        (self.states.len() - 1) as StateId
    }

    /// Add states until `state` exists.
    pub fn ensure_state(&mut self, state: StateId) {
        while self.states.len() <= state as usize {
            self.add_state();
        }
    }

    pub fn set_start(&mut self, state: StateId) -> Result<(), FstError> {
        self.check_state(state)?;
        self.start = Some(state);
        Ok(())
    }

    pub fn set_final(&mut self, state: StateId, weight: Weight) -> Result<(), FstError> {
        self.state_mut(state)?.final_weight = Some(weight);
        Ok(())
    }

    pub fn add_arc(&mut self, state: StateId, arc: A) -> Result<(), FstError> {
        self.state_mut(state)?.arcs.push(arc);
        Ok(())
    }

    fn check_state(&self, state: StateId) -> Result<(), FstError> {
        if state >= 0 && (state as usize) < self.states.len() {
            Ok(())
        } else {
            Err(FstError::UnknownState(state))
        }
    }

    fn state_mut(&mut self, state: StateId) -> Result<&mut VectorState<A>, FstError> {
        self.check_state(state)?;
        Ok(&mut self.states[state as usize])
    }
}

impl<A> Automaton for VectorFst<A> {
    type Arc = A;

    fn start(&self) -> Option<StateId> {
        self.start
    }

    fn num_states(&self) -> usize {
        self.states.len()
    }

    fn arcs(&self, state: StateId) -> &[A] {
        if state < 0 {
            return &[];
        }
        self.states
            .get(state as usize)
            .map(|s| s.arcs.as_slice())
            .unwrap_or(&[])
    }

    fn final_weight(&self, state: StateId) -> Option<Weight> {
        if state < 0 {
            return None;
        }
        self.states.get(state as usize).and_then(|s| s.final_weight)
    }
}
