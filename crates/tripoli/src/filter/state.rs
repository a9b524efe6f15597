// Composition filter memory.

use std::hash::{Hash, Hasher};

use tripoli_core::{Label, RuleId, StateId};

use crate::pdt_info::RuleSet;

/// What the filter remembers about the path leading to a product state.
///
/// - `states`: context states left through lexical backoff, in order
/// - `labels`: labels that triggered syntactic backoff, in order
/// - `disallowed`: rules already tried in a more specific context
///
/// Values are never modified; backoff produces a new value with one more
/// element. Equality and hashing look at `states` and `labels` only, since
/// `disallowed` is determined by them.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    states: Vec<StateId>,
    labels: Vec<Label>,
    disallowed: RuleSet,
}

impl FilterState {
    /// The empty state composition starts from.
    pub fn start() -> Self {
        Self::default()
    }

    /// Record lexical backoff out of `state`, disallowing `rules` from now on.
    #[must_use]
    pub fn add_state(&self, state: StateId, rules: &RuleSet) -> Self {
        let mut states = self.states.clone();
        states.push(state);
        Self {
            states,
            labels: self.labels.clone(),
            disallowed: self.disallowed.union(rules).copied().collect(),
        }
    }

    /// Record syntactic backoff on `label`, disallowing `rules` from now on.
    #[must_use]
    pub fn add_label(&self, label: Label, rules: &RuleSet) -> Self {
        let mut labels = self.labels.clone();
        labels.push(label);
        Self {
            states: self.states.clone(),
            labels,
            disallowed: self.disallowed.union(rules).copied().collect(),
        }
    }

    /// Whether rule `r` is disallowed on this path.
    pub fn contains(&self, r: RuleId) -> bool {
        self.disallowed.contains(&r)
    }

    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn disallowed(&self) -> &RuleSet {
        &self.disallowed
    }
}

impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states && self.labels == other.labels
    }
}

impl Eq for FilterState {}

impl Hash for FilterState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.states.hash(state);
        self.labels.hash(state);
    }
}
