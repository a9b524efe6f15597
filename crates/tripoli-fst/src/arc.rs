// Arc records for lattices and PDTs.

use tripoli_core::rule_kind::DUMMY_ARC;
use tripoli_core::{EPSILON, Label, NO_LABEL, RuleId, RuleKind, StateId};

/// Tropical weight: path weights add, smaller is better.
pub type Weight = f32;

/// Lattice arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: Weight,
    pub nextstate: StateId,
}

impl Arc {
    pub fn new(ilabel: Label, olabel: Label, weight: Weight, nextstate: StateId) -> Self {
        Self {
            ilabel,
            olabel,
            weight,
            nextstate,
        }
    }

    /// Stand-in for an idle lattice side: stays at `state`, consumes nothing
    /// and produces [`NO_LABEL`].
    pub fn epsilon_loop(state: StateId) -> Self {
        Self::new(EPSILON, NO_LABEL, 0.0, state)
    }

    pub fn is_epsilon_loop(&self) -> bool {
        self.ilabel == EPSILON && self.olabel == NO_LABEL
    }
}

/// PDT arc: an [`Arc`] plus the rule-id it applies.
///
/// The rule-id is either an ordinary rule position or one of the sentinels
/// in [`tripoli_core::rule_kind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleArc {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: Weight,
    pub nextstate: StateId,
    pub rule: RuleId,
}

impl RuleArc {
    pub fn new(
        ilabel: Label,
        olabel: Label,
        weight: Weight,
        nextstate: StateId,
        rule: RuleId,
    ) -> Self {
        Self {
            ilabel,
            olabel,
            weight,
            nextstate,
            rule,
        }
    }

    /// Stand-in for an idle PDT side. Carries the dummy rule-id so that
    /// filters treat it as structural.
    pub fn epsilon_loop(state: StateId) -> Self {
        Self::new(NO_LABEL, EPSILON, 0.0, state, DUMMY_ARC)
    }

    #[inline]
    pub fn kind(&self) -> RuleKind {
        RuleKind::from_raw(self.rule)
    }
}
