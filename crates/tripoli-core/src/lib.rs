//! Shared plain-old-data types for the Tripoli crates.
//!
//! Every automaton label, grammar symbol, state id and rule id is a signed
//! 32-bit integer. Negative values are reserved for sentinels.
//!
//! - [`rule_kind`] -- classification of the rule-id carried by a PDT arc
//! - [`state_info`] -- per-state n-gram context annotations

pub mod rule_kind;
pub mod state_info;

/// Automaton arc label.
pub type Label = i32;

/// Grammar symbol (terminal, pre-terminal or non-terminal).
pub type Symbol = i32;

/// Automaton state identifier.
pub type StateId = i32;

/// Position of a rule in the grammar's rule sequence, or a negative arc sentinel.
pub type RuleId = i32;

/// The epsilon label. Symbol 0 is reserved for it as well.
pub const EPSILON: Label = 0;

/// Label used for the idle side of a lone move during composition.
pub const NO_LABEL: Label = -1;

/// Symbol of a label with no grammar symbol, such as epsilon (label 0).
pub const NO_SYMBOL: Symbol = -1;

/// Absent state id.
pub const NO_STATE_ID: StateId = -1;

pub use rule_kind::RuleKind;
pub use state_info::{StateInfo, StateTag};
