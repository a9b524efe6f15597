//! Weighted automaton layer for Tripoli.
//!
//! This crate holds the in-memory automata that grammar-constrained
//! composition runs over: a flat lexical lattice and a pushdown transducer
//! (PDT) whose arcs carry rule-ids.
//!
//! # Architecture
//!
//! - [`arc`] -- Plain arc and rule-carrying arc records
//! - [`vector`] -- Mutable, vector-backed automaton
//! - [`text`] -- Text-format compilers for lattices and PDTs
//! - [`parens`] -- Parenthesis (stack symbol) label pairs
//! - [`compose`] -- Composition filter contract and a product-construction driver

pub mod arc;
pub mod compose;
pub mod parens;
pub mod text;
pub mod vector;

use std::ops::Range;

use tripoli_core::{Label, StateId};

pub use arc::{Arc, RuleArc, Weight};
pub use vector::VectorFst;

/// Error type for automaton construction, text compilation and composition.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("state {0} does not exist")]
    UnknownState(StateId),
    #[error("label {0} appears in more than one parenthesis pair")]
    DuplicateParen(Label),
    #[error("composition exceeded the limit of {0} states")]
    TooManyStates(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FstError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FstError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Read-only view of a weighted automaton.
///
/// States are numbered densely from 0. Both the flat lattice and the PDT are
/// accessed through this trait; they differ only in their arc type.
pub trait Automaton {
    type Arc;

    /// The start state, or `None` for an empty automaton.
    fn start(&self) -> Option<StateId>;

    /// Number of states.
    fn num_states(&self) -> usize;

    /// Outgoing arcs of `state`. Unknown states have no arcs.
    fn arcs(&self, state: StateId) -> &[Self::Arc];

    /// Final weight of `state`, or `None` if it is not final.
    fn final_weight(&self, state: StateId) -> Option<Weight>;

    /// All state ids.
    fn states(&self) -> Range<StateId> {
        0..self.num_states() as StateId
    }

    /// Total number of arcs.
    fn num_arcs(&self) -> usize {
        self.states().map(|s| self.arcs(s).len()).sum()
    }
}
