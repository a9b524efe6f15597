//! Text readers producing a [`Grammar`](crate::Grammar) and PDT state annotations.
//!
//! - [`states`] -- one annotation per PDT state
//! - [`grammar`] -- rule, symbol and label files

pub mod grammar;
pub mod states;

pub use grammar::{
    read_grammar, read_int_vectors, read_label_map, read_numbered_strings, read_symbol_bounds,
};
pub use states::read_states;

use crate::grammar::GrammarError;

/// Error type for the text readers.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid symbol file: {0}")]
    SymbolFile(String),
    #[error("invalid label {label}: {message}")]
    LabelFile { label: usize, message: String },
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
}

impl ReadError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ReadError::Parse {
            line,
            message: message.into(),
        }
    }
}
