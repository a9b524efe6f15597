//! Grammar-constrained composition of a lexical lattice with a backoff
//! n-gram PDT.
//!
//! The PDT layers a backoff n-gram model (trigram, bigram and unigram context
//! states linked by backoff arcs) over a context-free grammar. Composing it
//! with a lattice through [`TripoliFilter`] keeps only the paths that agree
//! with both the backoff structure and the grammar: a rule already tried in a
//! more specific context is not offered again after backing off, and a rule
//! whose right-hand side cannot lead to the observed word is never applied.
//!
//! - [`grammar`] -- symbol ranges, rules, memoized reachability
//! - [`pdt_info`] -- per-state rule indices of the PDT
//! - [`filter`] -- filter state and the composition filter
//! - [`readers`] -- text readers for grammars and state files

pub mod filter;
pub mod grammar;
pub mod pdt_info;
pub mod readers;

pub use filter::TripoliFilter;
pub use filter::state::FilterState;
pub use grammar::{Grammar, GrammarError, Rule};
pub use pdt_info::{PdtInfo, PdtInfoError};
