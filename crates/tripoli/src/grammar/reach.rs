// Shared memo of symbol-to-terminal reachability.

use hashbrown::HashMap;
use parking_lot::RwLock;
use tripoli_core::Symbol;

/// Memo of `(symbol, terminal) -> reachable` answers.
///
/// Lookups take the shared lock. A finished search records all of its
/// answers under a single exclusive lock. Answers are never revised while the
/// rules stay the same, so concurrent searches for the same pair record the
/// same value.
#[derive(Debug, Default)]
pub(crate) struct ReachCache {
    known: RwLock<HashMap<(Symbol, Symbol), bool>>,
}

impl ReachCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: Symbol, term: Symbol) -> Option<bool> {
        self.known.read().get(&(symbol, term)).copied()
    }

    pub fn record(&self, entries: impl IntoIterator<Item = ((Symbol, Symbol), bool)>) {
        let mut known = self.known.write();
        for (key, reachable) in entries {
            known.entry(key).or_insert(reachable);
        }
    }

    pub fn clear(&self) {
        self.known.write().clear();
    }

    pub fn len(&self) -> usize {
        self.known.read().len()
    }
}
