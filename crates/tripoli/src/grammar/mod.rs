// Context-free grammar over a partitioned integer symbol space.

mod reach;

use hashbrown::{HashMap, HashSet};
use tracing::debug;
use tripoli_core::{Label, RuleId, Symbol};

use self::reach::ReachCache;

/// A grammar rule: index 0 is the left-hand symbol, the rest is the right-hand side.
pub type Rule = Vec<Symbol>;

/// Why a rule is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleDefect {
    #[error("a rule must have at least two symbols")]
    TooShort,
    #[error("pre-terminal {preterm} does not match terminal {term} in unary production")]
    MismatchedPreterminal { preterm: Symbol, term: Symbol },
    #[error("left-hand symbol {0} must be a non-terminal")]
    NonterminalLhsRequired(Symbol),
    #[error("right-hand symbol {0} must be a non-terminal or pre-terminal")]
    InvalidRhsSymbol(Symbol),
}

/// Error type for grammar construction and lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("max_term must be > 0, got {0}")]
    InvalidMaxTerm(Symbol),
    #[error("max_preterm must be 2 * max_term = {expected}, got {actual}")]
    InvalidMaxPreterm { expected: Symbol, actual: Symbol },
    #[error("max_nonterm must be > max_preterm = {max_preterm}, got {max_nonterm}")]
    InvalidMaxNonterm {
        max_preterm: Symbol,
        max_nonterm: Symbol,
    },
    #[error("invalid rule {index}: {defect}")]
    InvalidRule { index: usize, defect: RuleDefect },
    #[error("symbol {0} is not a terminal")]
    NotTerminal(Symbol),
    #[error("symbol {0} is not a pre-terminal or non-terminal")]
    NotDeriving(Symbol),
    #[error("rule {0} does not exist")]
    UnknownRule(RuleId),
    #[error("label {0} is outside the label table")]
    LabelOutOfRange(Label),
}

/// Context-free grammar with memoized terminal reachability.
///
/// Symbols are partitioned into three contiguous ranges: terminals
/// `(0, max_term]`, pre-terminals `(max_term, max_preterm]` and non-terminals
/// `(max_preterm, max_nonterm]`. Pre-terminal `p` stands for terminal
/// `p - max_term`. Symbol 0 is epsilon.
///
/// Apart from the reachability memo the grammar is immutable once built.
/// [`symbol_can_reach`](Self::symbol_can_reach) is logically pure; the memo
/// only saves work and is safe to share between threads.
#[derive(Debug)]
pub struct Grammar {
    max_term: Symbol,
    max_preterm: Symbol,
    max_nonterm: Symbol,
    rules: Vec<Rule>,
    labels_to_symbols: Vec<Symbol>,
    // head -> distinct left-most right-hand symbols of its rules
    replacements: HashMap<Symbol, Vec<Symbol>>,
    reach: ReachCache,
}

impl Grammar {
    /// Build a grammar, validating the bounds and every rule.
    pub fn new(
        max_term: Symbol,
        max_preterm: Symbol,
        max_nonterm: Symbol,
        rules: Vec<Rule>,
        labels_to_symbols: Vec<Symbol>,
    ) -> Result<Self, GrammarError> {
        if max_term <= 0 {
            return Err(GrammarError::InvalidMaxTerm(max_term));
        }
        let Some(expected) = max_term.checked_mul(2) else {
            return Err(GrammarError::InvalidMaxTerm(max_term));
        };
        if max_preterm != expected {
            return Err(GrammarError::InvalidMaxPreterm {
                expected,
                actual: max_preterm,
            });
        }
        if max_nonterm <= max_preterm {
            return Err(GrammarError::InvalidMaxNonterm {
                max_preterm,
                max_nonterm,
            });
        }

        let mut grammar = Self {
            max_term,
            max_preterm,
            max_nonterm,
            rules: Vec::new(),
            labels_to_symbols,
            replacements: HashMap::new(),
            reach: ReachCache::new(),
        };
        grammar.set_rules(rules)?;
        Ok(grammar)
    }

    pub fn max_term(&self) -> Symbol {
        self.max_term
    }

    pub fn max_preterm(&self) -> Symbol {
        self.max_preterm
    }

    pub fn max_nonterm(&self) -> Symbol {
        self.max_nonterm
    }

    #[inline]
    pub fn is_term(&self, s: Symbol) -> bool {
        s > 0 && s <= self.max_term
    }

    #[inline]
    pub fn is_preterm(&self, s: Symbol) -> bool {
        s > self.max_term && s <= self.max_preterm
    }

    #[inline]
    pub fn is_nonterm(&self, s: Symbol) -> bool {
        s > self.max_preterm && s <= self.max_nonterm
    }

    /// The pre-terminal standing for terminal `t`.
    pub fn to_preterm(&self, t: Symbol) -> Option<Symbol> {
        self.is_term(t).then(|| t + self.max_term)
    }

    /// The terminal a pre-terminal `p` stands for.
    pub fn to_term(&self, p: Symbol) -> Option<Symbol> {
        self.is_preterm(p).then(|| p - self.max_term)
    }

    /// Map an automaton arc label to its grammar symbol.
    pub fn label_to_symbol(&self, label: Label) -> Result<Symbol, GrammarError> {
        usize::try_from(label)
            .ok()
            .and_then(|i| self.labels_to_symbols.get(i))
            .copied()
            .ok_or(GrammarError::LabelOutOfRange(label))
    }

    pub fn labels_to_symbols(&self) -> &[Symbol] {
        &self.labels_to_symbols
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, r: RuleId) -> Option<&[Symbol]> {
        usize::try_from(r)
            .ok()
            .and_then(|i| self.rules.get(i))
            .map(Vec::as_slice)
    }

    /// Left-most right-hand symbols of the rules headed by `s`.
    pub fn replacements(&self, s: Symbol) -> &[Symbol] {
        self.replacements
            .get(&s)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check the shape of a single rule.
    ///
    /// A two-symbol rule headed by a pre-terminal is a unary terminal
    /// production and must rewrite to that pre-terminal's own terminal. Every
    /// other rule must be headed by a non-terminal and have only
    /// non-terminals and pre-terminals on its right-hand side.
    pub fn validate_rule(&self, rule: &[Symbol]) -> Result<(), RuleDefect> {
        if rule.len() < 2 {
            return Err(RuleDefect::TooShort);
        }
        if rule.len() == 2 && self.is_preterm(rule[0]) && self.is_term(rule[1]) {
            if self.to_term(rule[0]) != Some(rule[1]) {
                return Err(RuleDefect::MismatchedPreterminal {
                    preterm: rule[0],
                    term: rule[1],
                });
            }
            return Ok(());
        }
        if !self.is_nonterm(rule[0]) {
            return Err(RuleDefect::NonterminalLhsRequired(rule[0]));
        }
        match rule[1..]
            .iter()
            .find(|&&s| !(self.is_nonterm(s) || self.is_preterm(s)))
        {
            Some(&bad) => Err(RuleDefect::InvalidRhsSymbol(bad)),
            None => Ok(()),
        }
    }

    /// Replace the rule set and rebuild the replacement table.
    ///
    /// All rules are validated first; on error the grammar is left unchanged.
    /// The reachability memo is reset.
    pub fn set_rules(&mut self, rules: Vec<Rule>) -> Result<(), GrammarError> {
        for (index, rule) in rules.iter().enumerate() {
            self.validate_rule(rule)
                .map_err(|defect| GrammarError::InvalidRule { index, defect })?;
        }

        let mut replacements: HashMap<Symbol, Vec<Symbol>> = HashMap::new();
        for rule in &rules {
            let repls = replacements.entry(rule[0]).or_default();
            if !repls.contains(&rule[1]) {
                repls.push(rule[1]);
            }
        }

        self.rules = rules;
        self.replacements = replacements;
        self.reach.clear();
        debug!(
            rules = self.rules.len(),
            heads = self.replacements.len(),
            "grammar rules set"
        );
        Ok(())
    }

    /// Whether `symbol` can derive, through left-most right-hand symbols, the
    /// terminal `term` (or its pre-terminal).
    ///
    /// `symbol` must be a pre-terminal or non-terminal and `term` a terminal.
    /// Cyclic rules are fine: a symbol that only reaches `term` through an
    /// infinite derivation answers `false`.
    pub fn symbol_can_reach(&self, symbol: Symbol, term: Symbol) -> Result<bool, GrammarError> {
        if !self.is_term(term) {
            return Err(GrammarError::NotTerminal(term));
        }
        if !(self.is_preterm(symbol) || self.is_nonterm(symbol)) {
            return Err(GrammarError::NotDeriving(symbol));
        }
        if let Some(known) = self.reach.get(symbol, term) {
            return Ok(known);
        }
        Ok(self.search(symbol, term))
    }

    /// Whether the head of rule `r`'s right-hand side can reach `term`.
    ///
    /// For a unary terminal production the head is the terminal itself, which
    /// reaches only itself.
    pub fn rule_can_reach(&self, r: RuleId, term: Symbol) -> Result<bool, GrammarError> {
        let rule = self.rule(r).ok_or(GrammarError::UnknownRule(r))?;
        let head = rule[1];
        if self.is_term(head) {
            if !self.is_term(term) {
                return Err(GrammarError::NotTerminal(term));
            }
            return Ok(head == term);
        }
        self.symbol_can_reach(head, term)
    }

    /// Fill the memo for every (pre-terminal or non-terminal, terminal) pair.
    ///
    /// After this, reachability queries only take the shared lock.
    pub fn precompute_reachability(&self) {
        let mut reverse: HashMap<Symbol, Vec<Symbol>> = HashMap::new();
        for (&from, repls) in &self.replacements {
            for &to in repls {
                reverse.entry(to).or_default().push(from);
            }
        }

        for term in 1..=self.max_term {
            let mut reached: HashSet<Symbol> = HashSet::new();
            let mut stack = vec![term, term + self.max_term];
            while let Some(s) = stack.pop() {
                if reached.insert(s) {
                    stack.extend(reverse.get(&s).into_iter().flatten().copied());
                }
            }
            self.reach.record(
                (self.max_term + 1..=self.max_nonterm).map(|s| ((s, term), reached.contains(&s))),
            );
        }
        debug!(entries = self.reach.len(), "reachability precomputed");
    }

    // Depth-first search with a local visited set. A successful search records
    // only the queried pair; a failed one records every symbol it expanded,
    // since none of them can reach the terminal either.
    fn search(&self, start: Symbol, term: Symbol) -> bool {
        let preterm = term + self.max_term;
        let mut visited: HashSet<Symbol> = HashSet::new();
        let mut stack = vec![start];
        visited.insert(start);

        while let Some(s) = stack.pop() {
            if s == term || s == preterm {
                self.reach.record([((start, term), true)]);
                return true;
            }
            if self.is_term(s) {
                continue;
            }
            match self.reach.get(s, term) {
                Some(true) => {
                    self.reach.record([((start, term), true)]);
                    return true;
                }
                Some(false) => continue,
                None => {}
            }
            for &next in self.replacements(s) {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }

        self.reach.record(
            visited
                .into_iter()
                .filter(|&s| !self.is_term(s))
                .map(|s| ((s, term), false)),
        );
        false
    }
}
