// Rule-id sentinels carried by PDT arcs.

use crate::RuleId;

/// Raw rule-id of a dummy (structural) arc.
pub const DUMMY_ARC: RuleId = -1;
/// Raw rule-id of a portal (structural) arc.
pub const PORTAL_ARC: RuleId = -2;
/// Raw rule-id of a lexical backoff arc (trigram -> bigram -> unigram).
pub const LEXICAL_BACKOFF_ARC: RuleId = -3;
/// Raw rule-id of a syntactic backoff arc (unigram -> grammar-only).
pub const SYNTACTIC_BACKOFF_ARC: RuleId = -4;

/// What a PDT arc's rule-id means.
///
/// A non-negative rule-id names an ordinary grammar rule. The four reserved
/// negative values mark structural and backoff arcs. Any other negative value
/// is not a valid rule-id and is classified as [`RuleKind::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Dummy,
    Portal,
    LexicalBackoff,
    SyntacticBackoff,
    Rule(RuleId),
    Invalid(RuleId),
}

impl RuleKind {
    /// Classify a raw rule-id.
    #[inline]
    pub fn from_raw(raw: RuleId) -> Self {
        match raw {
            DUMMY_ARC => RuleKind::Dummy,
            PORTAL_ARC => RuleKind::Portal,
            LEXICAL_BACKOFF_ARC => RuleKind::LexicalBackoff,
            SYNTACTIC_BACKOFF_ARC => RuleKind::SyntacticBackoff,
            r if r >= 0 => RuleKind::Rule(r),
            r => RuleKind::Invalid(r),
        }
    }

    /// Whether this is an ordinary grammar rule.
    pub fn is_rule(self) -> bool {
        matches!(self, RuleKind::Rule(_))
    }
}
