// Per-state n-gram context annotations of a PDT.

use crate::Symbol;

/// Error for an integer that does not name a [`StateTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown state tag {0}")]
pub struct UnknownStateTag(pub i32);

/// The n-gram role of a PDT state.
///
/// The integer values are those used in state files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTag {
    Trigram = 0,
    Bigram = 1,
    Unigram = 2,
    Dummy = 3,
    Portal = 4,
}

impl StateTag {
    /// Whether states with this tag are lexical contexts (trigram, bigram or unigram).
    pub fn is_context(self) -> bool {
        matches!(self, StateTag::Trigram | StateTag::Bigram | StateTag::Unigram)
    }
}

impl TryFrom<i32> for StateTag {
    type Error = UnknownStateTag;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StateTag::Trigram),
            1 => Ok(StateTag::Bigram),
            2 => Ok(StateTag::Unigram),
            3 => Ok(StateTag::Dummy),
            4 => Ok(StateTag::Portal),
            other => Err(UnknownStateTag(other)),
        }
    }
}

/// Annotation of one PDT state.
///
/// The meaning of the two symbol slots depends on the tag:
/// - trigram: `fst` and `snd` are the two terminal context symbols
/// - bigram: `snd` is the terminal context symbol, `fst` is unused
/// - unigram, dummy, portal: both unused
///
/// Unused slots are `None`. Whether the slots hold what the tag demands is
/// checked when a `PdtInfo` is built, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateInfo {
    pub tag: StateTag,
    pub fst: Option<Symbol>,
    pub snd: Option<Symbol>,
}

impl StateInfo {
    pub fn trigram(fst: Symbol, snd: Symbol) -> Self {
        Self {
            tag: StateTag::Trigram,
            fst: Some(fst),
            snd: Some(snd),
        }
    }

    pub fn bigram(snd: Symbol) -> Self {
        Self {
            tag: StateTag::Bigram,
            fst: None,
            snd: Some(snd),
        }
    }

    /// A state of a tag that carries no context symbols.
    pub fn bare(tag: StateTag) -> Self {
        Self {
            tag,
            fst: None,
            snd: None,
        }
    }

    pub fn unigram() -> Self {
        Self::bare(StateTag::Unigram)
    }

    pub fn dummy() -> Self {
        Self::bare(StateTag::Dummy)
    }

    pub fn portal() -> Self {
        Self::bare(StateTag::Portal)
    }
}
