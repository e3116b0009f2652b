//! Engine error types.

use thiserror::Error;

/// Failures surfaced by the engine.
///
/// Operations on already-constructed automata (algebra, equivalence,
/// synthesis) are infallible; only pattern compilation and iteration-bound
/// validation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed regular expression, with the byte offset of the offending
    /// position in the pattern.
    #[error("syntax error at offset {pos}: {msg}")]
    Syntax { pos: usize, msg: String },

    /// `iter` called with a finite maximum below the minimum.
    #[error("invalid iteration bounds {{{min},{max}}}")]
    InvalidIteration { min: u32, max: u32 },
}

impl Error {
    pub(crate) fn syntax(pos: usize, msg: impl Into<String>) -> Self {
        Error::Syntax {
            pos,
            msg: msg.into(),
        }
    }
}
