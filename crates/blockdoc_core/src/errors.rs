//! Errors produced while turning raw input into a [`crate::BlockText`].

use std::fmt;

/// Represent a block that cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// The block's language tag is not accepted by the active [`crate::LanguageFilter`].
    WrongLanguage { tag: String, origin_line: usize },
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::WrongLanguage { tag, origin_line } => {
                write!(f, "block at line {} is tagged '{}', which is not a recognized language", origin_line, tag)
            }
        }
    }
}

impl std::error::Error for BlockError {}
