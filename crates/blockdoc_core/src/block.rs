//! The immutable input record for one annotated block.

use std::fmt;

use crate::HIDDEN_MARKER;
use crate::errors::BlockError;
use crate::lang::LanguageFilter;

/// Original lines of one annotated block plus per-line visibility flags.
///
/// ## Notes
/// - `lines.len() == hidden.len()` always holds; there is no way to mutate a block after construction.
/// - A line is hidden iff its trimmed text starts with [`HIDDEN_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockText {
    lines: Vec<String>,
    hidden: Vec<bool>,
    origin_line: usize,
}

impl BlockText {
    /// Build a block from an ordered sequence of lines.
    ///
    /// ## Parameters
    /// - `lines`: one entry per physical line, in source order.
    /// - `origin_line`: 1-based line where the block begins in its page.
    pub fn new<I, S>(lines: I, origin_line: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let hidden = lines.iter().map(|l| is_hidden_line(l)).collect();
        Self {
            lines,
            hidden,
            origin_line,
        }
    }

    /// Build a block from a single text blob.
    ///
    /// ## Notes
    /// - A trailing newline yields a trailing empty line, so `"a\n"` is `["a", ""]` and survives
    ///   normalization as a trailing newline.
    pub fn from_text(text: &str, origin_line: usize) -> Self {
        let mut lines: Vec<&str> = text.lines().collect();
        if text.ends_with('\n') {
            lines.push("");
        }
        Self::new(lines, origin_line)
    }

    /// Build a block from the content lines of a fence, rejecting tags the filter does not accept.
    ///
    /// ## Notes
    /// - Every content line becomes one block line, blank ones included; a fence holding a single
    ///   empty line is a one-line block.
    pub fn from_fence<I, S>(lines: I, tag: &str, origin_line: usize, filter: &LanguageFilter) -> Result<Self, BlockError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !filter.accepts(tag) {
            return Err(BlockError::WrongLanguage {
                tag: tag.to_string(),
                origin_line,
            });
        }
        Ok(Self::new(lines, origin_line))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn hidden(&self) -> &[bool] {
        &self.hidden
    }

    /// Number of lines that stay in the visible rendering.
    pub fn visible_len(&self) -> usize {
        self.hidden.iter().filter(|hidden| !**hidden).count()
    }

    pub fn origin_line(&self) -> usize {
        self.origin_line
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The original lines joined with `\n`, markers and indentation untouched.
    pub fn raw_source(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for BlockText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_source())
    }
}

impl From<&str> for BlockText {
    fn from(text: &str) -> Self {
        Self::from_text(text, 0)
    }
}

impl From<Vec<String>> for BlockText {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines, 0)
    }
}

/// Check whether a raw line carries the hidden marker.
pub fn is_hidden_line(line: &str) -> bool {
    line.trim().starts_with(HIDDEN_MARKER)
}
