//! Page scanning: find annotated blocks in a Markdown page, swap in their visible rendering, and hand
//! the executable rendering to a [`BlockHost`].
//!
//! Blocks are fenced with ```` ``` ```` or `~~~`. The first word of the info string is the block's
//! language tag; a fence without one is tagged `default`. Blocks in a language the filter rejects are
//! copied through untouched.

use blockdoc_core::lang::{self, LanguageFilter};
use blockdoc_core::{BlockError, BlockText, Rendering, normalize};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::registry::BlockRegistry;

/// Errors raised while scanning one page.
#[derive(Debug, Error, Diagnostic)]
pub enum PageError {
    #[error("unterminated code fence in '{page}' (opened at line {line})")]
    #[diagnostic(
        code(blockdoc::page::unterminated_fence),
        help("close the block with a fence of at least the same length")
    )]
    UnterminatedFence {
        page: String,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("fence opened here")]
        span: SourceSpan,
    },
}

/// The document side of block processing.
///
/// The scanner asks the host for a block's renderings, substitutes the visible text into the page,
/// and passes the executable text back through [`BlockHost::register`].
pub trait BlockHost {
    /// Produce both renderings of `block`.
    fn render(&mut self, block: &BlockText) -> Rendering {
        normalize(block)
    }

    /// Record the executable rendering of the block starting at `line` of `page`.
    fn register(&mut self, page: &str, line: usize, executable: String);
}

/// Default host: normalize with the core and record into a registry.
pub struct RegistryHost<'a> {
    registry: &'a mut BlockRegistry,
}

impl<'a> RegistryHost<'a> {
    pub fn new(registry: &'a mut BlockRegistry) -> Self {
        Self { registry }
    }
}

impl BlockHost for RegistryHost<'_> {
    fn register(&mut self, page: &str, line: usize, executable: String) {
        self.registry.record(page, line, executable);
    }
}

/// An opening fence: its marker character, run length, and indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
    indent: usize,
}

impl Fence {
    /// Parse an opening fence, returning it with the info string.
    fn open(line: &str) -> Option<(Fence, &str)> {
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent > 3 {
            return None;
        }
        let rest = &line[indent..];
        let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = rest.len() - rest.trim_start_matches(marker).len();
        if len < 3 {
            return None;
        }
        let info = rest[len..].trim();
        if marker == '`' && info.contains('`') {
            return None;
        }
        Some((Fence { marker, len, indent }, info))
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return false;
        }
        let run = trimmed.len() - trimmed.trim_start_matches(self.marker).len();
        run >= self.len && trimmed[run..].trim().is_empty()
    }
}

/// Scan `source`, returning the page with every accepted block replaced by its visible rendering.
///
/// ## Parameters
/// - `page`: the page identifier used as the registry key.
/// - `source`: the page text.
/// - `filter`: which language tags qualify.
/// - `host`: receives each qualifying block.
///
/// ## Errors
/// - [`PageError::UnterminatedFence`] when a fence is opened and never closed.
#[tracing::instrument(skip_all, fields(page = page, source_len = source.len()))]
pub fn process_page(
    page: &str,
    source: &str,
    filter: &LanguageFilter,
    host: &mut dyn BlockHost,
) -> Result<String, PageError> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let mut out = String::with_capacity(source.len());
    let mut offset = 0;
    let mut i = 0;

    while i < lines.len() {
        let raw = lines[i];
        let Some((fence, info)) = Fence::open(strip_eol(raw)) else {
            out.push_str(raw);
            offset += raw.len();
            i += 1;
            continue;
        };

        let fence_offset = offset;
        let fence_line = i + 1;
        let content_start = i + 1;
        let Some(close) = (content_start..lines.len()).find(|&j| fence.closes(strip_eol(lines[j]))) else {
            return Err(PageError::UnterminatedFence {
                page: page.to_string(),
                line: fence_line,
                src: NamedSource::new(page, source.to_string()),
                span: (fence_offset, strip_eol(raw).len()).into(),
            });
        };

        let content = lines[content_start..close].iter().map(|l| strip_eol(l));
        out.push_str(raw);
        let tag = lang::tag_of(info);
        match BlockText::from_fence(content, tag, content_start + 1, filter) {
            Ok(block) => {
                let rendering = host.render(&block);
                tracing::debug!(line = block.origin_line(), lines = block.len(), "normalized block");
                write_visible(&mut out, &rendering.visible, block.visible_len(), fence.indent);
                host.register(page, block.origin_line(), rendering.executable);
            }
            Err(BlockError::WrongLanguage { tag, origin_line }) => {
                tracing::trace!(tag, line = origin_line, "skipping block");
                for line in &lines[content_start..close] {
                    out.push_str(line);
                }
            }
        }
        out.push_str(lines[close]);

        for line in &lines[i..=close] {
            offset += line.len();
        }
        i = close + 1;
    }

    Ok(out)
}

fn strip_eol(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Write the visible text as fenced content, re-indented to the fence's column.
///
/// `shown` is the number of visible lines; an empty `visible` is one blank line unless it is zero.
fn write_visible(out: &mut String, visible: &str, shown: usize, indent: usize) {
    if shown == 0 {
        return;
    }
    let pad = " ".repeat(indent);
    for line in visible.split('\n') {
        if !line.is_empty() {
            out.push_str(&pad);
        }
        out.push_str(line);
        out.push('\n');
    }
}
