//! Provide the pure block-normalization core for blockdoc.
//!
//! A documentation page embeds annotated code blocks. Lines whose trimmed text starts with `//` are
//! *hidden*: they run as part of the test but are not shown to the reader. This crate turns one such
//! block into its two renderings:
//!
//! - the **executable** rendering (every line, markers stripped, common indentation removed), and
//! - the **visible** rendering (hidden lines dropped, re-dedented).
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no global state, no third-party dependencies.
//! - Every function here is deterministic and reentrant; callers may normalize blocks from many
//!   worker threads at once.
//! - Deciding *which* blocks qualify (language tags) lives in [`lang`]; walking pages and storing results
//!   lives in the `blockdoc` crate.

pub mod block;
pub mod errors;
pub mod lang;
pub mod normalize;

pub use block::BlockText;
pub use errors::BlockError;
pub use lang::LanguageFilter;
pub use normalize::{NormalizedBlock, NormalizedLine, Rendering, normalize, normalize_block, normalize_lines};

/// The two-character prefix that marks a line as hidden.
pub const HIDDEN_MARKER: &str = "//";
