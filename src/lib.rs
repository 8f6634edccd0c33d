#![forbid(unsafe_code)]
//! blockdoc: executable documentation blocks
//!
//! Documentation pages embed code blocks whose `//`-prefixed lines are *hidden*: they run when the
//! block is tested but are not shown to readers. This crate provides the host side around the pure
//! normalizer in `blockdoc_core`: page scanning (`page`), per-build accumulation (`registry`),
//! sharded build sessions (`session`), doctest emission (`emit`), and the CLI (`cli`).
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod emit;
pub mod page;
pub mod registry;
pub mod session;

pub use blockdoc_core::{BlockText, LanguageFilter, Rendering, normalize, normalize_lines};
pub use config::DoctestConfig;
pub use emit::DoctestWriter;
pub use page::{BlockHost, RegistryHost, process_page};
pub use registry::{BlockRegistry, PageDoctests};
pub use session::BuildSession;
