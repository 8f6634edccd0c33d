//! Doctest emission: one test file per page, one test function per recorded block.
//!
//! Generates:
//! - `<out>/<page dir>/<prefix><page name><suffix>` for every page slot in the registry
//! - `<out>/manifest.json` listing every emitted test unit
//!
//! Pages whose slot is empty still get their file (truncated), so tests for blocks that were removed
//! from a page do not linger. Nothing here executes the emitted code.
//!
//! Every non-empty body line gets the body indent, whitespace-only ones included, so a blank-looking
//! line inside a multi-line string keeps its whitespace. Empty lines stay empty.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

use crate::config::DoctestConfig;
use crate::registry::{BlockRegistry, PageDoctests};

/// Name of the manifest written next to the test files.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Errors raised while writing doctests
#[derive(Debug, Error, Diagnostic)]
pub enum EmitError {
    #[error("failed to write '{}': {source}", .path.display())]
    #[diagnostic(code(blockdoc::emit::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize test manifest: {0}")]
    #[diagnostic(code(blockdoc::emit::manifest))]
    Manifest(#[from] serde_json::Error),
}

/// One emitted test unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedTest {
    pub page: String,
    pub line: usize,
    pub name: String,
    /// Test file path relative to the output directory, `/`-separated
    pub path: String,
}

/// Writes a registry's materialized blocks as test files
pub struct DoctestWriter<'a> {
    out_dir: PathBuf,
    config: &'a DoctestConfig,
}

impl<'a> DoctestWriter<'a> {
    pub fn new(out_dir: impl AsRef<Path>, config: &'a DoctestConfig) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            config,
        }
    }

    /// Write every page's test file plus the manifest.
    #[tracing::instrument(skip_all, fields(out_dir = %self.out_dir.display(), pages = registry.len()))]
    pub fn write(&self, registry: &BlockRegistry) -> Result<Vec<EmittedTest>, EmitError> {
        create_dir(&self.out_dir)?;

        let mut emitted = Vec::new();
        for page in registry.materialize() {
            let path = target_path(&self.out_dir, &page.page, self.config);
            if let Some(parent) = path.parent() {
                create_dir(parent)?;
            }
            let contents = render_test_file(&page, self.config);
            fs::write(&path, contents).map_err(|source| EmitError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(page = %page.page, tests = page.blocks.len(), path = %path.display(), "wrote doctests");

            let relative = relative_path(&page.page, self.config);
            emitted.extend(page.blocks.iter().map(|(line, _)| EmittedTest {
                page: page.page.clone(),
                line: *line,
                name: test_name(&page.page, *line),
                path: relative.clone(),
            }));
        }

        let manifest_path = self.out_dir.join(MANIFEST_FILE);
        let manifest = serde_json::to_string_pretty(&manifest_json(&emitted))?;
        fs::write(&manifest_path, manifest).map_err(|source| EmitError::Io {
            path: manifest_path,
            source,
        })?;

        tracing::info!(tests = emitted.len(), "doctests written");
        Ok(emitted)
    }
}

fn create_dir(path: &Path) -> Result<(), EmitError> {
    fs::create_dir_all(path).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Test file path for a page, relative to the output directory.
///
/// `guide/intro` becomes `guide/test_intro.py` with the default config.
pub fn relative_path(page: &str, config: &DoctestConfig) -> String {
    let (dir, name) = match page.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, page),
    };
    let file = format!("{}{}{}", config.test_prefix, name, config.test_suffix);
    match dir {
        Some(dir) => format!("{}/{}", dir, file),
        None => file,
    }
}

/// Absolute test file path for a page.
pub fn target_path(out_dir: &Path, page: &str, config: &DoctestConfig) -> PathBuf {
    relative_path(page, config)
        .split('/')
        .fold(out_dir.to_path_buf(), |path, segment| path.join(segment))
}

/// Deterministic test function name for the block at `line` of `page`.
///
/// Characters that cannot appear in an identifier are replaced with `_`.
pub fn test_name(page: &str, line: usize) -> String {
    let page: String = page
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("test_{}_l{}", page, line)
}

/// Render one page's test file.
pub fn render_test_file(page: &PageDoctests, config: &DoctestConfig) -> String {
    let indent = " ".repeat(config.body_indent);
    let mut out = String::new();

    for (line, code) in &page.blocks {
        out.push_str(&format!("def {}():\n", test_name(&page.page, *line)));

        let body: Vec<String> = code
            .lines()
            .map(|l| if l.is_empty() { String::new() } else { format!("{}{}", indent, l) })
            .collect();
        if code.lines().all(|l| l.trim().is_empty()) {
            out.push_str(&format!("{}pass", indent));
        } else {
            out.push_str(&body.join("\n"));
        }
        out.push_str("\n\n");
    }

    out
}

/// Manifest listing every emitted test unit.
pub fn manifest_json(tests: &[EmittedTest]) -> serde_json::Value {
    json!({
        "tests": tests
            .iter()
            .map(|t| json!({
                "page": t.page,
                "line": t.line,
                "name": t.name,
                "path": t.path,
            }))
            .collect::<Vec<_>>(),
    })
}
