//! Build session: discover pages, scan them on sharded workers, and reconcile the results.
//!
//! ## Concurrency
//!
//! Pages are split into at most `jobs` disjoint shards. Each worker owns a private
//! [`BlockRegistry`], resets a page's slot before scanning it, and never touches another shard's
//! pages. When a worker finishes, the session folds its registry into the shared one with
//! [`BlockRegistry::merge_from`], replacing each of the worker's pages wholesale.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use blockdoc_core::LanguageFilter;
use miette::Diagnostic;
use thiserror::Error;

use crate::config::DoctestConfig;
use crate::page::{PageError, RegistryHost, process_page};
use crate::registry::BlockRegistry;

/// File extensions treated as pages.
pub const PAGE_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Errors raised while running a build session
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("source directory '{}' does not exist", .path.display())]
    #[diagnostic(code(blockdoc::session::missing_source))]
    MissingSource { path: PathBuf },

    #[error("failed to read '{}': {source}", .path.display())]
    #[diagnostic(code(blockdoc::session::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pages '{}' and '{}' both map to id '{id}'", .first.display(), .second.display())]
    #[diagnostic(
        code(blockdoc::session::duplicate_page),
        help("rename one of the pages; ids ignore the file extension")
    )]
    DuplicatePage { id: String, first: PathBuf, second: PathBuf },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Page(#[from] PageError),

    #[error("page worker panicked")]
    #[diagnostic(code(blockdoc::session::worker_panicked))]
    WorkerPanicked,
}

/// A page on disk and its registry key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub path: PathBuf,
}

/// A page after its blocks were replaced by their visible renderings
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: Page,
    pub contents: String,
}

/// What one worker hands back to the session
struct ShardOutput {
    pages: Vec<String>,
    registry: BlockRegistry,
    rendered: Vec<RenderedPage>,
}

/// Owns the shared registry for one build.
pub struct BuildSession<'a> {
    config: &'a DoctestConfig,
    registry: BlockRegistry,
}

impl<'a> BuildSession<'a> {
    pub fn new(config: &'a DoctestConfig) -> Self {
        Self {
            config,
            registry: BlockRegistry::new(),
        }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> BlockRegistry {
        self.registry
    }

    /// Clear a page's entries ahead of reprocessing it.
    pub fn invalidate(&mut self, page: &str) {
        self.registry.reset(page);
    }

    /// Scan `pages` on up to `jobs` workers and merge their registries.
    ///
    /// ## Errors
    /// - The first failing page's error (read failure or malformed fence). Shards that finished
    ///   before it are merged; nothing from the failing shard is.
    #[tracing::instrument(skip_all, fields(pages = pages.len(), jobs = self.config.jobs))]
    pub fn process(&mut self, pages: &[Page]) -> Result<Vec<RenderedPage>, SessionError> {
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let jobs = self.config.jobs.max(1);
        let shard_size = pages.len().div_ceil(jobs);
        let filter = &self.config.languages;

        let outputs: Vec<Result<ShardOutput, SessionError>> = std::thread::scope(|s| {
            let handles: Vec<_> = pages
                .chunks(shard_size)
                .map(|shard| s.spawn(move || scan_shard(shard, filter)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or(Err(SessionError::WorkerPanicked)))
                .collect()
        });

        let mut rendered = Vec::with_capacity(pages.len());
        for output in outputs {
            let output = output?;
            self.registry.merge_from(&output.pages, &output.registry);
            rendered.extend(output.rendered);
        }

        tracing::info!(
            pages = rendered.len(),
            blocks = self.registry.block_count(),
            "pages processed"
        );
        Ok(rendered)
    }
}

/// Scan one shard of pages into a private registry.
fn scan_shard(shard: &[Page], filter: &LanguageFilter) -> Result<ShardOutput, SessionError> {
    let mut registry = BlockRegistry::new();
    let mut rendered = Vec::with_capacity(shard.len());

    for page in shard {
        let source = fs::read_to_string(&page.path).map_err(|source| SessionError::Io {
            path: page.path.clone(),
            source,
        })?;
        registry.reset(&page.id);
        let contents = process_page(&page.id, &source, filter, &mut RegistryHost::new(&mut registry))?;
        rendered.push(RenderedPage {
            page: page.clone(),
            contents,
        });
    }

    Ok(ShardOutput {
        pages: shard.iter().map(|p| p.id.clone()).collect(),
        registry,
        rendered,
    })
}

/// Find every page under `root`, sorted by path.
///
/// Hidden directories, `target`, `node_modules`, and the directories listed in `exclude` are skipped.
/// Symlinked pages are read; symlinked directories are not followed.
///
/// ## Errors
/// - [`SessionError::Io`] when a directory or one of its entries cannot be read.
/// - [`SessionError::DuplicatePage`] when two pages map to the same id (`intro.md` and `intro.markdown`).
pub fn discover_pages(root: &Path, exclude: &[PathBuf]) -> Result<Vec<Page>, SessionError> {
    if !root.exists() {
        return Err(SessionError::MissingSource {
            path: root.to_path_buf(),
        });
    }
    if root.is_file() {
        let id = root
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        return Ok(vec![Page {
            id,
            path: root.to_path_buf(),
        }]);
    }

    let mut files = Vec::new();
    collect_page_files(root, exclude, &mut files)?;
    files.sort();

    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut pages = Vec::with_capacity(files.len());
    for path in files {
        let id = page_id(root, &path);
        if let Some(first) = seen.get(&id) {
            return Err(SessionError::DuplicatePage {
                id,
                first: first.clone(),
                second: path,
            });
        }
        seen.insert(id.clone(), path.clone());
        pages.push(Page { id, path });
    }
    Ok(pages)
}

fn collect_page_files(dir: &Path, exclude: &[PathBuf], files: &mut Vec<PathBuf>) -> Result<(), SessionError> {
    let entries = fs::read_dir(dir).map_err(io_error(dir))?;

    for entry in entries {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error(&path))?;
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if file_type.is_dir() {
            let skipped = name.starts_with('.')
                || name == "target"
                || name == "node_modules"
                || exclude.iter().any(|excluded| excluded == &path);
            if !skipped {
                collect_page_files(&path, exclude, files)?;
            }
        } else if is_page_file(&path) {
            if file_type.is_symlink() && !fs::metadata(&path).map_err(io_error(&path))?.is_file() {
                tracing::debug!(path = %path.display(), "skipping symlink that is not a file");
                continue;
            }
            files.push(path);
        } else if file_type.is_symlink() {
            tracing::debug!(path = %path.display(), "not following symlink");
        }
    }
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SessionError {
    let path = path.to_path_buf();
    move |source| SessionError::Io { path, source }
}

fn is_page_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PAGE_EXTENSIONS.contains(&e))
}

/// Registry key for a page: its path relative to `root`, `/`-separated, extension stripped.
pub fn page_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id() {
        let root = Path::new("docs");
        assert_eq!(page_id(root, &root.join("index.md")), "index");
        assert_eq!(page_id(root, &root.join("guide").join("intro.md")), "guide/intro");
    }

    #[test]
    fn test_page_id_ignores_extension() {
        let root = Path::new("docs");
        assert_eq!(page_id(root, &root.join("intro.md")), page_id(root, &root.join("intro.markdown")));
    }

    #[test]
    fn test_missing_source() {
        let err = discover_pages(Path::new("definitely/not/here"), &[]).unwrap_err();
        assert!(matches!(err, SessionError::MissingSource { .. }));
    }

    #[test]
    fn test_process_no_pages() {
        let config = DoctestConfig::default();
        let mut session = BuildSession::new(&config);
        assert!(session.process(&[]).unwrap().is_empty());
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_invalidate_resets_page() {
        let config = DoctestConfig::default();
        let mut session = BuildSession::new(&config);
        session.invalidate("index");
        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.into_registry().block_count(), 0);
    }
}
