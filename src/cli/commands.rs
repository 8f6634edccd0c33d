//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use blockdoc_core::{BlockText, normalize};

use super::{CliError, CliResult, ExitCode, Show};
use crate::config::DoctestConfig;
use crate::emit::DoctestWriter;
use crate::registry::BlockRegistry;
use crate::session::{BuildSession, RenderedPage, discover_pages};

/// Default output directory for rewritten pages, relative to the source root.
const BUILD_DIR: &str = "_build";

/// Maximum size of a block read by `normalize` (10 MB)
const MAX_BLOCK_SIZE: u64 = 10 * 1024 * 1024;

/// Rewrite every page under `src` into `out` and, unless disabled, write doctests.
pub fn build(src: &Path, out: Option<&Path>, config: &DoctestConfig) -> CliResult<ExitCode> {
    let out = out.map(Path::to_path_buf).unwrap_or_else(|| source_root(src).join(BUILD_DIR));
    let (rendered, registry) = scan(src, &out, config)?;

    for page in &rendered {
        let target = out.join(relative_to_root(src, &page.page.path));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CliError::failure(format!("Error creating '{}': {}", parent.display(), e)))?;
        }
        fs::write(&target, &page.contents)
            .map_err(|e| CliError::failure(format!("Error writing '{}': {}", target.display(), e)))?;
    }
    println!("rendered {} page(s) into {}", rendered.len(), out.display());

    if config.write_doctests {
        let doctest_dir = source_root(src).join(&config.doctest_dir);
        emit(&doctest_dir, &registry, config)?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Write doctests for every page under `src` into `out` (default `src/_doctests`).
pub fn write_doctests(src: &Path, out: Option<&Path>, config: &DoctestConfig) -> CliResult<ExitCode> {
    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| source_root(src).join(&config.doctest_dir));
    let (_, registry) = scan(src, &out, config)?;
    emit(&out, &registry, config)?;
    Ok(ExitCode::SUCCESS)
}

/// Normalize one block from `file` (or stdin) and print the requested renderings.
pub fn normalize_file(file: Option<&Path>, line: usize, show: Show) -> CliResult<ExitCode> {
    let text = match file {
        Some(path) => read_block(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::failure(format!("Error reading stdin: {}", e)))?;
            buf
        }
    };

    let rendering = normalize(&BlockText::from_text(&text, line));
    match show {
        Show::Executable => println!("{}", rendering.executable),
        Show::Visible => println!("{}", rendering.visible),
        Show::Both => {
            println!("--- executable (line {}) ---", rendering.origin_line);
            println!("{}", rendering.executable);
            println!("--- visible ---");
            println!("{}", rendering.visible);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Discover and scan pages, keeping output directories out of discovery.
fn scan(src: &Path, out: &Path, config: &DoctestConfig) -> CliResult<(Vec<RenderedPage>, BlockRegistry)> {
    let exclude = excluded_dirs(src, out, config);
    let pages = discover_pages(src, &exclude).map_err(CliError::diagnostic)?;
    if pages.is_empty() {
        tracing::warn!("no pages found under {}", src.display());
    }
    tracing::debug!(
        pages = pages.len(),
        languages = ?config.languages.tags().collect::<Vec<_>>(),
        "scanning"
    );

    let mut session = BuildSession::new(config);
    let rendered = session.process(&pages).map_err(CliError::diagnostic)?;
    Ok((rendered, session.into_registry()))
}

/// Output directories that lie inside `src`, spelled the way discovery walks them (`src/...`).
///
/// `out` is compared as a path, so an output directory elsewhere never hides a same-named
/// directory of the sources.
fn excluded_dirs(src: &Path, out: &Path, config: &DoctestConfig) -> Vec<PathBuf> {
    let root = source_root(src);
    let mut exclude = vec![root.join(&config.doctest_dir), root.join(BUILD_DIR)];

    let inside = match (root.canonicalize(), out.canonicalize()) {
        (Ok(root_abs), Ok(out_abs)) => out_abs.strip_prefix(&root_abs).ok().map(|rel| root.join(rel)),
        _ => out.strip_prefix(&root).ok().map(|_| out.to_path_buf()),
    };
    if let Some(dir) = inside {
        if !exclude.contains(&dir) {
            exclude.push(dir);
        }
    }
    exclude
}

fn emit(out: &Path, registry: &BlockRegistry, config: &DoctestConfig) -> CliResult<()> {
    let emitted = DoctestWriter::new(out, config)
        .write(registry)
        .map_err(CliError::diagnostic)?;
    println!("wrote {} doctest(s) into {}", emitted.len(), out.display());
    Ok(())
}

/// Directory that relative outputs hang off: `src` itself, or a single page's parent.
fn source_root(src: &Path) -> PathBuf {
    if src.is_file() {
        src.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        src.to_path_buf()
    }
}

fn relative_to_root(src: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(source_root(src))
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default())
}

fn read_block(path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;

    if metadata.len() > MAX_BLOCK_SIZE {
        return Err(CliError::failure(format!(
            "Block file '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_BLOCK_SIZE
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", path.display(), e)))
}
