//! Doctest configuration for blockdoc

use blockdoc_core::LanguageFilter;

/// Configuration shared by the build session and the doctest emitter
#[derive(Debug, Clone)]
pub struct DoctestConfig {
    /// Language tags whose blocks are normalized
    pub languages: LanguageFilter,
    /// Prefix of every emitted test file name
    pub test_prefix: String,
    /// Suffix (extension) of every emitted test file name
    pub test_suffix: String,
    /// Spaces used to indent a test body under its definition line
    pub body_indent: usize,
    /// Whether `build` also writes doctests next to the sources
    pub write_doctests: bool,
    /// Directory (relative to the source root) that `build` writes doctests into
    pub doctest_dir: String,
    /// Number of page-scanning workers
    pub jobs: usize,
}

impl Default for DoctestConfig {
    fn default() -> Self {
        Self {
            languages: LanguageFilter::python(),
            test_prefix: "test_".to_string(),
            test_suffix: ".py".to_string(),
            body_indent: 4,
            write_doctests: true,
            doctest_dir: "_doctests".to_string(),
            jobs: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        }
    }
}

impl DoctestConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept blocks tagged `tag` in addition to the current languages
    pub fn with_language(mut self, tag: impl Into<String>) -> Self {
        self.languages = self.languages.with_tag(tag);
        self
    }

    /// Set the number of workers (at least one)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set whether `build` writes doctests
    pub fn with_write_doctests(mut self, write: bool) -> Self {
        self.write_doctests = write;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DoctestConfig::default();
        assert_eq!(config.test_prefix, "test_");
        assert_eq!(config.test_suffix, ".py");
        assert_eq!(config.body_indent, 4);
        assert_eq!(config.doctest_dir, "_doctests");
        assert!(config.write_doctests);
        assert!(config.jobs >= 1);
        assert!(config.languages.accepts("default"));
    }

    #[test]
    fn test_builder_chain() {
        let config = DoctestConfig::new()
            .with_language("pycon")
            .with_jobs(0)
            .with_write_doctests(false);

        assert!(config.languages.accepts("pycon"));
        assert!(config.languages.accepts("python"));
        assert_eq!(config.jobs, 1);
        assert!(!config.write_doctests);
    }
}
