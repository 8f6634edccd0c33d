//! Language-tag vocabulary registry.
//!
//! This module centralizes recognized code-block language spellings so the page scanner doesn't need
//! stringly-typed comparisons.
//!
//! ## Notes
//! - `default` is the tag given to a block that declares no language. It means "infer as the primary
//!   language" and is accepted by the python filter.
//! - Classification is a pure predicate kept outside normalization: the normalizer never sees a
//!   rejected block.

use std::collections::BTreeSet;

/// Stable identifier for recognized block languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    /// No explicit tag; inferred as the primary language.
    Default,
    Python,
}

/// Metadata entry for a language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    pub id: LanguageId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

/// Tag assigned to blocks that carry no language of their own.
pub const DEFAULT_TAG: &str = "default";

/// Registry of recognized languages.
pub const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo {
        id: LanguageId::Default,
        canonical: DEFAULT_TAG,
        aliases: &[],
        description: "Untagged block; inferred as the primary language.",
    },
    LanguageInfo {
        id: LanguageId::Python,
        canonical: "python",
        aliases: &["py", "py3", "python3"],
        description: "Python source.",
    },
];

/// Resolve a tag to its stable id.
pub fn from_str(tag: &str) -> Option<LanguageId> {
    LANGUAGES
        .iter()
        .find(|l| l.canonical == tag || l.aliases.contains(&tag))
        .map(|l| l.id)
}

/// Return the canonical spelling for a language id.
pub fn as_str(id: LanguageId) -> &'static str {
    info_for(id).canonical
}

/// Return the registry entry for a language id.
pub fn info_for(id: LanguageId) -> &'static LanguageInfo {
    match id {
        LanguageId::Default => &LANGUAGES[0],
        LanguageId::Python => &LANGUAGES[1],
    }
}

/// Normalize a fence info string into a language tag.
///
/// ## Parameters
/// - `info`: the text after the opening fence (may be empty, may carry attributes after the tag).
///
/// ## Returns
/// - `&str`: the first word of `info`, or [`DEFAULT_TAG`] when `info` is blank. Braced attribute
///   forms like `{.python}` are unwrapped.
pub fn tag_of(info: &str) -> &str {
    let word = info.split_whitespace().next().unwrap_or("");
    let word = word.trim_start_matches('{').trim_start_matches('.').trim_end_matches('}');
    let word = word.split(',').next().unwrap_or("");
    if word.is_empty() { DEFAULT_TAG } else { word }
}

/// Predicate over the set of accepted language tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFilter {
    tags: BTreeSet<String>,
}

impl LanguageFilter {
    /// Accept nothing.
    pub fn empty() -> Self {
        Self { tags: BTreeSet::new() }
    }

    /// Accept every spelling of python plus [`DEFAULT_TAG`].
    pub fn python() -> Self {
        let mut filter = Self::empty();
        for id in [LanguageId::Default, LanguageId::Python] {
            filter = filter.with_language(id);
        }
        filter
    }

    /// Add the canonical spelling and all aliases of a registered language.
    pub fn with_language(mut self, id: LanguageId) -> Self {
        let info = info_for(id);
        self.tags.insert(info.canonical.to_string());
        self.tags.extend(info.aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Add a tag verbatim. Registered spellings pull in their whole alias family.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if let Some(id) = from_str(&tag) {
            return self.with_language(id);
        }
        self.tags.insert(tag);
        self
    }

    /// Check whether blocks tagged `tag` should be normalized.
    pub fn accepts(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Iterate accepted tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl Default for LanguageFilter {
    fn default() -> Self {
        Self::python()
    }
}
