//! Normalize one annotated block into its executable and visible renderings.
//!
//! ## Algorithm
//!
//! 1. **Common indentation.** Hidden lines are measured as if their `//` marker were two spaces, so a
//!    hidden line can be indented in step with its sibling code lines. Blank lines place no constraint.
//!    The minimum leading-space count is then removed from *every* line (markers included: the marker
//!    occupies indentation columns, so de-indenting may consume it).
//! 2. **Marker stripping.** Any line whose trimmed text still starts with `//` loses the marker and the
//!    whitespace run after it. Text before the marker is kept, so a nested hidden line keeps its
//!    block indentation.
//! 3. **Renderings.** The executable rendering joins every line. The visible rendering keeps only
//!    lines that were not hidden in the input and dedents that subset once more.
//!
//! ## Notes
//! - Only U+0020 counts as indentation. Tabs stop the leading-space count; their alignment with `//`
//!   markers is unspecified.
//! - Lines are never added or removed by the executable rendering.

use crate::HIDDEN_MARKER;
use crate::block::BlockText;

/// The two renderings of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    /// Code to run: every line, markers stripped, common indentation removed.
    pub executable: String,
    /// Code to show: hidden lines omitted, re-dedented.
    pub visible: String,
    /// 1-based line where the block began in its page.
    pub origin_line: usize,
}

/// One line after de-indentation and marker stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine {
    pub text: String,
    /// Visibility flag carried over from the input line.
    pub hidden: bool,
}

/// A block after steps 1 and 2, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBlock {
    lines: Vec<NormalizedLine>,
    origin_line: usize,
}

impl NormalizedBlock {
    pub fn lines(&self) -> &[NormalizedLine] {
        &self.lines
    }

    /// Join every line, hidden and visible alike.
    pub fn to_executable(&self) -> String {
        self.lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n")
    }

    /// Join the visible lines after a second dedent pass over just that subset.
    pub fn to_visible(&self) -> String {
        let visible: Vec<&str> = self.lines.iter().filter(|l| !l.hidden).map(|l| l.text.as_str()).collect();
        let indent = common_indent(visible.iter().copied());
        visible.iter().map(|l| dedent(l, indent)).collect::<Vec<_>>().join("\n")
    }

    pub fn into_rendering(self) -> Rendering {
        Rendering {
            executable: self.to_executable(),
            visible: self.to_visible(),
            origin_line: self.origin_line,
        }
    }
}

/// Normalize a block into both renderings.
pub fn normalize(block: &BlockText) -> Rendering {
    normalize_block(block).into_rendering()
}

/// Normalize raw lines into both renderings.
///
/// ## Parameters
/// - `lines`: the block's lines in source order.
/// - `origin_line`: 1-based line where the block begins (carried through for addressing only).
///
/// ## Examples
/// ```rust
/// use blockdoc_core::normalize_lines;
///
/// let rendering = normalize_lines(&["// import os", "print(os.sep)"], 1);
/// assert_eq!(rendering.executable, "import os\nprint(os.sep)");
/// assert_eq!(rendering.visible, "print(os.sep)");
/// ```
pub fn normalize_lines<S: AsRef<str>>(lines: &[S], origin_line: usize) -> Rendering {
    let block = BlockText::new(lines.iter().map(|l| l.as_ref()), origin_line);
    normalize(&block)
}

/// Apply steps 1 and 2 to a block, keeping per-line hidden flags.
pub fn normalize_block(block: &BlockText) -> NormalizedBlock {
    let masked: Vec<String> = block
        .lines()
        .iter()
        .zip(block.hidden())
        .map(|(line, &hidden)| if hidden { mask_hidden_marker(line) } else { line.clone() })
        .collect();
    let indent = common_indent(masked.iter().map(String::as_str));

    let lines = block
        .lines()
        .iter()
        .zip(block.hidden())
        .map(|(line, &hidden)| NormalizedLine {
            text: strip_hidden_marker(dedent(line, indent)),
            hidden,
        })
        .collect();

    NormalizedBlock {
        lines,
        origin_line: block.origin_line(),
    }
}

/// Count the spaces at the start of `s`.
///
/// ## Notes
/// - Only U+0020 is counted; `"  \tx"` has two leading spaces.
pub fn leading_spaces(s: &str) -> usize {
    s.len() - s.trim_start_matches(' ').len()
}

/// Return the minimum leading-space count over the non-blank lines.
///
/// ## Returns
/// - `usize`: the common indentation, or `0` when every line is blank (or there are no lines).
pub fn common_indent<'a, I>(lines: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .map(leading_spaces)
        .min()
        .unwrap_or(0)
}

/// Replace the first `//` of a line with two spaces, for indentation measurement.
pub fn mask_hidden_marker(line: &str) -> String {
    line.replacen(HIDDEN_MARKER, "  ", 1)
}

/// Remove a leading `//` marker and the whitespace that follows it.
///
/// ## Notes
/// - Lines whose trimmed text does not start with the marker are returned unchanged.
/// - Text before the marker (its indentation) is kept.
pub fn strip_hidden_marker(line: &str) -> String {
    if !line.trim().starts_with(HIDDEN_MARKER) {
        return line.to_string();
    }
    match line.split_once(HIDDEN_MARKER) {
        Some((before, after)) => format!("{}{}", before, after.trim_start()),
        None => line.to_string(),
    }
}

/// Drop the first `n` characters of a line; lines shorter than `n` become empty.
pub fn dedent(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Helper tests
    // ========================================

    #[test]
    fn test_leading_spaces() {
        assert_eq!(leading_spaces("     hi there"), 5);
        assert_eq!(leading_spaces("//     hi there"), 0);
        assert_eq!(leading_spaces("//     hi there     "), 0);
        assert_eq!(leading_spaces("  \t  hi there     "), 2);
        assert_eq!(leading_spaces(""), 0);
    }

    #[test]
    fn test_common_indent() {
        assert_eq!(common_indent(["foo", "  bar", "baz"]), 0);
        assert_eq!(common_indent(["  foo", "    bar", "  baz"]), 2);
    }

    #[test]
    fn test_common_indent_ignores_blank_lines() {
        assert_eq!(common_indent(["    a", "", "  ", "      b"]), 4);
    }

    #[test]
    fn test_common_indent_of_nothing_is_zero() {
        assert_eq!(common_indent(std::iter::empty::<&str>()), 0);
        assert_eq!(common_indent(["", "   "]), 0);
    }

    #[test]
    fn test_mask_hidden_marker() {
        assert_eq!(mask_hidden_marker("// import foo"), "   import foo");
        assert_eq!(mask_hidden_marker("   //x // y"), "     x // y");
    }

    #[test]
    fn test_strip_hidden_marker() {
        assert_eq!(strip_hidden_marker("//     foo.bar()"), "foo.bar()");
        assert_eq!(strip_hidden_marker("    // foo.bar()"), "    foo.bar()");
        assert_eq!(strip_hidden_marker("x = 1  // not a marker"), "x = 1  // not a marker");
        assert_eq!(strip_hidden_marker("//"), "");
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("    abc", 2), "  abc");
        assert_eq!(dedent("  ", 4), "");
        assert_eq!(dedent("", 3), "");
        assert_eq!(dedent("abc", 0), "abc");
    }

    // ========================================
    // Rendering tests
    // ========================================

    #[test]
    fn test_hidden_markers_at_column_zero() {
        let rendering = normalize_lines(
            &[
                "// import foo",
                "   for f in foo():",
                "       print(f)",
                "//     foo.bar()",
                "",
                "   os.exit()",
            ],
            1,
        );

        assert_eq!(
            rendering.executable,
            "import foo\nfor f in foo():\n    print(f)\n    foo.bar()\n\nos.exit()"
        );
        assert_eq!(rendering.visible, "for f in foo():\n    print(f)\n\nos.exit()");
    }

    #[test]
    fn test_hidden_marker_nested_in_block() {
        let rendering = normalize_lines(
            &[
                "// import foo",
                "for f in foo():",
                "    print(f)",
                "    // foo.bar()",
                "",
                "os.exit()",
            ],
            1,
        );

        assert_eq!(
            rendering.executable,
            "import foo\nfor f in foo():\n    print(f)\n    foo.bar()\n\nos.exit()"
        );
        assert_eq!(rendering.visible, "for f in foo():\n    print(f)\n\nos.exit()");
    }

    #[test]
    fn test_visible_is_redented_after_hiding() {
        let rendering = normalize_lines(
            &[
                "// import pytest",
                "// with pytest.raises(ValueError):",
                "       raise ValueError('This is helpful')",
                "       // print('This should not print')",
                "",
            ],
            1,
        );

        assert_eq!(
            rendering.executable,
            "import pytest\nwith pytest.raises(ValueError):\n    raise ValueError('This is helpful')\n    print('This should not print')\n"
        );
        assert_eq!(rendering.visible, "raise ValueError('This is helpful')\n");
    }

    #[test]
    fn test_all_hidden_block() {
        let rendering = normalize_lines(&["// import os", "// os.getcwd()"], 7);
        assert_eq!(rendering.executable, "import os\nos.getcwd()");
        assert_eq!(rendering.visible, "");
        assert_eq!(rendering.origin_line, 7);
    }

    #[test]
    fn test_empty_block() {
        let rendering = normalize_lines::<&str>(&[], 1);
        assert_eq!(rendering.executable, "");
        assert_eq!(rendering.visible, "");
    }

    #[test]
    fn test_blank_only_block() {
        let rendering = normalize_lines(&["", "   ", ""], 1);
        assert_eq!(rendering.executable, "\n   \n");
        assert_eq!(rendering.visible, "\n   \n");
    }

    #[test]
    fn test_short_blank_line_is_truncated() {
        let rendering = normalize_lines(&["        a", "  ", "        b"], 1);
        assert_eq!(rendering.executable, "a\n\nb");
    }

    #[test]
    fn test_no_hidden_lines_renderings_agree() {
        let rendering = normalize_lines(&["    def f():", "        return 1", "", "    f()"], 1);
        assert_eq!(rendering.executable, rendering.visible);
        assert_eq!(rendering.executable, "def f():\n    return 1\n\nf()");
    }

    #[test]
    fn test_normalize_block_keeps_flags() {
        let block = BlockText::new(["// a", "b"], 1);
        let normalized = normalize_block(&block);
        let flags: Vec<bool> = normalized.lines().iter().map(|l| l.hidden).collect();
        assert_eq!(flags, vec![true, false]);
        assert_eq!(normalized.lines()[0].text, "a");
    }

    #[test]
    fn test_trailing_comment_is_not_hidden() {
        let rendering = normalize_lines(&["x = 1  // keep", "y = 2"], 1);
        assert_eq!(rendering.visible, "x = 1  // keep\ny = 2");
    }
}
