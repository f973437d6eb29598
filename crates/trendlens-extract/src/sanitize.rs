//! Markup sanitization before prompt embedding.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?</script>").expect("valid script regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style.*?</style>").expect("valid style regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Character budget for sanitized markup, bounding prompt size.
pub const MAX_MARKUP_CHARS: usize = 180_000;

/// Strip script/style/comment blocks, collapse whitespace runs to single
/// spaces, and truncate to [`MAX_MARKUP_CHARS`]. Total: always returns a
/// string, possibly empty.
#[must_use]
pub fn sanitize_markup(raw: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(raw, " ");
    let without_styles = STYLE_RE.replace_all(&without_scripts, " ");
    let without_comments = COMMENT_RE.replace_all(&without_styles, " ");
    let collapsed = WHITESPACE_RE.replace_all(&without_comments, " ");

    truncate_chars(collapsed.trim(), MAX_MARKUP_CHARS)
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_blocks_case_insensitively() {
        let raw = "<p>antes</p><SCRIPT>var x = 1;\nalert(x);</SCRIPT><p>después</p>";
        let clean = sanitize_markup(raw);
        assert!(!clean.contains("alert"));
        assert!(clean.contains("antes"));
        assert!(clean.contains("después"));
    }

    #[test]
    fn strips_style_and_comment_blocks() {
        let raw = "<style>.a { color: red; }</style><!-- oculto\nmultilinea --><div>visible</div>";
        let clean = sanitize_markup(raw);
        assert!(!clean.contains("color"));
        assert!(!clean.contains("oculto"));
        assert!(clean.contains("visible"));
    }

    #[test]
    fn collapses_whitespace_runs() {
        let clean = sanitize_markup("a\n\n  b\t\tc");
        assert_eq!(clean, "a b c");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(sanitize_markup(""), "");
    }

    #[test]
    fn truncates_to_the_character_budget() {
        let raw = "x".repeat(MAX_MARKUP_CHARS + 500);
        let clean = sanitize_markup(&raw);
        assert_eq!(clean.chars().count(), MAX_MARKUP_CHARS);
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let truncated = truncate_chars(&"ñ".repeat(10), 3);
        assert_eq!(truncated, "ñññ");
    }
}
