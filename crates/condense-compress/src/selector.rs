//! Method selection for `auto` and content category sniffing

use regex::Regex;
use std::sync::OnceLock;

use condense_core::{CommentStyle, ContentCategory, Method};

use crate::summary::is_definition;

static CALL_RE: OnceLock<Regex> = OnceLock::new();

/// Resolve `auto` to a concrete method.
///
/// Precedence: a non-empty query selects `relevant`, then code-like content
/// selects `strip`, everything else `summary`. Concrete methods pass through.
pub fn select_method(method: Method, query: Option<&str>, category: ContentCategory) -> Method {
    if method != Method::Auto {
        return method;
    }
    if query.is_some_and(|q| !q.is_empty()) {
        Method::Relevant
    } else if category.is_code() {
        Method::Strip
    } else {
        Method::Summary
    }
}

fn looks_like_code(trimmed: &str) -> bool {
    let call_re = CALL_RE.get_or_init(|| Regex::new(r"\w\(.*\)\s*[;:{]?$").unwrap());
    is_definition(trimmed)
        || trimmed.ends_with('{')
        || trimmed.ends_with('}')
        || trimmed.ends_with(';')
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || call_re.is_match(trimmed)
}

/// Guess the category of text with no file extension.
///
/// Code-like when at least a third of the non-blank lines look like code.
/// `#` lines are not counted since markdown headings share the marker.
pub fn sniff_category(text: &str) -> ContentCategory {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return ContentCategory::Prose;
    }

    let code_lines = lines.iter().filter(|l| looks_like_code(l)).count();
    if code_lines * 3 < lines.len() {
        return ContentCategory::Prose;
    }

    let c_style = lines.iter().any(|l| {
        l.starts_with("//")
            || l.starts_with("/*")
            || l.ends_with(';')
            || l.ends_with('{')
            || l.ends_with('}')
    });
    if c_style {
        ContentCategory::Code(CommentStyle::CStyle)
    } else {
        ContentCategory::Code(CommentStyle::Hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: ContentCategory = ContentCategory::Code(CommentStyle::Hash);

    #[test]
    fn test_query_wins_over_category() {
        assert_eq!(select_method(Method::Auto, Some("auth"), CODE), Method::Relevant);
        assert_eq!(
            select_method(Method::Auto, Some("auth"), ContentCategory::Prose),
            Method::Relevant
        );
    }

    #[test]
    fn test_code_selects_strip() {
        assert_eq!(select_method(Method::Auto, None, CODE), Method::Strip);
        assert_eq!(select_method(Method::Auto, Some(""), CODE), Method::Strip);
    }

    #[test]
    fn test_prose_selects_summary() {
        assert_eq!(
            select_method(Method::Auto, None, ContentCategory::Prose),
            Method::Summary
        );
    }

    #[test]
    fn test_explicit_method_passes_through() {
        assert_eq!(select_method(Method::Summary, Some("q"), CODE), Method::Summary);
    }

    #[test]
    fn test_sniff_hash_code() {
        let text = "# comment\ncode()\n\n\n\nmore()";
        assert_eq!(sniff_category(text), ContentCategory::Code(CommentStyle::Hash));
    }

    #[test]
    fn test_sniff_c_style_code() {
        let text = "// entry\nint main() {\n  return 0;\n}";
        assert_eq!(sniff_category(text), ContentCategory::Code(CommentStyle::CStyle));
    }

    #[test]
    fn test_sniff_markdown_is_prose() {
        let text = "# Title\n\nSome words about the project.\nMore words here.";
        assert_eq!(sniff_category(text), ContentCategory::Prose);
        assert_eq!(sniff_category(""), ContentCategory::Prose);
    }
}
