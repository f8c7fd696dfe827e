//! Structural summaries: definitions for code, short paragraphs for prose

use regex::Regex;
use std::sync::OnceLock;

use condense_core::{Config, ContentCategory};

static DEFINITION_RE: OnceLock<Regex> = OnceLock::new();
static METHOD_SIG_RE: OnceLock<Regex> = OnceLock::new();
static ARROW_FN_RE: OnceLock<Regex> = OnceLock::new();

/// Function, class, type or method signature line
pub(crate) fn is_definition(line: &str) -> bool {
    let definition_re = DEFINITION_RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?:(?:pub(?:\([^)]*\))?|export|default|async|static|unsafe|const|extern|abstract|final)\s+)*(?:def|class|fn|function|struct|enum|trait|impl|interface|func|type|mod)\b",
        )
        .unwrap()
    });
    let method_sig_re = METHOD_SIG_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:public|private|protected)\s+(?:[\w<>\[\],.?]+\s+)+\w+\s*\(").unwrap()
    });
    let arrow_fn_re = ARROW_FN_RE.get_or_init(|| {
        Regex::new(r"^\s*(?:export\s+)?(?:const|let|var)\s+\w+\s*=\s*(?:async\s+)?(?:\([^)]*\)|\w+)\s*=>")
            .unwrap()
    });
    definition_re.is_match(line) || method_sig_re.is_match(line) || arrow_fn_re.is_match(line)
}

fn is_leading_doc(line: &str) -> bool {
    let t = line.trim();
    t.starts_with("///")
        || t.starts_with("//!")
        || t.starts_with("/**")
        || t.starts_with("* ")
        || t == "*"
        || t == "*/"
}

fn docstring_delimiter(line: &str) -> Option<&'static str> {
    let t = line.trim_start();
    ["\"\"\"", "'''"].into_iter().find(|d| t.starts_with(d))
}

/// Keep definition lines, the doc comments right above them and the
/// docstring right below them.
pub fn summarize_code(text: &str, fallback_lines: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut keep = vec![false; lines.len()];

    for i in 0..lines.len() {
        if !is_definition(lines[i]) {
            continue;
        }
        keep[i] = true;

        let mut j = i;
        while j > 0 && is_leading_doc(lines[j - 1]) {
            j -= 1;
            keep[j] = true;
        }

        let Some(delim) = lines.get(i + 1).and_then(|l| docstring_delimiter(l)) else {
            continue;
        };
        keep[i + 1] = true;
        if lines[i + 1].matches(delim).count() >= 2 {
            continue;
        }
        for k in i + 2..lines.len() {
            keep[k] = true;
            if lines[k].contains(delim) {
                break;
            }
        }
    }

    if !keep.contains(&true) {
        return lines[..fallback_lines.min(lines.len())].join("\n");
    }

    lines
        .iter()
        .zip(&keep)
        .filter(|(_, &k)| k)
        .map(|(l, _)| *l)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs of non-blank lines; blank means whitespace-only
fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paras: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paras.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paras.push(current);
    }
    paras
}

/// Keep the first paragraph and every later paragraph shorter than
/// `short_lines` lines (headers, key points).
pub fn summarize_prose(text: &str, short_lines: usize) -> String {
    paragraphs(text)
        .into_iter()
        .enumerate()
        .filter(|(i, p)| *i == 0 || p.len() < short_lines)
        .map(|(_, p)| p.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn summarize(text: &str, category: ContentCategory, config: &Config) -> String {
    if category.is_code() {
        summarize_code(text, config.summary_fallback_lines)
    } else {
        summarize_prose(text, config.short_paragraph_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_definition() {
        assert!(is_definition("def login(user):"));
        assert!(is_definition("    async def fetch(self):"));
        assert!(is_definition("pub(crate) fn parse(input: &str) -> Turns {"));
        assert!(is_definition("export default class App {"));
        assert!(is_definition("  public static void main(String[] args) {"));
        assert!(is_definition("const handler = async (req) => {"));
        assert!(!is_definition("    return define(x)"));
        assert!(!is_definition("const LIMIT = 5;"));
    }

    #[test]
    fn test_python_structure_with_docstrings() {
        let src = r#"import os

class Auth:
    """Handles login."""

    def login(self, user):
        """
        Log a user in.
        """
        token = make_token(user)
        return token
"#;
        let out = summarize_code(src, 20);
        assert_eq!(
            out,
            "class Auth:\n    \"\"\"Handles login.\"\"\"\n    def login(self, user):\n        \"\"\"\n        Log a user in.\n        \"\"\""
        );
    }

    #[test]
    fn test_rust_doc_comments_kept_above_definition() {
        let src = "use std::fs;\n\n/// Reads config.\n/// Returns defaults on error.\npub fn read() -> Config {\n    Config::default()\n}\n";
        let out = summarize_code(src, 20);
        assert_eq!(
            out,
            "/// Reads config.\n/// Returns defaults on error.\npub fn read() -> Config {"
        );
    }

    #[test]
    fn test_code_without_definitions_falls_back_to_head() {
        let src = "a = 1\nb = 2\nc = 3";
        assert_eq!(summarize_code(src, 2), "a = 1\nb = 2");
    }

    #[test]
    fn test_prose_keeps_first_and_short_paragraphs() {
        let text = "Intro line one.\nIntro line two.\nIntro line three.\n\n## Setup\n\nLong one.\nLong two.\nLong three.\n\n\n\nKey point.";
        let out = summarize_prose(text, 3);
        assert_eq!(
            out,
            "Intro line one.\nIntro line two.\nIntro line three.\n\n## Setup\n\nKey point."
        );
    }

    #[test]
    fn test_prose_whitespace_only_lines_split_paragraphs() {
        let text = "first\n   \nsecond";
        assert_eq!(summarize_prose(text, 3), "first\n\nsecond");
    }

    #[test]
    fn test_summary_never_grows() {
        let samples = [
            "",
            "\n\n\n",
            "one paragraph only",
            "a\n\nb\nc\nd\n\ne",
            "def f():\n  '''doc\n  more'''\n  pass",
            "x = 1\n\n\n\ny = 2",
        ];
        let config = Config::new();
        for sample in samples {
            for category in [
                ContentCategory::Prose,
                ContentCategory::Code(condense_core::CommentStyle::Hash),
            ] {
                let out = summarize(sample, category, &config);
                assert!(
                    out.chars().count() <= sample.chars().count(),
                    "grew on {:?}",
                    sample
                );
            }
        }
    }
}
