//! Comment and blank-line stripping

use condense_core::CommentStyle;

#[derive(Debug, Default)]
struct Line {
    text: String,
    had_comment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Code,
    Str {
        quote: char,
        triple: bool,
        multiline: bool,
    },
    Block,
}

fn starts_with_at(chars: &[char], i: usize, pat: &str) -> bool {
    pat.chars()
        .enumerate()
        .all(|(k, p)| chars.get(i + k) == Some(&p))
}

/// Whether the quote at `i` is closed before the end of its line
fn closes_on_line(chars: &[char], i: usize, quote: char) -> bool {
    let mut j = i + 1;
    while j < chars.len() && chars[j] != '\n' {
        if chars[j] == '\\' {
            j += 2;
            continue;
        }
        if chars[j] == quote {
            return true;
        }
        j += 1;
    }
    false
}

/// Whether the `'` at `i` ends a word, as in `it's`. String prefixes such as
/// `r'..'` or `b'..'` still open a literal.
fn is_apostrophe(chars: &[char], i: usize) -> bool {
    let word: String = chars[..i]
        .iter()
        .rev()
        .take_while(|c| c.is_alphanumeric() || **c == '_')
        .collect::<String>()
        .to_lowercase();
    !word.is_empty()
        && !matches!(word.as_str(), "r" | "b" | "f" | "u" | "rb" | "br" | "rf" | "fr")
}

/// Split into lines with comments removed, remembering which lines lost one.
///
/// Quote-aware: markers inside string literals are kept. A `'` only opens a
/// literal when it closes on the same line and does not end a word, so Rust
/// lifetimes and apostrophes stay code.
fn remove_comments(text: &str, style: CommentStyle) -> Vec<Line> {
    if style == CommentStyle::Plain {
        return text
            .split('\n')
            .map(|l| Line {
                text: l.to_string(),
                had_comment: false,
            })
            .collect();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut lines = Vec::new();
    let mut current = Line::default();
    let mut state = State::Code;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            lines.push(std::mem::take(&mut current));
            match state {
                State::Block => current.had_comment = true,
                State::Str {
                    multiline: false, ..
                } => state = State::Code,
                _ => {}
            }
            i += 1;
            continue;
        }

        match state {
            State::Code => {
                let triple = ["\"\"\"", "'''"]
                    .into_iter()
                    .find(|t| style == CommentStyle::Hash && starts_with_at(&chars, i, t));
                if let Some(t) = triple {
                    current.text.push_str(t);
                    state = State::Str {
                        quote: c,
                        triple: true,
                        multiline: true,
                    };
                    i += 3;
                    continue;
                }

                let line_comment = match style {
                    CommentStyle::Hash => c == '#',
                    _ => starts_with_at(&chars, i, "//"),
                };
                if line_comment {
                    current.had_comment = true;
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                    continue;
                }

                if style == CommentStyle::CStyle && starts_with_at(&chars, i, "/*") {
                    current.had_comment = true;
                    state = State::Block;
                    i += 2;
                    continue;
                }

                let opens = match c {
                    '"' => Some(style == CommentStyle::CStyle),
                    '`' if style == CommentStyle::CStyle => Some(true),
                    '\'' if !is_apostrophe(&chars, i) && closes_on_line(&chars, i, '\'') => {
                        Some(false)
                    }
                    _ => None,
                };
                if let Some(multiline) = opens {
                    state = State::Str {
                        quote: c,
                        triple: false,
                        multiline,
                    };
                }
                current.text.push(c);
                i += 1;
            }
            State::Str { quote, triple, .. } => {
                if c == '\\' {
                    current.text.push(c);
                    if let Some(&next) = chars.get(i + 1).filter(|&&n| n != '\n') {
                        current.text.push(next);
                        i += 1;
                    }
                    i += 1;
                    continue;
                }
                if triple {
                    let closing: String = std::iter::repeat(quote).take(3).collect();
                    if starts_with_at(&chars, i, &closing) {
                        current.text.push_str(&closing);
                        state = State::Code;
                        i += 3;
                        continue;
                    }
                } else if c == quote {
                    state = State::Code;
                }
                current.text.push(c);
                i += 1;
            }
            State::Block => {
                if starts_with_at(&chars, i, "*/") {
                    state = State::Code;
                    i += 2;
                } else {
                    i += 1;
                }
            }
        }
    }
    lines.push(current);
    lines
}

/// Remove comments for `style`, drop lines emptied by that, trim trailing
/// whitespace and collapse runs of blank lines into one.
///
/// Never touches non-comment, non-blank content, so applying it twice
/// yields the same text.
pub fn strip(text: &str, style: CommentStyle) -> String {
    let mut out: Vec<&str> = Vec::new();
    let lines = remove_comments(text, style);
    let mut prev_blank = false;
    for line in &lines {
        let trimmed = line.text.trim_end();
        if trimmed.is_empty() {
            if line.had_comment || prev_blank {
                continue;
            }
            prev_blank = true;
        } else {
            prev_blank = false;
        }
        out.push(trimmed);
    }
    out.join("\n")
}
