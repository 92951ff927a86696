//! String/comment-aware delimiter scanning.
//!
//! The source format is free-form JS-like text, so delimiters inside string
//! literals (three quote styles, with backslash escapes) and inside line or
//! block comments must never affect balancing.

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Normal,
    LineComment,
    BlockComment,
    Str { quote: char, escaped: bool },
}

/// Advance the state machine by one character. Returns the next state and
/// whether the following character was consumed as part of a two-character
/// token (`//`, `/*`, `*/`).
fn step(state: State, c: char, next: Option<char>) -> (State, bool) {
    match state {
        State::Normal => match c {
            '/' if next == Some('/') => (State::LineComment, true),
            '/' if next == Some('*') => (State::BlockComment, true),
            '\'' | '"' | '`' => (
                State::Str {
                    quote: c,
                    escaped: false,
                },
                false,
            ),
            _ => (State::Normal, false),
        },
        State::LineComment => {
            if c == '\n' {
                (State::Normal, false)
            } else {
                (State::LineComment, false)
            }
        }
        State::BlockComment => {
            if c == '*' && next == Some('/') {
                (State::Normal, true)
            } else {
                (State::BlockComment, false)
            }
        }
        State::Str { quote, escaped } => {
            if escaped {
                (
                    State::Str {
                        quote,
                        escaped: false,
                    },
                    false,
                )
            } else if c == '\\' {
                (
                    State::Str {
                        quote,
                        escaped: true,
                    },
                    false,
                )
            } else if c == quote {
                (State::Normal, false)
            } else {
                (State::Str { quote, escaped }, false)
            }
        }
    }
}

/// Find the byte index of the delimiter matching `open` at `open_index`.
///
/// Scans forward with a depth counter seeded at 1; characters inside strings
/// and comments never affect depth. Returns `None` when the text ends before
/// the balance returns to zero (malformed input, reported by the caller).
pub fn match_delimiter(text: &str, open_index: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 1i32;
    let mut state = State::Normal;
    let after_open = open_index + open.len_utf8();
    let mut chars = text[after_open..].char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let next = chars.peek().map(|&(_, ch)| ch);
        let (new_state, consumed_next) = step(state, c, next);

        if state == State::Normal && new_state == State::Normal && !consumed_next {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Some(after_open + offset);
                }
            }
        }

        state = new_state;
        if consumed_next {
            chars.next();
        }
    }

    None
}

/// Split a delimited body into its top-level comma-separated segments.
///
/// A comma splits only at bracket/brace/paren depth zero and outside strings
/// and comments. Segments are trimmed; empty segments are dropped, so a
/// trailing comma is tolerated.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut state = State::Normal;
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        let next = chars.peek().map(|&(_, ch)| ch);
        let (new_state, consumed_next) = step(state, c, next);

        if state == State::Normal && new_state == State::Normal && !consumed_next {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                ',' if depth == 0 => {
                    let segment = text[start..index].trim();
                    if !segment.is_empty() {
                        segments.push(segment);
                    }
                    start = index + 1;
                }
                _ => {}
            }
        }

        state = new_state;
        if consumed_next {
            chars.next();
        }
    }

    let segment = text[start..].trim();
    if !segment.is_empty() {
        segments.push(segment);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_simple() {
        let text = "f(a, (b), c)";
        assert_eq!(match_delimiter(text, 1, '(', ')'), Some(11));
    }

    #[test]
    fn test_match_ignores_strings() {
        // The unmatched parens and the escaped quote inside the literal
        // must not affect balancing.
        let text = r#"f('it\'s ))((', x)"#;
        assert_eq!(match_delimiter(text, 1, '(', ')'), Some(text.len() - 1));
    }

    #[test]
    fn test_match_ignores_comments() {
        let text = "f(a, // )\n b, /* ) */ c)";
        assert_eq!(match_delimiter(text, 1, '(', ')'), Some(text.len() - 1));
    }

    #[test]
    fn test_match_unbalanced_is_none() {
        assert_eq!(match_delimiter("f(a, (b)", 1, '(', ')'), None);
    }

    #[test]
    fn test_match_template_quotes() {
        let text = "f(`)`, a)";
        assert_eq!(match_delimiter(text, 1, '(', ')'), Some(text.len() - 1));
    }

    #[test]
    fn test_split_keeps_nested_commas() {
        let segments = split_top_level("a: f(1,2), b: g({x:1,y:2})");
        assert_eq!(segments, vec!["a: f(1,2)", "b: g({x:1,y:2})"]);
    }

    #[test]
    fn test_split_trailing_comma() {
        let segments = split_top_level("a: integer('a'),\n b: text('b'),\n");
        assert_eq!(segments, vec!["a: integer('a')", "b: text('b')"]);
    }

    #[test]
    fn test_split_comma_in_string() {
        let segments = split_top_level("a: varchar('x,y'), b: text('b')");
        assert_eq!(segments, vec!["a: varchar('x,y')", "b: text('b')"]);
    }

    #[test]
    fn test_split_comma_in_comment() {
        // the comma inside the comment does not split; the comment text
        // itself stays in the segment
        let segments = split_top_level("a: integer('a'), // one, two\nb: text('b')");
        assert_eq!(segments.len(), 2);
        assert!(segments[1].ends_with("b: text('b')"));
    }
}
