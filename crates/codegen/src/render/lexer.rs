//! Template tokenizer
//!
//! Splits template text into literal runs and `{{ … }}` tags. Tags that do
//! not form one of the known constructs are kept as literal text, so the
//! lexer itself never fails.

use super::BlockKind;

/// A lexical token borrowed from the template source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text, including tags that are not constructs
    Text(&'a str),
    /// `{{name}}`
    Variable(&'a str),
    /// `{{first second}}`; `raw` is the whole tag for verbatim output
    Pair {
        first: &'a str,
        second: &'a str,
        raw: &'a str,
    },
    /// `{{#each name}}`, `{{#if name}}`, `{{#unless name}}`
    Open {
        kind: BlockKind,
        name: &'a str,
        offset: usize,
    },
    /// `{{/each}}`, `{{/if}}`, `{{/unless}}`
    Close { kind: BlockKind, offset: usize },
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Tokenize a template
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while cursor < source.len() {
        let Some(start) = source[cursor..].find(OPEN).map(|i| cursor + i) else {
            tokens.push(Token::Text(&source[cursor..]));
            break;
        };
        let Some(end) = source[start + OPEN.len()..]
            .find(CLOSE)
            .map(|i| start + OPEN.len() + i)
        else {
            tokens.push(Token::Text(&source[cursor..]));
            break;
        };

        if start > cursor {
            tokens.push(Token::Text(&source[cursor..start]));
        }

        let raw = &source[start..end + CLOSE.len()];
        let inner = source[start + OPEN.len()..end].trim();
        tokens.push(classify(inner, raw, start));
        cursor = end + CLOSE.len();
    }

    tokens
}

fn classify<'a>(inner: &'a str, raw: &'a str, offset: usize) -> Token<'a> {
    if let Some(rest) = inner.strip_prefix('#') {
        let (keyword, name) = split_word(rest);
        return match BlockKind::from_keyword(keyword) {
            Some(kind) if name.is_empty() || is_name(name) => Token::Open { kind, name, offset },
            _ => Token::Text(raw),
        };
    }

    if let Some(rest) = inner.strip_prefix('/') {
        return match BlockKind::from_keyword(rest.trim()) {
            Some(kind) => Token::Close { kind, offset },
            None => Token::Text(raw),
        };
    }

    let mut words = inner.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(name), None, None) if is_name(name) => Token::Variable(name),
        (Some(first), Some(second), None) if is_name(first) && is_name(second) => Token::Pair {
            first,
            second,
            raw,
        },
        _ => Token::Text(raw),
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim()),
        None => (s, ""),
    }
}

/// Names are identifiers optionally joined by dots (`user.email`)
pub(crate) fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '$' || c == '@')
        })
}
