//! Token-level helpers for [`crate::FileBuilder`]: enough lexing to split declaration headers and
//! type spellings, match brackets and skip comments. This is not a Java parser.

use crate::hir::Literal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Punct,
    Literal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Token<'t> {
    pub kind: TokenKind,
    pub text: &'t str,
    /// Absolute offsets into the file text.
    pub start: usize,
    pub end: usize,
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c == '$' || c == '_' || unicode_ident::is_xid_continue(c)
}

/// Offset of the first non-whitespace, non-comment character at or after `pos`.
pub(crate) fn skip_trivia(text: &str, mut pos: usize) -> usize {
    let bytes = text.as_bytes();
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if text[pos..].starts_with("//") {
            pos = text[pos..].find('\n').map_or(text.len(), |n| pos + n + 1);
        } else if text[pos..].starts_with("/*") {
            pos = text[pos + 2..].find("*/").map_or(text.len(), |n| pos + 2 + n + 2);
        } else {
            return pos;
        }
    }
}

/// End offset of a string or char literal starting at `pos` (which holds the quote).
fn quoted_end(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let quote = bytes[pos];
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Tokenize `text[start..end]`, producing absolute offsets.
pub(crate) fn tokenize(text: &str, start: usize, end: usize) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut pos = start;
    loop {
        pos = skip_trivia(text, pos);
        if pos >= end {
            break;
        }
        let c = text[pos..].chars().next().unwrap_or(' ');
        let (kind, token_end) = if is_ident_start(c) {
            let len = text[pos..]
                .find(|c: char| !is_ident_char(c))
                .unwrap_or(text.len() - pos);
            (TokenKind::Ident, pos + len)
        } else if c.is_ascii_digit() {
            let len = text[pos..]
                .find(|c: char| !(is_ident_char(c) || c == '.'))
                .unwrap_or(text.len() - pos);
            (TokenKind::Literal, pos + len)
        } else if c == '"' || c == '\'' {
            (TokenKind::Literal, quoted_end(text, pos))
        } else if text[pos..].starts_with("...") {
            (TokenKind::Punct, pos + 3)
        } else {
            (TokenKind::Punct, pos + c.len_utf8())
        };
        let token_end = token_end.min(end);
        out.push(Token {
            kind,
            text: &text[pos..token_end],
            start: pos,
            end: token_end,
        });
        pos = token_end;
    }
    out
}

/// Offset of the bracket closing the one at `open`, skipping nested brackets, literals and
/// comments.
pub(crate) fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => stack.push(bytes[i]),
            b')' | b']' | b'}' => {
                let expected = match bytes[i] {
                    b')' => b'(',
                    b']' => b'[',
                    _ => b'{',
                };
                if stack.pop() != Some(expected) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            b'"' | b'\'' => {
                i = quoted_end(text, i);
                continue;
            }
            b'/' if text[i..].starts_with("//") || text[i..].starts_with("/*") => {
                i = skip_trivia(text, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Offset of the bracket opening the one that closes at `close`.
pub(crate) fn matching_open(text: &str, close: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let (open_b, close_b) = match bytes.get(close)? {
        b')' => (b'(', b')'),
        b']' => (b'[', b']'),
        b'}' => (b'{', b'}'),
        _ => return None,
    };
    let mut depth = 0usize;
    let mut i = close + 1;
    while i > 0 {
        i -= 1;
        if bytes[i] == close_b {
            depth += 1;
        } else if bytes[i] == open_b {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Interpret the source spelling of a literal.
pub(crate) fn parse_literal(text: &str) -> Literal {
    let text = text.trim();
    match text {
        "true" => return Literal::Boolean(true),
        "false" => return Literal::Boolean(false),
        "null" => return Literal::Null,
        _ => {}
    }
    if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return Literal::String(unescape(inner));
    }
    if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return Literal::Char(unescape(inner).chars().next().unwrap_or('\0'));
    }

    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");
    if !is_hex && (lower.ends_with('f') || lower.ends_with('d') || lower.contains('.') || lower.contains('e')) {
        if let Some(digits) = lower.strip_suffix('f') {
            return Literal::Float(digits.parse().unwrap_or(0.0));
        }
        let digits = lower.strip_suffix('d').unwrap_or(&lower);
        return Literal::Double(digits.parse().unwrap_or(0.0));
    }
    let (digits, is_long) = match lower.strip_suffix('l') {
        Some(digits) => (digits, true),
        None => (lower.as_str(), false),
    };
    let value = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).unwrap_or(0)
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).unwrap_or(0)
    } else {
        digits.parse().unwrap_or(0)
    };
    if is_long {
        Literal::Long(value)
    } else {
        Literal::Int(value as i32)
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Sequential access over header tokens.
pub(crate) struct Cursor<'t> {
    tokens: Vec<Token<'t>>,
    pos: usize,
}

impl<'t> Cursor<'t> {
    pub(crate) fn new(tokens: Vec<Token<'t>>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Option<Token<'t>> {
        self.tokens.get(self.pos).copied()
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<Token<'t>> {
        self.tokens.get(self.pos + n).copied()
    }

    pub(crate) fn at(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text == text)
    }

    pub(crate) fn bump(&mut self) -> Option<Token<'t>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    pub(crate) fn eat(&mut self, text: &str) -> Option<Token<'t>> {
        if self.at(text) {
            self.bump()
        } else {
            None
        }
    }

    pub(crate) fn eat_ident(&mut self) -> Option<Token<'t>> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Ident => self.bump(),
            _ => None,
        }
    }

    /// Skip every token starting before `offset`.
    pub(crate) fn skip_to(&mut self, offset: usize) {
        while self.peek().is_some_and(|t| t.start < offset) {
            self.pos += 1;
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokens_skip_comments_and_keep_offsets() {
        let text = "List<String> /* c */ xs // trailing\n...";
        let tokens: Vec<&str> = tokenize(text, 0, text.len()).iter().map(|t| t.text).collect();
        assert_eq!(tokens, vec!["List", "<", "String", ">", "xs", "..."]);
    }

    #[test]
    fn identifiers_keep_combining_marks() {
        let text = "int e\u{301}x = caf\u{e9};";
        let tokens: Vec<&str> = tokenize(text, 0, text.len()).iter().map(|t| t.text).collect();
        assert_eq!(tokens, vec!["int", "e\u{301}x", "=", "caf\u{e9}", ";"]);
    }

    #[test]
    fn brackets_match_across_literals() {
        let text = "f(\")\", g(1)) + 1";
        assert_eq!(matching_close(text, 1), Some(11));

        let text = "f(a, g(1)) + 1";
        assert_eq!(matching_close(text, 1), Some(9));
        assert_eq!(matching_open(text, 9), Some(1));
    }

    #[test]
    fn literal_spellings() {
        assert_eq!(parse_literal("42"), Literal::Int(42));
        assert_eq!(parse_literal("0x1F"), Literal::Int(31));
        assert_eq!(parse_literal("10L"), Literal::Long(10));
        assert_eq!(parse_literal("1.5f"), Literal::Float(1.5));
        assert_eq!(parse_literal("2.0"), Literal::Double(2.0));
        assert_eq!(parse_literal("'\\n'"), Literal::Char('\n'));
        assert_eq!(parse_literal("\"hi\""), Literal::String("hi".into()));
    }
}
