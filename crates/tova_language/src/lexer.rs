//! Single-pass lexer for Tova source text.
//!
//! The lexer never fails: malformed input (unterminated strings, bad numbers)
//! becomes an [`TokenKind::Error`] token and lexing continues, so the parser
//! can still produce a partial AST and the language server still gets
//! positions for everything after the problem.
//!
//! Two pieces of context-sensitivity live here:
//!
//! - **Regex vs division.** A `/` starts a regex literal only when the
//!   previous non-newline token permits an expression to begin (line start,
//!   `=`, `(`, `[`, `{`, `,`, `:`, `;`, an operator, a comparison, or one of
//!   the expression-introducing keywords). After an identifier, literal, or
//!   closing bracket, `/` is division.
//! - **Template interpolation.** `"a {x + 1} b"` is emitted as one
//!   [`TokenKind::Template`] token whose parts alternate literal text and
//!   pre-tokenized expressions. Interpolations are lexed by a nested lexer so
//!   their spans stay absolute.
//!
//! Newlines are real tokens, and every token records whether it is the first
//! on its line; the parser uses both for statement termination and for the
//! `[`/`?` disambiguation rules.
//!
//! Comments run from `#` to end of line and are dropped.

use tova_base::Span;

use crate::token::{keyword_kind, TemplatePart, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    /// Byte offset added to every span (non-zero for interpolation sub-lexers).
    offset: usize,
    tokens: Vec<Token>,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::at(source, 0, 1, 1)
    }

    /// A lexer for a slice of a larger file, producing absolute spans. The
    /// parser uses this to re-enter the token stream after consuming raw JSX
    /// text or CSS at the byte level.
    pub(crate) fn at(source: &'a str, offset: usize, line: u32, col: u32) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line,
            col,
            offset,
            tokens: Vec::new(),
            at_line_start: true,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        while self.pos < self.bytes.len() {
            self.next_token();
        }
        let span = self.span_here(0);
        self.push(TokenKind::Eof, "", span);
        self.tokens
    }

    // ── Cursor helpers ──────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let rest = &self.source[self.pos..];
        let c = rest.chars().next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn span_here(&self, len: usize) -> Span {
        Span::new(
            self.offset + self.pos,
            self.offset + self.pos + len,
            self.line,
            self.col,
        )
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>, span: Span) {
        let mut tok = Token::new(kind, lexeme, span);
        if !matches!(tok.kind, TokenKind::Newline) {
            tok.first_on_line = self.at_line_start;
            self.at_line_start = false;
        }
        self.tokens.push(tok);
    }

    /// The last emitted token that is not a newline.
    fn last_significant(&self) -> Option<&TokenKind> {
        self.tokens
            .iter()
            .rev()
            .find(|t| !matches!(t.kind, TokenKind::Newline))
            .map(|t| &t.kind)
    }

    /// Whether a `/` at the current position begins a regex literal.
    fn regex_allowed(&self) -> bool {
        if self.at_line_start {
            return true;
        }
        match self.last_significant() {
            None => true,
            Some(kind) => matches!(
                kind,
                TokenKind::Eq
                    | TokenKind::PlusEq
                    | TokenKind::MinusEq
                    | TokenKind::StarEq
                    | TokenKind::SlashEq
                    | TokenKind::LParen
                    | TokenKind::LBracket
                    | TokenKind::LBrace
                    | TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::ColonColon
                    | TokenKind::Semicolon
                    | TokenKind::Question
                    | TokenKind::QuestionQuestion
                    | TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Star
                    | TokenKind::Slash
                    | TokenKind::Percent
                    | TokenKind::StarStar
                    | TokenKind::EqEq
                    | TokenKind::NotEq
                    | TokenKind::Lt
                    | TokenKind::LtEq
                    | TokenKind::Gt
                    | TokenKind::GtEq
                    | TokenKind::PipeGt
                    | TokenKind::Arrow
                    | TokenKind::FatArrow
                    | TokenKind::DotDot
                    | TokenKind::DotDotEq
                    | TokenKind::If
                    | TokenKind::Elif
                    | TokenKind::Else
                    | TokenKind::For
                    | TokenKind::While
                    | TokenKind::Return
                    | TokenKind::Match
                    | TokenKind::In
                    | TokenKind::And
                    | TokenKind::Or
                    | TokenKind::Not
            ),
        }
    }

    // ── Main dispatch ───────────────────────────────────────────────────

    fn next_token(&mut self) {
        let c = match self.peek() {
            Some(c) => c,
            None => return,
        };

        match c {
            b' ' | b'\t' => {
                self.bump();
            }
            b'#' => {
                while let Some(c) = self.peek() {
                    if c == b'\n' {
                        break;
                    }
                    self.bump();
                }
            }
            b'\n' => {
                let span = self.span_here(1);
                self.bump();
                self.push(TokenKind::Newline, "\n", span);
                self.at_line_start = true;
            }
            b'0'..=b'9' => self.scan_number(),
            b'"' | b'\'' | b'`' => self.scan_string(c as char),
            b'/' if self.regex_allowed() => self.scan_regex(),
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.scan_word(),
            _ => self.scan_operator(),
        }
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        let span_start = self.span_here(0);
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.bump();
            } else {
                break;
            }
        }
        let word = &self.source[start..self.pos];
        let span = Span::new(
            span_start.start,
            self.offset + self.pos,
            span_start.line,
            span_start.column,
        );
        match keyword_kind(word) {
            Some(kind) => self.push(kind, word.to_string(), span),
            None => self.push(TokenKind::Ident(word.to_string()), word.to_string(), span),
        }
    }

    // ── Numbers ─────────────────────────────────────────────────────────

    fn scan_number(&mut self) {
        let start = self.pos;
        let span_start = self.span_here(0);

        if self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B'))
        {
            self.bump();
            let radix = match self.bump() {
                Some('x') | Some('X') => 16,
                Some('o') | Some('O') => 8,
                _ => 2,
            };
            while let Some(c) = self.peek() {
                if (c as char).is_ascii_alphanumeric() || c == b'_' {
                    self.bump();
                } else {
                    break;
                }
            }
            let raw = &self.source[start..self.pos];
            let digits: String = raw[2..].chars().filter(|&c| c != '_').collect();
            let span = self.span_from(span_start, start);
            match i64::from_str_radix(&digits, radix) {
                Ok(v) => self.push(TokenKind::Int(v), raw.to_string(), span),
                Err(_) => self.push(
                    TokenKind::Error(format!("Invalid number literal '{}'", raw)),
                    raw.to_string(),
                    span,
                ),
            }
            return;
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == b'_' {
                self.bump();
            } else {
                break;
            }
        }
        // A `.` continues the number only when followed by a digit; `1..5` is
        // a range and `1.floor()` is a method call.
        if self.peek() == Some(b'.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() || c == b'_' {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut ahead = 1;
            if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                ahead = 2;
            }
            if self.peek_at(ahead).map_or(false, |c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..ahead {
                    self.bump();
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }

        let raw = &self.source[start..self.pos];
        let digits: String = raw.chars().filter(|&c| c != '_').collect();
        let span = self.span_from(span_start, start);
        if is_float {
            match digits.parse::<f64>() {
                Ok(v) => self.push(TokenKind::Float(v), raw.to_string(), span),
                Err(_) => self.push(
                    TokenKind::Error(format!("Invalid number literal '{}'", raw)),
                    raw.to_string(),
                    span,
                ),
            }
        } else {
            match digits.parse::<i64>() {
                Ok(v) => self.push(TokenKind::Int(v), raw.to_string(), span),
                Err(_) => self.push(
                    TokenKind::Error(format!("Invalid number literal '{}'", raw)),
                    raw.to_string(),
                    span,
                ),
            }
        }
    }

    fn span_from(&self, start_span: Span, start_pos: usize) -> Span {
        Span::new(
            self.offset + start_pos,
            self.offset + self.pos,
            start_span.line,
            start_span.column,
        )
    }

    // ── Strings and templates ───────────────────────────────────────────

    fn scan_string(&mut self, quote: char) {
        let start = self.pos;
        let span_start = self.span_here(0);
        self.bump(); // opening quote

        let mut text = String::new();
        let mut parts: Vec<TemplatePart> = Vec::new();
        let mut interpolated = false;

        loop {
            let Some(c) = self.peek().map(|b| b as char) else {
                let span = self.span_from(span_start, start);
                self.push(
                    TokenKind::Error("Unterminated string literal".to_string()),
                    self.source[start..self.pos].to_string(),
                    span,
                );
                return;
            };

            if c == quote {
                self.bump();
                break;
            }
            if c == '\n' && quote != '`' {
                let span = self.span_from(span_start, start);
                self.push(
                    TokenKind::Error("Unterminated string literal".to_string()),
                    self.source[start..self.pos].to_string(),
                    span,
                );
                return;
            }
            if c == '\\' {
                self.bump();
                let Some(esc) = self.bump() else { continue };
                match esc {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    '0' => text.push('\0'),
                    other => text.push(other),
                }
                continue;
            }
            if c == '{' {
                interpolated = true;
                self.bump();
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                }
                let expr_start = self.pos;
                let expr_line = self.line;
                let expr_col = self.col;
                let mut depth = 1usize;
                while depth > 0 {
                    let Some(inner) = self.peek().map(|b| b as char) else {
                        let span = self.span_from(span_start, start);
                        self.push(
                            TokenKind::Error("Unterminated string interpolation".to_string()),
                            self.source[start..self.pos].to_string(),
                            span,
                        );
                        return;
                    };
                    match inner {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        '\\' => {
                            self.bump();
                        }
                        _ => {}
                    }
                    if depth > 0 {
                        self.bump();
                    }
                }
                let slice = &self.source[expr_start..self.pos];
                self.bump(); // closing `}`
                let mut inner_tokens =
                    Lexer::at(slice, self.offset + expr_start, expr_line, expr_col).tokenize();
                inner_tokens
                    .retain(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Eof));
                parts.push(TemplatePart::Expr(inner_tokens));
                continue;
            }

            // Multi-byte characters go through bump() so line/col stay right.
            let c = self.bump().unwrap();
            text.push(c);
        }

        let raw = self.source[start..self.pos].to_string();
        let span = self.span_from(span_start, start);
        if interpolated {
            if !text.is_empty() {
                parts.push(TemplatePart::Text(text));
            }
            self.push(TokenKind::Template(parts), raw, span);
        } else {
            self.push(TokenKind::Str(text), raw, span);
        }
    }

    // ── Regex literals ──────────────────────────────────────────────────

    fn scan_regex(&mut self) {
        let start = self.pos;
        let span_start = self.span_here(0);
        self.bump(); // opening `/`

        let body_start = self.pos;
        let mut in_class = false;
        loop {
            let Some(c) = self.peek().map(|b| b as char) else {
                let span = self.span_from(span_start, start);
                self.push(
                    TokenKind::Error("Unterminated regex literal".to_string()),
                    self.source[start..self.pos].to_string(),
                    span,
                );
                return;
            };
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                    continue;
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                '\n' => {
                    let span = self.span_from(span_start, start);
                    self.push(
                        TokenKind::Error("Unterminated regex literal".to_string()),
                        self.source[start..self.pos].to_string(),
                        span,
                    );
                    return;
                }
                _ => {}
            }
            self.bump();
        }
        let pattern = self.source[body_start..self.pos].to_string();
        self.bump(); // closing `/`

        let flags_start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, b'g' | b'i' | b'm' | b's' | b'u' | b'y') {
                self.bump();
            } else {
                break;
            }
        }
        let flags = self.source[flags_start..self.pos].to_string();
        let raw = self.source[start..self.pos].to_string();
        let span = self.span_from(span_start, start);
        self.push(TokenKind::Regex { pattern, flags }, raw, span);
    }

    // ── Operators and punctuation ───────────────────────────────────────

    fn scan_operator(&mut self) {
        let start = self.pos;
        let span_start = self.span_here(0);
        let c = self.bump().unwrap();

        let kind = match c {
            '+' => self.maybe_eq(TokenKind::PlusEq, TokenKind::Plus),
            '-' => {
                if self.peek() == Some(b'>') {
                    self.bump();
                    TokenKind::Arrow
                } else {
                    self.maybe_eq(TokenKind::MinusEq, TokenKind::Minus)
                }
            }
            '*' => {
                if self.peek() == Some(b'*') {
                    self.bump();
                    TokenKind::StarStar
                } else {
                    self.maybe_eq(TokenKind::StarEq, TokenKind::Star)
                }
            }
            '/' => self.maybe_eq(TokenKind::SlashEq, TokenKind::Slash),
            '%' => TokenKind::Percent,
            '=' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::EqEq
                } else if self.peek() == Some(b'>') {
                    self.bump();
                    TokenKind::FatArrow
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::NotEq
                } else {
                    TokenKind::Error("Unexpected character '!'".to_string())
                }
            }
            '<' => self.maybe_eq(TokenKind::LtEq, TokenKind::Lt),
            '>' => self.maybe_eq(TokenKind::GtEq, TokenKind::Gt),
            '?' => {
                if self.peek() == Some(b'?') {
                    self.bump();
                    TokenKind::QuestionQuestion
                } else if self.peek() == Some(b'.') {
                    self.bump();
                    TokenKind::QuestionDot
                } else {
                    TokenKind::Question
                }
            }
            '|' => {
                if self.peek() == Some(b'>') {
                    self.bump();
                    TokenKind::PipeGt
                } else {
                    TokenKind::Error("Unexpected character '|'".to_string())
                }
            }
            '.' => {
                if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') {
                    self.bump();
                    self.bump();
                    TokenKind::Ellipsis
                } else if self.peek() == Some(b'.') {
                    self.bump();
                    if self.peek() == Some(b'=') {
                        self.bump();
                        TokenKind::DotDotEq
                    } else {
                        TokenKind::DotDot
                    }
                } else {
                    TokenKind::Dot
                }
            }
            ':' => {
                if self.peek() == Some(b':') {
                    self.bump();
                    TokenKind::ColonColon
                } else {
                    TokenKind::Colon
                }
            }
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            other => TokenKind::Error(format!("Unexpected character '{}'", other)),
        };

        let raw = self.source[start..self.pos].to_string();
        let span = self.span_from(span_start, start);
        self.push(kind, raw, span);
    }

    fn maybe_eq(&mut self, with_eq: TokenKind, without: TokenKind) -> TokenKind {
        if self.peek() == Some(b'=') {
            self.bump();
            with_eq
        } else {
            without
        }
    }
}

/// Tokenizes an already-normalized source string.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Newline | TokenKind::Eof))
            .collect()
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("fn get_users"),
            vec![TokenKind::Fn, TokenKind::Ident("get_users".into())]
        );
    }

    #[test]
    fn int_and_float_are_distinct() {
        assert_eq!(kinds("42 3.5"), vec![TokenKind::Int(42), TokenKind::Float(3.5)]);
    }

    #[test]
    fn numeric_separators_and_prefixes() {
        assert_eq!(
            kinds("1_000 0xff 0b101 0o17 1e3"),
            vec![
                TokenKind::Int(1000),
                TokenKind::Int(255),
                TokenKind::Int(5),
                TokenKind::Int(15),
                TokenKind::Float(1000.0),
            ]
        );
    }

    #[test]
    fn range_does_not_swallow_dot() {
        assert_eq!(
            kinds("1..5"),
            vec![TokenKind::Int(1), TokenKind::DotDot, TokenKind::Int(5)]
        );
        assert_eq!(
            kinds("1..=5"),
            vec![TokenKind::Int(1), TokenKind::DotDotEq, TokenKind::Int(5)]
        );
    }

    #[test]
    fn slash_after_identifier_is_division() {
        assert_eq!(
            kinds("a / b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Slash,
                TokenKind::Ident("b".into())
            ]
        );
    }

    #[test]
    fn slash_after_return_is_regex() {
        let toks = kinds("return /ab+c/gi");
        assert_eq!(toks[0], TokenKind::Return);
        assert_eq!(
            toks[1],
            TokenKind::Regex {
                pattern: "ab+c".into(),
                flags: "gi".into()
            }
        );
    }

    #[test]
    fn regex_allowed_after_equals_and_comma() {
        let toks = kinds("x = /a/, /b/");
        assert!(matches!(toks[2], TokenKind::Regex { .. }));
        assert!(matches!(toks[4], TokenKind::Regex { .. }));
    }

    #[test]
    fn plain_string_has_no_parts() {
        assert_eq!(kinds("\"hello\""), vec![TokenKind::Str("hello".into())]);
    }

    #[test]
    fn interpolated_string_becomes_template() {
        let toks = kinds("\"hi {name}!\"");
        match &toks[0] {
            TokenKind::Template(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], TemplatePart::Text("hi ".into()));
                match &parts[1] {
                    TemplatePart::Expr(inner) => {
                        assert_eq!(inner.len(), 1);
                        assert_eq!(inner[0].kind, TokenKind::Ident("name".into()));
                    }
                    other => panic!("expected expr part, got {:?}", other),
                }
                assert_eq!(parts[2], TemplatePart::Text("!".into()));
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn interpolation_spans_are_absolute() {
        let toks = tokenize("\"a {xyz}\"");
        let TokenKind::Template(parts) = &toks[0].kind else {
            panic!("expected template");
        };
        let TemplatePart::Expr(inner) = &parts[1] else {
            panic!("expected expr part");
        };
        assert_eq!(&"\"a {xyz}\""[inner[0].span.start..inner[0].span.end], "xyz");
    }

    #[test]
    fn unterminated_string_is_error_token() {
        let toks = tokenize("\"abc");
        assert!(matches!(toks[0].kind, TokenKind::Error(ref m) if m.contains("Unterminated")));
    }

    #[test]
    fn escaped_brace_is_not_interpolation() {
        assert_eq!(kinds(r#""a \{b}""#), vec![TokenKind::Str("a {b}".into())]);
    }

    #[test]
    fn newline_tokens_and_first_on_line() {
        let toks = tokenize("a\nb");
        assert_eq!(toks[0].kind, TokenKind::Ident("a".into()));
        assert!(toks[0].first_on_line);
        assert_eq!(toks[1].kind, TokenKind::Newline);
        assert_eq!(toks[2].kind, TokenKind::Ident("b".into()));
        assert!(toks[2].first_on_line);
        assert_eq!(toks[2].span.line, 2);
        assert_eq!(toks[2].span.column, 1);
    }

    #[test]
    fn multi_char_operators_win() {
        assert_eq!(
            kinds("|> ?. ?? ..= ** => -> ::"),
            vec![
                TokenKind::PipeGt,
                TokenKind::QuestionDot,
                TokenKind::QuestionQuestion,
                TokenKind::DotDotEq,
                TokenKind::StarStar,
                TokenKind::FatArrow,
                TokenKind::Arrow,
                TokenKind::ColonColon,
            ]
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(
            kinds("a # trailing\n# full line\nb"),
            vec![TokenKind::Ident("a".into()), TokenKind::Ident("b".into())]
        );
    }

    #[test]
    fn relexing_is_deterministic() {
        let src = "fn f(a) { a |> g(_) }\nx = /re/ \"s {a}\"";
        let first = tokenize(src);
        let second = tokenize(src);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.span, b.span);
        }
    }
}
