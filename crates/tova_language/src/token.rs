//! Token types for the Tova lexer and parser.
//!
//! This module defines the vocabulary of the language at the token level.
//! Tokens are the atomic syntactic units produced by the lexer and consumed
//! by the parser.
//!
//! ## Token Categories
//!
//! | Category | Examples | Notes |
//! |----------|----------|-------|
//! | **Literals** | `42`, `3.5`, `"hi"`, `` `a {x}` ``, `/re/g` | Int and Float are distinct kinds |
//! | **Keywords** | `fn`, `state`, `route`, `match` | One variant per reserved word |
//! | **Operators** | `+`, `==`, `\|>`, `..=`, `?.` | Longest match wins |
//! | **Structure** | newline, EOF | Newlines are significant to the parser |
//!
//! Template strings arrive pre-segmented: the lexer splits `"a {x} b"` into
//! alternating text and expression parts, the latter already tokenized.
//!
//! Regex literals are produced only where the preceding token permits an
//! expression to start; everywhere else `/` is division.

use tova_base::Span;

/// One segment of a template string: literal text, or an interpolated
/// expression as a token stream (without a trailing EOF).
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Expr(Vec<Token>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Template(Vec<TemplatePart>),
    Regex { pattern: String, flags: String },
    Ident(String),

    // Declaration keywords
    Fn,
    Var,
    Let,
    Type,
    Import,
    From,
    Pub,
    Mut,
    Interface,
    Derive,
    Guard,

    // Control flow keywords
    If,
    Elif,
    Else,
    For,
    While,
    Loop,
    When,
    Match,
    Try,
    Catch,
    Finally,
    Break,
    Continue,
    Return,
    Async,
    Await,

    // Block keywords
    Server,
    Client,
    Shared,
    Cli,
    Deploy,
    Test,

    // Client-block keywords
    State,
    Computed,
    Effect,
    Component,
    Store,
    Style,

    // Server-block keywords
    Route,
    Routes,
    Middleware,
    Ws,
    Sse,
    Schedule,
    Background,
    Env,
    Static,
    Discover,
    Session,
    Cache,
    Upload,
    Tls,
    Cors,
    Compression,
    Db,
    Auth,
    RateLimit,
    Health,
    MaxBody,
    Model,
    OnStart,
    OnStop,
    OnError,
    Subscribe,

    // Logic and literals
    And,
    Or,
    Not,
    In,
    True,
    False,
    Nil,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    QuestionQuestion,
    QuestionDot,
    Question,
    PipeGt,
    Arrow,
    FatArrow,
    DotDot,
    DotDotEq,
    Ellipsis,
    ColonColon,
    Colon,
    Semicolon,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Structure
    Newline,
    Eof,

    /// Lexing failed at this position; the payload is the message.
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
    /// True when this is the first non-newline token on its line. The parser
    /// uses this to tell subscript `[` from a fresh array literal and postfix
    /// `?` from an orphan.
    pub first_on_line: bool,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            span,
            first_on_line: false,
        }
    }
}

/// Maps a reserved word to its token kind. Returns `None` for identifiers.
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "fn" => TokenKind::Fn,
        "var" => TokenKind::Var,
        "let" => TokenKind::Let,
        "type" => TokenKind::Type,
        "import" => TokenKind::Import,
        "from" => TokenKind::From,
        "pub" => TokenKind::Pub,
        "mut" => TokenKind::Mut,
        "interface" => TokenKind::Interface,
        "derive" => TokenKind::Derive,
        "guard" => TokenKind::Guard,
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "loop" => TokenKind::Loop,
        "when" => TokenKind::When,
        "match" => TokenKind::Match,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "finally" => TokenKind::Finally,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "return" => TokenKind::Return,
        "async" => TokenKind::Async,
        "await" => TokenKind::Await,
        "server" => TokenKind::Server,
        "client" => TokenKind::Client,
        "shared" => TokenKind::Shared,
        "cli" => TokenKind::Cli,
        "deploy" => TokenKind::Deploy,
        "test" => TokenKind::Test,
        "state" => TokenKind::State,
        "computed" => TokenKind::Computed,
        "effect" => TokenKind::Effect,
        "component" => TokenKind::Component,
        "store" => TokenKind::Store,
        "style" => TokenKind::Style,
        "route" => TokenKind::Route,
        "routes" => TokenKind::Routes,
        "middleware" => TokenKind::Middleware,
        "ws" => TokenKind::Ws,
        "sse" => TokenKind::Sse,
        "schedule" => TokenKind::Schedule,
        "background" => TokenKind::Background,
        "env" => TokenKind::Env,
        "static" => TokenKind::Static,
        "discover" => TokenKind::Discover,
        "session" => TokenKind::Session,
        "cache" => TokenKind::Cache,
        "upload" => TokenKind::Upload,
        "tls" => TokenKind::Tls,
        "cors" => TokenKind::Cors,
        "compression" => TokenKind::Compression,
        "db" => TokenKind::Db,
        "auth" => TokenKind::Auth,
        "rate_limit" => TokenKind::RateLimit,
        "health" => TokenKind::Health,
        "max_body" => TokenKind::MaxBody,
        "model" => TokenKind::Model,
        "on_start" => TokenKind::OnStart,
        "on_stop" => TokenKind::OnStop,
        "on_error" => TokenKind::OnError,
        "subscribe" => TokenKind::Subscribe,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "in" => TokenKind::In,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "nil" => TokenKind::Nil,
        _ => return None,
    };
    Some(kind)
}

impl TokenKind {
    /// A short human-readable name for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(v) => v.to_string(),
            TokenKind::Float(v) => v.to_string(),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Template(_) => "template string".to_string(),
            TokenKind::Regex { .. } => "regex".to_string(),
            TokenKind::Ident(name) => format!("'{}'", name),
            TokenKind::Newline => "newline".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Error(msg) => msg.clone(),
            other => format!("'{}'", other.fixed_lexeme().unwrap_or("token")),
        }
    }

    /// The exact source text of keyword/operator kinds.
    pub fn fixed_lexeme(&self) -> Option<&'static str> {
        let s = match self {
            TokenKind::Fn => "fn",
            TokenKind::Var => "var",
            TokenKind::Let => "let",
            TokenKind::Type => "type",
            TokenKind::Import => "import",
            TokenKind::From => "from",
            TokenKind::Pub => "pub",
            TokenKind::Mut => "mut",
            TokenKind::Interface => "interface",
            TokenKind::Derive => "derive",
            TokenKind::Guard => "guard",
            TokenKind::If => "if",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Loop => "loop",
            TokenKind::When => "when",
            TokenKind::Match => "match",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Return => "return",
            TokenKind::Async => "async",
            TokenKind::Await => "await",
            TokenKind::Server => "server",
            TokenKind::Client => "client",
            TokenKind::Shared => "shared",
            TokenKind::Cli => "cli",
            TokenKind::Deploy => "deploy",
            TokenKind::Test => "test",
            TokenKind::State => "state",
            TokenKind::Computed => "computed",
            TokenKind::Effect => "effect",
            TokenKind::Component => "component",
            TokenKind::Store => "store",
            TokenKind::Style => "style",
            TokenKind::Route => "route",
            TokenKind::Routes => "routes",
            TokenKind::Middleware => "middleware",
            TokenKind::Ws => "ws",
            TokenKind::Sse => "sse",
            TokenKind::Schedule => "schedule",
            TokenKind::Background => "background",
            TokenKind::Env => "env",
            TokenKind::Static => "static",
            TokenKind::Discover => "discover",
            TokenKind::Session => "session",
            TokenKind::Cache => "cache",
            TokenKind::Upload => "upload",
            TokenKind::Tls => "tls",
            TokenKind::Cors => "cors",
            TokenKind::Compression => "compression",
            TokenKind::Db => "db",
            TokenKind::Auth => "auth",
            TokenKind::RateLimit => "rate_limit",
            TokenKind::Health => "health",
            TokenKind::MaxBody => "max_body",
            TokenKind::Model => "model",
            TokenKind::OnStart => "on_start",
            TokenKind::OnStop => "on_stop",
            TokenKind::OnError => "on_error",
            TokenKind::Subscribe => "subscribe",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::In => "in",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Nil => "nil",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::StarStar => "**",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::QuestionQuestion => "??",
            TokenKind::QuestionDot => "?.",
            TokenKind::Question => "?",
            TokenKind::PipeGt => "|>",
            TokenKind::Arrow => "->",
            TokenKind::FatArrow => "=>",
            TokenKind::DotDot => "..",
            TokenKind::DotDotEq => "..=",
            TokenKind::Ellipsis => "...",
            TokenKind::ColonColon => "::",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            _ => return None,
        };
        Some(s)
    }

    /// True for keyword kinds that read naturally as member/property names
    /// (`req.session`, `config.env`). The parser accepts these after `.`.
    pub fn is_keyword(&self) -> bool {
        self.fixed_lexeme()
            .map(|s| s.chars().all(|c| c.is_ascii_alphabetic() || c == '_'))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_kind_recognizes_reserved_words() {
        assert_eq!(keyword_kind("fn"), Some(TokenKind::Fn));
        assert_eq!(keyword_kind("rate_limit"), Some(TokenKind::RateLimit));
        assert_eq!(keyword_kind("nil"), Some(TokenKind::Nil));
        assert_eq!(keyword_kind("counter"), None);
    }

    #[test]
    fn token_records_span() {
        let tok = Token::new(TokenKind::Fn, "fn", Span::new(0, 2, 1, 1));
        assert_eq!(tok.span.start, 0);
        assert_eq!(tok.span.end, 2);
        assert!(!tok.first_on_line);
    }

    #[test]
    fn describe_quotes_identifiers() {
        assert_eq!(TokenKind::Ident("x".into()).describe(), "'x'");
        assert_eq!(TokenKind::FatArrow.describe(), "'=>'");
        assert_eq!(TokenKind::Eof.describe(), "end of file");
    }

    #[test]
    fn keywords_round_trip_through_fixed_lexeme() {
        for word in ["state", "route", "on_error", "match", "in"] {
            let kind = keyword_kind(word).unwrap();
            assert_eq!(kind.fixed_lexeme(), Some(word));
            assert!(kind.is_keyword());
        }
        assert!(!TokenKind::PipeGt.is_keyword());
    }
}
