//! Recursive-descent parser with Pratt expression parsing and tolerant
//! recovery.
//!
//! The parser consumes the token stream produced by [`crate::lexer`] and
//! builds a [`Program`]. Two modes:
//!
//! - **Strict** ([`Parser::parse`]): the first fatal error aborts parsing,
//!   but the error carries the partially built AST so the analyzer can still
//!   run over what parsed.
//! - **Tolerant** ([`Parser::parse_tolerant`]): local errors are recorded,
//!   the cursor skips to the next synchronization point (newline, `;`, `}`,
//!   or a top-level keyword), and parsing continues. Used by the language
//!   server.
//!
//! The recovery points are the same synchronization set across all rules,
//! implemented once in [`Parser::synchronize`].
//!
//! Context-restricted declarations (`state`, `route`, ...) parse anywhere;
//! the analyzer, not the parser, rejects them outside their mandated block.

mod blocks;
mod expr;
mod jsx;
mod pattern;

use std::fmt;

use tova_base::{Diagnostic, Span};

use crate::ast::{
    BinaryOp, Expr, FnDecl, ForBinding, ImportDecl, Param, Pattern, Program, Stmt, TestBlock,
    TypeAnnotation, TypeDecl, TypeDeclKind, TypeField, Variant,
};
use crate::token::{Token, TokenKind};

pub(crate) type PResult<T> = Result<T, Diagnostic>;

/// A fatal parse error together with everything that parsed before it.
#[derive(Debug)]
pub struct ParseFailure {
    pub diagnostic: Diagnostic,
    pub partial: Program,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

impl std::error::Error for ParseFailure {}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    file: String,
    tolerant: bool,
    diagnostics: Vec<Diagnostic>,
    /// Non-zero inside `client` blocks, components, and stores, where `<` at
    /// expression start begins JSX.
    client_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>, file: impl Into<String>) -> Self {
        Parser {
            source,
            tokens,
            pos: 0,
            file: file.into(),
            tolerant: false,
            diagnostics: Vec::new(),
            client_depth: 0,
        }
    }

    /// A parser over an interpolation's token slice. Spans in the slice are
    /// already absolute, so the enclosing source works for both.
    pub(crate) fn sub(source: &'a str, mut tokens: Vec<Token>, file: &str, client_depth: u32) -> Self {
        let end = tokens.last().map(|t| t.span).unwrap_or_default();
        tokens.push(Token::new(TokenKind::Eof, "", end));
        let mut p = Parser::new(source, tokens, file);
        p.client_depth = client_depth;
        p
    }

    pub fn parse(mut self) -> Result<Program, Box<ParseFailure>> {
        let mut program = Program::new(self.file.clone());
        loop {
            self.skip_separators();
            if self.at(&TokenKind::Eof) {
                break;
            }
            match self.parse_stmt() {
                Ok(stmt) => program.body.push(stmt),
                Err(diag) => {
                    return Err(Box::new(ParseFailure {
                        diagnostic: diag,
                        partial: program,
                    }))
                }
            }
        }
        Ok(program)
    }

    pub fn parse_tolerant(mut self) -> (Program, Vec<Diagnostic>) {
        self.tolerant = true;
        let mut program = Program::new(self.file.clone());
        loop {
            self.skip_separators();
            if self.at(&TokenKind::Eof) {
                break;
            }
            match self.parse_stmt() {
                Ok(stmt) => program.body.push(stmt),
                Err(diag) => {
                    self.diagnostics.push(diag);
                    self.synchronize();
                }
            }
        }
        (program, self.diagnostics)
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// The kind `n` tokens ahead, newlines included.
    pub(crate) fn nth_kind(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, context: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek_kind().describe();
            Err(self.err(
                format!(
                    "Expected {} {}, found {}",
                    kind.describe(),
                    context,
                    found
                ),
                self.peek().span,
            ))
        }
    }

    pub(crate) fn expect_ident(&mut self, context: &str) -> PResult<(String, Span)> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let tok = self.advance();
                Ok((name, tok.span))
            }
            other => Err(self.err(
                format!("Expected identifier {}, found {}", context, other.describe()),
                self.peek().span,
            )),
        }
    }

    pub(crate) fn expect_str(&mut self, context: &str) -> PResult<(String, Span)> {
        match self.peek_kind().clone() {
            TokenKind::Str(value) => {
                let tok = self.advance();
                Ok((value, tok.span))
            }
            other => Err(self.err(
                format!("Expected string {}, found {}", context, other.describe()),
                self.peek().span,
            )),
        }
    }

    /// An identifier-or-keyword, for positions where reserved words read as
    /// plain names (member access, object keys, config entries).
    pub(crate) fn ident_like(&mut self, context: &str) -> PResult<(String, Span)> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let tok = self.advance();
                Ok((name, tok.span))
            }
            kind if kind.is_keyword() => {
                let tok = self.advance();
                Ok((tok.lexeme.clone(), tok.span))
            }
            other => Err(self.err(
                format!("Expected name {}, found {}", context, other.describe()),
                self.peek().span,
            )),
        }
    }

    pub(crate) fn err(&self, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::error(message, span, self.file.clone())
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.at(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skips newlines, semicolons, and stray commas between declarations.
    pub(crate) fn skip_separators(&mut self) {
        while matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    pub(crate) fn save(&self) -> usize {
        self.pos
    }

    pub(crate) fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn synchronize(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Newline | TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Fn
                | TokenKind::Let
                | TokenKind::Var
                | TokenKind::Type
                | TokenKind::Import
                | TokenKind::Server
                | TokenKind::Client
                | TokenKind::Shared
                | TokenKind::Cli
                | TokenKind::Deploy
                | TokenKind::Test => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn end_stmt(&mut self) -> PResult<()> {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            other => {
                let msg = format!("Unexpected token {}", other.describe());
                Err(self.err(msg, self.peek().span))
            }
        }
    }

    // ── Statements ──────────────────────────────────────────────────────

    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        match self.peek_kind() {
            TokenKind::Let => self.parse_let(false),
            TokenKind::Var => self.parse_let(true),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Loop => {
                self.advance();
                let body = self.block("after 'loop'")?;
                Ok(Stmt::Loop { body, span })
            }
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => {
                self.advance();
                let value = if matches!(
                    self.peek_kind(),
                    TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
                ) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.end_stmt()?;
                Ok(Stmt::Return { value, span })
            }
            TokenKind::Break => {
                self.advance();
                self.end_stmt()?;
                Ok(Stmt::Break { span })
            }
            TokenKind::Continue => {
                self.advance();
                self.end_stmt()?;
                Ok(Stmt::Continue { span })
            }
            TokenKind::Fn if matches!(self.nth_kind(1), TokenKind::Ident(_)) => {
                Ok(Stmt::Fn(self.parse_fn_decl(false, false)?))
            }
            TokenKind::Async
                if matches!(self.nth_kind(1), TokenKind::Fn)
                    && matches!(self.nth_kind(2), TokenKind::Ident(_)) =>
            {
                self.advance();
                Ok(Stmt::Fn(self.parse_fn_decl(true, false)?))
            }
            TokenKind::Pub => {
                self.advance();
                let is_async = self.eat(&TokenKind::Async);
                Ok(Stmt::Fn(self.parse_fn_decl(is_async, true)?))
            }
            TokenKind::Type => self.parse_type_decl(),
            TokenKind::Import => self.parse_import(),
            TokenKind::Server => self.parse_server_block(),
            TokenKind::Client => self.parse_client_block(),
            TokenKind::Shared => {
                self.advance();
                let body = self.block("after 'shared'")?;
                Ok(Stmt::Shared { body, span })
            }
            TokenKind::Cli => self.parse_cli_block(),
            TokenKind::Deploy => self.parse_deploy_block(),
            TokenKind::Test => {
                self.advance();
                let name = match self.peek_kind().clone() {
                    TokenKind::Str(s) => {
                        self.advance();
                        Some(s)
                    }
                    _ => None,
                };
                let body = self.block("after 'test'")?;
                Ok(Stmt::Test(TestBlock { name, body, span }))
            }
            // Client-only declarations in arbitrary statement position; the
            // analyzer enforces the block context.
            TokenKind::State
            | TokenKind::Computed
            | TokenKind::Effect
            | TokenKind::Component
            | TokenKind::Store => {
                let decl = self.parse_client_decl()?;
                Ok(Stmt::ClientDecl(Box::new(decl)))
            }
            // Server-only declarations likewise.
            TokenKind::Route
            | TokenKind::Routes
            | TokenKind::Middleware
            | TokenKind::Ws
            | TokenKind::Sse
            | TokenKind::Schedule
            | TokenKind::Background
            | TokenKind::OnStart
            | TokenKind::OnStop
            | TokenKind::OnError
            | TokenKind::Subscribe
            | TokenKind::Model
            | TokenKind::Upload
            | TokenKind::Tls
            | TokenKind::Cors
            | TokenKind::Compression
            | TokenKind::Auth
            | TokenKind::RateLimit
            | TokenKind::Health
            | TokenKind::MaxBody
            | TokenKind::Static
            | TokenKind::Discover => {
                let decl = self.parse_server_decl()?;
                Ok(Stmt::ServerDecl(Box::new(decl)))
            }
            // `env`, `db`, `session`, and `cache` double as expression names
            // (`env.PORT`, `db.query(...)`); only a following `{` or an
            // engine name makes them declarations.
            TokenKind::Env | TokenKind::Session | TokenKind::Cache
                if matches!(self.nth_kind(1), TokenKind::LBrace) =>
            {
                let decl = self.parse_server_decl()?;
                Ok(Stmt::ServerDecl(Box::new(decl)))
            }
            TokenKind::Db
                if matches!(self.nth_kind(1), TokenKind::LBrace)
                    || (matches!(self.nth_kind(1), TokenKind::Ident(_))
                        && matches!(self.nth_kind(2), TokenKind::LBrace)) =>
            {
                let decl = self.parse_server_decl()?;
                Ok(Stmt::ServerDecl(Box::new(decl)))
            }
            _ => self.parse_expr_or_assign(),
        }
    }

    /// Expression statement, assignment, multi-assignment, or compound
    /// assignment.
    pub(crate) fn parse_expr_or_assign(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        let first = self.parse_expr()?;

        if self.at(&TokenKind::Comma) {
            let mut targets = vec![first];
            while self.eat(&TokenKind::Comma) {
                self.skip_newlines();
                targets.push(self.parse_expr()?);
            }
            self.expect(&TokenKind::Eq, "in multi-assignment")?;
            for t in &targets {
                self.check_assign_target(t)?;
            }
            let mut values = vec![self.parse_expr()?];
            while self.eat(&TokenKind::Comma) {
                self.skip_newlines();
                values.push(self.parse_expr()?);
            }
            self.end_stmt()?;
            return Ok(Stmt::Assign { targets, values, span });
        }

        if self.at(&TokenKind::Eq) {
            self.advance();
            self.check_assign_target(&first)?;
            let value = self.parse_expr()?;
            self.end_stmt()?;
            return Ok(Stmt::Assign {
                targets: vec![first],
                values: vec![value],
                span,
            });
        }

        let compound = match self.peek_kind() {
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            _ => None,
        };
        if let Some(op) = compound {
            self.advance();
            self.check_assign_target(&first)?;
            let value = self.parse_expr()?;
            self.end_stmt()?;
            return Ok(Stmt::CompoundAssign {
                target: first,
                op,
                value,
                span,
            });
        }

        self.end_stmt()?;
        Ok(Stmt::Expr { expr: first, span })
    }

    fn check_assign_target(&self, target: &Expr) -> PResult<()> {
        match target {
            Expr::Ident { .. } | Expr::Member { .. } | Expr::Index { .. } => Ok(()),
            other => Err(self.err("Invalid assignment target", other.span())),
        }
    }

    fn parse_let(&mut self, mutable: bool) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance(); // let / var

        let pattern = match self.peek_kind() {
            TokenKind::Ident(_) => {
                let (name, name_span) = self.expect_ident("after 'let'")?;
                // `let a, b = 1, 2` desugars to an array pattern over a tuple.
                if self.at(&TokenKind::Comma) {
                    let mut items = vec![Pattern::Binding { name, span: name_span }];
                    while self.eat(&TokenKind::Comma) {
                        let (n, s) = self.expect_ident("in declaration list")?;
                        items.push(Pattern::Binding { name: n, span: s });
                    }
                    self.expect(&TokenKind::Eq, "in declaration")?;
                    let vspan = self.peek().span;
                    let mut values = vec![self.parse_expr()?];
                    while self.eat(&TokenKind::Comma) {
                        values.push(self.parse_expr()?);
                    }
                    self.end_stmt()?;
                    return Ok(Stmt::Let {
                        pattern: Pattern::Array { items, rest: None, span: name_span },
                        value: Expr::Tuple { items: values, span: vspan },
                        mutable,
                        span,
                    });
                }
                Pattern::Binding { name, span: name_span }
            }
            TokenKind::LBracket | TokenKind::LBrace => self.parse_pattern()?,
            other => {
                let msg = format!("Expected pattern after 'let', found {}", other.describe());
                return Err(self.err(msg, self.peek().span));
            }
        };

        self.expect(&TokenKind::Eq, "in declaration")?;
        let value = self.parse_expr()?;
        self.end_stmt()?;
        Ok(Stmt::Let { pattern, value, mutable, span })
    }

    fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        let (branches, else_branch) = self.parse_if_chain()?;
        Ok(Stmt::If { branches, else_branch, span })
    }

    /// Shared by statement `if` and expression `if`.
    pub(crate) fn parse_if_chain(&mut self) -> PResult<(Vec<(Expr, Vec<Stmt>)>, Option<Vec<Stmt>>)> {
        self.advance(); // if
        let cond = self.parse_expr()?;
        let body = self.block("after 'if' condition")?;
        let mut branches = vec![(cond, body)];
        let mut else_branch = None;
        loop {
            // `elif` may sit on the next line.
            let save = self.save();
            self.skip_newlines();
            if self.at(&TokenKind::Elif) {
                self.advance();
                let cond = self.parse_expr()?;
                let body = self.block("after 'elif' condition")?;
                branches.push((cond, body));
            } else if self.at(&TokenKind::Else) {
                self.advance();
                else_branch = Some(self.block("after 'else'")?);
                break;
            } else {
                self.restore(save);
                break;
            }
        }
        Ok((branches, else_branch))
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance(); // for

        let binding = match self.peek_kind() {
            TokenKind::LBracket | TokenKind::LBrace => {
                let bspan = self.peek().span;
                let pattern = self.parse_pattern()?;
                ForBinding::Destructure { pattern, span: bspan }
            }
            _ => {
                let (name, nspan) = self.expect_ident("after 'for'")?;
                if self.eat(&TokenKind::Comma) {
                    let (value, _) = self.expect_ident("after ',' in for loop")?;
                    ForBinding::KeyValue { key: name, value, span: nspan }
                } else {
                    ForBinding::Single { name, span: nspan }
                }
            }
        };

        self.expect(&TokenKind::In, "in for loop")?;
        let iter = self.parse_expr()?;
        let body = self.block("after for loop header")?;
        Ok(Stmt::For { binding, iter, body, span })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance();
        let cond = self.parse_expr()?;
        let body = self.block("after 'while' condition")?;
        Ok(Stmt::While { cond, body, span })
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance();
        let body = self.block("after 'try'")?;
        self.skip_newlines();

        let mut catch_binding = None;
        let mut catch_body = Vec::new();
        if self.eat(&TokenKind::Catch) {
            if self.eat(&TokenKind::LParen) {
                let (name, _) = self.expect_ident("in catch binding")?;
                catch_binding = Some(name);
                self.expect(&TokenKind::RParen, "after catch binding")?;
            } else if matches!(self.peek_kind(), TokenKind::Ident(_)) {
                let (name, _) = self.expect_ident("in catch binding")?;
                catch_binding = Some(name);
            }
            catch_body = self.block("after 'catch'")?;
        }

        let save = self.save();
        self.skip_newlines();
        let finally_body = if self.eat(&TokenKind::Finally) {
            Some(self.block("after 'finally'")?)
        } else {
            self.restore(save);
            None
        };

        Ok(Stmt::Try {
            body,
            catch_binding,
            catch_body,
            finally_body,
            span,
        })
    }

    pub(crate) fn parse_fn_decl(&mut self, is_async: bool, is_pub: bool) -> PResult<FnDecl> {
        let span = self.peek().span;
        self.expect(&TokenKind::Fn, "in function declaration")?;
        let (name, _) = self.expect_ident("after 'fn'")?;
        self.expect(&TokenKind::LParen, "after function name")?;
        let params = self.parse_params()?;
        let return_type = if self.eat(&TokenKind::Arrow) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        let body = self.block("in function body")?;
        Ok(FnDecl {
            name,
            params,
            return_type,
            body,
            is_async,
            is_pub,
            span,
        })
    }

    /// Parses a `(`-opened parameter list through the closing `)`.
    pub(crate) fn parse_params(&mut self) -> PResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(&TokenKind::RParen) {
                break;
            }
            let (name, span) = self.expect_ident("in parameter list")?;
            if params.iter().any(|p| p.name == name) {
                return Err(self.err(
                    format!("Parameter '{}' is already defined", name),
                    span,
                ));
            }
            let ty = if self.eat(&TokenKind::Colon) {
                Some(self.parse_type_annotation()?)
            } else {
                None
            };
            let default = if self.eat(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param { name, ty, default, span });
            self.skip_newlines();
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RParen, "after parameters")?;
                break;
            }
        }
        Ok(params)
    }

    pub(crate) fn parse_type_annotation(&mut self) -> PResult<TypeAnnotation> {
        let span = self.peek().span;
        let mut ty = match self.peek_kind().clone() {
            TokenKind::LBracket => {
                self.advance();
                let element = self.parse_type_annotation()?;
                self.expect(&TokenKind::RBracket, "in list type")?;
                TypeAnnotation::List { element: Box::new(element), span }
            }
            TokenKind::Ident(name) => {
                self.advance();
                let mut params = Vec::new();
                if self.at(&TokenKind::Lt) {
                    self.advance();
                    loop {
                        params.push(self.parse_type_annotation()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::Gt, "to close type parameters")?;
                }
                TypeAnnotation::Name { name, params, span }
            }
            other => {
                let msg = format!("Expected type, found {}", other.describe());
                return Err(self.err(msg, self.peek().span));
            }
        };
        if self.at(&TokenKind::Question) && !self.peek().first_on_line {
            self.advance();
            ty = TypeAnnotation::Optional { inner: Box::new(ty), span };
        }
        Ok(ty)
    }

    fn parse_type_decl(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance(); // type
        let (name, _) = self.expect_ident("after 'type'")?;

        let mut type_params = Vec::new();
        if self.at(&TokenKind::Lt) {
            self.advance();
            loop {
                let (p, _) = self.expect_ident("in type parameters")?;
                type_params.push(p);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::Gt, "to close type parameters")?;
        }

        self.expect(&TokenKind::LBrace, "after type name")?;
        let mut fields: Vec<TypeField> = Vec::new();
        let mut variants: Vec<Variant> = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            let (entry_name, entry_span) = self.expect_ident("in type body")?;
            if self.eat(&TokenKind::Colon) {
                let ty = self.parse_type_annotation()?;
                fields.push(TypeField {
                    name: entry_name,
                    ty: Some(ty),
                    span: entry_span,
                });
            } else if self.eat(&TokenKind::LParen) {
                let mut vfields = Vec::new();
                loop {
                    self.skip_newlines();
                    if self.eat(&TokenKind::RParen) {
                        break;
                    }
                    let (fname, fspan) = self.expect_ident("in variant fields")?;
                    let fty = if self.eat(&TokenKind::Colon) {
                        Some(self.parse_type_annotation()?)
                    } else {
                        None
                    };
                    vfields.push(TypeField { name: fname, ty: fty, span: fspan });
                    if !self.eat(&TokenKind::Comma) {
                        self.expect(&TokenKind::RParen, "after variant fields")?;
                        break;
                    }
                }
                variants.push(Variant {
                    name: entry_name,
                    fields: vfields,
                    span: entry_span,
                });
            } else {
                variants.push(Variant {
                    name: entry_name,
                    fields: Vec::new(),
                    span: entry_span,
                });
            }
            while self.eat(&TokenKind::Comma) {
                self.skip_newlines();
            }
        }

        let kind = if !variants.is_empty() {
            if !fields.is_empty() {
                return Err(self.err(
                    format!("Type '{}' mixes fields and variants", name),
                    span,
                ));
            }
            TypeDeclKind::Variants { variants }
        } else {
            TypeDeclKind::Struct { fields }
        };

        Ok(Stmt::TypeDecl(TypeDecl {
            name,
            type_params,
            kind,
            span,
        }))
    }

    fn parse_import(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance(); // import

        let mut default = None;
        let mut named = Vec::new();
        if self.eat(&TokenKind::LBrace) {
            loop {
                self.skip_newlines();
                if self.eat(&TokenKind::RBrace) {
                    break;
                }
                let (name, _) = self.expect_ident("in import list")?;
                let alias = if matches!(self.peek_kind(), TokenKind::Ident(w) if w == "as") {
                    self.advance();
                    let (a, _) = self.expect_ident("after 'as'")?;
                    Some(a)
                } else {
                    None
                };
                named.push((name, alias));
                if !self.eat(&TokenKind::Comma) {
                    self.expect(&TokenKind::RBrace, "after import list")?;
                    break;
                }
            }
        } else {
            let (name, _) = self.expect_ident("after 'import'")?;
            default = Some(name);
        }

        self.expect(&TokenKind::From, "in import")?;
        let (source, _) = self.expect_str("after 'from'")?;
        self.end_stmt()?;
        Ok(Stmt::Import(ImportDecl {
            source,
            default,
            named,
            span,
        }))
    }

    /// A `{ ... }` statement block.
    pub(crate) fn block(&mut self, context: &str) -> PResult<Vec<Stmt>> {
        self.skip_newlines();
        self.expect(&TokenKind::LBrace, context)?;
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            if self.at(&TokenKind::Eof) {
                return Err(self.err(format!("Expected '}}' {}", context), self.peek().span));
            }
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(diag) if self.tolerant => {
                    self.diagnostics.push(diag);
                    self.synchronize();
                }
                Err(diag) => return Err(diag),
            }
        }
        Ok(stmts)
    }
}
