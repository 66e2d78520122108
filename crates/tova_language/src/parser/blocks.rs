//! Dedicated sub-parsers for `server`, `client`, `cli`, and `deploy` blocks.
//!
//! Every declaration here can also be reached from plain statement position
//! (the analyzer owns context enforcement), so each declaration kind has one
//! parse function used from both entry points.

use crate::ast::{
    ClientBlock, ClientDecl, CliBlock, ComponentDecl, ConfigDecl, ConfigKind, DeployBlock,
    DeployEntry, EnvEntry, Expr, RouteDecl, ServerBlock, ServerDecl, Stmt, StoreDecl,
    StyleBlock, TypeField, WsHandler,
};
use crate::token::TokenKind;

use super::{PResult, Parser};

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];
const WS_HANDLERS: &[&str] = &["on_open", "on_message", "on_close", "on_error"];
const AUTH_KEYS: &[&str] = &[
    "provider", "secret", "expires_in", "refresh", "hash", "cookie", "header",
];

impl<'a> Parser<'a> {
    // ── Server blocks ───────────────────────────────────────────────────

    pub(crate) fn parse_server_block(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance(); // server
        let name = match self.peek_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Some(s)
            }
            _ => None,
        };
        self.expect(&TokenKind::LBrace, "after 'server'")?;
        let body = self.parse_server_decls()?;
        Ok(Stmt::Server(ServerBlock { name, body, span }))
    }

    fn parse_server_decls(&mut self) -> PResult<Vec<ServerDecl>> {
        let mut decls = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            if self.at(&TokenKind::Eof) {
                return Err(self.err("Expected '}' to close server block", self.peek().span));
            }
            decls.push(self.parse_server_decl()?);
        }
        Ok(decls)
    }

    pub(crate) fn parse_server_decl(&mut self) -> PResult<ServerDecl> {
        let span = self.peek().span;
        match self.peek_kind() {
            TokenKind::Route => {
                self.advance();
                let (method, mspan) = self.expect_ident("after 'route'")?;
                if !HTTP_METHODS.contains(&method.as_str()) {
                    return Err(self.err(format!("Invalid HTTP method '{}'", method), mspan));
                }
                let (path, _) = self.expect_str("as route path")?;
                let params = if self.eat(&TokenKind::LParen) {
                    self.parse_params()?
                } else {
                    Vec::new()
                };
                let body = self.block("in route body")?;
                Ok(ServerDecl::Route(RouteDecl {
                    method,
                    path,
                    params,
                    body,
                    span,
                }))
            }
            TokenKind::Routes => {
                self.advance();
                let (prefix, _) = self.expect_str("as route group prefix")?;
                self.expect(&TokenKind::LBrace, "after route group prefix")?;
                let body = self.parse_server_decls()?;
                Ok(ServerDecl::RouteGroup { prefix, body, span })
            }
            TokenKind::Middleware => {
                self.advance();
                let params = if self.eat(&TokenKind::LParen) {
                    self.parse_params()?
                } else {
                    Vec::new()
                };
                let body = self.block("in middleware body")?;
                Ok(ServerDecl::Middleware { params, body, span })
            }
            TokenKind::Ws => {
                self.advance();
                let (path, _) = self.expect_str("as websocket path")?;
                self.expect(&TokenKind::LBrace, "after websocket path")?;
                let mut handlers = Vec::new();
                loop {
                    self.skip_separators();
                    if self.eat(&TokenKind::RBrace) {
                        break;
                    }
                    let hspan = self.peek().span;
                    let (event, espan) = self.ident_like("as websocket handler")?;
                    if !WS_HANDLERS.contains(&event.as_str()) {
                        return Err(
                            self.err(format!("Invalid WebSocket handler '{}'", event), espan)
                        );
                    }
                    let params = if self.eat(&TokenKind::LParen) {
                        self.parse_params()?
                    } else {
                        Vec::new()
                    };
                    let body = self.block("in websocket handler")?;
                    handlers.push(WsHandler {
                        event,
                        params,
                        body,
                        span: hspan,
                    });
                }
                Ok(ServerDecl::Ws {
                    path,
                    handlers,
                    span,
                })
            }
            TokenKind::Sse => {
                self.advance();
                let (path, _) = self.expect_str("as SSE path")?;
                let params = if self.eat(&TokenKind::LParen) {
                    self.parse_params()?
                } else {
                    Vec::new()
                };
                let body = self.block("in SSE body")?;
                Ok(ServerDecl::Sse {
                    path,
                    params,
                    body,
                    span,
                })
            }
            TokenKind::Schedule => {
                self.advance();
                let (spec, _) = self.expect_str("as schedule expression")?;
                let body = self.block("in schedule body")?;
                Ok(ServerDecl::Schedule { spec, body, span })
            }
            TokenKind::Background => {
                self.advance();
                let (name, _) = self.expect_ident("after 'background'")?;
                let body = self.block("in background job")?;
                Ok(ServerDecl::Background { name, body, span })
            }
            TokenKind::OnStart => {
                self.advance();
                let body = self.block("after 'on_start'")?;
                Ok(ServerDecl::OnStart { body, span })
            }
            TokenKind::OnStop => {
                self.advance();
                let body = self.block("after 'on_stop'")?;
                Ok(ServerDecl::OnStop { body, span })
            }
            TokenKind::OnError => {
                self.advance();
                let params = if self.eat(&TokenKind::LParen) {
                    self.parse_params()?
                } else {
                    Vec::new()
                };
                let body = self.block("after 'on_error'")?;
                Ok(ServerDecl::OnError { params, body, span })
            }
            TokenKind::Subscribe => {
                self.advance();
                let (topic, _) = self.expect_str("as subscription topic")?;
                let params = if self.eat(&TokenKind::LParen) {
                    self.parse_params()?
                } else {
                    Vec::new()
                };
                let body = self.block("in subscription body")?;
                Ok(ServerDecl::Subscribe {
                    topic,
                    params,
                    body,
                    span,
                })
            }
            TokenKind::Model => {
                self.advance();
                let (name, _) = self.expect_ident("after 'model'")?;
                self.expect(&TokenKind::LBrace, "after model name")?;
                let mut fields = Vec::new();
                loop {
                    self.skip_separators();
                    if self.eat(&TokenKind::RBrace) {
                        break;
                    }
                    let (fname, fspan) = self.ident_like("as model field")?;
                    self.expect(&TokenKind::Colon, "after model field name")?;
                    let ty = self.parse_type_annotation()?;
                    fields.push(TypeField {
                        name: fname,
                        ty: Some(ty),
                        span: fspan,
                    });
                    while self.eat(&TokenKind::Comma) {
                        self.skip_newlines();
                    }
                }
                Ok(ServerDecl::Model { name, fields, span })
            }
            TokenKind::Env if matches!(self.nth_kind(1), TokenKind::LBrace) => {
                self.advance();
                self.expect(&TokenKind::LBrace, "after 'env'")?;
                let mut entries = Vec::new();
                loop {
                    self.skip_separators();
                    if self.eat(&TokenKind::RBrace) {
                        break;
                    }
                    let (name, espan) = self.expect_ident("as environment variable")?;
                    let default = if self.eat(&TokenKind::Colon) {
                        Some(self.parse_expr()?)
                    } else {
                        None
                    };
                    entries.push(EnvEntry {
                        name,
                        default,
                        span: espan,
                    });
                    while self.eat(&TokenKind::Comma) {
                        self.skip_newlines();
                    }
                }
                Ok(ServerDecl::Env { entries, span })
            }
            TokenKind::Upload => self.parse_config(ConfigKind::Upload),
            // `session`, `cache`, `db`, and `env` are also expression names
            // (`session.get(...)`, `db.query(...)`); only a following body
            // makes them configuration.
            TokenKind::Session if matches!(self.nth_kind(1), TokenKind::LBrace) => {
                self.parse_config(ConfigKind::Session)
            }
            TokenKind::Cache if matches!(self.nth_kind(1), TokenKind::LBrace) => {
                self.parse_config(ConfigKind::Cache)
            }
            TokenKind::Tls => self.parse_config(ConfigKind::Tls),
            TokenKind::Cors => self.parse_config(ConfigKind::Cors),
            TokenKind::Compression => self.parse_config(ConfigKind::Compression),
            TokenKind::Db
                if matches!(self.nth_kind(1), TokenKind::LBrace)
                    || (matches!(self.nth_kind(1), TokenKind::Ident(_))
                        && matches!(self.nth_kind(2), TokenKind::LBrace)) =>
            {
                self.parse_config(ConfigKind::Db)
            }
            TokenKind::Auth => self.parse_config(ConfigKind::Auth),
            TokenKind::RateLimit => self.parse_config(ConfigKind::RateLimit),
            TokenKind::Health => self.parse_config(ConfigKind::Health),
            TokenKind::MaxBody => self.parse_config(ConfigKind::MaxBody),
            TokenKind::Static => self.parse_config(ConfigKind::Static),
            TokenKind::Discover => self.parse_config(ConfigKind::Discover),
            TokenKind::Fn if matches!(self.nth_kind(1), TokenKind::Ident(_)) => {
                Ok(ServerDecl::Fn(self.parse_fn_decl(false, false)?))
            }
            TokenKind::Async
                if matches!(self.nth_kind(1), TokenKind::Fn)
                    && matches!(self.nth_kind(2), TokenKind::Ident(_)) =>
            {
                self.advance();
                Ok(ServerDecl::Fn(self.parse_fn_decl(true, false)?))
            }
            TokenKind::Pub => {
                self.advance();
                let is_async = self.eat(&TokenKind::Async);
                Ok(ServerDecl::Fn(self.parse_fn_decl(is_async, true)?))
            }
            _ => Ok(ServerDecl::Stmt(self.parse_stmt()?)),
        }
    }

    /// Shared shape of the declarative config keywords: optional leading
    /// scalar arguments, optional `{ key: value }` body.
    fn parse_config(&mut self, kind: ConfigKind) -> PResult<ServerDecl> {
        let span = self.peek().span;
        self.advance(); // the config keyword

        let mut args: Vec<Expr> = Vec::new();
        let mut entries: Vec<(String, Expr)> = Vec::new();

        // `db postgres { ... }` - a bare engine name before the body.
        if matches!(self.peek_kind(), TokenKind::Ident(_))
            && matches!(self.nth_kind(1), TokenKind::LBrace)
        {
            let (name, ispan) = self.expect_ident("as config argument")?;
            args.push(Expr::Ident { name, span: ispan });
        }

        if self.eat(&TokenKind::LBrace) {
            loop {
                self.skip_separators();
                if self.eat(&TokenKind::RBrace) {
                    break;
                }
                let (key, kspan) = match self.peek_kind().clone() {
                    TokenKind::Str(s) => {
                        let tok = self.advance();
                        (s, tok.span)
                    }
                    _ => self.ident_like("as config key")?,
                };
                if kind == ConfigKind::Auth && !AUTH_KEYS.contains(&key.as_str()) {
                    return Err(self.err(format!("Unknown auth config key '{}'", key), kspan));
                }
                self.expect(&TokenKind::Colon, "after config key")?;
                let value = self.parse_expr()?;
                entries.push((key, value));
                while self.eat(&TokenKind::Comma) {
                    self.skip_newlines();
                }
            }
        } else {
            // Scalar form: `max_body "10mb"`, `static "/public" "./dist"`,
            // `discover true`.
            while !matches!(
                self.peek_kind(),
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            ) {
                args.push(self.parse_expr()?);
            }
        }

        Ok(ServerDecl::Config(ConfigDecl {
            kind,
            args,
            entries,
            span,
        }))
    }

    // ── Client blocks ───────────────────────────────────────────────────

    pub(crate) fn parse_client_block(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance(); // client
        self.expect(&TokenKind::LBrace, "after 'client'")?;
        self.client_depth += 1;
        let body = self.parse_client_decls();
        self.client_depth -= 1;
        Ok(Stmt::Client(ClientBlock { body: body?, span }))
    }

    fn parse_client_decls(&mut self) -> PResult<Vec<ClientDecl>> {
        let mut decls = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            if self.at(&TokenKind::Eof) {
                return Err(self.err("Expected '}' to close client block", self.peek().span));
            }
            decls.push(self.parse_client_decl()?);
        }
        Ok(decls)
    }

    pub(crate) fn parse_client_decl(&mut self) -> PResult<ClientDecl> {
        let span = self.peek().span;
        match self.peek_kind() {
            TokenKind::State => {
                self.advance();
                let (name, _) = self.expect_ident("after 'state'")?;
                self.expect(&TokenKind::Eq, "in state declaration")?;
                let value = self.parse_expr()?;
                Ok(ClientDecl::State { name, value, span })
            }
            TokenKind::Computed => {
                self.advance();
                let (name, _) = self.expect_ident("after 'computed'")?;
                self.expect(&TokenKind::Eq, "in computed declaration")?;
                let value = self.parse_expr()?;
                Ok(ClientDecl::Computed { name, value, span })
            }
            TokenKind::Effect => {
                self.advance();
                let body = self.block("after 'effect'")?;
                Ok(ClientDecl::Effect { body, span })
            }
            TokenKind::Component => {
                self.advance();
                let (name, _) = self.expect_ident("after 'component'")?;
                let params = if self.eat(&TokenKind::LParen) {
                    self.parse_params()?
                } else {
                    Vec::new()
                };
                self.skip_newlines();
                self.expect(&TokenKind::LBrace, "after component header")?;
                self.client_depth += 1;
                let result = self.parse_component_body();
                self.client_depth -= 1;
                let (body, style) = result?;
                Ok(ClientDecl::Component(ComponentDecl {
                    name,
                    params,
                    body,
                    style,
                    span,
                }))
            }
            TokenKind::Store => {
                self.advance();
                let (name, _) = self.expect_ident("after 'store'")?;
                self.expect(&TokenKind::LBrace, "after store name")?;
                self.client_depth += 1;
                let body = self.parse_client_decls();
                self.client_depth -= 1;
                Ok(ClientDecl::Store(StoreDecl {
                    name,
                    body: body?,
                    span,
                }))
            }
            TokenKind::Fn if matches!(self.nth_kind(1), TokenKind::Ident(_)) => {
                Ok(ClientDecl::Fn(self.parse_fn_decl(false, false)?))
            }
            TokenKind::Async
                if matches!(self.nth_kind(1), TokenKind::Fn)
                    && matches!(self.nth_kind(2), TokenKind::Ident(_)) =>
            {
                self.advance();
                Ok(ClientDecl::Fn(self.parse_fn_decl(true, false)?))
            }
            _ => Ok(ClientDecl::Stmt(self.parse_stmt()?)),
        }
    }

    fn parse_component_body(&mut self) -> PResult<(Vec<ClientDecl>, Option<StyleBlock>)> {
        let mut body = Vec::new();
        let mut style = None;
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            if self.at(&TokenKind::Eof) {
                return Err(self.err("Expected '}' to close component", self.peek().span));
            }
            if self.at(&TokenKind::Style) {
                let sspan = self.peek().span;
                self.advance();
                let css = self.parse_raw_style_body()?;
                if style.is_some() {
                    return Err(self.err("Component already has a style block", sspan));
                }
                style = Some(StyleBlock { css, span: sspan });
                continue;
            }
            body.push(self.parse_client_decl()?);
        }
        Ok((body, style))
    }

    /// Consumes the raw CSS between the braces of a `style { ... }` block at
    /// the byte level, then re-lexes the tail.
    fn parse_raw_style_body(&mut self) -> PResult<String> {
        let open = self.expect(&TokenKind::LBrace, "after 'style'")?;
        let bytes = self.source.as_bytes();
        let start = open.span.end;
        let mut i = start;
        let mut depth = 1usize;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        if depth != 0 {
            return Err(self.err("Unterminated style block", open.span));
        }
        let css = self.source[start..i].trim().to_string();
        self.resync(i, open.span);
        self.expect(&TokenKind::RBrace, "to close style block")?;
        Ok(css)
    }

    // ── CLI blocks ──────────────────────────────────────────────────────

    pub(crate) fn parse_cli_block(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance(); // cli
        self.expect(&TokenKind::LBrace, "after 'cli'")?;

        let mut config = Vec::new();
        let mut commands = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            match self.peek_kind() {
                TokenKind::Fn => commands.push(self.parse_fn_decl(false, false)?),
                TokenKind::Async if matches!(self.nth_kind(1), TokenKind::Fn) => {
                    self.advance();
                    commands.push(self.parse_fn_decl(true, false)?);
                }
                TokenKind::Eof => {
                    return Err(self.err("Expected '}' to close cli block", self.peek().span))
                }
                _ => {
                    let (key, _) = self.ident_like("as cli config key")?;
                    self.expect(&TokenKind::Colon, "after cli config key")?;
                    let value = self.parse_expr()?;
                    config.push((key, value));
                    while self.eat(&TokenKind::Comma) {
                        self.skip_newlines();
                    }
                }
            }
        }

        Ok(Stmt::Cli(CliBlock {
            config,
            commands,
            span,
        }))
    }

    // ── Deploy blocks ───────────────────────────────────────────────────

    pub(crate) fn parse_deploy_block(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        self.advance(); // deploy
        let (env, _) = self.expect_str("as deploy environment name")?;
        self.expect(&TokenKind::LBrace, "after deploy environment")?;

        let mut entries = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            let espan = self.peek().span;
            match self.peek_kind() {
                TokenKind::Db => {
                    self.advance();
                    let (engine, _) = self.expect_ident("as database engine")?;
                    let body = self.parse_kv_body("database")?;
                    entries.push(DeployEntry::Database {
                        engine,
                        entries: body,
                        span: espan,
                    });
                }
                TokenKind::Env => {
                    self.advance();
                    let body = self.parse_kv_body("env")?;
                    entries.push(DeployEntry::EnvVars {
                        entries: body,
                        span: espan,
                    });
                }
                TokenKind::Eof => {
                    return Err(self.err("Expected '}' to close deploy block", self.peek().span))
                }
                _ => {
                    let (key, _) = self.ident_like("as deploy setting")?;
                    self.expect(&TokenKind::Colon, "after deploy setting")?;
                    let value = self.parse_expr()?;
                    entries.push(DeployEntry::Setting {
                        key,
                        value,
                        span: espan,
                    });
                    while self.eat(&TokenKind::Comma) {
                        self.skip_newlines();
                    }
                }
            }
        }

        Ok(Stmt::Deploy(DeployBlock { env, entries, span }))
    }

    fn parse_kv_body(&mut self, what: &str) -> PResult<Vec<(String, Expr)>> {
        self.expect(&TokenKind::LBrace, &format!("in {} block", what))?;
        let mut entries = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            let (key, _) = match self.peek_kind().clone() {
                TokenKind::Str(s) => {
                    let tok = self.advance();
                    (s, tok.span)
                }
                _ => self.ident_like("as key")?,
            };
            self.expect(&TokenKind::Colon, "after key")?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            while self.eat(&TokenKind::Comma) {
                self.skip_newlines();
            }
        }
        Ok(entries)
    }
}
