//! Server-block declarations: routes, middleware, sockets, schedulers, and
//! the declarative configuration family.

use tova_base::Span;

use crate::ast::expr::{Expr, Param};
use crate::ast::stmt::{FnDecl, Stmt, TypeField};

#[derive(Debug, Clone)]
pub struct ServerBlock {
    /// Named blocks participate in inter-server RPC and get their own output
    /// stream; unnamed blocks merge into the single `server` stream.
    pub name: Option<String>,
    pub body: Vec<ServerDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct RouteDecl {
    pub method: String,
    pub path: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WsHandler {
    /// One of `on_open`, `on_message`, `on_close`, `on_error`.
    pub event: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnvEntry {
    pub name: String,
    pub default: Option<Expr>,
    pub span: Span,
}

/// The declarative configuration keywords that share one parse shape:
/// optional scalar arguments or a `{ key: value }` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Upload,
    Session,
    Cache,
    Tls,
    Cors,
    Compression,
    Db,
    Auth,
    RateLimit,
    Health,
    MaxBody,
    Static,
    Discover,
}

impl ConfigKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ConfigKind::Upload => "upload",
            ConfigKind::Session => "session",
            ConfigKind::Cache => "cache",
            ConfigKind::Tls => "tls",
            ConfigKind::Cors => "cors",
            ConfigKind::Compression => "compression",
            ConfigKind::Db => "db",
            ConfigKind::Auth => "auth",
            ConfigKind::RateLimit => "rate_limit",
            ConfigKind::Health => "health",
            ConfigKind::MaxBody => "max_body",
            ConfigKind::Static => "static",
            ConfigKind::Discover => "discover",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigDecl {
    pub kind: ConfigKind,
    /// Scalar arguments, e.g. `static "/public" "./dist"`.
    pub args: Vec<Expr>,
    /// Key-value body, e.g. `cors { origins: [...] }`.
    pub entries: Vec<(String, Expr)>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ServerDecl {
    Route(RouteDecl),
    RouteGroup {
        prefix: String,
        body: Vec<ServerDecl>,
        span: Span,
    },
    Middleware {
        params: Vec<Param>,
        body: Vec<Stmt>,
        span: Span,
    },
    Ws {
        path: String,
        handlers: Vec<WsHandler>,
        span: Span,
    },
    Sse {
        path: String,
        params: Vec<Param>,
        body: Vec<Stmt>,
        span: Span,
    },
    Schedule { spec: String, body: Vec<Stmt>, span: Span },
    Background { name: String, body: Vec<Stmt>, span: Span },
    OnStart { body: Vec<Stmt>, span: Span },
    OnStop { body: Vec<Stmt>, span: Span },
    OnError { params: Vec<Param>, body: Vec<Stmt>, span: Span },
    Subscribe {
        topic: String,
        params: Vec<Param>,
        body: Vec<Stmt>,
        span: Span,
    },
    Model {
        name: String,
        fields: Vec<TypeField>,
        span: Span,
    },
    Env { entries: Vec<EnvEntry>, span: Span },
    Config(ConfigDecl),
    /// An RPC-exposed function.
    Fn(FnDecl),
    /// A plain statement living in the server scope.
    Stmt(Stmt),
}

impl ServerDecl {
    pub fn span(&self) -> Span {
        match self {
            ServerDecl::Route(r) => r.span,
            ServerDecl::RouteGroup { span, .. }
            | ServerDecl::Middleware { span, .. }
            | ServerDecl::Ws { span, .. }
            | ServerDecl::Sse { span, .. }
            | ServerDecl::Schedule { span, .. }
            | ServerDecl::Background { span, .. }
            | ServerDecl::OnStart { span, .. }
            | ServerDecl::OnStop { span, .. }
            | ServerDecl::OnError { span, .. }
            | ServerDecl::Subscribe { span, .. }
            | ServerDecl::Model { span, .. }
            | ServerDecl::Env { span, .. } => *span,
            ServerDecl::Config(c) => c.span,
            ServerDecl::Fn(f) => f.span,
            ServerDecl::Stmt(s) => s.span(),
        }
    }

    /// The declaration keyword, used in context-mismatch diagnostics.
    pub fn keyword(&self) -> &'static str {
        match self {
            ServerDecl::Route(_) => "route",
            ServerDecl::RouteGroup { .. } => "routes",
            ServerDecl::Middleware { .. } => "middleware",
            ServerDecl::Ws { .. } => "ws",
            ServerDecl::Sse { .. } => "sse",
            ServerDecl::Schedule { .. } => "schedule",
            ServerDecl::Background { .. } => "background",
            ServerDecl::OnStart { .. } => "on_start",
            ServerDecl::OnStop { .. } => "on_stop",
            ServerDecl::OnError { .. } => "on_error",
            ServerDecl::Subscribe { .. } => "subscribe",
            ServerDecl::Model { .. } => "model",
            ServerDecl::Env { .. } => "env",
            ServerDecl::Config(c) => c.kind.keyword(),
            ServerDecl::Fn(_) => "fn",
            ServerDecl::Stmt(_) => "statement",
        }
    }
}
