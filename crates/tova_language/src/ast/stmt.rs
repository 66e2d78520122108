//! Statement and declaration nodes.

use tova_base::Span;

use crate::ast::client::{ClientBlock, ClientDecl};
use crate::ast::expr::{BinaryOp, Expr, Param, TypeAnnotation};
use crate::ast::pattern::Pattern;
use crate::ast::server::{ServerBlock, ServerDecl};

/// The binding form of a `for` loop.
#[derive(Debug, Clone)]
pub enum ForBinding {
    /// `for x in xs`
    Single { name: String, span: Span },
    /// `for k, v in map`
    KeyValue { key: String, value: String, span: Span },
    /// `for [a, b] in pairs` / `for {x, y} in points`
    Destructure { pattern: Pattern, span: Span },
}

#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub is_pub: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeField {
    pub name: String,
    pub ty: Option<TypeAnnotation>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub fields: Vec<TypeField>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeDeclKind {
    /// `type Point { x: Float, y: Float }`
    Struct { fields: Vec<TypeField> },
    /// `type Opt { Some(v: Int), None }`
    Variants { variants: Vec<Variant> },
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub kind: TypeDeclKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub source: String,
    pub default: Option<String>,
    /// `(name, alias)` pairs from `import { a, b as c } from "m"`.
    pub named: Vec<(String, Option<String>)>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TestBlock {
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CliBlock {
    /// `name: "todo"`-style configuration pairs, in source order.
    pub config: Vec<(String, Expr)>,
    pub commands: Vec<FnDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum DeployEntry {
    Setting { key: String, value: Expr, span: Span },
    /// `db postgres { ... }`
    Database {
        engine: String,
        entries: Vec<(String, Expr)>,
        span: Span,
    },
    /// `env { KEY: value }`
    EnvVars { entries: Vec<(String, Expr)>, span: Span },
}

#[derive(Debug, Clone)]
pub struct DeployBlock {
    pub env: String,
    pub entries: Vec<DeployEntry>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr { expr: Expr, span: Span },
    /// `let`/`var` declaration, possibly destructuring.
    Let {
        pattern: Pattern,
        value: Expr,
        mutable: bool,
        span: Span,
    },
    /// `a = e` or `a, b = e1, e2`. A fresh name declares an immutable
    /// binding; an existing mutable one reassigns.
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
        span: Span,
    },
    CompoundAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
        span: Span,
    },
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        else_branch: Option<Vec<Stmt>>,
        span: Span,
    },
    For {
        binding: ForBinding,
        iter: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    While { cond: Expr, body: Vec<Stmt>, span: Span },
    Loop { body: Vec<Stmt>, span: Span },
    Try {
        body: Vec<Stmt>,
        catch_binding: Option<String>,
        catch_body: Vec<Stmt>,
        finally_body: Option<Vec<Stmt>>,
        span: Span,
    },
    Return { value: Option<Expr>, span: Span },
    Break { span: Span },
    Continue { span: Span },
    Fn(FnDecl),
    TypeDecl(TypeDecl),
    Import(ImportDecl),
    Server(ServerBlock),
    Client(ClientBlock),
    Shared { body: Vec<Stmt>, span: Span },
    Cli(CliBlock),
    Deploy(DeployBlock),
    Test(TestBlock),
    /// A client-only declaration found outside a `client` block (or nested in
    /// arbitrary statement position); the analyzer enforces its context.
    ClientDecl(Box<ClientDecl>),
    /// A server-only declaration in statement position; the analyzer enforces
    /// its context.
    ServerDecl(Box<ServerDecl>),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr { span, .. }
            | Stmt::Let { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::CompoundAssign { span, .. }
            | Stmt::If { span, .. }
            | Stmt::For { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Loop { span, .. }
            | Stmt::Try { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Shared { span, .. } => *span,
            Stmt::Fn(f) => f.span,
            Stmt::TypeDecl(t) => t.span,
            Stmt::Import(i) => i.span,
            Stmt::Server(s) => s.span,
            Stmt::Client(c) => c.span,
            Stmt::Cli(c) => c.span,
            Stmt::Deploy(d) => d.span,
            Stmt::Test(t) => t.span,
            Stmt::ClientDecl(d) => d.span(),
            Stmt::ServerDecl(d) => d.span(),
        }
    }

    /// True for statements after which code in the same block is unreachable.
    pub fn diverges(&self) -> bool {
        matches!(
            self,
            Stmt::Return { .. } | Stmt::Break { .. } | Stmt::Continue { .. }
        )
    }
}
