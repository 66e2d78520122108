//! The Tova abstract syntax tree.
//!
//! Each syntactic category is one tagged union: [`Expr`], [`Stmt`],
//! [`Pattern`], and the JSX node types. Pattern matching over the tags
//! replaces visitor dispatch, and spans are stored by value on every node.
//!
//! The tree is built once by the parser and consumed read-only by the
//! analyzer and the code generator.

pub mod client;
pub mod expr;
pub mod jsx;
pub mod pattern;
pub mod server;
pub mod stmt;

pub use client::{ClientBlock, ClientDecl, ComponentDecl, StoreDecl, StyleBlock};
pub use expr::{
    Arg, BinaryOp, CompareOp, Expr, LogicalOp, MatchArm, ObjectEntry, Param, TemplateChunk,
    TypeAnnotation, UnaryOp,
};
pub use jsx::{BindKind, JsxAttr, JsxChild, JsxElement};
pub use pattern::{ObjectPatternField, Pattern};
pub use server::{
    ConfigDecl, ConfigKind, EnvEntry, RouteDecl, ServerBlock, ServerDecl, WsHandler,
};
pub use stmt::{
    CliBlock, DeployBlock, DeployEntry, FnDecl, ForBinding, ImportDecl, Stmt, TestBlock,
    TypeDecl, TypeDeclKind, TypeField, Variant,
};

/// A whole compilation unit.
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub file: String,
}

impl Program {
    pub fn new(file: impl Into<String>) -> Self {
        Program {
            body: Vec::new(),
            file: file.into(),
        }
    }
}
