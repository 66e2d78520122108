//! # tova-lsp
//!
//! Language server for Tova, built on `tower-lsp` over the tolerant
//! front-end in `tova-language`.
//!
//! Documents sync in FULL mode; every change re-runs the pipeline and
//! replaces the per-URI [`document::DocumentState`] atomically, then the
//! collected diagnostics are published. Hover, go-to-definition, and
//! document symbols are answered from the analyzer's scope tree without
//! touching the AST.

pub mod document;
pub mod server;
pub mod state;

pub use server::TovaServer;
