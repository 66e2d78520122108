//! # tova-base
//!
//! Pure structural atoms shared by every stage of the Tova compiler:
//!
//! - [`Span`] - byte-offset + line/column source locations
//! - [`Diagnostic`] / [`Severity`] - located errors and warnings with the
//!   `file:line:column message` display format
//! - [`normalize_newlines`] - line-ending normalization, applied once before
//!   lexing
//!
//! This crate has no dependencies and no knowledge of the language itself.

pub mod diagnostic;
pub mod source;
pub mod span;

pub use diagnostic::{Diagnostic, Severity};
pub use source::normalize_newlines;
pub use span::Span;
