//! # tova-language
//!
//! The Tova front-end: lexer, parser, AST, and semantic analyzer.
//!
//! Tova is a full-stack application language: one source file describes
//! server routes, reactive client UI, and shared logic, and compiles to
//! JavaScript on a fixed runtime API. This crate owns everything up to (but
//! not including) code generation:
//!
//! 1. **Lexer** ([`lexer`]) - source text to a token stream with source
//!    locations, context-sensitive regex detection, and pre-segmented
//!    template interpolation.
//! 2. **Parser** ([`parser`]) - tokens to a [`Program`] AST, with Pratt
//!    expression parsing, speculative lambda disambiguation, a JSX
//!    sub-parser, and tolerant recovery for the language server.
//! 3. **Analyzer** ([`analysis`]) - scope and symbol tables, block-context
//!    enforcement, inter-server RPC resolution, and style/flow warnings,
//!    with multi-error accumulation.
//!
//! ## Quick start
//!
//! ```
//! use tova_language::{analysis, lexer, parser::Parser};
//!
//! let source = "greeting = \"hello\"\nprint(greeting)\n";
//! let tokens = lexer::tokenize(source);
//! let program = Parser::new(source, tokens, "app.tova").parse().unwrap();
//! let analysis = analysis::analyze(&program).unwrap();
//! assert!(analysis.warnings.is_empty());
//! ```
//!
//! The language server drives the same pipeline through [`Session`], which
//! caches `{text, ast, analysis}` per file and swaps entries atomically on
//! every edit.

pub mod analysis;
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod session;
pub mod suggest;
pub mod token;

pub use analysis::{analyze, analyze_tolerant, Analysis, AnalysisError};
pub use ast::Program;
pub use lexer::{tokenize, Lexer};
pub use parser::{ParseFailure, Parser};
pub use session::{
    analyze_text, collect_symbols, find_scope_at_position, find_symbol_at_position, Session,
};
pub use token::{Token, TokenKind};
