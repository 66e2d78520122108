//! The compilation pipeline: lex, parse, analyze, generate.

use std::fmt;

use tova_base::{normalize_newlines, Diagnostic};
use tova_language::analysis::{self, Analysis, AnalysisError};
use tova_language::lexer;
use tova_language::parser::{ParseFailure, Parser};

use crate::codegen;
use crate::output::Output;

/// Why a strict compilation failed.
#[derive(Debug)]
pub enum CompileError {
    Parse(Box<ParseFailure>),
    Analysis(AnalysisError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(failure) => write!(f, "{}", failure),
            CompileError::Analysis(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<Box<ParseFailure>> for CompileError {
    fn from(err: Box<ParseFailure>) -> Self {
        CompileError::Parse(err)
    }
}

impl From<AnalysisError> for CompileError {
    fn from(err: AnalysisError) -> Self {
        CompileError::Analysis(err)
    }
}

/// A successful strict compilation.
pub struct Compilation {
    pub output: Output,
    pub warnings: Vec<Diagnostic>,
    pub analysis: Analysis,
}

/// Strict mode: parse errors and analysis errors abort; warnings ride along.
pub fn compile(source: &str, file: &str) -> Result<Compilation, CompileError> {
    let normalized = normalize_newlines(source);
    let tokens = lexer::tokenize(&normalized);
    let program = Parser::new(&normalized, tokens, file).parse()?;
    let analysis = analysis::analyze(&program)?;
    let output = codegen::generate(&program);
    log::debug!("compiled {} ({} top-level statements)", file, program.body.len());
    Ok(Compilation {
        output,
        warnings: analysis.warnings.clone(),
        analysis,
    })
}

/// Everything the tolerant pipeline produced, error or not.
pub struct CompileResult {
    pub output: Output,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub analysis: Analysis,
}

/// Tolerant mode: always produces output from whatever parsed, plus every
/// diagnostic found along the way. Used by the language server.
pub fn compile_tolerant(source: &str, file: &str) -> CompileResult {
    let normalized = normalize_newlines(source);
    let tokens = lexer::tokenize(&normalized);
    let (program, mut errors) = Parser::new(&normalized, tokens, file).parse_tolerant();
    let analysis = analysis::analyze_tolerant(&program);
    errors.extend(analysis.errors.iter().cloned());
    let output = codegen::generate(&program);
    CompileResult {
        output,
        errors,
        warnings: analysis.warnings.clone(),
        analysis,
    }
}
