//! Per-file pipeline cache and the semantic query services the language
//! server consumes.
//!
//! A [`Session`] owns one [`FileEntry`] per open document. Each edit replaces
//! the whole entry atomically (text, tokens, AST, analysis), so readers never
//! observe a half-updated file and no locking is needed within one document.

use std::collections::HashMap;

use tova_base::{normalize_newlines, Diagnostic};

use crate::analysis::{self, Analysis, ScopeId, Symbol, SymbolKind};
use crate::ast::Program;
use crate::lexer;
use crate::parser::Parser;

/// The cached pipeline products for one file.
pub struct FileEntry {
    pub text: String,
    pub program: Program,
    pub analysis: Analysis,
    pub diagnostics: Vec<Diagnostic>,
}

/// A long-lived workspace of analyzed files, keyed by path or URI.
#[derive(Default)]
pub struct Session {
    files: HashMap<String, FileEntry>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            files: HashMap::new(),
        }
    }

    /// Runs the tolerant front-end over `text` and replaces the cache entry.
    pub fn update(&mut self, file: &str, text: &str) -> &FileEntry {
        let entry = analyze_text(file, text);
        self.files.insert(file.to_string(), entry);
        self.files.get(file).expect("entry was just inserted")
    }

    pub fn get(&self, file: &str) -> Option<&FileEntry> {
        self.files.get(file)
    }

    pub fn close(&mut self, file: &str) {
        self.files.remove(file);
    }
}

/// One tolerant front-end pass: lex, parse, analyze.
pub fn analyze_text(file: &str, text: &str) -> FileEntry {
    let normalized = normalize_newlines(text);
    let tokens = lexer::tokenize(&normalized);
    let (program, mut diagnostics) =
        Parser::new(&normalized, tokens, file).parse_tolerant();
    let analysis = analysis::analyze_tolerant(&program);
    diagnostics.extend(analysis.errors.iter().cloned());
    diagnostics.extend(analysis.warnings.iter().cloned());
    log::debug!(
        "analyzed {}: {} statements, {} diagnostics",
        file,
        program.body.len(),
        diagnostics.len()
    );
    FileEntry {
        text: normalized,
        program,
        analysis,
        diagnostics,
    }
}

/// A flattened view of one symbol for outlines and completion.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    pub line: u32,
    pub column: u32,
    pub detail: Option<String>,
}

/// Every user-declared symbol in the program, in declaration order.
pub fn collect_symbols(analysis: &Analysis) -> Vec<SymbolInfo> {
    let mut out = Vec::new();
    let tree = &analysis.tree;
    for scope_idx in 0..tree.scope_count() {
        let scope = ScopeId(scope_idx as u32);
        for id in tree.local_symbols(scope) {
            let sym = tree.symbol(id);
            if sym.kind == SymbolKind::Builtin {
                continue;
            }
            out.push(SymbolInfo {
                name: sym.name.clone(),
                kind: sym.kind,
                line: sym.span.line,
                column: sym.span.column,
                detail: symbol_detail(sym),
            });
        }
    }
    out.sort_by_key(|info| (info.line, info.column));
    out
}

/// A human-readable signature or type for hover text.
pub fn symbol_detail(sym: &Symbol) -> Option<String> {
    match sym.kind {
        SymbolKind::Function | SymbolKind::Builtin if !sym.param_names.is_empty() || sym.kind == SymbolKind::Function => {
            let params = format_members(sym);
            let ret = sym
                .return_type
                .as_ref()
                .map(|t| format!(" -> {}", t))
                .unwrap_or_default();
            Some(format!("fn {}({}){}", sym.name, params, ret))
        }
        // Struct type symbols carry their field names and types in
        // `param_names`/`param_types`; render them as the declaration shape.
        SymbolKind::Type if !sym.param_names.is_empty() => {
            Some(format!("type {} {{ {} }}", sym.name, format_members(sym)))
        }
        _ => sym
            .type_annotation
            .clone()
            .or_else(|| sym.inferred_type.clone()),
    }
}

/// `name: Type` pairs from a symbol's parameter or field lists.
fn format_members(sym: &Symbol) -> String {
    sym.param_names
        .iter()
        .zip(sym.param_types.iter().chain(std::iter::repeat(&None)))
        .map(|(name, ty)| match ty {
            Some(t) => format!("{}: {}", name, t),
            None => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves `name` as seen from the innermost scope at a 1-based position.
pub fn find_symbol_at_position<'a>(
    analysis: &'a Analysis,
    name: &str,
    line: u32,
    column: u32,
) -> Option<&'a Symbol> {
    let scope = analysis.tree.find_scope_at(line, column);
    let id = analysis.tree.lookup(scope, name)?;
    Some(analysis.tree.symbol(id))
}

/// The innermost scope enclosing a 1-based position.
pub fn find_scope_at_position(analysis: &Analysis, line: u32, column: u32) -> ScopeId {
    analysis.tree.find_scope_at(line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_replaces_entry_atomically() {
        let mut session = Session::new();
        session.update("app.tova", "x = 1\n");
        let first_len = session.get("app.tova").unwrap().text.len();
        session.update("app.tova", "x = 1\ny = 2\n");
        let entry = session.get("app.tova").unwrap();
        assert!(entry.text.len() > first_len);
        assert_eq!(entry.program.body.len(), 2);
    }

    #[test]
    fn collect_symbols_reports_declarations() {
        let entry = analyze_text("app.tova", "fn greet(name) { print(name) }\nx = greet(\"hi\")\n");
        let symbols = collect_symbols(&entry.analysis);
        assert!(symbols.iter().any(|s| s.name == "greet" && s.kind == SymbolKind::Function));
        assert!(symbols.iter().any(|s| s.name == "x"));
    }

    #[test]
    fn symbol_detail_renders_struct_fields() {
        let source = "type Person {\n    name: String\n    age: Int\n}\np = Person(\"ada\", 36)\nprint(p)\n";
        let entry = analyze_text("app.tova", source);
        let sym = find_symbol_at_position(&entry.analysis, "Person", 5, 5)
            .expect("Person should resolve");
        assert_eq!(
            symbol_detail(sym).as_deref(),
            Some("type Person { name: String, age: Int }")
        );
    }

    #[test]
    fn find_symbol_at_position_sees_scope_locals() {
        let source = "fn outer() {\n    inner = 41\n    print(inner)\n}\n";
        let entry = analyze_text("app.tova", source);
        let sym = find_symbol_at_position(&entry.analysis, "inner", 3, 5);
        assert!(sym.is_some());
        assert_eq!(sym.unwrap().kind, SymbolKind::Variable);
    }

    #[test]
    fn close_removes_entry() {
        let mut session = Session::new();
        session.update("a.tova", "x = 1\n");
        session.close("a.tova");
        assert!(session.get("a.tova").is_none());
    }
}
