//! Semantic analysis.
//!
//! A single depth-first traversal over the AST that:
//!
//! 1. Builds the scope tree and installs symbols, rejecting duplicates.
//! 2. Enforces block contexts: `state`/`component`/`computed`/`effect`/
//!    `store` belong to client blocks, the server declaration family to
//!    server blocks.
//! 3. Resolves identifier references, marking symbols used and suggesting
//!    near-miss names for misses.
//! 4. Resolves inter-server RPC calls against a pre-pass of named server
//!    blocks, warning on self-calls.
//! 5. Emits style and flow warnings: unused symbols, shadowing,
//!    non-exhaustive matches, unreachable code and arms, constant
//!    conditions, naming conventions.
//!
//! Errors accumulate across the whole traversal; strict mode packages them
//! into a single [`AnalysisError`] at the end so one pass reports everything.

pub mod builtins;
pub mod scope;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use tova_base::{Diagnostic, Span};

use crate::ast::{
    Arg, ClientDecl, CliBlock, ComponentDecl, DeployBlock, DeployEntry, Expr, FnDecl, ForBinding,
    JsxAttr, JsxChild, JsxElement, ObjectEntry, Pattern, Program, ServerBlock, ServerDecl, Stmt,
    StoreDecl, TemplateChunk, TypeDecl, TypeDeclKind,
};
use crate::suggest;

pub use scope::{BlockContext, Scope, ScopeContext, ScopeId, ScopeTree, Symbol, SymbolId, SymbolKind};

/// The result of analyzing one program.
#[derive(Debug)]
pub struct Analysis {
    pub tree: ScopeTree,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

/// All analysis errors from one pass, packaged as a single error value.
#[derive(Debug)]
pub struct AnalysisError {
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis errors")?;
        for diag in &self.diagnostics {
            writeln!(f, "  {}", diag)?;
        }
        Ok(())
    }
}

impl std::error::Error for AnalysisError {}

/// Strict-mode analysis: collects every error, then fails if any were found.
pub fn analyze(program: &Program) -> Result<Analysis, AnalysisError> {
    let analysis = analyze_tolerant(program);
    if analysis.errors.is_empty() {
        Ok(analysis)
    } else {
        Err(AnalysisError {
            diagnostics: analysis.errors,
        })
    }
}

/// Tolerant analysis: always returns the scope tree, errors, and warnings.
pub fn analyze_tolerant(program: &Program) -> Analysis {
    let mut analyzer = Analyzer::new(&program.file);
    analyzer.run(program);
    Analysis {
        tree: analyzer.tree,
        errors: analyzer.errors,
        warnings: analyzer.warnings,
    }
}

struct Analyzer {
    file: String,
    tree: ScopeTree,
    current: ScopeId,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    /// Named server block -> function name -> parameter names.
    server_fns: BTreeMap<String, HashMap<String, Vec<String>>>,
    current_server: Option<String>,
    /// Variant-bearing type -> its variant names, for exhaustiveness.
    variant_types: HashMap<String, Vec<String>>,
}

impl Analyzer {
    fn new(file: &str) -> Self {
        let mut tree = ScopeTree::new();
        builtins::register(&mut tree);
        let mut variant_types = HashMap::new();
        for (ty, variants) in builtins::BUILTIN_VARIANTS {
            variant_types.insert(
                ty.to_string(),
                variants.iter().map(|v| v.to_string()).collect(),
            );
        }
        let current = tree.root();
        Analyzer {
            file: file.to_string(),
            tree,
            current,
            errors: Vec::new(),
            warnings: Vec::new(),
            server_fns: BTreeMap::new(),
            current_server: None,
            variant_types,
        }
    }

    fn run(&mut self, program: &Program) {
        self.prepass_servers(&program.body);
        self.visit_stmts(&program.body);
        self.check_unused(self.current);
    }

    // ── Pre-pass: named server RPC surface ──────────────────────────────

    fn prepass_servers(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let Stmt::Server(block) = stmt {
                if let Some(name) = &block.name {
                    let mut fns = HashMap::new();
                    Self::collect_server_fns(&block.body, &mut fns);
                    self.server_fns.insert(name.clone(), fns);
                }
            }
        }
    }

    fn collect_server_fns(decls: &[ServerDecl], out: &mut HashMap<String, Vec<String>>) {
        for decl in decls {
            match decl {
                ServerDecl::Fn(f) => {
                    out.insert(
                        f.name.clone(),
                        f.params.iter().map(|p| p.name.clone()).collect(),
                    );
                }
                ServerDecl::RouteGroup { body, .. } => Self::collect_server_fns(body, out),
                _ => {}
            }
        }
    }

    // ── Diagnostics and scope helpers ───────────────────────────────────

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors
            .push(Diagnostic::error(message, span, self.file.clone()));
    }

    fn warn(&mut self, message: impl Into<String>, span: Span) {
        self.warnings
            .push(Diagnostic::warning(message, span, self.file.clone()));
    }

    fn enter(&mut self, context: ScopeContext, start: Span) {
        self.current = self.tree.push_scope(self.current, context, start);
    }

    fn exit(&mut self, end: Span) {
        self.check_unused(self.current);
        self.tree.set_scope_end(self.current, end);
        if let Some(parent) = self.tree.scope(self.current).parent {
            self.current = parent;
        }
    }

    fn check_unused(&mut self, scope: ScopeId) {
        let mut pending = Vec::new();
        for id in self.tree.local_symbols(scope) {
            let sym = self.tree.symbol(id);
            if sym.used || sym.exempt_unused || sym.name.starts_with('_') || sym.name == "main" {
                continue;
            }
            match sym.kind {
                SymbolKind::Variable => {
                    pending.push((format!("Unused variable '{}'", sym.name), sym.span))
                }
                SymbolKind::Function => {
                    pending.push((format!("Unused function '{}'", sym.name), sym.span))
                }
                _ => {}
            }
        }
        for (msg, span) in pending {
            self.warn(msg, span);
        }
    }

    /// Installs a symbol, reporting duplicates and shadowing. Re-declaring
    /// the exact symbol installed by a hoisting pre-pass (same name, same
    /// span) is a no-op.
    fn declare(&mut self, symbol: Symbol) -> Option<SymbolId> {
        if let Some(existing) = self.tree.lookup_local(self.current, &symbol.name) {
            if self.tree.symbol(existing).span == symbol.span {
                return Some(existing);
            }
            // User code may redefine a seeded builtin (e.g. its own
            // `Some`/`None` constructors); real duplicates are errors.
            if self.tree.symbol(existing).kind == SymbolKind::Builtin {
                return Some(self.tree.override_symbol(self.current, symbol));
            }
            self.error(format!("'{}' is already defined", symbol.name), symbol.span);
            return None;
        }
        if let Some(outer) = self.tree.lookup_outer(self.current, &symbol.name) {
            if self.tree.symbol(outer).kind != SymbolKind::Builtin {
                self.warn(
                    format!("'{}' shadows an earlier declaration", symbol.name),
                    symbol.span,
                );
            }
        }
        let name_starts_underscore = symbol.name.starts_with('_');
        let mut symbol = symbol;
        if name_starts_underscore {
            symbol.exempt_unused = true;
        }
        match self.tree.declare(self.current, symbol) {
            Ok(id) => Some(id),
            Err(_) => None,
        }
    }

    fn undefined(&mut self, name: &str, span: Span) {
        let hint = suggest::closest(name, self.tree.visible_names(self.current).into_iter());
        let message = match hint {
            Some(suggestion) => format!(
                "'{}' is not defined (hint: did you mean '{}'?)",
                name, suggestion
            ),
            None => format!("'{}' is not defined", name),
        };
        self.error(message, span);
    }

    fn end_of_stmts(stmts: &[Stmt], fallback: Span) -> Span {
        stmts.last().map(|s| s.span()).unwrap_or(fallback)
    }

    // ── Naming conventions ──────────────────────────────────────────────

    fn check_snake_case(&mut self, name: &str, span: Span) {
        if name.chars().any(|c| c.is_ascii_uppercase()) {
            let snake = to_snake_case(name);
            self.warn(
                format!(
                    "Function '{}' should use snake_case (hint: Rename '{}' to '{}')",
                    name, name, snake
                ),
                span,
            );
        }
    }

    fn check_pascal_case(&mut self, name: &str, span: Span) {
        let starts_lower = name.chars().next().map_or(false, |c| c.is_ascii_lowercase());
        if starts_lower || name.contains('_') {
            let pascal = to_pascal_case(name);
            self.warn(
                format!(
                    "Type '{}' should use PascalCase (hint: Rename '{}' to '{}')",
                    name, name, pascal
                ),
                span,
            );
        }
    }

    // ── Hoisting ────────────────────────────────────────────────────────

    fn hoist_fn(&mut self, decl: &FnDecl, rpc_exposed: bool) {
        let mut sym = Symbol::new(&decl.name, SymbolKind::Function, decl.span);
        sym.param_names = decl.params.iter().map(|p| p.name.clone()).collect();
        sym.param_types = decl
            .params
            .iter()
            .map(|p| p.ty.as_ref().map(|t| t.display()))
            .collect();
        sym.return_type = decl.return_type.as_ref().map(|t| t.display());
        sym.exempt_unused = decl.is_pub || rpc_exposed || decl.name == "main";
        self.declare(sym);
    }

    fn hoist_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let Stmt::Fn(decl) = stmt {
                self.hoist_fn(decl, false);
            }
        }
    }

    fn hoist_client_decls(&mut self, decls: &[ClientDecl]) {
        for decl in decls {
            match decl {
                ClientDecl::Fn(f) => self.hoist_fn(f, false),
                ClientDecl::Component(c) => {
                    let mut sym = Symbol::new(&c.name, SymbolKind::Function, c.span);
                    sym.param_names = c.params.iter().map(|p| p.name.clone()).collect();
                    sym.exempt_unused = true;
                    self.declare(sym);
                }
                ClientDecl::Store(s) => {
                    let mut sym = Symbol::new(&s.name, SymbolKind::Variable, s.span);
                    sym.inferred_type = Some("Store".to_string());
                    sym.exempt_unused = true;
                    self.declare(sym);
                }
                _ => {}
            }
        }
    }

    fn hoist_server_decls(&mut self, decls: &[ServerDecl]) {
        for decl in decls {
            match decl {
                ServerDecl::Fn(f) => self.hoist_fn(f, true),
                ServerDecl::RouteGroup { body, .. } => self.hoist_server_decls(body),
                _ => {}
            }
        }
    }

    // ── Statements ──────────────────────────────────────────────────────

    fn visit_stmts(&mut self, stmts: &[Stmt]) {
        self.hoist_stmts(stmts);
        let mut diverged = false;
        let mut reported = false;
        for stmt in stmts {
            if diverged && !reported {
                self.warn("Unreachable code", stmt.span());
                reported = true;
            }
            self.visit_stmt(stmt);
            if stmt.diverges() {
                diverged = true;
            }
        }
    }

    fn visit_block(&mut self, stmts: &[Stmt], start: Span) {
        self.enter(ScopeContext::Block, start);
        self.visit_stmts(stmts);
        self.exit(Self::end_of_stmts(stmts, start));
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr { expr, .. } => self.visit_expr(expr),
            Stmt::Let {
                pattern,
                value,
                mutable,
                span: _,
            } => {
                self.visit_expr(value);
                let inferred = self.infer_type(value);
                self.declare_pattern(pattern, *mutable, inferred);
            }
            Stmt::Assign { targets, values, .. } => {
                for value in values {
                    self.visit_expr(value);
                }
                let inferred = if targets.len() == 1 && values.len() == 1 {
                    self.infer_type(&values[0])
                } else {
                    None
                };
                for target in targets {
                    self.assign_target(target, inferred.clone());
                }
            }
            Stmt::CompoundAssign { target, value, .. } => {
                self.visit_expr(value);
                match target {
                    Expr::Ident { name, span } if name != "_" => {
                        match self.tree.lookup(self.current, name) {
                            None => self.undefined(name, *span),
                            Some(id) => {
                                let sym = self.tree.symbol(id);
                                if !sym.mutable && !sym.reactive {
                                    let msg = format!(
                                        "Cannot reassign immutable variable '{}'",
                                        name
                                    );
                                    self.error(msg, *span);
                                }
                            }
                        }
                    }
                    Expr::Ident { .. } => {}
                    other => self.visit_expr(other),
                }
            }
            Stmt::If {
                branches,
                else_branch,
                span,
            } => {
                for (cond, body) in branches {
                    self.check_const_condition(cond, false);
                    self.visit_expr(cond);
                    self.visit_block(body, *span);
                }
                if let Some(body) = else_branch {
                    self.visit_block(body, *span);
                }
            }
            Stmt::While { cond, body, span } => {
                // `while true` is the idiomatic infinite loop; only a
                // constant false is suspicious.
                self.check_const_condition(cond, true);
                self.visit_expr(cond);
                self.visit_block(body, *span);
            }
            Stmt::Loop { body, span } => self.visit_block(body, *span),
            Stmt::For {
                binding,
                iter,
                body,
                span,
            } => {
                self.visit_expr(iter);
                self.enter(ScopeContext::Block, *span);
                match binding {
                    ForBinding::Single { name, span } => {
                        self.declare(Symbol::new(name, SymbolKind::Variable, *span));
                    }
                    ForBinding::KeyValue { key, value, span } => {
                        self.declare(Symbol::new(key, SymbolKind::Variable, *span));
                        self.declare(Symbol::new(value, SymbolKind::Variable, *span));
                    }
                    ForBinding::Destructure { pattern, .. } => {
                        self.declare_pattern(pattern, false, None);
                    }
                }
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            Stmt::Try {
                body,
                catch_binding,
                catch_body,
                finally_body,
                span,
            } => {
                self.visit_block(body, *span);
                self.enter(ScopeContext::Block, *span);
                if let Some(name) = catch_binding {
                    let mut sym = Symbol::new(name, SymbolKind::Variable, *span);
                    sym.exempt_unused = true;
                    self.declare(sym);
                }
                self.visit_stmts(catch_body);
                self.exit(Self::end_of_stmts(catch_body, *span));
                if let Some(finally) = finally_body {
                    self.visit_block(finally, *span);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            Stmt::Break { .. } | Stmt::Continue { .. } => {}
            Stmt::Fn(decl) => self.visit_fn(decl, false),
            Stmt::TypeDecl(decl) => self.visit_type_decl(decl),
            Stmt::Import(decl) => {
                if let Some(name) = &decl.default {
                    self.declare(Symbol::new(name, SymbolKind::Variable, decl.span));
                }
                for (name, alias) in &decl.named {
                    let bound = alias.as_ref().unwrap_or(name);
                    self.declare(Symbol::new(bound, SymbolKind::Variable, decl.span));
                }
            }
            Stmt::Server(block) => self.visit_server_block(block),
            Stmt::Client(block) => {
                self.enter(ScopeContext::Client, block.span);
                self.hoist_client_decls(&block.body);
                for decl in &block.body {
                    self.visit_client_decl(decl);
                }
                let end = block.body.last().map(|d| d.span()).unwrap_or(block.span);
                self.exit(end);
            }
            Stmt::Shared { body, span } => {
                self.enter(ScopeContext::Shared, *span);
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            Stmt::Cli(block) => self.visit_cli_block(block),
            Stmt::Deploy(block) => self.visit_deploy_block(block),
            Stmt::Test(block) => self.visit_block(&block.body, block.span),
            Stmt::ClientDecl(decl) => {
                self.check_client_context(decl);
                self.visit_client_decl(decl);
            }
            Stmt::ServerDecl(decl) => {
                self.check_server_context(decl);
                self.visit_server_decl(decl);
            }
        }
    }

    fn check_const_condition(&mut self, cond: &Expr, allow_true: bool) {
        match cond {
            Expr::Bool { value: true, span } if !allow_true => {
                self.warn("Condition is always true", *span)
            }
            Expr::Bool { value: false, span } => self.warn("Condition is always false", *span),
            _ => {}
        }
    }

    fn assign_target(&mut self, target: &Expr, inferred: Option<String>) {
        match target {
            Expr::Ident { name, .. } if name == "_" => {}
            Expr::Ident { name, span } => match self.tree.lookup(self.current, name) {
                None => {
                    let mut sym = Symbol::new(name, SymbolKind::Variable, *span);
                    sym.inferred_type = inferred;
                    self.declare(sym);
                }
                Some(id) => {
                    let sym = self.tree.symbol(id);
                    if !sym.mutable && !sym.reactive {
                        let msg = format!("Cannot reassign immutable variable '{}'", name);
                        self.error(msg, *span);
                    }
                }
            },
            other => self.visit_expr(other),
        }
    }

    fn declare_pattern(&mut self, pattern: &Pattern, mutable: bool, inferred: Option<String>) {
        match pattern {
            Pattern::Binding { name, span } => {
                let mut sym = Symbol::new(name, SymbolKind::Variable, *span);
                sym.mutable = mutable;
                sym.inferred_type = inferred;
                self.declare(sym);
            }
            Pattern::Wildcard { .. } => {}
            Pattern::Variant { args, .. } => {
                for arg in args {
                    self.declare_pattern(arg, mutable, None);
                }
            }
            Pattern::Array { items, rest, span } => {
                for item in items {
                    self.declare_pattern(item, mutable, None);
                }
                if let Some(rest) = rest {
                    let mut sym = Symbol::new(rest, SymbolKind::Variable, *span);
                    sym.mutable = mutable;
                    self.declare(sym);
                }
            }
            Pattern::Object { fields, .. } => {
                for field in fields {
                    if let Some(default) = &field.default {
                        self.visit_expr(default);
                    }
                    match &field.pattern {
                        Some(p) => self.declare_pattern(p, mutable, None),
                        None => {
                            let mut sym =
                                Symbol::new(&field.key, SymbolKind::Variable, field.span);
                            sym.mutable = mutable;
                            self.declare(sym);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn visit_fn(&mut self, decl: &FnDecl, rpc_exposed: bool) {
        self.check_snake_case(&decl.name, decl.span);
        self.hoist_fn(decl, rpc_exposed);
        self.enter(ScopeContext::Function, decl.span);
        for param in &decl.params {
            if let Some(default) = &param.default {
                self.visit_expr(default);
            }
            let mut sym = Symbol::new(&param.name, SymbolKind::Variable, param.span);
            sym.type_annotation = param.ty.as_ref().map(|t| t.display());
            sym.exempt_unused = true;
            self.declare(sym);
        }
        self.visit_stmts(&decl.body);
        self.exit(Self::end_of_stmts(&decl.body, decl.span));
    }

    fn visit_type_decl(&mut self, decl: &TypeDecl) {
        self.check_pascal_case(&decl.name, decl.span);
        let mut sym = Symbol::new(&decl.name, SymbolKind::Type, decl.span);
        sym.exempt_unused = true;
        if let TypeDeclKind::Struct { fields } = &decl.kind {
            sym.param_names = fields.iter().map(|f| f.name.clone()).collect();
            sym.param_types = fields
                .iter()
                .map(|f| f.ty.as_ref().map(|t| t.display()))
                .collect();
        }
        self.declare(sym);

        if let TypeDeclKind::Variants { variants } = &decl.kind {
            self.variant_types.insert(
                decl.name.clone(),
                variants.iter().map(|v| v.name.clone()).collect(),
            );
            for variant in variants {
                let mut vsym = Symbol::new(&variant.name, SymbolKind::Function, variant.span);
                vsym.variant_of = Some(decl.name.clone());
                vsym.param_names = variant.fields.iter().map(|f| f.name.clone()).collect();
                vsym.param_types = variant
                    .fields
                    .iter()
                    .map(|f| f.ty.as_ref().map(|t| t.display()))
                    .collect();
                vsym.exempt_unused = true;
                self.declare(vsym);
            }
        }
    }

    // ── Server blocks ───────────────────────────────────────────────────

    fn visit_server_block(&mut self, block: &ServerBlock) {
        let previous = self.current_server.take();
        self.current_server = block.name.clone();
        self.enter(ScopeContext::Server, block.span);
        self.hoist_server_decls(&block.body);
        for decl in &block.body {
            self.visit_server_decl(decl);
        }
        let end = block.body.last().map(|d| d.span()).unwrap_or(block.span);
        self.exit(end);
        self.current_server = previous;
    }

    fn check_server_context(&mut self, decl: &ServerDecl) {
        if matches!(decl, ServerDecl::Fn(_) | ServerDecl::Stmt(_)) {
            return;
        }
        if self.tree.block_context(self.current) != BlockContext::Server {
            self.error(
                format!(
                    "'{}' can only be used inside a server block",
                    decl.keyword()
                ),
                decl.span(),
            );
        }
    }

    fn visit_server_decl(&mut self, decl: &ServerDecl) {
        match decl {
            ServerDecl::Route(route) => {
                self.enter(ScopeContext::Function, route.span);
                self.declare_request_param();
                for param in &route.params {
                    let mut sym = Symbol::new(&param.name, SymbolKind::Variable, param.span);
                    sym.exempt_unused = true;
                    self.declare(sym);
                }
                self.visit_stmts(&route.body);
                self.exit(Self::end_of_stmts(&route.body, route.span));
            }
            ServerDecl::RouteGroup { body, span, .. } => {
                self.enter(ScopeContext::RouteGroup, *span);
                self.hoist_server_decls(body);
                for decl in body {
                    self.visit_server_decl(decl);
                }
                let end = body.last().map(|d| d.span()).unwrap_or(*span);
                self.exit(end);
            }
            ServerDecl::Middleware { params, body, span } => {
                self.enter(ScopeContext::Function, *span);
                if params.is_empty() {
                    self.declare_request_param();
                    let mut next = Symbol::new("next", SymbolKind::Variable, *span);
                    next.exempt_unused = true;
                    self.declare(next);
                } else {
                    self.declare_handler_params(params);
                }
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            ServerDecl::Ws { handlers, .. } => {
                for handler in handlers {
                    self.enter(ScopeContext::Function, handler.span);
                    if handler.params.is_empty() {
                        self.declare_implicit("socket");
                    }
                    self.declare_handler_params(&handler.params);
                    self.visit_stmts(&handler.body);
                    self.exit(Self::end_of_stmts(&handler.body, handler.span));
                }
            }
            // Handlers without an explicit parameter list get the implicit
            // names the generated code binds.
            ServerDecl::Sse { params, body, span, .. } => {
                self.enter(ScopeContext::Function, *span);
                if params.is_empty() {
                    self.declare_implicit("req");
                    self.declare_implicit("send");
                }
                self.declare_handler_params(params);
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            ServerDecl::OnError { params, body, span } => {
                self.enter(ScopeContext::Function, *span);
                if params.is_empty() {
                    self.declare_implicit("err");
                    self.declare_implicit("req");
                }
                self.declare_handler_params(params);
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            ServerDecl::Subscribe { params, body, span, .. } => {
                self.enter(ScopeContext::Function, *span);
                if params.is_empty() {
                    self.declare_implicit("message");
                }
                self.declare_handler_params(params);
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            ServerDecl::Schedule { body, span, .. }
            | ServerDecl::Background { body, span, .. }
            | ServerDecl::OnStart { body, span }
            | ServerDecl::OnStop { body, span } => {
                self.enter(ScopeContext::Function, *span);
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            ServerDecl::Model { name, span, .. } => {
                self.check_pascal_case(name, *span);
                let mut sym = Symbol::new(name, SymbolKind::Type, *span);
                sym.exempt_unused = true;
                self.declare(sym);
            }
            ServerDecl::Env { entries, .. } => {
                for entry in entries {
                    if let Some(default) = &entry.default {
                        self.visit_expr(default);
                    }
                    let mut sym = Symbol::new(&entry.name, SymbolKind::Variable, entry.span);
                    sym.exempt_unused = true;
                    self.declare(sym);
                }
            }
            ServerDecl::Config(config) => {
                for arg in &config.args {
                    // Engine names (`db postgres`) are labels, not references.
                    if !matches!(arg, Expr::Ident { .. }) {
                        self.visit_expr(arg);
                    }
                }
                for (_, value) in &config.entries {
                    self.visit_expr(value);
                }
            }
            ServerDecl::Fn(decl) => self.visit_fn(decl, true),
            ServerDecl::Stmt(stmt) => self.visit_stmt(stmt),
        }
    }

    fn declare_request_param(&mut self) {
        self.declare_implicit("req");
    }

    fn declare_implicit(&mut self, name: &str) {
        let mut sym = Symbol::new(name, SymbolKind::Variable, Span::default());
        sym.exempt_unused = true;
        self.declare(sym);
    }

    fn declare_handler_params(&mut self, params: &[crate::ast::Param]) {
        for param in params {
            let mut sym = Symbol::new(&param.name, SymbolKind::Variable, param.span);
            sym.exempt_unused = true;
            self.declare(sym);
        }
    }

    // ── Client blocks ───────────────────────────────────────────────────

    fn check_client_context(&mut self, decl: &ClientDecl) {
        if matches!(decl, ClientDecl::Fn(_) | ClientDecl::Stmt(_)) {
            return;
        }
        if self.tree.block_context(self.current) != BlockContext::Client {
            self.error(
                format!(
                    "'{}' can only be used inside a client block",
                    decl.keyword()
                ),
                decl.span(),
            );
        }
    }

    fn visit_client_decl(&mut self, decl: &ClientDecl) {
        match decl {
            ClientDecl::State { name, value, span } => {
                self.visit_expr(value);
                let mut sym = Symbol::new(name, SymbolKind::Variable, *span);
                sym.mutable = true;
                sym.reactive = true;
                sym.inferred_type = self.infer_type(value);
                self.declare(sym);
            }
            ClientDecl::Computed { name, value, span } => {
                self.visit_expr(value);
                let mut sym = Symbol::new(name, SymbolKind::Variable, *span);
                sym.reactive = true;
                sym.inferred_type = self.infer_type(value);
                self.declare(sym);
            }
            ClientDecl::Effect { body, span } => {
                self.enter(ScopeContext::Function, *span);
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            ClientDecl::Component(component) => self.visit_component(component),
            ClientDecl::Store(store) => self.visit_store(store),
            ClientDecl::Fn(decl) => self.visit_fn(decl, false),
            ClientDecl::Stmt(stmt) => self.visit_stmt(stmt),
        }
    }

    fn visit_component(&mut self, component: &ComponentDecl) {
        // Components are PascalCase functions; the snake_case rule does not
        // apply to them.
        let mut sym = Symbol::new(&component.name, SymbolKind::Function, component.span);
        sym.param_names = component.params.iter().map(|p| p.name.clone()).collect();
        sym.exempt_unused = true;
        self.declare(sym);

        self.enter(ScopeContext::Component, component.span);
        for param in &component.params {
            if let Some(default) = &param.default {
                self.visit_expr(default);
            }
            let mut psym = Symbol::new(&param.name, SymbolKind::Variable, param.span);
            psym.exempt_unused = true;
            self.declare(psym);
        }
        self.hoist_client_decls(&component.body);
        for decl in &component.body {
            self.visit_client_decl(decl);
        }
        let end = component
            .body
            .last()
            .map(|d| d.span())
            .unwrap_or(component.span);
        self.exit(end);
    }

    fn visit_store(&mut self, store: &StoreDecl) {
        let mut sym = Symbol::new(&store.name, SymbolKind::Variable, store.span);
        sym.inferred_type = Some("Store".to_string());
        sym.exempt_unused = true;
        self.declare(sym);

        self.enter(ScopeContext::Store, store.span);
        self.hoist_client_decls(&store.body);
        for decl in &store.body {
            self.visit_client_decl(decl);
        }
        let end = store.body.last().map(|d| d.span()).unwrap_or(store.span);
        self.exit(end);
    }

    // ── CLI and deploy blocks ───────────────────────────────────────────

    fn visit_cli_block(&mut self, block: &CliBlock) {
        self.enter(ScopeContext::Block, block.span);
        for (_, value) in &block.config {
            self.visit_expr(value);
        }
        for command in &block.commands {
            self.hoist_fn(command, true);
        }
        for command in &block.commands {
            self.visit_fn(command, true);
        }
        let end = block
            .commands
            .last()
            .map(|c| c.span)
            .unwrap_or(block.span);
        self.exit(end);
    }

    fn visit_deploy_block(&mut self, block: &DeployBlock) {
        for entry in &block.entries {
            match entry {
                DeployEntry::Setting { value, .. } => self.visit_expr(value),
                DeployEntry::Database { entries, .. } | DeployEntry::EnvVars { entries, .. } => {
                    for (_, value) in entries {
                        self.visit_expr(value);
                    }
                }
            }
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident { name, span } => {
                if name == "_" {
                    return;
                }
                match self.tree.lookup(self.current, name) {
                    Some(id) => self.tree.symbol_mut(id).used = true,
                    None => self.undefined(name, *span),
                }
            }
            Expr::Call { callee, args, span } => {
                if self.try_rpc_call(callee, args, *span) {
                    return;
                }
                self.visit_expr(callee);
                self.visit_args(args);
            }
            Expr::Member { object, .. } | Expr::OptionalMember { object, .. } => {
                self.visit_expr(object)
            }
            Expr::Index { object, index, .. } | Expr::OptionalIndex { object, index, .. } => {
                self.visit_expr(object);
                self.visit_expr(index);
            }
            Expr::Slice {
                object,
                start,
                end,
                step,
                ..
            } => {
                self.visit_expr(object);
                for part in [start, end, step].into_iter().flatten() {
                    self.visit_expr(part);
                }
            }
            Expr::Binary { lhs, rhs, .. } | Expr::Logical { lhs, rhs, .. } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
            }
            Expr::Unary { operand, .. }
            | Expr::Propagate { operand, .. }
            | Expr::Await { operand, .. }
            | Expr::Spread { operand, .. } => self.visit_expr(operand),
            Expr::Compare { operands, .. } => {
                for operand in operands {
                    self.visit_expr(operand);
                }
            }
            Expr::Membership { item, collection, .. } => {
                self.visit_expr(item);
                self.visit_expr(collection);
            }
            Expr::Pipe { input, stage, .. } => {
                self.visit_expr(input);
                self.visit_expr(stage);
            }
            Expr::Range { start, end, .. } => {
                self.visit_expr(start);
                self.visit_expr(end);
            }
            Expr::Array { items, .. } | Expr::Tuple { items, .. } => {
                for item in items {
                    self.visit_expr(item);
                }
            }
            Expr::Object { entries, .. } => {
                for entry in entries {
                    match entry {
                        ObjectEntry::Field { value, .. } => self.visit_expr(value),
                        ObjectEntry::Shorthand { name, span } => {
                            self.visit_expr(&Expr::Ident {
                                name: name.clone(),
                                span: *span,
                            });
                        }
                        ObjectEntry::Spread { value, .. } => self.visit_expr(value),
                    }
                }
            }
            Expr::Template { parts, .. } => {
                for part in parts {
                    if let TemplateChunk::Expr(expr) = part {
                        self.visit_expr(expr);
                    }
                }
            }
            Expr::Lambda { params, body, span, .. } => {
                self.enter(ScopeContext::Function, *span);
                for param in params {
                    if let Some(default) = &param.default {
                        self.visit_expr(default);
                    }
                    let mut sym = Symbol::new(&param.name, SymbolKind::Variable, param.span);
                    sym.exempt_unused = true;
                    self.declare(sym);
                }
                self.visit_stmts(body);
                self.exit(Self::end_of_stmts(body, *span));
            }
            Expr::Match { subject, arms, span } => self.visit_match(subject, arms, *span),
            Expr::IfExpr {
                branches,
                else_branch,
                span,
            } => {
                for (cond, body) in branches {
                    self.check_const_condition(cond, false);
                    self.visit_expr(cond);
                    self.visit_block(body, *span);
                }
                if let Some(body) = else_branch {
                    self.visit_block(body, *span);
                }
            }
            Expr::ListComp {
                element,
                binding,
                iter,
                cond,
                span,
            } => {
                self.visit_expr(iter);
                self.enter(ScopeContext::Block, *span);
                self.declare_pattern(binding, false, None);
                if let Some(cond) = cond {
                    self.visit_expr(cond);
                }
                self.visit_expr(element);
                self.exit(*span);
            }
            Expr::DictComp {
                key,
                value,
                binding,
                iter,
                cond,
                span,
            } => {
                self.visit_expr(iter);
                self.enter(ScopeContext::Block, *span);
                self.declare_pattern(binding, false, None);
                if let Some(cond) = cond {
                    self.visit_expr(cond);
                }
                self.visit_expr(key);
                self.visit_expr(value);
                self.exit(*span);
            }
            Expr::Jsx { element, .. } => self.visit_jsx(element),
            Expr::Int { .. }
            | Expr::Float { .. }
            | Expr::Str { .. }
            | Expr::Regex { .. }
            | Expr::Bool { .. }
            | Expr::Nil { .. } => {}
        }
    }

    fn visit_args(&mut self, args: &[Arg]) {
        for arg in args {
            match arg {
                Arg::Positional(expr) | Arg::Spread(expr) => self.visit_expr(expr),
                Arg::Named { value, .. } => self.visit_expr(value),
            }
        }
    }

    /// Recognizes `serverName.functionName(...)` against the pre-pass map.
    /// Returns `true` when the call was handled as RPC.
    fn try_rpc_call(&mut self, callee: &Expr, args: &[Arg], span: Span) -> bool {
        let Expr::Member { object, property, .. } = callee else {
            return false;
        };
        let Expr::Ident { name: server, .. } = object.as_ref() else {
            return false;
        };
        let has_fn = match self.server_fns.get(server) {
            Some(fns) => fns.contains_key(property),
            None => return false,
        };

        if self.current_server.as_deref() == Some(server.as_str()) {
            self.warn(format!("Server '{}' is calling itself", server), span);
        }
        if !has_fn {
            self.error(
                format!("Server '{}' has no function '{}'", server, property),
                span,
            );
        }
        self.visit_args(args);
        true
    }

    fn visit_match(&mut self, subject: &Expr, arms: &[crate::ast::MatchArm], span: Span) {
        self.visit_expr(subject);

        // Exhaustiveness over named variant types, when the subject's type is
        // known.
        if let Expr::Ident { name, .. } = subject {
            if let Some(id) = self.tree.lookup(self.current, name) {
                let sym = self.tree.symbol(id);
                let subject_type = sym
                    .inferred_type
                    .clone()
                    .or_else(|| sym.type_annotation.clone());
                if let Some(type_name) = subject_type {
                    if let Some(variants) = self.variant_types.get(&type_name).cloned() {
                        self.check_exhaustiveness(&variants, arms, span);
                    }
                }
            }
        }

        let mut unreachable = false;
        for arm in arms {
            if unreachable {
                self.warn("Unreachable match arm", arm.span);
            }
            self.enter(ScopeContext::Block, arm.span);
            self.declare_pattern(&arm.pattern, false, None);
            if let Some(guard) = &arm.guard {
                self.visit_expr(guard);
            }
            self.visit_stmts(&arm.body);
            self.exit(Self::end_of_stmts(&arm.body, arm.span));
            if arm.guard.is_none() && arm.pattern.is_irrefutable() {
                unreachable = true;
            }
        }
    }

    fn check_exhaustiveness(
        &mut self,
        variants: &[String],
        arms: &[crate::ast::MatchArm],
        span: Span,
    ) {
        let catchall = arms
            .iter()
            .any(|arm| arm.guard.is_none() && arm.pattern.is_irrefutable());
        if catchall {
            return;
        }
        let covered: HashSet<&str> = arms
            .iter()
            .filter(|arm| arm.guard.is_none())
            .filter_map(|arm| match &arm.pattern {
                Pattern::Variant { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        let missing: Vec<&String> = variants
            .iter()
            .filter(|v| !covered.contains(v.as_str()))
            .collect();
        if missing.is_empty() {
            return;
        }
        let list = missing
            .iter()
            .map(|v| format!("'{}'", v))
            .collect::<Vec<_>>()
            .join(", ");
        let noun = if missing.len() == 1 { "variant" } else { "variants" };
        self.warn(
            format!("Non-exhaustive match: missing {} {}", noun, list),
            span,
        );
    }

    fn visit_jsx(&mut self, element: &JsxElement) {
        if element.is_component() {
            match self.tree.lookup(self.current, &element.tag) {
                Some(id) => self.tree.symbol_mut(id).used = true,
                None => self.undefined(&element.tag, element.span),
            }
        }
        for attr in &element.attrs {
            match attr {
                JsxAttr::Static { value: Some(v), .. } => self.visit_expr(v),
                JsxAttr::Static { .. } | JsxAttr::Slot { .. } => {}
                JsxAttr::Event { handler, .. } => self.visit_expr(handler),
                JsxAttr::Bind { target, .. } => self.visit_expr(target),
                JsxAttr::ClassToggle { cond, .. } => self.visit_expr(cond),
                JsxAttr::Spread { value, .. } => self.visit_expr(value),
            }
        }
        for child in &element.children {
            self.visit_jsx_child(child);
        }
    }

    fn visit_jsx_child(&mut self, child: &JsxChild) {
        match child {
            JsxChild::Element(el) => self.visit_jsx(el),
            JsxChild::Text { .. } => {}
            JsxChild::Expr { expr, .. } => self.visit_expr(expr),
            JsxChild::If {
                branches,
                else_children,
                ..
            } => {
                for (cond, body) in branches {
                    self.visit_expr(cond);
                    for child in body {
                        self.visit_jsx_child(child);
                    }
                }
                if let Some(body) = else_children {
                    for child in body {
                        self.visit_jsx_child(child);
                    }
                }
            }
            JsxChild::For {
                binding,
                iter,
                body,
                span,
            } => {
                self.visit_expr(iter);
                self.enter(ScopeContext::Block, *span);
                self.declare(Symbol::new(binding, SymbolKind::Variable, *span));
                for child in body {
                    self.visit_jsx_child(child);
                }
                self.exit(*span);
            }
        }
    }

    // ── Type inference hints ────────────────────────────────────────────

    fn infer_type(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Int { .. } => Some("Int".to_string()),
            Expr::Float { .. } => Some("Float".to_string()),
            Expr::Str { .. } | Expr::Template { .. } => Some("String".to_string()),
            Expr::Bool { .. } => Some("Bool".to_string()),
            Expr::Nil { .. } => Some("Nil".to_string()),
            Expr::Array { .. } | Expr::ListComp { .. } | Expr::Range { .. } => {
                Some("List".to_string())
            }
            Expr::Object { .. } | Expr::DictComp { .. } => Some("Object".to_string()),
            Expr::Lambda { .. } => Some("Function".to_string()),
            Expr::Regex { .. } => Some("Regex".to_string()),
            Expr::Call { callee, .. } => {
                let Expr::Ident { name, .. } = callee.as_ref() else {
                    return None;
                };
                let id = self.tree.lookup(self.current, name)?;
                let sym = self.tree.symbol(id);
                if let Some(owner) = &sym.variant_of {
                    return Some(owner.clone());
                }
                if sym.kind == SymbolKind::Type {
                    return Some(name.clone());
                }
                None
            }
            Expr::Ident { name, .. } => {
                let id = self.tree.lookup(self.current, name)?;
                let sym = self.tree.symbol(id);
                if let Some(owner) = &sym.variant_of {
                    return Some(owner.clone());
                }
                sym.inferred_type.clone()
            }
            _ => None,
        }
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            // Consecutive capitals are not split: XMLParser -> xmlparser.
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase();
        }
    }
    out
}

fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|seg| !seg.is_empty())
        .map(|seg| {
            let mut chars = seg.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_does_not_split_consecutive_capitals() {
        assert_eq!(to_snake_case("XMLParser"), "xmlparser");
        assert_eq!(to_snake_case("getUser"), "get_user");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn pascal_case_joins_segments() {
        assert_eq!(to_pascal_case("point"), "Point");
        assert_eq!(to_pascal_case("http_client"), "HttpClient");
    }
}
