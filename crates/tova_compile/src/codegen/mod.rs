//! Code generation from the Tova AST to JavaScript.
//!
//! # Pipeline position
//!
//! ```text
//! Source -> Lexer -> Parser -> AST -> Analyzer -> HERE -> JS streams
//! ```
//!
//! One [`Codegen`] instance produces one output stream. The shared emitters
//! (expressions, statements, functions, patterns) live in `expr.rs`,
//! `stmt.rs`, and `pattern.rs`; the per-target generators (`client.rs`,
//! `server.rs`, `cli.rs`, `deploy.rs`) specialize JSX lowering, reactive
//! assignment, and the runtime scaffold around them.
//!
//! # Lowering rules (selection)
//!
//! | Tova | JavaScript |
//! |------|------------|
//! | `x = 1` (fresh name) | `const x = 1;` |
//! | `var x = 1` | `let x = 1;` |
//! | `a in [1, 2]` | `[1, 2].includes(a)` |
//! | `a..b` | `Array.from({length: b - a}, (_, i) => a + i)` |
//! | `x \|> f(_)` | `f(x)` |
//! | `state n = 0` | `const [n, setN] = createSignal(0);` |
//! | `fn` in `server` | the function plus a `POST /rpc/<name>` route |
//!
//! # Determinism
//!
//! Temporary names (`__cmp_0`, `__pipe_1`, ...) come from a single counter
//! per stream, named-server iteration is sorted, and the scoped-CSS hash is
//! derived from content, so identical input produces byte-identical output.

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod deploy;
pub(crate) mod expr;
pub(crate) mod jsx;
pub(crate) mod pattern;
pub(crate) mod server;
pub(crate) mod stmt;

use std::collections::{BTreeMap, HashMap, HashSet};

use tova_language::ast::{
    ClientBlock, ClientDecl, Program, ServerBlock, ServerDecl, Stmt, TypeDeclKind,
};

use crate::output::Output;

/// Which stream this generator is producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Shared,
    Server,
    Client,
    Cli,
}

/// Per-name facts the emitters need: `let` vs `const`, and signal lowering.
#[derive(Debug, Clone, Default)]
pub(crate) struct VarInfo {
    pub mutable: bool,
    pub reactive: bool,
    /// Signal setter name (`setCount`); `None` for computed values and
    /// store members.
    pub setter: Option<String>,
}

/// Program-wide registries collected in one pre-pass, shared by all streams.
#[derive(Debug, Default)]
pub(crate) struct Registries {
    /// Variant constructor -> field names (for match lowering).
    pub variants: HashMap<String, Vec<String>>,
    /// Known function name -> parameter names (for named-argument
    /// reordering at call sites).
    pub functions: HashMap<String, Vec<String>>,
    /// Client store names (reads through them are reactive).
    pub stores: HashSet<String>,
    /// Named server -> its RPC functions `(name, params)`, sorted by server
    /// name.
    pub servers: BTreeMap<String, Vec<(String, Vec<String>)>>,
}

impl Registries {
    pub fn collect(program: &Program) -> Self {
        let mut reg = Registries::default();
        for (ctor, fields) in [
            ("Ok", vec!["value"]),
            ("Err", vec!["value"]),
            ("Some", vec!["value"]),
            ("None", vec![]),
        ] {
            reg.variants.insert(
                ctor.to_string(),
                fields.into_iter().map(str::to_string).collect(),
            );
        }
        reg.collect_stmts(&program.body);
        reg
    }

    fn collect_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::TypeDecl(decl) => {
                    match &decl.kind {
                        TypeDeclKind::Struct { fields } => {
                            self.functions.insert(
                                decl.name.clone(),
                                fields.iter().map(|f| f.name.clone()).collect(),
                            );
                        }
                        TypeDeclKind::Variants { variants } => {
                            for variant in variants {
                                self.variants.insert(
                                    variant.name.clone(),
                                    variant.fields.iter().map(|f| f.name.clone()).collect(),
                                );
                            }
                        }
                    }
                }
                Stmt::Fn(decl) => {
                    self.functions.insert(
                        decl.name.clone(),
                        decl.params.iter().map(|p| p.name.clone()).collect(),
                    );
                }
                Stmt::Shared { body, .. } => self.collect_stmts(body),
                Stmt::Test(test) => self.collect_stmts(&test.body),
                Stmt::Server(block) => self.collect_server(block),
                Stmt::Client(block) => self.collect_client(block),
                _ => {}
            }
        }
    }

    fn collect_server(&mut self, block: &ServerBlock) {
        let mut fns = Vec::new();
        Self::walk_server_fns(&block.body, &mut fns, self);
        if let Some(name) = &block.name {
            self.servers.insert(name.clone(), fns);
        }
    }

    fn walk_server_fns(
        decls: &[ServerDecl],
        out: &mut Vec<(String, Vec<String>)>,
        reg: &mut Registries,
    ) {
        for decl in decls {
            match decl {
                ServerDecl::Fn(f) => {
                    let params: Vec<String> = f.params.iter().map(|p| p.name.clone()).collect();
                    reg.functions.insert(f.name.clone(), params.clone());
                    out.push((f.name.clone(), params));
                }
                ServerDecl::RouteGroup { body, .. } => Self::walk_server_fns(body, out, reg),
                ServerDecl::Stmt(stmt) => reg.collect_stmts(std::slice::from_ref(stmt)),
                _ => {}
            }
        }
    }

    fn collect_client(&mut self, block: &ClientBlock) {
        self.collect_client_decls(&block.body);
    }

    fn collect_client_decls(&mut self, decls: &[ClientDecl]) {
        for decl in decls {
            match decl {
                ClientDecl::Store(store) => {
                    self.stores.insert(store.name.clone());
                }
                ClientDecl::Fn(f) => {
                    self.functions.insert(
                        f.name.clone(),
                        f.params.iter().map(|p| p.name.clone()).collect(),
                    );
                }
                ClientDecl::Component(c) => self.collect_client_decls(&c.body),
                ClientDecl::Stmt(stmt) => self.collect_stmts(std::slice::from_ref(stmt)),
                _ => {}
            }
        }
    }
}

pub(crate) struct Codegen<'a> {
    pub target: Target,
    pub indent: usize,
    tmp: u32,
    scopes: Vec<HashMap<String, VarInfo>>,
    /// Statements hoisted in front of the one being emitted (propagate
    /// lowering).
    pub pending: Vec<String>,
    pub needs_contains: bool,
    pub needs_slice: bool,
    pub reg: &'a Registries,
    /// Scoped-CSS hash of the component currently being emitted.
    pub style_hash: Option<String>,
    /// Replacement stack for the pipe placeholder `_`.
    pub placeholder: Vec<String>,
}

impl<'a> Codegen<'a> {
    pub fn new(target: Target, reg: &'a Registries) -> Self {
        Codegen {
            target,
            indent: 0,
            tmp: 0,
            scopes: vec![HashMap::new()],
            pending: Vec::new(),
            needs_contains: false,
            needs_slice: false,
            reg,
            style_hash: None,
            placeholder: Vec::new(),
        }
    }

    // ── Scope tracking ──────────────────────────────────────────────────

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn declare(&mut self, name: &str, info: VarInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), info);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        for scope in self.scopes.iter().rev() {
            if let Some(info) = scope.get(name) {
                return Some(info);
            }
        }
        None
    }

    // ── Emission helpers ────────────────────────────────────────────────

    pub fn ind(&self) -> String {
        "    ".repeat(self.indent)
    }

    /// A fresh deterministic temporary: one counter per stream.
    pub fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("__{}_{}", prefix, self.tmp);
        self.tmp += 1;
        name
    }

    /// Writes any pending hoisted statements, then `text`, each on its own
    /// indented line.
    pub fn line(&mut self, out: &mut String, text: &str) {
        let indent = self.ind();
        for pending in std::mem::take(&mut self.pending) {
            out.push_str(&indent);
            out.push_str(&pending);
            out.push('\n');
        }
        out.push_str(&indent);
        out.push_str(text);
        out.push('\n');
    }

    pub fn ident(&self, name: &str) -> String {
        if is_js_keyword(name) {
            format!("_{}", name)
        } else {
            name.to_string()
        }
    }
}

/// Double-quoted JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Object key emission: bare when identifier-like, quoted otherwise.
pub(crate) fn js_key(key: &str) -> String {
    let ident_like = !key.is_empty()
        && key.chars().next().map_or(false, |c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if ident_like && !is_js_keyword(key) {
        key.to_string()
    } else {
        js_string(key)
    }
}

/// Reserved words that cannot be used as JavaScript binding names.
pub(crate) fn is_js_keyword(name: &str) -> bool {
    matches!(
        name,
        "break" | "case" | "catch" | "class" | "const" | "continue" | "debugger" | "default"
            | "delete" | "do" | "else" | "enum" | "export" | "extends" | "false" | "finally"
            | "for" | "function" | "if" | "import" | "in" | "instanceof" | "new" | "null"
            | "return" | "super" | "switch" | "this" | "throw" | "true" | "try" | "typeof"
            | "var" | "void" | "while" | "with" | "yield" | "let" | "static" | "await"
    )
}

/// Capitalizes the first character: `count` -> `Count` (signal setters,
/// event props).
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub(crate) const CONTAINS_HELPER: &str = "function __contains(collection, item) {\n    if (collection == null) return false;\n    if (Array.isArray(collection) || typeof collection === \"string\") return collection.includes(item);\n    if (collection instanceof Set || collection instanceof Map) return collection.has(item);\n    return item in collection;\n}\n";

pub(crate) const SLICE_HELPER: &str = "function __slice(value, start, end, step) {\n    const items = Array.from(value);\n    const len = items.length;\n    let s = step ?? 1;\n    let from = start ?? (s < 0 ? len - 1 : 0);\n    let to = end ?? (s < 0 ? -len - 1 : len);\n    if (from < 0) from += len;\n    if (to < 0 && end != null) to += len;\n    const out = [];\n    if (s > 0) {\n        for (let i = from; i < to; i += s) out.push(items[i]);\n    } else {\n        for (let i = from; i > to; i += s) out.push(items[i]);\n    }\n    return typeof value === \"string\" ? out.join(\"\") : out;\n}\n";

/// Prepends the on-demand helpers a finished stream needs.
pub(crate) fn with_helpers(body: String, gen: &Codegen) -> String {
    let mut out = String::new();
    if gen.needs_contains {
        out.push_str(CONTAINS_HELPER);
    }
    if gen.needs_slice {
        out.push_str(SLICE_HELPER);
    }
    if !out.is_empty() && !body.is_empty() {
        out.push('\n');
    }
    out.push_str(&body);
    out
}

/// The code-generator entry point: one AST in, every output stream out.
pub fn generate(program: &Program) -> Output {
    let reg = Registries::collect(program);
    let mut output = Output::default();

    // Shared stream: everything outside blocks, plus `shared { }` bodies.
    let mut shared_gen = Codegen::new(Target::Shared, &reg);
    let mut shared = String::new();
    for stmt in &program.body {
        match stmt {
            Stmt::Server(_)
            | Stmt::Client(_)
            | Stmt::Cli(_)
            | Stmt::Deploy(_)
            | Stmt::Test(_) => {}
            Stmt::Shared { body, .. } => {
                for inner in body {
                    let text = shared_gen.stmt(inner);
                    shared.push_str(&text);
                }
            }
            other => {
                let text = shared_gen.stmt(other);
                shared.push_str(&text);
            }
        }
    }
    output.shared = with_helpers(shared, &shared_gen);

    // Server streams.
    let unnamed: Vec<&ServerBlock> = program
        .body
        .iter()
        .filter_map(|s| match s {
            Stmt::Server(b) if b.name.is_none() => Some(b),
            _ => None,
        })
        .collect();
    if !unnamed.is_empty() {
        output.server = Some(server::generate_server(&unnamed, None, &reg));
    }
    let named: Vec<&ServerBlock> = program
        .body
        .iter()
        .filter_map(|s| match s {
            Stmt::Server(b) if b.name.is_some() => Some(b),
            _ => None,
        })
        .collect();
    if !named.is_empty() {
        output.multi_block = true;
        for block in &named {
            let name = block.name.clone().unwrap_or_default();
            let code = server::generate_server(std::slice::from_ref(block), Some(&name), &reg);
            output.servers.insert(name, code);
        }
    }

    // Client stream.
    let clients: Vec<&ClientBlock> = program
        .body
        .iter()
        .filter_map(|s| match s {
            Stmt::Client(b) => Some(b),
            _ => None,
        })
        .collect();
    if !clients.is_empty() {
        output.client = Some(client::generate_client(&clients, &reg));
    }

    // CLI stream.
    if let Some(Stmt::Cli(block)) = program
        .body
        .iter()
        .find(|s| matches!(s, Stmt::Cli(_)))
    {
        output.cli = Some(cli::generate_cli(block, &reg));
        output.is_cli = true;
    }

    // Deploy stream.
    let deploys: Vec<_> = program
        .body
        .iter()
        .filter_map(|s| match s {
            Stmt::Deploy(b) => Some(b),
            _ => None,
        })
        .collect();
    if !deploys.is_empty() {
        output.deploy = Some(deploy::generate_deploy(&deploys));
    }

    log::debug!(
        "generated streams: shared={}B server={} client={} cli={}",
        output.shared.len(),
        output.server.is_some() || !output.servers.is_empty(),
        output.client.is_some(),
        output.cli.is_some()
    );
    output
}
