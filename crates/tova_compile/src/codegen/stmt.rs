//! Statement lowering.

use std::fmt::Write;

use tova_language::ast::{
    BinaryOp, Expr, FnDecl, ForBinding, ImportDecl, ObjectPatternField, Pattern, Stmt, TypeDecl,
    TypeDeclKind,
};

use super::{js_string, Codegen, Target, VarInfo};

impl<'a> Codegen<'a> {
    pub(crate) fn stmt(&mut self, stmt: &Stmt) -> String {
        let mut out = String::new();
        match stmt {
            Stmt::Expr { expr, .. } => {
                let value = self.expr(expr);
                self.line(&mut out, &format!("{};", value));
            }
            Stmt::Let {
                pattern,
                value,
                mutable,
                ..
            } => self.let_stmt(&mut out, pattern, value, *mutable),
            Stmt::Assign { targets, values, .. } => self.assign(&mut out, targets, values),
            Stmt::CompoundAssign {
                target, op, value, ..
            } => self.compound_assign(&mut out, target, *op, value),
            Stmt::If {
                branches,
                else_branch,
                ..
            } => {
                for (i, (cond, body)) in branches.iter().enumerate() {
                    let cond_js = self.expr(cond);
                    let keyword = if i == 0 { "if" } else { "} else if" };
                    self.line(&mut out, &format!("{} ({}) {{", keyword, cond_js));
                    out.push_str(&self.block_body(body, false));
                }
                if let Some(body) = else_branch {
                    self.line(&mut out, "} else {");
                    out.push_str(&self.block_body(body, false));
                }
                self.line(&mut out, "}");
            }
            Stmt::While { cond, body, .. } => {
                let cond_js = self.expr(cond);
                self.line(&mut out, &format!("while ({}) {{", cond_js));
                out.push_str(&self.block_body(body, false));
                self.line(&mut out, "}");
            }
            Stmt::Loop { body, .. } => {
                self.line(&mut out, "while (true) {");
                out.push_str(&self.block_body(body, false));
                self.line(&mut out, "}");
            }
            Stmt::For {
                binding,
                iter,
                body,
                ..
            } => self.for_stmt(&mut out, binding, iter, body),
            Stmt::Try {
                body,
                catch_binding,
                catch_body,
                finally_body,
                ..
            } => {
                self.line(&mut out, "try {");
                out.push_str(&self.block_body(body, false));
                match catch_binding {
                    Some(name) => self.line(&mut out, &format!("}} catch ({}) {{", name)),
                    None => self.line(&mut out, "} catch {"),
                }
                self.push_scope();
                if let Some(name) = catch_binding {
                    self.declare(name, VarInfo::default());
                }
                self.indent += 1;
                let mut catch_out = String::new();
                for stmt in catch_body {
                    catch_out.push_str(&self.stmt(stmt));
                }
                self.indent -= 1;
                self.pop_scope();
                out.push_str(&catch_out);
                if let Some(finally) = finally_body {
                    self.line(&mut out, "} finally {");
                    out.push_str(&self.block_body(finally, false));
                }
                self.line(&mut out, "}");
            }
            Stmt::Return { value, .. } => match value {
                Some(value) => {
                    let value_js = self.expr(value);
                    self.line(&mut out, &format!("return {};", value_js));
                }
                None => self.line(&mut out, "return;"),
            },
            Stmt::Break { .. } => self.line(&mut out, "break;"),
            Stmt::Continue { .. } => self.line(&mut out, "continue;"),
            Stmt::Fn(decl) => out.push_str(&self.function(decl)),
            Stmt::TypeDecl(decl) => out.push_str(&self.type_decl(decl)),
            Stmt::Import(decl) => out.push_str(&self.import(decl)),
            // Blocks are dispatched at the program level; nothing to emit in
            // statement position.
            Stmt::Server(_)
            | Stmt::Client(_)
            | Stmt::Shared { .. }
            | Stmt::Cli(_)
            | Stmt::Deploy(_)
            | Stmt::Test(_) => {}
            // Misplaced context declarations were already rejected by the
            // analyzer.
            Stmt::ClientDecl(_) | Stmt::ServerDecl(_) => {}
        }
        out
    }

    /// Emits a statement list with its own codegen scope at one deeper
    /// indent. With `implicit_return`, a trailing expression statement
    /// becomes `return <expr>;`.
    pub(crate) fn block_body(&mut self, stmts: &[Stmt], implicit_return: bool) -> String {
        self.push_scope();
        self.indent += 1;
        let mut out = String::new();
        for (i, stmt) in stmts.iter().enumerate() {
            let last = i + 1 == stmts.len();
            if implicit_return && last {
                if let Stmt::Expr { expr, .. } = stmt {
                    let value = self.expr(expr);
                    self.line(&mut out, &format!("return {};", value));
                    continue;
                }
            }
            out.push_str(&self.stmt(stmt));
        }
        self.indent -= 1;
        self.pop_scope();
        out
    }

    fn let_stmt(&mut self, out: &mut String, pattern: &Pattern, value: &Expr, mutable: bool) {
        let value_js = self.expr(value);
        let keyword = if mutable { "let" } else { "const" };
        match pattern {
            Pattern::Binding { name, .. } => {
                self.declare(name, VarInfo { mutable, ..VarInfo::default() });
                let name_js = self.ident(name);
                self.line(out, &format!("{} {} = {};", keyword, name_js, value_js));
            }
            other => {
                let binding = self.pattern_binding(other);
                for name in other.bound_names() {
                    self.declare(name, VarInfo { mutable, ..VarInfo::default() });
                }
                self.line(out, &format!("{} {} = {};", keyword, binding, value_js));
            }
        }
    }

    fn assign(&mut self, out: &mut String, targets: &[Expr], values: &[Expr]) {
        if targets.len() == 1 {
            let value_js = self.expr(&values[0]);
            self.assign_single(out, &targets[0], &value_js);
            return;
        }

        // Multi-target: atomic destructuring keeps swap semantics.
        let value_js = if values.len() == 1 {
            self.expr(&values[0])
        } else {
            let parts: Vec<String> = values.iter().map(|v| self.expr(v)).collect();
            format!("[{}]", parts.join(", "))
        };
        let names: Vec<String> = targets
            .iter()
            .map(|t| match t {
                Expr::Ident { name, .. } => self.ident(name),
                other => self.expr(other),
            })
            .collect();
        let all_new = targets.iter().all(|t| match t {
            Expr::Ident { name, .. } => name != "_" && self.lookup(name).is_none(),
            _ => false,
        });
        if all_new {
            for t in targets {
                if let Expr::Ident { name, .. } = t {
                    self.declare(name, VarInfo::default());
                }
            }
            self.line(out, &format!("const [{}] = {};", names.join(", "), value_js));
        } else {
            self.line(out, &format!("[{}] = {};", names.join(", "), value_js));
        }
    }

    fn assign_single(&mut self, out: &mut String, target: &Expr, value_js: &str) {
        match target {
            Expr::Ident { name, .. } if name == "_" => {
                self.line(out, &format!("{};", value_js));
            }
            Expr::Ident { name, .. } => match self.lookup(name).cloned() {
                None => {
                    self.declare(name, VarInfo::default());
                    let name_js = self.ident(name);
                    self.line(out, &format!("const {} = {};", name_js, value_js));
                }
                Some(info) if info.reactive && self.target == Target::Client => {
                    match &info.setter {
                        Some(setter) => {
                            self.line(out, &format!("{}({});", setter, value_js))
                        }
                        // Computed values and store members assign through
                        // their property.
                        None => self.line(out, &format!("{} = {};", name, value_js)),
                    }
                }
                Some(_) => {
                    let name_js = self.ident(name);
                    self.line(out, &format!("{} = {};", name_js, value_js));
                }
            },
            other => {
                let target_js = self.expr(other);
                self.line(out, &format!("{} = {};", target_js, value_js));
            }
        }
    }

    fn compound_assign(&mut self, out: &mut String, target: &Expr, op: BinaryOp, value: &Expr) {
        let value_js = self.expr(value);
        match target {
            Expr::Ident { name, .. } => match self.lookup(name).cloned() {
                Some(info) if info.reactive && self.target == Target::Client => {
                    match &info.setter {
                        Some(setter) => self.line(
                            out,
                            &format!(
                                "{}(__lux_p => __lux_p {} {});",
                                setter,
                                op.symbol(),
                                value_js
                            ),
                        ),
                        None => self.line(
                            out,
                            &format!("{} {}= {};", name, op.symbol(), value_js),
                        ),
                    }
                }
                _ => {
                    let name_js = self.ident(name);
                    self.line(
                        out,
                        &format!("{} {}= {};", name_js, op.symbol(), value_js),
                    );
                }
            },
            other => {
                let target_js = self.expr(other);
                self.line(
                    out,
                    &format!("{} {}= {};", target_js, op.symbol(), value_js),
                );
            }
        }
    }

    fn for_stmt(&mut self, out: &mut String, binding: &ForBinding, iter: &Expr, body: &[Stmt]) {
        // Ranges lower to classic counting loops instead of materializing an
        // array.
        if let (ForBinding::Single { name, .. }, Expr::Range { start, end, inclusive, .. }) =
            (binding, iter)
        {
            let start_js = self.expr(start);
            let end_js = self.expr(end);
            let cmp = if *inclusive { "<=" } else { "<" };
            let name_js = self.ident(name);
            self.line(
                out,
                &format!(
                    "for (let {} = {}; {} {} {}; {}++) {{",
                    name_js, start_js, name_js, cmp, end_js, name_js
                ),
            );
            self.push_scope();
            self.declare(name, VarInfo { mutable: true, ..VarInfo::default() });
            let body_js = self.block_body(body, false);
            self.pop_scope();
            out.push_str(&body_js);
            self.line(out, "}");
            return;
        }

        let iter_js = self.expr(iter);
        let (binding_js, names, entries) = match binding {
            ForBinding::Single { name, .. } => (self.ident(name), vec![name.clone()], false),
            ForBinding::KeyValue { key, value, .. } => (
                format!("[{}, {}]", self.ident(key), self.ident(value)),
                vec![key.clone(), value.clone()],
                true,
            ),
            ForBinding::Destructure { pattern, .. } => (
                self.pattern_binding(pattern),
                pattern.bound_names().iter().map(|s| s.to_string()).collect(),
                false,
            ),
        };
        let source = if entries {
            format!("Object.entries({})", iter_js)
        } else {
            iter_js
        };
        self.line(out, &format!("for (const {} of {}) {{", binding_js, source));
        self.push_scope();
        for name in &names {
            self.declare(name, VarInfo::default());
        }
        let body_js = self.block_body(body, false);
        self.pop_scope();
        out.push_str(&body_js);
        self.line(out, "}");
    }

    pub(crate) fn function(&mut self, decl: &FnDecl) -> String {
        let mut out = String::new();
        self.declare(&decl.name, VarInfo::default());
        let prefix = if decl.is_async { "async " } else { "" };
        self.push_scope();
        let params_js = self.params(&decl.params);
        for param in &decl.params {
            self.declare(&param.name, VarInfo::default());
        }
        let name_js = self.ident(&decl.name);
        self.line(
            &mut out,
            &format!("{}function {}({}) {{", prefix, name_js, params_js),
        );
        out.push_str(&self.block_body(&decl.body, true));
        self.pop_scope();
        self.line(&mut out, "}");
        out
    }

    fn type_decl(&mut self, decl: &TypeDecl) -> String {
        let mut out = String::new();
        match &decl.kind {
            TypeDeclKind::Struct { fields } => {
                let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                self.line(
                    &mut out,
                    &format!("function {}({}) {{", decl.name, names.join(", ")),
                );
                self.indent += 1;
                self.line(&mut out, &format!("return {{ {} }};", names.join(", ")));
                self.indent -= 1;
                self.line(&mut out, "}");
            }
            TypeDeclKind::Variants { variants } => {
                for variant in variants {
                    if variant.fields.is_empty() {
                        self.line(
                            &mut out,
                            &format!(
                                "const {} = Object.freeze({{ __tag: {} }});",
                                variant.name,
                                js_string(&variant.name)
                            ),
                        );
                    } else {
                        let names: Vec<&str> =
                            variant.fields.iter().map(|f| f.name.as_str()).collect();
                        self.line(
                            &mut out,
                            &format!("function {}({}) {{", variant.name, names.join(", ")),
                        );
                        self.indent += 1;
                        self.line(
                            &mut out,
                            &format!(
                                "return {{ __tag: {}, {} }};",
                                js_string(&variant.name),
                                names.join(", ")
                            ),
                        );
                        self.indent -= 1;
                        self.line(&mut out, "}");
                    }
                    self.declare(&variant.name, VarInfo::default());
                }
            }
        }
        self.declare(&decl.name, VarInfo::default());
        out
    }

    fn import(&mut self, decl: &ImportDecl) -> String {
        let mut out = String::new();
        let source = js_string(&decl.source);
        match (&decl.default, decl.named.is_empty()) {
            (Some(default), true) => {
                self.declare(default, VarInfo::default());
                self.line(&mut out, &format!("import {} from {};", default, source));
            }
            _ => {
                let parts: Vec<String> = decl
                    .named
                    .iter()
                    .map(|(name, alias)| {
                        let bound = alias.as_ref().unwrap_or(name);
                        self.declare(bound, VarInfo::default());
                        match alias {
                            Some(alias) => format!("{} as {}", name, alias),
                            None => name.clone(),
                        }
                    })
                    .collect();
                self.line(
                    &mut out,
                    &format!("import {{ {} }} from {};", parts.join(", "), source),
                );
            }
        }
        out
    }

    /// JavaScript destructuring text for a `let` / loop binding pattern.
    pub(crate) fn pattern_binding(&mut self, pattern: &Pattern) -> String {
        match pattern {
            Pattern::Binding { name, .. } => self.ident(name),
            Pattern::Wildcard { .. } => String::new(),
            Pattern::Array { items, rest, .. } => {
                let mut parts: Vec<String> =
                    items.iter().map(|p| self.pattern_binding(p)).collect();
                if let Some(rest) = rest {
                    parts.push(format!("...{}", rest));
                }
                format!("[{}]", parts.join(", "))
            }
            Pattern::Object { fields, .. } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|f| self.object_pattern_field(f))
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            // Literal patterns cannot destructure; hole them out.
            _ => String::new(),
        }
    }

    fn object_pattern_field(&mut self, field: &ObjectPatternField) -> String {
        let mut text = field.key.clone();
        if let Some(pattern) = &field.pattern {
            let _ = write!(text, ": {}", self.pattern_binding(pattern));
        }
        if let Some(default) = &field.default {
            let default_js = self.expr(default);
            let _ = write!(text, " = {}", default_js);
        }
        text
    }
}
