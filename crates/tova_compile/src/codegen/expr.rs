//! Expression lowering.

use tova_language::ast::{
    Arg, BinaryOp, Expr, LogicalOp, ObjectEntry, Param, TemplateChunk, UnaryOp,
};

use super::{js_key, js_string, Codegen, Target, VarInfo};

impl<'a> Codegen<'a> {
    pub(crate) fn expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Int { value, .. } => value.to_string(),
            Expr::Float { value, .. } => value.to_string(),
            Expr::Str { value, .. } => js_string(value),
            Expr::Bool { value, .. } => value.to_string(),
            Expr::Nil { .. } => "null".to_string(),
            Expr::Regex { pattern, flags, .. } => format!("/{}/{}", pattern, flags),
            Expr::Ident { name, .. } => self.ident_read(name),
            Expr::Template { parts, .. } => self.template(parts),
            Expr::Array { items, .. } => {
                let items: Vec<String> = items.iter().map(|i| self.expr(i)).collect();
                format!("[{}]", items.join(", "))
            }
            Expr::Tuple { items, .. } => {
                let items: Vec<String> = items.iter().map(|i| self.expr(i)).collect();
                format!("[{}]", items.join(", "))
            }
            Expr::Object { entries, .. } => self.object(entries),
            Expr::Spread { operand, .. } => format!("...{}", self.expr(operand)),
            Expr::Binary { op, lhs, rhs, .. } => self.binary(*op, lhs, rhs),
            Expr::Logical { op, lhs, rhs, .. } => {
                let sym = match op {
                    LogicalOp::And => "&&",
                    LogicalOp::Or => "||",
                };
                format!("({} {} {})", self.expr(lhs), sym, self.expr(rhs))
            }
            Expr::Unary { op, operand, .. } => {
                let inner = self.expr(operand);
                match op {
                    UnaryOp::Not => format!("!({})", inner),
                    UnaryOp::Neg => format!("(-{})", inner),
                    UnaryOp::Pos => format!("(+{})", inner),
                }
            }
            Expr::Compare { operands, ops, .. } => self.comparison(operands, ops),
            Expr::Membership {
                negated,
                item,
                collection,
                ..
            } => self.membership(*negated, item, collection),
            Expr::Pipe { input, stage, .. } => self.pipe(input, stage),
            Expr::Range {
                start,
                end,
                inclusive,
                ..
            } => self.range(start, end, *inclusive),
            Expr::Index { object, index, .. } => {
                format!("{}[{}]", self.expr(object), self.expr(index))
            }
            Expr::Slice {
                object,
                start,
                end,
                step,
                ..
            } => self.slice(object, start.as_deref(), end.as_deref(), step.as_deref()),
            Expr::Member { object, property, .. } => {
                format!("{}.{}", self.expr(object), property)
            }
            Expr::OptionalMember { object, property, .. } => {
                format!("{}?.{}", self.expr(object), property)
            }
            Expr::OptionalIndex { object, index, .. } => {
                format!("{}?.[{}]", self.expr(object), self.expr(index))
            }
            Expr::Propagate { operand, .. } => {
                let value = self.expr(operand);
                let tmp = self.fresh("prop");
                self.pending
                    .push(format!("const {} = {};", tmp, value));
                self.pending.push(format!(
                    "if ({} && {}.__tag === \"Err\") return {};",
                    tmp, tmp, tmp
                ));
                format!("{}.value", tmp)
            }
            Expr::Call { callee, args, .. } => self.call(callee, args),
            Expr::Lambda {
                params,
                body,
                expr_body,
                is_async,
                ..
            } => self.lambda(params, body, *expr_body, *is_async),
            Expr::Match { subject, arms, .. } => self.match_expr(subject, arms),
            Expr::IfExpr {
                branches,
                else_branch,
                ..
            } => self.if_expr(branches, else_branch.as_deref()),
            Expr::ListComp {
                element,
                binding,
                iter,
                cond,
                ..
            } => self.list_comp(element, binding, iter, cond.as_deref()),
            Expr::DictComp {
                key,
                value,
                binding,
                iter,
                cond,
                ..
            } => self.dict_comp(key, value, binding, iter, cond.as_deref()),
            Expr::Await { operand, .. } => format!("(await {})", self.expr(operand)),
            Expr::Jsx { element, .. } => self.jsx_element(element),
        }
    }

    /// An identifier read: signals and computed values read through their
    /// getter on the client.
    fn ident_read(&mut self, name: &str) -> String {
        if name == "_" {
            if let Some(replacement) = self.placeholder.last() {
                return replacement.clone();
            }
            return "_".to_string();
        }
        if self.target == Target::Client {
            if let Some(info) = self.lookup(name) {
                if info.reactive {
                    return format!("{}()", name);
                }
            }
        }
        self.ident(name)
    }

    fn template(&mut self, parts: &[TemplateChunk]) -> String {
        let mut out = String::from("`");
        for part in parts {
            match part {
                TemplateChunk::Text(text) => {
                    for c in text.chars() {
                        match c {
                            '`' => out.push_str("\\`"),
                            '\\' => out.push_str("\\\\"),
                            '$' => out.push_str("\\$"),
                            '\n' => out.push_str("\\n"),
                            other => out.push(other),
                        }
                    }
                }
                TemplateChunk::Expr(expr) => {
                    out.push_str("${");
                    out.push_str(&self.expr(expr));
                    out.push('}');
                }
            }
        }
        out.push('`');
        out
    }

    fn object(&mut self, entries: &[ObjectEntry]) -> String {
        if entries.is_empty() {
            return "{}".to_string();
        }
        let parts: Vec<String> = entries
            .iter()
            .map(|entry| match entry {
                ObjectEntry::Field { key, value, .. } => {
                    format!("{}: {}", js_key(key), self.expr(value))
                }
                ObjectEntry::Shorthand { name, .. } => {
                    let read = self.ident_read(name);
                    if read == *name {
                        name.clone()
                    } else {
                        format!("{}: {}", js_key(name), read)
                    }
                }
                ObjectEntry::Spread { value, .. } => format!("...{}", self.expr(value)),
            })
            .collect();
        format!("{{ {} }}", parts.join(", "))
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> String {
        match op {
            BinaryOp::Nullish => {
                // NaN-safe `??`: a NaN left side falls through to the default.
                let rhs_js = self.expr(rhs);
                if lhs.is_simple() {
                    let lhs_js = self.expr(lhs);
                    format!(
                        "({} != null && {} === {} ? {} : {})",
                        lhs_js, lhs_js, lhs_js, lhs_js, rhs_js
                    )
                } else {
                    let lhs_js = self.expr(lhs);
                    format!(
                        "((__nc) => __nc != null && __nc === __nc ? __nc : {})({})",
                        rhs_js, lhs_js
                    )
                }
            }
            BinaryOp::Mul => {
                // String repetition: `"-" * 20`.
                if let Expr::Str { value, .. } = lhs {
                    return format!("{}.repeat({})", js_string(value), self.expr(rhs));
                }
                if let Expr::Str { value, .. } = rhs {
                    return format!("{}.repeat({})", js_string(value), self.expr(lhs));
                }
                format!("({} * {})", self.expr(lhs), self.expr(rhs))
            }
            other => {
                let sym = other.symbol();
                format!("({} {} {})", self.expr(lhs), sym, self.expr(rhs))
            }
        }
    }

    fn comparison(
        &mut self,
        operands: &[Expr],
        ops: &[tova_language::ast::CompareOp],
    ) -> String {
        if ops.len() == 1 {
            return format!(
                "({} {} {})",
                self.expr(&operands[0]),
                ops[0].symbol(),
                self.expr(&operands[1])
            );
        }
        let all_simple = operands.iter().all(|o| o.is_simple());
        if all_simple {
            let emitted: Vec<String> = operands.iter().map(|o| self.expr(o)).collect();
            let pairs: Vec<String> = ops
                .iter()
                .enumerate()
                .map(|(i, op)| format!("({} {} {})", emitted[i], op.symbol(), emitted[i + 1]))
                .collect();
            return pairs.join(" && ");
        }
        // Complex operands evaluate once into temporaries.
        let temps: Vec<String> = operands.iter().map(|_| self.fresh("cmp")).collect();
        let pairs: Vec<String> = ops
            .iter()
            .enumerate()
            .map(|(i, op)| format!("({} {} {})", temps[i], op.symbol(), temps[i + 1]))
            .collect();
        let values: Vec<String> = operands.iter().map(|o| self.expr(o)).collect();
        format!(
            "(({}) => {})({})",
            temps.join(", "),
            pairs.join(" && "),
            values.join(", ")
        )
    }

    fn membership(&mut self, negated: bool, item: &Expr, collection: &Expr) -> String {
        let item_js = self.expr(item);
        let positive = match collection {
            Expr::Array { .. } | Expr::Str { .. } => {
                format!("{}.includes({})", self.expr(collection), item_js)
            }
            Expr::Call { callee, .. } if is_set_or_map_new(callee) => {
                format!("{}.has({})", self.expr(collection), item_js)
            }
            Expr::Object { .. } => {
                format!("({} in {})", item_js, self.expr(collection))
            }
            other => {
                self.needs_contains = true;
                format!("__contains({}, {})", self.expr(other), item_js)
            }
        };
        if negated {
            format!("!({})", positive)
        } else {
            positive
        }
    }

    fn pipe(&mut self, input: &Expr, stage: &Expr) -> String {
        let uses_placeholder = has_placeholder(stage);
        if uses_placeholder {
            if input.is_simple() {
                let value = self.expr(input);
                self.placeholder.push(value);
                let result = self.expr(stage);
                self.placeholder.pop();
                return result;
            }
            let tmp = self.fresh("pipe");
            let value = self.expr(input);
            self.placeholder.push(tmp.clone());
            let staged = self.expr(stage);
            self.placeholder.pop();
            return format!("(({}) => {})({})", tmp, staged, value);
        }
        // No placeholder: the piped value becomes the first argument.
        let value = self.expr(input);
        if let Expr::Call { callee, args, .. } = stage {
            let callee_js = self.expr(callee);
            let mut arg_js = vec![value];
            for arg in args {
                arg_js.push(match arg {
                    Arg::Positional(e) => self.expr(e),
                    Arg::Spread(e) => format!("...{}", self.expr(e)),
                    Arg::Named { name, value, .. } => {
                        format!("{{ {}: {} }}", js_key(name), self.expr(value))
                    }
                });
            }
            return format!("{}({})", callee_js, arg_js.join(", "));
        }
        format!("{}({})", self.expr(stage), value)
    }

    fn range(&mut self, start: &Expr, end: &Expr, inclusive: bool) -> String {
        let start_js = self.expr(start);
        let end_js = self.expr(end);
        if inclusive {
            format!(
                "Array.from({{ length: {} - {} + 1 }}, (_, i) => {} + i)",
                end_js, start_js, start_js
            )
        } else {
            format!(
                "Array.from({{ length: {} - {} }}, (_, i) => {} + i)",
                end_js, start_js, start_js
            )
        }
    }

    fn slice(
        &mut self,
        object: &Expr,
        start: Option<&Expr>,
        end: Option<&Expr>,
        step: Option<&Expr>,
    ) -> String {
        let object_js = self.expr(object);
        if let Some(step) = step {
            self.needs_slice = true;
            let start_js = start.map(|e| self.expr(e)).unwrap_or_else(|| "null".into());
            let end_js = end.map(|e| self.expr(e)).unwrap_or_else(|| "null".into());
            let step_js = self.expr(step);
            return format!(
                "__slice({}, {}, {}, {})",
                object_js, start_js, end_js, step_js
            );
        }
        let start_js = start.map(|e| self.expr(e)).unwrap_or_else(|| "0".into());
        match end {
            Some(end) => format!("{}.slice({}, {})", object_js, start_js, self.expr(end)),
            None => format!("{}.slice({})", object_js, start_js),
        }
    }

    fn call(&mut self, callee: &Expr, args: &[Arg]) -> String {
        let has_named = args.iter().any(|a| matches!(a, Arg::Named { .. }));

        // Named arguments reorder into positional slots when the callee's
        // parameter list is known.
        if has_named {
            if let Expr::Ident { name, .. } = callee {
                if let Some(params) = self.reg.functions.get(name).cloned() {
                    if let Some(slots) = self.reorder_named(&params, args) {
                        return format!("{}({})", self.ident(name), slots.join(", "));
                    }
                }
            }
        }

        let callee_js = self.expr(callee);
        let mut positional: Vec<String> = Vec::new();
        let mut named: Vec<String> = Vec::new();
        for arg in args {
            match arg {
                Arg::Positional(e) => positional.push(self.expr(e)),
                Arg::Spread(e) => positional.push(format!("...{}", self.expr(e))),
                Arg::Named { name, value, .. } => {
                    named.push(format!("{}: {}", js_key(name), self.expr(value)))
                }
            }
        }
        if !named.is_empty() {
            positional.push(format!("{{ {} }}", named.join(", ")));
        }
        format!("{}({})", callee_js, positional.join(", "))
    }

    /// Fills parameter slots from positional and named arguments. `None`
    /// when a named argument does not match any parameter (fall back to the
    /// trailing-object form).
    fn reorder_named(&mut self, params: &[String], args: &[Arg]) -> Option<Vec<String>> {
        for arg in args {
            if let Arg::Named { name, .. } = arg {
                if !params.contains(name) {
                    return None;
                }
            }
            if matches!(arg, Arg::Spread(_)) {
                return None;
            }
        }
        let mut slots: Vec<Option<String>> = vec![None; params.len()];
        let mut next_positional = 0usize;
        for arg in args {
            match arg {
                Arg::Positional(e) => {
                    while next_positional < slots.len() && slots[next_positional].is_some() {
                        next_positional += 1;
                    }
                    if next_positional >= slots.len() {
                        return None;
                    }
                    slots[next_positional] = Some(self.expr(e));
                }
                Arg::Named { name, value, .. } => {
                    let idx = params.iter().position(|p| p == name)?;
                    slots[idx] = Some(self.expr(value));
                }
                Arg::Spread(_) => return None,
            }
        }
        while slots.last().map_or(false, |s| s.is_none()) {
            slots.pop();
        }
        Some(
            slots
                .into_iter()
                .map(|s| s.unwrap_or_else(|| "undefined".to_string()))
                .collect(),
        )
    }

    pub(crate) fn lambda(
        &mut self,
        params: &[Param],
        body: &[tova_language::ast::Stmt],
        expr_body: bool,
        is_async: bool,
    ) -> String {
        let prefix = if is_async { "async " } else { "" };
        let params_js = self.params(params);
        self.push_scope();
        for param in params {
            self.declare(&param.name, VarInfo::default());
        }
        let result = if expr_body {
            if let tova_language::ast::Stmt::Expr { expr, .. } = &body[0] {
                let value = self.expr(expr);
                format!("{}({}) => {}", prefix, params_js, value)
            } else {
                let inner = self.block_body(body, true);
                format!("{}({}) => {{\n{}{}}}", prefix, params_js, inner, self.ind())
            }
        } else {
            let inner = self.block_body(body, true);
            format!("{}({}) => {{\n{}{}}}", prefix, params_js, inner, self.ind())
        };
        self.pop_scope();
        result
    }

    pub(crate) fn params(&mut self, params: &[Param]) -> String {
        let parts: Vec<String> = params
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{} = {}", self.ident(&p.name), self.expr(default)),
                None => self.ident(&p.name),
            })
            .collect();
        parts.join(", ")
    }

    fn if_expr(
        &mut self,
        branches: &[(Expr, Vec<tova_language::ast::Stmt>)],
        else_branch: Option<&[tova_language::ast::Stmt]>,
    ) -> String {
        let all_simple = branches.iter().all(|(_, body)| is_single_expr(body))
            && else_branch.map_or(true, is_single_expr_slice);
        if all_simple {
            let mut out = String::new();
            for (cond, body) in branches {
                let cond_js = self.expr(cond);
                let value = self.single_expr_value(body);
                out.push_str(&format!("({}) ? ({}) : ", cond_js, value));
            }
            match else_branch {
                Some(body) => {
                    let value = self.single_expr_value(body);
                    out.push_str(&format!("({})", value));
                }
                None => out.push_str("undefined"),
            }
            return out;
        }

        // Statement-bearing branches lower to an IIFE.
        let mut out = String::from("(() => {\n");
        self.indent += 1;
        for (i, (cond, body)) in branches.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "} else if" };
            let cond_js = self.expr(cond);
            out.push_str(&format!("{}{} ({}) {{\n", self.ind(), keyword, cond_js));
            out.push_str(&self.block_body(body, true));
        }
        if let Some(body) = else_branch {
            out.push_str(&format!("{}}} else {{\n", self.ind()));
            out.push_str(&self.block_body(body, true));
        }
        out.push_str(&format!("{}}}\n", self.ind()));
        self.indent -= 1;
        out.push_str(&format!("{}}})()", self.ind()));
        out
    }

    fn single_expr_value(&mut self, body: &[tova_language::ast::Stmt]) -> String {
        if let Some(tova_language::ast::Stmt::Expr { expr, .. }) = body.first() {
            self.expr(expr)
        } else {
            "undefined".to_string()
        }
    }

    fn list_comp(
        &mut self,
        element: &Expr,
        binding: &tova_language::ast::Pattern,
        iter: &Expr,
        cond: Option<&Expr>,
    ) -> String {
        let iter_js = self.expr(iter);
        let binding_js = self.pattern_binding(binding);
        self.push_scope();
        for name in binding.bound_names() {
            self.declare(name, VarInfo::default());
        }
        let filter = match cond {
            Some(cond) => format!(".filter(({}) => {})", binding_js, self.expr(cond)),
            None => String::new(),
        };
        let map = format!(".map(({}) => {})", binding_js, self.expr(element));
        self.pop_scope();
        format!("({}){}{}", iter_js, filter, map)
    }

    fn dict_comp(
        &mut self,
        key: &Expr,
        value: &Expr,
        binding: &tova_language::ast::Pattern,
        iter: &Expr,
        cond: Option<&Expr>,
    ) -> String {
        let iter_js = self.expr(iter);
        let binding_js = self.pattern_binding(binding);
        self.push_scope();
        for name in binding.bound_names() {
            self.declare(name, VarInfo::default());
        }
        let filter = match cond {
            Some(cond) => format!(".filter(({}) => {})", binding_js, self.expr(cond)),
            None => String::new(),
        };
        let entry = format!(
            ".map(({}) => [{}, {}])",
            binding_js,
            self.expr(key),
            self.expr(value)
        );
        self.pop_scope();
        format!("Object.fromEntries(({}){}{})", iter_js, filter, entry)
    }
}

fn is_set_or_map_new(callee: &Expr) -> bool {
    let Expr::Member { object, property, .. } = callee else {
        return false;
    };
    let Expr::Ident { name, .. } = object.as_ref() else {
        return false;
    };
    (name == "Set" || name == "Map") && property == "new"
}

fn has_placeholder(expr: &Expr) -> bool {
    match expr {
        Expr::Ident { name, .. } => name == "_",
        Expr::Call { callee, args, .. } => {
            has_placeholder(callee)
                || args.iter().any(|a| match a {
                    Arg::Positional(e) | Arg::Spread(e) => has_placeholder(e),
                    Arg::Named { value, .. } => has_placeholder(value),
                })
        }
        Expr::Binary { lhs, rhs, .. } | Expr::Logical { lhs, rhs, .. } => {
            has_placeholder(lhs) || has_placeholder(rhs)
        }
        Expr::Unary { operand, .. }
        | Expr::Propagate { operand, .. }
        | Expr::Await { operand, .. }
        | Expr::Spread { operand, .. } => has_placeholder(operand),
        Expr::Member { object, .. } | Expr::OptionalMember { object, .. } => {
            has_placeholder(object)
        }
        Expr::Index { object, index, .. } | Expr::OptionalIndex { object, index, .. } => {
            has_placeholder(object) || has_placeholder(index)
        }
        Expr::Array { items, .. } | Expr::Tuple { items, .. } => {
            items.iter().any(has_placeholder)
        }
        Expr::Template { parts, .. } => parts.iter().any(|p| match p {
            TemplateChunk::Expr(e) => has_placeholder(e),
            TemplateChunk::Text(_) => false,
        }),
        _ => false,
    }
}

fn is_single_expr(body: &Vec<tova_language::ast::Stmt>) -> bool {
    body.len() == 1 && matches!(body[0], tova_language::ast::Stmt::Expr { .. })
}

fn is_single_expr_slice(body: &[tova_language::ast::Stmt]) -> bool {
    body.len() == 1 && matches!(body[0], tova_language::ast::Stmt::Expr { .. })
}
