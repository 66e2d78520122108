//! JSX lowering for the client target.
//!
//! Host elements become `lux_el("tag", {props}, [children])`; capitalized
//! tags become component calls. Any attribute value or expression child that
//! reads a signal or a store member is wrapped in a thunk so the renderer
//! can track it.

use std::collections::BTreeMap;

use tova_language::ast::{
    Arg, BindKind, Expr, JsxAttr, JsxChild, JsxElement, ObjectEntry, TemplateChunk,
};

use super::{capitalize, js_string, Codegen, VarInfo};

impl<'a> Codegen<'a> {
    pub(crate) fn jsx_element(&mut self, el: &JsxElement) -> String {
        if el.is_component() {
            self.jsx_component(el)
        } else {
            self.jsx_host(el)
        }
    }

    fn jsx_component(&mut self, el: &JsxElement) -> String {
        let mut props: Vec<String> = Vec::new();
        for attr in &el.attrs {
            match attr {
                JsxAttr::Static { name, value, .. } => {
                    if name == "key" {
                        continue;
                    }
                    let value_js = match value {
                        Some(v) => self.reactive_wrap(v),
                        None => "true".to_string(),
                    };
                    props.push(format!("{}: {}", name, value_js));
                }
                JsxAttr::Event { event, handler, .. } => {
                    let handler_js = self.expr(handler);
                    props.push(format!("on{}: {}", capitalize(event), handler_js));
                }
                JsxAttr::Bind { target, .. } => {
                    let read = self.expr(target);
                    props.push(format!("value: () => {}", read));
                }
                JsxAttr::ClassToggle { class, cond, .. } => {
                    let cond_js = self.expr(cond);
                    props.push(format!(
                        "className: () => ({}) && {}",
                        cond_js,
                        js_string(class)
                    ));
                }
                JsxAttr::Spread { value, .. } => {
                    let value_js = self.expr(value);
                    props.push(format!("...{}", value_js));
                }
                JsxAttr::Slot { .. } => {}
            }
        }

        // Children routed to named slots become props; the rest stay
        // `children`.
        let mut slots: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut children: Vec<String> = Vec::new();
        for child in &el.children {
            if let JsxChild::Element(inner) = child {
                if let Some(slot) = inner.slot_name().map(str::to_string) {
                    let rendered = self.jsx_element(inner);
                    slots.entry(slot).or_default().push(rendered);
                    continue;
                }
            }
            children.push(self.jsx_child(child));
        }
        for (slot, elements) in slots {
            props.push(format!("{}: [{}]", slot, elements.join(", ")));
        }
        if !children.is_empty() {
            props.push(format!("children: [{}]", children.join(", ")));
        }

        format!("{}({{ {} }})", el.tag, props.join(", "))
    }

    fn jsx_host(&mut self, el: &JsxElement) -> String {
        let mut props: Vec<String> = Vec::new();
        let mut class_base: Option<String> = None;
        let mut class_toggles: Vec<String> = Vec::new();
        let mut class_reactive = false;

        for attr in &el.attrs {
            match attr {
                JsxAttr::Static { name, value, .. } => match name.as_str() {
                    "key" => {}
                    "class" => {
                        if let Some(v) = value {
                            class_reactive |= self.is_reactive(v);
                            class_base = Some(self.expr(v));
                        }
                    }
                    "innerHTML" => {
                        props.push(
                            "innerHTML: (console.error(\"innerHTML is blocked; use dangerouslySetInnerHTML\"), undefined)"
                                .to_string(),
                        );
                    }
                    _ => {
                        let value_js = match value {
                            Some(v) => self.reactive_wrap(v),
                            None => "true".to_string(),
                        };
                        props.push(format!("{}: {}", name, value_js));
                    }
                },
                JsxAttr::Event { event, handler, .. } => {
                    let handler_js = self.expr(handler);
                    props.push(format!("on{}: {}", capitalize(event), handler_js));
                }
                JsxAttr::Bind { kind, target, .. } => {
                    props.extend(self.bind_props(el, *kind, target));
                }
                JsxAttr::ClassToggle { class, cond, .. } => {
                    class_reactive |= self.is_reactive(cond);
                    let cond_js = self.expr(cond);
                    class_toggles.push(format!("({}) && {}", cond_js, js_string(class)));
                }
                JsxAttr::Spread { value, .. } => {
                    let value_js = self.expr(value);
                    props.push(format!("...{}", value_js));
                }
                JsxAttr::Slot { .. } => {}
            }
        }

        if !class_toggles.is_empty() {
            let mut parts = Vec::new();
            if let Some(base) = class_base {
                parts.push(base);
            }
            parts.extend(class_toggles);
            let joined = format!("[{}].filter(Boolean).join(\" \")", parts.join(", "));
            if class_reactive {
                props.push(format!("className: () => {}", joined));
            } else {
                props.push(format!("className: {}", joined));
            }
        } else if let Some(base) = class_base {
            if class_reactive {
                props.push(format!("className: () => {}", base));
            } else {
                props.push(format!("className: {}", base));
            }
        }

        // Scoped-CSS host attribute for the enclosing component's styles.
        if let Some(hash) = &self.style_hash {
            props.push(format!("\"data-lux-{}\": \"\"", hash));
        }

        let children: Vec<String> = el
            .children
            .iter()
            .map(|c| self.jsx_child(c))
            .collect();

        let props_js = if props.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", props.join(", "))
        };
        format!(
            "lux_el({}, {}, [{}])",
            js_string(&el.tag),
            props_js,
            children.join(", ")
        )
    }

    fn jsx_child(&mut self, child: &JsxChild) -> String {
        match child {
            JsxChild::Text { value, .. } => js_string(value),
            JsxChild::Expr { expr, .. } => self.reactive_wrap(expr),
            JsxChild::Element(el) => self.jsx_element(el),
            JsxChild::If {
                branches,
                else_children,
                ..
            } => {
                let mut out = String::from("() => ");
                for (cond, body) in branches {
                    let cond_js = self.expr(cond);
                    let body_js = self.jsx_child_group(body);
                    out.push_str(&format!("({}) ? {} : ", cond_js, body_js));
                }
                match else_children {
                    Some(body) => out.push_str(&self.jsx_child_group(body)),
                    None => out.push_str("null"),
                }
                out
            }
            JsxChild::For {
                binding,
                iter,
                body,
                ..
            } => {
                let iter_js = self.expr(iter);
                self.push_scope();
                self.declare(binding, VarInfo::default());
                let body_js = self.jsx_loop_body(body);
                self.pop_scope();
                format!("() => ({}).map(({}) => {})", iter_js, binding, body_js)
            }
        }
    }

    fn jsx_child_group(&mut self, children: &[JsxChild]) -> String {
        let rendered: Vec<String> = children.iter().map(|c| self.jsx_child(c)).collect();
        match rendered.len() {
            0 => "null".to_string(),
            1 => rendered.into_iter().next().unwrap_or_default(),
            _ => format!("[{}]", rendered.join(", ")),
        }
    }

    /// A loop body; a single element child with a `key` attribute becomes
    /// `lux_keyed(key, element)` for stable reconciliation.
    fn jsx_loop_body(&mut self, body: &[JsxChild]) -> String {
        if body.len() == 1 {
            if let JsxChild::Element(el) = &body[0] {
                if let Some(key) = el.static_attr("key").cloned() {
                    let key_js = self.expr(&key);
                    let element_js = self.jsx_element(el);
                    return format!("lux_keyed({}, {})", key_js, element_js);
                }
            }
        }
        self.jsx_child_group(body)
    }

    // ── Two-way bindings ────────────────────────────────────────────────

    fn bind_props(&mut self, el: &JsxElement, kind: BindKind, target: &Expr) -> Vec<String> {
        let read = self.expr(target);
        match kind {
            BindKind::Value => {
                let event = if el.tag == "select" { "onChange" } else { "onInput" };
                vec![
                    format!("value: () => {}", read),
                    format!("{}: (e) => {}", event, self.assign_to(target, "e.target.value")),
                ]
            }
            BindKind::Checked => vec![
                format!("checked: () => {}", read),
                format!(
                    "onChange: (e) => {}",
                    self.assign_to(target, "e.target.checked")
                ),
            ],
            BindKind::Group => {
                let input_type = el
                    .static_attr("type")
                    .and_then(|v| match v {
                        Expr::Str { value, .. } => Some(value.clone()),
                        _ => None,
                    })
                    .unwrap_or_else(|| "radio".to_string());
                let value_js = el
                    .static_attr("value")
                    .cloned()
                    .map(|v| self.expr(&v))
                    .unwrap_or_else(|| "\"\"".to_string());
                if input_type == "checkbox" {
                    let toggle = self.group_toggle(target, &read, &value_js);
                    vec![
                        format!("checked: () => {}.includes({})", read, value_js),
                        format!("onChange: () => {}", toggle),
                    ]
                } else {
                    vec![
                        format!("checked: () => {} === {}", read, value_js),
                        format!("onChange: () => {}", self.assign_to(target, &value_js)),
                    ]
                }
            }
        }
    }

    /// An assignment expression writing `value_src` into a bind target.
    fn assign_to(&mut self, target: &Expr, value_src: &str) -> String {
        if let Expr::Ident { name, .. } = target {
            if let Some(info) = self.lookup(name).cloned() {
                if let Some(setter) = info.setter {
                    return format!("{}({})", setter, value_src);
                }
            }
        }
        let target_js = match target {
            Expr::Ident { name, .. } => self.ident(name),
            other => self.expr(other),
        };
        format!("{} = {}", target_js, value_src)
    }

    /// Checkbox-group toggle: membership flip on an array-valued binding.
    fn group_toggle(&mut self, target: &Expr, read: &str, value_js: &str) -> String {
        if let Expr::Ident { name, .. } = target {
            if let Some(info) = self.lookup(name).cloned() {
                if let Some(setter) = info.setter {
                    return format!(
                        "{}(__lux_p => __lux_p.includes({}) ? __lux_p.filter((x) => x !== {}) : [...__lux_p, {}])",
                        setter, value_js, value_js, value_js
                    );
                }
            }
        }
        let flipped = format!(
            "{}.includes({}) ? {}.filter((x) => x !== {}) : [...{}, {}]",
            read, value_js, read, value_js, read, value_js
        );
        self.assign_to(target, &flipped)
    }

    /// Wraps reactive expressions in a tracking thunk.
    pub(crate) fn reactive_wrap(&mut self, expr: &Expr) -> String {
        let js = self.expr(expr);
        if self.is_reactive(expr) {
            format!("() => {}", js)
        } else {
            js
        }
    }

    /// Whether evaluating this expression reads a signal, computed value, or
    /// store member.
    pub(crate) fn is_reactive(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Ident { name, .. } => {
                self.lookup(name).map_or(false, |info| info.reactive)
            }
            Expr::Member { object, .. } | Expr::OptionalMember { object, .. } => {
                if let Expr::Ident { name, .. } = object.as_ref() {
                    if self.reg.stores.contains(name) {
                        return true;
                    }
                }
                self.is_reactive(object)
            }
            Expr::Index { object, index, .. } | Expr::OptionalIndex { object, index, .. } => {
                self.is_reactive(object) || self.is_reactive(index)
            }
            Expr::Binary { lhs, rhs, .. } | Expr::Logical { lhs, rhs, .. } => {
                self.is_reactive(lhs) || self.is_reactive(rhs)
            }
            Expr::Unary { operand, .. }
            | Expr::Propagate { operand, .. }
            | Expr::Await { operand, .. }
            | Expr::Spread { operand, .. } => self.is_reactive(operand),
            Expr::Compare { operands, .. } => operands.iter().any(|o| self.is_reactive(o)),
            Expr::Membership { item, collection, .. } => {
                self.is_reactive(item) || self.is_reactive(collection)
            }
            Expr::Pipe { input, stage, .. } => {
                self.is_reactive(input) || self.is_reactive(stage)
            }
            Expr::Range { start, end, .. } => {
                self.is_reactive(start) || self.is_reactive(end)
            }
            Expr::Slice {
                object,
                start,
                end,
                step,
                ..
            } => {
                self.is_reactive(object)
                    || [start, end, step]
                        .into_iter()
                        .flatten()
                        .any(|e| self.is_reactive(e))
            }
            Expr::Call { callee, args, .. } => {
                self.is_reactive(callee)
                    || args.iter().any(|a| match a {
                        Arg::Positional(e) | Arg::Spread(e) => self.is_reactive(e),
                        Arg::Named { value, .. } => self.is_reactive(value),
                    })
            }
            Expr::Array { items, .. } | Expr::Tuple { items, .. } => {
                items.iter().any(|i| self.is_reactive(i))
            }
            Expr::Object { entries, .. } => entries.iter().any(|e| match e {
                ObjectEntry::Field { value, .. } | ObjectEntry::Spread { value, .. } => {
                    self.is_reactive(value)
                }
                ObjectEntry::Shorthand { name, .. } => {
                    self.lookup(name).map_or(false, |info| info.reactive)
                }
            }),
            Expr::Template { parts, .. } => parts.iter().any(|p| match p {
                TemplateChunk::Expr(e) => self.is_reactive(e),
                TemplateChunk::Text(_) => false,
            }),
            Expr::Match { subject, .. } => self.is_reactive(subject),
            Expr::IfExpr { branches, .. } => {
                branches.iter().any(|(c, _)| self.is_reactive(c))
            }
            // Handlers and nested functions track their own reads.
            Expr::Lambda { .. } => false,
            _ => false,
        }
    }
}
