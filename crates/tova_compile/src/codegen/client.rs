//! Client-stream generation: reactive state, components, stores, and the
//! runtime import.

use tova_language::ast::{ClientBlock, ClientDecl, ComponentDecl, Expr, Stmt, StoreDecl};

use super::{capitalize, js_string, with_helpers, Codegen, Registries, Target, VarInfo};

/// Every runtime export the emitted client code may reference.
const RUNTIME_IMPORT: &str = "import { createSignal, createEffect, createComputed, createRoot, batch, onMount, onCleanup, createRef, createContext, provide, inject, createErrorBoundary, ErrorBoundary, watch, untrack, Dynamic, Portal, lazy, lux_el, lux_fragment, lux_keyed, lux_inject_css, render, mount } from \"tova/runtime\";\n";

pub(crate) fn generate_client(blocks: &[&ClientBlock], reg: &Registries) -> String {
    let mut gen = Codegen::new(Target::Client, reg);
    let mut body = String::new();
    for block in blocks {
        for decl in &block.body {
            body.push_str(&gen.client_decl(decl));
        }
    }
    let mut out = String::from(RUNTIME_IMPORT);
    out.push('\n');
    out.push_str(&with_helpers(body, &gen));
    out
}

impl<'a> Codegen<'a> {
    pub(crate) fn client_decl(&mut self, decl: &ClientDecl) -> String {
        let mut out = String::new();
        match decl {
            ClientDecl::State { name, value, .. } => {
                let value_js = self.expr(value);
                let setter = format!("set{}", capitalize(name));
                self.line(
                    &mut out,
                    &format!(
                        "const [{}, {}] = createSignal({});",
                        name, setter, value_js
                    ),
                );
                self.declare(
                    name,
                    VarInfo {
                        mutable: true,
                        reactive: true,
                        setter: Some(setter),
                    },
                );
            }
            ClientDecl::Computed { name, value, .. } => {
                let value_js = self.expr(value);
                self.line(
                    &mut out,
                    &format!("const {} = createComputed(() => {});", name, value_js),
                );
                self.declare(
                    name,
                    VarInfo {
                        mutable: false,
                        reactive: true,
                        setter: None,
                    },
                );
            }
            ClientDecl::Effect { body, .. } => {
                self.line(&mut out, "createEffect(() => {");
                let inner = self.block_body(body, false);
                out.push_str(&inner);
                self.line(&mut out, "});");
            }
            ClientDecl::Component(component) => out.push_str(&self.component(component)),
            ClientDecl::Store(store) => out.push_str(&self.store(store)),
            ClientDecl::Fn(decl) => out.push_str(&self.function(decl)),
            ClientDecl::Stmt(stmt) => out.push_str(&self.stmt(stmt)),
        }
        out
    }

    fn component(&mut self, component: &ComponentDecl) -> String {
        let mut out = String::new();

        // Scoped styles: the hash comes from the CSS content, not the
        // component name, so renames do not invalidate caches.
        if let Some(style) = &component.style {
            let hash = style_hash(&style.css);
            let scoped = scope_css(&style.css, &hash);
            self.line(
                &mut out,
                &format!(
                    "lux_inject_css({}, {});",
                    js_string(&hash),
                    js_string(&scoped)
                ),
            );
            self.style_hash = Some(hash);
        }

        self.declare(&component.name, VarInfo::default());
        let params_js = if component.params.is_empty() {
            String::new()
        } else {
            let names: Vec<String> = component
                .params
                .iter()
                .map(|p| match &p.default {
                    Some(default) => {
                        let default_js = self.expr(default);
                        format!("{} = {}", p.name, default_js)
                    }
                    None => p.name.clone(),
                })
                .collect();
            format!("{{ {} }}", names.join(", "))
        };
        self.line(
            &mut out,
            &format!("function {}({}) {{", component.name, params_js),
        );

        self.push_scope();
        for param in &component.params {
            self.declare(&param.name, VarInfo::default());
        }
        self.indent += 1;
        let mut roots: Vec<String> = Vec::new();
        for decl in &component.body {
            if let ClientDecl::Stmt(Stmt::Expr {
                expr: Expr::Jsx { element, .. },
                ..
            }) = decl
            {
                let rendered = self.jsx_element(element);
                roots.push(rendered);
                continue;
            }
            out.push_str(&self.client_decl(decl));
        }
        match roots.len() {
            0 => self.line(&mut out, "return null;"),
            1 => {
                let root = roots.remove(0);
                self.line(&mut out, &format!("return {};", root));
            }
            _ => {
                let fragment = format!("return lux_fragment([{}]);", roots.join(", "));
                self.line(&mut out, &fragment);
            }
        }
        self.indent -= 1;
        self.pop_scope();
        self.line(&mut out, "}");

        self.style_hash = None;
        out
    }

    fn store(&mut self, store: &StoreDecl) -> String {
        let mut out = String::new();
        self.line(&mut out, &format!("const {} = (() => {{", store.name));
        self.push_scope();
        self.indent += 1;

        // `(name, has_setter)` for getters, plus exposed action names.
        let mut members: Vec<(String, bool)> = Vec::new();
        let mut actions: Vec<String> = Vec::new();
        for decl in &store.body {
            match decl {
                ClientDecl::State { name, .. } => {
                    out.push_str(&self.client_decl(decl));
                    members.push((name.clone(), true));
                }
                ClientDecl::Computed { name, .. } => {
                    out.push_str(&self.client_decl(decl));
                    members.push((name.clone(), false));
                }
                ClientDecl::Fn(f) => {
                    out.push_str(&self.function(f));
                    actions.push(f.name.clone());
                }
                other => out.push_str(&self.client_decl(other)),
            }
        }

        self.line(&mut out, "return {");
        self.indent += 1;
        for (name, has_setter) in &members {
            self.line(
                &mut out,
                &format!("get {}() {{ return {}(); }},", name, name),
            );
            if *has_setter {
                self.line(
                    &mut out,
                    &format!(
                        "set {}(v) {{ set{}(v); }},",
                        name,
                        capitalize(name)
                    ),
                );
            }
        }
        for action in &actions {
            self.line(&mut out, &format!("{},", action));
        }
        self.indent -= 1;
        self.line(&mut out, "};");

        self.indent -= 1;
        self.pop_scope();
        self.line(&mut out, "})();");
        self.declare(&store.name, VarInfo::default());
        out
    }
}

/// A stable hash of the CSS content, used both in the injected stylesheet
/// and in the `data-lux-*` host attribute.
pub(crate) fn style_hash(css: &str) -> String {
    let mut hash: u32 = 5381;
    for byte in css.bytes() {
        hash = hash.wrapping_mul(33) ^ (byte as u32);
    }
    format!("{:06x}", hash & 0x00ff_ffff)
}

/// Suffixes every selector with the scope attribute:
/// `button:hover` -> `button:hover[data-lux-<hash>]`.
pub(crate) fn scope_css(css: &str, hash: &str) -> String {
    let mut out = String::new();
    for rule in css.split('}') {
        let Some((selectors, body)) = rule.split_once('{') else {
            continue;
        };
        if selectors.trim().is_empty() {
            continue;
        }
        let scoped: Vec<String> = selectors
            .split(',')
            .map(|s| format!("{}[data-lux-{}]", s.trim(), hash))
            .collect();
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format!(
            "{} {{ {} }}",
            scoped.join(", "),
            body.split_whitespace().collect::<Vec<_>>().join(" ")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_hash_is_stable_and_content_derived() {
        let a = style_hash("button { color: red; }");
        let b = style_hash("button { color: red; }");
        let c = style_hash("button { color: blue; }");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn scope_css_suffixes_every_selector() {
        let scoped = scope_css("button, a:hover { color: red; }", "abc123");
        assert_eq!(
            scoped,
            "button[data-lux-abc123], a:hover[data-lux-abc123] { color: red; }"
        );
    }
}
