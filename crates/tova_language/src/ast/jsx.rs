//! JSX template nodes, parsed only inside client contexts.

use tova_base::Span;

use crate::ast::expr::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindKind {
    Value,
    Checked,
    Group,
}

#[derive(Debug, Clone)]
pub enum JsxAttr {
    /// `name="x"`, `name={expr}`, or bare `name` (lowered to `true`).
    Static {
        name: String,
        value: Option<Expr>,
        span: Span,
    },
    /// `on:click={handler}`
    Event {
        event: String,
        handler: Expr,
        span: Span,
    },
    /// `bind:value={signal}` and friends.
    Bind {
        kind: BindKind,
        target: Expr,
        span: Span,
    },
    /// `class:active={cond}`
    ClassToggle {
        class: String,
        cond: Expr,
        span: Span,
    },
    /// `{...props}`
    Spread { value: Expr, span: Span },
    /// `slot="header"` - routes this element into a named slot of the parent
    /// component.
    Slot { name: String, span: Span },
}

#[derive(Debug, Clone)]
pub enum JsxChild {
    Element(JsxElement),
    /// Whitespace-collapsed raw text (quoted string children land here too).
    Text { value: String, span: Span },
    Expr { expr: Expr, span: Span },
    /// `{if cond { ... } elif ... else { ... }}`
    If {
        branches: Vec<(Expr, Vec<JsxChild>)>,
        else_children: Option<Vec<JsxChild>>,
        span: Span,
    },
    /// `{for item in items { ... }}`
    For {
        binding: String,
        iter: Expr,
        body: Vec<JsxChild>,
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub struct JsxElement {
    /// Lowercase names are host elements; capitalized names are components.
    pub tag: String,
    pub attrs: Vec<JsxAttr>,
    pub children: Vec<JsxChild>,
    pub self_closing: bool,
    pub span: Span,
}

impl JsxElement {
    pub fn is_component(&self) -> bool {
        self.tag.chars().next().map_or(false, |c| c.is_ascii_uppercase())
    }

    /// The value of a plain string or expression attribute, if present.
    pub fn static_attr(&self, name: &str) -> Option<&Expr> {
        self.attrs.iter().find_map(|a| match a {
            JsxAttr::Static { name: n, value: Some(v), .. } if n == name => Some(v),
            _ => None,
        })
    }

    /// The slot this element is routed to, if any.
    pub fn slot_name(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            JsxAttr::Slot { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}
