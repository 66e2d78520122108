//! Match and destructuring patterns.

use tova_base::Span;

use crate::ast::expr::Expr;

/// One field of an object pattern: `{ key }`, `{ key: pat }`, `{ key = default }`.
#[derive(Debug, Clone)]
pub struct ObjectPatternField {
    pub key: String,
    /// Sub-pattern when the field is renamed or destructured further.
    pub pattern: Option<Pattern>,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Wildcard { span: Span },
    Int { value: i64, span: Span },
    Float { value: f64, span: Span },
    Str { value: String, span: Span },
    Bool { value: bool, span: Span },
    Nil { span: Span },
    /// Numeric range pattern: `1..10` or `1..=10`.
    Range { start: i64, end: i64, inclusive: bool, span: Span },
    Binding { name: String, span: Span },
    /// `Ctor(p1, p2)` or a bare uppercase constructor like `None`.
    Variant { name: String, args: Vec<Pattern>, span: Span },
    Array { items: Vec<Pattern>, rest: Option<String>, span: Span },
    Object { fields: Vec<ObjectPatternField>, span: Span },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Wildcard { span }
            | Pattern::Int { span, .. }
            | Pattern::Float { span, .. }
            | Pattern::Str { span, .. }
            | Pattern::Bool { span, .. }
            | Pattern::Nil { span }
            | Pattern::Range { span, .. }
            | Pattern::Binding { span, .. }
            | Pattern::Variant { span, .. }
            | Pattern::Array { span, .. }
            | Pattern::Object { span, .. } => *span,
        }
    }

    /// Names bound by this pattern, in source order.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Binding { name, .. } => out.push(name),
            Pattern::Variant { args, .. } => {
                for arg in args {
                    arg.collect_names(out);
                }
            }
            Pattern::Array { items, rest, .. } => {
                for item in items {
                    item.collect_names(out);
                }
                if let Some(rest) = rest {
                    out.push(rest);
                }
            }
            Pattern::Object { fields, .. } => {
                for field in fields {
                    match &field.pattern {
                        Some(p) => p.collect_names(out),
                        None => out.push(&field.key),
                    }
                }
            }
            _ => {}
        }
    }

    /// An arm with this pattern matches every subject.
    pub fn is_irrefutable(&self) -> bool {
        matches!(self, Pattern::Wildcard { .. } | Pattern::Binding { .. })
    }
}
