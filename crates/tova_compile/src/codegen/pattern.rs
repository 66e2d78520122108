//! Match lowering.
//!
//! Two strategies, chosen per expression:
//!
//! - **Ternary chain** when the subject is a simple identifier and every arm
//!   has a literal/range pattern, no guard, no bindings, and an expression
//!   body: `(v === 0) ? "z" : (v === 1) ? "o" : "other"`.
//! - **IIFE** otherwise: `((__match) => { if (...) { ... return ...; } })(subject)`,
//!   with variant fields bound as consts inside each arm.

use tova_language::ast::{Expr, MatchArm, Pattern, Stmt};

use super::{js_string, Codegen, VarInfo};

/// A compiled pattern: the test condition (`None` matches everything) and
/// the bindings it introduces as `(name, access-path)` pairs.
pub(crate) struct PatternTest {
    pub cond: Option<String>,
    pub bindings: Vec<(String, String)>,
}

impl<'a> Codegen<'a> {
    pub(crate) fn match_expr(&mut self, subject: &Expr, arms: &[MatchArm]) -> String {
        if self.ternary_eligible(subject, arms) {
            return self.match_ternary(subject, arms);
        }
        self.match_iife(subject, arms)
    }

    fn ternary_eligible(&self, subject: &Expr, arms: &[MatchArm]) -> bool {
        if !matches!(subject, Expr::Ident { .. }) || arms.is_empty() {
            return false;
        }
        arms.iter().all(|arm| {
            arm.guard.is_none()
                && arm.expr_body
                && matches!(
                    arm.pattern,
                    Pattern::Int { .. }
                        | Pattern::Float { .. }
                        | Pattern::Str { .. }
                        | Pattern::Bool { .. }
                        | Pattern::Nil { .. }
                        | Pattern::Range { .. }
                        | Pattern::Wildcard { .. }
                )
        })
    }

    fn match_ternary(&mut self, subject: &Expr, arms: &[MatchArm]) -> String {
        let subject_js = self.expr(subject);
        let mut out = String::new();
        let mut else_value: Option<String> = None;
        for arm in arms {
            let body = self.arm_expr_value(arm);
            if matches!(arm.pattern, Pattern::Wildcard { .. }) {
                else_value = Some(body);
                break;
            }
            let test = self.pattern_test(&arm.pattern, &subject_js);
            let cond = test.cond.unwrap_or_else(|| "true".to_string());
            out.push_str(&format!("({}) ? {} : ", cond, body));
        }
        out.push_str(&else_value.unwrap_or_else(|| "undefined".to_string()));
        out
    }

    fn arm_expr_value(&mut self, arm: &MatchArm) -> String {
        if let Some(Stmt::Expr { expr, .. }) = arm.body.first() {
            self.expr(expr)
        } else {
            "undefined".to_string()
        }
    }

    fn match_iife(&mut self, subject: &Expr, arms: &[MatchArm]) -> String {
        let subject_js = self.expr(subject);
        let mut out = String::from("((__match) => {\n");
        self.indent += 1;

        for arm in arms {
            let test = self.pattern_test(&arm.pattern, "__match");
            self.push_scope();
            for (name, _) in &test.bindings {
                self.declare(name, VarInfo::default());
            }

            let opens_block = test.cond.is_some() || !test.bindings.is_empty() || arm.guard.is_some();
            match &test.cond {
                Some(cond) => {
                    out.push_str(&format!("{}if ({}) {{\n", self.ind(), cond));
                }
                None if opens_block => {
                    // Bare block scopes the bindings of irrefutable arms.
                    out.push_str(&format!("{}{{\n", self.ind()));
                }
                None => {}
            }
            if opens_block {
                self.indent += 1;
            }
            for (name, access) in &test.bindings {
                out.push_str(&format!("{}const {} = {};\n", self.ind(), name, access));
            }

            if let Some(guard) = &arm.guard {
                let guard_js = self.expr(guard);
                out.push_str(&format!("{}if ({}) {{\n", self.ind(), guard_js));
                self.indent += 1;
                out.push_str(&self.arm_body(arm));
                self.indent -= 1;
                out.push_str(&format!("{}}}\n", self.ind()));
            } else {
                out.push_str(&self.arm_body(arm));
            }

            if opens_block {
                self.indent -= 1;
                out.push_str(&format!("{}}}\n", self.ind()));
            }
            self.pop_scope();
        }

        out.push_str(&format!("{}return undefined;\n", self.ind()));
        self.indent -= 1;
        out.push_str(&format!("{}}})({})", self.ind(), subject_js));
        out
    }

    /// Emits the arm body at the current indent level.
    fn arm_body(&mut self, arm: &MatchArm) -> String {
        if arm.expr_body {
            let value = self.arm_expr_value(arm);
            format!("{}return {};\n", self.ind(), value)
        } else {
            // block_body emits one level deeper than the cursor.
            self.indent -= 1;
            let body = self.block_body(&arm.body, true);
            self.indent += 1;
            body
        }
    }

    /// Compiles one pattern against an access path.
    pub(crate) fn pattern_test(&mut self, pattern: &Pattern, subject: &str) -> PatternTest {
        match pattern {
            Pattern::Wildcard { .. } => PatternTest {
                cond: None,
                bindings: Vec::new(),
            },
            Pattern::Int { value, .. } => PatternTest {
                cond: Some(format!("{} === {}", subject, value)),
                bindings: Vec::new(),
            },
            Pattern::Float { value, .. } => PatternTest {
                cond: Some(format!("{} === {}", subject, value)),
                bindings: Vec::new(),
            },
            Pattern::Str { value, .. } => PatternTest {
                cond: Some(format!("{} === {}", subject, js_string(value))),
                bindings: Vec::new(),
            },
            Pattern::Bool { value, .. } => PatternTest {
                cond: Some(format!("{} === {}", subject, value)),
                bindings: Vec::new(),
            },
            Pattern::Nil { .. } => PatternTest {
                cond: Some(format!("{} === null", subject)),
                bindings: Vec::new(),
            },
            Pattern::Range {
                start,
                end,
                inclusive,
                ..
            } => {
                let upper = if *inclusive { "<=" } else { "<" };
                PatternTest {
                    cond: Some(format!(
                        "{} >= {} && {} {} {}",
                        subject, start, subject, upper, end
                    )),
                    bindings: Vec::new(),
                }
            }
            Pattern::Binding { name, .. } => PatternTest {
                cond: None,
                bindings: vec![(name.clone(), subject.to_string())],
            },
            Pattern::Variant { name, args, .. } => {
                let mut conds = vec![format!("{}.__tag === {}", subject, js_string(name))];
                let mut bindings = Vec::new();
                let fields = self.reg.variants.get(name).cloned().unwrap_or_default();
                for (i, arg) in args.iter().enumerate() {
                    let field = fields
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("_{}", i));
                    let access = format!("{}.{}", subject, field);
                    let inner = self.pattern_test(arg, &access);
                    if let Some(cond) = inner.cond {
                        conds.push(cond);
                    }
                    bindings.extend(inner.bindings);
                }
                PatternTest {
                    cond: Some(conds.join(" && ")),
                    bindings,
                }
            }
            Pattern::Array { items, rest, .. } => {
                let length_check = if rest.is_some() {
                    format!("{}.length >= {}", subject, items.len())
                } else {
                    format!("{}.length === {}", subject, items.len())
                };
                let mut conds = vec![format!("Array.isArray({})", subject), length_check];
                let mut bindings = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    let access = format!("{}[{}]", subject, i);
                    let inner = self.pattern_test(item, &access);
                    if let Some(cond) = inner.cond {
                        conds.push(cond);
                    }
                    bindings.extend(inner.bindings);
                }
                if let Some(rest) = rest {
                    bindings.push((rest.clone(), format!("{}.slice({})", subject, items.len())));
                }
                PatternTest {
                    cond: Some(conds.join(" && ")),
                    bindings,
                }
            }
            Pattern::Object { fields, .. } => {
                let mut conds = vec![format!(
                    "typeof {} === \"object\" && {} !== null",
                    subject, subject
                )];
                let mut bindings = Vec::new();
                for field in fields {
                    let access = format!("{}.{}", subject, field.key);
                    match &field.pattern {
                        Some(pattern) => {
                            let inner = self.pattern_test(pattern, &access);
                            if let Some(cond) = inner.cond {
                                conds.push(cond);
                            }
                            bindings.extend(inner.bindings);
                        }
                        None => {
                            let value = match &field.default {
                                Some(default) => {
                                    let default_js = self.expr(default);
                                    format!("({} ?? {})", access, default_js)
                                }
                                None => access,
                            };
                            bindings.push((field.key.clone(), value));
                        }
                    }
                }
                PatternTest {
                    cond: Some(conds.join(" && ")),
                    bindings,
                }
            }
        }
    }
}
