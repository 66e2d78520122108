//! Expression nodes.

use tova_base::Span;

use crate::ast::jsx::JsxElement;
use crate::ast::pattern::Pattern;
use crate::ast::stmt::Stmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    /// `??`, NaN-safe at codegen time.
    Nullish,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Nullish => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "===",
            CompareOp::Ne => "!==",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

/// One segment of a template literal.
#[derive(Debug, Clone)]
pub enum TemplateChunk {
    Text(String),
    Expr(Expr),
}

/// An entry in an object literal.
#[derive(Debug, Clone)]
pub enum ObjectEntry {
    Field { key: String, value: Expr, span: Span },
    Shorthand { name: String, span: Span },
    Spread { value: Expr, span: Span },
}

/// A call-site argument.
#[derive(Debug, Clone)]
pub enum Arg {
    Positional(Expr),
    Named { name: String, value: Expr, span: Span },
    Spread(Expr),
}

/// A declared parameter of a function, lambda, component, or handler.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeAnnotation>,
    pub default: Option<Expr>,
    pub span: Span,
}

/// A parsed type annotation. Used for hints only; never checked.
#[derive(Debug, Clone)]
pub enum TypeAnnotation {
    /// `Int`, `Result<T, E>`
    Name {
        name: String,
        params: Vec<TypeAnnotation>,
        span: Span,
    },
    /// `[T]`
    List { element: Box<TypeAnnotation>, span: Span },
    /// `T?`
    Optional { inner: Box<TypeAnnotation>, span: Span },
}

impl TypeAnnotation {
    /// Canonical display form, used as an inferred-type hint string.
    pub fn display(&self) -> String {
        match self {
            TypeAnnotation::Name { name, params, .. } => {
                if params.is_empty() {
                    name.clone()
                } else {
                    let inner: Vec<String> = params.iter().map(|p| p.display()).collect();
                    format!("{}<{}>", name, inner.join(", "))
                }
            }
            TypeAnnotation::List { element, .. } => format!("[{}]", element.display()),
            TypeAnnotation::Optional { inner, .. } => format!("{}?", inner.display()),
        }
    }
}

/// One arm of a `match` expression.
#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
    /// True when the arm body was a bare expression rather than a block.
    pub expr_body: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Int { value: i64, span: Span },
    Float { value: f64, span: Span },
    Str { value: String, span: Span },
    Template { parts: Vec<TemplateChunk>, span: Span },
    Regex { pattern: String, flags: String, span: Span },
    Bool { value: bool, span: Span },
    Nil { span: Span },
    Ident { name: String, span: Span },
    Array { items: Vec<Expr>, span: Span },
    Tuple { items: Vec<Expr>, span: Span },
    Object { entries: Vec<ObjectEntry>, span: Span },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    Logical { op: LogicalOp, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    Unary { op: UnaryOp, operand: Box<Expr>, span: Span },
    /// `a < b <= c` - kept n-ary, lowered to pairwise conjunction.
    Compare { operands: Vec<Expr>, ops: Vec<CompareOp>, span: Span },
    Membership { negated: bool, item: Box<Expr>, collection: Box<Expr>, span: Span },
    Pipe { input: Box<Expr>, stage: Box<Expr>, span: Span },
    Range { start: Box<Expr>, end: Box<Expr>, inclusive: bool, span: Span },
    Index { object: Box<Expr>, index: Box<Expr>, span: Span },
    Slice {
        object: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
        span: Span,
    },
    Member { object: Box<Expr>, property: String, span: Span },
    OptionalMember { object: Box<Expr>, property: String, span: Span },
    OptionalIndex { object: Box<Expr>, index: Box<Expr>, span: Span },
    /// Postfix `?` - early-returns the error from the enclosing function.
    Propagate { operand: Box<Expr>, span: Span },
    Call { callee: Box<Expr>, args: Vec<Arg>, span: Span },
    Spread { operand: Box<Expr>, span: Span },
    Lambda {
        params: Vec<Param>,
        body: Vec<Stmt>,
        expr_body: bool,
        is_async: bool,
        span: Span,
    },
    Match { subject: Box<Expr>, arms: Vec<MatchArm>, span: Span },
    IfExpr {
        branches: Vec<(Expr, Vec<Stmt>)>,
        else_branch: Option<Vec<Stmt>>,
        span: Span,
    },
    ListComp {
        element: Box<Expr>,
        binding: Box<Pattern>,
        iter: Box<Expr>,
        cond: Option<Box<Expr>>,
        span: Span,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        binding: Box<Pattern>,
        iter: Box<Expr>,
        cond: Option<Box<Expr>>,
        span: Span,
    },
    Await { operand: Box<Expr>, span: Span },
    Jsx { element: Box<JsxElement>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int { span, .. }
            | Expr::Float { span, .. }
            | Expr::Str { span, .. }
            | Expr::Template { span, .. }
            | Expr::Regex { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Nil { span }
            | Expr::Ident { span, .. }
            | Expr::Array { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::Object { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Logical { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Compare { span, .. }
            | Expr::Membership { span, .. }
            | Expr::Pipe { span, .. }
            | Expr::Range { span, .. }
            | Expr::Index { span, .. }
            | Expr::Slice { span, .. }
            | Expr::Member { span, .. }
            | Expr::OptionalMember { span, .. }
            | Expr::OptionalIndex { span, .. }
            | Expr::Propagate { span, .. }
            | Expr::Call { span, .. }
            | Expr::Spread { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Match { span, .. }
            | Expr::IfExpr { span, .. }
            | Expr::ListComp { span, .. }
            | Expr::DictComp { span, .. }
            | Expr::Await { span, .. }
            | Expr::Jsx { span, .. } => *span,
        }
    }

    /// True for expressions that are cheap and side-effect free to re-emit.
    pub fn is_simple(&self) -> bool {
        matches!(
            self,
            Expr::Int { .. }
                | Expr::Float { .. }
                | Expr::Str { .. }
                | Expr::Bool { .. }
                | Expr::Nil { .. }
                | Expr::Ident { .. }
        )
    }
}
