//! Pratt-style expression parsing.
//!
//! Precedence, low to high: pipe `|>`, `??`, `or`, `and`, `not`, chained
//! comparison (`== != < <= > >=`, n-ary), membership (`in` / `not in`),
//! range (`..` / `..=`), additive, multiplicative, power (right-assoc),
//! unary, postfix (`?` propagate, call, subscript/slice, member, `?.`),
//! primary.
//!
//! Two constructs need speculation:
//!
//! - `(` may open an arrow lambda, a parenthesized expression, or a tuple.
//!   The lambda interpretation is attempted first and backtracked on failure.
//! - `{` may open a dict comprehension or an object literal; the
//!   comprehension interpretation is attempted first.

use crate::ast::{
    Arg, BinaryOp, CompareOp, Expr, LogicalOp, MatchArm, ObjectEntry, Param, Pattern, Stmt,
    TemplateChunk, UnaryOp,
};
use crate::token::{TemplatePart, TokenKind};

use super::{PResult, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_pipe()
    }

    fn parse_pipe(&mut self) -> PResult<Expr> {
        let mut left = self.parse_nullish()?;
        while self.at(&TokenKind::PipeGt) {
            self.advance();
            self.skip_newlines();
            let stage = self.parse_nullish()?;
            let span = left.span().merge(stage.span());
            left = Expr::Pipe {
                input: Box::new(left),
                stage: Box::new(stage),
                span,
            };
        }
        Ok(left)
    }

    fn parse_nullish(&mut self) -> PResult<Expr> {
        let mut left = self.parse_or()?;
        while self.at(&TokenKind::QuestionQuestion) {
            self.advance();
            self.skip_newlines();
            let rhs = self.parse_or()?;
            let span = left.span().merge(rhs.span());
            left = Expr::Binary {
                op: BinaryOp::Nullish,
                lhs: Box::new(left),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.at(&TokenKind::Or) {
            self.advance();
            self.skip_newlines();
            let rhs = self.parse_and()?;
            let span = left.span().merge(rhs.span());
            left = Expr::Logical {
                op: LogicalOp::Or,
                lhs: Box::new(left),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_not()?;
        while self.at(&TokenKind::And) {
            self.advance();
            self.skip_newlines();
            let rhs = self.parse_not()?;
            let span = left.span().merge(rhs.span());
            left = Expr::Logical {
                op: LogicalOp::And,
                lhs: Box::new(left),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> PResult<Expr> {
        if self.at(&TokenKind::Not) && !matches!(self.nth_kind(1), TokenKind::In) {
            let span = self.peek().span;
            self.advance();
            let operand = self.parse_not()?;
            let span = span.merge(operand.span());
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_comparison()
    }

    /// One level for all six comparison operators so runs like `a < b <= c`
    /// collapse into a single n-ary node.
    fn parse_comparison(&mut self) -> PResult<Expr> {
        let first = self.parse_membership()?;
        let mut operands = vec![first];
        let mut ops = Vec::new();
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => CompareOp::Eq,
                TokenKind::NotEq => CompareOp::Ne,
                TokenKind::Lt => CompareOp::Lt,
                TokenKind::LtEq => CompareOp::Le,
                TokenKind::Gt => CompareOp::Gt,
                TokenKind::GtEq => CompareOp::Ge,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            ops.push(op);
            operands.push(self.parse_membership()?);
        }
        if ops.is_empty() {
            return Ok(operands.pop().unwrap());
        }
        let span = operands[0].span().merge(operands.last().unwrap().span());
        Ok(Expr::Compare { operands, ops, span })
    }

    fn parse_membership(&mut self) -> PResult<Expr> {
        let mut left = self.parse_range()?;
        loop {
            if self.at(&TokenKind::In) {
                self.advance();
                let collection = self.parse_range()?;
                let span = left.span().merge(collection.span());
                left = Expr::Membership {
                    negated: false,
                    item: Box::new(left),
                    collection: Box::new(collection),
                    span,
                };
            } else if self.at(&TokenKind::Not) && matches!(self.nth_kind(1), TokenKind::In) {
                self.advance();
                self.advance();
                let collection = self.parse_range()?;
                let span = left.span().merge(collection.span());
                left = Expr::Membership {
                    negated: true,
                    item: Box::new(left),
                    collection: Box::new(collection),
                    span,
                };
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_range(&mut self) -> PResult<Expr> {
        let left = self.parse_additive()?;
        let inclusive = match self.peek_kind() {
            TokenKind::DotDot => false,
            TokenKind::DotDotEq => true,
            _ => return Ok(left),
        };
        self.advance();
        let end = self.parse_additive()?;
        let span = left.span().merge(end.span());
        Ok(Expr::Range {
            start: Box::new(left),
            end: Box::new(end),
            inclusive,
            span,
        })
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let rhs = self.parse_multiplicative()?;
            let span = left.span().merge(rhs.span());
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let rhs = self.parse_power()?;
            let span = left.span().merge(rhs.span());
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(left)
    }

    fn parse_power(&mut self) -> PResult<Expr> {
        let base = self.parse_unary()?;
        if self.at(&TokenKind::StarStar) {
            self.advance();
            self.skip_newlines();
            // Right-associative.
            let exp = self.parse_power()?;
            let span = base.span().merge(exp.span());
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exp),
                span,
            });
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Not => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let span = self.peek().span;
            self.advance();
            let operand = self.parse_unary()?;
            let span = span.merge(operand.span());
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    let span = expr.span().merge(self.tokens_span_prev());
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                // A `[` that starts a line begins a new array literal
                // statement, not a subscript.
                TokenKind::LBracket if !self.peek().first_on_line => {
                    self.advance();
                    expr = self.parse_index_or_slice(expr)?;
                }
                TokenKind::Dot => {
                    self.advance();
                    let (property, pspan) = self.ident_like("after '.'")?;
                    let span = expr.span().merge(pspan);
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        span,
                    };
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    if self.at(&TokenKind::LBracket) {
                        self.advance();
                        let index = self.parse_expr()?;
                        let rb = self.expect(&TokenKind::RBracket, "in optional subscript")?;
                        let span = expr.span().merge(rb.span);
                        expr = Expr::OptionalIndex {
                            object: Box::new(expr),
                            index: Box::new(index),
                            span,
                        };
                    } else {
                        let (property, pspan) = self.ident_like("after '?.'")?;
                        let span = expr.span().merge(pspan);
                        expr = Expr::OptionalMember {
                            object: Box::new(expr),
                            property,
                            span,
                        };
                    }
                }
                // Postfix propagate; a `?` that begins a line is left alone.
                TokenKind::Question if !self.peek().first_on_line => {
                    let q = self.advance();
                    let span = expr.span().merge(q.span);
                    expr = Expr::Propagate {
                        operand: Box::new(expr),
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn tokens_span_prev(&self) -> tova_base::Span {
        if self.pos == 0 {
            self.peek().span
        } else {
            self.tokens[self.pos - 1].span
        }
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Arg>> {
        let mut args = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(&TokenKind::RParen) {
                break;
            }
            if self.at(&TokenKind::Ellipsis) {
                self.advance();
                let value = self.parse_expr()?;
                args.push(Arg::Spread(value));
            } else if matches!(self.peek_kind(), TokenKind::Ident(_))
                && matches!(self.nth_kind(1), TokenKind::Colon)
            {
                let (name, span) = self.expect_ident("in named argument")?;
                self.advance(); // :
                let value = self.parse_expr()?;
                args.push(Arg::Named { name, value, span });
            } else {
                args.push(Arg::Positional(self.parse_expr()?));
            }
            self.skip_newlines();
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RParen, "after arguments")?;
                break;
            }
        }
        Ok(args)
    }

    fn parse_index_or_slice(&mut self, object: Expr) -> PResult<Expr> {
        let start = if self.at(&TokenKind::Colon) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        if self.at(&TokenKind::RBracket) {
            let rb = self.advance();
            let index = start.ok_or_else(|| self.err("Expected index expression", rb.span))?;
            let span = object.span().merge(rb.span);
            return Ok(Expr::Index {
                object: Box::new(object),
                index: Box::new(index),
                span,
            });
        }

        self.expect(&TokenKind::Colon, "in slice")?;
        let end = if matches!(self.peek_kind(), TokenKind::Colon | TokenKind::RBracket) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let step = if self.eat(&TokenKind::Colon) {
            if self.at(&TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            }
        } else {
            None
        };
        let rb = self.expect(&TokenKind::RBracket, "to close slice")?;
        let span = object.span().merge(rb.span);
        Ok(Expr::Slice {
            object: Box::new(object),
            start: start.map(Box::new),
            end,
            step,
            span,
        })
    }

    // ── Primary ─────────────────────────────────────────────────────────

    fn parse_primary(&mut self) -> PResult<Expr> {
        let span = self.peek().span;
        match self.peek_kind().clone() {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::Int { value, span })
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expr::Float { value, span })
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::Str { value, span })
            }
            TokenKind::Template(parts) => {
                self.advance();
                self.parse_template(parts, span)
            }
            TokenKind::Regex { pattern, flags } => {
                self.advance();
                Ok(Expr::Regex { pattern, flags, span })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool { value: true, span })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool { value: false, span })
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Nil { span })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident { name, span })
            }
            // Keywords that double as stdlib names in expression position.
            TokenKind::Db | TokenKind::Env | TokenKind::Session | TokenKind::Cache => {
                let tok = self.advance();
                Ok(Expr::Ident { name: tok.lexeme, span })
            }
            TokenKind::LParen => self.parse_paren(),
            TokenKind::LBracket => self.parse_array_or_comp(),
            TokenKind::LBrace => self.parse_object_or_dict_comp(),
            TokenKind::Fn => self.parse_fn_lambda(false),
            TokenKind::Async if matches!(self.nth_kind(1), TokenKind::Fn) => {
                self.advance();
                self.parse_fn_lambda(true)
            }
            TokenKind::Match => self.parse_match(),
            TokenKind::If => self.parse_if_expr(),
            TokenKind::Await => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = span.merge(operand.span());
                Ok(Expr::Await {
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::Lt if self.client_depth > 0 => {
                let element = self.parse_jsx_element()?;
                let span = element.span;
                Ok(Expr::Jsx {
                    element: Box::new(element),
                    span,
                })
            }
            TokenKind::Error(msg) => {
                self.advance();
                Err(self.err(msg, span))
            }
            other => Err(self.err(
                format!("Unexpected token {}", other.describe()),
                span,
            )),
        }
    }

    pub(crate) fn parse_template(
        &mut self,
        parts: Vec<TemplatePart>,
        span: tova_base::Span,
    ) -> PResult<Expr> {
        let mut chunks = Vec::new();
        for part in parts {
            match part {
                TemplatePart::Text(text) => chunks.push(TemplateChunk::Text(text)),
                TemplatePart::Expr(tokens) => {
                    if tokens.is_empty() {
                        continue;
                    }
                    let sub = Parser::sub(self.source, tokens, &self.file, self.client_depth);
                    let expr = sub.parse_expr_entry()?;
                    chunks.push(TemplateChunk::Expr(expr));
                }
            }
        }
        Ok(Expr::Template { parts: chunks, span })
    }

    /// Entry point for sub-parsers over interpolation token slices.
    pub(crate) fn parse_expr_entry(mut self) -> PResult<Expr> {
        let expr = self.parse_expr()?;
        if !self.at(&TokenKind::Eof) {
            let found = self.peek_kind().describe();
            return Err(self.err(
                format!("Unexpected token {} in interpolation", found),
                self.peek().span,
            ));
        }
        Ok(expr)
    }

    // ── Parens: arrow lambda, grouping, tuple ───────────────────────────

    fn parse_paren(&mut self) -> PResult<Expr> {
        if let Some(result) = self.try_arrow_lambda() {
            return result;
        }
        let span = self.peek().span;
        self.advance(); // (
        self.skip_newlines();
        let first = self.parse_expr()?;
        self.skip_newlines();
        if self.at(&TokenKind::Comma) {
            let mut items = vec![first];
            while self.eat(&TokenKind::Comma) {
                self.skip_newlines();
                if self.at(&TokenKind::RParen) {
                    break;
                }
                items.push(self.parse_expr()?);
                self.skip_newlines();
            }
            let rp = self.expect(&TokenKind::RParen, "to close tuple")?;
            return Ok(Expr::Tuple {
                items,
                span: span.merge(rp.span),
            });
        }
        self.expect(&TokenKind::RParen, "to close expression")?;
        Ok(first)
    }

    /// Attempts `(params) => body`. Returns `None` (with the cursor restored)
    /// when the parens turn out not to be a parameter list; returns a real
    /// error only after the `=>` commits us.
    fn try_arrow_lambda(&mut self) -> Option<PResult<Expr>> {
        let save = self.save();
        let span = self.peek().span;
        self.advance(); // (

        let mut params: Vec<Param> = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(&TokenKind::RParen) {
                self.advance();
                break;
            }
            let (name, pspan) = match self.peek_kind().clone() {
                TokenKind::Ident(name) => {
                    let tok = self.advance();
                    (name, tok.span)
                }
                _ => {
                    self.restore(save);
                    return None;
                }
            };
            let ty = if self.at(&TokenKind::Colon) {
                self.advance();
                match self.parse_type_annotation() {
                    Ok(t) => Some(t),
                    Err(_) => {
                        self.restore(save);
                        return None;
                    }
                }
            } else {
                None
            };
            params.push(Param { name, ty, default: None, span: pspan });
            self.skip_newlines();
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            if self.at(&TokenKind::RParen) {
                self.advance();
                break;
            }
            self.restore(save);
            return None;
        }

        // Optional `-> Type` before the body arrow.
        if self.at(&TokenKind::Arrow) {
            self.advance();
            if self.parse_type_annotation().is_err() {
                self.restore(save);
                return None;
            }
        }
        if !self.at(&TokenKind::FatArrow) {
            self.restore(save);
            return None;
        }
        self.advance(); // =>

        Some(self.finish_lambda(params, false, span))
    }

    fn finish_lambda(
        &mut self,
        params: Vec<Param>,
        is_async: bool,
        span: tova_base::Span,
    ) -> PResult<Expr> {
        if self.at(&TokenKind::LBrace) {
            let body = self.block("in lambda body")?;
            Ok(Expr::Lambda {
                params,
                body,
                expr_body: false,
                is_async,
                span,
            })
        } else {
            let expr = self.parse_expr()?;
            let span = span.merge(expr.span());
            let stmt_span = expr.span();
            Ok(Expr::Lambda {
                params,
                body: vec![Stmt::Expr { expr, span: stmt_span }],
                expr_body: true,
                is_async,
                span,
            })
        }
    }

    /// `fn (params) body` lambda form. The body may be a block or a single
    /// statement (`fn() count += 1`).
    fn parse_fn_lambda(&mut self, is_async: bool) -> PResult<Expr> {
        let span = self.peek().span;
        self.advance(); // fn
        self.expect(&TokenKind::LParen, "after 'fn'")?;
        let params = self.parse_params()?;
        if self.at(&TokenKind::LBrace) {
            let body = self.block("in lambda body")?;
            return Ok(Expr::Lambda {
                params,
                body,
                expr_body: false,
                is_async,
                span,
            });
        }
        let stmt = self.parse_lambda_stmt()?;
        let expr_body = matches!(stmt, Stmt::Expr { .. });
        Ok(Expr::Lambda {
            params,
            body: vec![stmt],
            expr_body,
            is_async,
            span,
        })
    }

    /// A single statement as a lambda body: expression, assignment, or
    /// compound assignment, without consuming the statement terminator.
    fn parse_lambda_stmt(&mut self) -> PResult<Stmt> {
        let span = self.peek().span;
        let first = self.parse_expr()?;
        if self.at(&TokenKind::Eq) {
            self.advance();
            let value = self.parse_expr()?;
            return Ok(Stmt::Assign {
                targets: vec![first],
                values: vec![value],
                span,
            });
        }
        let compound = match self.peek_kind() {
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            _ => None,
        };
        if let Some(op) = compound {
            self.advance();
            let value = self.parse_expr()?;
            return Ok(Stmt::CompoundAssign {
                target: first,
                op,
                value,
                span,
            });
        }
        Ok(Stmt::Expr { expr: first, span })
    }

    // ── Match and if expressions ────────────────────────────────────────

    fn parse_match(&mut self) -> PResult<Expr> {
        let span = self.peek().span;
        self.advance(); // match
        let subject = self.parse_expr()?;
        self.skip_newlines();
        self.expect(&TokenKind::LBrace, "after match subject")?;

        let mut arms = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            let arm_span = self.peek().span;
            let pattern = self.parse_pattern()?;
            let guard = if self.eat(&TokenKind::If) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(&TokenKind::FatArrow, "in match arm")?;
            self.skip_newlines();
            let (body, expr_body) = if self.at(&TokenKind::LBrace) {
                (self.block("in match arm body")?, false)
            } else {
                let expr = self.parse_expr()?;
                let espan = expr.span();
                (vec![Stmt::Expr { expr, span: espan }], true)
            };
            arms.push(MatchArm {
                pattern,
                guard,
                body,
                expr_body,
                span: arm_span,
            });
            while self.eat(&TokenKind::Comma) {
                self.skip_newlines();
            }
        }

        Ok(Expr::Match {
            subject: Box::new(subject),
            arms,
            span,
        })
    }

    fn parse_if_expr(&mut self) -> PResult<Expr> {
        let span = self.peek().span;
        let (branches, else_branch) = self.parse_if_chain()?;
        Ok(Expr::IfExpr {
            branches,
            else_branch,
            span,
        })
    }

    // ── Array / object literals and comprehensions ──────────────────────

    fn parse_array_or_comp(&mut self) -> PResult<Expr> {
        let span = self.peek().span;
        self.advance(); // [
        self.skip_newlines();
        if self.at(&TokenKind::RBracket) {
            let rb = self.advance();
            return Ok(Expr::Array {
                items: Vec::new(),
                span: span.merge(rb.span),
            });
        }

        if self.at(&TokenKind::Ellipsis) {
            return self.finish_array(span, Vec::new());
        }

        let first = self.parse_expr()?;
        self.skip_newlines();
        if self.at(&TokenKind::For) {
            self.advance();
            let binding = self.parse_pattern()?;
            self.expect(&TokenKind::In, "in comprehension")?;
            let iter = self.parse_expr()?;
            let cond = if self.eat(&TokenKind::If) {
                Some(Box::new(self.parse_expr()?))
            } else {
                None
            };
            let rb = self.expect(&TokenKind::RBracket, "to close comprehension")?;
            return Ok(Expr::ListComp {
                element: Box::new(first),
                binding: Box::new(binding),
                iter: Box::new(iter),
                cond,
                span: span.merge(rb.span),
            });
        }

        self.finish_array(span, vec![first])
    }

    fn finish_array(&mut self, span: tova_base::Span, mut items: Vec<Expr>) -> PResult<Expr> {
        loop {
            self.skip_newlines();
            if self.at(&TokenKind::RBracket) {
                break;
            }
            if !items.is_empty() {
                self.expect(&TokenKind::Comma, "between array items")?;
                self.skip_newlines();
                if self.at(&TokenKind::RBracket) {
                    break;
                }
            }
            if self.at(&TokenKind::Ellipsis) {
                let sspan = self.peek().span;
                self.advance();
                let operand = self.parse_expr()?;
                let sspan = sspan.merge(operand.span());
                items.push(Expr::Spread {
                    operand: Box::new(operand),
                    span: sspan,
                });
            } else {
                items.push(self.parse_expr()?);
            }
        }
        let rb = self.expect(&TokenKind::RBracket, "to close array")?;
        Ok(Expr::Array {
            items,
            span: span.merge(rb.span),
        })
    }

    fn parse_object_or_dict_comp(&mut self) -> PResult<Expr> {
        // Speculate on `{ key_expr: value_expr for ... }` first.
        let save = self.save();
        if let Some(comp) = self.try_dict_comp() {
            return comp;
        }
        self.restore(save);

        let span = self.peek().span;
        self.advance(); // {
        let mut entries = Vec::new();
        loop {
            self.skip_separators();
            if self.at(&TokenKind::RBrace) {
                break;
            }
            let espan = self.peek().span;
            if self.at(&TokenKind::Ellipsis) {
                self.advance();
                let value = self.parse_expr()?;
                entries.push(ObjectEntry::Spread { value, span: espan });
                while self.eat(&TokenKind::Comma) {
                    self.skip_newlines();
                }
                continue;
            }
            let key = match self.peek_kind().clone() {
                TokenKind::Str(s) => {
                    self.advance();
                    s
                }
                _ => self.ident_like("as object key")?.0,
            };
            if self.eat(&TokenKind::Colon) {
                self.skip_newlines();
                let value = self.parse_expr()?;
                entries.push(ObjectEntry::Field { key, value, span: espan });
            } else {
                entries.push(ObjectEntry::Shorthand { name: key, span: espan });
            }
            // Entries separate with commas, newlines, or both.
            while self.eat(&TokenKind::Comma) {
                self.skip_newlines();
            }
        }
        let rb = self.expect(&TokenKind::RBrace, "to close object")?;
        Ok(Expr::Object {
            entries,
            span: span.merge(rb.span),
        })
    }

    fn try_dict_comp(&mut self) -> Option<PResult<Expr>> {
        let span = self.peek().span;
        self.advance(); // {
        self.skip_newlines();
        let key = self.parse_expr().ok()?;
        if !self.eat(&TokenKind::Colon) {
            return None;
        }
        self.skip_newlines();
        let value = self.parse_expr().ok()?;
        if !self.at(&TokenKind::For) {
            return None;
        }
        self.advance(); // for - committed now
        Some(self.finish_dict_comp(span, key, value))
    }

    fn finish_dict_comp(
        &mut self,
        span: tova_base::Span,
        key: Expr,
        value: Expr,
    ) -> PResult<Expr> {
        let binding = self.parse_pattern()?;
        self.expect(&TokenKind::In, "in comprehension")?;
        let iter = self.parse_expr()?;
        let cond = if self.eat(&TokenKind::If) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        let rb = self.expect(&TokenKind::RBrace, "to close comprehension")?;
        Ok(Expr::DictComp {
            key: Box::new(key),
            value: Box::new(value),
            binding: Box::new(binding),
            iter: Box::new(iter),
            cond,
            span: span.merge(rb.span),
        })
    }
}
