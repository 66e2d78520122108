//! Pattern parsing for `match` arms, `let` destructuring, and loop bindings.

use crate::ast::{ObjectPatternField, Pattern};
use crate::token::TokenKind;

use super::{PResult, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_pattern(&mut self) -> PResult<Pattern> {
        let span = self.peek().span;
        match self.peek_kind().clone() {
            TokenKind::Ident(name) if name == "_" => {
                self.advance();
                Ok(Pattern::Wildcard { span })
            }
            TokenKind::Ident(name) => {
                self.advance();
                let is_ctor = name.chars().next().map_or(false, |c| c.is_ascii_uppercase());
                if is_ctor {
                    let mut args = Vec::new();
                    if self.at(&TokenKind::LParen) {
                        self.advance();
                        loop {
                            self.skip_newlines();
                            if self.eat(&TokenKind::RParen) {
                                break;
                            }
                            args.push(self.parse_pattern()?);
                            if !self.eat(&TokenKind::Comma) {
                                self.expect(&TokenKind::RParen, "after variant pattern")?;
                                break;
                            }
                        }
                    }
                    Ok(Pattern::Variant { name, args, span })
                } else {
                    Ok(Pattern::Binding { name, span })
                }
            }
            TokenKind::Int(value) => {
                self.advance();
                self.maybe_range_pattern(value, span)
            }
            TokenKind::Minus => {
                self.advance();
                match self.peek_kind().clone() {
                    TokenKind::Int(value) => {
                        self.advance();
                        self.maybe_range_pattern(-value, span)
                    }
                    TokenKind::Float(value) => {
                        self.advance();
                        Ok(Pattern::Float { value: -value, span })
                    }
                    other => Err(self.err(
                        format!("Expected number after '-', found {}", other.describe()),
                        self.peek().span,
                    )),
                }
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Pattern::Float { value, span })
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Pattern::Str { value, span })
            }
            TokenKind::True => {
                self.advance();
                Ok(Pattern::Bool { value: true, span })
            }
            TokenKind::False => {
                self.advance();
                Ok(Pattern::Bool { value: false, span })
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Pattern::Nil { span })
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                let mut rest = None;
                loop {
                    self.skip_newlines();
                    if self.eat(&TokenKind::RBracket) {
                        break;
                    }
                    if self.at(&TokenKind::Ellipsis) {
                        self.advance();
                        let (name, _) = self.expect_ident("after '...' in array pattern")?;
                        rest = Some(name);
                        self.skip_newlines();
                        self.eat(&TokenKind::Comma);
                        self.expect(&TokenKind::RBracket, "after rest pattern")?;
                        break;
                    }
                    items.push(self.parse_pattern()?);
                    if !self.eat(&TokenKind::Comma) {
                        self.expect(&TokenKind::RBracket, "after array pattern")?;
                        break;
                    }
                }
                Ok(Pattern::Array { items, rest, span })
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                loop {
                    self.skip_newlines();
                    if self.eat(&TokenKind::RBrace) {
                        break;
                    }
                    let (key, fspan) = self.ident_like("in object pattern")?;
                    let pattern = if self.eat(&TokenKind::Colon) {
                        Some(self.parse_pattern()?)
                    } else {
                        None
                    };
                    let default = if self.eat(&TokenKind::Eq) {
                        Some(self.parse_expr()?)
                    } else {
                        None
                    };
                    fields.push(ObjectPatternField {
                        key,
                        pattern,
                        default,
                        span: fspan,
                    });
                    if !self.eat(&TokenKind::Comma) {
                        self.expect(&TokenKind::RBrace, "after object pattern")?;
                        break;
                    }
                }
                Ok(Pattern::Object { fields, span })
            }
            other => Err(self.err(
                format!("Expected pattern, found {}", other.describe()),
                span,
            )),
        }
    }

    fn maybe_range_pattern(&mut self, start: i64, span: tova_base::Span) -> PResult<Pattern> {
        let inclusive = match self.peek_kind() {
            TokenKind::DotDot => false,
            TokenKind::DotDotEq => true,
            _ => return Ok(Pattern::Int { value: start, span }),
        };
        self.advance();
        let negative = self.eat(&TokenKind::Minus);
        match self.peek_kind().clone() {
            TokenKind::Int(end) => {
                self.advance();
                let end = if negative { -end } else { end };
                Ok(Pattern::Range { start, end, inclusive, span })
            }
            other => Err(self.err(
                format!("Expected range end, found {}", other.describe()),
                self.peek().span,
            )),
        }
    }
}
