//! JSX parsing.
//!
//! JSX is only entered from expression-primary position inside a client
//! context, so `a < b` never reaches this module - infix `<` is always
//! comparison.
//!
//! Raw text children are not representable in the eagerly-lexed token stream
//! (`it's` would start a string literal, `</` would start a regex), so this
//! module works at two levels: tokens for tags, attributes, and embedded
//! expressions; raw bytes for text runs and closing tags. After each byte-level
//! consumption the remainder of the file is re-lexed and spliced into the
//! token buffer - this is the "lexer mode switch" driven by the parser.

use tova_base::Span;

use crate::ast::{BindKind, Expr, JsxAttr, JsxChild, JsxElement};
use crate::lexer::Lexer;
use crate::token::TokenKind;

use super::{PResult, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_jsx_element(&mut self) -> PResult<JsxElement> {
        let open = self.expect(&TokenKind::Lt, "to open JSX element")?;
        let (tag, _) = self.expect_ident("as JSX tag name")?;

        let mut attrs = Vec::new();
        let self_closing;
        loop {
            self.skip_newlines();
            match self.peek_kind() {
                TokenKind::Gt => {
                    self.advance();
                    self_closing = false;
                    break;
                }
                TokenKind::Slash => {
                    self.advance();
                    self.expect(&TokenKind::Gt, "after '/' in JSX element")?;
                    self_closing = true;
                    break;
                }
                TokenKind::LBrace => {
                    let span = self.peek().span;
                    self.advance();
                    self.expect(&TokenKind::Ellipsis, "in JSX spread attribute")?;
                    let value = self.parse_expr()?;
                    self.expect(&TokenKind::RBrace, "after JSX spread attribute")?;
                    attrs.push(JsxAttr::Spread { value, span });
                }
                _ => attrs.push(self.parse_jsx_attr()?),
            }
        }

        let children = if self_closing {
            Vec::new()
        } else {
            self.parse_jsx_children(&tag)?
        };

        Ok(JsxElement {
            tag,
            attrs,
            children,
            self_closing,
            span: open.span,
        })
    }

    fn parse_jsx_attr(&mut self) -> PResult<JsxAttr> {
        let (name, span) = self.ident_like("as JSX attribute name")?;

        if self.at(&TokenKind::Colon) {
            self.advance();
            let (arg, _) = self.ident_like("after ':' in JSX directive")?;
            self.expect(&TokenKind::Eq, "in JSX directive")?;
            let value = self.parse_jsx_attr_value()?;
            return match name.as_str() {
                "on" => Ok(JsxAttr::Event {
                    event: arg,
                    handler: value,
                    span,
                }),
                "bind" => {
                    let kind = match arg.as_str() {
                        "value" => BindKind::Value,
                        "checked" => BindKind::Checked,
                        "group" => BindKind::Group,
                        other => {
                            return Err(self.err(
                                format!("Unknown bind target 'bind:{}'", other),
                                span,
                            ))
                        }
                    };
                    Ok(JsxAttr::Bind {
                        kind,
                        target: value,
                        span,
                    })
                }
                "class" => Ok(JsxAttr::ClassToggle {
                    class: arg,
                    cond: value,
                    span,
                }),
                other => Err(self.err(
                    format!("Unknown JSX directive '{}:'", other),
                    span,
                )),
            };
        }

        if name == "slot" {
            self.expect(&TokenKind::Eq, "after 'slot'")?;
            let (slot, _) = self.expect_str("as slot name")?;
            return Ok(JsxAttr::Slot { name: slot, span });
        }

        let value = if self.eat(&TokenKind::Eq) {
            Some(self.parse_jsx_attr_value()?)
        } else {
            None
        };
        Ok(JsxAttr::Static { name, value, span })
    }

    fn parse_jsx_attr_value(&mut self) -> PResult<Expr> {
        let span = self.peek().span;
        match self.peek_kind().clone() {
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::Str { value, span })
            }
            TokenKind::Template(parts) => {
                self.advance();
                self.parse_template(parts, span)
            }
            TokenKind::LBrace => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RBrace, "after JSX attribute expression")?;
                Ok(expr)
            }
            other => Err(self.err(
                format!("Expected JSX attribute value, found {}", other.describe()),
                span,
            )),
        }
    }

    // ── Children ────────────────────────────────────────────────────────

    fn parse_jsx_children(&mut self, tag: &str) -> PResult<Vec<JsxChild>> {
        let mut children = Vec::new();
        loop {
            self.skip_newlines();

            // Closing tags are detected in the raw bytes: the eager lexer may
            // have mangled everything after `</` (a `/` after `<` looks like
            // a regex).
            if self.at_raw_close() {
                let (closing, span) = self.consume_raw_close()?;
                if closing != tag {
                    return Err(self.err(
                        format!(
                            "Mismatched JSX closing tag: expected '</{}>', found '</{}>'",
                            tag, closing
                        ),
                        span,
                    ));
                }
                return Ok(children);
            }

            match self.peek_kind().clone() {
                TokenKind::Eof => {
                    let span = self.peek().span;
                    return Err(self.err(format!("Expected '</{}>'", tag), span));
                }
                TokenKind::Str(value) => {
                    let tok = self.advance();
                    children.push(JsxChild::Text {
                        value,
                        span: tok.span,
                    });
                }
                TokenKind::Template(_) => {
                    let span = self.peek().span;
                    let expr = self.parse_expr()?;
                    children.push(JsxChild::Expr { expr, span });
                }
                TokenKind::Lt => {
                    children.push(JsxChild::Element(self.parse_jsx_element()?));
                }
                TokenKind::LBrace => {
                    children.push(self.parse_jsx_brace_child()?);
                }
                TokenKind::RBrace => {
                    let span = self.peek().span;
                    return Err(self.err("Unexpected token '}' in JSX", span));
                }
                _ => {
                    if let Some(text) = self.consume_jsx_text() {
                        children.push(text);
                    }
                }
            }
        }
    }

    /// Children of a `{if ...}` / `{for ...}` body, terminated by `}`.
    fn parse_jsx_body(&mut self) -> PResult<Vec<JsxChild>> {
        self.expect(&TokenKind::LBrace, "in JSX block")?;
        let mut children = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(&TokenKind::RBrace) {
                return Ok(children);
            }
            if self.at_raw_close() {
                let span = self.peek().span;
                return Err(self.err("Unexpected closing tag in JSX block", span));
            }
            match self.peek_kind().clone() {
                TokenKind::Eof => {
                    let span = self.peek().span;
                    return Err(self.err("Expected '}' to close JSX block", span));
                }
                TokenKind::Str(value) => {
                    let tok = self.advance();
                    children.push(JsxChild::Text {
                        value,
                        span: tok.span,
                    });
                }
                TokenKind::Template(_) => {
                    let span = self.peek().span;
                    let expr = self.parse_expr()?;
                    children.push(JsxChild::Expr { expr, span });
                }
                TokenKind::Lt => {
                    children.push(JsxChild::Element(self.parse_jsx_element()?));
                }
                TokenKind::LBrace => {
                    children.push(self.parse_jsx_brace_child()?);
                }
                _ => {
                    if let Some(text) = self.consume_jsx_text() {
                        children.push(text);
                    }
                }
            }
        }
    }

    /// A `{`-opened child: expression, `{if ...}`, or `{for ...}`.
    fn parse_jsx_brace_child(&mut self) -> PResult<JsxChild> {
        let span = self.peek().span;
        self.advance(); // {
        self.skip_newlines();

        if self.at(&TokenKind::If) {
            self.advance();
            let cond = self.parse_expr()?;
            let body = self.parse_jsx_body()?;
            let mut branches = vec![(cond, body)];
            let mut else_children = None;
            loop {
                self.skip_newlines();
                if self.at(&TokenKind::Elif) {
                    self.advance();
                    let cond = self.parse_expr()?;
                    let body = self.parse_jsx_body()?;
                    branches.push((cond, body));
                } else if self.at(&TokenKind::Else) {
                    self.advance();
                    else_children = Some(self.parse_jsx_body()?);
                    break;
                } else {
                    break;
                }
            }
            self.skip_newlines();
            self.expect(&TokenKind::RBrace, "after JSX conditional")?;
            return Ok(JsxChild::If {
                branches,
                else_children,
                span,
            });
        }

        if self.at(&TokenKind::For) {
            self.advance();
            let (binding, _) = self.expect_ident("after 'for' in JSX loop")?;
            self.expect(&TokenKind::In, "in JSX loop")?;
            let iter = self.parse_expr()?;
            let body = self.parse_jsx_body()?;
            self.skip_newlines();
            self.expect(&TokenKind::RBrace, "after JSX loop")?;
            return Ok(JsxChild::For {
                binding,
                iter,
                body,
                span,
            });
        }

        let expr = self.parse_expr()?;
        self.expect(&TokenKind::RBrace, "after JSX expression")?;
        Ok(JsxChild::Expr { expr, span })
    }

    // ── Byte-level text and closing-tag handling ────────────────────────

    fn at_raw_close(&self) -> bool {
        let bytes = self.source.as_bytes();
        let start = self.peek().span.start;
        bytes.get(start) == Some(&b'<') && bytes.get(start + 1) == Some(&b'/')
    }

    fn consume_raw_close(&mut self) -> PResult<(String, Span)> {
        let span = self.peek().span;
        let bytes = self.source.as_bytes();
        let mut i = span.start + 2;
        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
            i += 1;
        }
        let name = self.source[name_start..i].to_string();
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if bytes.get(i) != Some(&b'>') {
            return Err(self.err("Expected '>' in closing tag", span));
        }
        i += 1;
        self.resync(i, span);
        Ok((name, span))
    }

    /// Consumes raw text up to the next `<`, `{`, `}`, or newline and returns
    /// it whitespace-collapsed. Returns `None` for all-whitespace runs.
    fn consume_jsx_text(&mut self) -> Option<JsxChild> {
        let span = self.peek().span;
        let bytes = self.source.as_bytes();
        let mut i = span.start;
        while i < bytes.len() && !matches!(bytes[i], b'<' | b'{' | b'}' | b'\n') {
            i += 1;
        }
        let slice = &self.source[span.start..i];
        self.resync(i, span);
        let collapsed = slice.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(JsxChild::Text {
                value: collapsed,
                span,
            })
        }
    }

    /// Re-lexes the source from `byte` and splices the fresh tokens over the
    /// stale tail of the buffer. `from` anchors the line/column walk.
    pub(crate) fn resync(&mut self, byte: usize, from: Span) {
        let mut line = from.line;
        let mut col = from.column;
        for c in self.source[from.start..byte].chars() {
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        let mut fresh = Lexer::at(&self.source[byte..], byte, line, col).tokenize();
        self.tokens.truncate(self.pos);
        self.tokens.append(&mut fresh);
    }
}
