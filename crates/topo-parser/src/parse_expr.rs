//! Expression parsing.
//!
//! ```text
//! expr    = primary { "." IDENT }
//! primary = STRING | INTEGER | IDENT | call | "(" expr ")"
//! call    = IDENT "::" IDENT "(" [ arg { "," arg } [ "," ] ] ")"
//! arg     = [ IDENT "=" ] expr
//! ```

use topo_lexer::token::TokenKind;
use topo_types::ast::*;
use topo_types::ErrorCode;

use crate::parser::{Parser, MAX_EXPR_DEPTH};

impl<'src> Parser<'src> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.expr_depth += 1;
        if self.expr_depth > MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("maximum expression nesting depth is {MAX_EXPR_DEPTH}"),
            );
            self.expr_depth -= 1;
            return None;
        }
        let result = self.parse_postfix();
        self.expr_depth -= 1;
        result
    }

    /// `primary { "." IDENT }`
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat(&TokenKind::Dot) {
            let field = self.expect_identifier()?;
            let span = expr.span.merge(field.span);
            expr = Expr::new(
                ExprKind::FieldAccess {
                    object: Box::new(expr),
                    field,
                },
                span,
            );
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                Some(Expr::new(ExprKind::StringLit(s), start))
            }
            TokenKind::IntLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::IntLit(n), start))
            }
            TokenKind::LParen => {
                self.advance();
                self.paren_depth += 1;
                self.skip_newlines();
                let inner = self.parse_expression();
                self.skip_newlines();
                let close = inner.as_ref().and_then(|_| self.expect(&TokenKind::RParen));
                self.paren_depth -= 1;
                let inner = inner?;
                close?;
                let span = start.merge(self.previous_span());
                Some(Expr::new(ExprKind::Paren(Box::new(inner)), span))
            }
            TokenKind::Identifier(name) => match self.look_ahead(1) {
                TokenKind::ColonColon => self.parse_call(),
                TokenKind::LParen => {
                    let error = self
                        .make_error(
                            ErrorCode::UNQUALIFIED_CALL,
                            format!("call to '{name}' must be qualified with its module"),
                            start,
                        )
                        .with_suggestion(format!("write module::{name}(...), e.g. std::print(...)"));
                    self.push_error(error);
                    None
                }
                _ => {
                    self.advance();
                    Some(Expr::new(ExprKind::Identifier(name), start))
                }
            },
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                None
            }
        }
    }

    /// `module::member(args...)` — construction or function call.
    fn parse_call(&mut self) -> Option<Expr> {
        let module = self.expect_identifier()?;
        self.expect(&TokenKind::ColonColon)?;
        let member = self.expect_identifier()?;
        let callee_span = module.span.merge(member.span);
        let callee = QualifiedIdent {
            module,
            member,
            span: callee_span,
        };

        self.expect(&TokenKind::LParen)?;
        self.paren_depth += 1;
        let args = self.parse_arg_list();
        let close = args.as_ref().and_then(|_| self.expect(&TokenKind::RParen));
        self.paren_depth -= 1;
        let args = args?;
        close?;

        let span = callee_span.merge(self.previous_span());
        Some(Expr::new(ExprKind::Call { callee, args }, span))
    }

    /// Comma-separated arguments up to (not including) the closing `)`.
    fn parse_arg_list(&mut self) -> Option<Vec<Arg>> {
        let mut args: Vec<Arg> = Vec::new();
        self.skip_newlines_in_parens();
        while !self.check_exact(&TokenKind::RParen) {
            let arg = self.parse_arg()?;
            if arg.name.is_none() && args.iter().any(|a| a.name.is_some()) {
                let error = self
                    .make_error(
                        ErrorCode::POSITIONAL_AFTER_NAMED,
                        "positional argument follows a named argument",
                        arg.span,
                    )
                    .with_suggestion("move positional arguments before named ones");
                self.push_error(error);
                return None;
            }
            args.push(arg);
            self.skip_newlines_in_parens();
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            self.skip_newlines_in_parens();
        }
        Some(args)
    }

    /// `[ IDENT "=" ] expr`
    fn parse_arg(&mut self) -> Option<Arg> {
        let start = self.current_span();
        let name = if matches!(self.peek_kind(), TokenKind::Identifier(_))
            && *self.look_ahead(1) == TokenKind::Eq
        {
            let name = self.expect_identifier()?;
            self.advance(); // eat `=`
            Some(name)
        } else {
            None
        };
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Some(Arg { name, value, span })
    }
}
