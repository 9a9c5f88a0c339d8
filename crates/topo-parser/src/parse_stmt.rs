//! Program and statement parsing.

use crate::parser::Parser;
use topo_lexer::token::TokenKind;
use topo_types::ast::*;

impl<'src> Parser<'src> {
    /// `program = { statement NEWLINE }`
    pub(crate) fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
            self.skip_newlines();
        }
        let span = start.merge(self.previous_span());
        Program { stmts, span }
    }

    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Import => self.parse_import(),
            TokenKind::Identifier(_) if *self.look_ahead(1) == TokenKind::Eq => self.parse_assign(),
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                self.expect_statement_end()?;
                Some(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    /// `import module`
    fn parse_import(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `import`
        let module = self.expect_identifier()?;
        let span = start.merge(module.span);
        self.expect_statement_end()?;
        Some(Stmt::Import(ImportStmt { module, span }))
    }

    /// `name = expr`
    fn parse_assign(&mut self) -> Option<Stmt> {
        let target = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = target.span.merge(value.span);
        self.expect_statement_end()?;
        Some(Stmt::Assign(AssignStmt {
            target,
            value,
            span,
        }))
    }
}
