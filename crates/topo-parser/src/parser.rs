//! Core parser infrastructure: token cursor, error reporting, helpers.

use topo_lexer::token::{Token, TokenKind};
use topo_types::ast::{Ident, Program};
use topo_types::{CompileErrors, ErrorCode, SourceFile, Span, TopoError};

/// The topo parser.
///
/// Consumes a token stream produced by the lexer and builds a [`Program`].
/// After an error it skips to the next line and keeps going.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: CompileErrors,
    /// Open `(` count; newlines are insignificant while it is non-zero.
    pub(crate) paren_depth: u32,
    /// Current expression nesting depth (max [`MAX_EXPR_DEPTH`]).
    pub(crate) expr_depth: u32,
}

/// Deepest expression nesting accepted before the parser gives up.
pub const MAX_EXPR_DEPTH: u32 = 32;

/// Result of parsing.
pub struct ParseResult {
    /// `None` when any error was reported.
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            paren_depth: 0,
            expr_depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof; an empty stream
        // only happens for hand-built input.
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            span: Span {
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        };
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Newline Handling ──────────────────────────────────────────────────────

    pub(crate) fn skip_newlines(&mut self) {
        while self.check_exact(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Inside parentheses a statement may span several lines.
    pub(crate) fn skip_newlines_in_parens(&mut self) {
        if self.paren_depth > 0 {
            self.skip_newlines();
        }
    }

    /// Expect the end of a statement: a newline or end of file.
    pub(crate) fn expect_statement_end(&mut self) -> Option<()> {
        if self.at_end() || self.eat(&TokenKind::Newline) {
            return Some(());
        }
        self.error_at_current(
            ErrorCode::UNEXPECTED_TOKEN,
            format!("expected end of statement, got '{}'", self.peek_kind()),
        );
        None
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{other}'"),
                );
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.push_error(self.make_error(code, message, span));
    }

    pub(crate) fn make_error(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> TopoError {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        TopoError::new(&self.source_file.name, code, message, span, source_line)
    }

    pub(crate) fn push_error(&mut self, error: TopoError) {
        self.errors.push_error(error);
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip to the start of the next statement after an error.
    pub(crate) fn synchronize(&mut self) {
        self.paren_depth = 0;
        self.expr_depth = 0;
        while !self.at_end() {
            if self.eat(&TokenKind::Newline) {
                return;
            }
            self.advance();
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Program`].
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        let program = if self.errors.has_errors() {
            None
        } else {
            Some(program)
        };
        ParseResult {
            program,
            errors: self.errors,
        }
    }
}
