//! Core topo lexer — converts source text to a token stream.
//!
//! - `#` line comments are stripped
//! - newlines are emitted as tokens; the parser decides where they matter
//! - error recovery: bad characters are reported and skipped, so one pass
//!   collects up to [`topo_types::MAX_ERRORS`] diagnostics

use topo_types::{CompileErrors, ErrorCode, SourceFile, Span, TopoError};

use crate::token::{Token, TokenKind};

pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// 1-based.
    line: u32,
    /// 1-based.
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// Always ends with [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            if self.errors.is_full() {
                tokens.push(Token::new(TokenKind::Eof, self.current_span()));
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = TopoError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    fn emit_error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = TopoError::new(&self.source_file.name, code, message, span, source_line)
            .with_suggestion(suggestion);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn skip_blanks(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' => {
                    self.advance();
                }
                b'#' => {
                    while self.peek().is_some_and(|c| c != b'\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Token {
        loop {
            if self.errors.is_full() {
                return Token::new(TokenKind::Eof, self.current_span());
            }
            self.skip_blanks();
            let start_line = self.line;
            let start_col = self.col;
            let start = self.pos;

            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, self.current_span());
            };

            let kind = match ch {
                b'\n' => TokenKind::Newline,
                b'"' => self.scan_string(start_line, start_col),
                b'0'..=b'9' => self.scan_number(start, start_line, start_col),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start),
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b',' => TokenKind::Comma,
                b'=' => TokenKind::Eq,
                b'.' => TokenKind::Dot,
                b':' if self.peek() == Some(b':') => {
                    self.advance();
                    TokenKind::ColonColon
                }
                b':' => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        "unexpected character ':'",
                        span,
                        "qualified names use '::', as in appinfra::Site",
                    );
                    continue;
                }
                _ => {
                    // Skip the rest of a multi-byte character so the
                    // diagnostic names the whole character.
                    while self.peek().is_some_and(|b| b & 0xC0 == 0x80) {
                        self.advance();
                    }
                    let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("unexpected character '{text}'"),
                        span,
                    );
                    continue;
                }
            };
            return Token::new(kind, self.span_from(start_line, start_col));
        }
    }

    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> TokenKind {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        match text.parse::<u64>() {
            Ok(value) => TokenKind::IntLit(value),
            Err(_) => {
                let message = format!("integer literal '{text}' does not fit in 64 bits");
                let span = self.span_from(start_line, start_col);
                self.emit_error(ErrorCode::INVALID_NUMBER, message, span);
                TokenKind::IntLit(0)
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == b'_')
        {
            self.advance();
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    /// Scan a string literal; the opening `"` is already consumed.
    fn scan_string(&mut self, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                        "close the string with '\"' on the same line",
                    );
                    break;
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }
        // The source is valid UTF-8 and escapes only produce ASCII.
        TokenKind::StringLiteral(String::from_utf8_lossy(&buf).into_owned())
    }

    fn scan_escape_sequence(&mut self) -> Option<u8> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance(); // the '\'
        match self.peek() {
            Some(b'"') => self.advance().map(|_| b'"'),
            Some(b'\\') => self.advance().map(|_| b'\\'),
            Some(b'n') => self.advance().map(|_| b'\n'),
            Some(b't') => self.advance().map(|_| b'\t'),
            // Leave the newline for the unterminated-string check.
            None | Some(b'\n') => None,
            Some(ch) => {
                self.advance();
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("invalid escape sequence '\\{}'", ch as char),
                    span,
                );
                Some(ch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> LexResult {
        let sf = SourceFile::new("unit.topo", source);
        Lexer::new(&sf).lex()
    }

    #[test]
    fn test_spans_are_one_based() {
        let result = lex("a = 1");
        assert_eq!(result.tokens[0].span, Span::new(1, 1, 1, 1));
        assert_eq!(result.tokens[1].span, Span::new(1, 3, 1, 3));
        assert_eq!(result.tokens[2].span, Span::new(1, 5, 1, 5));
    }

    #[test]
    fn test_qualified_name_span() {
        let result = lex("appinfra::Site");
        assert_eq!(result.tokens[0].span, Span::new(1, 1, 1, 8));
        assert_eq!(result.tokens[1].span, Span::new(1, 9, 1, 10));
        assert_eq!(result.tokens[2].span, Span::new(1, 11, 1, 14));
    }

    #[test]
    fn test_error_carries_source_line() {
        let result = lex("x = 1\ny = $\n");
        let err = &result.errors.errors[0];
        assert_eq!(err.source_line, "y = $");
        assert_eq!(err.span.start_line, 2);
        assert_eq!(err.span.start_col, 5);
    }

    #[test]
    fn test_escape_at_end_of_line_is_unterminated() {
        let result = lex("\"abc\\\n");
        assert_eq!(result.errors.total_errors, 1);
        assert_eq!(result.errors.errors[0].code, ErrorCode::UNTERMINATED_STRING);
    }
}
