use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics stored before the front end stops.
pub const MAX_ERRORS: usize = 20;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lexical,
    Syntax,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => f.write_str("lexical"),
            Self::Syntax => f.write_str("syntax"),
        }
    }
}

/// Numeric diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E199) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const INVALID_NUMBER: Self = Self(102);
    pub const INVALID_ESCAPE: Self = Self(103);

    // ── Syntax errors (E200–E299) ──
    pub const UNEXPECTED_TOKEN: Self = Self(200);
    pub const UNQUALIFIED_CALL: Self = Self(201);
    pub const POSITIONAL_AFTER_NAMED: Self = Self(202);
    pub const NESTING_TOO_DEEP: Self = Self(203);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Lexical,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured front-end diagnostic.
///
/// Callers render these from the fields; `message` is for humans only.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{span}: {code} [{category}] {message}")]
pub struct TopoError {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, for context.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl TopoError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Errors collected by one front-end pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<TopoError>,
    /// Includes errors dropped past [`MAX_ERRORS`].
    pub total_errors: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// `true` once the stored error list is full.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the [`MAX_ERRORS`] limit.
    pub fn push_error(&mut self, error: TopoError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Append everything collected by another pass.
    pub fn extend(&mut self, other: CompileErrors) {
        let dropped = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += dropped;
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}: {error}", error.file)?;
        }
        if self.total_errors > self.errors.len() {
            writeln!(f, "... and {} more", self.total_errors - self.errors.len())?;
        }
        Ok(())
    }
}
