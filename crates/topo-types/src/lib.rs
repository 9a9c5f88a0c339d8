//! Shared types for the topo language.
//!
//! This crate defines the AST node types, source spans, and the structured
//! diagnostics shared by the lexer, the parser, and the evaluator.

mod error;
mod span;
pub mod ast;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, TopoError, MAX_ERRORS};
pub use span::{SourceFile, Span};
