//! topo parser: converts a token stream into an AST.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser, MAX_EXPR_DEPTH};
