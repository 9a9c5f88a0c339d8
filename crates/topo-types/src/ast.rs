//! AST node types for the topo language.
//!
//! Every node carries a [`Span`] for diagnostics. The tree preserves source
//! order; the evaluator relies on it for top-to-bottom execution.

use crate::Span;
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete topo program: statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `module::member` as written in source.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedIdent {
    pub module: Ident,
    pub member: Ident,
    pub span: Span,
}

impl fmt::Display for QualifiedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module.name, self.member.name)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `import appinfra`
    Import(ImportStmt),
    /// `name = expr`
    Assign(AssignStmt),
    /// A bare expression; its value is discarded.
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Import(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub module: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node. Uses `Box` for recursive variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `"172.17.0.0/18"`
    StringLit(String),
    /// `0`, `42`
    IntLit(u64),
    /// `site1`
    Identifier(String),
    /// `appinfra::Site(name="demo", ...)` or `std::print(x)`.
    ///
    /// Whether this constructs an object or calls a function is decided by
    /// name resolution, not by the parser.
    Call {
        callee: QualifiedIdent,
        args: Vec<Arg>,
    },
    /// `expr.field`
    FieldAccess {
        object: Box<Expr>,
        field: Ident,
    },
    /// `(expr)`
    Paren(Box<Expr>),
}

/// One call argument, optionally named: `site_index=0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<Ident>,
    pub value: Expr,
    pub span: Span,
}
