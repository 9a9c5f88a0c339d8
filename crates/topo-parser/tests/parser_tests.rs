//! Parser tests: statements, calls with named and positional arguments,
//! field access, multi-line argument lists, error recovery, and determinism.

use topo_lexer::Lexer;
use topo_parser::{ParseResult, Parser, MAX_EXPR_DEPTH};
use topo_types::ast::*;
use topo_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.topo", source);
    let lex = Lexer::new(&sf).lex();
    assert!(!lex.errors.has_errors(), "lexer errors in test source");
    Parser::new(lex.tokens, &sf).parse()
}

/// Parse source and return the program, panicking if there are errors.
fn parse_ok(source: &str) -> Program {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({})", e.message, e.code);
        }
        panic!("unexpected parse errors (see above)");
    }
    result.program.expect("no program returned")
}

fn first_error_code(source: &str) -> ErrorCode {
    parse(source).errors.errors[0].code
}

/// The single expression statement of a one-line program.
fn expr_of(source: &str) -> Expr {
    let prog = parse_ok(source);
    match prog.stmts.into_iter().next() {
        Some(Stmt::Expr(stmt)) => stmt.expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn call_parts(expr: &Expr) -> (String, &[Arg]) {
    match &expr.kind {
        ExprKind::Call { callee, args } => (callee.to_string(), args),
        other => panic!("expected call, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_program() {
    let prog = parse_ok("\n\n# only a comment\n");
    assert!(prog.stmts.is_empty());
}

#[test]
fn test_import() {
    let prog = parse_ok("import appinfra\n");
    match &prog.stmts[0] {
        Stmt::Import(import) => assert_eq!(import.module.name, "appinfra"),
        other => panic!("expected import, got {other:?}"),
    }
}

#[test]
fn test_assignment_of_construction() {
    let prog = parse_ok(r#"a = appinfra::AppService(network_address="172.17.0.0/18")"#);
    let Stmt::Assign(assign) = &prog.stmts[0] else {
        panic!("expected assignment");
    };
    assert_eq!(assign.target.name, "a");
    let (callee, args) = call_parts(&assign.value);
    assert_eq!(callee, "appinfra::AppService");
    assert_eq!(args.len(), 1);
    assert_eq!(args[0].name.as_ref().map(|n| n.name.as_str()), Some("network_address"));
    assert_eq!(args[0].value.kind, ExprKind::StringLit("172.17.0.0/18".into()));
}

#[test]
fn test_full_program_statement_order() {
    let prog = parse_ok(
        r#"
import appinfra
a = appinfra::AppService(network_address="172.17.0.0/18")
site1 = appinfra::Site(name="demo", app_service=a, site_index=0)
site2 = appinfra::Site(name="aws", app_service=a, site_index=1)

std::print(appinfra::calc_site_network(site1))
std::print(appinfra::calc_site_network(site2))
"#,
    );
    let shapes: Vec<&str> = prog
        .stmts
        .iter()
        .map(|s| match s {
            Stmt::Import(_) => "import",
            Stmt::Assign(_) => "assign",
            Stmt::Expr(_) => "expr",
        })
        .collect();
    assert_eq!(
        shapes,
        ["import", "assign", "assign", "assign", "expr", "expr"]
    );
}

#[test]
fn test_statement_spans() {
    let prog = parse_ok("x = 1\n  y = x\n");
    assert_eq!(prog.stmts[0].span().start_line, 1);
    assert_eq!(prog.stmts[1].span().start_line, 2);
    assert_eq!(prog.stmts[1].span().start_col, 3);
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_named_argument_values() {
    let expr = expr_of(r#"appinfra::Site(name="demo", app_service=a, site_index=0)"#);
    let (_, args) = call_parts(&expr);
    let names: Vec<&str> = args
        .iter()
        .map(|a| a.name.as_ref().map_or("", |n| n.name.as_str()))
        .collect();
    assert_eq!(names, ["name", "app_service", "site_index"]);
    assert_eq!(args[1].value.kind, ExprKind::Identifier("a".into()));
    assert_eq!(args[2].value.kind, ExprKind::IntLit(0));
}

#[test]
fn test_nested_positional_call() {
    let expr = expr_of("std::print(appinfra::calc_site_network(site1))");
    let (callee, args) = call_parts(&expr);
    assert_eq!(callee, "std::print");
    assert!(args[0].name.is_none());
    let (inner, inner_args) = call_parts(&args[0].value);
    assert_eq!(inner, "appinfra::calc_site_network");
    assert_eq!(inner_args[0].value.kind, ExprKind::Identifier("site1".into()));
}

#[test]
fn test_positional_then_named() {
    let expr = expr_of("m::f(1, x=2)");
    let (_, args) = call_parts(&expr);
    assert!(args[0].name.is_none());
    assert!(args[1].name.is_some());
}

#[test]
fn test_empty_argument_list() {
    let expr = expr_of("m::f()");
    assert!(call_parts(&expr).1.is_empty());
}

#[test]
fn test_trailing_comma() {
    let expr = expr_of("m::f(a=1, b=2,)");
    assert_eq!(call_parts(&expr).1.len(), 2);
}

#[test]
fn test_multiline_arguments() {
    let prog = parse_ok(
        r#"site = appinfra::Site(
    name="demo",
    app_service=a,

    site_index=0
)
std::print(site)
"#,
    );
    assert_eq!(prog.stmts.len(), 2);
}

#[test]
fn test_field_access_chain() {
    let expr = expr_of("site.app_service.network_address");
    let ExprKind::FieldAccess { object, field } = &expr.kind else {
        panic!("expected field access");
    };
    assert_eq!(field.name, "network_address");
    let ExprKind::FieldAccess { object, field } = &object.kind else {
        panic!("expected inner field access");
    };
    assert_eq!(field.name, "app_service");
    assert_eq!(object.kind, ExprKind::Identifier("site".into()));
}

#[test]
fn test_field_access_on_call_result() {
    let expr = expr_of("appinfra::AppService(network_address=\"10.0.0.0/8\").network_address");
    assert!(matches!(expr.kind, ExprKind::FieldAccess { .. }));
}

#[test]
fn test_parenthesised_expression() {
    let expr = expr_of("(\n  a\n)");
    let ExprKind::Paren(inner) = &expr.kind else {
        panic!("expected paren");
    };
    assert_eq!(inner.kind, ExprKind::Identifier("a".into()));
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unqualified_call_is_rejected() {
    let result = parse("print(x)");
    let err = &result.errors.errors[0];
    assert_eq!(err.code, ErrorCode::UNQUALIFIED_CALL);
    assert!(err.suggestion.is_some());
    assert!(result.program.is_none());
}

#[test]
fn test_positional_after_named_is_rejected() {
    assert_eq!(
        first_error_code("m::f(x=1, 2)"),
        ErrorCode::POSITIONAL_AFTER_NAMED
    );
}

#[test]
fn test_qualified_name_requires_arguments() {
    assert_eq!(first_error_code("x = appinfra::Site\n"), ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn test_missing_close_paren() {
    assert_eq!(first_error_code("m::f(a=1\n"), ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn test_two_statements_on_one_line() {
    assert_eq!(first_error_code("a = 1 b = 2"), ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn test_import_requires_module_name() {
    assert_eq!(first_error_code("import\n"), ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn test_nesting_limit() {
    let depth = MAX_EXPR_DEPTH as usize + 1;
    let source = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(first_error_code(&source), ErrorCode::NESTING_TOO_DEEP);
}

#[test]
fn test_recovery_reports_errors_on_several_lines() {
    let result = parse("a = \nb = 1\nc = )\nd = 2\n");
    assert_eq!(result.errors.total_errors, 2);
    let lines: Vec<u32> = result.errors.errors.iter().map(|e| e.span.start_line).collect();
    assert_eq!(lines, [1, 3]);
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parser_determinism_100_iterations() {
    let source = "import appinfra\na = appinfra::AppService(network_address=\"172.17.0.0/18\")\nstd::print(a.network_address)\n";
    let first = parse_ok(source);
    for i in 0..100 {
        assert_eq!(parse_ok(source), first, "determinism failure at iteration {i}");
    }
}
