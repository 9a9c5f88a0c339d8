//! topo tree-walking evaluator.
//!
//! Runs a parsed program against a [`Registry`]: imports bring library
//! modules into scope, assignments bind values, and qualified calls either
//! construct objects in the [`ObjectGraph`] or invoke library functions.
//!
//! ```text
//! source → Lexer → Parser → Evaluator → Evaluation { bindings, graph, output }
//! ```

pub mod env;
pub mod error;
pub mod evaluator;

use std::collections::BTreeMap;

use topo_lexer::Lexer;
use topo_parser::Parser;
use topo_stdlib::{ObjectGraph, Registry, Value};
use topo_types::ast::Program;
use topo_types::{CompileErrors, SourceFile};

pub use env::Environment;
pub use error::{ErrorKind, EvalError, EvalResult};
pub use evaluator::{CallArg, Evaluator, STD_MODULE};

/// Everything a successful evaluation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Final variable bindings.
    pub bindings: BTreeMap<String, Value>,
    pub graph: ObjectGraph,
    /// Lines printed with `std::print`, in order.
    pub output: Vec<String>,
}

impl Evaluation {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Canonical text of a bound variable.
    pub fn render(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| self.graph.render(value))
    }
}

/// Evaluate a whole program. On error no partial state is returned.
pub fn evaluate(registry: &Registry, program: &Program) -> EvalResult<Evaluation> {
    let mut evaluator = Evaluator::new(registry);
    if let Err(err) = evaluator.eval_program(program) {
        tracing::warn!(kind = ?err.kind(), %err, "evaluation aborted");
        return Err(err);
    }
    tracing::debug!(
        objects = evaluator.graph.len(),
        lines = evaluator.output.len(),
        "evaluation finished"
    );
    Ok(Evaluation {
        bindings: evaluator.env.into_bindings(),
        graph: evaluator.graph,
        output: evaluator.output,
    })
}

/// Failure of [`run_source`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunError {
    /// Lexer or parser diagnostics.
    #[error("{0}")]
    Compile(CompileErrors),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Lex, parse, and evaluate `source`.
pub fn run_source(
    registry: &Registry,
    file_name: &str,
    source: &str,
) -> Result<Evaluation, RunError> {
    let source_file = SourceFile::new(file_name, source);

    let lex_result = Lexer::new(&source_file).lex();
    let mut errors = lex_result.errors;
    if errors.has_errors() {
        return Err(RunError::Compile(errors));
    }

    let parse_result = Parser::new(lex_result.tokens, &source_file).parse();
    errors.extend(parse_result.errors);
    match parse_result.program {
        Some(program) if !errors.has_errors() => Ok(evaluate(registry, &program)?),
        _ => Err(RunError::Compile(errors)),
    }
}
