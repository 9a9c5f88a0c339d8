//! Core expression and statement evaluator.

use std::collections::BTreeSet;

use topo_stdlib::{
    calc_site_network, AppService, Entity, FieldType, FunctionId, Object, ObjectGraph, ObjectId,
    QualifiedName, Registry, Site, TypeId, Value,
};
use topo_types::ast::*;

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};

/// Module that is in scope without an `import`.
pub const STD_MODULE: &str = "std";

/// An evaluated call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArg {
    pub name: Option<String>,
    pub value: Value,
}

impl CallArg {
    pub fn positional(value: Value) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// How arguments are matched to parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgMode {
    /// Named only; failures are reported per argument.
    Constructor,
    /// Positional then named; every failure is an arity error.
    Function,
}

/// The evaluator: walks statements in order and populates one object graph.
pub struct Evaluator<'r> {
    registry: &'r Registry,
    /// Program variables.
    pub env: Environment,
    /// Every object constructed so far.
    pub graph: ObjectGraph,
    /// Captured output from `std::print`.
    pub output: Vec<String>,
    imports: BTreeSet<String>,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            env: Environment::new(),
            graph: ObjectGraph::new(),
            output: Vec::new(),
            imports: BTreeSet::new(),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate every statement, top to bottom, stopping at the first error.
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<()> {
        for stmt in &program.stmts {
            self.eval_stmt(stmt)?;
        }
        Ok(())
    }

    pub fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        tracing::trace!(span = %stmt.span(), "statement");
        match stmt {
            Stmt::Import(import) => self.import(&import.module.name),
            Stmt::Assign(assign) => {
                let value = self.eval_expr(&assign.value)?;
                self.bind(&assign.target.name, value);
                Ok(())
            }
            Stmt::Expr(stmt) => self.eval_expr(&stmt.expr).map(drop),
        }
    }

    /// Bring a registered module into scope.
    pub fn import(&mut self, module: &str) -> EvalResult<()> {
        if !self.registry.has_module(module) {
            return Err(EvalError::UnknownName(module.to_string()));
        }
        tracing::debug!(module, "import");
        self.imports.insert(module.to_string());
        Ok(())
    }

    /// Introduce or overwrite a variable.
    pub fn bind(&mut self, name: &str, value: Value) {
        tracing::debug!(name, value = value.type_name(), "bind");
        self.env.define(name, value);
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
            ExprKind::IntLit(n) => Ok(Value::Int(*n)),
            ExprKind::Identifier(name) => self.eval_identifier(name),
            ExprKind::Call { callee, args } => self.eval_call(callee, args),
            ExprKind::FieldAccess { object, field } => self.eval_field_access(object, &field.name),
            ExprKind::Paren(inner) => self.eval_expr(inner),
        }
    }

    fn eval_identifier(&self, name: &str) -> EvalResult<Value> {
        self.env
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))
    }

    /// `module::member(args)`: a construction or a function call.
    fn eval_call(&mut self, callee: &QualifiedIdent, args: &[Arg]) -> EvalResult<Value> {
        let name = QualifiedName::new(callee.module.name.as_str(), callee.member.name.as_str());
        let entity = self.registry.resolve(&name)?;
        self.check_imported(&name)?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(CallArg {
                name: arg.name.as_ref().map(|n| n.name.clone()),
                value: self.eval_expr(&arg.value)?,
            });
        }

        match entity {
            Entity::Type(ty) => self.construct(ty, values).map(Value::Object),
            Entity::Function(function) => self.call(function, values),
        }
    }

    fn check_imported(&self, name: &QualifiedName) -> EvalResult<()> {
        if name.module == STD_MODULE || self.imports.contains(&name.module) {
            Ok(())
        } else {
            Err(EvalError::ModuleNotImported {
                module: name.module.clone(),
                name: name.clone(),
            })
        }
    }

    fn eval_field_access(&mut self, object: &Expr, field: &str) -> EvalResult<Value> {
        let value = self.eval_expr(object)?;
        let object = match &value {
            Value::Object(id) => self.graph.get(*id),
            _ => None,
        };
        let Some(object) = object else {
            return Err(EvalError::NotAnObject {
                field: field.to_string(),
                found: self.describe(&value),
            });
        };
        object.field(field).ok_or_else(|| EvalError::UnknownField {
            ty: object.type_id().qualified_name(),
            field: field.to_string(),
        })
    }

    // ══════════════════════════════════════════════════════════════════════
    // Construction
    // ══════════════════════════════════════════════════════════════════════

    /// Build an object of type `ty` from named arguments and add it to the graph.
    pub fn construct(&mut self, ty: TypeId, args: Vec<CallArg>) -> EvalResult<ObjectId> {
        let registry = self.registry;
        let def = registry
            .type_def(ty)
            .ok_or_else(|| EvalError::UnknownName(ty.qualified_name().to_string()))?;
        let params: Vec<(&str, FieldType)> =
            def.fields.iter().map(|f| (f.name.as_str(), f.ty)).collect();
        let values = self.bind_arguments(&def.name, &params, args, ArgMode::Constructor)?;

        let object = match (ty, values.as_slice()) {
            (TypeId::AppService, [Value::Address(network_address)]) => {
                Object::AppService(AppService {
                    network_address: *network_address,
                })
            }
            (TypeId::Site, [Value::String(name), Value::Object(app_service), Value::Int(site_index)]) => {
                if name.is_empty() {
                    return Err(EvalError::TypeMismatch {
                        name: def.name.clone(),
                        argument: "name".to_string(),
                        expected: "non-empty string".to_string(),
                        found: "empty string".to_string(),
                    });
                }
                Object::Site(Site {
                    name: name.clone(),
                    app_service: *app_service,
                    site_index: *site_index,
                })
            }
            _ => return Err(schema_mismatch(&def.name)),
        };

        let id = self.graph.insert(object);
        tracing::debug!(ty = %def.name, id = %id, "construct");
        Ok(id)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Function calls
    // ══════════════════════════════════════════════════════════════════════

    /// Invoke a library function.
    pub fn call(&mut self, function: FunctionId, args: Vec<CallArg>) -> EvalResult<Value> {
        let registry = self.registry;
        let sig = registry
            .signature(function)
            .ok_or_else(|| EvalError::UnknownName(function.qualified_name().to_string()))?;
        let params: Vec<(&str, FieldType)> =
            sig.params.iter().map(|(n, t)| (n.as_str(), *t)).collect();
        let values = self.bind_arguments(&sig.name, &params, args, ArgMode::Function)?;
        tracing::debug!(function = %sig.name, "call");

        match (function, values.as_slice()) {
            // std::print appends to the captured output
            (FunctionId::Print, [value]) => {
                let line = self.graph.render(value);
                self.output.push(line);
                Ok(Value::Nil)
            }
            (FunctionId::CalcSiteNetwork, [Value::Object(id)]) => {
                let site = self.graph.site(*id).ok_or_else(|| schema_mismatch(&sig.name))?;
                let network = calc_site_network(&self.graph, site, registry.site_prefix_length())?;
                Ok(Value::Address(network))
            }
            _ => Err(schema_mismatch(&sig.name)),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Argument binding
    // ══════════════════════════════════════════════════════════════════════

    /// Match arguments to `params`, returning one checked value per parameter
    /// in declaration order.
    fn bind_arguments(
        &self,
        owner: &QualifiedName,
        params: &[(&str, FieldType)],
        args: Vec<CallArg>,
        mode: ArgMode,
    ) -> EvalResult<Vec<Value>> {
        let arity = |message: String| EvalError::Arity {
            name: owner.clone(),
            message,
        };
        let mut slots: Vec<Option<Value>> = vec![None; params.len()];
        let mut seen_named = false;

        for (position, arg) in args.into_iter().enumerate() {
            let index = match &arg.name {
                None if mode == ArgMode::Constructor => {
                    return Err(arity("constructors take named arguments only".to_string()));
                }
                None if seen_named => {
                    return Err(arity("positional argument follows a named argument".to_string()));
                }
                None if position >= params.len() => {
                    return Err(arity(format!(
                        "expected at most {} argument(s), got more",
                        params.len()
                    )));
                }
                None => position,
                Some(name) => {
                    seen_named = true;
                    match params.iter().position(|(p, _)| *p == name.as_str()) {
                        Some(index) => index,
                        None if mode == ArgMode::Constructor => {
                            return Err(EvalError::UnknownArgument {
                                ty: owner.clone(),
                                argument: name.clone(),
                            });
                        }
                        None => return Err(arity(format!("unknown parameter '{name}'"))),
                    }
                }
            };

            let (param, ty) = params[index];
            if slots[index].is_some() {
                return Err(match mode {
                    ArgMode::Constructor => EvalError::DuplicateArgument {
                        ty: owner.clone(),
                        argument: param.to_string(),
                    },
                    ArgMode::Function => arity(format!("parameter '{param}' given more than once")),
                });
            }
            slots[index] = Some(self.check_value(owner, param, ty, arg.value)?);
        }

        slots
            .into_iter()
            .zip(params)
            .map(|(slot, (param, _))| {
                slot.ok_or_else(|| match mode {
                    ArgMode::Constructor => EvalError::MissingArgument {
                        ty: owner.clone(),
                        argument: param.to_string(),
                    },
                    ArgMode::Function => arity(format!("missing argument '{param}'")),
                })
            })
            .collect()
    }

    /// Check `value` against its declared type. Strings given for an address
    /// are parsed.
    fn check_value(
        &self,
        owner: &QualifiedName,
        argument: &str,
        expected: FieldType,
        value: Value,
    ) -> EvalResult<Value> {
        match (expected, value) {
            (FieldType::Address, Value::String(text)) => Ok(Value::Address(text.parse()?)),
            (FieldType::Address, value @ Value::Address(_))
            | (FieldType::String, value @ Value::String(_))
            | (FieldType::Integer, value @ Value::Int(_))
            | (FieldType::Nil, value @ Value::Nil)
            | (FieldType::Any, value) => Ok(value),
            (FieldType::Object(ty), Value::Object(id))
                if self.graph.get(id).map(Object::type_id) == Some(ty) =>
            {
                Ok(Value::Object(id))
            }
            (expected, value) => Err(EvalError::TypeMismatch {
                name: owner.clone(),
                argument: argument.to_string(),
                expected: expected.to_string(),
                found: self.describe(&value),
            }),
        }
    }

    /// Type of a value as shown in diagnostics.
    fn describe(&self, value: &Value) -> String {
        match value {
            Value::Object(id) => match self.graph.get(*id) {
                Some(object) => object.type_id().qualified_name().to_string(),
                None => "object".to_string(),
            },
            other => other.type_name().to_string(),
        }
    }
}

fn schema_mismatch(name: &QualifiedName) -> EvalError {
    EvalError::Arity {
        name: name.clone(),
        message: "arguments do not match the declared schema".to_string(),
    }
}
