//! Runtime error types for the topo evaluator.

use topo_stdlib::{AddressError, QualifiedName, SiteNetworkError, TypeId, UnknownName};

/// Evaluation error. Any error aborts the whole program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// A network literal is not `A.B.C.D/P`.
    #[error("invalid network address '{0}'")]
    Format(String),
    /// A network literal has host bits set.
    #[error("network address '{0}' has host bits set")]
    MisalignedNetwork(String),
    /// A requested subnet does not fit its parent.
    #[error("subnet out of range: {0}")]
    OutOfRange(String),
    /// A qualified name or imported module that is not registered.
    #[error("unknown name '{0}'")]
    UnknownName(String),
    /// A registered module used without `import`.
    #[error("module '{module}' used by '{name}' is not imported")]
    ModuleNotImported { module: String, name: QualifiedName },
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    #[error("{ty}: missing argument '{argument}'")]
    MissingArgument { ty: QualifiedName, argument: String },
    #[error("{ty}: unknown argument '{argument}'")]
    UnknownArgument { ty: QualifiedName, argument: String },
    #[error("{ty}: argument '{argument}' given more than once")]
    DuplicateArgument { ty: QualifiedName, argument: String },
    #[error("{name}: '{argument}' expects {expected}, got {found}")]
    TypeMismatch {
        name: QualifiedName,
        argument: String,
        expected: String,
        found: String,
    },
    /// Field access on a value that is not an object.
    #[error("cannot read field '{field}' of {found}")]
    NotAnObject { field: String, found: String },
    #[error("{ty} has no field '{field}'")]
    UnknownField { ty: QualifiedName, field: String },
    #[error("{name}: {message}")]
    Arity { name: QualifiedName, message: String },
}

/// Fieldless discriminant of [`EvalError`], for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    MisalignedNetwork,
    OutOfRange,
    UnknownName,
    ModuleNotImported,
    UndefinedVariable,
    MissingArgument,
    UnknownArgument,
    DuplicateArgument,
    TypeMismatch,
    UnknownField,
    Arity,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format(_) => ErrorKind::Format,
            Self::MisalignedNetwork(_) => ErrorKind::MisalignedNetwork,
            Self::OutOfRange(_) => ErrorKind::OutOfRange,
            Self::UnknownName(_) => ErrorKind::UnknownName,
            Self::ModuleNotImported { .. } => ErrorKind::ModuleNotImported,
            Self::UndefinedVariable(_) => ErrorKind::UndefinedVariable,
            Self::MissingArgument { .. } => ErrorKind::MissingArgument,
            Self::UnknownArgument { .. } => ErrorKind::UnknownArgument,
            Self::DuplicateArgument { .. } => ErrorKind::DuplicateArgument,
            Self::TypeMismatch { .. } | Self::NotAnObject { .. } => ErrorKind::TypeMismatch,
            Self::UnknownField { .. } => ErrorKind::UnknownField,
            Self::Arity { .. } => ErrorKind::Arity,
        }
    }
}

impl From<AddressError> for EvalError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::Format(text) => Self::Format(text),
            AddressError::Misaligned(text) => Self::MisalignedNetwork(text),
            AddressError::OutOfRange(detail) => Self::OutOfRange(detail),
        }
    }
}

impl From<UnknownName> for EvalError {
    fn from(err: UnknownName) -> Self {
        Self::UnknownName(err.0.to_string())
    }
}

impl From<SiteNetworkError> for EvalError {
    fn from(err: SiteNetworkError) -> Self {
        match err {
            SiteNetworkError::NotAnAppService { handle, .. } => Self::TypeMismatch {
                name: TypeId::Site.qualified_name(),
                argument: "app_service".to_string(),
                expected: TypeId::AppService.qualified_name().to_string(),
                found: format!("object {handle}"),
            },
            SiteNetworkError::Address(err) => err.into(),
        }
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
