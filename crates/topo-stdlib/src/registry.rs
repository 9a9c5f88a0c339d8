//! Namespace registry.
//!
//! Maps `module::member` names to the library's types and functions, and
//! records their declared field lists and signatures. A registry is built
//! once, then shared read-only by any number of evaluations.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::appinfra::SITE_PREFIX_LENGTH;

// ══════════════════════════════════════════════════════════════════════════════
// Names and entities
// ══════════════════════════════════════════════════════════════════════════════

/// A `module::member` name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub module: String,
    pub member: String,
}

impl QualifiedName {
    pub fn new(module: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            member: member.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.member)
    }
}

impl FromStr for QualifiedName {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("::") {
            Some((module, member))
                if !module.is_empty() && !member.is_empty() && !member.contains("::") =>
            {
                Ok(Self::new(module, member))
            }
            _ => Err(RegistryError::InvalidName(s.to_string())),
        }
    }
}

/// Library types that can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    AppService,
    Site,
}

impl TypeId {
    pub fn qualified_name(self) -> QualifiedName {
        match self {
            Self::AppService => QualifiedName::new("appinfra", "AppService"),
            Self::Site => QualifiedName::new("appinfra", "Site"),
        }
    }
}

/// Library functions that can be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionId {
    CalcSiteNetwork,
    Print,
}

impl FunctionId {
    pub fn qualified_name(self) -> QualifiedName {
        match self {
            Self::CalcSiteNetwork => QualifiedName::new("appinfra", "calc_site_network"),
            Self::Print => QualifiedName::new("std", "print"),
        }
    }
}

/// What a qualified name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Type(TypeId),
    Function(FunctionId),
}

// ══════════════════════════════════════════════════════════════════════════════
// Schemas
// ══════════════════════════════════════════════════════════════════════════════

/// Declared type of a field, parameter, or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Address,
    Object(TypeId),
    Any,
    Nil,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Address => f.write_str("address"),
            Self::Object(ty) => write!(f, "{}", ty.qualified_name()),
            Self::Any => f.write_str("any"),
            Self::Nil => f.write_str("nil"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

/// Ordered field list of a constructible type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: QualifiedName,
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A function signature entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnSig {
    pub name: QualifiedName,
    pub params: Vec<(String, FieldType)>,
    pub ret: FieldType,
}

// ══════════════════════════════════════════════════════════════════════════════
// Configuration and errors
// ══════════════════════════════════════════════════════════════════════════════

/// Settings baked into a registry at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StdlibConfig {
    /// Prefix length of the block handed to each site.
    pub site_prefix_length: u8,
}

impl Default for StdlibConfig {
    fn default() -> Self {
        Self {
            site_prefix_length: SITE_PREFIX_LENGTH,
        }
    }
}

impl StdlibConfig {
    /// Load settings from a JSON object; absent keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(json).map_err(|e| RegistryError::Config(e.to_string()))
    }
}

/// A qualified name that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name '{0}'")]
pub struct UnknownName(pub QualifiedName);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("'{0}' is already registered")]
    DuplicateName(QualifiedName),
    #[error("'{0}' is not a qualified name")]
    InvalidName(String),
    #[error("site prefix length must be at most 32, got {0}")]
    InvalidSitePrefix(u8),
    #[error("invalid configuration: {0}")]
    Config(String),
}

// ══════════════════════════════════════════════════════════════════════════════
// Registry
// ══════════════════════════════════════════════════════════════════════════════

/// Registry mapping `(module, member)` to a library entity.
#[derive(Debug)]
pub struct Registry {
    modules: HashMap<String, HashMap<String, Entity>>,
    types: HashMap<TypeId, TypeDef>,
    functions: HashMap<FunctionId, FnSig>,
    config: StdlibConfig,
}

static STANDARD: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// Build a registry holding the `appinfra` and `std` modules.
    pub fn new(config: StdlibConfig) -> Result<Self, RegistryError> {
        if config.site_prefix_length > 32 {
            return Err(RegistryError::InvalidSitePrefix(config.site_prefix_length));
        }
        Ok(Self::build(config))
    }

    /// The shared registry with default settings.
    pub fn standard() -> &'static Registry {
        STANDARD.get_or_init(|| Self::build(StdlibConfig::default()))
    }

    fn build(config: StdlibConfig) -> Self {
        tracing::debug!(site_prefix_length = config.site_prefix_length, "building registry");
        let mut reg = Self {
            modules: HashMap::new(),
            types: HashMap::new(),
            functions: HashMap::new(),
            config,
        };
        reg.register_appinfra();
        reg.register_std();
        reg
    }

    pub fn site_prefix_length(&self) -> u8 {
        self.config.site_prefix_length
    }

    /// Bind `name` to `entity`. A name can be bound only once.
    pub fn register(&mut self, name: QualifiedName, entity: Entity) -> Result<(), RegistryError> {
        let members = self.modules.entry(name.module.clone()).or_default();
        if members.contains_key(&name.member) {
            return Err(RegistryError::DuplicateName(name));
        }
        members.insert(name.member, entity);
        Ok(())
    }

    /// Exact lookup of a qualified name.
    pub fn resolve(&self, name: &QualifiedName) -> Result<Entity, UnknownName> {
        self.modules
            .get(&name.module)
            .and_then(|members| members.get(&name.member))
            .copied()
            .ok_or_else(|| UnknownName(name.clone()))
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    pub fn type_def(&self, ty: TypeId) -> Option<&TypeDef> {
        self.types.get(&ty)
    }

    pub fn signature(&self, function: FunctionId) -> Option<&FnSig> {
        self.functions.get(&function)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<QualifiedName> {
        let mut names: Vec<QualifiedName> = self
            .modules
            .iter()
            .flat_map(|(module, members)| {
                members
                    .keys()
                    .map(move |member| QualifiedName::new(module.as_str(), member.as_str()))
            })
            .collect();
        names.sort();
        names
    }

    // ──────────────────────────────────────────────────────────────────────
    // Registration helpers
    // ──────────────────────────────────────────────────────────────────────

    fn add_type(&mut self, id: TypeId, fields: &[(&str, FieldType)]) {
        let name = id.qualified_name();
        self.modules
            .entry(name.module.clone())
            .or_default()
            .insert(name.member.clone(), Entity::Type(id));
        let fields = fields
            .iter()
            .map(|(n, ty)| FieldDef {
                name: n.to_string(),
                ty: *ty,
            })
            .collect();
        self.types.insert(id, TypeDef { name, fields });
    }

    fn add_fn(&mut self, id: FunctionId, params: &[(&str, FieldType)], ret: FieldType) {
        let name = id.qualified_name();
        self.modules
            .entry(name.module.clone())
            .or_default()
            .insert(name.member.clone(), Entity::Function(id));
        let sig = FnSig {
            name,
            params: params.iter().map(|(n, t)| (n.to_string(), *t)).collect(),
            ret,
        };
        self.functions.insert(id, sig);
    }

    fn register_appinfra(&mut self) {
        use FieldType::*;
        self.add_type(TypeId::AppService, &[("network_address", Address)]);
        self.add_type(
            TypeId::Site,
            &[
                ("name", String),
                ("app_service", Object(TypeId::AppService)),
                ("site_index", Integer),
            ],
        );
        self.add_fn(
            FunctionId::CalcSiteNetwork,
            &[("site", Object(TypeId::Site))],
            Address,
        );
    }

    fn register_std(&mut self) {
        self.add_fn(FunctionId::Print, &[("value", FieldType::Any)], FieldType::Nil);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_standard_names() {
        let reg = Registry::standard();
        assert_eq!(
            reg.resolve(&qn("appinfra::AppService")),
            Ok(Entity::Type(TypeId::AppService))
        );
        assert_eq!(reg.resolve(&qn("appinfra::Site")), Ok(Entity::Type(TypeId::Site)));
        assert_eq!(
            reg.resolve(&qn("appinfra::calc_site_network")),
            Ok(Entity::Function(FunctionId::CalcSiteNetwork))
        );
        assert_eq!(reg.resolve(&qn("std::print")), Ok(Entity::Function(FunctionId::Print)));
    }

    #[test]
    fn test_resolve_is_exact() {
        let reg = Registry::standard();
        for name in ["appinfra::site", "Appinfra::Site", "other::Unknown", "std::Print"] {
            assert_eq!(reg.resolve(&qn(name)), Err(UnknownName(qn(name))));
        }
        assert_eq!(
            reg.resolve(&qn("other::Unknown")).unwrap_err().to_string(),
            "unknown name 'other::Unknown'"
        );
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut reg = Registry::new(StdlibConfig::default()).unwrap();
        let err = reg
            .register(qn("appinfra::Site"), Entity::Type(TypeId::Site))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName(qn("appinfra::Site")));

        reg.register(qn("net::Site"), Entity::Type(TypeId::Site)).unwrap();
        assert!(reg.has_module("net"));
        assert_eq!(reg.resolve(&qn("net::Site")), Ok(Entity::Type(TypeId::Site)));
    }

    #[test]
    fn test_site_schema_field_order() {
        let def = Registry::standard().type_def(TypeId::Site).unwrap();
        let names: Vec<&str> = def.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "app_service", "site_index"]);
        assert_eq!(
            def.field("app_service").map(|f| f.ty),
            Some(FieldType::Object(TypeId::AppService))
        );
    }

    #[test]
    fn test_signatures() {
        let sig = Registry::standard()
            .signature(FunctionId::CalcSiteNetwork)
            .unwrap();
        assert_eq!(sig.params, vec![("site".to_string(), FieldType::Object(TypeId::Site))]);
        assert_eq!(sig.ret, FieldType::Address);
        assert_eq!(sig.name.to_string(), "appinfra::calc_site_network");
    }

    #[test]
    fn test_function_names_match_signatures() {
        let registry = Registry::standard();
        for id in [FunctionId::CalcSiteNetwork, FunctionId::Print] {
            let name = id.qualified_name();
            assert_eq!(registry.signature(id).unwrap().name, name);
            assert_eq!(registry.resolve(&name).unwrap(), Entity::Function(id));
        }
    }

    #[test]
    fn test_modules() {
        let reg = Registry::standard();
        assert!(reg.has_module("appinfra"));
        assert!(reg.has_module("std"));
        assert!(!reg.has_module("other"));
        assert_eq!(reg.names().len(), 4);
    }

    #[test]
    fn test_qualified_name_parse() {
        assert_eq!(qn("appinfra::Site"), QualifiedName::new("appinfra", "Site"));
        for bad in ["Site", "::Site", "appinfra::", "a::b::c"] {
            assert!(bad.parse::<QualifiedName>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_config_from_json() {
        assert_eq!(StdlibConfig::from_json("{}").unwrap().site_prefix_length, 21);
        assert_eq!(
            StdlibConfig::from_json(r#"{"site_prefix_length": 24}"#).unwrap(),
            StdlibConfig {
                site_prefix_length: 24
            }
        );
        assert!(StdlibConfig::from_json(r#"{"prefix": 24}"#).is_err());
    }

    #[test]
    fn test_config_validation() {
        let err = Registry::new(StdlibConfig {
            site_prefix_length: 33,
        })
        .unwrap_err();
        assert_eq!(err, RegistryError::InvalidSitePrefix(33));
        let reg = Registry::new(StdlibConfig {
            site_prefix_length: 24,
        })
        .unwrap();
        assert_eq!(reg.site_prefix_length(), 24);
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
