//! Runtime values and the per-evaluation object graph.

use std::fmt;

use crate::address::AddressValue;
use crate::registry::TypeId;

/// Handle to an object stored in an [`ObjectGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The runtime value of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(u64),
    Address(AddressValue),
    Object(ObjectId),
    Nil,
}

impl Value {
    /// Name of the value's kind, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "integer",
            Self::Address(_) => "address",
            Self::Object(_) => "object",
            Self::Nil => "nil",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppService {
    pub network_address: AddressValue,
}

/// A deployment of an [`AppService`], selecting a subnet by `site_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub name: String,
    /// Always refers to an [`Object::AppService`] in the same graph.
    pub app_service: ObjectId,
    pub site_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    AppService(AppService),
    Site(Site),
}

impl Object {
    pub fn type_id(&self) -> TypeId {
        match self {
            Self::AppService(_) => TypeId::AppService,
            Self::Site(_) => TypeId::Site,
        }
    }

    /// Value of a declared field, `None` if the type has no such field.
    pub fn field(&self, name: &str) -> Option<Value> {
        match (self, name) {
            (Self::AppService(svc), "network_address") => Some(Value::Address(svc.network_address)),
            (Self::Site(site), "name") => Some(Value::String(site.name.clone())),
            (Self::Site(site), "app_service") => Some(Value::Object(site.app_service)),
            (Self::Site(site), "site_index") => Some(Value::Int(site.site_index)),
            _ => None,
        }
    }
}

/// Append-only arena of constructed objects.
///
/// Objects are never mutated or removed, so an [`ObjectId`] stays valid for
/// the life of the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectGraph {
    objects: Vec<Object>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0)
    }

    pub fn app_service(&self, id: ObjectId) -> Option<&AppService> {
        match self.get(id)? {
            Object::AppService(svc) => Some(svc),
            Object::Site(_) => None,
        }
    }

    pub fn site(&self, id: ObjectId) -> Option<&Site> {
        match self.get(id)? {
            Object::Site(site) => Some(site),
            Object::AppService(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    /// Canonical text of a value.
    ///
    /// Addresses render as `A.B.C.D/P`, strings as-is, integers in decimal,
    /// and objects as `module::Type(field=value, ...)` in declaration order.
    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Address(a) => a.to_string(),
            Value::Nil => "nil".to_string(),
            Value::Object(id) => self.render_object(*id),
        }
    }

    fn render_object(&self, id: ObjectId) -> String {
        match self.get(id) {
            Some(Object::AppService(svc)) => format!(
                "{}(network_address={})",
                TypeId::AppService.qualified_name(),
                svc.network_address
            ),
            Some(Object::Site(site)) => format!(
                "{}(name={:?}, app_service={}, site_index={})",
                TypeId::Site.qualified_name(),
                site.name,
                self.render_object(site.app_service),
                site.site_index
            ),
            None => format!("<dangling {id}>"),
        }
    }
}
