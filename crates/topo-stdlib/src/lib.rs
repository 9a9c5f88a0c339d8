//! topo standard library.
//!
//! ```text
//! registry   module::member → type / function, schemas, StdlibConfig
//! address    IPv4 CIDR values and subdivision
//! graph      Value, AppService, Site, ObjectGraph
//! appinfra   calc_site_network
//! ```

pub mod address;
pub mod appinfra;
pub mod graph;
pub mod registry;

pub use address::{AddressError, AddressValue};
pub use appinfra::{calc_site_network, SiteNetworkError, SITE_PREFIX_LENGTH};
pub use graph::{AppService, Object, ObjectGraph, ObjectId, Site, Value};
pub use registry::{
    Entity, FieldDef, FieldType, FnSig, FunctionId, QualifiedName, Registry, RegistryError,
    StdlibConfig, TypeDef, TypeId, UnknownName,
};
