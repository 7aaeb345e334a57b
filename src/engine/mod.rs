//! Dialect registry and type mapping (spec §4.H).

mod registry;
mod typemap;

pub use registry::{DialectFeatures, Engine, EngineRegistry, IsolationLevel, PoolDefaults, RegistryError};
pub use typemap::{CustomTypeMapping, StandardTypeMapper, TypeMapper};
