//! `Engine`/`EngineRegistry` (spec §4.H): process-wide registry mapping a
//! dialect name (and its aliases) to the bundle of dialect-specific
//! behavior the rest of the pipeline needs — type mapping, feature
//! predicates, pool defaults, isolation levels, and query hints.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use super::typemap::TypeMapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DialectFeatures {
    pub transactions: bool,
    pub ctes: bool,
    pub arrays: bool,
    pub returning: bool,
    pub window_functions: bool,
    pub upsert: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolDefaults {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for PoolDefaults {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 30,
        }
    }
}

/// Everything dialect-specific the pipeline needs to finish a build: the
/// DDL grammar every dialect currently shares (spec §4.D is a conservative
/// common subset, not per-dialect), a [`TypeMapper`], and the feature/pool/
/// isolation/hint metadata the emission IR and back-end consult.
#[derive(Clone)]
pub struct Engine {
    pub dialect_name: String,
    pub type_mapper: Arc<dyn TypeMapper>,
    pub features: DialectFeatures,
    pub pool_defaults: PoolDefaults,
    pub isolation_levels: Vec<IsolationLevel>,
    pub default_isolation: IsolationLevel,
    pub query_hints: Vec<String>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("dialect_name", &self.dialect_name)
            .field("type_mapper", &"<dyn TypeMapper>")
            .field("features", &self.features)
            .field("pool_defaults", &self.pool_defaults)
            .field("isolation_levels", &self.isolation_levels)
            .field("default_isolation", &self.default_isolation)
            .field("query_hints", &self.query_hints)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("dialect '{0}' is already registered")]
    DuplicateDialect(String),
    #[error("dialect '{0}' is not registered")]
    UnknownDialect(String),
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Lock-free reads, exclusive-lock writes (spec §5 "Shared mutable state"):
/// registration happens once at startup, after which every analysis task
/// reads concurrently.
#[derive(Default)]
pub struct EngineRegistry {
    engines: RwLock<ahash::AHashMap<String, Arc<Engine>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `engine` under `canonical_name` and every alias. Rejects
    /// the whole registration (no partial aliasing) if any of those names
    /// is already taken.
    pub fn register(&self, canonical_name: &str, aliases: &[&str], engine: Engine) -> Result<(), RegistryError> {
        let mut engines = self.engines.write().expect("registry lock poisoned");
        let mut names = vec![canonical_name.to_string()];
        names.extend(aliases.iter().map(|a| a.to_string()));
        for name in &names {
            if engines.contains_key(&fold(name)) {
                return Err(RegistryError::DuplicateDialect(name.clone()));
            }
        }
        let shared = Arc::new(engine);
        for name in names {
            engines.insert(fold(&name), shared.clone());
        }
        Ok(())
    }

    pub fn new_engine(&self, dialect_name: &str) -> Result<Arc<Engine>, RegistryError> {
        self.engines
            .read()
            .expect("registry lock poisoned")
            .get(&fold(dialect_name))
            .cloned()
            .ok_or_else(|| RegistryError::UnknownDialect(dialect_name.to_string()))
    }

    pub fn is_supported(&self, dialect_name: &str) -> bool {
        self.engines.read().expect("registry lock poisoned").contains_key(&fold(dialect_name))
    }

    pub fn list_registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.engines.read().expect("registry lock poisoned").keys().cloned().collect();
        names.sort();
        names
    }
}
