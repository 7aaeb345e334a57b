//! Schema model: the Catalog of tables, views, and their constraints
//! (spec §4.C), built by [`crate::ddl`].

pub mod builder;
pub mod sort;
pub mod types;

pub use types::*;
