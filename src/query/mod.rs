//! Query parser (spec §4.F): turns one [`crate::block::QueryBlock`]'s SQL
//! into a [`Query`] — verb, CTEs, result columns, and parameters — ready
//! for [`crate::analyze`] to resolve against a [`crate::schema::Catalog`].

mod column;
mod cte;
mod param;
mod parser;
mod position;

pub use column::{parse_select_columns, QueryColumn};
pub use cte::{parse_ctes, Cte};
pub use param::{to_camel_case, Param, ParamStyle};
pub use parser::parse_query;
pub use position::PositionIndex;

use std::path::PathBuf;

use crate::block::{Command, ParamTypeOverride};
use crate::diagnostic::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Select,
    Insert,
    Update,
    Delete,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub block_name: String,
    pub path: PathBuf,
    /// Verbatim SQL text of the block, kept so [`crate::analyze`] can
    /// re-tokenize for alias discovery and parameter-neighborhood scans
    /// without reparsing structure the parser already extracted.
    pub sql: String,
    pub command: Command,
    pub verb: Verb,
    pub columns: Vec<QueryColumn>,
    pub params: Vec<Param>,
    pub ctes: Vec<Cte>,
    pub param_overrides: Vec<ParamTypeOverride>,
    pub diagnostics: Vec<Diagnostic>,
}
