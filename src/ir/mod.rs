//! Emission IR (spec §4.I): the dialect-neutral shape an external
//! back-end renders into target-language source. Every [`TypeDecl`] and
//! [`FuncDecl`] here references only [`crate::types::SemanticType`] /
//! [`crate::types::ResolvedType`] — no host-language type ever appears
//! (that translation is [`crate::engine::TypeMapper`]'s job, and happens
//! before lowering, not during it).

mod lower;

pub use lower::lower_query;

use std::path::PathBuf;

use crate::types::ResolvedType;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub semantic_type: ResolvedType,
    /// The result-column name this field was derived from, when the
    /// mapping is direct (spec §4.I "source column").
    pub source_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub result: ResultType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDecl {
    Struct { name: String, fields: Vec<FieldDecl> },
    Interface { name: String, methods: Vec<MethodSig> },
    Enum { name: String, variants: Vec<String> },
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Struct { name, .. } => name,
            TypeDecl::Interface { name, .. } => name,
            TypeDecl::Enum { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub semantic_type: ResolvedType,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultType {
    Scalar(ResolvedType),
    /// References a [`TypeDecl::Struct`] declared elsewhere in the same
    /// [`File`] by name.
    Row(String),
    Unit,
}

/// One step of a function's finite effect sequence (spec §4.I). A back-end
/// renders each step into its host language's equivalent driver call; the
/// IR only fixes the order and the data each step touches.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectStep {
    PrepareQuery(String),
    ReplaceSliceMarker(String),
    ExecReturningRowsAffected,
    ExecReturningLastID,
    QueryOneRow(String),
    QueryManyRows(String),
    ScanRow(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub result: ResultType,
    pub steps: Vec<EffectStep>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Type(TypeDecl),
    Func(FuncDecl),
}

/// One emitted source file: an ordered declaration list a back-end writes
/// out verbatim, in source order (spec §5 "Ordering guarantees").
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub path: PathBuf,
    pub declarations: Vec<Declaration>,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declarations: Vec::new(),
        }
    }
}
