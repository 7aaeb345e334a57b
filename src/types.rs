//! The semantic type lattice (spec §4.B).
//!
//! This is the only type vocabulary that crosses component boundaries:
//! the DDL parser produces it from dialect-specific type text, the
//! analyzer resolves result columns and parameters to it, and the
//! emission IR (`crate::ir`) carries it straight through to the back-end.
//! Neither the analyzer nor the IR ever mentions a host-language type —
//! that translation is the `Engine`'s `TypeMapper` (`crate::engine`).

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SemanticType {
    Unknown,

    Integer,
    BigInteger,
    SmallInteger,
    TinyInteger,
    Decimal,
    Float,
    Double,
    Numeric,
    Serial,
    BigSerial,

    Text,
    Char,
    Varchar,

    Blob,
    Bytea,

    Timestamp,
    TimestampTZ,
    Date,
    Time,
    TimeTZ,
    Interval,

    Boolean,
    UUID,

    JSON,
    JSONB,
    XML,

    Enum,
    Array(Box<SemanticType>),
    Composite,
    Custom(String),
}

impl SemanticType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Integer
                | SemanticType::BigInteger
                | SemanticType::SmallInteger
                | SemanticType::TinyInteger
                | SemanticType::Decimal
                | SemanticType::Float
                | SemanticType::Double
                | SemanticType::Numeric
                | SemanticType::Serial
                | SemanticType::BigSerial
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            SemanticType::Text | SemanticType::Char | SemanticType::Varchar
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            SemanticType::Timestamp
                | SemanticType::TimestampTZ
                | SemanticType::Date
                | SemanticType::Time
                | SemanticType::TimeTZ
                | SemanticType::Interval
        )
    }

}

/// A fully-resolved type as it travels from the analyzer onward: the
/// semantic category plus the modifiers spec §3 lists alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedType {
    pub base: SemanticType,
    pub nullable: bool,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub max_length: Option<u32>,
    pub enum_values: Vec<String>,
    /// Present only when `base` is `SemanticType::Custom`.
    pub custom_name: Option<String>,
}

impl ResolvedType {
    pub fn new(base: SemanticType, nullable: bool) -> Self {
        Self {
            base,
            nullable,
            precision: None,
            scale: None,
            max_length: None,
            enum_values: Vec::new(),
            custom_name: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(SemanticType::Unknown, true)
    }

    pub fn with_precision(mut self, precision: u32, scale: Option<u32>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    pub fn with_max_length(mut self, len: u32) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}
