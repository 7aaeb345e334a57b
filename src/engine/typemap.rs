//! `TypeMapper` (spec §4.H): `(SqlTypeText, Nullable) -> ResolvedType`, pure
//! and thread-safe so the analyzer can invoke it independently per column.

use crate::types::{ResolvedType, SemanticType};

/// A user-supplied override consulted before the standard ANSI mapping
/// (spec §4.H "Custom type mappings"). Matches by `custom_name` (an
/// application-level alias the user writes in config) or by
/// `sql_type_alias` (the raw declared SQL type text), first match wins.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomTypeMapping {
    pub custom_name: Option<String>,
    pub sql_type_alias: Option<String>,
    pub target_type_name: String,
    pub import_path: Option<String>,
    pub is_pointer: bool,
}

/// `(SqlTypeText, Nullable) -> ResolvedType`. Implementors must be pure —
/// the analyzer may call this concurrently across columns and caches
/// nothing keyed by call order.
pub trait TypeMapper: Send + Sync {
    fn map(&self, sql_type_text: &str, nullable: bool) -> ResolvedType;
}

/// The ANSI-ish fallback mapper every dialect's `Engine` starts from,
/// layered with any custom mappings the caller registered.
pub struct StandardTypeMapper {
    custom_mappings: Vec<CustomTypeMapping>,
}

impl StandardTypeMapper {
    pub fn new() -> Self {
        Self {
            custom_mappings: Vec::new(),
        }
    }

    pub fn with_custom_mappings(mappings: Vec<CustomTypeMapping>) -> Self {
        Self {
            custom_mappings: mappings,
        }
    }

    fn custom_match(&self, base_name: &str) -> Option<&CustomTypeMapping> {
        self.custom_mappings.iter().find(|m| {
            m.sql_type_alias
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(base_name))
                || m.custom_name
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(base_name))
        })
    }
}

impl Default for StandardTypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `"varchar(255)"` into `("varchar", [255])`, `"numeric(10, 2)"`
/// into `("numeric", [10, 2])`; a type with no parens yields an empty arg list.
fn split_type_args(text: &str) -> (String, Vec<u32>) {
    let trimmed = text.trim();
    let Some(open) = trimmed.find('(') else {
        return (trimmed.to_string(), Vec::new());
    };
    let Some(close) = trimmed.rfind(')') else {
        return (trimmed[..open].trim().to_string(), Vec::new());
    };
    let base = trimmed[..open].trim().to_string();
    let args = trimmed[open + 1..close]
        .split(',')
        .filter_map(|s| s.trim().parse::<u32>().ok())
        .collect();
    (base, args)
}

impl TypeMapper for StandardTypeMapper {
    fn map(&self, sql_type_text: &str, nullable: bool) -> ResolvedType {
        let (base_name, args) = split_type_args(sql_type_text);
        let normalized = base_name.to_ascii_lowercase().replace('_', " ");

        if let Some(custom) = self.custom_match(&base_name) {
            let mut resolved = ResolvedType::new(SemanticType::Custom(custom.target_type_name.clone()), nullable);
            resolved.custom_name = Some(custom.target_type_name.clone());
            return resolved;
        }

        let semantic = match normalized.as_str() {
            "integer" | "int" | "int4" => SemanticType::Integer,
            "bigint" | "int8" => SemanticType::BigInteger,
            "smallint" | "int2" => SemanticType::SmallInteger,
            "tinyint" => SemanticType::TinyInteger,
            "serial" => SemanticType::Serial,
            "bigserial" => SemanticType::BigSerial,
            "decimal" | "numeric" => SemanticType::Numeric,
            "real" | "float4" => SemanticType::Float,
            "double precision" | "float8" | "double" => SemanticType::Double,
            "text" | "clob" => SemanticType::Text,
            "varchar" | "character varying" | "nvarchar" => SemanticType::Varchar,
            "char" | "character" | "nchar" => SemanticType::Char,
            "blob" => SemanticType::Blob,
            "bytea" => SemanticType::Bytea,
            "timestamp" | "timestamp without time zone" | "datetime" => SemanticType::Timestamp,
            "timestamptz" | "timestamp with time zone" => SemanticType::TimestampTZ,
            "date" => SemanticType::Date,
            "time" => SemanticType::Time,
            "timetz" | "time with time zone" => SemanticType::TimeTZ,
            "interval" => SemanticType::Interval,
            "boolean" | "bool" => SemanticType::Boolean,
            "uuid" | "uniqueidentifier" => SemanticType::UUID,
            "json" => SemanticType::JSON,
            "jsonb" => SemanticType::JSONB,
            "xml" => SemanticType::XML,
            _ => SemanticType::Unknown,
        };

        let mut resolved = ResolvedType::new(semantic, nullable);
        match (&resolved.base, args.as_slice()) {
            (SemanticType::Numeric | SemanticType::Decimal, [p]) => {
                resolved = resolved.with_precision(*p, None);
            }
            (SemanticType::Numeric | SemanticType::Decimal, [p, s]) => {
                resolved = resolved.with_precision(*p, Some(*s));
            }
            (SemanticType::Varchar | SemanticType::Char, [len]) => {
                resolved = resolved.with_max_length(*len);
            }
            _ => {}
        }
        resolved
    }
}
