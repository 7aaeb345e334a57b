//! Result-column type resolution (spec §4.G "Result-column resolution").

use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::query::QueryColumn;
use crate::types::ResolvedType;

use super::aggregate::{detect_aggregate, type_aggregate};
use super::scope::{Lookup, QueryScope};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub alias: Option<String>,
    pub table: Option<String>,
    pub resolved_type: ResolvedType,
    pub is_aggregate: bool,
}

/// Resolves one [`QueryColumn`]'s type. Aggregates are typed by
/// [`type_aggregate`]; simple columns resolve through `scope.lookup`;
/// everything else is an expression the analyzer can't map back to a
/// schema type, so it's `Unknown`/nullable with a Warning (the
/// "needs an explicit alias" Warning from the query parser already
/// covers the aggregate-without-alias case spec §8's S6 exercises, so no
/// separate diagnostic is raised here for that).
pub fn resolve_column(col: &QueryColumn, scope: &QueryScope, path: &Path, diags: &mut Vec<Diagnostic>) -> ResolvedColumn {
    if let Some((func, operand)) = detect_aggregate(&col.text) {
        let resolved_type = type_aggregate(func, &operand, scope, col, path, diags);
        return ResolvedColumn {
            alias: col.alias.clone(),
            table: col.table.clone(),
            resolved_type,
            is_aggregate: true,
        };
    }

    if col.is_simple {
        let column_name = col.alias.clone().unwrap_or_default();
        match scope.lookup(col.table.as_deref().unwrap_or(""), &column_name) {
            Lookup::Ok(sc) => {
                return ResolvedColumn {
                    alias: col.alias.clone(),
                    table: col.table.clone(),
                    resolved_type: sc.resolved_type.clone(),
                    is_aggregate: false,
                };
            }
            Lookup::AliasNotFound => diags.push(Diagnostic::error(
                path.to_path_buf(),
                col.line,
                col.column,
                format!("result column references unknown table '{}'", col.table.as_deref().unwrap_or("")),
            )),
            Lookup::ColumnNotFound => diags.push(Diagnostic::error(
                path.to_path_buf(),
                col.line,
                col.column,
                format!("result column references unknown column '{column_name}'"),
            )),
            Lookup::Ambiguous => diags.push(Diagnostic::error(
                path.to_path_buf(),
                col.line,
                col.column,
                format!("result column '{column_name}' is ambiguous"),
            )),
        }
        return ResolvedColumn {
            alias: col.alias.clone(),
            table: col.table.clone(),
            resolved_type: ResolvedType::unknown(),
            is_aggregate: false,
        };
    }

    diags.push(Diagnostic::warning(
        path.to_path_buf(),
        col.line,
        col.column,
        "result column derives from an expression without a schema mapping",
    ));
    ResolvedColumn {
        alias: col.alias.clone(),
        table: col.table.clone(),
        resolved_type: ResolvedType::unknown(),
        is_aggregate: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SemanticType;

    fn simple_col(alias: &str, table: Option<&str>) -> QueryColumn {
        QueryColumn {
            text: table.map(|t| format!("{t}.{alias}")).unwrap_or_else(|| alias.to_string()),
            alias: Some(alias.to_string()),
            table: table.map(|s| s.to_string()),
            line: 1,
            column: 1,
            start: 0,
            end: 0,
            is_simple: true,
        }
    }

    #[test]
    fn resolves_simple_column_through_scope() {
        let mut scope = QueryScope::new();
        scope.insert_relation("users", vec![("id".to_string(), ResolvedType::new(SemanticType::Integer, false))]);
        scope.alias_relation("users", "u");
        let col = simple_col("id", Some("u"));
        let mut diags = Vec::new();
        let resolved = resolve_column(&col, &scope, Path::new("q.sql"), &mut diags);
        assert_eq!(resolved.resolved_type.base, SemanticType::Integer);
        assert!(diags.is_empty());
    }

    #[test]
    fn unknown_column_produces_error_and_unknown_type() {
        let scope = QueryScope::new();
        let col = simple_col("missing", Some("u"));
        let mut diags = Vec::new();
        let resolved = resolve_column(&col, &scope, Path::new("q.sql"), &mut diags);
        assert_eq!(resolved.resolved_type.base, SemanticType::Unknown);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_error());
    }

    #[test]
    fn non_simple_non_aggregate_expression_warns() {
        let col = QueryColumn {
            text: "price * qty".to_string(),
            alias: Some("total".to_string()),
            table: None,
            line: 1,
            column: 1,
            start: 0,
            end: 0,
            is_simple: false,
        };
        let scope = QueryScope::new();
        let mut diags = Vec::new();
        let resolved = resolve_column(&col, &scope, Path::new("q.sql"), &mut diags);
        assert_eq!(resolved.resolved_type.base, SemanticType::Unknown);
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
    }

    #[test]
    fn count_star_aggregate_resolves_without_touching_scope() {
        let col = QueryColumn {
            text: "COUNT(*)".to_string(),
            alias: None,
            table: None,
            line: 1,
            column: 1,
            start: 0,
            end: 0,
            is_simple: false,
        };
        let scope = QueryScope::new();
        let mut diags = Vec::new();
        let resolved = resolve_column(&col, &scope, Path::new("q.sql"), &mut diags);
        assert!(resolved.is_aggregate);
        assert_eq!(resolved.resolved_type.base, SemanticType::BigInteger);
        assert!(!resolved.resolved_type.nullable);
        assert!(diags.is_empty());
    }
}
