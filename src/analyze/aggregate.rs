//! Aggregate-function typing (spec §4.G "Aggregate typing").

use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::query::QueryColumn;
use crate::token::{tokenize, Keyword, TokenKind};
use crate::types::{ResolvedType, SemanticType};

use super::scope::{Lookup, QueryScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOperand {
    Star,
    Column { table: Option<String>, column: String },
    Other,
}

/// Re-tokenizes a result column's recovered expression text and checks it
/// against the fixed `FUNC(...)` shape; `COUNT`/`SUM`/`MIN`/`MAX`/`AVG` are
/// lexer keywords (spec §4.A keyword table), so this is a structural check
/// rather than a name comparison.
pub fn detect_aggregate(text: &str) -> Option<(AggregateFunc, AggregateOperand)> {
    let tokens = tokenize(Path::new("<expr>"), text.as_bytes(), false).ok()?;
    let func = match tokens.first()?.as_keyword()? {
        Keyword::Count => AggregateFunc::Count,
        Keyword::Sum => AggregateFunc::Sum,
        Keyword::Min => AggregateFunc::Min,
        Keyword::Max => AggregateFunc::Max,
        Keyword::Avg => AggregateFunc::Avg,
        _ => return None,
    };
    if !tokens.get(1)?.is_symbol("(") {
        return None;
    }
    // tokens always end with an Eof sentinel; the last real token is one before it.
    if tokens.len() < 4 {
        return None;
    }
    let last_idx = tokens.len() - 2;
    if !tokens.get(last_idx)?.is_symbol(")") {
        return None;
    }
    let inner = &tokens[2..last_idx];
    let operand = if inner.len() == 1 && inner[0].is_symbol("*") {
        AggregateOperand::Star
    } else if inner.len() == 1 && inner[0].kind == TokenKind::Identifier {
        AggregateOperand::Column {
            table: None,
            column: inner[0].normalized_identifier(),
        }
    } else if inner.len() == 3
        && inner[0].kind == TokenKind::Identifier
        && inner[1].is_symbol(".")
        && inner[2].kind == TokenKind::Identifier
    {
        AggregateOperand::Column {
            table: Some(inner[0].normalized_identifier()),
            column: inner[2].normalized_identifier(),
        }
    } else {
        AggregateOperand::Other
    };
    Some((func, operand))
}

fn resolve_operand_type(
    operand: &AggregateOperand,
    scope: &QueryScope,
    col: &QueryColumn,
    path: &Path,
    diags: &mut Vec<Diagnostic>,
) -> Option<ResolvedType> {
    match operand {
        AggregateOperand::Star => None,
        AggregateOperand::Other => None,
        AggregateOperand::Column { table, column } => {
            match scope.lookup(table.as_deref().unwrap_or(""), column) {
                Lookup::Ok(sc) => Some(sc.resolved_type.clone()),
                Lookup::AliasNotFound => {
                    diags.push(Diagnostic::error(
                        path.to_path_buf(),
                        col.line,
                        col.column,
                        format!("aggregate argument references unknown table '{}'", table.as_deref().unwrap_or("")),
                    ));
                    None
                }
                Lookup::ColumnNotFound => {
                    diags.push(Diagnostic::error(
                        path.to_path_buf(),
                        col.line,
                        col.column,
                        format!("aggregate argument references unknown column '{column}'"),
                    ));
                    None
                }
                Lookup::Ambiguous => {
                    diags.push(Diagnostic::error(
                        path.to_path_buf(),
                        col.line,
                        col.column,
                        format!("aggregate argument column '{column}' is ambiguous"),
                    ));
                    None
                }
            }
        }
    }
}

/// Spec §4.G "Aggregate typing": `COUNT(*)`/`COUNT(col)` -> BigInteger not
/// null; `SUM`/`AVG` widen a numeric operand and go nullable, warning on a
/// non-numeric one; `MIN`/`MAX` keep the operand type, nullable.
pub fn type_aggregate(
    func: AggregateFunc,
    operand: &AggregateOperand,
    scope: &QueryScope,
    col: &QueryColumn,
    path: &Path,
    diags: &mut Vec<Diagnostic>,
) -> ResolvedType {
    match func {
        AggregateFunc::Count => {
            if !matches!(operand, AggregateOperand::Star) {
                resolve_operand_type(operand, scope, col, path, diags);
            }
            ResolvedType::new(SemanticType::BigInteger, false)
        }
        AggregateFunc::Sum => {
            let operand_type = resolve_operand_type(operand, scope, col, path, diags);
            match operand_type {
                Some(t) if t.base.is_numeric() => ResolvedType::new(t.base, true),
                Some(_) => {
                    diags.push(Diagnostic::warning(
                        path.to_path_buf(),
                        col.line,
                        col.column,
                        "SUM over a non-numeric operand",
                    ));
                    ResolvedType::unknown()
                }
                None => ResolvedType::unknown(),
            }
        }
        AggregateFunc::Avg => {
            let operand_type = resolve_operand_type(operand, scope, col, path, diags);
            match operand_type {
                Some(t) if t.base.is_numeric() => ResolvedType::new(SemanticType::Double, true),
                Some(_) => {
                    diags.push(Diagnostic::warning(
                        path.to_path_buf(),
                        col.line,
                        col.column,
                        "AVG over a non-numeric operand",
                    ));
                    ResolvedType::unknown()
                }
                None => ResolvedType::unknown(),
            }
        }
        AggregateFunc::Min | AggregateFunc::Max => match resolve_operand_type(operand, scope, col, path, diags) {
            Some(t) => ResolvedType::new(t.base, true),
            None => ResolvedType::unknown(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_count_star() {
        let (func, operand) = detect_aggregate("COUNT(*)").unwrap();
        assert_eq!(func, AggregateFunc::Count);
        assert_eq!(operand, AggregateOperand::Star);
    }

    #[test]
    fn detects_sum_of_qualified_column() {
        let (func, operand) = detect_aggregate("SUM(o.amount)").unwrap();
        assert_eq!(func, AggregateFunc::Sum);
        assert_eq!(
            operand,
            AggregateOperand::Column {
                table: Some("o".to_string()),
                column: "amount".to_string()
            }
        );
    }

    #[test]
    fn non_aggregate_expression_is_not_detected() {
        assert!(detect_aggregate("price * qty").is_none());
    }

    #[test]
    fn count_star_types_as_not_null_biginteger() {
        let scope = QueryScope::new();
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
        let mut diags = Vec::new();
        let t = type_aggregate(AggregateFunc::Count, &AggregateOperand::Star, &scope, &col, Path::new("q.sql"), &mut diags);
        assert_eq!(t.base, SemanticType::BigInteger);
        assert!(!t.nullable);
        assert!(diags.is_empty());
    }
}
