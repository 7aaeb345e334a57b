//! Parameter type inference (spec §4.G "Parameter-type inference").

use std::path::Path;

use crate::block::ParamTypeOverride;
use crate::diagnostic::Diagnostic;
use crate::query::{Param, PositionIndex, Query, Verb};
use crate::schema::Catalog;
use crate::token::{Keyword, Token, TokenKind};
use crate::types::{ResolvedType, SemanticType};

use super::scope::{Lookup, QueryScope};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParam {
    pub name: String,
    pub order: u32,
    pub is_variadic: bool,
    pub variadic_count: u32,
    pub resolved_type: ResolvedType,
}

fn is_comparison_like(tok: &Token) -> bool {
    if tok.kind == TokenKind::Symbol {
        matches!(tok.text.as_str(), "=" | "<" | ">" | "<=" | ">=" | "!=" | "<>")
    } else {
        tok.is_keyword(Keyword::Like) || tok.is_keyword(Keyword::In) || tok.is_keyword(Keyword::Between)
    }
}

/// Walks backward from `end_idx` to see if it's the tail of a (possibly
/// table-qualified) column reference.
fn colref_ending_at(tokens: &[Token], end_idx: usize) -> Option<(Option<String>, String)> {
    let tok = tokens.get(end_idx)?;
    if tok.kind != TokenKind::Identifier {
        return None;
    }
    if end_idx >= 2 && tokens[end_idx - 1].is_symbol(".") && tokens.get(end_idx.wrapping_sub(2)).map(|t| t.kind) == Some(TokenKind::Identifier) {
        Some((Some(tokens[end_idx - 2].normalized_identifier()), tok.normalized_identifier()))
    } else {
        Some((None, tok.normalized_identifier()))
    }
}

fn colref_starting_at(tokens: &[Token], start_idx: usize) -> Option<(Option<String>, String)> {
    let tok = tokens.get(start_idx)?;
    if tok.kind != TokenKind::Identifier {
        return None;
    }
    if tokens.get(start_idx + 1).is_some_and(|t| t.is_symbol(".")) && tokens.get(start_idx + 2).map(|t| t.kind) == Some(TokenKind::Identifier) {
        Some((Some(tok.normalized_identifier()), tokens[start_idx + 2].normalized_identifier()))
    } else {
        Some((None, tok.normalized_identifier()))
    }
}

/// Finds the index of the token whose source position matches `param`'s
/// recorded byte offset.
fn find_param_token_index(tokens: &[Token], pos: &PositionIndex, param: &Param) -> Option<usize> {
    tokens.iter().position(|t| pos.offset_of(t) == param.start)
}

/// Spec §4.G: "examines its immediate syntactic neighborhood for an
/// `= colref` or `colref =` pattern".
fn neighbor_colref(tokens: &[Token], idx: usize) -> Option<(Option<String>, String)> {
    if idx > 0 && is_comparison_like(&tokens[idx - 1]) && idx >= 2 {
        if let Some(found) = colref_ending_at(tokens, idx - 2) {
            return Some(found);
        }
    }
    if let Some(op) = tokens.get(idx + 1) {
        if is_comparison_like(op) {
            return colref_starting_at(tokens, idx + 2);
        }
    }
    None
}

/// Spec §4.G INSERT walk: matches a param's slot position inside
/// `VALUES (...)` against the i-th declared column in `(columns)`,
/// independent of the parser's own camelCase name (which has already lost
/// the original column casing needed to look the column up in the
/// Catalog).
fn insert_column_for_param(tokens: &[Token], pos: &PositionIndex, param: &Param) -> Option<String> {
    let insert_idx = tokens.iter().position(|t| t.is_keyword(Keyword::Insert))?;
    let into_idx = (insert_idx..tokens.len()).find(|&i| tokens[i].is_keyword(Keyword::Into))?;
    let table_idx = into_idx + 1;
    if tokens.get(table_idx)?.kind != TokenKind::Identifier {
        return None;
    }
    let mut i = table_idx + 1;
    if !tokens.get(i)?.is_symbol("(") {
        return None;
    }
    i += 1;
    let mut columns = Vec::new();
    let cols_start = i;
    let mut depth = 1i32;
    while depth > 0 {
        let t = tokens.get(i)?;
        if t.is_symbol("(") {
            depth += 1;
        } else if t.is_symbol(")") {
            depth -= 1;
            if depth == 0 {
                break;
            }
        } else if t.kind == TokenKind::Identifier {
            columns.push(t.normalized_identifier());
        }
        i += 1;
    }
    let _ = cols_start;
    let close_paren_idx = i;
    i = close_paren_idx + 1;
    if !tokens.get(i)?.is_keyword(Keyword::Values) {
        return None;
    }
    i += 1;
    if !tokens.get(i)?.is_symbol("(") {
        return None;
    }
    i += 1;
    let mut slot = 0usize;
    let mut depth = 1i32;
    let mut slot_start = i;
    while depth > 0 {
        let t = tokens.get(i)?;
        if t.is_symbol("(") {
            depth += 1;
        } else if t.is_symbol(")") {
            depth -= 1;
            if depth == 0 {
                if (slot_start..i).any(|j| pos.offset_of(&tokens[j]) == param.start) {
                    return columns.get(slot).cloned();
                }
                break;
            }
        } else if depth == 1 && t.is_symbol(",") {
            if (slot_start..i).any(|j| pos.offset_of(&tokens[j]) == param.start) {
                return columns.get(slot).cloned();
            }
            slot += 1;
            slot_start = i + 1;
        }
        i += 1;
    }
    None
}

fn parse_semantic_type_name(name: &str) -> SemanticType {
    match name.to_ascii_lowercase().as_str() {
        "integer" | "int" => SemanticType::Integer,
        "biginteger" | "bigint" => SemanticType::BigInteger,
        "smallinteger" | "smallint" => SemanticType::SmallInteger,
        "tinyinteger" | "tinyint" => SemanticType::TinyInteger,
        "decimal" => SemanticType::Decimal,
        "float" => SemanticType::Float,
        "double" => SemanticType::Double,
        "numeric" => SemanticType::Numeric,
        "serial" => SemanticType::Serial,
        "bigserial" => SemanticType::BigSerial,
        "text" => SemanticType::Text,
        "char" => SemanticType::Char,
        "varchar" => SemanticType::Varchar,
        "blob" => SemanticType::Blob,
        "bytea" => SemanticType::Bytea,
        "timestamp" => SemanticType::Timestamp,
        "timestamptz" => SemanticType::TimestampTZ,
        "date" => SemanticType::Date,
        "time" => SemanticType::Time,
        "timetz" => SemanticType::TimeTZ,
        "interval" => SemanticType::Interval,
        "boolean" | "bool" => SemanticType::Boolean,
        "uuid" => SemanticType::UUID,
        "json" => SemanticType::JSON,
        "jsonb" => SemanticType::JSONB,
        "xml" => SemanticType::XML,
        other => SemanticType::Custom(other.to_string()),
    }
}

fn find_override<'a>(overrides: &'a [ParamTypeOverride], name: &str) -> Option<&'a ParamTypeOverride> {
    overrides
        .iter()
        .find(|o| crate::query::to_camel_case(&o.name) == name)
}

pub fn resolve_params(query: &Query, catalog: &Catalog, scope: &QueryScope, diags: &mut Vec<Diagnostic>) -> Vec<ResolvedParam> {
    let _ = catalog;
    let tokens = match crate::token::tokenize(Path::new("<query>"), query.sql.as_bytes(), false) {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };
    let pos = PositionIndex::new(&query.sql);

    query
        .params
        .iter()
        .map(|param| {
            if let Some(over) = find_override(&query.param_overrides, &param.name) {
                let base = parse_semantic_type_name(&over.type_text);
                return ResolvedParam {
                    name: param.name.clone(),
                    order: param.order,
                    is_variadic: param.is_variadic,
                    variadic_count: param.variadic_count,
                    resolved_type: ResolvedType::new(base, true),
                };
            }

            let inferred = if query.verb == Verb::Insert {
                insert_column_for_param(&tokens, &pos, param).map(|c| (None, c))
            } else {
                None
            };

            let inferred = inferred.or_else(|| find_param_token_index(&tokens, &pos, param).and_then(|idx| neighbor_colref(&tokens, idx)));

            let resolved_type = match inferred {
                Some((table, column)) => match scope.lookup(table.as_deref().unwrap_or(""), &column) {
                    Lookup::Ok(sc) => sc.resolved_type.clone(),
                    _ => ResolvedType::unknown(),
                },
                None => ResolvedType::unknown(),
            };

            ResolvedParam {
                name: param.name.clone(),
                order: param.order,
                is_variadic: param.is_variadic,
                variadic_count: param.variadic_count,
                resolved_type,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Command, QueryBlock};
    use crate::query::parse_query;
    use std::path::PathBuf;

    fn catalog_with_users() -> Catalog {
        let mut catalog = Catalog::new();
        let mut table = crate::schema::Table::new("users");
        table.columns.push(crate::schema::Column::new("id", "integer"));
        table.columns.push(crate::schema::Column::new("name", "text"));
        catalog.insert_table(table);
        catalog
    }

    fn block(sql: &str) -> QueryBlock {
        QueryBlock {
            path: PathBuf::from("q.sql"),
            name: "Test".to_string(),
            command: Command::One,
            sql: sql.to_string(),
            suffix: String::new(),
            doc: None,
            param_overrides: Vec::new(),
            cache: None,
            start: 0,
            end: sql.len(),
            marker_line: 1,
        }
    }

    #[test]
    fn infers_param_type_from_comparison_neighbor() {
        use crate::engine::StandardTypeMapper;
        let catalog = catalog_with_users();
        let mapper = StandardTypeMapper::new();
        let query = parse_query(&block("SELECT id FROM users WHERE id = $1"));
        let scope = QueryScope::from_catalog(&catalog, &mapper);
        let mut diags = Vec::new();
        let resolved = resolve_params(&query, &catalog, &scope, &mut diags);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].resolved_type.base, SemanticType::Integer);
    }

    #[test]
    fn insert_param_type_inferred_from_column_list() {
        use crate::engine::StandardTypeMapper;
        let catalog = catalog_with_users();
        let mapper = StandardTypeMapper::new();
        let query = parse_query(&block("INSERT INTO users (id, name) VALUES ($1, $2)"));
        let scope = QueryScope::from_catalog(&catalog, &mapper);
        let mut diags = Vec::new();
        let resolved = resolve_params(&query, &catalog, &scope, &mut diags);
        assert_eq!(resolved[0].resolved_type.base, SemanticType::Integer);
        assert_eq!(resolved[1].resolved_type.base, SemanticType::Text);
    }
}
