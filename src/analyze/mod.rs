//! Semantic analyzer (spec §4.G): resolves a [`crate::query::Query`]
//! against a [`crate::schema::Catalog`] into an [`AnalyzedQuery`] with
//! typed result columns and parameters.

mod alias;
mod aggregate;
mod columns;
mod cte;
mod params;
mod scope;

pub use aggregate::{AggregateFunc, AggregateOperand};
pub use columns::ResolvedColumn;
pub use params::ResolvedParam;
pub use scope::{Lookup, QueryScope, ScopeColumn, ScopeEntry};

use std::path::PathBuf;

use crate::diagnostic::{self, Diagnostic};
use crate::engine::TypeMapper;
use crate::block::Command;
use crate::query::{parse_ctes, Query, Verb};
use crate::schema::Catalog;
use crate::token::{tokenize, TokenCursor, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedQuery {
    pub block_name: String,
    pub path: PathBuf,
    pub verb: Verb,
    pub command: Command,
    pub columns: Vec<ResolvedColumn>,
    pub params: Vec<ResolvedParam>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Returns the token slice of `query.sql` that follows the `WITH` clause
/// (if any), used for alias discovery so CTE-internal `FROM`/`JOIN`s don't
/// need re-parsing.
fn main_query_tokens(sql: &str) -> Vec<crate::token::Token> {
    let Ok(tokens) = tokenize(std::path::Path::new("<query>"), sql.as_bytes(), true) else {
        return Vec::new();
    };
    let pos = crate::query::PositionIndex::new(sql);
    let mut cursor = TokenCursor::new(&tokens);
    while cursor.peek().kind == TokenKind::DocComment {
        cursor.advance();
    }
    let mut scratch = Vec::new();
    parse_ctes(&mut cursor, &pos, std::path::Path::new("<query>"), &mut scratch);
    tokens[cursor.pos()..].to_vec()
}

pub fn analyze(query: &Query, catalog: &Catalog, type_mapper: &dyn TypeMapper) -> AnalyzedQuery {
    let mut diags = query.diagnostics.clone();

    let mut scope = QueryScope::from_catalog(catalog, type_mapper);
    for cte in &query.ctes {
        cte::resolve_cte(cte, &mut scope, &query.path, &mut diags);
    }

    let main_tokens = main_query_tokens(&query.sql);
    alias::discover_aliases(&main_tokens, &mut scope, &query.path, &mut diags);

    let columns = query
        .columns
        .iter()
        .map(|c| columns::resolve_column(c, &scope, &query.path, &mut diags))
        .collect();

    let params = params::resolve_params(query, catalog, &scope, &mut diags);

    AnalyzedQuery {
        block_name: query.block_name.clone(),
        path: query.path.clone(),
        verb: query.verb,
        command: query.command,
        columns,
        params,
        diagnostics: diagnostic::dedup(diags),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Command, QueryBlock};
    use crate::engine::StandardTypeMapper;
    use crate::query::parse_query;
    use crate::schema::{Column, Table};
    use crate::types::SemanticType;
    use std::path::PathBuf;

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

    fn users_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let mut table = Table::new("users");
        table.columns.push(Column::new("id", "integer"));
        table.columns.push(Column::new("name", "text"));
        catalog.insert_table(table);
        catalog
    }

    /// Spec §8 seed scenario S2: a simple SELECT + WHERE with a named
    /// parameter resolved against the catalog.
    #[test]
    fn s2_simple_select_with_where_param() {
        let catalog = users_catalog();
        let mapper = StandardTypeMapper::new();
        let query = parse_query(&block("SELECT id, name FROM users WHERE id = $1"));
        let analyzed = analyze(&query, &catalog, &mapper);
        assert!(analyzed.diagnostics.is_empty());
        assert_eq!(analyzed.columns[0].resolved_type.base, SemanticType::Integer);
        assert_eq!(analyzed.columns[1].resolved_type.base, SemanticType::Text);
        assert_eq!(analyzed.params[0].resolved_type.base, SemanticType::Integer);
    }

    /// Spec §8 seed scenario S3: `IN (?, ?, ?)` collapses to one variadic
    /// parameter typed from the compared column.
    #[test]
    fn s3_variadic_in_list_typed_from_column() {
        let catalog = users_catalog();
        let mapper = StandardTypeMapper::new();
        let query = parse_query(&block("SELECT id FROM users WHERE id IN (?, ?, ?)"));
        let analyzed = analyze(&query, &catalog, &mapper);
        assert_eq!(analyzed.params.len(), 1);
        assert!(analyzed.params[0].is_variadic);
        assert_eq!(analyzed.params[0].variadic_count, 3);
    }

    /// Spec §8 seed scenario S5: INSERT with an explicit column list types
    /// each positional parameter from its corresponding column.
    #[test]
    fn s5_insert_params_typed_by_column_position() {
        let catalog = users_catalog();
        let mapper = StandardTypeMapper::new();
        let query = parse_query(&block("INSERT INTO users (id, name) VALUES ($1, $2)"));
        let analyzed = analyze(&query, &catalog, &mapper);
        assert_eq!(analyzed.params[0].resolved_type.base, SemanticType::Integer);
        assert_eq!(analyzed.params[1].resolved_type.base, SemanticType::Text);
    }

    /// Spec §8 seed scenario S6: an unaliased `COUNT(*)` resolves to
    /// BigInteger not null, with exactly one Warning diagnostic.
    #[test]
    fn s6_unaliased_count_star_warns_but_still_resolves() {
        let catalog = users_catalog();
        let mapper = StandardTypeMapper::new();
        let query = parse_query(&block("SELECT COUNT(*) FROM users"));
        let analyzed = analyze(&query, &catalog, &mapper);
        assert_eq!(analyzed.columns[0].resolved_type.base, SemanticType::BigInteger);
        assert!(!analyzed.columns[0].resolved_type.nullable);
        let warnings: Vec<_> = analyzed.diagnostics.iter().filter(|d| !d.is_error()).collect();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn analyze_is_idempotent_on_repeated_runs() {
        let catalog = users_catalog();
        let mapper = StandardTypeMapper::new();
        let query = parse_query(&block("SELECT u.id, u.name FROM users u WHERE u.id = $1"));
        let first = analyze(&query, &catalog, &mapper);
        let second = analyze(&query, &catalog, &mapper);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_table_in_from_clause_is_a_diagnostic() {
        let catalog = users_catalog();
        let mapper = StandardTypeMapper::new();
        let query = parse_query(&block("SELECT id FROM ghosts"));
        let analyzed = analyze(&query, &catalog, &mapper);
        assert!(analyzed.diagnostics.iter().any(|d| d.is_error()));
    }
}
