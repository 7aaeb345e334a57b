//! Per-block orchestration: tokenize -> CTEs -> verb -> columns -> params.

use crate::block::QueryBlock;
use crate::diagnostic::Diagnostic;
use crate::token::{tokenize, Keyword, TokenCursor};

use super::column::parse_select_columns;
use super::cte::parse_ctes;
use super::param::collect_params;
use super::position::PositionIndex;
use super::{Query, Verb};

/// Parses a single query block's SQL (spec §4.F). A scanner error in the
/// block's own SQL text (distinct from the file-level scan that found the
/// block) is reported as a diagnostic rather than propagated, consistent
/// with the rest of the pipeline's "never stop at one bad statement" rule.
pub fn parse_query(block: &QueryBlock) -> Query {
    let mut diags: Vec<Diagnostic> = Vec::new();

    let tokens = match tokenize(&block.path, block.sql.as_bytes(), true) {
        Ok(t) => t,
        Err(e) => {
            diags.push(Diagnostic::error(block.path.as_path(), e.line, e.column, e.kind.to_string()));
            return Query {
                block_name: block.name.clone(),
                path: block.path.clone(),
                sql: block.sql.clone(),
                command: block.command,
                verb: Verb::Unknown,
                columns: Vec::new(),
                params: Vec::new(),
                ctes: Vec::new(),
                param_overrides: block.param_overrides.clone(),
                diagnostics: diags,
            };
        }
    };

    let pos = PositionIndex::new(&block.sql);
    let mut cursor = TokenCursor::new(&tokens);

    while cursor.peek().kind == crate::token::TokenKind::DocComment {
        cursor.advance();
    }

    let ctes = parse_ctes(&mut cursor, &pos, &block.path, &mut diags);

    let verb = if cursor.eat_keyword(Keyword::Select) {
        Verb::Select
    } else if cursor.eat_keyword(Keyword::Insert) {
        Verb::Insert
    } else if cursor.eat_keyword(Keyword::Update) {
        Verb::Update
    } else if cursor.eat_keyword(Keyword::Delete) {
        Verb::Delete
    } else {
        diags.push(Diagnostic::error(
            &block.path,
            cursor.peek().line,
            cursor.peek().column,
            "missing or unsupported query verb (expected SELECT, INSERT, UPDATE, or DELETE)",
        ));
        Verb::Unknown
    };

    let columns = if verb == Verb::Select {
        parse_select_columns(&mut cursor, &pos, &block.path, &mut diags)
    } else {
        Vec::new()
    };

    let params = collect_params(&tokens, &pos, verb);

    Query {
        block_name: block.name.clone(),
        path: block.path.clone(),
        sql: block.sql.clone(),
        command: block.command,
        verb,
        columns,
        params,
        ctes,
        param_overrides: block.param_overrides.clone(),
        diagnostics: diags,
    }
}
