//! Result-column splitting for SELECT queries (spec §4.F step 3).

use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::token::{Keyword, Token, TokenCursor, TokenKind};

use super::position::PositionIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryColumn {
    pub text: String,
    pub alias: Option<String>,
    pub table: Option<String>,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
    pub is_simple: bool,
}

/// Parses the comma-separated result-column list of a SELECT, starting
/// right after the `SELECT` keyword and stopping before the matching
/// top-level `FROM`.
pub fn parse_select_columns(
    cursor: &mut TokenCursor,
    pos: &PositionIndex,
    path: &Path,
    diags: &mut Vec<Diagnostic>,
) -> Vec<QueryColumn> {
    cursor.eat_keyword(Keyword::Distinct);
    cursor.eat_keyword(Keyword::All);

    let tokens = cursor.tokens();
    let mut columns = Vec::new();
    let mut depth = 0i32;
    let mut expr_start = cursor.pos();

    loop {
        if cursor.is_eof() {
            if cursor.pos() > expr_start {
                columns.push(build_column(tokens, expr_start, cursor.pos() - 1, pos, path, diags));
            }
            break;
        }
        if depth == 0 && cursor.check_keyword(Keyword::From) {
            if cursor.pos() > expr_start {
                columns.push(build_column(tokens, expr_start, cursor.pos() - 1, pos, path, diags));
            }
            break;
        }
        if cursor.check_symbol("(") {
            depth += 1;
        } else if cursor.check_symbol(")") {
            depth -= 1;
        } else if depth == 0 && cursor.check_symbol(",") {
            columns.push(build_column(tokens, expr_start, cursor.pos() - 1, pos, path, diags));
            cursor.advance();
            expr_start = cursor.pos();
            continue;
        }
        cursor.advance();
    }

    columns
}

fn build_column(
    tokens: &[Token],
    start: usize,
    end: usize,
    pos: &PositionIndex,
    path: &Path,
    diags: &mut Vec<Diagnostic>,
) -> QueryColumn {
    let last = &tokens[end];
    let mut alias: Option<String> = None;
    let mut text_end = end;

    if last.kind == TokenKind::Identifier {
        if end >= start + 2 && tokens[end - 1].is_keyword(Keyword::As) {
            alias = Some(last.normalized_identifier());
            text_end = end - 2;
        } else if end == start {
            alias = Some(last.normalized_identifier());
        } else if !tokens[end - 1].is_symbol(".") {
            alias = Some(last.normalized_identifier());
            text_end = end - 1;
        }
    }

    let len = text_end as isize - start as isize + 1;
    let is_simple = if len == 1 && tokens[start].kind == TokenKind::Identifier {
        true
    } else {
        len == 3
            && tokens[start].kind == TokenKind::Identifier
            && tokens[start + 1].is_symbol(".")
            && (tokens[start + 2].kind == TokenKind::Identifier || tokens[start + 2].is_symbol("*"))
    };

    let table = if is_simple && len == 3 {
        Some(tokens[start].normalized_identifier())
    } else {
        None
    };

    if is_simple && alias.is_none() {
        let column_name = if len == 1 {
            tokens[start].normalized_identifier()
        } else if tokens[start + 2].is_symbol("*") {
            "*".to_string()
        } else {
            tokens[start + 2].normalized_identifier()
        };
        alias = Some(column_name);
    }

    let expr_text = pos.substring(&tokens[start], &tokens[text_end]).trim().to_string();

    if !is_simple && alias.is_none() {
        diags.push(Diagnostic::warning(
            path.to_path_buf(),
            tokens[start].line,
            tokens[start].column,
            "result column expression needs an explicit alias",
        ));
    }

    QueryColumn {
        text: expr_text,
        alias,
        table,
        line: tokens[start].line,
        column: tokens[start].column,
        start: pos.offset_of(&tokens[start]),
        end: pos.end_offset_of(&tokens[text_end]),
        is_simple,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn run(sql: &str) -> (Vec<QueryColumn>, Vec<Diagnostic>) {
        let tokens = tokenize(Path::new("q.sql"), sql.as_bytes(), true).unwrap();
        let pos = PositionIndex::new(sql);
        let mut cursor = TokenCursor::new(&tokens);
        cursor.advance(); // consume SELECT
        let mut diags = Vec::new();
        let cols = parse_select_columns(&mut cursor, &pos, Path::new("q.sql"), &mut diags);
        (cols, diags)
    }

    #[test]
    fn bare_identifier_is_simple_with_self_alias() {
        let (cols, diags) = run("SELECT id FROM users");
        assert!(diags.is_empty());
        assert_eq!(cols.len(), 1);
        assert!(cols[0].is_simple);
        assert_eq!(cols[0].alias.as_deref(), Some("id"));
        assert_eq!(cols[0].table, None);
    }

    #[test]
    fn qualified_column_is_simple_with_table() {
        let (cols, _) = run("SELECT u.id FROM users u");
        assert_eq!(cols[0].table.as_deref(), Some("u"));
        assert_eq!(cols[0].alias.as_deref(), Some("id"));
        assert!(cols[0].is_simple);
    }

    #[test]
    fn qualified_star_is_simple() {
        let (cols, _) = run("SELECT u.* FROM users u");
        assert!(cols[0].is_simple);
        assert_eq!(cols[0].alias.as_deref(), Some("*"));
    }

    #[test]
    fn explicit_as_alias_is_used() {
        let (cols, _) = run("SELECT price * qty AS total FROM orders");
        assert_eq!(cols[0].alias.as_deref(), Some("total"));
        assert_eq!(cols[0].text, "price * qty");
        assert!(!cols[0].is_simple);
    }

    #[test]
    fn implicit_trailing_identifier_alias_without_as() {
        let (cols, _) = run("SELECT COUNT(*) total FROM orders");
        assert_eq!(cols[0].alias.as_deref(), Some("total"));
        assert_eq!(cols[0].text, "COUNT(*)");
    }

    #[test]
    fn expression_without_alias_is_a_warning() {
        let (cols, diags) = run("SELECT price * qty FROM orders");
        assert_eq!(cols[0].alias, None);
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
    }

    #[test]
    fn multiple_columns_split_on_top_level_commas() {
        let (cols, _) = run("SELECT id, name, COUNT(*) total FROM users GROUP BY id");
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].alias.as_deref(), Some("id"));
        assert_eq!(cols[1].alias.as_deref(), Some("name"));
        assert_eq!(cols[2].alias.as_deref(), Some("total"));
    }

    #[test]
    fn commas_inside_function_calls_do_not_split_columns() {
        let (cols, _) = run("SELECT COALESCE(a, b) val FROM t");
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].text, "COALESCE(a, b)");
    }
}
