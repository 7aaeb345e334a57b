//! CTE list parsing (spec §4.F step 1): `WITH [RECURSIVE] name [(cols)] AS
//! (body), ...`. The body is recovered as a byte-exact substring via
//! [`PositionIndex`] rather than reconstructed from token text, so the
//! analyzer can re-tokenize and re-parse it later without drift.

use crate::diagnostic::Diagnostic;
use crate::token::{Keyword, Token, TokenCursor};

use super::position::PositionIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub sql: String,
    pub line: usize,
    pub column: usize,
}

pub fn parse_ctes(
    cursor: &mut TokenCursor,
    pos: &PositionIndex,
    path: &std::path::Path,
    diags: &mut Vec<Diagnostic>,
) -> Vec<Cte> {
    let mut ctes = Vec::new();
    if !cursor.eat_keyword(Keyword::With) {
        return ctes;
    }
    cursor.eat_keyword(Keyword::Recursive);

    loop {
        let (line, column) = (cursor.peek().line, cursor.peek().column);
        let Some(name) = cursor.eat_identifier() else {
            diags.push(Diagnostic::error(path, line, column, "expected CTE name"));
            break;
        };

        let columns = if cursor.check_symbol("(") {
            parse_ident_list(cursor)
        } else {
            Vec::new()
        };

        if cursor.expect_keyword(Keyword::As).is_err() {
            diags.push(Diagnostic::error(
                path,
                cursor.peek().line,
                cursor.peek().column,
                format!("CTE '{name}' is missing AS"),
            ));
            break;
        }
        if cursor.expect_symbol("(").is_err() {
            diags.push(Diagnostic::error(
                path,
                cursor.peek().line,
                cursor.peek().column,
                format!("CTE '{name}' is missing its body"),
            ));
            break;
        }

        let first_body_token: Token = cursor.peek().clone();
        let mut last_body_token = first_body_token.clone();
        let mut depth = 1i32;
        loop {
            if cursor.is_eof() {
                diags.push(Diagnostic::error(
                    path,
                    first_body_token.line,
                    first_body_token.column,
                    format!("CTE '{name}' body is unterminated"),
                ));
                break;
            }
            if cursor.check_symbol(")") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            } else if cursor.check_symbol("(") {
                depth += 1;
            }
            last_body_token = cursor.advance().clone();
        }

        if !first_body_token.is_keyword(Keyword::Select) {
            diags.push(Diagnostic::error(
                path,
                first_body_token.line,
                first_body_token.column,
                format!("CTE '{name}' body must begin with SELECT"),
            ));
        }

        let sql = pos.substring(&first_body_token, &last_body_token).trim().to_string();
        let _ = cursor.expect_symbol(")");

        ctes.push(Cte {
            name,
            columns,
            sql,
            line,
            column,
        });

        if !cursor.eat_symbol(",") {
            break;
        }
    }

    ctes
}

fn parse_ident_list(cursor: &mut TokenCursor) -> Vec<String> {
    let mut names = Vec::new();
    if !cursor.eat_symbol("(") {
        return names;
    }
    loop {
        if cursor.check_symbol(")") || cursor.is_eof() {
            cursor.eat_symbol(")");
            break;
        }
        if let Some(name) = cursor.eat_identifier() {
            names.push(name);
        } else {
            cursor.advance();
        }
        if !cursor.eat_symbol(",") {
            cursor.eat_symbol(")");
            break;
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::path::Path;

    fn run(sql: &str) -> (Vec<Cte>, Vec<Diagnostic>) {
        let tokens = tokenize(Path::new("q.sql"), sql.as_bytes(), true).unwrap();
        let pos = PositionIndex::new(sql);
        let mut cursor = TokenCursor::new(&tokens);
        let mut diags = Vec::new();
        let ctes = parse_ctes(&mut cursor, &pos, Path::new("q.sql"), &mut diags);
        (ctes, diags)
    }

    #[test]
    fn no_with_yields_empty_list() {
        let (ctes, diags) = run("SELECT 1");
        assert!(ctes.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn single_cte_captures_name_and_body_verbatim() {
        let (ctes, diags) = run("WITH recent AS (SELECT id FROM orders WHERE created_at > :since) SELECT * FROM recent");
        assert!(diags.is_empty());
        assert_eq!(ctes.len(), 1);
        assert_eq!(ctes[0].name, "recent");
        assert_eq!(ctes[0].sql, "SELECT id FROM orders WHERE created_at > :since");
    }

    #[test]
    fn cte_with_explicit_column_list() {
        let (ctes, _) = run("WITH totals(id, total) AS (SELECT id, SUM(amount) FROM orders GROUP BY id) SELECT * FROM totals");
        assert_eq!(ctes[0].columns, vec!["id".to_string(), "total".to_string()]);
    }

    #[test]
    fn multiple_ctes_in_source_order() {
        let (ctes, _) = run("WITH a AS (SELECT 1), b AS (SELECT 2) SELECT * FROM a, b");
        assert_eq!(ctes.len(), 2);
        assert_eq!(ctes[0].name, "a");
        assert_eq!(ctes[1].name, "b");
    }

    #[test]
    fn body_without_select_is_a_diagnostic() {
        let (_, diags) = run("WITH a AS (1, 2) SELECT * FROM a");
        assert!(diags.iter().any(|d| d.message.contains("SELECT")));
    }

    #[test]
    fn missing_as_is_a_diagnostic() {
        let (_, diags) = run("WITH a (SELECT 1) SELECT * FROM a");
        assert!(diags.iter().any(|d| d.message.contains("AS")));
    }

    #[test]
    fn recursive_keyword_is_consumed() {
        let (ctes, diags) = run(
            "WITH RECURSIVE tree AS (SELECT id FROM nodes WHERE parent_id IS NULL UNION ALL SELECT n.id FROM nodes n JOIN tree t ON n.parent_id = t.id) SELECT * FROM tree",
        );
        assert!(diags.is_empty());
        assert_eq!(ctes.len(), 1);
        assert_eq!(ctes[0].name, "tree");
    }
}
