//! CTE resolution (spec §4.G "CTE resolution"): types a CTE's anchor
//! branch, checks a recursive branch's arity against it, and adds the
//! result to the scope used by subsequent CTEs and the outer query.

use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::query::{parse_select_columns, Cte, PositionIndex, QueryColumn};
use crate::token::{tokenize, Keyword, Token, TokenCursor};

use super::columns::resolve_column;
use super::scope::{cte_relation_columns, QueryScope};

/// Splits CTE body tokens around a top-level (paren-depth 0) `UNION [ALL |
/// DISTINCT]`, returning `(anchor, Some(recursive))` when found.
fn split_anchor_recursive(tokens: &[Token]) -> (&[Token], Option<&[Token]>) {
    let mut depth = 0i32;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.is_symbol("(") {
            depth += 1;
        } else if tok.is_symbol(")") {
            depth -= 1;
        } else if depth == 0 && tok.is_keyword(Keyword::Union) {
            let mut rest_start = i + 1;
            if tokens.get(rest_start).is_some_and(|t| t.is_keyword(Keyword::All) || t.is_keyword(Keyword::Distinct)) {
                rest_start += 1;
            }
            return (&tokens[..i], Some(&tokens[rest_start..]));
        }
    }
    (tokens, None)
}

fn select_columns(tokens: &[Token], text: &str, path: &Path, diags: &mut Vec<Diagnostic>) -> Vec<QueryColumn> {
    let pos = PositionIndex::new(text);
    let mut cursor = TokenCursor::new(tokens);
    if !cursor.eat_keyword(Keyword::Select) {
        return Vec::new();
    }
    parse_select_columns(&mut cursor, &pos, path, diags)
}

pub fn resolve_cte(cte: &Cte, scope: &mut QueryScope, path: &Path, diags: &mut Vec<Diagnostic>) {
    let Ok(tokens) = tokenize(path, cte.sql.as_bytes(), false) else {
        return;
    };
    let (anchor_tokens, recursive_tokens) = split_anchor_recursive(&tokens);

    let anchor_columns = select_columns(anchor_tokens, &cte.sql, path, diags);
    let resolved: Vec<(String, crate::types::ResolvedType)> = anchor_columns
        .iter()
        .map(|c| {
            let resolved = resolve_column(c, scope, path, diags);
            (c.alias.clone().unwrap_or_default(), resolved.resolved_type)
        })
        .collect();

    if let Some(recursive_tokens) = recursive_tokens {
        let mut recursive_diags = Vec::new();
        let recursive_columns = select_columns(recursive_tokens, &cte.sql, path, &mut recursive_diags);
        if recursive_columns.len() != anchor_columns.len() {
            diags.push(Diagnostic::error(
                path.to_path_buf(),
                cte.line,
                cte.column,
                format!(
                    "recursive CTE '{}' branch has {} column(s), anchor has {}",
                    cte.name,
                    recursive_columns.len(),
                    anchor_columns.len()
                ),
            ));
        }
    }

    let named = cte_relation_columns(cte, resolved);
    scope.insert_relation(&cte.name, named);
}
