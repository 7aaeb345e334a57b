//! Alias discovery (spec §4.G scope construction, step 3): rescans a
//! query's own tokens for `FROM ident [AS] ident` / `JOIN ident [AS]
//! ident` and re-keys the resolved relation under the alias.
//!
//! Only the first relation named after each `FROM`/`JOIN` keyword is
//! covered, matching the spec's literal "FROM ident"/"JOIN ident"
//! wording; a comma-separated `FROM a, b AS c` list does not get `b`'s
//! alias discovered, a known and accepted gap for this conservative
//! subset of SQL (see DESIGN.md).

use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::token::{Keyword, Token, TokenKind};

use super::scope::QueryScope;

pub fn discover_aliases(tokens: &[Token], scope: &mut QueryScope, path: &Path, diags: &mut Vec<Diagnostic>) {
    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        if !(tok.is_keyword(Keyword::From) || tok.is_keyword(Keyword::Join)) {
            i += 1;
            continue;
        }
        let Some(rel_tok) = tokens.get(i + 1) else {
            i += 1;
            continue;
        };
        if rel_tok.kind != TokenKind::Identifier {
            i += 1;
            continue;
        }
        let relation_name = rel_tok.normalized_identifier();
        let mut j = i + 2;
        if tokens.get(j).is_some_and(|t| t.is_keyword(Keyword::As)) {
            j += 1;
        }
        if let Some(alias_tok) = tokens.get(j) {
            if alias_tok.kind == TokenKind::Identifier {
                let alias = alias_tok.normalized_identifier();
                if !scope.alias_relation(&relation_name, &alias) {
                    diags.push(Diagnostic::error(
                        path.to_path_buf(),
                        rel_tok.line,
                        rel_tok.column,
                        format!("query references unknown table '{relation_name}'"),
                    ));
                }
                i = j + 1;
                continue;
            }
        } else if !scope.has_relation(&relation_name) {
            diags.push(Diagnostic::error(
                path.to_path_buf(),
                rel_tok.line,
                rel_tok.column,
                format!("query references unknown table '{relation_name}'"),
            ));
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    #[test]
    fn discovers_simple_as_alias() {
        let mut scope = QueryScope::new();
        scope.insert_relation("users", Vec::new());
        let tokens = tokenize(Path::new("q.sql"), b"SELECT 1 FROM users AS u", false).unwrap();
        let mut diags = Vec::new();
        discover_aliases(&tokens, &mut scope, Path::new("q.sql"), &mut diags);
        assert!(scope.has_relation("u"));
        assert!(diags.is_empty());
    }

    #[test]
    fn discovers_implicit_alias_without_as() {
        let mut scope = QueryScope::new();
        scope.insert_relation("orders", Vec::new());
        let tokens = tokenize(Path::new("q.sql"), b"SELECT 1 FROM orders o JOIN users u ON o.user_id = u.id", false).unwrap();
        scope.insert_relation("users", Vec::new());
        let mut diags = Vec::new();
        discover_aliases(&tokens, &mut scope, Path::new("q.sql"), &mut diags);
        assert!(scope.has_relation("o"));
        assert!(scope.has_relation("u"));
    }

    #[test]
    fn unknown_table_in_from_is_a_diagnostic() {
        let mut scope = QueryScope::new();
        let tokens = tokenize(Path::new("q.sql"), b"SELECT 1 FROM ghosts g", false).unwrap();
        let mut diags = Vec::new();
        discover_aliases(&tokens, &mut scope, Path::new("q.sql"), &mut diags);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_error());
    }
}
