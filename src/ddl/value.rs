//! Default-value classification (spec §4.D "Defaults").

use crate::schema::types::{Value, ValueKind};
use crate::token::{TokenCursor, TokenKind};

fn is_blob_literal(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some('X') | Some('x')) && chars.next() == Some('\'')
}

/// Consumes and classifies a default value starting at the cursor's
/// current position. Single-token literals (Number, String, Keyword,
/// Blob) consume exactly one token; anything else — a parenthesized
/// group or a bare function call like `uuid_generate_v4()` — is captured
/// verbatim as an Expression up to the next top-level `,`, `)`, or `;`.
pub fn parse_value(cursor: &mut TokenCursor) -> Value {
    let tok = cursor.peek();
    match tok.kind {
        TokenKind::Number if is_blob_literal(&tok.text) => {
            let text = tok.text.clone();
            cursor.advance();
            Value::new(ValueKind::Blob, text)
        }
        TokenKind::Number => {
            let text = tok.text.clone();
            cursor.advance();
            Value::new(ValueKind::Number, text)
        }
        TokenKind::String => {
            let text = tok.text.clone();
            cursor.advance();
            Value::new(ValueKind::String, text)
        }
        TokenKind::Keyword => {
            let text = tok.text.clone();
            cursor.advance();
            Value::new(ValueKind::Keyword, text)
        }
        _ => Value::new(ValueKind::Expression, capture_expression(cursor)),
    }
}

/// Captures raw token text up to (not including) the next top-level `,`,
/// `)`, or `;`, tracking paren depth so nested groups are swallowed whole.
fn capture_expression(cursor: &mut TokenCursor) -> String {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    loop {
        if cursor.is_eof() {
            break;
        }
        if cursor.check_symbol("(") {
            depth += 1;
        } else if cursor.check_symbol(")") {
            if depth == 0 {
                break;
            }
            depth -= 1;
        } else if depth == 0 && (cursor.check_symbol(",") || cursor.check_symbol(";")) {
            break;
        }
        parts.push(cursor.advance().text.clone());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::path::Path;

    fn value_of(sql: &str) -> Value {
        let tokens = tokenize(Path::new("t.sql"), sql.as_bytes(), false).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        parse_value(&mut cursor)
    }

    #[test]
    fn classifies_number() {
        let v = value_of("42");
        assert_eq!(v.kind, ValueKind::Number);
        assert_eq!(v.text, "42");
    }

    #[test]
    fn classifies_string() {
        let v = value_of("'hi'");
        assert_eq!(v.kind, ValueKind::String);
    }

    #[test]
    fn classifies_keyword() {
        let v = value_of("CURRENT_TIMESTAMP");
        assert_eq!(v.kind, ValueKind::Keyword);
        assert_eq!(v.text, "CURRENT_TIMESTAMP");
    }

    #[test]
    fn classifies_blob() {
        let v = value_of("X'AB'");
        assert_eq!(v.kind, ValueKind::Blob);
    }

    #[test]
    fn classifies_parenthesized_expression_verbatim() {
        let v = value_of("(1 + 2)");
        assert_eq!(v.kind, ValueKind::Expression);
        assert_eq!(v.text, "( 1 + 2 )");
    }

    #[test]
    fn classifies_bare_function_call_as_expression() {
        let v = value_of("uuid_generate_v4()");
        assert_eq!(v.kind, ValueKind::Expression);
        assert_eq!(v.text, "uuid_generate_v4 ( )");
    }

    #[test]
    fn expression_stops_at_top_level_comma() {
        let tokens = tokenize(Path::new("t.sql"), b"(1 + 2), next_col", false).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let v = parse_value(&mut cursor);
        assert_eq!(v.text, "( 1 + 2 )");
        assert!(cursor.check_symbol(","));
    }
}
