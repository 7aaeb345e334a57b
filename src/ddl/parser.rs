//! DDL statement parser (spec §4.D): token stream -> Catalog + diagnostics.

use std::path::Path;

use crate::diagnostic::{self, Diagnostic};
use crate::schema::types::{
    Catalog, Column, ForeignKey, ForeignKeyRef, Index, PrimaryKey, ReferentialAction, Table,
    UniqueKey, View,
};
use crate::token::{Keyword, Token, TokenCursor, TokenKind};

use super::validate;
use super::value::parse_value;

/// Parses every DDL statement in `tokens`, building a [`Catalog`]. Never
/// fails outright: malformed statements produce a diagnostic and the
/// parser resyncs to the next top-level `;` (spec §4.D "Error recovery").
pub fn parse_ddl(path: &Path, tokens: &[Token]) -> (Catalog, Vec<Diagnostic>) {
    let mut catalog = Catalog::new();
    let mut diags = Vec::new();
    let mut cursor = TokenCursor::new(tokens);

    let mut pending_doc: Vec<String> = Vec::new();
    let mut last_doc_line: Option<usize> = None;

    while !cursor.is_eof() {
        if cursor.eat_symbol(";") {
            continue;
        }

        if cursor.peek().kind == TokenKind::DocComment {
            let tok = cursor.advance();
            if let Some(last) = last_doc_line {
                if tok.line > last + 1 {
                    pending_doc.clear();
                }
            }
            pending_doc.push(tok.text.clone());
            last_doc_line = Some(tok.line);
            continue;
        }

        let doc = (!pending_doc.is_empty()).then(|| pending_doc.join("\n"));
        pending_doc.clear();
        last_doc_line = None;

        let stmt_line = cursor.peek().line;
        let stmt_column = cursor.peek().column;

        if cursor.check_keyword(Keyword::Create) {
            parse_create(&mut cursor, path, doc, stmt_line, stmt_column, &mut catalog, &mut diags);
        } else if cursor.check_keyword(Keyword::Alter) {
            parse_alter(&mut cursor, path, stmt_line, stmt_column, &mut catalog, &mut diags);
        } else {
            diags.push(Diagnostic::error(
                path,
                stmt_line,
                stmt_column,
                "unsupported statement",
            ));
            cursor.resync_to_statement_end();
        }
    }

    diags.extend(validate::validate(&catalog, path));
    (catalog, diagnostic::dedup(diags))
}

fn parse_create(
    cursor: &mut TokenCursor,
    path: &Path,
    doc: Option<String>,
    line: usize,
    column: usize,
    catalog: &mut Catalog,
    diags: &mut Vec<Diagnostic>,
) {
    cursor.advance(); // CREATE
    let _temporary = cursor.eat_keyword(Keyword::Temp) || cursor.eat_keyword(Keyword::Temporary);

    if cursor.eat_keyword(Keyword::Unique) {
        if cursor.check_keyword(Keyword::Index) {
            parse_create_index(cursor, path, line, column, catalog, diags, true);
        } else {
            diags.push(Diagnostic::error(path, line, column, "unsupported statement"));
            cursor.resync_to_statement_end();
        }
    } else if cursor.check_keyword(Keyword::Table) {
        parse_create_table(cursor, path, doc, line, column, catalog, diags);
    } else if cursor.check_keyword(Keyword::Index) {
        parse_create_index(cursor, path, line, column, catalog, diags, false);
    } else if cursor.check_keyword(Keyword::View) {
        parse_create_view(cursor, path, doc, line, column, catalog, diags);
    } else {
        diags.push(Diagnostic::error(path, line, column, "unsupported statement"));
        cursor.resync_to_statement_end();
    }
}

fn eat_if_not_exists(cursor: &mut TokenCursor) -> bool {
    if cursor.eat_keyword(Keyword::If) {
        cursor.eat_keyword(Keyword::Not);
        cursor.eat_keyword(Keyword::Exists);
        true
    } else {
        false
    }
}

fn parse_create_table(
    cursor: &mut TokenCursor,
    path: &Path,
    doc: Option<String>,
    line: usize,
    column: usize,
    catalog: &mut Catalog,
    diags: &mut Vec<Diagnostic>,
) {
    cursor.advance(); // TABLE
    eat_if_not_exists(cursor);

    let Some(name) = cursor.eat_identifier() else {
        diags.push(Diagnostic::error(path, line, column, "expected table name"));
        cursor.resync_to_statement_end();
        return;
    };

    let mut table = Table::new(name.clone());
    table.line = line;
    table.column = column;

    if cursor.expect_symbol("(").is_err() {
        diags.push(Diagnostic::error(
            path,
            line,
            column,
            "expected '(' after table name",
        ));
        cursor.resync_to_statement_end();
        return;
    }

    loop {
        if cursor.check_symbol(")") || cursor.is_eof() {
            break;
        }
        if is_table_constraint_start(cursor) {
            parse_table_constraint(cursor, path, &mut table, diags);
        } else {
            parse_column_def(cursor, path, &mut table, diags);
        }
        if !cursor.eat_symbol(",") {
            break;
        }
    }

    if cursor.expect_symbol(")").is_err() {
        let tok = cursor.peek();
        diags.push(Diagnostic::error(path, tok.line, tok.column, "expected ')'"));
        cursor.resync_to_statement_end();
        return;
    }

    loop {
        if cursor.eat_keyword(Keyword::Without) {
            cursor.eat_keyword(Keyword::Rowid);
            table.without_rowid = true;
        } else if cursor.eat_keyword(Keyword::Strict) {
            table.strict = true;
        } else {
            break;
        }
        cursor.eat_symbol(",");
    }

    table.doc = doc;

    if !catalog.insert_table(table) {
        diags.push(Diagnostic::error(
            path,
            line,
            column,
            format!("duplicate table '{name}'"),
        ));
    }

    cursor.eat_symbol(";");
}

fn is_table_constraint_start(cursor: &TokenCursor) -> bool {
    matches!(
        cursor.peek().as_keyword(),
        Some(Keyword::Primary)
            | Some(Keyword::Unique)
            | Some(Keyword::Foreign)
            | Some(Keyword::Check)
            | Some(Keyword::Constraint)
    )
}

fn parse_table_constraint(
    cursor: &mut TokenCursor,
    path: &Path,
    table: &mut Table,
    diags: &mut Vec<Diagnostic>,
) {
    let (line, column) = (cursor.peek().line, cursor.peek().column);

    let mut constraint_name = None;
    if cursor.eat_keyword(Keyword::Constraint) {
        constraint_name = cursor.eat_identifier();
    }

    if cursor.eat_keyword(Keyword::Primary) {
        cursor.eat_keyword(Keyword::Key);
        let columns = parse_column_list(cursor, path, diags);
        if table.primary_key.is_some() {
            diags.push(Diagnostic::error(path, line, column, "duplicate primary key"));
        } else {
            table.primary_key = Some(PrimaryKey {
                name: constraint_name,
                columns,
            });
        }
    } else if cursor.eat_keyword(Keyword::Unique) {
        let columns = parse_column_list(cursor, path, diags);
        table.unique_keys.push(UniqueKey {
            name: constraint_name,
            columns,
        });
    } else if cursor.eat_keyword(Keyword::Foreign) {
        cursor.eat_keyword(Keyword::Key);
        let columns = parse_column_list(cursor, path, diags);
        if !cursor.eat_keyword(Keyword::References) {
            diags.push(Diagnostic::error(
                path,
                line,
                column,
                "expected REFERENCES in foreign key constraint",
            ));
        }
        let r#ref = parse_references_target(cursor, path, diags);
        table.foreign_keys.push(ForeignKey {
            name: constraint_name,
            columns,
            r#ref,
        });
    } else if cursor.eat_keyword(Keyword::Check) {
        skip_balanced_parens(cursor);
    } else {
        cursor.advance();
    }
}

fn parse_column_list(
    cursor: &mut TokenCursor,
    path: &Path,
    diags: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let mut columns = Vec::new();
    if cursor.expect_symbol("(").is_err() {
        let tok = cursor.peek();
        diags.push(Diagnostic::error(
            path,
            tok.line,
            tok.column,
            "expected '(' in column list",
        ));
        return columns;
    }
    loop {
        if cursor.check_symbol(")") || cursor.is_eof() {
            break;
        }
        match cursor.eat_identifier() {
            Some(name) => columns.push(name),
            None => {
                cursor.advance();
            }
        }
        if !cursor.eat_symbol(",") {
            break;
        }
    }
    cursor.eat_symbol(")");
    columns
}

/// Parses the target table/columns of a `REFERENCES` clause. Assumes the
/// `REFERENCES` keyword itself has already been consumed by the caller.
fn parse_references_target(
    cursor: &mut TokenCursor,
    path: &Path,
    diags: &mut Vec<Diagnostic>,
) -> ForeignKeyRef {
    let (line, column) = (cursor.peek().line, cursor.peek().column);
    let table = cursor.eat_identifier().unwrap_or_default();
    if table.is_empty() {
        diags.push(Diagnostic::error(
            path,
            line,
            column,
            "expected referenced table name",
        ));
    }
    let columns = if cursor.check_symbol("(") {
        parse_column_list(cursor, path, diags)
    } else {
        Vec::new()
    };

    let mut on_delete = None;
    let mut on_update = None;
    loop {
        if !cursor.eat_keyword(Keyword::On) {
            break;
        }
        if cursor.eat_keyword(Keyword::Delete) {
            on_delete = Some(parse_referential_action(cursor));
        } else if cursor.eat_keyword(Keyword::Update) {
            on_update = Some(parse_referential_action(cursor));
        } else {
            break;
        }
    }

    ForeignKeyRef {
        table,
        columns,
        on_delete,
        on_update,
    }
}

/// `NO ACTION` lexes as two plain identifiers (neither word is a reserved
/// keyword on its own), so it's matched by text rather than by `Keyword`.
fn parse_referential_action(cursor: &mut TokenCursor) -> ReferentialAction {
    if cursor.eat_keyword(Keyword::Cascade) {
        ReferentialAction::Cascade
    } else if cursor.eat_keyword(Keyword::Restrict) {
        ReferentialAction::Restrict
    } else if cursor.eat_keyword(Keyword::Set) {
        if cursor.eat_keyword(Keyword::Null) {
            ReferentialAction::SetNull
        } else {
            cursor.eat_keyword(Keyword::Default);
            ReferentialAction::SetDefault
        }
    } else if cursor.peek().kind == TokenKind::Identifier
        && cursor.peek().text.eq_ignore_ascii_case("no")
    {
        cursor.advance();
        if cursor.peek().kind == TokenKind::Identifier
            && cursor.peek().text.eq_ignore_ascii_case("action")
        {
            cursor.advance();
        }
        ReferentialAction::NoAction
    } else {
        ReferentialAction::NoAction
    }
}

fn parse_column_def(
    cursor: &mut TokenCursor,
    path: &Path,
    table: &mut Table,
    diags: &mut Vec<Diagnostic>,
) {
    let (line, column) = (cursor.peek().line, cursor.peek().column);
    let Some(name) = cursor.eat_identifier() else {
        diags.push(Diagnostic::error(path, line, column, "expected column name"));
        cursor.advance();
        return;
    };

    let type_text = parse_type_text(cursor);
    let mut col = Column::new(name.clone(), type_text);

    loop {
        if cursor.eat_keyword(Keyword::Primary) {
            cursor.eat_keyword(Keyword::Key);
            if table.primary_key.is_some() {
                diags.push(Diagnostic::error(path, line, column, "duplicate primary key"));
            } else {
                table.primary_key = Some(PrimaryKey {
                    name: None,
                    columns: vec![name.clone()],
                });
            }
        } else if cursor.eat_keyword(Keyword::Not) {
            cursor.eat_keyword(Keyword::Null);
            col.not_null = true;
        } else if cursor.eat_keyword(Keyword::Null) {
            // explicit NULL: no-op, nullable is already the default
        } else if cursor.eat_keyword(Keyword::Unique) {
            table.unique_keys.push(UniqueKey {
                name: None,
                columns: vec![name.clone()],
            });
        } else if cursor.eat_keyword(Keyword::Default) {
            col.default = Some(parse_value(cursor));
        } else if cursor.eat_keyword(Keyword::Check) {
            skip_balanced_parens(cursor);
        } else if cursor.eat_keyword(Keyword::References) {
            let r#ref = parse_references_target(cursor, path, diags);
            table.foreign_keys.push(ForeignKey {
                name: None,
                columns: vec![name.clone()],
                r#ref: r#ref.clone(),
            });
            col.inline_fk = Some(r#ref);
        } else if cursor.eat_keyword(Keyword::Collate) {
            cursor.eat_identifier();
        } else if cursor.eat_keyword(Keyword::Generated) {
            cursor.eat_keyword(Keyword::Always);
            cursor.eat_keyword(Keyword::As);
            skip_balanced_parens(cursor);
            if !cursor.eat_keyword(Keyword::Stored)
                && cursor.peek().kind == TokenKind::Identifier
                && cursor.peek().text.eq_ignore_ascii_case("virtual")
            {
                cursor.advance();
            }
        } else {
            break;
        }
    }

    table.columns.push(col);
}

/// Captures the raw declared-type text up to the next column constraint
/// keyword, `,`, or `)` at paren depth 0. Returns an empty string for a
/// typeless column (e.g. SQLite's `id INTEGER PRIMARY KEY` vs a bare
/// `id` with no type at all).
fn parse_type_text(cursor: &mut TokenCursor) -> String {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    loop {
        if cursor.is_eof() {
            break;
        }
        if depth == 0 {
            if cursor.check_symbol(",") || cursor.check_symbol(")") {
                break;
            }
            if matches!(
                cursor.peek().as_keyword(),
                Some(Keyword::Primary)
                    | Some(Keyword::Not)
                    | Some(Keyword::Null)
                    | Some(Keyword::Unique)
                    | Some(Keyword::Default)
                    | Some(Keyword::Check)
                    | Some(Keyword::References)
                    | Some(Keyword::Collate)
                    | Some(Keyword::Generated)
            ) {
                break;
            }
        }
        if cursor.check_symbol("(") {
            depth += 1;
        } else if cursor.check_symbol(")") {
            depth -= 1;
        }
        parts.push(cursor.advance().text.clone());
    }
    parts.join(" ")
}

fn skip_balanced_parens(cursor: &mut TokenCursor) {
    if !cursor.eat_symbol("(") {
        return;
    }
    let mut depth = 1i32;
    while depth > 0 {
        if cursor.is_eof() {
            break;
        }
        if cursor.check_symbol("(") {
            depth += 1;
        } else if cursor.check_symbol(")") {
            depth -= 1;
        }
        cursor.advance();
    }
}

fn parse_create_index(
    cursor: &mut TokenCursor,
    path: &Path,
    line: usize,
    column: usize,
    catalog: &mut Catalog,
    diags: &mut Vec<Diagnostic>,
    unique: bool,
) {
    cursor.advance(); // INDEX
    eat_if_not_exists(cursor);

    let index_name = cursor.eat_identifier();

    if !cursor.eat_keyword(Keyword::On) {
        diags.push(Diagnostic::error(
            path,
            line,
            column,
            "expected ON in CREATE INDEX",
        ));
        cursor.resync_to_statement_end();
        return;
    }

    let Some(table_name) = cursor.eat_identifier() else {
        diags.push(Diagnostic::error(
            path,
            line,
            column,
            "expected table name in CREATE INDEX",
        ));
        cursor.resync_to_statement_end();
        return;
    };

    let columns = parse_column_list(cursor, path, diags);

    match catalog.get_table_mut(&table_name) {
        Some(table) => table.indexes.push(Index {
            name: index_name,
            columns,
            unique,
        }),
        None => diags.push(Diagnostic::error(
            path,
            line,
            column,
            format!("index references unknown table '{table_name}'"),
        )),
    }

    cursor.eat_symbol(";");
}

fn parse_create_view(
    cursor: &mut TokenCursor,
    path: &Path,
    doc: Option<String>,
    line: usize,
    column: usize,
    catalog: &mut Catalog,
    diags: &mut Vec<Diagnostic>,
) {
    cursor.advance(); // VIEW
    eat_if_not_exists(cursor);

    let Some(name) = cursor.eat_identifier() else {
        diags.push(Diagnostic::error(path, line, column, "expected view name"));
        cursor.resync_to_statement_end();
        return;
    };

    if !cursor.eat_keyword(Keyword::As) {
        diags.push(Diagnostic::error(
            path,
            line,
            column,
            "expected AS in CREATE VIEW",
        ));
        cursor.resync_to_statement_end();
        return;
    }

    let mut parts = Vec::new();
    let mut depth = 0i32;
    loop {
        if cursor.is_eof() {
            break;
        }
        if cursor.check_symbol("(") {
            depth += 1;
        } else if cursor.check_symbol(")") {
            depth -= 1;
        } else if depth == 0 && cursor.check_symbol(";") {
            break;
        }
        parts.push(cursor.advance().text.clone());
    }

    let view = View {
        name: name.clone(),
        definition: parts.join(" "),
        doc,
        line,
        column,
    };

    if !catalog.insert_view(view) {
        diags.push(Diagnostic::error(
            path,
            line,
            column,
            format!("duplicate view '{name}'"),
        ));
    }

    cursor.eat_symbol(";");
}

fn parse_alter(
    cursor: &mut TokenCursor,
    path: &Path,
    line: usize,
    column: usize,
    catalog: &mut Catalog,
    diags: &mut Vec<Diagnostic>,
) {
    cursor.advance(); // ALTER

    if !cursor.eat_keyword(Keyword::Table) {
        diags.push(Diagnostic::error(path, line, column, "unsupported statement"));
        cursor.resync_to_statement_end();
        return;
    }

    let Some(table_name) = cursor.eat_identifier() else {
        diags.push(Diagnostic::error(path, line, column, "expected table name"));
        cursor.resync_to_statement_end();
        return;
    };

    if !cursor.eat_keyword(Keyword::Add) {
        diags.push(Diagnostic::error(
            path,
            line,
            column,
            "unsupported ALTER TABLE operation",
        ));
        cursor.resync_to_statement_end();
        return;
    }
    cursor.eat_keyword(Keyword::Column);

    match catalog.get_table_mut(&table_name) {
        Some(table) => parse_column_def(cursor, path, table, diags),
        None => {
            diags.push(Diagnostic::error(
                path,
                line,
                column,
                format!("alter table references unknown table '{table_name}'"),
            ));
            let mut discard = Table::new("");
            parse_column_def(cursor, path, &mut discard, diags);
        }
    }

    cursor.eat_symbol(";");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::ValueKind;
    use crate::token::tokenize;
    use std::path::Path;

    fn parse(sql: &str) -> (Catalog, Vec<Diagnostic>) {
        let path = Path::new("t.sql");
        let tokens = tokenize(path, sql.as_bytes(), true).unwrap();
        parse_ddl(path, &tokens)
    }

    #[test]
    fn s1_create_table_with_inline_reference_and_without_rowid() {
        let (mut catalog, diags) = parse(
            "CREATE TABLE profiles (id INTEGER NOT NULL);\n\
             CREATE TABLE users (\n\
               id INTEGER NOT NULL,\n\
               name TEXT,\n\
               profile_id INTEGER REFERENCES profiles(id)\n\
             ) WITHOUT ROWID;",
        );
        assert!(diags.iter().all(|d| !d.is_error()), "{diags:?}");
        let users = catalog.get_table_mut("users").unwrap();
        assert_eq!(users.columns.len(), 3);
        assert!(users.without_rowid);
        let fk = users.get_column("profile_id").unwrap().inline_fk.as_ref().unwrap();
        assert_eq!(fk.table, "profiles");
        assert_eq!(fk.columns, vec!["id".to_string()]);
    }

    #[test]
    fn duplicate_table_is_a_diagnostic() {
        let (catalog, diags) = parse(
            "CREATE TABLE users (id INTEGER);\nCREATE TABLE users (id INTEGER);",
        );
        assert_eq!(catalog.tables().count(), 1);
        assert!(diags.iter().any(|d| d.message.contains("duplicate table")));
    }

    #[test]
    fn unsupported_statement_resyncs_and_continues() {
        let (catalog, diags) = parse("DROP TABLE users; CREATE TABLE t (id INTEGER);");
        assert!(diags.iter().any(|d| d.message.contains("unsupported statement")));
        assert!(catalog.has_table("t"));
    }

    #[test]
    fn table_constraint_primary_key_and_foreign_key() {
        let (catalog, diags) = parse(
            "CREATE TABLE customers (id INTEGER);\n\
             CREATE TABLE orders (\n\
               id INTEGER,\n\
               customer_id INTEGER,\n\
               PRIMARY KEY (id),\n\
               FOREIGN KEY (customer_id) REFERENCES customers (id) ON DELETE CASCADE\n\
             );",
        );
        assert!(diags.is_empty(), "{diags:?}");
        let orders = catalog.get_table("orders").unwrap();
        assert_eq!(orders.primary_key.as_ref().unwrap().columns, vec!["id"]);
        let fk = &orders.foreign_keys[0];
        assert_eq!(fk.r#ref.table, "customers");
        assert_eq!(fk.r#ref.on_delete, Some(ReferentialAction::Cascade));
    }

    #[test]
    fn duplicate_primary_key_is_a_diagnostic() {
        let (_, diags) = parse(
            "CREATE TABLE t (a INTEGER PRIMARY KEY, b INTEGER, PRIMARY KEY (b));",
        );
        assert!(diags.iter().any(|d| d.message.contains("duplicate primary key")));
    }

    #[test]
    fn defaults_are_classified_by_first_token() {
        let (catalog, diags) = parse(
            "CREATE TABLE t (\n\
               a INTEGER DEFAULT 0,\n\
               b TEXT DEFAULT 'x',\n\
               c TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n\
               d BLOB DEFAULT X'AB',\n\
               e INTEGER DEFAULT (1 + 2)\n\
             );",
        );
        assert!(diags.is_empty(), "{diags:?}");
        let t = catalog.get_table("t").unwrap();
        assert_eq!(t.get_column("a").unwrap().default.as_ref().unwrap().kind, ValueKind::Number);
        assert_eq!(t.get_column("b").unwrap().default.as_ref().unwrap().kind, ValueKind::String);
        assert_eq!(t.get_column("c").unwrap().default.as_ref().unwrap().kind, ValueKind::Keyword);
        assert_eq!(t.get_column("d").unwrap().default.as_ref().unwrap().kind, ValueKind::Blob);
        assert_eq!(t.get_column("e").unwrap().default.as_ref().unwrap().kind, ValueKind::Expression);
    }

    #[test]
    fn create_index_attaches_to_existing_table() {
        let (catalog, diags) = parse(
            "CREATE TABLE users (id INTEGER, email TEXT);\n\
             CREATE UNIQUE INDEX idx_email ON users (email);",
        );
        assert!(diags.is_empty(), "{diags:?}");
        let users = catalog.get_table("users").unwrap();
        assert_eq!(users.indexes.len(), 1);
        assert!(users.indexes[0].unique);
    }

    #[test]
    fn create_index_on_unknown_table_is_a_diagnostic() {
        let (_, diags) = parse("CREATE INDEX idx ON ghosts (id);");
        assert!(diags.iter().any(|d| d.message.contains("unknown table")));
    }

    #[test]
    fn create_view_captures_definition_and_doc() {
        let (catalog, diags) = parse(
            "-- Active users only\nCREATE VIEW active_users AS SELECT id FROM users WHERE active = 1;",
        );
        assert!(diags.iter().all(|d| !d.is_error()), "{diags:?}");
        let view = catalog.get_view("active_users").unwrap();
        assert_eq!(view.doc.as_deref(), Some("Active users only"));
        assert!(view.definition.contains("SELECT"));
    }

    #[test]
    fn blank_line_detaches_doc_comment_run() {
        let (catalog, _) = parse(
            "-- orphaned comment\n\n-- attached comment\nCREATE TABLE t (id INTEGER);",
        );
        let t = catalog.get_table("t").unwrap();
        assert_eq!(t.doc.as_deref(), Some("attached comment"));
    }

    #[test]
    fn alter_table_add_column_appends_to_existing_table() {
        let (catalog, diags) = parse(
            "CREATE TABLE t (id INTEGER);\nALTER TABLE t ADD COLUMN name TEXT;",
        );
        assert!(diags.is_empty(), "{diags:?}");
        let t = catalog.get_table("t").unwrap();
        assert_eq!(t.columns.len(), 2);
        assert!(t.has_column("name"));
    }

    #[test]
    fn alter_table_on_unknown_table_is_a_diagnostic() {
        let (_, diags) = parse("ALTER TABLE ghosts ADD COLUMN name TEXT;");
        assert!(diags.iter().any(|d| d.message.contains("unknown table")));
    }

    #[test]
    fn check_constraint_is_parsed_and_discarded() {
        let (catalog, diags) = parse("CREATE TABLE t (a INTEGER CHECK (a > 0));");
        assert!(diags.is_empty(), "{diags:?}");
        assert!(catalog.get_table("t").unwrap().has_column("a"));
    }

    #[test]
    fn post_parse_validation_catches_forward_declared_foreign_key() {
        let (_, diags) = parse(
            "CREATE TABLE orders (customer_id INTEGER REFERENCES missing_customers(id));",
        );
        assert!(diags.iter().any(|d| d.message.contains("missing_customers")));
    }
}
