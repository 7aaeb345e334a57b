//! Post-parse Catalog validation (spec §4.D "Post-parse validation").
//!
//! Runs once, after every statement in the file has been parsed, so that
//! forward references between tables (a foreign key pointing at a table
//! declared later in the same file) resolve correctly. Every finding here
//! is a diagnostic, never fatal — the Catalog it checks is still handed
//! back to the caller unchanged.

use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::schema::types::Catalog;

pub fn validate(catalog: &Catalog, path: &Path) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    for table in catalog.tables() {
        if let Some(pk) = &table.primary_key {
            for col in &pk.columns {
                if !table.has_column(col) {
                    diags.push(Diagnostic::error(
                        path,
                        table.line,
                        table.column,
                        format!(
                            "primary key column '{col}' does not exist on table '{}'",
                            table.name
                        ),
                    ));
                }
            }
        }

        for uk in &table.unique_keys {
            for col in &uk.columns {
                if !table.has_column(col) {
                    diags.push(Diagnostic::error(
                        path,
                        table.line,
                        table.column,
                        format!(
                            "unique key column '{col}' does not exist on table '{}'",
                            table.name
                        ),
                    ));
                }
            }
        }

        for fk in &table.foreign_keys {
            for col in &fk.columns {
                if !table.has_column(col) {
                    diags.push(Diagnostic::error(
                        path,
                        table.line,
                        table.column,
                        format!(
                            "foreign key column '{col}' does not exist on table '{}'",
                            table.name
                        ),
                    ));
                }
            }
            match catalog.get_table(&fk.r#ref.table) {
                None => diags.push(Diagnostic::error(
                    path,
                    table.line,
                    table.column,
                    format!(
                        "foreign key on table '{}' references unknown table '{}'",
                        table.name, fk.r#ref.table
                    ),
                )),
                Some(ref_table) => {
                    for col in &fk.r#ref.columns {
                        if !ref_table.has_column(col) {
                            diags.push(Diagnostic::error(
                                path,
                                table.line,
                                table.column,
                                format!(
                                    "foreign key on table '{}' references unknown column '{}.{}'",
                                    table.name, ref_table.name, col
                                ),
                            ));
                        }
                    }
                }
            }
        }

        for index in &table.indexes {
            for col in &index.columns {
                if !table.has_column(col) {
                    diags.push(Diagnostic::error(
                        path,
                        table.line,
                        table.column,
                        format!(
                            "index column '{col}' does not exist on table '{}'",
                            table.name
                        ),
                    ));
                }
            }
        }

        for column in &table.columns {
            if let Some(fk_ref) = &column.inline_fk {
                match catalog.get_table(&fk_ref.table) {
                    None => diags.push(Diagnostic::error(
                        path,
                        table.line,
                        table.column,
                        format!(
                            "column '{}.{}' references unknown table '{}'",
                            table.name, column.name, fk_ref.table
                        ),
                    )),
                    Some(ref_table) => {
                        for col in &fk_ref.columns {
                            if !ref_table.has_column(col) {
                                diags.push(Diagnostic::error(
                                    path,
                                    table.line,
                                    table.column,
                                    format!(
                                        "column '{}.{}' references unknown column '{}.{}'",
                                        table.name, column.name, ref_table.name, col
                                    ),
                                ));
                            }
                        }
                    }
                }
            }
        }
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builder::CatalogBuilder;
    use std::path::Path;

    #[test]
    fn flags_unknown_primary_key_column() {
        let catalog = CatalogBuilder::new()
            .table("users", |t| {
                t.column("id", "integer", true).pk(&["missing"]);
            })
            .build();
        let diags = validate(&catalog, Path::new("t.sql"));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("missing"));
    }

    #[test]
    fn flags_foreign_key_to_unknown_table() {
        let catalog = CatalogBuilder::new()
            .table("orders", |t| {
                t.column("customer_id", "integer", true).fk(
                    None,
                    &["customer_id"],
                    "customers",
                    &["id"],
                );
            })
            .build();
        let diags = validate(&catalog, Path::new("t.sql"));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("customers"));
    }

    #[test]
    fn valid_catalog_produces_no_diagnostics() {
        let catalog = CatalogBuilder::new()
            .table("customers", |t| {
                t.column("id", "integer", true).pk(&["id"]);
            })
            .table("orders", |t| {
                t.column("id", "integer", true)
                    .column("customer_id", "integer", true)
                    .pk(&["id"])
                    .fk(None, &["customer_id"], "customers", &["id"]);
            })
            .build();
        assert!(validate(&catalog, Path::new("t.sql")).is_empty());
    }
}
