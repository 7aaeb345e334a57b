//! Fluent test harness for building catalog state.
//!
//! ```
//! use sqlgen_core::schema::builder::CatalogBuilder;
//!
//! let catalog = CatalogBuilder::new()
//!     .table("orders", |t| {
//!         t.column("id", "int", false)
//!          .column("status", "text", true)
//!          .index(Some("idx_status"), &["status"], false)
//!          .pk(&["id"])
//!          .fk(Some("fk_customer"), &["customer_id"], "customers", &["id"]);
//!     })
//!     .build();
//! ```

use super::types::{
    Catalog, Column, ForeignKey, ForeignKeyRef, Index, PrimaryKey, Table, UniqueKey, Value,
};

pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
        }
    }

    pub fn table(mut self, name: &str, f: impl FnOnce(&mut TableBuilder)) -> Self {
        let mut builder = TableBuilder::new(name);
        f(&mut builder);
        self.catalog.insert_table(builder.build());
        self
    }

    pub fn build(self) -> Catalog {
        self.catalog
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            table: Table::new(name),
        }
    }

    pub fn column(&mut self, name: &str, type_text: &str, not_null: bool) -> &mut Self {
        let mut column = Column::new(name, type_text);
        column.not_null = not_null;
        self.table.columns.push(column);
        self
    }

    pub fn column_with_default(
        &mut self,
        name: &str,
        type_text: &str,
        not_null: bool,
        default: Value,
    ) -> &mut Self {
        let mut column = Column::new(name, type_text);
        column.not_null = not_null;
        column.default = Some(default);
        self.table.columns.push(column);
        self
    }

    pub fn index(&mut self, name: Option<&str>, columns: &[&str], unique: bool) -> &mut Self {
        self.table.indexes.push(Index {
            name: name.map(str::to_string),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            unique,
        });
        self
    }

    pub fn pk(&mut self, columns: &[&str]) -> &mut Self {
        self.table.primary_key = Some(PrimaryKey {
            name: None,
            columns: columns.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn fk(
        &mut self,
        name: Option<&str>,
        columns: &[&str],
        ref_table: &str,
        ref_columns: &[&str],
    ) -> &mut Self {
        self.table.foreign_keys.push(ForeignKey {
            name: name.map(str::to_string),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            r#ref: ForeignKeyRef {
                table: ref_table.to_string(),
                columns: ref_columns.iter().map(|s| s.to_string()).collect(),
                on_delete: None,
                on_update: None,
            },
        });
        self
    }

    pub fn unique(&mut self, name: Option<&str>, columns: &[&str]) -> &mut Self {
        self.table.unique_keys.push(UniqueKey {
            name: name.map(str::to_string),
            columns: columns.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn without_rowid(&mut self) -> &mut Self {
        self.table.without_rowid = true;
        self
    }

    pub fn build(self) -> Table {
        self.table
    }
}
