//! Schema catalog types (spec §3 "Catalog", "Table", "Column", ... ; §4.C).

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValueKind {
    Number,
    String,
    Keyword,
    Blob,
    Expression,
}

/// A column or literal default value, classified by the first token of its
/// definition (spec §4.D "Defaults").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Value {
    pub kind: ValueKind,
    /// Verbatim source text, including quotes for strings/blobs.
    pub text: String,
}

impl Value {
    pub fn new(kind: ValueKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferentialAction {
    Cascade,
    Restrict,
    SetNull,
    SetDefault,
    NoAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub columns: Vec<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    /// Raw, dialect-specific declared type text (e.g. `"varchar(255)"`).
    pub type_text: String,
    pub not_null: bool,
    pub default: Option<Value>,
    /// Present when the column carries an inline `REFERENCES` constraint.
    pub inline_fk: Option<ForeignKeyRef>,
}

impl Column {
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
            not_null: false,
            default: None,
            inline_fk: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub r#ref: ForeignKeyRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Index {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub unique_keys: Vec<UniqueKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
    pub without_rowid: bool,
    pub strict: bool,
    pub doc: Option<String>,
    /// Position of the `CREATE TABLE` keyword. Post-parse validation (spec
    /// §4.D) anchors its diagnostics here, since individual constraint
    /// sub-clauses don't carry their own spans in this model.
    pub line: usize,
    pub column: usize,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct View {
    pub name: String,
    pub definition: String,
    pub doc: Option<String>,
    pub line: usize,
    pub column: usize,
}

/// The root schema container (spec §3 "Catalog").
///
/// Lookups on table/view names are case-insensitive; the stored `name`
/// field on each `Table`/`View` preserves the declared casing.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: ahash::AHashMap<String, Table>,
    views: ahash::AHashMap<String, View>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&fold(name))
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(&fold(name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(&fold(name))
    }

    /// Inserts a table, returning `false` (and leaving the catalog
    /// unchanged) if a table with the same name already exists — callers
    /// turn that into a "duplicate table" diagnostic.
    pub fn insert_table(&mut self, table: Table) -> bool {
        let key = fold(&table.name);
        if self.tables.contains_key(&key) {
            return false;
        }
        self.tables.insert(key, table);
        true
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn get_view(&self, name: &str) -> Option<&View> {
        self.views.get(&fold(name))
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.views.contains_key(&fold(name))
    }

    pub fn insert_view(&mut self, view: View) -> bool {
        let key = fold(&view.name);
        if self.views.contains_key(&key) {
            return false;
        }
        self.views.insert(key, view);
        true
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    /// True if a relation (table or view) with this name is registered.
    pub fn has_relation(&self, name: &str) -> bool {
        self.has_table(name) || self.has_view(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_is_case_insensitive_but_preserves_casing() {
        let mut catalog = Catalog::new();
        catalog.insert_table(Table::new("Users"));
        assert!(catalog.has_table("users"));
        assert!(catalog.has_table("USERS"));
        assert_eq!(catalog.get_table("users").unwrap().name, "Users");
    }

    #[test]
    fn insert_table_rejects_duplicates() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert_table(Table::new("users")));
        assert!(!catalog.insert_table(Table::new("USERS")));
        assert_eq!(catalog.tables().count(), 1);
    }

    #[test]
    fn get_column_is_case_insensitive() {
        let mut table = Table::new("users");
        table.columns.push(Column::new("Id", "integer"));
        assert!(table.get_column("id").is_some());
    }
}
