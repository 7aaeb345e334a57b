//! `QueryScope` (spec §4.G): the relation/alias/column lookup table a
//! query's result columns and parameters are resolved against.

use ahash::AHashMap;

use crate::engine::TypeMapper;
use crate::query::Cte;
use crate::schema::Catalog;
use crate::types::ResolvedType;

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct ScopeColumn {
    pub name: String,
    pub owner: String,
    pub resolved_type: ResolvedType,
}

#[derive(Debug, Clone)]
pub struct ScopeEntry {
    pub relation_name: String,
    pub columns: AHashMap<String, ScopeColumn>,
}

impl ScopeEntry {
    fn from_columns(relation_name: &str, columns: Vec<(String, ResolvedType)>) -> Self {
        let mut map = AHashMap::new();
        for (name, resolved_type) in columns {
            map.insert(
                fold(&name),
                ScopeColumn {
                    name: name.clone(),
                    owner: relation_name.to_string(),
                    resolved_type,
                },
            );
        }
        Self {
            relation_name: relation_name.to_string(),
            columns: map,
        }
    }
}

pub enum Lookup<'a> {
    Ok(&'a ScopeColumn),
    AliasNotFound,
    ColumnNotFound,
    Ambiguous,
}

#[derive(Debug, Clone, Default)]
pub struct QueryScope {
    entries: AHashMap<String, ScopeEntry>,
}

impl QueryScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer 1: one entry per Catalog table (spec §4.G scope construction,
    /// step 1).
    pub fn from_catalog(catalog: &Catalog, type_mapper: &dyn TypeMapper) -> Self {
        let mut scope = Self::new();
        for table in catalog.tables() {
            let columns = table
                .columns
                .iter()
                .map(|c| (c.name.clone(), type_mapper.map(&c.type_text, !c.not_null)))
                .collect();
            scope
                .entries
                .insert(fold(&table.name), ScopeEntry::from_columns(&table.name, columns));
        }
        scope
    }

    pub fn insert_relation(&mut self, relation_name: &str, columns: Vec<(String, ResolvedType)>) {
        self.entries
            .insert(fold(relation_name), ScopeEntry::from_columns(relation_name, columns));
    }

    /// Layer 3: aliases shadow/supplement base relation names without
    /// removing them (spec §4.G "re-keys the resolved entry under the
    /// alias"). Returns `false` if `relation_name` isn't in scope yet.
    pub fn alias_relation(&mut self, relation_name: &str, alias: &str) -> bool {
        match self.entries.get(&fold(relation_name)).cloned() {
            Some(entry) => {
                self.entries.insert(fold(alias), entry);
                true
            }
            None => false,
        }
    }

    pub fn has_relation(&self, name: &str) -> bool {
        self.entries.contains_key(&fold(name))
    }

    /// Resolves `alias.column`. An empty `alias` matching exactly one
    /// *relation* in scope resolves against it; 2+ relations is `Ambiguous`
    /// (spec §4.G `lookup`). Candidates are deduped by `ScopeColumn::owner`
    /// before counting, since `alias_relation` inserts an additional map
    /// entry for the same relation rather than replacing the base one —
    /// an aliased single table must not count as two relations.
    pub fn lookup(&self, alias: &str, column: &str) -> Lookup<'_> {
        if alias.is_empty() {
            let mut found: Option<&ScopeColumn> = None;
            for entry in self.entries.values() {
                let Some(col) = entry.columns.get(&fold(column)) else {
                    continue;
                };
                match found {
                    None => found = Some(col),
                    Some(existing) if existing.owner == col.owner => {}
                    Some(_) => return Lookup::Ambiguous,
                }
            }
            return match found {
                Some(col) => Lookup::Ok(col),
                None => Lookup::ColumnNotFound,
            };
        }

        let Some(entry) = self.entries.get(&fold(alias)) else {
            return Lookup::AliasNotFound;
        };
        match entry.columns.get(&fold(column)) {
            Some(col) => Lookup::Ok(col),
            None => Lookup::ColumnNotFound,
        }
    }
}

/// Resolves the output columns a [`Cte`] contributes to the scope visible
/// to statements after it (spec §4.G "CTE resolution"). `cte_columns` are
/// the already-typed result columns of the CTE's anchor branch, paired
/// with the declared column list (if any) that overrides their names.
pub fn cte_relation_columns(cte: &Cte, anchor_columns: Vec<(String, ResolvedType)>) -> Vec<(String, ResolvedType)> {
    if cte.columns.is_empty() {
        return anchor_columns;
    }
    cte.columns
        .iter()
        .zip(anchor_columns)
        .map(|(declared, (_, ty))| (declared.clone(), ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SemanticType;

    #[test]
    fn lookup_by_alias_and_column() {
        let mut scope = QueryScope::new();
        scope.insert_relation(
            "users",
            vec![("id".to_string(), ResolvedType::new(SemanticType::Integer, false))],
        );
        scope.alias_relation("users", "u");
        match scope.lookup("u", "id") {
            Lookup::Ok(col) => assert_eq!(col.owner, "users"),
            _ => panic!("expected Ok"),
        }
    }

    #[test]
    fn unknown_alias_is_alias_not_found() {
        let scope = QueryScope::new();
        assert!(matches!(scope.lookup("x", "id"), Lookup::AliasNotFound));
    }

    #[test]
    fn unknown_column_is_column_not_found() {
        let mut scope = QueryScope::new();
        scope.insert_relation("users", vec![("id".to_string(), ResolvedType::unknown())]);
        assert!(matches!(scope.lookup("users", "missing"), Lookup::ColumnNotFound));
    }

    #[test]
    fn unqualified_lookup_across_two_relations_is_ambiguous() {
        let mut scope = QueryScope::new();
        scope.insert_relation("users", vec![("id".to_string(), ResolvedType::unknown())]);
        scope.insert_relation("orders", vec![("id".to_string(), ResolvedType::unknown())]);
        assert!(matches!(scope.lookup("", "id"), Lookup::Ambiguous));
    }

    #[test]
    fn unqualified_lookup_with_one_match_resolves() {
        let mut scope = QueryScope::new();
        scope.insert_relation("users", vec![("name".to_string(), ResolvedType::unknown())]);
        scope.insert_relation("orders", vec![("id".to_string(), ResolvedType::unknown())]);
        assert!(matches!(scope.lookup("", "name"), Lookup::Ok(_)));
    }

    /// `SELECT id FROM users u WHERE id = ?`: `u` is an additional key
    /// pointing at the same relation as `users`, not a second relation —
    /// an unqualified `id` must resolve, not come back `Ambiguous`.
    #[test]
    fn unqualified_lookup_on_an_aliased_single_table_is_not_ambiguous() {
        let mut scope = QueryScope::new();
        scope.insert_relation("users", vec![("id".to_string(), ResolvedType::unknown())]);
        scope.alias_relation("users", "u");
        match scope.lookup("", "id") {
            Lookup::Ok(col) => assert_eq!(col.owner, "users"),
            _ => panic!("expected Ok"),
        }
    }
}
