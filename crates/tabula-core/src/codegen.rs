//! Name to id lookups derived from a base schema, and their rendering as
//! enum source text.
//!
//! Output keeps the order tables and fields appear in the schema response:
//!
//! ```text
//! enum User {
//! 	name = "fld1",
//! 	age = "fld2"
//! }
//! ```

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::base::TableMeta;
use crate::ids::TableId;

/// Insertion-ordered map from a human name to an id.
///
/// Inserting an existing name replaces its id but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIdMap {
    entries: Vec<(String, String)>,
}

impl NameIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: impl Into<String>) {
        let name = name.into();
        let id = id.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = id,
            None => self.entries.push((name, id)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, id)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, id)| (name.as_str(), id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, I> FromIterator<(N, I)> for NameIdMap
where
    N: Into<String>,
    I: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (name, id) in iter {
            map.insert(name, id);
        }
        map
    }
}

impl Serialize for NameIdMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, id) in &self.entries {
            map.serialize_entry(name, id)?;
        }
        map.end()
    }
}

/// A table's name and id together with its field name to id map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNameIds {
    pub table_name: String,
    pub table_id: TableId,
    pub fields: NameIdMap,
}

impl From<&TableMeta> for TableNameIds {
    fn from(table: &TableMeta) -> Self {
        Self {
            table_name: table.name.clone(),
            table_id: table.id.clone(),
            fields: table
                .fields
                .iter()
                .map(|field| (field.name.as_str(), field.id.as_str()))
                .collect(),
        }
    }
}

/// Renders one table's fields as `enum <table> { <field> = "<id>", ... }`.
pub fn write_field_id_enum(table: &TableNameIds) -> String {
    write_enum(&table.table_name, table.fields.iter())
}

/// Renders a base's tables as `enum <base> { <table> = "<id>", ... }`.
pub fn write_tables_id_enum(base_name: &str, tables: &[TableNameIds]) -> String {
    write_enum(
        base_name,
        tables
            .iter()
            .map(|table| (table.table_name.as_str(), table.table_id.as_str())),
    )
}

fn write_enum<'a, I>(name: &str, entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let body = entries
        .into_iter()
        .map(|(key, value)| format!("\t{key} = \"{value}\""))
        .collect::<Vec<_>>()
        .join(",\n");

    format!("enum {name} {{\n{body}\n}}")
}
