use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use self::schema::{Column, IndexDef, Table};
use crate::error::{DbError, Result};

pub mod schema;

/// The serialized form of the catalog: for each table its name, ordered
/// columns and index definitions. Produced and consumed as a byte blob;
/// where the blob lives is the host's concern.
#[derive(Serialize, Deserialize)]
struct CatalogDoc {
    tables: HashMap<String, Table>,
}

/// The schema registry: table name to table definition, unique by name.
pub struct Catalog {
    tables: RwLock<HashMap<String, Table>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn create_table(&self, name: &str, columns: Vec<Column>) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        if tables.contains_key(name) {
            return Err(DbError::DuplicateTable(name.to_owned()));
        }
        tables.insert(
            name.to_owned(),
            Table {
                name: name.to_owned(),
                columns,
                indexes: Vec::new(),
            },
        );
        Ok(())
    }

    /// Registers an index definition. One index per column: a second
    /// definition for the same column is rejected, as is an unknown column.
    pub fn add_index(&self, table_name: &str, def: IndexDef) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| DbError::TableMissing(table_name.to_owned()))?;

        if !table.columns.iter().any(|col| col.name == def.column) {
            return Err(DbError::ColumnMissing(def.column));
        }
        if table.indexes.iter().any(|idx| idx.column == def.column) {
            return Err(DbError::DuplicateIndex(def.column));
        }

        table.indexes.push(def);
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Option<Table> {
        self.tables.read().unwrap().get(name).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().unwrap().keys().cloned().collect()
    }

    /// Marshals the catalog into its document form.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let tables = self.tables.read().unwrap();
        let doc = CatalogDoc {
            tables: tables.clone(),
        };
        Ok(serde_json::to_vec_pretty(&doc)?)
    }

    /// Replaces the in-memory catalog with the unmarshaled document.
    pub fn load_json(&self, bytes: &[u8]) -> Result<()> {
        let doc: CatalogDoc = serde_json::from_slice(bytes)?;
        *self.tables.write().unwrap() = doc.tables;
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
