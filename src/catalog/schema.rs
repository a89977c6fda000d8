use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The closed set of column types. The serialized names are the literal
/// type tags of the catalog document and the SQL grammar.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "DECIMAL")]
    Decimal,
    #[serde(rename = "BOOL")]
    Bool,
    #[serde(rename = "TIMESTAMP")]
    Timestamp,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Int => "INT",
            Self::String => "STRING",
            Self::Decimal => "DECIMAL",
            Self::Bool => "BOOL",
            Self::Timestamp => "TIMESTAMP",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_unique: bool,
    /// Owning table, stamped onto the column when a scan schema is built.
    /// Runtime only, never persisted.
    #[serde(skip)]
    pub table_name: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            is_primary: false,
            is_unique: false,
            table_name: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    #[serde(rename = "HASH")]
    Hash,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub column: String,
    pub kind: IndexKind,
    #[serde(default)]
    pub is_unique: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<IndexDef>,
}

impl Table {
    pub fn schema(&self) -> Schema {
        Schema::new(self.columns.clone())
    }
}

/// An ordered list of columns: the shape of the tuples an operator
/// produces. Column order is the serialization order.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolves a bare or dotted column name, case-insensitively. A dotted
    /// name only matches columns stamped with the owning table; the first
    /// matching column wins.
    pub fn find_column(&self, name: &str) -> Option<(usize, &Column)> {
        if name.contains('.') {
            self.columns.iter().enumerate().find(|(_, col)| {
                col.table_name.as_deref().map_or(false, |table| {
                    format!("{}.{}", table, col.name).eq_ignore_ascii_case(name)
                })
            })
        } else {
            self.columns
                .iter()
                .enumerate()
                .find(|(_, col)| col.name.eq_ignore_ascii_case(name))
        }
    }

    /// Returns a copy of the schema with every column stamped with its
    /// owning table, enabling "table.column" resolution.
    pub fn qualified(&self, table_name: &str) -> Schema {
        let columns = self
            .columns
            .iter()
            .cloned()
            .map(|mut col| {
                col.table_name = Some(table_name.to_owned());
                col
            })
            .collect();
        Schema::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, ColumnType, Schema};

    fn sample_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", ColumnType::Int).primary(),
            Column::new("email", ColumnType::String).unique(),
        ])
    }

    #[test]
    fn bare_names_resolve_case_insensitively() {
        let schema = sample_schema();
        let (idx, col) = schema.find_column("EMAIL").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(col.name, "email");
        assert!(schema.find_column("missing").is_none());
    }

    #[test]
    fn dotted_names_only_match_qualified_columns() {
        let schema = sample_schema();
        assert!(schema.find_column("users.id").is_none());

        let qualified = schema.qualified("users");
        let (idx, _) = qualified.find_column("Users.Id").unwrap();
        assert_eq!(idx, 0);
        assert!(qualified.find_column("orders.id").is_none());
    }
}
