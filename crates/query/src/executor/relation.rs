//! Relation type for query execution.
//!
//! A relation is the row set flowing between pipeline stages together with
//! the schema of its concatenated rows. Each relation owns a column index
//! map built for exactly that schema.

use cellsql_core::schema::{ColumnIndexMap, ColumnInfo, Table};
use cellsql_core::Row;

/// Rows plus the schema that addresses them.
#[derive(Clone, Debug)]
pub struct Relation {
    rows: Vec<Row>,
    columns: Vec<ColumnInfo>,
    /// Table names contributing columns, in join order.
    tables: Vec<String>,
    index: ColumnIndexMap,
}

impl Relation {
    /// Creates a relation from rows and their column layout.
    pub fn new(rows: Vec<Row>, columns: Vec<ColumnInfo>, tables: Vec<String>) -> Self {
        let index = ColumnIndexMap::from_columns(&columns);
        Self {
            rows,
            columns,
            tables,
            index,
        }
    }

    /// Reads every row of a loaded table.
    pub fn from_table(table: &Table) -> Self {
        Self::new(
            table.rows().collect(),
            table.column_infos(),
            vec![table.id().to_string()],
        )
    }

    /// Returns the rows.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes the relation and returns its rows.
    #[inline]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns the column descriptors.
    #[inline]
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Returns the tables contributing columns.
    #[inline]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Returns the column index map for this relation's rows.
    #[inline]
    pub fn index(&self) -> &ColumnIndexMap {
        &self.index
    }

    /// Number of columns per row.
    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keeps the rows for which `keep` returns true, given the relation's
    /// column index map.
    pub fn retain<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&ColumnIndexMap, &Row) -> bool,
    {
        let index = &self.index;
        self.rows.retain(|row| keep(index, row));
        self
    }

    /// Replaces the rows, keeping the schema.
    pub fn map_rows<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Vec<Row>) -> Vec<Row>,
    {
        self.rows = f(core::mem::take(&mut self.rows));
        self
    }

    /// Offsets of the columns addressable by `qualifier`.
    pub fn columns_qualified_by(&self, qualifier: &str) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.has_qualifier(qualifier))
            .map(|(i, _)| i)
            .collect()
    }
}
