//! Loaded, immutable tables.

use super::{ColumnInfo, TableId};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::ColumnType;
use crate::value::Cell;
use hashbrown::HashMap;

/// A table loaded into memory.
///
/// Cells are stored column-major: `data[column][row]`. Column names keep
/// their original casing for output and are indexed uppercased.
#[derive(Clone, Debug)]
pub struct Table {
    id: TableId,
    alias: Option<String>,
    column_names: Vec<String>,
    column_types: Vec<ColumnType>,
    data: Vec<Vec<Cell>>,
    row_count: usize,
    index: HashMap<String, usize>,
}

impl Table {
    /// Creates a table, validating that the header, type hints and column
    /// vectors agree with each other and with `row_count`.
    pub fn new(
        id: TableId,
        column_names: Vec<String>,
        column_types: Vec<ColumnType>,
        data: Vec<Vec<Cell>>,
        row_count: usize,
    ) -> Result<Self> {
        let name = id.to_string();
        if column_types.len() != column_names.len() {
            return Err(Error::invalid_table(
                name,
                format!(
                    "{} column names but {} type hints",
                    column_names.len(),
                    column_types.len()
                ),
            ));
        }
        if data.len() != column_names.len() {
            return Err(Error::invalid_table(
                name,
                format!(
                    "{} column names but {} data columns",
                    column_names.len(),
                    data.len()
                ),
            ));
        }
        if let Some((i, col)) = data.iter().enumerate().find(|(_, c)| c.len() != row_count) {
            return Err(Error::invalid_table(
                name,
                format!(
                    "column {} has {} cells, expected {}",
                    column_names[i],
                    col.len(),
                    row_count
                ),
            ));
        }

        let mut index = HashMap::with_capacity(column_names.len());
        for (i, col) in column_names.iter().enumerate() {
            if index.insert(col.to_uppercase(), i).is_some() {
                return Err(Error::invalid_table(
                    name,
                    format!("duplicate column name {}", col),
                ));
            }
        }

        Ok(Self {
            id,
            alias: None,
            column_names,
            column_types,
            data,
            row_count,
            index,
        })
    }

    /// Sets the alias the table is referenced by in a statement.
    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    /// Returns the table identifier.
    #[inline]
    pub fn id(&self) -> &TableId {
        &self.id
    }

    /// Returns the alias, if any.
    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns the column names in their original casing.
    #[inline]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Returns the column type hints.
    #[inline]
    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Finds a column by case-insensitive name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_uppercase()).copied()
    }

    /// Qualifiers the table's columns may be addressed with: the alias if
    /// present, then the table name.
    pub fn qualifiers(&self) -> Vec<String> {
        self.alias
            .iter()
            .map(|a| a.to_uppercase())
            .chain(core::iter::once(self.id.table().to_uppercase()))
            .collect()
    }

    /// Returns true if `qualifier` names this table.
    pub fn is_qualified_by(&self, qualifier: &str) -> bool {
        self.alias
            .as_deref()
            .is_some_and(|a| a.eq_ignore_ascii_case(qualifier))
            || self.id.table().eq_ignore_ascii_case(qualifier)
    }

    /// Column descriptors, qualified by this table's alias and name.
    pub fn column_infos(&self) -> Vec<ColumnInfo> {
        let qualifiers = self.qualifiers();
        self.column_names
            .iter()
            .zip(&self.column_types)
            .map(|(name, ty)| ColumnInfo::new(name.clone(), *ty).with_qualifiers(&qualifiers))
            .collect()
    }

    /// Reconstructs row `index`.
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.row_count {
            return None;
        }
        Some(Row::new(
            self.data.iter().map(|col| col[index].clone()).collect(),
        ))
    }

    /// Iterates over all rows in storage order.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.row_count).filter_map(move |i| self.row(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn people() -> Table {
        Table::new(
            TableId::new("SA", "T1"),
            vec!["id".into(), "Name".into()],
            vec![ColumnType::Numeric, ColumnType::Text],
            vec![cells(&["1", "2"]), cells(&["Alice", "Bob"])],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_table_accessors() {
        let table = people();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_index("NAME"), Some(1));
        assert_eq!(table.column_index("name"), Some(1));
        assert_eq!(table.column_names()[1], "Name");
        assert_eq!(table.row(1).unwrap().get(1), Some("Bob"));
        assert!(table.row(2).is_none());
        assert_eq!(table.rows().count(), 2);
    }

    #[test]
    fn test_qualifiers() {
        let table = people().with_alias(Some("p".into()));
        assert_eq!(table.qualifiers(), vec!["P".to_string(), "T1".to_string()]);
        assert!(table.is_qualified_by("t1"));
        assert!(table.is_qualified_by("P"));
        assert!(!table.is_qualified_by("T2"));

        let infos = table.column_infos();
        assert!(infos[0].matches(Some("p"), "ID"));
    }

    #[test]
    fn test_ragged_column_rejected() {
        let err = Table::new(
            TableId::new("SA", "T1"),
            vec!["a".into(), "b".into()],
            vec![ColumnType::Text, ColumnType::Text],
            vec![cells(&["1", "2"]), cells(&["x"])],
            2,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTable { .. }));
    }

    #[test]
    fn test_header_mismatch_rejected() {
        let err = Table::new(
            TableId::new("SA", "T1"),
            vec!["a".into(), "b".into()],
            vec![ColumnType::Text],
            vec![cells(&["1"]), cells(&["x"])],
            1,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTable { .. }));

        let err = Table::new(
            TableId::new("SA", "T1"),
            vec!["a".into()],
            vec![ColumnType::Text],
            vec![cells(&["1"]), cells(&["x"])],
            1,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTable { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Table::new(
            TableId::new("SA", "T1"),
            vec!["a".into(), "A".into()],
            vec![ColumnType::Text, ColumnType::Text],
            vec![vec![], vec![]],
            0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
