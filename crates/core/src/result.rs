//! Query results handed to consumers.

use crate::row::Row;
use crate::types::ColumnType;
use crate::value::Cell;

/// The tabular outcome of one statement.
///
/// Cells are column-major: `columns[c][r]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    column_names: Vec<String>,
    column_types: Vec<ColumnType>,
    columns: Vec<Vec<Cell>>,
    row_count: usize,
}

impl QueryResult {
    /// Assembles a result from row-major output rows.
    pub fn from_rows(column_names: Vec<String>, column_types: Vec<ColumnType>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        let mut columns: Vec<Vec<Cell>> = (0..column_names.len())
            .map(|_| Vec::with_capacity(row_count))
            .collect();
        for row in rows {
            for (c, cell) in row.into_values().into_iter().enumerate() {
                if let Some(col) = columns.get_mut(c) {
                    col.push(cell);
                }
            }
        }
        Self {
            column_names,
            column_types,
            columns,
            row_count,
        }
    }

    /// Output column labels.
    #[inline]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Output column type hints.
    #[inline]
    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    /// Column-major cell matrix.
    #[inline]
    pub fn columns(&self) -> &[Vec<Cell>] {
        &self.columns
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    /// Returns the cell at (`row`, `col`) as a string slice.
    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        self.columns.get(col)?.get(row)?.as_deref()
    }

    /// Reassembles row `index`.
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.row_count {
            return None;
        }
        Some(Row::new(
            self.columns.iter().map(|col| col[index].clone()).collect(),
        ))
    }

    /// Reassembles all rows in order.
    pub fn rows(&self) -> Vec<Row> {
        (0..self.row_count).filter_map(|i| self.row(i)).collect()
    }
}
