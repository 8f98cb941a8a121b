//! Row structure.
//!
//! A row is an ordered sequence of cells, one per column of the
//! concatenated schema it belongs to. Rows are values: joins and
//! aggregation build new rows by copying cells, never by pointing back
//! into a source table.

use crate::value::{Cell, Value};

/// A row of optional text cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Row {
    values: Vec<Cell>,
}

impl Row {
    /// Creates a row from cells.
    pub fn new(values: Vec<Cell>) -> Self {
        Self { values }
    }

    /// Creates a row of `width` Null cells.
    pub fn nulls(width: usize) -> Self {
        Self {
            values: vec![None; width],
        }
    }

    /// Creates a row from string slices; convenient in tests and fixtures.
    pub fn from_strs(values: &[Option<&str>]) -> Self {
        Self {
            values: values.iter().map(|v| v.map(str::to_string)).collect(),
        }
    }

    /// Returns the cells.
    #[inline]
    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    /// Consumes the row and returns its cells.
    #[inline]
    pub fn into_values(self) -> Vec<Cell> {
        self.values
    }

    /// Returns the number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the cell at `index` as a string slice. Out-of-range and Null
    /// cells both yield `None`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|c| c.as_deref())
    }

    /// Returns the cell at `index` as a value.
    pub fn value(&self, index: usize) -> Value {
        Value::from_cell(self.get(index))
    }

    /// Concatenates two rows, left cells first.
    pub fn concat(left: &Row, right: &Row) -> Row {
        let mut values = Vec::with_capacity(left.len() + right.len());
        values.extend_from_slice(&left.values);
        values.extend_from_slice(&right.values);
        Row { values }
    }

    /// Appends `width` Null cells after this row's cells.
    pub fn pad_right(&self, width: usize) -> Row {
        Row::concat(self, &Row::nulls(width))
    }

    /// Prepends `width` Null cells before this row's cells.
    pub fn pad_left(&self, width: usize) -> Row {
        Row::concat(&Row::nulls(width), self)
    }
}

impl From<Vec<Cell>> for Row {
    fn from(values: Vec<Cell>) -> Self {
        Row::new(values)
    }
}
