//! Table loading.
//!
//! Tables come from an external [`DataProvider`]; the [`TableLoader`] pulls a
//! table's header, type hints and cells into an immutable [`Table`].

use cellsql_core::schema::{Table, TableId};
use cellsql_core::{Cell, ColumnType, Error, Result};
use hashbrown::HashMap;
use tracing::debug;

/// Source of tabular data, such as a folder of spreadsheet files.
///
/// Every method fails with [`Error::TableNotFound`] for unknown tables.
/// Implementations used from several threads must allow concurrent reads.
pub trait DataProvider {
    /// Column names in their original casing.
    fn column_names(&self, table: &TableId) -> Result<Vec<String>>;

    /// Column type hints, one per column.
    fn column_types(&self, table: &TableId) -> Result<Vec<ColumnType>>;

    /// Cells, column-major: one vector per column.
    fn row_matrix(&self, table: &TableId) -> Result<Vec<Vec<Cell>>>;

    /// Number of rows.
    fn row_count(&self, table: &TableId) -> Result<usize>;
}

impl<P: DataProvider + ?Sized> DataProvider for &P {
    fn column_names(&self, table: &TableId) -> Result<Vec<String>> {
        (**self).column_names(table)
    }

    fn column_types(&self, table: &TableId) -> Result<Vec<ColumnType>> {
        (**self).column_types(table)
    }

    fn row_matrix(&self, table: &TableId) -> Result<Vec<Vec<Cell>>> {
        (**self).row_matrix(table)
    }

    fn row_count(&self, table: &TableId) -> Result<usize> {
        (**self).row_count(table)
    }
}

/// Loads tables from a provider, one fresh copy per call.
pub struct TableLoader<'a, P: DataProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: DataProvider + ?Sized> TableLoader<'a, P> {
    /// Creates a loader over `provider`.
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Loads a table, validating the provider's output.
    pub fn load(&self, id: &TableId) -> Result<Table> {
        let names = self.provider.column_names(id)?;
        let types = self.provider.column_types(id)?;
        let matrix = self.provider.row_matrix(id)?;
        let row_count = self.provider.row_count(id)?;
        let table = Table::new(id.clone(), names, types, matrix, row_count)?;
        debug!(
            table = %id,
            rows = table.row_count(),
            columns = table.column_count(),
            "loaded table"
        );
        Ok(table)
    }
}

#[derive(Clone, Debug)]
struct TableData {
    names: Vec<String>,
    types: Vec<ColumnType>,
    columns: Vec<Vec<Cell>>,
    row_count: usize,
}

/// A [`DataProvider`] over tables held in memory.
///
/// Lookups are case-insensitive. The provider is `Send + Sync` and only
/// read during queries, so it can serve several threads at once.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDataProvider {
    tables: HashMap<String, TableData>,
}

impl InMemoryDataProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a table given row-major rows.
    ///
    /// Rows are stored as given; ragged input is kept so that loading it
    /// reports [`Error::InvalidTable`].
    pub fn add_table<S: AsRef<str>>(
        &mut self,
        id: TableId,
        columns: &[(S, ColumnType)],
        rows: Vec<Vec<Cell>>,
    ) {
        let row_count = rows.len();
        let mut matrix: Vec<Vec<Cell>> = vec![Vec::with_capacity(row_count); columns.len()];
        for row in rows {
            for (c, cell) in row.into_iter().enumerate() {
                match matrix.get_mut(c) {
                    Some(col) => col.push(cell),
                    None => matrix.push(vec![cell]),
                }
            }
        }
        self.add_columns(
            id,
            columns.iter().map(|(n, _)| n.as_ref().to_string()).collect(),
            columns.iter().map(|(_, t)| *t).collect(),
            matrix,
            row_count,
        );
    }

    /// Adds or replaces a table given column-major data.
    pub fn add_columns(
        &mut self,
        id: TableId,
        names: Vec<String>,
        types: Vec<ColumnType>,
        columns: Vec<Vec<Cell>>,
        row_count: usize,
    ) {
        self.tables.insert(
            id.key(),
            TableData {
                names,
                types,
                columns,
                row_count,
            },
        );
    }

    /// Removes a table. Returns true if it existed.
    pub fn remove_table(&mut self, id: &TableId) -> bool {
        self.tables.remove(&id.key()).is_some()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no table has been added.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn table(&self, id: &TableId) -> Result<&TableData> {
        self.tables
            .get(&id.key())
            .ok_or_else(|| Error::table_not_found(id.to_string()))
    }
}

impl DataProvider for InMemoryDataProvider {
    fn column_names(&self, table: &TableId) -> Result<Vec<String>> {
        Ok(self.table(table)?.names.clone())
    }

    fn column_types(&self, table: &TableId) -> Result<Vec<ColumnType>> {
        Ok(self.table(table)?.types.clone())
    }

    fn row_matrix(&self, table: &TableId) -> Result<Vec<Vec<Cell>>> {
        Ok(self.table(table)?.columns.clone())
    }

    fn row_count(&self, table: &TableId) -> Result<usize> {
        Ok(self.table(table)?.row_count)
    }
}
