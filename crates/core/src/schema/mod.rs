//! Schema types: table identifiers, column descriptors, loaded tables and
//! the column index map used to address cells of concatenated rows.

mod column;
mod column_index;
mod id;
mod table;

pub use column::ColumnInfo;
pub use column_index::ColumnIndexMap;
pub use id::TableId;
pub use table::Table;
