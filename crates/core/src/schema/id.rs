//! Two-part table identifiers.

use core::fmt;
use core::hash::{Hash, Hasher};

/// A `schema.table` identifier, compared case-insensitively.
///
/// For spreadsheet sources the schema is the workbook and the table is the
/// sheet.
#[derive(Clone, Debug)]
pub struct TableId {
    schema: String,
    table: String,
}

impl TableId {
    /// Creates an identifier from its two parts.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parses `schema.table` or a bare `table`.
    ///
    /// The text is split at the first dot, so a quoted identifier such as
    /// `"book.Sheet1"` yields schema `book` and table `Sheet1`. A bare name
    /// is placed in `default_schema`.
    pub fn parse(name: &str, default_schema: &str) -> Self {
        match name.split_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => {
                Self::new(schema, table)
            }
            _ => Self::new(default_schema, name),
        }
    }

    /// Builds an identifier from the parts of a (possibly qualified) name.
    ///
    /// One part is parsed with [`TableId::parse`]; with more parts, the last
    /// two are used.
    pub fn from_parts(parts: &[String], default_schema: &str) -> Option<Self> {
        match parts {
            [] => None,
            [single] => Some(Self::parse(single, default_schema)),
            [.., schema, table] => Some(Self::new(schema.clone(), table.clone())),
        }
    }

    /// Returns the schema part.
    #[inline]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the table part.
    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the normalized lookup key `SCHEMA.TABLE`.
    pub fn key(&self) -> String {
        format!(
            "{}.{}",
            self.schema.to_uppercase(),
            self.table.to_uppercase()
        )
    }
}

impl PartialEq for TableId {
    fn eq(&self, other: &Self) -> bool {
        self.schema.eq_ignore_ascii_case(&other.schema)
            && self.table.eq_ignore_ascii_case(&other.table)
    }
}

impl Eq for TableId {}

impl Hash for TableId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}
