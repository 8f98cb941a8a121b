//! Column descriptors of a relation.

use crate::types::ColumnType;

/// Describes one column of a (possibly joined or aggregated) relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Name with its original casing.
    pub name: String,
    /// Advisory type hint.
    pub column_type: ColumnType,
    /// Uppercased qualifiers the column may be addressed with (`ALIAS.NAME`).
    pub qualifiers: Vec<String>,
    /// Extra bare names, e.g. the display name of an aliased aggregate.
    pub aliases: Vec<String>,
}

impl ColumnInfo {
    /// Creates an unqualified column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            qualifiers: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Adds qualifiers; they are uppercased and deduplicated.
    pub fn with_qualifiers<I, S>(mut self, qualifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for q in qualifiers {
            let q = q.as_ref().to_uppercase();
            if !self.qualifiers.contains(&q) {
                self.qualifiers.push(q);
            }
        }
        self
    }

    /// Adds an extra bare name.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !alias.eq_ignore_ascii_case(&self.name) {
            self.aliases.push(alias);
        }
        self
    }

    /// Returns true if the column can be addressed by `qualifier` (if any)
    /// and `name`.
    pub fn matches(&self, qualifier: Option<&str>, name: &str) -> bool {
        let name_matches = self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name));
        match qualifier {
            None => name_matches,
            Some(q) => name_matches && self.has_qualifier(q),
        }
    }

    /// Returns true if `qualifier` is one of this column's qualifiers.
    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers
            .iter()
            .any(|q| q.eq_ignore_ascii_case(qualifier))
    }
}
