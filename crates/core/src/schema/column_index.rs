//! Column index map.
//!
//! Maps uppercased `NAME` and `QUALIFIER.NAME` keys to offsets in a
//! concatenated row. A map is built once per pipeline stage from that
//! stage's columns and never mutated afterwards; offsets shift as tables
//! are joined, so every stage rebuilds its own map.

use crate::schema::ColumnInfo;
use hashbrown::HashMap;

/// Immutable lookup from column keys to row offsets.
#[derive(Clone, Debug, Default)]
pub struct ColumnIndexMap {
    map: HashMap<String, usize>,
    width: usize,
}

impl ColumnIndexMap {
    /// Builds the map for a row laid out as `columns`.
    ///
    /// When several columns share a key, the leftmost one keeps it.
    pub fn from_columns(columns: &[ColumnInfo]) -> Self {
        let mut map = HashMap::new();
        for (offset, col) in columns.iter().enumerate() {
            let names = core::iter::once(&col.name).chain(col.aliases.iter());
            for name in names {
                let upper = name.to_uppercase();
                for q in &col.qualifiers {
                    map.entry(format!("{}.{}", q, upper)).or_insert(offset);
                }
                map.entry(upper).or_insert(offset);
            }
        }
        Self {
            map,
            width: columns.len(),
        }
    }

    /// Resolves a column reference: `QUALIFIER.NAME` first, then bare `NAME`.
    pub fn resolve(&self, qualifier: Option<&str>, name: &str) -> Option<usize> {
        let upper = name.to_uppercase();
        if let Some(q) = qualifier {
            let key = format!("{}.{}", q.to_uppercase(), upper);
            if let Some(&offset) = self.map.get(&key) {
                return Some(offset);
            }
        }
        self.map.get(&upper).copied()
    }

    /// Resolves a column reference without the bare-name fallback: a
    /// qualified reference only matches a column carrying that qualifier.
    pub fn resolve_strict(&self, qualifier: Option<&str>, name: &str) -> Option<usize> {
        let upper = name.to_uppercase();
        let key = match qualifier {
            Some(q) => format!("{}.{}", q.to_uppercase(), upper),
            None => upper,
        };
        self.map.get(&key).copied()
    }

    /// Looks up a raw key, which must already be uppercased.
    #[inline]
    pub fn get(&self, key: &str) -> Option<usize> {
        self.map.get(key).copied()
    }

    /// Number of columns in the row this map addresses.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the map has no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnType;

    fn joined_columns() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo::new("id", ColumnType::Numeric).with_qualifiers(["T1"]),
            ColumnInfo::new("name", ColumnType::Text).with_qualifiers(["T1"]),
            ColumnInfo::new("id", ColumnType::Numeric).with_qualifiers(["o", "T2"]),
            ColumnInfo::new("total", ColumnType::Numeric).with_qualifiers(["o", "T2"]),
        ]
    }

    #[test]
    fn test_resolve_qualified_then_bare() {
        let map = ColumnIndexMap::from_columns(&joined_columns());
        assert_eq!(map.width(), 4);
        assert_eq!(map.resolve(Some("t1"), "id"), Some(0));
        assert_eq!(map.resolve(Some("o"), "ID"), Some(2));
        assert_eq!(map.resolve(Some("T2"), "id"), Some(2));
        assert_eq!(map.resolve(None, "total"), Some(3));
        // unknown qualifier falls back to the bare name
        assert_eq!(map.resolve(Some("x"), "total"), Some(3));
        assert_eq!(map.resolve(None, "missing"), None);
    }

    #[test]
    fn test_resolve_strict_rejects_unknown_qualifier() {
        let map = ColumnIndexMap::from_columns(&joined_columns());
        assert_eq!(map.resolve_strict(Some("o"), "total"), Some(3));
        assert_eq!(map.resolve_strict(Some("t1"), "ID"), Some(0));
        assert_eq!(map.resolve_strict(None, "id"), Some(0));
        assert_eq!(map.resolve_strict(Some("x"), "total"), None);
        assert_eq!(map.resolve_strict(Some("T1"), "total"), None);
    }

    #[test]
    fn test_leftmost_keeps_bare_name() {
        let map = ColumnIndexMap::from_columns(&joined_columns());
        assert_eq!(map.resolve(None, "id"), Some(0));
        assert_eq!(map.get("ID"), Some(0));
        assert_eq!(map.get("O.ID"), Some(2));
    }

    #[test]
    fn test_aliases_registered() {
        let cols = vec![
            ColumnInfo::new("name", ColumnType::Text),
            ColumnInfo::new("cnt", ColumnType::Numeric).with_alias("COUNT(*)"),
        ];
        let map = ColumnIndexMap::from_columns(&cols);
        assert_eq!(map.resolve(None, "count(*)"), Some(1));
        assert_eq!(map.resolve(None, "CNT"), Some(1));
    }

    #[test]
    fn test_empty() {
        let map = ColumnIndexMap::from_columns(&[]);
        assert!(map.is_empty());
        assert_eq!(map.width(), 0);
    }
}
