//! Runtime values and the comparison model.
//!
//! Table cells are raw text (`Cell = Option<String>`, `None` is SQL NULL).
//! Expressions evaluate to a [`Value`], which adds numbers and booleans on
//! top of text. Two operands compare numerically when both parse as
//! decimals and lexically otherwise.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use rust_decimal::{Decimal, RoundingStrategy};

/// A single table cell. `None` denotes SQL NULL.
pub type Cell = Option<String>;

/// A value produced by expression evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Decimal number
    Number(Decimal),
    /// Text, usually a raw cell
    Text(String),
    /// Boolean, produced by comparisons and predicates
    Boolean(bool),
}

impl Value {
    /// Wraps a cell as a value without coercion.
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell {
            Some(s) => Value::Text(s.to_string()),
            None => Value::Null,
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the numeric interpretation of this value, if any.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
            Value::Null | Value::Boolean(_) => None,
        }
    }

    /// Returns the textual form of this value, or None for Null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Converts this value into a table cell.
    pub fn into_cell(self) -> Cell {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    /// Three-valued truthiness. `None` means unknown.
    pub fn truth(&self) -> Option<bool> {
        match self {
            Value::Null => None,
            Value::Boolean(b) => Some(*b),
            Value::Number(n) => Some(!n.is_zero()),
            Value::Text(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else if let Some(n) = parse_number(s) {
                    Some(!n.is_zero())
                } else {
                    Some(!s.is_empty())
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Parses text as a decimal number.
///
/// Accepts plain (`-3.50`) and scientific (`1e3`) notation. Surrounding
/// whitespace and digit separators are not accepted.
pub fn parse_number(s: &str) -> Option<Decimal> {
    if s.is_empty() || s.contains('_') || s.trim().len() != s.len() {
        return None;
    }
    if let Ok(n) = Decimal::from_str(s) {
        return Some(n);
    }
    if s.contains(['e', 'E']) {
        return Decimal::from_scientific(s).ok();
    }
    None
}

/// Rounds a decimal to `scale` fractional digits, half away from zero, and
/// drops trailing zeros.
pub fn round_to_scale(n: Decimal, scale: u32) -> Decimal {
    n.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Compares two non-null texts: numerically if both parse, lexically otherwise.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Compares two values with three-valued semantics.
///
/// Returns `None` when either side is Null.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => {
            let left = a.to_text()?;
            let right = b.to_text()?;
            Some(left.cmp(&right))
        }
    }
}

/// Total order over cells used by sorting and MIN/MAX. Null sorts first.
pub fn compare_cells(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_text(x, y),
    }
}

/// Total order over values used for sort keys. Null sorts first.
pub fn compare_sort_keys(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}
