//! Expression evaluation against a single row.
//!
//! One evaluator serves WHERE, HAVING, projection expressions and ORDER BY
//! keys. Evaluation never fails: unresolvable columns, non-numeric
//! arithmetic operands and division by zero all produce `Value::Null`.
//! Logical operators follow three-valued logic; callers filtering rows use
//! [`ExpressionEvaluator::matches`], which treats Null as false.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use cellsql_core::pattern_match::like;
use cellsql_core::schema::ColumnIndexMap;
use cellsql_core::{compare_values, round_to_scale, Decimal, Row, Value};
use core::cmp::Ordering;
use tracing::trace;

/// Default number of fractional digits kept by division.
pub const DEFAULT_DECIMAL_SCALE: u32 = 10;

/// Evaluates expressions over rows laid out as described by a column index
/// map.
#[derive(Clone, Copy, Debug)]
pub struct ExpressionEvaluator<'a> {
    index: &'a ColumnIndexMap,
    scale: u32,
}

impl<'a> ExpressionEvaluator<'a> {
    /// Creates an evaluator for rows addressed by `index`.
    pub fn new(index: &'a ColumnIndexMap) -> Self {
        Self {
            index,
            scale: DEFAULT_DECIMAL_SCALE,
        }
    }

    /// Sets the scale used when dividing.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Returns true only if the expression evaluates to true.
    pub fn matches(&self, expr: &Expr, row: &Row) -> bool {
        self.evaluate(expr, row).truth() == Some(true)
    }

    /// Evaluates an expression.
    pub fn evaluate(&self, expr: &Expr, row: &Row) -> Value {
        match expr {
            Expr::Column(col) => match self.index.resolve(col.table.as_deref(), &col.column) {
                Some(i) => row.value(i),
                None => Value::Null,
            },
            Expr::Literal(v) => v.clone(),
            Expr::BinaryOp { left, op, right } => match op {
                BinaryOp::And => self.eval_and(left, right, row),
                BinaryOp::Or => self.eval_or(left, right, row),
                _ => {
                    let l = self.evaluate(left, row);
                    let r = self.evaluate(right, row);
                    self.eval_binary_op(*op, &l, &r)
                }
            },
            Expr::UnaryOp { op, expr } => {
                let v = self.evaluate(expr, row);
                match op {
                    UnaryOp::Not => match v.truth() {
                        Some(b) => Value::Boolean(!b),
                        None => Value::Null,
                    },
                    UnaryOp::Neg => match v.as_number() {
                        Some(n) => Value::Number(-n),
                        None => Value::Null,
                    },
                }
            }
            Expr::Function { name, args } => self.eval_function(name, args, row),
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let v = self.evaluate(expr, row);
                let lo = self.evaluate(low, row);
                let hi = self.evaluate(high, row);
                let above = compare_values(&v, &lo).map(|o| o != Ordering::Less);
                let below = compare_values(&v, &hi).map(|o| o != Ordering::Greater);
                negate_if(and3(above, below), *negated)
            }
            Expr::In {
                expr,
                list,
                negated,
            } => {
                let v = self.evaluate(expr, row);
                if v.is_null() {
                    return Value::Null;
                }
                let mut saw_null = false;
                for item in list {
                    match compare_values(&v, &self.evaluate(item, row)) {
                        Some(Ordering::Equal) => return Value::Boolean(!*negated),
                        None => saw_null = true,
                        Some(_) => {}
                    }
                }
                if saw_null {
                    Value::Null
                } else {
                    Value::Boolean(*negated)
                }
            }
            Expr::Like {
                expr,
                pattern,
                negated,
            } => {
                let v = self.evaluate(expr, row).to_text();
                let p = self.evaluate(pattern, row).to_text();
                match (v, p) {
                    (Some(v), Some(p)) => Value::Boolean(like(&v, &p) != *negated),
                    _ => Value::Null,
                }
            }
            Expr::IsNull { expr, negated } => {
                Value::Boolean(self.evaluate(expr, row).is_null() != *negated)
            }
        }
    }

    fn eval_and(&self, left: &Expr, right: &Expr, row: &Row) -> Value {
        let l = self.evaluate(left, row).truth();
        if l == Some(false) {
            return Value::Boolean(false);
        }
        let r = self.evaluate(right, row).truth();
        to_value(and3(l, r))
    }

    fn eval_or(&self, left: &Expr, right: &Expr, row: &Row) -> Value {
        let l = self.evaluate(left, row).truth();
        if l == Some(true) {
            return Value::Boolean(true);
        }
        let r = self.evaluate(right, row).truth();
        match (l, r) {
            (_, Some(true)) => Value::Boolean(true),
            (Some(false), Some(false)) => Value::Boolean(false),
            _ => Value::Null,
        }
    }

    fn eval_binary_op(&self, op: BinaryOp, left: &Value, right: &Value) -> Value {
        if op == BinaryOp::Concat {
            // NULL operands concatenate as empty text
            let mut s = left.to_text().unwrap_or_default();
            s.push_str(&right.to_text().unwrap_or_default());
            return Value::Text(s);
        }

        if op.is_comparison() {
            return match compare_values(left, right) {
                None => Value::Null,
                Some(ord) => Value::Boolean(match op {
                    BinaryOp::Eq => ord == Ordering::Equal,
                    BinaryOp::Ne => ord != Ordering::Equal,
                    BinaryOp::Lt => ord == Ordering::Less,
                    BinaryOp::Le => ord != Ordering::Greater,
                    BinaryOp::Gt => ord == Ordering::Greater,
                    BinaryOp::Ge => ord != Ordering::Less,
                    _ => return Value::Null,
                }),
            };
        }

        let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
            return Value::Null;
        };
        let result = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div if b.is_zero() => None,
            BinaryOp::Div => a.checked_div(b).map(|q| round_to_scale(q, self.scale)),
            BinaryOp::Mod if b.is_zero() => None,
            BinaryOp::Mod => a.checked_rem(b),
            _ => None,
        };
        result.map(Value::Number).unwrap_or(Value::Null)
    }

    fn eval_function(&self, name: &str, args: &[Expr], row: &Row) -> Value {
        let values: Vec<Value> = args.iter().map(|a| self.evaluate(a, row)).collect();
        match (name, values.as_slice()) {
            ("UPPER" | "UCASE", [v]) => map_text(v, |s| s.to_uppercase()),
            ("LOWER" | "LCASE", [v]) => map_text(v, |s| s.to_lowercase()),
            ("TRIM", [v]) => map_text(v, |s| s.trim().to_string()),
            ("LENGTH" | "CHAR_LENGTH" | "CHARACTER_LENGTH", [v]) => {
                let len = v.to_text().map(|s| s.chars().count()).unwrap_or(0);
                Value::Number(Decimal::from(len as u64))
            }
            (
                "UPPER" | "UCASE" | "LOWER" | "LCASE" | "TRIM" | "LENGTH" | "CHAR_LENGTH"
                | "CHARACTER_LENGTH",
                _,
            ) => Value::Null,
            (_, []) => Value::Null,
            (_, [first, ..]) => {
                trace!(function = name, "unknown function, returning first argument");
                first.clone()
            }
        }
    }
}

/// Evaluates `expr` against `row` with default settings.
pub fn evaluate(expr: &Expr, row: &Row, index: &ColumnIndexMap) -> Value {
    ExpressionEvaluator::new(index).evaluate(expr, row)
}

fn map_text(v: &Value, f: impl FnOnce(&str) -> String) -> Value {
    match v.to_text() {
        Some(s) => Value::Text(f(&s)),
        None => Value::Null,
    }
}

fn and3(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn negate_if(v: Option<bool>, negated: bool) -> Value {
    to_value(v.map(|b| b != negated))
}

fn to_value(v: Option<bool>) -> Value {
    match v {
        Some(b) => Value::Boolean(b),
        None => Value::Null,
    }
}
