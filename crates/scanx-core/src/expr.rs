//! # Table Identity and Predicates
//!
//! ## Table Identity
//! `TableId` is the backend-qualified reference to the table being scanned. It is
//! immutable for the lifetime of a plan and is one of the three fields of plan identity.
//!
//! ## Predicates
//! `Predicate` is the engine's native filter representation. The coordinator passes
//! predicates through unchanged: it never rewrites them, it only partitions a candidate
//! list into the subset the backend accepted and the residual the engine must re-apply.
//!
//! ## Filter Text
//! Predicates compile to backend filter text via [`Predicate::to_sql`]. The text is
//! used for plan identity only (see [`combine_filters`]), never for execution.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-qualified table reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableId {
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Literal value appearing in a predicate.
///
/// `Float64` is wrapped in `OrderedFloat` so predicates can derive `Eq` and `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(OrderedFloat<f64>),
    Utf8(String),
    /// Days since the Unix epoch.
    Date(i32),
}

impl ScalarValue {
    pub fn utf8(value: impl Into<String>) -> Self {
        ScalarValue::Utf8(value.into())
    }

    pub fn float64(value: f64) -> Self {
        ScalarValue::Float64(OrderedFloat(value))
    }

    /// Render as a backend SQL literal.
    pub fn to_sql(&self) -> String {
        match self {
            ScalarValue::Null => "NULL".to_string(),
            ScalarValue::Bool(true) => "TRUE".to_string(),
            ScalarValue::Bool(false) => "FALSE".to_string(),
            ScalarValue::Int64(v) => v.to_string(),
            ScalarValue::Float64(v) => v.0.to_string(),
            ScalarValue::Utf8(v) => quote(v),
            ScalarValue::Date(days) => format!("DATE_FROM_UNIX_DATE({})", days),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int64(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int64(i64::from(v))
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Utf8(v.to_string())
    }
}

/// The engine's native filter expression.
///
/// Leaf predicates name a single column; `And`, `Or` and `Not` combine them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    EqualTo { column: String, value: ScalarValue },
    /// Equality that treats two NULLs as equal.
    EqualNullSafe { column: String, value: ScalarValue },
    GreaterThan { column: String, value: ScalarValue },
    GreaterThanOrEqual { column: String, value: ScalarValue },
    LessThan { column: String, value: ScalarValue },
    LessThanOrEqual { column: String, value: ScalarValue },
    In { column: String, values: Vec<ScalarValue> },
    IsNull { column: String },
    IsNotNull { column: String },
    StringStartsWith { column: String, prefix: String },
    StringEndsWith { column: String, suffix: String },
    StringContains { column: String, needle: String },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn equal_to(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Predicate::EqualTo {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn gt(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Predicate::GreaterThan {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn lt(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Predicate::LessThan {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Predicate::IsNotNull {
            column: column.into(),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Column names referenced by this predicate, in first-seen order without duplicates.
    pub fn columns(&self) -> Vec<&str> {
        let mut cols = Vec::new();
        self.collect_columns(&mut cols);
        cols
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::EqualTo { column, .. }
            | Predicate::EqualNullSafe { column, .. }
            | Predicate::GreaterThan { column, .. }
            | Predicate::GreaterThanOrEqual { column, .. }
            | Predicate::LessThan { column, .. }
            | Predicate::LessThanOrEqual { column, .. }
            | Predicate::In { column, .. }
            | Predicate::IsNull { column }
            | Predicate::IsNotNull { column }
            | Predicate::StringStartsWith { column, .. }
            | Predicate::StringEndsWith { column, .. }
            | Predicate::StringContains { column, .. } => {
                if !out.contains(&column.as_str()) {
                    out.push(column);
                }
            }
            Predicate::And(l, r) | Predicate::Or(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
            Predicate::Not(inner) => inner.collect_columns(out),
        }
    }

    /// Compile into backend filter text.
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::EqualTo { column, value } => binary(column, "=", value),
            Predicate::EqualNullSafe { column, value } => {
                binary(column, "IS NOT DISTINCT FROM", value)
            }
            Predicate::GreaterThan { column, value } => binary(column, ">", value),
            Predicate::GreaterThanOrEqual { column, value } => binary(column, ">=", value),
            Predicate::LessThan { column, value } => binary(column, "<", value),
            Predicate::LessThanOrEqual { column, value } => binary(column, "<=", value),
            Predicate::In { column, values } => {
                let list: Vec<String> = values.iter().map(ScalarValue::to_sql).collect();
                format!("{} IN ({})", quote_ident(column), list.join(", "))
            }
            Predicate::IsNull { column } => format!("{} IS NULL", quote_ident(column)),
            Predicate::IsNotNull { column } => format!("{} IS NOT NULL", quote_ident(column)),
            Predicate::StringStartsWith { column, prefix } => {
                format!("{} LIKE {}", quote_ident(column), quote(&format!("{}%", prefix)))
            }
            Predicate::StringEndsWith { column, suffix } => {
                format!("{} LIKE {}", quote_ident(column), quote(&format!("%{}", suffix)))
            }
            Predicate::StringContains { column, needle } => {
                format!("{} LIKE {}", quote_ident(column), quote(&format!("%{}%", needle)))
            }
            Predicate::And(l, r) => format!("({}) AND ({})", l.to_sql(), r.to_sql()),
            Predicate::Or(l, r) => format!("({}) OR ({})", l.to_sql(), r.to_sql()),
            Predicate::Not(inner) => format!("(NOT ({}))", inner.to_sql()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn binary(column: &str, op: &str, value: &ScalarValue) -> String {
    format!("{} {} {}", quote_ident(column), op, value.to_sql())
}

fn quote_ident(column: &str) -> String {
    format!("`{}`", column.replace('`', "\\`"))
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Merge a global filter and a set of predicates into one filter text.
///
/// Each clause is parenthesised, duplicates are removed, and clauses are sorted so
/// the result does not depend on the order predicates were negotiated in. Returns
/// `None` when there is nothing to combine.
pub fn combine_filters<'a>(
    global: Option<&str>,
    predicates: impl IntoIterator<Item = &'a Predicate>,
) -> Option<String> {
    let mut clauses: Vec<String> = global
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(|g| format!("({})", g))
        .into_iter()
        .chain(predicates.into_iter().map(|p| format!("({})", p.to_sql())))
        .collect();

    if clauses.is_empty() {
        return None;
    }

    clauses.sort();
    clauses.dedup();
    Some(clauses.join(" AND "))
}
