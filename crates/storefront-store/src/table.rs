//! Generic table capability shared by every backend.
//!
//! Rows are plain JSON objects. Every table carries an integer `id`
//! column assigned by the store on insert.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

use crate::error::Result;

pub type Row = serde_json::Map<String, Value>;

pub mod tables {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const LABELS: &str = "labels";
    pub const PRODUCT_SPECS: &str = "product_specs";
    pub const PRODUCT_LABELS: &str = "product_labels";
    pub const PRODUCT_RECOMMENDATIONS: &str = "product_recommendations";
    pub const USER_VIEWS: &str = "user_views";
    pub const USER_PURCHASES: &str = "user_purchases";
    pub const CHAT_HISTORY: &str = "chat_history";

    pub const ALL: &[&str] = &[
        PRODUCTS,
        CATEGORIES,
        LABELS,
        PRODUCT_SPECS,
        PRODUCT_LABELS,
        PRODUCT_RECOMMENDATIONS,
        USER_VIEWS,
        USER_PURCHASES,
        CHAT_HISTORY,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    In(String, Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

/// Row selection: conjunction of conditions plus optional ordering and limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Filter {
    /// Matches every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(column.into(), value.into()));
        self
    }

    /// Membership test; an empty list matches nothing
    pub fn in_<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions.push(Condition::In(column.into(), values));
        self
    }

    pub fn order(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(OrderBy { column: column.into(), descending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn by_id(id: i64) -> Self {
        Self::all().eq("id", id)
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(column, expected) => row
                .get(column)
                .map(|actual| values_equal(actual, expected))
                .unwrap_or(expected.is_null()),
            Condition::In(column, candidates) => row
                .get(column)
                .map(|actual| candidates.iter().any(|c| values_equal(actual, c)))
                .unwrap_or(false),
        })
    }

    /// Sort and truncate rows that already passed `matches`
    pub fn arrange(&self, rows: &mut Vec<Row>) {
        if let Some(order) = &self.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
    }
}

/// Equality with numeric normalisation so that `3` matches `3.0`
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order used for sorting: null < bool < number < string < other
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Row-level persistence capability.
///
/// Writes return the rows as stored, including the assigned `id`.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>>;

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>>;

    /// Insert or update keyed on the `conflict` columns. The existing `id`
    /// is kept when a row with the same key is already present.
    async fn upsert(&self, table: &str, rows: Vec<Row>, conflict: &[&str]) -> Result<Vec<Row>>;

    async fn update(&self, table: &str, patch: Row, filter: &Filter) -> Result<Vec<Row>>;

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>>;

    /// Check that the backend answers
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Serialize a typed value into a row
pub fn to_row<T: serde::Serialize>(value: &T) -> Result<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(crate::error::StoreError::Internal(format!(
            "expected an object row, got {other}"
        ))),
    }
}

/// Deserialize a row into a typed value
pub fn from_row<T: serde::de::DeserializeOwned>(row: Row) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

pub fn from_rows<T: serde::de::DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}
