//! Persistence Gateway
//!
//! Contract for the remote tabular store plus its two implementations:
//! the HTTP client for the hosted backend and an in-process store.

mod memory;
mod rest;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;

pub use memory::{GatewayCall, MemoryGateway, Operation};
pub use rest::{encode_query, RestGateway};

/// A row as exchanged with the backend
pub type Row = serde_json::Map<String, Value>;

/// Common result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Shared handle used by scopes, stores and the controller
pub type SharedGateway = Arc<dyn Gateway>;

/// Gateway-level errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("not authorized")]
    Unauthorized,
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Remote tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Children,
    DiaryEntries,
    RoutineTasks,
    Reminders,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Children => "children",
            Table::DiaryEntries => "diary_entries",
            Table::RoutineTasks => "routine_tasks",
            Table::Reminders => "reminders",
        }
    }

    /// Primary key column
    pub fn id_column(&self) -> &'static str {
        match self {
            Table::Children => "child_id",
            _ => "id",
        }
    }
}

/// Conjunction of equality predicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value`
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push((column.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.predicates.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Value required for `column`, if the filter constrains it
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.predicates.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// True when every predicate holds for `row`
    pub fn matches(&self, row: &Row) -> bool {
        self.predicates
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-column sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), direction: Direction::Ascending }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), direction: Direction::Descending }
    }
}

/// Result of a batch update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every row was written
    Applied,
    /// Some rows were written and some were not
    Partial { applied: Vec<String>, failed: Vec<String> },
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deleted {
    Removed,
    NotFound,
}

/// Remote tabular store.
///
/// Futures are not required to be `Send`: the browser client runs on a
/// single thread.
#[async_trait(?Send)]
pub trait Gateway: Send + Sync {
    /// Rows of `table` matching `filter`, optionally sorted
    async fn query(&self, table: Table, filter: &Filter, order_by: Option<&OrderBy>) -> GatewayResult<Vec<Row>>;

    /// Insert a row; returns it with its assigned identifier
    async fn insert(&self, table: Table, record: Row) -> GatewayResult<Row>;

    /// Merge `patch` into the row `id` if it matches `scope`; `None` if no such row
    async fn update(&self, table: Table, id: &str, patch: Row, scope: &Filter) -> GatewayResult<Option<Row>>;

    /// Apply several patches, reporting rows that could not be written
    async fn batch_update(&self, table: Table, updates: Vec<(String, Row)>, scope: &Filter) -> GatewayResult<BatchOutcome>;

    /// Delete the row `id` if it matches `scope`
    async fn delete(&self, table: Table, id: &str, scope: &Filter) -> GatewayResult<Deleted>;

    /// Attach (or drop) the bearer token used for subsequent requests
    fn authorize(&self, _access_token: Option<String>) {}
}

/// Serialize a record into a row
pub fn to_row<T: Serialize>(record: &T) -> GatewayResult<Row> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(GatewayError::InvalidRecord(format!("expected an object, got {}", other))),
        Err(e) => Err(GatewayError::InvalidRecord(e.to_string())),
    }
}

/// Deserialize a row into a record
pub fn from_row<T: DeserializeOwned>(row: Row) -> GatewayResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Ordering used when sorting rows by a column: nulls first, then
/// booleans, numbers and strings by value
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
