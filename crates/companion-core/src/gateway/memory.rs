//! In-Memory Gateway
//!
//! Backend stand-in used by the offline demo mode and by tests. Enforces
//! the same owner/child filtering as the hosted backend, records every call,
//! and can be told to fail upcoming operations.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

use super::{
    compare_values, from_row, to_row, BatchOutcome, Deleted, Direction, Filter, Gateway, GatewayError,
    GatewayResult, OrderBy, Row, Table,
};

/// 2024-01-01T00:00:00Z; synthetic `created_at` values count up from here
const CREATED_AT_EPOCH: i64 = 1_704_067_200;

/// Gateway operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Query,
    Insert,
    Update,
    BatchUpdate,
    Delete,
}

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCall {
    pub operation: Operation,
    pub table: Table,
    /// Filter or scope the call carried
    pub scope: Filter,
    /// Row ids touched (written rows for writes, returned rows for queries)
    pub ids: Vec<String>,
    /// Patches sent by a batch update, in request order
    pub patches: Vec<(String, Row)>,
}

enum Injected {
    Fail(GatewayError),
    /// Write only the first `n` rows of the next batch
    PartialAfter(usize),
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<Table, Vec<Row>>,
    next_id: u64,
    injected: HashMap<Operation, VecDeque<Injected>>,
    calls: Vec<GatewayCall>,
}

impl MemoryState {
    fn take_injected(&mut self, op: Operation) -> Option<Injected> {
        self.injected.get_mut(&op).and_then(|queue| queue.pop_front())
    }

    fn allocate(&mut self, table: Table, row: &mut Row) {
        self.next_id += 1;
        let n = self.next_id;
        let id_column = table.id_column();
        if !matches!(row.get(id_column), Some(Value::String(_))) {
            row.insert(id_column.to_string(), Value::String(format!("mem-{:06}", n)));
        }
        if !matches!(row.get("created_at"), Some(Value::String(_))) {
            let stamp = Utc
                .timestamp_opt(CREATED_AT_EPOCH + n as i64, 0)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_default();
            row.insert("created_at".to_string(), Value::String(stamp));
        }
    }

    fn record(&mut self, operation: Operation, table: Table, scope: &Filter, ids: Vec<String>) {
        self.calls.push(GatewayCall {
            operation,
            table,
            scope: scope.clone(),
            ids,
            patches: Vec::new(),
        });
    }
}

fn row_id(table: Table, row: &Row) -> Option<String> {
    row.get(table.id_column()).and_then(Value::as_str).map(str::to_string)
}

/// In-process implementation of [`Gateway`]
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rows directly, assigning ids and timestamps where missing
    pub fn seed(&self, table: Table, rows: Vec<Row>) -> Vec<String> {
        let mut state = self.state.lock();
        let mut ids = Vec::with_capacity(rows.len());
        for mut row in rows {
            state.allocate(table, &mut row);
            ids.extend(row_id(table, &row));
            state.tables.entry(table).or_default().push(row);
        }
        ids
    }

    /// Serialize and store records directly
    pub fn seed_records<T: Serialize>(&self, table: Table, records: &[T]) -> GatewayResult<Vec<String>> {
        let rows = records.iter().map(to_row).collect::<GatewayResult<Vec<_>>>()?;
        Ok(self.seed(table, rows))
    }

    /// Durable rows of `table`, in storage order
    pub fn rows(&self, table: Table) -> Vec<Row> {
        self.state.lock().tables.get(&table).cloned().unwrap_or_default()
    }

    /// Durable rows of `table` decoded as `T`
    pub fn records<T: DeserializeOwned>(&self, table: Table) -> GatewayResult<Vec<T>> {
        self.rows(table).into_iter().map(from_row).collect()
    }

    /// Make the next `operation` fail with `error`
    pub fn fail_next(&self, operation: Operation, error: GatewayError) {
        self.state
            .lock()
            .injected
            .entry(operation)
            .or_default()
            .push_back(Injected::Fail(error));
    }

    /// Make the next batch update write only its first `applied` rows
    pub fn partial_next_batch(&self, applied: usize) {
        self.state
            .lock()
            .injected
            .entry(Operation::BatchUpdate)
            .or_default()
            .push_back(Injected::PartialAfter(applied));
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().calls.clone()
    }

    pub fn calls_of(&self, operation: Operation) -> Vec<GatewayCall> {
        self.calls().into_iter().filter(|c| c.operation == operation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

#[async_trait(?Send)]
impl Gateway for MemoryGateway {
    async fn query(&self, table: Table, filter: &Filter, order_by: Option<&OrderBy>) -> GatewayResult<Vec<Row>> {
        let mut state = self.state.lock();
        let injected = state.take_injected(Operation::Query);
        if let Some(Injected::Fail(error)) = injected {
            state.record(Operation::Query, table, filter, Vec::new());
            return Err(error);
        }

        let mut rows: Vec<Row> = state
            .tables
            .get(&table)
            .map(|rows| rows.iter().filter(|row| filter.matches(row)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order_by {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        let ids = rows.iter().filter_map(|row| row_id(table, row)).collect();
        state.record(Operation::Query, table, filter, ids);
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut record: Row) -> GatewayResult<Row> {
        let mut state = self.state.lock();
        let scope = Filter::new();
        if let Some(Injected::Fail(error)) = state.take_injected(Operation::Insert) {
            state.record(Operation::Insert, table, &scope, Vec::new());
            return Err(error);
        }
        if !matches!(record.get("user_id"), Some(Value::String(_))) {
            state.record(Operation::Insert, table, &scope, Vec::new());
            return Err(GatewayError::Rejected("row has no owner".to_string()));
        }

        state.allocate(table, &mut record);
        let ids = row_id(table, &record).into_iter().collect();
        state.record(Operation::Insert, table, &scope, ids);
        state.tables.entry(table).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(&self, table: Table, id: &str, mut patch: Row, scope: &Filter) -> GatewayResult<Option<Row>> {
        let mut state = self.state.lock();
        if let Some(Injected::Fail(error)) = state.take_injected(Operation::Update) {
            state.record(Operation::Update, table, scope, vec![id.to_string()]);
            return Err(error);
        }

        patch.remove(table.id_column());
        let id_column = table.id_column();
        let updated = state.tables.get_mut(&table).and_then(|rows| {
            rows.iter_mut()
                .find(|row| row.get(id_column).and_then(Value::as_str) == Some(id) && scope.matches(row))
                .map(|row| {
                    for (key, value) in patch {
                        row.insert(key, value);
                    }
                    row.clone()
                })
        });
        state.record(Operation::Update, table, scope, vec![id.to_string()]);
        Ok(updated)
    }

    async fn batch_update(&self, table: Table, updates: Vec<(String, Row)>, scope: &Filter) -> GatewayResult<BatchOutcome> {
        let mut state = self.state.lock();
        let ids: Vec<String> = updates.iter().map(|(id, _)| id.clone()).collect();
        let mut limit = usize::MAX;
        match state.take_injected(Operation::BatchUpdate) {
            Some(Injected::Fail(error)) => {
                state.record(Operation::BatchUpdate, table, scope, ids);
                if let Some(call) = state.calls.last_mut() {
                    call.patches = updates;
                }
                return Err(error);
            }
            Some(Injected::PartialAfter(n)) => limit = n,
            None => {}
        }

        let id_column = table.id_column();
        let mut applied = Vec::new();
        let mut failed = Vec::new();
        for (index, (id, patch)) in updates.iter().enumerate() {
            let target = if index < limit {
                state.tables.get_mut(&table).and_then(|rows| {
                    rows.iter_mut().find(|row| {
                        row.get(id_column).and_then(Value::as_str) == Some(id.as_str()) && scope.matches(row)
                    })
                })
            } else {
                None
            };
            match target {
                Some(row) => {
                    for (key, value) in patch.iter().filter(|(k, _)| k.as_str() != id_column) {
                        row.insert(key.clone(), value.clone());
                    }
                    applied.push(id.clone());
                }
                None => failed.push(id.clone()),
            }
        }

        state.record(Operation::BatchUpdate, table, scope, ids);
        if let Some(call) = state.calls.last_mut() {
            call.patches = updates;
        }
        if failed.is_empty() {
            Ok(BatchOutcome::Applied)
        } else {
            Ok(BatchOutcome::Partial { applied, failed })
        }
    }

    async fn delete(&self, table: Table, id: &str, scope: &Filter) -> GatewayResult<Deleted> {
        let mut state = self.state.lock();
        if let Some(Injected::Fail(error)) = state.take_injected(Operation::Delete) {
            state.record(Operation::Delete, table, scope, vec![id.to_string()]);
            return Err(error);
        }

        let id_column = table.id_column();
        let outcome = match state.tables.get_mut(&table) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|row| !(row.get(id_column).and_then(Value::as_str) == Some(id) && scope.matches(row)));
                if rows.len() < before { Deleted::Removed } else { Deleted::NotFound }
            }
            None => Deleted::NotFound,
        };
        state.record(Operation::Delete, table, scope, vec![id.to_string()]);
        Ok(outcome)
    }
}
