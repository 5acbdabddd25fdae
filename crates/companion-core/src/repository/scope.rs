//! Scoped Repositories
//!
//! Every gateway call made by the stores goes through one of these scopes,
//! which carry the owner (and child) identifiers: filters are built here and
//! inserted rows are stamped here, so no call can leave them out.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::traits::Record;
use crate::gateway::{from_row, to_row, BatchOutcome, Deleted, Filter, GatewayResult, Row, SharedGateway};

async fn list_in<T: Record>(gateway: &SharedGateway, filter: &Filter) -> GatewayResult<Vec<T>> {
    let rows = gateway.query(T::TABLE, filter, Some(&T::listing())).await?;
    rows.into_iter()
        .filter(|row| {
            let visible = filter.matches(row);
            if !visible {
                log::warn!("[SCOPE] dropping out-of-scope row from {}", T::TABLE.as_str());
            }
            visible
        })
        .map(from_row)
        .collect()
}

async fn insert_in<T: Record, N: Serialize>(gateway: &SharedGateway, filter: &Filter, new: &N) -> GatewayResult<T> {
    let mut row = to_row(new)?;
    for (column, value) in filter.iter() {
        row.insert(column.to_string(), value.clone());
    }
    from_row(gateway.insert(T::TABLE, row).await?)
}

async fn update_in<T: Record, P: Serialize>(
    gateway: &SharedGateway,
    filter: &Filter,
    id: &str,
    patch: &P,
) -> GatewayResult<Option<T>> {
    let mut row = to_row(patch)?;
    // Ownership columns are never rewritten through a patch
    for (column, _) in filter.iter() {
        row.remove(column);
    }
    match gateway.update(T::TABLE, id, row, filter).await? {
        Some(row) => Ok(Some(from_row(row)?)),
        None => Ok(None),
    }
}

/// Access to rows owned by one authenticated user
#[derive(Clone)]
pub struct OwnerScope {
    gateway: SharedGateway,
    owner_id: String,
}

impl fmt::Debug for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerScope").field("owner_id", &self.owner_id).finish()
    }
}

impl OwnerScope {
    pub fn new(gateway: SharedGateway, owner_id: impl Into<String>) -> Self {
        Self { gateway, owner_id: owner_id.into() }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn filter(&self) -> Filter {
        Filter::new().eq("user_id", self.owner_id.as_str())
    }

    /// Narrow to one child profile
    pub fn child(&self, child_id: impl Into<String>) -> ChildScope {
        ChildScope { owner: self.clone(), child_id: child_id.into() }
    }

    pub async fn list<T: Record>(&self) -> GatewayResult<Vec<T>> {
        list_in(&self.gateway, &self.filter()).await
    }

    pub async fn insert<T: Record, N: Serialize>(&self, new: &N) -> GatewayResult<T> {
        insert_in(&self.gateway, &self.filter(), new).await
    }

    pub async fn update<T: Record, P: Serialize>(&self, id: &str, patch: &P) -> GatewayResult<Option<T>> {
        update_in(&self.gateway, &self.filter(), id, patch).await
    }

    pub async fn delete<T: Record>(&self, id: &str) -> GatewayResult<Deleted> {
        self.gateway.delete(T::TABLE, id, &self.filter()).await
    }
}

/// Access to rows owned by one user and belonging to one child profile
#[derive(Clone)]
pub struct ChildScope {
    owner: OwnerScope,
    child_id: String,
}

impl fmt::Debug for ChildScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildScope")
            .field("owner_id", &self.owner.owner_id)
            .field("child_id", &self.child_id)
            .finish()
    }
}

impl ChildScope {
    pub fn owner_id(&self) -> &str {
        self.owner.owner_id()
    }

    pub fn child_id(&self) -> &str {
        &self.child_id
    }

    pub fn filter(&self) -> Filter {
        self.owner.filter().eq("child_id", self.child_id.as_str())
    }

    pub async fn list<T: Record>(&self) -> GatewayResult<Vec<T>> {
        list_in(&self.owner.gateway, &self.filter()).await
    }

    pub async fn insert<T: Record, N: Serialize>(&self, new: &N) -> GatewayResult<T> {
        insert_in(&self.owner.gateway, &self.filter(), new).await
    }

    pub async fn update<T: Record, P: Serialize>(&self, id: &str, patch: &P) -> GatewayResult<Option<T>> {
        update_in(&self.owner.gateway, &self.filter(), id, patch).await
    }

    /// Write one column for many rows in a single request
    pub async fn batch_set<T: Record>(&self, column: &str, values: Vec<(String, Value)>) -> GatewayResult<BatchOutcome> {
        let updates = values
            .into_iter()
            .map(|(id, value)| {
                let mut patch = Row::new();
                patch.insert(column.to_string(), value);
                (id, patch)
            })
            .collect();
        self.owner.gateway.batch_update(T::TABLE, updates, &self.filter()).await
    }

    pub async fn delete<T: Record>(&self, id: &str) -> GatewayResult<Deleted> {
        self.owner.gateway.delete(T::TABLE, id, &self.filter()).await
    }
}
