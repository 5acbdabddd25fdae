//! Repository Layer - Core Traits

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;

use crate::domain::{ChildProfile, DiaryEntry, Entity, Reminder, Task};
use crate::gateway::{OrderBy, Table};

/// An entity stored in a gateway table
pub trait Record: Entity + Serialize + DeserializeOwned {
    /// Backing table
    const TABLE: Table;

    /// Sort requested from the gateway when listing
    fn listing() -> OrderBy;

    /// Same ordering, applied locally after a mutation
    fn listing_cmp(&self, other: &Self) -> Ordering;
}

impl Record for Task {
    const TABLE: Table = Table::RoutineTasks;

    fn listing() -> OrderBy {
        OrderBy::asc("order")
    }

    fn listing_cmp(&self, other: &Self) -> Ordering {
        self.display_cmp(other)
    }
}

impl Record for ChildProfile {
    const TABLE: Table = Table::Children;

    fn listing() -> OrderBy {
        OrderBy::asc("nome_crianca")
    }

    fn listing_cmp(&self, other: &Self) -> Ordering {
        self.nome_crianca.cmp(&other.nome_crianca)
    }
}

impl Record for DiaryEntry {
    const TABLE: Table = Table::DiaryEntries;

    fn listing() -> OrderBy {
        OrderBy::desc("entry_date")
    }

    fn listing_cmp(&self, other: &Self) -> Ordering {
        other.entry_date.cmp(&self.entry_date)
    }
}

impl Record for Reminder {
    const TABLE: Table = Table::Reminders;

    fn listing() -> OrderBy {
        OrderBy::asc("reminder_time")
    }

    fn listing_cmp(&self, other: &Self) -> Ordering {
        self.reminder_time.cmp(&other.reminder_time)
    }
}
