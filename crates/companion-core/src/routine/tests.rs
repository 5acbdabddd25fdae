//! Task List Controller Tests
//!
//! Exercised against the in-memory gateway; `PausingGateway` holds chosen
//! operations until the test releases them so overlapping gestures can be
//! interleaved deterministically.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::{FailureCause, Phase, TaskListController, TaskListError};
use crate::domain::{NewTask, Task};
use crate::gateway::{
    BatchOutcome, Deleted, Filter, Gateway, GatewayError, GatewayResult, MemoryGateway, Operation, OrderBy, Row,
    SharedGateway, Table,
};
use crate::repository::OwnerScope;

/// Memory gateway whose paused operations wait for a permit
struct PausingGateway {
    inner: Arc<MemoryGateway>,
    paused: Mutex<HashSet<Operation>>,
    gate: Semaphore,
}

impl PausingGateway {
    fn new(inner: Arc<MemoryGateway>) -> Self {
        Self { inner, paused: Mutex::new(HashSet::new()), gate: Semaphore::new(0) }
    }

    fn pause(&self, operation: Operation) {
        self.paused.lock().insert(operation);
    }

    fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }

    async fn wait(&self, operation: Operation) {
        if self.paused.lock().contains(&operation) {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait(?Send)]
impl Gateway for PausingGateway {
    async fn query(&self, table: Table, filter: &Filter, order_by: Option<&OrderBy>) -> GatewayResult<Vec<Row>> {
        self.wait(Operation::Query).await;
        self.inner.query(table, filter, order_by).await
    }

    async fn insert(&self, table: Table, record: Row) -> GatewayResult<Row> {
        self.wait(Operation::Insert).await;
        self.inner.insert(table, record).await
    }

    async fn update(&self, table: Table, id: &str, patch: Row, scope: &Filter) -> GatewayResult<Option<Row>> {
        self.wait(Operation::Update).await;
        self.inner.update(table, id, patch, scope).await
    }

    async fn batch_update(&self, table: Table, updates: Vec<(String, Row)>, scope: &Filter) -> GatewayResult<BatchOutcome> {
        self.wait(Operation::BatchUpdate).await;
        self.inner.batch_update(table, updates, scope).await
    }

    async fn delete(&self, table: Table, id: &str, scope: &Filter) -> GatewayResult<Deleted> {
        self.wait(Operation::Delete).await;
        self.inner.delete(table, id, scope).await
    }
}

fn offline() -> GatewayError {
    GatewayError::Network("offline".to_string())
}

/// Store tasks for `u1`/`child_id` with orders 0, 1, 2, ...
async fn seed(memory: &Arc<MemoryGateway>, child_id: &str, descriptions: &[&str]) -> Vec<Task> {
    let scope = OwnerScope::new(memory.clone(), "u1").child(child_id);
    let mut tasks = Vec::new();
    for (i, description) in descriptions.iter().enumerate() {
        tasks.push(scope.insert::<Task, _>(&NewTask::new(*description, i as i32)).await.unwrap());
    }
    tasks
}

/// Controller signed in as `u1` with `c1` loaded
async fn setup(descriptions: &[&str]) -> (Arc<MemoryGateway>, TaskListController, Vec<Task>) {
    let memory = Arc::new(MemoryGateway::new());
    let tasks = seed(&memory, "c1", descriptions).await;
    let gateway: SharedGateway = memory.clone();
    let controller = TaskListController::new(gateway);
    controller.set_owner(Some("u1"));
    controller.load("c1").await.unwrap();
    memory.clear_calls();
    (memory, controller, tasks)
}

/// Same as `setup`, with every call going through a `PausingGateway`
async fn pausing_setup(
    descriptions: &[&str],
) -> (Arc<MemoryGateway>, Arc<PausingGateway>, TaskListController, Vec<Task>) {
    let memory = Arc::new(MemoryGateway::new());
    let tasks = seed(&memory, "c1", descriptions).await;
    let pausing = Arc::new(PausingGateway::new(memory.clone()));
    let controller = TaskListController::new(pausing.clone());
    controller.set_owner(Some("u1"));
    controller.load("c1").await.unwrap();
    memory.clear_calls();
    (memory, pausing, controller, tasks)
}

fn ids(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

fn orders(tasks: &[Task]) -> Vec<i32> {
    tasks.iter().map(|t| t.order).collect()
}

/// Durable tasks of one child in display order
fn durable(memory: &MemoryGateway, child_id: &str) -> Vec<Task> {
    let mut tasks: Vec<Task> = memory
        .records::<Task>(Table::RoutineTasks)
        .unwrap()
        .into_iter()
        .filter(|t| t.child_id == child_id)
        .collect();
    tasks.sort_by(Task::display_cmp);
    tasks
}

// ========================
// Load
// ========================

#[tokio::test]
async fn test_load_sorts_by_order() {
    let memory = Arc::new(MemoryGateway::new());
    let scope = OwnerScope::new(memory.clone(), "u1").child("c1");
    scope.insert::<Task, _>(&NewTask::new("third", 2)).await.unwrap();
    scope.insert::<Task, _>(&NewTask::new("first", 0)).await.unwrap();
    scope.insert::<Task, _>(&NewTask::new("second", 1)).await.unwrap();

    let controller = TaskListController::new(memory.clone());
    assert_eq!(controller.phase(), Phase::Uninitialized);
    controller.set_owner(Some("u1"));
    controller.load("c1").await.unwrap();

    let descriptions: Vec<_> = controller.tasks().iter().map(|t| t.description.clone()).collect();
    assert_eq!(descriptions, vec!["first", "second", "third"]);
    assert_eq!(controller.phase(), Phase::Ready);
    assert_eq!(controller.active_child().as_deref(), Some("c1"));
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let (_memory, controller, _) = setup(&["a", "b", "c"]).await;
    let first = controller.tasks();
    controller.load("c1").await.unwrap();
    assert_eq!(controller.tasks(), first);
}

#[tokio::test]
async fn test_load_failure_keeps_previous_sequence() {
    let (memory, controller, tasks) = setup(&["a", "b"]).await;
    memory.fail_next(Operation::Query, offline());

    let err = controller.load("c1").await.unwrap_err();
    assert!(matches!(err, TaskListError::FetchError(GatewayError::Network(_))));
    assert_eq!(ids(&controller.tasks()), ids(&tasks));
    assert_eq!(controller.phase(), Phase::Ready);
}

#[tokio::test]
async fn test_load_requires_owner() {
    let controller = TaskListController::new(Arc::new(MemoryGateway::new()));
    assert_eq!(controller.load("c1").await, Err(TaskListError::NotAuthenticated));
}

#[tokio::test]
async fn test_load_only_sees_own_child_and_owner() {
    let memory = Arc::new(MemoryGateway::new());
    seed(&memory, "A", &["a1", "a2"]).await;
    seed(&memory, "B", &["b1"]).await;
    OwnerScope::new(memory.clone(), "u2")
        .child("A")
        .insert::<Task, _>(&NewTask::new("intruder", 0))
        .await
        .unwrap();

    let controller = TaskListController::new(memory.clone());
    controller.set_owner(Some("u1"));
    controller.load("A").await.unwrap();

    let tasks = controller.tasks();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.child_id == "A" && t.user_id == "u1"));
    for call in memory.calls_of(Operation::Query) {
        assert_eq!(call.scope.get("user_id"), Some(&serde_json::json!("u1")));
        assert_eq!(call.scope.get("child_id"), Some(&serde_json::json!("A")));
    }
}

#[tokio::test]
async fn test_superseded_load_is_discarded() {
    let memory = Arc::new(MemoryGateway::new());
    seed(&memory, "A", &["a1"]).await;
    seed(&memory, "B", &["b1", "b2"]).await;
    let pausing = Arc::new(PausingGateway::new(memory.clone()));
    pausing.pause(Operation::Query);

    let controller = TaskListController::new(pausing.clone());
    controller.set_owner(Some("u1"));

    let (first, second, ()) = tokio::join!(controller.load("A"), controller.load("B"), async {
        pausing.release(2);
    });
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(controller.active_child().as_deref(), Some("B"));
    assert_eq!(controller.tasks().len(), 2);
    assert_eq!(controller.phase(), Phase::Ready);
}

// ========================
// Reorder
// ========================

#[tokio::test]
async fn test_reorder_moves_and_renumbers() {
    let (memory, controller, tasks) = setup(&["T1", "T2", "T3"]).await;

    controller.reorder(0, 2).await.unwrap();

    let local = controller.tasks();
    assert_eq!(ids(&local), vec![tasks[1].id.clone(), tasks[2].id.clone(), tasks[0].id.clone()]);
    assert_eq!(orders(&local), vec![0, 1, 2]);
    assert_eq!(durable(&memory, "c1"), local);

    let batches = memory.calls_of(Operation::BatchUpdate);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].patches.len(), 3);
}

#[tokio::test]
async fn test_reorder_same_index_is_noop() {
    let (memory, controller, tasks) = setup(&["T1", "T2", "T3"]).await;
    controller.reorder(1, 1).await.unwrap();
    assert_eq!(ids(&controller.tasks()), ids(&tasks));
    assert!(memory.calls().is_empty());
}

#[tokio::test]
async fn test_reorder_out_of_range_is_rejected() {
    let (memory, controller, tasks) = setup(&["T1", "T2", "T3"]).await;
    let err = controller.reorder(0, 5).await.unwrap_err();
    assert_eq!(err, TaskListError::IndexOutOfRange { index: 5, len: 3 });
    assert!(!err.is_persistence_failure());
    assert_eq!(ids(&controller.tasks()), ids(&tasks));
    assert!(memory.calls().is_empty());
}

#[tokio::test]
async fn test_reorder_before_load_is_not_ready() {
    let controller = TaskListController::new(Arc::new(MemoryGateway::new()));
    controller.set_owner(Some("u1"));
    assert_eq!(controller.reorder(0, 1).await, Err(TaskListError::NotReady(Phase::Uninitialized)));
}

#[tokio::test]
async fn test_reorder_failure_reloads_durable_state() {
    let (memory, controller, _) = setup(&["T1", "T2", "T3"]).await;
    memory.fail_next(Operation::BatchUpdate, offline());

    let err = controller.reorder(0, 2).await.unwrap_err();
    assert!(matches!(err, TaskListError::ReorderFailed(FailureCause::Gateway(_))));
    assert_eq!(controller.tasks(), durable(&memory, "c1"));
    assert_eq!(controller.phase(), Phase::Ready);
}

#[tokio::test]
async fn test_partial_reorder_is_a_failure_and_resyncs() {
    let (memory, controller, _) = setup(&["T1", "T2", "T3"]).await;
    memory.partial_next_batch(1);

    let err = controller.reorder(0, 2).await.unwrap_err();
    assert_eq!(err, TaskListError::ReorderFailed(FailureCause::PartialWrite { applied: 1, total: 3 }));
    assert_eq!(controller.tasks(), durable(&memory, "c1"));
}

#[tokio::test]
async fn test_reorder_restores_previous_order_when_reload_fails() {
    let (memory, controller, tasks) = setup(&["T1", "T2", "T3"]).await;
    memory.fail_next(Operation::BatchUpdate, offline());
    memory.fail_next(Operation::Query, offline());

    assert!(controller.reorder(2, 0).await.is_err());
    assert_eq!(controller.tasks(), tasks);
}

#[tokio::test]
async fn test_back_to_back_reorders_compose() {
    let memory = Arc::new(MemoryGateway::new());
    let tasks = seed(&memory, "c1", &["T1", "T2", "T3"]).await;
    let pausing = Arc::new(PausingGateway::new(memory.clone()));
    let controller = TaskListController::new(pausing.clone());
    controller.set_owner(Some("u1"));
    controller.load("c1").await.unwrap();
    pausing.pause(Operation::BatchUpdate);

    let (first, second, ()) = tokio::join!(controller.reorder(0, 2), controller.reorder(0, 1), async {
        pausing.release(2);
    });
    first.unwrap();
    second.unwrap();

    // [T1,T2,T3] -> [T2,T3,T1] -> [T3,T2,T1]
    let expected = vec![tasks[2].id.clone(), tasks[1].id.clone(), tasks[0].id.clone()];
    assert_eq!(ids(&controller.tasks()), expected);
    let stored = durable(&memory, "c1");
    assert_eq!(ids(&stored), expected);
    assert_eq!(orders(&stored), vec![0, 1, 2]);
    assert_eq!(memory.calls_of(Operation::BatchUpdate).len(), 2);
}

#[tokio::test]
async fn test_load_waits_for_in_flight_reorder() {
    let (memory, pausing, controller, tasks) = pausing_setup(&["T1", "T2", "T3"]).await;
    pausing.pause(Operation::BatchUpdate);

    let (moved, reload, ()) = tokio::join!(controller.reorder(0, 2), controller.load("c1"), async {
        pausing.release(1);
    });
    moved.unwrap();
    reload.unwrap();

    let expected = vec![tasks[1].id.clone(), tasks[2].id.clone(), tasks[0].id.clone()];
    assert_eq!(ids(&controller.tasks()), expected);
    assert_eq!(controller.tasks(), durable(&memory, "c1"));
    assert_eq!(controller.phase(), Phase::Ready);
}

#[tokio::test]
async fn test_reload_abandons_queued_mutation() {
    let (memory, pausing, controller, tasks) = pausing_setup(&["T1", "T2", "T3"]).await;
    pausing.pause(Operation::BatchUpdate);

    // The second move is applied while the reload waits, and queues behind it
    let (first, reload, second, ()) = tokio::join!(
        controller.reorder(0, 2),
        controller.load("c1"),
        controller.reorder(0, 1),
        async {
            pausing.release(1);
        }
    );
    first.unwrap();
    reload.unwrap();
    assert_eq!(second, Err(TaskListError::ReorderFailed(FailureCause::Superseded)));

    let stored = durable(&memory, "c1");
    assert_eq!(ids(&stored), vec![tasks[1].id.clone(), tasks[2].id.clone(), tasks[0].id.clone()]);
    assert_eq!(controller.tasks(), stored);
    assert_eq!(memory.calls_of(Operation::BatchUpdate).len(), 1);
    assert_eq!(controller.phase(), Phase::Ready);
}

#[tokio::test]
async fn test_reorder_after_failed_delete_renumbers_restored_task() {
    let (memory, pausing, controller, tasks) = pausing_setup(&["T1", "T2", "T3"]).await;
    pausing.pause(Operation::Delete);
    memory.fail_next(Operation::Delete, offline());

    // [T1,T3] -> [T3,T1]; the failed delete then puts T2 back between them
    let (deleted, moved, ()) = tokio::join!(controller.delete_task(&tasks[1].id), controller.reorder(0, 1), async {
        pausing.release(1);
    });
    assert!(matches!(deleted, Err(TaskListError::DeleteFailed(FailureCause::Gateway(_)))));
    moved.unwrap();

    let stored = durable(&memory, "c1");
    assert_eq!(ids(&stored), vec![tasks[2].id.clone(), tasks[1].id.clone(), tasks[0].id.clone()]);
    assert_eq!(orders(&stored), vec![0, 1, 2]);
    assert_eq!(controller.tasks(), stored);
}

#[tokio::test]
async fn test_reorder_after_failed_toggle_matches_backend() {
    let (memory, pausing, controller, tasks) = pausing_setup(&["T1", "T2", "T3"]).await;
    pausing.pause(Operation::Update);
    memory.fail_next(Operation::Update, offline());

    let (toggled, moved, ()) = tokio::join!(controller.toggle_completion(&tasks[0].id), controller.reorder(0, 2), async {
        pausing.release(1);
    });
    assert!(matches!(toggled, Err(TaskListError::UpdateFailed(FailureCause::Gateway(_)))));
    moved.unwrap();

    let stored = durable(&memory, "c1");
    assert_eq!(ids(&stored), vec![tasks[1].id.clone(), tasks[2].id.clone(), tasks[0].id.clone()]);
    assert_eq!(orders(&stored), vec![0, 1, 2]);
    assert!(stored.iter().all(|t| !t.is_completed));
    assert_eq!(controller.tasks(), stored);
}

#[tokio::test]
async fn test_rename_after_failed_toggle_keeps_both_outcomes() {
    let (memory, pausing, controller, tasks) = pausing_setup(&["T1", "T2"]).await;
    pausing.pause(Operation::Update);
    memory.fail_next(Operation::Update, offline());

    let (toggled, renamed, ()) = tokio::join!(
        controller.toggle_completion(&tasks[0].id),
        controller.update_description(&tasks[0].id, "Guardar os brinquedos"),
        async {
            pausing.release(2);
        }
    );
    assert!(toggled.is_err());
    renamed.unwrap();

    let stored = durable(&memory, "c1");
    assert_eq!(stored[0].description, "Guardar os brinquedos");
    assert!(!stored[0].is_completed);
    assert_eq!(controller.tasks(), stored);
}

// ========================
// Toggle / rename
// ========================

#[tokio::test]
async fn test_toggle_persists() {
    let (memory, controller, tasks) = setup(&["T1", "T2"]).await;
    controller.toggle_completion(&tasks[0].id).await.unwrap();
    assert!(controller.tasks()[0].is_completed);
    assert!(durable(&memory, "c1")[0].is_completed);
    assert_eq!(controller.progress(), (1, 2));
}

#[tokio::test]
async fn test_toggle_failure_reverts_only_that_task() {
    let (memory, controller, tasks) = setup(&["T1", "T2", "T3"]).await;
    memory.fail_next(Operation::Update, offline());

    let err = controller.toggle_completion(&tasks[1].id).await.unwrap_err();
    assert!(matches!(err, TaskListError::UpdateFailed(FailureCause::Gateway(_))));
    assert_eq!(controller.tasks(), tasks);
}

#[tokio::test]
async fn test_toggle_missing_task_resyncs() {
    let (memory, controller, tasks) = setup(&["T1", "T2"]).await;
    OwnerScope::new(memory.clone(), "u1").child("c1").delete::<Task>(&tasks[0].id).await.unwrap();

    let err = controller.toggle_completion(&tasks[0].id).await.unwrap_err();
    assert_eq!(err, TaskListError::UpdateFailed(FailureCause::Missing));
    assert_eq!(ids(&controller.tasks()), vec![tasks[1].id.clone()]);
}

#[tokio::test]
async fn test_toggle_unknown_task() {
    let (_memory, controller, _) = setup(&["T1"]).await;
    assert_eq!(
        controller.toggle_completion("nope").await,
        Err(TaskListError::TaskNotFound("nope".to_string()))
    );
}

#[tokio::test]
async fn test_update_description() {
    let (memory, controller, tasks) = setup(&["T1"]).await;
    controller.update_description(&tasks[0].id, "  Tomar banho ").await.unwrap();
    assert_eq!(controller.tasks()[0].description, "Tomar banho");
    assert_eq!(durable(&memory, "c1")[0].description, "Tomar banho");

    assert!(matches!(
        controller.update_description(&tasks[0].id, "   ").await,
        Err(TaskListError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_description_failure_reverts() {
    let (memory, controller, tasks) = setup(&["T1"]).await;
    memory.fail_next(Operation::Update, offline());
    assert!(controller.update_description(&tasks[0].id, "Outro").await.is_err());
    assert_eq!(controller.tasks()[0].description, "T1");
}

// ========================
// Add / delete
// ========================

#[tokio::test]
async fn test_add_to_empty_list_starts_at_zero() {
    let (memory, controller, _) = setup(&[]).await;
    let task = controller.add_task("Brush teeth").await.unwrap();
    assert_eq!(task.order, 0);
    assert_eq!(task.child_id, "c1");
    assert_eq!(controller.tasks(), vec![task]);
    assert_eq!(durable(&memory, "c1").len(), 1);
}

#[tokio::test]
async fn test_add_appends_after_highest_order() {
    let (_memory, controller, tasks) = setup(&["T1", "T2", "T3"]).await;
    controller.delete_task(&tasks[2].id).await.unwrap();
    controller.delete_task(&tasks[0].id).await.unwrap();

    let task = controller.add_task("Nova").await.unwrap();
    assert_eq!(task.order, 2);
    assert_eq!(controller.tasks().last().map(|t| t.id.clone()), Some(task.id));
}

#[tokio::test]
async fn test_add_rejects_blank_description() {
    let (memory, controller, _) = setup(&["T1"]).await;
    assert!(matches!(controller.add_task("  ").await, Err(TaskListError::Validation(_))));
    assert!(memory.calls().is_empty());
}

#[tokio::test]
async fn test_add_failure_leaves_list_untouched() {
    let (memory, controller, tasks) = setup(&["T1"]).await;
    memory.fail_next(Operation::Insert, offline());
    let err = controller.add_task("Nova").await.unwrap_err();
    assert!(matches!(err, TaskListError::CreateFailed(_)));
    assert_eq!(controller.tasks(), tasks);
}

#[tokio::test]
async fn test_delete_keeps_remaining_orders() {
    let (memory, controller, tasks) = setup(&["T1", "T2", "T3"]).await;
    controller.delete_task(&tasks[1].id).await.unwrap();

    let local = controller.tasks();
    assert_eq!(ids(&local), vec![tasks[0].id.clone(), tasks[2].id.clone()]);
    assert_eq!(orders(&local), vec![0, 2]);
    assert_eq!(durable(&memory, "c1"), local);
    assert!(memory.calls_of(Operation::BatchUpdate).is_empty());
}

#[tokio::test]
async fn test_delete_failure_restores_task_in_place() {
    let (memory, controller, tasks) = setup(&["T1", "T2", "T3"]).await;
    memory.fail_next(Operation::Delete, offline());

    let err = controller.delete_task(&tasks[1].id).await.unwrap_err();
    assert!(matches!(err, TaskListError::DeleteFailed(_)));
    assert_eq!(controller.tasks(), tasks);
}

#[tokio::test]
async fn test_delete_of_already_removed_row_succeeds() {
    let (memory, controller, tasks) = setup(&["T1", "T2"]).await;
    OwnerScope::new(memory.clone(), "u1").child("c1").delete::<Task>(&tasks[0].id).await.unwrap();
    controller.delete_task(&tasks[0].id).await.unwrap();
    assert_eq!(controller.tasks().len(), 1);
}

// ========================
// Session and listeners
// ========================

#[tokio::test]
async fn test_owner_change_clears_list() {
    let (_memory, controller, _) = setup(&["T1"]).await;
    controller.set_owner(Some("u2"));
    assert!(controller.tasks().is_empty());
    assert_eq!(controller.active_child(), None);
    assert_eq!(controller.phase(), Phase::Uninitialized);

    controller.set_owner(None);
    assert_eq!(controller.add_task("x").await, Err(TaskListError::NotReady(Phase::Uninitialized)));
}

#[tokio::test]
async fn test_listeners_see_reconciling_then_ready() {
    let (_memory, controller, tasks) = setup(&["T1", "T2"]).await;
    let phases = Arc::new(Mutex::new(Vec::new()));
    let seen = phases.clone();
    controller.subscribe(move |snapshot| seen.lock().push(snapshot.phase));

    controller.toggle_completion(&tasks[0].id).await.unwrap();

    let phases = phases.lock();
    assert_eq!(phases.first(), Some(&Phase::Reconciling));
    assert_eq!(phases.last(), Some(&Phase::Ready));
}
