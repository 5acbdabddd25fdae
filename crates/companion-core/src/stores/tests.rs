//! Store Integration Tests

use std::sync::Arc;

use super::{AuthStore, ProfileStore, RecordList, StoreError};
use crate::domain::{
    ChildProfilePatch, DiaryEntry, MedicationTaken, NewChildProfile, NewDiaryEntry, NewReminder, Reminder,
    ReminderType, SignUpOutcome,
};
use crate::gateway::{GatewayError, MemoryGateway, Operation, SharedGateway, Table};
use crate::identity::{AuthError, AuthProvider, MemoryAuth};

fn gateway() -> (Arc<MemoryGateway>, SharedGateway) {
    let memory = Arc::new(MemoryGateway::new());
    let shared: SharedGateway = memory.clone();
    (memory, shared)
}

fn profile(name: &str) -> NewChildProfile {
    NewChildProfile {
        nome_crianca: name.to_string(),
        data_nascimento: "2017-08-21".to_string(),
        diagnostico_tdah: true,
        grau_tdah: None,
        informacoes_adicionais: None,
        avatar_url: None,
    }
}

fn diary(date: &str) -> NewDiaryEntry {
    NewDiaryEntry {
        entry_date: date.to_string(),
        mood: "Calmo".to_string(),
        behavior_observations: None,
        medication_taken: MedicationTaken::Sim,
        medication_details: None,
        activities_highlights: None,
        parent_observations: "Dia tranquilo".to_string(),
    }
}

fn reminder(title: &str, time: &str) -> NewReminder {
    NewReminder {
        title: title.to_string(),
        description: None,
        reminder_time: time.to_string(),
        kind: ReminderType::Medication,
        is_completed: false,
    }
}

// ========================
// AuthStore
// ========================

#[tokio::test]
async fn test_auth_sign_in_failure_clears_identity() {
    let auth = Arc::new(MemoryAuth::new());
    auth.sign_up("ana@example.com", "segredo1", Some("Ana")).await.unwrap();
    let store = AuthStore::new(auth.clone());

    store.sign_in("ana@example.com", "segredo1").await.unwrap();
    assert!(store.user().is_some());

    let err = store.sign_in("ana@example.com", "errada").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
    let state = store.state();
    assert!(state.user.is_none());
    assert!(state.session.is_none());
    assert_eq!(state.error.as_deref(), Some("E-mail ou senha inválidos"));
    assert!(!state.is_loading);

    store.clear_error();
    assert!(store.state().error.is_none());
}

#[tokio::test]
async fn test_auth_sign_up_awaiting_confirmation() {
    let store = AuthStore::new(Arc::new(MemoryAuth::with_email_confirmation()));
    let outcome = store.sign_up("bia@example.com", "segredo1", None).await.unwrap();
    assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired(_)));
    let state = store.state();
    assert!(state.awaiting_confirmation);
    assert!(state.session.is_none());
}

#[tokio::test]
async fn test_auth_sign_out_failure_keeps_identity() {
    let auth = Arc::new(MemoryAuth::new());
    let store = AuthStore::new(auth.clone());
    store.sign_up("c@example.com", "segredo1", None).await.unwrap();

    auth.fail_next(AuthError::Network("offline".to_string()));
    assert!(store.sign_out().await.is_err());
    assert!(store.session().is_some());
    assert!(store.state().error.is_some());

    store.sign_out().await.unwrap();
    assert!(store.session().is_none());
}

#[tokio::test]
async fn test_auth_restore() {
    let auth = Arc::new(MemoryAuth::new());
    let SignUpOutcome::SignedIn(session) = auth.sign_up("d@example.com", "segredo1", None).await.unwrap() else {
        panic!("expected a session");
    };
    let store = AuthStore::new(auth);
    store.restore(Some(session.clone()));
    assert_eq!(store.user(), Some(session.user));
    store.restore(None);
    assert!(store.user().is_none());
}

// ========================
// ProfileStore
// ========================

#[tokio::test]
async fn test_profiles_require_owner() {
    let (_memory, gw) = gateway();
    let store = ProfileStore::new(gw);
    assert_eq!(store.fetch().await, Err(StoreError::NotAuthenticated));
}

#[tokio::test]
async fn test_profiles_first_added_is_selected() {
    let (_memory, gw) = gateway();
    let store = ProfileStore::new(gw);
    store.set_owner(Some("u1"));

    let lucas = store.add(&profile("Lucas")).await.unwrap();
    assert_eq!(store.selected_child_id(), Some(lucas.child_id.clone()));

    store.add(&profile("Ana")).await.unwrap();
    let state = store.state();
    assert_eq!(state.selected_child_id, Some(lucas.child_id));
    let names: Vec<_> = state.profiles.iter().map(|p| p.nome_crianca.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Lucas"]);
}

#[tokio::test]
async fn test_profiles_fetch_selects_first_by_name() {
    let (memory, gw) = gateway();
    let seeding = ProfileStore::new(memory.clone());
    seeding.set_owner(Some("u1"));
    seeding.add(&profile("Pedro")).await.unwrap();
    seeding.add(&profile("Bruna")).await.unwrap();

    let store = ProfileStore::new(gw);
    store.set_owner(Some("u1"));
    let profiles = store.fetch().await.unwrap();
    assert_eq!(profiles.len(), 2);
    assert_eq!(store.state().selected().map(|p| p.nome_crianca.clone()), Some("Bruna".to_string()));
}

#[tokio::test]
async fn test_profiles_fetch_failure_clears_list() {
    let (memory, gw) = gateway();
    let store = ProfileStore::new(gw);
    store.set_owner(Some("u1"));
    store.add(&profile("Lucas")).await.unwrap();

    memory.fail_next(Operation::Query, GatewayError::Network("offline".to_string()));
    assert!(store.fetch().await.is_err());
    let state = store.state();
    assert!(state.profiles.is_empty());
    assert!(state.error.is_some());
}

#[tokio::test]
async fn test_profiles_delete_reselects_first_remaining() {
    let (_memory, gw) = gateway();
    let store = ProfileStore::new(gw);
    store.set_owner(Some("u1"));
    let ana = store.add(&profile("Ana")).await.unwrap();
    let bia = store.add(&profile("Bia")).await.unwrap();
    store.select(Some(&bia.child_id));

    store.delete(&bia.child_id).await.unwrap();
    assert_eq!(store.selected_child_id(), Some(ana.child_id.clone()));

    store.delete(&ana.child_id).await.unwrap();
    assert_eq!(store.selected_child_id(), None);
}

#[tokio::test]
async fn test_profiles_update_replaces_by_id() {
    let (_memory, gw) = gateway();
    let store = ProfileStore::new(gw);
    store.set_owner(Some("u1"));
    let created = store.add(&profile("Lucas")).await.unwrap();

    let patch = ChildProfilePatch { nome_crianca: Some("Lucas Silva".to_string()), ..Default::default() };
    store.update_profile(&created.child_id, &patch).await.unwrap();
    assert_eq!(store.state().profiles[0].nome_crianca, "Lucas Silva");

    assert_eq!(
        store.update_profile("missing", &patch).await,
        Err(StoreError::NotFound("missing".to_string()))
    );
}

#[tokio::test]
async fn test_profiles_owner_change_resets() {
    let (_memory, gw) = gateway();
    let store = ProfileStore::new(gw);
    store.set_owner(Some("u1"));
    store.add(&profile("Lucas")).await.unwrap();

    store.set_owner(Some("u2"));
    assert!(store.state().profiles.is_empty());
    assert!(store.fetch().await.unwrap().is_empty());
}

// ========================
// RecordList
// ========================

#[tokio::test]
async fn test_records_need_child() {
    let (_memory, gw) = gateway();
    let list = RecordList::<DiaryEntry>::new(gw);
    assert_eq!(list.load().await, Err(StoreError::NotAuthenticated));
    list.set_owner(Some("u1"));
    assert_eq!(list.load().await, Err(StoreError::NoActiveChild));
}

#[tokio::test]
async fn test_diary_sorted_newest_first() {
    let (memory, gw) = gateway();
    let list = RecordList::<DiaryEntry>::new(gw);
    list.set_owner(Some("u1"));
    list.set_child(Some("c1"));

    list.create(&diary("2024-03-01")).await.unwrap();
    list.create(&diary("2024-03-05")).await.unwrap();
    list.create(&diary("2024-02-10")).await.unwrap();

    let dates: Vec<_> = list.items().iter().map(|e| e.entry_date.clone()).collect();
    assert_eq!(dates, vec!["2024-03-05", "2024-03-01", "2024-02-10"]);
    assert!(memory.rows(Table::DiaryEntries).iter().all(|r| r["child_id"] == "c1"));
}

#[tokio::test]
async fn test_records_isolated_per_child() {
    let (_memory, gw) = gateway();
    let list = RecordList::<DiaryEntry>::new(gw);
    list.set_owner(Some("u1"));
    list.set_child(Some("c1"));
    list.create(&diary("2024-03-01")).await.unwrap();

    list.set_child(Some("c2"));
    assert!(list.items().is_empty());
    list.load().await.unwrap();
    assert!(list.items().is_empty());

    list.set_child(Some("c1"));
    list.load().await.unwrap();
    assert_eq!(list.items().len(), 1);
}

#[tokio::test]
async fn test_failed_create_leaves_items() {
    let (memory, gw) = gateway();
    let list = RecordList::<Reminder>::new(gw);
    list.set_owner(Some("u1"));
    list.set_child(Some("c1"));
    list.create(&reminder("Ritalina", "2024-05-01T11:00:00.000Z")).await.unwrap();

    memory.fail_next(Operation::Insert, GatewayError::Network("offline".to_string()));
    assert!(list.create(&reminder("Consulta", "2024-05-02T11:00:00.000Z")).await.is_err());
    let state = list.state();
    assert_eq!(state.items.len(), 1);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn test_reminder_toggle_and_delete() {
    let (memory, gw) = gateway();
    let list = RecordList::<Reminder>::new(gw);
    list.set_owner(Some("u1"));
    list.set_child(Some("c1"));
    let late = list.create(&reminder("Natação", "2024-05-01T18:00:00.000Z")).await.unwrap();
    let early = list.create(&reminder("Ritalina", "2024-05-01T07:00:00.000Z")).await.unwrap();
    assert_eq!(list.items()[0].id, early.id);

    let toggled = list.toggle_completed(&late.id).await.unwrap();
    assert!(toggled.is_completed);
    assert!(memory.records::<Reminder>(Table::Reminders).unwrap().iter().any(|r| r.id == late.id && r.is_completed));
    assert!(!list.toggle_completed(&late.id).await.unwrap().is_completed);

    list.delete(&early.id).await.unwrap();
    assert_eq!(list.items().len(), 1);
    assert!(matches!(list.toggle_completed(&early.id).await, Err(StoreError::NotFound(_))));
}
