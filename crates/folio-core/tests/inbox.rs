//! End-to-end inbox behavior against an in-memory backend.

#![allow(clippy::unwrap_used)]

mod common;

use folio_core::inbox::{Direction, MutationPhase, perform};
use folio_core::{
    Action, Effect, FAVORITES_KEY, Favorites, Filter, InboxController, KeyValueStore, MemoryStore,
    MessageId, NoticeLevel, SqliteStore,
};

use common::{FakeGateway, empty_state, ids, message, messages};

type Controller = InboxController<FakeGateway, MemoryStore>;

async fn loaded(gateway: FakeGateway) -> Controller {
    loaded_with_store(gateway, MemoryStore::new()).await
}

async fn loaded_with_store(gateway: FakeGateway, store: MemoryStore) -> Controller {
    let mut controller = InboxController::new(empty_state(), gateway, store);
    controller.dispatch(Action::Refresh).await;
    controller
}

async fn select(controller: &mut Controller, ids: &[&str]) {
    for id in ids {
        controller
            .update(Action::ToggleSelect(MessageId::from(*id)))
            .await;
    }
}

fn stored_favorites(raw: Option<String>) -> serde_json::Value {
    serde_json::from_str(&raw.unwrap()).unwrap()
}

#[tokio::test]
async fn test_refresh_replaces_collection() {
    let mut controller = loaded(FakeGateway::with_messages(messages(3))).await;
    assert_eq!(controller.state().total_count(), 3);
    assert_eq!(ids(&controller.state().visible()), ["m3", "m2", "m1"]);

    controller
        .gateway()
        .messages
        .borrow_mut()
        .push(message("m9", 9, false));
    controller.dispatch(Action::Refresh).await;
    assert_eq!(controller.state().messages()[0].id.as_str(), "m9");
    assert_eq!(controller.state().total_count(), 4);
}

#[tokio::test]
async fn test_failed_fetch_shows_empty_list_and_error() {
    let gateway = FakeGateway::with_messages(messages(2));
    *gateway.fail_list.borrow_mut() = true;
    let mut controller = loaded(gateway).await;

    assert_eq!(controller.state().total_count(), 0);
    assert!(controller.state().load_error().is_some());
    let notices = controller.state_mut().take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_toggle_seen_commits() {
    let mut controller = loaded(FakeGateway::with_messages(messages(1))).await;
    let id = MessageId::from("m1");

    controller.dispatch(Action::ToggleSeen(id.clone())).await;
    let state = controller.state();
    assert!(state.message(&id).unwrap().is_seen);
    assert!(!state.is_busy(&id));
    assert_eq!(state.mutation_phase(&id), MutationPhase::Committed);
    assert_eq!(controller.gateway().mark_seen_calls.borrow().len(), 1);
}

#[tokio::test]
async fn test_optimistic_toggle_reverts_on_failure() {
    let gateway = FakeGateway::with_messages(messages(1)).fail_on("m1");
    let mut controller = loaded(gateway).await;
    let id = MessageId::from("m1");

    let effect = controller.update(Action::ToggleSeen(id.clone())).await;
    // Optimistic flip is visible before the backend answers.
    assert!(controller.state().message(&id).unwrap().is_seen);
    assert!(controller.state().is_busy(&id));

    for settled in perform(controller.gateway(), effect).await {
        controller.update(settled).await;
    }

    let state = controller.state();
    assert!(!state.message(&id).unwrap().is_seen);
    assert!(!state.is_busy(&id));
    assert_eq!(state.mutation_phase(&id), MutationPhase::RolledBack);
    assert_eq!(
        controller.state_mut().take_notices()[0].level,
        NoticeLevel::Error
    );
}

#[tokio::test]
async fn test_busy_guard_sends_one_delete() {
    let mut controller = loaded(FakeGateway::with_messages(messages(2))).await;
    let id = MessageId::from("m1");

    let first = controller.update(Action::Delete(id.clone())).await;
    let second = controller.update(Action::Delete(id.clone())).await;
    assert_eq!(second, Effect::None);

    for effect in [first, second] {
        for next in perform(controller.gateway(), effect).await {
            controller.update(next).await;
        }
    }

    assert_eq!(controller.gateway().delete_calls.borrow().as_slice(), [id.clone()]);
    assert!(controller.state().message(&id).is_none());
    assert_eq!(controller.state().total_count(), 1);
}

#[tokio::test]
async fn test_delete_waits_for_confirmation() {
    let mut controller = loaded(FakeGateway::with_messages(messages(2))).await;
    let id = MessageId::from("m2");

    let effect = controller.update(Action::Delete(id.clone())).await;
    assert!(controller.state().message(&id).is_some());
    assert!(controller.state().is_busy(&id));

    let settled = perform(controller.gateway(), effect).await;
    assert_eq!(settled.len(), 1);
    for action in settled {
        controller.update(action).await;
    }
    assert!(controller.state().message(&id).is_none());
}

#[tokio::test]
async fn test_bulk_delete_isolates_partial_failure() {
    let gateway = FakeGateway::with_messages(vec![
        message("A", 3, false),
        message("B", 2, false),
        message("C", 1, false),
    ])
    .fail_on("B");
    let store = MemoryStore::new();
    let mut controller = loaded_with_store(gateway, store.clone()).await;
    controller.update(Action::ToggleFavorite(MessageId::from("A"))).await;
    controller.update(Action::ToggleFavorite(MessageId::from("B"))).await;
    select(&mut controller, &["A", "B", "C"]).await;

    controller.dispatch(Action::BulkDelete).await;

    let state = controller.state();
    let remaining: Vec<&str> = state.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(remaining, ["B"]);
    assert!(state.selection().is_empty());
    assert_eq!(state.busy_count(), 0);
    assert!(!state.is_bulk_deleting());

    // Deleted ids lose their star; failed ones keep it.
    assert!(!state.is_starred(&MessageId::from("A")));
    assert!(state.is_starred(&MessageId::from("B")));
    assert_eq!(
        stored_favorites(store.get(FAVORITES_KEY).await.unwrap()),
        serde_json::json!({ "B": true })
    );

    let calls: Vec<String> = controller
        .gateway()
        .delete_calls
        .borrow()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(calls, ["A", "B", "C"]);

    let notices = controller.state_mut().take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].text.contains("2 of 3"));
}

#[tokio::test]
async fn test_bulk_delete_all_succeed() {
    let mut controller = loaded(FakeGateway::with_messages(messages(4))).await;
    controller.update(Action::SelectAllVisible).await;
    controller.dispatch(Action::BulkDelete).await;

    assert_eq!(controller.state().total_count(), 0);
    let notices = controller.state_mut().take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Info);
}

#[tokio::test]
async fn test_bulk_toggle_seen_follows_majority() {
    let gateway = FakeGateway::with_messages(vec![
        message("a", 4, true),
        message("b", 3, true),
        message("c", 2, false),
        message("d", 1, false),
    ]);
    let mut controller = loaded(gateway).await;
    select(&mut controller, &["a", "b", "c", "d"]).await;

    // Half read: everything goes unread, and only the read ones are sent.
    controller.dispatch(Action::BulkToggleSeen).await;
    assert_eq!(controller.state().unread_count(), 4);
    assert_eq!(controller.state().busy_count(), 0);
    let calls: Vec<String> = controller
        .gateway()
        .mark_seen_calls
        .borrow()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(calls, ["a", "b"]);

    // None read: everything goes read.
    controller.dispatch(Action::BulkToggleSeen).await;
    assert_eq!(controller.state().unread_count(), 0);
    assert_eq!(controller.gateway().mark_seen_calls.borrow().len(), 6);
}

#[tokio::test]
async fn test_bulk_toggle_seen_rejects_busy_ids() {
    let mut controller = loaded(FakeGateway::with_messages(messages(3))).await;
    let busy = controller.update(Action::Delete(MessageId::from("m2"))).await;
    select(&mut controller, &["m1", "m2", "m3"]).await;

    controller.dispatch(Action::BulkToggleSeen).await;
    let state = controller.state();
    assert!(state.message(&MessageId::from("m1")).unwrap().is_seen);
    assert!(!state.message(&MessageId::from("m2")).unwrap().is_seen);
    assert!(state.message(&MessageId::from("m3")).unwrap().is_seen);
    assert!(state.is_busy(&MessageId::from("m2")));
    assert!(
        !controller
            .gateway()
            .mark_seen_calls
            .borrow()
            .contains(&MessageId::from("m2"))
    );

    for next in perform(controller.gateway(), busy).await {
        controller.update(next).await;
    }
    assert!(controller.state().message(&MessageId::from("m2")).is_none());
}

#[tokio::test]
async fn test_bulk_toggle_favorite_persists_once() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::with_messages(messages(3));
    let mut controller = loaded_with_store(gateway, store.clone()).await;
    controller.update(Action::ToggleFavorite(MessageId::from("m1"))).await;
    select(&mut controller, &["m1", "m2", "m3"]).await;
    let writes = store.write_count();

    controller.update(Action::BulkToggleFavorite).await;
    assert_eq!(store.write_count(), writes + 1);
    assert_eq!(
        stored_favorites(store.get(FAVORITES_KEY).await.unwrap()),
        serde_json::json!({ "m1": true, "m2": true, "m3": true })
    );

    controller.update(Action::BulkToggleFavorite).await;
    assert_eq!(store.write_count(), writes + 2);
    assert_eq!(
        stored_favorites(store.get(FAVORITES_KEY).await.unwrap()),
        serde_json::json!({})
    );
}

#[tokio::test]
async fn test_traversal_clamps_at_last_item() {
    let mut controller = loaded(FakeGateway::with_messages(messages(3))).await;
    // Newest first, so m1 is the last item.
    controller.update(Action::OpenPreview(MessageId::from("m1"))).await;

    controller.update(Action::Navigate(Direction::Next)).await;
    assert_eq!(controller.state().preview(), Some(&MessageId::from("m1")));

    controller.update(Action::Navigate(Direction::Previous)).await;
    assert_eq!(controller.state().preview(), Some(&MessageId::from("m2")));
}

#[tokio::test]
async fn test_traversal_follows_filtered_view() {
    let gateway = FakeGateway::with_messages(vec![
        message("a", 4, false),
        message("b", 3, true),
        message("c", 2, false),
    ]);
    let mut controller = loaded(gateway).await;
    controller.update(Action::SetFilter(Filter::Unread)).await;
    controller.update(Action::OpenPreview(MessageId::from("a"))).await;
    controller.update(Action::Navigate(Direction::Next)).await;
    assert_eq!(controller.state().preview(), Some(&MessageId::from("c")));
}

#[tokio::test]
async fn test_favorites_round_trip_through_storage() {
    let store = SqliteStore::in_memory().await.unwrap();
    let id = MessageId::from("X");

    let mut favorites = Favorites::load(&store).await;
    assert!(favorites.toggle(&id));
    favorites.save(&store).await.unwrap();
    drop(favorites);

    let parsed = stored_favorites(store.get(FAVORITES_KEY).await.unwrap());
    assert_eq!(parsed["X"], serde_json::Value::Bool(true));

    let reloaded = Favorites::load(&store).await;
    assert!(reloaded.contains(&id));
}

#[tokio::test]
async fn test_controller_opens_with_stored_favorites() {
    let store = MemoryStore::new();
    store.set(FAVORITES_KEY, r#"{"m2":true}"#).await.unwrap();

    let mut controller =
        InboxController::open(FakeGateway::with_messages(messages(3)), store, 12).await;
    controller.dispatch(Action::Refresh).await;
    controller.update(Action::SetFilter(Filter::Starred)).await;
    assert_eq!(ids(&controller.state().visible()), ["m2"]);
}

#[tokio::test]
async fn test_visible_window_resets_on_filter_change() {
    let mut controller = loaded(FakeGateway::with_messages(messages(28))).await;
    assert_eq!(controller.state().visible_count(), 12);

    controller.update(Action::RevealMore).await;
    assert_eq!(controller.state().visible_count(), 24);
    assert_eq!(controller.state().visible().len(), 24);

    controller.update(Action::SetFilter(Filter::Unread)).await;
    assert_eq!(controller.state().visible_count(), 12);
}

#[tokio::test]
async fn test_refresh_resets_window_and_preview() {
    let mut controller = loaded(FakeGateway::with_messages(messages(20))).await;
    controller.update(Action::RevealMore).await;
    controller.update(Action::OpenPreview(MessageId::from("m5"))).await;

    controller.dispatch(Action::Refresh).await;
    assert_eq!(controller.state().visible_count(), 12);
    assert!(controller.state().preview().is_none());
    assert!(!controller.state().is_preview_open());
}
