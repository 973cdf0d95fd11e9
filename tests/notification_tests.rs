mod common;

use coinfolio_backend::{
    error::AppError,
    models::notification::NotificationKind,
    services::{notification, users},
};
use serde_json::json;

use crate::common::{create_test_state, create_user};

#[tokio::test]
async fn test_notify_persists_unread() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;

    let stored = notification::notify(
        &state.db,
        alice.id,
        NotificationKind::System,
        "Hello",
        "Welcome aboard",
        Some(json!({ "source": "test" })),
    )
    .await
    .unwrap();

    assert!(!stored.is_read);
    assert_eq!(stored.kind, "system");
    assert_eq!(notification::unread_count(&state.db, alice.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_newest_first_and_unread_filter() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let stored = notification::notify(
            &state.db,
            alice.id,
            NotificationKind::System,
            format!("Note {}", n),
            "body",
            None,
        )
        .await
        .unwrap();
        ids.push(stored.id);
    }

    notification::mark_read(&state.db, alice.id, ids[2]).await.unwrap();

    let all = notification::list(&state.db, alice.id, false, None).await.unwrap();
    assert_eq!(all.iter().map(|n| n.id).collect::<Vec<_>>(), vec![ids[2], ids[1], ids[0]]);

    let unread = notification::list(&state.db, alice.id, true, None).await.unwrap();
    assert_eq!(unread.len(), 2);
    assert!(unread.iter().all(|n| !n.is_read));

    let limited = notification::list(&state.db, alice.id, false, Some(1)).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_mark_read_is_owner_only() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let bob = create_user(&state.db, "bob").await;

    let stored = notification::notify(&state.db, alice.id, NotificationKind::System, "t", "m", None)
        .await
        .unwrap();

    assert!(matches!(
        notification::mark_read(&state.db, bob.id, stored.id).await,
        Err(AppError::NotFound(_))
    ));

    let updated = notification::mark_read(&state.db, alice.id, stored.id).await.unwrap();
    assert!(updated.is_read);
    // Second call is a no-op
    assert!(notification::mark_read(&state.db, alice.id, stored.id).await.unwrap().is_read);
}

#[tokio::test]
async fn test_mark_all_read_counts_changes() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let bob = create_user(&state.db, "bob").await;

    for _ in 0..2 {
        notification::notify(&state.db, alice.id, NotificationKind::System, "t", "m", None)
            .await
            .unwrap();
    }
    notification::notify(&state.db, bob.id, NotificationKind::System, "t", "m", None)
        .await
        .unwrap();

    assert_eq!(notification::mark_all_read(&state.db, alice.id).await.unwrap(), 2);
    assert_eq!(notification::mark_all_read(&state.db, alice.id).await.unwrap(), 0);
    assert_eq!(notification::unread_count(&state.db, bob.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_system_message_is_stored_and_pushed() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let (_conn, mut rx) = state.registry.register(alice.id).unwrap();

    let stored = users::send_system_message(
        &state.db,
        &state.registry,
        alice.id,
        "Maintenance",
        "Back in five minutes",
    )
    .await
    .unwrap();

    let payload: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
    assert_eq!(payload["type"], "notification_update");
    assert_eq!(payload["notification"]["id"], stored.id);
    assert_eq!(payload["notification"]["type"], "system");
    assert_eq!(payload["notification"]["title"], "Maintenance");
}

#[tokio::test]
async fn test_offline_user_still_gets_durable_record() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;

    users::send_system_message(&state.db, &state.registry, alice.id, "Hi", "Offline note")
        .await
        .unwrap();

    let inbox = notification::list(&state.db, alice.id, true, None).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].message, "Offline note");
}
