mod common;

use coinfolio_backend::{
    error::AppError,
    models::user::{AccessUpdateRequest, NewUser},
    services::users,
};

use crate::common::{create_test_state, create_user};

#[tokio::test]
async fn test_create_user_assigns_uid_and_defaults() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;

    assert_eq!(alice.uid.len(), 9);
    assert!(alice.uid.chars().all(|c| c.is_ascii_digit()));
    assert!(alice.can_transfer());
    assert!(alice.can_withdraw());
    assert!(!alice.is_verified);
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let state = create_test_state().await;
    create_user(&state.db, "alice").await;

    let err = users::create_user(
        &state.db,
        NewUser {
            username: "alice".to_string(),
            email: "other@example.com".to_string(),
            password_hash: "hashed".to_string(),
            is_admin: false,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_set_access_updates_only_named_flags() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;

    let updated = users::set_access(
        &state.db,
        alice.id,
        &AccessUpdateRequest {
            transfer_access: Some(false),
            withdrawal_access: None,
        },
    )
    .await
    .unwrap();
    assert!(!updated.can_transfer());
    assert!(updated.can_withdraw());
    assert_eq!(updated.withdrawal_access, None);

    assert!(matches!(
        users::set_access(&state.db, alice.id, &AccessUpdateRequest::default()).await,
        Err(AppError::InvalidRequest(_))
    ));
    assert!(matches!(
        users::set_access(
            &state.db,
            4242,
            &AccessUpdateRequest {
                transfer_access: Some(true),
                withdrawal_access: None
            }
        )
        .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_users_in_creation_order() {
    let state = create_test_state().await;
    let alice = create_user(&state.db, "alice").await;
    let bob = create_user(&state.db, "bob").await;

    let all = users::list_users(&state.db).await.unwrap();
    assert_eq!(all.iter().map(|u| u.id).collect::<Vec<_>>(), vec![alice.id, bob.id]);
    assert!(matches!(users::find_user(&state.db, 777).await, Err(AppError::NotFound(_))));
}
