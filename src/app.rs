use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{admin, balance, currency, funding, health, notification, realtime_ws, transfer};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Transfers
        .route("/transfer", post(transfer::create_transfer))
        .route("/transfer-history", get(transfer::transfer_history))
        .route("/transfer-details/{transaction_id}", get(transfer::transfer_details))
        // Balances
        .route("/balance", get(balance::get_balance))
        .route("/balances", get(balance::list_balances))
        .route("/me", get(balance::me))
        .route("/withdraw", post(funding::withdraw))
        // Inbox
        .route("/notifications", get(notification::list_notifications))
        .route("/notifications/read-all", post(notification::mark_all_read))
        .route("/notifications/{id}/read", post(notification::mark_read))
        // Reference data
        .route("/currencies", get(currency::list_currencies))
        .route("/prices", get(currency::get_prices))
        // Realtime
        .route("/ws", get(realtime_ws::realtime_websocket))
        // Admin
        .route("/admin/users", get(admin::list_users).post(admin::create_user))
        .route("/admin/users/{id}/access", patch(admin::update_access))
        .route("/admin/users/{id}/message", post(admin::send_message))
        .route("/admin/deposits", post(funding::admin_deposit))
        .route("/admin/withdrawals", post(funding::admin_withdraw));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
