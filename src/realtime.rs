//! Realtime connection registry and live event types
//!
//! Delivery is at-most-once: an event is handed to every open connection of
//! the target user with a non-blocking send and then forgotten. There is no
//! queue for offline users and no replay; the durable notifications table is
//! the fallback a client polls after reconnecting.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::models::notification::NotificationResponse;
use crate::models::transfer::TransferDirection;

pub type ConnectionId = u64;

/// Server -> client message, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum LiveEvent {
    #[serde(rename = "connected")]
    Connected { user_id: i32 },
    #[serde(rename = "TRANSFER_CREATED")]
    TransferCreated {
        transaction_id: String,
        direction: TransferDirection,
        amount: Decimal,
        currency: String,
        counterparty_id: i32,
    },
    #[serde(rename = "DEPOSIT_CREATED")]
    DepositCreated {
        reference: String,
        amount: Decimal,
        currency: String,
    },
    #[serde(rename = "WITHDRAWAL_CREATED")]
    WithdrawalCreated {
        reference: String,
        amount: Decimal,
        currency: String,
    },
    #[serde(rename = "balance_update")]
    BalanceUpdate { currency: String, balance: Decimal },
    #[serde(rename = "notification_update")]
    NotificationUpdate { notification: NotificationResponse },
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "error")]
    Error { message: String },
}

impl LiveEvent {
    /// Topic name a client subscribes to; identical to the `type` tag
    pub fn topic(&self) -> &'static str {
        match self {
            LiveEvent::Connected { .. } => "connected",
            LiveEvent::TransferCreated { .. } => "TRANSFER_CREATED",
            LiveEvent::DepositCreated { .. } => "DEPOSIT_CREATED",
            LiveEvent::WithdrawalCreated { .. } => "WITHDRAWAL_CREATED",
            LiveEvent::BalanceUpdate { .. } => "balance_update",
            LiveEvent::NotificationUpdate { .. } => "notification_update",
            LiveEvent::Pong => "pong",
            LiveEvent::Error { .. } => "error",
        }
    }
}

struct Connection {
    user_id: i32,
    /// Empty means "everything"
    topics: HashSet<String>,
    tx: mpsc::Sender<String>,
}

impl Connection {
    fn wants(&self, topic: &str) -> bool {
        self.topics.is_empty() || self.topics.contains(topic)
    }
}

struct RegistryInner {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    next_id: AtomicU64,
    capacity: usize,
    closed: AtomicBool,
}

/// Registry of open realtime connections, owned by `AppState`.
///
/// Created once at startup; `close_all` at shutdown drops every sender so
/// the socket tasks observe end-of-stream and exit.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                connections: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                capacity: capacity.max(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns `None` once the registry has been closed.
    pub fn register(&self, user_id: i32) -> Option<(ConnectionId, mpsc::Receiver<String>)> {
        // `closed` is checked and set under the write lock so nothing is
        // inserted after `close_all` has drained the map
        let mut connections = self.inner.connections.write();
        if self.inner.closed.load(Ordering::Acquire) {
            return None;
        }

        let (tx, rx) = mpsc::channel(self.inner.capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        connections.insert(
            id,
            Connection {
                user_id,
                topics: HashSet::new(),
                tx,
            },
        );
        drop(connections);
        debug!(connection_id = id, user_id, "Realtime connection registered");
        Some((id, rx))
    }

    pub fn unregister(&self, id: ConnectionId) {
        if self.inner.connections.write().remove(&id).is_some() {
            debug!(connection_id = id, "Realtime connection removed");
        }
    }

    /// Restrict a connection to the named topics (cumulative)
    pub fn subscribe(&self, id: ConnectionId, topic: &str) -> bool {
        match self.inner.connections.write().get_mut(&id) {
            Some(conn) => {
                conn.topics.insert(topic.to_string());
                true
            }
            None => false,
        }
    }

    /// Best-effort push to every open connection of `user_id`.
    ///
    /// Returns the number of connections the event was handed to. Full
    /// buffers drop the event; closed channels are pruned.
    pub fn push_live(&self, user_id: i32, event: &LiveEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize live event: {}", e);
                return 0;
            }
        };
        let topic = event.topic();

        let mut delivered = 0;
        let mut stale = Vec::new();
        {
            let connections = self.inner.connections.read();
            for (id, conn) in connections.iter() {
                if conn.user_id != user_id || !conn.wants(topic) {
                    continue;
                }
                match conn.tx.try_send(payload.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(connection_id = id, user_id, topic, "Live event dropped, buffer full");
                    }
                    Err(TrySendError::Closed(_)) => stale.push(*id),
                }
            }
        }

        if !stale.is_empty() {
            let mut connections = self.inner.connections.write();
            for id in stale {
                connections.remove(&id);
            }
        }

        delivered
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.read().len()
    }

    pub fn connections_for(&self, user_id: i32) -> usize {
        self.inner
            .connections
            .read()
            .values()
            .filter(|c| c.user_id == user_id)
            .count()
    }

    pub fn close_all(&self) {
        let drained = {
            let mut connections = self.inner.connections.write();
            self.inner.closed.store(true, Ordering::Release);
            let n = connections.len();
            connections.clear();
            n
        };
        debug!("Closed {} realtime connections", drained);
    }
}
