use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::notifications;

/// Notification type tags stored in `notifications.kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Deposit,
    Withdrawal,
    TransferSent,
    TransferReceived,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Deposit => "deposit",
            NotificationKind::Withdrawal => "withdrawal",
            NotificationKind::TransferSent => "transfer_sent",
            NotificationKind::TransferReceived => "transfer_received",
            NotificationKind::System => "system",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(NotificationKind::Deposit),
            "withdrawal" => Ok(NotificationKind::Withdrawal),
            "transfer_sent" => Ok(NotificationKind::TransferSent),
            "transfer_received" => Ok(NotificationKind::TransferReceived),
            "system" => Ok(NotificationKind::System),
            _ => Err(format!("Unknown notification kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub data: Option<Value>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notifications::Model> for NotificationResponse {
    fn from(model: notifications::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            title: model.title,
            message: model.message,
            data: model.data,
            is_read: model.is_read,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    pub unread: Option<bool>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub success: bool,
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        for kind in [
            NotificationKind::Deposit,
            NotificationKind::Withdrawal,
            NotificationKind::TransferSent,
            NotificationKind::TransferReceived,
            NotificationKind::System,
        ] {
            assert_eq!(kind.as_str().parse::<NotificationKind>().unwrap(), kind);
        }
        assert_eq!(
            serde_json::to_value(NotificationKind::TransferSent).unwrap(),
            "transfer_sent"
        );
    }
}
