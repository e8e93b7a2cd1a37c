use crate::batch::NotificationBatch;
use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushLogStatus {
    Sent,
    Failed,
}

impl PushLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for PushLogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(format!("Unknown push log status: {}", other)),
        }
    }
}

/// Append-only audit record of a delivery attempt for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct PushLogEntry {
    pub id: ID,
    pub user_id: ID,
    pub event_id: ID,
    /// Template pool name of the reminder kind, e.g. `day_before`
    pub notification_type: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub status: PushLogStatus,
    /// Gateway or persistence error detail of a failed attempt
    pub apns_response: Option<String>,
}

impl Entity for PushLogEntry {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl PushLogEntry {
    /// One entry per event of the batch
    pub fn for_batch(
        batch: &NotificationBatch,
        status: PushLogStatus,
        apns_response: Option<String>,
        sent_at: DateTime<Utc>,
    ) -> Vec<Self> {
        batch
            .events
            .iter()
            .map(|event| Self {
                id: Default::default(),
                user_id: event.user_id,
                event_id: event.id,
                notification_type: batch.kind.log_type().to_string(),
                message: batch.message.clone(),
                sent_at,
                status,
                apns_response: apns_response.clone(),
            })
            .collect()
    }
}
