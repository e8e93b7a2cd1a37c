use hicalendar_push_domain::{ReminderKind, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSummaryDTO {
    pub deleted_notifications: u64,
    pub reset_push_status: u64,
    pub errors: Vec<String>,
}

/// A batch that did not end up recorded as delivered
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailureDTO {
    pub user_id: ID,
    pub reminder_kind: ReminderKind,
    pub event_ids: Vec<ID>,
    pub error: String,
}
