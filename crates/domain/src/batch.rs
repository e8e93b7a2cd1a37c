use crate::evaluator::due_kinds;
use crate::event::PushEvent;
use crate::reminder::ReminderKind;
use crate::shared::entity::ID;
use chrono::{DateTime, Utc};
use itertools::Itertools;

/// All events of one user that are due for the same reminder kind.
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminderGroup {
    pub user_id: ID,
    pub kind: ReminderKind,
    pub events: Vec<PushEvent>,
}

/// One notification to deliver to every active device of a user.
/// Lives only for the duration of a scheduler run.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationBatch {
    pub user_id: ID,
    pub kind: ReminderKind,
    pub events: Vec<PushEvent>,
    pub message: String,
    pub device_tokens: Vec<String>,
}

impl NotificationBatch {
    pub fn new(group: DueReminderGroup, message: String, device_tokens: Vec<String>) -> Self {
        Self {
            user_id: group.user_id,
            kind: group.kind,
            events: group.events,
            message,
            device_tokens,
        }
    }

    /// Event referenced in the push payload for log correlation
    pub fn representative_event_id(&self) -> Option<&ID> {
        self.events.first().map(|e| &e.id)
    }

    pub fn event_ids(&self) -> Vec<ID> {
        self.events.iter().map(|e| e.id).collect()
    }
}

/// Evaluates every event and groups the due reminders by user and kind.
///
/// A user therefore gets at most one notification per long-lead kind per run,
/// however many events are due. Within a group events keep their input order.
pub fn group_due_reminders(events: &[PushEvent], now: DateTime<Utc>) -> Vec<DueReminderGroup> {
    events
        .iter()
        .flat_map(|event| {
            due_kinds(event, now)
                .into_iter()
                .map(move |kind| ((event.user_id, kind), event.clone()))
        })
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(key, _)| *key)
        .map(|((user_id, kind), events)| DueReminderGroup {
            user_id,
            kind,
            events,
        })
        .collect()
}
