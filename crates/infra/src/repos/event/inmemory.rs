use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use hicalendar_push_domain::{PushEvent, SentStatus, ID};

pub struct InMemoryEventRepo {
    events: std::sync::Mutex<Vec<PushEvent>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, e: &PushEvent) -> anyhow::Result<()> {
        insert(e, &self.events);
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<PushEvent> {
        find(event_id, &self.events)
    }

    async fn find_push_candidates(&self) -> anyhow::Result<Vec<PushEvent>> {
        Ok(find_by(&self.events, |e| {
            e.legacy_day_before || e.legacy_week_before || !e.reminder_kinds.is_empty()
        }))
    }

    async fn merge_sent_status(&self, event_id: &ID, patch: &SentStatus) -> anyhow::Result<()> {
        let updated = update_many(
            &self.events,
            |e| e.id == *event_id,
            |e| e.sent_status.merge(patch),
        );
        if updated == 0 {
            return Err(anyhow::Error::msg(format!("Event {} not found", event_id)));
        }
        Ok(())
    }

    async fn reset_expired_sent_status(
        &self,
        timed_before: DateTime<Utc>,
        undated_anchored_before: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let updated = update_many(
            &self.events,
            |e| {
                if e.sent_status.is_empty() {
                    return false;
                }
                match (e.start_at, e.effective_anchor()) {
                    (Some(start_at), _) => start_at < timed_before,
                    (None, Some(anchor)) => anchor < undated_anchored_before,
                    (None, None) => false,
                }
            },
            |e| e.sent_status = SentStatus::new(),
        );
        Ok(updated)
    }
}
