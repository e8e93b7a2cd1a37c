use super::IPushLogRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use hicalendar_push_domain::{PushLogEntry, ID};

pub struct InMemoryPushLogRepo {
    entries: std::sync::Mutex<Vec<PushLogEntry>>,
}

impl InMemoryPushLogRepo {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IPushLogRepo for InMemoryPushLogRepo {
    async fn insert(&self, entries: &[PushLogEntry]) -> anyhow::Result<()> {
        for entry in entries {
            insert(entry, &self.entries);
        }
        Ok(())
    }

    async fn find_by_event(&self, event_id: &ID) -> Vec<PushLogEntry> {
        find_by(&self.entries, |e| e.event_id == *event_id)
    }

    async fn delete_sent_before(&self, sent_before: DateTime<Utc>) -> anyhow::Result<u64> {
        Ok(delete_by(&self.entries, |e| e.sent_at < sent_before))
    }
}
