mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
use hicalendar_push_domain::{PushLogEntry, ID};
pub use inmemory::InMemoryPushLogRepo;
pub use postgres::PostgresPushLogRepo;

#[async_trait::async_trait]
pub trait IPushLogRepo: Send + Sync {
    async fn insert(&self, entries: &[PushLogEntry]) -> anyhow::Result<()>;
    async fn find_by_event(&self, event_id: &ID) -> Vec<PushLogEntry>;
    /// Deletes entries sent before `sent_before`. Returns the number deleted
    async fn delete_sent_before(&self, sent_before: DateTime<Utc>) -> anyhow::Result<u64>;
}

#[cfg(test)]
mod tests {
    use crate::repos::Repos;
    use chrono::{Duration, Utc};
    use hicalendar_push_domain::{PushLogEntry, PushLogStatus, ID};

    fn entry(event_id: ID, days_ago: i64) -> PushLogEntry {
        PushLogEntry {
            id: Default::default(),
            user_id: ID::default(),
            event_id,
            notification_type: "day_before".into(),
            message: "Reminder".into(),
            sent_at: Utc::now() - Duration::days(days_ago),
            status: PushLogStatus::Sent,
            apns_response: None,
        }
    }

    #[actix_web::main]
    #[test]
    async fn deletes_only_old_entries() {
        let repos = Repos::create_inmemory();
        let event_id = ID::default();
        repos
            .push_logs
            .insert(&[entry(event_id, 31), entry(event_id, 29), entry(event_id, 0)])
            .await
            .unwrap();

        let deleted = repos
            .push_logs
            .delete_sent_before(Utc::now() - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(repos.push_logs.find_by_event(&event_id).await.len(), 2);
    }
}
