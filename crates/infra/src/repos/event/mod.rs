mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
use hicalendar_push_domain::{PushEvent, SentStatus, ID};
pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, e: &PushEvent) -> anyhow::Result<()>;
    async fn find(&self, event_id: &ID) -> Option<PushEvent>;
    /// Events with at least one reminder configured in either scheme
    async fn find_push_candidates(&self) -> anyhow::Result<Vec<PushEvent>>;
    /// Merges `patch` into the stored `push_status` in one row update.
    /// Fails when the event does not exist.
    async fn merge_sent_status(&self, event_id: &ID, patch: &SentStatus) -> anyhow::Result<()>;
    /// Clears `push_status` of timed events that started before `timed_before`
    /// and of undated events whose anchor day (intended day, else the day
    /// they were created) lies before `undated_anchored_before`.
    /// Returns the number of reset events.
    async fn reset_expired_sent_status(
        &self,
        timed_before: DateTime<Utc>,
        undated_anchored_before: DateTime<Utc>,
    ) -> anyhow::Result<u64>;
}
