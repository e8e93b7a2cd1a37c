use super::IPushLogRepo;
use chrono::{DateTime, Utc};
use hicalendar_push_domain::{PushLogEntry, PushLogStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::warn;

pub struct PostgresPushLogRepo {
    pool: PgPool,
}

impl PostgresPushLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PushLogRaw {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    #[sqlx(rename = "type")]
    notification_type: String,
    message: String,
    sent_at: DateTime<Utc>,
    status: String,
    apns_response: Option<String>,
}

impl Into<PushLogEntry> for PushLogRaw {
    fn into(self) -> PushLogEntry {
        let status = self.status.parse().unwrap_or_else(|e| {
            warn!("{}", e);
            PushLogStatus::Failed
        });
        PushLogEntry {
            id: self.id.into(),
            user_id: self.user_id.into(),
            event_id: self.event_id.into(),
            notification_type: self.notification_type,
            message: self.message,
            sent_at: self.sent_at,
            status,
            apns_response: self.apns_response,
        }
    }
}

#[async_trait::async_trait]
impl IPushLogRepo for PostgresPushLogRepo {
    async fn insert(&self, entries: &[PushLogEntry]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO push_notifications(id, user_id, event_id, type, message, sent_at, status, apns_response)
                VALUES($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(entry.id.inner_ref())
            .bind(entry.user_id.inner_ref())
            .bind(entry.event_id.inner_ref())
            .bind(&entry.notification_type)
            .bind(&entry.message)
            .bind(entry.sent_at)
            .bind(entry.status.as_str())
            .bind(&entry.apns_response)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn find_by_event(&self, event_id: &ID) -> Vec<PushLogEntry> {
        let entries: Vec<PushLogRaw> = sqlx::query_as(
            r#"
            SELECT * FROM push_notifications AS p
            WHERE p.event_id = $1
            ORDER BY p.sent_at
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();
        entries.into_iter().map(|e| e.into()).collect()
    }

    async fn delete_sent_before(&self, sent_before: DateTime<Utc>) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            DELETE FROM push_notifications
            WHERE sent_at < $1
            "#,
        )
        .bind(sent_before)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }
}
