use super::IEventRepo;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use hicalendar_push_domain::{InvalidReminderKindError, PushEvent, ReminderKind, SentStatus, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::warn;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    id: Uuid,
    title: String,
    start_at: Option<DateTime<Utc>>,
    intended_date: Option<NaiveDate>,
    created_at: Option<DateTime<Utc>>,
    user_id: Uuid,
    push_reminders: Option<Vec<String>>,
    push_day_before: Option<bool>,
    push_week_before: Option<bool>,
    push_status: Option<Json<SentStatus>>,
}

fn parse_reminder_kinds(event_id: &Uuid, raw: Vec<String>) -> Vec<ReminderKind> {
    raw.iter()
        .filter_map(|value| match value.parse::<ReminderKind>() {
            Ok(kind) => Some(kind),
            Err(InvalidReminderKindError::Disabled) => None,
            Err(e) => {
                warn!("Ignoring reminder of event {}: {}", event_id, e);
                None
            }
        })
        .collect()
}

impl Into<PushEvent> for EventRaw {
    fn into(self) -> PushEvent {
        let reminder_kinds =
            parse_reminder_kinds(&self.id, self.push_reminders.unwrap_or_default());
        PushEvent {
            id: self.id.into(),
            title: self.title,
            start_at: self.start_at,
            intended_date: self
                .intended_date
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|midnight| Utc.from_utc_datetime(&midnight)),
            created_at: self.created_at,
            user_id: self.user_id.into(),
            reminder_kinds,
            legacy_day_before: self.push_day_before.unwrap_or(false),
            legacy_week_before: self.push_week_before.unwrap_or(false),
            sent_status: self.push_status.map(|s| s.0).unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert(&self, e: &PushEvent) -> anyhow::Result<()> {
        let push_reminders = e
            .reminder_kinds
            .iter()
            .map(|kind| kind.as_str().to_string())
            .collect::<Vec<_>>();
        let push_status = if e.sent_status.is_empty() {
            None
        } else {
            Some(Json(&e.sent_status))
        };
        sqlx::query(
            r#"
            INSERT INTO events(id, title, start_at, intended_date, created_at, user_id,
                push_reminders, push_day_before, push_week_before, push_status)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(e.id.inner_ref())
        .bind(&e.title)
        .bind(e.start_at)
        .bind(e.intended_date.map(|d| d.date_naive()))
        .bind(e.created_at)
        .bind(e.user_id.inner_ref())
        .bind(&push_reminders)
        .bind(e.legacy_day_before)
        .bind(e.legacy_week_before)
        .bind(push_status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<PushEvent> {
        let res: Option<EventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM events AS e
            WHERE e.id = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()?;
        res.map(|e| e.into())
    }

    async fn find_push_candidates(&self) -> anyhow::Result<Vec<PushEvent>> {
        let events: Vec<EventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM events AS e
            WHERE e.push_day_before = true
            OR e.push_week_before = true
            OR cardinality(e.push_reminders) > 0
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events.into_iter().map(|e| e.into()).collect())
    }

    async fn merge_sent_status(&self, event_id: &ID, patch: &SentStatus) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE events
            SET push_status = COALESCE(push_status, '{}'::jsonb) || $2
            WHERE id = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .bind(Json(patch))
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(anyhow::Error::msg(format!("Event {} not found", event_id)));
        }
        Ok(())
    }

    async fn reset_expired_sent_status(
        &self,
        timed_before: DateTime<Utc>,
        undated_anchored_before: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE events
            SET push_status = NULL
            WHERE push_status IS NOT NULL
            AND (
                start_at < $1
                OR (
                    start_at IS NULL
                    AND (
                        COALESCE(intended_date, (created_at AT TIME ZONE 'UTC')::date)::timestamp
                        AT TIME ZONE 'UTC'
                    ) < $2
                )
            )
            "#,
        )
        .bind(timed_before)
        .bind(undated_anchored_before)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }
}
