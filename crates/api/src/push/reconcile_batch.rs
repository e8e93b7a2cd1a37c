use chrono::{DateTime, Utc};
use futures::future::join_all;
use hicalendar_push_domain::{NotificationBatch, PushLogEntry, PushLogStatus, ReminderKind, SentStatus, ID};
use hicalendar_push_infra::{PushContext, SendResult};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Delivered to at least one device and recorded as sent
    Delivered,
    Failed { error: String },
}

/// What a run reports about one batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub user_id: ID,
    pub kind: ReminderKind,
    pub event_ids: Vec<ID>,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    pub fn is_delivered(&self) -> bool {
        self.outcome == BatchOutcome::Delivered
    }
}

/// Merges the sent flags into every event of the batch.
/// Fails when any single event could not be updated.
async fn mark_batch_as_sent(ctx: &PushContext, batch: &NotificationBatch) -> Result<(), String> {
    let patch = SentStatus::sent_patch(batch.kind);
    let results = join_all(
        batch
            .events
            .iter()
            .map(|event| ctx.repos.events.merge_sent_status(&event.id, &patch)),
    )
    .await;

    let errors = results
        .into_iter()
        .zip(batch.events.iter())
        .filter_map(|(res, event)| res.err().map(|e| format!("event {}: {}", event.id, e)))
        .collect::<Vec<_>>();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

async fn append_push_logs(
    ctx: &PushContext,
    batch: &NotificationBatch,
    status: PushLogStatus,
    detail: Option<String>,
    now: DateTime<Utc>,
) {
    let entries = PushLogEntry::for_batch(batch, status, detail, now);
    if let Err(e) = ctx.repos.push_logs.insert(&entries).await {
        warn!(
            "Failed to log {} notification for user {}: {:?}",
            status.as_str(),
            batch.user_id,
            e
        );
    }
}

async fn deactivate_invalid_tokens(ctx: &PushContext, send_result: &SendResult) {
    let invalid = send_result.invalid_tokens();
    if invalid.is_empty() {
        return;
    }
    match ctx.repos.devices.deactivate(&invalid).await {
        Ok(count) => info!("Deactivated {} invalid device tokens", count),
        Err(e) => warn!("Failed to deactivate invalid tokens: {:?}", e),
    }
}

/// Records the result of sending `batch`.
///
/// Sent flags are only written after a confirmed delivery. When writing them
/// fails the batch counts as failed even though devices got the push.
#[tracing::instrument(name = "ReconcileBatch", skip(ctx, batch, send_result), fields(user_id = %batch.user_id, kind = %batch.kind))]
pub async fn reconcile_batch(
    ctx: &PushContext,
    batch: &NotificationBatch,
    send_result: &SendResult,
    now: DateTime<Utc>,
) -> BatchReport {
    deactivate_invalid_tokens(ctx, send_result).await;

    let outcome = if send_result.is_delivered() {
        match mark_batch_as_sent(ctx, batch).await {
            Ok(()) => {
                append_push_logs(ctx, batch, PushLogStatus::Sent, None, now).await;
                info!(
                    "Batch notification sent for user {}: {} events",
                    batch.user_id,
                    batch.events.len()
                );
                BatchOutcome::Delivered
            }
            Err(e) => {
                error!(
                    "Push delivered but recording it failed for user {}. It may be sent again. Error: {}",
                    batch.user_id, e
                );
                let error = format!("Database update failure after successful push: {}", e);
                append_push_logs(ctx, batch, PushLogStatus::Failed, Some(error.clone()), now).await;
                BatchOutcome::Failed { error }
            }
        }
    } else {
        let error = format!(
            "APNs push failed for all devices in batch (failures: {}): {}",
            send_result.failure_count,
            send_result.error_detail()
        );
        warn!("{}", error);
        append_push_logs(ctx, batch, PushLogStatus::Failed, Some(error.clone()), now).await;
        BatchOutcome::Failed { error }
    };

    BatchReport {
        user_id: batch.user_id,
        kind: batch.kind,
        event_ids: batch.event_ids(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::test_fakes::{context_at, FailingEventRepo};
    use chrono::Duration;
    use hicalendar_push_domain::{DeviceToken, DueReminderGroup, PushEvent};
    use hicalendar_push_infra::DeviceFailure;
    use std::sync::Arc;

    async fn stored_batch(ctx: &PushContext, now: DateTime<Utc>) -> NotificationBatch {
        let user_id = ID::default();
        let mut event = PushEvent::new(user_id, "开会");
        event.start_at = Some(now + Duration::hours(20));
        event.reminder_kinds = vec![ReminderKind::OneDay];
        ctx.repos.events.insert(&event).await.unwrap();
        for token in &["good", "bad"] {
            ctx.repos
                .devices
                .insert(&DeviceToken::new(user_id, *token))
                .await
                .unwrap();
        }
        let group = DueReminderGroup {
            user_id,
            kind: ReminderKind::OneDay,
            events: vec![event],
        };
        NotificationBatch::new(group, "明天「开会」".into(), vec!["good".into(), "bad".into()])
    }

    fn bad_token_failure() -> DeviceFailure {
        DeviceFailure {
            device_token: "bad".into(),
            status: Some(410),
            body: r#"{"reason":"Unregistered"}"#.into(),
        }
    }

    #[actix_web::main]
    #[test]
    async fn delivered_batch_is_marked_logged_and_cleaned() {
        let (ctx, now) = context_at("2024-03-10T12:00:00Z");
        let batch = stored_batch(&ctx, now).await;
        let send_result = SendResult {
            success_count: 1,
            failure_count: 1,
            failures: vec![bad_token_failure()],
        };

        let report = reconcile_batch(&ctx, &batch, &send_result, now).await;
        assert!(report.is_delivered());

        let event_id = batch.events[0].id;
        let stored = ctx.repos.events.find(&event_id).await.unwrap();
        assert!(stored.sent_status.is_sent(ReminderKind::OneDay));
        let logs = ctx.repos.push_logs.find_by_event(&event_id).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, PushLogStatus::Sent);
        assert_eq!(logs[0].notification_type, "day_before");
        let tokens = ctx.repos.devices.find_active_tokens(&batch.user_id).await.unwrap();
        assert_eq!(tokens, vec!["good".to_string()]);
    }

    #[actix_web::main]
    #[test]
    async fn undelivered_batch_keeps_sent_status() {
        let (ctx, now) = context_at("2024-03-10T12:00:00Z");
        let batch = stored_batch(&ctx, now).await;
        let send_result = SendResult {
            success_count: 0,
            failure_count: 1,
            failures: vec![bad_token_failure()],
        };

        let report = reconcile_batch(&ctx, &batch, &send_result, now).await;
        assert!(!report.is_delivered());

        let event_id = batch.events[0].id;
        let stored = ctx.repos.events.find(&event_id).await.unwrap();
        assert!(stored.sent_status.is_empty());
        let logs = ctx.repos.push_logs.find_by_event(&event_id).await;
        assert_eq!(logs[0].status, PushLogStatus::Failed);
        assert!(logs[0].apns_response.as_deref().unwrap().contains("410"));
        // The verdict about the token holds regardless of the other devices
        assert!(!ctx.repos.devices.find_by_token("bad").await.unwrap().is_active);
    }

    #[actix_web::main]
    #[test]
    async fn failing_sent_status_write_fails_the_batch() {
        let (mut ctx, now) = context_at("2024-03-10T12:00:00Z");
        let batch = stored_batch(&ctx, now).await;
        ctx.repos.events = Arc::new(FailingEventRepo::wrapping(ctx.repos.events.clone()));
        let send_result = SendResult {
            success_count: 2,
            failure_count: 0,
            failures: vec![],
        };

        let report = reconcile_batch(&ctx, &batch, &send_result, now).await;
        match &report.outcome {
            BatchOutcome::Failed { error } => {
                assert!(error.starts_with("Database update failure after successful push"))
            }
            other => panic!("Expected failure, got {:?}", other),
        }

        let event_id = batch.events[0].id;
        let stored = ctx.repos.events.find(&event_id).await.unwrap();
        assert!(stored.sent_status.is_empty());
        let logs = ctx.repos.push_logs.find_by_event(&event_id).await;
        assert_eq!(logs[0].status, PushLogStatus::Failed);
    }
}
