use super::reconcile_batch::{reconcile_batch, BatchReport};
use chrono::{DateTime, Utc};
use hicalendar_push_domain::NotificationBatch;
use hicalendar_push_infra::{send_batch, PushContext};
use tracing::info;

/// Sends one batch to all of its devices and records the result
pub async fn deliver_batch(
    ctx: &PushContext,
    provider_token: &str,
    batch: NotificationBatch,
    now: DateTime<Utc>,
) -> BatchReport {
    info!(
        "Sending {} notification to user {} on {} devices: {}",
        batch.kind,
        batch.user_id,
        batch.device_tokens.len(),
        batch.message
    );
    let send_result = send_batch(ctx.gateway.as_ref(), provider_token, &batch).await;
    info!(
        "APNs push result for user {} -> success: {}, fail: {}",
        batch.user_id, send_result.success_count, send_result.failure_count
    );
    reconcile_batch(ctx, &batch, &send_result, now).await
}
