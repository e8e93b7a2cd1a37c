use crate::shared::usecase::UseCase;
use chrono::Duration;
use hicalendar_push_api_structs::dtos::CleanupSummaryDTO;
use hicalendar_push_infra::PushContext;
use std::convert::Infallible;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupSummary {
    pub deleted_push_logs: u64,
    pub reset_events: u64,
    pub errors: Vec<String>,
}

impl From<CleanupSummary> for CleanupSummaryDTO {
    fn from(summary: CleanupSummary) -> Self {
        Self {
            deleted_notifications: summary.deleted_push_logs,
            reset_push_status: summary.reset_events,
            errors: summary.errors,
        }
    }
}

/// Purges old push logs and clears the sent flags of events whose reminder
/// window has closed for good. Failures end up in the summary.
#[derive(Debug)]
pub struct CleanupPushDataUseCase;

#[async_trait::async_trait(?Send)]
impl UseCase for CleanupPushDataUseCase {
    type Response = CleanupSummary;

    type Errors = Infallible;

    #[tracing::instrument(name = "CleanupPushData", skip(self, ctx))]
    async fn execute(&mut self, ctx: &PushContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.now();
        let retention = ctx.config.retention;
        let mut summary = CleanupSummary::default();

        match ctx
            .repos
            .push_logs
            .delete_sent_before(now - Duration::days(retention.push_log_days))
            .await
        {
            Ok(deleted) => {
                info!("Deleted {} old push notification records", deleted);
                summary.deleted_push_logs = deleted;
            }
            Err(e) => {
                warn!("Failed to delete old push notifications: {:?}", e);
                summary.errors.push(format!("Delete notifications: {}", e));
            }
        }

        match ctx
            .repos
            .events
            .reset_expired_sent_status(
                now - Duration::days(retention.timed_event_days),
                now - Duration::days(retention.undated_event_days),
            )
            .await
        {
            Ok(reset) => {
                info!("Reset push_status for {} expired events", reset);
                summary.reset_events = reset;
            }
            Err(e) => {
                warn!("Failed to reset expired push_status: {:?}", e);
                summary.errors.push(format!("Reset push status: {}", e));
            }
        }

        Ok(summary)
    }
}
