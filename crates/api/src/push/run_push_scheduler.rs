use super::cleanup_push_data::{CleanupPushDataUseCase, CleanupSummary};
use super::deliver_batch::deliver_batch;
use super::reconcile_batch::{BatchOutcome, BatchReport};
use super::select_due_batches::{self, SelectDueBatchesUseCase};
use crate::{
    error::PushError,
    shared::{
        auth::protect_scheduler_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use hicalendar_push_api_structs::dtos::BatchFailureDTO;
use hicalendar_push_api_structs::run_push_scheduler::*;
use hicalendar_push_infra::{GatewayAuthError, PushContext};
use tracing::info;

fn handle_error(e: UseCaseError) -> PushError {
    match e {
        UseCaseError::CandidateQuery(e) => {
            PushError::RunFailed(format!("Failed to query events: {}", e))
        }
        UseCaseError::GatewayAuth(e) => PushError::RunFailed(format!("JWT generation failed: {}", e)),
    }
}

pub async fn run_push_scheduler_controller(
    http_req: HttpRequest,
    ctx: web::Data<PushContext>,
) -> Result<HttpResponse, PushError> {
    protect_scheduler_route(&http_req, &ctx)?;

    execute(RunPushSchedulerUseCase, &ctx)
        .await
        .map(|summary| HttpResponse::Ok().json(APIResponse::from(summary)))
        .map_err(handle_error)
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
    pub cleanup: CleanupSummary,
    pub failures: Vec<BatchReport>,
    pub timestamp: DateTime<Utc>,
}

impl From<RunSummary> for APIResponse {
    fn from(summary: RunSummary) -> Self {
        Self {
            success: true,
            sent: summary.sent,
            failed: summary.failed,
            total: summary.total,
            cleanup: summary.cleanup.into(),
            failures: summary
                .failures
                .into_iter()
                .map(|report| BatchFailureDTO {
                    user_id: report.user_id,
                    reminder_kind: report.kind,
                    event_ids: report.event_ids,
                    error: match report.outcome {
                        BatchOutcome::Failed { error } => error,
                        BatchOutcome::Delivered => String::new(),
                    },
                })
                .collect(),
            timestamp: summary.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// One complete scheduler tick: cleanup, selection, then delivery and
/// reconciliation of every batch.
#[derive(Debug)]
pub struct RunPushSchedulerUseCase;

#[derive(Debug)]
pub enum UseCaseError {
    CandidateQuery(String),
    GatewayAuth(GatewayAuthError),
}

impl From<select_due_batches::UseCaseError> for UseCaseError {
    fn from(e: select_due_batches::UseCaseError) -> Self {
        match e {
            select_due_batches::UseCaseError::CandidateQuery(e) => Self::CandidateQuery(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RunPushSchedulerUseCase {
    type Response = RunSummary;

    type Errors = UseCaseError;

    #[tracing::instrument(name = "RunPushScheduler", skip(self, ctx))]
    async fn execute(&mut self, ctx: &PushContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.now();

        let cleanup = match execute(CleanupPushDataUseCase, ctx).await {
            Ok(summary) => summary,
            Err(never) => match never {},
        };

        let batches = execute(SelectDueBatchesUseCase { now }, ctx).await?;
        let total = batches.len();
        if batches.is_empty() {
            info!("No notifications to send");
            return Ok(RunSummary {
                sent: 0,
                failed: 0,
                total,
                cleanup,
                failures: Vec::new(),
                timestamp: now,
            });
        }

        let provider_token = ctx
            .gateway
            .provider_token(now.timestamp())
            .map_err(UseCaseError::GatewayAuth)?;

        let reports = stream::iter(batches)
            .map(|batch| deliver_batch(ctx, &provider_token, batch, now))
            .buffer_unordered(ctx.config.batch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let (delivered, failures): (Vec<_>, Vec<_>) =
            reports.into_iter().partition(|r| r.is_delivered());
        info!(
            "Push scheduler completed: {} sent, {} failed",
            delivered.len(),
            failures.len()
        );

        Ok(RunSummary {
            sent: delivered.len(),
            failed: failures.len(),
            total,
            cleanup,
            failures,
            timestamp: now,
        })
    }
}
