use crate::{
    error::PushError,
    shared::{
        auth::{protect_cron_route, API_KEY_HEADER},
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::SecondsFormat;
use hicalendar_push_api_structs::push_cron::*;
use hicalendar_push_infra::PushContext;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// A full scheduler run may take a while with many batches
const FORWARD_TIMEOUT: Duration = Duration::from_secs(120);

fn handle_error(e: UseCaseError) -> PushError {
    match e {
        UseCaseError::Unreachable(e) => {
            PushError::BadGateway(format!("Push scheduler unreachable: {}", e))
        }
        UseCaseError::InvalidResponse(e) => {
            PushError::BadGateway(format!("Push scheduler returned an invalid response: {}", e))
        }
    }
}

pub async fn push_cron_controller(
    http_req: HttpRequest,
    ctx: web::Data<PushContext>,
) -> Result<HttpResponse, PushError> {
    protect_cron_route(&http_req, &ctx)?;

    info!("Push cron triggered");
    let usecase = ForwardSchedulerTriggerUseCase {
        scheduler_url: ctx.config.scheduler_url.clone(),
        api_key: ctx.config.scheduler_api_key.clone(),
    };

    let timestamp = ctx.sys.now().to_rfc3339_opts(SecondsFormat::Millis, true);
    execute(usecase, &ctx)
        .await
        .map(|scheduler_result| {
            HttpResponse::Ok().json(APIResponse {
                success: true,
                timestamp,
                scheduler_result,
            })
        })
        .map_err(handle_error)
}

/// Calls the scheduler trigger and hands back whatever it answered.
/// Holds no scheduling logic of its own.
#[derive(Debug)]
pub struct ForwardSchedulerTriggerUseCase {
    pub scheduler_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    Unreachable(String),
    InvalidResponse(String),
}

#[async_trait::async_trait(?Send)]
impl UseCase for ForwardSchedulerTriggerUseCase {
    type Response = Value;

    type Errors = UseCaseError;

    #[tracing::instrument(name = "ForwardSchedulerTrigger", skip(self, _ctx))]
    async fn execute(&mut self, _ctx: &PushContext) -> Result<Self::Response, Self::Errors> {
        let client = awc::Client::builder().timeout(FORWARD_TIMEOUT).finish();
        let mut req = client.post(&self.scheduler_url);
        if let Some(api_key) = &self.api_key {
            req = req.insert_header((API_KEY_HEADER, api_key.as_str()));
        }

        let mut res = req
            .send_json(&serde_json::json!({}))
            .await
            .map_err(|e| UseCaseError::Unreachable(e.to_string()))?;

        let result = res
            .json::<Value>()
            .await
            .map_err(|e| UseCaseError::InvalidResponse(e.to_string()))?;
        info!("Push scheduler answered with status {}", res.status());
        Ok(result)
    }
}
