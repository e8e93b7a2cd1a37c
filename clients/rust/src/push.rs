use crate::{APIResponse, BaseClient};
use hicalendar_push_api_structs::{push_cron, run_push_scheduler, send_test_push};
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct PushClient {
    base: Arc<BaseClient>,
}

impl PushClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn run_scheduler(&self) -> APIResponse<run_push_scheduler::APIResponse> {
        self.base
            .post(json!({}), "push/scheduler".into(), StatusCode::OK)
            .await
    }

    pub async fn trigger_cron(&self) -> APIResponse<push_cron::APIResponse> {
        self.base
            .post(json!({}), "push/cron".into(), StatusCode::OK)
            .await
    }

    pub async fn send_test_push(
        &self,
        device_token: String,
    ) -> APIResponse<send_test_push::APIResponse> {
        let body = send_test_push::RequestBody { device_token };
        self.base
            .post(body, "push/test".into(), StatusCode::OK)
            .await
    }
}
