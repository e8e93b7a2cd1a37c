use crate::dtos::{BatchFailureDTO, CleanupSummaryDTO};
use serde::{Deserialize, Serialize};

pub mod run_push_scheduler {
    use super::*;

    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
        /// Batches delivered and recorded
        pub sent: usize,
        pub failed: usize,
        /// Batches built during the run
        pub total: usize,
        pub cleanup: CleanupSummaryDTO,
        pub failures: Vec<BatchFailureDTO>,
        /// RFC 3339
        pub timestamp: String,
    }
}

pub mod push_cron {
    use super::*;

    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
        pub timestamp: String,
        /// Whatever the scheduler trigger answered with
        pub scheduler_result: serde_json::Value,
    }
}

pub mod send_test_push {
    use super::*;

    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub device_token: String,
    }

    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
        /// `None` when the gateway could not be reached
        pub apns_status: Option<u16>,
        pub apns_id: Option<String>,
        pub apns_response: Option<String>,
    }
}

/// Body of every failed request
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
