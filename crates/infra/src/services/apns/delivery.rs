use super::client::{DeliveryOutcome, IPushGateway};
use super::payload::ApnsPayload;
use futures::future::join_all;
use hicalendar_push_domain::{token_prefix, NotificationBatch};
use serde::Serialize;
use tracing::{info, warn};

/// A device the payload could not be delivered to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceFailure {
    pub device_token: String,
    /// `None` when the gateway never answered
    pub status: Option<u16>,
    pub body: String,
}

impl DeviceFailure {
    /// The gateway says this token will never accept pushes again
    pub fn is_permanently_invalid(&self) -> bool {
        let body = self.body.to_lowercase();
        matches!(self.status, Some(400) | Some(410))
            && (body.contains("baddevicetoken") || body.contains("unregistered"))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<DeviceFailure>,
}

impl SendResult {
    /// One reached device is enough for the batch to count as delivered
    pub fn is_delivered(&self) -> bool {
        self.success_count > 0
    }

    pub fn invalid_tokens(&self) -> Vec<String> {
        self.failures
            .iter()
            .filter(|f| f.is_permanently_invalid())
            .map(|f| f.device_token.clone())
            .collect()
    }

    /// Condensed failure detail for the push log
    pub fn error_detail(&self) -> String {
        if self.failures.is_empty() {
            return "No device accepted the notification".into();
        }
        self.failures
            .iter()
            .map(|f| match f.status {
                Some(status) => format!("{}: {} {}", token_prefix(&f.device_token), status, f.body),
                None => format!("{}: {}", token_prefix(&f.device_token), f.body),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Delivers `payload` to every token concurrently and collects the outcomes.
pub async fn send_to_devices(
    gateway: &dyn IPushGateway,
    provider_token: &str,
    device_tokens: &[String],
    payload: &ApnsPayload,
) -> SendResult {
    let outcomes = join_all(device_tokens.iter().map(|device_token| async move {
        let outcome = gateway.deliver(provider_token, device_token, payload).await;
        (device_token, outcome)
    }))
    .await;

    let mut result = SendResult::default();
    for (device_token, outcome) in outcomes {
        let failure = match outcome {
            DeliveryOutcome::Delivered { apns_id, .. } => {
                info!(
                    "Push delivered to device {}... apns-id: {}",
                    token_prefix(device_token),
                    apns_id.as_deref().unwrap_or("N/A")
                );
                result.success_count += 1;
                continue;
            }
            DeliveryOutcome::Rejected { status, body, .. } => DeviceFailure {
                device_token: device_token.clone(),
                status: Some(status),
                body,
            },
            DeliveryOutcome::Unreachable { reason } => DeviceFailure {
                device_token: device_token.clone(),
                status: None,
                body: reason,
            },
        };
        warn!(
            "Push to device {}... failed. Status: {:?}, response: {}",
            token_prefix(device_token),
            failure.status,
            failure.body
        );
        result.failures.push(failure);
    }
    result.failure_count = result.failures.len();
    result
}

pub async fn send_batch(
    gateway: &dyn IPushGateway,
    provider_token: &str,
    batch: &NotificationBatch,
) -> SendResult {
    let payload = ApnsPayload::for_batch(batch);
    send_to_devices(gateway, provider_token, &batch.device_tokens, &payload).await
}
