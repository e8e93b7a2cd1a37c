use crate::{
    error::PushError,
    shared::{
        auth::protect_scheduler_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use hicalendar_push_api_structs::send_test_push::*;
use hicalendar_push_domain::token_prefix;
use hicalendar_push_infra::{ApnsPayload, DeliveryOutcome, GatewayAuthError, PushContext};
use tracing::info;

fn handle_error(e: UseCaseError) -> PushError {
    match e {
        UseCaseError::MissingDeviceToken => {
            PushError::BadClientData("A deviceToken must be provided".into())
        }
        UseCaseError::GatewayAuth(e) => PushError::RunFailed(format!("JWT generation failed: {}", e)),
    }
}

fn to_response(outcome: DeliveryOutcome) -> APIResponse {
    match outcome {
        DeliveryOutcome::Delivered { status, apns_id } => APIResponse {
            success: true,
            apns_status: Some(status),
            apns_id,
            apns_response: None,
        },
        DeliveryOutcome::Rejected {
            status,
            body,
            apns_id,
        } => APIResponse {
            success: false,
            apns_status: Some(status),
            apns_id,
            apns_response: Some(body),
        },
        DeliveryOutcome::Unreachable { reason } => APIResponse {
            success: false,
            apns_status: None,
            apns_id: None,
            apns_response: Some(reason),
        },
    }
}

pub async fn send_test_push_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<PushContext>,
) -> Result<HttpResponse, PushError> {
    protect_scheduler_route(&http_req, &ctx)?;

    let usecase = SendTestPushUseCase {
        device_token: body.0.device_token,
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| HttpResponse::Ok().json(to_response(outcome)))
        .map_err(handle_error)
}

/// Pushes a fixed diagnostic notification to one device. Touches no
/// sent flags and writes no push log.
#[derive(Debug)]
pub struct SendTestPushUseCase {
    pub device_token: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    MissingDeviceToken,
    GatewayAuth(GatewayAuthError),
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendTestPushUseCase {
    type Response = DeliveryOutcome;

    type Errors = UseCaseError;

    #[tracing::instrument(name = "SendTestPush", skip(self, ctx))]
    async fn execute(&mut self, ctx: &PushContext) -> Result<Self::Response, Self::Errors> {
        let device_token = self.device_token.trim();
        if device_token.is_empty() {
            return Err(UseCaseError::MissingDeviceToken);
        }

        let now = ctx.sys.now();
        let provider_token = ctx
            .gateway
            .provider_token(now.timestamp())
            .map_err(UseCaseError::GatewayAuth)?;

        let outcome = ctx
            .gateway
            .deliver(&provider_token, device_token, &ApnsPayload::diagnostic(now))
            .await;
        info!(
            "Test push to device {}... delivered: {}",
            token_prefix(device_token),
            outcome.is_delivered()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::test_fakes::{context_at, FakeGateway};
    use std::sync::Arc;

    #[actix_web::main]
    #[test]
    async fn sends_diagnostic_payload_to_one_device() {
        let (mut ctx, _) = context_at("2024-03-10T12:00:00Z");
        let gateway = Arc::new(FakeGateway::default());
        ctx.gateway = gateway.clone();

        let usecase = SendTestPushUseCase {
            device_token: "device-1".into(),
        };
        let outcome = execute(usecase, &ctx).await.unwrap();
        assert!(outcome.is_delivered());

        let payloads = gateway.delivered_payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].aps.alert.title, "🧪 APNs测试");
        assert!(ctx.repos.push_logs.find_by_event(&Default::default()).await.is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn rejects_blank_token() {
        let (ctx, _) = context_at("2024-03-10T12:00:00Z");
        let usecase = SendTestPushUseCase {
            device_token: "  ".into(),
        };
        assert!(matches!(
            execute(usecase, &ctx).await,
            Err(UseCaseError::MissingDeviceToken)
        ));
    }

    #[test]
    fn response_reports_gateway_verdict() {
        let res = to_response(DeliveryOutcome::Delivered {
            status: 200,
            apns_id: Some("apns-1".into()),
        });
        assert!(res.success);
        assert_eq!(res.apns_id.as_deref(), Some("apns-1"));

        let res = to_response(DeliveryOutcome::Unreachable {
            reason: "timed out".into(),
        });
        assert!(!res.success);
        assert_eq!(res.apns_status, None);
        assert_eq!(res.apns_response.as_deref(), Some("timed out"));
    }
}
