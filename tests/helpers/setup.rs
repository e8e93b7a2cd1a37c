use async_trait::async_trait;
use hicalendar_push_api::Application;
use hicalendar_push_infra::{
    ApnsPayload, DeliveryOutcome, GatewayAuthError, IPushGateway, PushContext,
};
use hicalendar_push_sdk::PushSDK;
use std::sync::Mutex;

/// Gateway double: accepts every token except the ones listed as
/// unregistered, and records what it delivered.
#[derive(Default)]
pub struct RecordingGateway {
    pub unregistered: Mutex<Vec<String>>,
    pub delivered: Mutex<Vec<(String, ApnsPayload)>>,
}

impl RecordingGateway {
    pub fn delivered_bodies(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.aps.alert.body.clone())
            .collect()
    }
}

#[async_trait]
impl IPushGateway for RecordingGateway {
    fn provider_token(&self, _issued_at: i64) -> Result<String, GatewayAuthError> {
        Ok("test.provider.token".into())
    }

    async fn deliver(
        &self,
        _provider_token: &str,
        device_token: &str,
        payload: &ApnsPayload,
    ) -> DeliveryOutcome {
        if self
            .unregistered
            .lock()
            .unwrap()
            .iter()
            .any(|t| t == device_token)
        {
            return DeliveryOutcome::Rejected {
                status: 410,
                body: r#"{"reason":"Unregistered"}"#.into(),
                apns_id: None,
            };
        }
        self.delivered
            .lock()
            .unwrap()
            .push((device_token.to_string(), payload.clone()));
        DeliveryOutcome::Delivered {
            status: 200,
            apns_id: Some("EC1BF194-B3B2-424A-89A9-5A918A6E6B5D".into()),
        }
    }
}

pub struct TestApp {
    pub ctx: PushContext,
    pub address: String,
}

/// Launch the application as a background task. `configure` may adjust the
/// in-memory context before the server starts.
pub async fn spawn_app_with<F>(gateway: std::sync::Arc<dyn IPushGateway>, configure: F) -> (TestApp, PushSDK)
where
    F: FnOnce(&mut PushContext),
{
    let mut ctx = PushContext::create_inmemory(gateway);
    ctx.config.port = 0; // Random port
    ctx.config.scheduler_interval_secs = None;
    ctx.config.scheduler_api_key = None;
    ctx.config.cron_api_key = None;
    configure(&mut ctx);

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let sdk = match &ctx.config.scheduler_api_key {
        Some(api_key) => PushSDK::new_with_api_key(address.clone(), api_key.clone()),
        None => PushSDK::new(address.clone()),
    };
    (TestApp { ctx, address }, sdk)
}

pub async fn spawn_app(gateway: std::sync::Arc<dyn IPushGateway>) -> (TestApp, PushSDK) {
    spawn_app_with(gateway, |_| {}).await
}
