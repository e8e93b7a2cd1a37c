use super::auth_token::{sign_provider_token, GatewayAuthError};
use super::payload::ApnsPayload;
use crate::config::ApnsConfig;
use std::time::Duration;

/// Result of delivering one payload to one device
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Delivered {
        status: u16,
        apns_id: Option<String>,
    },
    /// The gateway answered with a non-2xx status
    Rejected {
        status: u16,
        body: String,
        apns_id: Option<String>,
    },
    /// No answer: connection error or timeout
    Unreachable { reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// The push gateway seen by the scheduler. Swapped for a fake in tests.
#[async_trait::async_trait]
pub trait IPushGateway: Send + Sync {
    /// Signs the bearer credential used for every request of one run
    fn provider_token(&self, issued_at: i64) -> Result<String, GatewayAuthError>;

    /// Never fails: every problem is reported as an outcome
    async fn deliver(
        &self,
        provider_token: &str,
        device_token: &str,
        payload: &ApnsPayload,
    ) -> DeliveryOutcome;
}

pub struct ApnsGateway {
    client: reqwest::Client,
    config: ApnsConfig,
    base_url: String,
}

impl ApnsGateway {
    pub fn new(config: ApnsConfig, timeout: Duration) -> anyhow::Result<Self> {
        // rustls negotiates h2 through ALPN, which APNs requires
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()?;
        let base_url = config.base_url();
        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Points the client at another host, e.g. a local mock gateway
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn device_url(&self, device_token: &str) -> String {
        format!(
            "{}/3/device/{}",
            self.base_url.trim_end_matches('/'),
            device_token
        )
    }
}

#[async_trait::async_trait]
impl IPushGateway for ApnsGateway {
    fn provider_token(&self, issued_at: i64) -> Result<String, GatewayAuthError> {
        sign_provider_token(&self.config, issued_at)
    }

    async fn deliver(
        &self,
        provider_token: &str,
        device_token: &str,
        payload: &ApnsPayload,
    ) -> DeliveryOutcome {
        let res = self
            .client
            .post(self.device_url(device_token))
            .bearer_auth(provider_token)
            .header("apns-topic", &self.config.bundle_id)
            .header("apns-push-type", "alert")
            .header("apns-expiration", "0")
            .header("apns-priority", "10")
            .json(payload)
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(e) => {
                return DeliveryOutcome::Unreachable {
                    reason: e.to_string(),
                }
            }
        };

        let status = res.status().as_u16();
        let apns_id = res
            .headers()
            .get("apns-id")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        if res.status().is_success() {
            DeliveryOutcome::Delivered { status, apns_id }
        } else {
            let body = res.text().await.unwrap_or_default();
            DeliveryOutcome::Rejected {
                status,
                body,
                apns_id,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApnsEnvironment;
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct ReceivedRequest {
        path: String,
        authorization: Option<String>,
        topic: Option<String>,
        push_type: Option<String>,
        priority: Option<String>,
        expiration: Option<String>,
        body: Value,
    }

    fn header(req: &HttpRequest, name: &str) -> Option<String> {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }

    async fn mock_device_endpoint(
        req: HttpRequest,
        token: web::Path<String>,
        body: web::Json<Value>,
        received: web::Data<Arc<Mutex<Vec<ReceivedRequest>>>>,
    ) -> HttpResponse {
        received.lock().unwrap().push(ReceivedRequest {
            path: req.path().to_string(),
            authorization: header(&req, "authorization"),
            topic: header(&req, "apns-topic"),
            push_type: header(&req, "apns-push-type"),
            priority: header(&req, "apns-priority"),
            expiration: header(&req, "apns-expiration"),
            body: body.into_inner(),
        });
        match token.as_str() {
            "gone" => HttpResponse::Gone().body(r#"{"reason":"Unregistered"}"#),
            "busy" => HttpResponse::TooManyRequests().body(r#"{"reason":"TooManyRequests"}"#),
            _ => HttpResponse::Ok()
                .insert_header(("apns-id", "EC1BF194-B3B2-424A-89A9-5A918A6E6B5D"))
                .finish(),
        }
    }

    async fn spawn_mock_gateway() -> (String, Arc<Mutex<Vec<ReceivedRequest>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let data = web::Data::new(received.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/3/device/{token}", web::post().to(mock_device_endpoint))
        })
        .bind(("127.0.0.1", 0))
        .expect("To bind mock gateway");
        let port = server.addrs()[0].port();
        actix_web::rt::spawn(server.workers(1).run());
        (format!("http://127.0.0.1:{}", port), received)
    }

    fn gateway(base_url: &str) -> ApnsGateway {
        let config = ApnsConfig {
            key_id: "ABC123DEFG".into(),
            team_id: "TEAM123456".into(),
            private_key: include_str!("../../../config/test_apns_private_key.p8").into(),
            bundle_id: "com.chenzhencong.HiCalendar".into(),
            environment: ApnsEnvironment::Sandbox,
        };
        ApnsGateway::new(config, Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[actix_web::main]
    #[test]
    async fn sends_signed_request_with_apns_headers() {
        let (base_url, received) = spawn_mock_gateway().await;
        let gateway = gateway(&base_url);
        let payload = ApnsPayload::diagnostic(chrono::Utc::now());

        let outcome = gateway.deliver("signed.jwt.token", "abcd1234", &payload).await;
        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                status: 200,
                apns_id: Some("EC1BF194-B3B2-424A-89A9-5A918A6E6B5D".into()),
            }
        );

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let req = &received[0];
        assert_eq!(req.path, "/3/device/abcd1234");
        assert_eq!(req.authorization.as_deref(), Some("Bearer signed.jwt.token"));
        assert_eq!(req.topic.as_deref(), Some("com.chenzhencong.HiCalendar"));
        assert_eq!(req.push_type.as_deref(), Some("alert"));
        assert_eq!(req.priority.as_deref(), Some("10"));
        assert_eq!(req.expiration.as_deref(), Some("0"));
        assert_eq!(req.body["aps"]["badge"], 1);
    }

    #[actix_web::main]
    #[test]
    async fn reports_rejections_and_unreachable_hosts() {
        let (base_url, _) = spawn_mock_gateway().await;
        let gateway = gateway(&base_url);
        let payload = ApnsPayload::diagnostic(chrono::Utc::now());

        match gateway.deliver("jwt", "gone", &payload).await {
            DeliveryOutcome::Rejected { status, body, .. } => {
                assert_eq!(status, 410);
                assert!(body.contains("Unregistered"));
            }
            other => panic!("Expected rejection, got {:?}", other),
        }

        let unreachable = super::ApnsGateway::new(gateway.config.clone(), Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        assert!(matches!(
            unreachable.deliver("jwt", "abcd", &payload).await,
            DeliveryOutcome::Unreachable { .. }
        ));
    }
}
