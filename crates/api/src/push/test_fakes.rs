use chrono::{DateTime, Utc};
use hicalendar_push_domain::{PushEvent, SentStatus, ID};
use hicalendar_push_infra::{
    ApnsPayload, DeliveryOutcome, GatewayAuthError, IEventRepo, IPushGateway, PushContext,
    StaticTimeSys,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory context whose clock is pinned to `now`
pub fn context_at(now: &str) -> (PushContext, DateTime<Utc>) {
    let now: DateTime<Utc> = now.parse().unwrap();
    let mut ctx = PushContext::create_inmemory(Arc::new(FakeGateway::default()));
    ctx.sys = Arc::new(StaticTimeSys::at(now));
    (ctx, now)
}

/// Records every payload and answers per device token
#[derive(Default)]
pub struct FakeGateway {
    rejections: Mutex<HashMap<String, (u16, String)>>,
    signing_fails: Mutex<bool>,
    delivered: Mutex<Vec<(String, ApnsPayload)>>,
}

impl FakeGateway {
    pub fn reject(&self, device_token: &str, status: u16, body: &str) {
        self.rejections
            .lock()
            .unwrap()
            .insert(device_token.into(), (status, body.into()));
    }

    pub fn accept_all(&self) {
        self.rejections.lock().unwrap().clear();
    }

    pub fn fail_signing(&self) {
        *self.signing_fails.lock().unwrap() = true;
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    pub fn delivered_payloads(&self) -> Vec<ApnsPayload> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl IPushGateway for FakeGateway {
    fn provider_token(&self, _issued_at: i64) -> Result<String, GatewayAuthError> {
        if *self.signing_fails.lock().unwrap() {
            return Err(GatewayAuthError::MissingCredential("APNS_PRIVATE_KEY"));
        }
        Ok("fake.provider.token".into())
    }

    async fn deliver(
        &self,
        _provider_token: &str,
        device_token: &str,
        payload: &ApnsPayload,
    ) -> DeliveryOutcome {
        if let Some((status, body)) = self.rejections.lock().unwrap().get(device_token) {
            return DeliveryOutcome::Rejected {
                status: *status,
                body: body.clone(),
                apns_id: None,
            };
        }
        self.delivered
            .lock()
            .unwrap()
            .push((device_token.into(), payload.clone()));
        DeliveryOutcome::Delivered {
            status: 200,
            apns_id: Some(ID::default().to_string()),
        }
    }
}

/// Event store whose writes fail. Reads go to the wrapped repo unless
/// the whole store is unreachable.
pub struct FailingEventRepo {
    inner: Arc<dyn IEventRepo>,
    candidates_fail: bool,
}

impl FailingEventRepo {
    pub fn wrapping(inner: Arc<dyn IEventRepo>) -> Self {
        Self {
            inner,
            candidates_fail: false,
        }
    }

    pub fn unreachable(inner: Arc<dyn IEventRepo>) -> Self {
        Self {
            inner,
            candidates_fail: true,
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for FailingEventRepo {
    async fn insert(&self, e: &PushEvent) -> anyhow::Result<()> {
        self.inner.insert(e).await
    }

    async fn find(&self, event_id: &ID) -> Option<PushEvent> {
        self.inner.find(event_id).await
    }

    async fn find_push_candidates(&self) -> anyhow::Result<Vec<PushEvent>> {
        if self.candidates_fail {
            return Err(anyhow::Error::msg("connection refused"));
        }
        self.inner.find_push_candidates().await
    }

    async fn merge_sent_status(&self, _event_id: &ID, _patch: &SentStatus) -> anyhow::Result<()> {
        Err(anyhow::Error::msg("statement timeout"))
    }

    async fn reset_expired_sent_status(
        &self,
        _timed_before: DateTime<Utc>,
        _undated_anchored_before: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        Err(anyhow::Error::msg("statement timeout"))
    }
}
