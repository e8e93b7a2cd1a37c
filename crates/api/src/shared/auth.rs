use crate::error::PushError;
use actix_web::HttpRequest;
use hicalendar_push_infra::PushContext;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Guards the endpoints that send pushes. Open when no api key is configured.
pub fn protect_scheduler_route(req: &HttpRequest, ctx: &PushContext) -> Result<(), PushError> {
    match &ctx.config.scheduler_api_key {
        Some(key) => require_api_key(req, key),
        None => Ok(()),
    }
}

/// Guards the cron forwarder with its own key. The forwarder attaches the
/// scheduler key, so it is closed whenever the scheduler is protected but
/// no cron key is configured.
pub fn protect_cron_route(req: &HttpRequest, ctx: &PushContext) -> Result<(), PushError> {
    match (&ctx.config.cron_api_key, &ctx.config.scheduler_api_key) {
        (Some(key), _) => require_api_key(req, key),
        (None, None) => Ok(()),
        (None, Some(_)) => Err(PushError::Unauthorized(
            "The cron trigger is disabled, PUSH_CRON_API_KEY is not configured".into(),
        )),
    }
}

fn require_api_key(req: &HttpRequest, expected: &str) -> Result<(), PushError> {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => Ok(()),
        Some(_) => Err(PushError::Unauthorized(
            "The provided api key is not valid".into(),
        )),
        None => Err(PushError::Unauthorized(format!(
            "Missing the `{}` header",
            API_KEY_HEADER
        ))),
    }
}
