mod auth_token;
mod client;
mod delivery;
mod payload;

pub use auth_token::{sign_provider_token, ApnsClaims, GatewayAuthError, TOKEN_TTL_SECS};
pub use client::{ApnsGateway, DeliveryOutcome, IPushGateway};
pub use delivery::{send_batch, send_to_devices, DeviceFailure, SendResult};
pub use payload::{ApnsAlert, ApnsPayload, Aps, ALERT_TITLE};
