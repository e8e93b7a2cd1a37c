use crate::shared::entity::ID;

pub const DEFAULT_PLATFORM: &str = "ios";

/// A push token registered by one of the user's devices.
///
/// Tokens the gateway reports as permanently invalid are deactivated,
/// never deleted, so the device can re-register the same row.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceToken {
    pub user_id: ID,
    pub device_token: String,
    pub platform: String,
    pub is_active: bool,
}

impl DeviceToken {
    pub fn new(user_id: ID, device_token: impl Into<String>) -> Self {
        Self {
            user_id,
            device_token: device_token.into(),
            platform: DEFAULT_PLATFORM.into(),
            is_active: true,
        }
    }
}

/// Shortened token for log lines
pub fn token_prefix(token: &str) -> &str {
    match token.char_indices().nth(8) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
