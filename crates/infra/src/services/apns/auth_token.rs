use crate::config::ApnsConfig;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifetime of a provider token. APNs rejects tokens older than an hour
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsClaims {
    /// Team id
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Error, Debug)]
pub enum GatewayAuthError {
    #[error("Missing APNs credential: {0}")]
    MissingCredential(&'static str),
    #[error("Invalid APNs signing key: {0}")]
    InvalidKey(String),
    #[error("Unable to sign APNs provider token: {0}")]
    Signing(String),
}

/// Signs the ES256 bearer token that authenticates every request of a run.
pub fn sign_provider_token(config: &ApnsConfig, issued_at: i64) -> Result<String, GatewayAuthError> {
    if config.key_id.is_empty() {
        return Err(GatewayAuthError::MissingCredential("APNS_KEY_ID"));
    }
    if config.team_id.is_empty() {
        return Err(GatewayAuthError::MissingCredential("APNS_TEAM_ID"));
    }
    if config.private_key.is_empty() {
        return Err(GatewayAuthError::MissingCredential("APNS_PRIVATE_KEY"));
    }

    let key = EncodingKey::from_ec_pem(config.private_key.as_bytes())
        .map_err(|e| GatewayAuthError::InvalidKey(e.to_string()))?;

    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(config.key_id.clone());
    let claims = ApnsClaims {
        iss: config.team_id.clone(),
        iat: issued_at,
        exp: issued_at + TOKEN_TTL_SECS,
    };

    encode(&header, &claims, &key).map_err(|e| GatewayAuthError::Signing(e.to_string()))
}
