mod base;
mod push;
mod status;

use push::PushClient;
use status::StatusClient;
use std::sync::Arc;

pub use base::{APIError, APIResponse};
pub(crate) use base::BaseClient;
pub use hicalendar_push_api_structs::dtos::*;

#[derive(Clone)]
pub struct PushSDK {
    pub push: PushClient,
    pub status: StatusClient,
}

impl PushSDK {
    fn create(base: BaseClient) -> Self {
        let base = Arc::new(base);
        let push = PushClient::new(base.clone());
        let status = StatusClient::new(base);

        Self { push, status }
    }

    pub fn new(address: String) -> Self {
        let base = BaseClient::new(address);
        Self::create(base)
    }

    /// Client sending `api_key` in the `x-api-key` header of every request
    pub fn new_with_api_key(address: String, api_key: String) -> Self {
        let mut base = BaseClient::new(address);
        base.set_api_key(api_key);

        Self::create(base)
    }
}
