use super::IDeviceRepo;
use crate::repos::shared::inmemory_repo::*;
use hicalendar_push_domain::{DeviceToken, ID};

pub struct InMemoryDeviceRepo {
    devices: std::sync::Mutex<Vec<DeviceToken>>,
}

impl InMemoryDeviceRepo {
    pub fn new() -> Self {
        Self {
            devices: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDeviceRepo for InMemoryDeviceRepo {
    async fn insert(&self, device: &DeviceToken) -> anyhow::Result<()> {
        delete_by(&self.devices, |d| d.device_token == device.device_token);
        let mut device = device.clone();
        device.is_active = true;
        insert(&device, &self.devices);
        Ok(())
    }

    async fn find_active_tokens(&self, user_id: &ID) -> anyhow::Result<Vec<String>> {
        Ok(find_by(&self.devices, |d| d.user_id == *user_id && d.is_active)
            .into_iter()
            .map(|d| d.device_token)
            .collect())
    }

    async fn find_by_token(&self, device_token: &str) -> Option<DeviceToken> {
        find_by(&self.devices, |d| d.device_token == device_token)
            .into_iter()
            .next()
    }

    async fn deactivate(&self, device_tokens: &[String]) -> anyhow::Result<u64> {
        Ok(update_many(
            &self.devices,
            |d| d.is_active && device_tokens.contains(&d.device_token),
            |d| d.is_active = false,
        ))
    }
}
