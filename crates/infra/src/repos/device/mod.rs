mod inmemory;
mod postgres;

use hicalendar_push_domain::{DeviceToken, ID};
pub use inmemory::InMemoryDeviceRepo;
pub use postgres::PostgresDeviceRepo;

#[async_trait::async_trait]
pub trait IDeviceRepo: Send + Sync {
    /// Registers the token, reactivating it when it is already known
    async fn insert(&self, device: &DeviceToken) -> anyhow::Result<()>;
    async fn find_active_tokens(&self, user_id: &ID) -> anyhow::Result<Vec<String>>;
    async fn find_by_token(&self, device_token: &str) -> Option<DeviceToken>;
    /// Marks every listed token inactive. Returns the number of rows changed
    async fn deactivate(&self, device_tokens: &[String]) -> anyhow::Result<u64>;
}

#[cfg(test)]
mod tests {
    use crate::repos::Repos;
    use hicalendar_push_domain::{DeviceToken, ID};

    #[actix_web::main]
    #[test]
    async fn only_active_tokens_are_returned() {
        let repos = Repos::create_inmemory();
        let user_id = ID::default();
        let other_user = ID::default();
        for device in &[
            DeviceToken::new(user_id, "aaaa"),
            DeviceToken::new(user_id, "bbbb"),
            DeviceToken::new(other_user, "cccc"),
        ] {
            repos.devices.insert(device).await.unwrap();
        }

        let deactivated = repos.devices.deactivate(&["bbbb".to_string()]).await.unwrap();
        assert_eq!(deactivated, 1);

        let tokens = repos.devices.find_active_tokens(&user_id).await.unwrap();
        assert_eq!(tokens, vec!["aaaa".to_string()]);
        let stored = repos.devices.find_by_token("bbbb").await.unwrap();
        assert!(!stored.is_active);
    }

    #[actix_web::main]
    #[test]
    async fn reinserting_reactivates_token() {
        let repos = Repos::create_inmemory();
        let user_id = ID::default();
        let device = DeviceToken::new(user_id, "aaaa");
        repos.devices.insert(&device).await.unwrap();
        repos.devices.deactivate(&["aaaa".to_string()]).await.unwrap();
        repos.devices.insert(&device).await.unwrap();

        let tokens = repos.devices.find_active_tokens(&user_id).await.unwrap();
        assert_eq!(tokens, vec!["aaaa".to_string()]);
    }
}
