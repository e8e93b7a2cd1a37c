use super::IDeviceRepo;
use hicalendar_push_domain::{DeviceToken, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresDeviceRepo {
    pool: PgPool,
}

impl PostgresDeviceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeviceRaw {
    user_id: Uuid,
    device_token: String,
    platform: Option<String>,
    is_active: bool,
}

impl Into<DeviceToken> for DeviceRaw {
    fn into(self) -> DeviceToken {
        DeviceToken {
            user_id: self.user_id.into(),
            device_token: self.device_token,
            platform: self
                .platform
                .unwrap_or_else(|| hicalendar_push_domain::DEFAULT_PLATFORM.to_string()),
            is_active: self.is_active,
        }
    }
}

#[async_trait::async_trait]
impl IDeviceRepo for PostgresDeviceRepo {
    async fn insert(&self, device: &DeviceToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_devices(user_id, device_token, platform, is_active)
            VALUES($1, $2, $3, true)
            ON CONFLICT(device_token) DO UPDATE
            SET user_id = $1, platform = $3, is_active = true, updated_at = now()
            "#,
        )
        .bind(device.user_id.inner_ref())
        .bind(&device.device_token)
        .bind(&device.platform)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active_tokens(&self, user_id: &ID) -> anyhow::Result<Vec<String>> {
        let tokens: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT d.device_token FROM user_devices AS d
            WHERE d.user_id = $1 AND d.is_active = true
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens.into_iter().map(|(token,)| token).collect())
    }

    async fn find_by_token(&self, device_token: &str) -> Option<DeviceToken> {
        let res: Option<DeviceRaw> = sqlx::query_as(
            r#"
            SELECT d.user_id, d.device_token, d.platform, d.is_active FROM user_devices AS d
            WHERE d.device_token = $1
            "#,
        )
        .bind(device_token)
        .fetch_optional(&self.pool)
        .await
        .ok()?;
        res.map(|d| d.into())
    }

    async fn deactivate(&self, device_tokens: &[String]) -> anyhow::Result<u64> {
        if device_tokens.is_empty() {
            return Ok(0);
        }
        let res = sqlx::query(
            r#"
            UPDATE user_devices
            SET is_active = false, updated_at = now()
            WHERE device_token = ANY($1) AND is_active = true
            "#,
        )
        .bind(device_tokens)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }
}
