mod device;
mod event;
mod push_log;
mod push_template;
mod shared;

pub use device::IDeviceRepo;
use device::{InMemoryDeviceRepo, PostgresDeviceRepo};
pub use event::IEventRepo;
use event::{InMemoryEventRepo, PostgresEventRepo};
pub use push_log::IPushLogRepo;
use push_log::{InMemoryPushLogRepo, PostgresPushLogRepo};
pub use push_template::IPushTemplateRepo;
use push_template::{InMemoryPushTemplateRepo, PostgresPushTemplateRepo};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub devices: Arc<dyn IDeviceRepo>,
    pub push_logs: Arc<dyn IPushLogRepo>,
    pub push_templates: Arc<dyn IPushTemplateRepo>,
}

impl Repos {
    /// Connects to Postgres. Every statement is cancelled by the server
    /// after `store_timeout` so a hung query cannot stall a scheduler run.
    pub async fn create_postgres(
        connection_string: &str,
        store_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let statement_timeout = store_timeout.as_millis().to_string();
        let options = PgConnectOptions::from_str(connection_string)?
            .options([("statement_timeout", statement_timeout.as_str())]);

        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(store_timeout)
            .connect_with(options)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            devices: Arc::new(PostgresDeviceRepo::new(pool.clone())),
            push_logs: Arc::new(PostgresPushLogRepo::new(pool.clone())),
            push_templates: Arc::new(PostgresPushTemplateRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepo::new()),
            devices: Arc::new(InMemoryDeviceRepo::new()),
            push_logs: Arc::new(InMemoryPushLogRepo::new()),
            push_templates: Arc::new(InMemoryPushTemplateRepo::new()),
        }
    }
}
