mod config;
mod repos;
mod services;
mod system;

pub use config::{ApnsConfig, ApnsEnvironment, Config, RetentionPolicy};
pub use repos::{IDeviceRepo, IEventRepo, IPushLogRepo, IPushTemplateRepo, Repos};
pub use services::apns::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};

#[derive(Clone)]
pub struct PushContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub gateway: Arc<dyn IPushGateway>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl PushContext {
    async fn create(params: ContextParams) -> Self {
        let config = Config::new();
        let repos = Repos::create_postgres(&params.postgres_connection_string, config.store_timeout)
            .await
            .expect("Postgres credentials must be set and valid");
        let gateway = ApnsGateway::new(config.apns.clone(), config.gateway_timeout)
            .expect("To build the APNs http client");
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            gateway: Arc::new(gateway),
        }
    }

    /// In-memory repositories and the real clock, delivering through `gateway`
    pub fn create_inmemory(gateway: Arc<dyn IPushGateway>) -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            gateway,
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> PushContext {
    PushContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
