mod telemetry;

use hicalendar_push_api::Application;
use hicalendar_push_infra::{run_migration, setup_context};
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("hicalendar_push".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context().await;
    if context.config.run_migrations {
        info!("Running database migrations");
        run_migration()
            .await
            .expect("To apply database migrations");
    }

    let app = Application::new(context).await?;
    app.start().await
}
