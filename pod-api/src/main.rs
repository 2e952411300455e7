use anyhow::anyhow;
use pod_api::{config::ApiConfig, startup::Application};
use pod_config::{load_config, shared::PgConnectionConfig};
use pod_telemetry::tracing::init_tracing;
use std::env;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    // Initialize tracing from the binary name
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    match args.as_slice() {
        // Run the application server
        [_] => {
            let config = load_config::<ApiConfig>()?;
            log_pg_connection_config(&config.database);
            info!(
                host = config.application.host,
                port = config.application.port,
                "starting pod api"
            );
            let application = Application::build(config).await?;
            application.run_until_stopped().await?;
        }
        [_, command] => match command.as_str() {
            "migrate" => {
                let config = load_config::<ApiConfig>()?;
                log_pg_connection_config(&config.database);
                Application::migrate_database(config.database).await?;
                info!("database migrated successfully");
            }
            _ => {
                let message = format!("invalid command: {command}");
                error!("{message}");
                return Err(anyhow!(message));
            }
        },
        _ => {
            let message = "invalid number of command line arguments";
            error!("{message}");
            return Err(anyhow!(message));
        }
    }

    Ok(())
}

fn log_pg_connection_config(config: &PgConnectionConfig) {
    info!(
        host = config.host,
        port = config.port,
        dbname = config.name,
        username = config.username,
        tls_enabled = config.tls.enabled,
        "pg database options",
    );
}
