use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use procura::ai::OpenAiCompatibleProvider;
use procura::config::{get_config, CliArgs};
use procura::{create_app, db, run_migrations, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    if std::fs::metadata(".env").is_ok() {
        dotenv::dotenv().ok();
    }

    let args = CliArgs::parse();
    let debug = args.debug;
    let config = get_config(args);

    // Console output plus JSON files rotated daily
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "procura.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().json().with_writer(file_writer))
        .init();

    info!(
        "Starting procura on {} (database {}, model {})",
        config.listen_address(),
        config.database_url,
        config.ai_model
    );

    let pool = db::init_pool(&config.database_url)?;
    {
        let mut conn = pool.get().context("Failed to get a connection for migrations")?;
        run_migrations(&mut conn)?;
    }

    let ai = OpenAiCompatibleProvider::new(
        &config.ai_base_url,
        &config.ai_model,
        config.ai_api_key.clone(),
        config.ai_timeout(),
    )?
    .with_temperature(config.ai_temperature);

    let listen_address = config.listen_address();
    let state = AppState {
        pool: Arc::new(pool),
        ai: Arc::new(ai),
        config: Arc::new(config),
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("Failed to bind {}", listen_address))?;
    info!("Listening on {}", listen_address);

    axum::serve(listener, app).await?;
    Ok(())
}
