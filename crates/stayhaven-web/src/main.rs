//! Stayhaven web server
//!
//! Run with: cargo run -p stayhaven-web -- serve

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use stayhaven_common::validation::{is_valid_email, normalize_email};
use stayhaven_config::Config;
use stayhaven_db::{Database, PoolOptions};
use stayhaven_media::{HttpImageSource, ImageValidator};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "stayhaven-web", version, about = "Stayhaven marketplace server")]
struct Cli {
    /// Config file (defaults to ./stayhaven.toml)
    #[arg(long, env = "STAYHAVEN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the superuser account from [seed] if it does not exist yet
    SeedSuperuser,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Start at RUST_LOG or "info"; the configured filter is swapped in once loaded.
    let initial = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, filter_handle) = reload::Layer::new(initial);
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();

    stayhaven_config::load_dotenv();
    let cli = Cli::parse();
    let config = Config::load_from(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("invalid log filter")?;
    filter_handle.reload(filter).context("failed to apply log filter")?;

    let db = connect(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(db, config).await,
        Command::SeedSuperuser => seed_superuser(db, &config).await,
    }
}

async fn connect(config: &Config) -> anyhow::Result<Database> {
    let options = PoolOptions {
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
    };
    let db = Database::connect(config.database.url.expose_secret(), options)
        .await
        .context("failed to connect to PostgreSQL")?;
    if config.database.run_migrations {
        db.initialize().await.context("failed to apply schema")?;
    }
    Ok(db)
}

async fn serve(db: Database, config: Config) -> anyhow::Result<()> {
    info!("Starting Stayhaven web server...");
    if config.session.uses_development_secret() {
        warn!("Using the built-in development session secret; set STAYHAVEN_SESSION_SECRET in production");
    }

    let source = HttpImageSource::from_config(&config.media)?;
    let images = ImageValidator::from_config(Arc::new(source), &config.media);
    let bind = config.server.bind.clone();
    let public_url = config.server.public_url.clone();

    let state = stayhaven_web::state::AppState::new(db, config, images)?;
    let app = stayhaven_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("Server listening on http://{}", bind);
    info!("Public URL: {}", public_url);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Seed email in the form sign-in looks it up by.
fn superuser_email(config: &Config) -> anyhow::Result<String> {
    let email = normalize_email(&config.seed.superuser_email);
    if !is_valid_email(&email) {
        anyhow::bail!("seed.superuser_email is not a valid email: {email:?}");
    }
    Ok(email)
}

async fn seed_superuser(db: Database, config: &Config) -> anyhow::Result<()> {
    let email = superuser_email(config)?;
    let users = stayhaven_db::UserRepository::new(&db);
    let password = config.seed.superuser_password.expose_secret().to_string();
    let hash = tokio::task::spawn_blocking(move || stayhaven_security::hash_password(&password)).await??;

    if users.ensure_superuser(&email, &hash).await? {
        info!("Created superuser {}", email);
    } else {
        info!("Superuser {} already exists", email);
    }
    Ok(())
}
