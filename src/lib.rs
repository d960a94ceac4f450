pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod models;
pub mod services;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, UserCommands};
pub use config::Config;
use db::{Store, UserRepository};
use services::{CredentialService, FileCredentialService};

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    config.validate()?;
    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Init => cmd_init(&config).await,
        Commands::User {
            command: UserCommands::Add { username, password },
        } => cmd_user_add(&config, &username, &password).await,
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Production logs are consumed by machines.
    if config.secure_cookies() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("anishelf v{} starting...", env!("CARGO_PKG_VERSION"));

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = api::create_app_state(config, prometheus_handle).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

async fn cmd_init(config: &Config) -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created default config file.");
    } else {
        println!("Config file already exists.");
    }

    let store = Store::open(&config.storage.db_path).await?;
    let users = UserRepository::open(&config.storage.users_path, config.security.clone()).await?;

    println!("Catalog: {}", store.path().display());
    println!("Users:   {}", users.path().display());
    Ok(())
}

async fn cmd_user_add(config: &Config, username: &str, password: &str) -> anyhow::Result<()> {
    let users = UserRepository::open(&config.storage.users_path, config.security.clone()).await?;
    let credentials = FileCredentialService::new(users, config.auth.clone());

    match credentials.register(username, password).await {
        Ok(identity) => {
            println!("Created user '{}' ({})", identity.username, identity.id);
            Ok(())
        }
        Err(e) => anyhow::bail!("Could not create user: {e}"),
    }
}
