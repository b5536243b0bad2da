//! `taskhubd` — the TaskHub server binary.
//!
//! Usage:
//!   taskhubd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/taskhub/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use taskhub_auth::AuthModule;
use taskhub_core::Module;
use taskhub_task::TaskModule;

use config::ServerConfig;

/// TaskHub server.
#[derive(Parser, Debug)]
#[command(name = "taskhubd", about = "TaskHub server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    std::fs::create_dir_all(&server_config.storage.data_dir)?;
    let sql: Arc<dyn taskhub_sql::SQLStore> = Arc::new(
        taskhub_sql::SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Initialize modules. Auth first: it owns the users table the
    // task module's assignment workflow writes into.
    let auth_module = AuthModule::new(Arc::clone(&sql), server_config.auth_config())?;
    info!("Auth module initialized");

    let task_module = TaskModule::new(Arc::clone(&sql))?;
    info!("Task module initialized");

    // Bootstrap: ensure the Root identity exists.
    bootstrap::ensure_root_user(auth_module.service(), &server_config.root)?;

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (task_module.name(), task_module.routes()),
    ];

    // Build router.
    let app = routes::build_router(auth_module.service().clone(), module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("TaskHub server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
