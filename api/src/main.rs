use anyhow::Context;
use chirpy::{AppState, Config, routes};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chirpy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Delete the database file before starting
    #[arg(long)]
    debug: bool,

    /// Path to the JSON database (overrides DATABASE_PATH)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = dotenv {
        warn!("No .env file loaded: {}", e);
    }

    let mut config = Config::from_env()?;
    if let Some(path) = args.database {
        config.database_path = path;
    }

    if args.debug {
        match tokio::fs::remove_file(&config.database_path).await {
            Ok(()) => info!("Debug mode: removed {}", config.database_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to remove {}", config.database_path.display())
                });
            }
        }
    }

    // Create application state
    let state = AppState::new(&config);
    state
        .db
        .ensure()
        .await
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let app = routes::router(state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("Server running on http://{}", config.bind_addr);
    info!("Database: {}", config.database_path.display());
    info!("API Endpoints:");
    info!("  GET    /api/healthz        - Health check");
    info!("  POST   /api/users          - Create account");
    info!("  PUT    /api/users          - Update account (auth)");
    info!("  GET    /api/users/me       - Current user (auth)");
    info!("  POST   /api/login          - Login");
    info!("  POST   /api/refresh        - New access token (refresh token)");
    info!("  POST   /api/revoke         - Revoke refresh token");
    info!("  POST   /api/chirps         - Create chirp (auth)");
    info!("  GET    /api/chirps         - List chirps");
    info!("  GET    /api/chirps/{{id}}    - Get chirp");
    info!("  DELETE /api/chirps/{{id}}    - Delete chirp (auth, author only)");
    info!("  POST   /api/polka/webhooks - Upgrade webhook");

    axum::serve(listener, app).await?;

    Ok(())
}
