use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cloudnote::api::{self, AppState};
use cloudnote::auth::AuthGate;
use cloudnote::clock::{Clock, SystemClock};
use cloudnote::config::{Config, ServeArgs, StoreArgs};
use cloudnote::db::Database;
use cloudnote::reaper;

#[derive(Parser)]
#[command(name = "cloudnote")]
#[command(about = "Personal note-taking backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and the expired-note reaper
    Serve(ServeArgs),
    /// Apply database migrations and exit
    Migrate(StoreArgs),
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "cloudnote=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Serve(args) => serve(Config::from_args(args)?).await?,
        Commands::Migrate(args) => {
            let path = args.database_path()?;
            let db = Database::open(path.clone())?;
            db.migrate()?;
            tracing::info!("Database at {} is up to date", path.display());
        }
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Opening database at {}", config.database_path.display());
    let db = Database::open(config.database_path.clone())?;
    db.migrate()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let gate = AuthGate::new(&config.jwt_secret, clock.clone());
    let state = AppState::new(db.clone(), gate, clock.clone());
    let app = api::create_router_with_cors(state, config.cors_origins.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reaper = tokio::spawn(reaper::run(db, clock, config.reap_interval, shutdown_rx));

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("cloudnote listening on http://{}", config.listen_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    reaper.await?;

    tracing::info!("cloudnote shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
