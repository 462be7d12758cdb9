//! Heart Attack Risk Prediction API
//!
//! Serves a pre-trained binary classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HEARTRISK API                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  POST /predict                                              │
//! │     │                                                       │
//! │     ▼                                                       │
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │ Validator │─▶│  Encoder  │─▶│  Predictor (Classifier) │ │
//! │  └───────────┘  └───────────┘  └────────────┬────────────┘ │
//! │                                              ▼              │
//! │                                   ┌──────────────────┐     │
//! │                                   │  ServiceState    │     │
//! │                                   │  (model, counter)│     │
//! │                                   └──────────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod features;
mod handlers;
mod model;
mod models;
mod state;
mod validation;

use std::any::Any;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    response::Response,
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{CorsLayer, Any as AnyOrigin},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};
use state::ServiceState;

#[derive(Parser, Debug)]
#[command(
    name = "heartrisk-api",
    version,
    about = "Heart attack risk prediction API"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Load a model artifact and report whether it is usable
    CheckModel(CheckModelArgs),
}

#[derive(Args, Debug)]
struct CheckModelArgs {
    /// Artifact path (defaults to MODEL_PATH)
    path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(&config);

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CheckModel(args) => check_model(&config, args),
    }
}

/// Initialize logging: JSON lines in production, human-readable otherwise
fn init_tracing(config: &config::Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("heartrisk_api={0},tower_http={0}", config.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: config::Config) -> anyhow::Result<()> {
    tracing::info!("Heart risk API starting in {} mode...", config.environment);
    if config.is_development() {
        tracing::warn!("Development mode: do not expose this instance publicly");
    }

    // Model is loaded before the listener accepts connections
    let service = Arc::new(ServiceState::load(&config));

    let state = AppState {
        service,
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// `check-model`: verify the artifact can be loaded
fn check_model(config: &config::Config, args: CheckModelArgs) -> anyhow::Result<()> {
    let path = args.path.unwrap_or_else(|| config.model_path.clone());
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    println!("Checking model artifact at: {}", path.display());
    println!("Current working directory: {}", cwd.display());

    let (classifier, info) = match model::load_artifact(&path) {
        Ok(loaded) => loaded,
        Err(e) => {
            if matches!(e, model::ModelLoadError::Io { .. }) {
                let files = directory_listing(&cwd).unwrap_or_default();
                println!("Files in current directory: {}", files.join(", "));
            }
            return Err(e)
                .with_context(|| format!("model artifact at {} is not usable", path.display()));
        }
    };

    println!("✅ Model artifact is usable");
    println!("   path:          {}", info.path);
    println!("   type:          {}", classifier.model_type());
    println!("   probabilities: {}", classifier.supports_probabilities());
    println!("   size:          {} bytes", info.size_bytes);
    println!("   sha256:        {}", info.sha256);
    Ok(())
}

/// Sorted file names in `dir`
fn directory_listing(dir: &std::path::Path) -> std::io::Result<Vec<String>> {
    let mut names = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ServiceState>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    use handlers::fallback::method_not_allowed;

    Router::new()
        // UI
        .route("/", get(handlers::pages::index).fallback(method_not_allowed))
        .route("/index", get(handlers::pages::index).fallback(method_not_allowed))

        // API
        .route("/api/data", get(handlers::api::data).fallback(method_not_allowed))
        .route("/health", get(handlers::health::check).fallback(method_not_allowed))
        .route("/model-info", get(handlers::model_info::get).fallback(method_not_allowed))
        .route("/predict", post(handlers::predict::predict).fallback(method_not_allowed))

        .fallback(handlers::fallback::not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin)
        )
        .with_state(state)
}

/// A panicking handler becomes a sanitized 500, never a dropped connection
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!("Handler panicked: {}", detail);
    error::internal_error_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.pkl"), b"x").unwrap();
        std::fs::write(dir.path().join("app.py"), b"x").unwrap();

        let files = directory_listing(dir.path()).unwrap();
        assert_eq!(files, vec!["app.py".to_string(), "model.pkl".to_string()]);

        assert!(directory_listing(&dir.path().join("missing")).is_err());
    }
}
