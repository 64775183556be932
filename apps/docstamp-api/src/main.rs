//! docstamp API server
//!
//! REST endpoints for the PDF editor:
//! - PDF upload and retrieval
//! - Field compositing (signatures, images, text, dates, radios)
//! - Audit lookup by document id

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod handlers;
mod models;
mod state;
mod storage;
#[cfg(test)]
mod tests;

use state::AppState;

/// Command-line arguments, each with an environment fallback
#[derive(Parser, Debug)]
#[command(name = "docstamp-api")]
#[command(about = "PDF field compositing server")]
struct Args {
    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3001")]
    port: u16,

    /// SQLite connection string; defaults to a file in the platform data dir
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Largest accepted request body in megabytes
    #[arg(long, env = "MAX_BODY_MB", default_value = "50")]
    max_body_mb: usize,
}

/// Build the router with all routes and middleware
pub fn app(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Documents
        .route("/upload-pdf", post(handlers::upload_pdf))
        .route("/pdf/:id", get(handlers::get_pdf))
        .route("/file/:id", get(handlers::download_file))
        // Compositing
        .route("/sign-pdf", post(handlers::sign_pdf))
        .route("/api/audit/:document_id", get(handlers::get_audit))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads the environment
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docstamp_api=info".parse()?)
                .add_directive("docstamp_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing docstamp API...");
    let database_url = match args.database_url {
        Some(url) => url,
        None => state::default_database_url()?,
    };
    let state = Arc::new(AppState::connect(&database_url).await?);

    let app = app(state, args.max_body_mb * 1024 * 1024);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting docstamp API on http://{}", addr);
    info!("Body limit: {}MB", args.max_body_mb);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
