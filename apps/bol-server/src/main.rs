//! Bill of Lading server
//!
//! Accepts a packing list and commercial invoice (separately, as one
//! combined document, or together with a dangerous goods declaration) and
//! returns a drafted Bill of Lading PDF.
//!
//! ## Pipeline
//!
//! 1. OCR through Mistral
//! 2. Page classification and splitting for combined uploads
//! 3. Structured extraction through an OpenAI chat model
//! 4. Layout with rider-page pagination
//! 5. Typst rendering to PDF

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use bol_engine::layout::TextMetrics;
use bol_engine::world::DEFAULT_FAMILY;
use bol_engine::{FontMetrics, PageGeometry};
use bol_extract::ExtractionAdapter;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod pipeline;
mod rate_limit;
mod services;
mod upload;

use api::{handle_generate_bol, handle_health};
use pipeline::Pipeline;
use rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimiter};
use services::{mistral, openai, MistralOcrClient, OpenAiClient};

/// Multipart overhead allowed on top of the file payloads
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Command-line arguments for the BOL server
#[derive(Parser, Debug)]
#[command(name = "bol-server")]
#[command(about = "Bill of Lading generation server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// End-to-end processing timeout in milliseconds
    #[arg(long, env = "BOL_TIMEOUT_MS", default_value = "300000")]
    timeout_ms: u64,

    /// Requests per client per window
    #[arg(long, env = "BOL_RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Rate limit window in seconds
    #[arg(long, env = "BOL_RATE_WINDOW_SECS", default_value = "3600")]
    rate_window_secs: u64,

    /// Maximum size of each uploaded file in megabytes
    #[arg(long, env = "BOL_MAX_UPLOAD_MB", default_value = "50")]
    max_upload_mb: usize,

    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    mistral_api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// OCR model name
    #[arg(long, env = "BOL_OCR_MODEL", default_value = mistral::DEFAULT_MODEL)]
    ocr_model: String,

    /// Chat model used for structured extraction
    #[arg(long, env = "BOL_LLM_MODEL", default_value = openai::DEFAULT_MODEL)]
    llm_model: String,

    #[arg(long, env = "MISTRAL_BASE_URL", default_value = mistral::DEFAULT_BASE_URL)]
    mistral_base_url: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = openai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Per-file upload limit in bytes
    pub max_upload_bytes: usize,
}

pub fn build_router(state: AppState) -> Router {
    // Up to three files per request
    let body_limit = state.max_upload_bytes.saturating_mul(3) + FORM_OVERHEAD_BYTES;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/generate-bol", post(handle_generate_bol))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mistral_key = args
        .mistral_api_key
        .clone()
        .filter(|k| !k.is_empty())
        .context("MISTRAL_API_KEY is not configured")?;
    let openai_key = args
        .openai_api_key
        .clone()
        .filter(|k| !k.is_empty())
        .context("OPENAI_API_KEY is not configured")?;

    info!("Starting BOL server on {}:{}", args.host, args.port);

    let ocr = MistralOcrClient::new(mistral_key, &args.ocr_model, &args.mistral_base_url)?;
    let llm = OpenAiClient::new(openai_key, &args.llm_model, &args.openai_base_url)?;
    let metrics: Arc<dyn TextMetrics> =
        Arc::new(FontMetrics::new(DEFAULT_FAMILY).context("Failed to load embedded fonts")?);

    let pipeline = Pipeline::new(
        Arc::new(ocr),
        ExtractionAdapter::new(Arc::new(llm)),
        metrics,
        PageGeometry::default(),
        args.timeout_ms,
    );

    let config = RateLimitConfig::new(args.rate_limit, args.rate_window_secs);
    let window = config.window;
    let limiter = Arc::new(FixedWindowLimiter::new(config));
    spawn_limiter_cleanup(limiter.clone(), window);

    let state = AppState {
        pipeline,
        rate_limiter: limiter,
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!(
        "Rate limit: {} requests per {}s per client",
        args.rate_limit, args.rate_window_secs
    );
    info!("Processing timeout: {}ms", args.timeout_ms);
    info!("OCR model: {}, extraction model: {}", args.ocr_model, args.llm_model);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Drop expired rate-limit windows once per window.
fn spawn_limiter_cleanup(limiter: Arc<FixedWindowLimiter>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
        interval.tick().await;
        loop {
            interval.tick().await;
            limiter.cleanup();
            tracing::debug!(tracked = limiter.tracked_count(), "Rate limiter cleanup");
        }
    });
}
