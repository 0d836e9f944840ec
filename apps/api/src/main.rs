mod admin;
mod chat;
mod config;
mod db;
mod enquiries;
mod errors;
mod hr;
mod knowledge;
mod llm_client;
mod models;
mod patterns;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::memory::RedisConversationStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::hr::jobs::seed_sample_jobs;
use crate::knowledge::{CompanyKnowledge, HttpKnowledgeBase, StaticKnowledgeBase};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Frontdesk API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and seed openings on an empty table
    let db = create_pool(&config.database_url).await?;
    if config.seed_sample_jobs {
        let seeded = seed_sample_jobs(&db).await?;
        if seeded > 0 {
            info!("Seeded {seeded} sample job openings");
        }
    }

    // Initialize Redis conversation store
    let redis = redis::Client::open(config.redis_url.clone())?;
    let conversations = Arc::new(RedisConversationStore::new(
        redis,
        config.chat_history_ttl_secs,
    ));
    info!("Redis conversation store initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let model = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize company knowledge (vector search when configured)
    let knowledge: Arc<dyn CompanyKnowledge> = match &config.knowledge_search_url {
        Some(url) => {
            info!("Company knowledge served by {url}");
            Arc::new(HttpKnowledgeBase::new(url, &config.knowledge_company_id)?)
        }
        None => {
            info!("Company knowledge served from the built-in profile");
            Arc::new(StaticKnowledgeBase::with_company_profile())
        }
    };

    // Build app state
    let state = AppState {
        db,
        conversations,
        s3,
        model,
        knowledge,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "frontdesk-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
