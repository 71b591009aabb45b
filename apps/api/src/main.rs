mod analysis;
mod config;
mod errors;
mod job_source;
mod llm_client;
mod matching;
mod models;
mod profile;
mod retry;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::MarketAnalyst;
use crate::config::Config;
use crate::job_source::adzuna::{AdzunaClient, AdzunaConfig};
use crate::llm_client::{LanguageModel, LlmClient};
use crate::matching::multipliers::MultiplierConfig;
use crate::matching::scorer::{MatchScorer, ScorerConfig};
use crate::models::criteria::SearchCriteria;
use crate::profile::ProfileLoader;
use crate::routes::build_router;
use crate::session::controller::SessionController;
use crate::session::pipeline::Pipeline;
use crate::session::store::InMemorySessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobscout v{}", env!("CARGO_PKG_VERSION"));

    // Profile preflight: a missing CV aborts before any session starts
    let profile = ProfileLoader::new(&config.profile_dir);
    let preflight = profile
        .load()
        .await
        .with_context(|| format!("Profile preflight failed in {}", config.profile_dir.display()))?;
    info!(
        "Profile loaded: {} skills, {} roles",
        preflight.all_skills().len(),
        preflight.roles().len()
    );

    let defaults = SearchCriteria::load_defaults(&config.search_config_path)?;
    info!(
        "Default criteria from {}: {} position(s), {} filter(s)",
        config.search_config_path.display(),
        defaults.positions.len(),
        defaults.filters.len()
    );

    // Initialize LLM client
    let llm: Arc<dyn LanguageModel> = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        config.retry_policy(),
    ));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize job source
    let source = Arc::new(AdzunaClient::new(AdzunaConfig {
        app_id: config.adzuna_app_id.clone(),
        api_key: config.adzuna_api_key.clone(),
        country: config.adzuna_country.clone(),
        results_per_page: config.adzuna_results_per_page,
        timeout: config.http_timeout,
        retry: config.retry_policy(),
    }));
    info!("Job source initialized (adzuna/{})", config.adzuna_country);

    let scorer = MatchScorer::new(
        Arc::clone(&llm),
        ScorerConfig {
            multipliers: MultiplierConfig {
                location_penalty: config.location_penalty,
                salary_decay: config.salary_decay,
            },
            ..Default::default()
        },
    );

    let pipeline = Pipeline {
        profile,
        source,
        scorer: Arc::new(scorer),
        analyst: MarketAnalyst::new(llm),
        scoring_concurrency: config.scoring_concurrency,
    };

    let state = AppState {
        sessions: SessionController::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(pipeline),
            defaults,
        ),
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
