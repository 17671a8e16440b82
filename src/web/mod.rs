pub(crate) mod auth;
mod handlers;
mod router;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::ai::{GeminiResearcher, OpenAiGenerator, ResearchCollector, TextGenerator};
use crate::config::Config;
use crate::feeds::NewsFeeds;
use crate::newsroom::{DisabledGenerator, DisabledResearcher, Newsroom};
use crate::store::ContentStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) newsroom: Newsroom,
    pub(crate) cron_secret: Option<String>,
}

/// Wire the store, providers and router from config and serve until shutdown.
pub async fn serve(config: Config) -> Result<()> {
    let store = ContentStore::open(&config.db_path)?;

    let generator: Arc<dyn TextGenerator> = match &config.openai_api_key {
        Some(key) => Arc::new(OpenAiGenerator::new(key.clone(), config.openai_model.clone())),
        None => {
            warn!("OPENAI_API_KEY not set; draft generation will degrade to placeholders");
            Arc::new(DisabledGenerator)
        }
    };
    let researcher: Arc<dyn ResearchCollector> = match &config.gemini_api_key {
        Some(key) => Arc::new(GeminiResearcher::new(key.clone(), config.gemini_model.clone())),
        None => {
            warn!("GEMINI_API_KEY not set; research will return fallback envelopes");
            Arc::new(DisabledResearcher)
        }
    };
    if config.cron_secret.is_none() {
        warn!("PRESSBOX_CRON_SECRET not set; the cron endpoint is disabled");
    }

    let newsroom = Newsroom::new(store, generator, researcher, Arc::new(NewsFeeds::new()));
    let state = AppState {
        newsroom,
        cron_secret: config.cron_secret.clone(),
    };
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("pressbox listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
