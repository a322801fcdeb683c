use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_api::{
    app::build_router,
    config::{Config, StoreBackendKind},
    state::AppState,
};
use storefront_llm::{ClientFactory, OpenAIConfig, ProviderConfig};
use storefront_store::StoreClientBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();
    
    // Missing credentials stop the process before anything is served
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    
    init_logging(&config);
    
    tracing::info!("Starting Storefront API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);
    
    // Initialize LLM client
    let mut openai = OpenAIConfig::new(config.openai_api_key.clone());
    if let Some(base_url) = &config.llm.base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    let chat_client = ClientFactory::create_chat_client(ProviderConfig::OpenAI(openai))?;
    
    // Initialize store
    let builder = match config.store.backend {
        StoreBackendKind::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            StoreClientBuilder::new().mongodb(&config.mongodb_uri, &config.store.database)
        }
        StoreBackendKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            StoreClientBuilder::new().memory()
        }
    };
    let store = builder.build().await?;
    
    let state = Arc::new(AppState::new(config.clone(), store, chat_client));
    state.refresh_inventory().await;
    let _cleanup = state.sessions.spawn_cleanup(Duration::from_secs(60));
    
    let app = build_router(state.clone());
    
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    
    axum::serve(listener, app).await?;
    
    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    
    let registry = tracing_subscriber::registry().with(env_filter);
    
    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
