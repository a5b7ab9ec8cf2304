// HTTP API mode
//
// Exposes the pipeline stages as endpoints. Each request runs its own
// sequential stage against shared read-only components; there is no
// cross-request cache or coordination.

mod handlers;

pub use handlers::create_router;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::llm::{create_client, LlmClient};
use crate::search::FinderChain;

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Shared state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub finder: Arc<FinderChain>,
    pub llm: Arc<dyn LlmClient>,
}

pub struct ApiServer {
    state: Arc<AppState>,
    server_config: ServerConfig,
}

impl ApiServer {
    pub fn new(config: Config, server_config: ServerConfig) -> Result<Self> {
        let finder = Arc::new(FinderChain::from_config(&config.search)?);
        let llm: Arc<dyn LlmClient> = Arc::from(create_client(&config.llm)?);

        Ok(Self {
            state: Arc::new(AppState {
                config,
                finder,
                llm,
            }),
            server_config,
        })
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .server_config
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address {}", self.server_config.bind_address))?;

        // Body size limit guards against oversized foreign payloads; 2MB is
        // generous for lead batches.
        let app = create_router(self.state)
            .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        tracing::info!("Starting prospector API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
