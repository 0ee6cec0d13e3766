use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paperdesk::grid::WorksheetRegistry;
use paperdesk::llm::Llm;
use paperdesk::sheets::SheetsClient;
use paperdesk::{config::Config, routes::create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paperdesk=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    let llm = Llm::from_config(&config.llm)
        .map_err(|e| anyhow::anyhow!("LLM provider setup failed: {}", e))?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "LLM provider ready");

    // Remote-sync capability check: runs once, decides the mode for the life
    // of the process, and never fails startup.
    let sheets = match SheetsClient::from_config(&config.sheets).await {
        Ok(Some(client)) => {
            info!("Remote spreadsheet sync enabled");
            Some(Arc::new(client))
        }
        Ok(None) => {
            info!("Remote spreadsheet sync disabled: no credentials configured");
            None
        }
        Err(e) => {
            warn!("Remote spreadsheet sync disabled: {}", e);
            None
        }
    };

    // Create shared state
    let state = AppState {
        config: config.clone(),
        llm: Arc::new(llm),
        sheets,
        worksheets: WorksheetRegistry::default(),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
