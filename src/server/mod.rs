//! JSON API server for driving scans and managing the approved-job
//! lifecycle from a browser or external tooling.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::{ConfigStore, Settings};
use crate::llm::{CompletionBackend, Evaluator, HttpCompletionBackend};
use crate::repository::{
    run_migrations, AsyncSqlitePool, JobRepository, ScanStateRepository,
};
use crate::scan::{ScanContext, ScanController};
use crate::scrapers::{JobBoard, LinkedInBoard};

/// Shared state for the API server.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobRepository,
    pub scan_state: ScanStateRepository,
    pub controller: Arc<ScanController>,
    pub config_store: Arc<ConfigStore>,
    pub board: Arc<dyn JobBoard>,
    pub evaluator: Arc<Evaluator<Box<dyn CompletionBackend>>>,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        settings.ensure_dirs()?;
        let db_url = settings.db_path().display().to_string();
        run_migrations(&db_url).await?;

        let pool = AsyncSqlitePool::new(&db_url);
        let scan_state = ScanStateRepository::new(pool.clone());

        Ok(Self {
            jobs: JobRepository::new(pool),
            scan_state: scan_state.clone(),
            controller: Arc::new(ScanController::new(scan_state)),
            config_store: Arc::new(ConfigStore::new(settings)),
            board: Arc::new(LinkedInBoard::new()),
            evaluator: Arc::new(Evaluator::with_backend(
                Box::new(HttpCompletionBackend::new()) as Box<dyn CompletionBackend>,
            )),
        })
    }

    /// Bundle the pieces a scan run needs.
    pub fn scan_context(&self) -> ScanContext {
        ScanContext {
            jobs: self.jobs.clone(),
            scan_state: self.scan_state.clone(),
            config_store: Arc::clone(&self.config_store),
            board: Arc::clone(&self.board),
            evaluator: Arc::clone(&self.evaluator),
        }
    }
}

/// Start the API server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
