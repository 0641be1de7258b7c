use anyhow::{Context, Result};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::settings::AppConfig;
use crate::database::{self, DataService};
use crate::feed::{runner, ClientState, FeedController, LogNotifier};
use crate::realtime::RealtimeHub;
use crate::services::submission::SubmissionService;
use crate::storage::ImageStore;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let pool = database::create_pool(&self.config.storage.database_path)?;
        let hub = RealtimeHub::new();
        let service = DataService::new(pool, hub.clone());
        let images = ImageStore::from_settings(&self.config.storage);

        let state = Arc::new(AppState {
            submissions: SubmissionService::new(service.clone(), images.clone(), &self.config),
            service: service.clone(),
            config: self.config.clone(),
        });

        // Follows the activities table so every insert is logged as it lands.
        let mut client_state = ClientState::ephemeral();
        client_state.set_notifications_enabled(true)?;
        let feed = runner::spawn(
            FeedController::new(self.config.feed.clone(), client_state),
            service,
            &hub,
            Box::new(LogNotifier),
            self.config.feed.clone(),
        );

        let app = create_router(state)
            .nest_service("/images", ServeDir::new(images.root()))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        feed.shutdown().await;
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
