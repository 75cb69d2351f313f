//! Bridge runtime.
//!
//! Wires the pieces together: one shared [`SensorState`], a background
//! link supervisor writing into it, and a foreground HTTP server reading
//! from it. The two sides communicate through the state alone.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::ble::BleLink;
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::link::LinkSupervisor;
use crate::server;
use crate::state::SensorState;

/// Runs the link supervisor and the HTTP query service.
pub struct Bridge {
    config: BridgeConfig,
    state: Arc<SensorState>,
}

impl Bridge {
    /// Create a bridge for the given configuration.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            state: Arc::new(SensorState::new()),
        }
    }

    /// Shared handle to the sensor state.
    pub fn state(&self) -> Arc<SensorState> {
        self.state.clone()
    }

    /// Run until ctrl-c or a fatal server error.
    ///
    /// The supervisor runs as a background task and is aborted on
    /// shutdown. Aborting it mid-session is safe: readings are only ever
    /// published whole, under the state lock, so no torn value can be
    /// left behind.
    pub async fn run(self) -> Result<()> {
        let link = BleLink::new(
            self.config.scan_window,
            self.config.notify_characteristic,
        )
        .await?;

        let supervisor = LinkSupervisor::new(Box::new(link), self.state.clone(), &self.config);
        let supervisor_handle = tokio::spawn(supervisor.run());

        let listener = TcpListener::bind(self.config.http_addr).await?;
        info!("Serving sensor data on http://{}", self.config.http_addr);

        let app = server::router(self.state.clone());
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        info!("Shutting down");
        supervisor_handle.abort();

        result.map_err(Into::into)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
}
