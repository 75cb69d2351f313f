//! Connection supervision.
//!
//! Owns the lifecycle of the radio connection: discover, connect,
//! subscribe, stream, detect disconnection, and retry forever. Every
//! transport fault is recoverable; the supervisor only stops when its task
//! is aborted at process shutdown.

use bytes::Bytes;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{BridgeConfig, DeviceTarget};
use crate::error::{Error, Result};
use crate::link::{LinkSession, SensorLink};
use crate::protocol::SensorUpdate;
use crate::state::SensorState;

/// Lifecycle state of the radio link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkState {
    /// Not yet started.
    #[default]
    Idle,
    /// Scanning for a peripheral matching the configured name fragment.
    Discovering,
    /// Attempting to open a connection.
    Connecting,
    /// Connected and subscribed to the notification channel.
    Subscribed,
    /// Receiving notifications.
    Streaming,
    /// Connection dropped; waiting to retry.
    Disconnected,
}

impl LinkState {
    /// Check if notifications are flowing.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    /// Check if the supervisor is between sessions, working to restore one.
    pub fn is_recovering(&self) -> bool {
        matches!(
            self,
            Self::Discovering | Self::Connecting | Self::Subscribed | Self::Disconnected
        )
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Discovering => write!(f, "Discovering"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Subscribed => write!(f, "Subscribed"),
            Self::Streaming => write!(f, "Streaming"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Supervises the connection to the sensor peripheral.
///
/// Publishes every successfully decoded notification into the shared
/// [`SensorState`], in arrival order. Malformed notifications are logged
/// and discarded without touching the state or the connection.
pub struct LinkSupervisor {
    /// The radio transport.
    link: Box<dyn SensorLink>,
    /// Where decoded readings are published.
    state: Arc<SensorState>,
    /// The peripheral to attach to.
    target: DeviceTarget,
    /// Delay between reconnect attempts.
    retry_delay: Duration,
    /// Interval between liveness checks while streaming.
    liveness_interval: Duration,
    /// Current lifecycle state.
    link_state: Arc<RwLock<LinkState>>,
}

impl LinkSupervisor {
    /// Create a supervisor for the configured peripheral.
    pub fn new(link: Box<dyn SensorLink>, state: Arc<SensorState>, config: &BridgeConfig) -> Self {
        Self {
            link,
            state,
            target: config.target.clone(),
            retry_delay: config.retry_delay,
            liveness_interval: config.liveness_interval,
            link_state: Arc::new(RwLock::new(LinkState::Idle)),
        }
    }

    /// Get the current lifecycle state.
    pub fn link_state(&self) -> LinkState {
        *self.link_state.read()
    }

    /// Shared handle to the lifecycle state, for observers outside the
    /// supervisor task.
    pub fn link_state_handle(&self) -> Arc<RwLock<LinkState>> {
        self.link_state.clone()
    }

    /// Run the supervision loop.
    ///
    /// Never returns: every session error, from a failed scan to a dropped
    /// connection, leads back to a retry after a fixed delay.
    pub async fn run(self) {
        info!("Supervising link to peripheral with {}", self.target);

        loop {
            match self.run_session().await {
                Ok(()) => info!("Session ended"),
                Err(e) => warn!("Link error: {e}"),
            }

            self.set_state(LinkState::Disconnected);
            debug!("Retrying in {:?}", self.retry_delay);
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    /// Run one connect-subscribe-stream cycle.
    async fn run_session(&self) -> Result<()> {
        if matches!(self.target, DeviceTarget::NameContains(_)) {
            self.set_state(LinkState::Discovering);
            info!("Scanning for peripheral with {}", self.target);
        }
        let address = self.link.resolve(&self.target).await?;

        self.set_state(LinkState::Connecting);
        info!("Connecting to {address}");
        let mut session = self.link.open(&address).await?;
        info!("Connected to {address}");

        let result = self.stream(session.as_mut()).await;
        session.close().await;
        result
    }

    /// Consume notifications until the session dies.
    async fn stream(&self, session: &mut dyn LinkSession) -> Result<()> {
        let mut payloads = session.subscribe().await?;
        self.set_state(LinkState::Subscribed);
        info!("Subscribed to sensor notifications");

        let mut liveness = tokio::time::interval(self.liveness_interval);
        self.set_state(LinkState::Streaming);

        loop {
            tokio::select! {
                maybe_payload = payloads.recv() => match maybe_payload {
                    Some(payload) => self.handle_payload(&payload),
                    None => return Err(Error::ConnectionLost),
                },
                _ = liveness.tick() => {
                    if !session.is_alive().await {
                        return Err(Error::ConnectionLost);
                    }
                }
            }
        }
    }

    /// Decode one payload and publish it.
    fn handle_payload(&self, payload: &Bytes) {
        match SensorUpdate::parse(payload) {
            Ok(update) => {
                debug!("Received {update:?}");
                self.state.apply(update);
            }
            Err(e) => warn!("Discarding notification: {e}"),
        }
    }

    /// Update the lifecycle state, logging transitions.
    fn set_state(&self, new_state: LinkState) {
        let mut state = self.link_state.write();
        if *state != new_state {
            debug!("Link state changed: {} -> {}", *state, new_state);
            *state = new_state;
        }
    }
}
