//! Radio link supervision.
//!
//! The traits here form the boundary between the reconnect logic and the
//! actual radio transport. [`LinkSupervisor`] drives a [`SensorLink`]
//! without knowing whether it is backed by a real Bluetooth adapter or a
//! test double.

pub mod supervisor;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::config::DeviceTarget;
use crate::error::Result;

pub use supervisor::{LinkState, LinkSupervisor};

/// A radio transport capable of locating and connecting to the peripheral.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SensorLink: Send + Sync {
    /// Resolve the configured target to a concrete peripheral address.
    ///
    /// For a fixed-address target this is immediate; for name-based
    /// discovery it scans within a bounded window and fails if no
    /// matching peripheral advertises in time.
    async fn resolve(&self, target: &DeviceTarget) -> Result<String>;

    /// Open a connection to the peripheral at `address`.
    async fn open(&self, address: &str) -> Result<Box<dyn LinkSession>>;
}

/// One connect-to-disconnect cycle with the peripheral.
///
/// A session never outlives its physical connection; the supervisor
/// creates one per attempt and closes it on any failure.
#[async_trait]
pub trait LinkSession: Send {
    /// Subscribe to the sensor notification channel.
    ///
    /// Payloads are delivered in arrival order through a bounded channel.
    /// The channel closing signals that the underlying stream has ended.
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<Bytes>>;

    /// Whether the underlying connection is still up.
    async fn is_alive(&self) -> bool;

    /// Tear the session down and release the connection.
    async fn close(&mut self);
}
