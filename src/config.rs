//! Bridge configuration.
//!
//! Everything the bridge needs to know about the peripheral and its own
//! serving behavior lives here. The peripheral address, the notification
//! characteristic, and the timing knobs are all fixed for the lifetime of
//! the process.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use uuid::Uuid;

use crate::ble::uuids::UART_TX_UUID;

/// Which peripheral the bridge should attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceTarget {
    /// Connect to a peripheral with a known BLE address.
    Address(String),
    /// Scan for the first peripheral whose advertised name contains the
    /// given fragment.
    NameContains(String),
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "address {address}"),
            Self::NameContains(fragment) => write!(f, "name containing {fragment:?}"),
        }
    }
}

/// Runtime configuration for the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// The peripheral to connect to.
    pub target: DeviceTarget,
    /// The characteristic carrying sensor notifications.
    pub notify_characteristic: Uuid,
    /// Address the HTTP server binds to.
    pub http_addr: SocketAddr,
    /// Delay between reconnect attempts.
    pub retry_delay: Duration,
    /// Interval between link liveness checks while streaming.
    pub liveness_interval: Duration,
    /// How long a discovery scan may run before giving up.
    pub scan_window: Duration,
}

impl BridgeConfig {
    /// Default delay between reconnect attempts.
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);
    /// Default interval between liveness checks.
    pub const DEFAULT_LIVENESS_INTERVAL: Duration = Duration::from_secs(1);
    /// Default discovery scan window.
    pub const DEFAULT_SCAN_WINDOW: Duration = Duration::from_secs(10);
    /// Advertised name fragment of a stock micro:bit.
    pub const DEFAULT_NAME_FRAGMENT: &'static str = "BBC micro:bit";

    /// Create a configuration for the given target with default timing and
    /// the Nordic UART TX characteristic.
    pub fn new(target: DeviceTarget) -> Self {
        Self {
            target,
            notify_characteristic: UART_TX_UUID,
            http_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            retry_delay: Self::DEFAULT_RETRY_DELAY,
            liveness_interval: Self::DEFAULT_LIVENESS_INTERVAL,
            scan_window: Self::DEFAULT_SCAN_WINDOW,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(DeviceTarget::NameContains(
            Self::DEFAULT_NAME_FRAGMENT.to_string(),
        ))
    }
}
