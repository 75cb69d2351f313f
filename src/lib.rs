// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # microbit-sensor-bridge
//!
//! Bridges a BBC micro:bit broadcasting distance and collision readings
//! over Bluetooth Low Energy to local HTTP clients polling for the latest
//! values.
//!
//! The micro:bit pushes line-oriented text messages (`DIST:<cm>`,
//! `CRASH:<0|1>`) over the Nordic UART Service. The bridge keeps a
//! long-lived, self-healing connection to the peripheral and serves
//! whatever it last heard; HTTP clients never wait on the radio link.
//!
//! ## Features
//!
//! - **Resilient link**: connect, subscribe, stream, and retry forever on
//!   any transport fault
//! - **Auto-discovery**: find the peripheral by advertised name instead of
//!   a fixed address
//! - **Instant queries**: `GET /data` returns the latest snapshot as JSON,
//!   `GET /` as a small HTML page
//! - **Honest sentinels**: fields are `null` until the first reading
//!   arrives, so "never observed" is distinct from an observed zero
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use microbit_sensor_bridge::{Bridge, BridgeConfig, DeviceTarget, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = BridgeConfig::new(DeviceTarget::Address(
//!         "E8:B7:F1:6E:38:E4".to_string(),
//!     ));
//!
//!     // Supervises the radio link in the background and serves HTTP on
//!     // 0.0.0.0:5000 until ctrl-c.
//!     Bridge::new(config).run().await
//! }
//! ```
//!
//! ## Platform Notes
//!
//! ### macOS
//! Requires Bluetooth permission. Add `NSBluetoothAlwaysUsageDescription`
//! to your Info.plist for bundled apps.
//!
//! ### Linux
//! Requires BlueZ. User may need to be in the `bluetooth` group.
//!
//! ### Windows
//! Requires Windows 10 or later with Bluetooth LE support.

// Public modules
pub mod ble;
pub mod bridge;
pub mod config;
pub mod error;
pub mod link;
pub mod protocol;
pub mod server;
pub mod state;

// Re-exports for convenience
pub use ble::BleLink;
pub use bridge::Bridge;
pub use config::{BridgeConfig, DeviceTarget};
pub use error::{Error, Result};
pub use link::{LinkSession, LinkState, LinkSupervisor, SensorLink};
pub use protocol::{DecodeError, SensorUpdate};
pub use server::SensorResponse;
pub use state::{SensorReading, SensorState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that key types are exported
        let _ = std::any::TypeId::of::<Bridge>();
        let _ = std::any::TypeId::of::<BridgeConfig>();
        let _ = std::any::TypeId::of::<Error>();
        let _ = std::any::TypeId::of::<LinkState>();
        let _ = std::any::TypeId::of::<SensorReading>();
        let _ = std::any::TypeId::of::<SensorResponse>();
        let _ = std::any::TypeId::of::<SensorUpdate>();
    }
}
