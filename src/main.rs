//! Bridge daemon entry point.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use uuid::Uuid;

use microbit_sensor_bridge::{Bridge, BridgeConfig, DeviceTarget, Result};

/// Bridge a micro:bit distance/collision sensor to local HTTP clients.
#[derive(Debug, Parser)]
#[command(name = "microbit-sensor-bridge", version, about)]
struct Args {
    /// BLE address of the peripheral (e.g. E8:B7:F1:6E:38:E4). When unset,
    /// the bridge scans for the peripheral by advertised name instead.
    #[arg(long, env = "BRIDGE_DEVICE_ADDRESS")]
    device_address: Option<String>,

    /// Advertised name fragment to scan for.
    #[arg(
        long,
        env = "BRIDGE_DEVICE_NAME",
        default_value = BridgeConfig::DEFAULT_NAME_FRAGMENT,
        conflicts_with = "device_address"
    )]
    device_name: String,

    /// Characteristic UUID carrying sensor notifications. Defaults to the
    /// Nordic UART TX characteristic.
    #[arg(long, env = "BRIDGE_CHARACTERISTIC")]
    characteristic: Option<Uuid>,

    /// Address to serve HTTP on.
    #[arg(long, env = "BRIDGE_HTTP_ADDR", default_value = "0.0.0.0:5000")]
    http_addr: SocketAddr,

    /// Seconds to wait between reconnect attempts.
    #[arg(long, env = "BRIDGE_RETRY_DELAY", default_value_t = 5)]
    retry_delay: u64,

    /// Seconds between link liveness checks while streaming.
    #[arg(long, env = "BRIDGE_LIVENESS_INTERVAL", default_value_t = 1)]
    liveness_interval: u64,

    /// Seconds a discovery scan may run before the bridge retries.
    #[arg(long, env = "BRIDGE_SCAN_WINDOW", default_value_t = 10)]
    scan_window: u64,
}

impl Args {
    fn into_config(self) -> BridgeConfig {
        let target = match self.device_address {
            Some(address) => DeviceTarget::Address(address),
            None => DeviceTarget::NameContains(self.device_name),
        };

        let mut config = BridgeConfig::new(target);
        if let Some(characteristic) = self.characteristic {
            config.notify_characteristic = characteristic;
        }
        config.http_addr = self.http_addr;
        config.retry_delay = Duration::from_secs(self.retry_delay);
        config.liveness_interval = Duration::from_secs(self.liveness_interval);
        config.scan_window = Duration::from_secs(self.scan_window);
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();
    Bridge::new(config).run().await
}
