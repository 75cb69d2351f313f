//! Peripheral discovery.
//!
//! Resolves a [`DeviceTarget`] to a concrete peripheral by scanning the
//! adapter within a bounded window.

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace};

use crate::config::DeviceTarget;
use crate::error::{Error, Result};

/// How often to re-poll the adapter's peripheral list while scanning.
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Get the system's first Bluetooth adapter.
///
/// # Errors
///
/// Returns an error if Bluetooth is not available.
pub async fn default_adapter() -> Result<Adapter> {
    let manager = Manager::new()
        .await
        .map_err(|_e| Error::BluetoothUnavailable)?;

    let adapters = manager.adapters().await.map_err(Error::Bluetooth)?;

    let adapter = adapters
        .into_iter()
        .next()
        .ok_or(Error::BluetoothUnavailable)?;

    info!(
        "Using Bluetooth adapter: {:?}",
        adapter.adapter_info().await.ok()
    );

    Ok(adapter)
}

/// Scan until a peripheral matching `target` is seen or the window elapses.
pub async fn find_peripheral(
    adapter: &Adapter,
    target: &DeviceTarget,
    window: Duration,
) -> Result<Peripheral> {
    debug!("Scanning for peripheral with {target} (window {window:?})");

    adapter
        .start_scan(ScanFilter::default())
        .await
        .map_err(Error::Bluetooth)?;

    let found = scan_for_match(adapter, target, window).await;

    // Best effort; a failed stop does not invalidate a successful find.
    let _ = adapter.stop_scan().await;

    found
}

async fn scan_for_match(
    adapter: &Adapter,
    target: &DeviceTarget,
    window: Duration,
) -> Result<Peripheral> {
    let deadline = Instant::now() + window;

    loop {
        let peripherals = adapter.peripherals().await.map_err(Error::Bluetooth)?;
        for peripheral in peripherals {
            if matches_target(&peripheral, target).await {
                debug!("Found peripheral {}", peripheral.address());
                return Ok(peripheral);
            }
        }

        if Instant::now() >= deadline {
            return Err(Error::PeripheralNotFound {
                target: target.to_string(),
            });
        }

        sleep(SCAN_POLL_INTERVAL).await;
    }
}

async fn matches_target(peripheral: &Peripheral, target: &DeviceTarget) -> bool {
    match target {
        DeviceTarget::Address(address) => peripheral
            .address()
            .to_string()
            .eq_ignore_ascii_case(address),
        DeviceTarget::NameContains(fragment) => match peripheral.properties().await {
            Ok(Some(properties)) => properties
                .local_name
                .map(|name| name.contains(fragment))
                .unwrap_or(false),
            _ => {
                trace!("No properties for {}", peripheral.address());
                false
            }
        },
    }
}
