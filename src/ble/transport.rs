//! btleplug-backed implementation of the radio link boundary.
//!
//! [`BleLink`] resolves and opens connections; [`BleSession`] wraps one
//! connected peripheral and forwards its notification stream into a
//! bounded, order-preserving channel.

use async_trait::async_trait;
use btleplug::api::Peripheral as _;
use btleplug::platform::{Adapter, Peripheral};
use bytes::Bytes;
use futures::stream::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::ble::scanner;
use crate::config::DeviceTarget;
use crate::error::{Error, Result};
use crate::link::{LinkSession, SensorLink};

/// Bounded capacity for in-flight notification payloads.
///
/// The peripheral emits a few messages per second; the consumer keeps up
/// easily, so a small buffer only has to absorb scheduling jitter.
const PAYLOAD_CHANNEL_CAPACITY: usize = 64;

/// Radio transport on a real Bluetooth adapter.
pub struct BleLink {
    /// The adapter to scan and connect with.
    adapter: Adapter,
    /// How long a scan may run before giving up.
    scan_window: Duration,
    /// The characteristic carrying sensor notifications.
    notify_characteristic: Uuid,
}

impl BleLink {
    /// Create a link on the system's default Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if Bluetooth is not available.
    pub async fn new(scan_window: Duration, notify_characteristic: Uuid) -> Result<Self> {
        let adapter = scanner::default_adapter().await?;
        Ok(Self::with_adapter(adapter, scan_window, notify_characteristic))
    }

    /// Create a link on a specific adapter.
    pub fn with_adapter(
        adapter: Adapter,
        scan_window: Duration,
        notify_characteristic: Uuid,
    ) -> Self {
        Self {
            adapter,
            scan_window,
            notify_characteristic,
        }
    }
}

#[async_trait]
impl SensorLink for BleLink {
    async fn resolve(&self, target: &DeviceTarget) -> Result<String> {
        match target {
            // A fixed address needs no scan here; open() locates the
            // peripheral when it is actually in range.
            DeviceTarget::Address(address) => Ok(address.clone()),
            DeviceTarget::NameContains(_) => {
                let peripheral =
                    scanner::find_peripheral(&self.adapter, target, self.scan_window).await?;
                Ok(peripheral.address().to_string())
            }
        }
    }

    async fn open(&self, address: &str) -> Result<Box<dyn LinkSession>> {
        let target = DeviceTarget::Address(address.to_string());
        let peripheral =
            scanner::find_peripheral(&self.adapter, &target, self.scan_window).await?;

        peripheral
            .connect()
            .await
            .map_err(|e| Error::ConnectionFailed {
                reason: e.to_string(),
            })?;

        if let Err(e) = peripheral.discover_services().await {
            let _ = peripheral.disconnect().await;
            return Err(Error::Bluetooth(e));
        }

        Ok(Box::new(BleSession {
            peripheral,
            notify_characteristic: self.notify_characteristic,
            forwarder: None,
        }))
    }
}

/// One connected-and-subscribed period with the peripheral.
pub struct BleSession {
    /// The connected peripheral.
    peripheral: Peripheral,
    /// The characteristic to subscribe to.
    notify_characteristic: Uuid,
    /// Task forwarding the notification stream into the channel.
    forwarder: Option<JoinHandle<()>>,
}

#[async_trait]
impl LinkSession for BleSession {
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<Bytes>> {
        let characteristic = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == self.notify_characteristic)
            .ok_or_else(|| Error::CharacteristicNotFound {
                uuid: self.notify_characteristic.to_string(),
            })?;

        self.peripheral
            .subscribe(&characteristic)
            .await
            .map_err(Error::Bluetooth)?;

        let mut notifications = self
            .peripheral
            .notifications()
            .await
            .map_err(Error::Bluetooth)?;

        let notify_characteristic = self.notify_characteristic;
        let (tx, rx) = mpsc::channel(PAYLOAD_CHANNEL_CAPACITY);

        // Forward the push-style notification stream into the channel.
        // Awaiting each send keeps arrival order intact; the stream ending
        // (peripheral gone) drops the sender and closes the channel, which
        // the supervisor treats as a disconnect.
        let handle = tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                if notification.uuid != notify_characteristic {
                    continue;
                }
                trace!("Notification: {} bytes", notification.value.len());
                if tx.send(Bytes::from(notification.value)).await.is_err() {
                    break;
                }
            }
            debug!("Notification stream ended");
        });
        self.forwarder = Some(handle);

        Ok(rx)
    }

    async fn is_alive(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn close(&mut self) {
        if let Some(handle) = self.forwarder.take() {
            handle.abort();
        }
        if let Err(e) = self.peripheral.disconnect().await {
            debug!("Disconnect failed: {e}");
        }
    }
}
