//! End-to-end tests: scripted notifications in, HTTP snapshots out.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

use microbit_sensor_bridge::{
    BridgeConfig, DeviceTarget, Error, LinkSession, LinkSupervisor, Result, SensorLink,
    SensorResponse, SensorState,
};

/// A link whose sessions replay scripted payload batches, one batch per
/// connection. Every batch except the last ends with the notification
/// channel closing, which the supervisor must treat as a disconnect; the
/// last batch keeps its session alive.
struct ScriptedLink {
    batches: Mutex<Vec<Vec<&'static [u8]>>>,
    opens: Arc<AtomicUsize>,
}

impl ScriptedLink {
    fn new(batches: Vec<Vec<&'static [u8]>>) -> Self {
        Self {
            batches: Mutex::new(batches),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn open_count(&self) -> Arc<AtomicUsize> {
        self.opens.clone()
    }
}

#[async_trait]
impl SensorLink for ScriptedLink {
    async fn resolve(&self, _target: &DeviceTarget) -> Result<String> {
        Ok("E8:B7:F1:6E:38:E4".to_string())
    }

    async fn open(&self, _address: &str) -> Result<Box<dyn LinkSession>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let mut batches = self.batches.lock();
        if batches.is_empty() {
            return Err(Error::ConnectionFailed {
                reason: "script exhausted".to_string(),
            });
        }
        let payloads = batches.remove(0);
        Ok(Box::new(ScriptedSession {
            payloads,
            stay_open: batches.is_empty(),
            parked_tx: None,
        }))
    }
}

/// Delivers its payloads in order with short pauses, so intermediate
/// snapshots can be observed.
struct ScriptedSession {
    payloads: Vec<&'static [u8]>,
    stay_open: bool,
    parked_tx: Option<mpsc::Sender<Bytes>>,
}

#[async_trait]
impl LinkSession for ScriptedSession {
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<Bytes>> {
        let (tx, rx) = mpsc::channel(64);
        let payloads = std::mem::take(&mut self.payloads);
        if self.stay_open {
            self.parked_tx = Some(tx.clone());
        }
        // Pause long enough between payloads that each intermediate state
        // can be observed by the polling assertions.
        tokio::spawn(async move {
            for payload in payloads {
                if tx.send(Bytes::from_static(payload)).await.is_err() {
                    return;
                }
                sleep(Duration::from_millis(200)).await;
            }
        });
        Ok(rx)
    }

    async fn is_alive(&self) -> bool {
        true
    }

    async fn close(&mut self) {
        self.parked_tx = None;
    }
}

fn test_config() -> BridgeConfig {
    let mut config = BridgeConfig::new(DeviceTarget::Address("E8:B7:F1:6E:38:E4".to_string()));
    config.retry_delay = Duration::from_millis(10);
    config.liveness_interval = Duration::from_millis(10);
    config
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met in time");
        sleep(Duration::from_millis(5)).await;
    }
}

fn json_snapshot(state: &SensorState) -> serde_json::Value {
    serde_json::to_value(SensorResponse::from(state.snapshot())).unwrap()
}

#[tokio::test]
async fn test_notification_sequence_reaches_http_snapshots() {
    let link = ScriptedLink::new(vec![vec![b"DIST:120", b"CRASH:1", b"DIST:45"]]);
    let state = Arc::new(SensorState::new());

    // Before any notification: both fields at the unknown sentinel.
    let before = json_snapshot(&state);
    assert_eq!(before["distance"], serde_json::Value::Null);
    assert_eq!(before["crash"], serde_json::Value::Null);

    let supervisor = LinkSupervisor::new(Box::new(link), state.clone(), &test_config());
    let handle = tokio::spawn(supervisor.run());

    // After DIST:120 - distance set, crash still unknown.
    wait_until(|| state.snapshot().distance_cm == Some(120)).await;
    let first = json_snapshot(&state);
    assert_eq!(first["distance"], 120);
    assert_eq!(first["crash"], serde_json::Value::Null);

    // After CRASH:1 - crash set, distance unchanged.
    wait_until(|| state.snapshot().crash_detected == Some(true)).await;
    let second = json_snapshot(&state);
    assert_eq!(second["distance"], 120);
    assert_eq!(second["crash"], true);

    // After DIST:45 - distance replaced, crash retained.
    wait_until(|| state.snapshot().distance_cm == Some(45)).await;
    let third = json_snapshot(&state);
    assert_eq!(third["distance"], 45);
    assert_eq!(third["crash"], true);
    assert!(third["last_updated"].is_string());

    handle.abort();
}

#[tokio::test]
async fn test_readings_survive_reconnect_cycles() {
    let link = ScriptedLink::new(vec![
        vec![b"DIST:120", b"CRASH:1"],
        vec![],
        vec![b"DIST:45"],
    ]);
    let opens = link.open_count();

    let state = Arc::new(SensorState::new());
    let supervisor = LinkSupervisor::new(Box::new(link), state.clone(), &test_config());
    let handle = tokio::spawn(supervisor.run());

    wait_until(|| state.snapshot().crash_detected == Some(true)).await;
    wait_until(|| opens.load(Ordering::SeqCst) >= 2).await;

    // Between sessions the last valid readings are still served.
    let during = json_snapshot(&state);
    assert_eq!(during["crash"], true);

    wait_until(|| state.snapshot().distance_cm == Some(45)).await;
    let after = json_snapshot(&state);
    assert_eq!(after["distance"], 45);
    assert_eq!(after["crash"], true);

    handle.abort();
}
