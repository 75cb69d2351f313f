//! Shared sensor state.
//!
//! Holds the most recent reading observed from the peripheral. The link
//! supervisor is the only writer; HTTP request handlers read concurrently.
//! All access goes through a lock with O(1) critical sections, so a reader
//! always sees a complete, self-consistent reading.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::protocol::SensorUpdate;

/// An immutable snapshot of the latest sensor readings.
///
/// Fields are `None` until the corresponding notification has been received
/// at least once, so clients can tell "never observed" apart from an
/// observed zero or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorReading {
    /// Latest measured distance in centimeters.
    pub distance_cm: Option<u32>,
    /// Whether the peripheral last reported a collision.
    pub crash_detected: Option<bool>,
    /// Time of the last successful update.
    pub last_updated: Option<DateTime<Utc>>,
}

impl SensorReading {
    /// Whether any notification has been received yet.
    pub fn has_data(&self) -> bool {
        self.distance_cm.is_some() || self.crash_detected.is_some()
    }
}

/// Concurrency-safe holder of the latest [`SensorReading`].
///
/// Created once at process start with all fields unknown, mutated in place
/// on every successfully decoded notification, and never destroyed until
/// process exit.
#[derive(Debug, Default)]
pub struct SensorState {
    reading: RwLock<SensorReading>,
}

impl SensorState {
    /// Create a state holder with no readings yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a decoded update into the current reading.
    ///
    /// Only the field carried by the update changes; the other field keeps
    /// its prior value. The peripheral sends distance and crash readings as
    /// independent events, never as one combined record.
    pub fn apply(&self, update: SensorUpdate) {
        let mut reading = self.reading.write();
        match update {
            SensorUpdate::Distance(cm) => reading.distance_cm = Some(cm),
            SensorUpdate::Crash(flag) => reading.crash_detected = Some(flag),
        }
        reading.last_updated = Some(Utc::now());
    }

    /// Return a copy of the current reading.
    pub fn snapshot(&self) -> SensorReading {
        *self.reading.read()
    }
}
