//! Sensor notification protocol.
//!
//! The peripheral emits line-oriented text messages over its notification
//! channel, one reading per notification.

pub mod messages;

pub use messages::{DecodeError, SensorUpdate};
