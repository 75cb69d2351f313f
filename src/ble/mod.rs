//! Bluetooth Low Energy transport.
//!
//! btleplug-backed implementation of the radio link boundary: adapter
//! setup, peripheral discovery, and the notification session.

pub mod scanner;
pub mod transport;
pub mod uuids;

pub use transport::BleLink;
