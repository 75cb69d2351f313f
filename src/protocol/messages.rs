//! Notification payload parsing.
//!
//! The micro:bit firmware sends each reading as a short line of text, keyed
//! by a prefix before a `:` delimiter:
//!
//! - `DIST:<n>` — measured distance in centimeters
//! - `CRASH:<flag>` — collision flag, `1` for a detected crash
//!
//! The peripheral is a hand-flashed microcontroller, not a versioned API,
//! so anything that does not match one of these shapes is rejected and left
//! to the caller to log and discard.

use thiserror::Error;

/// Failure to decode a notification payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload was empty (or whitespace only).
    #[error("empty payload")]
    Empty,

    /// The payload was not valid UTF-8 text.
    #[error("payload is not valid UTF-8")]
    NotUtf8,

    /// The payload did not start with a known message prefix.
    #[error("unrecognized message: {0:?}")]
    UnknownPrefix(String),

    /// The value after `DIST:` was not a non-negative integer.
    #[error("invalid distance value: {0:?}")]
    InvalidDistance(String),
}

/// A single decoded sensor update.
///
/// Distance and crash readings arrive as independent, asynchronously-timed
/// events; an update never carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorUpdate {
    /// Measured distance in centimeters.
    Distance(u32),
    /// Whether a collision was detected.
    Crash(bool),
}

impl SensorUpdate {
    /// Decode a raw notification payload.
    ///
    /// Pure function: no side effects, same input always yields the same
    /// output. Surrounding whitespace (the firmware terminates lines with
    /// `\n`) is ignored.
    pub fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| DecodeError::NotUtf8)?
            .trim();

        if text.is_empty() {
            return Err(DecodeError::Empty);
        }

        if let Some(value) = text.strip_prefix("DIST:") {
            let cm = value
                .parse::<u32>()
                .map_err(|_| DecodeError::InvalidDistance(value.to_string()))?;
            Ok(Self::Distance(cm))
        } else if let Some(flag) = text.strip_prefix("CRASH:") {
            // The firmware sends "1" for a crash; treat anything else as no
            // crash rather than rejecting the message.
            Ok(Self::Crash(flag == "1"))
        } else {
            Err(DecodeError::UnknownPrefix(text.to_string()))
        }
    }
}
