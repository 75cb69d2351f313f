//! HTTP query service.
//!
//! Serves the latest sensor snapshot to local clients. Handlers only ever
//! copy the current reading out of [`SensorState`]; they never wait on the
//! radio link, so responses are immediate even while the peripheral is
//! disconnected.

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::state::{SensorReading, SensorState};

/// JSON body served by `GET /data`.
///
/// `null` fields mean no reading of that kind has been received yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorResponse {
    /// Latest distance in centimeters.
    pub distance: Option<u32>,
    /// Latest crash flag.
    pub crash: Option<bool>,
    /// Time of the last successful update.
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<SensorReading> for SensorResponse {
    fn from(reading: SensorReading) -> Self {
        Self {
            distance: reading.distance_cm,
            crash: reading.crash_detected,
            last_updated: reading.last_updated,
        }
    }
}

/// Build the bridge's HTTP router.
pub fn router(state: Arc<SensorState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/data", get(data))
        .with_state(state)
}

/// `GET /` - human-readable view of the current snapshot.
async fn index(State(state): State<Arc<SensorState>>) -> Html<String> {
    let reading = state.snapshot();

    let distance = reading
        .distance_cm
        .map(|cm| format!("{cm} cm"))
        .unwrap_or_else(|| "N/A".to_string());
    let crash = match reading.crash_detected {
        Some(true) => "yes",
        Some(false) => "no",
        None => "N/A",
    };
    let updated = reading
        .last_updated
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    Html(format!(
        "<html>\n\
         <head><title>micro:bit Sensor Data</title></head>\n\
         <body>\n\
         <h1>micro:bit Sensor Data</h1>\n\
         <p>Distance: <strong>{distance}</strong></p>\n\
         <p>Crash: <strong>{crash}</strong></p>\n\
         <p>Last updated: {updated}</p>\n\
         <p><a href='/data'>JSON data</a></p>\n\
         </body>\n\
         </html>"
    ))
}

/// `GET /data` - the current snapshot as JSON.
async fn data(State(state): State<Arc<SensorState>>) -> Json<SensorResponse> {
    Json(state.snapshot().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SensorUpdate;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_data_returns_sentinels_before_first_notification() {
        let state = Arc::new(SensorState::new());

        let Json(body) = data(State(state)).await;
        assert_eq!(body.distance, None);
        assert_eq!(body.crash, None);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["distance"], serde_json::Value::Null);
        assert_eq!(json["crash"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_data_reflects_latest_reading() {
        let state = Arc::new(SensorState::new());
        state.apply(SensorUpdate::Distance(120));
        state.apply(SensorUpdate::Crash(true));

        let Json(body) = data(State(state)).await;
        assert_eq!(body.distance, Some(120));
        assert_eq!(body.crash, Some(true));
        assert!(body.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_index_shows_placeholders_before_first_notification() {
        let state = Arc::new(SensorState::new());

        let Html(page) = index(State(state)).await;
        assert!(page.contains("N/A"));
        assert!(page.contains("never"));
        assert!(page.contains("/data"));
    }

    #[tokio::test]
    async fn test_index_shows_current_reading() {
        let state = Arc::new(SensorState::new());
        state.apply(SensorUpdate::Distance(45));
        state.apply(SensorUpdate::Crash(false));

        let Html(page) = index(State(state)).await;
        assert!(page.contains("45 cm"));
        assert!(page.contains("no"));
    }

    #[test]
    fn test_json_field_names() {
        let response = SensorResponse {
            distance: Some(7),
            crash: Some(false),
            last_updated: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["distance"], 7);
        assert_eq!(json["crash"], false);
        assert!(json.get("last_updated").is_some());
    }
}
