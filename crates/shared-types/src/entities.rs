//! # Domain Entities
//!
//! Serde-backed value types shared across controllers.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Hex-encoded chain identifier (e.g. `0x1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub String);

impl ChainId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self("0x1".to_string())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Hex-encoded account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// User preference store state.
///
/// Published in full on every `PreferencesController:stateChange` event;
/// consumers diff the sub-fields they care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesState {
    /// BCP 47 locale code for the UI.
    pub locale: String,
    /// Whether transactions may be routed through the smart routing
    /// service.
    pub smart_routing_enabled: bool,
    /// Whether outbound calls to third-party services are permitted.
    pub use_external_services: bool,
}

impl Default for PreferencesState {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            smart_routing_enabled: false,
            use_external_services: true,
        }
    }
}

/// A single metrics submission produced by the host's request factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRequest {
    /// Unique id of this submission.
    pub id: Uuid,
    /// Event name, e.g. `Bridge Enabled`.
    pub event: String,
    /// Free-form event properties.
    pub properties: Value,
    /// Unix timestamp (seconds) at which the request was created.
    pub created_at: u64,
}

impl MetricsRequest {
    /// Create a request for `event` with empty properties.
    #[must_use]
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: event.into(),
            properties: Value::Null,
            created_at: unix_now(),
        }
    }

    /// Attach properties to the request.
    #[must_use]
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_default_is_mainnet() {
        assert_eq!(ChainId::default().as_str(), "0x1");
    }

    #[test]
    fn preferences_default_disables_smart_routing() {
        let prefs = PreferencesState::default();
        assert!(!prefs.smart_routing_enabled);
        assert!(prefs.use_external_services);
    }

    #[test]
    fn metrics_request_round_trips() {
        let request = MetricsRequest::new("Unit Test")
            .with_properties(serde_json::json!({ "ok": true }));
        let value = serde_json::to_value(&request).expect("serialize");
        let back: MetricsRequest = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back.event, "Unit Test");
        assert_eq!(back.id, request.id);
    }
}
