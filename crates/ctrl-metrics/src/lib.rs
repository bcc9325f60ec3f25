//! # Metrics Controller
//!
//! Collects usage events submitted over the bus. Submission is a
//! fire-and-forget action; nothing in the host blocks on delivery.
//!
//! The controller is named `MetricsController` but persists under the
//! legacy storage key [`LEGACY_STATE_KEY`]: the store predates the
//! controller's rename and existing installations keep their on-disk key.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use shared_bus::{BusError, RestrictedMessenger};
use shared_types::{Controller, MetricsRequest};

/// On-disk key the metrics store has always persisted under.
pub const LEGACY_STATE_KEY: &str = "AnalyticsController";

/// Action names registered by this controller.
pub mod actions {
    /// Submits a [`MetricsRequest`](shared_types::MetricsRequest).
    pub const TRACK_EVENT: &str = "MetricsController:trackEvent";
}

/// Persisted metrics state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsState {
    /// Whether the user opted into metrics collection.
    pub participate: Option<bool>,
    /// Events accepted since the store was created.
    pub events_tracked: u64,
}

/// The metrics collector.
pub struct MetricsController {
    participate: RwLock<Option<bool>>,
    events_tracked: AtomicU64,
    last_event: RwLock<Option<MetricsRequest>>,
    messenger: RestrictedMessenger,
}

impl MetricsController {
    /// Construct the controller from its persisted state and register its
    /// bus actions.
    ///
    /// # Errors
    ///
    /// Fails if an action name is already taken on the bus.
    pub fn new(
        messenger: RestrictedMessenger,
        persisted: MetricsState,
    ) -> Result<Arc<Self>, BusError> {
        let controller = Arc::new(Self {
            participate: RwLock::new(persisted.participate),
            events_tracked: AtomicU64::new(persisted.events_tracked),
            last_event: RwLock::new(None),
            messenger,
        });

        let for_track = Arc::clone(&controller);
        controller.messenger.register_action_handler(
            actions::TRACK_EVENT,
            Arc::new(move |payload| {
                let request: MetricsRequest = serde_json::from_value(payload)
                    .map_err(|err| BusError::invalid_payload(actions::TRACK_EVENT, err.to_string()))?;
                for_track.track(request);
                Ok(Value::Null)
            }),
        )?;

        Ok(controller)
    }

    /// Record one event.
    pub fn track(&self, request: MetricsRequest) {
        if *self.participate.read() == Some(false) {
            debug!(event = %request.event, "Metrics event dropped, user opted out");
            return;
        }
        debug!(event = %request.event, id = %request.id, "Metrics event tracked");
        self.events_tracked.fetch_add(1, Ordering::Relaxed);
        *self.last_event.write() = Some(request);
    }

    /// Set the user's participation choice.
    pub fn set_participate(&self, participate: bool) {
        *self.participate.write() = Some(participate);
    }

    /// Events accepted so far.
    #[must_use]
    pub fn events_tracked(&self) -> u64 {
        self.events_tracked.load(Ordering::Relaxed)
    }

    /// The most recently accepted event, if any.
    #[must_use]
    pub fn last_event(&self) -> Option<MetricsRequest> {
        self.last_event.read().clone()
    }
}

impl Controller for MetricsController {
    fn name(&self) -> &'static str {
        "MetricsController"
    }

    fn state(&self) -> Value {
        let snapshot = MetricsState {
            participate: *self.participate.read(),
            events_tracked: self.events_tracked(),
        };
        serde_json::to_value(snapshot).unwrap_or(Value::Null)
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{Messenger, ScopeSpec};

    fn build() -> (Arc<Messenger>, Arc<MetricsController>) {
        let bus = Arc::new(Messenger::new());
        let messenger = bus.restricted("MetricsController", ScopeSpec::default());
        let controller =
            MetricsController::new(messenger, MetricsState::default()).expect("construct");
        (bus, controller)
    }

    #[test]
    fn track_event_action_accepts_requests() {
        let (bus, controller) = build();
        let request = MetricsRequest::new("Bridge Enabled");
        let payload = serde_json::to_value(&request).expect("serialize");

        bus.call(actions::TRACK_EVENT, payload).expect("call");

        assert_eq!(controller.events_tracked(), 1);
        assert_eq!(
            controller.last_event().map(|event| event.event),
            Some("Bridge Enabled".to_string())
        );
    }

    #[test]
    fn opted_out_user_drops_events() {
        let (_bus, controller) = build();
        controller.set_participate(false);
        controller.track(MetricsRequest::new("Ignored"));
        assert_eq!(controller.events_tracked(), 0);
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let (bus, _controller) = build();
        let err = bus
            .call(actions::TRACK_EVENT, Value::String("nope".to_string()))
            .unwrap_err();
        assert!(matches!(err, BusError::InvalidPayload { .. }));
    }

    #[test]
    fn state_restores_from_persisted_counts() {
        let bus = Arc::new(Messenger::new());
        let messenger = bus.restricted("MetricsController", ScopeSpec::default());
        let controller = MetricsController::new(
            messenger,
            MetricsState {
                participate: Some(true),
                events_tracked: 7,
            },
        )
        .expect("construct");

        assert_eq!(controller.events_tracked(), 7);
        let state: MetricsState =
            serde_json::from_value(Controller::state(&*controller)).expect("snapshot");
        assert_eq!(state.participate, Some(true));
    }
}
