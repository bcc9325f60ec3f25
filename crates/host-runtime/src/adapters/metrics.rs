//! Metrics controller initializer.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use ctrl_metrics::{MetricsController, MetricsState, LEGACY_STATE_KEY};
use shared_bus::MessengerScopes;
use shared_types::Controller;

use crate::error::{ApiError, InitError};
use crate::init::{downcast_controller, ApiMap, ApiMethod, ControllerInit, InitRequest, StateKey};
use crate::messengers::METRICS_SCOPES;

/// Bootstrap adapter for [`MetricsController`].
///
/// Reads and persists under [`LEGACY_STATE_KEY`]: the store kept its
/// historical on-disk key when the controller was renamed.
pub struct MetricsControllerInit;

impl ControllerInit for MetricsControllerInit {
    fn init(&self, request: InitRequest) -> Result<Arc<dyn Controller>, InitError> {
        let persisted = match request.persisted_for(LEGACY_STATE_KEY) {
            Some(blob) => serde_json::from_value(blob.clone()).unwrap_or_else(|err| {
                warn!(error = %err, "Persisted metrics state unreadable, using defaults");
                MetricsState::default()
            }),
            None => MetricsState::default(),
        };

        let controller = MetricsController::new(request.controller_messenger, persisted)?;
        Ok(controller)
    }

    fn api(&self, controller: &Arc<dyn Controller>) -> ApiMap {
        let mut api = ApiMap::new();
        let Some(metrics) = downcast_controller::<MetricsController>(controller) else {
            return api;
        };

        api.insert(
            "setParticipateInMetrics".to_string(),
            Arc::new(move |params: Value| {
                let participate = params
                    .as_bool()
                    .ok_or_else(|| ApiError::InvalidParams("expected boolean".to_string()))?;
                metrics.set_participate(participate);
                Ok(Value::Null)
            }) as ApiMethod,
        );

        api
    }

    fn persisted_state_key(&self, _controller: &Arc<dyn Controller>) -> StateKey {
        StateKey::Custom(LEGACY_STATE_KEY.to_string())
    }

    fn messenger_scopes(&self) -> MessengerScopes {
        METRICS_SCOPES
    }
}
