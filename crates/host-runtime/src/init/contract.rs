//! # Initializer Contract
//!
//! The two interchangeable shapes a controller's bootstrap adapter may
//! take, and the result both resolve to.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use shared_bus::MessengerScopes;
use shared_types::Controller;

use crate::error::{ApiError, InitError};
use crate::init::request::InitRequest;

/// A callable aggregated into the host's flat API surface.
pub type ApiMethod = Arc<dyn Fn(Value) -> Result<Value, ApiError> + Send + Sync>;

/// Flat method-name → callable map contributed by one controller.
pub type ApiMap = BTreeMap<String, ApiMethod>;

/// A function-shaped initializer.
pub type InitFn = Box<dyn Fn(InitRequest) -> Result<InitResult, InitError> + Send + Sync>;

/// Where a controller's state lands in an aggregate map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateKey {
    /// Register under the controller's own name (the hook-omitted
    /// default).
    OwnName,
    /// Produce no entry at all; the subsystem opts out of this map.
    Skip,
    /// Register under an explicit key; supports legacy on-disk renames
    /// where the exposed name differs from the historical storage key.
    Custom(String),
}

impl StateKey {
    /// Resolve against the controller's `name`; `None` means suppressed.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<String> {
        match self {
            Self::OwnName => Some(name.to_string()),
            Self::Skip => None,
            Self::Custom(key) => Some(key.clone()),
        }
    }
}

/// Everything one initializer hands back to the orchestrator.
pub struct InitResult {
    /// The constructed controller.
    pub controller: Arc<dyn Controller>,
    /// Methods contributed to the flat API surface.
    pub api: ApiMap,
    /// Key for the persisted-state aggregate.
    pub persisted_state_key: StateKey,
    /// Key for the memory-state aggregate.
    pub mem_state_key: StateKey,
}

impl InitResult {
    /// Result with defaulted hooks: no API, both state keys under the
    /// controller's own name.
    #[must_use]
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self {
            controller,
            api: ApiMap::new(),
            persisted_state_key: StateKey::OwnName,
            mem_state_key: StateKey::OwnName,
        }
    }

    /// Attach API methods.
    #[must_use]
    pub fn with_api(mut self, api: ApiMap) -> Self {
        self.api = api;
        self
    }

    /// Override the persisted-state key.
    #[must_use]
    pub fn persisted_under(mut self, key: StateKey) -> Self {
        self.persisted_state_key = key;
        self
    }

    /// Override the memory-state key.
    #[must_use]
    pub fn mem_under(mut self, key: StateKey) -> Self {
        self.mem_state_key = key;
        self
    }
}

/// The object-shaped initializer: required construction plus optional
/// hooks with the contract's defaults.
pub trait ControllerInit: Send + Sync {
    /// Construct the controller from the orchestration inputs.
    ///
    /// # Errors
    ///
    /// Any error here is a hard bootstrap failure.
    fn init(&self, request: InitRequest) -> Result<Arc<dyn Controller>, InitError>;

    /// Methods contributed to the flat API surface. Default: none.
    fn api(&self, _controller: &Arc<dyn Controller>) -> ApiMap {
        ApiMap::new()
    }

    /// Key for the persisted-state aggregate. Default: the controller's
    /// own name.
    fn persisted_state_key(&self, _controller: &Arc<dyn Controller>) -> StateKey {
        StateKey::OwnName
    }

    /// Key for the memory-state aggregate. Default: the controller's own
    /// name.
    fn mem_state_key(&self, _controller: &Arc<dyn Controller>) -> StateKey {
        StateKey::OwnName
    }

    /// Allow-lists for the two bus views built for this entry. Default:
    /// empty scopes, so the views reach nothing beyond their own
    /// namespace.
    fn messenger_scopes(&self) -> MessengerScopes {
        MessengerScopes::default()
    }
}

/// A controller's bootstrap adapter: either a plain function or a
/// stateful object. The shape is fixed when the entry is declared, not
/// probed at run time.
pub enum Initializer {
    /// `(request) -> InitResult`.
    Function(InitFn),
    /// [`ControllerInit`] implementation.
    Object(Box<dyn ControllerInit>),
}

impl Initializer {
    /// Wrap a function-shaped initializer.
    #[must_use]
    pub fn function<F>(init: F) -> Self
    where
        F: Fn(InitRequest) -> Result<InitResult, InitError> + Send + Sync + 'static,
    {
        Self::Function(Box::new(init))
    }

    /// Wrap an object-shaped initializer.
    #[must_use]
    pub fn object<O: ControllerInit + 'static>(init: O) -> Self {
        Self::Object(Box::new(init))
    }

    /// The scopes this entry's bus views are built from.
    #[must_use]
    pub fn messenger_scopes(&self) -> MessengerScopes {
        match self {
            Self::Function(_) => MessengerScopes::default(),
            Self::Object(init) => init.messenger_scopes(),
        }
    }

    /// Invoke the initializer, folding the object shape's hooks into an
    /// [`InitResult`].
    ///
    /// # Errors
    ///
    /// Propagates the initializer's failure unchanged.
    pub fn run(&self, request: InitRequest) -> Result<InitResult, InitError> {
        match self {
            Self::Function(init) => init(request),
            Self::Object(init) => {
                let controller = init.init(request)?;
                let api = init.api(&controller);
                let persisted_state_key = init.persisted_state_key(&controller);
                let mem_state_key = init.mem_state_key(&controller);
                Ok(InitResult {
                    controller,
                    api,
                    persisted_state_key,
                    mem_state_key,
                })
            }
        }
    }
}

/// Typed view of a registered controller.
#[must_use]
pub fn downcast_controller<T: Controller>(controller: &Arc<dyn Controller>) -> Option<Arc<T>> {
    Arc::clone(controller).as_any_arc().downcast::<T>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_key_resolution() {
        assert_eq!(
            StateKey::OwnName.resolve("BridgeController"),
            Some("BridgeController".to_string())
        );
        assert_eq!(StateKey::Skip.resolve("BridgeController"), None);
        assert_eq!(
            StateKey::Custom("AnalyticsController".to_string()).resolve("MetricsController"),
            Some("AnalyticsController".to_string())
        );
    }
}
