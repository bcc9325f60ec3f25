//! # Initialization Request
//!
//! The read-mostly view handed to every initializer: the two scoped bus
//! views, the lazy typed controller lookup, the persisted-state blob,
//! and the shared environment accessors.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use ctrl_vault::{KeyringBuilder, LockSessionHook, StateEncryptor};
use shared_bus::RestrictedMessenger;
use shared_types::{Address, ChainId, Controller, MetricsRequest};

use crate::error::InitError;
use crate::init::contract::downcast_controller;

/// Returns the global chain id the host is currently pointed at.
pub type ChainIdAccessor = Arc<dyn Fn() -> ChainId + Send + Sync>;

/// Returns the accounts an origin is permitted to see.
pub type PermittedAccountsAccessor = Arc<dyn Fn(&str) -> Vec<Address> + Send + Sync>;

/// Returns the flattened UI state (the merged state of every controller
/// the front end sees).
pub type FlatStateAccessor = Arc<dyn Fn() -> Value + Send + Sync>;

/// Builds a metrics submission for an event name.
pub type MetricsRequestFactory = Arc<dyn Fn(&str) -> MetricsRequest + Send + Sync>;

/// Optional platform integration points, consumed by the adapters that
/// need them and ignored by the rest.
#[derive(Clone, Default)]
pub struct PlatformHooks {
    /// Locale the UI starts in before the user picks one.
    pub initial_locale: Option<String>,
    /// Called after the vault locks so the host can tear down session UI.
    pub lock_session: Option<LockSessionHook>,
    /// Encrypts the persisted vault snapshot.
    pub encryptor: Option<Arc<dyn StateEncryptor>>,
    /// Keyring kinds beyond the built-in set.
    pub keyring_builders: Vec<KeyringBuilder>,
}

/// Shared environment accessors, identical for every entry.
#[derive(Clone)]
pub struct Environment {
    /// Global chain id accessor.
    pub get_global_chain_id: ChainIdAccessor,
    /// Permitted-accounts query.
    pub get_permitted_accounts: PermittedAccountsAccessor,
    /// Flattened UI-state accessor.
    pub get_flat_state: FlatStateAccessor,
    /// Metrics-request factory.
    pub new_metrics_request: MetricsRequestFactory,
    /// Platform hooks.
    pub hooks: PlatformHooks,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            get_global_chain_id: Arc::new(ChainId::default),
            get_permitted_accounts: Arc::new(|_origin| Vec::new()),
            get_flat_state: Arc::new(|| Value::Null),
            new_metrics_request: Arc::new(|event| MetricsRequest::new(event)),
            hooks: PlatformHooks::default(),
        }
    }
}

/// Lazy lookup over the registry as it exists at call time.
///
/// Bootstrap is strictly sequential, so during an entry's construction
/// only previously initialized controllers are present. Requesting a
/// later entry is an ordering bug and fails hard.
#[derive(Clone)]
pub struct ControllerGetter {
    controllers: Arc<RwLock<BTreeMap<String, Arc<dyn Controller>>>>,
}

impl ControllerGetter {
    pub(crate) fn new(controllers: Arc<RwLock<BTreeMap<String, Arc<dyn Controller>>>>) -> Self {
        Self { controllers }
    }

    /// Dynamic handle to a registered controller.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::RequestedBeforeInit`] when `name` has not
    /// been initialized yet.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Controller>, InitError> {
        self.controllers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| InitError::RequestedBeforeInit(name.to_string()))
    }

    /// Typed handle to a registered controller.
    ///
    /// # Errors
    ///
    /// As [`ControllerGetter::get`], plus
    /// [`InitError::ControllerTypeMismatch`] when the registered
    /// controller is not a `T`.
    pub fn get_as<T: Controller>(&self, name: &str) -> Result<Arc<T>, InitError> {
        let controller = self.get(name)?;
        downcast_controller(&controller)
            .ok_or_else(|| InitError::ControllerTypeMismatch(name.to_string()))
    }
}

/// The per-entry orchestration input.
pub struct InitRequest {
    /// Run-time bus view, handed to the controller itself.
    pub controller_messenger: RestrictedMessenger,
    /// Bootstrap-only bus view, used by the adapter's wiring.
    pub init_messenger: RestrictedMessenger,
    /// Lazy lookup of previously initialized controllers.
    pub get_controller: ControllerGetter,
    /// Persisted-state blob, keyed by each controller's resolved storage
    /// key.
    pub persisted_state: Arc<BTreeMap<String, Value>>,
    /// Shared environment accessors.
    pub environment: Environment,
}

impl InitRequest {
    /// This entry's persisted state under `key`, if any was loaded.
    #[must_use]
    pub fn persisted_for(&self, key: &str) -> Option<&Value> {
        self.persisted_state.get(key)
    }
}
