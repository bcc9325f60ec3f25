//! # Bootstrap Orchestrator
//!
//! Drives sequential controller construction in the caller-declared
//! order and folds each entry's output into the four process-wide
//! aggregates.
//!
//! The orchestrator does **not** infer or validate a dependency graph;
//! ordering correctness is the caller's responsibility, enforced only
//! lazily by [`ControllerGetter`](crate::init::request::ControllerGetter)
//! failing on forward references. Nothing is caught here: the first
//! error aborts the whole bootstrap.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use shared_bus::Messenger;
use shared_types::Controller;

use crate::error::InitError;
use crate::init::contract::{ApiMethod, Initializer};
use crate::init::request::{ControllerGetter, Environment, InitRequest};

/// Bootstrap-wide options.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitOptions {
    /// Treat duplicate state/API keys as fatal instead of
    /// last-writer-wins.
    pub strict_keys: bool,
}

/// Everything the caller supplies to one bootstrap run.
pub struct InitInput {
    /// The shared bus all restricted views are built from.
    pub base_messenger: Arc<Messenger>,
    /// Ordered name → initializer entries.
    pub initializers: Vec<(&'static str, Initializer)>,
    /// Persisted-state blob, keyed by resolved storage key.
    pub persisted_state: BTreeMap<String, Value>,
    /// Shared environment accessors.
    pub environment: Environment,
    /// Bootstrap-wide options.
    pub options: InitOptions,
}

/// The four aggregates one bootstrap run produces.
pub struct InitOutput {
    /// Every constructed controller, keyed by its own name.
    pub controllers_by_name: BTreeMap<String, Arc<dyn Controller>>,
    /// Flat callable surface for the external request-routing layer.
    pub controller_api: BTreeMap<String, ApiMethod>,
    /// Controllers exposed to the external durable-storage layer, keyed
    /// by resolved persisted-state key.
    pub controller_persisted_state: BTreeMap<String, Arc<dyn Controller>>,
    /// Controllers exposed to the external live-state projection, keyed
    /// by resolved memory-state key.
    pub controller_mem_state: BTreeMap<String, Arc<dyn Controller>>,
}

impl std::fmt::Debug for InitOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitOutput")
            .field(
                "controllers_by_name",
                &self.controllers_by_name.keys().collect::<Vec<_>>(),
            )
            .field(
                "controller_api",
                &self.controller_api.keys().collect::<Vec<_>>(),
            )
            .field(
                "controller_persisted_state",
                &self.controller_persisted_state.keys().collect::<Vec<_>>(),
            )
            .field(
                "controller_mem_state",
                &self.controller_mem_state.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Construct every controller in the declared order and aggregate the
/// results.
///
/// # Errors
///
/// The first failing entry aborts the bootstrap: initializer failures,
/// bus failures (including calls to actions nothing handles), duplicate
/// controller names, and, under [`InitOptions::strict_keys`], duplicate
/// aggregate keys.
pub fn init_controllers(input: InitInput) -> Result<InitOutput, InitError> {
    let InitInput {
        base_messenger,
        initializers,
        persisted_state,
        environment,
        options,
    } = input;

    let persisted_state = Arc::new(persisted_state);
    let controllers: Arc<RwLock<BTreeMap<String, Arc<dyn Controller>>>> =
        Arc::new(RwLock::new(BTreeMap::new()));

    let mut controller_persisted_state = BTreeMap::new();
    let mut controller_mem_state = BTreeMap::new();
    let mut controller_api: BTreeMap<String, ApiMethod> = BTreeMap::new();

    info!(count = initializers.len(), "Initializing controllers");

    for (entry_name, initializer) in initializers {
        let scopes = initializer.messenger_scopes();
        let request = InitRequest {
            controller_messenger: base_messenger.restricted(entry_name, scopes.runtime),
            init_messenger: base_messenger.restricted(entry_name, scopes.init),
            get_controller: ControllerGetter::new(Arc::clone(&controllers)),
            persisted_state: Arc::clone(&persisted_state),
            environment: environment.clone(),
        };

        let result = initializer.run(request)?;
        let name = result.controller.name().to_string();
        info!(controller = %name, "Controller initialized");

        {
            let mut registered = controllers.write();
            if registered.contains_key(&name) {
                return Err(InitError::DuplicateControllerName(name));
            }
            registered.insert(name.clone(), Arc::clone(&result.controller));
        }

        merge_state_entry(
            &mut controller_persisted_state,
            "persisted state",
            result.persisted_state_key.resolve(&name),
            &result.controller,
            options.strict_keys,
        )?;
        merge_state_entry(
            &mut controller_mem_state,
            "memory state",
            result.mem_state_key.resolve(&name),
            &result.controller,
            options.strict_keys,
        )?;

        for (method, callable) in result.api {
            if controller_api.contains_key(&method) {
                if options.strict_keys {
                    return Err(InitError::DuplicateKey {
                        map: "api",
                        key: method,
                    });
                }
                debug!(method = %method, "API method overwritten by a later controller");
            }
            controller_api.insert(method, callable);
        }
    }

    let controllers_by_name = controllers.read().clone();
    info!(
        controllers = controllers_by_name.len(),
        api_methods = controller_api.len(),
        persisted = controller_persisted_state.len(),
        mem = controller_mem_state.len(),
        "Controller bootstrap complete"
    );

    Ok(InitOutput {
        controllers_by_name,
        controller_api,
        controller_persisted_state,
        controller_mem_state,
    })
}

fn merge_state_entry(
    map: &mut BTreeMap<String, Arc<dyn Controller>>,
    map_label: &'static str,
    key: Option<String>,
    controller: &Arc<dyn Controller>,
    strict: bool,
) -> Result<(), InitError> {
    let Some(key) = key else {
        debug!(
            controller = controller.name(),
            map = map_label,
            "State entry suppressed"
        );
        return Ok(());
    };

    if map.contains_key(&key) {
        if strict {
            return Err(InitError::DuplicateKey {
                map: map_label,
                key,
            });
        }
        debug!(key = %key, map = map_label, "State key overwritten by a later controller");
    }
    map.insert(key, Arc::clone(controller));
    Ok(())
}
