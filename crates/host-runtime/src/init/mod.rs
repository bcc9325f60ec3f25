//! # Controller Initialization
//!
//! The bootstrap core: the initializer contract, the per-entry request,
//! and the orchestrator that drives sequential construction.
//!
//! ## Flow
//!
//! ```text
//! caller ──► init_controllers(InitInput)
//!               │  for each (name, initializer), in caller order:
//!               │
//!               ├─ resolve MessengerScopes (Object hook, or empty)
//!               ├─ build runtime + init RestrictedMessenger views
//!               ├─ synthesize InitRequest (getter over the live registry)
//!               ├─ invoke the Function / Object variant
//!               ├─ key = controller.name()
//!               └─ merge controller, state keys, api into the registry
//!               ▼
//!            InitOutput { controllers_by_name, controller_api,
//!                         controller_persisted_state, controller_mem_state }
//! ```
//!
//! Any error aborts the whole bootstrap: controllers may have
//! undeclared cross-dependencies, so a partial startup is unsafe.

pub mod contract;
pub mod orchestrator;
pub mod request;

pub use contract::{
    downcast_controller, ApiMap, ApiMethod, ControllerInit, InitFn, InitResult, Initializer,
    StateKey,
};
pub use orchestrator::{init_controllers, InitInput, InitOptions, InitOutput};
pub use request::{
    ChainIdAccessor, ControllerGetter, Environment, FlatStateAccessor, InitRequest,
    MetricsRequestFactory, PermittedAccountsAccessor, PlatformHooks,
};
