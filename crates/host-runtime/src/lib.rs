//! # Controller Host Runtime
//!
//! Boots the host's domain controllers inside one process. Controllers
//! are independently authored; nothing here gives one a direct reference
//! to another. All interaction goes through capability-scoped views of
//! the shared bus, built per entry at bootstrap time.
//!
//! ## Modular Structure
//!
//! - `init/` - initializer contract, per-entry request, orchestrator
//! - `adapters/` - per-controller initializer adapters
//! - `messengers/` - per-controller bus-view scope declarations
//! - `controller_list` - the default ordered boot list
//! - `config` - host configuration with environment overrides
//!
//! ## Bootstrap Flow
//!
//! ```text
//! HostConfig ──► Environment ─────────────┐
//!                                         ▼
//! default_entries() ──► init_controllers(InitInput)
//!                            │ strictly sequential, caller order
//!                            │ per entry: scoped views + lazy lookup
//!                            ▼
//!              ┌─────────────┴───────────────┐
//!              │          InitOutput         │
//!              │  controllers_by_name        │──► request routing
//!              │  controller_api             │──► durable storage
//!              │  controller_persisted_state │──► live UI projection
//!              │  controller_mem_state       │
//!              └─────────────────────────────┘
//! ```
//!
//! The bootstrap is one-shot: there is no supervision, retry, or
//! teardown at this layer. Controllers may spawn their own background
//! work during construction; the orchestrator neither awaits nor tracks
//! it.

pub mod adapters;
pub mod config;
pub mod controller_list;
pub mod error;
pub mod init;
pub mod messengers;

pub use config::{ConfigError, HostConfig};
pub use controller_list::default_entries;
pub use error::{ApiError, InitError};
pub use init::{
    init_controllers, ControllerInit, Environment, InitInput, InitOptions, InitOutput, InitRequest,
    InitResult, Initializer, PlatformHooks, StateKey,
};
