//! # Messenger Scope Declarations
//!
//! One module per controller, each declaring the two allow-lists its
//! adapter hands to the orchestrator: the runtime scope (the view the
//! controller itself keeps) and the init scope (the view used only by
//! bootstrap wiring). Scopes are static: privileges are fixed when the
//! views are built.
//!
//! Controllers that never reach beyond their own namespace declare empty
//! scopes; the own-namespace grant is implicit.

pub mod bridge;
pub mod metrics;
pub mod preferences;
pub mod vault;

pub use bridge::BRIDGE_SCOPES;
pub use metrics::METRICS_SCOPES;
pub use preferences::PREFERENCES_SCOPES;
pub use vault::VAULT_SCOPES;
