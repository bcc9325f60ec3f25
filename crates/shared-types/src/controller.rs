//! # Controller Trait
//!
//! The object-safe contract every subsystem exposes toward the host
//! runtime. The runtime stores controllers as `Arc<dyn Controller>` in its
//! registry and never calls anything domain-specific through this trait;
//! typed access goes through the downcast hook.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;

/// An independently constructed unit of domain logic with its own state.
pub trait Controller: Send + Sync + 'static {
    /// Globally unique controller name, e.g. `PreferencesController`.
    ///
    /// The runtime uses this as the aggregation key for the registry and
    /// as the default key for persisted and memory state.
    fn name(&self) -> &'static str;

    /// Snapshot of the controller's full state as a JSON value.
    ///
    /// Consumed by the external durable-storage and live-state layers;
    /// controllers with no exposable state return `Value::Null`.
    fn state(&self) -> Value;

    /// Upcast to `Any` for typed retrieval out of the registry.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
