//! # Shared Bus - Capability-Scoped Controller Messenger
//!
//! In-process publish/subscribe and request/response channel that lets
//! controllers interact without holding direct references to each other.
//!
//! ## Architecture Rules
//!
//! - All inter-controller communication goes through the bus; direct
//!   calls between controllers are forbidden.
//! - Every controller talks through a [`RestrictedMessenger`]: a narrowed
//!   view of the shared [`Messenger`] carrying a static allow-list of the
//!   action and event names it may reach, plus an implicit grant for its
//!   own namespace.
//!
//! ## Dispatch Model
//!
//! Dispatch is synchronous call-through, not queued:
//!
//! ```text
//! ┌──────────────┐                      ┌──────────────┐
//! │ Controller A │                      │ Controller B │
//! │              │  publish()/call()    │              │
//! │              │ ──────┐              │              │
//! └──────────────┘       │              └──────────────┘
//!                        ▼                      ↑
//!                  ┌──────────────┐            │ runs inline,
//!                  │  Messenger   │ ───────────┘ on A's stack
//!                  └──────────────┘  subscribe()/handler
//! ```
//!
//! A subscriber registered by an earlier-constructed controller runs
//! nested inside the publisher's call stack. Handlers are cloned out of
//! the registry before invocation, so nested publish/call from inside a
//! handler is safe.

pub mod error;
pub mod events;
pub mod messenger;
pub mod restricted;

// Re-export main types
pub use error::BusError;
pub use events::{topics, ControllerEvent};
pub use messenger::{ActionHandler, EventHandler, Messenger};
pub use restricted::{MessengerScopes, RestrictedMessenger, ScopeSpec};
