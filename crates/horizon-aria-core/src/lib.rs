//! Core systems for Horizon ARIA.
//!
//! This crate provides the reactive foundation the accessibility behaviors in
//! `horizon-aria` are built on:
//!
//! - **Property System**: Writable reactive cells and cached bindings with
//!   automatic dependency tracking
//! - **Effects**: Side effects that re-run when what they read changes
//! - **Runtime**: Per-thread, glitch-free propagation with batching
//! - **Event Dispatch**: Synchronous, ordered publish/subscribe channels
//!
//! # Property Example
//!
//! ```
//! use horizon_aria_core::{Binding, Effect, Property};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! let items = Property::new(vec!["a", "b", "c"]);
//! let count = {
//!     let items = items.clone();
//!     Binding::new(move || items.with(|items| items.len()))
//! };
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let _effect = {
//!     let (count, log) = (count.clone(), log.clone());
//!     Effect::new(move || log.lock().push(count.get()))
//! };
//!
//! items.set(vec!["a", "b"]);
//! assert_eq!(*log.lock(), vec![3, 2]);
//! ```
//!
//! # Event Example
//!
//! ```
//! use horizon_aria_core::{EventDispatcher, Property};
//!
//! let presses = Property::new(0);
//! let clicks = EventDispatcher::<()>::new();
//! let listener = {
//!     let presses = presses.clone();
//!     clicks.listen(move |_| {
//!         presses.update(|n| n + 1);
//!     })
//! };
//!
//! clicks.dispatch(&mut ());
//! listener.unlisten();
//! clicks.dispatch(&mut ());
//! assert_eq!(presses.get(), 1);
//! ```

pub mod dispatcher;
pub mod effect;
mod error;
pub mod logging;
pub mod property;
mod runtime;
pub mod thread_check;

pub use dispatcher::{EventDispatcher, Listener, ListenerId};
pub use effect::Effect;
pub use error::{ReactiveError, Result};
pub use property::{Binding, IntoProperty, Property};
pub use runtime::{
    batch, current_revision, flush, node_count, untracked, NodeId, MAX_EFFECT_RUNS,
};
