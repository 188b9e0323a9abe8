//! Event dispatch for Horizon ARIA.
//!
//! An [`EventDispatcher<E>`] is a synchronous publish/subscribe channel.
//! Widgets own one dispatcher per raw event kind (key down, focus in, focus
//! out) and behaviors listen on them.
//!
//! # Key Types
//!
//! - [`EventDispatcher<E>`] - Cloneable channel that delivers `&mut E` to handlers
//! - [`Listener`] - Returned by [`EventDispatcher::listen`], removes its handler
//! - [`ListenerId`] - Slotmap key identifying a registered handler
//!
//! # Ordering
//!
//! Handlers run in registration order. [`dispatch`](EventDispatcher::dispatch)
//! takes a snapshot of the registered handlers before calling the first one,
//! so a handler that removes itself or another handler does not cause any
//! handler in the snapshot to be skipped. Handlers added during a dispatch
//! first see the next event.
//!
//! Each dispatch runs inside a reactive [`batch`](crate::batch): effects that
//! depend on state written by handlers run once, after the last handler.
//! Handlers run untracked, so dispatching from inside an effect does not make
//! the effect depend on what the handlers read.
//!
//! # Example
//!
//! ```
//! use horizon_aria_core::EventDispatcher;
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! let keys = EventDispatcher::<String>::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let listener = {
//!     let seen = seen.clone();
//!     keys.listen(move |key: &mut String| seen.lock().push(key.clone()))
//! };
//!
//! keys.dispatch(&mut "ArrowDown".to_string());
//! assert!(listener.unlisten());
//! assert!(!listener.unlisten());
//! keys.dispatch(&mut "ArrowUp".to_string());
//!
//! assert_eq!(*seen.lock(), vec!["ArrowDown".to_string()]);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;
use crate::runtime::{batch, untracked};

new_key_type! {
    /// Identifies a handler registered on an [`EventDispatcher`].
    pub struct ListenerId;
}

type Handler<E> = Arc<dyn Fn(&mut E) + Send + Sync>;

struct Registration<E> {
    handler: Handler<E>,
    /// Registration order. Slotmap iteration order is not insertion order
    /// once slots are reused.
    seq: u64,
}

struct DispatcherInner<E> {
    handlers: Mutex<SlotMap<ListenerId, Registration<E>>>,
    next_seq: AtomicU64,
}

/// Removes a handler by id. Implemented by dispatcher internals so that
/// [`Listener`] does not carry the event type.
trait Unlisten: Send + Sync {
    fn remove(&self, id: ListenerId) -> bool;
    fn contains(&self, id: ListenerId) -> bool;
}

impl<E: 'static> Unlisten for DispatcherInner<E> {
    fn remove(&self, id: ListenerId) -> bool {
        self.handlers.lock().remove(id).is_some()
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.handlers.lock().contains_key(id)
    }
}

/// A synchronous event channel.
///
/// Clones share the same handler table.
pub struct EventDispatcher<E> {
    inner: Arc<DispatcherInner<E>>,
}

impl<E: 'static> EventDispatcher<E> {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                handlers: Mutex::new(SlotMap::with_key()),
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Register a handler.
    ///
    /// The returned [`Listener`] removes the handler when
    /// [`unlisten`](Listener::unlisten) is called. Dropping the listener
    /// leaves the handler registered.
    pub fn listen<F>(&self, handler: F) -> Listener
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let id = self.inner.handlers.lock().insert(Registration {
            handler: Arc::new(handler),
            seq,
        });
        tracing::trace!(target: targets::DISPATCHER, ?id, "listener added");
        let weak = Arc::downgrade(&self.inner);
        let target: Weak<dyn Unlisten> = weak;
        Listener { target, id }
    }

    /// Deliver `event` to every registered handler in registration order.
    pub fn dispatch(&self, event: &mut E) {
        let snapshot: Vec<Handler<E>> = {
            let handlers = self.inner.handlers.lock();
            let mut ordered: Vec<&Registration<E>> = handlers.values().collect();
            ordered.sort_by_key(|r| r.seq);
            ordered.into_iter().map(|r| Arc::clone(&r.handler)).collect()
        };
        tracing::trace!(
            target: targets::DISPATCHER,
            handler_count = snapshot.len(),
            "dispatching event"
        );
        batch(|| {
            untracked(|| {
                for handler in &snapshot {
                    handler(&mut *event);
                }
            })
        });
    }

    /// Number of registered handlers.
    pub fn listener_count(&self) -> usize {
        self.inner.handlers.lock().len()
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.inner.handlers.lock().clear();
    }
}

impl<E: 'static> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.inner.handlers.lock().len())
            .finish()
    }
}

/// Handle to a registered handler.
///
/// Holds only a weak reference to the dispatcher, so an outstanding listener
/// does not keep a dispatcher alive.
#[derive(Clone)]
pub struct Listener {
    target: Weak<dyn Unlisten>,
    id: ListenerId,
}

impl Listener {
    /// The handler's id.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the handler. Returns `true` if it was still registered.
    pub fn unlisten(&self) -> bool {
        let removed = self
            .target
            .upgrade()
            .is_some_and(|target| target.remove(self.id));
        if removed {
            tracing::trace!(target: targets::DISPATCHER, id = ?self.id, "listener removed");
        }
        removed
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.target
            .upgrade()
            .is_some_and(|target| target.contains(self.id))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

static_assertions::assert_impl_all!(EventDispatcher<String>: Send, Sync);
static_assertions::assert_impl_all!(Listener: Send, Sync);
