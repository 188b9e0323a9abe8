//! Side effects that re-run when their reactive reads change.
//!
//! An [`Effect`] runs its closure once when created (at the end of the
//! current batch or flush, if one is active) and again every time a property
//! or binding it read changes. Effects may write to properties; those writes
//! schedule further effects inside the same flush.
//!
//! ```
//! use horizon_aria_core::{Effect, Property};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! let name = Property::new("a".to_string());
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let effect = {
//!     let (name, log) = (name.clone(), log.clone());
//!     Effect::new(move || log.lock().push(name.get()))
//! };
//!
//! name.set("b".to_string());
//! effect.destroy();
//! name.set("c".to_string());
//!
//! assert_eq!(*log.lock(), vec!["a".to_string(), "b".to_string()]);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::logging::targets;
use crate::runtime::{release_node, with_runtime, NodeId, NodeKind, Observer};
use crate::thread_check::ThreadAffinity;

type EffectFn = Box<dyn FnMut() + Send>;

/// A handle to a running side effect.
///
/// Clones share the same effect. The effect stops when [`destroy`](Self::destroy)
/// is called or when the last handle is dropped.
pub struct Effect {
    inner: Arc<EffectInner>,
}

struct EffectInner {
    id: NodeId,
    run: Mutex<EffectFn>,
    destroyed: AtomicBool,
    affinity: ThreadAffinity,
}

impl Observer for EffectInner {
    fn evaluate(&self) -> bool {
        if self.destroyed.load(Ordering::Acquire) {
            return false;
        }
        let mut run = self.run.lock();
        with_runtime(|rt| rt.run_tracked(self.id, || (run)()));
        true
    }
}

impl Drop for EffectInner {
    fn drop(&mut self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            release_node(self.id, &self.affinity);
        }
    }
}

impl Effect {
    /// Create an effect and schedule its first run.
    ///
    /// Outside a batch or flush, the first run happens before `new` returns.
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let id = with_runtime(|rt| rt.create_node(NodeKind::Effect));
        let inner = Arc::new(EffectInner {
            id,
            run: Mutex::new(Box::new(f)),
            destroyed: AtomicBool::new(false),
            affinity: ThreadAffinity::current(),
        });
        let weak = Arc::downgrade(&inner);
        with_runtime(|rt| {
            rt.set_observer(id, weak);
            rt.schedule(id);
        });
        Self { inner }
    }

    /// Stop the effect. It will never run again.
    ///
    /// Calling this more than once has no further effect.
    pub fn destroy(&self) {
        self.inner.affinity.debug_assert_same_thread();
        if !self.inner.destroyed.swap(true, Ordering::AcqRel) {
            tracing::trace!(target: targets::RUNTIME, id = ?self.inner.id, "effect destroyed");
            release_node(self.inner.id, &self.inner.affinity);
        }
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

static_assertions::assert_impl_all!(Effect: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{batch, Binding, Property};
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (count.clone(), count)
    }

    #[test]
    fn test_effect_runs_immediately() {
        let (runs, runs_clone) = counter();
        let _effect = Effect::new(move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_effect_reruns_on_change() {
        let value = Property::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _effect = {
            let (value, seen) = (value.clone(), seen.clone());
            Effect::new(move || seen.lock().push(value.get()))
        };

        value.set(1);
        value.set(1);
        value.set(2);

        assert_eq!(*seen.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_effect_destroy_is_idempotent() {
        let value = Property::new(0);
        let (runs, runs_clone) = counter();
        let effect = {
            let value = value.clone();
            Effect::new(move || {
                let _ = value.get();
                runs_clone.fetch_add(1, Ordering::SeqCst);
            })
        };

        effect.destroy();
        effect.destroy();
        assert!(effect.is_destroyed());

        value.set(5);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_effect_dropped_stops_running() {
        let value = Property::new(0);
        let (runs, runs_clone) = counter();
        {
            let value = value.clone();
            let _effect = Effect::new(move || {
                let _ = value.get();
                runs_clone.fetch_add(1, Ordering::SeqCst);
            });
        }
        value.set(1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_effect_created_in_batch_runs_at_end() {
        let (runs, runs_clone) = counter();
        let effect = batch(|| {
            let effect = Effect::new(move || {
                runs_clone.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(runs.load(Ordering::SeqCst), 0);
            effect
        });
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        drop(effect);
    }

    #[test]
    fn test_effect_tracks_dynamic_dependencies() {
        let use_left = Property::new(true);
        let left = Property::new(1);
        let right = Property::new(2);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _effect = {
            let (use_left, left, right, seen) =
                (use_left.clone(), left.clone(), right.clone(), seen.clone());
            Effect::new(move || {
                let value = if use_left.get() { left.get() } else { right.get() };
                seen.lock().push(value);
            })
        };

        right.set(20);
        use_left.set(false);
        left.set(10);
        right.set(30);

        assert_eq!(*seen.lock(), vec![1, 20, 30]);
    }

    #[test]
    fn test_effect_destroyed_by_another_effect() {
        let trigger = Property::new(0);
        let (runs, runs_clone) = counter();
        let victim = {
            let trigger = trigger.clone();
            Effect::new(move || {
                let _ = trigger.get();
                runs_clone.fetch_add(1, Ordering::SeqCst);
            })
        };
        let _killer = {
            let (trigger, victim) = (trigger.clone(), victim.clone());
            Effect::new(move || {
                if trigger.get() > 0 {
                    victim.destroy();
                }
            })
        };

        trigger.set(1);
        trigger.set(2);
        // The victim may observe the first change before the killer runs, never the second.
        assert!(runs.load(Ordering::SeqCst) <= 2);
        assert!(victim.is_destroyed());
    }

    #[test]
    fn test_effect_over_binding() {
        let items = Property::new(vec![1, 2, 3]);
        let total = {
            let items = items.clone();
            Binding::new(move || items.with(|v| v.iter().sum::<i32>()))
        };
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _effect = {
            let (total, seen) = (total.clone(), seen.clone());
            Effect::new(move || seen.lock().push(total.get()))
        };

        items.set(vec![3, 2, 1]);
        items.set(vec![10]);

        assert_eq!(*seen.lock(), vec![6, 10]);
    }
}
