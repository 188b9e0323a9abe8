//! Per-thread dependency graph behind properties, bindings and effects.
//!
//! Every reactive handle owns one node in the graph. Reads performed while a
//! binding or effect evaluates are recorded as edges; writes to a property bump
//! the thread's revision counter and schedule every effect downstream of it.
//!
//! # Propagation
//!
//! Propagation is push-then-pull:
//!
//! 1. A write marks the written node with the new revision and walks its
//!    subscribers, queueing each reachable effect once.
//! 2. The flush loop takes queued effects in order. For each, it pulls its
//!    sources: a binding is re-validated against its own sources, recomputing
//!    only if one of them changed after the binding was last verified.
//! 3. An effect runs only if a source changed after the effect's last run.
//!    Bindings that recompute to an equal value keep their old change
//!    revision, so equal results stop propagation there.
//!
//! Reads always pull, so nothing observes a partially updated graph. Writes
//! made while a flush is in progress only queue more work for the same flush,
//! which runs to a fixed point before returning to the writer.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::sync::Weak;

use slotmap::{new_key_type, SlotMap};

use crate::error::{ReactiveError, Result};
use crate::thread_check::ThreadAffinity;
use crate::logging::targets;

new_key_type! {
    /// Identifies a node in the reactive dependency graph.
    pub struct NodeId;
}

/// Maximum number of effect runs a single flush may perform.
pub const MAX_EFFECT_RUNS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// A writable property.
    Source,
    /// A cached binding.
    Derived,
    /// A side effect.
    Effect,
}

/// Implemented by nodes that evaluate user code: bindings and effects.
pub(crate) trait Observer {
    /// Re-evaluate with dependency tracking active.
    ///
    /// Bindings return whether the cached value changed. Effects return
    /// whether they actually ran.
    fn evaluate(&self) -> bool;
}

struct Node {
    kind: NodeKind,
    observer: Option<Weak<dyn Observer>>,
    sources: Vec<NodeId>,
    subscribers: Vec<NodeId>,
    /// Revision at which the node's value last changed.
    changed_at: u64,
    /// Revision at which the node was last brought up to date. Zero means never.
    verified_at: u64,
    computing: bool,
    queued: bool,
}

/// A dependency-collection frame. `None` frames suppress tracking.
struct Frame {
    node: NodeId,
    sources: Vec<NodeId>,
}

pub(crate) struct Runtime {
    nodes: RefCell<SlotMap<NodeId, Node>>,
    revision: Cell<u64>,
    frames: RefCell<Vec<Option<Frame>>>,
    pending: RefCell<VecDeque<NodeId>>,
    batch_depth: Cell<usize>,
    flushing: Cell<bool>,
}

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

/// Run `f` against this thread's runtime.
pub(crate) fn with_runtime<R>(f: impl FnOnce(&Runtime) -> R) -> R {
    RUNTIME.with(f)
}

/// Release a handle's node from its owning thread's graph.
///
/// A handle dropped on another thread cannot reach its graph; the node stays
/// until the owning thread exits. Nothing happens during thread teardown.
pub(crate) fn release_node(id: NodeId, affinity: &ThreadAffinity) {
    if !affinity.is_same_thread() {
        crate::aria_warn!(?id, owner = ?affinity.thread_id(), "reactive handle dropped off its owning thread");
        return;
    }
    if RUNTIME.try_with(|rt| rt.dispose_node(id)).is_err() {
        crate::aria_trace!(?id, "runtime already torn down");
    }
}

/// Pops a frame on drop so a panicking closure cannot leave tracking enabled.
struct FrameGuard<'a> {
    runtime: &'a Runtime,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let frame = self.runtime.frames.borrow_mut().pop().flatten();
        if let Some(frame) = frame {
            self.runtime.replace_sources(frame.node, frame.sources);
        }
    }
}

/// Clears the flushing flag on drop.
struct FlushGuard<'a> {
    runtime: &'a Runtime,
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.runtime.flushing.set(false);
    }
}

impl Runtime {
    fn new() -> Self {
        Self {
            nodes: RefCell::new(SlotMap::with_key()),
            revision: Cell::new(1),
            frames: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            batch_depth: Cell::new(0),
            flushing: Cell::new(false),
        }
    }

    pub(crate) fn create_node(&self, kind: NodeKind) -> NodeId {
        let revision = self.revision.get();
        self.nodes.borrow_mut().insert(Node {
            kind,
            observer: None,
            sources: Vec::new(),
            subscribers: Vec::new(),
            changed_at: revision,
            verified_at: 0,
            computing: false,
            queued: false,
        })
    }

    pub(crate) fn set_observer(&self, id: NodeId, observer: Weak<dyn Observer>) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(id) {
            node.observer = Some(observer);
        }
    }

    /// Remove a node and every edge touching it.
    pub(crate) fn dispose_node(&self, id: NodeId) {
        let removed = self.nodes.borrow_mut().remove(id);
        let Some(node) = removed else {
            return;
        };
        let mut nodes = self.nodes.borrow_mut();
        for source in node.sources {
            if let Some(source) = nodes.get_mut(source) {
                source.subscribers.retain(|&s| s != id);
            }
        }
        for subscriber in node.subscribers {
            if let Some(subscriber) = nodes.get_mut(subscriber) {
                subscriber.sources.retain(|&s| s != id);
            }
        }
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision.get()
    }

    pub(crate) fn is_batching(&self) -> bool {
        self.batch_depth.get() > 0
    }

    pub(crate) fn is_flushing(&self) -> bool {
        self.flushing.get()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub(crate) fn verified_at(&self, id: NodeId) -> u64 {
        self.nodes.borrow().get(id).map_or(0, |n| n.verified_at)
    }

    /// Record a read of `id` in the innermost tracking frame.
    pub(crate) fn track(&self, id: NodeId) {
        let mut frames = self.frames.borrow_mut();
        if let Some(Some(frame)) = frames.last_mut() {
            if frame.node != id && !frame.sources.contains(&id) {
                frame.sources.push(id);
            }
        }
    }

    /// Run `f` collecting its reads as the new sources of `id`.
    pub(crate) fn run_tracked<R>(&self, id: NodeId, f: impl FnOnce() -> R) -> R {
        self.frames.borrow_mut().push(Some(Frame {
            node: id,
            sources: Vec::new(),
        }));
        let guard = FrameGuard { runtime: self };
        let result = f();
        drop(guard);
        result
    }

    /// Run `f` without recording any reads.
    pub(crate) fn untracked<R>(&self, f: impl FnOnce() -> R) -> R {
        self.frames.borrow_mut().push(None);
        let guard = FrameGuard { runtime: self };
        let result = f();
        drop(guard);
        result
    }

    fn replace_sources(&self, id: NodeId, sources: Vec<NodeId>) {
        let mut nodes = self.nodes.borrow_mut();
        let sources: Vec<NodeId> = sources
            .into_iter()
            .filter(|s| nodes.contains_key(*s))
            .collect();
        let old = match nodes.get_mut(id) {
            Some(node) => std::mem::replace(&mut node.sources, sources.clone()),
            None => return,
        };
        for source in old.iter().filter(|s| !sources.contains(s)) {
            if let Some(source) = nodes.get_mut(*source) {
                source.subscribers.retain(|&s| s != id);
            }
        }
        for source in sources.iter().filter(|s| !old.contains(s)) {
            if let Some(source) = nodes.get_mut(*source) {
                if !source.subscribers.contains(&id) {
                    source.subscribers.push(id);
                }
            }
        }
    }

    /// A property changed: advance the revision and queue downstream effects.
    pub(crate) fn mark_changed(&self, id: NodeId) {
        let revision = self.revision.get() + 1;
        self.revision.set(revision);
        {
            let mut nodes = self.nodes.borrow_mut();
            let mut pending = self.pending.borrow_mut();
            let mut stack = match nodes.get_mut(id) {
                Some(node) => {
                    node.changed_at = revision;
                    node.subscribers.iter().rev().copied().collect::<Vec<_>>()
                }
                None => return,
            };
            // Depth-first, visiting subscribers in subscription order.
            let mut visited = HashSet::new();
            while let Some(next) = stack.pop() {
                if !visited.insert(next) {
                    continue;
                }
                let Some(node) = nodes.get_mut(next) else {
                    continue;
                };
                match node.kind {
                    NodeKind::Derived => stack.extend(node.subscribers.iter().rev().copied()),
                    NodeKind::Effect => {
                        if !node.queued {
                            node.queued = true;
                            pending.push_back(next);
                        }
                    }
                    NodeKind::Source => {}
                }
            }
        }
        self.flush_if_idle();
    }

    /// Queue an effect for its first run.
    pub(crate) fn schedule(&self, id: NodeId) {
        {
            let mut nodes = self.nodes.borrow_mut();
            let Some(node) = nodes.get_mut(id) else {
                return;
            };
            if node.queued {
                return;
            }
            node.queued = true;
            self.pending.borrow_mut().push_back(id);
        }
        self.flush_if_idle();
    }

    pub(crate) fn flush_if_idle(&self) {
        if !self.is_batching() && !self.is_flushing() {
            if let Err(err) = self.flush() {
                tracing::error!(target: targets::RUNTIME, %err, "reactive flush aborted");
            }
        }
    }

    pub(crate) fn enter_batch(&self) {
        self.batch_depth.set(self.batch_depth.get() + 1);
    }

    pub(crate) fn exit_batch(&self) {
        let depth = self.batch_depth.get().saturating_sub(1);
        self.batch_depth.set(depth);
        if depth == 0 {
            self.flush_if_idle();
        }
    }

    /// Bring `id` up to date and return the revision its value last changed at.
    pub(crate) fn refresh(&self, id: NodeId) -> u64 {
        let (kind, changed_at, verified_at, computing, sources, observer) = {
            let nodes = self.nodes.borrow();
            let Some(node) = nodes.get(id) else {
                return 0;
            };
            (
                node.kind,
                node.changed_at,
                node.verified_at,
                node.computing,
                node.sources.clone(),
                node.observer.clone(),
            )
        };
        if kind != NodeKind::Derived {
            return changed_at;
        }
        let revision = self.revision.get();
        if verified_at == revision {
            return changed_at;
        }
        if computing {
            tracing::error!(target: targets::RUNTIME, ?id, "binding depends on itself; keeping previous value");
            return changed_at;
        }

        let stale = verified_at == 0 || sources.iter().any(|&s| self.refresh(s) > verified_at);
        if !stale {
            if let Some(node) = self.nodes.borrow_mut().get_mut(id) {
                node.verified_at = revision;
            }
            return changed_at;
        }

        if let Some(node) = self.nodes.borrow_mut().get_mut(id) {
            node.computing = true;
        }
        let changed = observer
            .and_then(|o| o.upgrade())
            .is_some_and(|o| o.evaluate());
        let revision = self.revision.get();
        let mut nodes = self.nodes.borrow_mut();
        match nodes.get_mut(id) {
            Some(node) => {
                node.computing = false;
                if changed {
                    node.changed_at = revision;
                }
                node.verified_at = revision;
                tracing::trace!(target: targets::RUNTIME, ?id, changed, "binding evaluated");
                node.changed_at
            }
            None => 0,
        }
    }

    /// Run a queued effect if any of its sources changed since it last ran.
    fn run_effect(&self, id: NodeId) -> bool {
        let (verified_at, sources, observer) = {
            let nodes = self.nodes.borrow();
            let Some(node) = nodes.get(id) else {
                return false;
            };
            (node.verified_at, node.sources.clone(), node.observer.clone())
        };
        let dirty = verified_at == 0 || sources.iter().any(|&s| self.refresh(s) > verified_at);
        if !dirty {
            return false;
        }
        let Some(observer) = observer.and_then(|o| o.upgrade()) else {
            return false;
        };

        let started_at = self.revision.get();
        if !observer.evaluate() {
            return false;
        }
        tracing::trace!(target: targets::RUNTIME, ?id, "effect ran");

        let sources = {
            let mut nodes = self.nodes.borrow_mut();
            let Some(node) = nodes.get_mut(id) else {
                return true;
            };
            node.verified_at = started_at;
            node.sources.clone()
        };
        // The effect may have written to something it reads.
        if sources.iter().any(|&s| self.refresh(s) > started_at) {
            let mut nodes = self.nodes.borrow_mut();
            if let Some(node) = nodes.get_mut(id) {
                if !node.queued {
                    node.queued = true;
                    self.pending.borrow_mut().push_back(id);
                }
            }
        }
        true
    }

    /// Run queued effects until none are left.
    pub(crate) fn flush(&self) -> Result<()> {
        if self.flushing.get() {
            return Ok(());
        }
        self.flushing.set(true);
        let _guard = FlushGuard { runtime: self };

        let mut runs = 0usize;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(id) = next else {
                break;
            };
            let live = match self.nodes.borrow_mut().get_mut(id) {
                Some(node) => {
                    node.queued = false;
                    true
                }
                None => false,
            };
            if !live || !self.run_effect(id) {
                continue;
            }
            runs += 1;
            if runs >= MAX_EFFECT_RUNS {
                self.abandon_pending();
                return Err(ReactiveError::IterationLimit {
                    limit: MAX_EFFECT_RUNS,
                });
            }
        }
        if runs > 0 {
            tracing::trace!(target: targets::RUNTIME, runs, "flush settled");
        }
        Ok(())
    }

    fn abandon_pending(&self) {
        let pending: Vec<NodeId> = self.pending.borrow_mut().drain(..).collect();
        let mut nodes = self.nodes.borrow_mut();
        for id in pending {
            if let Some(node) = nodes.get_mut(id) {
                node.queued = false;
            }
        }
    }
}

/// Defer effect execution until `f` returns.
///
/// Writes inside the batch are visible immediately to reads; effects that
/// depend on them run once, after the outermost batch ends.
///
/// ```
/// use horizon_aria_core::{batch, Effect, Property};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let a = Property::new(1);
/// let b = Property::new(2);
/// let runs = Arc::new(AtomicUsize::new(0));
///
/// let _effect = {
///     let (a, b, runs) = (a.clone(), b.clone(), runs.clone());
///     Effect::new(move || {
///         let _ = a.get() + b.get();
///         runs.fetch_add(1, Ordering::SeqCst);
///     })
/// };
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
///
/// batch(|| {
///     a.set(10);
///     b.set(20);
/// });
/// assert_eq!(runs.load(Ordering::SeqCst), 2);
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    struct BatchGuard;
    impl Drop for BatchGuard {
        fn drop(&mut self) {
            let _ = RUNTIME.try_with(|rt| rt.exit_batch());
        }
    }

    with_runtime(|rt| rt.enter_batch());
    let guard = BatchGuard;
    let result = f();
    drop(guard);
    result
}

/// Run `f` without registering its reads as dependencies of the caller.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    with_runtime(|rt| rt.untracked(f))
}

/// Run pending effects now.
///
/// Flushing happens automatically after every write outside a batch, so this
/// is rarely needed. It reports [`ReactiveError::IterationLimit`] when effects
/// keep re-triggering each other.
pub fn flush() -> Result<()> {
    with_runtime(|rt| rt.flush())
}

/// Number of live nodes in this thread's graph.
pub fn node_count() -> usize {
    with_runtime(|rt| rt.node_count())
}

/// Current revision of this thread's graph. Increases with every change.
pub fn current_revision() -> u64 {
    with_runtime(|rt| rt.revision())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Binding, Effect, Property};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_nodes_are_released() {
        let before = node_count();
        {
            let value = Property::new(1);
            let doubled = {
                let value = value.clone();
                Binding::new(move || value.get() * 2)
            };
            assert_eq!(doubled.get(), 2);
            assert_eq!(node_count(), before + 2);
        }
        assert_eq!(node_count(), before);
    }

    #[test]
    fn test_diamond_is_glitch_free() {
        // a -> b, a -> c, (b, c) -> effect. The effect must never see b and c disagree.
        let a = Property::new(1);
        let b = {
            let a = a.clone();
            Binding::new(move || a.get() + 1)
        };
        let c = {
            let a = a.clone();
            Binding::new(move || a.get() * 10)
        };
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _effect = {
            let (b, c, seen) = (b.clone(), c.clone(), seen.clone());
            Effect::new(move || seen.lock().push((b.get(), c.get())))
        };

        a.set(2);
        a.set(3);

        assert_eq!(*seen.lock(), vec![(2, 10), (3, 20), (4, 30)]);
    }

    #[test]
    fn test_equal_binding_result_stops_propagation() {
        let value = Property::new(1);
        let parity = {
            let value = value.clone();
            Binding::new(move || value.get() % 2)
        };
        let runs = Arc::new(AtomicUsize::new(0));
        let _effect = {
            let (parity, runs) = (parity.clone(), runs.clone());
            Effect::new(move || {
                let _ = parity.get();
                runs.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        value.set(3);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        value.set(4);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_effect_writes_converge() {
        let source = Property::new(5);
        let clamped = Property::new(0);
        let _effect = {
            let (source, clamped) = (source.clone(), clamped.clone());
            Effect::new(move || {
                clamped.set(source.get().min(3));
            })
        };
        assert_eq!(clamped.get(), 3);

        source.set(1);
        assert_eq!(clamped.get(), 1);
    }

    #[test]
    fn test_self_correcting_effect_settles() {
        // Reads and writes the same property, like an active-item correction.
        let value = Property::new(10);
        let runs = Arc::new(AtomicUsize::new(0));
        let _effect = {
            let (value, runs) = (value.clone(), runs.clone());
            Effect::new(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                let current = value.get();
                if current > 5 {
                    value.set(5);
                }
            })
        };
        assert_eq!(value.get(), 5);
        let settled = runs.load(Ordering::SeqCst);
        assert!(settled <= 3, "ran {settled} times");

        value.set(8);
        assert_eq!(value.get(), 5);
    }

    #[test]
    fn test_runaway_effects_hit_limit() {
        let counter = Property::new(0u64);
        let _effect = batch(|| {
            let counter = counter.clone();
            Effect::new(move || {
                let next = counter.get() + 1;
                counter.set(next);
            })
        });
        // The automatic flush logged and abandoned the loop.
        assert!(counter.get_untracked() >= MAX_EFFECT_RUNS as u64 - 1);

        counter.set_silent(0);
        assert_eq!(flush(), Ok(()));
    }

    #[test]
    fn test_untracked_reads_do_not_subscribe() {
        let tracked = Property::new(1);
        let ignored = Property::new(1);
        let runs = Arc::new(AtomicUsize::new(0));
        let _effect = {
            let (tracked, ignored, runs) = (tracked.clone(), ignored.clone(), runs.clone());
            Effect::new(move || {
                let _ = tracked.get();
                let _ = untracked(|| ignored.get());
                runs.fetch_add(1, Ordering::SeqCst);
            })
        };

        ignored.set(2);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        tracked.set(2);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_revision_advances_on_change_only() {
        let value = Property::new("a".to_string());
        let start = current_revision();
        value.set("a".to_string());
        assert_eq!(current_revision(), start);
        value.set("b".to_string());
        assert_eq!(current_revision(), start + 1);
    }
}
