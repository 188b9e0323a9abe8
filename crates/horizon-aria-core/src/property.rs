//! Property system for Horizon ARIA.
//!
//! This module provides reactive properties with change notification and
//! computed bindings that track their dependencies automatically.
//!
//! # Property Types
//!
//! - **Property<T>**: A writable reactive cell
//! - **Binding<T>**: A cached value derived from other properties and bindings
//!
//! Both are cheap, cloneable handles: clones share the same underlying cell.
//!
//! # Example
//!
//! ```
//! use horizon_aria_core::{Binding, Property};
//!
//! let first_name = Property::new("John".to_string());
//! let last_name = Property::new("Doe".to_string());
//!
//! let full_name = {
//!     let (first, last) = (first_name.clone(), last_name.clone());
//!     Binding::new(move || format!("{} {}", first.get(), last.get()))
//! };
//! assert_eq!(full_name.get(), "John Doe");
//!
//! // No manual invalidation: the binding knows what it read.
//! first_name.set("Jane".to_string());
//! assert_eq!(full_name.get(), "Jane Doe");
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::runtime::{release_node, with_runtime, NodeId, NodeKind, Observer};
use crate::thread_check::ThreadAffinity;

/// A writable reactive property.
///
/// Reading a property with [`get`](Self::get) or [`with`](Self::with) inside
/// a binding or effect registers it as a dependency. Writing a different value
/// with [`set`](Self::set) re-runs the effects that depend on it before
/// `set` returns (or at the end of the enclosing [`batch`](crate::batch)).
///
/// # Example
///
/// ```
/// use horizon_aria_core::Property;
///
/// let prop = Property::new(42);
/// assert_eq!(prop.get(), 42);
///
/// // Setting same value returns false (no change)
/// assert!(!prop.set(42));
///
/// // Setting different value returns true (changed)
/// assert!(prop.set(100));
/// assert_eq!(prop.get(), 100);
/// ```
pub struct Property<T> {
    inner: Arc<PropertyInner<T>>,
}

struct PropertyInner<T> {
    id: NodeId,
    value: RwLock<T>,
    affinity: ThreadAffinity,
}

impl<T> Drop for PropertyInner<T> {
    fn drop(&mut self) {
        release_node(self.id, &self.affinity);
    }
}

impl<T: Clone + 'static> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        let id = with_runtime(|rt| rt.create_node(NodeKind::Source));
        Self {
            inner: Arc::new(PropertyInner {
                id,
                value: RwLock::new(value),
                affinity: ThreadAffinity::current(),
            }),
        }
    }

    /// Get the current value, tracking it as a dependency.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.track();
        self.inner.value.read().clone()
    }

    /// Get the current value without tracking it.
    pub fn get_untracked(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.track();
        f(&self.inner.value.read())
    }

    /// Set the value without change notification.
    ///
    /// Dependents are not re-run and will not see the new value until
    /// something else invalidates them. Meant for initialization.
    pub fn set_silent(&self, value: T) {
        self.inner.affinity.debug_assert_same_thread();
        *self.inner.value.write() = value;
    }

    /// Whether two handles refer to the same property.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn track(&self) {
        if self.inner.affinity.check_same_thread() {
            with_runtime(|rt| rt.track(self.inner.id));
        }
    }

    // Node ids are only meaningful in the owning thread's runtime.
    fn notify(&self) {
        if self.inner.affinity.is_same_thread() {
            with_runtime(|rt| rt.mark_changed(self.inner.id));
        } else {
            crate::aria_warn!(
                owner = ?self.inner.affinity.thread_id(),
                "property written off its owning thread, dependents not notified"
            );
        }
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// Equal values are ignored and notify nobody.
    pub fn set(&self, value: T) -> bool {
        self.inner.affinity.debug_assert_same_thread();
        let changed = {
            let mut current = self.inner.value.write();
            if *current != value {
                *current = value;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        self.inner.affinity.debug_assert_same_thread();
        let old = {
            let mut current = self.inner.value.write();
            if *current != value {
                Some(std::mem::replace(&mut *current, value))
            } else {
                None
            }
        };
        if old.is_some() {
            self.notify();
        }
        old
    }

    /// Compute a new value from the current one and store it.
    ///
    /// The current value is read untracked. Returns `true` if it changed.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.inner.value.read());
        self.set(next)
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Property<T> {
    /// A read-only binding that mirrors this property.
    pub fn read_only(&self) -> Binding<T> {
        let property = self.clone();
        Binding::new(move || property.get())
    }
}

impl<T> Clone for Property<T> {
    /// Clones the handle. Both handles refer to the same cell.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Default + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.inner.value.read())
            .finish()
    }
}

/// A computed value derived from other reactive reads.
///
/// The computation runs lazily on first access and again only after one of
/// the properties or bindings it read has changed. When a recomputation
/// produces a value equal to the cached one, dependents are not re-run.
///
/// # Example
///
/// ```
/// use horizon_aria_core::{Binding, Property};
///
/// let counter = Property::new(5);
/// let doubled = {
///     let counter = counter.clone();
///     Binding::new(move || counter.get() * 2)
/// };
///
/// assert_eq!(doubled.get(), 10);
/// counter.set(10);
/// assert_eq!(doubled.get(), 20);
/// ```
pub struct Binding<T> {
    inner: Arc<BindingInner<T>>,
}

type Compute<T> = Box<dyn Fn() -> T + Send + Sync>;

struct BindingInner<T> {
    id: NodeId,
    compute: Compute<T>,
    cached: RwLock<Option<T>>,
    affinity: ThreadAffinity,
}

impl<T> Drop for BindingInner<T> {
    fn drop(&mut self) {
        release_node(self.id, &self.affinity);
    }
}

impl<T: Clone + PartialEq + 'static> Observer for BindingInner<T> {
    fn evaluate(&self) -> bool {
        let value = with_runtime(|rt| rt.run_tracked(self.id, || (self.compute)()));
        let mut cached = self.cached.write();
        if cached.as_ref() == Some(&value) {
            false
        } else {
            *cached = Some(value);
            true
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Binding<T> {
    /// Create a new binding with a computation function.
    ///
    /// The function is called lazily when the value is first read.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let id = with_runtime(|rt| rt.create_node(NodeKind::Derived));
        let inner = Arc::new(BindingInner {
            id,
            compute: Box::new(compute),
            cached: RwLock::new(None),
            affinity: ThreadAffinity::current(),
        });
        let weak = Arc::downgrade(&inner);
        with_runtime(|rt| rt.set_observer(id, weak));
        Self { inner }
    }

    /// A binding that always yields `value`.
    pub fn constant(value: T) -> Self {
        Self::new(move || value.clone())
    }

    /// Get the current value, computing it if necessary.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value without tracking it.
    pub fn get_untracked(&self) -> T {
        with_runtime(|rt| rt.untracked(|| self.get()))
    }

    /// Access the value through a closure without cloning.
    ///
    /// A binding that reads itself sees its previous value. The read is
    /// reported at `error` level.
    ///
    /// # Panics
    ///
    /// Panics if the binding reads itself before it has ever produced a value.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        if !self.inner.affinity.check_same_thread() {
            return f(&(self.inner.compute)());
        }
        with_runtime(|rt| {
            rt.track(self.inner.id);
            rt.refresh(self.inner.id);
        });
        let cached = self.inner.cached.read();
        match cached.as_ref() {
            Some(value) => f(value),
            None => panic!("binding read itself during its first evaluation"),
        }
    }

    /// Whether the cached value may be out of date.
    pub fn is_dirty(&self) -> bool {
        if !self.inner.affinity.is_same_thread() {
            return true;
        }
        with_runtime(|rt| rt.verified_at(self.inner.id) != rt.revision())
    }

    /// Whether two handles refer to the same binding.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> From<Property<T>> for Binding<T> {
    fn from(property: Property<T>) -> Self {
        Binding::new(move || property.get())
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("cached", &*self.inner.cached.read())
            .finish()
    }
}

/// A helper trait for creating properties with common patterns.
pub trait IntoProperty<T> {
    /// Convert this value into a Property.
    fn into_property(self) -> Property<T>;
}

impl<T: Clone + 'static> IntoProperty<T> for T {
    fn into_property(self) -> Property<T> {
        Property::new(self)
    }
}

static_assertions::assert_impl_all!(Property<String>: Send, Sync);
static_assertions::assert_impl_all!(Binding<String>: Send, Sync);
