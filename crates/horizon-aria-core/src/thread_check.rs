//! Thread affinity checks for reactive handles.
//!
//! The dependency graph behind [`Property`](crate::Property),
//! [`Binding`](crate::Binding) and [`Effect`](crate::Effect) lives in a
//! thread-local runtime. Handles are `Send + Sync` so they can be stored in
//! shared structures, but reads and writes must happen on the thread that
//! created them. Each handle carries a [`ThreadAffinity`] and asserts it in
//! debug builds. With the assertion off, a foreign thread never reaches its
//! own runtime through the handle: property reads are untracked, binding reads
//! recompute without caching and writes skip propagation.
//!
//! ```
//! use horizon_aria_core::thread_check::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! assert!(affinity.is_same_thread());
//! affinity.debug_assert_same_thread();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Flag to enable/disable runtime thread checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable runtime thread checks.
///
/// Checks are enabled by default in debug builds and disabled in release builds.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Check if runtime thread checks are enabled.
#[inline]
pub fn thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Records the thread a reactive handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl ThreadAffinity {
    /// Capture the current thread.
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// The owning thread.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the caller runs on the owning thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panic in debug builds if called from a different thread.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        if cfg!(debug_assertions) && thread_checks_enabled() && !self.is_same_thread() {
            crate::aria_error!(owner = ?self.thread_id, "reactive handle used off its owning thread");
            panic!(
                "reactive handle used off its owning thread: owner {:?}, current {:?}",
                self.thread_id,
                std::thread::current().id()
            );
        }
    }

    /// Assert in debug builds, then report whether the owning thread's graph may
    /// be touched.
    #[inline]
    pub fn check_same_thread(&self) -> bool {
        self.debug_assert_same_thread();
        self.is_same_thread()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        assert_eq!(affinity.thread_id(), std::thread::current().id());
    }

    #[test]
    fn test_affinity_other_thread() {
        let affinity = ThreadAffinity::current();
        let same = std::thread::spawn(move || affinity.is_same_thread())
            .join()
            .unwrap();
        assert!(!same);
    }

    #[test]
    fn test_check_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.check_same_thread());
    }
}
