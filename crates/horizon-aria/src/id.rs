//! Generation of DOM ids and opaque item keys.
//!
//! Widgets take an [`IdGenerator`] instead of reaching for a hidden global
//! counter. Generators that share a prefix must be shared (cloned) to avoid
//! handing out the same id twice.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out `prefix-N` DOM ids and numeric keys from one counter.
///
/// Clones share the counter.
///
/// ```
/// use horizon_aria::IdGenerator;
///
/// let ids = IdGenerator::new("listbox-option");
/// assert_eq!(ids.next_dom_id(), "listbox-option-0");
/// assert_eq!(ids.clone().next_dom_id(), "listbox-option-1");
/// ```
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: Arc<str>,
    next: Arc<AtomicU64>,
}

impl IdGenerator {
    /// Create a generator whose ids start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Arc::from(prefix.into()),
            next: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The id prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Allocate the next raw value.
    pub fn next_key(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Allocate the next DOM id.
    pub fn next_dom_id(&self) -> String {
        format!("{}-{}", self.prefix, self.next_key())
    }

    /// Allocate a key together with the DOM id built from it.
    pub fn next_pair(&self) -> (u64, String) {
        let key = self.next_key();
        (key, format!("{}-{}", self.prefix, key))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("horizon-aria")
    }
}
