//! The DOM-focus collaborator.
//!
//! Behaviors never touch a real document. They ask the rendering layer to
//! move focus through [`Element`] and query whether focus currently lies
//! inside a container.

use std::fmt;
use std::sync::Arc;

/// A node in the rendering layer that can take keyboard focus.
pub trait Element: Send + Sync {
    /// Move keyboard focus to this node.
    fn focus(&self);

    /// Whether this node or one of its descendants holds keyboard focus.
    fn contains_focus(&self) -> bool;
}

/// Shared handle to an [`Element`].
pub type ElementRef = Arc<dyn Element>;

/// An element that never holds focus and ignores focus requests.
///
/// Useful for headless widgets and for items that have not been attached yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedElement;

impl Element for DetachedElement {
    fn focus(&self) {}

    fn contains_focus(&self) -> bool {
        false
    }
}

impl DetachedElement {
    /// A shared handle to a detached element.
    pub fn shared() -> ElementRef {
        Arc::new(DetachedElement)
    }
}

impl fmt::Debug for dyn Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("contains_focus", &self.contains_focus())
            .finish()
    }
}
