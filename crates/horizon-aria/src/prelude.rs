//! Prelude module for Horizon ARIA.
//!
//! ```
//! use horizon_aria::prelude::*;
//! ```

// ============================================================================
// Reactive Primitives
// ============================================================================

pub use horizon_aria_core::{Binding, Effect, EventDispatcher, Listener, Property, batch, untracked};

// ============================================================================
// Behaviors
// ============================================================================

pub use crate::behavior::{
    ActiveDescendantItem, Behavior, BehaviorBase, FocusStrategy, FocusableItem, ListItem,
    RovingTabindexItem, SelectionStrategy,
};

// ============================================================================
// Widgets
// ============================================================================

pub use crate::listbox::{
    Listbox, ListboxOption, ListboxOptions, OptionKey, PartialListboxOptions, SelectionMode,
};

// ============================================================================
// Collaborators and Events
// ============================================================================

pub use crate::element::{DetachedElement, Element, ElementRef};
pub use crate::events::{FocusInEvent, FocusOutEvent, Key, KeyDownEvent};
pub use crate::id::IdGenerator;
pub use crate::orientation::{Direction, Orientation};
