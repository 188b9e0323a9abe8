//! Capabilities behaviors need from list items.
//!
//! Each behavior asks only for the facets it uses: navigation and selection
//! need an identity and a disabled flag, focus strategies additionally need a
//! writable tabindex plus either a focusable element or a DOM id.

use std::fmt::Debug;

use horizon_aria_core::Property;

use crate::element::ElementRef;

/// An item in a reactive list.
///
/// Items are compared by value when the list is recomputed, so the
/// `PartialEq` impl should be cheap (comparing keys or pointers).
pub trait ListItem: Clone + PartialEq + Send + Sync + 'static {
    /// Opaque handle that identifies the item across list changes.
    type Identity: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// The item's identity.
    fn identity(&self) -> Self::Identity;

    /// Whether the item is disabled. Reads are tracked when the implementation
    /// reads reactive state.
    fn is_disabled(&self) -> bool {
        false
    }
}

/// An item with a writable tabindex.
pub trait FocusableItem: ListItem {
    /// The item's `tabindex`. `None` leaves the attribute unset.
    fn tabindex(&self) -> &Property<Option<i32>>;
}

/// An item that receives real DOM focus.
pub trait RovingTabindexItem: FocusableItem {
    /// The node to focus when the item becomes the tab stop.
    fn element(&self) -> ElementRef;
}

/// An item that is focused virtually through `aria-activedescendant`.
pub trait ActiveDescendantItem: FocusableItem {
    /// The item's DOM id.
    fn dom_id(&self) -> String;
}

/// The item whose identity is `identity`, if present.
pub(crate) fn find_item<'a, T: ListItem>(
    items: &'a [T],
    identity: Option<&T::Identity>,
) -> Option<&'a T> {
    let identity = identity?;
    items.iter().find(|item| item.identity() == *identity)
}

/// The first enabled item, or `None` when the container is disabled.
pub(crate) fn first_enabled<T: ListItem>(items: &[T], container_disabled: bool) -> Option<&T> {
    if container_disabled {
        return None;
    }
    items.iter().find(|item| !item.is_disabled())
}
