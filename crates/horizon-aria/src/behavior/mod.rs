//! Interaction behaviors for composite widgets.
//!
//! A behavior attaches to shared reactive state (the item list, the active
//! item, the selection) and keeps it consistent: it installs effects that
//! react to state changes and listeners that react to input events. Several
//! behaviors cooperate on one widget; each owns only its own effects and
//! listeners, collected in a [`BehaviorBase`].
//!
//! # Available behaviors
//!
//! - [`ListKeyNavigation`] - Arrow keys move the active item
//! - [`RovingTabindex`] - The active item is the single tab stop and holds focus
//! - [`AriaActiveDescendant`] - The container holds focus and names the active item
//! - [`ListSingleSelection`] - One selected item, optionally following the active item
//! - [`ListMultipleSelection`] - Enter/Space toggles the active item in a selection list
//!
//! [`FocusStrategy`] and [`SelectionStrategy`] wrap the interchangeable ones
//! so a widget can pick them from configuration.

mod aria_active_descendant;
mod item;
mod list_key_navigation;
mod list_multiple_selection;
mod list_single_selection;
mod roving_tabindex;
mod strategy;

pub use aria_active_descendant::{AriaActiveDescendant, AriaActiveDescendantState};
pub use item::{ActiveDescendantItem, FocusableItem, ListItem, RovingTabindexItem};
pub use list_key_navigation::{ListKeyNavigation, ListKeyNavigationOptions, ListKeyNavigationState};
pub use list_multiple_selection::{ListMultipleSelection, ListMultipleSelectionState};
pub use list_single_selection::{
    ListSingleSelection, ListSingleSelectionOptions, ListSingleSelectionState,
};
pub use roving_tabindex::{RovingTabindex, RovingTabindexState};
pub use strategy::{FocusStrategy, SelectionStrategy};

use horizon_aria_core::logging::targets;
use horizon_aria_core::{Effect, Listener};

/// The effects and listeners owned by one behavior.
///
/// Behaviors embed a `BehaviorBase` and expose it through [`Behavior`].
/// [`remove`](Self::remove) stops every effect and removes every listener;
/// afterwards the behavior has no further observable effect. Dropping the
/// base removes it as well.
///
/// ```
/// use horizon_aria::behavior::BehaviorBase;
/// use horizon_aria_core::{Effect, EventDispatcher, Property};
///
/// let clicks = EventDispatcher::<()>::new();
/// let count = Property::new(0);
///
/// let mut base = BehaviorBase::new("Counter");
/// base.add_listener({
///     let count = count.clone();
///     clicks.listen(move |_| {
///         count.update(|n| n + 1);
///     })
/// });
///
/// clicks.dispatch(&mut ());
/// base.remove();
/// base.remove();
/// clicks.dispatch(&mut ());
/// assert_eq!(count.get(), 1);
/// ```
pub struct BehaviorBase {
    name: &'static str,
    effects: Vec<Effect>,
    listeners: Vec<Listener>,
    removed: bool,
}

impl BehaviorBase {
    /// Create an empty base for the behavior called `name`.
    pub fn new(name: &'static str) -> Self {
        tracing::debug!(target: targets::BEHAVIOR, behavior = name, "behavior created");
        Self {
            name,
            effects: Vec::new(),
            listeners: Vec::new(),
            removed: false,
        }
    }

    /// The behavior's name, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Take ownership of an effect. A removed base destroys it immediately.
    pub fn add_effect(&mut self, effect: Effect) {
        if self.removed {
            effect.destroy();
            return;
        }
        self.effects.push(effect);
    }

    /// Take ownership of a listener. A removed base unlistens it immediately.
    pub fn add_listener(&mut self, listener: Listener) {
        if self.removed {
            listener.unlisten();
            return;
        }
        self.listeners.push(listener);
    }

    /// Number of live effects.
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether [`remove`](Self::remove) has run.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Stop every effect and remove every listener.
    ///
    /// Calling this again does nothing.
    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        for effect in self.effects.drain(..) {
            effect.destroy();
        }
        for listener in self.listeners.drain(..) {
            listener.unlisten();
        }
        tracing::debug!(target: targets::BEHAVIOR, behavior = self.name, "behavior removed");
    }
}

impl Drop for BehaviorBase {
    fn drop(&mut self) {
        self.remove();
    }
}

impl std::fmt::Debug for BehaviorBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorBase")
            .field("name", &self.name)
            .field("effects", &self.effects.len())
            .field("listeners", &self.listeners.len())
            .field("removed", &self.removed)
            .finish()
    }
}

/// Common interface of all behaviors.
///
/// Implementors only provide access to their [`BehaviorBase`]; lifecycle
/// methods are shared.
pub trait Behavior: Send + Sync {
    /// Get a reference to the behavior's base.
    fn behavior_base(&self) -> &BehaviorBase;

    /// Get a mutable reference to the behavior's base.
    fn behavior_base_mut(&mut self) -> &mut BehaviorBase;

    /// The behavior's name, used in logs.
    fn name(&self) -> &'static str {
        self.behavior_base().name()
    }

    /// Stop the behavior. Idempotent.
    fn remove(&mut self) {
        self.behavior_base_mut().remove();
    }

    /// Whether the behavior has been removed.
    fn is_removed(&self) -> bool {
        self.behavior_base().is_removed()
    }
}

static_assertions::assert_impl_all!(BehaviorBase: Send, Sync);

#[cfg(test)]
pub(crate) mod test_support {
    //! Items and elements backed by a fake document that tracks focus.

    use std::sync::Arc;

    use horizon_aria_core::{Binding, EventDispatcher, Property};
    use parking_lot::Mutex;

    use super::{ActiveDescendantItem, FocusableItem, ListItem, RovingTabindexItem};
    use crate::element::{Element, ElementRef};
    use crate::events::{FocusInEvent, FocusOutEvent, KeyDownEvent};

    /// Node 0 is the container; items are numbered from 1.
    #[derive(Default)]
    pub struct Document {
        focused: Mutex<Option<u32>>,
    }

    impl Document {
        pub fn focused(&self) -> Option<u32> {
            *self.focused.lock()
        }

        pub fn blur(&self) {
            *self.focused.lock() = None;
        }
    }

    pub struct TestElement {
        doc: Arc<Document>,
        node: u32,
    }

    impl Element for TestElement {
        fn focus(&self) {
            *self.doc.focused.lock() = Some(self.node);
        }

        fn contains_focus(&self) -> bool {
            match self.doc.focused() {
                Some(focused) => self.node == 0 || focused == self.node,
                None => false,
            }
        }
    }

    pub struct ItemInner {
        pub key: u32,
        pub disabled: Property<bool>,
        pub tabindex: Property<Option<i32>>,
        pub element: ElementRef,
    }

    #[derive(Clone)]
    pub struct TestItem(pub Arc<ItemInner>);

    impl PartialEq for TestItem {
        fn eq(&self, other: &Self) -> bool {
            self.0.key == other.0.key
        }
    }

    impl TestItem {
        pub fn set_disabled(&self, disabled: bool) {
            self.0.disabled.set(disabled);
        }

        pub fn tabindex_value(&self) -> Option<i32> {
            self.0.tabindex.get_untracked()
        }
    }

    impl ListItem for TestItem {
        type Identity = u32;

        fn identity(&self) -> u32 {
            self.0.key
        }

        fn is_disabled(&self) -> bool {
            self.0.disabled.get()
        }
    }

    impl FocusableItem for TestItem {
        fn tabindex(&self) -> &Property<Option<i32>> {
            &self.0.tabindex
        }
    }

    impl RovingTabindexItem for TestItem {
        fn element(&self) -> ElementRef {
            self.0.element.clone()
        }
    }

    impl ActiveDescendantItem for TestItem {
        fn dom_id(&self) -> String {
            format!("item-{}", self.0.key)
        }
    }

    /// Shared state for exercising behaviors directly.
    pub struct Fixture {
        pub doc: Arc<Document>,
        pub container: ElementRef,
        pub list: Property<Vec<TestItem>>,
        pub items: Binding<Vec<TestItem>>,
        pub active: Property<Option<u32>>,
        pub disabled: Property<bool>,
        pub tabindex: Property<Option<i32>>,
        pub keydown: EventDispatcher<KeyDownEvent>,
        pub focusin: EventDispatcher<FocusInEvent>,
        pub focusout: EventDispatcher<FocusOutEvent>,
    }

    impl Fixture {
        /// Items with keys `1..=count`, all enabled.
        pub fn new(count: u32) -> Self {
            let doc = Arc::new(Document::default());
            let container: ElementRef = Arc::new(TestElement {
                doc: doc.clone(),
                node: 0,
            });
            let list = Property::new(
                (1..=count)
                    .map(|key| {
                        TestItem(Arc::new(ItemInner {
                            key,
                            disabled: Property::new(false),
                            tabindex: Property::new(None),
                            element: Arc::new(TestElement {
                                doc: doc.clone(),
                                node: key,
                            }),
                        }))
                    })
                    .collect::<Vec<_>>(),
            );
            let items = list.read_only();
            Self {
                doc,
                container,
                list,
                items,
                active: Property::new(None),
                disabled: Property::new(false),
                tabindex: Property::new(None),
                keydown: EventDispatcher::new(),
                focusin: EventDispatcher::new(),
                focusout: EventDispatcher::new(),
            }
        }

        pub fn item(&self, key: u32) -> TestItem {
            self.list
                .with(|list| list.iter().find(|item| item.0.key == key).cloned())
                .unwrap()
        }

        pub fn remove_item(&self, key: u32) {
            self.list.update(|list| {
                list.iter()
                    .filter(|item| item.0.key != key)
                    .cloned()
                    .collect()
            });
        }

        pub fn press(&self, key: &str) -> bool {
            let mut event = KeyDownEvent::from_dom_key(key);
            self.keydown.dispatch(&mut event);
            event.is_default_prevented()
        }

        pub fn tabindexes(&self) -> Vec<Option<i32>> {
            self.list
                .with(|list| list.iter().map(|item| item.tabindex_value()).collect())
        }
    }
}
