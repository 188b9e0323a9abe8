//! Virtual focus through `aria-activedescendant`.

use std::marker::PhantomData;

use horizon_aria_core::logging::targets;
use horizon_aria_core::{Binding, Effect, EventDispatcher, Property};

use super::item::{ActiveDescendantItem, find_item};
use super::{Behavior, BehaviorBase};
use crate::element::ElementRef;
use crate::events::FocusInEvent;

/// State shared with [`AriaActiveDescendant`].
#[derive(Clone)]
pub struct AriaActiveDescendantState<T: ActiveDescendantItem> {
    /// The container element. It keeps DOM focus.
    pub element: ElementRef,
    /// Receives the DOM id of the active item.
    pub active_descendant_id: Property<Option<String>>,
    /// The container's tabindex.
    pub tabindex: Property<Option<i32>>,
    /// The active item. Cleared when it points at a disabled or missing item.
    pub active: Property<Option<T::Identity>>,
    /// Items in order.
    pub items: Binding<Vec<T>>,
    /// Focus entering the container.
    pub focusin_events: EventDispatcher<FocusInEvent>,
    /// A disabled container is not focusable and has no active descendant.
    pub disabled: Binding<bool>,
}

/// Keeps focus on the container and announces the active item by id.
///
/// The container is the tab stop (`tabindex = 0`) unless it is disabled or
/// every item is disabled. Items are never tab stops. The container's
/// `aria-activedescendant` names the active item.
pub struct AriaActiveDescendant<T: ActiveDescendantItem> {
    base: BehaviorBase,
    active_descendant_id: Binding<Option<String>>,
    _item: PhantomData<fn() -> T>,
}

impl<T: ActiveDescendantItem> AriaActiveDescendant<T> {
    /// Attach active-descendant focus handling to `state`.
    pub fn new(state: AriaActiveDescendantState<T>) -> Self {
        let mut base = BehaviorBase::new("AriaActiveDescendant");

        if state.element.contains_focus() {
            state.element.focus();
        }

        let tabindex = {
            let (items, disabled) = (state.items.clone(), state.disabled.clone());
            Binding::new(move || {
                let unfocusable =
                    disabled.get() || items.with(|items| items.iter().all(|item| item.is_disabled()));
                if unfocusable { -1 } else { 0 }
            })
        };

        let active_descendant_id = {
            let (items, active, disabled) =
                (state.items.clone(), state.active.clone(), state.disabled.clone());
            Binding::new(move || {
                if disabled.get() {
                    return None;
                }
                let active = active.get();
                items.with(|items| find_item(items, active.as_ref()).map(|item| item.dom_id()))
            })
        };

        base.add_effect({
            let (tabindex, target) = (tabindex.clone(), state.tabindex.clone());
            Effect::new(move || {
                target.set(Some(tabindex.get()));
            })
        });

        base.add_effect({
            let (id, target) = (active_descendant_id.clone(), state.active_descendant_id.clone());
            Effect::new(move || {
                let id = id.get();
                tracing::trace!(target: targets::BEHAVIOR, ?id, "active descendant");
                target.set(id);
            })
        });

        base.add_effect({
            let (items, active) = (state.items.clone(), state.active.clone());
            Effect::new(move || {
                let current = active.get();
                let corrected = items.with(|items| {
                    find_item(items, current.as_ref())
                        .filter(|item| !item.is_disabled())
                        .map(|item| item.identity())
                });
                active.set(corrected);
            })
        });

        base.add_effect({
            let items = state.items.clone();
            Effect::new(move || {
                for item in items.get() {
                    item.tabindex().set(Some(-1));
                }
            })
        });

        base.add_listener({
            let element = state.element.clone();
            state
                .focusin_events
                .listen(move |_: &mut FocusInEvent| element.focus())
        });

        Self {
            base,
            active_descendant_id,
            _item: PhantomData,
        }
    }

    /// The DOM id of the active item, if any.
    pub fn active_descendant_id(&self) -> Option<String> {
        self.active_descendant_id.get()
    }
}

impl<T: ActiveDescendantItem> Behavior for AriaActiveDescendant<T> {
    fn behavior_base(&self) -> &BehaviorBase {
        &self.base
    }

    fn behavior_base_mut(&mut self) -> &mut BehaviorBase {
        &mut self.base
    }
}
