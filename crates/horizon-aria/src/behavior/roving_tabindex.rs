//! Roving tabindex focus management.

use horizon_aria_core::logging::targets;
use horizon_aria_core::{Binding, Effect, EventDispatcher, Property};

use super::item::{RovingTabindexItem, find_item, first_enabled};
use super::{Behavior, BehaviorBase};
use crate::element::ElementRef;
use crate::events::{FocusInEvent, FocusOutEvent};

/// State shared with [`RovingTabindex`].
#[derive(Clone)]
pub struct RovingTabindexState<T: RovingTabindexItem> {
    /// The container element.
    pub element: ElementRef,
    /// The active item. Corrected whenever it stops being usable.
    pub active: Property<Option<T::Identity>>,
    /// The container's tabindex. Forced to `-1`.
    pub tabindex: Property<Option<i32>>,
    /// Items in order.
    pub items: Binding<Vec<T>>,
    /// Focus entering the container.
    pub focusin_events: EventDispatcher<FocusInEvent>,
    /// Focus leaving the container.
    pub focusout_events: EventDispatcher<FocusOutEvent>,
    /// A disabled container has no tab stop.
    pub disabled: Binding<bool>,
}

/// Makes the active item the container's only tab stop.
///
/// The active item gets `tabindex = 0`, every other item `-1`, and the
/// container itself `-1`. When the active item disappears or becomes
/// disabled, the first enabled item takes over. While focus is inside the
/// container it follows the active item.
pub struct RovingTabindex<T: RovingTabindexItem> {
    base: BehaviorBase,
    current: Binding<Option<T>>,
}

impl<T: RovingTabindexItem> RovingTabindex<T> {
    /// Attach roving tabindex to `state`.
    pub fn new(state: RovingTabindexState<T>) -> Self {
        let mut base = BehaviorBase::new("RovingTabindex");
        state.tabindex.set(Some(-1));

        // The active item if it is usable, else the first enabled one.
        let current = {
            let (items, active, disabled) =
                (state.items.clone(), state.active.clone(), state.disabled.clone());
            Binding::new(move || {
                let disabled = disabled.get();
                if disabled {
                    return None;
                }
                let active = active.get();
                items.with(|items| {
                    find_item(items, active.as_ref())
                        .filter(|item| !item.is_disabled())
                        .or_else(|| first_enabled(items, disabled))
                        .cloned()
                })
            })
        };

        base.add_effect({
            let (current, active) = (current.clone(), state.active.clone());
            // Also tracks `active`, so a direct write of an unusable key is undone.
            Effect::new(move || {
                let identity = current.with(|item| item.as_ref().map(|item| item.identity()));
                if active.get() != identity {
                    tracing::trace!(target: targets::BEHAVIOR, ?identity, "roving target moved");
                    active.set(identity);
                }
            })
        });

        base.add_effect({
            let (current, items) = (current.clone(), state.items.clone());
            Effect::new(move || {
                let target = current.with(|item| item.as_ref().map(|item| item.identity()));
                for item in items.get() {
                    let is_target = target.as_ref() == Some(&item.identity());
                    item.tabindex().set(Some(if is_target { 0 } else { -1 }));
                }
            })
        });

        base.add_effect({
            let (current, container) = (current.clone(), state.element.clone());
            Effect::new(move || {
                let element = current.with(|item| item.as_ref().map(|item| item.element()));
                if let Some(element) = element
                    && container.contains_focus()
                {
                    element.focus();
                }
            })
        });

        base.add_listener({
            let current = current.clone();
            state.focusin_events.listen(move |_: &mut FocusInEvent| {
                if let Some(item) = current.get() {
                    item.element().focus();
                }
            })
        });

        // Focus lost with an `active` that matches no item, e.g. the focused
        // item was removed earlier in the same batch.
        base.add_listener({
            let (active, items, disabled) =
                (state.active.clone(), state.items.clone(), state.disabled.clone());
            state.focusout_events.listen(move |event: &mut FocusOutEvent| {
                if event.within {
                    return;
                }
                let active = active.get();
                let recovery = items.with(|items| match find_item(items, active.as_ref()) {
                    Some(_) => None,
                    None => first_enabled(items, disabled.get()).cloned(),
                });
                if let Some(item) = recovery {
                    tracing::debug!(target: targets::BEHAVIOR, "focus recovered after losing active item");
                    item.element().focus();
                }
            })
        });

        Self { base, current }
    }

    /// The item that currently holds the tab stop.
    pub fn current_item(&self) -> Option<T> {
        self.current.get()
    }
}

impl<T: RovingTabindexItem> Behavior for RovingTabindex<T> {
    fn behavior_base(&self) -> &BehaviorBase {
        &self.base
    }

    fn behavior_base_mut(&mut self) -> &mut BehaviorBase {
        &mut self.base
    }
}
