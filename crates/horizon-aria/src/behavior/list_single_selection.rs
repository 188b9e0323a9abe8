//! Single selection in a list.

use std::marker::PhantomData;

use horizon_aria_core::logging::targets;
use horizon_aria_core::{Binding, Effect, EventDispatcher, Property};

use super::item::{ListItem, find_item};
use super::{Behavior, BehaviorBase};
use crate::events::KeyDownEvent;

/// Options for [`ListSingleSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSingleSelectionOptions {
    /// Whether the selection tracks the active item without a key press.
    pub selection_follows_focus: bool,
}

impl Default for ListSingleSelectionOptions {
    fn default() -> Self {
        Self {
            selection_follows_focus: true,
        }
    }
}

/// State shared with [`ListSingleSelection`].
#[derive(Clone)]
pub struct ListSingleSelectionState<T: ListItem> {
    /// The selected item.
    pub selected: Property<Option<T::Identity>>,
    /// Items in order.
    pub items: Binding<Vec<T>>,
    /// The active item. Never written by this behavior.
    pub active: Binding<Option<T::Identity>>,
    /// Key presses on the container.
    pub keydown_events: EventDispatcher<KeyDownEvent>,
    /// A disabled container blocks selection changes.
    pub disabled: Binding<bool>,
}

/// Keeps one item selected.
///
/// With `selection_follows_focus` the selection is whatever item is active,
/// as long as the active item may be selected. Otherwise Enter and Space
/// select the active item.
///
/// Selecting is blocked while the container is disabled, the selected item
/// is disabled, or the active item is disabled.
pub struct ListSingleSelection<T: ListItem> {
    base: BehaviorBase,
    can_select: Binding<bool>,
    options: ListSingleSelectionOptions,
    _item: PhantomData<fn() -> T>,
}

impl<T: ListItem> ListSingleSelection<T> {
    /// Attach single selection to `state`.
    pub fn new(state: ListSingleSelectionState<T>, options: ListSingleSelectionOptions) -> Self {
        let mut base = BehaviorBase::new("ListSingleSelection");

        let can_select = {
            let (items, selected, active, disabled) = (
                state.items.clone(),
                state.selected.clone(),
                state.active.clone(),
                state.disabled.clone(),
            );
            Binding::new(move || {
                if disabled.get() {
                    return false;
                }
                let (selected, active) = (selected.get(), active.get());
                items.with(|items| {
                    let blocked = |id: Option<&T::Identity>| {
                        find_item(items, id).is_some_and(|item| item.is_disabled())
                    };
                    !blocked(selected.as_ref()) && !blocked(active.as_ref())
                })
            })
        };

        if options.selection_follows_focus {
            base.add_effect({
                let (can_select, items, selected, active) = (
                    can_select.clone(),
                    state.items.clone(),
                    state.selected.clone(),
                    state.active.clone(),
                );
                Effect::new(move || {
                    let next = if can_select.get() {
                        active.get()
                    } else {
                        let current = selected.get();
                        items.with(|items| find_item(items, current.as_ref()).map(|item| item.identity()))
                    };
                    if selected.set(next.clone()) {
                        tracing::trace!(target: targets::BEHAVIOR, selected = ?next, "selection followed focus");
                    }
                })
            });
        } else {
            base.add_listener({
                let (can_select, selected, active, disabled) = (
                    can_select.clone(),
                    state.selected.clone(),
                    state.active.clone(),
                    state.disabled.clone(),
                );
                state.keydown_events.listen(move |event: &mut KeyDownEvent| {
                    if disabled.get() || !event.key.is_activation() {
                        return;
                    }
                    if can_select.get() {
                        let next = active.get();
                        tracing::trace!(target: targets::BEHAVIOR, selected = ?next, "selected active item");
                        selected.set(next);
                    }
                })
            });
        }

        Self {
            base,
            can_select,
            options,
            _item: PhantomData,
        }
    }

    /// The options this behavior was created with.
    pub fn options(&self) -> ListSingleSelectionOptions {
        self.options
    }

    /// Whether the active item may become the selection right now.
    pub fn can_select_active(&self) -> bool {
        self.can_select.get()
    }
}

impl<T: ListItem> Behavior for ListSingleSelection<T> {
    fn behavior_base(&self) -> &BehaviorBase {
        &self.base
    }

    fn behavior_base_mut(&mut self) -> &mut BehaviorBase {
        &mut self.base
    }
}
