//! Multiple selection in a list.

use horizon_aria_core::logging::targets;
use horizon_aria_core::{Binding, EventDispatcher, Property};

use super::item::{ListItem, find_item};
use super::{Behavior, BehaviorBase};
use crate::events::KeyDownEvent;

/// State shared with [`ListMultipleSelection`].
#[derive(Clone)]
pub struct ListMultipleSelectionState<T: ListItem> {
    /// Selected items in the order they were selected.
    pub selected: Property<Vec<T::Identity>>,
    /// Items in order.
    pub items: Binding<Vec<T>>,
    /// The active item. Never written by this behavior.
    pub active: Binding<Option<T::Identity>>,
    /// Key presses on the container.
    pub keydown_events: EventDispatcher<KeyDownEvent>,
    /// A disabled container blocks selection changes.
    pub disabled: Binding<bool>,
}

/// Enter and Space toggle the active item in the selection.
///
/// A newly selected item is appended; a deselected one is removed without
/// disturbing the order of the rest. Nothing happens while the container or
/// the active item is disabled.
pub struct ListMultipleSelection<T: ListItem> {
    base: BehaviorBase,
    state: ListMultipleSelectionState<T>,
}

impl<T: ListItem> ListMultipleSelection<T> {
    /// Attach multiple selection to `state`.
    pub fn new(state: ListMultipleSelectionState<T>) -> Self {
        let mut base = BehaviorBase::new("ListMultipleSelection");
        base.add_listener({
            let state = state.clone();
            state
                .keydown_events
                .clone()
                .listen(move |event: &mut KeyDownEvent| {
                    if event.key.is_activation() {
                        toggle_active(&state);
                    }
                })
        });
        Self { base, state }
    }

    /// Toggle the active item as Enter would. Returns whether the selection changed.
    pub fn toggle_active(&self) -> bool {
        !self.is_removed() && toggle_active(&self.state)
    }
}

impl<T: ListItem> Behavior for ListMultipleSelection<T> {
    fn behavior_base(&self) -> &BehaviorBase {
        &self.base
    }

    fn behavior_base_mut(&mut self) -> &mut BehaviorBase {
        &mut self.base
    }
}

fn toggle_active<T: ListItem>(state: &ListMultipleSelectionState<T>) -> bool {
    if state.disabled.get() {
        return false;
    }
    let Some(active) = state.active.get() else {
        return false;
    };
    let active_disabled = state
        .items
        .with(|items| find_item(items, Some(&active)).is_some_and(|item| item.is_disabled()));
    if active_disabled {
        return false;
    }

    let mut selected = state.selected.get();
    match selected.iter().position(|id| *id == active) {
        Some(index) => {
            selected.remove(index);
            tracing::trace!(target: targets::BEHAVIOR, ?active, "deselected item");
        }
        None => {
            tracing::trace!(target: targets::BEHAVIOR, ?active, "selected item");
            selected.push(active);
        }
    }
    state.selected.set(selected)
}
