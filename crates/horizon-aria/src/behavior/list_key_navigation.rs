//! Arrow-key navigation through a list.

use horizon_aria_core::logging::targets;
use horizon_aria_core::{Binding, EventDispatcher, Property};

use super::item::ListItem;
use super::{Behavior, BehaviorBase};
use crate::events::{Key, KeyDownEvent};
use crate::orientation::{Direction, Orientation};

/// Options for [`ListKeyNavigation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListKeyNavigationOptions {
    /// Whether moving past either end continues from the other end.
    pub wrap: bool,
}

/// State shared with [`ListKeyNavigation`].
#[derive(Clone)]
pub struct ListKeyNavigationState<T: ListItem> {
    /// The active item. Written on successful moves.
    pub active: Property<Option<T::Identity>>,
    /// Items in navigation order.
    pub items: Binding<Vec<T>>,
    /// Key presses on the container.
    pub keydown_events: EventDispatcher<KeyDownEvent>,
    /// Which arrow keys navigate.
    pub orientation: Binding<Orientation>,
    /// Swaps Left and Right when horizontal.
    pub direction: Binding<Direction>,
    /// A disabled container has no activatable items.
    pub disabled: Binding<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Next,
    Previous,
}

/// Moves the active item with the arrow keys.
///
/// Vertical lists respond to Up and Down, horizontal lists to Left and Right
/// (mirrored in right-to-left text). A move skips disabled items. When an
/// enabled item is found it becomes active and the key's default action is
/// prevented; otherwise nothing changes.
pub struct ListKeyNavigation<T: ListItem> {
    base: BehaviorBase,
    state: ListKeyNavigationState<T>,
    options: ListKeyNavigationOptions,
}

impl<T: ListItem> ListKeyNavigation<T> {
    /// Attach navigation to `state`.
    pub fn new(state: ListKeyNavigationState<T>, options: ListKeyNavigationOptions) -> Self {
        let mut base = BehaviorBase::new("ListKeyNavigation");
        let listener = {
            let state = state.clone();
            state
                .keydown_events
                .clone()
                .listen(move |event: &mut KeyDownEvent| handle_keydown(&state, options, event))
        };
        base.add_listener(listener);
        Self {
            base,
            state,
            options,
        }
    }

    /// The options this behavior was created with.
    pub fn options(&self) -> ListKeyNavigationOptions {
        self.options
    }

    /// Activate the next enabled item. Returns whether the active item changed.
    pub fn activate_next(&self) -> bool {
        !self.is_removed() && activate(&self.state, self.options.wrap, Step::Next)
    }

    /// Activate the previous enabled item. Returns whether the active item changed.
    pub fn activate_previous(&self) -> bool {
        !self.is_removed() && activate(&self.state, self.options.wrap, Step::Previous)
    }
}

impl<T: ListItem> Behavior for ListKeyNavigation<T> {
    fn behavior_base(&self) -> &BehaviorBase {
        &self.base
    }

    fn behavior_base_mut(&mut self) -> &mut BehaviorBase {
        &mut self.base
    }
}

fn handle_keydown<T: ListItem>(
    state: &ListKeyNavigationState<T>,
    options: ListKeyNavigationOptions,
    event: &mut KeyDownEvent,
) {
    let orientation = state.orientation.get();
    let rtl = state.direction.get() == Direction::Rtl;
    let step = match (event.key, orientation) {
        (Key::ArrowDown, Orientation::Vertical) => Step::Next,
        (Key::ArrowUp, Orientation::Vertical) => Step::Previous,
        (Key::ArrowRight, Orientation::Horizontal) if rtl => Step::Previous,
        (Key::ArrowRight, Orientation::Horizontal) => Step::Next,
        (Key::ArrowLeft, Orientation::Horizontal) if rtl => Step::Next,
        (Key::ArrowLeft, Orientation::Horizontal) => Step::Previous,
        _ => return,
    };
    if activate(state, options.wrap, step) {
        event.prevent_default();
    }
}

fn activate<T: ListItem>(state: &ListKeyNavigationState<T>, wrap: bool, step: Step) -> bool {
    if state.disabled.get() {
        return false;
    }
    let active = state.active.get();
    let target = state.items.with(|items| {
        let current = active
            .as_ref()
            .and_then(|id| items.iter().position(|item| item.identity() == *id));
        candidates(items.len(), current, step, wrap)
            .into_iter()
            .map(|index| &items[index])
            .find(|item| !item.is_disabled())
            .map(|item| item.identity())
    });
    let Some(target) = target else {
        tracing::trace!(target: targets::BEHAVIOR, ?step, "no item to activate");
        return false;
    };
    tracing::trace!(target: targets::BEHAVIOR, ?step, ?target, "activating item");
    state.active.set(Some(target));
    true
}

/// Indices to try, in order, when stepping from `current`.
///
/// Without an active item the scan starts at the boundary the step moves
/// away from. Every index is tried at most once.
fn candidates(len: usize, current: Option<usize>, step: Step, wrap: bool) -> Vec<usize> {
    match (current, step) {
        (None, Step::Next) => (0..len).collect(),
        (None, Step::Previous) => (0..len).rev().collect(),
        (Some(i), Step::Next) if wrap => (1..len).map(|k| (i + k) % len).collect(),
        (Some(i), Step::Next) => (i + 1..len).collect(),
        (Some(i), Step::Previous) if wrap => (1..len).map(|k| (i + len - k) % len).collect(),
        (Some(i), Step::Previous) => (0..i).rev().collect(),
    }
}
