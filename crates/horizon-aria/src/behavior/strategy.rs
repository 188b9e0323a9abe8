//! Interchangeable focus and selection behaviors.

use super::item::{ActiveDescendantItem, ListItem, RovingTabindexItem};
use super::{
    AriaActiveDescendant, AriaActiveDescendantState, Behavior, BehaviorBase, ListMultipleSelection,
    ListMultipleSelectionState, ListSingleSelection, ListSingleSelectionOptions,
    ListSingleSelectionState, RovingTabindex, RovingTabindexState,
};

/// The behavior that decides where focus lives.
pub enum FocusStrategy<T: RovingTabindexItem + ActiveDescendantItem> {
    /// Items take real focus in turn.
    RovingTabindex(RovingTabindex<T>),
    /// The container keeps focus and names the active item.
    ActiveDescendant(AriaActiveDescendant<T>),
}

impl<T: RovingTabindexItem + ActiveDescendantItem> FocusStrategy<T> {
    /// Create a roving tabindex strategy.
    pub fn roving_tabindex(state: RovingTabindexState<T>) -> Self {
        Self::RovingTabindex(RovingTabindex::new(state))
    }

    /// Create an active-descendant strategy.
    pub fn active_descendant(state: AriaActiveDescendantState<T>) -> Self {
        Self::ActiveDescendant(AriaActiveDescendant::new(state))
    }

    /// Whether this is the active-descendant strategy.
    pub fn uses_active_descendant(&self) -> bool {
        matches!(self, Self::ActiveDescendant(_))
    }
}

impl<T: RovingTabindexItem + ActiveDescendantItem> Behavior for FocusStrategy<T> {
    fn behavior_base(&self) -> &BehaviorBase {
        match self {
            Self::RovingTabindex(behavior) => behavior.behavior_base(),
            Self::ActiveDescendant(behavior) => behavior.behavior_base(),
        }
    }

    fn behavior_base_mut(&mut self) -> &mut BehaviorBase {
        match self {
            Self::RovingTabindex(behavior) => behavior.behavior_base_mut(),
            Self::ActiveDescendant(behavior) => behavior.behavior_base_mut(),
        }
    }
}

/// The behavior that maintains the selection, if any.
pub enum SelectionStrategy<T: ListItem> {
    /// No selection. Holds an empty base so it can be removed like the others.
    None(BehaviorBase),
    /// One selected item.
    Single(ListSingleSelection<T>),
    /// Any number of selected items.
    Multiple(ListMultipleSelection<T>),
}

impl<T: ListItem> SelectionStrategy<T> {
    /// A strategy that never selects anything.
    pub fn none() -> Self {
        Self::None(BehaviorBase::new("NoSelection"))
    }

    /// Create a single-selection strategy.
    pub fn single(state: ListSingleSelectionState<T>, options: ListSingleSelectionOptions) -> Self {
        Self::Single(ListSingleSelection::new(state, options))
    }

    /// Create a multiple-selection strategy.
    pub fn multiple(state: ListMultipleSelectionState<T>) -> Self {
        Self::Multiple(ListMultipleSelection::new(state))
    }

    /// Whether this strategy selects nothing.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None(_))
    }
}

impl<T: ListItem> Behavior for SelectionStrategy<T> {
    fn behavior_base(&self) -> &BehaviorBase {
        match self {
            Self::None(base) => base,
            Self::Single(behavior) => behavior.behavior_base(),
            Self::Multiple(behavior) => behavior.behavior_base(),
        }
    }

    fn behavior_base_mut(&mut self) -> &mut BehaviorBase {
        match self {
            Self::None(base) => base,
            Self::Single(behavior) => behavior.behavior_base_mut(),
            Self::Multiple(behavior) => behavior.behavior_base_mut(),
        }
    }
}
