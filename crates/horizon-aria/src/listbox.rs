//! The listbox widget.
//!
//! A [`Listbox`] owns the container state and a list of [`ListboxOption`]s
//! and wires the behaviors together over them: key navigation, one focus
//! strategy and one selection strategy. The rendering layer forwards input
//! events through [`Listbox::keydown`], [`Listbox::focusin`] and
//! [`Listbox::focusout`] and reflects [`Listbox::host_attributes`] and
//! [`Listbox::option_attributes`] onto the document.
//!
//! # Example
//!
//! ```
//! use horizon_aria::{DetachedElement, IdGenerator, KeyDownEvent, Listbox, ListboxOption};
//!
//! let ids = IdGenerator::new("fruit");
//! let listbox = Listbox::new(DetachedElement::shared());
//! let options: Vec<_> = (0..3)
//!     .map(|_| ListboxOption::new(DetachedElement::shared(), &ids))
//!     .collect();
//! listbox.set_items(options.clone()).unwrap();
//!
//! listbox.keydown(&mut KeyDownEvent::from_dom_key("ArrowDown"));
//! assert_eq!(listbox.active().get(), Some(options[0].key()));
//! assert_eq!(listbox.selected().get(), Some(options[0].key()));
//! assert_eq!(
//!     listbox.host_attributes().aria_activedescendant.as_deref(),
//!     Some(options[0].id()),
//! );
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use horizon_aria_core::logging::targets;
use horizon_aria_core::{Binding, Effect, EventDispatcher, Property, untracked};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::behavior::{
    ActiveDescendantItem, AriaActiveDescendantState, Behavior, FocusStrategy, FocusableItem,
    ListItem, ListKeyNavigation, ListKeyNavigationOptions, ListKeyNavigationState,
    ListMultipleSelectionState, ListSingleSelectionOptions, ListSingleSelectionState,
    RovingTabindexItem, RovingTabindexState, SelectionStrategy,
};
use crate::element::ElementRef;
use crate::error::{ConfigError, ListboxError};
use crate::events::{FocusInEvent, FocusOutEvent, KeyDownEvent};
use crate::id::IdGenerator;
use crate::orientation::{Direction, Orientation};

// ============================================================================
// Options
// ============================================================================

/// Opaque identity of a [`ListboxOption`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionKey(u64);

impl OptionKey {
    /// Wrap a raw key value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw key value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One option of a listbox.
///
/// Options are shared as `Arc<ListboxOption>` between the listbox and the
/// rendering layer, which owns the `disabled` flag. The listbox writes
/// `tabindex`.
#[derive(Debug)]
pub struct ListboxOption {
    key: OptionKey,
    id: String,
    element: ElementRef,
    disabled: Property<bool>,
    tabindex: Property<Option<i32>>,
}

impl ListboxOption {
    /// Create an enabled option whose key and DOM id come from `ids`.
    pub fn new(element: ElementRef, ids: &IdGenerator) -> Arc<Self> {
        let (raw, id) = ids.next_pair();
        Arc::new(Self {
            key: OptionKey(raw),
            id,
            element,
            disabled: Property::new(false),
            tabindex: Property::new(None),
        })
    }

    /// The option's identity.
    pub fn key(&self) -> OptionKey {
        self.key
    }

    /// The option's DOM id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The option's element.
    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    /// The option's disabled flag.
    pub fn disabled(&self) -> &Property<bool> {
        &self.disabled
    }

    /// Enable or disable the option.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    /// The option's tabindex as written by the focus strategy.
    pub fn tabindex(&self) -> Option<i32> {
        self.tabindex.get()
    }
}

impl PartialEq for ListboxOption {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ListboxOption {}

impl ListItem for Arc<ListboxOption> {
    type Identity = OptionKey;

    fn identity(&self) -> OptionKey {
        self.key
    }

    fn is_disabled(&self) -> bool {
        self.disabled.get()
    }
}

impl FocusableItem for Arc<ListboxOption> {
    fn tabindex(&self) -> &Property<Option<i32>> {
        &self.tabindex
    }
}

impl RovingTabindexItem for Arc<ListboxOption> {
    fn element(&self) -> ElementRef {
        self.element.clone()
    }
}

impl ActiveDescendantItem for Arc<ListboxOption> {
    fn dom_id(&self) -> String {
        self.id.clone()
    }
}

/// Listbox configuration.
///
/// Missing keys take their defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListboxOptions {
    /// Whether arrow keys wrap past either end.
    pub wrap_key_navigation: bool,
    /// Keep focus on the container instead of moving it between options.
    pub use_active_descendant: bool,
    /// Whether single selection tracks the active option.
    pub selection_follows_focus: bool,
}

impl Default for ListboxOptions {
    fn default() -> Self {
        Self {
            wrap_key_navigation: false,
            use_active_descendant: true,
            selection_follows_focus: true,
        }
    }
}

impl ListboxOptions {
    /// These options with every key set in `partial` replaced.
    pub fn merge(self, partial: &PartialListboxOptions) -> Self {
        Self {
            wrap_key_navigation: partial
                .wrap_key_navigation
                .unwrap_or(self.wrap_key_navigation),
            use_active_descendant: partial
                .use_active_descendant
                .unwrap_or(self.use_active_descendant),
            selection_follows_focus: partial
                .selection_follows_focus
                .unwrap_or(self.selection_follows_focus),
        }
    }
}

/// A partial [`ListboxOptions`] record, as supplied by configuration.
///
/// ```
/// use horizon_aria::{ListboxOptions, PartialListboxOptions};
///
/// let partial = PartialListboxOptions::from_json(r#"{ "wrapKeyNavigation": true }"#).unwrap();
/// let options = partial.resolve();
/// assert!(options.wrap_key_navigation);
/// assert_eq!(options.use_active_descendant, ListboxOptions::default().use_active_descendant);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialListboxOptions {
    /// Overrides [`ListboxOptions::wrap_key_navigation`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_key_navigation: Option<bool>,
    /// Overrides [`ListboxOptions::use_active_descendant`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_active_descendant: Option<bool>,
    /// Overrides [`ListboxOptions::selection_follows_focus`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_follows_focus: Option<bool>,
}

impl PartialListboxOptions {
    /// Parse a JSON object.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a TOML table.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Merge over the defaults.
    pub fn resolve(&self) -> ListboxOptions {
        ListboxOptions::default().merge(self)
    }
}

/// How many options may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one option, in [`Listbox::selected`].
    #[default]
    Single,
    /// Any number of options, in [`Listbox::selected_values`].
    Multiple,
    /// Nothing is selectable.
    None,
}

// ============================================================================
// Attributes
// ============================================================================

/// Attributes the rendering layer reflects onto the listbox element.
///
/// Serializes with the attribute names as keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListboxAttributes {
    /// Always `"listbox"`.
    pub role: &'static str,
    /// The container's tabindex.
    pub tabindex: Option<i32>,
    /// Whether the listbox is disabled, directly or through its selection.
    pub disabled: bool,
    /// The layout axis.
    pub aria_orientation: Orientation,
    /// The DOM id of the active option under the active-descendant strategy.
    pub aria_activedescendant: Option<String>,
}

/// Attributes the rendering layer reflects onto one option element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionAttributes {
    /// Always `"option"`.
    pub role: &'static str,
    /// The option's DOM id.
    pub id: String,
    /// Whether the option is disabled.
    pub disabled: bool,
    /// The option's tabindex.
    pub tabindex: Option<i32>,
    /// `Some(true)` when selected, otherwise absent.
    pub aria_selected: Option<bool>,
    /// Whether the option is the active one. Usually reflected as a class.
    pub active: bool,
}

// ============================================================================
// Listbox
// ============================================================================

type OptionRef = Arc<ListboxOption>;

struct ListboxBehaviors {
    selection: SelectionStrategy<OptionRef>,
    navigation: ListKeyNavigation<OptionRef>,
    focus: FocusStrategy<OptionRef>,
}

impl ListboxBehaviors {
    fn names(&self) -> Vec<&'static str> {
        vec![self.selection.name(), self.navigation.name(), self.focus.name()]
    }

    fn remove(&mut self) {
        self.selection.remove();
        self.navigation.remove();
        self.focus.remove();
    }
}

/// Reactive handles the behaviors are built over.
#[derive(Clone)]
struct ListboxState {
    element: ElementRef,
    items: Property<Vec<OptionRef>>,
    active: Property<Option<OptionKey>>,
    selected: Property<Option<OptionKey>>,
    selected_values: Property<Vec<OptionKey>>,
    orientation: Property<Orientation>,
    direction: Property<Direction>,
    tabindex: Property<Option<i32>>,
    active_descendant_id: Property<Option<String>>,
    disabled_by_selection: Binding<bool>,
    keydown_events: EventDispatcher<KeyDownEvent>,
    focusin_events: EventDispatcher<FocusInEvent>,
    focusout_events: EventDispatcher<FocusOutEvent>,
}

impl ListboxState {
    fn build(&self, options: ListboxOptions, mode: SelectionMode) -> ListboxBehaviors {
        let items = self.items.read_only();
        let disabled = self.disabled_by_selection.clone();

        let selection = match mode {
            SelectionMode::Single => SelectionStrategy::single(
                ListSingleSelectionState {
                    selected: self.selected.clone(),
                    items: items.clone(),
                    active: self.active.read_only(),
                    keydown_events: self.keydown_events.clone(),
                    disabled: disabled.clone(),
                },
                ListSingleSelectionOptions {
                    selection_follows_focus: options.selection_follows_focus,
                },
            ),
            SelectionMode::Multiple => SelectionStrategy::multiple(ListMultipleSelectionState {
                selected: self.selected_values.clone(),
                items: items.clone(),
                active: self.active.read_only(),
                keydown_events: self.keydown_events.clone(),
                disabled: disabled.clone(),
            }),
            SelectionMode::None => SelectionStrategy::none(),
        };

        let navigation = ListKeyNavigation::new(
            ListKeyNavigationState {
                active: self.active.clone(),
                items: items.clone(),
                keydown_events: self.keydown_events.clone(),
                orientation: self.orientation.read_only(),
                direction: self.direction.read_only(),
                disabled: disabled.clone(),
            },
            ListKeyNavigationOptions {
                wrap: options.wrap_key_navigation,
            },
        );

        let focus = if options.use_active_descendant {
            FocusStrategy::active_descendant(AriaActiveDescendantState {
                element: self.element.clone(),
                active_descendant_id: self.active_descendant_id.clone(),
                tabindex: self.tabindex.clone(),
                active: self.active.clone(),
                items,
                focusin_events: self.focusin_events.clone(),
                disabled,
            })
        } else {
            self.active_descendant_id.set(None);
            FocusStrategy::roving_tabindex(RovingTabindexState {
                element: self.element.clone(),
                active: self.active.clone(),
                tabindex: self.tabindex.clone(),
                items,
                focusin_events: self.focusin_events.clone(),
                focusout_events: self.focusout_events.clone(),
                disabled,
            })
        };

        ListboxBehaviors {
            selection,
            navigation,
            focus,
        }
    }
}

/// A single- or multi-select list of options.
///
/// Configuration changes through [`set_options`](Self::set_options) or
/// [`set_selection_mode`](Self::set_selection_mode) tear down every behavior
/// and build fresh ones before any further event is handled.
pub struct Listbox {
    state: ListboxState,
    options: Property<ListboxOptions>,
    selection_mode: Property<SelectionMode>,
    disabled: Property<bool>,
    behaviors: Arc<Mutex<Option<ListboxBehaviors>>>,
    configure: Effect,
}

impl Listbox {
    /// Create a listbox with the default options and single selection.
    pub fn new(element: ElementRef) -> Self {
        Self::with_options(element, ListboxOptions::default())
    }

    /// Create a listbox with `options` and single selection.
    pub fn with_options(element: ElementRef, options: ListboxOptions) -> Self {
        let disabled = Property::new(false);
        let items: Property<Vec<OptionRef>> = Property::new(Vec::new());
        let selected = Property::new(None);
        let selection_mode = Property::new(SelectionMode::default());

        // Only a single selection locks the list. Leftover `selected` values
        // from an earlier single mode are ignored in the other modes.
        let disabled_by_selection = {
            let (disabled, items, selected, mode) = (
                disabled.clone(),
                items.clone(),
                selected.clone(),
                selection_mode.clone(),
            );
            Binding::new(move || {
                if disabled.get() {
                    return true;
                }
                if mode.get() != SelectionMode::Single {
                    return false;
                }
                let selected: Option<OptionKey> = selected.get();
                items.with(|items| {
                    items
                        .iter()
                        .find(|option| Some(option.key) == selected)
                        .is_some_and(|option| option.is_disabled())
                })
            })
        };

        let state = ListboxState {
            element,
            items,
            active: Property::new(None),
            selected,
            selected_values: Property::new(Vec::new()),
            orientation: Property::new(Orientation::default()),
            direction: Property::new(Direction::default()),
            tabindex: Property::new(None),
            active_descendant_id: Property::new(None),
            disabled_by_selection,
            keydown_events: EventDispatcher::new(),
            focusin_events: EventDispatcher::new(),
            focusout_events: EventDispatcher::new(),
        };
        let options = Property::new(options);
        let behaviors: Arc<Mutex<Option<ListboxBehaviors>>> = Arc::new(Mutex::new(None));

        let configure = {
            let (state, options, selection_mode, behaviors) = (
                state.clone(),
                options.clone(),
                selection_mode.clone(),
                behaviors.clone(),
            );
            Effect::new(move || {
                let (options, mode) = (options.get(), selection_mode.get());
                untracked(|| {
                    let mut slot = behaviors.lock();
                    if let Some(mut old) = slot.take() {
                        old.remove();
                    }
                    let fresh = state.build(options, mode);
                    tracing::debug!(
                        target: targets::LISTBOX,
                        ?options,
                        ?mode,
                        behaviors = ?fresh.names(),
                        "listbox configured"
                    );
                    *slot = Some(fresh);
                });
            })
        };

        Self {
            state,
            options,
            selection_mode,
            disabled,
            behaviors,
            configure,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The current options.
    pub fn options(&self) -> ListboxOptions {
        self.options.get()
    }

    /// Replace the options with `partial` merged over the defaults.
    pub fn set_options(&self, partial: PartialListboxOptions) {
        self.options.set(partial.resolve());
    }

    /// The selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode.get()
    }

    /// Switch between single, multiple and no selection.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        self.selection_mode.set(mode);
    }

    /// Names of the live behaviors, in creation order.
    pub fn behavior_names(&self) -> Vec<&'static str> {
        self.behaviors
            .lock()
            .as_ref()
            .map(ListboxBehaviors::names)
            .unwrap_or_default()
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// The options in order.
    pub fn items(&self) -> Vec<OptionRef> {
        self.state.items.get()
    }

    /// Replace the options.
    ///
    /// # Errors
    ///
    /// Returns [`ListboxError::DuplicateItem`] if an option appears twice.
    /// The current options are left unchanged.
    pub fn set_items(&self, items: Vec<OptionRef>) -> Result<(), ListboxError> {
        let mut seen = HashSet::with_capacity(items.len());
        if let Some(repeated) = items.iter().find(|option| !seen.insert(option.key)) {
            tracing::warn!(target: targets::LISTBOX, key = %repeated.key, "rejected duplicate option");
            return Err(ListboxError::DuplicateItem { key: repeated.key });
        }
        let count = items.len();
        if self.state.items.set(items) {
            tracing::debug!(target: targets::LISTBOX, count, "options replaced");
        }
        Ok(())
    }

    // =========================================================================
    // Reactive state
    // =========================================================================

    /// The active option.
    pub fn active(&self) -> &Property<Option<OptionKey>> {
        &self.state.active
    }

    /// The selected option in single-selection mode.
    pub fn selected(&self) -> &Property<Option<OptionKey>> {
        &self.state.selected
    }

    /// The selected options in multiple-selection mode, in selection order.
    pub fn selected_values(&self) -> &Property<Vec<OptionKey>> {
        &self.state.selected_values
    }

    /// Whether the listbox itself is disabled.
    pub fn disabled(&self) -> &Property<bool> {
        &self.disabled
    }

    /// The layout axis.
    pub fn orientation(&self) -> &Property<Orientation> {
        &self.state.orientation
    }

    /// The text direction.
    pub fn direction(&self) -> &Property<Direction> {
        &self.state.direction
    }

    /// Whether the listbox is disabled, directly or because the selected
    /// option is disabled.
    pub fn is_effectively_disabled(&self) -> bool {
        self.state.disabled_by_selection.get()
    }

    /// The container's tabindex.
    pub fn tabindex(&self) -> Option<i32> {
        self.state.tabindex.get()
    }

    /// The DOM id of the active option under the active-descendant strategy.
    pub fn active_descendant_id(&self) -> Option<String> {
        self.state.active_descendant_id.get()
    }

    /// Whether `option` is selected under the current selection mode.
    pub fn is_selected(&self, option: &ListboxOption) -> bool {
        match self.selection_mode.get() {
            SelectionMode::Single => self.state.selected.get() == Some(option.key),
            SelectionMode::Multiple => self
                .state
                .selected_values
                .with(|values| values.contains(&option.key)),
            SelectionMode::None => false,
        }
    }

    /// Attributes for the listbox element.
    pub fn host_attributes(&self) -> ListboxAttributes {
        ListboxAttributes {
            role: "listbox",
            tabindex: self.tabindex(),
            disabled: self.is_effectively_disabled(),
            aria_orientation: self.state.orientation.get(),
            aria_activedescendant: self.active_descendant_id(),
        }
    }

    /// Attributes for one option element.
    pub fn option_attributes(&self, option: &ListboxOption) -> OptionAttributes {
        OptionAttributes {
            role: "option",
            id: option.id.clone(),
            disabled: option.disabled.get(),
            tabindex: option.tabindex.get(),
            aria_selected: self.is_selected(option).then_some(true),
            active: self.state.active.get() == Some(option.key),
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Forward a key press on the listbox.
    pub fn keydown(&self, event: &mut KeyDownEvent) {
        self.state.keydown_events.dispatch(event);
    }

    /// Forward focus entering the listbox.
    pub fn focusin(&self, event: &mut FocusInEvent) {
        self.state.focusin_events.dispatch(event);
    }

    /// Forward focus leaving the listbox or moving within it.
    pub fn focusout(&self, event: &mut FocusOutEvent) {
        self.state.focusout_events.dispatch(event);
    }
}

impl Drop for Listbox {
    fn drop(&mut self) {
        self.configure.destroy();
        if let Some(mut behaviors) = self.behaviors.lock().take() {
            behaviors.remove();
        }
        tracing::debug!(target: targets::LISTBOX, "listbox dropped");
    }
}

impl fmt::Debug for Listbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listbox")
            .field("options", &self.options.get_untracked())
            .field("selection_mode", &self.selection_mode.get_untracked())
            .field("items", &self.state.items.get_untracked().len())
            .field("active", &self.state.active.get_untracked())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(ListboxOption: Send, Sync);
static_assertions::assert_impl_all!(Listbox: Send, Sync);
static_assertions::assert_impl_all!(OptionKey: Send, Sync, Copy);
