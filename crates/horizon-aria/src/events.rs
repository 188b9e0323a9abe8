//! Input event types delivered to behaviors.
//!
//! The rendering layer translates native keyboard and focus events into
//! these types and forwards them to a widget's dispatchers. Handlers receive
//! the event mutably so they can call [`EventBase::prevent_default`]; the
//! rendering layer checks the flag afterwards and suppresses the native
//! default action.

/// Common data for all behavior events.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBase {
    default_prevented: bool,
}

impl EventBase {
    /// Create a new event base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the rendering layer to skip the native default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler called [`prevent_default`](Self::prevent_default).
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Logical keys, matching the DOM `KeyboardEvent.key` values behaviors react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,

    /// A printable character other than space.
    Character(char),

    /// A key with no mapping.
    Unknown,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` string.
    ///
    /// ```
    /// use horizon_aria::Key;
    ///
    /// assert_eq!(Key::from_dom_key("ArrowDown"), Key::ArrowDown);
    /// assert_eq!(Key::from_dom_key(" "), Key::Space);
    /// assert_eq!(Key::from_dom_key("a"), Key::Character('a'));
    /// assert_eq!(Key::from_dom_key("Home"), Key::Unknown);
    /// ```
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Unknown,
                }
            }
        }
    }

    /// Check if this key activates the current item (Enter or Space).
    pub fn is_activation(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// Key down event, forwarded from the container's native `keydown`.
#[derive(Debug, Clone)]
pub struct KeyDownEvent {
    /// Base event data.
    pub base: EventBase,
    /// The key that was pressed.
    pub key: Key,
}

impl KeyDownEvent {
    /// Create a key down event.
    pub fn new(key: Key) -> Self {
        Self {
            base: EventBase::new(),
            key,
        }
    }

    /// Create a key down event from a DOM `KeyboardEvent.key` string.
    pub fn from_dom_key(key: &str) -> Self {
        Self::new(Key::from_dom_key(key))
    }

    /// Shorthand for `self.base.prevent_default()`.
    pub fn prevent_default(&mut self) {
        self.base.prevent_default();
    }

    /// Shorthand for `self.base.is_default_prevented()`.
    pub fn is_default_prevented(&self) -> bool {
        self.base.is_default_prevented()
    }
}

/// Focus entered the container or one of its descendants.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusInEvent {
    /// Base event data.
    pub base: EventBase,
}

impl FocusInEvent {
    /// Create a new focus in event.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Focus left the container or one of its descendants.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusOutEvent {
    /// Base event data.
    pub base: EventBase,
    /// Focus moved to another node inside the same container.
    pub within: bool,
}

impl FocusOutEvent {
    /// Focus left the container entirely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus moved between nodes of the same container.
    pub fn within() -> Self {
        Self {
            within: true,
            ..Self::default()
        }
    }
}
