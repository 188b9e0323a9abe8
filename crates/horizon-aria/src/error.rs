//! Error types for Horizon ARIA widgets.

use horizon_aria_core::ReactiveError;

use crate::listbox::OptionKey;

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, AriaError>;

/// The main error type for Horizon ARIA operations.
#[derive(Debug, thiserror::Error)]
pub enum AriaError {
    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A listbox rejected an operation.
    #[error("listbox error: {0}")]
    Listbox(#[from] ListboxError),
    /// The reactive runtime failed to settle.
    #[error("reactive error: {0}")]
    Reactive(#[from] ReactiveError),
}

/// Errors raised while reading widget options from text.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input was not valid JSON for the options record.
    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),
    /// The input was not valid TOML for the options record.
    #[error("invalid TOML options: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors raised by [`Listbox`](crate::Listbox) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListboxError {
    /// The same option appeared twice in one item list.
    #[error("option {key} appears more than once in the item list")]
    DuplicateItem {
        /// Identity of the repeated option.
        key: OptionKey,
    },
}
