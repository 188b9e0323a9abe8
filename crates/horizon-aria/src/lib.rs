//! Horizon ARIA - accessible interaction behaviors for composite widgets.
//!
//! This crate implements the keyboard and focus semantics of WAI-ARIA
//! composite widgets independently of any renderer. Behaviors attach to
//! reactive state from [`horizon_aria_core`] and keep it consistent while
//! items come and go, get disabled, or move:
//!
//! - [`behavior::ListKeyNavigation`] moves the active item with arrow keys
//! - [`behavior::RovingTabindex`] and [`behavior::AriaActiveDescendant`]
//!   decide where focus lives
//! - [`behavior::ListSingleSelection`] and [`behavior::ListMultipleSelection`]
//!   maintain the selection
//!
//! [`Listbox`] composes them into a complete widget.
//!
//! # Example
//!
//! ```
//! use horizon_aria::prelude::*;
//!
//! let ids = IdGenerator::new("color");
//! let listbox = Listbox::new(DetachedElement::shared());
//! listbox.set_selection_mode(SelectionMode::Multiple);
//!
//! let options: Vec<_> = (0..3)
//!     .map(|_| ListboxOption::new(DetachedElement::shared(), &ids))
//!     .collect();
//! listbox.set_items(options.clone())?;
//!
//! listbox.active().set(Some(options[1].key()));
//! listbox.keydown(&mut KeyDownEvent::new(Key::Enter));
//! assert_eq!(listbox.selected_values().get(), vec![options[1].key()]);
//! # Ok::<(), horizon_aria::AriaError>(())
//! ```

pub mod behavior;
pub mod element;
mod error;
pub mod events;
pub mod id;
pub mod listbox;
pub mod orientation;
pub mod prelude;

pub use horizon_aria_core;

pub use element::{DetachedElement, Element, ElementRef};
pub use error::{AriaError, ConfigError, ListboxError, Result};
pub use events::{EventBase, FocusInEvent, FocusOutEvent, Key, KeyDownEvent};
pub use id::IdGenerator;
pub use listbox::{
    Listbox, ListboxAttributes, ListboxOption, ListboxOptions, OptionAttributes, OptionKey,
    PartialListboxOptions, SelectionMode,
};
pub use orientation::{Direction, Orientation};
