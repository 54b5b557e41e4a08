//! Translation of classified slider movement into logical output actions.
//!
//! The [`EventDispatcher`] holds a small per-mode [`ActionTable`]; the
//! [`WindowSwitcher`] adds the held-modifier behaviour window cycling needs.

pub mod action;
pub mod dispatcher;
pub mod table;
pub mod window_switch;

pub use action::{Heading, Modifier, OutputAction, Toward};
pub use dispatcher::EventDispatcher;
pub use table::{ActionPair, ActionTable};
pub use window_switch::{WindowStep, WindowSwitcher};
