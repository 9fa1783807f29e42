//! Back-office console: paginated resource browsers over a remote API.
//!
//! The interesting part lives in [`browser`]: list controllers, debounced
//! reference pickers, lazily loaded detail panels and mutation dialogs, all
//! guarded against out-of-order responses. [`gateway`] is the only I/O
//! boundary; [`tui`] and the `backoffice` binary are thin front-ends.

pub mod browser;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod tui;

mod tui_shell;
