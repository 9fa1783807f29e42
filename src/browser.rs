//! The resource browser: list controller, reference picker, lazy tabbed
//! detail panel and action dialogs.
//!
//! Every component is a plain state machine owned by one view. Starting a
//! fetch returns a ticket-carrying request; the caller runs it against a
//! [`Gateway`](crate::gateway::Gateway) (usually through [`Dispatcher`]) and
//! hands the result back to `commit`. Only the most recently issued request
//! of a stream may commit; anything older is dropped as stale.

mod detail;
mod dialog;
mod dispatcher;
mod effects;
mod fetch_state;
mod list;
mod lookup;
mod picker;

pub use self::detail::*;
pub use self::dialog::*;
pub use self::dispatcher::*;
pub use self::effects::*;
pub use self::fetch_state::*;
pub use self::list::*;
pub use self::lookup::*;
pub use self::picker::*;
