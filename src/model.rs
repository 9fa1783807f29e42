//! Data model shared by the gateway, the browser core and the front-ends.

mod catalog;
mod config;
mod filters;
mod ids;
mod paging;
mod record;

pub use self::catalog::*;
pub use self::config::*;
pub use self::filters::*;
pub use self::ids::*;
pub use self::paging::*;
pub use self::record::*;
