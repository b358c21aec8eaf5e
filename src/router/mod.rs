//! Path matching and dispatch: per-method radix trees and the router
//! that owns them.

mod core;
mod tree;


pub(crate) use self::core::parse_methods;
pub use self::core::{RouteMatch, Router, METHODS};
pub use self::tree::{Tree, MAX_INLINE_PARAMS};
