//! # bramble
//!
//! A radix-tree HTTP router with inline parameters, optional and wildcard
//! tokens, and regex-constrained matching.
//!
//! bramble keeps one byte-level radix tree per HTTP method and matches
//! request paths against it without allocating: captured parameter values
//! are borrowed slices of the request path, and the scratch space used
//! while exploring competing branches lives on the stack for routes with
//! up to eight parameters.
//!
//! ## Patterns
//!
//! | Pattern                  | Matches                                      |
//! |--------------------------|----------------------------------------------|
//! | `/about/team`            | the literal path only                        |
//! | `/users/{id}`            | one segment, captured as `id`                |
//! | `/post/{id?}`            | `/post/42` and `/post`                       |
//! | `/files/{path*}`         | everything after `/files/`, slashes included |
//! | `/orders/{id:[0-9]+}`    | digit-only segments                          |
//! | `/page/{year}-{slug}`    | two captures inside one segment              |
//! | `/static/*`              | shorthand for an anonymous catch-all         |
//!
//! Literal routes always beat parametric ones; among overlapping
//! parametric routes, the one registered first wins.
//!
//! ## Quick start
//!
//! ```
//! use bramble::handler::handler;
//! use bramble::Router;
//! use http::{Method, StatusCode};
//!
//! # fn main() -> Result<(), bramble::RouterError> {
//! let mut router = Router::new();
//! router.get(
//!     "/hello/{name}",
//!     handler(|ctx| {
//!         let greeting = format!("hello, {}", ctx.param("name").unwrap_or("world"));
//!         ctx.text(StatusCode::OK, greeting);
//!         Ok(())
//!     }),
//! )?;
//!
//! let res = router.handle(&Method::GET, "/hello/rust");
//! assert_eq!(res.status, StatusCode::OK);
//! assert_eq!(res.body, b"hello, rust");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **[`router`]** - the [`Router`] and the per-method radix trees
//! - **[`group`]** - route groups with shared prefixes and middleware
//! - **[`context`]** - the per-request [`Context`] handlers run against
//! - **[`route`]** - named routes and reverse URL generation
//! - **[`handler`]** - handler and handler-chain types
//! - **[`error`]** - registration errors and handler-level HTTP errors
//! - **[`params`]** - pooled value buffers for owning transports
//!
//! ## Dispatch model
//!
//! The router is transport-agnostic: build it up front, then call
//! [`Router::handle`] with a method and path per request. Unmatched
//! requests run a fallback chain that answers 405 with a sorted `Allow`
//! header when the path exists under other methods, and 404 otherwise.
//! Registration is single-threaded; once built, the router only needs
//! `&self` and is safe to share across threads.

pub mod context;
pub mod error;
pub mod group;
pub mod handler;
pub mod params;
pub mod route;
pub mod router;

pub use context::{Context, Response};
pub use error::{HttpError, RouterError};
pub use group::{NamedRoute, RouteGroup};
pub use handler::{Handler, HandlerChain};
pub use params::{ParamGuard, ParamPool};
pub use route::Route;
pub use router::Router;
