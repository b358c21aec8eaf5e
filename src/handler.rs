//! Handler and handler-chain types.

use std::sync::Arc;

use crate::context::Context;
use crate::error::HttpError;

/// A request handler or middleware step.
///
/// Handlers run in registration order against a shared [`Context`]. A
/// middleware handler calls [`Context::next`] to run the rest of the chain
/// and inspects the context afterwards; an endpoint handler writes the
/// response and returns. Returning an [`HttpError`] short-circuits the
/// chain and becomes the response.
pub type Handler = Arc<dyn Fn(&mut Context<'_>) -> Result<(), HttpError> + Send + Sync>;

/// An immutable, shareable handler chain, stored once per route in the
/// routing tree.
pub type HandlerChain = Arc<[Handler]>;

/// Wrap a closure or function as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Context<'_>) -> Result<(), HttpError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Merge middleware handlers with route handlers into a single flat chain,
/// middleware first.
pub fn combine(front: &[Handler], back: &[Handler]) -> HandlerChain {
    front.iter().chain(back.iter()).map(Arc::clone).collect()
}
