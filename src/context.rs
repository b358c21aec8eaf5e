//! Per-request context driving handler-chain execution.
//!
//! A [`Context`] is built by [`Router::handle`](crate::router::Router::handle)
//! after route matching and handed to every handler in the matched chain.
//! It borrows the request data and the captured parameter values (slices of
//! the request path, never copies) and accumulates the response parts.
//!
//! This is deliberately a thin boundary object: no query or form parsing,
//! no content negotiation, no body decoding. A transport embedding the
//! router layers its own richer request type on top.

use std::fmt::Display;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};

use crate::error::HttpError;
use crate::handler::Handler;
use crate::router::Router;

/// The response assembled by a handler chain.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

/// Request state and response builder shared by the handlers of one
/// dispatch.
pub struct Context<'r> {
    router: &'r Router,
    method: &'r Method,
    path: &'r str,
    pnames: &'r [Arc<str>],
    pvalues: &'r [&'r str],
    chain: &'r [Handler],
    cursor: usize,
    aborted: bool,
    response: Response,
}

impl<'r> Context<'r> {
    pub(crate) fn new(
        router: &'r Router,
        method: &'r Method,
        path: &'r str,
        pnames: &'r [Arc<str>],
        pvalues: &'r [&'r str],
        chain: &'r [Handler],
    ) -> Self {
        Self {
            router,
            method,
            path,
            pnames,
            pvalues,
            chain,
            cursor: 0,
            aborted: false,
            response: Response::default(),
        }
    }

    /// Run the remaining handlers in the chain.
    ///
    /// Middleware calls this to hand control to the next handler and
    /// regains it once the rest of the chain has finished. The first
    /// handler error stops execution and propagates out.
    pub fn next(&mut self) -> Result<(), HttpError> {
        while self.cursor < self.chain.len() && !self.aborted {
            let handler = Arc::clone(&self.chain[self.cursor]);
            self.cursor += 1;
            handler(self)?;
        }
        Ok(())
    }

    /// Stop the chain: handlers not yet run are skipped, including after
    /// the current middleware's `next()` returns.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.path
    }

    /// Look up a captured path parameter by name.
    ///
    /// When the same name appears at several depths the innermost capture
    /// wins.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.pnames
            .iter()
            .zip(self.pvalues)
            .rfind(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| *v)
    }

    /// Parameter names of the matched route, in path order.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        self.pnames
    }

    /// Build a URL for a named route, substituting the given parameter
    /// values. `None` when no route is registered under `name`.
    pub fn url<'a, I, V>(&self, name: &str, pairs: I) -> Option<String>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        self.router.route(name).map(|r| r.url(pairs))
    }

    /// HTTP methods that have a route matching this request's path.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.router.find_allowed_methods(self.path)
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.response.status = status;
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.headers.insert(name, value);
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response.headers
    }

    /// Write a plain-text response body with the given status.
    pub fn text(&mut self, status: StatusCode, body: impl Into<String>) {
        self.response.status = status;
        self.response.body = body.into().into_bytes();
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.response.body = body;
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.response.body
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }

    pub(crate) fn apply_error(&mut self, err: &HttpError) {
        self.response.status = err.status();
        self.response.body = err.message().as_bytes().to_vec();
    }
}
