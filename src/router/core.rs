//! Router core - per-method trees, the route registry, and dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use http::header::{self, HeaderValue};
use http::{Method, StatusCode};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, info, warn};

use crate::context::{Context, Response};
use crate::error::{HttpError, RouterError};
use crate::group::{NamedRoute, RouteGroup};
use crate::handler::{combine, Handler, HandlerChain};
use crate::params::ParamPool;
use crate::route::Route;

use super::tree::{Tree, MAX_INLINE_PARAMS};

/// The HTTP methods the router keeps trees for, in storage order.
pub const METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
];

fn method_index(method: &Method) -> Option<usize> {
    METHODS.iter().position(|m| m == method)
}

pub(crate) fn parse_methods(list: &str) -> Result<Vec<Method>, RouterError> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| {
            Method::from_bytes(m.as_bytes()).map_err(|_| RouterError::UnsupportedMethod {
                method: m.to_owned(),
            })
        })
        .collect()
}

/// The result of matching a request against the routing tables.
///
/// When nothing matched, `handlers` is the fallback chain, `pnames` is
/// empty, and `matched` is `false`.
pub struct RouteMatch<'r> {
    pub handlers: &'r HandlerChain,
    pub pnames: &'r [Arc<str>],
    pub matched: bool,
}

/// HTTP router with one radix tree per method, a named-route registry,
/// root middleware, and a configurable not-found fallback chain.
///
/// Registration happens single-threaded up front; once built, the router
/// is immutable and safe to share across threads (`&Router` is all a
/// dispatch needs).
pub struct Router {
    trees: [Option<Tree>; METHODS.len()],
    routes: HashMap<String, Arc<Route>>,
    middleware: Vec<Handler>,
    not_found: Vec<Handler>,
    not_found_chain: HandlerChain,
    max_params: usize,
}

impl Router {
    /// Create a router with the default fallback chain:
    /// method-not-allowed detection followed by a plain 404.
    #[must_use]
    pub fn new() -> Self {
        let not_found: Vec<Handler> = vec![
            Arc::new(method_not_allowed_fallback),
            Arc::new(not_found_fallback),
        ];
        let not_found_chain = combine(&[], &not_found);
        Self {
            trees: std::array::from_fn(|_| None),
            routes: HashMap::new(),
            middleware: Vec::new(),
            not_found,
            not_found_chain,
            max_params: 0,
        }
    }

    /// Register a prepared handler chain for a method and pattern.
    ///
    /// This is the raw entry point used by the verb methods and
    /// [`RouteGroup`]; it applies no prefix, no middleware, and creates no
    /// registry entry. Returns the pattern's parameter count.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnsupportedMethod`] for methods outside [`METHODS`],
    /// or any pattern error from the tree.
    pub fn add(
        &mut self,
        method: &Method,
        path: &str,
        handlers: HandlerChain,
    ) -> Result<usize, RouterError> {
        let idx = method_index(method).ok_or_else(|| RouterError::UnsupportedMethod {
            method: method.to_string(),
        })?;
        let tree = self.trees[idx].get_or_insert_with(|| {
            info!(method = %method, "created routing tree");
            Tree::new()
        });
        let count = tree.add(path, handlers)?;
        if count > self.max_params {
            self.max_params = count;
        }
        debug!(method = %method, path, params = count, "route registered");
        Ok(count)
    }

    /// Match a request, falling back to the not-found chain.
    ///
    /// Captured values are written into `pvalues`, which must hold at
    /// least [`Router::max_params`] slots.
    pub fn find<'p>(
        &self,
        method: &Method,
        path: &'p str,
        pvalues: &mut [&'p str],
    ) -> RouteMatch<'_> {
        if let Some(idx) = method_index(method) {
            if let Some(tree) = &self.trees[idx] {
                if let Some((handlers, pnames)) = tree.get(path, pvalues) {
                    debug!(method = %method, path, "route matched");
                    return RouteMatch {
                        handlers,
                        pnames,
                        matched: true,
                    };
                }
            }
        }
        warn!(method = %method, path, "no route matched, using fallback chain");
        RouteMatch {
            handlers: &self.not_found_chain,
            pnames: &[],
            matched: false,
        }
    }

    /// Methods for which a route matches `path`. An empty result means the
    /// path is unknown entirely (404 territory); a non-empty one means the
    /// method is what's wrong (405).
    #[must_use]
    pub fn find_allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut scratch: SmallVec<[&str; MAX_INLINE_PARAMS]> = smallvec![""; self.max_params];
        let mut allowed = Vec::new();
        for (idx, method) in METHODS.iter().enumerate() {
            if let Some(tree) = &self.trees[idx] {
                if tree.get(path, &mut scratch).is_some() {
                    allowed.push(method.clone());
                }
            }
        }
        allowed
    }

    /// Append a root middleware handler.
    ///
    /// Applies to routes registered afterwards and to the not-found
    /// chain, which is recombined immediately.
    pub fn use_middleware(&mut self, handler: Handler) {
        self.middleware.push(handler);
        self.rebuild_not_found();
    }

    /// Replace the user portion of the not-found fallback chain. Root
    /// middleware still runs in front of it.
    pub fn not_found(&mut self, handlers: Vec<Handler>) {
        self.not_found = handlers;
        self.rebuild_not_found();
    }

    fn rebuild_not_found(&mut self) {
        self.not_found_chain = combine(&self.middleware, &self.not_found);
    }

    /// Look up a registered route by name for reverse routing.
    #[must_use]
    pub fn route(&self, name: &str) -> Option<Arc<Route>> {
        self.routes.get(name).map(Arc::clone)
    }

    /// Largest parameter count across all registered routes; the minimum
    /// size for a caller-provided value buffer.
    #[must_use]
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// A buffer pool sized for this router's routes, for transports that
    /// need captured values to outlive the request path.
    #[must_use]
    pub fn param_pool(&self) -> ParamPool {
        ParamPool::new(self.max_params)
    }

    /// A registration group with the given path prefix and no middleware
    /// of its own.
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        RouteGroup::new(self, prefix.to_owned(), Vec::new())
    }

    pub fn get(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::GET, path, handler)
    }

    pub fn head(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::HEAD, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::POST, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::PUT, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::PATCH, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::DELETE, path, handler)
    }

    pub fn connect(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::CONNECT, path, handler)
    }

    pub fn options(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::OPTIONS, path, handler)
    }

    pub fn trace(&mut self, path: &str, handler: Handler) -> Result<NamedRoute<'_>, RouterError> {
        self.verb(Method::TRACE, path, handler)
    }

    /// Register the same handler for multiple comma-separated methods,
    /// e.g. `to("GET,POST", "/login", handler)`.
    pub fn to(
        &mut self,
        methods: &str,
        path: &str,
        handler: Handler,
    ) -> Result<NamedRoute<'_>, RouterError> {
        let methods = parse_methods(methods)?;
        let route = self.register(&methods, "", path, &[], &[handler])?;
        Ok(NamedRoute::new(self, route))
    }

    fn verb(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
    ) -> Result<NamedRoute<'_>, RouterError> {
        let route = self.register(&[method], "", path, &[], &[handler])?;
        Ok(NamedRoute::new(self, route))
    }

    /// Shared registration path for the router's verb methods and for
    /// groups: applies the prefix, rewrites a trailing bare `*` into an
    /// anonymous catch-all parameter, combines middleware with the route
    /// handlers, inserts into every requested method tree, and records
    /// the registry entry under the route's default name (the unrewritten
    /// pattern).
    pub(crate) fn register(
        &mut self,
        methods: &[Method],
        prefix: &str,
        path: &str,
        middleware: &[Handler],
        handlers: &[Handler],
    ) -> Result<Arc<Route>, RouterError> {
        let name = format!("{prefix}{path}");
        let pattern = match name.strip_suffix('*') {
            Some(head) => format!("{head}{{:.*}}"),
            None => name.clone(),
        };

        let mut front: Vec<Handler> = Vec::with_capacity(self.middleware.len() + middleware.len());
        front.extend(self.middleware.iter().map(Arc::clone));
        front.extend(middleware.iter().map(Arc::clone));
        let chain = combine(&front, handlers);

        for method in methods {
            self.add(method, &pattern, Arc::clone(&chain))?;
        }

        let route = Arc::new(Route::new(pattern, name));
        self.routes
            .insert(route.name().to_owned(), Arc::clone(&route));
        Ok(route)
    }

    pub(crate) fn rename_route(&mut self, route: &Arc<Route>, name: &str) -> Arc<Route> {
        self.routes.remove(route.name());
        let renamed = Arc::new(route.renamed(name));
        self.routes.insert(name.to_owned(), Arc::clone(&renamed));
        renamed
    }

    /// Dispatch a request end to end: match, run the handler chain, and
    /// assemble the response. This is the seam a transport calls once per
    /// request; it performs no I/O itself.
    ///
    /// Handler errors become plain-text responses carrying the error's
    /// status and message.
    #[must_use]
    pub fn handle(&self, method: &Method, path: &str) -> Response {
        let mut values: SmallVec<[&str; MAX_INLINE_PARAMS]> = smallvec![""; self.max_params];
        let matched = self.find(method, path, &mut values);
        let mut ctx = Context::new(
            self,
            method,
            path,
            matched.pnames,
            &values,
            &matched.handlers[..],
        );
        if let Err(err) = ctx.next() {
            debug!(method = %method, path, status = %err.status(), "handler returned error");
            ctx.apply_error(&err);
        }
        ctx.into_response()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal fallback: plain 404.
fn not_found_fallback(_ctx: &mut Context<'_>) -> Result<(), HttpError> {
    Err(HttpError::not_found())
}

/// First fallback step: when the path exists under other methods, answer
/// with an `Allow` header and either 200 (for OPTIONS probes) or 405.
/// When no method matches the path at all, defer to the next handler.
fn method_not_allowed_fallback(ctx: &mut Context<'_>) -> Result<(), HttpError> {
    let mut allowed = ctx.allowed_methods();
    if allowed.is_empty() {
        return Ok(());
    }
    if !allowed.contains(&Method::OPTIONS) {
        allowed.push(Method::OPTIONS);
    }
    allowed.sort_unstable_by(|a, b| a.as_str().cmp(b.as_str()));
    let joined = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&joined) {
        ctx.insert_header(header::ALLOW, value);
    }
    ctx.abort();
    if *ctx.method() == Method::OPTIONS {
        ctx.set_status(StatusCode::OK);
        Ok(())
    } else {
        Err(HttpError::method_not_allowed())
    }
}
