//! Route groups: shared path prefixes and middleware.

use std::sync::Arc;

use http::Method;

use crate::error::RouterError;
use crate::handler::Handler;
use crate::route::Route;
use crate::router::{parse_methods, Router};

/// A collection of routes sharing a path prefix and middleware handlers.
///
/// Groups borrow the router mutably for the duration of registration, so
/// they are a setup-time construct only. Nested groups concatenate
/// prefixes and inherit the parent's middleware.
///
/// ```
/// use bramble::handler::handler;
/// use bramble::Router;
///
/// # fn main() -> Result<(), bramble::error::RouterError> {
/// let mut router = Router::new();
/// let mut api = router.group("/api");
/// api.get("/users/{id}", handler(|ctx| {
///     let id = ctx.param("id").unwrap_or("").to_owned();
///     ctx.text(http::StatusCode::OK, id);
///     Ok(())
/// }))?;
/// # Ok(())
/// # }
/// ```
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<Handler>,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: String, middleware: Vec<Handler>) -> Self {
        Self {
            router,
            prefix,
            middleware,
        }
    }

    /// Append a middleware handler applied to routes registered through
    /// this group from here on.
    pub fn use_middleware(&mut self, handler: Handler) {
        self.middleware.push(handler);
    }

    /// A subgroup with this group's prefix and middleware plus its own.
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        RouteGroup {
            router: &mut *self.router,
            prefix: format!("{}{}", self.prefix, prefix),
            middleware: self.middleware.iter().map(Arc::clone).collect(),
        }
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

    /// Register the same handler under multiple comma-separated methods,
    /// e.g. `to("GET,POST", "/login", handler)`.
    pub fn to(
        &mut self,
        methods: &str,
        path: &str,
        handler: Handler,
    ) -> Result<NamedRoute<'_>, RouterError> {
        let methods = parse_methods(methods)?;
        let route =
            self.router
                .register(&methods, &self.prefix, path, &self.middleware, &[handler])?;
        Ok(NamedRoute::new(self.router, route))
    }

    fn verb(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
    ) -> Result<NamedRoute<'_>, RouterError> {
        let route =
            self.router
                .register(&[method], &self.prefix, path, &self.middleware, &[handler])?;
        Ok(NamedRoute::new(self.router, route))
    }
}

/// Handle returned by route registration, giving access to the registry
/// entry and the option to re-register it under a custom name.
pub struct NamedRoute<'r> {
    router: &'r mut Router,
    route: Arc<Route>,
}

impl<'r> NamedRoute<'r> {
    pub(crate) fn new(router: &'r mut Router, route: Arc<Route>) -> Self {
        Self { router, route }
    }

    /// Move the route's registry entry from its default name (the
    /// registered pattern) to `name`, for reverse routing.
    pub fn name(self, name: &str) -> Arc<Route> {
        self.router.rename_route(&self.route, name)
    }

    #[must_use]
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn into_route(self) -> Arc<Route> {
        self.route
    }
}
