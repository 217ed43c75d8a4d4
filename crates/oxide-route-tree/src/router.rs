//! Main router implementation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::Context;
use crate::error::{Result, RouterError};
use crate::middleware::{Handler, Next, handler};
use crate::node::{RouteMatch, RouteNode};
use crate::path::{PathPattern, PathSpec};
use crate::request::Method;

/// Router configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Run the downstream middleware before the matched route's handlers.
    pub defer: bool,
}

/// The registry of root routes.
///
/// Routes are registered up front and the router is then mounted into a
/// [`Pipeline`](crate::Pipeline) with [`Router::into_middleware`]. Root
/// routes are tried in registration order and the first match wins.
pub struct Router {
    /// Root routes, in registration order.
    routes: Vec<RouteNode>,
    options: RouterOptions,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new empty router with default options.
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    /// Creates a new empty router.
    pub fn with_options(options: RouterOptions) -> Self {
        Self {
            routes: Vec::new(),
            options,
        }
    }

    /// Returns the router configuration.
    pub fn options(&self) -> RouterOptions {
        self.options
    }

    /// Returns the root routes in registration order.
    pub fn routes(&self) -> &[RouteNode] {
        &self.routes
    }

    /// Registers a root route and returns it for further configuration.
    ///
    /// Fails if a root route with the same path spec exists or the
    /// path spec does not compile.
    pub fn route(&mut self, spec: impl Into<PathSpec>) -> Result<&mut RouteNode> {
        let spec = spec.into();
        if self.routes.iter().any(|route| route.spec() == &spec) {
            return Err(RouterError::DuplicatePath {
                path: spec.to_string(),
            });
        }

        let pattern = PathPattern::compile(spec)?;
        debug!(path = %pattern, "route registered");
        let index = self.routes.len();
        self.routes.push(RouteNode::new(pattern));
        Ok(&mut self.routes[index])
    }

    /// Finds the handler chain and bindings for a request.
    pub fn dispatch(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.routes
            .iter()
            .find_map(|route| route.match_route(method, path))
    }

    /// Turns the router into a single pipeline middleware unit.
    pub fn into_middleware(self) -> Handler {
        let router = Arc::new(self);
        handler(move |ctx: Context, next: Next| {
            let router = Arc::clone(&router);
            async move { router.handle(ctx, next).await }
        })
    }

    /// Runs a request through the router.
    ///
    /// On a match the bindings are stored on the request first. The route's
    /// chain then runs to completion before `next`, or after it when
    /// [`RouterOptions::defer`] is set. Without a match only `next` runs.
    pub async fn handle(&self, mut ctx: Context, next: Next) -> Context {
        let method = ctx.request.method.clone();
        let Some(RouteMatch { chain, params }) = self.dispatch(&method, &ctx.request.path) else {
            debug!(%method, path = %ctx.request.path, "no route matched");
            return next.run(ctx).await;
        };

        debug!(
            %method,
            path = %ctx.request.path,
            handlers = chain.len(),
            defer = self.options.defer,
            "route matched"
        );
        ctx.request.params = params;
        let route = Next::chain(chain);

        if self.options.defer {
            let ctx = next.run(ctx).await;
            route.run(ctx).await
        } else {
            let ctx = route.run(ctx).await;
            next.run(ctx).await
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("options", &self.options)
            .finish()
    }
}
