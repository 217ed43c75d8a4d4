//! # oxide-route-tree
//!
//! Nested path routing for async middleware pipelines.
//!
//! This crate provides:
//! - Path templates with named parameters, or precompiled regexes
//! - Per-method handler chains with an `ALL` fallback
//! - Nested routes that extend their parent's pattern
//! - Before hooks that run ahead of a route's handlers
//! - A `defer` mode that runs downstream middleware before the route
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_route_tree::{Context, Next, Pipeline, Request, Router, handler};
//!
//! async fn list_users(mut ctx: Context, next: Next) -> Context {
//!     ctx.text("all users");
//!     next.run(ctx).await
//! }
//!
//! async fn show_user(mut ctx: Context, next: Next) -> Context {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     ctx.text(id);
//!     next.run(ctx).await
//! }
//!
//! let mut router = Router::new();
//! let users = router.route("/users")?;
//! users.get(handler(list_users))?;
//! users.nested("/:id")?.get(handler(show_user))?;
//!
//! let app = Pipeline::new().middleware(router.into_middleware());
//! let ctx = app.handle(Request::get("/users/42")).await;
//! ```
//!
//! ## Path Parameters
//!
//! Templates use `:name` segments. Bindings are available on the context
//! before any route handler runs:
//!
//! ```ignore
//! router.route("/posts/:post_id/comments/:comment_id")?.get(handler(show));
//!
//! async fn show(ctx: Context, next: Next) -> Context {
//!     let post_id = ctx.param("post_id");
//!     // ...
//! }
//! ```
//!
//! A [`Regex`] can be registered instead of a template. It has no parameter
//! names, so its groups are exposed by position through [`Params::at`].
//!
//! ## Matching Order
//!
//! Root routes are tried in registration order. A route whose pattern fails
//! hands the path to its nested routes, again in registration order. The
//! first route whose pattern matches the whole path and which has handlers
//! for the method, or for `ALL`, wins. A matching pattern without such
//! handlers counts as no match, so the request falls through as not found.
//!
//! ## Before Hooks
//!
//! ```ignore
//! let admin = router.route("/admin")?;
//! admin.before(handler(require_login));
//! admin.nested("/stats")?.get(handler(stats))?; // runs require_login first
//! ```
//!
//! Nested routes copy their parent's hook when they are created.
//!
//! ## Defer Mode
//!
//! ```ignore
//! let router = Router::with_options(RouterOptions { defer: true });
//! ```
//!
//! With `defer` set, a matched request first runs every middleware mounted
//! after the router and only then the route's handlers.

mod context;
mod error;
mod middleware;
mod node;
mod path;
mod request;
mod response;
mod router;

pub use context::Context;
pub use error::{Result, RouterError};
pub use middleware::{
    BoxFuture, Handler, IntoChain, Next, Pipeline, compose, handler, logger,
};
pub use node::{RouteMatch, RouteNode};
pub use path::{PathPattern, PathSpec};
pub use regex::Regex;
pub use request::{ExtensionMethod, Method, MethodKey, Params, PathParams, Request};
pub use response::Response;
pub use router::{Router, RouterOptions};
