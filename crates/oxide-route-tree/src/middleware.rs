//! Handler units and their sequential composition.
//!
//! Every handler unit, whether a route handler, a before hook or a pipeline
//! middleware, has the same shape: it takes the request [`Context`] and a
//! [`Next`] continuation and returns the context once it is done. Calling
//! `next.run(ctx).await` suspends the unit until the rest of the chain has
//! finished, which gives the usual "code before / code after" structure:
//!
//! ```
//! use oxide_route_tree::{Context, Next};
//!
//! async fn timing(ctx: Context, next: Next) -> Context {
//!     // before the rest of the chain
//!     let ctx = next.run(ctx).await;
//!     // after the rest of the chain
//!     ctx
//! }
//! ```
//!
//! A unit that returns without calling `next.run` ends its chain there.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

pub use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::info;

use crate::context::Context;

/// A boxed async handler unit.
pub type Handler = Arc<dyn Fn(Context, Next) -> BoxFuture<'static, Context> + Send + Sync>;

/// Wraps an async function or closure into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    Arc::new(move |ctx: Context, next: Next| -> BoxFuture<'static, Context> {
        f(ctx, next).boxed()
    })
}

/// Composes handlers into one unit that runs them in order.
///
/// When the last handler calls `next.run`, control moves on to whatever
/// follows the composed unit.
pub fn compose(chain: Vec<Handler>) -> Handler {
    let chain: Arc<[Handler]> = chain.into();
    Arc::new(move |ctx: Context, next: Next| -> BoxFuture<'static, Context> {
        Next {
            chain: Arc::clone(&chain),
            index: 0,
            tail: Some(Box::new(next)),
        }
        .run(ctx)
    })
}

/// The remainder of a handler chain.
#[derive(Clone)]
pub struct Next {
    chain: Arc<[Handler]>,
    index: usize,
    tail: Option<Box<Next>>,
}

impl Next {
    /// A continuation with nothing left to run.
    pub fn end() -> Self {
        Self::chain(Vec::new())
    }

    /// A continuation that runs `chain` and then stops.
    pub fn chain(chain: Vec<Handler>) -> Self {
        Self {
            chain: chain.into(),
            index: 0,
            tail: None,
        }
    }

    /// Returns the number of handlers still to run in this chain,
    /// not counting whatever follows it.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }

    /// Resumes the chain with the next handler.
    pub fn run(self, ctx: Context) -> BoxFuture<'static, Context> {
        Box::pin(async move {
            match self.chain.get(self.index).cloned() {
                Some(current) => {
                    let next = Self {
                        chain: Arc::clone(&self.chain),
                        index: self.index + 1,
                        tail: self.tail,
                    };
                    current(ctx, next).await
                }
                None => match self.tail {
                    Some(tail) => tail.run(ctx).await,
                    None => ctx,
                },
            }
        })
    }
}

/// Conversion into an ordered handler chain.
pub trait IntoChain {
    /// Returns the handlers in execution order.
    fn into_chain(self) -> Vec<Handler>;
}

impl IntoChain for Handler {
    fn into_chain(self) -> Vec<Handler> {
        vec![self]
    }
}

impl IntoChain for Vec<Handler> {
    fn into_chain(self) -> Vec<Handler> {
        self
    }
}

impl<const N: usize> IntoChain for [Handler; N] {
    fn into_chain(self) -> Vec<Handler> {
        self.into()
    }
}

/// The host middleware stack a router is mounted into.
///
/// # Example
///
/// ```ignore
/// let app = Pipeline::new()
///     .middleware(logger())
///     .middleware(router.into_middleware())
///     .middleware(handler(fallback));
///
/// let ctx = app.handle(Request::get("/users")).await;
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    middleware: Vec<Handler>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware unit.
    #[must_use]
    pub fn middleware(mut self, mw: Handler) -> Self {
        self.middleware.push(mw);
        self
    }

    /// Returns the number of middleware units.
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Returns true if no middleware was added.
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Runs a request through every middleware unit.
    pub fn handle(&self, request: impl Into<Context>) -> BoxFuture<'static, Context> {
        compose(self.middleware.clone())(request.into(), Next::end())
    }
}

/// Middleware that logs every request once the rest of the pipeline is done.
pub fn logger() -> Handler {
    handler(|ctx: Context, next: Next| async move {
        let method = ctx.request.method.clone();
        let path = ctx.request.path.clone();
        let started = Instant::now();

        let ctx = next.run(ctx).await;

        info!(
            %method,
            %path,
            status = ctx.response.status,
            elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            "request handled"
        );
        ctx
    })
}
