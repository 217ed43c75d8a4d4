//! Per-request context threaded through handler chains.

use std::collections::HashMap;

use serde_json::Value;

use crate::request::{Params, Request};
use crate::response::Response;

/// The state a request carries through the pipeline.
///
/// Handlers receive the context by value and hand it on through
/// [`Next::run`](crate::Next::run). The response starts out as 404 so a
/// request nobody handles falls through to "not found".
#[derive(Debug, Clone)]
pub struct Context {
    /// The request being handled.
    pub request: Request,
    /// The response being built.
    pub response: Response,
    state: HashMap<String, Value>,
}

impl Context {
    /// Creates a context for a request.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::default(),
            state: HashMap::new(),
        }
    }

    /// Returns the path parameters bound by the router.
    pub fn params(&self) -> &Params {
        &self.request.params
    }

    /// Shorthand for a named path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.params.get(name)
    }

    /// Replaces the response with a 200 plain-text body.
    pub fn text(&mut self, body: impl Into<String>) {
        self.response = Response::text(body);
    }

    /// Stores a value for later middleware or handlers.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.insert(key.into(), value.into());
    }

    /// Reads a stored value.
    pub fn state(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }
}

impl From<Request> for Context {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}
