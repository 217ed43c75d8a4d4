//! A single node of the route tree.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::error::{Result, RouterError};
use crate::middleware::{Handler, IntoChain};
use crate::path::{PathPattern, PathSpec};
use crate::request::{Method, MethodKey, Params};

/// The outcome of a successful lookup.
#[derive(Clone)]
pub struct RouteMatch {
    /// Handlers to run, with the before hook first when the node has one.
    pub chain: Vec<Handler>,
    /// Bindings extracted from the path.
    pub params: Params,
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("chain", &self.chain.len())
            .field("params", &self.params)
            .finish()
    }
}

/// A path pattern with its per-method handlers, an optional before hook and
/// nested routes.
///
/// Nodes are created through [`Router::route`](crate::Router::route) and
/// [`RouteNode::nested`]. Registration methods return the node again so calls
/// can be chained:
///
/// ```
/// use oxide_route_tree::{Context, Next, Router, handler};
///
/// async fn show(ctx: Context, next: Next) -> Context {
///     next.run(ctx).await
/// }
///
/// # fn main() -> oxide_route_tree::Result<()> {
/// let mut router = Router::new();
/// router
///     .route("/users")?
///     .get(handler(show))?
///     .nested("/:id")?
///     .get(handler(show))?;
/// # Ok(())
/// # }
/// ```
pub struct RouteNode {
    pattern: PathPattern,
    handlers: HashMap<MethodKey, Vec<Handler>>,
    before: Option<Handler>,
    children: Vec<RouteNode>,
}

impl RouteNode {
    pub(crate) fn new(pattern: PathPattern) -> Self {
        Self {
            pattern,
            handlers: HashMap::new(),
            before: None,
            children: Vec::new(),
        }
    }

    /// Returns the path spec this node was built from.
    ///
    /// For nested nodes this is the parent's path spec joined with the
    /// child's.
    pub fn spec(&self) -> &PathSpec {
        self.pattern.spec()
    }

    /// Returns the compiled pattern.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the nested routes in registration order.
    pub fn children(&self) -> &[RouteNode] {
        &self.children
    }

    /// Returns true if a before hook is set.
    pub fn has_before(&self) -> bool {
        self.before.is_some()
    }

    /// Returns the method keys that have handlers.
    pub fn methods(&self) -> impl Iterator<Item = MethodKey> + '_ {
        self.handlers.keys().cloned()
    }

    /// Sets the handler chain for a method, replacing any earlier one.
    pub fn method(
        &mut self,
        key: impl Into<MethodKey>,
        handlers: impl IntoChain,
    ) -> Result<&mut Self> {
        let key = key.into();
        let chain = handlers.into_chain();
        if chain.is_empty() {
            return Err(RouterError::EmptyChain {
                method: key.to_string(),
                path: self.pattern.to_string(),
            });
        }

        debug!(
            method = %key,
            path = %self.pattern,
            handlers = chain.len(),
            "route handlers registered"
        );
        self.handlers.insert(key, chain);
        Ok(self)
    }

    /// Sets the GET handlers.
    pub fn get(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Get, handlers)
    }

    /// Sets the POST handlers.
    pub fn post(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Post, handlers)
    }

    /// Sets the PUT handlers.
    pub fn put(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Put, handlers)
    }

    /// Sets the PATCH handlers.
    pub fn patch(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Patch, handlers)
    }

    /// Sets the DELETE handlers.
    pub fn delete(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Delete, handlers)
    }

    /// Sets the HEAD handlers.
    pub fn head(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Head, handlers)
    }

    /// Sets the OPTIONS handlers.
    pub fn options(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Options, handlers)
    }

    /// Sets the CONNECT handlers.
    pub fn connect(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Connect, handlers)
    }

    /// Sets the TRACE handlers.
    pub fn trace(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(Method::Trace, handlers)
    }

    /// Sets the fallback handlers used for methods without their own chain.
    pub fn all(&mut self, handlers: impl IntoChain) -> Result<&mut Self> {
        self.method(MethodKey::All, handlers)
    }

    /// Sets the hook that runs ahead of this node's handlers.
    ///
    /// Nested routes copy the hook when they are created, so this only
    /// reaches children added after the call.
    pub fn before(&mut self, hook: Handler) -> &mut Self {
        debug!(path = %self.pattern, "before hook set");
        self.before = Some(hook);
        self
    }

    /// Adds a nested route and returns it.
    ///
    /// The child's pattern is this node's pattern followed by `spec`. It is
    /// only tried when this node's own pattern does not match.
    pub fn nested(&mut self, spec: impl Into<PathSpec>) -> Result<&mut RouteNode> {
        let mut child = RouteNode::new(self.pattern.concat(spec)?);
        child.before = self.before.clone();

        debug!(parent = %self.pattern, path = %child.pattern, "nested route registered");
        let index = self.children.len();
        self.children.push(child);
        Ok(&mut self.children[index])
    }

    /// Adds a nested route, configures it with `configure` and returns this
    /// node so sibling registrations can follow.
    pub fn nested_with<F>(
        &mut self,
        spec: impl Into<PathSpec>,
        configure: F,
    ) -> Result<&mut Self>
    where
        F: FnOnce(&mut RouteNode) -> Result<()>,
    {
        configure(self.nested(spec)?)?;
        Ok(self)
    }

    /// Looks up the handler chain for a request.
    ///
    /// Children are searched, in registration order, only when this node's
    /// own pattern fails. A matching pattern without handlers for the method
    /// or `ALL` is not a match.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        if !self.pattern.is_match(path) {
            return self
                .children
                .iter()
                .find_map(|child| child.match_route(method, path));
        }

        let Some(handlers) = self
            .handlers
            .get(&MethodKey::Verb(method.clone()))
            .or_else(|| self.handlers.get(&MethodKey::All))
        else {
            trace!(%method, path, route = %self.pattern, "no handlers for method");
            return None;
        };

        let params = self.pattern.match_path(path)?;
        let chain = self
            .before
            .iter()
            .chain(handlers)
            .cloned()
            .collect();
        Some(RouteMatch { chain, params })
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("pattern", &self.pattern.to_string())
            .field("methods", &self.handlers.keys().collect::<Vec<_>>())
            .field("before", &self.has_before())
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::context::Context;
    use crate::middleware::{Next, handler};
    use crate::request::Request;

    fn label(name: &'static str) -> Handler {
        handler(move |mut ctx: Context, next: Next| async move {
            let mut trail = ctx.state("trail").cloned().unwrap_or_else(|| json!([]));
            if let Some(items) = trail.as_array_mut() {
                items.push(json!(name));
            }
            ctx.set_state("trail", trail);
            next.run(ctx).await
        })
    }

    fn node(spec: &str) -> RouteNode {
        RouteNode::new(PathPattern::compile(spec).unwrap())
    }

    async fn run(found: RouteMatch) -> Vec<String> {
        let ctx = Next::chain(found.chain)
            .run(Context::new(Request::get("/")))
            .await;
        ctx.state("trail")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_specific_method_wins_over_all() {
        let mut users = node("/users");
        users.get(label("get")).unwrap().all(label("all")).unwrap();

        let found = users.match_route(&Method::Get, "/users").unwrap();
        assert_eq!(run(found).await, vec!["get"]);

        let found = users.match_route(&Method::Put, "/users").unwrap();
        assert_eq!(run(found).await, vec!["all"]);
    }

    #[tokio::test]
    async fn test_extension_method_handlers() {
        let purge: Method = "PURGE".parse().unwrap();
        let mut cache = node("/cache");
        cache.method(purge.clone(), label("purge")).unwrap();

        let found = cache.match_route(&"purge".parse().unwrap(), "/cache").unwrap();
        assert_eq!(run(found).await, vec!["purge"]);
        assert!(cache.match_route(&Method::Get, "/cache").is_none());
        assert_eq!(
            cache.methods().collect::<Vec<_>>(),
            vec![MethodKey::Verb(purge)]
        );
    }

    #[test]
    fn test_matched_pattern_without_method_is_no_match() {
        let mut users = node("/users");
        users.post(label("post")).unwrap();
        users.nested("").unwrap().get(label("child")).unwrap();

        assert!(users.match_route(&Method::Get, "/users").is_none());
    }

    #[tokio::test]
    async fn test_reregistering_replaces_chain() {
        let mut users = node("/users");
        users.get(label("first")).unwrap();
        users.get([label("second"), label("third")]).unwrap();

        let found = users.match_route(&Method::Get, "/users").unwrap();
        assert_eq!(run(found).await, vec!["second", "third"]);
    }

    #[test]
    fn test_empty_chain_names_path() {
        let mut users = node("/users");
        let err = users.get(Vec::<Handler>::new()).unwrap_err();
        assert!(matches!(
            &err,
            RouterError::EmptyChain { method, path } if method == "GET" && path == "/users"
        ));
        assert_eq!(err.to_string(), "no handlers given for GET on /users");
    }

    #[tokio::test]
    async fn test_nested_inherits_hook_snapshot() {
        let mut users = node("/users");
        users.get(label("list")).unwrap();
        users.before(label("hook-1"));
        users.nested("/:id").unwrap().get(label("show")).unwrap();
        users.before(label("hook-2"));
        users.nested("/:id/edit").unwrap().get(label("edit")).unwrap();

        let found = users.match_route(&Method::Get, "/users/7").unwrap();
        assert_eq!(found.params.get("id"), Some("7"));
        assert_eq!(run(found).await, vec!["hook-1", "show"]);

        let found = users.match_route(&Method::Get, "/users/7/edit").unwrap();
        assert_eq!(run(found).await, vec!["hook-2", "edit"]);

        let found = users.match_route(&Method::Get, "/users").unwrap();
        assert_eq!(run(found).await, vec!["hook-2", "list"]);
    }

    #[test]
    fn test_children_tried_in_registration_order() {
        let mut users = node("/users");
        users.nested("/:name").unwrap().get(label("by-name")).unwrap();
        users.nested("/admin").unwrap().get(label("admin")).unwrap();

        let found = users.match_route(&Method::Get, "/users/admin").unwrap();
        assert_eq!(found.params.get("name"), Some("admin"));
        assert_eq!(found.chain.len(), 1);
    }

    #[test]
    fn test_sibling_without_method_falls_through() {
        let mut users = node("/users");
        users.nested("/:name").unwrap().post(label("by-name")).unwrap();
        users.nested("/admin").unwrap().get(label("admin")).unwrap();

        let found = users.match_route(&Method::Get, "/users/admin").unwrap();
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_nested_with_returns_parent() {
        let mut users = node("/users");
        users
            .nested_with("/:id", |id| {
                id.get(label("show"))?;
                id.nested("/posts")?.get(label("posts"))?;
                Ok(())
            })
            .unwrap()
            .post(label("create"))
            .unwrap();

        assert_eq!(users.children().len(), 1);
        assert_eq!(users.children()[0].children().len(), 1);
        assert!(users.match_route(&Method::Post, "/users").is_some());
        assert!(users.match_route(&Method::Get, "/users/1/posts").is_some());
    }

    #[test]
    fn test_introspection() {
        let mut users = node("/users");
        users.get(label("a")).unwrap().all(label("b")).unwrap();
        users.before(label("hook"));

        let mut methods: Vec<_> = users.methods().map(|m| m.to_string()).collect();
        methods.sort();
        assert_eq!(methods, vec!["ALL", "GET"]);
        assert!(users.has_before());
        assert_eq!(users.spec(), &PathSpec::from("/users"));
        assert!(format!("{users:?}").contains("/users"));
    }
}
