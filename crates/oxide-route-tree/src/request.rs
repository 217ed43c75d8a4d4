//! Request-side types: method tokens, parameter bindings and the request value.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::RouterError;

/// HTTP request methods.
///
/// The standard methods have their own variants. Any other valid token, such
/// as `PURGE` or `M-SEARCH`, parses into [`Method::Other`] so it can still be
/// routed, either through [`RouteNode::method`](crate::RouteNode::method) or
/// the `ALL` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
    /// CONNECT method
    Connect,
    /// TRACE method
    Trace,
    /// An extension method, upper-cased.
    Other(ExtensionMethod),
}

impl Method {
    /// The methods with a dedicated variant.
    pub const STANDARD: [Self; 9] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Connect,
        Self::Trace,
    ];

    /// Returns the method as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Other(ext) => ext.as_str(),
        }
    }
}

impl FromStr for Method {
    type Err = RouterError;

    /// Parses a method token case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(method) = Self::STANDARD
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
        {
            return Ok(method);
        }
        if s.is_empty() || !s.bytes().all(is_token_byte) {
            return Err(RouterError::UnknownMethod(s.to_string()));
        }
        Ok(Self::Other(ExtensionMethod(s.to_ascii_uppercase().into())))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method token outside the standard set. Built by parsing a [`Method`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionMethod(Arc<str>);

impl ExtensionMethod {
    /// Returns the upper-cased token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// RFC 9110 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Key of a route's handler table: a concrete method or the `ALL` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    /// Handlers for one specific method.
    Verb(Method),
    /// Fallback handlers used when the request method has none.
    All,
}

impl From<Method> for MethodKey {
    fn from(method: Method) -> Self {
        Self::Verb(method)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verb(method) => fmt::Display::fmt(method, f),
            Self::All => f.write_str("ALL"),
        }
    }
}

/// Named path parameters, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates new empty path params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, replacing the value of an existing one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    /// Gets a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over the parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parameter bindings produced by a route match.
///
/// Template patterns bind by name. Precompiled regexes carry no names, so
/// their groups are exposed by position; a group that did not take part in
/// the match is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// Values keyed by the template's parameter names.
    Named(PathParams),
    /// Values of a precompiled regex's groups, in group order.
    Positional(Vec<Option<String>>),
}

impl Params {
    /// Looks up a named parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Self::Named(params) => params.get(key),
            Self::Positional(_) => None,
        }
    }

    /// Looks up a captured value by position.
    ///
    /// Works for both forms; named bindings are indexed in declaration order.
    pub fn at(&self, index: usize) -> Option<&str> {
        match self {
            Self::Named(params) => params.params.get(index).map(|(_, v)| v.as_str()),
            Self::Positional(values) => values.get(index)?.as_deref(),
        }
    }

    /// Returns the named bindings, if this match produced names.
    pub fn named(&self) -> Option<&PathParams> {
        match self {
            Self::Named(params) => Some(params),
            Self::Positional(_) => None,
        }
    }

    /// Returns the number of bound values.
    pub fn len(&self) -> usize {
        match self {
            Self::Named(params) => params.len(),
            Self::Positional(values) => values.len(),
        }
    }

    /// Returns true if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::Named(PathParams::new())
    }
}

/// An incoming request as seen by the router.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path, without query string.
    pub path: String,
    /// Bindings set by the router before any route handler runs.
    pub params: Params,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::default(),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert!(matches!(
            "GET /".parse::<Method>(),
            Err(RouterError::UnknownMethod(m)) if m == "GET /"
        ));
        assert!("".parse::<Method>().is_err());
    }

    #[test]
    fn test_extension_methods() {
        let purge: Method = "purge".parse().unwrap();
        assert_eq!(purge.as_str(), "PURGE");
        assert_eq!(purge, "PURGE".parse().unwrap());
        assert!(!Method::STANDARD.contains(&purge));

        let search: Method = "M-SEARCH".parse().unwrap();
        assert!(matches!(&search, Method::Other(ext) if ext.as_str() == "M-SEARCH"));
        assert_eq!(MethodKey::from(search).to_string(), "M-SEARCH");
    }

    #[test]
    fn test_method_key_display() {
        assert_eq!(MethodKey::from(Method::Delete).to_string(), "DELETE");
        assert_eq!(MethodKey::All.to_string(), "ALL");
    }

    #[test]
    fn test_path_params_keep_order() {
        let mut params = PathParams::new();
        params.insert("year", "2013");
        params.insert("month", "09");
        params.insert("year", "2014");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("year", "2014"), ("month", "09")]);
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_positional_params() {
        let params = Params::Positional(vec![Some("a".into()), None]);
        assert_eq!(params.at(0), Some("a"));
        assert_eq!(params.at(1), None);
        assert_eq!(params.get("a"), None);
        assert!(params.named().is_none());
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_request_builder() {
        let req = Request::get("/users");

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/users");
        assert!(req.params.is_empty());
    }
}
