//! Path pattern compilation and matching.

use std::fmt;

use regex::{Captures, Regex};

use crate::error::{Result, RouterError};
use crate::request::{Params, PathParams};

/// Capture used for a `:name` segment without a custom group.
const DEFAULT_CAPTURE: &str = "[^/]+?";

/// What a route was registered with: a template string or a precompiled regex.
#[derive(Debug, Clone)]
pub enum PathSpec {
    /// A literal template such as `/users/:id`.
    Template(String),
    /// A regex used as-is. It carries no parameter names.
    Regex(Regex),
}

impl PathSpec {
    /// Returns the template text or the regex source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Template(s) => s,
            Self::Regex(re) => re.as_str(),
        }
    }

    /// Returns true for the precompiled form.
    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex(_))
    }
}

impl PartialEq for PathSpec {
    fn eq(&self, other: &Self) -> bool {
        self.is_regex() == other.is_regex() && self.as_str() == other.as_str()
    }
}

impl Eq for PathSpec {}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(s) => f.write_str(s),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for PathSpec {
    fn from(s: &str) -> Self {
        Self::Template(s.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(s: String) -> Self {
        Self::Template(s)
    }
}

impl From<Regex> for PathSpec {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

impl From<&Regex> for PathSpec {
    fn from(re: &Regex) -> Self {
        Self::Regex(re.clone())
    }
}

/// A compiled path pattern for matching URLs.
///
/// Template syntax:
/// - `/users` - literal path (`.` and `/` are literal, as is everything else)
/// - `/users/:id` - named segment, matches one or more non-`/` characters
/// - `/users/:id?` - optional segment, the leading `/` becomes optional too
/// - `/files/:name(\d+)` - named segment with a custom capture
///
/// Templates match case-insensitively and accept one optional trailing slash.
/// A path matches only if the pattern's first match spans the whole path.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The path spec the pattern was built from.
    spec: PathSpec,
    /// Compiled regex for matching.
    regex: Regex,
    /// Template body without anchors, used when composing with a regex child.
    body: Option<String>,
    /// Parameter names in order; `None` for precompiled patterns.
    param_names: Option<Vec<String>>,
}

impl PathPattern {
    /// Compiles a template string or wraps a precompiled regex.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_route_tree::PathPattern;
    ///
    /// let pattern = PathPattern::compile("/posts/:id/comments/:comment_id").unwrap();
    /// let params = pattern.match_path("/posts/123/comments/456").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert_eq!(params.get("comment_id"), Some("456"));
    /// ```
    pub fn compile(spec: impl Into<PathSpec>) -> Result<Self> {
        match spec.into() {
            PathSpec::Template(template) => Self::from_template(template),
            PathSpec::Regex(regex) => Ok(Self {
                spec: PathSpec::Regex(regex.clone()),
                regex,
                body: None,
                param_names: None,
            }),
        }
    }

    fn from_template(template: String) -> Result<Self> {
        let (body, param_names) = parse_template(&template)?;

        let mut source = format!("(?i)^{body}");
        // Non-strict: a trailing slash is always optional.
        if body.ends_with('/') {
            source.push('?');
        } else {
            source.push_str("/?");
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| invalid(&template, e))?;
        if regex.captures_len() - 1 != param_names.len() {
            return Err(RouterError::InvalidPattern {
                path: template,
                reason: "custom captures must not contain capturing groups".to_string(),
            });
        }

        Ok(Self {
            spec: PathSpec::Template(template),
            regex,
            body: Some(body),
            param_names: Some(param_names),
        })
    }

    /// Builds the pattern of a route nested under this one.
    ///
    /// Two templates are joined as text and recompiled. As soon as a regex is
    /// involved the child is read as regex source and appended to this
    /// pattern, so the result is a regex with positional captures.
    pub fn concat(&self, child: impl Into<PathSpec>) -> Result<Self> {
        let child = child.into();
        match (&self.spec, &child) {
            (PathSpec::Template(parent), PathSpec::Template(tail)) => {
                Self::compile(format!("{parent}{tail}"))
            }
            _ => {
                let head = match (&self.spec, &self.body) {
                    (PathSpec::Template(_), Some(body)) => format!("(?i:^{body})"),
                    _ => format!("(?:{})", strip_end_anchor(self.regex.as_str())),
                };
                let tail = child.as_str();
                let tail = tail.strip_prefix('^').unwrap_or(tail);
                let source = format!("{head}(?:{tail})");
                let regex = Regex::new(&source).map_err(|e| invalid(&source, e))?;
                Self::compile(regex)
            }
        }
    }

    /// Returns true if the whole path matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex
            .find(path)
            .is_some_and(|m| m.start() == 0 && m.end() == path.len())
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns the parameter bindings if the path matches.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        if !self.is_match(path) {
            return None;
        }
        let caps = self.regex.captures(path)?;
        Some(self.bind(&caps))
    }

    fn bind(&self, caps: &Captures<'_>) -> Params {
        let values = caps.iter().skip(1).map(|m| m.map(|m| m.as_str()));

        match &self.param_names {
            Some(names) => {
                let mut params = PathParams::new();
                for (name, value) in names.iter().zip(values) {
                    if let Some(value) = value {
                        params.insert(name.clone(), value);
                    }
                }
                Params::Named(params)
            }
            None => Params::Positional(values.map(|v| v.map(str::to_string)).collect()),
        }
    }

    /// Returns the path spec this pattern was built from.
    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }

    /// Returns the parameter names, or `None` for precompiled patterns.
    pub fn param_names(&self) -> Option<&[String]> {
        self.param_names.as_deref()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.spec, f)
    }
}

/// Translates a template into a regex body and its parameter names.
fn parse_template(template: &str) -> Result<(String, Vec<String>)> {
    let mut body = String::new();
    let mut names = Vec::new();
    let mut chars = template.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        if c != ':' {
            body.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            continue;
        }

        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(RouterError::InvalidPattern {
                path: template.to_string(),
                reason: format!("missing parameter name at offset {at}"),
            });
        }

        let capture = if chars.peek().is_some_and(|&(_, c)| c == '(') {
            chars.next();
            let mut depth = 1;
            let mut group = String::new();
            let mut escaped = false;
            for (_, c) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '(' {
                    depth += 1;
                } else if c == ')' {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                group.push(c);
            }
            if depth != 0 {
                return Err(RouterError::InvalidPattern {
                    path: template.to_string(),
                    reason: format!("unclosed group for parameter `{name}`"),
                });
            }
            group
        } else {
            DEFAULT_CAPTURE.to_string()
        };

        let optional = chars.next_if(|&(_, c)| c == '?').is_some();
        if optional && body.ends_with('/') {
            body.pop();
            body.push_str(&format!("(?:/({capture}))?"));
        } else if optional {
            body.push_str(&format!("({capture})?"));
        } else {
            body.push_str(&format!("({capture})"));
        }
        names.push(name);
    }

    Ok((body, names))
}

/// Drops a trailing, unescaped `$` so another pattern can follow.
fn strip_end_anchor(source: &str) -> &str {
    match source.strip_suffix('$') {
        Some(rest) => {
            let backslashes = rest.chars().rev().take_while(|&c| c == '\\').count();
            if backslashes % 2 == 0 { rest } else { source }
        }
        None => source,
    }
}

fn invalid(path: &str, err: regex::Error) -> RouterError {
    RouterError::InvalidPattern {
        path: path.to_string(),
        reason: err.to_string(),
    }
}
