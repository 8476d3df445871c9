//! Request types handed to views and middleware.
//!
//! This module contains:
//! - `Request`: the inbound method, uri, headers and body of one HTTP request
//! - `PathParams`: the typed placeholder values captured while matching the route

use crate::template::{TemplateError, Templates};
use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Uri, Version};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// An inbound HTTP request.
///
/// The request is owned by a single dispatch. Middleware receives it mutably in
/// `process_request`, views only ever see a shared reference.
#[derive(Debug)]
pub struct Request {
    parts: http::request::Parts,
    body: Bytes,
    path_info: Option<String>,
}

impl Request {
    pub fn new(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        let path_info = urlencoding::decode(parts.uri.path()).ok().map(Cow::into_owned);
        Self { parts, body, path_info }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Returns the raw, still percent-encoded path component of the URI
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Returns the percent-decoded path, used for routing and static files.
    ///
    /// `None` when the decoded bytes are not valid utf8; such a request matches nothing.
    pub fn path_info(&self) -> Option<&str> {
        self.path_info.as_deref()
    }

    /// Returns the raw query string, without the leading `?`
    pub fn query_string(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.parts.headers
    }

    /// Returns the full request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Renders a template with the application's template environment.
    ///
    /// Fails with [`TemplateError::Misconfigured`] when the application was built
    /// without a templates directory.
    pub fn render<C>(&self, name: &str, context: &C) -> Result<String, TemplateError>
    where
        C: Serialize + ?Sized,
    {
        self.extensions().get::<Templates>().ok_or(TemplateError::Misconfigured)?.render(name, context)
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        Request::new(request)
    }
}

/// A single captured placeholder value.
///
/// The variant follows the placeholder type code: `{id:int}` yields `Int`,
/// `{ratio:float}` yields `Float`, untyped placeholders yield `Str`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::Float(value) => write!(f, "{value}"),
            ParamValue::Str(value) => f.write_str(value),
        }
    }
}

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// For the pattern `/users/{id:int}` and the path `/users/42`, `id` is bound to
/// `ParamValue::Int(42)`. Bindings keep the order of the placeholders in the pattern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathParams {
    params: Vec<(String, ParamValue)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { params: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.params.push((name.into(), value));
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    pub fn get(&self, key: impl AsRef<str>) -> Option<&ParamValue> {
        let key = key.as_ref();
        self.params.iter().find(|(name, _)| name == key).map(|(_, value)| value)
    }

    /// Gets an integer parameter, `None` if it is missing or not an `Int`
    pub fn int(&self, key: impl AsRef<str>) -> Option<i64> {
        self.get(key).and_then(ParamValue::as_int)
    }

    pub fn float(&self, key: impl AsRef<str>) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_float)
    }

    /// Gets a string parameter, `None` if it is missing or not a `Str`
    pub fn str(&self, key: impl AsRef<str>) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request {
        http::Request::builder().method(Method::POST).uri(uri).body(Bytes::from_static(b"payload")).unwrap().into()
    }

    #[test]
    fn request_accessors() {
        let req = request("/todo/1?done=true");

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/todo/1");
        assert_eq!(req.query_string(), Some("done=true"));
        assert_eq!(req.body().as_ref(), b"payload");
        assert_eq!(req.version(), Version::HTTP_11);
    }

    #[test]
    fn path_info_is_percent_decoded() {
        let req = request("/hello/ash%20ley");
        assert_eq!(req.path(), "/hello/ash%20ley");
        assert_eq!(req.path_info(), Some("/hello/ash ley"));

        let req = request("/bad/%FF%FE");
        assert_eq!(req.path_info(), None);
    }

    #[test]
    fn render_without_templates_is_misconfigured() {
        let req = request("/");
        let result = req.render("index.html", &serde_json::json!({}));
        assert!(matches!(result, Err(TemplateError::Misconfigured)));
    }

    #[test]
    fn typed_lookup() {
        let mut params = PathParams::empty();
        params.push("a", ParamValue::Int(3));
        params.push("name", ParamValue::Str("ashley".into()));
        params.push("ratio", ParamValue::Float(0.5));

        assert_eq!(params.len(), 3);
        assert_eq!(params.int("a"), Some(3));
        assert_eq!(params.str("a"), None);
        assert_eq!(params.str("name"), Some("ashley"));
        assert_eq!(params.float("ratio"), Some(0.5));
        assert!(params.get("missing").is_none());

        let names = params.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "name", "ratio"]);
    }

    #[test]
    fn display_values() {
        assert_eq!(ParamValue::Int(7).to_string(), "7");
        assert_eq!(ParamValue::Str("x".into()).to_string(), "x");
    }
}
