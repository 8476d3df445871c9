//! The mutable response a view fills in.
//!
//! A fresh [`Response`] is created for every dispatch. The view mutates it, middleware
//! post-hooks may adjust it, and the host layer finally turns it into an
//! `http::Response<Bytes>` with [`Response::into_http`].
//!
//! The content type follows the setter that produced the body:
//!
//! | setter        | content type                  |
//! |---------------|-------------------------------|
//! | `set_text`    | `text/plain; charset=utf-8`   |
//! | `set_html`    | `text/html; charset=utf-8`    |
//! | `set_json`    | `application/json`            |
//! | `set_body`    | unchanged                     |

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;
use std::borrow::Cow;

const TEXT_PLAIN_UTF_8: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");
const TEXT_HTML_UTF_8: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");
const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

/// Body of the default 404 response
pub const NOT_FOUND_BODY: &str = "Not Found.";

#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// An empty `200 OK` html response
    pub fn new() -> Self {
        let mut headers = HeaderMap::with_capacity(8);
        headers.insert(CONTENT_TYPE, TEXT_HTML_UTF_8);
        Self { status: StatusCode::OK, headers, body: Bytes::new() }
    }

    /// The response produced when no route matches the request path
    pub fn not_found() -> Self {
        let mut response = Self::new();
        response.set_status(StatusCode::NOT_FOUND);
        response.set_text(NOT_FOUND_BODY);
        response
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }

    /// Overrides the content type, usually after [`Response::set_body`]
    pub fn set_content_type(&mut self, content_type: HeaderValue) {
        self.headers.insert(CONTENT_TYPE, content_type);
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body decoded as utf-8, invalid sequences are replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Sets a plain text body
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.body = Bytes::from(text.into());
        self.set_content_type(TEXT_PLAIN_UTF_8);
    }

    /// Sets an html body
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.body = Bytes::from(html.into());
        self.set_content_type(TEXT_HTML_UTF_8);
    }

    /// Serializes `value` as the json body.
    ///
    /// On a serialization failure the response is left untouched.
    pub fn set_json<T>(&mut self, value: &T) -> Result<(), serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(value)?;
        self.body = Bytes::from(bytes);
        self.set_content_type(APPLICATION_JSON);
        Ok(())
    }

    /// Sets a raw body, keeping the current content type
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    pub fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(response: Response) -> Self {
        response.into_http()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let response = Response::new();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn not_found() {
        let response = Response::not_found();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.text().to_lowercase().contains("not found"));
        assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn content_type_follows_setter() {
        let mut response = Response::new();

        response.set_text("plain text");
        assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(response.text(), "plain text");

        response.set_html("<h1>sixi</h1>");
        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));

        response.set_json(&json!({ "name": "sixi" })).unwrap();
        assert_eq!(response.content_type(), Some("application/json"));
        let value: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(value["name"], "sixi");
    }

    #[test]
    fn raw_body_with_explicit_content_type() {
        let mut response = Response::new();
        response.set_body(&b"byte"[..]);
        response.set_content_type(HeaderValue::from_static("text/plain"));

        assert_eq!(response.text(), "byte");
        assert_eq!(response.content_type(), Some("text/plain"));
    }

    #[test]
    fn into_http_keeps_everything() {
        let mut response = Response::new();
        response.set_status(StatusCode::CREATED);
        response.set_text("created");

        let http_response = response.into_http();
        assert_eq!(http_response.status(), StatusCode::CREATED);
        assert_eq!(http_response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(http_response.body().as_ref(), b"created");
    }
}
