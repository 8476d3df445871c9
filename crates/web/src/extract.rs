//! Typed access to query strings and request bodies.
//!
//! # Example
//! ```no_run
//! use serde::Deserialize;
//! use sixi_web::{PathParams, Request, Response, ViewResult};
//!
//! #[derive(Deserialize)]
//! struct Search {
//!     q: String,
//!     page: Option<u32>,
//! }
//!
//! async fn search(req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
//!     let search: Search = req.query()?;
//!     resp.set_text(format!("{} (page {})", search.q, search.page.unwrap_or(1)));
//!     Ok(())
//! }
//! ```

use crate::Request;
use http::header::CONTENT_TYPE;
use mime::Mime;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("request has no query string")]
    MissingQuery,

    #[error("invalid query string: {0}")]
    Query(#[from] serde_qs::Error),

    #[error("invalid form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected content type {expected}, found {found:?}")]
    ContentType { expected: &'static str, found: Option<String> },

    #[error("request body is not utf8")]
    Utf8(#[from] std::str::Utf8Error),
}

impl Request {
    /// Deserializes the query string
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, ExtractError> {
        let query = self.query_string().ok_or(ExtractError::MissingQuery)?;
        Ok(serde_qs::from_str(query)?)
    }

    /// Deserializes an `application/x-www-form-urlencoded` body
    pub fn form<T: DeserializeOwned>(&self) -> Result<T, ExtractError> {
        self.expect_content_type("application/x-www-form-urlencoded", |mime| {
            mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED
        })?;
        Ok(serde_urlencoded::from_bytes(self.body())?)
    }

    /// Deserializes a json body; `application/json` and `application/*+json` are accepted
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ExtractError> {
        self.expect_content_type("application/json", |mime| {
            mime.type_() == mime::APPLICATION && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
        })?;
        Ok(serde_json::from_slice(self.body())?)
    }

    /// The body as utf8 text
    pub fn text(&self) -> Result<&str, ExtractError> {
        Ok(std::str::from_utf8(self.body())?)
    }

    fn expect_content_type<F>(&self, expected: &'static str, accept: F) -> Result<(), ExtractError>
    where
        F: FnOnce(&Mime) -> bool,
    {
        let found = self.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok());
        match found.and_then(|value| value.parse::<Mime>().ok()) {
            Some(mime) if accept(&mime) => Ok(()),
            _ => Err(ExtractError::ContentType { expected, found: found.map(str::to_owned) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Todo {
        title: String,
        done: bool,
    }

    fn request(uri: &str, content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = http::Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Bytes::from_static(body.as_bytes())).unwrap().into()
    }

    #[test]
    fn query_string() {
        let req = request("/todo?title=write&done=true", None, "");
        assert_eq!(req.query::<Todo>().unwrap(), Todo { title: "write".into(), done: true });

        let req = request("/todo", None, "");
        assert!(matches!(req.query::<Todo>(), Err(ExtractError::MissingQuery)));
    }

    #[test]
    fn form_body() {
        let req = request("/todo", Some("application/x-www-form-urlencoded"), "title=write&done=false");
        assert_eq!(req.form::<Todo>().unwrap(), Todo { title: "write".into(), done: false });
    }

    #[test]
    fn json_body() {
        let body = r#"{"title": "write", "done": true}"#;

        let req = request("/todo", Some("application/json; charset=utf-8"), body);
        assert_eq!(req.json::<Todo>().unwrap(), Todo { title: "write".into(), done: true });

        let req = request("/todo", Some("application/problem+json"), body);
        assert!(req.json::<Todo>().is_ok());

        let req = request("/todo", Some("text/plain"), body);
        assert!(matches!(req.json::<Todo>(), Err(ExtractError::ContentType { .. })));

        let req = request("/todo", None, body);
        assert!(matches!(req.json::<Todo>(), Err(ExtractError::ContentType { found: None, .. })));
    }

    #[test]
    fn malformed_json_is_reported() {
        let req = request("/todo", Some("application/json"), "{");
        assert!(matches!(req.json::<Todo>(), Err(ExtractError::Json(_))));
    }
}
