//! Drives an [`App`] in-process, without any network or host HTTP layer.

use crate::error::ViewError;
use crate::{App, Response};
use bytes::Bytes;
use http::Method;

/// Issues requests against a borrowed application.
///
/// Errors a view did not recover from come back as `Err`, exactly as a host would
/// see them from [`App::call`].
#[derive(Debug, Clone, Copy)]
pub struct TestClient<'app> {
    app: &'app App,
}

macro_rules! request_without_body {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Sends a ", stringify!($upper_case_method), " request with an empty body")]
        pub async fn $method(&self, path: &str) -> Result<Response, ViewError> {
            self.request(Method::$upper_case_method, path, Bytes::new()).await
        }
    };
}

macro_rules! request_with_body {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Sends a ", stringify!($upper_case_method), " request carrying `body`")]
        pub async fn $method(&self, path: &str, body: impl Into<Bytes>) -> Result<Response, ViewError> {
            self.request(Method::$upper_case_method, path, body).await
        }
    };
}

impl<'app> TestClient<'app> {
    pub fn new(app: &'app App) -> Self {
        Self { app }
    }

    /// Sends `method path` with `body`; `path` may carry a query string
    pub async fn request(&self, method: Method, path: &str, body: impl Into<Bytes>) -> Result<Response, ViewError> {
        let req = http::Request::builder().method(method).uri(path).body(body.into())?;
        self.send(req).await
    }

    /// Sends a fully built request, for when headers matter
    pub async fn send(&self, req: http::Request<Bytes>) -> Result<Response, ViewError> {
        self.app.handle(req.into()).await
    }

    request_without_body!(get, GET);
    request_without_body!(head, HEAD);
    request_without_body!(delete, DELETE);
    request_without_body!(options, OPTIONS);

    request_with_body!(post, POST);
    request_with_body!(put, PUT);
    request_with_body!(patch, PATCH);
}
