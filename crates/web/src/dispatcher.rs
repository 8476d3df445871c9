//! The core of request processing, innermost in the middleware chain.
//!
//! ```text
//! RECEIVED -> MATCHED -> INVOKED -> COMPLETED       -> RESPONDED
//!                                -> HANDLED_ERROR   -> RESPONDED
//!                                -> UNHANDLED_ERROR -> Err(..)
//! ```
//!
//! A path without a route is a normal outcome, answered with a 404 response. A view
//! failure is recovered by the error handler registered for its category, or else
//! handed back to the caller unchanged.

use crate::error::ViewError;
use crate::error_handler::ErrorHandlers;
use crate::middleware::Dispatch;
use crate::router::Router;
use crate::{Request, Response};
use async_trait::async_trait;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Dispatcher {
    router: Router,
    error_handlers: ErrorHandlers,
}

impl Dispatcher {
    pub fn new(router: Router, error_handlers: ErrorHandlers) -> Self {
        Self { router, error_handlers }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn error_handlers(&self) -> &ErrorHandlers {
        &self.error_handlers
    }

    pub async fn dispatch_request(&self, req: &Request) -> Result<Response, ViewError> {
        let Some(path) = req.path_info() else {
            debug!(path = req.path(), "path is not valid utf8 once decoded");
            return Ok(Response::not_found());
        };
        let Some(matched) = self.router.at(path) else {
            debug!(path, "no route matched");
            return Ok(Response::not_found());
        };

        debug!(method = %req.method(), path, pattern = matched.route().pattern(), "route matched");

        let mut resp = Response::new();
        if let Err(error) = matched.view().invoke(req, &mut resp, matched.params()).await {
            let Some(handler) = self.error_handlers.lookup(error.category()) else {
                warn!(category = %error.category(), %error, "no error handler registered");
                return Err(error);
            };

            debug!(category = %error.category(), handler = handler.name(), "recovering view error");
            handler.call(req, &mut resp, &error);
        }

        Ok(resp)
    }
}

#[async_trait]
impl Dispatch for Dispatcher {
    async fn dispatch(&self, req: &mut Request) -> Result<Response, ViewError> {
        self.dispatch_request(req).await
    }
}
