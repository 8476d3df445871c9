//! A tiny web framework: pattern routing with typed path parameters, function and
//! resource views, error handlers keyed by error type, a middleware chain, templates
//! and static files.
//!
//! The framework does not speak HTTP on the wire. A host layer hands
//! `http::Request<Bytes>` values to [`App::call`] and writes back the
//! `http::Response<Bytes>` it returns.

mod app;
mod decorator;
mod dispatcher;
mod error;
mod error_handler;
mod fn_trait;
mod handler;
mod request;
mod response;
mod test_client;

pub mod extract;
pub mod middleware;
pub mod router;
pub mod static_files;
pub mod template;
pub mod view;

pub use app::{App, AppBuilder, BuildError};
pub use decorator::{decorator_fn, Decorator, DecoratorFn};
pub use dispatcher::Dispatcher;
pub use error::{ErrorCategory, MethodNotAllowed, RegistrationError, ViewError};
pub use error_handler::{ErrorHandler, ErrorHandlers};
pub use extract::ExtractError;
pub use fn_trait::{ResourceFn, ViewFn};
pub use handler::{handler_fn, FnHandler, RequestHandler};
pub use middleware::{Dispatch, Middleware};
pub use request::{ParamValue, PathParams, Request};
pub use response::{Response, NOT_FOUND_BODY};
pub use static_files::StaticFiles;
pub use template::{TemplateError, Templates};
pub use test_client::TestClient;
pub use view::{resource, view_fn, FunctionView, Resource, View, ViewResult};
