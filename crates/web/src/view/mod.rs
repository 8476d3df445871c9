//! Views and the view invoker.
//!
//! A route is bound to one of two kinds of view:
//! - a function view: one handler serving a set of allowed methods
//!   (by default [`DEFAULT_METHODS`])
//! - a resource view: one operation per HTTP method, run against a resource
//!   instance created fresh for every request
//!
//! Resolving the request method against the view fails with [`MethodNotAllowed`],
//! which then travels through the error handler registry like any other failure.

mod resource;

pub use resource::{resource, Resource, ResourceHandler};

use crate::error::{MethodNotAllowed, ViewError};
use crate::fn_trait::ViewFn;
use crate::handler::{handler_fn, RequestHandler};
use crate::{PathParams, Request, Response};
use futures::future::{self, BoxFuture};
use http::Method;
use std::any::type_name;
use std::fmt;

/// What a view returns: nothing on success, the failure otherwise
pub type ViewResult = Result<(), ViewError>;

/// Methods a function view accepts unless restricted with [`FunctionView::allow`]
pub const DEFAULT_METHODS: [Method; 6] =
    [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS];

/// The handler bound to a route
pub enum View {
    Function(FunctionView),
    Resource(Box<dyn ResourceHandler>),
}

/// A handler plus the set of methods it serves
pub struct FunctionView {
    name: &'static str,
    handler: Box<dyn RequestHandler>,
    allowed_methods: Vec<Method>,
}

/// Wraps an `async fn` view, accepting the default methods.
///
/// # Example
/// ```
/// use http::Method;
/// use sixi_web::{view_fn, PathParams, Request, Response, ViewResult};
///
/// async fn home(_req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
///     resp.set_text("home");
///     Ok(())
/// }
///
/// let only_post = view_fn(home).allow([Method::POST]);
/// assert_eq!(only_post.allowed_methods(), &[Method::POST]);
/// ```
pub fn view_fn<F>(f: F) -> FunctionView
where
    F: for<'a> ViewFn<'a> + Send + Sync + 'static,
{
    FunctionView { name: type_name::<F>(), handler: Box::new(handler_fn(f)), allowed_methods: DEFAULT_METHODS.to_vec() }
}

impl FunctionView {
    /// Wraps any [`RequestHandler`], accepting the default methods
    pub fn new<H: RequestHandler + 'static>(handler: H) -> Self {
        Self { name: type_name::<H>(), handler: Box::new(handler), allowed_methods: DEFAULT_METHODS.to_vec() }
    }

    /// Restricts the view to exactly `methods`
    #[must_use]
    pub fn allow<I: IntoIterator<Item = Method>>(mut self, methods: I) -> Self {
        self.allowed_methods = methods.into_iter().collect();
        self
    }

    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    #[inline]
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }
}

impl View {
    /// The type path of the underlying function or resource, used in conflict messages
    pub fn name(&self) -> &'static str {
        match self {
            View::Function(view) => view.name,
            View::Resource(resource) => resource.name(),
        }
    }

    /// The methods this view can serve
    pub fn allowed_methods(&self) -> Vec<Method> {
        match self {
            View::Function(view) => view.allowed_methods.clone(),
            View::Resource(resource) => resource.methods(),
        }
    }

    /// Resolves the request method and runs the view.
    ///
    /// The view's only effect is the mutation of `resp`.
    pub(crate) fn invoke<'a>(
        &'a self,
        req: &'a Request,
        resp: &'a mut Response,
        params: &'a PathParams,
    ) -> BoxFuture<'a, ViewResult> {
        match self {
            View::Function(view) if view.allows(req.method()) => view.handler.invoke(req, resp, params),
            View::Function(view) => {
                let error = MethodNotAllowed::new(req.method().clone(), view.allowed_methods.clone());
                Box::pin(future::ready(Err(error.into())))
            }
            View::Resource(resource) => resource.invoke(req, resp, params),
        }
    }
}

impl From<FunctionView> for View {
    fn from(view: FunctionView) -> Self {
        View::Function(view)
    }
}

impl<R: Send + 'static> From<Resource<R>> for View {
    fn from(resource: Resource<R>) -> Self {
        View::Resource(Box::new(resource))
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Function(view) => view.fmt(f),
            View::Resource(resource) => {
                f.debug_struct("Resource").field("name", &resource.name()).field("methods", &resource.methods()).finish()
            }
        }
    }
}

impl fmt::Debug for FunctionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionView").field("name", &self.name).field("allowed_methods", &self.allowed_methods).finish()
    }
}
