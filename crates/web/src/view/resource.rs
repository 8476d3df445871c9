use crate::error::MethodNotAllowed;
use crate::fn_trait::ResourceFn;
use crate::view::ViewResult;
use crate::{PathParams, Request, Response};
use futures::future::{self, BoxFuture};
use http::Method;
use std::any::type_name;
use std::collections::HashMap;
use std::fmt;

/// The object-safe form of a [`Resource`]
pub trait ResourceHandler: Send + Sync {
    /// The type path of the resource type
    fn name(&self) -> &'static str;

    /// The methods the resource has an operation for
    fn methods(&self) -> Vec<Method>;

    /// Creates a fresh instance and runs the operation registered for the request
    /// method, failing with [`MethodNotAllowed`] when there is none.
    fn invoke<'a>(&'a self, req: &'a Request, resp: &'a mut Response, params: &'a PathParams)
    -> BoxFuture<'a, ViewResult>;
}

trait Operation<R>: Send + Sync {
    fn call<'a>(
        &'a self,
        resource: &'a mut R,
        req: &'a Request,
        resp: &'a mut Response,
        params: &'a PathParams,
    ) -> BoxFuture<'a, ViewResult>;
}

struct FnOperation<F>(F);

impl<R, F> Operation<R> for FnOperation<F>
where
    R: 'static,
    F: for<'a> ResourceFn<'a, R> + Send + Sync,
{
    fn call<'a>(
        &'a self,
        resource: &'a mut R,
        req: &'a Request,
        resp: &'a mut Response,
        params: &'a PathParams,
    ) -> BoxFuture<'a, ViewResult> {
        Box::pin(ResourceFn::call(&self.0, resource, req, resp, params))
    }
}

/// A multi-method view.
///
/// Each request gets its own instance from the factory, so operations may freely
/// mutate `self` without sharing state across requests.
///
/// # Example
/// ```
/// use sixi_web::{resource, PathParams, Request, Response, ViewResult};
///
/// #[derive(Default)]
/// struct TodoResource;
///
/// impl TodoResource {
///     async fn get(&mut self, _req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
///         resp.set_text("Get a task");
///         Ok(())
///     }
///
///     async fn post(&mut self, _req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
///         resp.set_text("Create a task");
///         Ok(())
///     }
/// }
///
/// let todo = resource(TodoResource::default).get(TodoResource::get).post(TodoResource::post);
/// ```
pub struct Resource<R> {
    factory: Box<dyn Fn() -> R + Send + Sync>,
    operations: HashMap<Method, Box<dyn Operation<R>>>,
}

/// Starts a resource view whose instances are created by `factory`
pub fn resource<R, F>(factory: F) -> Resource<R>
where
    F: Fn() -> R + Send + Sync + 'static,
{
    Resource { factory: Box::new(factory), operations: HashMap::new() }
}

macro_rules! resource_method {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Registers the operation serving HTTP ", stringify!($upper_case_method), " requests.")]
        #[must_use]
        pub fn $method<F>(self, operation: F) -> Self
        where
            F: for<'a> ResourceFn<'a, R> + Send + Sync + 'static,
        {
            self.on(Method::$upper_case_method, operation)
        }
    };
}

impl<R: Send + 'static> Resource<R> {
    /// Registers the operation for `method`, replacing any previous one
    #[must_use]
    pub fn on<F>(mut self, method: Method, operation: F) -> Self
    where
        F: for<'a> ResourceFn<'a, R> + Send + Sync + 'static,
    {
        self.operations.insert(method, Box::new(FnOperation(operation)));
        self
    }

    resource_method!(get, GET);
    resource_method!(post, POST);
    resource_method!(put, PUT);
    resource_method!(patch, PATCH);
    resource_method!(delete, DELETE);
    resource_method!(head, HEAD);
    resource_method!(options, OPTIONS);
    resource_method!(connect, CONNECT);
    resource_method!(trace, TRACE);
}

impl<R: Send + 'static> ResourceHandler for Resource<R> {
    fn name(&self) -> &'static str {
        type_name::<R>()
    }

    fn methods(&self) -> Vec<Method> {
        let mut methods = self.operations.keys().cloned().collect::<Vec<_>>();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    fn invoke<'a>(
        &'a self,
        req: &'a Request,
        resp: &'a mut Response,
        params: &'a PathParams,
    ) -> BoxFuture<'a, ViewResult> {
        let Some(operation) = self.operations.get(req.method()) else {
            let error = MethodNotAllowed::new(req.method().clone(), self.methods());
            return Box::pin(future::ready(Err(error.into())));
        };

        Box::pin(async move {
            let mut instance = (self.factory)();
            operation.call(&mut instance, req, resp, params).await
        })
    }
}

impl<R> fmt::Debug for Resource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("name", &type_name::<R>()).field("operations", &self.operations.len()).finish()
    }
}
