use crate::fn_trait::ViewFn;
use crate::view::ViewResult;
use crate::{PathParams, Request, Response};
use futures::future::BoxFuture;
use std::fmt;

/// The object-safe form of a function view.
///
/// Implementors mutate `resp` and report failure through the returned `ViewResult`;
/// the dispatcher never looks at anything else.
pub trait RequestHandler: Send + Sync {
    fn invoke<'a>(&'a self, req: &'a Request, resp: &'a mut Response, params: &'a PathParams)
    -> BoxFuture<'a, ViewResult>;
}

/// a `ViewFn` holder which represents any async view function
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: for<'a> ViewFn<'a>,
{
    fn new(f: F) -> Self {
        Self { f }
    }
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> ViewFn<'a>,
{
    FnHandler::new(f)
}

impl<F> RequestHandler for FnHandler<F>
where
    F: for<'a> ViewFn<'a> + Send + Sync,
{
    fn invoke<'a>(
        &'a self,
        req: &'a Request,
        resp: &'a mut Response,
        params: &'a PathParams,
    ) -> BoxFuture<'a, ViewResult> {
        Box::pin(ViewFn::call(&self.f, req, resp, params))
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("f", &std::any::type_name::<F>()).finish()
    }
}
