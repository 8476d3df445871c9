//! Traits that let plain `async fn` items act as views.
//!
//! A view borrows the request, the response and the path parameters for the duration
//! of its future. `Fn(&Request, &mut Response, &PathParams) -> Fut` cannot name that
//! future type for every lifetime at once, so the lifetime is lifted into the trait:
//! `F: for<'a> ViewFn<'a>` holds for any `async fn` with the view signature.
//!
//! for example, this is a view:
//!```no_run
//! use sixi_web::{PathParams, Request, Response, ViewResult};
//!
//! async fn hello(_req: &Request, resp: &mut Response, params: &PathParams) -> ViewResult {
//!     resp.set_text(format!("Hello, {}", params.str("name").unwrap_or("world")));
//!     Ok(())
//! }
//!```

use crate::view::ViewResult;
use crate::{PathParams, Request, Response};
use std::future::Future;

/// A function view, see the module docs
pub trait ViewFn<'a> {
    type Future: Future<Output = ViewResult> + Send + 'a;

    fn call(&self, req: &'a Request, resp: &'a mut Response, params: &'a PathParams) -> Self::Future;
}

impl<'a, Func, Fut> ViewFn<'a> for Func
where
    Func: Fn(&'a Request, &'a mut Response, &'a PathParams) -> Fut,
    Fut: Future<Output = ViewResult> + Send + 'a,
{
    type Future = Fut;

    #[inline]
    fn call(&self, req: &'a Request, resp: &'a mut Response, params: &'a PathParams) -> Self::Future {
        (self)(req, resp, params)
    }
}

/// An operation of a resource view: an `async fn` taking the fresh resource instance
/// as `&mut self` before the usual view arguments.
pub trait ResourceFn<'a, R> {
    type Future: Future<Output = ViewResult> + Send + 'a;

    fn call(&self, resource: &'a mut R, req: &'a Request, resp: &'a mut Response, params: &'a PathParams)
    -> Self::Future;
}

impl<'a, R, Func, Fut> ResourceFn<'a, R> for Func
where
    R: 'static,
    Func: Fn(&'a mut R, &'a Request, &'a mut Response, &'a PathParams) -> Fut,
    Fut: Future<Output = ViewResult> + Send + 'a,
{
    type Future = Fut;

    #[inline]
    fn call(
        &self,
        resource: &'a mut R,
        req: &'a Request,
        resp: &'a mut Response,
        params: &'a PathParams,
    ) -> Self::Future {
        (self)(resource, req, resp, params)
    }
}

#[cfg(test)]
mod tests {
    use super::{ResourceFn, ViewFn};
    use crate::view::ViewResult;
    use crate::{PathParams, Request, Response};

    fn assert_is_view_fn<F: for<'a> ViewFn<'a>>(_f: F) {
        //noop
    }

    fn assert_is_resource_fn<R: 'static, F: for<'a> ResourceFn<'a, R>>(_f: F) {
        //noop
    }

    async fn index(_req: &Request, _resp: &mut Response, _params: &PathParams) -> ViewResult {
        Ok(())
    }

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }

    impl Counter {
        async fn get(&mut self, _req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
            self.hits += 1;
            resp.set_text(self.hits.to_string());
            Ok(())
        }
    }

    #[test]
    fn async_fn_items_are_views() {
        assert_is_view_fn(index);
        assert_is_resource_fn(Counter::get);
    }
}
