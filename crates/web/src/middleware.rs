//! The middleware chain.
//!
//! The chain is a singly linked list of [`Stage`]s ending in the core dispatcher.
//! Every registration wraps the current outermost delegate, so for middlewares added
//! in the order `m1, m2` a request travels
//! `m2.process_request -> m1.process_request -> core -> m1.process_response -> m2.process_response`.

use crate::decorator::Decorator;
use crate::error::ViewError;
use crate::{Request, Response};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Anything that turns a request into a response: the core dispatcher or a stage
/// wrapping it.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, req: &mut Request) -> Result<Response, ViewError>;
}

pub type BoxDispatch = Box<dyn Dispatch>;

#[async_trait]
impl<D: Dispatch + ?Sized> Dispatch for Box<D> {
    async fn dispatch(&self, req: &mut Request) -> Result<Response, ViewError> {
        (**self).dispatch(req).await
    }
}

/// Request and response hooks around the rest of the chain.
///
/// Both hooks default to doing nothing. A middleware cannot stop a request from
/// reaching the dispatcher.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn process_request(&self, _req: &mut Request) {}

    async fn process_response(&self, _req: &Request, _resp: &mut Response) {}
}

#[async_trait]
impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    async fn process_request(&self, req: &mut Request) {
        (**self).process_request(req).await;
    }

    async fn process_response(&self, req: &Request, resp: &mut Response) {
        (**self).process_response(req, resp).await;
    }
}

/// One node of the chain, owning its inner delegate
pub struct Stage<M> {
    middleware: M,
    inner: BoxDispatch,
}

impl<M: Middleware> Stage<M> {
    pub fn new(middleware: M, inner: BoxDispatch) -> Self {
        Self { middleware, inner }
    }
}

#[async_trait]
impl<M: Middleware> Dispatch for Stage<M> {
    async fn dispatch(&self, req: &mut Request) -> Result<Response, ViewError> {
        self.middleware.process_request(req).await;
        // an error skips process_response and travels outwards unchanged
        let mut resp = self.inner.dispatch(req).await?;
        self.middleware.process_response(req, &mut resp).await;
        Ok(resp)
    }
}

/// Decorates a delegate with one [`Stage`] of `M`
pub struct MiddlewareDecorator<M> {
    middleware: Arc<M>,
}

impl<M> MiddlewareDecorator<M> {
    pub fn new(middleware: M) -> Self {
        Self { middleware: Arc::new(middleware) }
    }
}

impl<M: Middleware + 'static> Decorator<BoxDispatch> for MiddlewareDecorator<M> {
    type Out = BoxDispatch;

    fn decorate(&self, raw: BoxDispatch) -> Self::Out {
        Box::new(Stage::new(Arc::clone(&self.middleware), raw))
    }
}

/// The chain entry point: always the most recently wrapped delegate
pub struct MiddlewareChain {
    outermost: BoxDispatch,
    stages: usize,
}

impl MiddlewareChain {
    pub fn new<D: Dispatch + 'static>(core: D) -> Self {
        Self { outermost: Box::new(core), stages: 0 }
    }

    /// Replaces the outermost delegate by `decorator.decorate(outermost)`
    #[must_use]
    pub fn wrap<D>(self, decorator: &D) -> Self
    where
        D: Decorator<BoxDispatch, Out = BoxDispatch> + ?Sized,
    {
        Self { outermost: decorator.decorate(self.outermost), stages: self.stages + 1 }
    }

    /// Wraps the chain in a new outermost [`Stage`] running `middleware`
    #[must_use]
    pub fn add<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.wrap(&MiddlewareDecorator::new(middleware))
    }

    /// Number of wraps applied on top of the core
    pub fn stages(&self) -> usize {
        self.stages
    }
}

#[async_trait]
impl Dispatch for MiddlewareChain {
    async fn dispatch(&self, req: &mut Request) -> Result<Response, ViewError> {
        self.outermost.dispatch(req).await
    }
}

impl<M> fmt::Debug for Stage<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").field("middleware", &std::any::type_name::<M>()).finish_non_exhaustive()
    }
}

impl<M> fmt::Debug for MiddlewareDecorator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareDecorator").field("middleware", &std::any::type_name::<M>()).finish()
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain").field("stages", &self.stages).finish_non_exhaustive()
    }
}
