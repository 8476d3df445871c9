//! The application: everything registered at setup, frozen by [`AppBuilder::build`].
//!
//! ```no_run
//! use sixi_web::{view_fn, App, PathParams, Request, Response, ViewResult};
//!
//! async fn hello(_req: &Request, resp: &mut Response, params: &PathParams) -> ViewResult {
//!     resp.set_text(format!("Hello, {}", params.str("name").unwrap_or_default()));
//!     Ok(())
//! }
//!
//! # async fn run() -> Result<(), sixi_web::ViewError> {
//! let app = App::builder().route("/hello/{name}", view_fn(hello))?.build()?;
//! let resp = app.test_client().get("/hello/ashley").await?;
//! assert_eq!(resp.text(), "Hello, ashley");
//! # Ok(())
//! # }
//! ```

use crate::decorator::Decorator;
use crate::dispatcher::Dispatcher;
use crate::error::{RegistrationError, ViewError};
use crate::error_handler::ErrorHandlers;
use crate::middleware::{BoxDispatch, Dispatch, Middleware, MiddlewareChain, MiddlewareDecorator};
use crate::router::Router;
use crate::static_files::StaticFiles;
use crate::template::{TemplateError, Templates};
use crate::test_client::TestClient;
use crate::view::View;
use crate::{Request, Response};
use bytes::Bytes;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

type BoxDecorator = Box<dyn Decorator<BoxDispatch, Out = BoxDispatch> + Send + Sync>;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("templates directory {} does not exist", .0.display())]
    MissingTemplatesDir(PathBuf),

    #[error("static directory {} does not exist", .0.display())]
    MissingStaticDir(PathBuf),

    #[error("static prefix {0:?} would shadow every route")]
    InvalidStaticPrefix(String),

    #[error("failed to load templates: {0}")]
    Template(#[from] TemplateError),
}

pub struct AppBuilder {
    router: Router,
    error_handlers: ErrorHandlers,
    decorators: Vec<BoxDecorator>,
    templates_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
    static_prefix: Option<String>,
}

impl AppBuilder {
    fn new() -> Self {
        Self {
            router: Router::new(),
            error_handlers: ErrorHandlers::new(),
            decorators: Vec::new(),
            templates_dir: None,
            static_dir: None,
            static_prefix: None,
        }
    }

    /// Binds `view` to `pattern`.
    ///
    /// Fails with [`RegistrationError::RouteConflict`] if the pattern is taken, or
    /// [`RegistrationError::InvalidPattern`] if it does not parse.
    pub fn add_route(&mut self, pattern: &str, view: impl Into<View>) -> Result<&mut Self, RegistrationError> {
        self.router.add(pattern, view)?;
        Ok(self)
    }

    /// Chaining form of [`add_route`](Self::add_route)
    pub fn route(mut self, pattern: &str, view: impl Into<View>) -> Result<Self, RegistrationError> {
        self.add_route(pattern, view)?;
        Ok(self)
    }

    /// Registers the recovery callback for view errors of type `E`
    pub fn add_error_handler<E, H>(&mut self, handler: H) -> Result<&mut Self, RegistrationError>
    where
        E: Error + Send + Sync + 'static,
        H: Fn(&Request, &mut Response, &E) + Send + Sync + 'static,
    {
        self.error_handlers.register(handler)?;
        Ok(self)
    }

    /// Chaining form of [`add_error_handler`](Self::add_error_handler)
    pub fn error_handler<E, H>(mut self, handler: H) -> Result<Self, RegistrationError>
    where
        E: Error + Send + Sync + 'static,
        H: Fn(&Request, &mut Response, &E) + Send + Sync + 'static,
    {
        self.add_error_handler(handler)?;
        Ok(self)
    }

    /// Wraps everything registered so far: the last middleware added runs its
    /// `process_request` first and its `process_response` last.
    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.decorators.push(Box::new(MiddlewareDecorator::new(middleware)));
        self
    }

    #[must_use]
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.add_middleware(middleware);
        self
    }

    /// Adds an arbitrary wrapping step around the dispatch chain
    #[must_use]
    pub fn wrap<D>(mut self, decorator: D) -> Self
    where
        D: Decorator<BoxDispatch, Out = BoxDispatch> + Send + Sync + 'static,
    {
        self.decorators.push(Box::new(decorator));
        self
    }

    #[must_use]
    pub fn templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// URL prefix of static files, `/static` unless set.
    ///
    /// A missing leading `/` is added. The root prefix (`/` or empty) fails the build.
    #[must_use]
    pub fn static_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.static_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let templates = match self.templates_dir {
            Some(dir) if !dir.is_dir() => return Err(BuildError::MissingTemplatesDir(dir)),
            Some(dir) => Some(Templates::new(dir)?),
            None => None,
        };

        let static_files = match self.static_dir {
            Some(dir) if !dir.is_dir() => return Err(BuildError::MissingStaticDir(dir)),
            Some(dir) => Some(match self.static_prefix {
                Some(prefix) => {
                    let files = StaticFiles::new(dir).with_prefix(prefix.as_str());
                    if files.is_rooted() {
                        return Err(BuildError::InvalidStaticPrefix(prefix));
                    }
                    files
                }
                None => StaticFiles::new(dir),
            }),
            None => None,
        };

        debug!(
            routes = self.router.len(),
            error_handlers = self.error_handlers.len(),
            middlewares = self.decorators.len(),
            "building application"
        );

        let dispatcher = Dispatcher::new(self.router, self.error_handlers);
        let chain = self
            .decorators
            .iter()
            .fold(MiddlewareChain::new(dispatcher), |chain, decorator| chain.wrap(decorator.as_ref()));

        Ok(App { chain, templates, static_files })
    }
}

/// A built application. `Send + Sync`: share it behind an `Arc` across request tasks.
pub struct App {
    chain: MiddlewareChain,
    templates: Option<Templates>,
    static_files: Option<StaticFiles>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Entry point for a host HTTP layer.
    ///
    /// A missing route is answered with a 404 response. An error no handler recovered
    /// is returned as is; turning it into a response is up to the host.
    pub async fn call(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>, ViewError> {
        self.handle(req.into()).await.map(Response::into_http)
    }

    pub async fn handle(&self, mut req: Request) -> Result<Response, ViewError> {
        if let Some(static_files) = &self.static_files
            && let Some(path) = req.path_info()
            && let Some(file) = static_files.strip(path)
        {
            return Ok(static_files.serve(file).await);
        }

        if let Some(templates) = &self.templates {
            req.extensions_mut().insert(templates.clone());
        }

        self.chain.dispatch(&mut req).await
    }

    /// Renders a template from the templates directory.
    ///
    /// Fails with [`TemplateError::Misconfigured`] if the application has none.
    pub fn template<C>(&self, name: &str, context: &C) -> Result<String, TemplateError>
    where
        C: Serialize + ?Sized,
    {
        self.templates.as_ref().ok_or(TemplateError::Misconfigured)?.render(name, context)
    }

    pub fn templates(&self) -> Option<&Templates> {
        self.templates.as_ref()
    }

    pub fn static_files(&self) -> Option<&StaticFiles> {
        self.static_files.as_ref()
    }

    pub fn test_client(&self) -> TestClient<'_> {
        TestClient::new(self)
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("router", &self.router)
            .field("error_handlers", &self.error_handlers)
            .field("middlewares", &self.decorators.len())
            .field("templates_dir", &self.templates_dir)
            .field("static_dir", &self.static_dir)
            .field("static_prefix", &self.static_prefix)
            .finish()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("chain", &self.chain)
            .field("templates", &self.templates)
            .field("static_files", &self.static_files)
            .finish()
    }
}
