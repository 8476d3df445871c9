//! A small demo application driven through the in-process test client.
//!
//! run with `cargo run --example app`

use async_trait::async_trait;
use http::Method;
use serde::Deserialize;
use sixi_web::{
    resource, view_fn, App, Middleware, MethodNotAllowed, PathParams, Request, Response, ViewResult,
};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Error, Debug)]
#[error("value error: {0}")]
struct ValueError(String);

async fn index(_req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
    resp.set_text("Hello from the INDEX page");
    Ok(())
}

async fn about(_req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
    resp.set_text("Hello from the ABOUT page");
    Ok(())
}

async fn hello(_req: &Request, resp: &mut Response, params: &PathParams) -> ViewResult {
    resp.set_text(format!("Hello, {}", params.str("name").unwrap_or("stranger")));
    Ok(())
}

async fn add(_req: &Request, resp: &mut Response, params: &PathParams) -> ViewResult {
    let a = params.int("a").unwrap_or_default();
    let b = params.int("b").unwrap_or_default();
    resp.set_text(format!("{a} + {b} = {}", a + b));
    Ok(())
}

async fn exception(_req: &Request, _resp: &mut Response, _params: &PathParams) -> ViewResult {
    Err(ValueError("this view always fails".to_string()).into())
}

#[derive(Deserialize, Debug)]
struct NewTodo {
    title: String,
}

#[derive(Default)]
struct TodoResource;

impl TodoResource {
    async fn get(&mut self, _req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
        resp.set_json(&serde_json::json!({"todos": ["learn rust", "write a framework"]}))?;
        Ok(())
    }

    async fn post(&mut self, req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
        let todo: NewTodo = req.json()?;
        resp.set_text(format!("Created task: {}", todo.title));
        Ok(())
    }
}

struct Timing;

#[async_trait]
impl Middleware for Timing {
    async fn process_request(&self, req: &mut Request) {
        req.extensions_mut().insert(Instant::now());
    }

    async fn process_response(&self, req: &Request, resp: &mut Response) {
        if let Some(started) = req.extensions().get::<Instant>() {
            info!(path = req.path(), status = %resp.status(), elapsed = ?started.elapsed(), "request served");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let app = App::builder()
        .route("/", view_fn(index))?
        .route("/about", view_fn(about).allow([Method::GET]))?
        .route("/hello/{name}", view_fn(hello))?
        .route("/add/{a:int}/{b:int}", view_fn(add))?
        .route("/exception", view_fn(exception))?
        .route("/todo", resource(TodoResource::default).get(TodoResource::get).post(TodoResource::post))?
        .error_handler(|_req: &Request, resp: &mut Response, e: &MethodNotAllowed| {
            resp.set_status(http::StatusCode::METHOD_NOT_ALLOWED);
            resp.set_text(e.to_string());
        })?
        .middleware(Timing)
        .build()?;

    let client = app.test_client();

    for path in ["/", "/about", "/hello/ashley", "/add/3/4", "/nope"] {
        let resp = client.get(path).await?;
        info!(path, body = %resp.text(), "GET");
    }

    let resp = client.post("/about", "").await?;
    info!(status = %resp.status(), body = %resp.text(), "POST /about");

    let resp = client.get("/todo").await?;
    info!(body = %resp.text(), "GET /todo");

    let req = http::Request::builder()
        .method(Method::POST)
        .uri("/todo")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(r#"{"title": "ship it"}"#.into())?;
    let resp = client.send(req).await?;
    info!(body = %resp.text(), "POST /todo");

    if let Err(e) = client.get("/exception").await {
        error!(category = %e.category(), cause = %e, "unhandled view error");
    }

    Ok(())
}
