//! The greeting endpoints.
//!
//! Three GET routes: a static welcome at `/`, a templated text greeting at
//! `/hello/:name`, and a JSON-bound [`Person`] record at `/person/:name`.

use crate::app::Application;
use crate::error::ServiceError;
use crate::http::{Request, Response};
use crate::router::HandlerResult;
use serde::{Deserialize, Serialize};

pub const WELCOME: &str = "Hello, world! Add /hello/there to the URL to get a friendly reply.";

/// JSON-bound record echoed back by `/person/:name`. Built per request
/// from the path parameter and discarded once the response is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Wires the greeting routes into an application.
pub fn register(app: &mut Application) {
    app.get("/", index);
    app.get("/hello/:name", hello);
    app.get("/person/:name", person);
}

async fn index(_req: Request) -> HandlerResult {
    Ok(Response::text(WELCOME))
}

async fn hello(req: Request) -> HandlerResult {
    let name = name_param(&req)?;
    Ok(Response::text(format!("Hello {}!", name)))
}

async fn person(req: Request) -> HandlerResult {
    let name = name_param(&req)?;
    Response::ok(&Person::new(name))
}

// The router only reaches these handlers with the capture present; the
// guard keeps the handlers total anyway.
fn name_param(req: &Request) -> Result<&str, ServiceError> {
    req.param("name")
        .ok_or_else(|| ServiceError::BadRequest("missing name path parameter".to_string()))
}
