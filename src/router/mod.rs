//! Explicit route table: method + path pattern -> handler function.
//!
//! Patterns are plain paths with optional `:name` segments, e.g.
//! `/hello/:name`. Exact paths are resolved by table lookup; patterns are
//! matched segment by segment, and captured segments are percent-decoded
//! before they reach the handler.

use crate::error::ServiceResult;
use crate::http::{Method, Request, Response};
use crate::middleware::{Middleware, MiddlewareManager, Next};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;

pub type HandlerResult = ServiceResult<Response>;

pub trait IntoResponse {
    fn into_response_future(self) -> BoxFuture<'static, HandlerResult>;
}

impl<F: Future<Output = HandlerResult> + Send + 'static> IntoResponse for F {
    fn into_response_future(self) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self)
    }
}

pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: Request) -> BoxFuture<'static, HandlerResult>;

    fn dyn_clone<'s>(&self) -> Box<dyn Handler + 's>
    where
        Self: 's;
}

impl Clone for Box<dyn Handler> {
    fn clone(&self) -> Box<dyn Handler> {
        self.dyn_clone()
    }
}

impl<F, R> Handler for F
where
    F: Fn(Request) -> R + Send + Sync + Clone + 'static,
    R: IntoResponse,
{
    fn handle(&self, req: Request) -> BoxFuture<'static, HandlerResult> {
        (self)(req).into_response_future()
    }

    fn dyn_clone<'s>(&self) -> Box<dyn Handler + 's>
    where
        Self: 's,
    {
        Box::new((*self).clone())
    }
}

#[derive(Clone)]
pub(crate) struct Route {
    pub(crate) middlewares: MiddlewareManager,
    pub(crate) handler: Box<dyn Handler>,
}

impl Route {
    pub async fn handle(&self, req: Request) -> HandlerResult {
        self.middlewares
            .call(req, Next::new_handler(self.handler.clone()))
            .await
    }
}

#[derive(Clone)]
pub struct Router {
    pub(crate) middlewares: MiddlewareManager,
    pub(crate) routes: HashMap<String, HashMap<Method, Route>>,
    pub(crate) dynamic_routes: Vec<String>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            middlewares: MiddlewareManager::new(),
            routes: HashMap::new(),
            dynamic_routes: Vec::new(),
        }
    }

    /// Registers a GET route.
    pub fn get<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::GET, path, handler);
        self
    }

    /// Registers a route for an arbitrary method. Paths are normalized so
    /// `/hello/` and `/hello` land on the same table entry.
    pub fn add<F, R>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(Request) -> R + Send + Sync + Clone + 'static,
        R: IntoResponse,
    {
        let path = normalize_path(path);
        if path.contains(':') && !self.dynamic_routes.contains(&path) {
            self.dynamic_routes.push(path.clone());
        }
        self.routes.entry(path).or_default().insert(
            method,
            Route {
                middlewares: self.middlewares.clone(),
                handler: Box::new(handler),
            },
        );
    }

    /// Adds a middleware applied to every route registered afterwards.
    pub fn middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.add(middleware);
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn normalize_path(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Matches a request path against a registered pattern, capturing `:name`
/// segments. Captures are percent-decoded; a capture that fails to decode
/// is kept as-is rather than failing the request.
pub(crate) fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(name) = pattern_part.strip_prefix(':') {
            let value = urlencoding::decode(path_part)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| path_part.to_string());
            params.insert(name.to_string(), value);
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}
