//! The main entry point for the greeting service.
//!
//! `Application` owns the route table and the listening loop: it accepts
//! TCP connections, parses one HTTP/1.1 request per connection, resolves
//! the route and writes the response back.
//!
//! # Examples
//!
//! ```no_run
//! use greeter::app::Application;
//! use greeter::http::Response;
//!
//! let mut app = Application::new();
//! app.get("/", |_req| async { Ok(Response::text("Hello!")) });
//! app.listen("127.0.0.1:8081").unwrap();
//! ```

use crate::error::{ServiceError, ServiceResult};
use crate::http::{Body, Method, Request, Response};
use crate::middleware::Middleware;
use crate::router::{match_pattern, normalize_path, HandlerResult, IntoResponse, Route, Router};
use futures::FutureExt;
use log::{error, info, warn};
use std::collections::HashMap;
use std::io::{Error, ErrorKind};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

#[derive(Clone)]
pub struct Application {
    pub max_connections: usize,
    router: Router,
}

impl Application {
    pub fn new() -> Self {
        Self {
            max_connections: 256,
            router: Router::new(),
        }
    }

    pub fn max_connections(&mut self, max_connections: usize) -> &mut Self {
        self.max_connections = max_connections;
        self
    }

    /// Registers a GET route handler.
    ///
    /// # Arguments
    /// * `path` - The URL path to match, with optional `:name` segments
    /// * `handler` - The async handler function
    pub fn get<F, R>(&mut self, path: &str, handler: F)
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.router.get(path, handler);
    }

    /// Registers a route handler for an arbitrary HTTP method.
    pub fn add<F, R>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.router.add(method, path, handler);
    }

    /// Adds a middleware applied to every route registered afterwards.
    pub fn middleware(&mut self, middleware: impl Middleware + 'static) {
        self.router.middleware(middleware);
    }

    /// Binds `addr` and serves forever on a fresh tokio runtime.
    ///
    /// # Arguments
    /// * `addr` - Address to listen on (e.g. "127.0.0.1:8081")
    pub fn listen(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        let runtime = Runtime::new()?;
        runtime.block_on(async {
            let listener = TcpListener::bind(addr).await?;
            info!("server running on http://{}", addr);
            self.serve(listener).await
        })?;
        Ok(())
    }

    /// The accept loop, separated from [`listen`](Self::listen) so callers
    /// that already hold a runtime (tests included) can bind their own
    /// listener first.
    pub async fn serve(self, listener: TcpListener) -> ServiceResult<()> {
        let connection_counter = Arc::new(AtomicUsize::new(0));

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let counter = Arc::clone(&connection_counter);
                    if counter.load(Ordering::Relaxed) >= self.max_connections {
                        warn!("connection cap reached, dropping connection from {}", peer);
                        continue;
                    }
                    counter.fetch_add(1, Ordering::Relaxed);
                    let app = self.clone();

                    tokio::spawn(async move {
                        if let Err(e) = app.handle_connection(stream).await {
                            error!("connection error: {}", e);
                        }
                        counter.fetch_sub(1, Ordering::Relaxed);
                    });
                }
                Err(e) => error!("connection failed: {}", e),
            }
        }
    }

    async fn handle_connection<S>(&self, mut stream: S) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buf_reader = BufReader::new(&mut stream);
        let mut request_line = String::new();
        buf_reader.read_line(&mut request_line).await?;

        if request_line.is_empty() {
            return Ok(());
        }

        let mut parts = request_line.trim().split_whitespace();
        let method_token = parts
            .next()
            .ok_or_else(|| Error::new(ErrorKind::InvalidData, "invalid request line"))?
            .to_string();
        let full_path = parts
            .next()
            .ok_or_else(|| Error::new(ErrorKind::InvalidData, "invalid request line"))?;

        // Split path and query, normalizing the trailing slash the same
        // way route registration does.
        let mut path_parts = full_path.split('?');
        let path = normalize_path(path_parts.next().unwrap_or("/"));
        let query = path_parts.next().map(Self::parse_query).unwrap_or_default();

        // Header names are lowercased so lookups are case-insensitive.
        let mut headers = HashMap::new();
        loop {
            let mut line = String::new();
            buf_reader.read_line(&mut line).await?;

            if line.trim().is_empty() {
                break;
            }

            if let Some((key, value)) = line.trim().split_once(':') {
                headers.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }

        // Drain the body if Content-Length says there is one, so the
        // request stays framed even though no endpoint reads it.
        let mut data = Vec::new();
        if let Some(content_length) = headers.get("content-length") {
            if let Ok(length) = content_length.parse::<usize>() {
                data.reserve(length);
                let mut take = buf_reader.take(length as u64);
                take.read_to_end(&mut data).await?;
            }
        }
        let content_type = headers.get("content-type").cloned().unwrap_or_default();

        let response = match Method::parse(&method_token) {
            None => Response::error(ServiceError::BadRequest(format!(
                "unsupported method: {}",
                method_token
            ))),
            Some(method) => {
                let request = Request {
                    method,
                    path,
                    query,
                    params: HashMap::new(),
                    headers,
                    body: Body { content_type, data },
                };
                self.dispatch(request).await
            }
        };

        Self::write_response(&mut stream, &response).await
    }

    /// Runs the routed handler with a panic guard; any outcome, including
    /// a panicking handler, becomes a writable `Response`.
    async fn dispatch(&self, request: Request) -> Response {
        let outcome = AssertUnwindSafe(self.handle(request)).catch_unwind().await;
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = if let Some(msg) = panic.downcast_ref::<&str>() {
                    msg.to_string()
                } else if let Some(msg) = panic.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    "unknown panic".to_string()
                };
                Err(ServiceError::Panic(message))
            }
        };
        outcome.unwrap_or_else(Response::error)
    }

    async fn handle(&self, mut req: Request) -> HandlerResult {
        let path = req.path.clone();
        let method = req.method;

        if let Some(routes) = self.router.routes.get(&path) {
            if let Some(route) = routes.get(&method) {
                return route.handle(req).await;
            }
            if method == Method::HEAD {
                if let Some(route) = routes.get(&Method::GET) {
                    return Self::handle_head(route.clone(), req).await;
                }
            }
            if method == Method::OPTIONS {
                if let Some(route) = routes.get(&Method::GET) {
                    return Self::handle_options(route.clone(), req).await;
                }
            }
        }

        for pattern in &self.router.dynamic_routes {
            if let Some(params) = match_pattern(pattern, &path) {
                if let Some(routes) = self.router.routes.get(pattern) {
                    if let Some(route) = routes.get(&method) {
                        req.params = params;
                        return route.handle(req).await;
                    }
                    if method == Method::HEAD {
                        if let Some(route) = routes.get(&Method::GET) {
                            req.params = params;
                            return Self::handle_head(route.clone(), req).await;
                        }
                    }
                    if method == Method::OPTIONS {
                        if let Some(route) = routes.get(&Method::GET) {
                            req.params = params;
                            return Self::handle_options(route.clone(), req).await;
                        }
                    }
                }
            }
        }

        Err(ServiceError::NotFound)
    }

    // HEAD on a GET route answers like the GET, body stripped.
    async fn handle_head(route: Route, mut req: Request) -> HandlerResult {
        req.method = Method::GET;
        let mut response = route.handle(req).await?;
        response.body = String::new();
        Ok(response)
    }

    // OPTIONS on a GET route answers 200 through the same middleware chain.
    async fn handle_options(route: Route, req: Request) -> HandlerResult {
        let route = Route {
            middlewares: route.middlewares.clone(),
            handler: Box::new(|_req| async { Ok(Response::new(200)) }),
        };
        route.handle(req).await
    }

    async fn write_response<S>(stream: &mut S, response: &Response) -> Result<(), Error>
    where
        S: AsyncWrite + Unpin,
    {
        let mut raw = format!("HTTP/1.1 {}\r\n", response.status);
        raw += &format!("Date: {}\r\n", httpdate::fmt_http_date(SystemTime::now()));
        response.headers.iter().for_each(|(name, value)| {
            raw += &format!("{}: {}\r\n", name, value);
        });
        raw += &format!(
            "Content-Length: {}\r\n\r\n{}",
            response.body.len(),
            response.body
        );
        stream.write_all(raw.as_bytes()).await
    }

    fn parse_query(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|s| !s.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.split('=');
                Some((
                    parts.next()?.to_string(),
                    parts.next().unwrap_or("").to_string(),
                ))
            })
            .collect()
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}
