use crate::http::Request;
use crate::middleware::{Middleware, MiddlewareResult, Next};
use log::info;
use std::time::Instant;

/// Logs one line per handled request: status, method, path and elapsed
/// time in milliseconds.
pub struct RequestLogger;

impl Middleware for RequestLogger {
    fn call(&self, req: Request, next: Next) -> MiddlewareResult {
        Box::pin(async move {
            let start = Instant::now();
            let path = req.path.clone();
            let method = req.method;
            let res = next.handle(req).await;
            let status = match &res {
                Ok(res) => res.status,
                Err(err) => err.status_code(),
            };
            let duration = start.elapsed().as_millis();
            info!("[{}] {:?} {} - {}ms", status, method, path, duration);
            res
        })
    }

    fn clone_box(&self) -> Box<dyn Middleware> {
        Box::new(Self)
    }
}
