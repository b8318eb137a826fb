//! # Greeter
//!
//! A minimal greeting REST service on a small hand-rolled async HTTP
//! server.
//!
//! Routing is an explicit route table (method + path pattern -> handler)
//! resolved by a simple path-matching router; JSON responses come from an
//! explicit serde_json serialization call.
//!
//! ## Endpoints
//!
//! - `GET /` - static welcome text
//! - `GET /hello/:name` - `Hello {name}!`
//! - `GET /person/:name` - `{"name":"{name}"}`
//!
//! ## Quick Start
//!
//! ```no_run
//! use greeter::app::Application;
//! use greeter::middleware::RequestLogger;
//!
//! let mut app = Application::new();
//! app.middleware(RequestLogger);
//! greeter::greeting::register(&mut app);
//! app.listen("127.0.0.1:8081").unwrap();
//! ```

pub mod app;
pub mod error;
pub mod greeting;
pub mod http;
pub mod middleware;
pub mod router;

pub use app::Application;
pub use error::{ServiceError, ServiceResult};
pub use http::{Request, Response};
