use crate::error::ServiceError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl Response {
    pub fn new(status: u16) -> Response {
        Response {
            status,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    pub fn status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    pub fn body<T: AsRef<str>>(&mut self, body: T) -> &mut Self {
        self.body = body.as_ref().to_string();
        self
    }

    pub fn header<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.headers
            .insert(name.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Serializes `value` with serde_json and marks the response as JSON.
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<&mut Self, ServiceError> {
        let json_string = serde_json::to_string(value)
            .map_err(|e| ServiceError::Internal(format!("JSON serialization error: {}", e)))?;
        self.header("Content-Type", "application/json");
        self.body(json_string);
        Ok(self)
    }

    /// 200 response with a JSON body.
    pub fn ok<T: Serialize>(data: &T) -> Result<Response, ServiceError> {
        let mut response = Response::new(200);
        response.json(data)?;
        Ok(response)
    }

    /// 200 response with a plain-text body.
    pub fn text<T: AsRef<str>>(content: T) -> Response {
        let mut response = Response::new(200);
        response.header("Content-Type", "text/plain").body(content);
        response
    }

    pub fn no_content() -> Response {
        Response::new(204)
    }

    /// Renders a `ServiceError` as the JSON error body every failed
    /// request gets.
    pub fn error(err: ServiceError) -> Response {
        let status = err.status_code();
        let mut response = Response::new(status);
        let body = serde_json::json!({
            "error": {
                "message": err.to_string(),
                "status": status,
            }
        });
        // Serializing a json! literal cannot fail.
        response
            .json(&body)
            .expect("error body failed to serialize");
        response
    }
}
