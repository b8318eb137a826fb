use std::collections::HashMap;

#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl Method {
    /// Parses an HTTP method token. Unknown tokens are rejected so the
    /// connection layer can answer 400 instead of silently treating the
    /// request as a GET.
    pub fn parse(s: &str) -> Option<Method> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "CONNECT" => Some(Method::CONNECT),
            "OPTIONS" => Some(Method::OPTIONS),
            "TRACE" => Some(Method::TRACE),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }
}

/// Raw request body, kept only to frame the connection read. None of the
/// greeting endpoints consume one.
#[derive(Debug, Default)]
pub struct Body {
    pub(crate) content_type: String,
    pub(crate) data: Vec<u8>,
}

impl Body {
    pub fn new() -> Body {
        Body::default()
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.data).to_string()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub params: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Body,
}

impl Request {
    /// Looks up a captured path parameter, e.g. `name` for a route
    /// registered as `/hello/:name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Header lookup. Header names are lowercased when the request is
    /// parsed, so the lookup key is lowercased too.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_methods() {
        assert_eq!(Method::parse("GET"), Some(Method::GET));
        assert_eq!(Method::parse("OPTIONS"), Some(Method::OPTIONS));
        assert_eq!(Method::parse("PATCH"), Some(Method::PATCH));
    }

    #[test]
    fn rejects_unknown_and_lowercase_tokens() {
        assert_eq!(Method::parse("BREW"), None);
        assert_eq!(Method::parse("get"), None);
        assert_eq!(Method::parse(""), None);
    }

    #[test]
    fn param_and_header_lookups() {
        let mut request = Request {
            method: Method::GET,
            path: "/hello/there".to_string(),
            query: HashMap::new(),
            params: HashMap::new(),
            headers: HashMap::new(),
            body: Body::new(),
        };
        request.params.insert("name".to_string(), "there".to_string());
        request
            .headers
            .insert("user-agent".to_string(), "curl/8.0".to_string());

        assert_eq!(request.param("name"), Some("there"));
        assert_eq!(request.param("id"), None);
        assert_eq!(request.header("User-Agent"), Some("curl/8.0"));
        assert_eq!(request.header("accept"), None);
    }

    #[test]
    fn body_exposes_raw_bytes_and_text() {
        let body = Body {
            content_type: "text/plain".to_string(),
            data: b"hi".to_vec(),
        };
        assert_eq!(body.content_type(), "text/plain");
        assert_eq!(body.as_bytes(), b"hi");
        assert_eq!(body.as_string(), "hi");
    }
}
