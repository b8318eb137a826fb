//! Wire-level tests: bind an ephemeral port, spawn the accept loop and
//! talk plain HTTP/1.1 over a TCP socket.

use greeter::app::Application;
use greeter::greeting::{self, Person};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn spawn_service() -> SocketAddr {
    let mut app = Application::new();
    greeting::register(&mut app);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(app.serve(listener));
    addr
}

struct RawResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: String,
}

async fn send(addr: SocketAddr, raw: &str) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let text = String::from_utf8(buf).unwrap();

    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_lowercase(), value.trim().to_string()))
        .collect();

    RawResponse {
        status,
        headers,
        body: body.to_string(),
    }
}

async fn get(addr: SocketAddr, path: &str) -> RawResponse {
    send(
        addr,
        &format!("GET {} HTTP/1.1\r\nhost: localhost\r\n\r\n", path),
    )
    .await
}

#[tokio::test]
async fn root_returns_the_fixed_welcome() {
    let addr = spawn_service().await;
    let response = get(addr, "/").await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        "Hello, world! Add /hello/there to the URL to get a friendly reply."
    );
    assert_eq!(
        response.headers.get("content-type").map(String::as_str),
        Some("text/plain")
    );
}

#[tokio::test]
async fn hello_echoes_the_path_parameter() {
    let addr = spawn_service().await;
    let response = get(addr, "/hello/there").await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "Hello there!");
}

#[tokio::test]
async fn person_returns_the_name_as_json() {
    let addr = spawn_service().await;
    let response = get(addr, "/person/Ann").await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    let parsed: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(parsed, serde_json::json!({ "name": "Ann" }));
    assert_eq!(
        serde_json::from_str::<Person>(&response.body).unwrap(),
        Person::new("Ann")
    );
}

#[tokio::test]
async fn repeated_requests_get_identical_answers() {
    let addr = spawn_service().await;
    for _ in 0..3 {
        let response = get(addr, "/hello/there").await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "Hello there!");
    }
}

#[tokio::test]
async fn percent_encoded_names_are_decoded() {
    let addr = spawn_service().await;
    let response = get(addr, "/hello/John%20Doe").await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "Hello John Doe!");
}

#[tokio::test]
async fn query_strings_do_not_change_routing() {
    let addr = spawn_service().await;
    let response = get(addr, "/?utm_source=test").await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        "Hello, world! Add /hello/there to the URL to get a friendly reply."
    );
}

#[tokio::test]
async fn trailing_slashes_route_identically() {
    let addr = spawn_service().await;
    let response = get(addr, "/hello/there/").await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "Hello there!");
}

#[tokio::test]
async fn unknown_paths_get_a_json_404() {
    let addr = spawn_service().await;
    let response = get(addr, "/goodbye/there").await;

    assert_eq!(response.status, 404);
    let parsed: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(parsed["error"]["status"], 404);
}

#[tokio::test]
async fn head_answers_like_get_without_a_body() {
    let addr = spawn_service().await;
    let response = send(addr, "HEAD / HTTP/1.1\r\nhost: localhost\r\n\r\n").await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "");
    assert_eq!(
        response.headers.get("content-length").map(String::as_str),
        Some("0")
    );
}

#[tokio::test]
async fn responses_carry_framing_headers() {
    let addr = spawn_service().await;
    let response = get(addr, "/hello/there").await;

    assert_eq!(
        response.headers.get("content-length").map(String::as_str),
        Some("12")
    );
    assert!(response.headers.contains_key("date"));
}
