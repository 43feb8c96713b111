use httpwire::http::headers::Headers;
use httpwire::http::request::{Method, Request, RequestLine};

fn request(method: Method, target: &str, headers: Headers, body: &[u8]) -> Request {
    Request {
        request_line: RequestLine {
            method,
            target: target.to_string(),
            version: "1.1".to_string(),
        },
        headers,
        body: body.to_vec(),
    }
}

#[test]
fn test_request_header_retrieval() {
    let mut headers = Headers::new();
    headers.set("Host", "example.com").unwrap();
    headers.set("Content-Type", "application/json").unwrap();

    let req = request(Method::GET, "/", headers, b"");

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_accessors() {
    let req = request(Method::DELETE, "/items/3", Headers::new(), b"");

    assert_eq!(req.method(), Method::DELETE);
    assert_eq!(req.target(), "/items/3");
}

#[test]
fn test_request_with_body() {
    let body_content = b"test body content";
    let req = request(Method::POST, "/api", Headers::new(), body_content);

    assert_eq!(req.body, body_content.to_vec());
}

#[test]
fn test_request_method_equality() {
    assert_eq!(Method::GET, Method::GET);
    assert_ne!(Method::GET, Method::POST);
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from_str("GET"), Some(Method::GET));
    assert_eq!(Method::from_str("POST"), Some(Method::POST));
    assert_eq!(Method::from_str("PUT"), Some(Method::PUT));
    assert_eq!(Method::from_str("DELETE"), Some(Method::DELETE));
    assert_eq!(Method::from_str("PATCH"), Some(Method::PATCH));
    assert_eq!(Method::from_str("OPTIONS"), None);
    assert_eq!(Method::from_str("INVALID"), None);
    assert_eq!(Method::from_str("get"), None); // Case-sensitive
}

#[test]
fn test_method_display() {
    assert_eq!(Method::PATCH.to_string(), "PATCH");
    assert_eq!(Method::DELETE.as_str(), "DELETE");
}

#[test]
fn test_request_line_display() {
    let line = RequestLine {
        method: Method::PUT,
        target: "/coffee".to_string(),
        version: "1.1".to_string(),
    };

    assert_eq!(line.to_string(), "PUT /coffee HTTP/1.1");
}
