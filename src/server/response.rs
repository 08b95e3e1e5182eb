use std::fmt;
use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::request::LINE_TERMINATOR;

pub const HTTP_VERSION: &str = "HTTP/1.1";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

const CONNECTION_HEADER: &str = "Connection";
const CONNECTION_CLOSE: &str = "close";
const CONTENT_LENGTH_HEADER: &str = "Content-Length";
const CONTENT_TYPE_HEADER: &str = "Content-Type";
const LOCATION_HEADER: &str = "Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Found,
    BadRequest,
    NotFound,
}

impl StatusCode {
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Found => 302,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Found => "Found",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// A response ready to be serialized. Every response closes the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Response {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut response = Self::new(StatusCode::Ok);
        response
            .headers
            .push((CONTENT_TYPE_HEADER, content_type.to_string()));
        response.body = body.into();
        response
    }

    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new(StatusCode::Found);
        response
            .headers
            .push((LOCATION_HEADER, location.to_string()));
        response
    }

    pub fn bad_request() -> Self {
        Self::new(StatusCode::BadRequest)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// serialize the status line, headers and body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("{} {}{}", HTTP_VERSION, self.status, LINE_TERMINATOR);

        let mut push_header = |name: &str, value: &str| {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str(LINE_TERMINATOR);
        };

        push_header(CONNECTION_HEADER, CONNECTION_CLOSE);
        for (name, value) in &self.headers {
            push_header(name, value);
        }
        push_header(CONTENT_LENGTH_HEADER, &self.body.len().to_string());
        head.push_str(LINE_TERMINATOR);

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }

    pub async fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.to_bytes()).await?;
        writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(response: &Response) -> String {
        String::from_utf8(response.to_bytes()).unwrap()
    }

    #[test]
    fn test_status_line_and_close_header() {
        let text = as_text(&Response::not_found());

        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("\r\nConnection: close\r\n"));
        assert!(text.contains("\r\nContent-Length: 0\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_redirect_has_location() {
        let response = Response::redirect("/success");
        let text = as_text(&response);

        assert_eq!(response.status.code(), 302);
        assert!(text.starts_with("HTTP/1.1 302 Found\r\n"));
        assert!(text.contains("\r\nLocation: /success\r\n"));
        assert_eq!(response.header("location"), Some("/success"));
    }

    #[test]
    fn test_content_length_counts_bytes_not_chars() {
        let body = "Привет";
        let response = Response::ok(CONTENT_TYPE_HTML, body);
        let text = as_text(&response);

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains(&format!("\r\nContent-Length: {}\r\n", body.len())));
        assert!(text.contains("\r\nContent-Type: text/html; charset=utf-8\r\n"));
        assert!(text.ends_with(&format!("\r\n\r\n{}", body)));
    }

    #[test]
    fn test_bad_request_status() {
        assert!(as_text(&Response::bad_request()).starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_write_to() {
        let response = Response::ok("text/plain", "hi");
        let mut out: Vec<u8> = Vec::new();
        response.write_to(&mut out).await.unwrap();

        assert_eq!(out, response.to_bytes());
    }
}
