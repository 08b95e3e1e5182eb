use std::collections::HashMap;
use std::fmt;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

pub const LINE_TERMINATOR: &str = "\r\n";

/// longest request or header line we are willing to buffer
pub const MAX_LINE_LENGTH: u64 = 8 * 1024;
pub const MAX_HEADERS: usize = 100;

/// Errors raised while reading a request off the wire.
#[derive(Debug)]
pub enum HttpError {
    /// the peer closed the stream before sending a single byte
    ConnectionClosed,

    /// the start line is not `METHOD SP target SP protocol CRLF`
    MalformedRequestLine(String),

    /// a header line has no `": "` separator or the block never ends
    MalformedHeader(String),

    /// a query element has no `=`
    MalformedQuery(String),

    /// a line exceeded `MAX_LINE_LENGTH` without a terminator
    LineTooLong,

    Io(io::Error),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::ConnectionClosed => write!(f, "connection closed before request"),
            HttpError::MalformedRequestLine(line) => {
                write!(f, "malformed request line: {:?}", line)
            }
            HttpError::MalformedHeader(line) => write!(f, "malformed header: {:?}", line),
            HttpError::MalformedQuery(elem) => write!(f, "malformed query element: {:?}", elem),
            HttpError::LineTooLong => {
                write!(f, "line longer than {} bytes", MAX_LINE_LENGTH)
            }
            HttpError::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HttpError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for HttpError {
    fn from(err: io::Error) -> Self {
        HttpError::Io(err)
    }
}

/// Request method. Anything but GET is kept as raw text so the router can
/// reject it and the log can still show what the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Other(String),
}

impl Method {
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Other(raw) => write!(f, "{}", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    pub protocol: String,
}

impl RequestLine {
    /// parse `GET /auth?code=x HTTP/1.1` (terminator already stripped)
    pub fn parse(line: &str) -> Result<Self, HttpError> {
        let parts: Vec<&str> = line.split(' ').collect();

        match parts.as_slice() {
            [method, target, protocol]
                if !method.is_empty() && !target.is_empty() && !protocol.is_empty() =>
            {
                Ok(RequestLine {
                    method: Method::from_token(method),
                    target: target.to_string(),
                    protocol: protocol.to_string(),
                })
            }
            _ => Err(HttpError::MalformedRequestLine(line.to_string())),
        }
    }

    /// target without the query string
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, self.protocol)
    }
}

/// Header map keyed by lower-cased name. The first occurrence of a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, name: &str, value: &str) {
        self.0
            .entry(name.to_lowercase())
            .or_insert_with(|| value.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub line: RequestLine,
    pub headers: Headers,
}

/// Read one CRLF-terminated line, returning it without the terminator.
/// `Ok(None)` means the stream ended before any byte was read.
async fn read_line<R>(reader: &mut R) -> Result<Option<String>, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_LENGTH)
        .read_until(b'\n', &mut buf)
        .await?;

    if read == 0 {
        return Ok(None);
    }

    if !buf.ends_with(b"\n") {
        if read as u64 >= MAX_LINE_LENGTH {
            return Err(HttpError::LineTooLong);
        }
        // stream ended mid-line
        let partial = String::from_utf8_lossy(&buf).into_owned();
        return Err(HttpError::MalformedRequestLine(partial));
    }

    let line = String::from_utf8(buf).map_err(|e| {
        HttpError::MalformedRequestLine(String::from_utf8_lossy(e.as_bytes()).into_owned())
    })?;

    match line.strip_suffix(LINE_TERMINATOR) {
        Some(stripped) => Ok(Some(stripped.to_string())),
        None => Err(HttpError::MalformedRequestLine(line)),
    }
}

pub async fn read_request_line<R>(reader: &mut R) -> Result<RequestLine, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    match read_line(reader).await? {
        Some(line) => RequestLine::parse(&line),
        None => Err(HttpError::ConnectionClosed),
    }
}

/// Read header lines until the empty line that closes the block.
pub async fn read_headers<R>(reader: &mut R) -> Result<Headers, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Headers::default();
    let mut seen = 0;

    loop {
        let line = match read_line(reader).await {
            Ok(Some(line)) => line,
            Ok(None) => {
                return Err(HttpError::MalformedHeader(
                    "stream ended inside header block".to_string(),
                ))
            }
            Err(HttpError::MalformedRequestLine(line)) => {
                return Err(HttpError::MalformedHeader(line))
            }
            Err(HttpError::LineTooLong) => {
                return Err(HttpError::MalformedHeader("header line too long".to_string()))
            }
            Err(err) => return Err(err),
        };

        if line.is_empty() {
            return Ok(headers);
        }

        seen += 1;
        if seen > MAX_HEADERS {
            return Err(HttpError::MalformedHeader(format!(
                "more than {} headers",
                MAX_HEADERS
            )));
        }

        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| HttpError::MalformedHeader(line.clone()))?;

        headers.insert(name, value);
    }
}

pub async fn read_request<R>(reader: &mut R) -> Result<Request, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_request_line(reader).await?;
    let headers = read_headers(reader).await?;

    Ok(Request { line, headers })
}
