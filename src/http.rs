/*!
 * Minimal HTTP/1.1 message handling for the alignment endpoint.
 *
 * Only what the endpoint needs: one request per connection, bodies framed by
 * `Content-Length`, responses always closing the connection.
 */

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, Take};

use crate::errors::HttpError;

// @const: Upper bound for request line plus headers
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

/// A parsed HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Request target without its query string
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: &str, path: &str) -> Self {
        HttpRequest {
            method: method.to_string(),
            path: path.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Read one request from a buffered stream
///
/// `body_limit` caps the declared `Content-Length`; `None` means no cap.
pub async fn read_request<R>(reader: &mut R, body_limit: Option<usize>) -> Result<HttpRequest, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut head = (&mut *reader).take(MAX_HEAD_BYTES as u64);

    let request_line = match read_head_line(&mut head).await? {
        Some(line) => line,
        None => return Err(HttpError::ConnectionClosed),
    };

    let mut parts = request_line.split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version), None) => (method, target, version),
        _ => return Err(HttpError::Malformed(format!("bad request line: {:?}", request_line))),
    };
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::Malformed(format!("unsupported protocol: {}", version)));
    }

    let path = target.split(['?', '#']).next().unwrap_or_default().to_string();
    let mut request = HttpRequest::new(method, &path);

    loop {
        let line = read_head_line(&mut head)
            .await?
            .ok_or_else(|| HttpError::Malformed("connection closed inside headers".to_string()))?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HttpError::Malformed(format!("bad header line: {:?}", line)))?;
        request.headers.push((name.trim().to_string(), value.trim().to_string()));
    }
    drop(head);

    if request.header("Transfer-Encoding").is_some() {
        return Err(HttpError::LengthRequired);
    }

    let content_length = match request.header("Content-Length") {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| HttpError::Malformed(format!("bad Content-Length: {}", value)))?,
        None => 0,
    };

    if let Some(limit) = body_limit {
        if content_length > limit {
            return Err(HttpError::PayloadTooLarge { limit, actual: content_length });
        }
    }

    // Grow with the bytes actually received, not with the declared length
    let mut body = Vec::new();
    (&mut *reader).take(content_length as u64).read_to_end(&mut body).await?;
    if body.len() != content_length {
        return Err(HttpError::Malformed(format!(
            "body ended after {} of {} bytes",
            body.len(),
            content_length
        )));
    }
    request.body = body;

    Ok(request)
}

/// Read one CRLF (or LF) terminated head line, `None` at end of stream
async fn read_head_line<R>(head: &mut Take<R>) -> Result<Option<String>, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut raw = Vec::new();
    let read = head.read_until(b'\n', &mut raw).await?;
    if read == 0 {
        return Ok(None);
    }
    if !raw.ends_with(b"\n") {
        if head.limit() == 0 {
            return Err(HttpError::HeadTooLarge { limit: MAX_HEAD_BYTES });
        }
        return Err(HttpError::Malformed("truncated request head".to_string()));
    }

    let line = String::from_utf8(raw).map_err(|_| HttpError::Malformed("request head is not UTF-8".to_string()))?;
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// An HTTP response ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response without a body
    pub fn empty(status: u16) -> Self {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Plain text response
    pub fn text(status: u16, body: &str) -> Self {
        Self::empty(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body.as_bytes().to_vec())
    }

    /// JSON response; falls back to a 500 if the value cannot be serialized
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::empty(status)
                .with_header("Content-Type", "application/json")
                .with_body(body),
            Err(e) => Self::text(500, &format!("Failed to encode response: {}", e)),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Encode status line, headers and body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Reason phrase for the status codes the endpoint emits
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        411 => "Length Required",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
