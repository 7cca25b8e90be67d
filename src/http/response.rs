use std::fmt;

use crate::http::request::{Method, Version};

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): File follows (or would follow, for HEAD)
/// - `MethodNotSupported` (400): Method other than GET/HEAD
/// - `Forbidden` (403): File exists but cannot be opened
/// - `NotFound` (404): No regular file at the resolved path
/// - `UriTooLong` (414): Path longer than the configured limit
/// - `HttpVersionNotSupported` (505): Unknown protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Method Not Supported
    MethodNotSupported,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 414 URI Too Long
    UriTooLong,
    /// 505 HTTP Version Not Supported
    HttpVersionNotSupported,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use nanoserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::MethodNotSupported => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::UriTooLong => 414,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    /// Returns the reason phrase sent on the status line.
    ///
    /// 400 deliberately says "Method Not Supported" rather than "Bad Request",
    /// since it is only ever sent for unsupported methods.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MethodNotSupported => "Method Not Supported",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::UriTooLong => "URI Too Long",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

/// Which dialect of the wire protocol the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// CRLF line endings, GET and HEAD, HTTP/1.0 or HTTP/1.1 only.
    Strict,
    /// LF line endings, GET only, any version token accepted.
    Legacy,
}

impl Protocol {
    pub fn from_strict(strict_http: bool) -> Self {
        if strict_http {
            Protocol::Strict
        } else {
            Protocol::Legacy
        }
    }

    pub fn line_ending(&self) -> &'static str {
        match self {
            Protocol::Strict => "\r\n",
            Protocol::Legacy => "\n",
        }
    }

    pub fn accepts_version(&self, version: &str) -> bool {
        match self {
            Protocol::Strict => Version::from_str(version).is_some(),
            Protocol::Legacy => true,
        }
    }

    /// Whether a response to `method` carries a body, or `None` when the
    /// method is not supported in this dialect.
    pub fn include_body(&self, method: Option<Method>) -> Option<bool> {
        match (self, method) {
            (_, Some(Method::GET)) => Some(true),
            (Protocol::Strict, Some(Method::HEAD)) => Some(false),
            _ => None,
        }
    }
}

/// What happened to a request, as far as the client is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    NotFound,
    Forbidden,
    UnsupportedMethod,
    UnsupportedVersion,
    UriTooLong,
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Ok => StatusCode::Ok,
            Outcome::NotFound => StatusCode::NotFound,
            Outcome::Forbidden => StatusCode::Forbidden,
            Outcome::UnsupportedMethod => StatusCode::MethodNotSupported,
            Outcome::UnsupportedVersion => StatusCode::HttpVersionNotSupported,
            Outcome::UriTooLong => StatusCode::UriTooLong,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Ok => "ok",
            Outcome::NotFound => "not found",
            Outcome::Forbidden => "forbidden",
            Outcome::UnsupportedMethod => "unsupported method",
            Outcome::UnsupportedVersion => "unsupported version",
            Outcome::UriTooLong => "uri too long",
        };
        f.write_str(s)
    }
}

/// Status line plus headers of a response. The body, if any, is streamed
/// separately by the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    /// Headers in the order they are written.
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}
