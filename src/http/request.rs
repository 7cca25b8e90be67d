/// HTTP request methods the server acts on.
///
/// Anything else on the request line is kept as a raw string in
/// [`ParsedRequest::method`] and answered with 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a file
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
}

/// Protocol versions accepted in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

/// The first line of a request, split into its three tokens.
///
/// Fields are filled left to right with whatever tokens are present; missing
/// ones are empty strings. No headers or body are modelled. Nothing is
/// validated or decoded here, so `raw_path` may contain `%XX` escapes, `..`
/// segments or a query string exactly as the client sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: String,
    pub raw_path: String,
    pub protocol_version: String,
}

impl Method {
    /// Parses a method token (case-sensitive).
    ///
    /// # Example
    ///
    /// ```
    /// # use nanoserve::http::request::Method;
    /// assert_eq!(Method::from_str("HEAD"), Some(Method::HEAD));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            _ => None,
        }
    }
}

impl Version {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "HTTP/1.0" => Some(Version::Http10),
            "HTTP/1.1" => Some(Version::Http11),
            _ => None,
        }
    }
}

impl ParsedRequest {
    pub fn method(&self) -> Option<Method> {
        Method::from_str(&self.method)
    }
}
