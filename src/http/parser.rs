use crate::http::request::ParsedRequest;

/// Splits the first line of `buf` into method, path and protocol version.
///
/// Never fails: tokens that are missing come back as empty strings, and bytes
/// that are not valid UTF-8 are replaced. Deciding whether the result is
/// acceptable is left to the connection handler.
pub fn parse_request_line(buf: &[u8]) -> ParsedRequest {
    let text = String::from_utf8_lossy(buf);
    let line = text.lines().next().unwrap_or("");

    let mut parts = line.split_whitespace();
    let mut next = || parts.next().unwrap_or("").to_string();

    ParsedRequest {
        method: next(),
        raw_path: next(),
        protocol_version: next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let parsed = parse_request_line(req);

        assert_eq!(parsed.method, "GET");
        assert_eq!(parsed.raw_path, "/index.html");
        assert_eq!(parsed.protocol_version, "HTTP/1.1");
    }

    #[test]
    fn headers_are_ignored() {
        let parsed = parse_request_line(b"HEAD / HTTP/1.0\r\nX-Evil: GET /etc/passwd\r\n\r\n");

        assert_eq!(parsed.raw_path, "/");
    }
}
