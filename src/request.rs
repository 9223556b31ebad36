//! Request/response currency types for the schedule loop.
//!
//! These are deliberately thin: the crate decorates an existing client's
//! execute step, it does not speak HTTP itself. A real client adapts its own
//! request/response types behind the [`Transport`](crate::Transport) trait;
//! the loop only needs to clone requests per attempt, let retry callbacks
//! mutate headers, and read response status classes.

use crate::overrides::ScheduleOverrides;
use std::fmt;

/// HTTP request method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET (the default).
    #[default]
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
}

impl Method {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical request specification.
///
/// One `Request` handed to [`ScheduledClient::send`](crate::ScheduledClient::send)
/// may turn into several physical attempts; each attempt works on an
/// independent [`fork`](Request::fork) so mutations from a retry callback
/// never leak back into the original.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    pub(crate) overrides: ScheduleOverrides,
}

impl Request {
    /// Build a request with the given method and URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), ..Self::default() }
    }

    /// Shorthand for a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Shorthand for a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Append a header (builder style).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append_header(name, value);
        self
    }

    /// Append a header in place; retry callbacks use this on the sub-request.
    pub fn append_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Set the request body (builder style).
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Override the globally configured schedules for this request only.
    ///
    /// ```rust
    /// use reprise::{Request, Schedule};
    ///
    /// let request = Request::get("https://example.com/health")
    ///     .with_schedule(|s| {
    ///         s.retry(Schedule::recurs(5));
    ///     });
    /// ```
    pub fn with_schedule(mut self, configure: impl FnOnce(&mut ScheduleOverrides)) -> Self {
        configure(&mut self.overrides);
        self
    }

    /// Request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value for a header, matched case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Request body bytes.
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Derive an independent sub-request for one physical attempt.
    ///
    /// Copies method, URL, headers, and body; schedule overrides stay on the
    /// logical request and are not inherited.
    pub fn fork(&self) -> Request {
        Request {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            overrides: ScheduleOverrides::default(),
        }
    }
}

/// An HTTP response as seen by the repeat schedule.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Build a response with the given status code.
    pub fn new(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new() }
    }

    /// Append a header (builder style).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body (builder style).
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True for 5xx statuses.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// First value for a header, matched case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Response body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Schedule;

    #[test]
    fn fork_copies_payload_but_not_overrides() {
        let request = Request::post("https://example.com/items")
            .header("content-type", "application/json")
            .body(br#"{"id":1}"#.to_vec())
            .with_schedule(|s| {
                s.retry(Schedule::recurs(5));
            });

        let sub = request.fork();
        assert_eq!(sub.method(), Method::Post);
        assert_eq!(sub.url(), "https://example.com/items");
        assert_eq!(sub.header_value("Content-Type"), Some("application/json"));
        assert_eq!(sub.body_bytes(), br#"{"id":1}"#);
        assert!(sub.overrides.is_empty());
        assert!(!request.overrides.is_empty());
    }

    #[test]
    fn fork_mutations_do_not_leak_back() {
        let request = Request::get("https://example.com");
        let mut sub = request.fork();
        sub.append_header("x-retry-count", "1");
        assert!(request.header_value("x-retry-count").is_none());
        assert_eq!(sub.header_value("x-retry-count"), Some("1"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = Request::get("/").header("X-Trace-Id", "abc");
        assert_eq!(request.header_value("x-trace-id"), Some("abc"));
    }

    #[test]
    fn response_status_classes() {
        assert!(Response::new(204).is_success());
        assert!(!Response::new(204).is_server_error());
        assert!(Response::new(503).is_server_error());
        assert!(!Response::new(404).is_success());
        assert!(!Response::new(404).is_server_error());
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(format!("{}", Method::Delete), "DELETE");
        assert_eq!(Method::default(), Method::Get);
    }
}
