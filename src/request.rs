//! Incoming HTTP request type.
//!
//! The router never parses anything itself: whoever owns the transport builds
//! a `Request` from an already-parsed method, path, headers and body. The
//! router only reads the method and path and fills in path parameters.

use bytes::Bytes;

/// An incoming HTTP request.
///
/// ```rust
/// use wend::Request;
///
/// let req = Request::new("POST", "/users")
///     .with_header("content-type", "application/json")
///     .with_body(r#"{"name":"alice"}"#);
/// assert_eq!(req.header("Content-Type"), Some("application/json"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Bytes,
    params: Vec<(String, String)>,
    route: Option<String>,
    allow: Option<String>,
}

impl Request {
    /// Builds a request with no headers, query or body.
    ///
    /// `path` is taken as-is: percent-decoding is the caller's business.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: None,
            headers: Vec::new(),
            body: Bytes::new(),
            params: Vec::new(),
            route: None,
            allow: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`. A trailing `*` wildcard stores what it consumed under
    /// `"*"`: `/files/*` on `/files/a/b.txt` gives `req.param("*") == Some("a/b.txt")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All path parameters in path order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets a path parameter, replacing an existing value with the same name.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
    }

    /// The registered pattern that matched this request, e.g. `/users/{id}`.
    ///
    /// `None` until the router has matched the request to a route.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// The methods the matched path supports, formatted for an `Allow` header.
    ///
    /// Only set on requests handed to the method-not-allowed or automatic
    /// `OPTIONS` handler.
    pub fn allow(&self) -> Option<&str> {
        self.allow.as_deref()
    }

    pub(crate) fn set_allow(&mut self, allow: &str) {
        self.allow = Some(allow.to_owned());
    }

    pub(crate) fn matched(&mut self, route: Option<&str>, params: Vec<(String, String)>) {
        self.route = route.map(str::to_owned);
        self.params = params;
    }
}
