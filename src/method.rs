//! HTTP method as a typed enum, and the per-node method table.
//!
//! The router only knows the nine RFC 9110 methods. A request carrying any
//! other method string still resolves its path, but never finds a handler, so
//! it is answered with `405 Method Not Allowed` and an accurate `Allow` list.

use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;
use crate::handler::BoxedHandler;

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Connect,
    Options,
    Trace,
}

impl Method {
    pub const COUNT: usize = 9;

    /// The canonical method set. A route registered without methods serves
    /// all of these.
    pub const ALL: [Method; Method::COUNT] = [
        Self::Get,
        Self::Head,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Connect,
        Self::Options,
        Self::Trace,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }

    /// Parses a method token at registration time, ignoring ASCII case:
    /// `"get"`, `"Get"` and `"GET"` all name [`Method::Get`].
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(token))
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Parses a request method. Case-sensitive per RFC 9110 §9.1, so `"get"` on
/// the wire is an unknown method.
impl FromStr for Method {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RouteError::UnknownMethod(s.to_owned()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes the method list of one registration.
///
/// An empty list means every method; `GET` drags `HEAD` along with it.
pub(crate) fn expand(mut methods: Vec<Method>) -> Vec<Method> {
    if methods.is_empty() {
        return Method::ALL.to_vec();
    }
    if methods.contains(&Method::Get) && !methods.contains(&Method::Head) {
        methods.push(Method::Head);
    }
    methods.sort();
    methods.dedup();
    methods
}

/// Fixed-size handler table, one slot per [`Method`].
#[derive(Default)]
pub(crate) struct MethodTable {
    slots: [Option<BoxedHandler>; Method::COUNT],
}

impl MethodTable {
    pub(crate) fn get(&self, method: Method) -> Option<&BoxedHandler> {
        self.slots[method.index()].as_ref()
    }

    pub(crate) fn insert(&mut self, method: Method, handler: BoxedHandler) {
        self.slots[method.index()] = Some(handler);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub(crate) fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL
            .into_iter()
            .filter(|m| self.slots[m.index()].is_some())
    }
}
