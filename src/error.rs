//! Error types.
//!
//! Two families, never mixed:
//!
//! - [`RouteError`] is a configuration mistake caught while the routing table
//!   is being built. The panicking registration methods turn it into a startup
//!   failure; the `try_*` forms hand it back.
//! - [`Error`] is an infrastructure failure from [`Server`](crate::Server):
//!   a bad listen address or an I/O error.
//!
//! Request-time outcomes (404, 405, redirects) are [`Response`](crate::Response)
//! values, not errors.

use thiserror::Error;

/// The error type returned by the server's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid socket address `{0}`")]
    Addr(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// A routing table configuration error.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RouteError {
    #[error("empty parameter name `{{}}` in route `{pattern}`")]
    EmptyParam { pattern: String },

    #[error(
        "parameter `{{{name}}}` conflicts with `{{{existing}}}` at the same level in route `{pattern}`"
    )]
    ParamConflict {
        pattern: String,
        existing: String,
        name: String,
    },

    #[error("wildcard `*` must be the last segment in route `{pattern}`")]
    WildcardNotLast { pattern: String },

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    #[error("middleware cannot be added to the root router once dispatch has started")]
    MiddlewareAfterDispatch,
}
