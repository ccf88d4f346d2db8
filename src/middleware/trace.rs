use std::time::Instant;

use tracing::{Instrument, info, info_span};

use super::{Middleware, Next, from_fn};
use crate::request::Request;

/// Per-request tracing middleware.
///
/// Opens an `info`-level `request` span carrying the method and path, runs
/// the rest of the chain inside it, and logs the final status and latency.
/// Installed on the root router it also covers 404, 405 and OPTIONS answers.
pub fn trace() -> Middleware {
    from_fn(|req: Request, next: Next| async move {
        let span = info_span!("request", method = %req.method(), path = %req.path());
        let start = Instant::now();

        let res = next.run(req).instrument(span.clone()).await;

        let latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        span.in_scope(|| {
            info!(status = res.status_code().as_u16(), latency_us, "request completed");
        });
        res
    })
}
