//! Request IDs for correlating client calls with server logs.
//!
//! Every outgoing call gets a fresh UUID v4 in the `x-request-id` header.
//! The same ID is recorded on the current tracing span and set as a Sentry
//! tag so an error report points at the failing request.

use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate an ID for the next request and attach it to the current span
/// and Sentry scope.
pub fn next_request_id() -> String {
    let request_id = Uuid::new_v4().to_string();

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    request_id
}
