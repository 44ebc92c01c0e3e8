//! Request identity: trace ids and the acting user.
//!
//! Authentication happens upstream. The gateway in front of this service
//! forwards the authenticated user's id in `X-User-Id`; handlers additionally
//! accept a `userId` body field, which takes precedence.

use crate::error::{ApiError, ApiResult};
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;
use vidhub_core::{EntityKind, parse_id};

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Request correlation header, echoed on every response.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Longer trace IDs are truncated to prevent log bloat and log injection.
const MAX_TRACE_ID_LEN: usize = 128;

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a trace ID from a client-provided value, keeping at most
    /// `MAX_TRACE_ID_LEN` printable ASCII characters.
    pub fn from_client(value: &str) -> Self {
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user a request acts on behalf of, as forwarded by the gateway.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActingUser(pub Option<Uuid>);

impl ActingUser {
    /// Prefer an explicit `userId` from the request body over the header value.
    pub fn resolve(self, body_user_id: Option<&str>) -> ApiResult<Option<Uuid>> {
        match body_user_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Ok(Some(parse_id(EntityKind::User, raw)?)),
            None => Ok(self.0),
        }
    }
}

fn extract_or_generate_trace_id(req: &Request) -> TraceId {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_else(TraceId::new)
}

fn extract_acting_user(req: &Request) -> ApiResult<ActingUser> {
    let Some(value) = req.headers().get(USER_ID_HEADER) else {
        return Ok(ActingUser(None));
    };
    let raw = value
        .to_str()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;
    if raw.trim().is_empty() {
        return Ok(ActingUser(None));
    }
    Ok(ActingUser(Some(parse_id(EntityKind::User, raw)?)))
}

/// Attach the trace ID and acting user to the request and run it inside a
/// tracing span.
pub async fn identity_middleware(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let trace_id = extract_or_generate_trace_id(&req);
    let acting_user = extract_acting_user(&req)?;

    req.extensions_mut().insert(acting_user);

    let span = match acting_user.0 {
        Some(user) => tracing::info_span!("request", trace_id = %trace_id, user_id = %user),
        None => tracing::info_span!("request", trace_id = %trace_id),
    };

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    Ok(response)
}

/// The acting user attached by [`identity_middleware`].
pub fn acting_user(req: &Request) -> ActingUser {
    req.extensions()
        .get::<ActingUser>()
        .copied()
        .unwrap_or_default()
}
