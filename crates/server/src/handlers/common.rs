//! Shared handler helpers.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::Request;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use vidhub_core::EntityKind;
use vidhub_metadata::models::UserRow;

/// Maximum size of a JSON request body (1 MiB).
pub const MAX_JSON_BODY_SIZE: usize = 1024 * 1024;

/// Whether a mutation must name its acting user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerPolicy {
    /// Anonymous requests are rejected with 401.
    Required,
    /// Anonymous requests pass; identified ones must be the owner.
    WhenIdentified,
}

/// Check that `actor` may mutate a record owned by `owner_id`.
///
/// `action` is the verb used in the 403 message ("update", "delete").
pub fn authorize_owner(
    policy: OwnerPolicy,
    actor: Option<Uuid>,
    owner_id: Uuid,
    action: &str,
    entity: EntityKind,
) -> ApiResult<()> {
    match actor {
        Some(actor) if actor == owner_id => Ok(()),
        Some(_) => Err(ApiError::Forbidden(format!(
            "You can only {action} your own {entity}s"
        ))),
        None if policy == OwnerPolicy::Required => Err(ApiError::unauthenticated()),
        None => Ok(()),
    }
}

/// Read a JSON body. An empty body yields `T::default()`.
pub async fn read_json_body<T>(req: Request) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    let bytes = axum::body::to_bytes(req.into_body(), MAX_JSON_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}

/// Trimmed text, or `None` when missing or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Look up a user, failing with 404.
pub async fn require_user(state: &AppState, user_id: Uuid, what: &str) -> ApiResult<UserRow> {
    state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{what} not found")))
}

/// Public profile of a user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}
