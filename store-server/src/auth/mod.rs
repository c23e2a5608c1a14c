//! Actor identity
//!
//! Credential auth belongs to an external identity collaborator; the demo
//! trusts two headers and resolves them into an [`Actor`]:
//!
//! | Header | Meaning |
//! |--------|---------|
//! | `x-actor-id` | account id; absent means guest |
//! | `x-session-id` | cart session; defaults to the actor id |
//!
//! An `x-actor-id` that names no known account is rejected outright so a
//! typo cannot silently shop as a guest.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::GUEST_USER_ID;

use crate::core::ServerState;
use crate::utils::AppError;

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub is_admin: bool,
    /// Cart session key
    pub session: String,
}

impl Actor {
    pub fn is_guest(&self) -> bool {
        self.id == GUEST_USER_ID
    }

    /// Admin gate for back-office operations
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin access required".into()))
        }
    }
}

impl FromRequestParts<ServerState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(actor.clone());
        }

        let actor_id = header_value(parts, "x-actor-id");
        let session = header_value(parts, "x-session-id");

        let actor = match actor_id {
            Some(id) => {
                let account = state
                    .users
                    .find_by_id(&id)
                    .await
                    .map_err(|e| AppError::Storage(e.to_string()))?
                    .ok_or(AppError::Unauthorized)?;
                Actor {
                    session: session.unwrap_or_else(|| account.id.clone()),
                    id: account.id,
                    is_admin: account.is_admin,
                }
            }
            None => Actor {
                id: GUEST_USER_ID.to_string(),
                is_admin: false,
                session: session.unwrap_or_else(|| GUEST_USER_ID.to_string()),
            },
        };

        parts.extensions.insert(actor.clone());
        Ok(actor)
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
