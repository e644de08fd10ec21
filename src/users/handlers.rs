use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::{
    auth::{dto::TokenResponse, jwt::JwtKeys, password::hash_password},
    error::{ApiError, FieldError},
    state::AppState,
    users::{dto::RegisterRequest, repo::User},
    validate::RuleSet,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", post(register))
}

/// Deterministic avatar URL for an email address, Gravatar with fixed
/// size/rating/default parameters.
pub(crate) fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?s=200&r=pg&d=mm")
}

/// POST /users — register a new user and hand back a token.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    RuleSet::new()
        .require(payload.name.as_deref(), "Name is required")
        .email(payload.email.as_deref(), "Not a valid email")
        .min_len(
            payload.password.as_deref(),
            6,
            "Please enter a password with at least 6 characters",
        )
        .finish()?;

    let name = payload.name.unwrap_or_default();
    let email = payload.email.unwrap_or_default().trim().to_lowercase();
    let password = payload.password.unwrap_or_default();

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!("registration with taken email");
        return Err(ApiError::Validation(vec![FieldError::new(
            "User already exists",
        )]));
    }

    let avatar = gravatar_url(&email);
    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &name, &email, &hash, &avatar).await?;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, "user registered");
    Ok(Json(TokenResponse { token }))
}
