use axum::{
    extract::{FromRef, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        password::verify_password,
    },
    error::{ApiError, FieldError},
    state::AppState,
    users::repo::User,
    validate::RuleSet,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth", get(current_user).post(login))
}

/// GET /auth — the caller's own record, password hash never serialized.
#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("User not found".into()))?;
    Ok(Json(user))
}

fn invalid_credentials() -> ApiError {
    // Unknown email and wrong password must be indistinguishable
    ApiError::Validation(vec![FieldError::new("Invalid credentials")])
}

/// POST /auth — authenticate and issue a token.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    RuleSet::new()
        .email(payload.email.as_deref(), "Not a valid email")
        .exists(payload.password.as_deref(), "Password is required")
        .finish()?;

    let email = payload.email.unwrap_or_default().trim().to_lowercase();
    let password = payload.password.unwrap_or_default();

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!("login with unknown email");
            return Err(invalid_credentials());
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(invalid_credentials());
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn invalid_credentials_has_the_generic_validation_shape() {
        let err = invalid_credentials();
        match &err {
            ApiError::Validation(errors) => {
                assert_eq!(errors, &vec![FieldError::new("Invalid credentials")]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn token_response_serializes_to_bare_token_object() {
        let body = serde_json::to_value(TokenResponse {
            token: "abc.def.ghi".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "token": "abc.def.ghi" }));
    }
}
