use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::{error::ApiError, state::AppState};

const REPOS_PER_PAGE: &str = "5";

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile/github/:username", get(user_repos))
}

/// GET /profile/github/:username — relay the five oldest repositories for a
/// username from the upstream API. Any non-200 upstream answer collapses
/// into a single "no profile" response.
#[instrument(skip(state))]
pub async fn user_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let github = &state.config.github;
    let url = format!("https://api.github.com/users/{username}/repos");

    let mut request = state
        .http
        .get(&url)
        .query(&[("per_page", REPOS_PER_PAGE), ("sort", "created:asc")]);
    if !github.client_id.is_empty() {
        request = request.query(&[
            ("client_id", github.client_id.as_str()),
            ("client_secret", github.client_secret.as_str()),
        ]);
    }

    let response = request.send().await?;
    if response.status() != reqwest::StatusCode::OK {
        warn!(status = %response.status(), "upstream lookup failed");
        return Err(ApiError::NotFound("No github profile found".into()));
    }

    let body: Value = response.json().await?;
    Ok(Json(body))
}
