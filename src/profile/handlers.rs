use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    profile::{
        dto::{EducationRequest, ExperienceRequest, ProfileView, UpsertProfileRequest},
        repo::Profile,
    },
    state::AppState,
    users::repo::User,
    validate::RuleSet,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile/me", get(my_profile))
        .route(
            "/profile",
            get(list_profiles).post(upsert_profile).delete(delete_account),
        )
        .route("/profile/user/:user_id", get(profile_by_user))
        .route("/profile/experience", put(add_experience))
        .route("/profile/experience/:exp_id", delete(remove_experience))
        .route("/profile/education", put(add_education))
        .route("/profile/education/:edu_id", delete(remove_education))
}

fn no_profile() -> ApiError {
    ApiError::BadRequest("No profile for this user".into())
}

/// Entry ids arrive as raw path segments; one that does not parse is
/// treated the same as an id that matches no entry.
fn parse_entry_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// GET /profile/me — the caller's profile with owner name/avatar joined in.
#[instrument(skip(state))]
pub async fn my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    let (profile, owner) = Profile::find_with_owner(&state.db, user_id)
        .await?
        .ok_or_else(no_profile)?;
    Ok(Json(ProfileView::new(profile, owner)))
}

/// POST /profile — create the caller's profile or sparsely update it.
#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    RuleSet::new()
        .require(payload.status.as_deref(), "Status is required")
        .require(payload.skills.as_deref(), "Skills are required")
        .finish()?;

    let patch = payload.into_patch();

    let profile = match Profile::find_by_user(&state.db, user_id).await? {
        Some(mut existing) => {
            existing.apply_patch(patch);
            Profile::replace(&state.db, &existing).await?
        }
        None => Profile::create(&state.db, user_id, patch).await?,
    };

    Ok(Json(profile))
}

/// GET /profile — every profile, each with its owner's name/avatar.
#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileView>>, ApiError> {
    let profiles = Profile::list_with_owners(&state.db)
        .await?
        .into_iter()
        .map(|(profile, owner)| ProfileView::new(profile, owner))
        .collect();
    Ok(Json(profiles))
}

/// GET /profile/user/:user_id — a malformed id is reported the same way as
/// a missing profile, never as a server error.
#[instrument(skip(state))]
pub async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let not_found = || ApiError::BadRequest("Profile not found".into());
    let user_id = Uuid::parse_str(&user_id).map_err(|_| not_found())?;
    let (profile, owner) = Profile::find_with_owner(&state.db, user_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(ProfileView::new(profile, owner)))
}

/// DELETE /profile — remove the caller's profile, then the user record.
/// The two deletes run sequentially without a transaction; a failure in
/// between can leave a user without a profile.
#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    Profile::delete_by_user(&state.db, user_id).await?;
    User::delete(&state.db, user_id).await?;
    info!(user_id = %user_id, "account removed");
    Ok(Json(json!({ "msg": "User removed" })))
}

/// PUT /profile/experience — prepend a work-history entry.
#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ExperienceRequest>,
) -> Result<Json<Profile>, ApiError> {
    RuleSet::new()
        .require(payload.title.as_deref(), "Title is required")
        .require(payload.company.as_deref(), "Company is required")
        .require(payload.from.as_deref(), "From Date is required")
        .finish()?;

    let mut profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(no_profile)?;
    profile.add_experience(payload.into_entry());
    let profile = Profile::replace(&state.db, &profile).await?;
    Ok(Json(profile))
}

/// DELETE /profile/experience/:exp_id — an unknown or malformed id leaves
/// the document unchanged.
#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let mut profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(no_profile)?;
    if let Some(exp_id) = parse_entry_id(&exp_id) {
        profile.remove_experience(exp_id);
    }
    let profile = Profile::replace(&state.db, &profile).await?;
    Ok(Json(profile))
}

/// PUT /profile/education — prepend an education entry.
#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<EducationRequest>,
) -> Result<Json<Profile>, ApiError> {
    RuleSet::new()
        .require(payload.school.as_deref(), "School is required")
        .require(payload.degree.as_deref(), "Degree is required")
        .require(payload.fieldofstudy.as_deref(), "Field of study is required")
        .require(payload.from.as_deref(), "From Date is required")
        .finish()?;

    let mut profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(no_profile)?;
    profile.add_education(payload.into_entry());
    let profile = Profile::replace(&state.db, &profile).await?;
    Ok(Json(profile))
}

/// DELETE /profile/education/:edu_id
#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let mut profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(no_profile)?;
    if let Some(edu_id) = parse_entry_id(&edu_id) {
        profile.remove_education(edu_id);
    }
    let profile = Profile::replace(&state.db, &profile).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn entry_ids_parse_or_match_nothing() {
        let id = Uuid::new_v4();
        assert_eq!(parse_entry_id(&id.to_string()), Some(id));
        assert_eq!(parse_entry_id("not-a-uuid"), None);
        assert_eq!(parse_entry_id(""), None);
    }

    #[tokio::test]
    async fn malformed_user_id_yields_400_not_500() {
        // the parse failure returns before any pool access
        let err = profile_by_user(State(AppState::fake()), Path("not-a-uuid".into()))
            .await
            .unwrap_err();
        match &err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Profile not found"),
            other => panic!("expected bad request, got {other:?}"),
        }
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::BAD_REQUEST
        );
    }
}
