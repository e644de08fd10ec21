use serde::{Deserialize, Serialize};

/// Request body for login. Fields are optional so the rule set can report
/// everything that is missing instead of the deserializer rejecting first.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response returned after login or registration.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
