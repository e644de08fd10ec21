use serde::Deserialize;

/// Request body for registration; optional fields so the rule set can
/// report every missing one at once.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
