use serde::{Deserialize, Serialize};

/// Query string Auth0 appends when redirecting back to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub refreshed: bool,
}
