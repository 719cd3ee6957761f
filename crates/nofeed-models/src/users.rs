use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::non_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct UserWithRole {
    pub auth0_user_id: String,
    /// `None` when the user holds no role.
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 255), custom(function = "non_blank"))]
    pub auth0_user_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRoleDto {
    #[validate(length(min = 1, max = 50), custom(function = "non_blank"))]
    pub role: String,
}
