use serde::Serialize;

pub use nofeed_models::users::{CreateUserDto, UpdateUserRoleDto, UserWithRole};

#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdatedResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct UserDeletedResponse {
    pub deleted: bool,
}
