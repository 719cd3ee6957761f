//! # nofeed Models
//!
//! Row types and request/response DTOs shared by the API and the CLI.
//!
//! - [`posts`]: posts, their create/update DTOs and list filters
//! - [`users`]: local user records and role assignments

pub mod posts;
pub mod users;

pub use posts::{
    CreatePostDto, NewPost, Post, PostChanges, PostFilterParams, UpdatePostDto, generate_slug,
};
pub use users::{CreateUserDto, UpdateUserRoleDto, UserWithRole};

use validator::ValidationError;

/// Rejects strings made only of whitespace.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}
