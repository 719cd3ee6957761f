pub mod admin;
pub mod auth;
pub mod health;
pub mod posts;

pub use self::admin::model::UserWithRole;
pub use self::posts::model::Post;
