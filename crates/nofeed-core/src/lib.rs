//! # nofeed Core
//!
//! Foundational types shared by every nofeed crate:
//!
//! - [`errors`]: the application error type and its HTTP rendering
//! - [`roles`]: names of the roles in the fixed role catalogue
//!
//! # Example
//!
//! ```ignore
//! use nofeed_core::{AppError, roles};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Post not found"));
//! assert_eq!(roles::DEFAULT, roles::MEMBER);
//! ```

pub mod errors;
pub mod roles;

pub use axum::http::StatusCode;
pub use errors::AppError;
