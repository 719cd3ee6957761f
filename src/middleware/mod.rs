//! Request authentication and role authorization.
//!
//! # Modules
//!
//! - [`auth`]: bearer token validation and the [`auth::AuthUser`] extractor
//! - [`role`]: default-role provisioning and role requirements
//!
//! # Flow
//!
//! 1. [`auth::require_auth`] finds the token (header, then cookie), validates
//!    it and stores the principal in the request extensions
//! 2. [`role::ensure_member`] provisions the local user with the default role
//! 3. [`role::require_superadmin`] rejects subjects without the admin role
//! 4. Handlers read the principal through [`auth::AuthUser`]
//!
//! Layers are attached with `route_layer`, innermost first:
//!
//! ```ignore
//! Router::new()
//!     .route("/", post(create_post))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), ensure_member))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

pub mod auth;
pub mod role;
