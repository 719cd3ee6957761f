//! # nofeed API
//!
//! The HTTP backend behind nofeed.zone: a public feed of posts, written by
//! users who sign in through Auth0.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── bin/cli.rs       # nofeed-cli (role bootstrap)
//! ├── cli/             # CLI operations
//! ├── middleware/      # token authentication and role checks
//! ├── modules/         # feature modules
//! │   ├── admin/      # user and role management
//! │   ├── auth/       # Auth0 login, callback, refresh, logout, /me
//! │   ├── health/     # liveness check
//! │   └── posts/      # posts CRUD with ownership checks
//! ├── store/           # PostStore / UserStore and their implementations
//! ├── authz.rs         # role authorizer
//! ├── db.rs            # startup migrations
//! ├── logging.rs       # tracing setup and request logging
//! ├── router.rs        # route tree and global layers
//! ├── state.rs         # shared application state
//! └── validator.rs     # validated JSON extractor
//! ```
//!
//! Each feature module has the same shape: `controller.rs` (handlers),
//! `service.rs` (business rules), `model.rs` (DTOs) and `router.rs`.
//!
//! ## Request pipeline
//!
//! 1. The bearer token is taken from `Authorization` or the `access_token`
//!    cookie and validated against the tenant's JWKS (RS256, issuer,
//!    audience, expiry).
//! 2. On mutating routes the caller is provisioned with the `member` role on
//!    first sight.
//! 3. Admin routes additionally require `superadmin`.
//! 4. Post mutations check ownership: a missing post is 404, someone else's
//!    post is 403.
//!
//! ## Roles
//!
//! | Role | Granted by | Allows |
//! |------|------------|--------|
//! | member | first authenticated write | creating and editing own posts |
//! | superadmin | `nofeed-cli set-role` or another superadmin | `/api/admin/*` |
//!
//! ## Environment
//!
//! ```bash
//! AUTH0_DOMAIN=tenant.us.auth0.com
//! AUTH0_AUDIENCE=https://api.nofeed.zone
//! AUTH0_CLIENT_ID=...
//! AUTH0_CLIENT_SECRET=...
//! AUTH0_CALLBACK_URL=https://api.nofeed.zone/api/callback
//! DATABASE_URL=postgres://localhost/nofeed   # or DB_SECRET_ARN=arn:aws:...
//! ```

pub mod authz;
pub mod cli;
pub mod db;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod store;
pub mod validator;

// Re-export workspace crates for convenience
pub use nofeed_auth;
pub use nofeed_config;
pub use nofeed_core;
pub use nofeed_db;
pub use nofeed_models;
