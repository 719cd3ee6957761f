pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_member_posts_router, init_public_posts_router};
pub use service::PostService;
