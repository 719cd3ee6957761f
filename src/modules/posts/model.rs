pub use nofeed_models::posts::{
    CreatePostDto, NewPost, Post, PostChanges, PostFilterParams, UpdatePostDto,
};
