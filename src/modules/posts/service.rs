use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use nofeed_core::AppError;

use crate::modules::posts::model::{
    CreatePostDto, NewPost, Post, PostChanges, PostFilterParams, UpdatePostDto,
};
use crate::store::PostStore;

/// Post operations with ownership enforcement.
///
/// A missing post is always 404; a post owned by someone else is 403.
#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
}

fn post_not_found() -> AppError {
    AppError::not_found(anyhow!("Post not found"))
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, dto))]
    pub async fn create_post(&self, owner: &str, dto: CreatePostDto) -> Result<Post, AppError> {
        let post = self.store.create(NewPost::from_dto(dto, owner)).await?;
        info!(post_id = %post.id, "post created");
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, id: Uuid) -> Result<Post, AppError> {
        self.store.get(id).await?.ok_or_else(post_not_found)
    }

    #[instrument(skip(self))]
    pub async fn list_posts(&self, filter: PostFilterParams) -> Result<Vec<Post>, AppError> {
        Ok(self.store.list(&filter).await?)
    }

    #[instrument(skip(self, dto))]
    pub async fn update_post(
        &self,
        owner: &str,
        id: Uuid,
        dto: UpdatePostDto,
    ) -> Result<Post, AppError> {
        self.load_owned(owner, id).await?;

        let changes = PostChanges::from(dto);
        // The row can vanish between the ownership check and the write.
        self.store
            .update(id, owner, &changes)
            .await?
            .ok_or_else(post_not_found)
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, owner: &str, id: Uuid) -> Result<(), AppError> {
        self.load_owned(owner, id).await?;

        if !self.store.delete(id, owner).await? {
            return Err(post_not_found());
        }
        info!(post_id = %id, "post deleted");
        Ok(())
    }

    async fn load_owned(&self, owner: &str, id: Uuid) -> Result<Post, AppError> {
        let post = self.get_post(id).await?;
        if post.auth0_user_id != owner {
            warn!(post_id = %id, "caller does not own post");
            return Err(AppError::forbidden(anyhow!(
                "You do not have permission to modify this post"
            )));
        }
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryPostStore;
    use async_trait::async_trait;
    use nofeed_core::StatusCode;
    use nofeed_db::StoreError;

    /// Reads succeed, but the row is gone by the time a write reaches it.
    struct VanishingStore(MemoryPostStore);

    #[async_trait]
    impl PostStore for VanishingStore {
        async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
            self.0.create(post).await
        }

        async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
            self.0.get(id).await
        }

        async fn list(&self, filter: &PostFilterParams) -> Result<Vec<Post>, StoreError> {
            self.0.list(filter).await
        }

        async fn update(
            &self,
            _id: Uuid,
            _owner: &str,
            _changes: &PostChanges,
        ) -> Result<Option<Post>, StoreError> {
            Ok(None)
        }

        async fn delete(&self, _id: Uuid, _owner: &str) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    fn service() -> (PostService, Arc<MemoryPostStore>) {
        let store = Arc::new(MemoryPostStore::new());
        (PostService::new(store.clone()), store)
    }

    fn dto(title: &str) -> CreatePostDto {
        CreatePostDto {
            title: title.to_string(),
            content: "content".to_string(),
            published: false,
        }
    }

    #[tokio::test]
    async fn test_create_sets_owner_and_slug() {
        let (service, _) = service();
        let post = service.create_post("auth0|a", dto("Hello There")).await.unwrap();

        assert_eq!(post.auth0_user_id, "auth0|a");
        assert_eq!(post.slug, "hello-there");
        assert!(!post.published);
    }

    #[tokio::test]
    async fn test_non_owner_update_is_forbidden() {
        let (service, _) = service();
        let post = service.create_post("auth0|a", dto("T")).await.unwrap();

        let update = UpdatePostDto {
            title: Some("Hijacked".into()),
            ..Default::default()
        };
        let err = service.update_post("auth0|b", post.id, update).await.unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let unchanged = service.get_post(post.id).await.unwrap();
        assert_eq!(unchanged.title, "T");
    }

    #[tokio::test]
    async fn test_owner_update_applies_changes() {
        let (service, _) = service();
        let post = service.create_post("auth0|a", dto("Old")).await.unwrap();

        let update = UpdatePostDto {
            title: Some("New Title".into()),
            published: Some(true),
            ..Default::default()
        };
        let updated = service.update_post("auth0|a", post.id, update).await.unwrap();

        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.slug, "new-title");
        assert_eq!(updated.content, "content");
        assert!(updated.published);
        assert!(updated.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found_for_everyone() {
        let (service, _) = service();
        let id = Uuid::new_v4();

        let err = service.delete_post("auth0|a", id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = service
            .update_post("auth0|a", id, UpdatePostDto::default())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let (service, store) = service();
        let post = service.create_post("auth0|a", dto("T")).await.unwrap();

        let err = service.delete_post("auth0|b", post.id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(store.len(), 1);

        service.delete_post("auth0|a", post.id).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_filters() {
        let (service, _) = service();
        service.create_post("auth0|a", dto("first")).await.unwrap();
        service
            .create_post(
                "auth0|b",
                CreatePostDto {
                    published: true,
                    ..dto("second")
                },
            )
            .await
            .unwrap();
        service.create_post("auth0|a", dto("third")).await.unwrap();

        let all = service.list_posts(PostFilterParams::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let by_a = service
            .list_posts(PostFilterParams {
                author: Some("auth0|a".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_a.len(), 2);

        let published = service
            .list_posts(PostFilterParams {
                published: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "second");
    }

    #[tokio::test]
    async fn test_post_vanishing_after_ownership_check_is_not_found() {
        let service = PostService::new(Arc::new(VanishingStore(MemoryPostStore::new())));
        let post = service.create_post("auth0|a", dto("T")).await.unwrap();

        let update = UpdatePostDto {
            title: Some("New".to_string()),
            ..Default::default()
        };
        let err = service
            .update_post("auth0|a", post.id, update)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = service.delete_post("auth0|a", post.id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
