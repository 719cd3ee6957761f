//! Post domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::non_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Subject id of the author.
    pub auth0_user_id: String,
    pub slug: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostDto {
    #[validate(length(min = 1, max = 200), custom(function = "non_blank"))]
    pub title: String,
    #[validate(length(min = 1), custom(function = "non_blank"))]
    pub content: String,
    #[serde(default)]
    pub published: bool,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostDto {
    #[validate(length(min = 1, max = 200), custom(function = "non_blank"))]
    pub title: Option<String>,
    #[validate(length(min = 1), custom(function = "non_blank"))]
    pub content: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostFilterParams {
    pub published: Option<bool>,
    /// Subject id of the author.
    pub author: Option<String>,
}

impl PostFilterParams {
    pub fn matches(&self, post: &Post) -> bool {
        self.published.is_none_or(|p| post.published == p)
            && self
                .author
                .as_deref()
                .is_none_or(|a| post.auth0_user_id == a)
    }
}

/// A post ready to be inserted, owner and slug already resolved.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub auth0_user_id: String,
    pub slug: String,
    pub published: bool,
}

impl NewPost {
    pub fn from_dto(dto: CreatePostDto, owner: &str) -> Self {
        Self {
            slug: generate_slug(&dto.title),
            title: dto.title,
            content: dto.content,
            auth0_user_id: owner.to_string(),
            published: dto.published,
        }
    }
}

/// Column changes for an update. A new title also regenerates the slug.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub published: Option<bool>,
}

impl From<UpdatePostDto> for PostChanges {
    fn from(dto: UpdatePostDto) -> Self {
        Self {
            slug: dto.title.as_deref().map(generate_slug),
            title: dto.title,
            content: dto.content,
            published: dto.published,
        }
    }
}

impl PostChanges {
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(slug) = &self.slug {
            post.slug = slug.clone();
        }
        if let Some(published) = self.published {
            post.published = published;
        }
    }
}

/// URL-friendly form of a title: lowercase ASCII letters and digits joined
/// by single hyphens.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        return "post".to_string();
    }
    slug
}
