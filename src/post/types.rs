use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use super::models::PostModel;

/// Request payload for creating a post; the author comes from the access token
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub body: String,
}

/// Query parameters for listing posts
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

/// Ordering of post listings by creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PostResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl From<PostModel> for PostResponse {
    fn from(post: PostModel) -> Self {
        Self {
            id: post.id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            body: post.body,
            user_id: post.user_id,
        }
    }
}
