use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    models::PostModel,
    repository::PostRepository,
    types::{CreatePostRequest, ListPostsQuery, PostResponse, SortOrder},
};
use crate::shared::AppError;
use crate::user::repository::UserRepository;

const INVALID_PARAMETERS_MESSAGE: &str = "Invalid request parameters.";

/// Service for handling post business logic
pub struct PostService {
    posts: Arc<dyn PostRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(INVALID_PARAMETERS_MESSAGE.to_string()))
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self { posts, users }
    }

    /// Creates a post authored by `author_id`
    #[instrument(skip(self, request))]
    pub async fn create_post(
        &self,
        author_id: Uuid,
        request: CreatePostRequest,
    ) -> Result<PostResponse, AppError> {
        if self.users.get_user_by_id(author_id).await?.is_none() {
            warn!("Post author does not exist");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let post = PostModel::new(request.body, author_id);
        self.posts.create_post(&post).await?;

        info!(post_id = %post.id, "Post created");
        Ok(post.into())
    }

    /// Lists posts by creation time, optionally filtered by author and reversed
    #[instrument(skip(self))]
    pub async fn list_posts(&self, query: ListPostsQuery) -> Result<Vec<PostResponse>, AppError> {
        let order = match query.sort.as_deref() {
            None | Some("") => SortOrder::default(),
            Some(raw) => raw.parse::<SortOrder>().map_err(|_| {
                AppError::BadRequest(
                    "Sort parameter must be either 'ASC' or 'DESC'".to_string(),
                )
            })?,
        };

        let author_id = match query.author_id.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_id(raw)?),
        };

        let mut posts = self.posts.list_posts(author_id).await?;
        if order == SortOrder::Desc {
            posts.reverse();
        }

        info!(post_count = posts.len(), %order, "Posts listed");
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, post_id: &str) -> Result<PostResponse, AppError> {
        let post_id = parse_id(post_id)?;

        self.posts
            .get_post(post_id)
            .await?
            .map(PostResponse::from)
            .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))
    }

    /// Deletes a post; only its author may do so
    #[instrument(skip(self))]
    pub async fn delete_post(&self, caller_id: Uuid, post_id: &str) -> Result<(), AppError> {
        let post_id = parse_id(post_id)?;

        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))?;

        if !post.is_owned_by(caller_id) {
            warn!(owner = %post.user_id, "Caller does not own the post");
            return Err(AppError::Forbidden(
                "You are not allowed to delete this post.".to_string(),
            ));
        }

        self.posts.delete_post(post.id).await?;
        info!("Post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::repository::InMemoryPostRepository;
    use crate::user::{models::UserModel, repository::InMemoryUserRepository};

    async fn setup() -> (PostService, Uuid) {
        let users = Arc::new(InMemoryUserRepository::new());
        let author = UserModel::new("author@x.com".to_string(), "hash".to_string());
        users.create_user(&author).await.unwrap();

        let service = PostService::new(Arc::new(InMemoryPostRepository::new()), users);
        (service, author.id)
    }

    fn body(text: &str) -> CreatePostRequest {
        CreatePostRequest {
            body: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_post() {
        let (service, author) = setup().await;

        let created = service.create_post(author, body("hello")).await.unwrap();
        assert_eq!(created.user_id, author);

        let fetched = service.get_post(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_post_for_unknown_author() {
        let (service, _) = setup().await;

        let result = service.create_post(Uuid::new_v4(), body("hello")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_post_with_bad_id() {
        let (service, _) = setup().await;

        assert!(matches!(
            service.get_post("not-a-uuid").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.get_post(&Uuid::new_v4().to_string()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_posts_sorting() {
        let (service, author) = setup().await;
        let first = service.create_post(author, body("first")).await.unwrap();
        let second = service.create_post(author, body("second")).await.unwrap();

        let ascending = service.list_posts(ListPostsQuery::default()).await.unwrap();
        let descending = service
            .list_posts(ListPostsQuery {
                author_id: Some(author.to_string()),
                sort: Some("desc".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(ascending.len(), 2);
        assert_eq!(descending.len(), 2);
        assert_eq!(ascending.first().unwrap().id, descending.last().unwrap().id);
        assert!(first.created_at <= second.created_at);
    }

    #[tokio::test]
    async fn test_list_posts_rejects_bad_parameters() {
        let (service, _) = setup().await;

        let bad_sort = service
            .list_posts(ListPostsQuery {
                author_id: None,
                sort: Some("random".to_string()),
            })
            .await;
        let bad_author = service
            .list_posts(ListPostsQuery {
                author_id: Some("nope".to_string()),
                sort: None,
            })
            .await;

        assert!(matches!(bad_sort, Err(AppError::BadRequest(_))));
        assert!(matches!(bad_author, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_post_ownership() {
        let (service, author) = setup().await;
        let post = service.create_post(author, body("mine")).await.unwrap();
        let post_id = post.id.to_string();

        let stranger = service.delete_post(Uuid::new_v4(), &post_id).await;
        assert!(matches!(stranger, Err(AppError::Forbidden(_))));

        service.delete_post(author, &post_id).await.unwrap();
        assert!(matches!(
            service.get_post(&post_id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
