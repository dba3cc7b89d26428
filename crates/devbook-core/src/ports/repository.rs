use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{FieldMap, NewPost, NewUser, Pagination, Post, PostField, User, UserField};
use crate::error::RepoError;

/// Operations shared by every entity repository.
#[async_trait]
pub trait BaseRepository<T, F>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError>;

    /// Apply a partial update and bump `updated_at`.
    ///
    /// Fails with [`RepoError::EmptyUpdate`] without touching the store when
    /// `changes` is empty, and with [`RepoError::NotFound`] when no row has `id`.
    async fn update(&self, id: Uuid, changes: FieldMap<F>) -> Result<T, RepoError>;

    /// Delete an entity by its ID, returning the deleted ID.
    async fn delete(&self, id: Uuid) -> Result<Uuid, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, UserField> {
    /// Hash the password and insert the account, returning its new ID.
    async fn create(&self, user: NewUser) -> Result<Uuid, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// List users matching every filter, one page at a time.
    async fn find_many(
        &self,
        page: Pagination,
        filters: &FieldMap<UserField>,
    ) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
///
/// `find_by_id`, `update` and `delete` do not check ownership.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostField> {
    /// Insert a post, returning its new ID.
    async fn create(&self, post: NewPost) -> Result<Uuid, RepoError>;

    /// List posts owned by `user_id` matching every filter, one page at a time.
    async fn find_many_by_user_id(
        &self,
        user_id: Uuid,
        page: Pagination,
        filters: &FieldMap<PostField>,
    ) -> Result<Vec<Post>, RepoError>;
}
