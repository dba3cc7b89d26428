//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter};
use uuid::Uuid;

use devbook_core::domain::{FieldMap, NewPost, NewUser, Pagination, Post, PostField, User, UserField};
use devbook_core::error::RepoError;
use devbook_core::ports::{BaseRepository, PasswordService, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err, to_columns};
use super::support::{hash_password, hash_password_change, mask_email};

/// PostgreSQL user repository. Owns password hashing so plaintext never
/// reaches the store.
pub struct PostgresUserRepository {
    pub(crate) base: PostgresBaseRepository<UserEntity>,
    passwords: Arc<dyn PasswordService>,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn, passwords: Arc<dyn PasswordService>) -> Self {
        Self {
            base: PostgresBaseRepository::new(db),
            passwords,
        }
    }
}

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl BaseRepository<User, UserField> for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.base.find_by_id(id).await?.map(Into::into))
    }

    async fn update(&self, id: Uuid, changes: FieldMap<UserField>) -> Result<User, RepoError> {
        let changes = hash_password_change(self.passwords.as_ref(), changes)?;
        tracing::debug!(user_id = %id, fields = changes.len(), "Updating user");

        let model = self
            .base
            .update_columns(id, to_columns::<_, user::Column>(&changes))
            .await?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<Uuid, RepoError> {
        tracing::debug!(user_id = %id, "Deleting user");
        self.base.delete(id).await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<Uuid, RepoError> {
        let password_hash = hash_password(self.passwords.as_ref(), &user.password)?;
        let record = User::new(user.name, user.email, password_hash);
        tracing::debug!(user_id = %record.id, user_email = %mask_email(&record.email), "Creating user");

        let model = self.base.insert(user::ActiveModel::from(record)).await?;
        Ok(model.id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.base.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_many(
        &self,
        page: Pagination,
        filters: &FieldMap<UserField>,
    ) -> Result<Vec<User>, RepoError> {
        let result = self
            .base
            .find_page(UserEntity::find(), page, to_columns(filters))
            .await?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl BaseRepository<Post, PostField> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(PostgresBaseRepository::find_by_id(self, id).await?.map(Into::into))
    }

    async fn update(&self, id: Uuid, changes: FieldMap<PostField>) -> Result<Post, RepoError> {
        tracing::debug!(post_id = %id, fields = changes.len(), "Updating post");

        let model = self
            .update_columns(id, to_columns::<_, post::Column>(&changes))
            .await?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<Uuid, RepoError> {
        tracing::debug!(post_id = %id, "Deleting post");
        PostgresBaseRepository::delete(self, id).await
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Uuid, RepoError> {
        let record = Post::from(post);
        tracing::debug!(post_id = %record.id, user_id = %record.user_id, "Creating post");

        let model = self.insert(post::ActiveModel::from(record)).await?;
        Ok(model.id)
    }

    async fn find_many_by_user_id(
        &self,
        user_id: Uuid,
        page: Pagination,
        filters: &FieldMap<PostField>,
    ) -> Result<Vec<Post>, RepoError> {
        let select = PostEntity::find().filter(post::Column::UserId.eq(user_id));
        let result = self.find_page(select, page, to_columns(filters)).await?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
