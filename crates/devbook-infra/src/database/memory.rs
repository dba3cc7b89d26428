//! In-memory repositories - used when no database is configured.
//!
//! They honour the same contracts as the PostgreSQL implementations,
//! including email uniqueness, ordering and page windows.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use devbook_core::domain::{FieldMap, NewPost, NewUser, Pagination, Post, PostField, User, UserField};
use devbook_core::error::RepoError;
use devbook_core::ports::{BaseRepository, PasswordService, PostRepository, UserRepository};

use super::support::{contains_ignore_case, hash_password, hash_password_change, mask_email};

/// Sort by creation time then id and cut out one page.
fn paginate<T: Clone>(mut rows: Vec<&T>, page: Pagination, key: impl Fn(&T) -> (i64, Uuid)) -> Vec<T> {
    rows.sort_by_key(|row| key(row));
    rows.into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

fn user_field(user: &User, field: UserField) -> &str {
    match field {
        UserField::Name => &user.name,
        UserField::Email => &user.email,
        UserField::Password => &user.password_hash,
    }
}

fn post_field(post: &Post, field: PostField) -> &str {
    match field {
        PostField::Title => &post.title,
        PostField::Content => &post.content,
    }
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
    passwords: Arc<dyn PasswordService>,
}

impl InMemoryUserRepository {
    pub fn new(passwords: Arc<dyn PasswordService>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            passwords,
        }
    }
}

#[async_trait]
impl BaseRepository<User, UserField> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, changes: FieldMap<UserField>) -> Result<User, RepoError> {
        if changes.is_empty() {
            return Err(RepoError::EmptyUpdate);
        }
        let changes = hash_password_change(self.passwords.as_ref(), changes)?;

        let mut store = self.store.write().await;
        if let Some(email) = changes.get(UserField::Email) {
            if store.values().any(|u| u.id != id && u.email == email) {
                return Err(RepoError::Constraint("Entity already exists".to_string()));
            }
        }

        let user = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        for (field, value) in changes {
            match field {
                UserField::Name => user.name = value,
                UserField::Email => user.email = value,
                UserField::Password => user.password_hash = value,
            }
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Uuid, RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|user| user.id)
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<Uuid, RepoError> {
        let password_hash = hash_password(self.passwords.as_ref(), &user.password)?;

        let mut store = self.store.write().await;
        if store.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let record = User::new(user.name, user.email, password_hash);
        tracing::debug!(user_id = %record.id, user_email = %mask_email(&record.email), "Creating user (in-memory)");
        let id = record.id;
        store.insert(id, record);

        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn find_many(
        &self,
        page: Pagination,
        filters: &FieldMap<UserField>,
    ) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().await;
        let matching: Vec<&User> = store
            .values()
            .filter(|u| {
                filters
                    .iter()
                    .all(|(field, needle)| contains_ignore_case(user_field(u, field), needle))
            })
            .collect();

        Ok(paginate(matching, page, |u: &User| {
            (u.created_at.timestamp_micros(), u.id)
        }))
    }
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, PostField> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, changes: FieldMap<PostField>) -> Result<Post, RepoError> {
        if changes.is_empty() {
            return Err(RepoError::EmptyUpdate);
        }

        let mut store = self.store.write().await;
        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        for (field, value) in changes {
            match field {
                PostField::Title => post.title = value,
                PostField::Content => post.content = value,
            }
        }
        post.updated_at = Utc::now();

        Ok(post.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Uuid, RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|post| post.id)
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Uuid, RepoError> {
        let record = Post::from(post);
        let id = record.id;
        self.store.write().await.insert(id, record);
        Ok(id)
    }

    async fn find_many_by_user_id(
        &self,
        user_id: Uuid,
        page: Pagination,
        filters: &FieldMap<PostField>,
    ) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let matching: Vec<&Post> = store
            .values()
            .filter(|p| p.user_id == user_id)
            .filter(|p| {
                filters
                    .iter()
                    .all(|(field, needle)| contains_ignore_case(post_field(p, field), needle))
            })
            .collect();

        Ok(paginate(matching, page, |p: &Post| {
            (p.created_at.timestamp_micros(), p.id)
        }))
    }
}
