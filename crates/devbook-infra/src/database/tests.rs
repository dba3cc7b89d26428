#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::database::entity::{post, user};
    use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
    use crate::database::{DatabaseConnections, DatabaseHealth};
    use devbook_core::RepoError;
    use devbook_core::domain::{FieldMap, NewPost, NewUser, Pagination, Post, PostField, UserField};
    use devbook_core::ports::{
        AuthError, BaseRepository, PasswordService, PostRepository, UserRepository,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult};

    /// Executed statements with SQL identifier quotes unescaped.
    fn sql_log(db: DatabaseConnection) -> String {
        format!("{:?}", db.into_transaction_log()).replace("\\\"", "\"")
    }

    struct StubHasher;

    impl PasswordService for StubHasher {
        fn hash(&self, _password: &str) -> Result<String, AuthError> {
            Ok("stub-hash".to_string())
        }

        fn verify(&self, _password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(hash == "stub-hash")
        }
    }

    fn post_model(id: uuid::Uuid, user_id: uuid::Uuid, title: &str) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            user_id,
            title: title.to_owned(),
            content: "Content".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn user_model(id: uuid::Uuid) -> user::Model {
        let now = chrono::Utc::now();
        user::Model {
            id,
            name: "Amy".to_owned(),
            email: "amy@example.com".to_owned(),
            password_hash: "stub-hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, user_id, "Test Post")]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = BaseRepository::find_by_id(&repo, post_id).await.unwrap();

        assert!(result.is_some());
        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
        assert_eq!(post.user_id, user_id);
    }

    #[tokio::test]
    async fn test_create_post_runs_in_transaction() {
        let user_id = uuid::Uuid::new_v4();
        let stored = post_model(uuid::Uuid::new_v4(), user_id, "Hello");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored.clone()]])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let id = repo
            .create(NewPost {
                user_id,
                title: "Hello".to_owned(),
                content: "Content".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(id, stored.id);
        let log = sql_log(repo.db);
        assert!(log.contains("INSERT INTO \"posts\""));
        assert!(log.contains("BEGIN"));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_update_post_sets_timestamp_and_returns_row() {
        let post_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, uuid::Uuid::new_v4(), "New")]])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let changes = FieldMap::new().with(PostField::Title, "New");
        let post = BaseRepository::update(&repo, post_id, changes).await.unwrap();

        assert_eq!(post.title, "New");
        let log = sql_log(repo.db);
        assert!(log.contains("UPDATE \"posts\""));
        assert!(log.contains("CURRENT_TIMESTAMP"));
        assert!(log.contains("RETURNING"));
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let changes = FieldMap::new().with(PostField::Content, "x");
        let result = BaseRepository::update(&repo, uuid::Uuid::new_v4(), changes).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_empty_update_never_reaches_store() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresPostRepository::new(db);

        let result = BaseRepository::update(&repo, uuid::Uuid::new_v4(), FieldMap::new()).await;

        assert!(matches!(result, Err(RepoError::EmptyUpdate)));
        assert!(repo.db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_delete_zero_rows_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let result = BaseRepository::delete(&repo, uuid::Uuid::new_v4()).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_returns_id() {
        let post_id = uuid::Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        assert_eq!(BaseRepository::delete(&repo, post_id).await.unwrap(), post_id);
    }

    #[tokio::test]
    async fn test_list_posts_filters_by_owner_and_substring() {
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(uuid::Uuid::new_v4(), user_id, "Joy")]])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let filters = FieldMap::new().with(PostField::Title, "Jo");
        let posts = repo
            .find_many_by_user_id(user_id, Pagination::new(5, 3), &filters)
            .await
            .unwrap();

        assert_eq!(posts.len(), 1);
        let log = sql_log(repo.db);
        assert!(log.contains("LOWER(\"title\")"));
        assert!(log.contains("%jo%"));
        assert!(log.contains("ORDER BY \"posts\".\"created_at\" ASC"));
        assert!(log.contains("LIMIT"));
        assert!(log.contains("OFFSET"));
    }

    #[tokio::test]
    async fn test_create_user_stores_hash() {
        let stored = user_model(uuid::Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored.clone()]])
            .into_connection();
        let repo = PostgresUserRepository::new(db, Arc::new(StubHasher));

        let id = repo
            .create(NewUser {
                name: "Amy".to_owned(),
                email: "amy@example.com".to_owned(),
                password: "plain-secret".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(id, stored.id);
        let log = sql_log(repo.base.db);
        assert!(log.contains("stub-hash"));
        assert!(!log.contains("plain-secret"));
    }

    #[tokio::test]
    async fn test_update_user_password_is_hashed() {
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model(user_id)]])
            .into_connection();
        let repo = PostgresUserRepository::new(db, Arc::new(StubHasher));

        let changes = FieldMap::new().with(UserField::Password, "plain-secret");
        let user = repo.update(user_id, changes).await.unwrap();

        assert_eq!(user.id, user_id);
        let log = sql_log(repo.base.db);
        assert!(log.contains("\"password_hash\""));
        assert!(!log.contains("plain-secret"));
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model(user_id)], Vec::<user::Model>::new()])
            .into_connection();
        let repo = PostgresUserRepository::new(db, Arc::new(StubHasher));

        let found = repo.find_by_email("amy@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user_id));

        let missing = repo.find_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_probe_reports_version() {
        let row = std::collections::BTreeMap::from([(
            "version",
            sea_orm::Value::from("PostgreSQL 16.2".to_owned()),
        )]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();
        let connections = DatabaseConnections::from_connection(db);

        let health = connections.probe(Duration::from_secs(3)).await;

        assert_eq!(
            health,
            DatabaseHealth::Up {
                version: Some("PostgreSQL 16.2".to_owned()),
                version_error: None,
            }
        );
    }

    #[tokio::test]
    async fn test_probe_version_failure_is_still_up() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();
        let connections = DatabaseConnections::from_connection(db);

        let health = connections.probe(Duration::from_secs(3)).await;

        assert!(matches!(
            health,
            DatabaseHealth::Up {
                version: None,
                version_error: Some(_),
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_insert_is_rolled_back() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom("insert failed".to_owned())])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let result = repo
            .create(NewPost {
                user_id: uuid::Uuid::new_v4(),
                title: "Hello".to_owned(),
                content: "Content".to_owned(),
            })
            .await;

        assert!(matches!(result, Err(RepoError::Query(_))));
        let log = sql_log(repo.db);
        assert!(log.contains("INSERT INTO \"posts\""));
        assert!(log.contains("ROLLBACK"));
        assert!(!log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_extreme_page_window_stays_bindable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();
        let repo = PostgresPostRepository::new(db);

        let page = Pagination::from_params(Some("9223372036854775807"), Some("3"));
        repo.find_many_by_user_id(uuid::Uuid::new_v4(), page, &FieldMap::new())
            .await
            .unwrap();

        let log = sql_log(repo.db);
        assert!(log.contains("BigUnsigned(Some(100))"));
        assert!(log.contains("BigUnsigned(Some(200))"));
        assert!(!log.contains("18446744073709551614"));
    }
}
