use std::marker::PhantomData;

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use devbook_core::RepoError;
use devbook_core::domain::{Field, FieldMap, Pagination};

use super::entity::TrackedEntity;
use super::support::escape_like;

/// Generic PostgreSQL repository implementation.
///
/// Entity-specific repositories delegate the shared CRUD mechanics here and
/// convert models to domain types themselves.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: TrackedEntity,
    E::Model: Send + Sync,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, RepoError> {
        E::find()
            .filter(E::id_column().eq(id))
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// Insert a row inside an explicit transaction, rolling back on failure.
    pub async fn insert<A>(&self, model: A) -> Result<E::Model, RepoError>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync + 'static,
        E::Model: IntoActiveModel<A>,
    {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        match model.insert(&txn).await {
            Ok(inserted) => {
                txn.commit().await.map_err(map_db_err)?;
                Ok(inserted)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback after failed insert also failed");
                }
                Err(map_db_err(e))
            }
        }
    }

    /// List one page of rows from `select`, ANDing a case-insensitive
    /// substring match for every filter.
    pub async fn find_page(
        &self,
        select: Select<E>,
        page: Pagination,
        filters: Vec<(E::Column, String)>,
    ) -> Result<Vec<E::Model>, RepoError> {
        let mut select = select;
        for (column, needle) in filters {
            select = select.filter(ilike(column, &needle));
        }

        select
            .order_by_asc(E::created_at_column())
            .order_by_asc(E::id_column())
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    /// `UPDATE ... SET <assignments>, updated_at = CURRENT_TIMESTAMP WHERE id = $n RETURNING *`.
    pub async fn update_columns(
        &self,
        id: Uuid,
        assignments: Vec<(E::Column, String)>,
    ) -> Result<E::Model, RepoError> {
        if assignments.is_empty() {
            return Err(RepoError::EmptyUpdate);
        }

        let mut update = E::update_many();
        for (column, value) in assignments {
            update = update.col_expr(column, Expr::value(value));
        }

        let updated = update
            .col_expr(E::updated_at_column(), SimpleExpr::from(Expr::current_timestamp()))
            .filter(E::id_column().eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        updated.into_iter().next().ok_or(RepoError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<Uuid, RepoError> {
        let result = E::delete_many()
            .filter(E::id_column().eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(id)
    }
}

/// `LOWER(column) LIKE '%needle%'` with wildcards in the needle escaped.
fn ilike<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Translate allow-listed fields into their entity columns.
pub(crate) fn to_columns<F, C>(fields: &FieldMap<F>) -> Vec<(C, String)>
where
    F: Field,
    C: From<F>,
{
    fields
        .iter()
        .map(|(field, value)| (C::from(field), value.to_string()))
        .collect()
}

/// Classify a SeaORM error at the data-access boundary.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    let sql_err = err.sql_err();
    classify(err, sql_err)
}

/// `sql_err` is the driver-level reading of `err`, when there is one.
fn classify(err: DbErr, sql_err: Option<SqlErr>) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = sql_err {
        return RepoError::Constraint(detail);
    }

    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        DbErr::RecordNotFound(_) => RepoError::NotFound,
        other => RepoError::Query(other.to_string()),
    }
}
