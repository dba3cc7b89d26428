//! SeaORM entities.

pub mod post;
pub mod user;

use sea_orm::EntityTrait;

/// Entities keyed by a UUID `id` and carrying `created_at` / `updated_at`.
pub trait TrackedEntity: EntityTrait {
    fn id_column() -> Self::Column;
    fn created_at_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
}
