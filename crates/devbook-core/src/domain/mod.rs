//! Domain entities - the core business objects.

mod fields;
mod pagination;
mod post;
mod user;

pub use fields::{Field, FieldMap, PostField, UserField};
pub use pagination::{DEFAULT_LIMIT, MAX_LIMIT, Pagination};
pub use post::{NewPost, Post};
pub use user::{NewUser, User};
