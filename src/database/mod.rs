pub mod access;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod schema;

pub use access::{assert_member, is_member, AccessError, ResourceKind};
pub use manager::{DatabaseError, DatabaseManager};
pub use query_builder::{build_update, execute_update, OwnedBy, SqlResult, Table, UpdateBuilder};
