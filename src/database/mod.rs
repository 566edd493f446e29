pub mod manager;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgStore;
pub use store::{ListQuery, MemoryStore, RecordStore, StoreError};
