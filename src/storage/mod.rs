pub mod sqlite;

pub use sqlite::{CUSTOMER_COLLECTION, ORDER_COLLECTION, SqliteStorage};
