use crate::model::{Customer, Order, StorageError};
use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const CUSTOMER_COLLECTION: &str = "customers";
pub const ORDER_COLLECTION: &str = "orders";

/// Document store backed by SQLite: every collection is a table of JSON bodies
/// kept in insertion order.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database file at `db_path`.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Closes the connection, surfacing any error SQLite reports on shutdown.
    pub fn close(self) -> Result<(), StorageError> {
        self.conn.close().map_err(|(_, e)| StorageError::DatabaseError(e))
    }

    /// Removes the collection and every document in it. Missing collections are ignored.
    pub fn drop_collection(&self, name: &str) -> Result<(), StorageError> {
        let table = table_name(name)?;
        self.conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", table))?;
        Ok(())
    }

    /// Appends documents to the collection, creating it on first use.
    pub fn insert_many<T: Serialize>(
        &mut self,
        name: &str,
        docs: &[T],
    ) -> Result<usize, StorageError> {
        let table = table_name(name)?;
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                body TEXT NOT NULL
            )",
            table
        ))?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {} (body) VALUES (?1)", table))?;
            for doc in docs {
                let body = serde_json::to_string(doc)?;
                stmt.execute(params![body])?;
            }
        }
        tx.commit()?;
        Ok(docs.len())
    }

    /// Reads every document of the collection in insertion order.
    /// A collection that was never written reads as empty.
    pub fn find_all<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StorageError> {
        let table = table_name(name)?;
        if !self.collection_exists(name)? {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT body FROM {} ORDER BY seq ASC", table))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut docs = Vec::new();
        for body in rows {
            docs.push(serde_json::from_str(&body?)?);
        }
        Ok(docs)
    }

    pub fn count(&self, name: &str) -> Result<usize, StorageError> {
        let table = table_name(name)?;
        if !self.collection_exists(name)? {
            return Ok(0);
        }
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn collection_exists(&self, name: &str) -> Result<bool, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        let mut rows = stmt.query(params![name])?;
        let exists = rows.next()?.is_some();
        Ok(exists)
    }

    /// Drops both collections and reinserts the given records.
    pub fn replace_dataset(
        &mut self,
        customers: &[Customer],
        orders: &[Order],
    ) -> Result<(), StorageError> {
        self.drop_collection(CUSTOMER_COLLECTION)?;
        self.drop_collection(ORDER_COLLECTION)?;
        self.insert_many(CUSTOMER_COLLECTION, customers)?;
        self.insert_many(ORDER_COLLECTION, orders)?;
        Ok(())
    }

    pub fn load_customers(&self) -> Result<Vec<Customer>, StorageError> {
        self.find_all(CUSTOMER_COLLECTION)
    }

    pub fn load_orders(&self) -> Result<Vec<Order>, StorageError> {
        self.find_all(ORDER_COLLECTION)
    }
}

/// Quotes a collection name for use as a table identifier.
fn table_name(name: &str) -> Result<String, StorageError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with("sqlite_");
    if !valid {
        return Err(StorageError::InvalidCollection(name.to_string()));
    }
    Ok(format!("\"{}\"", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarketingChannel;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn customer(id: i64) -> Customer {
        Customer {
            customer_id: id,
            name: format!("Customer {}", id),
            email: format!("c{}@example.com", id),
            signup_date: Utc.with_ymd_and_hms(2023, 1, 1, 9, 30, 0).unwrap(),
            marketing_channel: MarketingChannel::PaidAds,
        }
    }

    fn order(customer_id: i64, value: f64) -> Order {
        Order {
            order_id: Uuid::new_v4(),
            customer_id,
            order_date: Utc.with_ymd_and_hms(2023, 2, 3, 12, 0, 0).unwrap(),
            order_value: value,
            coupon_used: false,
        }
    }

    #[test]
    fn missing_collection_reads_empty() {
        let storage = SqliteStorage::in_memory().unwrap();
        let customers = storage.load_customers().unwrap();
        assert!(customers.is_empty());
        assert_eq!(storage.count(ORDER_COLLECTION).unwrap(), 0);
    }

    #[test]
    fn documents_keep_insertion_order() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        let customers = vec![customer(1002), customer(1000), customer(1001)];
        storage.insert_many(CUSTOMER_COLLECTION, &customers).unwrap();

        let loaded = storage.load_customers().unwrap();
        assert_eq!(loaded, customers);
    }

    #[test]
    fn replace_dataset_overwrites_previous_run() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage
            .replace_dataset(&[customer(1), customer(2)], &[order(1, 20.0), order(2, 30.0)])
            .unwrap();
        storage
            .replace_dataset(&[customer(3)], &[order(3, 45.5)])
            .unwrap();

        let customers = storage.load_customers().unwrap();
        let orders = storage.load_orders().unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].customer_id, 3);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_value, 45.5);
    }

    #[test]
    fn documents_use_data_model_field_names() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.insert_many(CUSTOMER_COLLECTION, &[customer(7)]).unwrap();

        let raw: Vec<serde_json::Value> = storage.find_all(CUSTOMER_COLLECTION).unwrap();
        assert_eq!(raw[0]["customer_id"], 7);
        assert_eq!(raw[0]["marketing_channel"], "Paid Ads");
        assert!(raw[0]["signup_date"].as_str().unwrap().starts_with("2023-01-01T09:30:00"));
    }

    #[test]
    fn rejects_unsafe_collection_names() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(matches!(
            storage.drop_collection("orders; DROP TABLE x"),
            Err(StorageError::InvalidCollection(_))
        ));
        assert!(storage.drop_collection("sqlite_master").is_err());
    }
}
