use chrono::Utc;
use diesel::prelude::*;

use crate::db::{DbPool, establish_connection_pool, get_connection, run_migrations};
use crate::models::local_storage::{NewStoredItem, StoredItem};
use crate::storage::LocalStorage;
use crate::storage::errors::StorageResult;

/// Diesel implementation of [`LocalStorage`] backed by a SQLite file.
#[derive(Clone)]
pub struct DieselLocalStorage {
    pool: DbPool,
}

impl DieselLocalStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `database_url` and applies
    /// pending migrations.
    pub fn open(database_url: &str) -> StorageResult<Self> {
        let pool = establish_connection_pool(database_url)?;
        run_migrations(&pool)?;
        Ok(Self::new(pool))
    }
}

impl LocalStorage for DieselLocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        use crate::schema::local_storage;

        let mut conn = get_connection(&self.pool)?;
        let item = local_storage::table
            .find(key)
            .select(StoredItem::as_select())
            .first::<StoredItem>(&mut conn)
            .optional()?;

        Ok(item.map(|item| item.value))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        use crate::schema::local_storage;

        let mut conn = get_connection(&self.pool)?;
        let item = NewStoredItem {
            key,
            value,
            updated_at: Utc::now().naive_utc(),
        };
        diesel::replace_into(local_storage::table)
            .values(&item)
            .execute(&mut conn)?;

        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        use crate::schema::local_storage;

        let mut conn = get_connection(&self.pool)?;
        diesel::delete(local_storage::table.find(key)).execute(&mut conn)?;

        Ok(())
    }
}
