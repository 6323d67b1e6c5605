use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::db::{Database, migrations};
use crate::error::Result;

static DB_CACHE: LazyLock<Mutex<HashMap<String, Arc<Database>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Get or create a database connection
///
/// If the database already exists in the cache, returns the cached instance.
/// Otherwise, creates a new database, runs migrations, and caches it.
pub fn open_database<P: AsRef<Path>>(db_path: P) -> Result<Arc<Database>> {
    let db_path = db_path.as_ref();
    let cache_key = db_path.to_string_lossy().to_string();

    let mut cache = DB_CACHE.lock();

    if let Some(db) = cache.get(&cache_key) {
        tracing::debug!(path = %db_path.display(), "Reusing cached database");
        return Ok(Arc::clone(db));
    }

    let db = Database::new(db_path)?;
    db.with_connection(migrations::run_migrations)?;

    let db = Arc::new(db);
    cache.insert(cache_key, Arc::clone(&db));

    tracing::info!(path = %db_path.display(), "Opened database");

    Ok(db)
}

/// Migrated in-memory database, not cached.
pub fn open_in_memory() -> Result<Arc<Database>> {
    let db = Database::open_in_memory()?;
    db.with_connection(migrations::run_migrations)?;
    Ok(Arc::new(db))
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn test_cache_reuse() {
        let dir = env::temp_dir().join(format!("braingym_cache_{}", uuid::Uuid::new_v4()));

        let db1 = open_database(dir.join("a.db")).unwrap();
        let db2 = open_database(dir.join("a.db")).unwrap();
        assert!(Arc::ptr_eq(&db1, &db2));

        let other = open_database(dir.join("b.db")).unwrap();
        assert!(!Arc::ptr_eq(&db1, &other));

        std::fs::remove_dir_all(dir).ok();
    }
}
