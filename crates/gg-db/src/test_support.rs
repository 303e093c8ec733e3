//! Shared test utilities for gg-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::GearDb;
    use crate::service::GearService;

    /// Open a fresh file-backed database in a temp dir. Keep the `TempDir`
    /// alive for as long as the database is used.
    pub async fn test_db() -> (TempDir, GearDb) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gear.db");
        let db = GearDb::open_local(path.to_str().unwrap(), Duration::from_secs(5))
            .await
            .unwrap();
        (dir, db)
    }

    /// A service over a fresh database with the default SQL collaborators.
    pub async fn test_service() -> (TempDir, GearService) {
        let (dir, db) = test_db().await;
        (dir, GearService::builder(Arc::new(db)).build())
    }
}
