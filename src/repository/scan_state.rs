//! Persisted scan-control flags.
//!
//! The in-memory controller is the source of truth for whether a scan is
//! running; these rows mirror its transitions so external observers (and a
//! restarted process) can read the last known state. Upserts touch only the
//! targeted flag so the two columns never clobber each other.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::pool::{AsyncSqlitePool, DieselError};
use super::OWNER_ID;
use crate::schema::scan_control;

#[derive(Clone)]
pub struct ScanStateRepository {
    pool: AsyncSqlitePool,
}

impl ScanStateRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Set or clear the persisted stop-request flag.
    pub async fn set_stop_requested(&self, value: bool) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(scan_control::table)
            .values((
                scan_control::owner_id.eq(OWNER_ID),
                scan_control::stop_requested.eq(value),
            ))
            .on_conflict(scan_control::owner_id)
            .do_update()
            .set(scan_control::stop_requested.eq(value))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Set or clear the persisted scan-active flag.
    pub async fn set_active(&self, value: bool) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(scan_control::table)
            .values((
                scan_control::owner_id.eq(OWNER_ID),
                scan_control::scan_active.eq(value),
            ))
            .on_conflict(scan_control::owner_id)
            .do_update()
            .set(scan_control::scan_active.eq(value))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Read the persisted stop-request flag. Absent row means false.
    pub async fn stop_requested(&self) -> Result<bool, DieselError> {
        Ok(self.flags().await?.0)
    }

    /// Read both persisted flags as (stop_requested, scan_active).
    pub async fn flags(&self) -> Result<(bool, bool), DieselError> {
        let mut conn = self.pool.get().await?;

        let row: Option<(bool, bool)> = scan_control::table
            .filter(scan_control::owner_id.eq(OWNER_ID))
            .select((scan_control::stop_requested, scan_control::scan_active))
            .first(&mut conn)
            .await
            .optional()?;

        Ok(row.unwrap_or((false, false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::run_migrations;
    use tempfile::TempDir;

    async fn setup() -> (ScanStateRepository, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = dir.path().join("test.db").display().to_string();
        run_migrations(&url).await.unwrap();
        (ScanStateRepository::new(AsyncSqlitePool::new(&url)), dir)
    }

    #[tokio::test]
    async fn flags_default_to_false() {
        let (repo, _dir) = setup().await;
        assert_eq!(repo.flags().await.unwrap(), (false, false));
        assert!(!repo.stop_requested().await.unwrap());
    }

    #[tokio::test]
    async fn updating_one_flag_preserves_the_other() {
        let (repo, _dir) = setup().await;

        repo.set_active(true).await.unwrap();
        repo.set_stop_requested(true).await.unwrap();
        assert_eq!(repo.flags().await.unwrap(), (true, true));

        repo.set_stop_requested(false).await.unwrap();
        assert_eq!(repo.flags().await.unwrap(), (false, true));

        repo.set_active(false).await.unwrap();
        assert_eq!(repo.flags().await.unwrap(), (false, false));
    }
}
