//! Job store: discovered and approved jobs.
//!
//! Discovery is idempotent per (owner, job_id); approval is idempotent per
//! (owner, discovered job). Not-found conditions are reported as boolean
//! results rather than errors so callers can tell "nothing to do" apart
//! from "something broke".

use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::pool::{AsyncSqlitePool, DieselError};
use super::records::{ApprovedJobRecord, DiscoveredJobRecord, NewApprovedJob, NewDiscoveredJob};
use super::{parse_datetime, parse_datetime_opt, OWNER_ID};
use crate::models::{ApprovedJobDetail, DayCount, DiscoveredJob, GroupCount, JobStatistics};
use crate::schema::{approved_jobs, discovered_jobs};

/// Row type for grouped-count raw queries.
#[derive(QueryableByName)]
struct GroupCountRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Row type for the per-day activity histogram.
#[derive(QueryableByName)]
struct DayCountRow {
    #[diesel(sql_type = Text)]
    day: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Repository for the discovered/approved job lifecycle.
#[derive(Clone)]
pub struct JobRepository {
    pool: AsyncSqlitePool,
}

impl JobRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a job stub discovered by the scan.
    ///
    /// Idempotent: returns false (and leaves the existing row untouched)
    /// when the (owner, job_id) pair already exists.
    pub async fn insert_stub(
        &self,
        job_id: i64,
        url: &str,
        location: &str,
        keyword: &str,
    ) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        let inserted = diesel::insert_or_ignore_into(discovered_jobs::table)
            .values(&NewDiscoveredJob {
                owner_id: OWNER_ID,
                job_id,
                url,
                location,
                keyword,
                date_discovered: &now,
            })
            .execute(&mut conn)
            .await?;

        Ok(inserted > 0)
    }

    /// Look up a discovered job by its source-system id.
    pub async fn get(&self, job_id: i64) -> Result<Option<DiscoveredJob>, DieselError> {
        let mut conn = self.pool.get().await?;

        let record: Option<DiscoveredJobRecord> = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .filter(discovered_jobs::job_id.eq(job_id))
            .first(&mut conn)
            .await
            .optional()?;

        Ok(record.map(record_to_job))
    }

    /// True when no row exists for this job or its title is still unset.
    pub async fn is_missing_details(&self, job_id: i64) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        let title: Option<Option<String>> = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .filter(discovered_jobs::job_id.eq(job_id))
            .select(discovered_jobs::title)
            .first(&mut conn)
            .await
            .optional()?;

        Ok(match title {
            None => true,
            Some(title) => title.is_none(),
        })
    }

    /// Overwrite title and description for a discovered job.
    ///
    /// Zero rows affected (job never discovered) is a non-fatal anomaly the
    /// caller may log; the scraping collaborator is best-effort.
    pub async fn update_details(
        &self,
        job_id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<usize, DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::update(
            discovered_jobs::table
                .filter(discovered_jobs::owner_id.eq(OWNER_ID))
                .filter(discovered_jobs::job_id.eq(job_id)),
        )
        .set((
            discovered_jobs::title.eq(title),
            discovered_jobs::description.eq(description),
        ))
        .execute(&mut conn)
        .await
    }

    /// Mark a job as analyzed. Idempotent.
    pub async fn mark_analyzed(&self, job_id: i64) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::update(
            discovered_jobs::table
                .filter(discovered_jobs::owner_id.eq(OWNER_ID))
                .filter(discovered_jobs::job_id.eq(job_id)),
        )
        .set(discovered_jobs::analyzed.eq(true))
        .execute(&mut conn)
        .await?;

        Ok(())
    }

    /// Approve a discovered job.
    ///
    /// Returns false when the job was never discovered. Returns true both
    /// when the approval row was created and when it already existed.
    pub async fn approve(&self, job_id: i64, reason: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let reason = reason.to_string();

        conn.transaction(|conn| {
            Box::pin(async move {
                let discovered_id: Option<i32> = discovered_jobs::table
                    .filter(discovered_jobs::owner_id.eq(OWNER_ID))
                    .filter(discovered_jobs::job_id.eq(job_id))
                    .select(discovered_jobs::id)
                    .first(conn)
                    .await
                    .optional()?;

                let Some(discovered_id) = discovered_id else {
                    return Ok(false);
                };

                let now = Utc::now().to_rfc3339();
                diesel::insert_or_ignore_into(approved_jobs::table)
                    .values(&NewApprovedJob {
                        owner_id: OWNER_ID,
                        discovered_job_id: discovered_id,
                        reason: &reason,
                        date_approved: &now,
                    })
                    .execute(conn)
                    .await?;

                Ok(true)
            })
        })
        .await
    }

    /// Set the application timestamp on an approved job, only if unset.
    ///
    /// Returns false when the row does not exist or was already applied;
    /// an existing timestamp is never overwritten.
    pub async fn mark_applied(&self, approved_id: i32) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        let updated = diesel::update(
            approved_jobs::table
                .filter(approved_jobs::owner_id.eq(OWNER_ID))
                .filter(approved_jobs::id.eq(approved_id))
                .filter(approved_jobs::date_applied.is_null()),
        )
        .set(approved_jobs::date_applied.eq(now))
        .execute(&mut conn)
        .await?;

        Ok(updated > 0)
    }

    /// Delete a single approved job. Returns false when absent.
    pub async fn delete_approved(&self, approved_id: i32) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(
            approved_jobs::table
                .filter(approved_jobs::owner_id.eq(OWNER_ID))
                .filter(approved_jobs::id.eq(approved_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(deleted > 0)
    }

    /// Delete all approved jobs for the owner, returning the count removed.
    pub async fn clear_all_approved(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        let deleted =
            diesel::delete(approved_jobs::table.filter(approved_jobs::owner_id.eq(OWNER_ID)))
                .execute(&mut conn)
                .await?;

        Ok(deleted as u64)
    }

    /// Delete all discovered jobs for the owner, cascading to approved rows
    /// first to satisfy the foreign-key constraint. Returns the number of
    /// discovered rows removed.
    pub async fn clear_all_discovered(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                diesel::delete(approved_jobs::table.filter(approved_jobs::owner_id.eq(OWNER_ID)))
                    .execute(conn)
                    .await?;

                let deleted = diesel::delete(
                    discovered_jobs::table.filter(discovered_jobs::owner_id.eq(OWNER_ID)),
                )
                .execute(conn)
                .await?;

                Ok(deleted as u64)
            })
        })
        .await
    }

    /// Archive all applied-and-unarchived jobs, returning the count archived.
    pub async fn archive_all_applied(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        let archived = diesel::update(
            approved_jobs::table
                .filter(approved_jobs::owner_id.eq(OWNER_ID))
                .filter(approved_jobs::date_applied.is_not_null())
                .filter(approved_jobs::is_archived.eq(false)),
        )
        .set(approved_jobs::is_archived.eq(true))
        .execute(&mut conn)
        .await?;

        Ok(archived as u64)
    }

    /// Jobs with a description that have not been analyzed yet, as
    /// (job_id, description) pairs.
    pub async fn unanalyzed_jobs(&self) -> Result<Vec<(i64, String)>, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(i64, Option<String>)> = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .filter(discovered_jobs::analyzed.eq(false))
            .filter(discovered_jobs::description.is_not_null())
            .select((discovered_jobs::job_id, discovered_jobs::description))
            .load(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, desc)| desc.map(|d| (id, d)))
            .collect())
    }

    /// Jobs still missing title or description, as (job_id, url) pairs.
    pub async fn jobs_missing_content(&self) -> Result<Vec<(i64, String)>, DieselError> {
        let mut conn = self.pool.get().await?;

        discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .filter(
                discovered_jobs::title
                    .is_null()
                    .or(discovered_jobs::description.is_null()),
            )
            .select((discovered_jobs::job_id, discovered_jobs::url))
            .load(&mut conn)
            .await
    }

    /// Active (unarchived) approved jobs with their postings, newest first.
    pub async fn active_approved(&self) -> Result<Vec<ApprovedJobDetail>, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(ApprovedJobRecord, DiscoveredJobRecord)> = approved_jobs::table
            .inner_join(discovered_jobs::table)
            .filter(approved_jobs::owner_id.eq(OWNER_ID))
            .filter(approved_jobs::is_archived.eq(false))
            .order(approved_jobs::date_approved.desc())
            .select((
                ApprovedJobRecord::as_select(),
                DiscoveredJobRecord::as_select(),
            ))
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(records_to_detail).collect())
    }

    /// Approval detail for one posting, by its source-system job id.
    pub async fn approved_detail(
        &self,
        job_id: i64,
    ) -> Result<Option<ApprovedJobDetail>, DieselError> {
        let mut conn = self.pool.get().await?;

        let row: Option<(ApprovedJobRecord, DiscoveredJobRecord)> = approved_jobs::table
            .inner_join(discovered_jobs::table)
            .filter(approved_jobs::owner_id.eq(OWNER_ID))
            .filter(discovered_jobs::job_id.eq(job_id))
            .select((
                ApprovedJobRecord::as_select(),
                DiscoveredJobRecord::as_select(),
            ))
            .first(&mut conn)
            .await
            .optional()?;

        Ok(row.map(records_to_detail))
    }

    /// Most recently discovered jobs.
    pub async fn recent_discovered(&self, limit: i64) -> Result<Vec<DiscoveredJob>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<DiscoveredJobRecord> = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .order(discovered_jobs::date_discovered.desc())
            .limit(limit)
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(record_to_job).collect())
    }

    /// Most recent approvals with their postings.
    pub async fn recent_approved(&self, limit: i64) -> Result<Vec<ApprovedJobDetail>, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(ApprovedJobRecord, DiscoveredJobRecord)> = approved_jobs::table
            .inner_join(discovered_jobs::table)
            .filter(approved_jobs::owner_id.eq(OWNER_ID))
            .order(approved_jobs::date_approved.desc())
            .limit(limit)
            .select((
                ApprovedJobRecord::as_select(),
                DiscoveredJobRecord::as_select(),
            ))
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(records_to_detail).collect())
    }

    /// Total discovered rows for the owner.
    pub async fn count_discovered(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count as u64)
    }

    /// Counters for the persisted scan-state view: total discovered, active
    /// (unarchived) approved, active applied, and analyzed counts.
    pub async fn scan_counters(&self) -> Result<(u64, u64, u64, u64), DieselError> {
        let mut conn = self.pool.get().await?;
        use diesel::dsl::count_star;

        let discovered: i64 = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .select(count_star())
            .first(&mut conn)
            .await?;

        let approved: i64 = approved_jobs::table
            .filter(approved_jobs::owner_id.eq(OWNER_ID))
            .filter(approved_jobs::is_archived.eq(false))
            .select(count_star())
            .first(&mut conn)
            .await?;

        let applied: i64 = approved_jobs::table
            .filter(approved_jobs::owner_id.eq(OWNER_ID))
            .filter(approved_jobs::is_archived.eq(false))
            .filter(approved_jobs::date_applied.is_not_null())
            .select(count_star())
            .first(&mut conn)
            .await?;

        let analyzed: i64 = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .filter(discovered_jobs::analyzed.eq(true))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok((
            discovered as u64,
            approved as u64,
            applied as u64,
            analyzed as u64,
        ))
    }

    /// Dashboard statistics: basic counts, grouped top-10 counts by
    /// location and keyword, and the trailing 30-day discovery histogram.
    pub async fn statistics(&self) -> Result<JobStatistics, DieselError> {
        let mut conn = self.pool.get().await?;
        use diesel::dsl::count_star;

        let total_discovered: i64 = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .select(count_star())
            .first(&mut conn)
            .await?;

        let total_analyzed: i64 = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .filter(discovered_jobs::analyzed.eq(true))
            .select(count_star())
            .first(&mut conn)
            .await?;

        let total_with_details: i64 = discovered_jobs::table
            .filter(discovered_jobs::owner_id.eq(OWNER_ID))
            .filter(discovered_jobs::title.is_not_null())
            .filter(discovered_jobs::description.is_not_null())
            .select(count_star())
            .first(&mut conn)
            .await?;

        let total_approved: i64 = approved_jobs::table
            .filter(approved_jobs::owner_id.eq(OWNER_ID))
            .select(count_star())
            .first(&mut conn)
            .await?;

        let total_applied: i64 = approved_jobs::table
            .filter(approved_jobs::owner_id.eq(OWNER_ID))
            .filter(approved_jobs::date_applied.is_not_null())
            .select(count_star())
            .first(&mut conn)
            .await?;

        let total_archived: i64 = approved_jobs::table
            .filter(approved_jobs::owner_id.eq(OWNER_ID))
            .filter(approved_jobs::is_archived.eq(true))
            .select(count_star())
            .first(&mut conn)
            .await?;

        let by_location: Vec<GroupCountRow> = diesel::sql_query(
            "SELECT location AS name, COUNT(*) AS count FROM discovered_jobs \
             WHERE owner_id = ? GROUP BY location ORDER BY count DESC LIMIT 10",
        )
        .bind::<Integer, _>(OWNER_ID)
        .load(&mut conn)
        .await?;

        let by_keyword: Vec<GroupCountRow> = diesel::sql_query(
            "SELECT keyword AS name, COUNT(*) AS count FROM discovered_jobs \
             WHERE owner_id = ? GROUP BY keyword ORDER BY count DESC LIMIT 10",
        )
        .bind::<Integer, _>(OWNER_ID)
        .load(&mut conn)
        .await?;

        let recent_activity: Vec<DayCountRow> = diesel::sql_query(
            "SELECT DATE(date_discovered) AS day, COUNT(*) AS count FROM discovered_jobs \
             WHERE owner_id = ? AND date_discovered >= datetime('now', '-30 days') \
             GROUP BY DATE(date_discovered) ORDER BY day DESC",
        )
        .bind::<Integer, _>(OWNER_ID)
        .load(&mut conn)
        .await?;

        Ok(JobStatistics {
            total_discovered: total_discovered as u64,
            total_analyzed: total_analyzed as u64,
            total_with_details: total_with_details as u64,
            total_approved: total_approved as u64,
            total_applied: total_applied as u64,
            total_archived: total_archived as u64,
            by_location: by_location
                .into_iter()
                .map(|r| GroupCount {
                    name: r.name,
                    count: r.count as u64,
                })
                .collect(),
            by_keyword: by_keyword
                .into_iter()
                .map(|r| GroupCount {
                    name: r.name,
                    count: r.count as u64,
                })
                .collect(),
            recent_activity: recent_activity
                .into_iter()
                .map(|r| DayCount {
                    day: r.day,
                    count: r.count as u64,
                })
                .collect(),
        })
    }
}

fn record_to_job(record: DiscoveredJobRecord) -> DiscoveredJob {
    DiscoveredJob {
        job_id: record.job_id,
        url: record.url,
        location: record.location,
        keyword: record.keyword,
        title: record.title,
        description: record.description,
        analyzed: record.analyzed,
        date_discovered: parse_datetime(&record.date_discovered),
    }
}

fn records_to_detail((approved, job): (ApprovedJobRecord, DiscoveredJobRecord)) -> ApprovedJobDetail {
    ApprovedJobDetail {
        approved_id: approved.id,
        job_id: job.job_id,
        title: job.title,
        url: job.url,
        location: job.location,
        keyword: job.keyword,
        description: job.description,
        reason: approved.reason,
        date_approved: parse_datetime(&approved.date_approved),
        date_applied: parse_datetime_opt(approved.date_applied),
        is_archived: approved.is_archived,
        date_discovered: parse_datetime(&job.date_discovered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::run_migrations;
    use tempfile::TempDir;

    async fn setup() -> (JobRepository, TempDir) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");
        let url = db_path.display().to_string();
        run_migrations(&url).await.unwrap();
        (JobRepository::new(AsyncSqlitePool::new(&url)), dir)
    }

    async fn insert_sample(repo: &JobRepository, job_id: i64) {
        repo.insert_stub(
            job_id,
            &format!("https://www.linkedin.com/jobs/view/{}/", job_id),
            "Remote",
            "Software Engineer",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn insert_stub_is_idempotent() {
        let (repo, _dir) = setup().await;

        let first = repo
            .insert_stub(42, "https://x.example/jobs/view/42/", "Remote", "SE")
            .await
            .unwrap();
        let second = repo
            .insert_stub(42, "https://x.example/jobs/view/42/", "Remote", "SE")
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(repo.count_discovered().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_details_until_enriched() {
        let (repo, _dir) = setup().await;
        insert_sample(&repo, 7).await;

        assert!(repo.is_missing_details(7).await.unwrap());
        assert!(repo.is_missing_details(999).await.unwrap());

        let affected = repo
            .update_details(7, Some("Backend Engineer"), Some("Build services."))
            .await
            .unwrap();
        assert_eq!(affected, 1);
        assert!(!repo.is_missing_details(7).await.unwrap());

        let job = repo.get(7).await.unwrap().unwrap();
        assert_eq!(job.title.as_deref(), Some("Backend Engineer"));
    }

    #[tokio::test]
    async fn update_details_on_unknown_job_affects_zero_rows() {
        let (repo, _dir) = setup().await;
        let affected = repo
            .update_details(123, Some("t"), Some("d"))
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn approve_is_idempotent() {
        let (repo, _dir) = setup().await;
        insert_sample(&repo, 10).await;

        assert!(repo.approve(10, "good fit").await.unwrap());
        assert!(repo.approve(10, "good fit").await.unwrap());

        let approved = repo.active_approved().await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].reason, "good fit");
    }

    #[tokio::test]
    async fn approve_unknown_job_returns_false() {
        let (repo, _dir) = setup().await;
        assert!(!repo.approve(404, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn mark_applied_is_monotonic() {
        let (repo, _dir) = setup().await;
        insert_sample(&repo, 11).await;
        repo.approve(11, "reason").await.unwrap();

        let detail = repo.approved_detail(11).await.unwrap().unwrap();
        assert!(repo.mark_applied(detail.approved_id).await.unwrap());

        let applied_at = repo
            .approved_detail(11)
            .await
            .unwrap()
            .unwrap()
            .date_applied
            .unwrap();

        // Second apply fails and leaves the original timestamp in place
        assert!(!repo.mark_applied(detail.approved_id).await.unwrap());
        let still_applied_at = repo
            .approved_detail(11)
            .await
            .unwrap()
            .unwrap()
            .date_applied
            .unwrap();
        assert_eq!(applied_at, still_applied_at);

        // Nonexistent row also reports false
        assert!(!repo.mark_applied(9999).await.unwrap());
    }

    #[tokio::test]
    async fn clear_all_discovered_cascades_to_approved() {
        let (repo, _dir) = setup().await;
        insert_sample(&repo, 1).await;
        insert_sample(&repo, 2).await;
        repo.approve(1, "r").await.unwrap();

        let removed = repo.clear_all_discovered().await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.count_discovered().await.unwrap(), 0);
        assert!(repo.active_approved().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn archive_all_applied_skips_unapplied() {
        let (repo, _dir) = setup().await;
        insert_sample(&repo, 1).await;
        insert_sample(&repo, 2).await;
        repo.approve(1, "a").await.unwrap();
        repo.approve(2, "b").await.unwrap();

        let detail = repo.approved_detail(1).await.unwrap().unwrap();
        repo.mark_applied(detail.approved_id).await.unwrap();

        assert_eq!(repo.archive_all_applied().await.unwrap(), 1);
        // Archiving again finds nothing applied-and-unarchived
        assert_eq!(repo.archive_all_applied().await.unwrap(), 0);

        let active = repo.active_approved().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].job_id, 2);
    }

    #[tokio::test]
    async fn delete_approved_reports_absence() {
        let (repo, _dir) = setup().await;
        insert_sample(&repo, 5).await;
        repo.approve(5, "r").await.unwrap();

        let detail = repo.approved_detail(5).await.unwrap().unwrap();
        assert!(repo.delete_approved(detail.approved_id).await.unwrap());
        assert!(!repo.delete_approved(detail.approved_id).await.unwrap());
    }

    #[tokio::test]
    async fn unanalyzed_and_missing_content_views() {
        let (repo, _dir) = setup().await;
        insert_sample(&repo, 1).await;
        insert_sample(&repo, 2).await;
        repo.update_details(1, Some("Title"), Some("Desc")).await.unwrap();

        let unanalyzed = repo.unanalyzed_jobs().await.unwrap();
        assert_eq!(unanalyzed, vec![(1, "Desc".to_string())]);

        let missing = repo.jobs_missing_content().await.unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].0, 2);

        repo.mark_analyzed(1).await.unwrap();
        assert!(repo.unanalyzed_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn statistics_counts_and_groupings() {
        let (repo, _dir) = setup().await;
        repo.insert_stub(1, "u1", "Remote", "Rust Engineer").await.unwrap();
        repo.insert_stub(2, "u2", "Remote", "Rust Engineer").await.unwrap();
        repo.insert_stub(3, "u3", "Berlin", "Platform Engineer").await.unwrap();
        repo.update_details(1, Some("t"), Some("d")).await.unwrap();
        repo.mark_analyzed(1).await.unwrap();
        repo.approve(1, "r").await.unwrap();

        let stats = repo.statistics().await.unwrap();
        assert_eq!(stats.total_discovered, 3);
        assert_eq!(stats.total_analyzed, 1);
        assert_eq!(stats.total_with_details, 1);
        assert_eq!(stats.total_approved, 1);
        assert_eq!(stats.total_applied, 0);
        assert_eq!(stats.by_location[0].name, "Remote");
        assert_eq!(stats.by_location[0].count, 2);
        assert_eq!(stats.by_keyword[0].name, "Rust Engineer");
        assert!(!stats.recent_activity.is_empty());
    }

    #[tokio::test]
    async fn scan_counters_track_active_rows() {
        let (repo, _dir) = setup().await;
        insert_sample(&repo, 1).await;
        insert_sample(&repo, 2).await;
        repo.approve(1, "r").await.unwrap();
        let detail = repo.approved_detail(1).await.unwrap().unwrap();
        repo.mark_applied(detail.approved_id).await.unwrap();
        repo.mark_analyzed(1).await.unwrap();

        let (discovered, approved, applied, analyzed) = repo.scan_counters().await.unwrap();
        assert_eq!((discovered, approved, applied, analyzed), (2, 1, 1, 1));

        // Archived approvals drop out of the active counters
        repo.archive_all_applied().await.unwrap();
        let (_, approved, applied, _) = repo.scan_counters().await.unwrap();
        assert_eq!((approved, applied), (0, 0));
    }
}
