//! Job lifecycle models.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A job posting found during a scan.
///
/// Created as a stub (identifying fields only); title and description are
/// filled in by the enrichment step, and `analyzed` flips once the posting
/// has been through evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredJob {
    /// Source-system job identifier (unique per owner).
    pub job_id: i64,
    pub url: String,
    pub location: String,
    pub keyword: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub analyzed: bool,
    pub date_discovered: DateTime<Utc>,
}

/// An approved job joined with its discovered posting, as shown to the
/// operator.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovedJobDetail {
    /// Primary key of the approval row (used for apply/delete).
    pub approved_id: i32,
    pub job_id: i64,
    pub title: Option<String>,
    pub url: String,
    pub location: String,
    pub keyword: String,
    pub description: Option<String>,
    pub reason: String,
    pub date_approved: DateTime<Utc>,
    pub date_applied: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub date_discovered: DateTime<Utc>,
}
