//! Scan status and statistics models.

use serde::Serialize;

/// Liveness-based scan status, sourced from the in-memory task handle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanStatus {
    pub is_running: bool,
    pub stop_requested: bool,
}

/// Persisted scan-state view combining the stored control flags with
/// aggregate job counters. Served for display purposes; the in-memory
/// handle remains the source of truth for liveness.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStateView {
    pub is_active: bool,
    pub should_stop: bool,
    pub total_discovered: u64,
    pub total_approved: u64,
    pub total_applied: u64,
    pub total_analyzed: u64,
}

/// A (group value, row count) pair for grouped statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GroupCount {
    pub name: String,
    pub count: u64,
}

/// Per-day discovery count for the trailing activity window.
#[derive(Debug, Clone, Serialize)]
pub struct DayCount {
    pub day: String,
    pub count: u64,
}

/// Dashboard statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobStatistics {
    pub total_discovered: u64,
    pub total_analyzed: u64,
    pub total_with_details: u64,
    pub total_approved: u64,
    pub total_applied: u64,
    pub total_archived: u64,
    pub by_location: Vec<GroupCount>,
    pub by_keyword: Vec<GroupCount>,
    pub recent_activity: Vec<DayCount>,
}
