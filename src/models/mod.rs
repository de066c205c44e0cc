//! Domain models shared across the repository, scan, and server layers.

mod job;
mod scan;

pub use job::{ApprovedJobDetail, DiscoveredJob};
pub use scan::{DayCount, GroupCount, JobStatistics, ScanStateView, ScanStatus};
