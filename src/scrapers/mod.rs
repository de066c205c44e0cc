//! Job board scraping.
//!
//! The JobBoard trait abstracts a job source so the scan pipeline can run
//! against a stub board in tests. The one production implementation scrapes
//! LinkedIn's guest pages.

pub mod extract;
pub mod linkedin;

use async_trait::async_trait;

pub use linkedin::LinkedInBoard;

/// A job discovered on a search results page, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStub {
    pub job_id: i64,
    pub url: String,
}

/// A searchable job source.
#[async_trait]
pub trait JobBoard: Send + Sync {
    /// Search one keyword/location pair, returning deduplicated job stubs.
    async fn search(&self, keyword: &str, location: &str) -> anyhow::Result<Vec<JobStub>>;

    /// Fetch a posting's title and description. Either may be unavailable;
    /// partial results are normal and not an error.
    async fn fetch_details(&self, job_id: i64, url: &str) -> (Option<String>, Option<String>);
}
