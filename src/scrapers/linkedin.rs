//! LinkedIn guest-page scraper.
//!
//! Works entirely against the logged-out HTML surfaces: the public search
//! pages for discovery and the posting pages (plus the guest posting API)
//! for details. Transient upstream failures retry with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::extract::{canonicalize_href, clean_description};
use super::{JobBoard, JobStub};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const RETRIES: u32 = 4;
const BASE_DELAY: Duration = Duration::from_secs(2);
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

const SEARCH_BASE: &str = "https://www.linkedin.com/jobs/search/";
const GUEST_POSTING_BASE: &str = "https://www.linkedin.com/jobs-guest/jobs/api/jobPosting";

pub struct LinkedInBoard {
    client: reqwest::Client,
}

impl LinkedInBoard {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Search URL variants for one keyword/location pair.
    ///
    /// "Remote" searches use the remote work-type filter; everything else
    /// gets both the on-site and hybrid filters within a 75 mile radius.
    fn search_urls(keyword: &str, location: &str) -> Vec<String> {
        let keyword = keyword.replace(' ', "%20");
        if location.eq_ignore_ascii_case("remote") {
            vec![format!("{}?keywords={}&f_WT=2", SEARCH_BASE, keyword)]
        } else {
            let location = location.replace(' ', "%20");
            vec![
                format!(
                    "{}?keywords={}&location={}&distance=75&f_WT=1",
                    SEARCH_BASE, keyword, location
                ),
                format!(
                    "{}?keywords={}&location={}&distance=75&f_WT=3",
                    SEARCH_BASE, keyword, location
                ),
            ]
        }
    }

    /// GET a page, retrying with exponential backoff on rate-limit and
    /// gateway errors. Returns None once retries are exhausted or on any
    /// other failure.
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let mut delay = BASE_DELAY;
        for attempt in 0..RETRIES {
            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(err) => {
                    debug!(url, error = %err, "request failed");
                    return None;
                }
            };

            match response.status() {
                StatusCode::OK => return response.text().await.ok(),
                StatusCode::TOO_MANY_REQUESTS
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT => {
                    debug!(url, attempt, "transient upstream status, backing off");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                status => {
                    debug!(url, %status, "non-retryable status");
                    return None;
                }
            }
        }
        None
    }

    /// Guest posting API fallback for postings the HTML page hides.
    async fn fetch_guest(&self, job_id: i64) -> (Option<String>, Option<String>) {
        let url = format!("{}/{}", GUEST_POSTING_BASE, job_id);
        match self.fetch_page(&url).await {
            Some(html) => parse_guest_posting(&html),
            None => (None, None),
        }
    }
}

impl Default for LinkedInBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobBoard for LinkedInBoard {
    async fn search(&self, keyword: &str, location: &str) -> anyhow::Result<Vec<JobStub>> {
        let mut stubs = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for url in Self::search_urls(keyword, location) {
            let Some(html) = self.fetch_page(&url).await else {
                warn!(url, "search page unavailable");
                continue;
            };

            for stub in extract_job_stubs(&html) {
                if seen.insert(stub.job_id) {
                    stubs.push(stub);
                }
            }
        }

        debug!(keyword, location, count = stubs.len(), "search complete");
        Ok(stubs)
    }

    async fn fetch_details(&self, job_id: i64, url: &str) -> (Option<String>, Option<String>) {
        let (mut title, mut description) = match self.fetch_page(url).await {
            Some(html) => parse_posting_page(&html),
            None => (None, None),
        };

        if title.is_none() || description.is_none() {
            let (guest_title, guest_description) = self.fetch_guest(job_id).await;
            title = title.or(guest_title);
            description = description.or(guest_description);
        }

        (title, description)
    }
}

/// Pull job stubs out of a search results page.
fn extract_job_stubs(html: &str) -> Vec<JobStub> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").unwrap();

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("/jobs/view/"))
        .filter_map(canonicalize_href)
        .map(|(job_id, url)| JobStub { job_id, url })
        .collect()
}

/// Parse title and description out of a full posting page.
fn parse_posting_page(html: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(html);
    (extract_title(&document), extract_description(&document))
}

fn extract_title(document: &Html) -> Option<String> {
    let selectors = [
        "h1.topcard__title",
        "h1.jobs-unified-top-card__job-title",
        "h1.jobs-details-top-card__job-title",
        "h1",
        "h2.topcard__title",
        "h2.t-24",
        "div.job-title",
        "span.job-title",
    ];

    for selector in selectors {
        let selector = Selector::parse(selector).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let title = element.text().collect::<String>().trim().to_string();
            if !title.is_empty() {
                return Some(title);
            }
        }
    }

    // og:title carries "Job Title - Company | LinkedIn"
    let meta = Selector::parse(r#"meta[property="og:title"]"#).unwrap();
    document
        .select(&meta)
        .next()
        .and_then(|m| m.value().attr("content"))
        .and_then(|content| content.split('|').next())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn extract_description(document: &Html) -> Option<String> {
    // Guest posting pages embed the description in JSON-LD
    let ld_json = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    for script in document.select(&ld_json) {
        let raw = script.text().collect::<String>();
        let Ok(data) = serde_json::from_str::<serde_json::Value>(&raw) else {
            continue;
        };
        if let Some(description) = data.get("description").and_then(|d| d.as_str()) {
            return Some(clean_description(description));
        }
    }

    // Logged-in flavor of the page
    for selector in ["#job-details", "div.jobs-description__content"] {
        let selector = Selector::parse(selector).unwrap();
        if let Some(container) = document.select(&selector).next() {
            return Some(clean_description(&container.inner_html()));
        }
    }

    None
}

/// Parse the guest posting API's HTML fragment.
fn parse_guest_posting(html: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("h2.top-card-layout__title").unwrap();
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let mut description = None;
    for selector in ["div.description__text", "section.show-more-less-html"] {
        let selector = Selector::parse(selector).unwrap();
        if let Some(container) = document.select(&selector).next() {
            description = Some(clean_description(&container.inner_html()));
            break;
        }
    }

    (title, description)
}
