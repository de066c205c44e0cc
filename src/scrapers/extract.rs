//! URL and HTML extraction helpers for job postings.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Matches the numeric job id in a posting path, with or without a
/// slug prefix: /jobs/view/4191603147 or /jobs/view/some-role-4191603147.
static JOB_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/jobs/view/(?:[^/?]*-)?(\d+)(?:[/?]|$)").unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*•\s*").unwrap());
static DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+-\s+").unwrap());

/// Extract the numeric job id from any flavor of posting link.
///
/// Checks the path first, then falls back to the currentJobId/jobId query
/// parameters used by search-result links.
pub fn extract_job_id(raw: &str) -> Option<i64> {
    let parsed = Url::parse(raw).ok()?;

    if let Some(caps) = JOB_ID_RE.captures(parsed.path()) {
        return caps[1].parse().ok();
    }

    for (key, value) in parsed.query_pairs() {
        if (key == "currentJobId" || key == "jobId") && !value.is_empty() {
            if let Ok(id) = value.parse() {
                return Some(id);
            }
        }
    }

    None
}

/// Canonical posting URL for a job id.
pub fn canonical_job_url(job_id: i64) -> String {
    format!("https://www.linkedin.com/jobs/view/{}/", job_id)
}

/// Resolve a raw href from a search results page to (job_id, canonical URL).
pub fn canonicalize_href(href: &str) -> Option<(i64, String)> {
    let full = if href.starts_with('/') {
        format!("https://www.linkedin.com{}", href)
    } else {
        href.to_string()
    };
    let job_id = extract_job_id(&full)?;
    Some((job_id, canonical_job_url(job_id)))
}

/// Normalize an HTML description fragment into readable plain text.
///
/// Strips tags, collapses whitespace, reflows bullet markers onto their own
/// lines, and drops trailing boilerplate sections.
pub fn clean_description(raw_html: &str) -> String {
    let decoded = unescape_entities(raw_html);
    let no_tags = TAG_RE.replace_all(&decoded, "");
    let collapsed = WHITESPACE_RE.replace_all(&no_tags, " ");
    let bullets = BULLET_RE.replace_all(&collapsed, "\n• ");
    let mut cleaned = DASH_RE.replace_all(&bullets, "\n- ").into_owned();

    for marker in ["Pay Range:", "The specific compensation", "Full job description"] {
        if let Some(pos) = find_case_insensitive(&cleaned, marker) {
            cleaned.truncate(pos);
        }
    }

    cleaned.trim().to_string()
}

/// Byte offset of the first case-insensitive occurrence of `needle`,
/// matched in place against the original string so case folds that change
/// byte length (such as U+0130) cannot shift the offset.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .char_indices()
        .map(|(pos, _)| pos)
        .find(|&pos| starts_with_ignore_case(&haystack[pos..], needle))
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut text = text.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|expected| text.next() == Some(expected))
}

/// Decode the HTML entities that show up in posting descriptions.
fn unescape_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
}
