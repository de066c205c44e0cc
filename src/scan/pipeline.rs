//! The scan pipeline: discover postings, enrich them, evaluate them.
//!
//! Every external failure is logged and skipped; one broken posting or a
//! flaky upstream never aborts the run. The pipeline polls the stop signal
//! between searches and between postings, and also honors a stop request
//! persisted by a previous process, resetting that flag once acknowledged.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigStore};
use crate::llm::{prompt::contains_exclusions, CompletionBackend, Evaluator};
use crate::repository::{JobRepository, ScanStateRepository};
use crate::scan::StopSignal;
use crate::scrapers::{JobBoard, JobStub};

/// Everything a scan run needs, bundled so the controller's task factory
/// stays a one-liner.
#[derive(Clone)]
pub struct ScanContext {
    pub jobs: JobRepository,
    pub scan_state: ScanStateRepository,
    pub config_store: Arc<ConfigStore>,
    pub board: Arc<dyn JobBoard>,
    pub evaluator: Arc<Evaluator<Box<dyn CompletionBackend>>>,
}

/// One keyword/location search permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub keyword: String,
    pub location: String,
}

/// Build the randomized search permutations for this run. Shuffling spreads
/// load across searches so repeated partial runs do not always favor the
/// same keywords.
pub fn build_searches(config: &Config) -> Vec<SearchSpec> {
    let params = &config.search_parameters;
    if params.locations.is_empty() || params.keywords.is_empty() {
        warn!("no search parameters configured");
        return Vec::new();
    }

    let mut rng = rand::thread_rng();
    let mut locations = params.locations.clone();
    locations.shuffle(&mut rng);

    let mut searches = Vec::new();
    for location in locations {
        let mut keywords = params.keywords.clone();
        keywords.shuffle(&mut rng);
        for keyword in keywords {
            searches.push(SearchSpec {
                keyword,
                location: location.clone(),
            });
        }
    }
    searches
}

/// Run one complete scan. Never returns an error; failures are logged and
/// the run carries on with whatever remains.
pub async fn run_scan(ctx: ScanContext, stop: StopSignal) {
    // Config reloads fresh each run so edits apply without a restart
    let config = match ctx.config_store.load() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "cannot load config, aborting scan");
            return;
        }
    };

    let searches = build_searches(&config);
    if searches.is_empty() {
        return;
    }

    let start_count = ctx.jobs.count_discovered().await.unwrap_or(0);
    let total = searches.len();
    info!(searches = total, "scan started");

    let mut links_examined = 0usize;
    for (index, search) in searches.iter().enumerate() {
        if should_stop(&ctx, &stop).await {
            info!("stop requested, ending scan early");
            break;
        }

        links_examined += process_search(&ctx, &config, search, &stop).await;
        info!(
            search = index + 1,
            total,
            keyword = %search.keyword,
            location = %search.location,
            "search finished"
        );
    }

    let end_count = ctx.jobs.count_discovered().await.unwrap_or(start_count);
    info!(
        links_examined,
        new_jobs = end_count.saturating_sub(start_count),
        total_discovered = end_count,
        "scan complete"
    );
}

/// Combined in-memory and persisted stop check. A persisted request is
/// reset once acknowledged so it cannot cancel the next run.
async fn should_stop(ctx: &ScanContext, stop: &StopSignal) -> bool {
    if stop.is_stop_requested() {
        return true;
    }
    match ctx.scan_state.stop_requested().await {
        Ok(true) => {
            if let Err(err) = ctx.scan_state.set_stop_requested(false).await {
                warn!(error = %err, "failed to reset persisted stop flag");
            }
            true
        }
        Ok(false) => false,
        Err(err) => {
            warn!(error = %err, "failed to read persisted stop flag");
            false
        }
    }
}

/// Run one search permutation: discover stubs, then enrich and evaluate
/// the ones that are new or still missing details. Returns the number of
/// posting links examined.
async fn process_search(
    ctx: &ScanContext,
    config: &Config,
    search: &SearchSpec,
    stop: &StopSignal,
) -> usize {
    let stubs = match ctx.board.search(&search.keyword, &search.location).await {
        Ok(stubs) => stubs,
        Err(err) => {
            warn!(
                keyword = %search.keyword,
                location = %search.location,
                error = %err,
                "search failed"
            );
            return 0;
        }
    };
    let examined = stubs.len();

    let mut needs_details = Vec::new();
    for stub in stubs {
        if stop.is_stop_requested() {
            return examined;
        }

        let is_new = match ctx
            .jobs
            .insert_stub(stub.job_id, &stub.url, &search.location, &search.keyword)
            .await
        {
            Ok(is_new) => is_new,
            Err(err) => {
                warn!(job_id = stub.job_id, error = %err, "failed to record job");
                continue;
            }
        };

        let missing = !is_new
            && ctx
                .jobs
                .is_missing_details(stub.job_id)
                .await
                .unwrap_or(false);
        if is_new || missing {
            needs_details.push(stub);
        }
    }

    for stub in needs_details {
        if stop.is_stop_requested() {
            break;
        }
        if let Err(err) = process_job(ctx, config, &stub, stop).await {
            warn!(job_id = stub.job_id, error = %err, "failed to process job");
        }
    }

    examined
}

/// Enrich and evaluate one posting.
///
/// Excluded titles are marked analyzed without an evaluation call. The job
/// is marked analyzed after any evaluation attempt, successful or not, so
/// a rejected or unparseable verdict is not retried every run.
async fn process_job(
    ctx: &ScanContext,
    config: &Config,
    stub: &JobStub,
    stop: &StopSignal,
) -> anyhow::Result<()> {
    let (title, description) = ctx.board.fetch_details(stub.job_id, &stub.url).await;

    if stop.is_stop_requested() {
        return Ok(());
    }

    if let Some(title) = &title {
        if contains_exclusions(title, &config.search_parameters.exclusion_keywords) {
            info!(job_id = stub.job_id, title = %title, "excluded by title");
            ctx.jobs.mark_analyzed(stub.job_id).await?;
            return Ok(());
        }
    }

    if title.is_some() || description.is_some() {
        ctx.jobs
            .update_details(stub.job_id, title.as_deref(), description.as_deref())
            .await?;
    }

    if stop.is_stop_requested() {
        return Ok(());
    }

    let Some(description) = description.filter(|d| !d.trim().is_empty()) else {
        return Ok(());
    };

    match ctx.evaluator.evaluate(&description, config).await {
        Ok(verdict) => {
            if verdict.eligible {
                let reason = if verdict.reasoning.is_empty() {
                    "No reasoning provided.".to_string()
                } else {
                    verdict.reasoning
                };
                if ctx.jobs.approve(stub.job_id, &reason).await? {
                    info!(
                        job_id = stub.job_id,
                        title = title.as_deref().unwrap_or("(unknown)"),
                        "job approved"
                    );
                }
            }
        }
        Err(err) => {
            error!(job_id = stub.job_id, error = %err, "evaluation failed");
        }
    }

    ctx.jobs.mark_analyzed(stub.job_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searches_cover_every_permutation() {
        let mut config = Config::default();
        config.search_parameters.locations = vec!["Remote".into(), "Berlin".into()];
        config.search_parameters.keywords = vec!["Rust".into(), "Go".into(), "C++".into()];

        let searches = build_searches(&config);
        assert_eq!(searches.len(), 6);
        for location in ["Remote", "Berlin"] {
            for keyword in ["Rust", "Go", "C++"] {
                assert!(searches
                    .iter()
                    .any(|s| s.location == location && s.keyword == keyword));
            }
        }
    }

    #[test]
    fn empty_parameters_yield_no_searches() {
        let mut config = Config::default();
        config.search_parameters.keywords.clear();
        assert!(build_searches(&config).is_empty());
    }
}
