//! End-to-end scan lifecycle against a stub job board and a canned
//! evaluation backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use jobscout::config::{Config, ConfigStore, Settings};
use jobscout::llm::{CompletionBackend, Evaluator, LlmError, Provider};
use jobscout::repository::{run_migrations, AsyncSqlitePool, JobRepository, ScanStateRepository};
use jobscout::scan::{run_scan, ScanContext, ScanController};
use jobscout::scrapers::{JobBoard, JobStub};

struct StubBoard {
    stubs: Vec<JobStub>,
    details: HashMap<i64, (Option<String>, Option<String>)>,
}

#[async_trait]
impl JobBoard for StubBoard {
    async fn search(&self, _keyword: &str, _location: &str) -> anyhow::Result<Vec<JobStub>> {
        Ok(self.stubs.clone())
    }

    async fn fetch_details(&self, job_id: i64, _url: &str) -> (Option<String>, Option<String>) {
        self.details.get(&job_id).cloned().unwrap_or((None, None))
    }
}

/// Approves any description containing the marker word "distributed".
struct KeywordBackend;

#[async_trait]
impl CompletionBackend for KeywordBackend {
    async fn complete(
        &self,
        _provider: Provider,
        _api_key: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        if prompt.contains("distributed") {
            Ok(r#"{"eligible": true, "reasoning": "matches systems background", "missing_requirements": []}"#.to_string())
        } else {
            Ok(r#"{"eligible": false, "reasoning": "wrong stack", "missing_requirements": ["Rust"]}"#.to_string())
        }
    }
}

fn stub(job_id: i64) -> JobStub {
    JobStub {
        job_id,
        url: format!("https://www.linkedin.com/jobs/view/{}/", job_id),
    }
}

struct Fixture {
    ctx: ScanContext,
    jobs: JobRepository,
    controller: Arc<ScanController>,
    _dir: TempDir,
}

async fn fixture(board: StubBoard) -> Fixture {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
    };
    settings.ensure_dirs().unwrap();

    let db_url = settings.db_path().display().to_string();
    run_migrations(&db_url).await.unwrap();

    let mut config = Config::default();
    config.search_parameters.locations = vec!["Remote".to_string()];
    config.search_parameters.keywords = vec!["Rust Engineer".to_string()];
    config.search_parameters.exclusion_keywords = vec!["Senior".to_string()];
    config.api_keys.openai_api_key = "sk-test".to_string();
    config.resume.text = "Systems programmer.".to_string();

    let config_store = ConfigStore::new(&settings);
    config_store.save(&config).unwrap();

    let pool = AsyncSqlitePool::new(&db_url);
    let jobs = JobRepository::new(pool.clone());
    let scan_state = ScanStateRepository::new(pool);

    let ctx = ScanContext {
        jobs: jobs.clone(),
        scan_state: scan_state.clone(),
        config_store: Arc::new(config_store),
        board: Arc::new(board),
        evaluator: Arc::new(Evaluator::with_backend(
            Box::new(KeywordBackend) as Box<dyn CompletionBackend>
        )),
    };
    let controller = Arc::new(ScanController::new(scan_state));

    Fixture {
        ctx,
        jobs,
        controller,
        _dir: dir,
    }
}

#[tokio::test]
async fn scan_discovers_evaluates_and_approves() {
    let board = StubBoard {
        stubs: vec![stub(1), stub(2), stub(3)],
        details: HashMap::from([
            (
                1,
                (
                    Some("Rust Engineer".to_string()),
                    Some("Build distributed storage in Rust.".to_string()),
                ),
            ),
            (
                2,
                (
                    Some("Frontend Developer".to_string()),
                    Some("CSS and design systems work.".to_string()),
                ),
            ),
            (
                3,
                (
                    Some("Senior Rust Engineer".to_string()),
                    Some("Build distributed storage in Rust.".to_string()),
                ),
            ),
        ]),
    };

    let f = fixture(board).await;
    let ctx = f.ctx.clone();
    f.controller
        .start(move |stop| run_scan(ctx, stop))
        .await
        .unwrap();
    assert!(f.controller.wait_for_completion(Duration::from_secs(30)).await);

    assert_eq!(f.jobs.count_discovered().await.unwrap(), 3);

    // Eligible job is enriched, analyzed, and approved with the verdict's reasoning
    let job = f.jobs.get(1).await.unwrap().unwrap();
    assert_eq!(job.title.as_deref(), Some("Rust Engineer"));
    assert!(job.analyzed);
    let detail = f.jobs.approved_detail(1).await.unwrap().unwrap();
    assert_eq!(detail.reason, "matches systems background");

    // Rejected job is analyzed but never approved
    let job = f.jobs.get(2).await.unwrap().unwrap();
    assert!(job.analyzed);
    assert!(f.jobs.approved_detail(2).await.unwrap().is_none());

    // Excluded title is marked analyzed without details or approval
    let job = f.jobs.get(3).await.unwrap().unwrap();
    assert!(job.analyzed);
    assert!(job.title.is_none());
    assert!(f.jobs.approved_detail(3).await.unwrap().is_none());
}

#[tokio::test]
async fn rescan_skips_enriched_jobs_but_picks_up_stubs() {
    let board = StubBoard {
        stubs: vec![stub(10)],
        details: HashMap::from([(
            10,
            (
                Some("Rust Engineer".to_string()),
                Some("Build distributed queues.".to_string()),
            ),
        )]),
    };

    let f = fixture(board).await;

    let ctx = f.ctx.clone();
    f.controller
        .start(move |stop| run_scan(ctx, stop))
        .await
        .unwrap();
    assert!(f.controller.wait_for_completion(Duration::from_secs(30)).await);
    assert_eq!(f.jobs.count_discovered().await.unwrap(), 1);

    // Second run rediscovers the same posting without duplicating it
    let ctx = f.ctx.clone();
    f.controller
        .start(move |stop| run_scan(ctx, stop))
        .await
        .unwrap();
    assert!(f.controller.wait_for_completion(Duration::from_secs(30)).await);

    assert_eq!(f.jobs.count_discovered().await.unwrap(), 1);
    let detail = f.jobs.approved_detail(10).await.unwrap().unwrap();
    assert_eq!(detail.reason, "matches systems background");
}

#[tokio::test]
async fn pre_stopped_scan_discovers_nothing() {
    let board = StubBoard {
        stubs: vec![stub(20)],
        details: HashMap::new(),
    };

    let f = fixture(board).await;

    // A stop persisted by another process is honored at the first search
    f.ctx.scan_state.set_stop_requested(true).await.unwrap();
    run_scan(f.ctx.clone(), jobscout::scan::StopSignal::new()).await;

    assert_eq!(f.jobs.count_discovered().await.unwrap(), 0);
    // Acknowledged stop resets the persisted flag
    assert!(!f.ctx.scan_state.stop_requested().await.unwrap());
}
