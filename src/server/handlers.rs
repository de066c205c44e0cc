//! JSON API handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::{Config, Preset, PresetSummary};
use crate::models::{ApprovedJobDetail, DiscoveredJob, ScanStateView, ScanStatus};
use crate::scan::{run_scan, ScanError};

use super::AppState;

/// Uniform response shape for mutating endpoints.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }

    fn fail(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            message: message.into(),
        })
    }
}

fn internal<E: std::fmt::Display>(err: E) -> StatusCode {
    error!(error = %err, "request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

pub async fn scan_start(State(state): State<AppState>) -> Json<ActionResponse> {
    let ctx = state.scan_context();
    match state
        .controller
        .start(move |stop| run_scan(ctx, stop))
        .await
    {
        Ok(()) => ActionResponse::ok("Scan started"),
        Err(ScanError::AlreadyRunning) => ActionResponse::fail("Scan is already running"),
        Err(err) => ActionResponse::fail(err.to_string()),
    }
}

pub async fn scan_stop(State(state): State<AppState>) -> Json<ActionResponse> {
    match state.controller.stop().await {
        Ok(()) => ActionResponse::ok("Stop requested; scan will finish its current step"),
        Err(ScanError::NotRunning) => ActionResponse::fail("No scan is currently running"),
        Err(err) => ActionResponse::fail(err.to_string()),
    }
}

pub async fn scan_status(State(state): State<AppState>) -> Json<ScanStatus> {
    Json(state.controller.status().await)
}

/// Persisted view: last-written control flags plus database counters.
pub async fn scan_state(State(state): State<AppState>) -> Result<Json<ScanStateView>, StatusCode> {
    let (stop_requested, is_active) = state.scan_state.flags().await.map_err(internal)?;
    let (total_discovered, total_approved, total_applied, total_analyzed) =
        state.jobs.scan_counters().await.map_err(internal)?;

    Ok(Json(ScanStateView {
        is_active,
        should_stop: stop_requested,
        total_discovered,
        total_approved,
        total_applied,
        total_analyzed,
    }))
}

pub async fn list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApprovedJobDetail>>, StatusCode> {
    let jobs = state.jobs.active_approved().await.map_err(internal)?;
    Ok(Json(jobs))
}

pub async fn job_detail(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<ApprovedJobDetail>, StatusCode> {
    state
        .jobs
        .approved_detail(job_id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn apply_job(
    State(state): State<AppState>,
    Path(approved_id): Path<i32>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let marked = state.jobs.mark_applied(approved_id).await.map_err(internal)?;
    Ok(if marked {
        ActionResponse::ok("Marked as applied")
    } else {
        ActionResponse::fail("Job not found or already applied")
    })
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(approved_id): Path<i32>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let deleted = state
        .jobs
        .delete_approved(approved_id)
        .await
        .map_err(internal)?;
    Ok(if deleted {
        ActionResponse::ok("Job removed from approved list")
    } else {
        ActionResponse::fail("Job not found")
    })
}

pub async fn archive_applied(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let archived = state.jobs.archive_all_applied().await.map_err(internal)?;
    Ok(ActionResponse::ok(format!("Archived {} applied jobs", archived)))
}

pub async fn clear_approved(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let cleared = state.jobs.clear_all_approved().await.map_err(internal)?;
    Ok(ActionResponse::ok(format!("Cleared {} approved jobs", cleared)))
}

pub async fn clear_discovered(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let cleared = state.jobs.clear_all_discovered().await.map_err(internal)?;
    Ok(ActionResponse::ok(format!(
        "Cleared {} discovered jobs",
        cleared
    )))
}

pub async fn statistics(
    State(state): State<AppState>,
) -> Result<Json<crate::models::JobStatistics>, StatusCode> {
    let stats = state.jobs.statistics().await.map_err(internal)?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub discovered: Vec<DiscoveredJob>,
    pub approved: Vec<ApprovedJobDetail>,
}

pub async fn activity(State(state): State<AppState>) -> Result<Json<ActivityResponse>, StatusCode> {
    let discovered = state.jobs.recent_discovered(50).await.map_err(internal)?;
    let approved = state.jobs.recent_approved(20).await.map_err(internal)?;
    Ok(Json(ActivityResponse {
        discovered,
        approved,
    }))
}

pub async fn get_config(State(state): State<AppState>) -> Result<Json<Config>, StatusCode> {
    let config = state.config_store.load().map_err(internal)?;
    Ok(Json(config))
}

/// Replace the active config. The body must carry the required sections;
/// anything else is rejected before touching disk.
pub async fn save_config(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ActionResponse>, StatusCode> {
    for section in ["search_parameters", "api_keys", "general"] {
        if body.get(section).is_none() {
            return Ok(ActionResponse::fail(format!(
                "Missing required section: {}",
                section
            )));
        }
    }

    let config: Config = match serde_json::from_value(body) {
        Ok(config) => config,
        Err(err) => return Ok(ActionResponse::fail(format!("Invalid config: {}", err))),
    };

    state.config_store.save(&config).map_err(internal)?;
    Ok(ActionResponse::ok("Configuration saved"))
}

pub async fn list_presets(State(state): State<AppState>) -> Json<Vec<PresetSummary>> {
    Json(state.config_store.list_presets())
}

#[derive(Debug, Deserialize)]
pub struct SavePresetRequest {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Snapshot the active config under a preset name.
pub async fn save_preset(
    State(state): State<AppState>,
    Json(body): Json<SavePresetRequest>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let config = state.config_store.load().map_err(internal)?;
    let saved = state
        .config_store
        .save_preset(
            &body.name,
            &config,
            body.display_name.as_deref(),
            &body.description,
        )
        .map_err(internal)?;

    Ok(if saved {
        ActionResponse::ok(format!("Preset '{}' saved", body.name))
    } else {
        ActionResponse::fail("Invalid preset name")
    })
}

pub async fn delete_all_presets(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let deleted = state.config_store.delete_all_presets().map_err(internal)?;
    Ok(ActionResponse::ok(format!("Deleted {} presets", deleted)))
}

pub async fn create_default_presets(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let created = state
        .config_store
        .create_default_presets()
        .map_err(internal)?;
    Ok(ActionResponse::ok(format!(
        "Created {} default presets",
        created
    )))
}

pub async fn get_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Preset>, StatusCode> {
    state
        .config_store
        .load_preset(&name)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn apply_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let applied = state.config_store.apply_preset(&name).map_err(internal)?;
    Ok(if applied {
        ActionResponse::ok(format!("Preset '{}' applied", name))
    } else {
        ActionResponse::fail("Preset not found")
    })
}

pub async fn delete_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let deleted = state.config_store.delete_preset(&name).map_err(internal)?;
    Ok(if deleted {
        ActionResponse::ok(format!("Preset '{}' deleted", name))
    } else {
        ActionResponse::fail("Preset not found")
    })
}
