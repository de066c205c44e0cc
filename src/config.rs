//! Configuration management: TOML config file plus JSON presets.
//!
//! The config lives in the data directory alongside the database. A missing
//! or unreadable file is repaired by writing the built-in defaults back out,
//! so the rest of the system can always assume a loadable config.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Placeholder value meaning "no OpenAI key configured".
pub const OPENAI_KEY_PLACEHOLDER: &str = "YOUR_OPENAI_API_KEY_HERE";

/// Placeholder value meaning "no Google key configured".
pub const GOOGLE_KEY_PLACEHOLDER: &str = "YOUR_GOOGLE_API_KEY_HERE";

const DEFAULT_EVALUATION_PROMPT: &str = r#"Please evaluate this job posting based on the following criteria:

MUST-HAVE Criteria (job must meet ALL of these):
- Must NOT require any security clearance
- Must be a full-time position

FLEXIBLE Criteria (job should ideally meet these, but can be flexible):
- Technical requirements can be offset by certifications, education, or demonstrated learning ability
- Tool-specific experience can often be learned on the job

Do NOT reject the job solely for:
- Asking for 1-2 years of experience
- Requiring specific tools experience
- Listing certifications as requirements (unless explicitly marked as "must have before starting")"#;

const ENTRY_LEVEL_EVALUATION_PROMPT: &str = r#"Please evaluate this job posting for an entry-level candidate based on these criteria:

MUST-HAVE Criteria (job must meet ALL of these):
- Must NOT require any security clearance
- Must be a full-time position
- Should be entry-level, junior, or accept new graduates
- Must not require more than 2 years of experience

FLEXIBLE Criteria (job should ideally meet these, but can be flexible):
- Technical requirements can be learned on the job
- Specific technology experience is preferred but not mandatory
- Certifications are nice-to-have, not requirements

STRONGLY PREFER jobs that:
- Mention training, mentorship, or onboarding programs
- Are open to new graduates or career changers
- Focus on learning and growth opportunities"#;

/// Search parameters driving the scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParameters {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub exclusion_keywords: Vec<String>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            locations: vec!["Remote".to_string()],
            keywords: vec![
                "Software Engineer".to_string(),
                "Python Developer".to_string(),
            ],
            exclusion_keywords: vec![
                "Senior".to_string(),
                "Sr.".to_string(),
                "Lead".to_string(),
                "Manager".to_string(),
            ],
        }
    }
}

/// Candidate resume text used in evaluation prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeConfig {
    #[serde(default)]
    pub text: String,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            text: "Your resume text here. Paste your full resume or a summary.".to_string(),
        }
    }
}

/// Operator-supplied evaluation criteria appended to the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    #[serde(default)]
    pub evaluation_prompt: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            evaluation_prompt: DEFAULT_EVALUATION_PROMPT.to_string(),
        }
    }
}

/// API keys for the evaluation providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default = "default_openai_key")]
    pub openai_api_key: String,
    #[serde(default = "default_google_key")]
    pub google_api_key: String,
}

fn default_openai_key() -> String {
    OPENAI_KEY_PLACEHOLDER.to_string()
}

fn default_google_key() -> String {
    GOOGLE_KEY_PLACEHOLDER.to_string()
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            openai_api_key: default_openai_key(),
            google_api_key: default_google_key(),
        }
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Evaluation provider: "openai" or "gemini" (case-insensitive).
    #[serde(default = "default_provider")]
    pub ai_provider: String,
}

fn default_provider() -> String {
    "openai".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            ai_provider: default_provider(),
        }
    }
}

/// Full operator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search_parameters: SearchParameters,
    #[serde(default)]
    pub resume: ResumeConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub api_keys: ApiKeys,
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Resolved filesystem layout for a jobscout installation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from an optional explicit data directory.
    ///
    /// Falls back to `~/.local/share/jobscout` (or the platform equivalent).
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("jobscout")
        });
        Self { data_dir }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("jobscout.db")
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.data_dir.join("presets")
    }

    /// Ensure the data directory (and presets subdirectory) exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.presets_dir())
    }
}

/// Metadata stored alongside a preset's config snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetMetadata {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub version: String,
}

/// A named, saved configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub metadata: PresetMetadata,
    pub config: Config,
}

/// Summary entry for preset listings.
#[derive(Debug, Clone, Serialize)]
pub struct PresetSummary {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub created_at: String,
    pub last_modified: String,
}

/// Loads and saves the active config and its presets.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    presets_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            config_path: settings.config_path(),
            presets_dir: settings.presets_dir(),
        }
    }

    /// Load the active config, writing defaults if the file is missing,
    /// unreadable, or missing the search_parameters section.
    pub fn load(&self) -> anyhow::Result<Config> {
        if !self.config_path.exists() {
            let config = Config::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.config_path)?;
        match toml::from_str::<toml::Value>(&raw) {
            Ok(value) if value.get("search_parameters").is_some() => {
                Ok(value.try_into::<Config>()?)
            }
            Ok(_) | Err(_) => {
                warn!(
                    path = %self.config_path.display(),
                    "config was empty, malformed, or incomplete; rewriting defaults"
                );
                let config = Config::default();
                self.save(&config)?;
                Ok(config)
            }
        }
    }

    /// Save the active config.
    pub fn save(&self, config: &Config) -> anyhow::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config_path, toml::to_string_pretty(config)?)?;
        Ok(())
    }

    /// List available presets, sorted by display name.
    pub fn list_presets(&self) -> Vec<PresetSummary> {
        let mut presets = Vec::new();
        let entries = match fs::read_dir(&self.presets_dir) {
            Ok(entries) => entries,
            Err(_) => return presets,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(preset) = self.load_preset(name) {
                presets.push(PresetSummary {
                    name: name.to_string(),
                    display_name: preset.metadata.display_name,
                    description: preset.metadata.description,
                    created_at: preset.metadata.created_at,
                    last_modified: preset.metadata.last_modified,
                });
            }
        }

        presets.sort_by_key(|p| p.display_name.to_lowercase());
        presets
    }

    /// Save a config snapshot as a named preset. Returns false when the name
    /// sanitizes to nothing.
    pub fn save_preset(
        &self,
        name: &str,
        config: &Config,
        display_name: Option<&str>,
        description: &str,
    ) -> anyhow::Result<bool> {
        let safe_name = sanitize_preset_name(name);
        if safe_name.is_empty() {
            return Ok(false);
        }

        let now = Utc::now().to_rfc3339();
        let preset = Preset {
            metadata: PresetMetadata {
                display_name: display_name.unwrap_or(name).to_string(),
                description: description.to_string(),
                created_at: now.clone(),
                last_modified: now,
                version: "1.0".to_string(),
            },
            config: config.clone(),
        };

        fs::create_dir_all(&self.presets_dir)?;
        let path = self.preset_path(&safe_name);
        fs::write(&path, serde_json::to_string_pretty(&preset)?)?;
        Ok(true)
    }

    /// Load a named preset, if it exists and parses.
    pub fn load_preset(&self, name: &str) -> Option<Preset> {
        let path = self.preset_path(name);
        let raw = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(preset) => Some(preset),
            Err(err) => {
                warn!(preset = name, error = %err, "failed to parse preset");
                None
            }
        }
    }

    /// Apply a preset as the active config. Returns false when absent.
    pub fn apply_preset(&self, name: &str) -> anyhow::Result<bool> {
        match self.load_preset(name) {
            Some(preset) => {
                self.save(&preset.config)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete every preset, returning the count removed.
    pub fn delete_all_presets(&self) -> anyhow::Result<u64> {
        let mut deleted = 0;
        for preset in self.list_presets() {
            if self.delete_preset(&preset.name)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Seed the shipped starter presets, skipping names that already exist
    /// so operator edits survive. Returns the number created.
    pub fn create_default_presets(&self) -> anyhow::Result<u64> {
        let mut created = 0;
        for (name, display_name, description, config) in starter_presets() {
            if self.load_preset(name).is_none()
                && self.save_preset(name, &config, Some(display_name), description)?
            {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Delete a named preset. Returns false when absent.
    pub fn delete_preset(&self, name: &str) -> anyhow::Result<bool> {
        let path = self.preset_path(name);
        if path.exists() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn preset_path(&self, name: &str) -> PathBuf {
        self.presets_dir.join(format!("{}.json", name))
    }
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The starter presets seeded by create_default_presets.
fn starter_presets() -> Vec<(&'static str, &'static str, &'static str, Config)> {
    let mut remote_python = Config::default();
    remote_python.search_parameters = SearchParameters {
        locations: string_vec(&["Remote"]),
        keywords: string_vec(&["Python Developer", "Backend Developer", "Full Stack Python"]),
        exclusion_keywords: string_vec(&["Senior", "Sr.", "Lead", "Manager", "Director"]),
    };

    let mut entry_level = Config::default();
    entry_level.search_parameters = SearchParameters {
        locations: string_vec(&["Remote", "San Francisco Bay Area", "New York", "Seattle"]),
        keywords: string_vec(&[
            "Software Engineer",
            "Junior Developer",
            "Associate Software Engineer",
            "Graduate Software Engineer",
        ]),
        exclusion_keywords: string_vec(&[
            "Senior", "Sr.", "Lead", "Manager", "Director", "Principal", "Staff",
        ]),
    };
    entry_level.prompts.evaluation_prompt = ENTRY_LEVEL_EVALUATION_PROMPT.to_string();

    let mut fullstack = Config::default();
    fullstack.search_parameters = SearchParameters {
        locations: string_vec(&["Remote", "San Francisco Bay Area", "Austin", "Denver"]),
        keywords: string_vec(&[
            "Full Stack Developer",
            "Web Developer",
            "Frontend Developer",
            "Backend Developer",
        ]),
        exclusion_keywords: string_vec(&[
            "Senior", "Sr.", "Lead", "Manager", "Director", "Mobile", "iOS", "Android",
        ]),
    };

    vec![
        (
            "remote_python",
            "Remote Python Developer",
            "Configuration for remote Python developer positions",
            remote_python,
        ),
        (
            "entry_level_software",
            "Entry Level Software Engineer",
            "Configuration for entry-level software engineering roles",
            entry_level,
        ),
        (
            "fullstack_web",
            "Full Stack Web Developer",
            "Configuration for full-stack web development positions",
            fullstack,
        ),
    ]
}

/// Restrict a preset name to filesystem-safe characters.
fn sanitize_preset_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim_end()
        .to_string()
}
