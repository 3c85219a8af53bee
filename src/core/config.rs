//! Application configuration management

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Maximum number of remembered course roots
const MAX_RECENT_COURSES: usize = 10;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Course root opened on startup
    pub course_root: Option<PathBuf>,
    /// Recently opened course roots, newest first
    pub recent_courses: Vec<PathBuf>,
    /// Progress file location (defaults to the data directory)
    pub progress_file: Option<PathBuf>,
    /// Directory offered when exporting lessons to HTML
    pub export_dir: Option<PathBuf>,
    /// UI settings
    pub ui: UiConfig,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Sidebar width
    pub sidebar_width: f32,
    /// Base font size for lesson text
    pub font_size: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            sidebar_width: 280.0,
            font_size: 15.0,
        }
    }
}

impl AppConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "courseview", "Courseview")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Remember a course root as the current and most recent one
    pub fn set_course(&mut self, path: PathBuf) {
        self.recent_courses.retain(|p| p != &path);
        self.recent_courses.insert(0, path.clone());
        self.recent_courses.truncate(MAX_RECENT_COURSES);
        self.course_root = Some(path);
    }

    /// Where progress is persisted
    pub fn progress_path(&self) -> PathBuf {
        self.progress_file.clone().unwrap_or_else(|| {
            Self::project_dirs()
                .map(|dirs| dirs.data_dir().join("progress.json"))
                .unwrap_or_else(|| PathBuf::from("progress.json"))
        })
    }

    pub fn is_dark(&self) -> bool {
        self.ui.theme != "light"
    }
}
