//! Optional `course.json` manifest defining module order and titles

use std::collections::HashSet;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use super::error::{CourseError, Result};

/// File name of the manifest inside the course root
pub const MANIFEST_FILE: &str = "course.json";

/// Explicit course manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseManifest {
    /// Course title shown in the window header
    #[serde(default)]
    pub title: Option<String>,
    /// Modules in teaching order
    pub modules: Vec<ManifestModule>,
}

/// A module entry in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestModule {
    /// Module directory name
    pub id: String,
    /// Display title (derived from the id when absent)
    #[serde(default)]
    pub title: Option<String>,
}

impl CourseManifest {
    /// Read the manifest from a course root, if one exists
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| CourseError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let manifest = Self::parse(&content).map_err(|message| CourseError::Manifest {
            path: path.clone(),
            message,
        })?;

        tracing::debug!(
            "Loaded manifest {} with {} modules",
            path.display(),
            manifest.modules.len()
        );
        Ok(Some(manifest))
    }

    /// Parse and validate manifest JSON
    fn parse(content: &str) -> std::result::Result<Self, String> {
        let manifest: Self = serde_json::from_str(content).map_err(|e| e.to_string())?;

        if manifest.modules.is_empty() {
            return Err("manifest lists no modules".to_string());
        }

        let mut seen = HashSet::new();
        for module in &manifest.modules {
            if !is_plain_name(&module.id) {
                return Err(format!(
                    "module id {:?} must be a single directory name",
                    module.id
                ));
            }
            if !seen.insert(module.id.as_str()) {
                return Err(format!("module id {:?} is listed twice", module.id));
            }
        }

        Ok(manifest)
    }
}

/// A single normal path component that is not hidden
pub(crate) fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.starts_with('.')
}
