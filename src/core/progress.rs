//! Persisted lesson progress
//!
//! Progress lives in a small JSON file owned by the application, with one
//! record per course keyed by the canonical course root. Records only refer
//! to lessons by id, so they survive catalog reloads and tolerate ids of
//! lessons that no longer exist. Loading never fails: a missing file is
//! "no progress yet" and a corrupt one is logged and ignored.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::catalog::{CourseCatalog, LessonId, Module};
use super::error::{CourseError, Result};

/// Current progress file schema
pub const SCHEMA_VERSION: u32 = 2;

/// Progress of a single lesson
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    #[serde(default)]
    pub completed: bool,
    /// Unix seconds of the last time the lesson was opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed_at: Option<u64>,
}

/// Completion state of every lesson of one course plus its resume pointer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub lessons: BTreeMap<LessonId, LessonProgress>,
    #[serde(default)]
    pub last_viewed_lesson_id: Option<LessonId>,
}

/// Everything stored in the progress file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressFile {
    pub schema_version: u32,
    /// Per-course records keyed by canonical course root
    #[serde(default)]
    pub courses: BTreeMap<String, ProgressRecord>,
    /// Record from a single-course file, handed to the first course opened
    #[serde(skip)]
    unclaimed: Option<ProgressRecord>,
}

impl Default for ProgressFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            courses: BTreeMap::new(),
            unclaimed: None,
        }
    }
}

/// Unversioned (schema 0) progress file written by earlier releases
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyProgress {
    #[serde(default)]
    completed_lessons: Vec<LessonId>,
    #[serde(default)]
    last_lesson: Option<LessonId>,
}

impl From<LegacyProgress> for ProgressRecord {
    fn from(legacy: LegacyProgress) -> Self {
        let lessons = legacy
            .completed_lessons
            .into_iter()
            .map(|id| {
                (
                    id,
                    LessonProgress {
                        completed: true,
                        last_viewed_at: None,
                    },
                )
            })
            .collect();

        Self {
            lessons,
            last_viewed_lesson_id: legacy.last_lesson,
        }
    }
}

impl ProgressFile {
    /// Parse a progress file, migrating older schemas
    ///
    /// Schema 0 (`completedLessons`/`lastLesson`) and schema 1 (a single
    /// course record) do not say which course they belong to; their record
    /// is claimed by the next course opened.
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;

        let unclaimed = match value.get("schemaVersion").and_then(|v| v.as_u64()) {
            Some(v) if v == u64::from(SCHEMA_VERSION) => return Ok(serde_json::from_value(value)?),
            None | Some(0) => {
                let legacy: LegacyProgress = serde_json::from_value(value)?;
                ProgressRecord::from(legacy)
            }
            Some(1) => serde_json::from_value::<ProgressRecord>(value)?,
            Some(v) => {
                return Err(CourseError::Json(serde::de::Error::custom(format!(
                    "unsupported progress schema version {v}"
                ))))
            }
        };

        tracing::info!("Migrating progress file to schema {}", SCHEMA_VERSION);
        Ok(Self {
            unclaimed: Some(unclaimed),
            ..Self::default()
        })
    }

    /// Take the record of a course, adopting a migrated record if it has none
    pub fn claim(&mut self, course: &str) -> ProgressRecord {
        if let Some(record) = self.unclaimed.take() {
            if !self.courses.contains_key(course) {
                tracing::info!("Assigning migrated progress to course {}", course);
                return record;
            }
        }
        self.courses.get(course).cloned().unwrap_or_default()
    }
}

impl ProgressRecord {
    pub fn is_completed(&self, id: &LessonId) -> bool {
        self.lessons.get(id).is_some_and(|p| p.completed)
    }

    /// Set completed for a lesson; returns whether anything changed
    pub fn set_completed(&mut self, id: &LessonId, completed: bool) -> bool {
        let entry = self.lessons.entry(id.clone()).or_default();
        let changed = entry.completed != completed;
        entry.completed = completed;
        changed
    }

    /// Record a lesson as the one to resume from
    pub fn set_last_viewed(&mut self, id: &LessonId, at: u64) {
        self.lessons.entry(id.clone()).or_default().last_viewed_at = Some(at);
        self.last_viewed_lesson_id = Some(id.clone());
    }

    /// Completed lessons that are part of the catalog
    pub fn completed_count(&self, catalog: &CourseCatalog) -> usize {
        catalog.lessons().filter(|l| self.is_completed(&l.id)).count()
    }

    /// Fraction of catalog lessons completed, 0.0 for an empty catalog
    pub fn completion_ratio(&self, catalog: &CourseCatalog) -> f64 {
        ratio(self.completed_count(catalog), catalog.lesson_count())
    }

    /// Fraction of a module's lessons completed
    pub fn module_ratio(&self, module: &Module) -> f64 {
        let done = module
            .lessons
            .iter()
            .filter(|l| self.is_completed(&l.id))
            .count();
        ratio(done, module.lessons.len())
    }

    /// Ids that no longer exist in the catalog
    pub fn stale_ids<'a>(&'a self, catalog: &'a CourseCatalog) -> impl Iterator<Item = &'a LessonId> {
        self.lessons.keys().filter(|id| !catalog.contains(id))
    }
}

fn ratio(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64
    }
}

/// Read a progress file; missing or unreadable files yield an empty one
pub fn load(path: &Path) -> ProgressFile {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No progress file at {}, starting fresh", path.display());
            return ProgressFile::default();
        }
        Err(e) => {
            tracing::warn!("Failed to read progress file {}: {}", path.display(), e);
            return ProgressFile::default();
        }
    };

    match ProgressFile::parse(&content) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Ignoring corrupt progress file {}: {}", path.display(), e);
            ProgressFile::default()
        }
    }
}

/// Write a progress file atomically: temp file in the same directory, then rename
pub fn save(file: &ProgressFile, path: &Path) -> Result<()> {
    let persistence = |source: std::io::Error| CourseError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persistence)?;
    }

    let content = serde_json::to_string_pretty(file)?;
    let tmp = temp_path(path);

    let written = fs::File::create(&tmp).and_then(|mut out| {
        out.write_all(content.as_bytes())?;
        out.write_all(b"\n")?;
        out.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(persistence(e));
    }

    tracing::debug!("Saved progress to {}", path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "progress.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Whether the last mutation reached disk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PersistenceStatus {
    #[default]
    Saved,
    /// The last save failed; progress is kept in memory only
    Unsaved(String),
}

/// In-memory progress of one course, mirrored to the shared file after every mutation
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    course: String,
    file: ProgressFile,
    record: ProgressRecord,
    status: PersistenceStatus,
}

impl ProgressStore {
    /// Load the progress of `course` from `path`, falling back to an empty record
    pub fn open(path: impl Into<PathBuf>, course: impl Into<String>) -> Self {
        let path = path.into();
        let course = course.into();
        let mut file = load(&path);
        let record = file.claim(&course);
        Self {
            path,
            course,
            file,
            record,
            status: PersistenceStatus::Saved,
        }
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn status(&self) -> &PersistenceStatus {
        &self.status
    }

    pub fn is_completed(&self, id: &LessonId) -> bool {
        self.record.is_completed(id)
    }

    pub fn last_viewed(&self) -> Option<&LessonId> {
        self.record.last_viewed_lesson_id.as_ref()
    }

    /// Mark a lesson complete; marking twice is a no-op
    pub fn mark_complete(&mut self, id: &LessonId) {
        if self.record.set_completed(id, true) {
            tracing::info!("Completed lesson {}", id);
            self.flush();
        }
    }

    pub fn mark_incomplete(&mut self, id: &LessonId) {
        if self.record.set_completed(id, false) {
            self.flush();
        }
    }

    /// Update the resume pointer
    pub fn set_last_viewed(&mut self, id: &LessonId) {
        self.record.set_last_viewed(id, unix_now());
        self.flush();
    }

    /// Forget all progress of this course
    pub fn reset(&mut self) {
        self.record = ProgressRecord::default();
        tracing::info!("Progress reset for {}", self.course);
        self.flush();
    }

    pub fn completion_ratio(&self, catalog: &CourseCatalog) -> f64 {
        self.record.completion_ratio(catalog)
    }

    /// Persist the current record, keeping it in memory if the write fails
    pub fn flush(&mut self) {
        self.file
            .courses
            .insert(self.course.clone(), self.record.clone());
        self.status = match save(&self.file, &self.path) {
            Ok(()) => PersistenceStatus::Saved,
            Err(e) => {
                tracing::error!("{}", e);
                PersistenceStatus::Unsaved(e.to_string())
            }
        };
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
