//! Course catalog: modules, lessons and the builder that scans a course root

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::error::{CourseError, Result};
use super::manifest::{is_plain_name, CourseManifest};

/// Unique lesson identifier, `<module-id>/<lesson-stem>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(String);

impl LessonId {
    /// Build the id of a lesson file inside a module
    pub fn new(module_id: &str, stem: &str) -> Self {
        Self(format!("{module_id}/{stem}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Module part of the id
    pub fn module_id(&self) -> &str {
        self.0.split_once('/').map(|(m, _)| m).unwrap_or(&self.0)
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LessonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LessonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single lesson backed by one markdown file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    /// Path relative to the course root
    pub path: PathBuf,
    /// Index of the owning module in the catalog
    pub module_index: usize,
    /// Index within the owning module
    pub index: usize,
}

/// An ordered group of lessons, one course subdirectory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub lessons: Vec<Lesson>,
}

/// Immutable, ordered view of every module and lesson in a course
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    root: PathBuf,
    title: Option<String>,
    modules: Vec<Module>,
    /// Global order as (module index, lesson index)
    order: Vec<(usize, usize)>,
    positions: HashMap<LessonId, usize>,
}

impl CourseCatalog {
    /// Assemble a catalog from already ordered modules
    pub fn from_modules(root: PathBuf, title: Option<String>, mut modules: Vec<Module>) -> Result<Self> {
        let mut order = Vec::new();
        let mut positions = HashMap::new();

        for (module_index, module) in modules.iter_mut().enumerate() {
            if module.lessons.is_empty() {
                return Err(CourseError::layout(
                    &root,
                    format!("module {} contains no lesson files", module.id),
                ));
            }
            for (index, lesson) in module.lessons.iter_mut().enumerate() {
                if !is_confined(&lesson.path) {
                    return Err(CourseError::PathEscapesRoot {
                        path: lesson.path.clone(),
                    });
                }
                lesson.module_index = module_index;
                lesson.index = index;
                if positions.insert(lesson.id.clone(), order.len()).is_some() {
                    return Err(CourseError::layout(
                        &root,
                        format!("lesson id {} is not unique", lesson.id),
                    ));
                }
                order.push((module_index, index));
            }
        }

        Ok(Self {
            root,
            title,
            modules,
            order,
            positions,
        })
    }

    /// Canonical course root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Course title from the manifest, else the root directory name
    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            self.root
                .file_name()
                .map(|s| display_title(&s.to_string_lossy()))
                .unwrap_or_else(|| "Course".to_string())
        })
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn lesson_count(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, id: &LessonId) -> bool {
        self.positions.contains_key(id)
    }

    /// Look up a lesson by id
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.position(id).and_then(|pos| self.lesson_at(pos))
    }

    /// Position of a lesson in global course order
    pub fn position(&self, id: &LessonId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Lesson at a global position
    pub fn lesson_at(&self, position: usize) -> Option<&Lesson> {
        let (m, l) = *self.order.get(position)?;
        self.modules.get(m).and_then(|module| module.lessons.get(l))
    }

    pub fn first_lesson(&self) -> Option<&Lesson> {
        self.lesson_at(0)
    }

    /// All lessons in global course order
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }
}

/// Scans a course root and produces a [`CourseCatalog`]
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    root: PathBuf,
}

impl CatalogBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build the catalog, failing fast on a malformed layout
    pub fn build(&self) -> Result<CourseCatalog> {
        if !self.root.is_dir() {
            return Err(CourseError::layout(
                &self.root,
                "course root does not exist or is not a directory",
            ));
        }
        let root = self.root.canonicalize()?;

        let manifest = CourseManifest::load(&root)?;
        let dirs = Self::module_dirs(&root)?;

        let (title, ordered) = match manifest {
            Some(manifest) => {
                for dir in &dirs {
                    if !manifest.modules.iter().any(|m| &m.id == dir) {
                        tracing::warn!("Module directory {} is not listed in the manifest, skipping", dir);
                    }
                }
                let mut ordered = Vec::with_capacity(manifest.modules.len());
                for entry in manifest.modules {
                    if !dirs.contains(&entry.id) {
                        return Err(CourseError::layout(
                            &root,
                            format!("manifest lists module {} but no such directory exists", entry.id),
                        ));
                    }
                    ordered.push((entry.id, entry.title));
                }
                (manifest.title, ordered)
            }
            None => (None, dirs.into_iter().map(|d| (d, None)).collect::<Vec<_>>()),
        };

        if ordered.is_empty() {
            return Err(CourseError::layout(&root, "no module directories found"));
        }

        let mut modules = Vec::with_capacity(ordered.len());
        for (id, title) in ordered {
            let lessons = Self::lessons_in(&root, &id)?;
            let title = title.unwrap_or_else(|| display_title(&id));
            modules.push(Module { id, title, lessons });
        }

        let catalog = CourseCatalog::from_modules(root, title, modules)?;
        tracing::info!(
            "Loaded course {} with {} modules and {} lessons",
            catalog.root().display(),
            catalog.modules().len(),
            catalog.lesson_count()
        );
        Ok(catalog)
    }

    /// Module directory names, sorted
    fn module_dirs(root: &Path) -> Result<Vec<String>> {
        let mut dirs = Vec::new();
        for entry in Self::entries(root)? {
            if !entry.file_type().is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) if is_plain_name(name) => dirs.push(name.to_string()),
                Some(_) => {}
                None => tracing::warn!("Skipping non UTF-8 directory {}", entry.path().display()),
            }
        }
        Ok(dirs)
    }

    /// Lessons of one module, sorted by file name
    fn lessons_in(root: &Path, module_id: &str) -> Result<Vec<Lesson>> {
        let mut lessons = Vec::new();
        for entry in Self::entries(&root.join(module_id))? {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown(path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("Skipping non UTF-8 lesson file {}", path.display());
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };

            lessons.push(Lesson {
                id: LessonId::new(module_id, stem),
                title: display_title(stem),
                path: Path::new(module_id).join(file_name),
                module_index: 0,
                index: lessons.len(),
            });
        }
        Ok(lessons)
    }

    /// Direct children of a directory in file-name order
    fn entries(dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                entry.map_err(|e| {
                    CourseError::layout(dir, format!("failed to read directory: {e}"))
                })
            })
            .collect()
    }
}

/// Check if a path names a markdown file
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "md" || ext == "markdown")
        .unwrap_or(false)
}

/// Relative path without root, prefix or parent components
pub fn is_confined(path: &Path) -> bool {
    use std::path::Component;

    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Turn a directory or file stem into a display title
///
/// A leading numeric ordering prefix is dropped, `-` and `_` become spaces
/// and the first letter is capitalized: `03-state_management` becomes
/// `State management`.
pub fn display_title(stem: &str) -> String {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let prefix = PREFIX.get_or_init(|| Regex::new(r"^\d+[\s._-]*").unwrap());

    let trimmed = prefix.replace(stem, "");
    let base = if trimmed.trim().is_empty() {
        stem
    } else {
        &*trimmed
    };

    let spaced: String = base
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    let spaced = spaced.trim();

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => stem.to_string(),
    }
}
