//! Lesson content loading

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use super::catalog::{is_confined, Lesson, LessonId};
use super::error::{CourseError, Result};
use super::render;

/// Text of a lesson, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonContent {
    pub id: LessonId,
    /// Front matter title, else first heading, else the catalog title
    pub title: String,
    /// Markdown body without front matter
    pub markdown: String,
}

impl LessonContent {
    fn from_raw(lesson: &Lesson, raw: &str) -> Self {
        let (front, body) = render::split_front_matter(raw);
        let title = front
            .and_then(render::front_matter_title)
            .or_else(|| render::first_heading(body))
            .unwrap_or_else(|| lesson.title.clone());

        Self {
            id: lesson.id.clone(),
            title,
            markdown: body.to_string(),
        }
    }
}

/// Reads lesson files confined to a course root, caching them per session
#[derive(Debug, Default)]
pub struct LessonLoader {
    root: PathBuf,
    cache: HashMap<LessonId, String>,
}

impl LessonLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    /// Raw text of a lesson file
    pub fn load(&mut self, lesson: &Lesson) -> Result<String> {
        if let Some(text) = self.cache.get(&lesson.id) {
            return Ok(text.clone());
        }

        let path = self.resolve(lesson)?;
        let text = fs::read_to_string(&path).map_err(|e| CourseError::ResourceNotFound {
            id: lesson.id.clone(),
            path: Some(path.clone()),
            reason: e.to_string(),
        })?;

        tracing::debug!("Loaded lesson {} from {}", lesson.id, path.display());
        self.cache.insert(lesson.id.clone(), text.clone());
        Ok(text)
    }

    /// Parsed lesson content
    pub fn content(&mut self, lesson: &Lesson) -> Result<LessonContent> {
        let raw = self.load(lesson)?;
        Ok(LessonContent::from_raw(lesson, &raw))
    }

    /// Drop cached lesson text so the next load re-reads the files
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Absolute path of a lesson, refusing anything outside the root
    fn resolve(&self, lesson: &Lesson) -> Result<PathBuf> {
        if !is_confined(&lesson.path) {
            return Err(CourseError::PathEscapesRoot {
                path: lesson.path.clone(),
            });
        }

        let joined = self.root.join(&lesson.path);
        let canonical = joined
            .canonicalize()
            .map_err(|e| CourseError::ResourceNotFound {
                id: lesson.id.clone(),
                path: Some(joined.clone()),
                reason: e.to_string(),
            })?;

        if !canonical.starts_with(self.canonical_root()) {
            return Err(CourseError::PathEscapesRoot { path: joined });
        }
        Ok(canonical)
    }

    fn canonical_root(&self) -> PathBuf {
        self.root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::tests::{lesson, TempCourse};
    use crate::core::catalog::CatalogBuilder;

    #[test]
    fn test_load_lesson_content() {
        let course = TempCourse::sample();
        course.write(
            "module-00/03-state.md",
            "---\ntitle: State Management\n---\n\n# Ignored heading\n\nBody",
        );
        let catalog = CatalogBuilder::new(&course.root).build().unwrap();
        let mut loader = LessonLoader::new(catalog.root());

        let intro = catalog.lesson(&"module-00/01-intro".into()).unwrap();
        let content = loader.content(intro).unwrap();
        assert_eq!(content.title, "Introduction");
        assert!(content.markdown.contains("Welcome."));

        let state = catalog.lesson(&"module-00/03-state".into()).unwrap();
        let content = loader.content(state).unwrap();
        assert_eq!(content.title, "State Management");
        assert!(content.markdown.starts_with("# Ignored heading"));
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let course = TempCourse::sample();
        let catalog = CatalogBuilder::new(&course.root).build().unwrap();
        let mut loader = LessonLoader::new(catalog.root());

        std::fs::remove_file(course.root.join("module-01/01-widgets.md")).unwrap();
        let widgets = catalog.lesson(&"module-01/01-widgets".into()).unwrap();

        let err = loader.load(widgets).unwrap_err();
        assert!(matches!(err, CourseError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_cache_survives_file_removal() {
        let course = TempCourse::sample();
        let catalog = CatalogBuilder::new(&course.root).build().unwrap();
        let mut loader = LessonLoader::new(catalog.root());
        let setup = catalog.lesson(&"module-00/02-setup".into()).unwrap();

        let first = loader.load(setup).unwrap();
        std::fs::remove_file(course.root.join("module-00/02-setup.md")).unwrap();
        assert_eq!(loader.load(setup).unwrap(), first);

        loader.clear_cache();
        assert!(loader.load(setup).is_err());
    }

    #[test]
    fn test_clear_cache_rereads_changed_file() {
        let course = TempCourse::sample();
        let catalog = CatalogBuilder::new(&course.root).build().unwrap();
        let mut loader = LessonLoader::new(catalog.root());
        let intro = catalog.lesson(&"module-00/01-intro".into()).unwrap();

        assert_eq!(loader.content(intro).unwrap().title, "Introduction");
        course.write("module-00/01-intro.md", "# Welcome Back\n");
        assert_eq!(loader.content(intro).unwrap().title, "Introduction");

        loader.clear_cache();
        assert_eq!(loader.content(intro).unwrap().title, "Welcome Back");
    }

    #[test]
    fn test_rejects_paths_outside_root() {
        let course = TempCourse::sample();
        let mut loader = LessonLoader::new(course.root.join("module-00"));

        let mut escaping = lesson("module-00", "01-intro");
        escaping.path = PathBuf::from("../module-01/01-widgets.md");
        assert!(matches!(
            loader.load(&escaping),
            Err(CourseError::PathEscapesRoot { .. })
        ));

        let mut absolute = lesson("module-00", "01-intro");
        absolute.path = course.root.join("module-00/01-intro.md");
        assert!(matches!(
            loader.load(&absolute),
            Err(CourseError::PathEscapesRoot { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_escape() {
        let course = TempCourse::sample();
        let outside = TempCourse::new();
        outside.write("secret.md", "secret");
        std::os::unix::fs::symlink(
            outside.root.join("secret.md"),
            course.root.join("module-00/09-link.md"),
        )
        .unwrap();

        let mut loader = LessonLoader::new(&course.root);
        let link = Lesson {
            path: PathBuf::from("module-00/09-link.md"),
            ..lesson("module-00", "09-link")
        };
        assert!(matches!(
            loader.load(&link),
            Err(CourseError::PathEscapesRoot { .. })
        ));
    }
}
