//! Course facade used by the presentation layer

use std::path::{Path, PathBuf};

use super::catalog::{CatalogBuilder, CourseCatalog, LessonId, Module};
use super::error::{CourseError, Result};
use super::lesson::{LessonContent, LessonLoader};
use super::navigation;
use super::progress::{PersistenceStatus, ProgressStore};
use super::render;

/// What the lesson view should display
#[derive(Debug, Clone, PartialEq)]
pub enum LessonView {
    Available(LessonContent),
    /// The lesson could not be loaded; the session continues
    Unavailable { id: LessonId, message: String },
}

/// An open course: catalog, lesson loader and progress
#[derive(Debug)]
pub struct Course {
    catalog: CourseCatalog,
    loader: LessonLoader,
    progress: ProgressStore,
}

impl Course {
    /// Build the catalog and load progress
    ///
    /// Layout problems are returned as errors; progress problems are not.
    /// Progress is keyed by the canonical course root, so several courses
    /// can share one progress file.
    pub fn open(root: &Path, progress_path: impl Into<PathBuf>) -> Result<Self> {
        let catalog = CatalogBuilder::new(root).build()?;
        let key = catalog.root().to_string_lossy().into_owned();
        let progress = ProgressStore::open(progress_path, key);
        Ok(Self::with_catalog(catalog, progress))
    }

    pub fn with_catalog(catalog: CourseCatalog, progress: ProgressStore) -> Self {
        let stale = progress.record().stale_ids(&catalog).count();
        if stale > 0 {
            tracing::warn!("Progress refers to {} lessons no longer in the course", stale);
        }

        Self {
            loader: LessonLoader::new(catalog.root()),
            catalog,
            progress,
        }
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    pub fn title(&self) -> String {
        self.catalog.title()
    }

    pub fn list_modules(&self) -> &[Module] {
        self.catalog.modules()
    }

    /// Module that owns a lesson
    pub fn module_of(&self, id: &LessonId) -> Option<&Module> {
        let lesson = self.catalog.lesson(id)?;
        self.catalog.modules().get(lesson.module_index)
    }

    /// Content of a lesson by id
    pub fn lesson_text(&mut self, id: &LessonId) -> Result<LessonContent> {
        let lesson = self
            .catalog
            .lesson(id)
            .ok_or_else(|| CourseError::ResourceNotFound {
                id: id.clone(),
                path: None,
                reason: "no such lesson in this course".to_string(),
            })?;
        self.loader.content(lesson)
    }

    /// Forget cached lesson text so edited files are picked up
    pub fn reload_lessons(&mut self) {
        self.loader.clear_cache();
        tracing::info!("Reloading lessons from {}", self.catalog.root().display());
    }

    /// Open a lesson for display and remember it as the resume point
    pub fn view(&mut self, id: &LessonId) -> LessonView {
        match self.lesson_text(id) {
            Ok(content) => {
                self.progress.set_last_viewed(id);
                LessonView::Available(content)
            }
            Err(e) => {
                tracing::warn!("{}", e);
                LessonView::Unavailable {
                    id: id.clone(),
                    message: e.to_string(),
                }
            }
        }
    }

    pub fn next(&self, id: &LessonId) -> Option<LessonId> {
        navigation::next(&self.catalog, id).cloned()
    }

    pub fn previous(&self, id: &LessonId) -> Option<LessonId> {
        navigation::previous(&self.catalog, id).cloned()
    }

    /// Lesson to open on startup
    pub fn resume(&self) -> Option<LessonId> {
        navigation::resume(&self.catalog, self.progress.last_viewed()).cloned()
    }

    pub fn mark_complete(&mut self, id: &LessonId) -> Result<()> {
        self.ensure_known(id)?;
        self.progress.mark_complete(id);
        Ok(())
    }

    pub fn mark_incomplete(&mut self, id: &LessonId) -> Result<()> {
        self.ensure_known(id)?;
        self.progress.mark_incomplete(id);
        Ok(())
    }

    /// Flip completion; returns the new state
    pub fn toggle_complete(&mut self, id: &LessonId) -> Result<bool> {
        if self.is_completed(id) {
            self.mark_incomplete(id)?;
            Ok(false)
        } else {
            self.mark_complete(id)?;
            Ok(true)
        }
    }

    pub fn is_completed(&self, id: &LessonId) -> bool {
        self.progress.is_completed(id)
    }

    pub fn completion_ratio(&self) -> f64 {
        self.progress.completion_ratio(&self.catalog)
    }

    pub fn completed_count(&self) -> usize {
        self.progress.record().completed_count(&self.catalog)
    }

    pub fn module_ratio(&self, module: &Module) -> f64 {
        self.progress.record().module_ratio(module)
    }

    pub fn reset_progress(&mut self) {
        self.progress.reset();
    }

    pub fn persistence_status(&self) -> &PersistenceStatus {
        self.progress.status()
    }

    /// Write a lesson as a standalone HTML page
    pub fn export_html(&mut self, id: &LessonId, out: &Path) -> Result<()> {
        let content = self.lesson_text(id)?;
        let page = render::to_html_page(&content.title, &content.markdown);
        std::fs::write(out, page)?;
        tracing::info!("Exported lesson {} to {}", id, out.display());
        Ok(())
    }

    fn ensure_known(&self, id: &LessonId) -> Result<()> {
        if self.catalog.contains(id) {
            Ok(())
        } else {
            Err(CourseError::UnknownLesson(id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::tests::TempCourse;

    fn open_sample() -> (TempCourse, Course) {
        let course = TempCourse::sample();
        let opened = Course::open(&course.root, course.root.join(".progress/progress.json")).unwrap();
        (course, opened)
    }

    #[test]
    fn test_scenario_navigation_and_progress() {
        let (_dir, mut course) = open_sample();
        let setup = LessonId::from("module-00/02-setup");
        let widgets = LessonId::from("module-01/01-widgets");

        assert_eq!(course.next(&setup), Some(widgets.clone()));
        assert_eq!(course.module_of(&widgets).map(|m| m.id.as_str()), Some("module-01"));
        assert!(course.module_of(&"module-05/nope".into()).is_none());
        assert_eq!(course.previous(&widgets), Some(setup.clone()));
        assert_eq!(course.completion_ratio(), 0.0);

        for lesson in course.catalog().lessons().map(|l| l.id.clone()).collect::<Vec<_>>() {
            course.mark_complete(&lesson).unwrap();
        }
        assert_eq!(course.completion_ratio(), 1.0);
        assert_eq!(course.completed_count(), 3);
    }

    #[test]
    fn test_unknown_lesson_text_is_resource_error() {
        let (_dir, mut course) = open_sample();
        let err = course.lesson_text(&"module-05/nope".into()).unwrap_err();
        assert!(matches!(err, CourseError::ResourceNotFound { path: None, .. }));
        assert!(!err.to_string().contains("()"));

        assert!(matches!(
            course.view(&"module-05/nope".into()),
            LessonView::Unavailable { .. }
        ));
        assert!(course.mark_complete(&"module-05/nope".into()).is_err());
    }

    #[test]
    fn test_view_sets_resume_point() {
        let (dir, mut course) = open_sample();
        let widgets = LessonId::from("module-01/01-widgets");

        assert_eq!(course.resume(), Some("module-00/01-intro".into()));
        let view = course.view(&widgets);
        assert!(matches!(&view, LessonView::Available(c) if c.title == "Widgets"));

        let reopened = Course::open(&dir.root, dir.root.join(".progress/progress.json")).unwrap();
        assert_eq!(reopened.resume(), Some(widgets));
    }

    #[test]
    fn test_deleted_progress_file_means_no_progress() {
        let (dir, mut course) = open_sample();
        course.mark_complete(&"module-00/01-intro".into()).unwrap();

        std::fs::remove_file(dir.root.join(".progress/progress.json")).unwrap();
        let reopened = Course::open(&dir.root, dir.root.join(".progress/progress.json")).unwrap();
        assert_eq!(reopened.completion_ratio(), 0.0);
    }

    #[test]
    fn test_courses_keep_separate_progress() {
        let first = TempCourse::sample();
        let second = TempCourse::sample();
        let shared = TempCourse::new();
        let progress_path = shared.root.join("progress.json");
        let intro = LessonId::from("module-00/01-intro");

        let mut a = Course::open(&first.root, &progress_path).unwrap();
        a.mark_complete(&intro).unwrap();
        a.view(&"module-01/01-widgets".into());

        let mut b = Course::open(&second.root, &progress_path).unwrap();
        assert_eq!(b.completion_ratio(), 0.0);
        assert!(!b.is_completed(&intro));
        assert_eq!(b.resume(), Some(intro.clone()));
        b.mark_complete(&"module-00/02-setup".into()).unwrap();

        let a = Course::open(&first.root, &progress_path).unwrap();
        assert!(a.is_completed(&intro));
        assert!(!a.is_completed(&"module-00/02-setup".into()));
        assert_eq!(a.resume(), Some("module-01/01-widgets".into()));

        let b = Course::open(&second.root, &progress_path).unwrap();
        assert_eq!(b.completed_count(), 1);
        assert!(!b.is_completed(&intro));
    }

    #[test]
    fn test_reload_lessons_picks_up_edits() {
        let (dir, mut course) = open_sample();
        let intro = LessonId::from("module-00/01-intro");

        assert_eq!(course.lesson_text(&intro).unwrap().title, "Introduction");
        dir.write("module-00/01-intro.md", "# Getting Started\n");
        assert_eq!(course.lesson_text(&intro).unwrap().title, "Introduction");

        course.reload_lessons();
        assert_eq!(course.lesson_text(&intro).unwrap().title, "Getting Started");
    }

    #[test]
    fn test_toggle_and_export() {
        let (dir, mut course) = open_sample();
        let intro = LessonId::from("module-00/01-intro");

        assert!(course.toggle_complete(&intro).unwrap());
        assert!(!course.toggle_complete(&intro).unwrap());
        assert!(!course.is_completed(&intro));

        let out = dir.root.join("intro.html");
        course.export_html(&intro, &out).unwrap();
        let html = std::fs::read_to_string(out).unwrap();
        assert!(html.contains("<h1>Introduction</h1>"));
    }
}
