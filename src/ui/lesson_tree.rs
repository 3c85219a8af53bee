//! Lesson tree panel for course navigation

use eframe::egui;

use crate::app::{AppAction, CourseApp};
use crate::core::catalog::{Lesson, Module};
use crate::core::course::Course;

/// Module/lesson tree panel
pub struct LessonTreePanel;

impl LessonTreePanel {
    /// Show the lesson tree panel
    pub fn show(ui: &mut egui::Ui, app: &CourseApp) -> Option<AppAction> {
        let course = app.course.as_ref()?;
        let mut action = None;

        ui.vertical(|ui| {
            ui.heading(course.title());
            ui.separator();

            egui::ScrollArea::vertical()
                .id_salt("lesson_tree_scroll")
                .show(ui, |ui| {
                    for module in course.list_modules() {
                        if let Some(a) = Self::show_module(ui, module, course, app) {
                            action = Some(a);
                        }
                    }
                });
        });

        action
    }

    /// Show a module with its per-module progress
    fn show_module(
        ui: &mut egui::Ui,
        module: &Module,
        course: &Course,
        app: &CourseApp,
    ) -> Option<AppAction> {
        let mut action = None;
        let ratio = course.module_ratio(module);
        let contains_current = app
            .current
            .as_ref()
            .is_some_and(|id| id.module_id() == module.id);

        let header = format!("{}  {:.0}%", module.title, ratio * 100.0);
        egui::CollapsingHeader::new(header)
            .id_salt(&module.id)
            .default_open(contains_current)
            .show(ui, |ui| {
                for lesson in &module.lessons {
                    if let Some(a) = Self::show_lesson(ui, lesson, course, app) {
                        action = Some(a);
                    }
                }
            });

        action
    }

    /// Show a lesson entry
    fn show_lesson(
        ui: &mut egui::Ui,
        lesson: &Lesson,
        course: &Course,
        app: &CourseApp,
    ) -> Option<AppAction> {
        let icon = if course.is_completed(&lesson.id) {
            "\u{2705}"
        } else {
            "\u{1F4D6}"
        };
        let is_active = app.current.as_ref() == Some(&lesson.id);

        let mut action = None;
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            if ui
                .selectable_label(is_active, format!("{} {}. {}", icon, lesson.index + 1, lesson.title))
                .clicked()
            {
                action = Some(AppAction::OpenLesson(lesson.id.clone()));
            }
        });
        action
    }
}
