//! Lesson panel rendering markdown with egui_commonmark

use eframe::egui;
use egui_commonmark::CommonMarkViewer;

use crate::app::{AppAction, CourseApp};
use crate::core::course::LessonView;

/// Lesson content panel
pub struct LessonPanel;

impl LessonPanel {
    /// Show the current lesson
    pub fn show(ui: &mut egui::Ui, app: &mut CourseApp) -> Option<AppAction> {
        let mut action = None;

        egui::ScrollArea::vertical()
            .id_salt("lesson_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| match &app.view {
                Some(LessonView::Available(content)) => {
                    if let Some(module) = app.course.as_ref().and_then(|c| c.module_of(&content.id)) {
                        ui.weak(format!("{} \u{203A} {}", module.title, content.title));
                        ui.separator();
                    }
                    CommonMarkViewer::new().show(ui, &mut app.commonmark_cache, &content.markdown);
                }
                Some(LessonView::Unavailable { id, message }) => {
                    Self::show_unavailable(ui, &id.to_string(), message);
                }
                None if app.course.is_some() => {
                    ui.label("Select a lesson from the sidebar");
                }
                None => action = Self::show_welcome(ui),
            });

        action
    }

    /// Placeholder for a lesson whose file could not be read
    fn show_unavailable(ui: &mut egui::Ui, id: &str, message: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.heading("Lesson unavailable");
            ui.label(id);
            ui.add_space(10.0);
            ui.weak(message);
        });
    }

    /// Show welcome screen when no course is open
    fn show_welcome(ui: &mut egui::Ui) -> Option<AppAction> {
        let mut action = None;
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.heading("Welcome to Courseview");
            ui.add_space(20.0);

            ui.label("Open a course directory to start learning.");
            ui.add_space(10.0);
            if ui.button("Open Course...").clicked() {
                action = Some(AppAction::PickCourse);
            }
            ui.add_space(20.0);

            ui.label("Keyboard shortcuts:");
            ui.label("  Ctrl+O - Open course");
            ui.label("  Alt+\u{2190} / Alt+\u{2192} - Previous / next lesson");
            ui.label("  Ctrl+D - Toggle lesson complete");
            ui.label("  F5 - Reload lesson");
            ui.label("  Ctrl+B - Toggle sidebar");
        });
        action
    }
}
