//! Previous/next buttons, completion toggle and overall progress

use eframe::egui;

use crate::app::{AppAction, CourseApp};
use crate::core::progress::PersistenceStatus;

pub struct NavigationBar;

impl NavigationBar {
    pub fn show(ui: &mut egui::Ui, app: &CourseApp) -> Option<AppAction> {
        let course = app.course.as_ref()?;
        let current = app.current.as_ref();
        let mut action = None;

        let has_previous = current.and_then(|id| course.previous(id)).is_some();
        let has_next = current.and_then(|id| course.next(id)).is_some();
        let completed = current.is_some_and(|id| course.is_completed(id));

        ui.horizontal(|ui| {
            if ui
                .add_enabled(has_previous, egui::Button::new("\u{25C0} Previous"))
                .clicked()
            {
                action = Some(AppAction::Previous);
            }

            let label = if completed {
                "\u{2714} Completed"
            } else {
                "Mark Complete"
            };
            if ui
                .add_enabled(current.is_some(), egui::Button::new(label).selected(completed))
                .clicked()
            {
                action = Some(AppAction::ToggleComplete);
            }

            if ui
                .add_enabled(has_next, egui::Button::new("Next \u{25B6}"))
                .clicked()
            {
                action = Some(AppAction::Next);
            }

            ui.separator();

            let total = course.catalog().lesson_count();
            let ratio = course.completion_ratio() as f32;
            ui.add(
                egui::ProgressBar::new(ratio)
                    .desired_width(200.0)
                    .text(format!("{}/{} lessons", course.completed_count(), total)),
            );

            if let PersistenceStatus::Unsaved(reason) = course.persistence_status() {
                let color = ui.visuals().warn_fg_color;
                ui.colored_label(color, "\u{26A0} progress not saved")
                    .on_hover_text(reason);
            }
        });

        action
    }
}
