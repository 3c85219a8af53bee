//! Main application state and UI coordination

use std::path::{Path, PathBuf};

use eframe::egui;

use crate::core::catalog::LessonId;
use crate::core::config::AppConfig;
use crate::core::course::{Course, LessonView};
use crate::ui::{lesson_tree::LessonTreePanel, lesson_view::LessonPanel, nav_bar::NavigationBar};

/// User intents raised by the panels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    OpenLesson(LessonId),
    Next,
    Previous,
    ToggleComplete,
    OpenCourse(PathBuf),
    PickCourse,
    ExportLesson,
    ReloadLesson,
    ResetProgress,
}

/// Main application state
pub struct CourseApp {
    /// Application configuration
    pub config: AppConfig,
    /// The open course, if any
    pub course: Option<Course>,
    /// Lesson the learner is on
    pub current: Option<LessonId>,
    /// What the lesson panel shows for `current`
    pub view: Option<LessonView>,
    /// Course that failed to open, with the reason
    pub fatal: Option<String>,
    /// Whether sidebar is visible
    pub sidebar_visible: bool,
    /// Commonmark cache for lesson rendering
    pub commonmark_cache: egui_commonmark::CommonMarkCache,
}

impl CourseApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {:#}", e);
            AppConfig::default()
        });
        Self::apply_style(&cc.egui_ctx, &config);

        let mut app = Self::with_config(config);
        if let Some(root) = app.config.course_root.clone() {
            app.open_course(root);
        }
        app
    }

    fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            course: None,
            current: None,
            view: None,
            fatal: None,
            sidebar_visible: true,
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
        }
    }

    fn apply_style(ctx: &egui::Context, config: &AppConfig) {
        if config.is_dark() {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        let size = config.ui.font_size;
        ctx.style_mut(|style| {
            style
                .text_styles
                .insert(egui::TextStyle::Body, egui::FontId::proportional(size));
            style
                .text_styles
                .insert(egui::TextStyle::Monospace, egui::FontId::monospace(size - 1.0));
        });
    }

    /// Open a course root and resume where the learner left off
    pub fn open_course(&mut self, root: PathBuf) {
        if !self.load_course(&root) {
            return;
        }

        self.config.set_course(root);
        if let Err(e) = self.config.save() {
            tracing::error!("Failed to save config: {:#}", e);
        }
    }

    /// Replace the open course; on failure nothing of the previous course stays visible
    fn load_course(&mut self, root: &Path) -> bool {
        self.current = None;
        self.view = None;

        match Course::open(root, self.config.progress_path()) {
            Ok(course) => {
                self.fatal = None;
                let resume = course.resume();
                self.course = Some(course);
                if let Some(id) = resume {
                    self.open_lesson(id);
                }
                true
            }
            Err(e) => {
                if e.is_configuration() {
                    tracing::error!("Invalid course layout at {}: {}", root.display(), e);
                    self.fatal = Some(e.to_string());
                } else {
                    tracing::error!("Failed to open course {}: {}", root.display(), e);
                    self.fatal = Some(format!("{}: {}", root.display(), e));
                }
                self.course = None;
                false
            }
        }
    }

    /// Show a lesson
    pub fn open_lesson(&mut self, id: LessonId) {
        let Some(course) = self.course.as_mut() else {
            return;
        };
        self.view = Some(course.view(&id));
        self.current = Some(id);
    }

    /// Apply an action raised by a panel
    pub fn handle(&mut self, action: AppAction) {
        match action {
            AppAction::OpenLesson(id) => self.open_lesson(id),
            AppAction::Next => {
                if let Some(id) = self.adjacent(Course::next) {
                    self.open_lesson(id);
                }
            }
            AppAction::Previous => {
                if let Some(id) = self.adjacent(Course::previous) {
                    self.open_lesson(id);
                }
            }
            AppAction::ToggleComplete => {
                if let (Some(course), Some(id)) = (self.course.as_mut(), self.current.as_ref()) {
                    if let Err(e) = course.toggle_complete(id) {
                        tracing::warn!("{}", e);
                    }
                }
            }
            AppAction::OpenCourse(root) => self.open_course(root),
            AppAction::PickCourse => {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    self.open_course(path);
                }
            }
            AppAction::ExportLesson => self.export_current(),
            AppAction::ReloadLesson => {
                if let Some(course) = self.course.as_mut() {
                    course.reload_lessons();
                }
                if let Some(id) = self.current.clone() {
                    self.open_lesson(id);
                }
            }
            AppAction::ResetProgress => {
                if let Some(course) = self.course.as_mut() {
                    course.reset_progress();
                }
            }
        }
    }

    /// Neighbour of the current lesson; stale ids fall back to the first lesson
    fn adjacent(&self, step: fn(&Course, &LessonId) -> Option<LessonId>) -> Option<LessonId> {
        let course = self.course.as_ref()?;
        match self.current.as_ref() {
            Some(id) if course.catalog().contains(id) => step(course, id),
            _ => course.catalog().first_lesson().map(|l| l.id.clone()),
        }
    }

    fn export_current(&mut self) {
        let (Some(course), Some(id)) = (self.course.as_mut(), self.current.clone()) else {
            return;
        };

        let file_name = format!("{}.html", id.as_str().replace('/', "-"));
        let mut dialog = rfd::FileDialog::new()
            .add_filter("HTML", &["html"])
            .set_file_name(file_name);
        if let Some(dir) = &self.config.export_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(out) = dialog.save_file() else {
            return;
        };

        match course.export_html(&id, &out) {
            Ok(()) => {
                if let Err(e) = open::that(&out) {
                    tracing::warn!("Failed to open {}: {}", out.display(), e);
                }
                self.config.export_dir = out.parent().map(|p| p.to_path_buf());
                let _ = self.config.save();
            }
            Err(e) => tracing::error!("Failed to export lesson {}: {}", id, e),
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) -> Option<AppAction> {
        let mut action = None;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Course...").clicked() {
                        action = Some(AppAction::PickCourse);
                        ui.close();
                    }
                    ui.menu_button("Recent Courses", |ui| {
                        if self.config.recent_courses.is_empty() {
                            ui.label("None");
                        }
                        for path in &self.config.recent_courses {
                            if ui.button(path.display().to_string()).clicked() {
                                action = Some(AppAction::OpenCourse(path.clone()));
                                ui.close();
                            }
                        }
                    });
                    ui.separator();
                    let has_lesson = self.current.is_some();
                    if ui
                        .add_enabled(has_lesson, egui::Button::new("Export Lesson as HTML..."))
                        .clicked()
                    {
                        action = Some(AppAction::ExportLesson);
                        ui.close();
                    }
                    if ui
                        .add_enabled(self.course.is_some(), egui::Button::new("Reset Progress"))
                        .clicked()
                    {
                        action = Some(AppAction::ResetProgress);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Toggle Sidebar").clicked() {
                        self.sidebar_visible = !self.sidebar_visible;
                        ui.close();
                    }
                    if ui
                        .add_enabled(self.course.is_some(), egui::Button::new("Reload Lesson"))
                        .clicked()
                    {
                        action = Some(AppAction::ReloadLesson);
                        ui.close();
                    }
                    ui.separator();
                    let dark = self.config.is_dark();
                    if ui.selectable_label(dark, "Dark Theme").clicked() {
                        self.config.ui.theme = "dark".to_string();
                        Self::apply_style(ctx, &self.config);
                        let _ = self.config.save();
                        ui.close();
                    }
                    if ui.selectable_label(!dark, "Light Theme").clicked() {
                        self.config.ui.theme = "light".to_string();
                        Self::apply_style(ctx, &self.config);
                        let _ = self.config.save();
                        ui.close();
                    }
                });
            });
        });

        action
    }

    /// Keyboard shortcuts
    fn shortcuts(ctx: &egui::Context) -> Option<AppAction> {
        ctx.input(|i| {
            if i.modifiers.ctrl && i.key_pressed(egui::Key::O) {
                Some(AppAction::PickCourse)
            } else if i.modifiers.alt && i.key_pressed(egui::Key::ArrowRight) {
                Some(AppAction::Next)
            } else if i.modifiers.alt && i.key_pressed(egui::Key::ArrowLeft) {
                Some(AppAction::Previous)
            } else if i.modifiers.ctrl && i.key_pressed(egui::Key::D) {
                Some(AppAction::ToggleComplete)
            } else if i.key_pressed(egui::Key::F5) {
                Some(AppAction::ReloadLesson)
            } else {
                None
            }
        })
    }

    /// Show the fatal course error with the expected layout
    fn show_fatal(ui: &mut egui::Ui, message: &str) -> Option<AppAction> {
        let mut action = None;
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("Course could not be opened");
            ui.add_space(10.0);
            let color = ui.visuals().error_fg_color;
            ui.colored_label(color, message);
            ui.add_space(20.0);
            if ui.button("Open Another Course...").clicked() {
                action = Some(AppAction::PickCourse);
            }
        });
        action
    }
}

impl eframe::App for CourseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();

        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::B)) {
            self.sidebar_visible = !self.sidebar_visible;
        }
        actions.extend(Self::shortcuts(ctx));
        actions.extend(self.render_menu_bar(ctx));

        if self.course.is_some() {
            egui::TopBottomPanel::bottom("nav_bar").show(ctx, |ui| {
                actions.extend(NavigationBar::show(ui, self));
            });
        }

        if self.sidebar_visible && self.course.is_some() {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(self.config.ui.sidebar_width)
                .min_width(180.0)
                .show(ctx, |ui| {
                    actions.extend(LessonTreePanel::show(ui, self));
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = self.fatal.clone() {
                actions.extend(Self::show_fatal(ui, &message));
            } else {
                actions.extend(LessonPanel::show(ui, self));
            }
        });

        for action in actions {
            self.handle(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::tests::TempCourse;

    fn app_with_progress_in(dir: &TempCourse) -> CourseApp {
        let config = AppConfig {
            progress_file: Some(dir.root.join("progress.json")),
            ..AppConfig::default()
        };
        CourseApp::with_config(config)
    }

    #[test]
    fn test_failed_open_clears_previous_course() {
        let course = TempCourse::sample();
        let state = TempCourse::new();
        let mut app = app_with_progress_in(&state);

        assert!(app.load_course(&course.root));
        assert_eq!(app.current, Some("module-00/01-intro".into()));
        assert!(matches!(app.view, Some(LessonView::Available(_))));

        let broken = TempCourse::new();
        broken.write("notes.txt", "not a course");
        assert!(!app.load_course(&broken.root));
        assert!(app.course.is_none());
        assert!(app.current.is_none());
        assert!(app.view.is_none());
        assert!(app.fatal.is_some());

        // Actions aimed at the old course are ignored
        app.handle(AppAction::ToggleComplete);
        app.handle(AppAction::Next);
        assert!(app.current.is_none());
    }

    #[test]
    fn test_reopen_after_failure_resumes() {
        let course = TempCourse::sample();
        let state = TempCourse::new();
        let mut app = app_with_progress_in(&state);

        assert!(app.load_course(&course.root));
        app.handle(AppAction::Next);
        assert_eq!(app.current, Some("module-00/02-setup".into()));

        assert!(!app.load_course(&course.root.join("missing")));
        assert!(app.load_course(&course.root));
        assert!(app.fatal.is_none());
        assert_eq!(app.current, Some("module-00/02-setup".into()));
    }

    #[test]
    fn test_reload_action_rereads_current_lesson() {
        let course = TempCourse::sample();
        let state = TempCourse::new();
        let mut app = app_with_progress_in(&state);
        assert!(app.load_course(&course.root));

        course.write("module-00/01-intro.md", "# Hello Again\n");
        app.handle(AppAction::ReloadLesson);
        assert!(matches!(&app.view, Some(LessonView::Available(c)) if c.title == "Hello Again"));
    }
}
