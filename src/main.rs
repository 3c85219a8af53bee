//! Courseview - desktop reader for markdown courses
//!
//! Shows a course of modules and lessons, steps through them in order and
//! remembers which lessons the learner has completed.

mod app;
mod core;
mod ui;

use app::CourseApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Courseview...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("Courseview"),
        ..Default::default()
    };

    eframe::run_native(
        "Courseview",
        native_options,
        Box::new(|cc| Ok(Box::new(CourseApp::new(cc)))),
    )
}
