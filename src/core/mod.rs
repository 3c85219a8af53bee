//! Course core: catalog, lesson loading, navigation and progress

pub mod catalog;
pub mod config;
pub mod course;
pub mod error;
pub mod lesson;
pub mod manifest;
pub mod navigation;
pub mod progress;
pub mod render;
