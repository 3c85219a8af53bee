//! UI components for Courseview

pub mod lesson_tree;
pub mod lesson_view;
pub mod nav_bar;
