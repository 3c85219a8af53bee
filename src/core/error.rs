//! Error types for the course core

use std::path::PathBuf;

use thiserror::Error;

use super::catalog::LessonId;

/// Description of the directory layout the catalog builder expects
pub const EXPECTED_LAYOUT: &str = "expected <course-root>/<module-dir>/<NN-lesson>.md \
     with at least one module directory, at least one lesson file per module, \
     and an optional <course-root>/course.json manifest listing module ids in order";

/// Errors raised by the course core
#[derive(Debug, Error)]
pub enum CourseError {
    /// The course root does not have the expected shape
    #[error("invalid course layout at {}: {message} ({})", root.display(), EXPECTED_LAYOUT)]
    Layout { root: PathBuf, message: String },

    /// The course manifest could not be read or is inconsistent
    #[error("invalid course manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// A lesson's backing file is missing or unreadable, or the id is unknown
    #[error("lesson {id} unavailable{}: {reason}", location(path))]
    ResourceNotFound {
        id: LessonId,
        /// Backing file, when the lesson is part of the catalog
        path: Option<PathBuf>,
        reason: String,
    },

    /// The lesson id is not part of the catalog
    #[error("lesson {0} is not part of this course")]
    UnknownLesson(LessonId),

    /// A lesson path resolves outside of the course root
    #[error("path {} escapes the course root", path.display())]
    PathEscapesRoot { path: PathBuf },

    /// Progress could not be written
    #[error("failed to persist progress to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CourseError {
    /// Whether this is a configuration error that should abort opening a course
    pub fn is_configuration(&self) -> bool {
        matches!(self, CourseError::Layout { .. } | CourseError::Manifest { .. })
    }

    pub(crate) fn layout(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CourseError::Layout {
            root: root.into(),
            message: message.into(),
        }
    }
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, CourseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_message() {
        let unknown = CourseError::ResourceNotFound {
            id: "module-05/nope".into(),
            path: None,
            reason: "no such lesson in this course".to_string(),
        };
        assert_eq!(
            unknown.to_string(),
            "lesson module-05/nope unavailable: no such lesson in this course"
        );

        let missing = CourseError::ResourceNotFound {
            id: "module-00/01-intro".into(),
            path: Some(PathBuf::from("/course/module-00/01-intro.md")),
            reason: "not found".to_string(),
        };
        assert!(missing.to_string().contains("(/course/module-00/01-intro.md)"));
    }
}
