//! Previous/next resolution over the flattened course order
//!
//! Modules in catalog order, then lessons within each module. The resolver
//! holds no state: the caller owns the current lesson id and threads it
//! through these functions.

use super::catalog::{CourseCatalog, LessonId};

/// Lesson following `current`, crossing module boundaries
///
/// Returns `None` for the last lesson and for ids not in the catalog.
pub fn next<'a>(catalog: &'a CourseCatalog, current: &LessonId) -> Option<&'a LessonId> {
    let position = catalog.position(current)?;
    catalog.lesson_at(position + 1).map(|l| &l.id)
}

/// Lesson preceding `current`; `None` for the first lesson and unknown ids
pub fn previous<'a>(catalog: &'a CourseCatalog, current: &LessonId) -> Option<&'a LessonId> {
    let position = catalog.position(current)?;
    position
        .checked_sub(1)
        .and_then(|p| catalog.lesson_at(p))
        .map(|l| &l.id)
}

/// Where to resume: the last viewed lesson if it still exists, else the first
pub fn resume<'a>(catalog: &'a CourseCatalog, last_viewed: Option<&LessonId>) -> Option<&'a LessonId> {
    last_viewed
        .and_then(|id| catalog.lesson(id))
        .or_else(|| catalog.first_lesson())
        .map(|l| &l.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::tests::sample_catalog;

    fn id(s: &str) -> LessonId {
        LessonId::from(s)
    }

    #[test]
    fn test_crosses_module_boundary() {
        let catalog = sample_catalog();
        assert_eq!(next(&catalog, &id("module-00/L2")), Some(&id("module-01/L3")));
        assert_eq!(previous(&catalog, &id("module-01/L3")), Some(&id("module-00/L2")));
    }

    #[test]
    fn test_ends_do_not_wrap() {
        let catalog = sample_catalog();
        assert_eq!(next(&catalog, &id("module-01/L3")), None);
        assert_eq!(previous(&catalog, &id("module-00/L1")), None);
    }

    #[test]
    fn test_adjacency_round_trip() {
        let catalog = sample_catalog();
        let count = catalog.lesson_count();

        for (i, lesson) in catalog.lessons().enumerate() {
            if i > 0 {
                let prev = previous(&catalog, &lesson.id).unwrap();
                assert_eq!(next(&catalog, prev), Some(&lesson.id));
            }
            if i + 1 < count {
                let following = next(&catalog, &lesson.id).unwrap();
                assert_eq!(previous(&catalog, following), Some(&lesson.id));
            }
        }
    }

    #[test]
    fn test_unknown_id_resolves_to_none() {
        let catalog = sample_catalog();
        assert_eq!(next(&catalog, &id("module-09/removed")), None);
        assert_eq!(previous(&catalog, &id("module-09/removed")), None);
        assert_eq!(next(&CourseCatalog::default(), &id("module-00/L1")), None);
    }

    #[test]
    fn test_resume_falls_back_to_first_lesson() {
        let catalog = sample_catalog();
        assert_eq!(resume(&catalog, Some(&id("module-00/L2"))), Some(&id("module-00/L2")));
        assert_eq!(resume(&catalog, Some(&id("module-09/removed"))), Some(&id("module-00/L1")));
        assert_eq!(resume(&catalog, None), Some(&id("module-00/L1")));
        assert_eq!(resume(&CourseCatalog::default(), None), None);
    }
}
