use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Day, Period};
use crate::store::{StoreError, TimetableStore};

/// Why a candidate period cannot be placed. Carries the period that
/// already holds the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    ClassSlotTaken(Period),
    TeacherSlotTaken(Period),
}

impl From<Conflict> for AppError {
    fn from(conflict: Conflict) -> Self {
        match conflict {
            Conflict::ClassSlotTaken(p) => AppError::ClassSlotConflict {
                class_id: p.class_id,
                day: p.day,
                period: p.period,
            },
            Conflict::TeacherSlotTaken(p) => AppError::TeacherSlotConflict {
                teacher_id: p.teacher_id,
                day: p.day,
                period: p.period,
            },
        }
    }
}

/// Checks candidates against the live store on every call.
pub struct ConflictValidator {
    store: Arc<dyn TimetableStore>,
}

impl ConflictValidator {
    pub fn new(store: Arc<dyn TimetableStore>) -> Self {
        Self { store }
    }

    /// Class slot first, then the teacher slot across every class.
    pub async fn check(&self, candidate: &Period) -> Result<Option<Conflict>, StoreError> {
        if let Some(existing) = self
            .store
            .get_by_class_slot(&candidate.class_id, candidate.day, candidate.period)
            .await?
        {
            return Ok(Some(Conflict::ClassSlotTaken(existing)));
        }
        if let Some(existing) = self
            .store
            .get_by_teacher_slot(&candidate.teacher_id, candidate.day, candidate.period)
            .await?
        {
            return Ok(Some(Conflict::TeacherSlotTaken(existing)));
        }
        Ok(None)
    }

    pub async fn validate(&self, candidate: &Period) -> Result<(), AppError> {
        match self.check(candidate).await? {
            Some(conflict) => Err(conflict.into()),
            None => Ok(()),
        }
    }

    /// True when `teacher_id` has no period at the slot in any class other
    /// than `class_id`. Periods of `class_id` itself are about to be replaced.
    pub async fn teacher_free_for(
        &self,
        class_id: &str,
        teacher_id: &str,
        day: Day,
        period: u8,
    ) -> Result<bool, StoreError> {
        let holder = self.store.get_by_teacher_slot(teacher_id, day, period).await?;
        Ok(holder.is_none_or(|p| p.class_id == class_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn seeded() -> (Arc<dyn TimetableStore>, Period) {
        let store: Arc<dyn TimetableStore> = Arc::new(MemoryStore::new());
        let existing = store
            .insert(Period::new("C1", Day::Monday, 1, "math", "T1", None))
            .await
            .unwrap();
        (store, existing)
    }

    #[tokio::test]
    async fn test_class_slot_checked_first() {
        let (store, existing) = seeded().await;
        let validator = ConflictValidator::new(store);

        // Same class and same teacher: the class slot wins.
        let candidate = Period::new("C1", Day::Monday, 1, "eng", "T1", None);
        let conflict = validator.check(&candidate).await.unwrap();
        assert_eq!(conflict, Some(Conflict::ClassSlotTaken(existing)));
    }

    #[tokio::test]
    async fn test_teacher_slot_checked_across_classes() {
        let (store, existing) = seeded().await;
        let validator = ConflictValidator::new(store);

        let candidate = Period::new("C2", Day::Monday, 1, "eng", "T1", None);
        let err = validator.validate(&candidate).await.unwrap_err();
        assert!(matches!(err, AppError::TeacherSlotConflict { ref teacher_id, .. } if teacher_id == "T1"));
        assert_eq!(
            validator.check(&candidate).await.unwrap(),
            Some(Conflict::TeacherSlotTaken(existing))
        );
    }

    #[tokio::test]
    async fn test_free_slot_passes() {
        let (store, _) = seeded().await;
        let validator = ConflictValidator::new(store);

        let candidate = Period::new("C2", Day::Monday, 2, "eng", "T1", None);
        assert!(validator.validate(&candidate).await.is_ok());
    }

    #[tokio::test]
    async fn test_teacher_free_for_ignores_own_class() {
        let (store, _) = seeded().await;
        let validator = ConflictValidator::new(store);

        assert!(validator.teacher_free_for("C1", "T1", Day::Monday, 1).await.unwrap());
        assert!(!validator.teacher_free_for("C2", "T1", Day::Monday, 1).await.unwrap());
        assert!(validator.teacher_free_for("C2", "T2", Day::Monday, 1).await.unwrap());
    }
}
