//! Period storage.
//!
//! Every store keeps two unique indices over the period collection:
//! `(class_id, day, period)` and `(teacher_id, day, period)`. Lookups through
//! either index are map-backed. Stores reject writes that would break either
//! index even though callers validate first.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Day, Period};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("class {class_id} already has a period on {day} period {period}")]
    ClassSlotTaken {
        class_id: String,
        day: Day,
        period: u8,
    },

    #[error("teacher {teacher_id} already has a period on {day} period {period}")]
    TeacherSlotTaken {
        teacher_id: String,
        day: Day,
        period: u8,
    },

    #[error("period for class {found} submitted in replacement batch for class {expected}")]
    ForeignPeriod { expected: String, found: String },

    #[error("corrupt period record: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait TimetableStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Period>, StoreError>;

    async fn get_by_class_slot(
        &self,
        class_id: &str,
        day: Day,
        period: u8,
    ) -> Result<Option<Period>, StoreError>;

    async fn get_by_teacher_slot(
        &self,
        teacher_id: &str,
        day: Day,
        period: u8,
    ) -> Result<Option<Period>, StoreError>;

    /// Periods of one class, sorted day-major.
    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Period>, StoreError>;

    /// Periods of one teacher across all classes, sorted day-major.
    async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<Period>, StoreError>;

    /// Ids of every teacher booked at `(day, period)`, read from the teacher-slot index.
    async fn teachers_busy_at(&self, day: Day, period: u8) -> Result<Vec<String>, StoreError>;

    async fn insert(&self, period: Period) -> Result<Period, StoreError>;

    /// Returns `false` when no period had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Atomically swaps every period of `class_id` for `periods`. On error
    /// the previous periods are left in place.
    async fn replace_all_for_class(
        &self,
        class_id: &str,
        periods: Vec<Period>,
    ) -> Result<usize, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
