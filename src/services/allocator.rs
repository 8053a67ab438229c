use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::TimetableConfig;
use crate::error::AppError;
use crate::models::{NewPeriodRequest, Period};
use crate::registry::Registry;
use crate::services::validator::ConflictValidator;
use crate::store::TimetableStore;

/// Manual single-period create and delete.
///
/// Callers serialize calls through the service write gate; this type does
/// no locking of its own.
pub struct PeriodAllocator {
    store: Arc<dyn TimetableStore>,
    registry: Arc<dyn Registry>,
    config: Arc<TimetableConfig>,
}

impl PeriodAllocator {
    pub fn new(
        store: Arc<dyn TimetableStore>,
        registry: Arc<dyn Registry>,
        config: Arc<TimetableConfig>,
    ) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    pub async fn create_period(&self, req: NewPeriodRequest) -> Result<Period, AppError> {
        self.config.check_slot(req.day, req.period)?;

        let class_id = required("class_id", &req.class_id)?;
        let subject_id = required("subject_id", &req.subject_id)?;
        let teacher_id = required("teacher_id", &req.teacher_id)?;

        if self.registry.class(class_id).await?.is_none() {
            return Err(AppError::validation(
                "class_id",
                format!("class {} does not exist", class_id),
            ));
        }
        if self.registry.subject(subject_id).await?.is_none() {
            return Err(AppError::validation(
                "subject_id",
                format!("subject {} does not exist", subject_id),
            ));
        }
        if self.registry.teacher(teacher_id).await?.is_none() {
            return Err(AppError::validation(
                "teacher_id",
                format!("teacher {} does not exist", teacher_id),
            ));
        }

        let room = req
            .room
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let candidate = Period::new(class_id, req.day, req.period, subject_id, teacher_id, room);

        if let Err(err) = ConflictValidator::new(self.store.clone())
            .validate(&candidate)
            .await
        {
            warn!(
                "rejected period for class {} teacher {} on {}: {}",
                class_id,
                teacher_id,
                candidate.slot(),
                err
            );
            return Err(err);
        }

        let period = self.store.insert(candidate).await?;
        info!(
            "created period {} for class {} ({} with {}) on {}",
            period.id,
            period.class_id,
            period.subject_id,
            period.teacher_id,
            period.slot()
        );
        Ok(period)
    }

    pub async fn delete_period(&self, id: Uuid) -> Result<(), AppError> {
        if self.store.delete(id).await? {
            info!("deleted period {}", id);
            Ok(())
        } else {
            Err(AppError::NotFound(format!("period {}", id)))
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::validation(field, "must not be empty"))
    } else {
        Ok(trimmed)
    }
}
