use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::TimetableConfig;
use crate::error::AppError;
use crate::models::{Day, FreeTeacherFilter, TeacherRecord};
use crate::registry::Registry;
use crate::store::TimetableStore;

pub struct FreeTeacherFinder {
    store: Arc<dyn TimetableStore>,
    registry: Arc<dyn Registry>,
    config: Arc<TimetableConfig>,
}

impl FreeTeacherFinder {
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

    /// Teachers with no period anywhere in the school at `(day, period)`,
    /// narrowed by `filter`, sorted by id.
    pub async fn find_free_teachers(
        &self,
        day: Day,
        period: u8,
        filter: &FreeTeacherFilter,
    ) -> Result<Vec<TeacherRecord>, AppError> {
        self.config.check_slot(day, period)?;

        let busy: HashSet<String> = self
            .store
            .teachers_busy_at(day, period)
            .await?
            .into_iter()
            .collect();

        let mut free: Vec<TeacherRecord> = self
            .registry
            .teachers()
            .await?
            .into_iter()
            .filter(|teacher| !busy.contains(&teacher.id))
            .filter(|teacher| filter.matches(teacher))
            .collect();
        free.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(
            "{} free teachers on {} period {} ({} busy)",
            free.len(),
            day,
            period,
            busy.len()
        );
        Ok(free)
    }
}
