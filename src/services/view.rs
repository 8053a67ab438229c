use std::sync::Arc;

use tracing::warn;

use crate::config::TimetableConfig;
use crate::error::AppError;
use crate::models::{ClassTimetable, Grid, Period, TeacherTimetable};
use crate::registry::Registry;
use crate::store::TimetableStore;

/// Read-only grids for display. Never takes the write gate.
pub struct TimetableViewComposer {
    store: Arc<dyn TimetableStore>,
    registry: Arc<dyn Registry>,
    config: Arc<TimetableConfig>,
}

impl TimetableViewComposer {
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

    pub async fn build_class_grid(&self, class_id: &str) -> Result<ClassTimetable, AppError> {
        if self.registry.class(class_id).await?.is_none() {
            return Err(AppError::NotFound(format!("class {}", class_id)));
        }
        let periods = self.store.list_by_class(class_id).await?;
        Ok(ClassTimetable {
            class_id: class_id.to_string(),
            grid: self.compose(periods),
        })
    }

    pub async fn build_teacher_grid(&self, teacher_id: &str) -> Result<TeacherTimetable, AppError> {
        if self.registry.teacher(teacher_id).await?.is_none() {
            return Err(AppError::NotFound(format!("teacher {}", teacher_id)));
        }
        let periods = self.store.list_by_teacher(teacher_id).await?;
        let grid = self.compose(periods);
        let free_periods = grid.free_slots();
        Ok(TeacherTimetable {
            teacher_id: teacher_id.to_string(),
            grid,
            free_periods,
        })
    }

    fn compose(&self, periods: Vec<Period>) -> Grid {
        let mut grid = Grid::empty(&self.config.teaching_days, self.config.periods_per_day);
        for period in periods {
            if let Err(stray) = grid.place(period) {
                warn!(
                    "period {} on {} lies outside the configured week; not shown",
                    stray.id,
                    stray.slot()
                );
            }
        }
        grid
    }
}
