use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::TimetableConfig;
use crate::error::AppError;
use crate::models::{
    ClassTimetable, Day, FreeTeacherFilter, GenerationReport, NewPeriodRequest, Period,
    TeacherRecord, TeacherTimetable,
};
use crate::registry::Registry;
use crate::services::allocator::PeriodAllocator;
use crate::services::finder::FreeTeacherFinder;
use crate::services::generator::AutoGenerator;
use crate::services::view::TimetableViewComposer;
use crate::store::TimetableStore;

/// Entry point for every timetable operation.
///
/// Writes go through a single gate so each validate-then-write sequence is
/// atomic with respect to other writers. Reads never take it.
#[derive(Clone)]
pub struct TimetableService {
    store: Arc<dyn TimetableStore>,
    registry: Arc<dyn Registry>,
    config: Arc<TimetableConfig>,
    write_gate: Arc<Mutex<()>>,
}

impl TimetableService {
    pub fn new(
        store: Arc<dyn TimetableStore>,
        registry: Arc<dyn Registry>,
        config: TimetableConfig,
    ) -> Self {
        Self {
            store,
            registry,
            config: Arc::new(config),
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<dyn TimetableStore> {
        &self.store
    }

    pub async fn create_period(&self, req: NewPeriodRequest) -> Result<Period, AppError> {
        let _gate = self.write_gate.lock().await;
        self.allocator().create_period(req).await
    }

    pub async fn delete_period(&self, id: Uuid) -> Result<(), AppError> {
        let _gate = self.write_gate.lock().await;
        self.allocator().delete_period(id).await
    }

    /// `None` arguments default to the full configured week.
    pub async fn auto_generate(
        &self,
        class_id: &str,
        number_of_days: Option<u8>,
        periods_per_day: Option<u8>,
    ) -> Result<GenerationReport, AppError> {
        let number_of_days = number_of_days
            .unwrap_or_else(|| u8::try_from(self.config.teaching_days.len()).unwrap_or(u8::MAX));
        let periods_per_day = periods_per_day.unwrap_or(self.config.periods_per_day);

        let _gate = self.write_gate.lock().await;
        AutoGenerator::new(self.store.clone(), self.registry.clone(), self.config.clone())
            .auto_generate(class_id, number_of_days, periods_per_day)
            .await
    }

    pub async fn class_timetable(&self, class_id: &str) -> Result<ClassTimetable, AppError> {
        self.composer().build_class_grid(class_id).await
    }

    pub async fn teacher_timetable(&self, teacher_id: &str) -> Result<TeacherTimetable, AppError> {
        self.composer().build_teacher_grid(teacher_id).await
    }

    pub async fn find_free_teachers(
        &self,
        day: Day,
        period: u8,
        filter: &FreeTeacherFilter,
    ) -> Result<Vec<TeacherRecord>, AppError> {
        FreeTeacherFinder::new(self.store.clone(), self.registry.clone(), self.config.clone())
            .find_free_teachers(day, period, filter)
            .await
    }

    fn allocator(&self) -> PeriodAllocator {
        PeriodAllocator::new(self.store.clone(), self.registry.clone(), self.config.clone())
    }

    fn composer(&self) -> TimetableViewComposer {
        TimetableViewComposer::new(self.store.clone(), self.registry.clone(), self.config.clone())
    }
}
