use crate::services::TimetableService;

#[derive(Clone)]
pub struct AppState {
    pub timetable: TimetableService,
}
