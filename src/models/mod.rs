pub mod period;
pub mod school;
pub mod timetable;

pub use period::{AutoGenerateRequest, Day, GenerationReport, NewPeriodRequest, ParseDayError, Period, Slot};
pub use school::{ClassRecord, CurriculumEntry, FreeTeacherFilter, SubjectRecord, TeacherRecord};
pub use timetable::{Cell, ClassTimetable, Grid, GridRow, TeacherTimetable};
