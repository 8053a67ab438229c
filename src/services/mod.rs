pub mod allocator;
pub mod finder;
pub mod generator;
pub mod timetable;
pub mod validator;
pub mod view;

pub use allocator::PeriodAllocator;
pub use finder::FreeTeacherFinder;
pub use generator::AutoGenerator;
pub use timetable::TimetableService;
pub use validator::{Conflict, ConflictValidator};
pub use view::TimetableViewComposer;
