#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use timetable::config::TimetableConfig;
use timetable::models::{ClassRecord, Day, NewPeriodRequest, Period, SubjectRecord, TeacherRecord};
use timetable::registry::{InMemoryRegistry, RegistrySeed};
use timetable::services::TimetableService;
use timetable::store::TimetableStore;

/// Four classes, three subjects, five teachers. T5 teaches nothing.
pub fn school_seed() -> RegistrySeed {
    RegistrySeed {
        classes: ["C1", "C2", "C3", "C4"]
            .into_iter()
            .map(|id| ClassRecord::new(id, format!("Class {}", id), ["math", "eng", "sci"]))
            .collect(),
        subjects: vec![
            SubjectRecord::new("math", "Mathematics", ["T1", "T4"]),
            SubjectRecord::new("eng", "English", ["T2"]),
            SubjectRecord::new("sci", "Science", ["T3", "T4"]),
        ],
        teachers: vec![
            TeacherRecord::new("T1", "Ito").in_department("Science").specializing_in("math"),
            TeacherRecord::new("T2", "Sato").in_department("Languages").specializing_in("eng"),
            TeacherRecord::new("T3", "Kato").in_department("Science").specializing_in("sci"),
            TeacherRecord::new("T4", "Mori")
                .in_department("Science")
                .specializing_in("math")
                .specializing_in("sci"),
            TeacherRecord::new("T5", "Abe").in_department("Arts"),
        ],
    }
}

pub fn service(store: Arc<dyn TimetableStore>) -> TimetableService {
    let registry = InMemoryRegistry::from_seed(school_seed()).expect("valid seed");
    TimetableService::new(store, Arc::new(registry), TimetableConfig::default())
}

pub fn request(day: Day, period: u8, class_id: &str, subject_id: &str, teacher_id: &str) -> NewPeriodRequest {
    NewPeriodRequest {
        day,
        period,
        class_id: class_id.to_string(),
        subject_id: subject_id.to_string(),
        teacher_id: teacher_id.to_string(),
        room: None,
    }
}

/// Panics if any two periods share a class slot or a teacher slot.
pub fn assert_no_conflicts(periods: &[Period]) {
    let mut class_slots = HashSet::new();
    let mut teacher_slots = HashSet::new();
    for p in periods {
        assert!(
            class_slots.insert((p.class_id.clone(), p.day, p.period)),
            "class {} double-booked on {} period {}",
            p.class_id,
            p.day,
            p.period
        );
        assert!(
            teacher_slots.insert((p.teacher_id.clone(), p.day, p.period)),
            "teacher {} double-booked on {} period {}",
            p.teacher_id,
            p.day,
            p.period
        );
    }
}

pub async fn all_periods(store: &Arc<dyn TimetableStore>) -> Vec<Period> {
    let mut periods = Vec::new();
    for class_id in ["C1", "C2", "C3", "C4"] {
        periods.extend(store.list_by_class(class_id).await.expect("list periods"));
    }
    periods
}
