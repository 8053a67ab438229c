use serde::{Deserialize, Serialize};

/// One subject in a class's curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumEntry {
    pub subject_id: String,
    /// Upper bound on weekly periods; `None` means round-robin without a cap.
    #[serde(default)]
    pub weekly_periods: Option<u32>,
}

impl CurriculumEntry {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            weekly_periods: None,
        }
    }

    pub fn with_quota(subject_id: impl Into<String>, weekly_periods: u32) -> Self {
        Self {
            subject_id: subject_id.into(),
            weekly_periods: Some(weekly_periods),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: String,
    pub name: String,
    /// Home room assigned to generated periods.
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub curriculum: Vec<CurriculumEntry>,
}

impl ClassRecord {
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        name: impl Into<String>,
        subjects: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            room: None,
            curriculum: subjects.into_iter().map(CurriculumEntry::new).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: String,
    pub name: String,
    /// Teachers qualified to teach this subject.
    #[serde(default)]
    pub teachers: Vec<String>,
}

impl SubjectRecord {
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        name: impl Into<String>,
        teachers: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            teachers: teachers.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
}

impl TeacherRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: None,
            specializations: Vec::new(),
        }
    }

    pub fn in_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn specializing_in(mut self, subject_id: impl Into<String>) -> Self {
        self.specializations.push(subject_id.into());
        self
    }
}

/// Narrowing filters for the free-teacher query. Applied after availability
/// has been computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTeacherFilter {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl FreeTeacherFilter {
    pub fn matches(&self, teacher: &TeacherRecord) -> bool {
        let department_ok = match &self.department {
            Some(wanted) => teacher
                .department
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(wanted)),
            None => true,
        };
        let subject_ok = match &self.subject {
            Some(wanted) => teacher.specializations.iter().any(|s| s == wanted),
            None => true,
        };
        department_ok && subject_ok
    }
}
