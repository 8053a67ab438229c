//! Class, subject and teacher registries.
//!
//! Records are owned by the surrounding school application. The engine only
//! reads them: to validate ids on manual allocation, to fetch curricula and
//! teacher pools for auto-generation, and to decorate free-teacher results.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::error::AppError;
use crate::models::{ClassRecord, SubjectRecord, TeacherRecord};

#[async_trait]
pub trait Registry: Send + Sync {
    async fn class(&self, class_id: &str) -> Result<Option<ClassRecord>, AppError>;
    async fn subject(&self, subject_id: &str) -> Result<Option<SubjectRecord>, AppError>;
    async fn teacher(&self, teacher_id: &str) -> Result<Option<TeacherRecord>, AppError>;
    /// Every teacher in the school, sorted by id.
    async fn teachers(&self) -> Result<Vec<TeacherRecord>, AppError>;
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse registry file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {kind} id: {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("{owner} references unknown {kind} {id}")]
    Dangling {
        owner: String,
        kind: &'static str,
        id: String,
    },
}

/// On-disk shape of the registry seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySeed {
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub subjects: Vec<SubjectRecord>,
    #[serde(default)]
    pub teachers: Vec<TeacherRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    classes: HashMap<String, ClassRecord>,
    subjects: HashMap<String, SubjectRecord>,
    teachers: BTreeMap<String, TeacherRecord>,
}

impl InMemoryRegistry {
    /// Builds a registry, rejecting duplicate ids and references to
    /// subjects or teachers that do not exist.
    pub fn from_seed(seed: RegistrySeed) -> Result<Self, RegistryError> {
        let mut registry = Self::default();

        for teacher in seed.teachers {
            if registry.teachers.contains_key(&teacher.id) {
                return Err(RegistryError::Duplicate { kind: "teacher", id: teacher.id });
            }
            registry.teachers.insert(teacher.id.clone(), teacher);
        }

        for subject in seed.subjects {
            if registry.subjects.contains_key(&subject.id) {
                return Err(RegistryError::Duplicate { kind: "subject", id: subject.id });
            }
            if let Some(missing) = subject
                .teachers
                .iter()
                .find(|t| !registry.teachers.contains_key(*t))
            {
                return Err(RegistryError::Dangling {
                    owner: format!("subject {}", subject.id),
                    kind: "teacher",
                    id: missing.clone(),
                });
            }
            registry.subjects.insert(subject.id.clone(), subject);
        }

        for class in seed.classes {
            if registry.classes.contains_key(&class.id) {
                return Err(RegistryError::Duplicate { kind: "class", id: class.id });
            }
            let mut seen = HashSet::new();
            for entry in &class.curriculum {
                if !registry.subjects.contains_key(&entry.subject_id) {
                    return Err(RegistryError::Dangling {
                        owner: format!("class {}", class.id),
                        kind: "subject",
                        id: entry.subject_id.clone(),
                    });
                }
                if !seen.insert(entry.subject_id.as_str()) {
                    return Err(RegistryError::Duplicate {
                        kind: "curriculum subject",
                        id: entry.subject_id.clone(),
                    });
                }
            }
            registry.classes.insert(class.id.clone(), class);
        }

        Ok(registry)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let seed: RegistrySeed = serde_json::from_str(&raw)?;
        let registry = Self::from_seed(seed)?;
        info!(
            "loaded registry from {}: {} classes, {} subjects, {} teachers",
            path.display(),
            registry.classes.len(),
            registry.subjects.len(),
            registry.teachers.len()
        );
        Ok(registry)
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn class(&self, class_id: &str) -> Result<Option<ClassRecord>, AppError> {
        Ok(self.classes.get(class_id).cloned())
    }

    async fn subject(&self, subject_id: &str) -> Result<Option<SubjectRecord>, AppError> {
        Ok(self.subjects.get(subject_id).cloned())
    }

    async fn teacher(&self, teacher_id: &str) -> Result<Option<TeacherRecord>, AppError> {
        Ok(self.teachers.get(teacher_id).cloned())
    }

    async fn teachers(&self) -> Result<Vec<TeacherRecord>, AppError> {
        Ok(self.teachers.values().cloned().collect())
    }
}
