//! Whole-grid auto-generation for one class.
//!
//! Slots are visited day-major, period-minor. Each slot takes the next
//! curriculum subject in round-robin order that still has weekly quota and a
//! qualified teacher who is not booked by another class at that slot. A slot
//! with no such pair stays free; partial fills are normal results.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::TimetableConfig;
use crate::error::AppError;
use crate::models::{Day, GenerationReport, Period};
use crate::registry::Registry;
use crate::services::validator::ConflictValidator;
use crate::store::TimetableStore;

/// One curriculum subject plus its running state for a generation run.
#[derive(Debug)]
struct SubjectPool {
    subject_id: String,
    teachers: Vec<String>,
    quota: Option<u32>,
    placed: u32,
    /// Teacher who already took this subject for the class in this run.
    preferred: Option<String>,
}

impl SubjectPool {
    fn exhausted(&self) -> bool {
        self.quota.is_some_and(|quota| self.placed >= quota)
    }

    fn candidates(&self) -> impl Iterator<Item = &String> {
        let preferred = self.preferred.as_ref();
        preferred
            .into_iter()
            .chain(self.teachers.iter().filter(move |t| Some(*t) != preferred))
    }
}

pub struct AutoGenerator {
    store: Arc<dyn TimetableStore>,
    registry: Arc<dyn Registry>,
    config: Arc<TimetableConfig>,
}

impl AutoGenerator {
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

    /// Replaces every period of `class_id` with a freshly generated grid
    /// over the first `number_of_days` teaching days.
    pub async fn auto_generate(
        &self,
        class_id: &str,
        number_of_days: u8,
        periods_per_day: u8,
    ) -> Result<GenerationReport, AppError> {
        let max_days = self.config.teaching_days.len();
        if number_of_days == 0 || number_of_days as usize > max_days {
            return Err(AppError::validation(
                "number_of_days",
                format!("{} is outside 1..={}", number_of_days, max_days),
            ));
        }
        if periods_per_day == 0 || periods_per_day > self.config.periods_per_day {
            return Err(AppError::validation(
                "periods_per_day",
                format!(
                    "{} is outside 1..={}",
                    periods_per_day, self.config.periods_per_day
                ),
            ));
        }

        let class = self
            .registry
            .class(class_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("class {}", class_id)))?;

        let mut pools = Vec::with_capacity(class.curriculum.len());
        for entry in &class.curriculum {
            match self.registry.subject(&entry.subject_id).await? {
                Some(subject) => pools.push(SubjectPool {
                    subject_id: subject.id,
                    teachers: subject.teachers,
                    quota: entry.weekly_periods,
                    placed: 0,
                    preferred: None,
                }),
                None => warn!(
                    "class {} curriculum lists unknown subject {}; skipping it",
                    class_id, entry.subject_id
                ),
            }
        }

        let days = &self.config.teaching_days[..number_of_days as usize];
        let slots_total = days.len() * periods_per_day as usize;
        let validator = ConflictValidator::new(self.store.clone());

        let mut generated = Vec::with_capacity(slots_total);
        let mut cursor = 0;
        for &day in days {
            for period in 1..=periods_per_day {
                match pick(&validator, class_id, &mut pools, cursor, day, period).await? {
                    Some((index, teacher_id)) => {
                        debug!(
                            "class {} {} period {}: {} with {}",
                            class_id, day, period, pools[index].subject_id, teacher_id
                        );
                        generated.push(Period::new(
                            class_id,
                            day,
                            period,
                            pools[index].subject_id.clone(),
                            teacher_id,
                            class.room.clone(),
                        ));
                        cursor = (index + 1) % pools.len();
                    }
                    None => debug!(
                        "class {} {} period {}: no free qualified teacher, leaving slot free",
                        class_id, day, period
                    ),
                }
            }
        }

        let slots_filled = self.store.replace_all_for_class(class_id, generated).await?;
        if slots_filled < slots_total {
            warn!(
                "auto-generate for class {} left {} of {} slots free",
                class_id,
                slots_total - slots_filled,
                slots_total
            );
        }
        info!(
            "auto-generated timetable for class {}: {}/{} slots filled",
            class_id, slots_filled, slots_total
        );

        Ok(GenerationReport {
            slots_filled,
            slots_total,
        })
    }
}

/// Round-robin from `cursor`; returns the pool index and chosen teacher.
async fn pick(
    validator: &ConflictValidator,
    class_id: &str,
    pools: &mut [SubjectPool],
    cursor: usize,
    day: Day,
    period: u8,
) -> Result<Option<(usize, String)>, AppError> {
    let count = pools.len();
    for offset in 0..count {
        let index = (cursor + offset) % count;
        let pool = &pools[index];
        if pool.exhausted() {
            continue;
        }

        let mut chosen = None;
        for teacher_id in pool.candidates() {
            if validator
                .teacher_free_for(class_id, teacher_id, day, period)
                .await?
            {
                chosen = Some(teacher_id.clone());
                break;
            }
        }

        if let Some(teacher_id) = chosen {
            let pool = &mut pools[index];
            pool.placed += 1;
            pool.preferred = Some(teacher_id.clone());
            return Ok(Some((index, teacher_id)));
        }
    }
    Ok(None)
}
