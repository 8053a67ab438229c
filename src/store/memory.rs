use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{StoreError, TimetableStore};
use crate::models::{Day, Period, Slot};

/// Slot-major index: slot -> owner (class or teacher) -> period id.
type SlotIndex = HashMap<Slot, HashMap<String, Uuid>>;

#[derive(Debug, Default)]
struct Indices {
    periods: HashMap<Uuid, Period>,
    by_class: SlotIndex,
    by_teacher: SlotIndex,
}

impl Indices {
    fn lookup(&self, index: &SlotIndex, owner: &str, slot: Slot) -> Option<Period> {
        let id = index.get(&slot)?.get(owner)?;
        self.periods.get(id).cloned()
    }

    fn ids_for(&self, index: &SlotIndex, owner: &str) -> Vec<Uuid> {
        index
            .values()
            .filter_map(|owners| owners.get(owner).copied())
            .collect()
    }

    fn collect_sorted(&self, ids: Vec<Uuid>) -> Vec<Period> {
        let mut periods: Vec<Period> = ids
            .iter()
            .filter_map(|id| self.periods.get(id).cloned())
            .collect();
        periods.sort_by_key(Period::slot);
        periods
    }

    fn link(&mut self, period: Period) {
        let slot = period.slot();
        self.by_class
            .entry(slot)
            .or_default()
            .insert(period.class_id.clone(), period.id);
        self.by_teacher
            .entry(slot)
            .or_default()
            .insert(period.teacher_id.clone(), period.id);
        self.periods.insert(period.id, period);
    }

    fn unlink(&mut self, id: Uuid) -> Option<Period> {
        let period = self.periods.remove(&id)?;
        let slot = period.slot();
        unlink_owner(&mut self.by_class, slot, &period.class_id);
        unlink_owner(&mut self.by_teacher, slot, &period.teacher_id);
        Some(period)
    }
}

fn unlink_owner(index: &mut SlotIndex, slot: Slot, owner: &str) {
    if let Some(owners) = index.get_mut(&slot) {
        owners.remove(owner);
        if owners.is_empty() {
            index.remove(&slot);
        }
    }
}

/// In-process store. All mutations happen under one write guard, so a
/// failed batch never leaves the indices half-updated.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Indices>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Indices>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Indices>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl TimetableStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Period>, StoreError> {
        Ok(self.read()?.periods.get(&id).cloned())
    }

    async fn get_by_class_slot(
        &self,
        class_id: &str,
        day: Day,
        period: u8,
    ) -> Result<Option<Period>, StoreError> {
        let inner = self.read()?;
        Ok(inner.lookup(&inner.by_class, class_id, Slot::new(day, period)))
    }

    async fn get_by_teacher_slot(
        &self,
        teacher_id: &str,
        day: Day,
        period: u8,
    ) -> Result<Option<Period>, StoreError> {
        let inner = self.read()?;
        Ok(inner.lookup(&inner.by_teacher, teacher_id, Slot::new(day, period)))
    }

    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Period>, StoreError> {
        let inner = self.read()?;
        let ids = inner.ids_for(&inner.by_class, class_id);
        Ok(inner.collect_sorted(ids))
    }

    async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<Period>, StoreError> {
        let inner = self.read()?;
        let ids = inner.ids_for(&inner.by_teacher, teacher_id);
        Ok(inner.collect_sorted(ids))
    }

    async fn teachers_busy_at(&self, day: Day, period: u8) -> Result<Vec<String>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .by_teacher
            .get(&Slot::new(day, period))
            .map(|owners| owners.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, period: Period) -> Result<Period, StoreError> {
        let mut inner = self.write()?;
        let slot = period.slot();
        if inner.lookup(&inner.by_class, &period.class_id, slot).is_some() {
            return Err(StoreError::ClassSlotTaken {
                class_id: period.class_id,
                day: period.day,
                period: period.period,
            });
        }
        if inner.lookup(&inner.by_teacher, &period.teacher_id, slot).is_some() {
            return Err(StoreError::TeacherSlotTaken {
                teacher_id: period.teacher_id,
                day: period.day,
                period: period.period,
            });
        }
        inner.link(period.clone());
        Ok(period)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.write()?.unlink(id).is_some())
    }

    async fn replace_all_for_class(
        &self,
        class_id: &str,
        periods: Vec<Period>,
    ) -> Result<usize, StoreError> {
        let mut inner = self.write()?;

        // Validate the whole batch against the post-clear state first.
        let mut class_slots = HashSet::new();
        for period in &periods {
            if period.class_id != class_id {
                return Err(StoreError::ForeignPeriod {
                    expected: class_id.to_string(),
                    found: period.class_id.clone(),
                });
            }
            let slot = period.slot();
            if !class_slots.insert(slot) {
                return Err(StoreError::ClassSlotTaken {
                    class_id: class_id.to_string(),
                    day: period.day,
                    period: period.period,
                });
            }
            let held_elsewhere = inner
                .lookup(&inner.by_teacher, &period.teacher_id, slot)
                .is_some_and(|holder| holder.class_id != class_id);
            if held_elsewhere {
                return Err(StoreError::TeacherSlotTaken {
                    teacher_id: period.teacher_id.clone(),
                    day: period.day,
                    period: period.period,
                });
            }
        }

        for id in inner.ids_for(&inner.by_class, class_id) {
            inner.unlink(id);
        }
        let committed = periods.len();
        for period in periods {
            inner.link(period);
        }
        Ok(committed)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.periods.len())
    }
}
