use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, TimetableStore};
use crate::models::{Day, Period};

macro_rules! select_periods {
    ($filter:literal) => {
        concat!(
            "SELECT id, class_id, day, period, subject_id, teacher_id, room, created_at, updated_at FROM periods ",
            $filter
        )
    };
}

#[derive(Debug, FromRow)]
struct PeriodRow {
    id: String,
    class_id: String,
    day: String,
    period: i64,
    subject_id: String,
    teacher_id: String,
    room: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PeriodRow> for Period {
    type Error = StoreError;

    fn try_from(row: PeriodRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Corrupt(format!("id {:?}: {}", row.id, e)))?;
        let day = Day::from_str(&row.day)
            .map_err(|e| StoreError::Corrupt(format!("period {}: {}", id, e)))?;
        let period = u8::try_from(row.period).map_err(|_| {
            StoreError::Corrupt(format!("period {}: slot number {} out of range", id, row.period))
        })?;

        Ok(Period {
            id,
            class_id: row.class_id,
            day,
            period,
            subject_id: row.subject_id,
            teacher_id: row.teacher_id,
            room: row.room,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_periods(rows: Vec<PeriodRow>) -> Result<Vec<Period>, StoreError> {
    let mut periods = rows
        .into_iter()
        .map(Period::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    // `day` is stored as text, so order in Rust rather than SQL.
    periods.sort_by_key(Period::slot);
    Ok(periods)
}

/// Turns a unique-index violation back into the slot conflict it encodes.
fn map_write_error(err: sqlx::Error, period: &Period) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("periods.teacher_id") {
                return StoreError::TeacherSlotTaken {
                    teacher_id: period.teacher_id.clone(),
                    day: period.day,
                    period: period.period,
                };
            }
            if message.contains("periods.class_id") {
                return StoreError::ClassSlotTaken {
                    class_id: period.class_id.clone(),
                    day: period.day,
                    period: period.period,
                };
            }
        }
    }
    StoreError::Database(err)
}

async fn insert_row<'e, E>(executor: E, period: &Period) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO periods
            (id, class_id, day, period, subject_id, teacher_id, room, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(period.id.to_string())
    .bind(&period.class_id)
    .bind(period.day.as_str())
    .bind(i64::from(period.period))
    .bind(&period.subject_id)
    .bind(&period.teacher_id)
    .bind(&period.room)
    .bind(period.created_at)
    .bind(period.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// SQLite-backed store. The two slot indices are unique indices on the
/// `periods` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `database_url` and applies migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::migrated(pool).await
    }

    /// Private in-memory database on a single pinned connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::migrated(pool).await
    }

    pub async fn migrated(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl TimetableStore for SqliteStore {
    async fn get(&self, id: Uuid) -> Result<Option<Period>, StoreError> {
        sqlx::query_as::<_, PeriodRow>(select_periods!("WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Period::try_from)
            .transpose()
    }

    async fn get_by_class_slot(
        &self,
        class_id: &str,
        day: Day,
        period: u8,
    ) -> Result<Option<Period>, StoreError> {
        sqlx::query_as::<_, PeriodRow>(select_periods!(
            "WHERE class_id = ?1 AND day = ?2 AND period = ?3"
        ))
        .bind(class_id)
        .bind(day.as_str())
        .bind(i64::from(period))
        .fetch_optional(&self.pool)
        .await?
        .map(Period::try_from)
        .transpose()
    }

    async fn get_by_teacher_slot(
        &self,
        teacher_id: &str,
        day: Day,
        period: u8,
    ) -> Result<Option<Period>, StoreError> {
        sqlx::query_as::<_, PeriodRow>(select_periods!(
            "WHERE teacher_id = ?1 AND day = ?2 AND period = ?3"
        ))
        .bind(teacher_id)
        .bind(day.as_str())
        .bind(i64::from(period))
        .fetch_optional(&self.pool)
        .await?
        .map(Period::try_from)
        .transpose()
    }

    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Period>, StoreError> {
        let rows = sqlx::query_as::<_, PeriodRow>(select_periods!("WHERE class_id = ?1"))
            .bind(class_id)
            .fetch_all(&self.pool)
            .await?;
        into_periods(rows)
    }

    async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<Period>, StoreError> {
        let rows = sqlx::query_as::<_, PeriodRow>(select_periods!("WHERE teacher_id = ?1"))
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await?;
        into_periods(rows)
    }

    async fn teachers_busy_at(&self, day: Day, period: u8) -> Result<Vec<String>, StoreError> {
        let teachers = sqlx::query_scalar::<_, String>(
            "SELECT teacher_id FROM periods WHERE day = ?1 AND period = ?2",
        )
        .bind(day.as_str())
        .bind(i64::from(period))
        .fetch_all(&self.pool)
        .await?;
        Ok(teachers)
    }

    async fn insert(&self, period: Period) -> Result<Period, StoreError> {
        insert_row(&self.pool, &period)
            .await
            .map_err(|e| map_write_error(e, &period))?;
        Ok(period)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = sqlx::query("DELETE FROM periods WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    async fn replace_all_for_class(
        &self,
        class_id: &str,
        periods: Vec<Period>,
    ) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        let cleared = sqlx::query("DELETE FROM periods WHERE class_id = ?1")
            .bind(class_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for period in &periods {
            if period.class_id != class_id {
                return Err(StoreError::ForeignPeriod {
                    expected: class_id.to_string(),
                    found: period.class_id.clone(),
                });
            }
            insert_row(&mut *tx, period)
                .await
                .map_err(|e| map_write_error(e, period))?;
        }

        tx.commit().await?;
        debug!(
            "replaced {} periods of class {} with {}",
            cleared,
            class_id,
            periods.len()
        );
        Ok(periods.len())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM periods")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("select 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_store() -> SqliteStore {
        SqliteStore::in_memory()
            .await
            .expect("Failed to create test db")
    }

    fn period(class_id: &str, day: Day, slot: u8, teacher_id: &str) -> Period {
        Period::new(class_id, day, slot, "math", teacher_id, Some("101".to_string()))
    }

    #[tokio::test]
    async fn test_insert_and_fetch_period() {
        let store = setup_test_store().await;
        let created = store
            .insert(period("C1", Day::Wednesday, 2, "T1"))
            .await
            .expect("Failed to insert period");

        let fetched = store
            .get(created.id)
            .await
            .expect("Failed to fetch period")
            .expect("Period not found");
        assert_eq!(fetched.class_id, "C1");
        assert_eq!(fetched.day, Day::Wednesday);
        assert_eq!(fetched.period, 2);
        assert_eq!(fetched.room.as_deref(), Some("101"));

        let by_teacher = store
            .get_by_teacher_slot("T1", Day::Wednesday, 2)
            .await
            .unwrap()
            .expect("teacher index miss");
        assert_eq!(by_teacher.id, created.id);
        assert_eq!(store.teachers_busy_at(Day::Wednesday, 2).await.unwrap(), vec!["T1"]);
    }

    #[tokio::test]
    async fn test_unique_indices_map_to_slot_errors() {
        let store = setup_test_store().await;
        store.insert(period("C1", Day::Monday, 1, "T1")).await.unwrap();

        let class_clash = store.insert(period("C1", Day::Monday, 1, "T2")).await;
        assert!(matches!(class_clash, Err(StoreError::ClassSlotTaken { .. })));

        let teacher_clash = store.insert(period("C2", Day::Monday, 1, "T1")).await;
        assert!(matches!(teacher_clash, Err(StoreError::TeacherSlotTaken { .. })));

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_period() {
        let store = setup_test_store().await;
        let created = store.insert(period("C1", Day::Monday, 1, "T1")).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_by_class_orders_by_week() {
        let store = setup_test_store().await;
        store.insert(period("C1", Day::Saturday, 1, "T1")).await.unwrap();
        store.insert(period("C1", Day::Monday, 5, "T1")).await.unwrap();
        store.insert(period("C1", Day::Monday, 2, "T2")).await.unwrap();

        let days: Vec<(Day, u8)> = store
            .list_by_class("C1")
            .await
            .unwrap()
            .iter()
            .map(|p| (p.day, p.period))
            .collect();
        assert_eq!(
            days,
            vec![(Day::Monday, 2), (Day::Monday, 5), (Day::Saturday, 1)]
        );
    }

    #[tokio::test]
    async fn test_replace_is_transactional() {
        let store = setup_test_store().await;
        let original = store.insert(period("C1", Day::Monday, 1, "T1")).await.unwrap();
        store.insert(period("C2", Day::Monday, 2, "T2")).await.unwrap();

        let clashing = vec![
            period("C1", Day::Monday, 1, "T3"),
            period("C1", Day::Monday, 2, "T2"),
        ];
        let result = store.replace_all_for_class("C1", clashing).await;
        assert!(matches!(result, Err(StoreError::TeacherSlotTaken { .. })));

        let remaining = store.list_by_class("C1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, original.id);

        let committed = store
            .replace_all_for_class("C1", vec![period("C1", Day::Tuesday, 1, "T1")])
            .await
            .unwrap();
        assert_eq!(committed, 1);
        assert!(store.get(original.id).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
