use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Teaching day. Ordered Monday first so `(day, period)` sorts day-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown teaching day: {0:?}")]
pub struct ParseDayError(pub String);

impl FromStr for Day {
    type Err = ParseDayError;

    /// Accepts the full English name or its three-letter abbreviation, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Day::ALL
            .into_iter()
            .find(|day| {
                let name = day.as_str().to_ascii_lowercase();
                name == needle || name[..3] == needle
            })
            .ok_or_else(|| ParseDayError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A `(day, period)` coordinate, independent of class or teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub day: Day,
    pub period: u8,
}

impl Slot {
    pub fn new(day: Day, period: u8) -> Self {
        Self { day, period }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} period {}", self.day, self.period)
    }
}

/// One occupied timetable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: Uuid,
    pub class_id: String,
    pub day: Day,
    pub period: u8,
    pub subject_id: String,
    pub teacher_id: String,
    pub room: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Period {
    pub fn new(
        class_id: impl Into<String>,
        day: Day,
        period: u8,
        subject_id: impl Into<String>,
        teacher_id: impl Into<String>,
        room: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            class_id: class_id.into(),
            day,
            period,
            subject_id: subject_id.into(),
            teacher_id: teacher_id.into(),
            room,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.period)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPeriodRequest {
    pub day: Day,
    pub period: u8,
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    #[serde(default)]
    pub room: Option<String>,
}

/// Body of an auto-generate call. Missing fields fall back to the
/// configured week shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoGenerateRequest {
    #[serde(default)]
    pub number_of_days: Option<u8>,
    #[serde(default)]
    pub periods_per_day: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub slots_filled: usize,
    pub slots_total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parses_names_and_abbreviations() {
        assert_eq!("Monday".parse::<Day>(), Ok(Day::Monday));
        assert_eq!("sat".parse::<Day>(), Ok(Day::Saturday));
        assert_eq!(" WED ".parse::<Day>(), Ok(Day::Wednesday));
        assert!("Sunday".parse::<Day>().is_err());
        assert!("mo".parse::<Day>().is_err());
    }

    #[test]
    fn test_day_order() {
        assert!(Day::Monday < Day::Saturday);
        assert!(Slot::new(Day::Monday, 8) < Slot::new(Day::Tuesday, 1));
    }

    #[test]
    fn test_day_serde_uses_full_name() {
        let json = serde_json::to_string(&Day::Thursday).unwrap();
        assert_eq!(json, "\"Thursday\"");
        let day: Day = serde_json::from_str("\"thu\"").unwrap();
        assert_eq!(day, Day::Thursday);
    }
}
