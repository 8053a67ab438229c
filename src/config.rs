//! Runtime configuration.
//!
//! Everything comes from environment variables (a `.env` file is loaded by
//! the binary first):
//!
//! | Variable          | Default                   |
//! |-------------------|---------------------------|
//! | `DATABASE_URL`    | `sqlite://timetable.db`   |
//! | `BIND_ADDR`       | `127.0.0.1:3000`          |
//! | `REGISTRY_PATH`   | `registry.json`           |
//! | `TEACHING_DAYS`   | `Monday,...,Saturday`     |
//! | `PERIODS_PER_DAY` | `8`                       |
//!
//! `DATABASE_URL=memory` keeps periods in process memory only.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::error::AppError;
use crate::models::Day;

pub const DEFAULT_PERIODS_PER_DAY: u8 = 8;
pub const MAX_PERIODS_PER_DAY: u8 = 16;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Shape of the teaching week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableConfig {
    /// Distinct, in week order.
    pub teaching_days: Vec<Day>,
    pub periods_per_day: u8,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            teaching_days: Day::ALL.to_vec(),
            periods_per_day: DEFAULT_PERIODS_PER_DAY,
        }
    }
}

impl TimetableConfig {
    pub fn new(mut teaching_days: Vec<Day>, periods_per_day: u8) -> Self {
        teaching_days.sort();
        teaching_days.dedup();
        Self {
            teaching_days,
            periods_per_day,
        }
    }

    pub fn is_teaching_day(&self, day: Day) -> bool {
        self.teaching_days.contains(&day)
    }

    /// Rejects a `(day, period)` outside the configured week.
    pub fn check_slot(&self, day: Day, period: u8) -> Result<(), AppError> {
        if !self.is_teaching_day(day) {
            return Err(AppError::validation(
                "day",
                format!("{} is not a teaching day", day),
            ));
        }
        if period < 1 || period > self.periods_per_day {
            return Err(AppError::validation(
                "period",
                format!("{} is outside 1..={}", period, self.periods_per_day),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub bind_addr: SocketAddr,
    pub registry_path: PathBuf,
    pub timetable: TimetableConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests never touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://timetable.db".to_string());
        let store = if database_url.eq_ignore_ascii_case("memory") {
            StoreBackend::Memory
        } else {
            StoreBackend::Sqlite(database_url)
        };

        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let bind_addr = raw_addr.parse::<SocketAddr>().map_err(|e| ConfigError {
            var: "BIND_ADDR",
            value: raw_addr.clone(),
            reason: e.to_string(),
        })?;

        let registry_path = lookup("REGISTRY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("registry.json"));

        let teaching_days = match lookup("TEACHING_DAYS") {
            Some(raw) => parse_days(&raw)?,
            None => Day::ALL.to_vec(),
        };

        let periods_per_day = match lookup("PERIODS_PER_DAY") {
            Some(raw) => parse_periods_per_day(&raw)?,
            None => DEFAULT_PERIODS_PER_DAY,
        };

        Ok(Self {
            store,
            bind_addr,
            registry_path,
            timetable: TimetableConfig::new(teaching_days, periods_per_day),
        })
    }
}

fn parse_days(raw: &str) -> Result<Vec<Day>, ConfigError> {
    let days = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.parse::<Day>().map_err(|e| ConfigError {
                var: "TEACHING_DAYS",
                value: raw.to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if days.is_empty() {
        return Err(ConfigError {
            var: "TEACHING_DAYS",
            value: raw.to_string(),
            reason: "at least one teaching day is required".to_string(),
        });
    }
    Ok(days)
}

fn parse_periods_per_day(raw: &str) -> Result<u8, ConfigError> {
    let invalid = |reason: String| ConfigError {
        var: "PERIODS_PER_DAY",
        value: raw.to_string(),
        reason,
    };
    let value = raw
        .trim()
        .parse::<u8>()
        .map_err(|e| invalid(e.to_string()))?;
    if value == 0 || value > MAX_PERIODS_PER_DAY {
        return Err(invalid(format!("must be within 1..={}", MAX_PERIODS_PER_DAY)));
    }
    Ok(value)
}
