//! Conflict-free timetable scheduling for a school.
//!
//! Periods assign a `(class, day, period)` slot to a subject, teacher and
//! room. The engine keeps two invariants over every stored period: no class
//! and no teacher is booked twice in the same `(day, period)`.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod services;
pub mod state;
pub mod store;
