//! Subject colours for timetable displays.
//!
//! Purely presentational: a colour is derived from the subject id on every
//! response and never stored.

use std::collections::BTreeMap;

use crate::models::Period;

pub const PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f",
    "#edc948", "#b07aa1", "#ff9da7", "#9c755f", "#bab0ac",
];

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a, so the colour is stable across processes and releases.
pub fn subject_color(subject_id: &str) -> &'static str {
    let hash = subject_id
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    PALETTE[(hash % PALETTE.len() as u64) as usize]
}

/// Colour for every subject that appears in `periods`.
pub fn legend<'a>(periods: impl IntoIterator<Item = &'a Period>) -> BTreeMap<String, &'static str> {
    periods
        .into_iter()
        .map(|p| (p.subject_id.clone(), subject_color(&p.subject_id)))
        .collect()
}
