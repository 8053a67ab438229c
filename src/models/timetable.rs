use serde::{Deserialize, Serialize};

use super::period::{Day, Period, Slot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Cell {
    Occupied { period: Period },
    Free,
}

impl Cell {
    pub fn period(&self) -> Option<&Period> {
        match self {
            Cell::Occupied { period } => Some(period),
            Cell::Free => None,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    pub day: Day,
    /// `cells[i]` is period `i + 1`.
    pub cells: Vec<Cell>,
}

/// Dense day × period grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub periods_per_day: u8,
    pub rows: Vec<GridRow>,
}

impl Grid {
    /// An all-free grid over `days` × `1..=periods_per_day`.
    pub fn empty(days: &[Day], periods_per_day: u8) -> Self {
        let rows = days
            .iter()
            .map(|&day| GridRow {
                day,
                cells: vec![Cell::Free; periods_per_day as usize],
            })
            .collect();
        Self {
            periods_per_day,
            rows,
        }
    }

    /// Puts `period` into its cell. Returns it back if the slot lies outside
    /// the grid.
    pub fn place(&mut self, period: Period) -> Result<(), Period> {
        let index = match (period.period as usize).checked_sub(1) {
            Some(i) if i < self.periods_per_day as usize => i,
            _ => return Err(period),
        };
        match self.rows.iter_mut().find(|row| row.day == period.day) {
            Some(row) => {
                row.cells[index] = Cell::Occupied { period };
                Ok(())
            }
            None => Err(period),
        }
    }

    pub fn cell(&self, day: Day, period: u8) -> Option<&Cell> {
        let row = self.rows.iter().find(|row| row.day == day)?;
        row.cells.get((period as usize).checked_sub(1)?)
    }

    pub fn occupied(&self) -> impl Iterator<Item = &Period> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter_map(Cell::period)
    }

    pub fn free_slots(&self) -> Vec<Slot> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.cells
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.is_free())
                    .map(move |(i, _)| Slot::new(row.day, i as u8 + 1))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTimetable {
    pub class_id: String,
    #[serde(flatten)]
    pub grid: Grid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherTimetable {
    pub teacher_id: String,
    #[serde(flatten)]
    pub grid: Grid,
    pub free_periods: Vec<Slot>,
}
