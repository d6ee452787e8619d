//! Schedule data types.

use obra_shared::types::{ActivityId, MayorId};
use serde::{Deserialize, Serialize};

use super::error::ScheduleError;

/// Columns per month on the grid.
pub const WEEKS_PER_MONTH: u32 = 4;

/// Months per grid year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Longest accepted activity: ten grid years.
pub const MAX_DURATION_WEEKS: u32 = 10 * MONTHS_PER_YEAR * WEEKS_PER_MONTH;

/// An activity of a classification group with absolute start and duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleActivity {
    /// Activity ID.
    pub id: ActivityId,
    /// Owning classification group.
    pub mayor_id: MayorId,
    /// Activity name.
    pub name: String,
    /// Calendar month the activity starts in, 1-12.
    pub start_month: u32,
    /// Week of `start_month`, 1-4.
    pub start_week: u32,
    /// Calendar month of the last occupied week.
    pub end_month: u32,
    /// Week of `end_month`.
    pub end_week: u32,
    /// Length in grid weeks.
    pub duration_weeks: u32,
}

/// A `(month, week)` coordinate.
///
/// [`activity_cells`](super::activity_cells) yields calendar months; the cells
/// of an [`ActivityWithGridCells`] use grid columns counted from the base month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// Month, 1-12.
    pub month: u32,
    /// Week within the month, 1-4.
    pub week: u32,
}

/// An activity with the cells it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityWithGridCells {
    /// The activity.
    pub activity: ScheduleActivity,
    /// Column month of the start relative to the base month, 1-12.
    pub grid_start_month: u32,
    /// Occupied grid cells in walk order, months relative to the base month.
    pub cells: Vec<GridCell>,
}

/// Pixel sizes of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Width of one week column.
    pub week_width_px: u32,
    /// Minimum width of a bar.
    pub min_width_px: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            week_width_px: 32,
            min_width_px: 24,
        }
    }
}

/// Horizontal placement of an activity bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridPosition {
    /// Left offset.
    pub start_px: u32,
    /// Bar width.
    pub width_px: u32,
}

/// Input for creating an activity. The end is derived from the duration.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivityInput {
    /// Owning classification group.
    pub mayor_id: MayorId,
    /// Activity name.
    pub name: String,
    /// Start month, 1-12.
    pub start_month: u32,
    /// Start week, 1-4.
    pub start_week: u32,
    /// Length in grid weeks, 1 to [`MAX_DURATION_WEEKS`].
    pub duration_weeks: u32,
}

impl CreateActivityInput {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns the first `ScheduleError` found among name, month, week and duration.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.name.trim().is_empty() {
            return Err(ScheduleError::EmptyName);
        }
        validate_month(self.start_month)?;
        validate_week(self.start_week)?;
        if !(1..=MAX_DURATION_WEEKS).contains(&self.duration_weeks) {
            return Err(ScheduleError::InvalidDuration(i64::from(self.duration_weeks)));
        }
        Ok(())
    }
}

/// Checks a calendar month.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidMonth` outside 1..=12.
pub fn validate_month(month: u32) -> Result<(), ScheduleError> {
    if (1..=MONTHS_PER_YEAR).contains(&month) {
        Ok(())
    } else {
        Err(ScheduleError::InvalidMonth(i64::from(month)))
    }
}

/// Checks a week of the month.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidWeek` outside 1..=4.
pub fn validate_week(week: u32) -> Result<(), ScheduleError> {
    if (1..=WEEKS_PER_MONTH).contains(&week) {
        Ok(())
    } else {
        Err(ScheduleError::InvalidWeek(i64::from(week)))
    }
}
