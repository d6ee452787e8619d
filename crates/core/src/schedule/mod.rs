//! Schedule activities and the month x week Gantt grid.
//!
//! Grid positions are derived, never stored. A month is always four weeks
//! wide on the grid; this is a display convention, not calendar math.

pub mod error;
pub mod grid;
pub mod types;


pub use error::ScheduleError;
pub use grid::{
    activity_cells, bar_position, end_of, grid_cells, grid_start_month,
    group_activities_by_mayor, is_cell_filled,
};
pub use types::{
    ActivityWithGridCells, CreateActivityInput, GridCell, GridLayout, GridPosition,
    MAX_DURATION_WEEKS, MONTHS_PER_YEAR, ScheduleActivity, WEEKS_PER_MONTH, validate_month,
    validate_week,
};
