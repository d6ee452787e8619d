//! Grid math for the schedule view.

use std::collections::BTreeMap;

use obra_shared::types::MayorId;

use super::types::{
    ActivityWithGridCells, GridCell, GridLayout, GridPosition, MONTHS_PER_YEAR, ScheduleActivity,
    WEEKS_PER_MONTH,
};

/// Column month of `start_month` when the grid starts at `base_month`.
///
/// Starts before the base month belong to the following year.
#[must_use]
pub fn grid_start_month(start_month: u32, base_month: u32) -> u32 {
    let relative = i64::from(start_month) - i64::from(base_month) + 1;
    let wrapped = if relative <= 0 {
        relative + i64::from(MONTHS_PER_YEAR)
    } else {
        relative
    };
    u32::try_from(wrapped).unwrap_or(1)
}

fn next_week(cell: GridCell) -> GridCell {
    if cell.week < WEEKS_PER_MONTH {
        GridCell {
            month: cell.month,
            week: cell.week + 1,
        }
    } else {
        GridCell {
            month: cell.month % MONTHS_PER_YEAR + 1,
            week: 1,
        }
    }
}

/// Calendar cells covered by `duration_weeks` weeks from
/// `(start_month, start_week)`.
///
/// Months wrap from 12 to 1. A run longer than a year covers every cell once.
#[must_use]
pub fn activity_cells(start_month: u32, start_week: u32, duration_weeks: u32) -> Vec<GridCell> {
    let steps = duration_weeks.min(MONTHS_PER_YEAR * WEEKS_PER_MONTH);
    let mut cells = Vec::with_capacity(steps as usize);
    let mut cell = GridCell {
        month: start_month,
        week: start_week,
    };
    for _ in 0..steps {
        cells.push(cell);
        cell = next_week(cell);
    }
    cells
}

/// Month and week of the last occupied cell.
#[must_use]
pub fn end_of(start_month: u32, start_week: u32, duration_weeks: u32) -> (u32, u32) {
    let weeks = u64::from(WEEKS_PER_MONTH);
    let offset = u64::from(start_week.saturating_sub(1)) + u64::from(duration_weeks.max(1)) - 1;
    let month =
        (u64::from(start_month.saturating_sub(1)) + offset / weeks) % u64::from(MONTHS_PER_YEAR);
    let week = offset % weeks;
    (
        u32::try_from(month + 1).unwrap_or(1),
        u32::try_from(week + 1).unwrap_or(1),
    )
}

/// Cells of an activity in grid coordinates: months are columns counted from
/// `base_month`, wrapped the same way as [`grid_start_month`].
#[must_use]
pub fn grid_cells(activity: &ScheduleActivity, base_month: u32) -> Vec<GridCell> {
    activity_cells(
        activity.start_month,
        activity.start_week,
        activity.duration_weeks,
    )
    .into_iter()
    .map(|cell| GridCell {
        month: grid_start_month(cell.month, base_month),
        week: cell.week,
    })
    .collect()
}

/// Partitions activities by classification group and computes their grid cells.
#[must_use]
pub fn group_activities_by_mayor(
    activities: &[ScheduleActivity],
    base_month: u32,
) -> BTreeMap<MayorId, Vec<ActivityWithGridCells>> {
    let mut grouped: BTreeMap<MayorId, Vec<ActivityWithGridCells>> = BTreeMap::new();
    for activity in activities {
        let entry = ActivityWithGridCells {
            grid_start_month: grid_start_month(activity.start_month, base_month),
            cells: grid_cells(activity, base_month),
            activity: activity.clone(),
        };
        grouped.entry(activity.mayor_id).or_default().push(entry);
    }
    grouped
}

/// Whether the grid cell `(month, week)` is one of `cells`.
#[must_use]
pub fn is_cell_filled(month: u32, week: u32, cells: &[GridCell]) -> bool {
    cells.iter().any(|c| c.month == month && c.week == week)
}

/// Left offset and width of an activity bar.
#[must_use]
pub fn bar_position(entry: &ActivityWithGridCells, layout: &GridLayout) -> GridPosition {
    let week_offset = entry
        .grid_start_month
        .saturating_sub(1)
        .saturating_mul(WEEKS_PER_MONTH)
        .saturating_add(entry.activity.start_week.saturating_sub(1));
    GridPosition {
        start_px: week_offset.saturating_mul(layout.week_width_px),
        width_px: entry
            .activity
            .duration_weeks
            .saturating_mul(layout.week_width_px)
            .max(layout.min_width_px),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obra_shared::types::ActivityId;
    use rstest::rstest;

    fn activity(
        mayor_id: MayorId,
        start_month: u32,
        start_week: u32,
        weeks: u32,
    ) -> ScheduleActivity {
        let (end_month, end_week) = end_of(start_month, start_week, weeks);
        ScheduleActivity {
            id: ActivityId::new(),
            mayor_id,
            name: "Excavación".to_string(),
            start_month,
            start_week,
            end_month,
            end_week,
            duration_weeks: weeks,
        }
    }

    #[rstest]
    #[case(1, 1, 1)]
    #[case(5, 1, 5)]
    #[case(12, 1, 12)]
    #[case(1, 11, 3)]
    #[case(10, 11, 12)]
    #[case(11, 11, 1)]
    #[case(12, 11, 2)]
    fn test_grid_start_month(#[case] start: u32, #[case] base: u32, #[case] expected: u32) {
        assert_eq!(grid_start_month(start, base), expected);
    }

    #[test]
    fn test_cells_cross_month_boundary() {
        let cells = activity_cells(3, 3, 4);
        assert_eq!(
            cells,
            vec![
                GridCell { month: 3, week: 3 },
                GridCell { month: 3, week: 4 },
                GridCell { month: 4, week: 1 },
                GridCell { month: 4, week: 2 },
            ]
        );
    }

    #[test]
    fn test_cells_wrap_december_to_january() {
        let cells = activity_cells(12, 4, 2);
        assert_eq!(
            cells,
            vec![GridCell { month: 12, week: 4 }, GridCell { month: 1, week: 1 }]
        );
    }

    #[test]
    fn test_cells_of_long_activity_are_capped_at_one_year() {
        let cells = activity_cells(1, 1, 100);
        assert_eq!(cells.len(), 48);
        assert!(is_cell_filled(12, 4, &cells));
    }

    #[test]
    fn test_end_of() {
        assert_eq!(end_of(1, 1, 1), (1, 1));
        assert_eq!(end_of(1, 1, 4), (1, 4));
        assert_eq!(end_of(1, 2, 4), (2, 1));
        assert_eq!(end_of(12, 3, 3), (1, 1));
        assert_eq!(end_of(3, 1, 49), (3, 1));
    }

    #[test]
    fn test_end_of_huge_duration_is_immediate() {
        assert_eq!(end_of(1, 1, u32::MAX), (4, 3));
        assert_eq!(end_of(12, 4, u32::MAX), (4, 2));
    }

    #[test]
    fn test_grouping_by_mayor() {
        let cimentacion = MayorId::new();
        let estructura = MayorId::new();
        let activities = vec![
            activity(cimentacion, 1, 1, 2),
            activity(estructura, 2, 1, 6),
            activity(cimentacion, 1, 3, 1),
        ];

        let grouped = group_activities_by_mayor(&activities, 1);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&cimentacion].len(), 2);
        assert_eq!(grouped[&estructura].len(), 1);
        assert_eq!(grouped[&estructura][0].grid_start_month, 2);
        assert!(is_cell_filled(3, 2, &grouped[&estructura][0].cells));
        assert!(!is_cell_filled(3, 3, &grouped[&estructura][0].cells));
    }

    #[test]
    fn test_next_year_activity_wraps_to_positive_column() {
        let mayor = MayorId::new();
        let grouped = group_activities_by_mayor(&[activity(mayor, 1, 1, 2)], 11);
        let entry = &grouped[&mayor][0];

        assert_eq!(entry.grid_start_month, 3);
        assert_eq!(
            entry.cells,
            vec![GridCell { month: 3, week: 1 }, GridCell { month: 3, week: 2 }]
        );
        assert!(is_cell_filled(3, 1, &entry.cells));
        assert!(!is_cell_filled(1, 1, &entry.cells));
    }

    #[test]
    fn test_grid_cells_cross_the_year_end() {
        let mayor = MayorId::new();
        let grouped = group_activities_by_mayor(&[activity(mayor, 12, 4, 3)], 11);

        // December is column 2, January column 3.
        assert_eq!(
            grouped[&mayor][0].cells,
            vec![
                GridCell { month: 2, week: 4 },
                GridCell { month: 3, week: 1 },
                GridCell { month: 3, week: 2 },
            ]
        );
    }

    #[test]
    fn test_bar_position() {
        let layout = GridLayout {
            week_width_px: 30,
            min_width_px: 20,
        };
        let mayor = MayorId::new();
        let grouped = group_activities_by_mayor(&[activity(mayor, 3, 2, 5)], 1);
        let position = bar_position(&grouped[&mayor][0], &layout);

        // ((3 - 1) * 4 + (2 - 1)) * 30
        assert_eq!(position.start_px, 270);
        assert_eq!(position.width_px, 150);
    }

    #[test]
    fn test_bar_width_saturates_on_huge_duration() {
        let mayor = MayorId::new();
        let grouped = group_activities_by_mayor(&[activity(mayor, 1, 1, 200_000_000)], 1);
        let position = bar_position(&grouped[&mayor][0], &GridLayout::default());

        assert_eq!(position.start_px, 0);
        assert_eq!(position.width_px, u32::MAX);
        assert_eq!(grouped[&mayor][0].cells.len(), 48);
    }

    #[test]
    fn test_bar_width_has_minimum() {
        let layout = GridLayout {
            week_width_px: 10,
            min_width_px: 25,
        };
        let mayor = MayorId::new();
        let grouped = group_activities_by_mayor(&[activity(mayor, 1, 1, 2)], 1);
        let position = bar_position(&grouped[&mayor][0], &layout);

        assert_eq!(position.start_px, 0);
        assert_eq!(position.width_px, 25);
    }
}
