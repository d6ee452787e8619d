//! `SeaORM` entity definitions.

pub mod budgets;
pub mod classification_mappings;
pub mod line_groups;
pub mod line_items;
pub mod matrix_overrides;
pub mod schedule_activities;
pub mod sea_orm_active_enums;
