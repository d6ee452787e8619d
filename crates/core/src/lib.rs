//! Core business logic for Obra.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `budget` - Budget aggregate and the duplication planner
//! - `matrix` - Month-indexed numeric matrix with manual overrides
//! - `schedule` - Schedule activities and month x week grid math

pub mod budget;
pub mod matrix;
pub mod schedule;
