//! Schedule routes: activities laid out on the month by week grid.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use obra_core::schedule::{
    ActivityWithGridCells, CreateActivityInput, GridLayout, bar_position,
    group_activities_by_mayor, validate_month,
};
use obra_db::ScheduleRepository;
use obra_shared::types::{ActivityId, ClientId, MayorId, ProjectId};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::error_response};

/// Creates the schedule routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/projects/{project_id}/clients/{client_id}/schedule",
            get(get_schedule).post(create_activity),
        )
        .route("/schedule/activities/{activity_id}", delete(delete_activity))
}

/// Query parameters of the schedule grid.
#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Calendar month shown in the first grid column; January when omitted.
    #[serde(default = "default_base_month")]
    pub base_month: u32,
}

const fn default_base_month() -> u32 {
    1
}

async fn get_schedule(
    State(state): State<AppState>,
    Path((project_id, client_id)): Path<(ProjectId, ClientId)>,
    Query(query): Query<ScheduleQuery>,
) -> Response {
    if let Err(e) = validate_month(query.base_month) {
        return error_response(e, "Rejected base month");
    }

    let repo = ScheduleRepository::new((*state.db).clone());
    match repo.list_activities(project_id, client_id).await {
        Ok(activities) => {
            let grouped = group_activities_by_mayor(&activities, query.base_month);
            let body = grid_json(query.base_month, &grouped, &GridLayout::default());
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(e, "Failed to load schedule"),
    }
}

async fn create_activity(
    State(state): State<AppState>,
    Path((project_id, client_id)): Path<(ProjectId, ClientId)>,
    Json(payload): Json<CreateActivityInput>,
) -> Response {
    let repo = ScheduleRepository::new((*state.db).clone());

    match repo.create_activity(project_id, client_id, payload).await {
        Ok(activity) => (StatusCode::CREATED, Json(activity)).into_response(),
        Err(e) => error_response(e, "Failed to create activity"),
    }
}

async fn delete_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<ActivityId>,
) -> Response {
    let repo = ScheduleRepository::new((*state.db).clone());

    match repo.delete_activity(activity_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e, "Failed to delete activity"),
    }
}

fn grid_json(
    base_month: u32,
    grouped: &BTreeMap<MayorId, Vec<ActivityWithGridCells>>,
    layout: &GridLayout,
) -> serde_json::Value {
    let groups: Vec<serde_json::Value> = grouped
        .iter()
        .map(|(mayor_id, entries)| {
            let activities: Vec<serde_json::Value> = entries
                .iter()
                .map(|entry| {
                    json!({
                        "activity": entry.activity,
                        "grid_start_month": entry.grid_start_month,
                        "cells": entry.cells,
                        "position": bar_position(entry, layout),
                    })
                })
                .collect();
            json!({ "mayor_id": mayor_id, "activities": activities })
        })
        .collect();

    json!({
        "base_month": base_month,
        "layout": layout,
        "groups": groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use obra_core::schedule::{ScheduleActivity, end_of};

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
            name: "Muros".to_string(),
            start_month,
            start_week,
            end_month,
            end_week,
            duration_weeks: weeks,
        }
    }

    #[test]
    fn test_grid_json_places_bars() {
        let mayor = MayorId::new();
        let grouped = group_activities_by_mayor(&[activity(mayor, 4, 3, 2)], 3);
        let body = grid_json(3, &grouped, &GridLayout::default());

        let entry = &body["groups"][0]["activities"][0];
        assert_eq!(body["base_month"], 3);
        assert_eq!(entry["grid_start_month"], 2);
        // ((2 - 1) * 4 + (3 - 1)) * 32
        assert_eq!(entry["position"]["start_px"], 192);
        assert_eq!(entry["position"]["width_px"], 64);
        assert_eq!(
            entry["cells"],
            json!([{ "month": 2, "week": 3 }, { "month": 2, "week": 4 }])
        );
    }

    #[test]
    fn test_grid_json_without_activities() {
        let body = grid_json(1, &BTreeMap::new(), &GridLayout::default());
        assert!(body["groups"].as_array().unwrap().is_empty());
    }
}
