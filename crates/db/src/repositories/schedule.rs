//! Schedule activity repository.

use chrono::Utc;
use obra_core::schedule::{CreateActivityInput, ScheduleActivity, ScheduleError, end_of};
use obra_shared::AppError;
use obra_shared::types::{ActivityId, ClientId, MayorId, ProjectId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;

use crate::entities::schedule_activities;

/// Error types for schedule repository operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleRepositoryError {
    /// Domain rule violated.
    #[error(transparent)]
    Domain(#[from] ScheduleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ScheduleRepositoryError> for AppError {
    fn from(err: ScheduleRepositoryError) -> Self {
        match err {
            ScheduleRepositoryError::Domain(e) => e.into(),
            ScheduleRepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Schedule repository.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    db: DatabaseConnection,
}

impl ScheduleRepository {
    /// Creates a new schedule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an activity. The end month and week are derived from the
    /// start and the duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or the insert fails.
    pub async fn create_activity(
        &self,
        project_id: ProjectId,
        client_id: ClientId,
        input: CreateActivityInput,
    ) -> Result<ScheduleActivity, ScheduleRepositoryError> {
        input.validate()?;
        let duration = i32::try_from(input.duration_weeks)
            .map_err(|_| ScheduleError::InvalidDuration(i64::from(input.duration_weeks)))?;

        let (end_month, end_week) =
            end_of(input.start_month, input.start_week, input.duration_weeks);
        let activity = ScheduleActivity {
            id: ActivityId::new(),
            mayor_id: input.mayor_id,
            name: input.name.trim().to_string(),
            start_month: input.start_month,
            start_week: input.start_week,
            end_month,
            end_week,
            duration_weeks: input.duration_weeks,
        };

        // Month and week values are validated to 1..=12 and 1..=4 above.
        let model = schedule_activities::ActiveModel {
            id: Set(activity.id.into_inner()),
            project_id: Set(project_id.into_inner()),
            client_id: Set(client_id.into_inner()),
            mayor_id: Set(activity.mayor_id.into_inner()),
            name: Set(activity.name.clone()),
            start_month: Set(small(activity.start_month)),
            start_week: Set(small(activity.start_week)),
            end_month: Set(small(activity.end_month)),
            end_week: Set(small(activity.end_week)),
            duration_weeks: Set(duration),
            created_at: Set(Utc::now().into()),
        };
        model.insert(&self.db).await?;

        debug!(
            activity_id = %activity.id,
            project_id = %project_id,
            client_id = %client_id,
            "Schedule activity created"
        );
        Ok(activity)
    }

    /// Lists the activities of a project and client in start order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is out of range.
    pub async fn list_activities(
        &self,
        project_id: ProjectId,
        client_id: ClientId,
    ) -> Result<Vec<ScheduleActivity>, ScheduleRepositoryError> {
        let models = schedule_activities::Entity::find()
            .filter(schedule_activities::Column::ProjectId.eq(project_id.into_inner()))
            .filter(schedule_activities::Column::ClientId.eq(client_id.into_inner()))
            .order_by_asc(schedule_activities::Column::StartMonth)
            .order_by_asc(schedule_activities::Column::StartWeek)
            .order_by_asc(schedule_activities::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|model| activity_from_model(model).map_err(Into::into))
            .collect()
    }

    /// Deletes an activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the activity does not exist or the delete fails.
    pub async fn delete_activity(&self, id: ActivityId) -> Result<(), ScheduleRepositoryError> {
        let result = schedule_activities::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ScheduleError::NotFound(id).into());
        }
        Ok(())
    }
}

fn small(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn stored(value: i32, error: fn(i64) -> ScheduleError) -> Result<u32, ScheduleError> {
    u32::try_from(value).map_err(|_| error(i64::from(value)))
}

fn activity_from_model(
    model: schedule_activities::Model,
) -> Result<ScheduleActivity, ScheduleError> {
    Ok(ScheduleActivity {
        id: ActivityId::from_uuid(model.id),
        mayor_id: MayorId::from_uuid(model.mayor_id),
        name: model.name,
        start_month: stored(model.start_month, ScheduleError::InvalidMonth)?,
        start_week: stored(model.start_week, ScheduleError::InvalidWeek)?,
        end_month: stored(model.end_month, ScheduleError::InvalidMonth)?,
        end_week: stored(model.end_week, ScheduleError::InvalidWeek)?,
        duration_weeks: stored(model.duration_weeks, ScheduleError::InvalidDuration)?,
    })
}
