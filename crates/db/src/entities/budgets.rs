//! `SeaORM` Entity for budgets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BudgetStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub status: BudgetStatus,
    #[sea_orm(column_type = "JsonBinary")]
    pub settings: Json,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::line_groups::Entity")]
    LineGroups,
    #[sea_orm(has_many = "super::classification_mappings::Entity")]
    ClassificationMappings,
    #[sea_orm(has_many = "super::matrix_overrides::Entity")]
    MatrixOverrides,
}

impl Related<super::line_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineGroups.def()
    }
}

impl Related<super::classification_mappings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassificationMappings.def()
    }
}

impl Related<super::matrix_overrides::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatrixOverrides.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
