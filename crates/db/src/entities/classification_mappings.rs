//! `SeaORM` Entity for classification_mappings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "classification_mappings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    #[sea_orm(unique)]
    pub line_group_id: Uuid,
    pub mayor_id: Uuid,
    pub partida_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_delete = "Cascade"
    )]
    Budgets,
    #[sea_orm(
        belongs_to = "super::line_groups::Entity",
        from = "Column::LineGroupId",
        to = "super::line_groups::Column::Id",
        on_delete = "Cascade"
    )]
    LineGroups,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::line_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
