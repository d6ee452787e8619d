//! `SeaORM` Entity for line_groups table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "line_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub order_index: i32,
    pub is_active: bool,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))", nullable)]
    pub fee_pct_override: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))", nullable)]
    pub waste_pct_override: Option<Decimal>,
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
    #[sea_orm(has_many = "super::line_items::Entity")]
    LineItems,
    #[sea_orm(has_one = "super::classification_mappings::Entity")]
    ClassificationMappings,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::classification_mappings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassificationMappings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
