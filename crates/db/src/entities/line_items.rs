//! `SeaORM` Entity for line_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub line_group_id: Uuid,
    pub code: Option<String>,
    pub short_description: String,
    pub long_description: Option<String>,
    pub unit: Option<String>,
    pub provider: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub real_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub waste_pct: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub real_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub fee_pct: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub real_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total: Decimal,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::line_groups::Entity",
        from = "Column::LineGroupId",
        to = "super::line_groups::Column::Id",
        on_delete = "Cascade"
    )]
    LineGroups,
}

impl Related<super::line_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
