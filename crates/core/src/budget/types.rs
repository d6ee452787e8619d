//! Budget data types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use obra_shared::types::{
    BudgetId, ClassificationPartidaId, ClientId, LineGroupId, LineItemId, MayorId, ProjectId,
    UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BudgetError;

/// Budget lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Being edited; the state of every duplicated budget.
    Draft,
    /// In use for the project.
    Active,
    /// Kept for reference only.
    Archived,
}

impl BudgetStatus {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetStatus {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(BudgetError::InvalidStatus(other.to_string())),
        }
    }
}

/// A budget (presupuesto): the root of the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Owning client.
    pub client_id: ClientId,
    /// Budget name.
    pub name: String,
    /// Lifecycle status.
    pub status: BudgetStatus,
    /// Free-form settings blob, copied verbatim on duplication.
    pub settings: serde_json::Value,
    /// User who created the budget.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A line group (partida): an ordered grouping of line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineGroup {
    /// Line group ID.
    pub id: LineGroupId,
    /// Parent budget ID.
    pub budget_id: BudgetId,
    /// Display name.
    pub name: String,
    /// Position within the budget, unique per budget.
    pub order_index: i32,
    /// Inactive groups are hidden and never duplicated.
    pub is_active: bool,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Fee percentage override for every item in the group.
    pub fee_pct_override: Option<Decimal>,
    /// Waste percentage override for every item in the group.
    pub waste_pct_override: Option<Decimal>,
}

/// A line item (concepto): a single priced row.
///
/// Totals are derived: `real_total = real_quantity * real_price` and
/// `total = quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line item ID.
    pub id: LineItemId,
    /// Parent line group ID.
    pub line_group_id: LineGroupId,
    /// Catalog code.
    pub code: Option<String>,
    /// Short description.
    pub short_description: String,
    /// Long description.
    pub long_description: Option<String>,
    /// Unit of measure.
    pub unit: Option<String>,
    /// Provider name.
    pub provider: Option<String>,
    /// Real quantity (cantidad real).
    pub real_quantity: Decimal,
    /// Waste percentage (desperdicio).
    pub waste_pct: Decimal,
    /// Provisioned quantity (cantidad).
    pub quantity: Decimal,
    /// Real unit price (precio real).
    pub real_price: Decimal,
    /// Fee percentage (honorarios).
    pub fee_pct: Decimal,
    /// Provisioned unit price (P.U.).
    pub unit_price: Decimal,
    /// Real total.
    pub real_total: Decimal,
    /// Provisioned total.
    pub total: Decimal,
    /// Position within the line group.
    pub order_index: i32,
    /// Inactive items are hidden and never duplicated.
    pub is_active: bool,
}

impl LineItem {
    /// Recomputes both totals from the current quantities and prices.
    pub fn recompute_totals(&mut self) {
        self.real_total = self.real_quantity * self.real_price;
        self.total = self.quantity * self.unit_price;
    }

    /// Zeroes the quantity fields.
    pub fn clear_quantities(&mut self) {
        self.real_quantity = Decimal::ZERO;
        self.waste_pct = Decimal::ZERO;
        self.quantity = Decimal::ZERO;
    }

    /// Zeroes the price fields.
    pub fn clear_prices(&mut self) {
        self.real_price = Decimal::ZERO;
        self.fee_pct = Decimal::ZERO;
        self.unit_price = Decimal::ZERO;
    }
}

/// Link from a line group to the external cost classification (mayor/partida).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationMapping {
    /// Budget the mapped group belongs to.
    pub budget_id: BudgetId,
    /// Mapped line group.
    pub line_group_id: LineGroupId,
    /// Classification group.
    pub mayor_id: MayorId,
    /// Classification partida.
    pub partida_id: ClassificationPartidaId,
}

/// A budget with its groups, items, and classification mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAggregate {
    /// Root budget.
    pub budget: Budget,
    /// Line groups.
    pub groups: Vec<LineGroup>,
    /// Line items of all groups.
    pub items: Vec<LineItem>,
    /// Classification mappings of the groups that have one.
    pub mappings: Vec<ClassificationMapping>,
}

impl BudgetAggregate {
    /// Sum of the provisioned totals of active items in active groups.
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        self.items
            .iter()
            .filter(|item| item.is_active)
            .filter(|item| {
                self.groups
                    .iter()
                    .any(|group| group.id == item.line_group_id && group.is_active)
            })
            .map(|item| item.total)
            .sum()
    }

    /// Returns the items of one group ordered by `order_index`.
    #[must_use]
    pub fn items_of(&self, group_id: LineGroupId) -> Vec<&LineItem> {
        let mut items: Vec<&LineItem> = self
            .items
            .iter()
            .filter(|item| item.line_group_id == group_id)
            .collect();
        items.sort_by_key(|item| item.order_index);
        items
    }
}

/// Options for duplicating a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateBudgetOptions {
    /// Name of the new budget; must not be blank.
    pub new_name: String,
    /// Keep `real_quantity`, `waste_pct` and `quantity`.
    pub preserve_quantities: bool,
    /// Keep `real_price`, `fee_pct` and `unit_price`.
    pub preserve_prices: bool,
}

impl DuplicateBudgetOptions {
    /// Checks the options before any data is read.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::EmptyName` if the new name is blank.
    pub fn validate(&self) -> Result<(), BudgetError> {
        validate_name(&self.new_name)
    }
}

/// Input for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    /// Owning project.
    pub project_id: ProjectId,
    /// Owning client.
    pub client_id: ClientId,
    /// Budget name.
    pub name: String,
    /// Settings blob.
    pub settings: serde_json::Value,
    /// User creating the budget.
    pub created_by: UserId,
}

/// Input for creating a line group.
#[derive(Debug, Clone)]
pub struct CreateLineGroupInput {
    /// Display name.
    pub name: String,
    /// Position within the budget.
    pub order_index: i32,
    /// Notes.
    pub notes: Option<String>,
    /// Fee percentage override.
    pub fee_pct_override: Option<Decimal>,
    /// Waste percentage override.
    pub waste_pct_override: Option<Decimal>,
    /// Optional classification as `(mayor, partida)`.
    pub classification: Option<(MayorId, ClassificationPartidaId)>,
}

impl CreateLineGroupInput {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::EmptyGroupName` for a blank name and
    /// `BudgetError::NegativeAmount` for a negative override.
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.name.trim().is_empty() {
            return Err(BudgetError::EmptyGroupName);
        }
        let overrides = [
            ("fee_pct_override", self.fee_pct_override),
            ("waste_pct_override", self.waste_pct_override),
        ];
        if let Some((field, _)) = overrides
            .iter()
            .find(|(_, value)| value.is_some_and(|v| v < Decimal::ZERO))
        {
            return Err(BudgetError::NegativeAmount((*field).to_string()));
        }
        Ok(())
    }
}

/// Input for creating a line item. Totals are computed, never supplied.
#[derive(Debug, Clone, Default)]
pub struct CreateLineItemInput {
    /// Catalog code.
    pub code: Option<String>,
    /// Short description.
    pub short_description: String,
    /// Long description.
    pub long_description: Option<String>,
    /// Unit of measure.
    pub unit: Option<String>,
    /// Provider name.
    pub provider: Option<String>,
    /// Real quantity.
    pub real_quantity: Decimal,
    /// Waste percentage.
    pub waste_pct: Decimal,
    /// Provisioned quantity.
    pub quantity: Decimal,
    /// Real unit price.
    pub real_price: Decimal,
    /// Fee percentage.
    pub fee_pct: Decimal,
    /// Provisioned unit price.
    pub unit_price: Decimal,
    /// Position within the group.
    pub order_index: i32,
}

impl CreateLineItemInput {
    /// Validates the input and builds the item under the given group.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::EmptyDescription` for a blank description and
    /// `BudgetError::NegativeAmount` if any quantity or price is negative.
    pub fn into_line_item(
        self,
        id: LineItemId,
        line_group_id: LineGroupId,
    ) -> Result<LineItem, BudgetError> {
        if self.short_description.trim().is_empty() {
            return Err(BudgetError::EmptyDescription);
        }

        let amounts = [
            ("real_quantity", self.real_quantity),
            ("waste_pct", self.waste_pct),
            ("quantity", self.quantity),
            ("real_price", self.real_price),
            ("fee_pct", self.fee_pct),
            ("unit_price", self.unit_price),
        ];
        if let Some((field, _)) = amounts.iter().find(|(_, value)| *value < Decimal::ZERO) {
            return Err(BudgetError::NegativeAmount((*field).to_string()));
        }

        let mut item = LineItem {
            id,
            line_group_id,
            code: self.code,
            short_description: self.short_description,
            long_description: self.long_description,
            unit: self.unit,
            provider: self.provider,
            real_quantity: self.real_quantity,
            waste_pct: self.waste_pct,
            quantity: self.quantity,
            real_price: self.real_price,
            fee_pct: self.fee_pct,
            unit_price: self.unit_price,
            real_total: Decimal::ZERO,
            total: Decimal::ZERO,
            order_index: self.order_index,
            is_active: true,
        };
        item.recompute_totals();
        Ok(item)
    }
}

/// Rejects blank budget names.
///
/// # Errors
///
/// Returns `BudgetError::EmptyName` if `name` is empty after trimming.
pub fn validate_name(name: &str) -> Result<(), BudgetError> {
    if name.trim().is_empty() {
        return Err(BudgetError::EmptyName);
    }
    Ok(())
}
