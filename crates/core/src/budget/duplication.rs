//! Budget duplication planning.
//!
//! The planner turns a snapshot of a source aggregate into the complete set of
//! rows the copy consists of. It does no I/O: the repository reads the snapshot,
//! calls [`DuplicationPlanner::plan`], and writes the plan in one transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use obra_shared::types::{BudgetId, LineGroupId, LineItemId, UserId};

use super::error::BudgetError;
use super::types::{
    Budget, BudgetAggregate, BudgetStatus, ClassificationMapping, DuplicateBudgetOptions,
    LineGroup, LineItem,
};

/// Every row a duplication will insert, in insertion order.
#[derive(Debug, Clone)]
pub struct DuplicationPlan {
    /// The new budget, always in draft.
    pub budget: Budget,
    /// New groups ordered by `order_index`.
    pub groups: Vec<LineGroup>,
    /// Mappings for new groups whose source group had one.
    pub mappings: Vec<ClassificationMapping>,
    /// New items, grouped by their new group and ordered by `order_index`.
    pub items: Vec<LineItem>,
    /// Source group ID to new group ID.
    pub group_id_map: HashMap<LineGroupId, LineGroupId>,
    /// Active items dropped because their group was not copied.
    pub skipped_items: usize,
}

impl DuplicationPlan {
    /// Returns the ID of the budget the plan creates.
    #[must_use]
    pub const fn new_budget_id(&self) -> BudgetId {
        self.budget.id
    }
}

/// Stateless planner for budget duplication.
pub struct DuplicationPlanner;

impl DuplicationPlanner {
    /// Plans the copy of `source`.
    ///
    /// Only active groups are copied, and only active items of copied groups.
    /// Totals of copied items are recomputed from the (possibly zeroed)
    /// quantities and prices rather than copied.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::EmptyName` if `options.new_name` is blank.
    pub fn plan(
        source: &BudgetAggregate,
        options: &DuplicateBudgetOptions,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<DuplicationPlan, BudgetError> {
        options.validate()?;

        let budget = Budget {
            id: BudgetId::new(),
            project_id: source.budget.project_id,
            client_id: source.budget.client_id,
            name: options.new_name.clone(),
            status: BudgetStatus::Draft,
            settings: source.budget.settings.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        };

        let mut source_groups: Vec<&LineGroup> =
            source.groups.iter().filter(|g| g.is_active).collect();
        source_groups.sort_by_key(|g| g.order_index);

        let mut group_id_map = HashMap::with_capacity(source_groups.len());
        let groups: Vec<LineGroup> = source_groups
            .iter()
            .map(|src| {
                let copy = LineGroup {
                    id: LineGroupId::new(),
                    budget_id: budget.id,
                    ..(*src).clone()
                };
                group_id_map.insert(src.id, copy.id);
                copy
            })
            .collect();

        let mappings: Vec<ClassificationMapping> = groups
            .iter()
            .zip(&source_groups)
            .filter_map(|(copy, src)| {
                source
                    .mappings
                    .iter()
                    .find(|m| m.line_group_id == src.id)
                    .map(|m| ClassificationMapping {
                        budget_id: budget.id,
                        line_group_id: copy.id,
                        mayor_id: m.mayor_id,
                        partida_id: m.partida_id,
                    })
            })
            .collect();

        let mut source_items: Vec<&LineItem> =
            source.items.iter().filter(|i| i.is_active).collect();
        source_items.sort_by_key(|i| i.order_index);

        let mut items = Vec::with_capacity(source_items.len());
        let mut skipped_items = 0;
        for src in source_items {
            match group_id_map.get(&src.line_group_id) {
                Some(&new_group_id) => items.push(Self::copy_item(src, new_group_id, options)),
                None => skipped_items += 1,
            }
        }

        Ok(DuplicationPlan {
            budget,
            groups,
            mappings,
            items,
            group_id_map,
            skipped_items,
        })
    }

    /// Copies one item under `new_group_id`, applying the reset options.
    #[must_use]
    pub fn copy_item(
        source: &LineItem,
        new_group_id: LineGroupId,
        options: &DuplicateBudgetOptions,
    ) -> LineItem {
        let mut item = LineItem {
            id: LineItemId::new(),
            line_group_id: new_group_id,
            ..source.clone()
        };
        if !options.preserve_quantities {
            item.clear_quantities();
        }
        if !options.preserve_prices {
            item.clear_prices();
        }
        item.recompute_totals();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::tests::fixtures::{casa_a, group, item, mapping};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn options(preserve_quantities: bool, preserve_prices: bool) -> DuplicateBudgetOptions {
        DuplicateBudgetOptions {
            new_name: "Casa A (Copia)".to_string(),
            preserve_quantities,
            preserve_prices,
        }
    }

    #[test]
    fn test_casa_a_keeps_quantities_and_drops_prices() {
        let source = casa_a();
        let plan =
            DuplicationPlanner::plan(&source, &options(true, false), UserId::new(), Utc::now())
                .unwrap();

        assert_eq!(plan.budget.name, "Casa A (Copia)");
        assert_eq!(plan.budget.status, BudgetStatus::Draft);
        let names: Vec<&str> = plan.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Cimentación", "Acabados"]);
        assert_eq!(plan.groups[0].order_index, 0);
        assert_eq!(plan.groups[1].order_index, 1);

        assert_eq!(plan.items.len(), 2);
        for item in &plan.items {
            assert_eq!(item.quantity, dec!(10));
            assert_eq!(item.unit_price, Decimal::ZERO);
            assert_eq!(item.total, Decimal::ZERO);
        }
    }

    #[test]
    fn test_new_budget_copies_ownership_and_settings() {
        let source = casa_a();
        let creator = UserId::new();
        let plan =
            DuplicationPlanner::plan(&source, &options(true, true), creator, Utc::now()).unwrap();

        assert_ne!(plan.budget.id, source.budget.id);
        assert_eq!(plan.budget.project_id, source.budget.project_id);
        assert_eq!(plan.budget.client_id, source.budget.client_id);
        assert_eq!(plan.budget.settings, source.budget.settings);
        assert_eq!(plan.budget.created_by, creator);
    }

    #[test]
    fn test_items_point_at_new_groups() {
        let source = casa_a();
        let plan =
            DuplicationPlanner::plan(&source, &options(true, true), UserId::new(), Utc::now())
                .unwrap();

        for (src, copy) in source.items.iter().zip(&plan.items) {
            assert_eq!(plan.group_id_map[&src.line_group_id], copy.line_group_id);
            assert_ne!(src.id, copy.id);
        }
        assert!(plan.groups.iter().all(|g| g.budget_id == plan.budget.id));
    }

    #[test]
    fn test_inactive_groups_and_their_items_are_dropped() {
        let mut source = casa_a();
        let hidden = group(source.budget.id, "Obsoleta", 2, false);
        source
            .items
            .push(item(hidden.id, 0, dec!(1), dec!(1), true));
        source.groups.push(hidden);

        let plan =
            DuplicationPlanner::plan(&source, &options(true, true), UserId::new(), Utc::now())
                .unwrap();

        assert_eq!(plan.groups.len(), 2);
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.skipped_items, 1);
    }

    #[test]
    fn test_inactive_items_are_dropped() {
        let mut source = casa_a();
        let group_id = source.groups[0].id;
        source
            .items
            .push(item(group_id, 5, dec!(3), dec!(3), false));

        let plan =
            DuplicationPlanner::plan(&source, &options(true, true), UserId::new(), Utc::now())
                .unwrap();

        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.skipped_items, 0);
    }

    #[test]
    fn test_mappings_follow_their_groups_only() {
        let mut source = casa_a();
        let mapped = source.groups[1].id;
        source.mappings.push(mapping(source.budget.id, mapped));

        let plan =
            DuplicationPlanner::plan(&source, &options(false, false), UserId::new(), Utc::now())
                .unwrap();

        assert_eq!(plan.mappings.len(), 1);
        let copied = &plan.mappings[0];
        assert_eq!(copied.line_group_id, plan.group_id_map[&mapped]);
        assert_eq!(copied.budget_id, plan.budget.id);
        assert_eq!(copied.mayor_id, source.mappings[0].mayor_id);
        assert_eq!(copied.partida_id, source.mappings[0].partida_id);
    }

    #[test]
    fn test_mapping_of_inactive_group_is_not_copied() {
        let mut source = casa_a();
        let hidden = group(source.budget.id, "Obsoleta", 9, false);
        source.mappings.push(mapping(source.budget.id, hidden.id));
        source.groups.push(hidden);

        let plan =
            DuplicationPlanner::plan(&source, &options(true, true), UserId::new(), Utc::now())
                .unwrap();

        assert!(plan.mappings.is_empty());
    }

    #[test]
    fn test_stale_source_totals_are_recomputed() {
        let mut source = casa_a();
        source.items[0].total = dec!(999.99);
        source.items[0].real_total = dec!(1);

        let plan =
            DuplicationPlanner::plan(&source, &options(true, true), UserId::new(), Utc::now())
                .unwrap();

        assert_eq!(plan.items[0].total, dec!(1000));
        assert_eq!(plan.items[0].real_total, dec!(1000));
    }

    #[test]
    fn test_new_name_is_stored_as_given() {
        let source = casa_a();
        let mut opts = options(true, false);
        opts.new_name = "Casa A (Copia) ".to_string();

        let plan = DuplicationPlanner::plan(&source, &opts, UserId::new(), Utc::now()).unwrap();
        assert_eq!(plan.budget.name, "Casa A (Copia) ");
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let source = casa_a();
        let mut opts = options(true, true);
        opts.new_name = "   ".to_string();

        let result = DuplicationPlanner::plan(&source, &opts, UserId::new(), Utc::now());
        assert_eq!(result.unwrap_err(), BudgetError::EmptyName);
    }

    #[test]
    fn test_empty_budget_duplicates_to_empty_budget() {
        let mut source = casa_a();
        source.groups.clear();
        source.items.clear();

        let plan =
            DuplicationPlanner::plan(&source, &options(true, true), UserId::new(), Utc::now())
                .unwrap();

        assert!(plan.groups.is_empty());
        assert!(plan.items.is_empty());
        assert_eq!(plan.skipped_items, 0);
    }
}
