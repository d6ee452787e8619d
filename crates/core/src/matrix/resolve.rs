//! Merging computed values with overrides into the displayed matrix.

use rust_decimal::Decimal;
use serde::Serialize;

use super::store::OverrideStore;
use super::types::{CellValue, ComputedMatrix, MatrixConcept};

/// One displayed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCell {
    /// Month number.
    pub month: u32,
    /// Override value when present, computed value otherwise.
    pub value: Option<CellValue>,
    /// The computed value, kept so clients can offer "restore".
    pub computed: Option<CellValue>,
    /// Whether an override is in effect.
    pub overridden: bool,
}

/// One displayed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRow {
    /// Row concept.
    pub concept: MatrixConcept,
    /// Row label.
    pub label: &'static str,
    /// Cells in month order.
    pub cells: Vec<ResolvedCell>,
    /// Sum of computed values for additive rows. Overrides never count.
    pub total: Option<Decimal>,
}

/// The displayed matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMatrix {
    /// Column months, ascending.
    pub months: Vec<u32>,
    /// One row per concept, in display order.
    pub rows: Vec<ResolvedRow>,
    /// Budget grand total as computed.
    pub total_budget: Decimal,
}

impl ResolvedMatrix {
    /// Looks up a cell.
    #[must_use]
    pub fn cell(&self, month: u32, concept: MatrixConcept) -> Option<&ResolvedCell> {
        self.rows
            .iter()
            .find(|row| row.concept == concept)
            .and_then(|row| row.cells.iter().find(|cell| cell.month == month))
    }
}

/// Builds the displayed matrix.
///
/// Columns are the union of computed months and overridden months.
#[must_use]
pub fn resolve(computed: &ComputedMatrix, overrides: &OverrideStore) -> ResolvedMatrix {
    let mut months = computed.months();
    months.extend(overrides.months());
    months.sort_unstable();
    months.dedup();

    let rows = MatrixConcept::ALL
        .into_iter()
        .map(|concept| {
            let cells = months
                .iter()
                .map(|&month| {
                    let computed_value = computed.value(month, concept);
                    match overrides.get(month, concept) {
                        Some(raw) => ResolvedCell {
                            month,
                            value: Some(CellValue::from_override(concept.kind(), raw)),
                            computed: computed_value,
                            overridden: true,
                        },
                        None => ResolvedCell {
                            month,
                            value: computed_value.clone(),
                            computed: computed_value,
                            overridden: false,
                        },
                    }
                })
                .collect();
            ResolvedRow {
                concept,
                label: concept.label(),
                cells,
                total: computed.total(concept),
            }
        })
        .collect();

    ResolvedMatrix {
        months,
        rows,
        total_budget: computed.total_budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn computed() -> ComputedMatrix {
        let mut matrix = ComputedMatrix {
            total_budget: dec!(3000),
            ..ComputedMatrix::default()
        };
        matrix.monthly_expense.insert(1, dec!(1000));
        matrix.monthly_expense.insert(2, dec!(2000));
        matrix.partial_progress.insert(1, dec!(33.33));
        matrix.partial_progress.insert(2, dec!(66.67));
        matrix.cumulative_progress.insert(1, dec!(33.33));
        matrix.cumulative_progress.insert(2, dec!(100));
        matrix.disbursements.insert(1, dec!(1500));
        matrix.disbursements.insert(2, dec!(1500));
        matrix
            .payment_dates
            .insert(1, vec!["2025-01-15".to_string(), "2025-01-30".to_string()]);
        matrix
    }

    #[test]
    fn test_without_overrides_shows_computed_values() {
        let resolved = resolve(&computed(), &OverrideStore::new());

        assert_eq!(resolved.months, vec![1, 2]);
        assert_eq!(resolved.rows.len(), 6);
        let cell = resolved.cell(2, MatrixConcept::MonthlyExpense).unwrap();
        assert_eq!(cell.value, Some(CellValue::Amount(dec!(2000))));
        assert!(!cell.overridden);
        assert_eq!(
            resolved.cell(1, MatrixConcept::PaymentDate).unwrap().value,
            Some(CellValue::Dates(vec![
                "2025-01-15".to_string(),
                "2025-01-30".to_string()
            ]))
        );
        assert_eq!(resolved.cell(2, MatrixConcept::PaymentDate).unwrap().value, None);
    }

    #[test]
    fn test_override_replaces_cell_but_not_total() {
        let mut overrides = OverrideStore::new();
        overrides
            .save_override(1, MatrixConcept::MonthlyExpense, "$1,250.50")
            .unwrap();

        let resolved = resolve(&computed(), &overrides);
        let cell = resolved.cell(1, MatrixConcept::MonthlyExpense).unwrap();

        assert!(cell.overridden);
        assert_eq!(cell.value, Some(CellValue::Amount(dec!(1250.50))));
        assert_eq!(cell.computed, Some(CellValue::Amount(dec!(1000))));

        let row = resolved
            .rows
            .iter()
            .find(|r| r.concept == MatrixConcept::MonthlyExpense)
            .unwrap();
        assert_eq!(row.total, Some(dec!(3000)));
    }

    #[test]
    fn test_override_equal_to_computed_still_counts() {
        let mut overrides = OverrideStore::new();
        overrides
            .save_override(2, MatrixConcept::CumulativeProgress, "100")
            .unwrap();

        let resolved = resolve(&computed(), &overrides);
        let cell = resolved.cell(2, MatrixConcept::CumulativeProgress).unwrap();

        assert!(cell.overridden);
        assert_eq!(cell.value, cell.computed);
    }

    #[test]
    fn test_deleted_override_falls_back_to_computed() {
        let mut overrides = OverrideStore::new();
        overrides
            .save_override(1, MatrixConcept::Disbursement, "0")
            .unwrap();
        overrides.delete_override(1, MatrixConcept::Disbursement);

        let resolved = resolve(&computed(), &overrides);
        let cell = resolved.cell(1, MatrixConcept::Disbursement).unwrap();

        assert!(!cell.overridden);
        assert_eq!(cell.value, Some(CellValue::Amount(dec!(1500))));
    }

    #[test]
    fn test_non_numeric_override_is_shown_as_text() {
        let mut overrides = OverrideStore::new();
        overrides
            .save_override(1, MatrixConcept::PartialProgress, "pendiente")
            .unwrap();
        overrides
            .save_override(2, MatrixConcept::PaymentDate, "fin de mes")
            .unwrap();

        let resolved = resolve(&computed(), &overrides);
        assert_eq!(
            resolved.cell(1, MatrixConcept::PartialProgress).unwrap().value,
            Some(CellValue::Text("pendiente".to_string()))
        );
        assert_eq!(
            resolved.cell(2, MatrixConcept::PaymentDate).unwrap().value,
            Some(CellValue::Text("fin de mes".to_string()))
        );
    }

    #[test]
    fn test_override_outside_computed_months_adds_a_column() {
        let mut overrides = OverrideStore::new();
        overrides
            .save_override(4, MatrixConcept::Disbursement, "500")
            .unwrap();

        let resolved = resolve(&computed(), &overrides);

        assert_eq!(resolved.months, vec![1, 2, 4]);
        assert_eq!(
            resolved.cell(4, MatrixConcept::MonthlyExpense).unwrap().value,
            None
        );
        let disbursements = resolved
            .rows
            .iter()
            .find(|r| r.concept == MatrixConcept::Disbursement)
            .unwrap();
        assert_eq!(disbursements.total, Some(dec!(3000)));
    }

    #[test]
    fn test_cumulative_rows_have_no_total() {
        let resolved = resolve(&computed(), &OverrideStore::new());
        for row in &resolved.rows {
            assert_eq!(row.total.is_some(), row.concept.is_additive());
        }
        assert_eq!(resolved.total_budget, dec!(3000));
    }

    #[test]
    fn test_computed_matrix_reads_projection_json() {
        let json = serde_json::json!({
            "gastoPorMes": { "1": "1000", "2": "2000" },
            "avanceParcial": { "1": "50" },
            "avanceAcumulado": {},
            "ministraciones": { "1": "1500" },
            "inversionAcumulada": {},
            "fechasPago": { "1": ["2025-01-15"] },
            "totalPresupuesto": "3000"
        });
        let matrix: ComputedMatrix = serde_json::from_value(json).unwrap();

        assert_eq!(matrix.monthly_expense[&2], dec!(2000));
        assert_eq!(matrix.payment_dates[&1], vec!["2025-01-15".to_string()]);
        assert_eq!(matrix.total_budget, dec!(3000));
        assert_eq!(matrix.months(), vec![1, 2]);
    }
}
