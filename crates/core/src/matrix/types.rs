//! Matrix data types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::MatrixError;

/// How a concept's values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Money amount.
    Currency,
    /// Percentage, 0-100.
    Percent,
    /// List of tentative payment dates.
    Dates,
}

/// One row of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixConcept {
    /// Expense per month (gasto por mes).
    MonthlyExpense,
    /// Progress made in the month (avance parcial).
    PartialProgress,
    /// Progress up to and including the month (avance acumulado).
    CumulativeProgress,
    /// Disbursement amount (ministraciones).
    Disbursement,
    /// Investment up to and including the month (inversión acumulada).
    CumulativeInvestment,
    /// Tentative payment dates (fechas de pago).
    PaymentDate,
}

impl MatrixConcept {
    /// All concepts in display order.
    pub const ALL: [Self; 6] = [
        Self::MonthlyExpense,
        Self::PartialProgress,
        Self::CumulativeProgress,
        Self::Disbursement,
        Self::CumulativeInvestment,
        Self::PaymentDate,
    ];

    /// Returns the snake_case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MonthlyExpense => "monthly_expense",
            Self::PartialProgress => "partial_progress",
            Self::CumulativeProgress => "cumulative_progress",
            Self::Disbursement => "disbursement",
            Self::CumulativeInvestment => "cumulative_investment",
            Self::PaymentDate => "payment_date",
        }
    }

    /// Key of the concept in the projection service's JSON.
    #[must_use]
    pub const fn projection_key(self) -> &'static str {
        match self {
            Self::MonthlyExpense => "gastoPorMes",
            Self::PartialProgress => "avanceParcial",
            Self::CumulativeProgress => "avanceAcumulado",
            Self::Disbursement => "ministraciones",
            Self::CumulativeInvestment => "inversionAcumulada",
            Self::PaymentDate => "fechasPago",
        }
    }

    /// Row label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MonthlyExpense => "Gasto por mes",
            Self::PartialProgress => "Avance parcial",
            Self::CumulativeProgress => "Avance acumulado",
            Self::Disbursement => "Ministraciones",
            Self::CumulativeInvestment => "Inversión acumulada",
            Self::PaymentDate => "Fechas de pago",
        }
    }

    /// Value kind of the row.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::MonthlyExpense | Self::Disbursement => ValueKind::Currency,
            Self::PartialProgress | Self::CumulativeProgress | Self::CumulativeInvestment => {
                ValueKind::Percent
            }
            Self::PaymentDate => ValueKind::Dates,
        }
    }

    /// Whether the row has a TOTAL column (sum over months).
    #[must_use]
    pub const fn is_additive(self) -> bool {
        matches!(
            self,
            Self::MonthlyExpense | Self::PartialProgress | Self::Disbursement
        )
    }
}

impl fmt::Display for MatrixConcept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatrixConcept {
    type Err = MatrixError;

    /// Accepts the snake_case name or the projection key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|concept| concept.as_str() == s || concept.projection_key() == s)
            .ok_or_else(|| MatrixError::UnknownConcept(s.to_string()))
    }
}

/// Composite key of an override cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverrideKey {
    /// Month number, starting at 1.
    pub month: u32,
    /// Row concept.
    pub concept: MatrixConcept,
}

impl OverrideKey {
    /// Builds a key, rejecting month 0.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError::InvalidMonth` if `month` is 0.
    pub fn new(month: u32, concept: MatrixConcept) -> Result<Self, MatrixError> {
        if month == 0 {
            return Err(MatrixError::InvalidMonth(0));
        }
        Ok(Self { month, concept })
    }
}

/// A rendered cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Money amount.
    Amount(Decimal),
    /// Percentage.
    Percent(Decimal),
    /// Payment dates.
    Dates(Vec<String>),
    /// Override text that is not a number.
    Text(String),
}

impl CellValue {
    /// Coerces an override's literal text for display in a row of `kind`.
    ///
    /// Thousands separators, currency and percent signs are ignored when
    /// parsing; text that still does not parse is shown verbatim.
    #[must_use]
    pub fn from_override(kind: ValueKind, raw: &str) -> Self {
        let numeric = || {
            let cleaned: String = raw
                .trim()
                .chars()
                .filter(|c| !matches!(c, ',' | '$' | '%' | ' '))
                .collect();
            Decimal::from_str(&cleaned).ok()
        };
        match kind {
            ValueKind::Currency => {
                numeric().map_or_else(|| Self::Text(raw.to_string()), Self::Amount)
            }
            ValueKind::Percent => {
                numeric().map_or_else(|| Self::Text(raw.to_string()), Self::Percent)
            }
            ValueKind::Dates => Self::Text(raw.to_string()),
        }
    }

    /// Returns the numeric value of amount and percent cells.
    #[must_use]
    pub const fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Amount(d) | Self::Percent(d) => Some(*d),
            Self::Dates(_) | Self::Text(_) => None,
        }
    }
}

/// Computed month-indexed values for one budget.
///
/// Field names on the wire follow the projection service's JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedMatrix {
    /// Expense per month.
    #[serde(default, rename = "gastoPorMes")]
    pub monthly_expense: BTreeMap<u32, Decimal>,
    /// Partial progress percent per month.
    #[serde(default, rename = "avanceParcial")]
    pub partial_progress: BTreeMap<u32, Decimal>,
    /// Cumulative progress percent per month.
    #[serde(default, rename = "avanceAcumulado")]
    pub cumulative_progress: BTreeMap<u32, Decimal>,
    /// Disbursement per month.
    #[serde(default, rename = "ministraciones")]
    pub disbursements: BTreeMap<u32, Decimal>,
    /// Cumulative investment percent per month.
    #[serde(default, rename = "inversionAcumulada")]
    pub cumulative_investment: BTreeMap<u32, Decimal>,
    /// Tentative payment dates per month.
    #[serde(default, rename = "fechasPago")]
    pub payment_dates: BTreeMap<u32, Vec<String>>,
    /// Budget grand total.
    #[serde(default, rename = "totalPresupuesto")]
    pub total_budget: Decimal,
}

impl ComputedMatrix {
    fn numeric_row(&self, concept: MatrixConcept) -> Option<&BTreeMap<u32, Decimal>> {
        match concept {
            MatrixConcept::MonthlyExpense => Some(&self.monthly_expense),
            MatrixConcept::PartialProgress => Some(&self.partial_progress),
            MatrixConcept::CumulativeProgress => Some(&self.cumulative_progress),
            MatrixConcept::Disbursement => Some(&self.disbursements),
            MatrixConcept::CumulativeInvestment => Some(&self.cumulative_investment),
            MatrixConcept::PaymentDate => None,
        }
    }

    /// Computed value of one cell, if the projection produced one.
    #[must_use]
    pub fn value(&self, month: u32, concept: MatrixConcept) -> Option<CellValue> {
        match concept.kind() {
            ValueKind::Currency => self
                .numeric_row(concept)
                .and_then(|row| row.get(&month))
                .map(|v| CellValue::Amount(*v)),
            ValueKind::Percent => self
                .numeric_row(concept)
                .and_then(|row| row.get(&month))
                .map(|v| CellValue::Percent(*v)),
            ValueKind::Dates => self
                .payment_dates
                .get(&month)
                .map(|dates| CellValue::Dates(dates.clone())),
        }
    }

    /// Sum of the computed values of an additive row.
    #[must_use]
    pub fn total(&self, concept: MatrixConcept) -> Option<Decimal> {
        if !concept.is_additive() {
            return None;
        }
        self.numeric_row(concept).map(|row| row.values().copied().sum())
    }

    /// Every month any row has a value for, ascending.
    #[must_use]
    pub fn months(&self) -> Vec<u32> {
        let mut months: Vec<u32> = [
            &self.monthly_expense,
            &self.partial_progress,
            &self.cumulative_progress,
            &self.disbursements,
            &self.cumulative_investment,
        ]
        .into_iter()
        .flat_map(|row| row.keys().copied())
        .chain(self.payment_dates.keys().copied())
        .collect();
        months.sort_unstable();
        months.dedup();
        months
    }
}
