//! # Discount Scenario
//!
//! Compares the captive-market projection with a free-market scenario priced
//! at a flat discount. A linear transform over [`ProjectionResult`], not a
//! second engine.
//!
//! ```text
//!   captive month cost ──┬──► × factor        = simulated
//!                        └──► × (1 − factor)  = savings
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::projection::ProjectionResult;
use crate::types::YearMonth;

/// Multiplier applied to captive costs, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "f64", into = "f64")]
pub struct DiscountFactor(f64);

impl DiscountFactor {
    /// Free-market price as a share of the captive price.
    pub const DEFAULT: DiscountFactor = DiscountFactor(0.85);

    pub fn new(factor: f64) -> CoreResult<Self> {
        if factor > 0.0 && factor <= 1.0 {
            Ok(DiscountFactor(factor))
        } else {
            Err(CoreError::InvalidDiscountFactor(factor))
        }
    }

    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Share of the captive cost saved.
    #[inline]
    pub fn savings_share(&self) -> f64 {
        1.0 - self.0
    }
}

impl Default for DiscountFactor {
    fn default() -> Self {
        DiscountFactor::DEFAULT
    }
}

impl TryFrom<f64> for DiscountFactor {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        DiscountFactor::new(value)
    }
}

impl From<DiscountFactor> for f64 {
    fn from(factor: DiscountFactor) -> Self {
        factor.0
    }
}

/// One month of the comparison. Keys follow the dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScenarioMonth {
    #[serde(rename = "mes")]
    #[ts(as = "String")]
    pub month: YearMonth,
    #[serde(rename = "custoAtual")]
    pub captive_cost: f64,
    #[serde(rename = "custoSimulado")]
    pub simulated_cost: f64,
    #[serde(rename = "economia")]
    pub savings: f64,
}

/// Captive vs. discounted totals for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountScenario {
    #[serde(rename = "custo_atual")]
    pub captive_total: f64,
    #[serde(rename = "custo_simulado")]
    pub simulated_total: f64,
    #[serde(rename = "economia_reais")]
    pub savings_total: f64,
    #[serde(rename = "economia_percentual")]
    pub savings_percent: f64,
    #[serde(rename = "detalhes_mensais")]
    pub monthly: Vec<ScenarioMonth>,
}

impl DiscountScenario {
    /// Applies `factor` to every cost of a captive projection.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use proposta_core::projection::{simulate, Horizon, SimulationInput, SimulationRequest};
    /// use proposta_core::scenario::{DiscountFactor, DiscountScenario};
    ///
    /// let request = SimulationRequest::new(
    ///     SimulationInput::lead(Some(1000.0), Some(50.0)),
    ///     Horizon::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 12).unwrap(),
    /// );
    /// let captive = simulate(&request).unwrap();
    /// let scenario = DiscountScenario::from_projection(&captive, DiscountFactor::default());
    ///
    /// assert_eq!(scenario.monthly.len(), 12);
    /// assert!((scenario.savings_percent - 15.0).abs() < 1e-9);
    /// ```
    pub fn from_projection(captive: &ProjectionResult, factor: DiscountFactor) -> Self {
        let captive_total = captive.totals.total_cost_for_period;

        let monthly = captive
            .monthly
            .iter()
            .map(|m| ScenarioMonth {
                month: m.month,
                captive_cost: m.total_cost,
                simulated_cost: m.total_cost * factor.value(),
                savings: m.total_cost * factor.savings_share(),
            })
            .collect();

        DiscountScenario {
            captive_total,
            simulated_total: captive_total * factor.value(),
            savings_total: captive_total * factor.savings_share(),
            savings_percent: factor.savings_share() * 100.0,
            monthly,
        }
    }
}
