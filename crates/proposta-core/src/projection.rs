//! # Projection Engine
//!
//! Turns average consumption and demand into a month-by-month cost forecast.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         simulate(request)                               │
//! │                                                                         │
//! │   Client: history ──► avg kWh, avg DemandaCP     Lead: estimates        │
//! │                 │                                     │                 │
//! │                 └──────────────┬──────────────────────┘                 │
//! │                                ▼                                        │
//! │   consumption_cost = avg_kwh × TE off-peak                              │
//! │   demand_cost      = avg_kw  × TUSD demand                              │
//! │   subtotal         = consumption_cost + demand_cost                     │
//! │   total_monthly    = subtotal × 1 / (1 − ICMS/100)      (gross-up)      │
//! │   tax_cost         = total_monthly − subtotal                           │
//! │                                ▼                                        │
//! │   Horizon: start month … start + (n−1), every month identical           │
//! │                                ▼                                        │
//! │   ProjectionResult { totais, detalhes_mensais }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine assumes constant averages over the horizon: no seasonality, no
//! price escalation. Identical input always yields identical output.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{SimulationError, SimulationResult};
use crate::numeric::deserialize_lenient;
use crate::types::{MonthlyRecord, YearMonth};

/// ICMS rate applied to lead projections, in percent.
pub const DEFAULT_LEAD_ICMS_RATE: f64 = 17.0;

/// Longest horizon accepted: January of year 1 through December of year 9999.
pub const MAX_HORIZON_MONTHS: u32 = 9999 * 12;

// =============================================================================
// Prices
// =============================================================================

/// Unit prices used by the projection.
///
/// The peak energy price is carried for completeness; the current model bills
/// all energy at the off-peak rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct TariffPrices {
    /// Energy tariff (TE) at peak, per kWh.
    pub te_peak: f64,
    /// Energy tariff (TE) off-peak, per kWh.
    pub te_off_peak: f64,
    /// Distribution tariff (TUSD), per kW of demand.
    pub tusd_demand: f64,
}

impl Default for TariffPrices {
    fn default() -> Self {
        TariffPrices {
            te_peak: 0.65,
            te_off_peak: 0.45,
            tusd_demand: 30.00,
        }
    }
}

// =============================================================================
// ICMS Rate
// =============================================================================

/// ICMS (state VAT) rate as a percentage, e.g. `17.0`.
///
/// Brazilian ICMS is charged "por dentro": the tax is part of its own base,
/// so prices are grossed up rather than multiplied by `1 + rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IcmsRate(f64);

impl IcmsRate {
    #[inline]
    pub const fn from_percentage(pct: f64) -> Self {
        IcmsRate(pct)
    }

    #[inline]
    pub const fn zero() -> Self {
        IcmsRate(0.0)
    }

    #[inline]
    pub const fn percentage(&self) -> f64 {
        self.0
    }

    /// Multiplier that turns a pre-tax amount into the taxed amount.
    ///
    /// Rates of 100 % or more would divide by zero or flip the sign, so they
    /// fall back to a factor of 1.
    ///
    /// ## Example
    /// ```rust
    /// use proposta_core::projection::IcmsRate;
    ///
    /// let factor = IcmsRate::from_percentage(17.0).gross_up_factor();
    /// assert!((factor - 1.0 / 0.83).abs() < 1e-12);
    /// assert_eq!(IcmsRate::from_percentage(100.0).gross_up_factor(), 1.0);
    /// ```
    pub fn gross_up_factor(&self) -> f64 {
        if self.0 < 100.0 {
            1.0 / (1.0 - self.0 / 100.0)
        } else {
            1.0
        }
    }
}

impl Default for IcmsRate {
    fn default() -> Self {
        IcmsRate::zero()
    }
}

// =============================================================================
// Request
// =============================================================================

/// Who the projection is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SimulationKind {
    /// An existing unit with stored history.
    Client,
    /// A prospect with estimated figures only.
    Lead,
}

impl FromStr for SimulationKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" | "cliente" => Ok(SimulationKind::Client),
            "lead" => Ok(SimulationKind::Lead),
            _ => Err(SimulationError::InvalidKind(s.to_string())),
        }
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationKind::Client => f.write_str("client"),
            SimulationKind::Lead => f.write_str("lead"),
        }
    }
}

/// What the averages are computed from.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationInput {
    Client {
        icms_rate: IcmsRate,
        monthly_records: Vec<MonthlyRecord>,
    },
    Lead {
        estimated_consumption_kwh: f64,
        estimated_demand_kw: f64,
        icms_rate: IcmsRate,
    },
}

impl SimulationInput {
    pub fn client(icms_rate: IcmsRate, monthly_records: Vec<MonthlyRecord>) -> Self {
        SimulationInput::Client {
            icms_rate,
            monthly_records,
        }
    }

    /// Lead input at the standard lead ICMS rate. Missing estimates count as 0.
    pub fn lead(consumption_kwh: Option<f64>, demand_kw: Option<f64>) -> Self {
        SimulationInput::lead_with_rate(
            consumption_kwh,
            demand_kw,
            IcmsRate::from_percentage(DEFAULT_LEAD_ICMS_RATE),
        )
    }

    pub fn lead_with_rate(
        consumption_kwh: Option<f64>,
        demand_kw: Option<f64>,
        icms_rate: IcmsRate,
    ) -> Self {
        SimulationInput::Lead {
            estimated_consumption_kwh: consumption_kwh.unwrap_or(0.0),
            estimated_demand_kw: demand_kw.unwrap_or(0.0),
            icms_rate,
        }
    }

    pub fn kind(&self) -> SimulationKind {
        match self {
            SimulationInput::Client { .. } => SimulationKind::Client,
            SimulationInput::Lead { .. } => SimulationKind::Lead,
        }
    }

    pub fn icms_rate(&self) -> IcmsRate {
        match self {
            SimulationInput::Client { icms_rate, .. } => *icms_rate,
            SimulationInput::Lead { icms_rate, .. } => *icms_rate,
        }
    }

    /// Average monthly consumption (kWh) and demand (kW).
    fn averages(&self) -> SimulationResult<(f64, f64)> {
        match self {
            SimulationInput::Client {
                monthly_records, ..
            } => {
                if monthly_records.is_empty() {
                    return Err(SimulationError::NoHistory);
                }
                let count = monthly_records.len() as f64;
                let consumption: f64 = monthly_records
                    .iter()
                    .map(MonthlyRecord::total_consumption_kwh)
                    .sum();
                let demand: f64 = monthly_records
                    .iter()
                    .map(|r| r.demanda_cp.unwrap_or(0.0))
                    .sum();
                Ok((consumption / count, demand / count))
            }
            SimulationInput::Lead {
                estimated_consumption_kwh,
                estimated_demand_kw,
                ..
            } => Ok((*estimated_consumption_kwh, *estimated_demand_kw)),
        }
    }
}

/// First month and length of the forecast.
///
/// Built only through [`Horizon::new`], so the length is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Horizon {
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(type = "number")]
    pub duration_months: NonZeroU32,
}

impl Horizon {
    /// Fails with [`SimulationError::InvalidDuration`] for zero months or more
    /// than [`MAX_HORIZON_MONTHS`].
    pub fn new(start_date: NaiveDate, duration_months: u32) -> SimulationResult<Self> {
        if duration_months > MAX_HORIZON_MONTHS {
            return Err(SimulationError::InvalidDuration);
        }
        let duration_months =
            NonZeroU32::new(duration_months).ok_or(SimulationError::InvalidDuration)?;
        Ok(Horizon {
            start_date,
            duration_months,
        })
    }

    #[inline]
    pub fn months(&self) -> u32 {
        self.duration_months.get()
    }

    /// Month labels covered by the horizon, in order.
    pub fn month_labels(&self) -> impl Iterator<Item = YearMonth> {
        let first = YearMonth::from_date(self.start_date);
        (0..self.months()).map(move |i| first.plus_months(i))
    }
}

/// A validated projection request.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub input: SimulationInput,
    pub horizon: Horizon,
}

impl SimulationRequest {
    pub fn new(input: SimulationInput, horizon: Horizon) -> Self {
        SimulationRequest { input, horizon }
    }

    /// Converts the wire request, pricing leads at `lead_icms`.
    ///
    /// A client request without `aliquota_icms` is projected untaxed.
    pub fn from_dto(dto: SimulationRequestDto, lead_icms: IcmsRate) -> SimulationResult<Self> {
        let kind = match dto.kind.as_deref() {
            Some(raw) => raw.parse()?,
            None => SimulationKind::Client,
        };

        let input = match kind {
            SimulationKind::Client => SimulationInput::client(
                dto.icms_rate
                    .map(IcmsRate::from_percentage)
                    .unwrap_or_default(),
                dto.history,
            ),
            SimulationKind::Lead => SimulationInput::lead_with_rate(
                dto.estimated_consumption_kwh,
                dto.estimated_demand_kw,
                lead_icms,
            ),
        };

        Ok(SimulationRequest {
            input,
            horizon: Horizon::new(dto.start_date, dto.duration_months)?,
        })
    }
}

/// Request body as sent by the simulation form.
///
/// Lead requests never carry a tax rate: the lead rate is fixed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SimulationRequestDto {
    /// `"client"`, `"cliente"` or `"lead"`; absent means client.
    #[serde(rename = "tipo")]
    #[serde(alias = "kind", default)]
    pub kind: Option<String>,

    #[serde(rename = "aliquota_icms")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub icms_rate: Option<f64>,

    #[serde(rename = "historico", default)]
    pub history: Vec<MonthlyRecord>,

    #[serde(rename = "consumo_estimado")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub estimated_consumption_kwh: Option<f64>,

    #[serde(rename = "demanda_estimada")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub estimated_demand_kw: Option<f64>,

    #[serde(rename = "data_inicio")]
    #[ts(as = "String")]
    pub start_date: NaiveDate,

    #[serde(rename = "duracao_meses")]
    pub duration_months: u32,
}

impl TryFrom<SimulationRequestDto> for SimulationRequest {
    type Error = SimulationError;

    fn try_from(dto: SimulationRequestDto) -> Result<Self, Self::Error> {
        SimulationRequest::from_dto(dto, IcmsRate::from_percentage(DEFAULT_LEAD_ICMS_RATE))
    }
}

// =============================================================================
// Result
// =============================================================================

/// Forecast totals over the whole horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProjectionTotals {
    #[serde(rename = "custo_total_periodo")]
    pub total_cost_for_period: f64,
    #[serde(rename = "custo_medio_mensal")]
    pub average_monthly_cost: f64,
    #[serde(rename = "consumo_total_periodo")]
    pub total_consumption_for_period: f64,
    #[serde(rename = "demanda_media")]
    pub average_demand: f64,
    #[serde(rename = "duracao_meses")]
    pub duration_months: u32,
}

/// One month of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyBreakdown {
    #[serde(rename = "mes")]
    #[ts(as = "String")]
    pub month: YearMonth,
    #[serde(rename = "consumo_total_kwh")]
    pub consumption_kwh: f64,
    #[serde(rename = "demanda_total_kw")]
    pub demand_kw: f64,
    #[serde(rename = "custo_consumo")]
    pub consumption_cost: f64,
    #[serde(rename = "custo_demanda")]
    pub demand_cost: f64,
    #[serde(rename = "custo_impostos")]
    pub tax_cost: f64,
    #[serde(rename = "custo_total_mes")]
    pub total_cost: f64,
}

/// Output of [`simulate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProjectionResult {
    #[serde(rename = "totais")]
    pub totals: ProjectionTotals,
    #[serde(rename = "detalhes_mensais")]
    pub monthly: Vec<MonthlyBreakdown>,
}

// =============================================================================
// Engine
// =============================================================================

/// Projects with the default [`TariffPrices`].
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use proposta_core::projection::{simulate, Horizon, SimulationInput, SimulationRequest};
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let request = SimulationRequest::new(
///     SimulationInput::lead(Some(1000.0), Some(50.0)),
///     Horizon::new(start, 3).unwrap(),
/// );
///
/// let result = simulate(&request).unwrap();
/// assert_eq!(result.monthly.len(), 3);
/// assert_eq!(result.monthly[2].month.to_string(), "2025-03");
/// ```
pub fn simulate(request: &SimulationRequest) -> SimulationResult<ProjectionResult> {
    simulate_with_prices(request, &TariffPrices::default())
}

/// Projects with explicit prices.
pub fn simulate_with_prices(
    request: &SimulationRequest,
    prices: &TariffPrices,
) -> SimulationResult<ProjectionResult> {
    let (avg_consumption, avg_demand) = request.input.averages()?;
    let tax_factor = request.input.icms_rate().gross_up_factor();

    let consumption_cost = avg_consumption * prices.te_off_peak;
    let demand_cost = avg_demand * prices.tusd_demand;
    let subtotal = consumption_cost + demand_cost;
    let total_monthly_cost = subtotal * tax_factor;
    let tax_cost = total_monthly_cost - subtotal;

    let monthly: Vec<MonthlyBreakdown> = request
        .horizon
        .month_labels()
        .map(|month| MonthlyBreakdown {
            month,
            consumption_kwh: avg_consumption,
            demand_kw: avg_demand,
            consumption_cost,
            demand_cost,
            tax_cost,
            total_cost: total_monthly_cost,
        })
        .collect();

    let months = request.horizon.months();
    Ok(ProjectionResult {
        totals: ProjectionTotals {
            total_cost_for_period: total_monthly_cost * months as f64,
            average_monthly_cost: total_monthly_cost,
            total_consumption_for_period: avg_consumption * months as f64,
            average_demand: avg_demand,
            duration_months: months,
        },
        monthly,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MonthlyField;

    const EPS: f64 = 1e-6;

    fn jan_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn lead_request(months: u32) -> SimulationRequest {
        SimulationRequest::new(
            SimulationInput::lead(Some(1000.0), Some(50.0)),
            Horizon::new(jan_2025(), months).unwrap(),
        )
    }

    #[test]
    fn test_lead_reference_projection() {
        let result = simulate(&lead_request(3)).unwrap();

        let month = &result.monthly[0];
        assert!((month.consumption_cost - 450.0).abs() < EPS);
        assert!((month.demand_cost - 1500.0).abs() < EPS);
        assert!((month.consumption_cost + month.demand_cost - 1950.0).abs() < EPS);
        assert!((IcmsRate::from_percentage(17.0).gross_up_factor() - 1.2048).abs() < 1e-4);
        assert!((month.total_cost - 2349.4).abs() < 0.01);
        assert!((month.tax_cost - (month.total_cost - 1950.0)).abs() < EPS);
        assert!((result.totals.total_cost_for_period - 7048.2).abs() < 0.01);
        assert_eq!(result.totals.duration_months, 3);
    }

    #[test]
    fn test_every_month_identical_except_label() {
        let result = simulate(&lead_request(3)).unwrap();
        assert_eq!(result.monthly.len(), 3);

        let labels: Vec<String> = result.monthly.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(labels, ["2025-01", "2025-02", "2025-03"]);

        for month in &result.monthly[1..] {
            assert_eq!(month.total_cost, result.monthly[0].total_cost);
            assert_eq!(month.consumption_kwh, result.monthly[0].consumption_kwh);
            assert_eq!(month.demand_kw, result.monthly[0].demand_kw);
        }
    }

    #[test]
    fn test_client_without_history_is_rejected() {
        let request = SimulationRequest::new(
            SimulationInput::client(IcmsRate::from_percentage(18.0), vec![]),
            Horizon::new(jan_2025(), 12).unwrap(),
        );
        assert_eq!(simulate(&request), Err(SimulationError::NoHistory));
    }

    #[test]
    fn test_client_averages_history() {
        let history = vec![
            MonthlyRecord::default()
                .with(MonthlyField::KwhProjPonta, 100.0)
                .with(MonthlyField::KwhProjForaPonta, 900.0)
                .with(MonthlyField::DemandaCp, 40.0),
            MonthlyRecord::default()
                .with(MonthlyField::KwhProjForaPonta, 2000.0)
                .with(MonthlyField::DemandaCfp, 500.0),
        ];
        let request = SimulationRequest::new(
            SimulationInput::client(IcmsRate::zero(), history),
            Horizon::new(jan_2025(), 2).unwrap(),
        );

        let result = simulate(&request).unwrap();
        assert!((result.totals.average_demand - 20.0).abs() < EPS);
        assert!((result.monthly[0].consumption_kwh - 1500.0).abs() < EPS);
        assert!((result.totals.total_consumption_for_period - 3000.0).abs() < EPS);
        assert_eq!(result.monthly[0].tax_cost, 0.0);
    }

    #[test]
    fn test_simulation_is_idempotent() {
        let request = lead_request(24);
        let first = serde_json::to_string(&simulate(&request).unwrap()).unwrap();
        let second = serde_json::to_string(&simulate(&request).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_tax_rates() {
        assert_eq!(IcmsRate::from_percentage(100.0).gross_up_factor(), 1.0);
        assert_eq!(IcmsRate::from_percentage(250.0).gross_up_factor(), 1.0);
        assert_eq!(IcmsRate::zero().gross_up_factor(), 1.0);
    }

    #[test]
    fn test_lead_missing_estimates_count_as_zero() {
        let request = SimulationRequest::new(
            SimulationInput::lead(None, None),
            Horizon::new(jan_2025(), 1).unwrap(),
        );
        let result = simulate(&request).unwrap();
        assert_eq!(result.totals.total_cost_for_period, 0.0);
    }

    #[test]
    fn test_custom_prices() {
        let prices = TariffPrices {
            te_peak: 1.0,
            te_off_peak: 1.0,
            tusd_demand: 10.0,
        };
        let request = SimulationRequest::new(
            SimulationInput::lead_with_rate(Some(100.0), Some(5.0), IcmsRate::zero()),
            Horizon::new(jan_2025(), 1).unwrap(),
        );
        let result = simulate_with_prices(&request, &prices).unwrap();
        assert!((result.totals.total_cost_for_period - 150.0).abs() < EPS);
    }

    #[test]
    fn test_duration_bounds() {
        assert_eq!(
            Horizon::new(jan_2025(), 0),
            Err(SimulationError::InvalidDuration)
        );
        assert_eq!(
            Horizon::new(jan_2025(), MAX_HORIZON_MONTHS + 1),
            Err(SimulationError::InvalidDuration)
        );
        assert_eq!(
            Horizon::new(jan_2025(), u32::MAX),
            Err(SimulationError::InvalidDuration)
        );
        assert_eq!(
            Horizon::new(jan_2025(), MAX_HORIZON_MONTHS).map(|h| h.months()),
            Ok(MAX_HORIZON_MONTHS)
        );
    }

    #[test]
    fn test_huge_wire_duration_is_rejected_before_projecting() {
        let dto: SimulationRequestDto = serde_json::from_str(
            r#"{"tipo": "lead", "consumo_estimado": 1000, "data_inicio": "2025-01-01",
                "duracao_meses": 4000000000}"#,
        )
        .unwrap();
        assert_eq!(
            SimulationRequest::try_from(dto),
            Err(SimulationError::InvalidDuration)
        );
    }

    #[test]
    fn test_typescript_request_uses_wire_names() {
        let decl = SimulationRequestDto::decl();
        for name in [
            "tipo",
            "aliquota_icms",
            "historico",
            "consumo_estimado",
            "demanda_estimada",
            "data_inicio",
            "duracao_meses",
        ] {
            assert!(decl.contains(name), "{name} missing from {decl}");
        }
        assert!(!decl.contains("icms_rate"));
        assert!(!decl.contains("estimated_consumption_kwh"));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("client".parse::<SimulationKind>(), Ok(SimulationKind::Client));
        assert_eq!(" Cliente ".parse::<SimulationKind>(), Ok(SimulationKind::Client));
        assert_eq!("LEAD".parse::<SimulationKind>(), Ok(SimulationKind::Lead));
        assert_eq!(
            "prospect".parse::<SimulationKind>(),
            Err(SimulationError::InvalidKind("prospect".to_string()))
        );
    }

    #[test]
    fn test_dto_conversion() {
        let dto: SimulationRequestDto = serde_json::from_str(
            r#"{
                "tipo": "lead",
                "consumo_estimado": "1000",
                "demanda_estimada": 50,
                "aliquota_icms": 25,
                "data_inicio": "2025-01-01",
                "duracao_meses": 3
            }"#,
        )
        .unwrap();
        let request = SimulationRequest::try_from(dto).unwrap();

        assert_eq!(request.input.kind(), SimulationKind::Lead);
        // Leads ignore any submitted rate.
        assert_eq!(request.input.icms_rate().percentage(), 17.0);
        assert_eq!(request.horizon.months(), 3);
    }

    #[test]
    fn test_dto_defaults_to_client() {
        let dto: SimulationRequestDto = serde_json::from_str(
            r#"{"data_inicio": "2025-01-01", "duracao_meses": 1}"#,
        )
        .unwrap();
        let request = SimulationRequest::try_from(dto).unwrap();
        assert_eq!(request.input.kind(), SimulationKind::Client);
        assert_eq!(simulate(&request), Err(SimulationError::NoHistory));
    }

    #[test]
    fn test_dto_rejects_bad_kind_and_duration() {
        let bad_kind: SimulationRequestDto = serde_json::from_str(
            r#"{"tipo": "x", "data_inicio": "2025-01-01", "duracao_meses": 1}"#,
        )
        .unwrap();
        assert!(matches!(
            SimulationRequest::try_from(bad_kind),
            Err(SimulationError::InvalidKind(_))
        ));

        let zero: SimulationRequestDto = serde_json::from_str(
            r#"{"tipo": "lead", "data_inicio": "2025-01-01", "duracao_meses": 0}"#,
        )
        .unwrap();
        assert_eq!(
            SimulationRequest::try_from(zero),
            Err(SimulationError::InvalidDuration)
        );
    }

    #[test]
    fn test_result_wire_keys() {
        let json = serde_json::to_value(simulate(&lead_request(1)).unwrap()).unwrap();
        assert!(json["totais"]["custo_total_periodo"].is_number());
        assert_eq!(json["totais"]["duracao_meses"], 1);
        assert_eq!(json["detalhes_mensais"][0]["mes"], "2025-01");
        assert!(json["detalhes_mensais"][0]["custo_impostos"].is_number());
    }
}
