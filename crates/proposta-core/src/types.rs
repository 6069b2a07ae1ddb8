//! # Domain Types
//!
//! Records the engines read. Wire names follow the stored rows
//! (`SubgrupoTarifario`, `kWhProjPonta`, ...) so the HTTP layer can pass row
//! JSON straight through.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────────┐   ┌──────────────┐  │
//! │  │   ConsumerUnit      │   │   MonthlyRecord     │   │  YearMonth   │  │
//! │  │  ─────────────────  │   │  ─────────────────  │   │  ──────────  │  │
//! │  │  SubgrupoTarifario  │   │  IDMes              │   │  2024-03     │  │
//! │  │  Tarifa             │   │  16 numeric fields  │   │  202403      │  │
//! │  │  PossuiUsina        │   │  (Option<f64>)      │   └──────────────┘  │
//! │  │  BeneficioRural...  │   └─────────────────────┘                     │
//! │  │  AliquotaICMS       │   ┌─────────────────────┐                     │
//! │  └─────────────────────┘   │   MonthlyField      │                     │
//! │                            │  fixed field order  │                     │
//! │                            └─────────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use ts_rs::TS;

use crate::error::PeriodError;
use crate::numeric::{deserialize_lenient, deserialize_lenient_bool, is_nonzero};

// =============================================================================
// Year/Month
// =============================================================================

/// A calendar month, the identity of a history row within a unit.
///
/// Stored as `YYYYMM` (`IDMes`), displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month, or `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    /// The month a date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    #[inline]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Calendar month arithmetic.
    ///
    /// ## Example
    /// ```rust
    /// use proposta_core::types::YearMonth;
    ///
    /// let nov = YearMonth::new(2024, 11).unwrap();
    /// assert_eq!(nov.plus_months(3).to_string(), "2025-02");
    /// ```
    pub fn plus_months(self, months: u32) -> Self {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        YearMonth {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    fn from_id_mes(value: i64) -> Option<Self> {
        if value <= 0 {
            return None;
        }
        YearMonth::new((value / 100) as i32, (value % 100) as u32)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || PeriodError::InvalidYearMonth(s.to_string());

        if let Some((year, month)) = trimmed.split_once('-') {
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let month: u32 = month.parse().map_err(|_| invalid())?;
            return YearMonth::new(year, month).ok_or_else(invalid);
        }

        if trimmed.len() == 6 && trimmed.chars().all(|c| c.is_ascii_digit()) {
            let value: i64 = trimmed.parse().map_err(|_| invalid())?;
            return YearMonth::from_id_mes(value).ok_or_else(invalid);
        }

        Err(invalid())
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(YearMonthVisitor)
    }
}

struct YearMonthVisitor;

impl<'de> Visitor<'de> for YearMonthVisitor {
    type Value = YearMonth;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a month as \"YYYY-MM\", \"YYYYMM\" or YYYYMM")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        YearMonth::from_id_mes(v)
            .ok_or_else(|| E::custom(PeriodError::InvalidYearMonth(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_i64(v as i64)
    }
}

// =============================================================================
// Monthly Field
// =============================================================================

/// The sixteen numeric fields of a history month.
///
/// Declaration order is the rule evaluation order: the first violated field
/// in this order is the one reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum MonthlyField {
    #[serde(rename = "kWProjPonta")]
    KwProjPonta,
    #[serde(rename = "kWProjForaPonta")]
    KwProjForaPonta,
    #[serde(rename = "kWhProjPonta")]
    KwhProjPonta,
    #[serde(rename = "kWhProjForaPonta")]
    KwhProjForaPonta,
    #[serde(rename = "kWhProjHRes")]
    KwhProjHRes,
    #[serde(rename = "kWhCompensadoHr")]
    KwhCompensadoHr,
    #[serde(rename = "kWhProjDieselP")]
    KwhProjDieselP,
    #[serde(rename = "kWhProjPontaG")]
    KwhProjPontaG,
    #[serde(rename = "kWhProjForaPontaG")]
    KwhProjForaPontaG,
    #[serde(rename = "kWProjG")]
    KwProjG,
    #[serde(rename = "kWhCompensadoP")]
    KwhCompensadoP,
    #[serde(rename = "kWhCompensadoFP")]
    KwhCompensadoFp,
    #[serde(rename = "kWGeracaoProjetada")]
    KwGeracaoProjetada,
    #[serde(rename = "DemandaCP")]
    DemandaCp,
    #[serde(rename = "DemandaCFP")]
    DemandaCfp,
    #[serde(rename = "DemandaCG")]
    DemandaCg,
}

impl MonthlyField {
    /// Every field, in evaluation order.
    pub const ALL: [MonthlyField; 16] = [
        MonthlyField::KwProjPonta,
        MonthlyField::KwProjForaPonta,
        MonthlyField::KwhProjPonta,
        MonthlyField::KwhProjForaPonta,
        MonthlyField::KwhProjHRes,
        MonthlyField::KwhCompensadoHr,
        MonthlyField::KwhProjDieselP,
        MonthlyField::KwhProjPontaG,
        MonthlyField::KwhProjForaPontaG,
        MonthlyField::KwProjG,
        MonthlyField::KwhCompensadoP,
        MonthlyField::KwhCompensadoFp,
        MonthlyField::KwGeracaoProjetada,
        MonthlyField::DemandaCp,
        MonthlyField::DemandaCfp,
        MonthlyField::DemandaCg,
    ];

    /// Column name used by stored rows and the history form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MonthlyField::KwProjPonta => "kWProjPonta",
            MonthlyField::KwProjForaPonta => "kWProjForaPonta",
            MonthlyField::KwhProjPonta => "kWhProjPonta",
            MonthlyField::KwhProjForaPonta => "kWhProjForaPonta",
            MonthlyField::KwhProjHRes => "kWhProjHRes",
            MonthlyField::KwhCompensadoHr => "kWhCompensadoHr",
            MonthlyField::KwhProjDieselP => "kWhProjDieselP",
            MonthlyField::KwhProjPontaG => "kWhProjPontaG",
            MonthlyField::KwhProjForaPontaG => "kWhProjForaPontaG",
            MonthlyField::KwProjG => "kWProjG",
            MonthlyField::KwhCompensadoP => "kWhCompensadoP",
            MonthlyField::KwhCompensadoFp => "kWhCompensadoFP",
            MonthlyField::KwGeracaoProjetada => "kWGeracaoProjetada",
            MonthlyField::DemandaCp => "DemandaCP",
            MonthlyField::DemandaCfp => "DemandaCFP",
            MonthlyField::DemandaCg => "DemandaCG",
        }
    }
}

impl fmt::Display for MonthlyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Consumer Unit
// =============================================================================

/// A metering point, as far as classification is concerned.
///
/// Only the fields the engines read are modelled; the HTTP layer may pass a
/// full unit row and serde ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConsumerUnit {
    /// Unit number (`NumeroDaUcLead`), used only for messages.
    #[serde(rename = "NumeroDaUcLead", default)]
    pub unit_id: Option<String>,

    /// Regulatory subgroup code ("A4", "B3", ...).
    #[serde(rename = "SubgrupoTarifario", default)]
    pub subgroup: Option<String>,

    /// Tariff modality ("AZUL", "Verde", "Convencional", ...).
    #[serde(rename = "Tarifa", default)]
    pub tariff: Option<String>,

    /// Distributed generation on site.
    #[serde(rename = "PossuiUsina")]
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub has_generation: bool,

    /// Rural irrigation benefit; positive values qualify.
    #[serde(rename = "BeneficioRuralIrrigacao")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub rural_irrigation_benefit: Option<f64>,

    /// ICMS rate in percent, used by client projections.
    #[serde(rename = "AliquotaICMS")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub icms_rate: Option<f64>,
}

impl ConsumerUnit {
    /// Builds a unit from its classification inputs.
    pub fn new(subgroup: &str, tariff: &str) -> Self {
        ConsumerUnit {
            subgroup: Some(subgroup.to_string()),
            tariff: Some(tariff.to_string()),
            ..Default::default()
        }
    }

    pub fn with_generation(mut self, has_generation: bool) -> Self {
        self.has_generation = has_generation;
        self
    }

    pub fn with_rural_irrigation_benefit(mut self, benefit: f64) -> Self {
        self.rural_irrigation_benefit = Some(benefit);
        self
    }

    pub fn with_icms_rate(mut self, rate: f64) -> Self {
        self.icms_rate = Some(rate);
        self
    }
}

// =============================================================================
// Monthly Record
// =============================================================================

/// One month of consumption/demand history for a unit.
///
/// Every numeric field is coerced leniently on the way in; `None` means the
/// cell was blank or unreadable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyRecord {
    /// Month id (`IDMes`).
    #[serde(rename = "IDMes")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub year_month: Option<YearMonth>,

    #[serde(rename = "DemandaCP")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub demanda_cp: Option<f64>,
    #[serde(rename = "DemandaCFP")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub demanda_cfp: Option<f64>,
    #[serde(rename = "DemandaCG")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub demanda_cg: Option<f64>,
    #[serde(rename = "kWProjPonta")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kw_proj_ponta: Option<f64>,
    #[serde(rename = "kWProjForaPonta")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kw_proj_fora_ponta: Option<f64>,
    #[serde(rename = "kWhProjPonta")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_proj_ponta: Option<f64>,
    #[serde(rename = "kWhProjForaPonta")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_proj_fora_ponta: Option<f64>,
    #[serde(rename = "kWhProjHRes")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_proj_hres: Option<f64>,
    #[serde(rename = "kWhProjPontaG")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_proj_ponta_g: Option<f64>,
    #[serde(rename = "kWhProjForaPontaG")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_proj_fora_ponta_g: Option<f64>,
    #[serde(rename = "kWProjG")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kw_proj_g: Option<f64>,
    #[serde(rename = "kWhProjDieselP")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_proj_diesel_p: Option<f64>,
    #[serde(rename = "kWhCompensadoP")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_compensado_p: Option<f64>,
    #[serde(rename = "kWhCompensadoFP")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_compensado_fp: Option<f64>,
    #[serde(rename = "kWhCompensadoHr")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kwh_compensado_hr: Option<f64>,
    #[serde(rename = "kWGeracaoProjetada")]
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub kw_geracao_projetada: Option<f64>,
}

impl MonthlyRecord {
    /// An empty record for the given month.
    pub fn for_month(year_month: YearMonth) -> Self {
        MonthlyRecord {
            year_month: Some(year_month),
            ..Default::default()
        }
    }

    /// Coerced value of a field.
    pub fn value(&self, field: MonthlyField) -> Option<f64> {
        match field {
            MonthlyField::KwProjPonta => self.kw_proj_ponta,
            MonthlyField::KwProjForaPonta => self.kw_proj_fora_ponta,
            MonthlyField::KwhProjPonta => self.kwh_proj_ponta,
            MonthlyField::KwhProjForaPonta => self.kwh_proj_fora_ponta,
            MonthlyField::KwhProjHRes => self.kwh_proj_hres,
            MonthlyField::KwhCompensadoHr => self.kwh_compensado_hr,
            MonthlyField::KwhProjDieselP => self.kwh_proj_diesel_p,
            MonthlyField::KwhProjPontaG => self.kwh_proj_ponta_g,
            MonthlyField::KwhProjForaPontaG => self.kwh_proj_fora_ponta_g,
            MonthlyField::KwProjG => self.kw_proj_g,
            MonthlyField::KwhCompensadoP => self.kwh_compensado_p,
            MonthlyField::KwhCompensadoFp => self.kwh_compensado_fp,
            MonthlyField::KwGeracaoProjetada => self.kw_geracao_projetada,
            MonthlyField::DemandaCp => self.demanda_cp,
            MonthlyField::DemandaCfp => self.demanda_cfp,
            MonthlyField::DemandaCg => self.demanda_cg,
        }
    }

    fn slot(&mut self, field: MonthlyField) -> &mut Option<f64> {
        match field {
            MonthlyField::KwProjPonta => &mut self.kw_proj_ponta,
            MonthlyField::KwProjForaPonta => &mut self.kw_proj_fora_ponta,
            MonthlyField::KwhProjPonta => &mut self.kwh_proj_ponta,
            MonthlyField::KwhProjForaPonta => &mut self.kwh_proj_fora_ponta,
            MonthlyField::KwhProjHRes => &mut self.kwh_proj_hres,
            MonthlyField::KwhCompensadoHr => &mut self.kwh_compensado_hr,
            MonthlyField::KwhProjDieselP => &mut self.kwh_proj_diesel_p,
            MonthlyField::KwhProjPontaG => &mut self.kwh_proj_ponta_g,
            MonthlyField::KwhProjForaPontaG => &mut self.kwh_proj_fora_ponta_g,
            MonthlyField::KwProjG => &mut self.kw_proj_g,
            MonthlyField::KwhCompensadoP => &mut self.kwh_compensado_p,
            MonthlyField::KwhCompensadoFp => &mut self.kwh_compensado_fp,
            MonthlyField::KwGeracaoProjetada => &mut self.kw_geracao_projetada,
            MonthlyField::DemandaCp => &mut self.demanda_cp,
            MonthlyField::DemandaCfp => &mut self.demanda_cfp,
            MonthlyField::DemandaCg => &mut self.demanda_cg,
        }
    }

    /// Sets a field (builder style).
    pub fn with(mut self, field: MonthlyField, value: f64) -> Self {
        *self.slot(field) = Some(value);
        self
    }

    /// True when any tracked field is present and non-zero.
    ///
    /// A month without data is always valid; mandatory rules only apply to
    /// months that carry something.
    pub fn has_data(&self) -> bool {
        MonthlyField::ALL
            .iter()
            .any(|field| is_nonzero(self.value(*field)))
    }

    /// Diesel generation is declared for this month.
    pub fn has_diesel_generator(&self) -> bool {
        matches!(self.kwh_proj_diesel_p, Some(v) if v > 0.0)
    }

    /// Peak + off-peak energy, blanks counting as zero.
    pub fn total_consumption_kwh(&self) -> f64 {
        self.kwh_proj_ponta.unwrap_or(0.0) + self.kwh_proj_fora_ponta.unwrap_or(0.0)
    }

    /// Label used in batch error messages.
    pub(crate) fn label(&self, index: usize) -> String {
        match self.year_month {
            Some(ym) => ym.to_string(),
            None => format!("#{}", index + 1),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_parsing() {
        let ym: YearMonth = "2024-03".parse().unwrap();
        assert_eq!((ym.year(), ym.month()), (2024, 3));

        let ym: YearMonth = "202412".parse().unwrap();
        assert_eq!(ym.to_string(), "2024-12");
        assert_eq!(Some(ym), YearMonth::new(2024, 12));

        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("202400".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_arithmetic() {
        let jan = YearMonth::new(2024, 1).unwrap();
        assert_eq!(jan.plus_months(0), jan);
        assert_eq!(jan.plus_months(11).to_string(), "2024-12");
        assert_eq!(jan.plus_months(12).to_string(), "2025-01");
        assert_eq!(jan.plus_months(25).to_string(), "2026-02");
    }

    #[test]
    fn test_year_month_serde() {
        let from_int: YearMonth = serde_json::from_str("202405").unwrap();
        let from_str: YearMonth = serde_json::from_str("\"2024-05\"").unwrap();
        assert_eq!(from_int, from_str);
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "\"2024-05\"");
    }

    #[test]
    fn test_monthly_record_from_row_json() {
        let json = r#"{
            "IDMes": 202401,
            "NumeroDaUcLead": "UC-1",
            "DemandaCP": "120,5",
            "DemandaCFP": 300,
            "kWhProjPonta": "",
            "kWhProjForaPonta": null
        }"#;
        let record: MonthlyRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.year_month, YearMonth::new(2024, 1));
        assert_eq!(record.demanda_cp, Some(120.5));
        assert_eq!(record.demanda_cfp, Some(300.0));
        assert_eq!(record.kwh_proj_ponta, None);
        assert_eq!(record.kwh_proj_fora_ponta, None);
        assert_eq!(record.demanda_cg, None);
    }

    #[test]
    fn test_value_matches_builder() {
        for field in MonthlyField::ALL {
            let record = MonthlyRecord::default().with(field, 7.0);
            assert_eq!(record.value(field), Some(7.0), "{field}");
            assert!(record.has_data());
        }
    }

    #[test]
    fn test_has_data_ignores_zeros_and_blanks() {
        assert!(!MonthlyRecord::default().has_data());

        let zeros = MonthlyField::ALL
            .iter()
            .fold(MonthlyRecord::default(), |r, f| r.with(*f, 0.0));
        assert!(!zeros.has_data());
    }

    #[test]
    fn test_total_consumption() {
        let record = MonthlyRecord::default()
            .with(MonthlyField::KwhProjPonta, 100.0)
            .with(MonthlyField::KwhProjForaPonta, 900.0);
        assert_eq!(record.total_consumption_kwh(), 1000.0);

        let partial = MonthlyRecord::default().with(MonthlyField::KwhProjForaPonta, 50.0);
        assert_eq!(partial.total_consumption_kwh(), 50.0);
    }

    #[test]
    fn test_consumer_unit_from_row_json() {
        let json = r#"{
            "NumeroDaUcLead": "123456",
            "SubgrupoTarifario": "A4",
            "Tarifa": "Verde",
            "PossuiUsina": 1,
            "BeneficioRuralIrrigacao": "0,5",
            "AliquotaICMS": "18",
            "NomeDaUnidade": "Fazenda"
        }"#;
        let unit: ConsumerUnit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.subgroup.as_deref(), Some("A4"));
        assert!(unit.has_generation);
        assert_eq!(unit.rural_irrigation_benefit, Some(0.5));
        assert_eq!(unit.icms_rate, Some(18.0));
    }

    #[test]
    fn test_field_names_round_trip_through_serde() {
        for field in MonthlyField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn test_typescript_bindings_use_wire_names() {
        let record = MonthlyRecord::decl();
        let names = ["IDMes", "kWhProjPonta", "kWhCompensadoFP", "DemandaCG", "kWGeracaoProjetada"];
        for name in names {
            assert!(record.contains(name), "{name} missing from {record}");
        }
        assert!(!record.contains("kwh_proj_ponta"));
        assert!(!record.contains("year_month"));

        let unit = ConsumerUnit::decl();
        let names = ["PossuiUsina", "BeneficioRuralIrrigacao", "AliquotaICMS", "SubgrupoTarifario"];
        for name in names {
            assert!(unit.contains(name), "{name} missing from {unit}");
        }
        assert!(!unit.contains("has_generation"));
    }
}
