//! # Tariff Rule Engine
//!
//! Decides whether a month of history is consistent with the unit's
//! regulatory classification.
//!
//! ## Validation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    validate_tariff_rules(unit, month)                   │
//! │                                                                         │
//! │  1. Classification::of(unit)           (fresh on every call)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. Zeroing table, fixed field order                                    │
//! │     condition holds AND value non-zero? ──► MustBeZero (stop)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. Month has any non-zero field?  no ──► Ok (blank months pass)        │
//! │           │ yes                                                         │
//! │           ▼                                                             │
//! │  4. Mandatory rules, in order                                           │
//! │     rule applies AND value missing/≤0? ──► Required (stop)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │          Ok                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A batch (a year of months) is all-or-nothing: [`validate_batch`] stops at
//! the first failing month and the caller must not persist any of it.

use std::fmt;

use serde::Serialize;
use ts_rs::TS;

use crate::classification::Classification;
use crate::error::{ValidationError, ValidationResult};
use crate::numeric::{is_nonzero, is_positive};
use crate::types::{ConsumerUnit, MonthlyField, MonthlyRecord};

// =============================================================================
// Zeroing Rules
// =============================================================================

/// When a field must be zero or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroCondition {
    /// Green modality or low voltage: no peak/off-peak projections.
    TarifaVerdeOrGrupoB,
    /// Reserved-hours energy only for rural irrigation.
    NotRuralIrrigante,
    /// Reserved-hours compensation needs generation or rural irrigation.
    NoGenerationNorRuralIrrigation,
    /// Diesel energy without a diesel generator.
    ///
    /// The generator flag is derived from the same field, so this can never
    /// reject anything.
    NoDieselGenerator,
    /// Generation fields without generation.
    NoGeneration,
    /// Low voltage has no contracted off-peak demand.
    GrupoB,
    /// Generation demand needs high voltage and generation.
    GrupoBOrNoGeneration,
}

impl ZeroCondition {
    /// Evaluates the condition. `record` only matters for the diesel rule.
    pub fn holds(&self, class: &Classification, record: &MonthlyRecord) -> bool {
        match self {
            ZeroCondition::TarifaVerdeOrGrupoB => class.is_tarifa_verde || class.is_grupo_b,
            ZeroCondition::NotRuralIrrigante => !class.is_rural_irrigante,
            ZeroCondition::NoGenerationNorRuralIrrigation => {
                !class.possui_usina && !class.is_rural_irrigante
            }
            ZeroCondition::NoDieselGenerator => !record.has_diesel_generator(),
            ZeroCondition::NoGeneration => !class.possui_usina,
            ZeroCondition::GrupoB => class.is_grupo_b,
            ZeroCondition::GrupoBOrNoGeneration => class.is_grupo_b || !class.possui_usina,
        }
    }

    /// Whether the condition can be decided from the unit alone.
    pub fn depends_on_record(&self) -> bool {
        matches!(self, ZeroCondition::NoDieselGenerator)
    }
}

/// One row of the zeroing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroingRule {
    pub field: MonthlyField,
    pub condition: ZeroCondition,
}

const fn zero_when(field: MonthlyField, condition: ZeroCondition) -> ZeroingRule {
    ZeroingRule { field, condition }
}

/// The zeroing table, in evaluation order.
pub const ZEROING_RULES: [ZeroingRule; 16] = [
    zero_when(MonthlyField::KwProjPonta, ZeroCondition::TarifaVerdeOrGrupoB),
    zero_when(MonthlyField::KwProjForaPonta, ZeroCondition::TarifaVerdeOrGrupoB),
    zero_when(MonthlyField::KwhProjPonta, ZeroCondition::TarifaVerdeOrGrupoB),
    zero_when(MonthlyField::KwhProjForaPonta, ZeroCondition::TarifaVerdeOrGrupoB),
    zero_when(MonthlyField::KwhProjHRes, ZeroCondition::NotRuralIrrigante),
    zero_when(
        MonthlyField::KwhCompensadoHr,
        ZeroCondition::NoGenerationNorRuralIrrigation,
    ),
    zero_when(MonthlyField::KwhProjDieselP, ZeroCondition::NoDieselGenerator),
    zero_when(MonthlyField::KwhProjPontaG, ZeroCondition::NoGeneration),
    zero_when(MonthlyField::KwhProjForaPontaG, ZeroCondition::NoGeneration),
    zero_when(MonthlyField::KwProjG, ZeroCondition::NoGeneration),
    zero_when(MonthlyField::KwhCompensadoP, ZeroCondition::NoGeneration),
    zero_when(MonthlyField::KwhCompensadoFp, ZeroCondition::NoGeneration),
    zero_when(MonthlyField::KwGeracaoProjetada, ZeroCondition::NoGeneration),
    zero_when(MonthlyField::DemandaCp, ZeroCondition::TarifaVerdeOrGrupoB),
    zero_when(MonthlyField::DemandaCfp, ZeroCondition::GrupoB),
    zero_when(MonthlyField::DemandaCg, ZeroCondition::GrupoBOrNoGeneration),
];

// =============================================================================
// Mandatory Rules
// =============================================================================

/// Demand fields that must be positive in any month carrying data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryRule {
    /// Group A on a time-of-use modality bills off-peak demand.
    DemandaCfpForGrupoAModality,
    /// Group A blue modality also bills peak demand.
    DemandaCpForGrupoAAzul,
    /// Generation units bill generation demand.
    DemandaCgForGeneration,
}

impl MandatoryRule {
    /// Every rule, in evaluation order.
    pub const ALL: [MandatoryRule; 3] = [
        MandatoryRule::DemandaCfpForGrupoAModality,
        MandatoryRule::DemandaCpForGrupoAAzul,
        MandatoryRule::DemandaCgForGeneration,
    ];

    /// Field the rule makes mandatory.
    pub const fn field(&self) -> MonthlyField {
        match self {
            MandatoryRule::DemandaCfpForGrupoAModality => MonthlyField::DemandaCfp,
            MandatoryRule::DemandaCpForGrupoAAzul => MonthlyField::DemandaCp,
            MandatoryRule::DemandaCgForGeneration => MonthlyField::DemandaCg,
        }
    }

    /// Whether the rule binds this unit.
    pub fn applies(&self, class: &Classification) -> bool {
        match self {
            MandatoryRule::DemandaCfpForGrupoAModality => {
                class.is_grupo_a && (class.is_tarifa_azul || class.is_tarifa_verde)
            }
            MandatoryRule::DemandaCpForGrupoAAzul => class.is_grupo_a && class.is_tarifa_azul,
            MandatoryRule::DemandaCgForGeneration => class.possui_usina,
        }
    }
}

impl fmt::Display for MandatoryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MandatoryRule::DemandaCfpForGrupoAModality => {
                "required for group A units on the AZUL or VERDE tariff"
            }
            MandatoryRule::DemandaCpForGrupoAAzul => {
                "required for group A units on the AZUL tariff"
            }
            MandatoryRule::DemandaCgForGeneration => {
                "required because the unit has distributed generation"
            }
        })
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates one month against the unit's classification.
///
/// ## Example
/// ```rust
/// use proposta_core::rules::validate_tariff_rules;
/// use proposta_core::types::{ConsumerUnit, MonthlyField, MonthlyRecord};
///
/// let unit = ConsumerUnit::new("B3", "Convencional");
///
/// // Low-voltage units have no contracted peak demand
/// let month = MonthlyRecord::default().with(MonthlyField::DemandaCp, 80.0);
/// let err = validate_tariff_rules(&unit, &month).unwrap_err();
/// assert_eq!(err.field(), MonthlyField::DemandaCp);
///
/// // Blank months always pass
/// assert!(validate_tariff_rules(&unit, &MonthlyRecord::default()).is_ok());
/// ```
pub fn validate_tariff_rules(unit: &ConsumerUnit, record: &MonthlyRecord) -> ValidationResult<()> {
    let class = Classification::of(unit);

    check_zeroing(&class, record)?;

    if !record.has_data() {
        return Ok(());
    }

    check_mandatory(&class, record)
}

fn check_zeroing(class: &Classification, record: &MonthlyRecord) -> ValidationResult<()> {
    for rule in &ZEROING_RULES {
        if rule.condition.holds(class, record) && is_nonzero(record.value(rule.field)) {
            return Err(ValidationError::MustBeZero {
                field: rule.field,
                context: class.clone(),
            });
        }
    }
    Ok(())
}

fn check_mandatory(class: &Classification, record: &MonthlyRecord) -> ValidationResult<()> {
    for rule in MandatoryRule::ALL {
        if rule.applies(class) && !is_positive(record.value(rule.field())) {
            return Err(ValidationError::Required {
                field: rule.field(),
                rule,
            });
        }
    }
    Ok(())
}

/// Validates a whole submission; the first failing month rejects the batch.
///
/// The error names the month (its `IDMes`, or `#n` by position) and wraps the
/// rule violation.
pub fn validate_batch(unit: &ConsumerUnit, records: &[MonthlyRecord]) -> ValidationResult<()> {
    for (index, record) in records.iter().enumerate() {
        validate_tariff_rules(unit, record).map_err(|source| ValidationError::InvalidMonth {
            index,
            label: record.label(index),
            source: Box::new(source),
        })?;
    }
    Ok(())
}

// =============================================================================
// Field Sheet
// =============================================================================

/// How the history form should treat a field for a given unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FieldRequirement {
    /// Any non-zero value is rejected.
    MustBeZero,
    /// Must be positive whenever the month carries data.
    Required,
    /// Free.
    Optional,
    /// Both zeroed and mandatory: only blank months can pass.
    Conflicting,
}

/// One line of a [`FieldSheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldSheetEntry {
    pub field: MonthlyField,
    pub requirement: FieldRequirement,
}

/// Per-field requirements for a unit, in evaluation order.
pub type FieldSheet = Vec<FieldSheetEntry>;

impl Classification {
    /// Describes every field for the history form, from the same tables the
    /// validator evaluates.
    ///
    /// Record-dependent conditions (diesel) are reported as optional.
    pub fn field_sheet(&self) -> FieldSheet {
        ZEROING_RULES
            .iter()
            .map(|rule| {
                let zeroed = !rule.condition.depends_on_record()
                    && rule.condition.holds(self, &MonthlyRecord::default());
                let required = MandatoryRule::ALL
                    .iter()
                    .any(|m| m.field() == rule.field && m.applies(self));

                let requirement = match (zeroed, required) {
                    (true, true) => FieldRequirement::Conflicting,
                    (true, false) => FieldRequirement::MustBeZero,
                    (false, true) => FieldRequirement::Required,
                    (false, false) => FieldRequirement::Optional,
                };

                FieldSheetEntry {
                    field: rule.field,
                    requirement,
                }
            })
            .collect()
    }
}

/// Field sheet for a unit.
pub fn field_sheet(unit: &ConsumerUnit) -> FieldSheet {
    Classification::of(unit).field_sheet()
}

// =============================================================================
// Unit Tests
// =============================================================================
