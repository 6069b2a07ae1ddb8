//! # Error Types
//!
//! Domain-specific error types for proposta-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  proposta-core errors (this file)                                      │
//! │  ├── ValidationError  - Tariff classification rule violations          │
//! │  ├── SimulationError  - Projection requests that cannot be answered    │
//! │  ├── PeriodError      - Malformed human-entered date ranges            │
//! │  └── CoreError        - Umbrella over the three above                  │
//! │                                                                         │
//! │  proposta-service errors (separate crate)                              │
//! │  └── ServiceError     - Config, reference-table loading, wraps Core    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → HTTP response      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is terminal for the call that raised it: nothing is retried
//! and no engine state exists to be left half-updated.

use chrono::NaiveDate;
use thiserror::Error;

use crate::classification::Classification;
use crate::rules::MandatoryRule;
use crate::types::MonthlyField;

// =============================================================================
// Core Error
// =============================================================================

/// Umbrella error for everything the core can reject.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A monthly record broke a tariff classification rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A projection could not be computed.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// A date range could not be interpreted.
    #[error("Period error: {0}")]
    Period(#[from] PeriodError),

    /// Discount factors are multipliers in (0, 1].
    #[error("Discount factor must be in (0, 1], got {0}")]
    InvalidDiscountFactor(f64),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Tariff classification rule violations.
///
/// Always caller-correctable: the user fixes the offending field and submits
/// the batch again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A field carries a value the unit's classification forbids.
    ///
    /// ## Example
    /// ```text
    /// Unit: subgroup B3, tariff CONVENCIONAL
    /// Month: DemandaCP = 120
    ///      │
    ///      ▼
    /// MustBeZero { field: DemandaCP, context: "subgroup B3, ..." }
    /// ```
    #[error("{field} must be zero under current classification ({context})")]
    MustBeZero {
        field: MonthlyField,
        context: Classification,
    },

    /// A mandatory demand field is absent, zero, or negative in a month that
    /// carries data.
    #[error("{field} is required and must be greater than zero: {rule}")]
    Required {
        field: MonthlyField,
        rule: MandatoryRule,
    },

    /// One month of a batch failed; the whole batch is rejected.
    #[error("month {label}: {source}")]
    InvalidMonth {
        /// Zero-based position of the month in the submitted batch.
        index: usize,
        /// `IDMes` when present, otherwise `#<position>`.
        label: String,
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Returns the field that caused the rejection, looking through batch
    /// wrappers.
    pub fn field(&self) -> MonthlyField {
        match self {
            ValidationError::MustBeZero { field, .. } => *field,
            ValidationError::Required { field, .. } => *field,
            ValidationError::InvalidMonth { source, .. } => source.field(),
        }
    }

    /// Returns true for mandatory-field failures (as opposed to must-be-zero).
    pub fn is_missing_required(&self) -> bool {
        match self {
            ValidationError::Required { .. } => true,
            ValidationError::MustBeZero { .. } => false,
            ValidationError::InvalidMonth { source, .. } => source.is_missing_required(),
        }
    }
}

// =============================================================================
// Simulation Error
// =============================================================================

/// Projection failures. Terminal: the user must supply different input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Client projections average over history; there is none.
    #[error("No consumption history available for this unit")]
    NoHistory,

    /// Request kind is neither `client` nor `lead`.
    #[error("Invalid simulation kind '{0}': expected 'client' or 'lead'")]
    InvalidKind(String),

    /// The horizon must cover between one month and the supported maximum.
    #[error(
        "Simulation duration must be between 1 and {} months",
        crate::projection::MAX_HORIZON_MONTHS
    )]
    InvalidDuration,
}

// =============================================================================
// Period Error
// =============================================================================

/// Date range parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Date is not `dd/mm/yyyy` nor `yyyy-mm-dd`.
    #[error("{field} has invalid date '{value}': use dd/mm/yyyy")]
    InvalidDate { field: &'static str, value: String },

    /// The range runs backwards.
    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    /// A month id is not `YYYY-MM` nor `YYYYMM`.
    #[error("Invalid month '{0}': use YYYY-MM or YYYYMM")]
    InvalidYearMonth(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for rule validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for projections.
pub type SimulationResult<T> = Result<T, SimulationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_error_messages() {
        assert_eq!(
            SimulationError::InvalidKind("prospect".to_string()).to_string(),
            "Invalid simulation kind 'prospect': expected 'client' or 'lead'"
        );
        assert_eq!(
            SimulationError::NoHistory.to_string(),
            "No consumption history available for this unit"
        );
    }

    #[test]
    fn test_required_error_message() {
        let err = ValidationError::Required {
            field: MonthlyField::DemandaCg,
            rule: MandatoryRule::DemandaCgForGeneration,
        };
        assert_eq!(
            err.to_string(),
            "DemandaCG is required and must be greater than zero: \
             required because the unit has distributed generation"
        );
    }

    #[test]
    fn test_batch_wrapper_exposes_inner_field() {
        let inner = ValidationError::Required {
            field: MonthlyField::DemandaCp,
            rule: MandatoryRule::DemandaCpForGrupoAAzul,
        };
        let err = ValidationError::InvalidMonth {
            index: 3,
            label: "2024-04".to_string(),
            source: Box::new(inner),
        };
        assert_eq!(err.field(), MonthlyField::DemandaCp);
        assert!(err.is_missing_required());
        assert!(err.to_string().starts_with("month 2024-04: DemandaCP"));
    }

    #[test]
    fn test_errors_convert_to_core_error() {
        let core: CoreError = SimulationError::NoHistory.into();
        assert!(matches!(core, CoreError::Simulation(SimulationError::NoHistory)));

        let core: CoreError = PeriodError::InvalidYearMonth("13-2024".into()).into();
        assert!(matches!(core, CoreError::Period(_)));
    }
}
