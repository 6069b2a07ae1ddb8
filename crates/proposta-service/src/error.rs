//! # Service Error Types
//!
//! Errors raised around the core: configuration, reference data, malformed
//! requests. Core rejections are wrapped unchanged.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ─┐                                                     │
//! │  SimulationError ─┼──► CoreError ──► ServiceError ──► ErrorResponse     │
//! │  PeriodError ─────┘                       ▲             { code,         │
//! │                                           │               message }     │
//! │  config / reference / bad JSON ───────────┘                             │
//! │                                                                         │
//! │  is_client_error() == true   → 400, user fixes the input                │
//! │  is_client_error() == false  → 500, message is generic, details logged  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use proposta_core::{CoreError, PeriodError, SimulationError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Rejected by the rule or projection engine.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Request body could not be decoded.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Reference Data Errors
    // =========================================================================
    /// The locality file exists but could not be read.
    #[error("Failed to load reference table {path}: {reason}")]
    ReferenceLoadFailed { path: String, reason: String },

    #[error("Unsupported reference file format: '{0}' (expected xls, xlsx or csv)")]
    UnsupportedReferenceFormat(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(err.into())
    }
}

impl From<SimulationError> for ServiceError {
    fn from(err: SimulationError) -> Self {
        ServiceError::Core(err.into())
    }
}

impl From<PeriodError> for ServiceError {
    fn from(err: PeriodError) -> Self {
        ServiceError::Core(err.into())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::InvalidRequest(err.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(err: toml::de::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ServiceError {
    fn from(err: toml::ser::Error) -> Self {
        ServiceError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ServiceError {
    /// Returns true when the caller sent something the engines reject.
    ///
    /// Client errors are never retried; the user must change the input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Core(_) | ServiceError::InvalidRequest(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidConfig(_)
                | ServiceError::ConfigLoadFailed(_)
                | ServiceError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Wire Form
// =============================================================================

/// Machine-readable error codes handed to the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Tariff rule violation (400)
    ValidationError,
    /// Client projection without history (400)
    NoHistory,
    /// Unknown simulation kind (400)
    InvalidKind,
    /// Malformed dates or out-of-range horizon (400)
    InvalidPeriod,
    /// Service misconfigured (500)
    ConfigError,
    /// Anything else (500)
    InternalError,
}

/// What the frontend receives when a call fails.
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "month 2024-03: DemandaCP must be zero under current classification (...)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ErrorResponse {
            code,
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::Core(core) => match core {
                CoreError::Validation(e) => {
                    ErrorResponse::new(ErrorCode::ValidationError, e.to_string())
                }
                CoreError::Simulation(SimulationError::NoHistory) => {
                    ErrorResponse::new(ErrorCode::NoHistory, core_message(core))
                }
                CoreError::Simulation(SimulationError::InvalidKind(_)) => {
                    ErrorResponse::new(ErrorCode::InvalidKind, core_message(core))
                }
                CoreError::Simulation(SimulationError::InvalidDuration) | CoreError::Period(_) => {
                    ErrorResponse::new(ErrorCode::InvalidPeriod, core_message(core))
                }
                CoreError::InvalidDiscountFactor(_) => {
                    ErrorResponse::new(ErrorCode::ValidationError, core.to_string())
                }
            },
            ServiceError::InvalidRequest(msg) => {
                ErrorResponse::new(ErrorCode::ValidationError, format!("Invalid request: {msg}"))
            }
            ServiceError::InvalidConfig(_)
            | ServiceError::ConfigLoadFailed(_)
            | ServiceError::ConfigSaveFailed(_) => {
                tracing::error!(error = %err, "Configuration error");
                ErrorResponse::new(ErrorCode::ConfigError, "Service is misconfigured")
            }
            ServiceError::ReferenceLoadFailed { .. }
            | ServiceError::UnsupportedReferenceFormat(_) => {
                tracing::error!(error = %err, "Reference data error");
                ErrorResponse::new(ErrorCode::InternalError, "Reference data unavailable")
            }
        }
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(err: ServiceError) -> Self {
        ErrorResponse::from(&err)
    }
}

/// Message of the innermost domain error, without the umbrella prefix.
fn core_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(e) => e.to_string(),
        CoreError::Simulation(e) => e.to_string(),
        CoreError::Period(e) => e.to_string(),
        CoreError::InvalidDiscountFactor(_) => err.to_string(),
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proposta_core::rules::MandatoryRule;
    use proposta_core::MonthlyField;

    #[test]
    fn test_client_errors() {
        assert!(ServiceError::from(SimulationError::NoHistory).is_client_error());
        assert!(ServiceError::InvalidRequest("eof".into()).is_client_error());

        assert!(!ServiceError::InvalidConfig("bad".into()).is_client_error());
        assert!(ServiceError::InvalidConfig("bad".into()).is_config_error());
    }

    #[test]
    fn test_error_codes() {
        let code = |err: ServiceError| ErrorResponse::from(err).code;

        assert_eq!(code(SimulationError::NoHistory.into()), ErrorCode::NoHistory);
        assert_eq!(
            code(SimulationError::InvalidKind("x".into()).into()),
            ErrorCode::InvalidKind
        );
        assert_eq!(code(SimulationError::InvalidDuration.into()), ErrorCode::InvalidPeriod);
        assert_eq!(
            code(PeriodError::InvalidYearMonth("x".into()).into()),
            ErrorCode::InvalidPeriod
        );
        assert_eq!(
            code(ServiceError::ConfigLoadFailed("io".into())),
            ErrorCode::ConfigError
        );
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err: ServiceError = ValidationError::Required {
            field: MonthlyField::DemandaCfp,
            rule: MandatoryRule::DemandaCfpForGrupoAModality,
        }
        .into();
        let response = ErrorResponse::from(&err);

        assert_eq!(response.code, ErrorCode::ValidationError);
        assert!(response.message.starts_with("DemandaCFP is required"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ServiceError::ReferenceLoadFailed {
            path: "/srv/secret/municipios.xls".into(),
            reason: "corrupt".into(),
        };
        let response = ErrorResponse::from(err);
        assert_eq!(response.code, ErrorCode::InternalError);
        assert!(!response.message.contains("/srv/secret"));
    }

    #[test]
    fn test_response_serialization() {
        let json = serde_json::to_value(ErrorResponse::new(ErrorCode::NoHistory, "none")).unwrap();
        assert_eq!(json["code"], "NO_HISTORY");
        assert_eq!(json["message"], "none");
    }
}
