//! # proposta-core: Tariff Rules and Cost Projection
//!
//! Pure domain logic for the energy proposal service: the rule engine that
//! guards monthly consumption history and the engine that turns it into a
//! cost forecast. No I/O, no logging, no clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Proposal Service Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (history form, dashboard)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          proposta-service (config, logging, facade, CLI)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ proposta-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌──────────────┐  ┌────────────┐  ┌────────────┐ │   │
//! │  │   │  types  │  │classification│  │ projection │  │   period   │ │   │
//! │  │   │ numeric │  │    rules     │  │  scenario  │  │ localities │ │   │
//! │  │   └─────────┘  └──────────────┘  └────────────┘  └────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOGGING • NO SHARED STATE • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`numeric`] - Lenient number coercion for spreadsheet-style input
//! - [`types`] - Consumer units, monthly records, field enumeration
//! - [`classification`] - Regulatory flags derived from a unit
//! - [`rules`] - Zeroing and mandatory-field validation
//! - [`projection`] - Monthly cost forecast
//! - [`scenario`] - Free-market discount comparison
//! - [`period`] - Human date ranges to forecast horizons
//! - [`localities`] - State/municipality reference table
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use proposta_core::period::Period;
//! use proposta_core::projection::{simulate, SimulationInput, SimulationRequest};
//!
//! let horizon = Period::parse("01/01/2025", "31/03/2025").unwrap().horizon().unwrap();
//! let request = SimulationRequest::new(SimulationInput::lead(Some(1000.0), Some(50.0)), horizon);
//!
//! let result = simulate(&request).unwrap();
//! assert!((result.totals.total_cost_for_period - 7048.19).abs() < 0.01);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod classification;
pub mod error;
pub mod localities;
pub mod numeric;
pub mod period;
pub mod projection;
pub mod rules;
pub mod scenario;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use classification::Classification;
pub use error::{CoreError, CoreResult, PeriodError, SimulationError, ValidationError};
pub use localities::{Locality, LocalityTable};
pub use period::Period;
pub use projection::{
    simulate, simulate_with_prices, Horizon, IcmsRate, ProjectionResult, SimulationInput,
    SimulationKind, SimulationRequest, SimulationRequestDto, TariffPrices,
};
pub use rules::{validate_batch, validate_tariff_rules, FieldRequirement, FieldSheet};
pub use scenario::{DiscountFactor, DiscountScenario};
pub use types::*;
