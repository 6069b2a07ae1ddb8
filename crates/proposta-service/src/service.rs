//! # Proposal Service
//!
//! The calls the HTTP layer makes, wired to configuration and logging.
//!
//! ## Call Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP route                     ProposalService             core        │
//! │  ──────────                     ───────────────             ────        │
//! │  PUT  /unidades/:id/historico   validate_history_batch ──► validate_batch│
//! │  POST /simulacao/calcular       simulate / simulate_unit ► simulate_... │
//! │  POST /dashboard_data           dashboard ──────────────► + scenario    │
//! │  GET  /unidades/:id/campos      field_sheet ────────────► field_sheet   │
//! │  GET  /localidades/estados      states ─────────────────► LocalityTable │
//! │  GET  /localidades/cidades/:uf  cities ─────────────────► LocalityTable │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service holds only immutable state (config and the shared locality
//! table), so one instance can serve concurrent requests without locking.

use std::sync::Arc;

use proposta_core::rules::{self, FieldSheet};
use proposta_core::{
    simulate_with_prices, ConsumerUnit, DiscountScenario, IcmsRate, Locality, LocalityTable,
    MonthlyRecord, Period, ProjectionResult, SimulationInput, SimulationRequest,
    SimulationRequestDto,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::reference::load_locality_table;

/// Facade over the rule and projection engines.
#[derive(Debug, Clone)]
pub struct ProposalService {
    config: ServiceConfig,
    localities: Arc<LocalityTable>,
}

impl ProposalService {
    pub fn new(config: ServiceConfig, localities: Arc<LocalityTable>) -> Self {
        ProposalService { config, localities }
    }

    /// Builds the service, loading the locality table named in the config.
    pub fn from_config(config: ServiceConfig) -> ServiceResult<Self> {
        let localities = match &config.reference.localities_path {
            Some(path) => load_locality_table(path)?,
            None => {
                warn!("No localities path configured, state and city lists will be empty");
                LocalityTable::empty()
            }
        };
        Ok(ProposalService::new(config, Arc::new(localities)))
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Validates a year of history before it is written.
    ///
    /// All months are checked before anything is accepted; on error the caller
    /// must discard the whole batch.
    pub fn validate_history_batch(
        &self,
        unit: &ConsumerUnit,
        year: i32,
        records: &[MonthlyRecord],
    ) -> ServiceResult<()> {
        let unit_id = unit.unit_id.as_deref().unwrap_or("-");
        debug!(unit = unit_id, year, months = records.len(), "Validating history batch");

        match rules::validate_batch(unit, records) {
            Ok(()) => {
                info!(unit = unit_id, year, months = records.len(), "History batch accepted");
                Ok(())
            }
            Err(e) => {
                info!(
                    unit = unit_id,
                    year,
                    field = %e.field(),
                    error = %e,
                    "History batch rejected"
                );
                Err(e.into())
            }
        }
    }

    /// Field requirements for the history form of a unit.
    pub fn field_sheet(&self, unit: &ConsumerUnit) -> FieldSheet {
        rules::field_sheet(unit)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Runs a projection from the simulation form body.
    pub fn simulate(&self, dto: SimulationRequestDto) -> ServiceResult<ProjectionResult> {
        let request = SimulationRequest::from_dto(dto, self.config.lead_icms())?;
        self.run(&request)
    }

    /// Client projection for a stored unit over a human-entered period.
    ///
    /// A unit without an ICMS rate is projected untaxed.
    pub fn simulate_unit(
        &self,
        unit: &ConsumerUnit,
        history: Vec<MonthlyRecord>,
        period: &Period,
    ) -> ServiceResult<ProjectionResult> {
        let icms = match unit.icms_rate {
            Some(rate) => IcmsRate::from_percentage(rate),
            None => {
                warn!(
                    unit = unit.unit_id.as_deref().unwrap_or("-"),
                    "Unit has no ICMS rate, projecting without tax"
                );
                IcmsRate::zero()
            }
        };

        let request =
            SimulationRequest::new(SimulationInput::client(icms, history), period.horizon()?);
        self.run(&request)
    }

    /// Captive projection plus the free-market discount scenario.
    pub fn dashboard(
        &self,
        unit: &ConsumerUnit,
        history: Vec<MonthlyRecord>,
        period: &Period,
    ) -> ServiceResult<DiscountScenario> {
        let captive = self.simulate_unit(unit, history, period)?;
        let factor = self.config.discount_factor();
        let scenario = DiscountScenario::from_projection(&captive, factor);

        debug!(
            factor = factor.value(),
            savings = scenario.savings_total,
            "Discount scenario computed"
        );
        Ok(scenario)
    }

    fn run(&self, request: &SimulationRequest) -> ServiceResult<ProjectionResult> {
        let correlation_id = Uuid::new_v4();
        debug!(
            %correlation_id,
            kind = %request.input.kind(),
            months = request.horizon.months(),
            icms = request.input.icms_rate().percentage(),
            "Running projection"
        );

        match simulate_with_prices(request, &self.config.prices) {
            Ok(result) => {
                info!(
                    %correlation_id,
                    kind = %request.input.kind(),
                    total = result.totals.total_cost_for_period,
                    "Projection completed"
                );
                Ok(result)
            }
            Err(e) => {
                info!(%correlation_id, error = %e, "Projection rejected");
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Reference Data
    // =========================================================================

    /// State codes for the registration form.
    pub fn states(&self) -> Vec<&str> {
        self.localities.states()
    }

    /// Municipalities of a state.
    pub fn cities(&self, uf: &str) -> &[Locality] {
        self.localities.cities(uf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, ErrorResponse, ServiceError};
    use crate::logging;
    use proposta_core::{CoreError, MonthlyField, SimulationError};

    fn service() -> ProposalService {
        logging::init_test();
        let localities = LocalityTable::new([Locality {
            uf: "SP".into(),
            city: "Santos".into(),
            code: "3548500".into(),
        }]);
        ProposalService::new(ServiceConfig::default(), Arc::new(localities))
    }

    fn azul_unit() -> ConsumerUnit {
        ConsumerUnit::new("A4", "AZUL").with_icms_rate(17.0)
    }

    fn azul_month(kwh: f64) -> MonthlyRecord {
        MonthlyRecord::default()
            .with(MonthlyField::KwhProjForaPonta, kwh)
            .with(MonthlyField::DemandaCp, 50.0)
            .with(MonthlyField::DemandaCfp, 120.0)
    }

    #[test]
    fn test_batch_rejection_maps_to_validation_error() {
        let svc = service();
        let records = vec![
            azul_month(900.0),
            MonthlyRecord::default().with(MonthlyField::KwhProjPonta, 1.0),
        ];

        let err = svc.validate_history_batch(&azul_unit(), 2024, &records).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(ErrorResponse::from(&err).code, ErrorCode::ValidationError);

        assert!(svc.validate_history_batch(&azul_unit(), 2024, &records[..1]).is_ok());
    }

    #[test]
    fn test_simulate_unit_uses_unit_icms() {
        let svc = service();
        let period = Period::parse("01/01/2025", "31/03/2025").unwrap();
        let history = vec![azul_month(1000.0)];

        let result = svc.simulate_unit(&azul_unit(), history, &period).unwrap();
        assert_eq!(result.monthly.len(), 3);
        // 1000 kWh × 0.45 + 50 kW × 30 = 1950 before ICMS.
        assert!((result.totals.average_monthly_cost - 1950.0 / 0.83).abs() < 1e-6);
    }

    #[test]
    fn test_missing_icms_projects_untaxed() {
        let svc = service();
        let period = Period::parse("01/01/2025", "31/01/2025").unwrap();
        let unit = ConsumerUnit::new("A4", "AZUL");

        let result = svc.simulate_unit(&unit, vec![azul_month(1000.0)], &period).unwrap();
        assert!((result.totals.total_cost_for_period - 1950.0).abs() < 1e-6);
    }

    #[test]
    fn test_simulate_without_history() {
        let svc = service();
        let period = Period::parse("01/01/2025", "31/12/2025").unwrap();

        let err = svc.simulate_unit(&azul_unit(), vec![], &period).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Simulation(SimulationError::NoHistory))
        ));
    }

    #[test]
    fn test_lead_rate_comes_from_config() {
        let mut config = ServiceConfig::default();
        config.simulation.lead_icms_rate = 0.0;
        let svc = ProposalService::new(config, Arc::new(LocalityTable::empty()));

        let dto: SimulationRequestDto = serde_json::from_value(serde_json::json!({
            "tipo": "lead",
            "consumo_estimado": 1000,
            "demanda_estimada": 50,
            "data_inicio": "2025-01-01",
            "duracao_meses": 2
        }))
        .unwrap();

        let result = svc.simulate(dto).unwrap();
        assert!((result.totals.total_cost_for_period - 3900.0).abs() < 1e-6);
    }

    #[test]
    fn test_dashboard_applies_configured_factor() {
        let mut config = ServiceConfig::default();
        config.simulation.discount_factor = 0.9;
        let svc = ProposalService::new(config, Arc::new(LocalityTable::empty()));
        let period = Period::parse("01/06/2025", "31/08/2025").unwrap();

        let scenario = svc.dashboard(&azul_unit(), vec![azul_month(800.0)], &period).unwrap();
        assert_eq!(scenario.monthly.len(), 3);
        assert!((scenario.savings_percent - 10.0).abs() < 1e-9);
        assert_eq!(scenario.monthly[0].month.to_string(), "2025-06");
    }

    #[test]
    fn test_reference_lookups() {
        let svc = service();
        assert_eq!(svc.states(), ["SP"]);
        assert_eq!(svc.cities("sp").len(), 1);
        assert!(svc.cities("RJ").is_empty());
    }

    #[test]
    fn test_from_config_without_localities() {
        let svc = ProposalService::from_config(ServiceConfig::default()).unwrap();
        assert!(svc.states().is_empty());
    }

    #[test]
    fn test_field_sheet_passthrough() {
        let svc = service();
        assert_eq!(svc.field_sheet(&azul_unit()).len(), MonthlyField::ALL.len());
    }
}
