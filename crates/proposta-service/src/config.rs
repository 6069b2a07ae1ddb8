//! # Service Configuration
//!
//! Prices, simulation defaults and reference-data location.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PROPOSTA_TE_OFF_PEAK=0.52                                          │
//! │     PROPOSTA_DISCOUNT_FACTOR=0.8                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/proposta/proposta.toml (Linux)                           │
//! │     ~/Library/Application Support/br.com.proposta.proposta/ (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     TE 0.65 / 0.45, TUSD 30.00, lead ICMS 17 %, discount 0.85          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # proposta.toml
//! [prices]
//! te_peak = 0.65
//! te_off_peak = 0.45
//! tusd_demand = 30.0
//!
//! [simulation]
//! lead_icms_rate = 17.0
//! discount_factor = 0.85
//!
//! [reference]
//! localities_path = "/srv/proposta/ListaDeMunicipios.xls"
//! ```

use std::path::PathBuf;

use proposta_core::projection::DEFAULT_LEAD_ICMS_RATE;
use proposta_core::{DiscountFactor, IcmsRate, TariffPrices};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};

const CONFIG_FILE_NAME: &str = "proposta.toml";

// =============================================================================
// Sections
// =============================================================================

/// Projection defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// ICMS applied to lead projections, in percent.
    #[serde(default = "default_lead_icms_rate")]
    pub lead_icms_rate: f64,

    /// Free-market price as a share of the captive price.
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f64,
}

fn default_lead_icms_rate() -> f64 {
    DEFAULT_LEAD_ICMS_RATE
}

fn default_discount_factor() -> f64 {
    DiscountFactor::DEFAULT.value()
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            lead_icms_rate: default_lead_icms_rate(),
            discount_factor: default_discount_factor(),
        }
    }
}

/// Reference data files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSettings {
    /// Municipality list (`.xls`, `.xlsx` or `.csv`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localities_path: Option<PathBuf>,
}

// =============================================================================
// Service Config
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub prices: TariffPrices,

    #[serde(default)]
    pub simulation: SimulationSettings,

    #[serde(default)]
    pub reference: ReferenceSettings,
}

impl ServiceConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (proposta.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ServiceResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading service config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load service config, using defaults");
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ServiceResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ServiceError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ServiceError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ServiceError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Service config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ServiceResult<()> {
        let prices = [
            ("te_peak", self.prices.te_peak),
            ("te_off_peak", self.prices.te_off_peak),
            ("tusd_demand", self.prices.tusd_demand),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value < 0.0 {
                return Err(ServiceError::InvalidConfig(format!(
                    "prices.{name} must be a non-negative number, got {value}"
                )));
            }
        }

        let icms = self.simulation.lead_icms_rate;
        if !(0.0..100.0).contains(&icms) {
            return Err(ServiceError::InvalidConfig(format!(
                "simulation.lead_icms_rate must be in [0, 100), got {icms}"
            )));
        }

        DiscountFactor::new(self.simulation.discount_factor)
            .map_err(|e| ServiceError::InvalidConfig(format!("simulation.discount_factor: {e}")))?;

        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// Unparsable numbers are logged and ignored.
    fn apply_env_overrides(&mut self) {
        override_number("PROPOSTA_TE_PEAK", &mut self.prices.te_peak);
        override_number("PROPOSTA_TE_OFF_PEAK", &mut self.prices.te_off_peak);
        override_number("PROPOSTA_TUSD_DEMAND", &mut self.prices.tusd_demand);
        override_number("PROPOSTA_LEAD_ICMS", &mut self.simulation.lead_icms_rate);
        override_number("PROPOSTA_DISCOUNT_FACTOR", &mut self.simulation.discount_factor);

        if let Ok(path) = std::env::var("PROPOSTA_LOCALITIES_PATH") {
            debug!(path = %path, "Overriding localities path from environment");
            self.reference.localities_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br.com", "proposta", "proposta")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Lead ICMS as a core rate.
    pub fn lead_icms(&self) -> IcmsRate {
        IcmsRate::from_percentage(self.simulation.lead_icms_rate)
    }

    /// Configured discount factor, falling back to the default when invalid.
    pub fn discount_factor(&self) -> DiscountFactor {
        DiscountFactor::new(self.simulation.discount_factor).unwrap_or_default()
    }
}

fn override_number(var: &str, target: &mut f64) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };
    match proposta_core::numeric::parse_lenient_number(&raw) {
        Some(value) => {
            debug!(var, value, "Overriding setting from environment");
            *target = value;
        }
        None => warn!(var, raw = %raw, "Ignoring unparsable number in environment"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.prices, TariffPrices::default());
        assert_eq!(config.simulation.lead_icms_rate, 17.0);
        assert_eq!(config.discount_factor(), DiscountFactor::DEFAULT);
        assert!(config.reference.localities_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServiceConfig::default();

        config.prices.tusd_demand = -1.0;
        assert!(config.validate().is_err());

        config.prices.tusd_demand = 30.0;
        config.simulation.lead_icms_rate = 100.0;
        assert!(config.validate().is_err());

        config.simulation.lead_icms_rate = 18.0;
        config.simulation.discount_factor = 0.0;
        assert!(matches!(config.validate(), Err(ServiceError::InvalidConfig(_))));

        config.simulation.discount_factor = 0.9;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [prices]
            te_off_peak = 0.5

            [simulation]
            discount_factor = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.prices.te_off_peak, 0.5);
        assert_eq!(config.prices.tusd_demand, 30.0);
        assert_eq!(config.simulation.discount_factor, 0.8);
        assert_eq!(config.simulation.lead_icms_rate, 17.0);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = ServiceConfig::default();
        config.prices.te_off_peak = 0.51;
        config.reference.localities_path = Some(PathBuf::from("/data/municipios.csv"));
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[prices]"));
        assert!(contents.contains("[simulation]"));

        let loaded: ServiceConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[prices]\nte_peak = \"cheap\"\n").unwrap();

        let err = ServiceConfig::load(Some(path.clone())).unwrap_err();
        assert!(err.is_config_error());

        let fallback = ServiceConfig::load_or_default(Some(path));
        assert_eq!(fallback.prices, TariffPrices::default());
    }
}
