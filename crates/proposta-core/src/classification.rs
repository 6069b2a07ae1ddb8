//! # Consumer Unit Classification
//!
//! Derives the regulatory flags the rule tables are written against.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ConsumerUnit                         Classification                    │
//! │  ────────────                         ──────────────                    │
//! │  SubgrupoTarifario "A4"  ──────────►  is_grupo_a = true                 │
//! │                                       is_grupo_b = false                │
//! │  Tarifa "Azul"           ──────────►  is_tarifa_azul = true             │
//! │                                       is_tarifa_verde = false           │
//! │  PossuiUsina true        ──────────►  possui_usina = true               │
//! │  BeneficioRural... 0.0   ──────────►  is_rural_irrigante = false        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Flags are a pure function of the unit and are rebuilt on every call; no
//! classification is cached between validations.

use std::fmt;

use serde::Serialize;

use crate::types::ConsumerUnit;

/// Regulatory flags of a consumer unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Normalised subgroup code, kept for error context.
    pub subgroup: String,
    /// Normalised tariff modality, kept for error context.
    pub tariff: String,
    /// High-voltage supply (subgroup starts with "A").
    pub is_grupo_a: bool,
    /// Low-voltage supply (subgroup starts with "B").
    pub is_grupo_b: bool,
    pub is_tarifa_azul: bool,
    pub is_tarifa_verde: bool,
    /// Positive rural irrigation benefit.
    pub is_rural_irrigante: bool,
    /// Distributed generation on site.
    pub possui_usina: bool,
}

impl Classification {
    /// Classifies a unit.
    ///
    /// ## Example
    /// ```rust
    /// use proposta_core::classification::Classification;
    /// use proposta_core::types::ConsumerUnit;
    ///
    /// let unit = ConsumerUnit::new("a4", "Horária Verde");
    /// let class = Classification::of(&unit);
    /// assert!(class.is_grupo_a);
    /// assert!(class.is_tarifa_verde);
    /// assert!(!class.possui_usina);
    /// ```
    pub fn of(unit: &ConsumerUnit) -> Self {
        let subgroup = unit
            .subgroup
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_uppercase();
        let tariff = unit
            .tariff
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_uppercase();

        Classification {
            is_grupo_a: subgroup.starts_with('A'),
            is_grupo_b: subgroup.starts_with('B'),
            is_tarifa_azul: tariff.contains("AZUL"),
            is_tarifa_verde: tariff.contains("VERDE"),
            is_rural_irrigante: matches!(unit.rural_irrigation_benefit, Some(b) if b > 0.0),
            possui_usina: unit.has_generation,
            subgroup,
            tariff,
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
        write!(
            f,
            "subgroup {}, tariff {}, generation {}, rural irrigation {}",
            or_dash(&self.subgroup),
            or_dash(&self.tariff),
            yes_no(self.possui_usina),
            yes_no(self.is_rural_irrigante)
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
