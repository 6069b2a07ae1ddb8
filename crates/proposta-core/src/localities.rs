//! # Locality Reference Table
//!
//! Brazilian states and municipalities offered by the unit registration form.
//! The table is loaded once by the service layer and handed around behind an
//! `Arc`; it is never mutated after construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One municipality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Locality {
    /// State code ("SP", "MG", ...).
    #[serde(rename = "Uf")]
    pub uf: String,
    #[serde(rename = "Cidade")]
    pub city: String,
    /// IBGE municipality code.
    #[serde(rename = "Codigo")]
    pub code: String,
}

/// Read-only index of municipalities by state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalityTable {
    by_state: BTreeMap<String, Vec<Locality>>,
}

impl LocalityTable {
    /// Builds the index. State codes are trimmed and upper-cased; rows with a
    /// blank state or city are dropped.
    pub fn new(rows: impl IntoIterator<Item = Locality>) -> Self {
        let mut by_state: BTreeMap<String, Vec<Locality>> = BTreeMap::new();

        for mut row in rows {
            row.uf = row.uf.trim().to_uppercase();
            row.city = row.city.trim().to_string();
            row.code = row.code.trim().to_string();
            if row.uf.is_empty() || row.city.is_empty() {
                continue;
            }
            by_state.entry(row.uf.clone()).or_default().push(row);
        }

        for cities in by_state.values_mut() {
            cities.sort_by(|a, b| a.city.cmp(&b.city));
        }

        LocalityTable { by_state }
    }

    /// An empty table, used when no reference file is available.
    pub fn empty() -> Self {
        LocalityTable::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_state.is_empty()
    }

    /// Number of municipalities.
    pub fn len(&self) -> usize {
        self.by_state.values().map(Vec::len).sum()
    }

    /// Distinct state codes, sorted.
    pub fn states(&self) -> Vec<&str> {
        self.by_state.keys().map(String::as_str).collect()
    }

    /// Municipalities of a state, sorted by name. Unknown states yield nothing.
    ///
    /// ## Example
    /// ```rust
    /// use proposta_core::localities::{Locality, LocalityTable};
    ///
    /// let row = |uf: &str, city: &str, code: &str| Locality {
    ///     uf: uf.into(),
    ///     city: city.into(),
    ///     code: code.into(),
    /// };
    /// let table = LocalityTable::new([
    ///     row("MG", "Uberlândia", "3170206"),
    ///     row("MG", "Belo Horizonte", "3106200"),
    ///     row("SP", "Campinas", "3509502"),
    /// ]);
    ///
    /// assert_eq!(table.states(), ["MG", "SP"]);
    /// let names: Vec<_> = table.cities("mg").iter().map(|c| c.city.as_str()).collect();
    /// assert_eq!(names, ["Belo Horizonte", "Uberlândia"]);
    /// ```
    pub fn cities(&self, uf: &str) -> &[Locality] {
        self.by_state
            .get(&uf.trim().to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(uf: &str, city: &str) -> Locality {
        Locality {
            uf: uf.to_string(),
            city: city.to_string(),
            code: "0".to_string(),
        }
    }

    #[test]
    fn test_states_are_unique_and_sorted() {
        let table = LocalityTable::new([
            row("SP", "Santos"),
            row("AC", "Rio Branco"),
            row("sp ", "Campinas"),
            row("", "Nowhere"),
        ]);
        assert_eq!(table.states(), ["AC", "SP"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_unknown_state_is_empty() {
        let table = LocalityTable::new([row("SP", "Santos")]);
        assert!(table.cities("RJ").is_empty());
        assert!(LocalityTable::empty().states().is_empty());
    }
}
