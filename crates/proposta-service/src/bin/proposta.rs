//! # Proposta CLI
//!
//! Runs the engines on JSON files, for support and for checking spreadsheets
//! before they are imported.
//!
//! ## Usage
//! ```bash
//! # Validate a year of history for a unit
//! proposta validate unit.json history.json
//!
//! # Run a projection from a simulation form body
//! proposta simulate request.json
//!
//! # Captive vs. free-market comparison
//! proposta dashboard unit.json history.json 01/01/2025 31/12/2025
//!
//! # Use a specific config file
//! proposta --config ./proposta.toml simulate request.json
//! ```

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use proposta_core::{ConsumerUnit, MonthlyRecord, Period, SimulationRequestDto};
use proposta_service::{logging, ErrorResponse, ProposalService, ServiceConfig, ServiceError};
use serde::de::DeserializeOwned;
use serde::Serialize;

const USAGE: &str = "\
Proposta - tariff rule validation and cost projection

Usage: proposta [OPTIONS] <COMMAND> [ARGS]

Commands:
  validate  <unit.json> <history.json>                 Validate a history batch
  simulate  <request.json>                             Run a projection
  dashboard <unit.json> <history.json> <start> <end>   Captive vs. discounted cost

Options:
  -c, --config <PATH>   Config file (default: platform config dir/proposta.toml)
  -h, --help            Show this help message";

fn main() -> Result<()> {
    logging::init();

    let mut config_path: Option<PathBuf> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => positional.push(arg),
        }
    }

    let Some((command, rest)) = positional.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = ServiceConfig::load(config_path).context("loading configuration")?;
    let service = ProposalService::from_config(config).context("starting service")?;

    match (command.as_str(), rest) {
        ("validate", [unit, history]) => {
            let unit: ConsumerUnit = read_json(unit)?;
            let records: Vec<MonthlyRecord> = read_json(history)?;
            let year = records
                .iter()
                .find_map(|r| r.year_month)
                .map(|ym| ym.year())
                .unwrap_or_default();

            report(service.validate_history_batch(&unit, year, &records))?;
            println!("OK: {} month(s) valid", records.len());
        }
        ("simulate", [request]) => {
            let dto: SimulationRequestDto = read_json(request)?;
            print_json(&report(service.simulate(dto))?)?;
        }
        ("dashboard", [unit, history, start, end]) => {
            let unit: ConsumerUnit = read_json(unit)?;
            let records: Vec<MonthlyRecord> = read_json(history)?;
            let period = report(Period::parse(start, end).map_err(ServiceError::from))?;
            print_json(&report(service.dashboard(&unit, records, &period))?)?;
        }
        _ => bail!("unknown command or wrong arguments: {}\n\n{USAGE}", positional.join(" ")),
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints the wire form of a service error before handing it to anyhow.
fn report<T>(result: Result<T, ServiceError>) -> Result<T> {
    result.map_err(|err| {
        let response = ErrorResponse::from(&err);
        if let Ok(json) = serde_json::to_string_pretty(&response) {
            eprintln!("{json}");
        }
        anyhow::Error::new(err)
    })
}
