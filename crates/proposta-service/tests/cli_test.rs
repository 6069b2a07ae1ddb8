// ==========================================
// proposta CLI end-to-end tests
// ==========================================

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const ENV_OVERRIDES: [&str; 5] = [
    "PROPOSTA_TE_PEAK",
    "PROPOSTA_TE_OFF_PEAK",
    "PROPOSTA_TUSD_DEMAND",
    "PROPOSTA_LEAD_ICMS",
    "PROPOSTA_DISCOUNT_FACTOR",
];

fn proposta(dir: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_proposta"));
    cmd.arg("--config")
        .arg(dir.join("missing.toml"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "debug");
    for var in ENV_OVERRIDES {
        cmd.env_remove(var);
    }
    cmd.output().unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn test_simulate_stdout_is_pure_json() {
    let dir = TempDir::new().unwrap();
    let request = write(
        dir.path(),
        "request.json",
        r#"{"tipo": "lead", "consumo_estimado": 1000, "demanda_estimada": 50,
            "data_inicio": "2025-01-01", "duracao_meses": 3}"#,
    );

    let output = proposta(dir.path(), &["simulate", &request]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["totais"]["duracao_meses"], 3);
    assert_eq!(result["detalhes_mensais"].as_array().map(Vec::len), Some(3));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config file not found"), "{stderr}");
}

#[test]
fn test_dashboard_stdout_is_pure_json() {
    let dir = TempDir::new().unwrap();
    let unit = write(
        dir.path(),
        "unit.json",
        r#"{"SubgrupoTarifario": "A4", "Tarifa": "AZUL", "AliquotaICMS": 17}"#,
    );
    let history = write(
        dir.path(),
        "history.json",
        r#"[{"IDMes": 202401, "kWhProjForaPonta": 800, "DemandaCP": 50, "DemandaCFP": 120}]"#,
    );

    let output = proposta(
        dir.path(),
        &["dashboard", &unit, &history, "01/06/2025", "31/08/2025"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let scenario: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(scenario["detalhes_mensais"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_oversized_duration_is_rejected() {
    let dir = TempDir::new().unwrap();
    let request = write(
        dir.path(),
        "request.json",
        r#"{"tipo": "lead", "consumo_estimado": 1000, "data_inicio": "2025-01-01",
            "duracao_meses": 4000000000}"#,
    );

    let output = proposta(dir.path(), &["simulate", &request]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("INVALID_PERIOD"));
}
