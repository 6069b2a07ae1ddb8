//! # Reference Data Loading
//!
//! Reads the municipality list into a [`LocalityTable`] once at startup.
//!
//! ```text
//!   ListaDeMunicipios.xls ──┐
//!     sheet "Municípios"    │    columns Uf | Cidade | Codigo
//!                           ├──► Vec<Locality> ──► LocalityTable ──► Arc
//!   municipios.csv ─────────┘
//!
//!   file missing   → warn, empty table
//!   file unreadable → ServiceError::ReferenceLoadFailed
//! ```

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use proposta_core::{Locality, LocalityTable};
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};

/// Worksheet holding the municipality list.
pub const LOCALITIES_SHEET: &str = "Municípios";

const COL_UF: &str = "Uf";
const COL_CITY: &str = "Cidade";
const COL_CODE: &str = "Codigo";

/// Loads the locality table from an `.xls`, `.xlsx` or `.csv` file.
pub fn load_locality_table(path: &Path) -> ServiceResult<LocalityTable> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "Locality file not found, state and city lists will be empty"
        );
        return Ok(LocalityTable::empty());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let rows = match ext.as_str() {
        "xls" | "xlsx" => read_workbook(path)?,
        "csv" => read_csv(path)?,
        _ => return Err(ServiceError::UnsupportedReferenceFormat(ext)),
    };

    let table = LocalityTable::new(rows);
    info!(
        path = %path.display(),
        states = table.states().len(),
        cities = table.len(),
        "Locality table loaded"
    );
    Ok(table)
}

fn load_failed(path: &Path, reason: impl ToString) -> ServiceError {
    ServiceError::ReferenceLoadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Excel
// =============================================================================

fn read_workbook(path: &Path) -> ServiceResult<Vec<Locality>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| load_failed(path, e))?;

    let sheet_names = workbook.sheet_names();
    let sheet = if sheet_names.iter().any(|name| name == LOCALITIES_SHEET) {
        LOCALITIES_SHEET.to_string()
    } else {
        let first = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| load_failed(path, "workbook has no sheets"))?;
        warn!(
            expected = LOCALITIES_SHEET,
            using = %first,
            "Locality sheet not found, using first sheet"
        );
        first
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| load_failed(path, e))?;

    rows_from_range(path, &range)
}

fn rows_from_range(path: &Path, range: &Range<Data>) -> ServiceResult<Vec<Locality>> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| load_failed(path, "sheet is empty"))?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| load_failed(path, format!("missing column '{name}'")))
    };
    let (uf, city, code) = (column(COL_UF)?, column(COL_CITY)?, column(COL_CODE)?);

    let cell = |row: &[Data], idx: usize| row.get(idx).map(|c| c.to_string()).unwrap_or_default();

    Ok(rows
        .map(|row| Locality {
            uf: cell(row, uf),
            city: cell(row, city),
            code: cell(row, code),
        })
        .collect())
}

// =============================================================================
// CSV
// =============================================================================

fn read_csv(path: &Path) -> ServiceResult<Vec<Locality>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| load_failed(path, e))?;

    reader
        .deserialize::<Locality>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| load_failed(path, e))
}
