use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{CellValue, Dataset, Row};

/// Load the survey table from a CSV file with a header row.
///
/// Every cell goes through type inference (`i64`, then `f64`, else text;
/// empty → null). No schema validation happens here: a missing file or a
/// malformed row aborts the run, a missing column only fails later when a
/// chart asks for it.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let column_names: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut row = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            let Some(col_name) = column_names.get(col_idx) else {
                continue;
            };
            row.insert(col_name.clone(), infer_cell(value));
        }
        rows.push(row);
    }

    let dataset = Dataset { rows, column_names };
    log::info!(
        "loaded {} rows, {} columns from {}",
        dataset.len(),
        dataset.column_names.len(),
        path.display()
    );
    if dataset.is_empty() {
        log::warn!("{} has a header but no data rows", path.display());
    }

    Ok(dataset)
}

fn infer_cell(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::String(s.to_string())
}
