use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the survey table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell inferred from CSV text.
/// Grouping keys live in `BTreeMap`s downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual PartialEq/Eq/Ord so we can key BTreeMap with CellValue and keep
// equality consistent with the by-value ordering of numeric cells --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
            }
        }
        // Numeric cells compare by value regardless of representation, so a
        // factor column mixing "5" and "5.0" still forms one group per value.
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.total_cmp(&b);
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the cell as an `f64` for statistics and axes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures when reading columns out of a loaded [`Dataset`].
#[derive(Debug, Error)]
pub enum DataError {
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),
    #[error("column '{0}' contains no numeric values")]
    EmptyColumn(String),
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// One row of the source CSV: column name → cell.
pub type Row = BTreeMap<String, CellValue>;

/// The full parsed table, read-only after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All rows in file order.
    pub rows: Vec<Row>,
    /// Column names in header order.
    pub column_names: Vec<String>,
}

impl Dataset {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn require_column(&self, name: &str) -> Result<(), DataError> {
        if self.column_names.iter().any(|c| c == name) {
            Ok(())
        } else {
            Err(DataError::MissingColumn(name.to_string()))
        }
    }

    /// All numeric values of a column, in row order. Non-numeric and null
    /// cells are skipped; an absent column is an error (this is the first
    /// point a misnamed required column fails, before anything is drawn).
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, DataError> {
        self.require_column(name)?;
        let values: Vec<f64> = self
            .rows
            .iter()
            .filter_map(|row| row.get(name).and_then(CellValue::as_f64))
            .collect();
        if values.is_empty() {
            return Err(DataError::EmptyColumn(name.to_string()));
        }
        Ok(values)
    }

    /// `(factor, outcome)` pairs for every row where both cells are numeric.
    /// Rows with a null factor value carry no group membership and are
    /// excluded; the remaining rows partition cleanly by factor value.
    pub fn factor_outcome_pairs(
        &self,
        factor: &str,
        outcome: &str,
    ) -> Result<Vec<(f64, f64)>, DataError> {
        self.require_column(factor)?;
        self.require_column(outcome)?;
        let pairs: Vec<(f64, f64)> = self
            .rows
            .iter()
            .filter_map(|row| {
                let x = row.get(factor).and_then(CellValue::as_f64)?;
                let y = row.get(outcome).and_then(CellValue::as_f64)?;
                Some((x, y))
            })
            .collect();
        if pairs.is_empty() {
            return Err(DataError::EmptyColumn(factor.to_string()));
        }
        Ok(pairs)
    }

    /// Outcome values partitioned by exact factor value, sorted by factor.
    pub fn grouped_outcomes(
        &self,
        factor: &str,
        outcome: &str,
    ) -> Result<BTreeMap<CellValue, Vec<f64>>, DataError> {
        self.require_column(factor)?;
        self.require_column(outcome)?;
        let mut groups: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();
        for row in &self.rows {
            let key = match row.get(factor) {
                Some(CellValue::Null) | None => continue,
                Some(v) => v.clone(),
            };
            if let Some(y) = row.get(outcome).and_then(CellValue::as_f64) {
                groups.entry(key).or_default().push(y);
            }
        }
        Ok(groups)
    }
}
