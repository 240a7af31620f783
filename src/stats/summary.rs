use super::quadfit::Z95;
use crate::data::{DataError, Dataset};

// ---------------------------------------------------------------------------
// Scalar statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean. Undefined (NaN) for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n−1 denominator). Returns 0.0 for fewer than
/// two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Standard error of the mean: sample std / √n.
/// Convention: a single-observation group has SEM 0.0, so its error bar
/// collapses to a point instead of poisoning the renderer with NaN.
pub fn sem(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    sample_std(values) / (values.len() as f64).sqrt()
}

// ---------------------------------------------------------------------------
// Per-group summaries (one factor)
// ---------------------------------------------------------------------------

/// Mean and SEM of the outcome for one distinct factor value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// The factor value shared by every row in the group.
    pub value: f64,
    /// Number of observations.
    pub n: usize,
    /// Mean outcome.
    pub mean: f64,
    /// Standard error of the mean.
    pub sem: f64,
}

impl GroupSummary {
    /// Half-width of the 95% normal-approximation interval around the mean.
    pub fn ci95_halfwidth(&self) -> f64 {
        Z95 * self.sem
    }
}

/// Partition rows by exact factor value and summarise the outcome per group,
/// sorted by factor value. Non-numeric factor values cannot sit on a numeric
/// axis and are skipped.
pub fn group_summaries(
    dataset: &Dataset,
    factor: &str,
    outcome: &str,
) -> Result<Vec<GroupSummary>, DataError> {
    let groups = dataset.grouped_outcomes(factor, outcome)?;
    Ok(groups
        .iter()
        .filter_map(|(key, values)| {
            let value = key.as_f64()?;
            Some(GroupSummary {
                value,
                n: values.len(),
                mean: mean(values),
                sem: sem(values),
            })
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Cell means (two factors) for the heatmap
// ---------------------------------------------------------------------------

/// Dense grid of mean outcomes per (row factor, column factor) cell.
/// Cells with no observations are `None` and render blank.
#[derive(Debug, Clone)]
pub struct HeatmapGrid {
    /// Distinct row-factor values, ascending.
    pub row_values: Vec<f64>,
    /// Distinct column-factor values, ascending.
    pub col_values: Vec<f64>,
    /// `cells[r][c]` = mean outcome for (row_values[r], col_values[c]).
    pub cells: Vec<Vec<Option<f64>>>,
}

impl HeatmapGrid {
    /// Smallest and largest occupied cell mean, if any cell is occupied.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for v in self.cells.iter().flatten().flatten() {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
                None => (*v, *v),
            });
        }
        range
    }
}

/// Cross-tabulate two factors and compute the mean outcome per cell.
pub fn cell_means(
    dataset: &Dataset,
    row_factor: &str,
    col_factor: &str,
    outcome: &str,
) -> Result<HeatmapGrid, DataError> {
    let row_groups = dataset.grouped_outcomes(row_factor, outcome)?;
    let col_groups = dataset.grouped_outcomes(col_factor, outcome)?;

    let row_values: Vec<f64> = row_groups.keys().filter_map(|k| k.as_f64()).collect();
    let col_values: Vec<f64> = col_groups.keys().filter_map(|k| k.as_f64()).collect();

    // Sum/count per cell; BTreeMap keys come out sorted so the axes are too.
    let mut cells = vec![vec![(0.0f64, 0usize); col_values.len()]; row_values.len()];
    for row in &dataset.rows {
        let (Some(rv), Some(cv)) = (
            row.get(row_factor).and_then(|v| v.as_f64()),
            row.get(col_factor).and_then(|v| v.as_f64()),
        ) else {
            continue;
        };
        let Some(y) = row.get(outcome).and_then(|v| v.as_f64()) else {
            continue;
        };
        let (Some(r), Some(c)) = (
            row_values.iter().position(|v| *v == rv),
            col_values.iter().position(|v| *v == cv),
        ) else {
            continue;
        };
        cells[r][c].0 += y;
        cells[r][c].1 += 1;
    }

    let cells = cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(sum, n)| if n > 0 { Some(sum / n as f64) } else { None })
                .collect()
        })
        .collect();

    Ok(HeatmapGrid {
        row_values,
        col_values,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::CellValue;

    fn dataset(rows: &[(i64, i64, f64)]) -> Dataset {
        let column_names = vec!["cap".to_string(), "tags".to_string(), "score".to_string()];
        let rows = rows
            .iter()
            .map(|(cap, tags, score)| {
                let mut row = BTreeMap::new();
                row.insert("cap".to_string(), CellValue::Integer(*cap));
                row.insert("tags".to_string(), CellValue::Integer(*tags));
                row.insert("score".to_string(), CellValue::Float(*score));
                row
            })
            .collect();
        Dataset { rows, column_names }
    }

    #[test]
    fn group_means_and_sems_match_hand_computed_values() {
        // cap=5: scores 1, 2, 3 → mean 2, std 1, sem 1/√3
        // cap=70: scores 4, 6   → mean 5, std √2, sem 1
        let ds = dataset(&[
            (5, 1, 1.0),
            (5, 1, 2.0),
            (5, 1, 3.0),
            (70, 1, 4.0),
            (70, 1, 6.0),
        ]);
        let summaries = group_summaries(&ds, "cap", "score").unwrap();
        assert_eq!(summaries.len(), 2);

        let g5 = &summaries[0];
        assert_eq!(g5.value, 5.0);
        assert_eq!(g5.n, 3);
        assert!((g5.mean - 2.0).abs() < 1e-12);
        assert!((g5.sem - 1.0 / 3f64.sqrt()).abs() < 1e-12);

        let g70 = &summaries[1];
        assert_eq!(g70.value, 70.0);
        assert!((g70.mean - 5.0).abs() < 1e-12);
        assert!((g70.sem - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_observation_group_has_zero_sem() {
        let ds = dataset(&[(5, 1, 1.5), (70, 1, 2.5)]);
        let summaries = group_summaries(&ds, "cap", "score").unwrap();
        for g in &summaries {
            assert_eq!(g.n, 1);
            assert_eq!(g.sem, 0.0);
        }
    }

    #[test]
    fn summaries_are_sorted_by_factor_value() {
        let ds = dataset(&[(200, 1, 0.0), (5, 1, 0.0), (70, 1, 0.0)]);
        let summaries = group_summaries(&ds, "cap", "score").unwrap();
        let values: Vec<f64> = summaries.iter().map(|g| g.value).collect();
        assert_eq!(values, vec![5.0, 70.0, 200.0]);
    }

    #[test]
    fn cell_means_cross_tabulate_and_leave_gaps() {
        let ds = dataset(&[(5, 1, 1.0), (5, 1, 3.0), (5, 2, 4.0), (70, 2, 8.0)]);
        let grid = cell_means(&ds, "cap", "tags", "score").unwrap();

        assert_eq!(grid.row_values, vec![5.0, 70.0]);
        assert_eq!(grid.col_values, vec![1.0, 2.0]);
        assert_eq!(grid.cells[0][0], Some(2.0));
        assert_eq!(grid.cells[0][1], Some(4.0));
        assert_eq!(grid.cells[1][0], None); // no (70, 1) observations
        assert_eq!(grid.cells[1][1], Some(8.0));
        assert_eq!(grid.value_range(), Some((2.0, 8.0)));
    }
}
