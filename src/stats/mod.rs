/// Summary statistics and the quadratic regression used by all three figures.
///
/// `summary` derives per-group means/SEMs and the heatmap's cell-mean grid;
/// `quadfit` fits `y = c0 + c1·x + c2·x²` by least squares and provides the
/// analytic 95% band plus the peak-location estimate.

pub mod quadfit;
pub mod summary;

pub use quadfit::{fit_quadratic, peak_from_coefficients, peak_in_raw_units, FitError, QuadraticFit, Z95};
pub use summary::{cell_means, group_summaries, GroupSummary, HeatmapGrid};
