/// Figure rendering: batch plotters output, one module per figure family.
///
/// Each renderer draws the same figure twice, once through the SVG backend
/// (vector artifact) and once through the bitmap backend (raster artifact),
/// writing `<stem>.svg` and `<stem>.png` next to the working directory.
/// Outputs are overwritten unconditionally on every run.

pub mod curve;
pub mod heatmap;

/// Font family used across all figures.
pub(crate) const FONT: &str = "sans-serif";

/// Axis label for a factor value: integer-valued factors print without a
/// decimal point.
pub(crate) fn factor_label(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}
