use std::path::Path;

use anyhow::Result;
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{factor_label, FONT};
use crate::stats::{GroupSummary, QuadraticFit};

/// Points along the smoothed curve and its band.
const CURVE_SAMPLES: usize = 120;

/// Static description of one regression figure (titles, axis, accent colour).
#[derive(Debug, Clone)]
pub struct CurveFigure {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    /// Fixed x-axis span; the curve and band are evaluated across all of it.
    pub x_range: (f64, f64),
    /// Curve and band colour.
    pub accent: RGBColor,
}

/// Render a quadratic regression curve with its 95% band plus the observed
/// group means with ±1.96×SEM error bars, to `<stem>.svg` and `<stem>.png`.
pub fn render(
    figure: &CurveFigure,
    fit: &QuadraticFit,
    groups: &[GroupSummary],
    stem: &Path,
    size: (u32, u32),
) -> Result<()> {
    let svg_path = stem.with_extension("svg");
    {
        let root = SVGBackend::new(&svg_path, size).into_drawing_area();
        draw(&root, figure, fit, groups)
            .map_err(|e| anyhow::anyhow!("drawing {}: {e}", svg_path.display()))?;
    }
    log::info!("wrote {}", svg_path.display());

    let png_path = stem.with_extension("png");
    {
        let root = BitMapBackend::new(&png_path, size).into_drawing_area();
        draw(&root, figure, fit, groups)
            .map_err(|e| anyhow::anyhow!("drawing {}: {e}", png_path.display()))?;
    }
    log::info!("wrote {}", png_path.display());

    Ok(())
}

/// f64 x-axis whose ticks sit exactly at the factor levels.
///
/// `WithKeyPoints<RangedCoordf64>` inherits `NoDefaultFormatting` from the
/// inner coord without providing a `ValueFormatter`, so it cannot feed
/// `configure_mesh`; this wrapper delegates to `RangedCoordf64` and formats
/// labels with `factor_label`.
struct FactorAxis {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
}

impl Ranged for FactorAxis {
    type ValueType = f64;
    type FormatOption = NoDefaultFormatting;

    fn range(&self) -> std::ops::Range<f64> {
        self.inner.range()
    }

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> std::ops::Range<i32> {
        self.inner.axis_pixel_range(limit)
    }
}

impl ValueFormatter<f64> for FactorAxis {
    fn format_ext(&self, value: &f64) -> String {
        factor_label(*value)
    }
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &CurveFigure,
    fit: &QuadraticFit,
    groups: &[GroupSummary],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = figure.x_range;
    let step = (x_hi - x_lo) / (CURVE_SAMPLES - 1) as f64;
    let xs: Vec<f64> = (0..CURVE_SAMPLES).map(|i| x_lo + i as f64 * step).collect();
    let bands: Vec<(f64, f64, f64)> = xs
        .iter()
        .map(|&x| {
            let (lo, hi) = fit.confidence_band(x);
            (x, lo, hi)
        })
        .collect();

    let (y_lo, y_hi) = y_span(&bands, groups);

    // Ticks sit at the factor levels, not at generic round numbers.
    let ticks: Vec<f64> = groups.iter().map(|g| g.value).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, (FONT, 26))
        .margin(18)
        .x_label_area_size(55)
        .y_label_area_size(70)
        .build_cartesian_2d(
            FactorAxis {
                inner: (x_lo..x_hi).into(),
                ticks,
            },
            y_lo..y_hi,
        )?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.06))
        .bold_line_style(BLACK.mix(0.12))
        .x_desc(&figure.x_desc)
        .y_desc(&figure.y_desc)
        .axis_desc_style((FONT, 20))
        .label_style((FONT, 15))
        .x_label_formatter(&|x| factor_label(*x))
        .draw()?;

    // Shaded 95% band: upper edge forward, lower edge back.
    let mut band: Vec<(f64, f64)> = bands.iter().map(|&(x, _, hi)| (x, hi)).collect();
    band.extend(bands.iter().rev().map(|&(x, lo, _)| (x, lo)));
    chart.draw_series(std::iter::once(Polygon::new(
        band,
        figure.accent.mix(0.15).filled(),
    )))?;

    chart.draw_series(LineSeries::new(
        xs.iter().map(|&x| (x, fit.predict(x))),
        figure.accent.stroke_width(4),
    ))?;

    // Observed group means with ±1.96×SEM whiskers on top of the curve.
    chart.draw_series(groups.iter().map(|g| {
        let half = g.ci95_halfwidth();
        ErrorBar::new_vertical(
            g.value,
            g.mean - half,
            g.mean,
            g.mean + half,
            BLACK.filled(),
            10,
        )
    }))?;
    chart
        .draw_series(
            groups
                .iter()
                .map(|g| Circle::new((g.value, g.mean), 6, BLACK.filled())),
        )?
        .label("Observed means ± 95% CI")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, BLACK.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((FONT, 15))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Vertical span covering the band and every error bar, with padding.
fn y_span(bands: &[(f64, f64, f64)], groups: &[GroupSummary]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &(_, b_lo, b_hi) in bands {
        lo = lo.min(b_lo);
        hi = hi.max(b_hi);
    }
    for g in groups {
        lo = lo.min(g.mean - g.ci95_halfwidth());
        hi = hi.max(g.mean + g.ci95_halfwidth());
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = 0.08 * (hi - lo).max(1e-6);
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fit_quadratic;

    fn inverted_u_inputs() -> (QuadraticFit, Vec<GroupSummary>) {
        let pairs: Vec<(f64, f64)> = [5.0, 70.0, 140.0, 200.0]
            .iter()
            .flat_map(|&x| {
                let y = -0.00005 * (x - 120.0) * (x - 120.0) + 0.4;
                [(x, y - 0.1), (x, y + 0.1)]
            })
            .collect();
        let fit = fit_quadratic(&pairs).unwrap();
        let groups = vec![
            GroupSummary {
                value: 5.0,
                n: 2,
                mean: -0.26,
                sem: 0.07,
            },
            GroupSummary {
                value: 140.0,
                n: 2,
                mean: 0.38,
                sem: 0.07,
            },
        ];
        (fit, groups)
    }

    #[test]
    fn writes_and_overwrites_svg_and_png() {
        let (fit, groups) = inverted_u_inputs();
        let figure = CurveFigure {
            title: "test figure".into(),
            x_desc: "x".into(),
            y_desc: "y".into(),
            x_range: (0.0, 210.0),
            accent: RGBColor(211, 47, 47),
        };
        let stem = std::env::temp_dir().join(format!("curve-figure-{}", std::process::id()));
        render(&figure, &fit, &groups, &stem, (640, 440)).unwrap();
        // A second run must overwrite the same paths in place.
        render(&figure, &fit, &groups, &stem, (640, 440)).unwrap();

        for ext in ["svg", "png"] {
            let path = stem.with_extension(ext);
            let len = std::fs::metadata(&path).unwrap().len();
            assert!(len > 0, "{} should not be empty", path.display());
            std::fs::remove_file(&path).ok();
        }
    }

    #[test]
    fn x_ticks_sit_at_the_factor_levels() {
        let (fit, groups) = inverted_u_inputs();
        let figure = CurveFigure {
            title: "tick figure".into(),
            x_desc: "x".into(),
            y_desc: "y".into(),
            x_range: (0.0, 210.0),
            accent: RGBColor(211, 47, 47),
        };
        let stem = std::env::temp_dir().join(format!("curve-ticks-{}", std::process::id()));
        render(&figure, &fit, &groups, &stem, (640, 440)).unwrap();

        let svg = std::fs::read_to_string(stem.with_extension("svg")).unwrap();
        for ext in ["svg", "png"] {
            std::fs::remove_file(stem.with_extension(ext)).ok();
        }

        // Group values label the axis; generic round ticks do not appear.
        assert!(svg.contains(">140<"), "factor tick 140 missing");
        assert!(svg.contains(">5<"), "factor tick 5 missing");
        assert!(!svg.contains(">60<"), "unexpected default tick 60");
    }

    #[test]
    fn y_span_covers_band_and_error_bars() {
        let bands = vec![(0.0, -0.5, 0.5), (1.0, -0.2, 0.9)];
        let groups = vec![GroupSummary {
            value: 0.5,
            n: 3,
            mean: 1.0,
            sem: 0.2,
        }];
        let (lo, hi) = y_span(&bands, &groups);
        assert!(lo < -0.5);
        assert!(hi > 1.0 + 1.96 * 0.2);
    }
}
