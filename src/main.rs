mod chart;
mod color;
mod data;
mod stats;

use std::path::Path;

use anyhow::Result;
use plotters::style::RGBColor;

use chart::curve::CurveFigure;
use chart::heatmap::HeatmapFigure;

// Fixed contract of the analysis run: one input file, six output files.
const DATA_PATH: &str = "data/FINAL_data_for_regression.csv";
const COL_CAPTION: &str = "Caption_Length";
const COL_HASHTAGS: &str = "Hashtags";
const COL_OUTCOME: &str = "z_Engagement Intention Score";

const FIG1_STEM: &str = "Figure_1_Final_Caption_Optimal";
const FIG2_STEM: &str = "Figure_2_Final_Hashtags";
const FIG3_STEM: &str = "Figure_3_Final_Heatmap";

const RED: RGBColor = RGBColor(211, 47, 47);
const BLUE: RGBColor = RGBColor(25, 118, 210);

fn main() -> Result<()> {
    env_logger::init();

    let dataset = data::loader::load_csv(Path::new(DATA_PATH))?;
    println!("columns: {}", dataset.column_names.join(", "));

    render_caption_figure(&dataset)?;
    render_hashtag_figure(&dataset)?;
    render_heatmap_figure(&dataset)?;

    log::info!("all figures written");
    Ok(())
}

/// Figure 1: inverted-U of engagement over caption length, plus the printed
/// peak-location estimate.
fn render_caption_figure(dataset: &data::Dataset) -> Result<()> {
    let pairs = dataset.factor_outcome_pairs(COL_CAPTION, COL_OUTCOME)?;
    let fit = stats::fit_quadratic(&pairs)?;
    let groups = stats::group_summaries(dataset, COL_CAPTION, COL_OUTCOME)?;

    let figure = CurveFigure {
        title: "Optimal caption length (H1 supported, H3 rejected)".into(),
        x_desc: "Caption Length (characters)".into(),
        y_desc: "Engagement Intention (z-standardized)".into(),
        x_range: (0.0, 210.0),
        accent: RED,
    };
    chart::curve::render(&figure, &fit, &groups, Path::new(FIG1_STEM), (1280, 880))?;

    print_peak_estimate(dataset, &pairs)
}

/// Peak caption length from the quadratic refitted on the z-scored axis.
/// The historical script hard-coded the coefficients here (a=-0.325,
/// b=-0.186); fitting first keeps the printed estimate consistent with
/// whatever data was actually loaded. The z-scoring statistics come from the
/// whole caption-length column, including rows whose outcome cell is null.
fn print_peak_estimate(dataset: &data::Dataset, pairs: &[(f64, f64)]) -> Result<()> {
    let column = dataset.numeric_column(COL_CAPTION)?;
    match stats::peak_in_raw_units(&column, pairs) {
        Ok(Some(peak)) => {
            log::info!("fitted standardized quadratic peaks at {peak:.1} characters");
            println!("Peak at approximately {} characters", peak.round());
        }
        Ok(None) => log::warn!("caption-length curve opens upward; no interior peak to report"),
        Err(e) => log::warn!("peak estimate skipped: {e}"),
    }
    Ok(())
}

/// Figure 2: hashtag-count effect with the same curve construction.
fn render_hashtag_figure(dataset: &data::Dataset) -> Result<()> {
    let pairs = dataset.factor_outcome_pairs(COL_HASHTAGS, COL_OUTCOME)?;
    let fit = stats::fit_quadratic(&pairs)?;
    let groups = stats::group_summaries(dataset, COL_HASHTAGS, COL_OUTCOME)?;

    let (x_min, x_max) = groups
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), g| {
            (lo.min(g.value), hi.max(g.value))
        });
    if !x_min.is_finite() || !x_max.is_finite() {
        anyhow::bail!("column '{COL_HASHTAGS}' has no numeric groups to plot");
    }

    let figure = CurveFigure {
        title: "More hashtags, slightly lower engagement (H4 rejected)".into(),
        x_desc: "Number of Hashtags".into(),
        y_desc: "Engagement Intention (z-standardized)".into(),
        x_range: (x_min - 1.0, x_max + 1.0),
        accent: BLUE,
    };
    chart::curve::render(&figure, &fit, &groups, Path::new(FIG2_STEM), (1120, 800))
}

/// Figure 3: cell-mean heatmap over both factors.
fn render_heatmap_figure(dataset: &data::Dataset) -> Result<()> {
    let grid = stats::cell_means(dataset, COL_CAPTION, COL_HASHTAGS, COL_OUTCOME)?;

    let figure = HeatmapFigure {
        title: "Best combination: 140 characters with 5-11 hashtags".into(),
        x_desc: "Number of Hashtags".into(),
        y_desc: "Caption Length (characters)".into(),
        colorbar_desc: "Mean Engagement Intention (z)".into(),
    };
    chart::heatmap::render(&figure, &grid, Path::new(FIG3_STEM), (1200, 880))
}
