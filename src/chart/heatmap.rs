use std::path::Path;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{factor_label, FONT};
use crate::color::{annotation_color, DivergingColormap};
use crate::stats::HeatmapGrid;

/// Width reserved on the right for the colorbar.
const COLORBAR_WIDTH: u32 = 150;
/// Gradient resolution of the colorbar.
const COLORBAR_STEPS: usize = 160;

/// Static description of the heatmap figure.
#[derive(Debug, Clone)]
pub struct HeatmapFigure {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub colorbar_desc: String,
}

/// Render the cell-mean grid as an annotated colour matrix with a colorbar,
/// to `<stem>.svg` and `<stem>.png`. Empty cells stay blank.
pub fn render(
    figure: &HeatmapFigure,
    grid: &HeatmapGrid,
    stem: &Path,
    size: (u32, u32),
) -> Result<()> {
    let svg_path = stem.with_extension("svg");
    {
        let root = SVGBackend::new(&svg_path, size).into_drawing_area();
        draw(&root, figure, grid, size)
            .map_err(|e| anyhow::anyhow!("drawing {}: {e}", svg_path.display()))?;
    }
    log::info!("wrote {}", svg_path.display());

    let png_path = stem.with_extension("png");
    {
        let root = BitMapBackend::new(&png_path, size).into_drawing_area();
        draw(&root, figure, grid, size)
            .map_err(|e| anyhow::anyhow!("drawing {}: {e}", png_path.display()))?;
    }
    log::info!("wrote {}", png_path.display());

    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &HeatmapFigure,
    grid: &HeatmapGrid,
    size: (u32, u32),
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (mut lo, mut hi) = grid.value_range().unwrap_or((-1.0, 1.0));
    if hi - lo < f64::EPSILON {
        // All occupied cells share one mean; widen so axes stay drawable.
        lo -= 0.5;
        hi += 0.5;
    }
    let colormap = DivergingColormap::new(lo, hi);

    let (matrix_area, bar_area) = root.split_horizontally(size.0.saturating_sub(COLORBAR_WIDTH));

    draw_matrix(&matrix_area, figure, grid, &colormap)?;
    draw_colorbar(&bar_area, figure, &colormap, lo, hi)?;

    root.present()?;
    Ok(())
}

fn draw_matrix<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &HeatmapFigure,
    grid: &HeatmapGrid,
    colormap: &DivergingColormap,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let n_cols = grid.col_values.len() as i32;
    let n_rows = grid.row_values.len() as i32;

    let mut chart = ChartBuilder::on(area)
        .caption(&figure.title, (FONT, 26))
        .margin(18)
        .x_label_area_size(55)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (0..n_cols).into_segmented(),
            (0..n_rows).into_segmented(),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(&figure.x_desc)
        .y_desc(&figure.y_desc)
        .axis_desc_style((FONT, 20))
        .label_style((FONT, 15))
        .x_label_formatter(&|v| segment_label(v, &grid.col_values))
        .y_label_formatter(&|v| segment_label(v, &grid.row_values))
        .draw()?;

    for (r, row) in grid.cells.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let Some(value) = cell else { continue };
            let fill = colormap.color_for(*value);
            let (c, r) = (c as i32, r as i32);

            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (SegmentValue::Exact(c), SegmentValue::Exact(r)),
                    (SegmentValue::Exact(c + 1), SegmentValue::Exact(r + 1)),
                ],
                fill.filled(),
            )))?;
            // White separators between cells.
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (SegmentValue::Exact(c), SegmentValue::Exact(r)),
                    (SegmentValue::Exact(c + 1), SegmentValue::Exact(r + 1)),
                ],
                WHITE.stroke_width(2),
            )))?;

            let ink = annotation_color(fill);
            let style = (FONT, 18)
                .into_font()
                .color(&ink)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series(std::iter::once(Text::new(
                format!("{value:.2}"),
                (SegmentValue::CenterOf(c), SegmentValue::CenterOf(r)),
                style,
            )))?;
        }
    }

    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    figure: &HeatmapFigure,
    colormap: &DivergingColormap,
    lo: f64,
    hi: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let mut bar = ChartBuilder::on(area)
        .margin(18)
        .margin_top(60)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(&figure.colorbar_desc)
        .axis_desc_style((FONT, 16))
        .label_style((FONT, 13))
        .draw()?;

    let step = (hi - lo) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let v0 = lo + i as f64 * step;
        let v1 = v0 + step;
        Rectangle::new(
            [(0.0, v0), (1.0, v1)],
            colormap.color_for(v0 + 0.5 * step).filled(),
        )
    }))?;

    Ok(())
}

/// Axis label for one segment: the underlying factor value, trimmed of a
/// trailing `.0` so integer-valued factors read as integers.
fn segment_label(v: &SegmentValue<i32>, values: &[f64]) -> String {
    let idx = match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => *i,
        SegmentValue::Last => return String::new(),
    };
    values
        .get(idx as usize)
        .map(|val| factor_label(*val))
        .unwrap_or_default()
}
