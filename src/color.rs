use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Diverging colormap for the heatmap
// ---------------------------------------------------------------------------

// Anchors of a blue → pale-yellow → red diverging map (low engagement cold,
// high engagement hot).
const LOW: (u8, u8, u8) = (69, 117, 180);
const MID: (u8, u8, u8) = (255, 255, 191);
const HIGH: (u8, u8, u8) = (215, 48, 39);

/// Maps a value range onto a continuous diverging colormap.
#[derive(Debug, Clone)]
pub struct DivergingColormap {
    lo: f64,
    hi: f64,
}

impl DivergingColormap {
    /// Build a colormap over `[lo, hi]`. A degenerate range (all cell means
    /// equal) is widened so every value maps to the midpoint colour.
    pub fn new(lo: f64, hi: f64) -> Self {
        if hi - lo > f64::EPSILON {
            DivergingColormap { lo, hi }
        } else {
            DivergingColormap {
                lo: lo - 0.5,
                hi: hi + 0.5,
            }
        }
    }

    /// Colour for a value, clamped to the range.
    pub fn color_for(&self, value: f64) -> RGBColor {
        let t = ((value - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0) as f32;
        let (from, to, local) = if t < 0.5 {
            (LOW, MID, t * 2.0)
        } else {
            (MID, HIGH, (t - 0.5) * 2.0)
        };
        blend(from, to, local)
    }
}

fn blend(from: (u8, u8, u8), to: (u8, u8, u8), factor: f32) -> RGBColor {
    let a: LinSrgb<f32> = Srgb::new(from.0, from.1, from.2).into_format::<f32>().into_linear();
    let b: LinSrgb<f32> = Srgb::new(to.0, to.1, to.2).into_format::<f32>().into_linear();
    let mixed = Srgb::<f32>::from_linear(a.mix(b, factor)).into_format::<u8>();
    RGBColor(mixed.red, mixed.green, mixed.blue)
}

/// Black or white, whichever stays readable on the given cell colour.
pub fn annotation_color(cell: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = cell;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance > 140.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_the_anchor_colors() {
        let cm = DivergingColormap::new(-1.0, 1.0);
        assert_eq!(cm.color_for(-1.0), RGBColor(LOW.0, LOW.1, LOW.2));
        assert_eq!(cm.color_for(1.0), RGBColor(HIGH.0, HIGH.1, HIGH.2));
        assert_eq!(cm.color_for(0.0), RGBColor(MID.0, MID.1, MID.2));
    }

    #[test]
    fn midpoint_blend_lands_between_the_anchors() {
        let cm = DivergingColormap::new(-1.0, 1.0);
        let RGBColor(r, g, b) = cm.color_for(-0.5);
        assert!(LOW.0 < r && r < MID.0);
        assert!(LOW.1 < g && g < MID.1);
        assert!(LOW.2 < b && b < MID.2);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let cm = DivergingColormap::new(0.0, 1.0);
        assert_eq!(cm.color_for(-10.0), cm.color_for(0.0));
        assert_eq!(cm.color_for(10.0), cm.color_for(1.0));
    }

    #[test]
    fn degenerate_range_maps_to_midpoint() {
        let cm = DivergingColormap::new(0.3, 0.3);
        assert_eq!(cm.color_for(0.3), RGBColor(MID.0, MID.1, MID.2));
    }

    #[test]
    fn annotations_contrast_with_the_cell() {
        assert_eq!(annotation_color(RGBColor(255, 255, 191)), RGBColor(0, 0, 0));
        assert_eq!(
            annotation_color(RGBColor(69, 117, 180)),
            RGBColor(255, 255, 255)
        );
    }
}
