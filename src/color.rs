use eframe::egui::{Color32, ColorImage};
use palette::{Hsl, IntoColor, Srgb};

use cosmo_viewer::fit::{ChiSquareSurface, Region};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Green, red, blue, then repeat.
const REGION_HUES: [f32; 3] = [120.0, 0.0, 240.0];

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32, alpha: u8) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgba_unmultiplied(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
        alpha,
    )
}

/// One hue per confidence-region set.
pub fn generate_hues(n: usize) -> Vec<f32> {
    REGION_HUES.iter().copied().cycle().take(n).collect()
}

// ---------------------------------------------------------------------------
// Region shading: chi-square cell → Color32
// ---------------------------------------------------------------------------

/// Fill colours for the two confidence regions of one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionShades {
    pub inner: Color32,
    pub outer: Color32,
}

impl RegionShades {
    pub fn from_hue(hue: f32) -> Self {
        Self {
            inner: hsl_to_color32(hue, 0.70, 0.30, 220),
            outer: hsl_to_color32(hue, 0.60, 0.60, 150),
        }
    }

    pub fn color_for(&self, region: Region) -> Color32 {
        match region {
            Region::Inner => self.inner,
            Region::Outer => self.outer,
            Region::Outside => Color32::TRANSPARENT,
        }
    }
}

/// Shades for `n` surfaces.
pub fn region_palette(n: usize) -> Vec<RegionShades> {
    generate_hues(n).into_iter().map(RegionShades::from_hue).collect()
}

/// Rasterise a surface's confidence regions, one pixel per grid cell.
/// Row 0 of the image is the largest Omega_Lambda.
pub fn region_image(surface: &ChiSquareSurface, shades: &RegionShades) -> ColorImage {
    let (n_m, n_l) = surface.grid().shape();
    let mut image = ColorImage::new([n_m, n_l], Color32::TRANSPARENT);
    for j in 0..n_l {
        for i in 0..n_m {
            image[(i, n_l - 1 - j)] = shades.color_for(surface.region(i, j));
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmo_viewer::cosmology::{CosmoParams, linspace};
    use cosmo_viewer::data::ObservationSet;
    use cosmo_viewer::fit::ParamGrid;

    #[test]
    fn hues_go_green_red_blue() {
        assert_eq!(generate_hues(2), vec![120.0, 0.0]);
        assert_eq!(generate_hues(4), vec![120.0, 0.0, 240.0, 120.0]);
        assert!(generate_hues(0).is_empty());
    }

    #[test]
    fn outside_is_transparent() {
        let shades = RegionShades::from_hue(0.0);
        assert_eq!(shades.color_for(Region::Outside), Color32::TRANSPARENT);
        assert_ne!(shades.inner, shades.outer);
    }

    #[test]
    fn image_is_flipped_vertically() {
        let truth = CosmoParams::new(71.0, 0.0, 1.5);
        let z = linspace(0.05, 1.0, 10);
        let mu = truth.distance_moduli(&z);
        let set = ObservationSet::from_columns(z, mu, vec![0.01; 10]).unwrap();
        let grid = ParamGrid::new((0.0, 1.0), (0.0, 1.5), 5);
        let surface = ChiSquareSurface::compute(&set, 2.0, 71.0, &grid);
        assert_eq!(surface.best_cell(), Some((0, 4)));

        let shades = RegionShades::from_hue(120.0);
        let image = region_image(&surface, &shades);
        assert_eq!(image.size, [5, 5]);
        // best cell (om = 0, ol = 1.5) sits in the top-left pixel
        assert_eq!(image[(0, 0)], shades.inner);
        assert_eq!(image[(4, 4)], Color32::TRANSPARENT);
    }
}
