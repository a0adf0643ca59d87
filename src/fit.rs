//! Chi-square surfaces over the (Omega_m, Omega_Lambda) plane.
//!
//! Each surface is evaluated once, eagerly, on a fixed grid for one redshift
//! cutoff. Confidence regions are the cells within a fixed chi-square offset
//! of the surface minimum.

use crate::cosmology::{CosmoParams, linspace};
use crate::data::{Observation, ObservationSet};

/// Two-parameter chi-square offset enclosing 68.3% of the probability.
pub const DELTA_CHI2_68: f64 = 2.30;
/// Two-parameter chi-square offset enclosing 95.4% of the probability.
pub const DELTA_CHI2_95: f64 = 6.17;

// ---------------------------------------------------------------------------
// ParamGrid
// ---------------------------------------------------------------------------

/// Fixed-resolution grid of candidate density pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    omega_m: Vec<f64>,
    omega_lambda: Vec<f64>,
}

impl ParamGrid {
    /// `resolution` samples along each axis, endpoints included.
    pub fn new(omega_m: (f64, f64), omega_lambda: (f64, f64), resolution: usize) -> Self {
        Self {
            omega_m: linspace(omega_m.0, omega_m.1, resolution),
            omega_lambda: linspace(omega_lambda.0, omega_lambda.1, resolution),
        }
    }

    pub fn omega_m(&self) -> &[f64] {
        &self.omega_m
    }

    pub fn omega_lambda(&self) -> &[f64] {
        &self.omega_lambda
    }

    /// (columns, rows) = (Omega_m samples, Omega_Lambda samples).
    pub fn shape(&self) -> (usize, usize) {
        (self.omega_m.len(), self.omega_lambda.len())
    }

    /// Density pair at column `i`, row `j`.
    pub fn cell(&self, i: usize, j: usize) -> (f64, f64) {
        (self.omega_m[i], self.omega_lambda[j])
    }

    /// `[[om_min, ol_min], [om_max, ol_max]]`.
    pub fn bounds(&self) -> [[f64; 2]; 2] {
        let first = |v: &[f64]| v.first().copied().unwrap_or(0.0);
        let last = |v: &[f64]| v.last().copied().unwrap_or(0.0);
        [
            [first(&self.omega_m), first(&self.omega_lambda)],
            [last(&self.omega_m), last(&self.omega_lambda)],
        ]
    }
}

// ---------------------------------------------------------------------------
// Chi-square
// ---------------------------------------------------------------------------

/// Sum of squared normalized residuals `((mu_obs - mu_model) / sigma)^2`.
pub fn chi_square<'a, I>(observations: I, params: &CosmoParams) -> f64
where
    I: IntoIterator<Item = &'a Observation>,
{
    observations
        .into_iter()
        .map(|o| {
            let r = (o.mu - params.distance_modulus(o.z)) / o.sigma;
            r * r
        })
        .sum()
}

/// Which confidence region a grid cell falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Within `DELTA_CHI2_68` of the minimum.
    Inner,
    /// Within `DELTA_CHI2_95` but outside the inner region.
    Outer,
    Outside,
}

// ---------------------------------------------------------------------------
// ChiSquareSurface
// ---------------------------------------------------------------------------

/// A completed chi-square grid for one redshift cutoff. Never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct ChiSquareSurface {
    z_max: f64,
    used: usize,
    grid: ParamGrid,
    /// Row-major: `values[j * n_m + i]` for Omega_Lambda row `j`, Omega_m column `i`.
    values: Vec<f64>,
    min: f64,
    best: Option<(usize, usize)>,
}

impl ChiSquareSurface {
    /// Evaluate chi-square at every grid cell using observations with
    /// `z < z_max`.
    pub fn compute(observations: &ObservationSet, z_max: f64, h0: f64, grid: &ParamGrid) -> Self {
        let subset = observations.below(z_max);
        let (n_m, n_l) = grid.shape();
        if subset.is_empty() {
            log::warn!("No observations below z = {z_max}; surface is flat");
        }

        let mut values = Vec::with_capacity(n_m * n_l);
        for &ol in grid.omega_lambda() {
            for &om in grid.omega_m() {
                let params = CosmoParams::new(h0, om, ol);
                values.push(chi_square(&subset, &params));
            }
        }

        let mut min = f64::INFINITY;
        let mut best = None;
        for (k, &v) in values.iter().enumerate() {
            if v.is_finite() && v < min {
                min = v;
                best = Some((k % n_m, k / n_m));
            }
        }

        let surface = Self {
            z_max,
            used: subset.len(),
            grid: grid.clone(),
            values,
            min,
            best,
        };
        if let Some((om, ol)) = surface.best_fit() {
            log::info!(
                "z < {z_max}: {} observations, min chi2 = {min:.3} at Om = {om:.3}, OL = {ol:.3}",
                surface.used
            );
        }
        surface
    }

    pub fn z_max(&self) -> f64 {
        self.z_max
    }

    /// Number of observations below the cutoff.
    pub fn observations_used(&self) -> usize {
        self.used
    }

    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.grid.omega_m.len() + i]
    }

    /// Smallest finite chi-square on the grid (`INFINITY` if none is finite).
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Grid cell `(i, j)` attaining the minimum.
    pub fn best_cell(&self) -> Option<(usize, usize)> {
        self.best
    }

    /// Density pair attaining the minimum.
    pub fn best_fit(&self) -> Option<(f64, f64)> {
        self.best.map(|(i, j)| self.grid.cell(i, j))
    }

    /// Contour levels `[min + 2.30, min + 6.17]`.
    pub fn levels(&self) -> [f64; 2] {
        [self.min + DELTA_CHI2_68, self.min + DELTA_CHI2_95]
    }

    /// Every cell is `Outside` when the surface has no finite minimum.
    pub fn region(&self, i: usize, j: usize) -> Region {
        if !self.min.is_finite() {
            return Region::Outside;
        }
        let v = self.value(i, j);
        let [inner, outer] = self.levels();
        if v <= inner {
            Region::Inner
        } else if v <= outer {
            Region::Outer
        } else {
            // NaN lands here too
            Region::Outside
        }
    }
}

/// One surface per cutoff, in the given order.
pub fn compute_surfaces(
    observations: &ObservationSet,
    cutoffs: &[f64],
    h0: f64,
    grid: &ParamGrid,
) -> Vec<ChiSquareSurface> {
    cutoffs
        .iter()
        .map(|&z_max| ChiSquareSurface::compute(observations, z_max, h0, grid))
        .collect()
}
