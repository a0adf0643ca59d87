//! Distance-modulus model.
//!
//! Luminosity distance is approximated by its Taylor expansion in redshift
//! up to third order, which keeps each evaluation to a handful of flops so
//! the fit curve can be recomputed on every pointer-motion event.

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 3.0e5;

// ---------------------------------------------------------------------------
// CosmoParams – (H0, Omega_m, Omega_Lambda)
// ---------------------------------------------------------------------------

/// Model parameters. `h0` is in km/s/Mpc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosmoParams {
    pub h0: f64,
    pub omega_m: f64,
    pub omega_lambda: f64,
}

impl CosmoParams {
    pub fn new(h0: f64, omega_m: f64, omega_lambda: f64) -> Self {
        Self {
            h0,
            omega_m,
            omega_lambda,
        }
    }

    /// Same Hubble constant, different density pair.
    pub fn with_densities(self, omega_m: f64, omega_lambda: f64) -> Self {
        Self {
            omega_m,
            omega_lambda,
            ..self
        }
    }

    /// Deceleration parameter `q0 = (Omega_m - 2 Omega_Lambda) / 2`.
    pub fn q0(&self) -> f64 {
        0.5 * (self.omega_m - 2.0 * self.omega_lambda)
    }

    /// Jerk parameter `j0 = Omega_m + Omega_Lambda`.
    pub fn j0(&self) -> f64 {
        self.omega_m + self.omega_lambda
    }

    /// Curvature density `Omega_k = Omega_m + Omega_Lambda - 1`.
    pub fn omega_k(&self) -> f64 {
        self.omega_m + self.omega_lambda - 1.0
    }

    /// Luminosity distance in Mpc, third-order expansion in `z`.
    pub fn luminosity_distance(&self, z: f64) -> f64 {
        let q0 = self.q0();
        let second = 0.5 * (1.0 - q0);
        let third = (1.0 - q0 - 3.0 * q0 * q0 + self.j0() + self.omega_k()) / 6.0;
        SPEED_OF_LIGHT_KM_S * z / self.h0 * (1.0 + second * z - third * z * z)
    }

    /// Distance modulus `m - M = 5 log10(d_L / Mpc) + 25`.
    ///
    /// Returns NaN when the truncated series yields a non-positive distance,
    /// which only happens far outside the plotted parameter range.
    pub fn distance_modulus(&self, z: f64) -> f64 {
        5.0 * self.luminosity_distance(z).log10() + 25.0
    }

    /// Batched [`distance_modulus`](Self::distance_modulus); output has the
    /// same length and order as `zs`.
    pub fn distance_moduli(&self, zs: &[f64]) -> Vec<f64> {
        zs.iter().map(|&z| self.distance_modulus(z)).collect()
    }
}

/// `n` evenly spaced samples over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_parameters() {
        let p = CosmoParams::new(71.0, 0.3, 0.7);
        assert_relative_eq!(p.q0(), -0.55);
        assert_relative_eq!(p.j0(), 1.0);
        assert_relative_eq!(p.omega_k(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn low_redshift_limit_is_hubble_law() {
        let p = CosmoParams::new(70.0, 0.3, 0.7);
        let z = 1e-6;
        assert_relative_eq!(
            p.luminosity_distance(z),
            SPEED_OF_LIGHT_KM_S * z / 70.0,
            max_relative = 1e-5
        );
    }

    #[test]
    fn known_value() {
        let p = CosmoParams::new(71.0, 0.3, 0.0);
        assert_relative_eq!(p.distance_modulus(0.1), 38.21836656324863, epsilon = 1e-9);
    }

    #[test]
    fn batched_matches_scalar() {
        let p = CosmoParams::new(71.0, 0.25, 0.8);
        let zs = [0.01, 0.2, 0.5, 1.1];
        let batch = p.distance_moduli(&zs);
        assert_eq!(batch.len(), zs.len());
        for (z, mu) in zs.iter().zip(&batch) {
            assert_eq!(*mu, p.distance_modulus(*z));
        }
        assert!(p.distance_moduli(&[]).is_empty());
    }

    #[test]
    fn linspace_endpoints() {
        let v = linspace(0.0, 1.5, 100);
        assert_eq!(v.len(), 100);
        assert_eq!(v[0], 0.0);
        assert_relative_eq!(v[99], 1.5, epsilon = 1e-12);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(2.0, 3.0, 0).is_empty());
    }
}
