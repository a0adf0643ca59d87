use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cosmology::{CosmoParams, linspace};
use crate::fit::ParamGrid;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "COSMO_VIEWER_CONFIG";

/// Smallest redshift on the sampled model curve (the model diverges at 0).
pub const CURVE_Z_MIN: f64 = 0.001;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// ViewerConfig
// ---------------------------------------------------------------------------

/// Viewer settings. Every field has a default; a JSON file may override any
/// subset of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Hubble constant in km/s/Mpc, held fixed.
    pub h0: f64,
    /// Reference `(Omega_m, Omega_Lambda)`; the residual plot is relative to it.
    pub reference: [f64; 2],
    /// One confidence region is computed per redshift cutoff.
    pub cutoffs: Vec<f64>,
    pub grid_resolution: usize,
    pub omega_m_range: [f64; 2],
    pub omega_lambda_range: [f64; 2],
    /// Number of redshifts the live model curve is sampled at.
    pub curve_samples: usize,
    pub table_path: PathBuf,
    pub covariance_path: PathBuf,
    /// Constant-deceleration guide lines drawn on the confidence plot.
    pub q0_guides: Vec<f64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            h0: 71.0,
            reference: [0.3, 0.0],
            cutoffs: vec![0.5, 1.5],
            grid_resolution: 100,
            omega_m_range: [0.0, 1.0],
            omega_lambda_range: [0.0, 1.5],
            curve_samples: 100,
            table_path: PathBuf::from("data/Betoule_2014.t1.dat"),
            covariance_path: PathBuf::from("data/Betoule_2014.cov.dat"),
            q0_guides: vec![-0.25, -0.5, -0.75, -1.0],
        }
    }
}

impl ViewerConfig {
    /// Defaults, overridden by the file named in [`CONFIG_ENV`] if set.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let config = Self::from_file(Path::new(&path))?;
                log::info!("Using config from {}", Path::new(&path).display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if !(self.h0.is_finite() && self.h0 > 0.0) {
            return invalid(format!("h0 must be positive, got {}", self.h0));
        }
        if self.grid_resolution < 2 {
            return invalid(format!(
                "grid_resolution must be at least 2, got {}",
                self.grid_resolution
            ));
        }
        if self.curve_samples < 2 {
            return invalid(format!(
                "curve_samples must be at least 2, got {}",
                self.curve_samples
            ));
        }
        for (name, [lo, hi]) in [
            ("omega_m_range", self.omega_m_range),
            ("omega_lambda_range", self.omega_lambda_range),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return invalid(format!("{name} must be increasing, got [{lo}, {hi}]"));
            }
        }
        if self.cutoffs.is_empty() {
            return invalid("at least one redshift cutoff is required".to_string());
        }
        if let Some(bad) = self.cutoffs.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
            return invalid(format!("redshift cutoffs must be positive, got {bad}"));
        }
        Ok(())
    }

    pub fn reference_params(&self) -> CosmoParams {
        CosmoParams::new(self.h0, self.reference[0], self.reference[1])
    }

    pub fn grid(&self) -> ParamGrid {
        ParamGrid::new(
            (self.omega_m_range[0], self.omega_m_range[1]),
            (self.omega_lambda_range[0], self.omega_lambda_range[1]),
            self.grid_resolution,
        )
    }

    /// Redshifts the live model curve is evaluated at, up to `z_max`.
    pub fn curve_redshifts(&self, z_max: f64) -> Vec<f64> {
        linspace(CURVE_Z_MIN, z_max, self.curve_samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(ViewerConfig::from_json("{}").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = ViewerConfig::from_json(r#"{ "h0": 70.0, "cutoffs": [0.3, 0.8, 1.5] }"#).unwrap();
        assert_eq!(config.h0, 70.0);
        assert_eq!(config.cutoffs, vec![0.3, 0.8, 1.5]);
        assert_eq!(config.grid_resolution, 100);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = ViewerConfig::from_json(r#"{ "hubble": 70.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_values_rejected() {
        for json in [
            r#"{ "h0": 0.0 }"#,
            r#"{ "grid_resolution": 1 }"#,
            r#"{ "omega_m_range": [1.0, 0.0] }"#,
            r#"{ "cutoffs": [] }"#,
            r#"{ "cutoffs": [-0.5] }"#,
        ] {
            let err = ViewerConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{json}");
        }
    }

    #[test]
    fn curve_redshifts_span() {
        let config = ViewerConfig::default();
        let zs = config.curve_redshifts(1.3);
        assert_eq!(zs.len(), 100);
        assert_eq!(zs[0], CURVE_Z_MIN);
        assert!((zs[99] - 1.3).abs() < 1e-12);
    }
}
