use super::error::DataError;

// ---------------------------------------------------------------------------
// Observation – one binned supernova measurement
// ---------------------------------------------------------------------------

/// A single (redshift, distance modulus, uncertainty) measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub z: f64,
    /// Distance modulus in magnitudes.
    pub mu: f64,
    /// 1-sigma uncertainty on `mu`.
    pub sigma: f64,
}

// ---------------------------------------------------------------------------
// ObservationSet – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Immutable, ordered collection of observations.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    observations: Vec<Observation>,
}

impl ObservationSet {
    /// Build from redshift and modulus columns plus a full covariance
    /// matrix. Only the diagonal is used: `sigma_i = sqrt(cov[i][i])`.
    pub fn from_covariance(
        z: Vec<f64>,
        mu: Vec<f64>,
        covariance: &[Vec<f64>],
    ) -> Result<Self, DataError> {
        let n = z.len();
        if covariance.len() != n {
            return Err(DataError::LengthMismatch {
                what: "covariance rows",
                expected: n,
                found: covariance.len(),
            });
        }
        for (row, values) in covariance.iter().enumerate() {
            if values.len() != n {
                return Err(DataError::NotSquare {
                    row,
                    expected: n,
                    found: values.len(),
                });
            }
        }

        let sigma = covariance
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let variance = row[i];
                if variance.is_finite() && variance > 0.0 {
                    Ok(variance.sqrt())
                } else {
                    Err(DataError::BadVariance {
                        index: i,
                        value: variance,
                    })
                }
            })
            .collect::<Result<Vec<f64>, DataError>>()?;

        Self::from_columns(z, mu, sigma)
    }

    /// Build from three equal-length columns.
    pub fn from_columns(z: Vec<f64>, mu: Vec<f64>, sigma: Vec<f64>) -> Result<Self, DataError> {
        if z.is_empty() {
            return Err(DataError::Empty);
        }
        for (what, len) in [("distance moduli", mu.len()), ("uncertainties", sigma.len())] {
            if len != z.len() {
                return Err(DataError::LengthMismatch {
                    what,
                    expected: z.len(),
                    found: len,
                });
            }
        }

        let mut observations = Vec::with_capacity(z.len());
        for (index, ((z, mu), sigma)) in z.into_iter().zip(mu).zip(sigma).enumerate() {
            for (field, value) in [("z", z), ("mu", mu)] {
                if !value.is_finite() {
                    return Err(DataError::NotFinite {
                        index,
                        field,
                        value,
                    });
                }
            }
            if z <= 0.0 {
                return Err(DataError::NonPositiveRedshift { index, value: z });
            }
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(DataError::BadVariance {
                    index,
                    value: sigma * sigma,
                });
            }
            observations.push(Observation { z, mu, sigma });
        }

        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Largest observed redshift.
    pub fn max_redshift(&self) -> f64 {
        self.observations
            .iter()
            .map(|o| o.z)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Observations with `z < z_max`, in dataset order.
    pub fn below(&self, z_max: f64) -> Vec<Observation> {
        self.observations
            .iter()
            .filter(|o| o.z < z_max)
            .copied()
            .collect()
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(values: &[f64]) -> Vec<Vec<f64>> {
        (0..values.len())
            .map(|i| {
                let mut row = vec![0.0; values.len()];
                row[i] = values[i];
                row
            })
            .collect()
    }

    #[test]
    fn sigma_is_sqrt_of_diagonal() {
        let mut cov = diag(&[0.01, 0.04]);
        cov[0][1] = 0.5;
        let set = ObservationSet::from_covariance(vec![0.1, 0.2], vec![38.0, 39.0], &cov).unwrap();
        assert_eq!(set.len(), 2);
        assert!((set.observations()[0].sigma - 0.1).abs() < 1e-12);
        assert!((set.observations()[1].sigma - 0.2).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_square_covariance() {
        let cov = vec![vec![0.01, 0.0], vec![0.01]];
        let err = ObservationSet::from_covariance(vec![0.1, 0.2], vec![38.0, 39.0], &cov)
            .unwrap_err();
        assert!(matches!(err, DataError::NotSquare { row: 1, .. }));
    }

    #[test]
    fn rejects_row_count_mismatch() {
        let err = ObservationSet::from_covariance(vec![0.1, 0.2], vec![38.0, 39.0], &diag(&[0.01]))
            .unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { .. }));
    }

    #[test]
    fn rejects_negative_variance() {
        let err = ObservationSet::from_covariance(vec![0.1], vec![38.0], &diag(&[-0.01]))
            .unwrap_err();
        assert!(matches!(err, DataError::BadVariance { index: 0, .. }));
    }

    #[test]
    fn rejects_zero_variance() {
        let err = ObservationSet::from_covariance(
            vec![0.1, 0.3, 0.6],
            vec![38.0, 40.5, 42.0],
            &diag(&[0.01, 0.0, 0.04]),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::BadVariance { index: 1, .. }));

        let err = ObservationSet::from_columns(vec![0.1], vec![38.0], vec![0.0]).unwrap_err();
        assert!(matches!(err, DataError::BadVariance { index: 0, .. }));
    }

    #[test]
    fn rejects_non_positive_redshift() {
        let err = ObservationSet::from_columns(
            vec![0.0, 0.3, 0.6],
            vec![38.0, 40.5, 42.0],
            vec![0.1, 0.1, 0.2],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::NonPositiveRedshift { index: 0, .. }));

        let err = ObservationSet::from_columns(vec![0.1, -0.2], vec![38.0, 39.0], vec![0.1; 2])
            .unwrap_err();
        assert!(matches!(err, DataError::NonPositiveRedshift { index: 1, .. }));
    }

    #[test]
    fn rejects_empty() {
        let err = ObservationSet::from_columns(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, DataError::Empty));
    }

    #[test]
    fn below_is_strict_and_ordered() {
        let set = ObservationSet::from_columns(
            vec![0.6, 0.1, 0.5, 0.3],
            vec![42.0, 38.0, 41.0, 40.0],
            vec![0.1; 4],
        )
        .unwrap();
        let zs: Vec<f64> = set.below(0.5).iter().map(|o| o.z).collect();
        assert_eq!(zs, vec![0.1, 0.3]);
        assert_eq!(set.max_redshift(), 0.6);
    }
}
