use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::error::DataError;
use super::model::ObservationSet;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load observations from a two-column table (redshift, distance modulus)
/// and a square covariance matrix.
///
/// Both files may be whitespace-separated (`.dat`, `.txt`) or
/// comma-separated (`.csv`).
pub fn load_observations(table: &Path, covariance: &Path) -> Result<ObservationSet> {
    let rows = read_matrix(table)
        .with_context(|| format!("reading observation table {}", table.display()))?;
    let cov = read_matrix(covariance)
        .with_context(|| format!("reading covariance matrix {}", covariance.display()))?;

    let (z, mu) = split_columns(&rows)
        .with_context(|| format!("parsing observation table {}", table.display()))?;

    let set = ObservationSet::from_covariance(z, mu, &cov).context("validating dataset")?;
    log::info!(
        "Loaded {} observations from {} (z up to {:.3})",
        set.len(),
        table.display(),
        set.max_redshift()
    );
    Ok(set)
}

/// Load a self-contained JSON dataset.
///
/// Expected schema:
///
/// ```json
/// { "z": [0.01, ...], "mu": [32.95, ...], "cov": [[...], ...] }
/// ```
///
/// `"sigma": [...]` may be given instead of `"cov"`.
pub fn load_json(path: &Path) -> Result<ObservationSet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let raw: JsonDataset = serde_json::from_str(&text).context("parsing JSON")?;

    let set = match (raw.cov, raw.sigma) {
        (Some(cov), _) => ObservationSet::from_covariance(raw.z, raw.mu, &cov)?,
        (None, Some(sigma)) => ObservationSet::from_columns(raw.z, raw.mu, sigma)?,
        (None, None) => bail!("JSON dataset needs either a 'cov' or a 'sigma' field"),
    };
    log::info!("Loaded {} observations from {}", set.len(), path.display());
    Ok(set)
}

/// Whether `path` names a self-contained JSON dataset.
pub fn is_json(path: &Path) -> bool {
    extension(path) == "json"
}

#[derive(Debug, Deserialize)]
struct JsonDataset {
    z: Vec<f64>,
    mu: Vec<f64>,
    #[serde(default)]
    cov: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    sigma: Option<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// Numeric text tables
// ---------------------------------------------------------------------------

/// Read a numeric matrix. Dispatch by extension.
pub fn read_matrix(path: &Path) -> Result<Vec<Vec<f64>>> {
    let delimiter = match extension(path).as_str() {
        "csv" => b',',
        "dat" | "txt" | "" => b' ',
        _ => return Err(DataError::UnsupportedExtension(path.to_path_buf()).into()),
    };
    let text = std::fs::read_to_string(path).context("reading file")?;
    Ok(parse_matrix(&text, delimiter)?)
}

/// Parse delimited numeric text. `#` starts a comment line, blank lines are
/// skipped, runs of the delimiter count as one, and a leading row of
/// non-numeric tokens is treated as a header.
pub fn parse_matrix(text: &str, delimiter: u8) -> Result<Vec<Vec<f64>>, DataError> {
    let normalized;
    let text = if delimiter == b' ' {
        normalized = text.replace('\t', " ");
        normalized.as_str()
    } else {
        text
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (record_no, record) in reader.records().enumerate() {
        // The csv crate only fails here on invalid UTF-8, which `&str` rules out.
        let Ok(record) = record else { continue };
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(record_no + 1);

        let tokens: Vec<&str> = record.iter().filter(|t| !t.is_empty()).collect();
        if tokens.is_empty() {
            continue;
        }

        let parsed: Vec<Result<f64, _>> = tokens.iter().map(|t| t.parse::<f64>()).collect();
        if rows.is_empty() && parsed.iter().all(|p| p.is_err()) {
            // header row
            continue;
        }

        let mut row = Vec::with_capacity(tokens.len());
        for (column, (value, token)) in parsed.into_iter().zip(&tokens).enumerate() {
            match value {
                Ok(v) => row.push(v),
                Err(_) => {
                    return Err(DataError::Parse {
                        line,
                        column,
                        token: (*token).to_string(),
                    });
                }
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn split_columns(rows: &[Vec<f64>]) -> Result<(Vec<f64>, Vec<f64>), DataError> {
    let mut z = Vec::with_capacity(rows.len());
    let mut mu = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.len() < 2 {
            return Err(DataError::MissingColumns {
                line: i + 1,
                expected: 2,
                found: row.len(),
            });
        }
        z.push(row[0]);
        mu.push(row[1]);
    }
    Ok((z, mu))
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_table_with_comments() {
        let text = "# z mu\n0.010   32.95\n\n0.012\t33.88\n";
        let rows = parse_matrix(text, b' ').unwrap();
        assert_eq!(rows, vec![vec![0.010, 32.95], vec![0.012, 33.88]]);
    }

    #[test]
    fn csv_with_header() {
        let text = "z,mu\n0.1,38.0\n0.3,40.5\n";
        let rows = parse_matrix(text, b',').unwrap();
        assert_eq!(rows, vec![vec![0.1, 38.0], vec![0.3, 40.5]]);
    }

    #[test]
    fn bad_token_reports_position() {
        let text = "0.1 38.0\n0.3 forty\n";
        let err = parse_matrix(text, b' ').unwrap_err();
        match err {
            DataError::Parse { line, column, token } => {
                assert_eq!(line, 2);
                assert_eq!(column, 1);
                assert_eq!(token, "forty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn single_column_rows_are_rejected() {
        let err = split_columns(&[vec![0.1, 38.0], vec![0.2]]).unwrap_err();
        assert!(matches!(err, DataError::MissingColumns { line: 2, .. }));
    }

    #[test]
    fn unsupported_extension() {
        let err = read_matrix(Path::new("table.xlsx")).unwrap_err();
        assert!(err.downcast_ref::<DataError>().is_some());
    }
}
