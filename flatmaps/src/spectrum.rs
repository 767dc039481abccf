//! Tabulated 1D functions of multipole ℓ
//!
//! Power spectra, beam transfer functions and noise curves all come in as
//! ordered (ℓ, value) pairs. [`Spectrum1D`] validates the ordering once at
//! the boundary so the spline and interpolation code can assume it.

use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building or parsing a spectrum table
#[derive(Error, Debug)]
pub enum SpectrumError {
    #[error("ell and value columns must have the same length ({ell} vs {values})")]
    LengthMismatch { ell: usize, values: usize },

    #[error("Need at least 2 samples, got {0}")]
    TooFewSamples(usize),

    #[error("Non-finite entry at index {0}")]
    NonFinite(usize),

    #[error("ell must be strictly increasing (violated at index {0})")]
    NotIncreasing(usize),

    #[error("Line {line}: expected at least two numeric columns, got {content:?}")]
    Parse { line: usize, content: String },

    #[error("I/O error while reading table: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered samples (ℓ, value) with ℓ strictly increasing
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum1D {
    ell: Vec<f64>,
    values: Vec<f64>,
}

impl Spectrum1D {
    /// Build a validated table from parallel columns.
    pub fn new(ell: Vec<f64>, values: Vec<f64>) -> Result<Self, SpectrumError> {
        if ell.len() != values.len() {
            return Err(SpectrumError::LengthMismatch {
                ell: ell.len(),
                values: values.len(),
            });
        }
        if ell.len() < 2 {
            return Err(SpectrumError::TooFewSamples(ell.len()));
        }
        if let Some(i) = ell
            .iter()
            .zip(&values)
            .position(|(l, v)| !l.is_finite() || !v.is_finite())
        {
            return Err(SpectrumError::NonFinite(i));
        }
        if let Some(i) = (1..ell.len()).find(|&i| ell[i] <= ell[i - 1]) {
            return Err(SpectrumError::NotIncreasing(i));
        }
        Ok(Self { ell, values })
    }

    /// Tabulate `f` at the given multipoles.
    pub fn from_fn<F>(ell: Vec<f64>, f: F) -> Result<Self, SpectrumError>
    where
        F: Fn(f64) -> f64,
    {
        let values = ell.iter().map(|&l| f(l)).collect();
        Self::new(ell, values)
    }

    /// Parse a whitespace-separated table, keeping the first two columns.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse_columns(text: &str) -> Result<Self, SpectrumError> {
        let mut ell = Vec::new();
        let mut values = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if let Some((l, v)) = parse_line(idx + 1, line)? {
                ell.push(l);
                values.push(v);
            }
        }
        Self::new(ell, values)
    }

    /// Same as [`Spectrum1D::parse_columns`] but streaming from a reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, SpectrumError> {
        let mut ell = Vec::new();
        let mut values = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            if let Some((l, v)) = parse_line(idx + 1, &line?)? {
                ell.push(l);
                values.push(v);
            }
        }
        Self::new(ell, values)
    }

    pub fn ell(&self) -> &[f64] {
        &self.ell
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.ell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ell.is_empty()
    }

    /// Largest tabulated multipole
    pub fn max_ell(&self) -> f64 {
        self.ell[self.ell.len() - 1]
    }

    /// Copy with negative values replaced by zero
    pub fn clamped_non_negative(&self) -> Self {
        Self {
            ell: self.ell.clone(),
            values: self.values.iter().map(|v| v.max(0.0)).collect(),
        }
    }
}

impl FromStr for Spectrum1D {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_columns(s)
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<Option<(f64, f64)>, SpectrumError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let mut cols = trimmed.split_whitespace().map(str::parse::<f64>);
    match (cols.next(), cols.next()) {
        (Some(Ok(l)), Some(Ok(v))) => Ok(Some((l, v))),
        _ => Err(SpectrumError::Parse {
            line: line_no,
            content: trimmed.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table() {
        let s = Spectrum1D::new(vec![2.0, 10.0, 100.0], vec![1.0, -0.5, 0.1]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.max_ell(), 100.0);
        assert_eq!(s.clamped_non_negative().values(), &[1.0, 0.0, 0.1]);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(matches!(
            Spectrum1D::new(vec![1.0, 2.0], vec![1.0]),
            Err(SpectrumError::LengthMismatch { ell: 2, values: 1 })
        ));
        assert!(matches!(
            Spectrum1D::new(vec![1.0], vec![1.0]),
            Err(SpectrumError::TooFewSamples(1))
        ));
        assert!(matches!(
            Spectrum1D::new(vec![1.0, 3.0, 3.0], vec![0.0; 3]),
            Err(SpectrumError::NotIncreasing(2))
        ));
        assert!(matches!(
            Spectrum1D::new(vec![1.0, 2.0], vec![f64::NAN, 0.0]),
            Err(SpectrumError::NonFinite(0))
        ));
    }

    #[test]
    fn test_parse_columns_skips_comments() {
        let text = "# ell  B_ell\n\n2 0.99 extra\n100   0.5\n  3000 1e-3\n";
        let s: Spectrum1D = text.parse().unwrap();
        assert_eq!(s.ell(), &[2.0, 100.0, 3000.0]);
        assert_eq!(s.values(), &[0.99, 0.5, 1e-3]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = Spectrum1D::parse_columns("2 1.0\n3\n").unwrap_err();
        match err {
            SpectrumError::Parse { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "3");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_from_reader() {
        let reader = std::io::Cursor::new("10 1\n20 2\n");
        let s = Spectrum1D::from_reader(reader).unwrap();
        assert_eq!(s.values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_from_fn() {
        let s = Spectrum1D::from_fn(vec![1.0, 2.0, 4.0], |l| 1.0 / l).unwrap();
        assert_eq!(s.values(), &[1.0, 0.5, 0.25]);
    }
}
