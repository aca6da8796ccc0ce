//! Statistical Helpers

/// Denominator used for the standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispersion {
    /// n - 1 denominator (needs at least two values)
    Sample,
    /// n denominator
    Population,
}

/// Summary statistics over the finite values of a series
#[derive(Debug, Clone)]
pub struct SeriesStats {
    /// Number of finite values
    pub count: usize,
    /// Number of NaN or infinite values ignored
    pub skipped: usize,
    /// Mean value (NaN when no finite values)
    pub mean: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Sum of squared deviations from the mean
    sum_sq_dev: f64,
}

impl SeriesStats {
    /// Compute statistics from a slice of values, skipping non-finite entries
    pub fn compute(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let skipped = values.len() - finite.len();

        if finite.is_empty() {
            return Self {
                count: 0,
                skipped,
                mean: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                sum_sq_dev: 0.0,
            };
        }

        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let min = finite.iter().cloned().fold(f64::MAX, f64::min);
        let max = finite.iter().cloned().fold(f64::MIN, f64::max);
        let sum_sq_dev = finite.iter().map(|v| (v - mean) * (v - mean)).sum();

        Self {
            count: finite.len(),
            skipped,
            mean,
            min,
            max,
            sum_sq_dev,
        }
    }

    /// Standard deviation, `None` when too few values for the chosen denominator
    pub fn std_dev(&self, dispersion: Dispersion) -> Option<f64> {
        let denominator = match dispersion {
            Dispersion::Sample if self.count >= 2 => self.count - 1,
            Dispersion::Population if self.count >= 1 => self.count,
            _ => return None,
        };
        Some((self.sum_sq_dev / denominator as f64).sqrt())
    }

    /// Standard deviation over mean, `None` unless the mean is positive
    pub fn coefficient_of_variation(&self, dispersion: Dispersion) -> Option<f64> {
        if !(self.mean > 0.0) {
            return None;
        }
        self.std_dev(dispersion).map(|sd| sd / self.mean)
    }
}

/// Arithmetic mean, NaN for an empty slice.
///
/// NaN entries propagate into the result.
pub fn mean_or_missing(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Largest finite value
pub fn peak(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
}
