//! Descriptive statistics over reads-per-base values

use crate::{CazaError, CazaResult, CoverageRecord};

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sum_squared_deviations(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
}

/// Sample standard deviation (n - 1 denominator), `None` below two values
pub fn sample_sd(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    Some((sum_squared_deviations(values, m) / (values.len() - 1) as f64).sqrt())
}

/// Population standard deviation (n denominator), `None` for an empty slice
pub fn population_sd(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some((sum_squared_deviations(values, m) / values.len() as f64).sqrt())
}

/// Genome-wide reads-per-base distribution every interval is normalized against
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeBaseline {
    pub count: usize,
    pub mean: Option<f64>,
    pub sample_sd: Option<f64>,
    pub population_sd: Option<f64>,
}

impl GenomeBaseline {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            mean: mean(values),
            sample_sd: sample_sd(values),
            population_sd: population_sd(values),
        }
    }

    pub fn from_records(records: &[CoverageRecord]) -> Self {
        let values: Vec<f64> = records.iter().map(|r| r.reads_per_base).collect();
        Self::from_values(&values)
    }

    /// Mean with sample and population deviations, failing when any is zero or undefined
    pub fn checked(&self) -> CazaResult<(f64, f64, f64)> {
        let mean = self.mean.ok_or_else(|| {
            CazaError::DegenerateBaseline("coverage table has no records".to_string())
        })?;

        let sample_sd = match self.sample_sd {
            Some(sd) if sd > 0.0 => sd,
            Some(_) => {
                return Err(CazaError::DegenerateBaseline(format!(
                    "all {} reads-per-base values are identical; standard deviation is zero",
                    self.count
                )))
            }
            None => {
                return Err(CazaError::DegenerateBaseline(format!(
                    "sample standard deviation needs at least two records, found {}",
                    self.count
                )))
            }
        };

        // Positive sample deviation implies positive population deviation
        let population_sd = self.population_sd.unwrap_or(0.0);
        if population_sd <= 0.0 {
            return Err(CazaError::DegenerateBaseline(
                "population standard deviation is zero".to_string(),
            ));
        }

        Ok((mean, sample_sd, population_sd))
    }
}
