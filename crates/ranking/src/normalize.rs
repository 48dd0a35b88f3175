//! Min-max scaling of feature columns.

use crate::error::Result;
use crate::weights::Feature;
use data_loader::FeatureVector;

/// Scale `values` into [0, 1] by `(v - min) / (max - min)`.
///
/// A zero range is replaced by 1, so a column of identical values (or a
/// single value) maps to all zeros.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    let range = if range == 0.0 { 1.0 } else { range };

    values.iter().map(|v| (v - min) / range).collect()
}

/// Extract one feature column from `rows` and normalize it on its own range
pub fn normalize_column(rows: &[FeatureVector], feature: Feature) -> Result<Vec<f64>> {
    let column = rows
        .iter()
        .map(|row| feature.value(row))
        .collect::<Result<Vec<f64>>>()?;
    Ok(normalize(&column))
}
