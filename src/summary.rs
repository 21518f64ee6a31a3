//! Five-statistic KPI summaries of one numeric field under a filtered view.

use crate::dataset::{NumericField, Record};
use serde::Serialize;

/// Descriptive statistics for one numeric field. Missing values are excluded;
/// when `count` is zero the other four statistics are `None`, never a numeric
/// sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Kpi {
    pub fn empty() -> Kpi {
        Kpi {
            count: 0,
            mean: None,
            median: None,
            min: None,
            max: None,
        }
    }
}

/// Summarizes `field` over `records`, skipping missing values.
pub fn summarize(records: &[&Record], field: NumericField) -> Kpi {
    let mut values: Vec<f64> = records.iter().filter_map(|r| field.value(r)).collect();
    if values.is_empty() {
        return Kpi::empty();
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let median = if count % 2 == 1 {
        values[count / 2]
    } else {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    };

    Kpi {
        count,
        mean: Some(sum / count as f64),
        median: Some(median),
        min: Some(values[0]),
        max: Some(values[count - 1]),
    }
}
