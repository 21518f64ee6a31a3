//! Build chart series from a filtered view: compose the aggregations and
//! convert them to ordered (category, value) points for the rendering layer.

use crate::aggregate::{self, GroupField};
use crate::dataset::{CategoryField, NumericField, Record};
use serde::Serialize;

/// One point of a categorical chart series. `value` is `None` when the
/// aggregation had nothing to average (counts are always defined).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPoint {
    pub category: String,
    pub value: Option<f64>,
}

/// An ordered categorical series for a bar, pie, or line view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorySeries {
    pub points: Vec<CategoryPoint>,
}

/// Mean overall health per age group (bar chart).
pub fn bar_series(records: &[&Record]) -> CategorySeries {
    let points = aggregate::mean_by_group(
        records,
        GroupField::Category(CategoryField::AgeGroup),
        NumericField::OverallHealth,
    )
    .into_iter()
    .map(|(category, value)| CategoryPoint { category, value })
    .collect();
    CategorySeries { points }
}

/// Respondent count per exercise-frequency bucket (pie chart).
pub fn pie_series(records: &[&Record]) -> CategorySeries {
    let points =
        aggregate::count_by_group(records, GroupField::Category(CategoryField::ExerciseDays))
            .into_iter()
            .map(|(category, count)| CategoryPoint {
                category,
                value: Some(count as f64),
            })
            .collect();
    CategorySeries { points }
}

/// Respondent count per sleep-hours value (line chart). Grouping is
/// first-appearance like everywhere else; points are then sorted ascending by
/// the numeric key so the line reads left to right.
pub fn line_series(records: &[&Record]) -> CategorySeries {
    let mut groups =
        aggregate::count_by_group(records, GroupField::Numeric(NumericField::SleepHours));
    groups.sort_by(|(a, _), (b, _)| {
        let a: f64 = a.parse().unwrap_or(f64::MAX);
        let b: f64 = b.parse().unwrap_or(f64::MAX);
        a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
    });
    let points = groups
        .into_iter()
        .map(|(category, count)| CategoryPoint {
            category,
            value: Some(count as f64),
        })
        .collect();
    CategorySeries { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;

    #[test]
    fn bar_series_groups_age_means() {
        let records = [
            Record {
                age_group: "18-24".into(),
                overall_health: Some(4.0),
                ..Record::default()
            },
            Record {
                age_group: "18-24".into(),
                overall_health: Some(2.0),
                ..Record::default()
            },
            Record {
                age_group: "25-34".into(),
                overall_health: None,
                ..Record::default()
            },
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let series = bar_series(&refs);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].category, "18-24");
        assert_eq!(series.points[0].value, Some(3.0));
        assert_eq!(series.points[1].value, None);
    }

    #[test]
    fn line_series_sorted_by_numeric_key() {
        let records = [
            Record {
                sleep_hours: Some(8.0),
                ..Record::default()
            },
            Record {
                sleep_hours: Some(6.5),
                ..Record::default()
            },
            Record {
                sleep_hours: Some(8.0),
                ..Record::default()
            },
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let series = line_series(&refs);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].category, "6.5");
        assert_eq!(series.points[1].category, "8");
        assert_eq!(series.points[1].value, Some(2.0));
    }

    #[test]
    fn pie_series_counts_buckets() {
        let records = [
            Record {
                exercise_days: "3".into(),
                ..Record::default()
            },
            Record {
                exercise_days: "3".into(),
                ..Record::default()
            },
            Record {
                exercise_days: "0".into(),
                ..Record::default()
            },
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let series = pie_series(&refs);
        assert_eq!(series.points[0].category, "3");
        assert_eq!(series.points[0].value, Some(2.0));
        assert_eq!(series.points[1].category, "0");
    }
}
