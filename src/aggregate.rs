//! Group-by-count and mean aggregations over a filtered view.
//!
//! Groups form in first-appearance order within the input records, so every
//! aggregation is deterministic for a given view.

use crate::dataset::{CategoryField, NumericField, Record};
use std::collections::HashMap;

/// A groupable dimension: a category field, or a numeric field whose values
/// become group keys (the sleep-hours distribution groups on a numeric).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Category(CategoryField),
    Numeric(NumericField),
}

/// Group key for a record, or `None` when the group value is missing.
/// Numeric keys use display form, so 7.0 and 7 share the key "7".
fn group_key(record: &Record, field: GroupField) -> Option<String> {
    match field {
        GroupField::Category(f) => {
            let v = f.value(record);
            if v.is_empty() {
                None
            } else {
                Some(v.to_string())
            }
        }
        GroupField::Numeric(f) => f.value(record).map(|v| format!("{}", v)),
    }
}

/// Counts records per group value, in first-appearance order. Records with a
/// missing group value are skipped.
pub fn count_by_group(records: &[&Record], field: GroupField) -> Vec<(String, usize)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, usize)> = Vec::new();
    for record in records {
        let Some(key) = group_key(record, field) else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 1));
            }
        }
    }
    groups
}

/// Mean of each listed numeric field over the records. A field with zero
/// non-missing values yields `None`, not zero.
pub fn mean_by_fields(
    records: &[&Record],
    fields: &[NumericField],
) -> Vec<(NumericField, Option<f64>)> {
    fields
        .iter()
        .map(|&field| {
            let mut sum = 0.0;
            let mut n = 0usize;
            for record in records {
                if let Some(v) = field.value(record) {
                    sum += v;
                    n += 1;
                }
            }
            let mean = if n == 0 { None } else { Some(sum / n as f64) };
            (field, mean)
        })
        .collect()
}

/// Mean of `value_field` per `group_field` value, in first-appearance order.
/// Groups whose value column is all-missing yield `None`.
pub fn mean_by_group(
    records: &[&Record],
    group_field: GroupField,
    value_field: NumericField,
) -> Vec<(String, Option<f64>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for record in records {
        let Some(key) = group_key(record, group_field) else {
            continue;
        };
        let i = match index.get(&key) {
            Some(&i) => i,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 0.0, 0));
                groups.len() - 1
            }
        };
        if let Some(v) = value_field.value(record) {
            groups[i].1 += v;
            groups[i].2 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(key, sum, n)| {
            let mean = if n == 0 { None } else { Some(sum / n as f64) };
            (key, mean)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;

    fn record(occupation: &str, health: Option<f64>) -> Record {
        Record {
            occupation: occupation.to_string(),
            overall_health: health,
            ..Record::default()
        }
    }

    #[test]
    fn counts_in_first_appearance_order() {
        let records = [
            record("Student", None),
            record("Student", None),
            record("Engineer", None),
            record("Student", None),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let groups = count_by_group(&refs, GroupField::Category(CategoryField::Occupation));
        assert_eq!(
            groups,
            vec![("Student".to_string(), 3), ("Engineer".to_string(), 1)]
        );
    }

    #[test]
    fn counts_sum_to_record_count_when_no_missing_keys() {
        let records = [
            record("Student", None),
            record("Engineer", None),
            record("Nurse", None),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let groups = count_by_group(&refs, GroupField::Category(CategoryField::Occupation));
        let total: usize = groups.iter().map(|(_, n)| n).sum();
        assert_eq!(total, refs.len());
    }

    #[test]
    fn missing_group_values_are_skipped() {
        let records = [record("", None), record("Student", None)];
        let refs: Vec<&Record> = records.iter().collect();
        let groups = count_by_group(&refs, GroupField::Category(CategoryField::Occupation));
        assert_eq!(groups, vec![("Student".to_string(), 1)]);
    }

    #[test]
    fn numeric_group_keys_use_display_form() {
        let records = [
            Record {
                sleep_hours: Some(7.0),
                ..Record::default()
            },
            Record {
                sleep_hours: Some(7.5),
                ..Record::default()
            },
            Record {
                sleep_hours: None,
                ..Record::default()
            },
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let groups = count_by_group(&refs, GroupField::Numeric(NumericField::SleepHours));
        assert_eq!(
            groups,
            vec![("7".to_string(), 1), ("7.5".to_string(), 1)]
        );
    }

    #[test]
    fn mean_by_fields_undefined_when_all_missing() {
        let records = [record("Student", None), record("Student", None)];
        let refs: Vec<&Record> = records.iter().collect();
        let means = mean_by_fields(
            &refs,
            &[NumericField::OverallHealth, NumericField::SleepHours],
        );
        assert_eq!(means[0], (NumericField::OverallHealth, None));
        assert_eq!(means[1], (NumericField::SleepHours, None));
    }

    #[test]
    fn mean_by_group_skips_missing_values_per_group() {
        let records = [
            record("Student", Some(4.0)),
            record("Student", Some(2.0)),
            record("Engineer", None),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let means = mean_by_group(
            &refs,
            GroupField::Category(CategoryField::Occupation),
            NumericField::OverallHealth,
        );
        assert_eq!(
            means,
            vec![
                ("Student".to_string(), Some(3.0)),
                ("Engineer".to_string(), None)
            ]
        );
    }
}
