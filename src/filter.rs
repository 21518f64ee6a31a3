//! Filter state and the pure filter engine: AND across keys, OR within a
//! multi-value spec, with the `"All"` sentinel meaning no constraint.

use crate::dataset::{CategoryField, Dataset, Record};
use std::collections::BTreeMap;

/// The sentinel value that disables a multi-value filter when present.
pub const ALL_SENTINEL: &str = "All";

/// A constrainable dimension of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Gender,
    Occupation,
    AgeGroup,
}

impl FilterKey {
    pub fn field(self) -> CategoryField {
        match self {
            FilterKey::Gender => CategoryField::Gender,
            FilterKey::Occupation => CategoryField::Occupation,
            FilterKey::AgeGroup => CategoryField::AgeGroup,
        }
    }
}

/// Constraint on one filter key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterSpec {
    /// No constraint.
    #[default]
    Any,
    /// Exactly this value.
    One(String),
    /// Any of these values. Empty, or containing [`ALL_SENTINEL`], means no
    /// constraint regardless of the other listed values.
    AnyOf(Vec<String>),
}

impl FilterSpec {
    /// Builds a spec from an optional single dropdown value (`None` = no
    /// constraint).
    pub fn from_option(value: Option<String>) -> FilterSpec {
        match value {
            Some(v) => FilterSpec::One(v),
            None => FilterSpec::Any,
        }
    }

    /// Builds a spec from a checklist selection.
    pub fn from_values(values: Vec<String>) -> FilterSpec {
        FilterSpec::AnyOf(values)
    }

    pub fn is_unconstrained(&self) -> bool {
        match self {
            FilterSpec::Any => true,
            FilterSpec::One(_) => false,
            FilterSpec::AnyOf(values) => {
                values.is_empty() || values.iter().any(|v| v == ALL_SENTINEL)
            }
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        match self {
            FilterSpec::Any => true,
            FilterSpec::One(v) => v == value,
            FilterSpec::AnyOf(values) => values.iter().any(|v| v == value),
        }
    }
}

/// Mapping from filter key to its active spec. Unset keys are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    specs: BTreeMap<FilterKey, FilterSpec>,
}

impl FilterState {
    pub fn new() -> FilterState {
        FilterState::default()
    }

    pub fn with(mut self, key: FilterKey, spec: FilterSpec) -> FilterState {
        self.set(key, spec);
        self
    }

    pub fn set(&mut self, key: FilterKey, spec: FilterSpec) {
        self.specs.insert(key, spec);
    }

    pub fn spec(&self, key: FilterKey) -> &FilterSpec {
        static ANY: FilterSpec = FilterSpec::Any;
        self.specs.get(&key).unwrap_or(&ANY)
    }

    fn accepts(&self, record: &Record) -> bool {
        self.specs
            .iter()
            .all(|(key, spec)| spec.matches(key.field().value(record)))
    }
}

/// Returns the records satisfying every active spec, in dataset order. Pure:
/// the same `(dataset, state)` always yields the same view.
pub fn apply<'a>(dataset: &'a Dataset, state: &FilterState) -> Vec<&'a Record> {
    dataset
        .records()
        .iter()
        .filter(|r| state.accepts(r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;

    fn record(gender: &str, occupation: &str, age: &str) -> Record {
        Record {
            gender: gender.to_string(),
            occupation: occupation.to_string(),
            age_group: age.to_string(),
            ..Record::default()
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Male", "Student", "18-24"),
            record("Female", "Student", "18-24"),
            record("Male", "Engineer", "25-34"),
            record("Female", "Engineer", "35-44"),
        ])
    }

    #[test]
    fn unconstrained_state_returns_everything_in_order() {
        let ds = dataset();
        let view = apply(&ds, &FilterState::new());
        assert_eq!(view.len(), 4);
        assert_eq!(view[0].gender, "Male");
        assert_eq!(view[3].occupation, "Engineer");
    }

    #[test]
    fn all_sentinel_overrides_listed_values() {
        let ds = dataset();
        let state = FilterState::new().with(
            FilterKey::Gender,
            FilterSpec::AnyOf(vec!["Male".into(), ALL_SENTINEL.into()]),
        );
        assert_eq!(apply(&ds, &state).len(), 4);
    }

    #[test]
    fn empty_set_equals_no_constraint() {
        let ds = dataset();
        let empty = FilterState::new().with(FilterKey::Gender, FilterSpec::AnyOf(vec![]));
        let all = FilterState::new().with(
            FilterKey::Gender,
            FilterSpec::AnyOf(vec![ALL_SENTINEL.into()]),
        );
        assert_eq!(apply(&ds, &empty), apply(&ds, &all));
        assert_eq!(apply(&ds, &empty).len(), 4);
    }

    #[test]
    fn and_across_keys_or_within_spec() {
        let ds = dataset();
        let state = FilterState::new()
            .with(
                FilterKey::Gender,
                FilterSpec::AnyOf(vec!["Male".into(), "Female".into()]),
            )
            .with(FilterKey::Occupation, FilterSpec::One("Student".into()));
        let view = apply(&ds, &state);
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|r| r.occupation == "Student"));
    }

    #[test]
    fn unknown_value_yields_empty_not_error() {
        let ds = dataset();
        let state =
            FilterState::new().with(FilterKey::Occupation, FilterSpec::One("Astronaut".into()));
        assert!(apply(&ds, &state).is_empty());
    }

    #[test]
    fn view_is_subset_preserving_order() {
        let ds = dataset();
        let state = FilterState::new().with(FilterKey::Gender, FilterSpec::One("Female".into()));
        let view = apply(&ds, &state);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].occupation, "Student");
        assert_eq!(view[1].occupation, "Engineer");
    }
}
