//! Drill-down state: the occupation table snapshot, the row selection made
//! against it, and resolution of both into a detail view.

use crate::aggregate::{self, GroupField};
use crate::dataset::{CategoryField, Dataset, NumericField, Record};
use crate::filter::{self, FilterKey, FilterSpec, FilterState};
use serde::Serialize;

/// One row of the occupation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub occupation: String,
    pub count: usize,
}

/// Materialized occupation counts, frozen until the occupation filter changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub rows: Vec<TableRow>,
}

impl TableSnapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }
}

/// Row selection against the current snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrillDownSelection {
    #[default]
    Unselected,
    Selected(usize),
}

/// Mean bar for one field of the detail view; `value` is `None` when the
/// sub-view has no non-missing values for the field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPoint {
    pub field: String,
    pub value: Option<f64>,
}

/// The resolved drill-down sub-view: a display label (the pinned occupation,
/// or `"All"`) and mean sleep-hours/stress-level bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub label: String,
    pub series: Vec<DetailPoint>,
}

/// Fields charted in the detail view.
const DETAIL_FIELDS: [NumericField; 2] = [NumericField::SleepHours, NumericField::StressLevel];

/// Holds the snapshot/selection pair and keeps the selection honest across
/// snapshot rebuilds: an index is only ever read against the snapshot it was
/// revalidated for.
#[derive(Debug, Clone, Default)]
pub struct DrillDownController {
    snapshot: TableSnapshot,
    selection: DrillDownSelection,
}

impl DrillDownController {
    pub fn new() -> DrillDownController {
        DrillDownController::default()
    }

    pub fn snapshot(&self) -> &TableSnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> DrillDownSelection {
        self.selection
    }

    /// Rebuilds the snapshot from the given (already occupation-filtered)
    /// view, then revalidates the selection: an index still in range for the
    /// new snapshot is kept, anything else resets to `Unselected`.
    pub fn rebuild_snapshot(&mut self, records: &[&Record]) {
        let rows = aggregate::count_by_group(
            records,
            GroupField::Category(CategoryField::Occupation),
        )
        .into_iter()
        .map(|(occupation, count)| TableRow { occupation, count })
        .collect();
        self.snapshot = TableSnapshot { rows };
        if let DrillDownSelection::Selected(i) = self.selection {
            if i >= self.snapshot.len() {
                self.selection = DrillDownSelection::Unselected;
            }
        }
    }

    /// Applies a row-selection event. `None` clears the selection. An
    /// out-of-range index is rejected and the prior state kept; returns
    /// whether the event changed anything.
    pub fn select(&mut self, row: Option<usize>) -> bool {
        match row {
            None => {
                self.selection = DrillDownSelection::Unselected;
                true
            }
            Some(i) if i < self.snapshot.len() => {
                self.selection = DrillDownSelection::Selected(i);
                true
            }
            Some(_) => false,
        }
    }

    /// Occupation pinned by the current selection, if any.
    pub fn pinned_occupation(&self) -> Option<&str> {
        match self.selection {
            DrillDownSelection::Selected(i) => {
                self.snapshot.rows.get(i).map(|r| r.occupation.as_str())
            }
            DrillDownSelection::Unselected => None,
        }
    }

    /// Resolves the selection into a detail view: pin the selected row's
    /// occupation (or none), apply the age/gender filters on top, and average
    /// the detail fields. Label falls back to `"All"` when nothing is pinned
    /// or the sub-view came out empty.
    pub fn resolve_detail_view(
        &self,
        dataset: &Dataset,
        age: &FilterSpec,
        gender: &FilterSpec,
    ) -> DetailView {
        let mut state = FilterState::new()
            .with(FilterKey::AgeGroup, age.clone())
            .with(FilterKey::Gender, gender.clone());
        let pinned = self.pinned_occupation();
        if let Some(occupation) = pinned {
            state.set(FilterKey::Occupation, FilterSpec::One(occupation.to_string()));
        }
        let view = filter::apply(dataset, &state);

        let label = match pinned {
            Some(occupation) if !view.is_empty() => occupation.to_string(),
            _ => filter::ALL_SENTINEL.to_string(),
        };
        let series = aggregate::mean_by_fields(&view, &DETAIL_FIELDS)
            .into_iter()
            .map(|(field, value)| DetailPoint {
                field: field.name().to_string(),
                value,
            })
            .collect();
        DetailView { label, series }
    }
}
