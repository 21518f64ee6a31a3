//! The reactive dispatcher: owns the filter and drill-down state, declares
//! the input dependencies of every derived output in one inspectable table,
//! and recomputes exactly the affected outputs for each input event.

use crate::chart_data::{self, CategorySeries};
use crate::dataset::{Dataset, NumericField};
use crate::drilldown::{DetailView, DrillDownController, TableSnapshot};
use crate::filter::{self, FilterKey, FilterSpec, FilterState};
use crate::summary::{self, Kpi};
use serde::{Deserialize, Serialize};

/// Inputs an output may depend on. `TableSnapshot` is the derived edge: it
/// changes whenever the occupation filter rebuilds the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    GenderFilter,
    OccupationFilter,
    AgeFilter,
    PieGenderFilter,
    TableSelection,
    TableSnapshot,
}

/// Derived outputs emitted to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKey {
    KpiCards,
    BarChart,
    PieChart,
    LineChart,
    OccupationTable,
    DetailChart,
}

/// Static dependency table. An input event recomputes exactly the outputs
/// whose row lists a changed input, in this order. KPI cards summarize the
/// unfiltered dataset, depend on nothing, and only recompute on a full
/// refresh.
pub const DEPENDENCIES: &[(OutputKey, &[InputKey])] = &[
    (OutputKey::KpiCards, &[]),
    (
        OutputKey::BarChart,
        &[InputKey::GenderFilter, InputKey::OccupationFilter],
    ),
    (OutputKey::PieChart, &[InputKey::PieGenderFilter]),
    (OutputKey::LineChart, &[InputKey::AgeFilter]),
    (OutputKey::OccupationTable, &[InputKey::OccupationFilter]),
    (
        OutputKey::DetailChart,
        &[
            InputKey::TableSnapshot,
            InputKey::AgeFilter,
            InputKey::GenderFilter,
            InputKey::TableSelection,
        ],
    ),
];

/// A discrete filter or selection change from the UI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum InputEvent {
    GenderFilterChanged(Vec<String>),
    OccupationFilterChanged(Option<String>),
    AgeFilterChanged(Option<String>),
    PieGenderChanged(Option<String>),
    TableRowSelected(Option<usize>),
}

/// One KPI card: a display title, the canonical field name, and its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub title: String,
    pub field: String,
    pub kpi: Kpi,
}

/// Recomputed payload for one output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputPayload {
    Kpis(Vec<KpiCard>),
    Table(TableSnapshot),
    Series(CategorySeries),
    Detail(DetailView),
}

/// An output key together with its freshly computed payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    pub key: OutputKey,
    pub payload: OutputPayload,
}

/// KPI fields rendered when the config does not override them.
pub const DEFAULT_KPI_FIELDS: [NumericField; 4] = [
    NumericField::SleepHours,
    NumericField::StressLevel,
    NumericField::LifestyleSatisfaction,
    NumericField::DietQuality,
];

/// "sleep_hours" -> "Sleep Hours"
fn title_for(field: NumericField) -> String {
    field
        .name()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Owns the dataset and all session state, and turns input events into
/// output payloads. Single-threaded: each event is fully processed, with all
/// dependent recomputation, before the next is accepted.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Dataset,
    kpi_fields: Vec<NumericField>,
    gender: FilterSpec,
    occupation: Option<String>,
    age: Option<String>,
    pie_gender: Option<String>,
    drilldown: DrillDownController,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Dashboard {
        Dashboard::with_kpi_fields(dataset, DEFAULT_KPI_FIELDS.to_vec())
    }

    pub fn with_kpi_fields(dataset: Dataset, kpi_fields: Vec<NumericField>) -> Dashboard {
        let mut dashboard = Dashboard {
            dataset,
            kpi_fields,
            gender: FilterSpec::Any,
            occupation: None,
            age: None,
            pie_gender: None,
            drilldown: DrillDownController::new(),
        };
        dashboard.rebuild_snapshot();
        dashboard
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn drilldown(&self) -> &DrillDownController {
        &self.drilldown
    }

    /// Applies one event and returns the recomputed outputs, in dependency
    /// table order. A rejected selection (out-of-range index) changes no
    /// input and so recomputes nothing.
    pub fn handle_event(&mut self, event: InputEvent) -> Vec<Output> {
        let mut changed: Vec<InputKey> = Vec::new();
        match event {
            InputEvent::GenderFilterChanged(values) => {
                self.gender = FilterSpec::from_values(values);
                changed.push(InputKey::GenderFilter);
            }
            InputEvent::OccupationFilterChanged(value) => {
                self.occupation = value;
                changed.push(InputKey::OccupationFilter);
                self.rebuild_snapshot();
                changed.push(InputKey::TableSnapshot);
            }
            InputEvent::AgeFilterChanged(value) => {
                self.age = value;
                changed.push(InputKey::AgeFilter);
            }
            InputEvent::PieGenderChanged(value) => {
                self.pie_gender = value;
                changed.push(InputKey::PieGenderFilter);
            }
            InputEvent::TableRowSelected(row) => {
                if self.drilldown.select(row) {
                    changed.push(InputKey::TableSelection);
                }
            }
        }
        self.outputs_for(&changed)
    }

    /// Recomputes every output, for the initial render.
    pub fn refresh_all(&self) -> Vec<Output> {
        DEPENDENCIES
            .iter()
            .map(|(key, _)| Output {
                key: *key,
                payload: self.compute(*key),
            })
            .collect()
    }

    fn outputs_for(&self, changed: &[InputKey]) -> Vec<Output> {
        DEPENDENCIES
            .iter()
            .filter(|(_, deps)| deps.iter().any(|d| changed.contains(d)))
            .map(|(key, _)| Output {
                key: *key,
                payload: self.compute(*key),
            })
            .collect()
    }

    fn compute(&self, key: OutputKey) -> OutputPayload {
        match key {
            OutputKey::KpiCards => {
                let view: Vec<_> = self.dataset.records().iter().collect();
                let cards = self
                    .kpi_fields
                    .iter()
                    .map(|&field| KpiCard {
                        title: title_for(field),
                        field: field.name().to_string(),
                        kpi: summary::summarize(&view, field),
                    })
                    .collect();
                OutputPayload::Kpis(cards)
            }
            OutputKey::BarChart => {
                let state = FilterState::new()
                    .with(FilterKey::Gender, self.gender.clone())
                    .with(FilterKey::Occupation, self.occupation_spec());
                let view = filter::apply(&self.dataset, &state);
                OutputPayload::Series(chart_data::bar_series(&view))
            }
            OutputKey::PieChart => {
                let state = FilterState::new().with(
                    FilterKey::Gender,
                    FilterSpec::from_option(self.pie_gender.clone()),
                );
                let view = filter::apply(&self.dataset, &state);
                OutputPayload::Series(chart_data::pie_series(&view))
            }
            OutputKey::LineChart => {
                let state = FilterState::new().with(FilterKey::AgeGroup, self.age_spec());
                let view = filter::apply(&self.dataset, &state);
                OutputPayload::Series(chart_data::line_series(&view))
            }
            OutputKey::OccupationTable => {
                OutputPayload::Table(self.drilldown.snapshot().clone())
            }
            OutputKey::DetailChart => OutputPayload::Detail(self.drilldown.resolve_detail_view(
                &self.dataset,
                &self.age_spec(),
                &self.gender,
            )),
        }
    }

    fn occupation_spec(&self) -> FilterSpec {
        FilterSpec::from_option(self.occupation.clone())
    }

    fn age_spec(&self) -> FilterSpec {
        FilterSpec::from_option(self.age.clone())
    }

    fn rebuild_snapshot(&mut self) {
        let state = FilterState::new().with(FilterKey::Occupation, self.occupation_spec());
        let view = filter::apply(&self.dataset, &state);
        self.drilldown.rebuild_snapshot(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;

    fn record(occupation: &str, gender: &str, age: &str, sleep: Option<f64>) -> Record {
        Record {
            occupation: occupation.to_string(),
            gender: gender.to_string(),
            age_group: age.to_string(),
            sleep_hours: sleep,
            ..Record::default()
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(Dataset::from_records(vec![
            record("Student", "Male", "18-24", Some(7.0)),
            record("Student", "Female", "18-24", Some(6.0)),
            record("Engineer", "Male", "25-34", Some(8.0)),
        ]))
    }

    fn keys(outputs: &[Output]) -> Vec<OutputKey> {
        outputs.iter().map(|o| o.key).collect()
    }

    #[test]
    fn dependency_table_covers_every_output_once() {
        let mut seen = Vec::new();
        for (key, _) in DEPENDENCIES {
            assert!(!seen.contains(key), "duplicate row for {:?}", key);
            seen.push(*key);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn occupation_event_recomputes_bar_table_and_detail() {
        let mut dash = dashboard();
        let outputs = dash.handle_event(InputEvent::OccupationFilterChanged(None));
        assert_eq!(
            keys(&outputs),
            vec![
                OutputKey::BarChart,
                OutputKey::OccupationTable,
                OutputKey::DetailChart
            ]
        );
    }

    #[test]
    fn age_event_recomputes_line_and_detail_only() {
        let mut dash = dashboard();
        let outputs = dash.handle_event(InputEvent::AgeFilterChanged(Some("18-24".into())));
        assert_eq!(keys(&outputs), vec![OutputKey::LineChart, OutputKey::DetailChart]);
    }

    #[test]
    fn pie_event_touches_only_pie_chart() {
        let mut dash = dashboard();
        let outputs = dash.handle_event(InputEvent::PieGenderChanged(Some("Male".into())));
        assert_eq!(keys(&outputs), vec![OutputKey::PieChart]);
    }

    #[test]
    fn snapshot_total_matches_filtered_record_count() {
        let mut dash = dashboard();
        let outputs = dash.handle_event(InputEvent::OccupationFilterChanged(Some(
            "Student".to_string(),
        )));
        let table = outputs
            .iter()
            .find(|o| o.key == OutputKey::OccupationTable)
            .expect("table output");
        match &table.payload {
            OutputPayload::Table(snapshot) => {
                assert_eq!(snapshot.total_count(), 2);
                assert_eq!(snapshot.rows.len(), 1);
            }
            other => panic!("expected table payload, got {:?}", other),
        }
    }

    #[test]
    fn rejected_selection_emits_nothing() {
        let mut dash = dashboard();
        let outputs = dash.handle_event(InputEvent::TableRowSelected(Some(99)));
        assert!(outputs.is_empty());
    }

    #[test]
    fn worked_example_from_three_records() {
        // snapshot [{Student,2},{Engineer,1}]; select row 0; age/gender cleared
        let mut dash = dashboard();
        dash.handle_event(InputEvent::OccupationFilterChanged(None));
        let snapshot = dash.drilldown().snapshot();
        assert_eq!(snapshot.rows[0].occupation, "Student");
        assert_eq!(snapshot.rows[0].count, 2);
        assert_eq!(snapshot.rows[1].occupation, "Engineer");
        assert_eq!(snapshot.rows[1].count, 1);

        dash.handle_event(InputEvent::TableRowSelected(Some(0)));
        dash.handle_event(InputEvent::AgeFilterChanged(None));
        let outputs = dash.handle_event(InputEvent::GenderFilterChanged(vec!["All".into()]));
        let detail = outputs
            .iter()
            .find(|o| o.key == OutputKey::DetailChart)
            .expect("detail output");
        match &detail.payload {
            OutputPayload::Detail(view) => assert_eq!(view.label, "Student"),
            other => panic!("expected detail payload, got {:?}", other),
        }
    }

    #[test]
    fn gender_all_equivalent_to_empty_set() {
        let mut with_all = dashboard();
        let mut with_empty = dashboard();
        let a = with_all.handle_event(InputEvent::GenderFilterChanged(vec!["All".into()]));
        let b = with_empty.handle_event(InputEvent::GenderFilterChanged(vec![]));
        assert_eq!(a, b);
    }

    #[test]
    fn replaying_the_same_event_is_idempotent() {
        let mut dash = dashboard();
        let event = InputEvent::OccupationFilterChanged(Some("Student".to_string()));
        let first = dash.handle_event(event.clone());
        let second = dash.handle_event(event);
        assert_eq!(first, second);
    }

    #[test]
    fn kpi_cards_only_on_refresh() {
        let dash = dashboard();
        let outputs = dash.refresh_all();
        assert_eq!(outputs.len(), DEPENDENCIES.len());
        assert_eq!(outputs[0].key, OutputKey::KpiCards);
        match &outputs[0].payload {
            OutputPayload::Kpis(cards) => {
                assert_eq!(cards.len(), 4);
                assert_eq!(cards[0].title, "Sleep Hours");
                assert_eq!(cards[0].kpi.count, 3);
                assert_eq!(cards[0].kpi.mean, Some(7.0));
            }
            other => panic!("expected kpi payload, got {:?}", other),
        }
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = InputEvent::GenderFilterChanged(vec!["Male".into(), "All".into()]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("gender_filter_changed"));
        let back: InputEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);

        let parsed: InputEvent =
            serde_json::from_str(r#"{"event":"table_row_selected","value":1}"#).unwrap();
        assert_eq!(parsed, InputEvent::TableRowSelected(Some(1)));
    }
}
