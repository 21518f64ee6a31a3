//! Survey dataset loading: CSV via Polars, Excel via calamine, with a fixed
//! source-header rename map and extraction into typed records at load time.

use calamine::{open_workbook_auto, Data, Reader};
use color_eyre::Result;
use polars::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Source spreadsheet headers mapped to canonical field names. Headers are
/// trimmed before lookup; canonical names are also accepted as-is.
const RENAME_MAP: &[(&str, &str)] = &[
    ("Age Group", "age_group"),
    ("Gender", "gender"),
    ("Occupation/Status", "occupation"),
    ("Average hours of sleep per night", "sleep_hours"),
    ("How often do you exercise per week?", "exercise_days"),
    ("Average daily screen time (hours)", "screen_time"),
    ("Average daily study/work hours", "study_hours"),
    ("How often do you eat fast food?", "fast_food_freq"),
    ("How many glasses of water do you drink daily", "water_intake"),
    ("Rate your diet quality", "diet_quality"),
    ("How often do you feel stressed?", "stress_level"),
    ("Rate your energy level throughout the day", "energy_level"),
    ("How would you rate your overall health?", "overall_health"),
    ("Overall satisfaction with your lifestyle", "lifestyle_satisfaction"),
];

/// A required canonical column was not present in the source after renaming.
/// Fatal at load; wrapped in a `color_eyre::Report` and downcastable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub column: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "required column '{}' missing from source", self.column)
    }
}

impl std::error::Error for SchemaError {}

/// Categorical fields. Missing cells load as the empty string, which never
/// matches a value filter and is skipped by grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryField {
    AgeGroup,
    Gender,
    Occupation,
    ExerciseDays,
    FastFoodFreq,
}

impl CategoryField {
    pub const ALL: [CategoryField; 5] = [
        CategoryField::AgeGroup,
        CategoryField::Gender,
        CategoryField::Occupation,
        CategoryField::ExerciseDays,
        CategoryField::FastFoodFreq,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoryField::AgeGroup => "age_group",
            CategoryField::Gender => "gender",
            CategoryField::Occupation => "occupation",
            CategoryField::ExerciseDays => "exercise_days",
            CategoryField::FastFoodFreq => "fast_food_freq",
        }
    }

    pub fn value(self, record: &Record) -> &str {
        match self {
            CategoryField::AgeGroup => &record.age_group,
            CategoryField::Gender => &record.gender,
            CategoryField::Occupation => &record.occupation,
            CategoryField::ExerciseDays => &record.exercise_days,
            CategoryField::FastFoodFreq => &record.fast_food_freq,
        }
    }
}

/// Numeric and ordinal-rating fields. `None` means the cell was missing or NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericField {
    SleepHours,
    ScreenTime,
    StudyHours,
    WaterIntake,
    DietQuality,
    StressLevel,
    EnergyLevel,
    OverallHealth,
    LifestyleSatisfaction,
}

impl NumericField {
    pub const ALL: [NumericField; 9] = [
        NumericField::SleepHours,
        NumericField::ScreenTime,
        NumericField::StudyHours,
        NumericField::WaterIntake,
        NumericField::DietQuality,
        NumericField::StressLevel,
        NumericField::EnergyLevel,
        NumericField::OverallHealth,
        NumericField::LifestyleSatisfaction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::SleepHours => "sleep_hours",
            NumericField::ScreenTime => "screen_time",
            NumericField::StudyHours => "study_hours",
            NumericField::WaterIntake => "water_intake",
            NumericField::DietQuality => "diet_quality",
            NumericField::StressLevel => "stress_level",
            NumericField::EnergyLevel => "energy_level",
            NumericField::OverallHealth => "overall_health",
            NumericField::LifestyleSatisfaction => "lifestyle_satisfaction",
        }
    }

    /// Resolve a canonical field name (e.g. from config) to a field.
    pub fn from_name(name: &str) -> Option<NumericField> {
        NumericField::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn value(self, record: &Record) -> Option<f64> {
        match self {
            NumericField::SleepHours => record.sleep_hours,
            NumericField::ScreenTime => record.screen_time,
            NumericField::StudyHours => record.study_hours,
            NumericField::WaterIntake => record.water_intake,
            NumericField::DietQuality => record.diet_quality,
            NumericField::StressLevel => record.stress_level,
            NumericField::EnergyLevel => record.energy_level,
            NumericField::OverallHealth => record.overall_health,
            NumericField::LifestyleSatisfaction => record.lifestyle_satisfaction,
        }
    }
}

/// One survey respondent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub age_group: String,
    pub gender: String,
    pub occupation: String,
    pub exercise_days: String,
    pub fast_food_freq: String,
    pub sleep_hours: Option<f64>,
    pub screen_time: Option<f64>,
    pub study_hours: Option<f64>,
    pub water_intake: Option<f64>,
    pub diet_quality: Option<f64>,
    pub stress_level: Option<f64>,
    pub energy_level: Option<f64>,
    pub overall_health: Option<f64>,
    pub lifestyle_satisfaction: Option<f64>,
}

/// Options for reading the source file.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub excel_sheet: Option<String>,
    pub delimiter: Option<u8>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excel_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.excel_sheet = Some(sheet.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// The immutable in-memory survey table. Created once at startup; nothing
/// mutates it afterwards, so it is shared freely by all computations.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Loads the dataset from a CSV/TSV or Excel file, applying the rename map
    /// and extracting typed records. Fails with [`SchemaError`] if a required
    /// column is absent.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Dataset> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let df = match ext.as_deref() {
            Some("xls" | "xlsx" | "xlsm" | "xlsb") => read_excel(path, options)?,
            Some("csv" | "tsv" | "txt") | None => read_csv(path, options)?,
            Some(other) => {
                return Err(color_eyre::eyre::eyre!(
                    "unsupported file extension '{}' (expected csv, tsv, or Excel)",
                    other
                ))
            }
        };
        Dataset::from_dataframe(&df)
    }

    /// Builds the dataset from an already-read frame. Column names are trimmed
    /// and passed through the rename map before the schema check.
    pub fn from_dataframe(df: &DataFrame) -> Result<Dataset> {
        let height = df.height();
        let mut canonical: HashMap<&str, &Column> = HashMap::new();
        for column in df.columns() {
            let name = column.name().as_str().trim();
            let target = RENAME_MAP
                .iter()
                .find(|(source, _)| *source == name)
                .map(|(_, canon)| *canon)
                .or_else(|| {
                    RENAME_MAP
                        .iter()
                        .find(|(_, canon)| *canon == name)
                        .map(|(_, canon)| *canon)
                });
            if let Some(target) = target {
                canonical.insert(target, column);
            }
        }

        let mut records = vec![Record::default(); height];
        for field in CategoryField::ALL {
            let column = required_column(&canonical, field.name())?;
            let values = category_values(column, height)?;
            for (record, value) in records.iter_mut().zip(values) {
                match field {
                    CategoryField::AgeGroup => record.age_group = value,
                    CategoryField::Gender => record.gender = value,
                    CategoryField::Occupation => record.occupation = value,
                    CategoryField::ExerciseDays => record.exercise_days = value,
                    CategoryField::FastFoodFreq => record.fast_food_freq = value,
                }
            }
        }
        for field in NumericField::ALL {
            let column = required_column(&canonical, field.name())?;
            let values = numeric_values(column)?;
            for (record, value) in records.iter_mut().zip(values) {
                match field {
                    NumericField::SleepHours => record.sleep_hours = value,
                    NumericField::ScreenTime => record.screen_time = value,
                    NumericField::StudyHours => record.study_hours = value,
                    NumericField::WaterIntake => record.water_intake = value,
                    NumericField::DietQuality => record.diet_quality = value,
                    NumericField::StressLevel => record.stress_level = value,
                    NumericField::EnergyLevel => record.energy_level = value,
                    NumericField::OverallHealth => record.overall_health = value,
                    NumericField::LifestyleSatisfaction => {
                        record.lifestyle_satisfaction = value
                    }
                }
            }
        }

        Ok(Dataset { records })
    }

    /// Builds a dataset directly from records (tests and embedding callers).
    pub fn from_records(records: Vec<Record>) -> Dataset {
        Dataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn required_column<'a>(
    canonical: &HashMap<&str, &'a Column>,
    name: &str,
) -> Result<&'a Column> {
    canonical.get(name).copied().ok_or_else(|| {
        color_eyre::eyre::Report::new(SchemaError {
            column: name.to_string(),
        })
    })
}

/// Stringifies a column cell-by-cell. Numbers use their display form (`7.0`
/// renders as `7`), nulls become the empty string.
fn category_values(column: &Column, height: usize) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(height);
    for i in 0..height {
        let value = column.get(i)?;
        let s = match value {
            AnyValue::Null => String::new(),
            AnyValue::String(s) => s.trim().to_string(),
            AnyValue::StringOwned(s) => s.trim().to_string(),
            AnyValue::Boolean(b) => b.to_string(),
            // `{}` on f64 drops the trailing `.0`, so 7.0 renders as "7"
            AnyValue::Float64(v) if v.is_finite() => format!("{}", v),
            AnyValue::Float32(v) if v.is_finite() => format!("{}", v),
            AnyValue::Float64(_) | AnyValue::Float32(_) => String::new(),
            other => match other.extract::<i64>() {
                Some(i) => i.to_string(),
                None => other.to_string().trim_matches('"').trim().to_string(),
            },
        };
        out.push(s);
    }
    Ok(out)
}

/// Casts a column to f64; nulls and NaN become `None`.
fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>> {
    let casted = column.cast(&DataType::Float64)?;
    let values = casted.f64()?;
    Ok(values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

fn read_csv(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let mut read_options = CsvReadOptions::default();
    read_options.has_header = true;
    if let Some(delimiter) = options.delimiter {
        read_options = read_options.map_parse_options(|opts| opts.with_separator(delimiter));
    }
    let df = read_options
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()?;
    Ok(df)
}

/// Reads one worksheet eagerly with calamine and converts it to a frame.
/// Sheet is selected by 0-based index or name via `options.excel_sheet`.
fn read_excel(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| color_eyre::eyre::eyre!("Excel: {}", e))?;
    if workbook.sheet_names().is_empty() {
        return Err(color_eyre::eyre::eyre!("Excel file has no worksheets"));
    }
    let range = if let Some(sheet_sel) = options.excel_sheet.as_deref() {
        if let Ok(idx) = sheet_sel.parse::<usize>() {
            workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| color_eyre::eyre::eyre!("Excel: no sheet at index {}", idx))?
                .map_err(|e| color_eyre::eyre::eyre!("Excel: {}", e))?
        } else {
            workbook
                .worksheet_range(sheet_sel)
                .map_err(|e| color_eyre::eyre::eyre!("Excel: {}", e))?
        }
    } else {
        workbook
            .worksheet_range_at(0)
            .ok_or_else(|| color_eyre::eyre::eyre!("Excel: no first sheet"))?
            .map_err(|e| color_eyre::eyre::eyre!("Excel: {}", e))?
    };

    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    if rows.is_empty() {
        return Ok(DataFrame::new(0, vec![])?);
    }
    let headers: Vec<String> = rows[0]
        .iter()
        .map(|c| calamine::DataType::as_string(c).unwrap_or_else(|| c.to_string()))
        .collect();
    let mut columns = Vec::with_capacity(headers.len());
    for (col_idx, header) in headers.iter().enumerate() {
        let cells: Vec<Option<&Data>> = rows[1..].iter().map(|row| row.get(col_idx)).collect();
        let name = if header.is_empty() {
            format!("column_{}", col_idx + 1)
        } else {
            header.clone()
        };
        columns.push(excel_column_to_series(name.as_str(), &cells).into());
    }
    Ok(DataFrame::new_infer_height(columns)?)
}

/// Builds a Series from a column of calamine cells: numeric when every
/// non-empty cell has a numeric value, string otherwise.
fn excel_column_to_series(name: &str, cells: &[Option<&Data>]) -> Series {
    use calamine::DataType as CalamineTrait;
    let all_numeric = cells.iter().flatten().all(|c| {
        CalamineTrait::is_empty(*c) || c.as_f64().is_some() && !CalamineTrait::is_string(*c)
    });
    if all_numeric {
        let v: Vec<Option<f64>> = cells
            .iter()
            .map(|c| c.and_then(|cell| cell.as_f64()))
            .collect();
        Series::new(name.into(), v)
    } else {
        let v: Vec<Option<String>> = cells
            .iter()
            .map(|c| {
                c.and_then(|cell| {
                    if CalamineTrait::is_empty(cell) {
                        None
                    } else {
                        cell.as_string()
                    }
                })
            })
            .collect();
        Series::new(name.into(), v)
    }
}
