use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{BenchmarkTemplate, FieldValue, Record, Run, SeriesConfig};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load benchmark result records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one record per row, scalar columns only
/// * `.json`    – `[{ "field": value, ... }, ...]`
/// * `.csv`     – header row with field names, one record per line
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => {
            let root = read_json(path)?;
            records_from_json(&root)
        }
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading records from {}", path.display()))?;

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load hotspot runs: `[{ "name": ..., "hotspots": [{ "function", "percent", ... }] }]`.
pub fn load_runs(path: &Path) -> Result<Vec<Run>> {
    let root = read_json(path)?;
    let runs = runs_from_json(root).with_context(|| format!("loading runs from {}", path.display()))?;
    log::info!("Loaded {} runs from {}", runs.len(), path.display());
    Ok(runs)
}

/// Load saved series definitions (a JSON array of series objects).
pub fn load_series(path: &Path) -> Result<Vec<SeriesConfig>> {
    let root = read_json(path)?;
    serde_json::from_value(root).with_context(|| format!("parsing series from {}", path.display()))
}

fn read_json(path: &Path) -> Result<JsonValue> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON in {}", path.display()))
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "jobid": 17, "NUM_PROCS": 128, "DURATION": 412.5, "status": "ok" },
///   ...
/// ]
/// ```
pub fn records_from_json(root: &JsonValue) -> Result<Vec<Record>> {
    let rows = root.as_array().context("Expected top-level JSON array")?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<Record> {
            let obj = row
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_field(val)))
                .collect())
        })
        .collect()
}

pub fn runs_from_json(root: JsonValue) -> Result<Vec<Run>> {
    if !root.is_array() {
        bail!("Expected top-level JSON array of runs");
    }
    serde_json::from_value(root).context("runs must look like { name, hotspots: [{ function, percent }] }")
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row with field names, every other row is a record.
/// Cell types are guessed per cell.
fn load_csv(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    reader
        .records()
        .enumerate()
        .map(|(row_no, result)| -> Result<Record> {
            let row = result.with_context(|| format!("CSV row {row_no}"))?;
            Ok(headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.clone(), guess_field_type(value)))
                .collect())
        })
        .collect()
}

fn guess_field_type(s: &str) -> FieldValue {
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return FieldValue::Float(f);
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    FieldValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Load a Parquet file with one record per row.
///
/// Utf8, Int32/Int64, Float32/Float64 and Boolean columns become fields;
/// other column types are kept as their type name so the field still exists.
fn load_parquet(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        for row in 0..batch.num_rows() {
            let record: Record = names
                .iter()
                .enumerate()
                .map(|(col_idx, name)| (name.clone(), extract_field_value(batch.column(col_idx), row)))
                .collect();
            records.push(record);
        }
    }

    Ok(records)
}

/// Extract a single field value from an Arrow column at a given row.
fn extract_field_value(col: &Arc<dyn Array>, row: usize) -> FieldValue {
    if col.is_null(row) {
        return FieldValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map_or(FieldValue::Null, |s| FieldValue::String(s.value(row).to_string())),
        DataType::LargeUtf8 => FieldValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(FieldValue::Null, |a| FieldValue::Float(a.value(row))),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map_or(FieldValue::Null, |a| FieldValue::Bool(a.value(row))),
        other => FieldValue::String(format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// Catalogue directory
// ---------------------------------------------------------------------------

/// A results directory laid out as:
///
/// ```text
/// <root>/benchmarks.json        [{ "name", "vars": [{ "name", "desc" }] }]
/// <root>/data/<template>.json   records or runs for that template
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    templates: Vec<BenchmarkTemplate>,
}

impl Catalog {
    pub fn open(root: &Path) -> Result<Self> {
        let index = root.join("benchmarks.json");
        let templates: Vec<BenchmarkTemplate> = serde_json::from_value(read_json(&index)?)
            .with_context(|| format!("parsing template list {}", index.display()))?;
        log::info!("Catalogue {} lists {} templates", root.display(), templates.len());
        Ok(Self {
            root: root.to_path_buf(),
            templates,
        })
    }

    pub fn templates(&self) -> &[BenchmarkTemplate] {
        &self.templates
    }

    pub fn records(&self, template: &str) -> Result<Vec<Record>> {
        records_from_json(&read_json(&self.data_path(template)?)?)
            .with_context(|| format!("records for template '{template}'"))
    }

    pub fn runs(&self, template: &str) -> Result<Vec<Run>> {
        runs_from_json(read_json(&self.data_path(template)?)?)
            .with_context(|| format!("runs for template '{template}'"))
    }

    fn data_path(&self, template: &str) -> Result<PathBuf> {
        if template.is_empty() || template.contains(&['/', '\\'][..]) || template.starts_with('.') {
            bail!("Invalid template name '{template}'");
        }
        if !self.templates.iter().any(|t| t.name == template) {
            bail!("Unknown template '{template}'");
        }
        Ok(self.root.join("data").join(format!("{template}.json")))
    }
}
