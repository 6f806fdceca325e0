use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FieldValue – a single scalar cell of a record
// ---------------------------------------------------------------------------

/// A dynamically-typed record field as it arrives from JSON, CSV or Parquet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.4}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

// ---------------------------------------------------------------------------
// Record – one benchmark result row
// ---------------------------------------------------------------------------

/// An open-ended mapping from field name to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<FieldValue>, const N: usize> From<[(K, V); N]> for Record {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// SeriesConfig – one user-defined plotted series
// ---------------------------------------------------------------------------

/// Filter plus x/y formulas for one plotted dataset.
///
/// The `xAxis` / `yAxis` / `filter` aliases accept the field names used by
/// the web front-end's saved series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    #[serde(alias = "xAxis", alias = "xExpr")]
    pub x_expr: String,
    #[serde(alias = "yAxis", alias = "yExpr")]
    pub y_expr: String,
    #[serde(alias = "filter", alias = "filterExpr")]
    pub filter_expr: String,
}

impl SeriesConfig {
    pub fn new(x_expr: impl Into<String>, y_expr: impl Into<String>, filter_expr: impl Into<String>) -> Self {
        Self {
            x_expr: x_expr.into(),
            y_expr: y_expr.into(),
            filter_expr: filter_expr.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Hotspots and runs
// ---------------------------------------------------------------------------

/// Change in a hotspot's cost relative to the same function in the previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delta {
    /// Within the tolerance band.
    #[serde(rename = "")]
    Unchanged,
    /// Cheaper than before.
    #[serde(rename = "success")]
    Improved,
    /// More expensive than before, or new.
    #[serde(rename = "danger")]
    Regressed,
}

impl Delta {
    pub fn as_str(self) -> &'static str {
        match self {
            Delta::Unchanged => "",
            Delta::Improved => "success",
            Delta::Regressed => "danger",
        }
    }
}

/// Movement of a hotspot in the ranking relative to the previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankChange {
    Up,
    Down,
    None,
}

/// One profiled function in a run's ranked hotspot list.
///
/// `delta` and `rank_change` are filled in by the comparator; any other
/// fields of the source document are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotEntry {
    pub function: String,
    pub percent: f64,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
    #[serde(
        default,
        rename = "rankChange",
        skip_deserializing,
        skip_serializing_if = "Option::is_none"
    )]
    pub rank_change: Option<RankChange>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HotspotEntry {
    pub fn new(function: impl Into<String>, percent: f64) -> Self {
        Self {
            function: function.into(),
            percent,
            delta: None,
            rank_change: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn clear_annotations(&mut self) {
        self.delta = None;
        self.rank_change = None;
    }
}

/// One benchmark execution's ranked hotspot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub name: String,
    #[serde(default)]
    pub hotspots: Vec<HotspotEntry>,
}

impl Run {
    pub fn new(name: impl Into<String>, hotspots: Vec<HotspotEntry>) -> Self {
        Self {
            name: name.into(),
            hotspots,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnAssignment – runs placed side by side
// ---------------------------------------------------------------------------

/// Comparison columns, each optionally holding a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnAssignment {
    columns: Vec<Option<Run>>,
}

impl Default for ColumnAssignment {
    /// A single empty column, ready for a first run.
    fn default() -> Self {
        Self::new(1)
    }
}

impl ColumnAssignment {
    pub fn new(n_columns: usize) -> Self {
        Self {
            columns: vec![None; n_columns],
        }
    }

    pub fn from_columns(columns: Vec<Option<Run>>) -> Self {
        Self { columns }
    }

    pub fn add_column(&mut self) -> usize {
        self.columns.push(None);
        self.columns.len() - 1
    }

    /// Place `run` in column `index`, growing the table if needed.
    pub fn assign(&mut self, index: usize, run: Run) {
        if index >= self.columns.len() {
            self.columns.resize(index + 1, None);
        }
        self.columns[index] = Some(run);
    }

    pub fn unassign(&mut self, index: usize) -> Option<Run> {
        self.columns.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&Run> {
        self.columns.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Run>> {
        self.columns.iter().map(Option::as_ref)
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Option<Run>] {
        &mut self.columns
    }

    pub fn into_columns(self) -> Vec<Option<Run>> {
        self.columns
    }
}

// ---------------------------------------------------------------------------
// Benchmark catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

/// A benchmark template and the parameters its jobs are submitted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkTemplate {
    pub name: String,
    #[serde(default)]
    pub vars: Vec<TemplateVariable>,
}
