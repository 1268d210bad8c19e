use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::definition::AggregateFunction;

/// Separator between group and X key in the textual bucket key.
pub const GROUP_KEY_SEPARATOR: &str = "::";

/// Reserved key of the synthetic long-tail bucket.
pub const OTHER_BUCKET_KEY: &str = "Other";

/// Storage key of one bucket: X key plus the group when grouping is active.
///
/// Displays as `group::x` for grouped charts and `x` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub group: Option<String>,
    pub x: String,
}

impl BucketKey {
    #[must_use]
    pub fn ungrouped(x: impl Into<String>) -> Self {
        Self {
            group: None,
            x: x.into(),
        }
    }

    #[must_use]
    pub fn grouped(group: impl Into<String>, x: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            x: x.into(),
        }
    }

    #[must_use]
    pub fn with_x(&self, x: impl Into<String>) -> Self {
        Self {
            group: self.group.clone(),
            x: x.into(),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{group}{GROUP_KEY_SEPARATOR}{}", self.x),
            None => f.write_str(&self.x),
        }
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BucketKey {
    /// Splits on the first separator; a textual key cannot tell an ungrouped
    /// X key that contains `::` apart from a grouped one.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(match text.split_once(GROUP_KEY_SEPARATOR) {
            Some((group, x)) => Self::grouped(group, x),
            None => Self::ungrouped(text),
        })
    }
}

/// Aggregated value of one measure in one bucket.
///
/// `samples` counts contributing rows so that averages can be merged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasureCell {
    pub value: f64,
    pub samples: u64,
}

impl MeasureCell {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self { value, samples: 1 }
    }
}

/// Per-measure aggregates of one bucket, keyed by measure field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket {
    cells: IndexMap<String, MeasureCell>,
}

impl Bucket {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(&self, field: &str) -> Option<f64> {
        self.cells.get(field).map(|cell| cell.value)
    }

    #[must_use]
    pub fn cell(&self, field: &str) -> Option<&MeasureCell> {
        self.cells.get(field)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &MeasureCell)> {
        self.cells.iter().map(|(field, cell)| (field.as_str(), cell))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn set(&mut self, field: impl Into<String>, cell: MeasureCell) {
        self.cells.insert(field.into(), cell);
    }

    /// Sum of all measure values; used as the bucket's weight for sorting
    /// and proportion charts.
    #[must_use]
    pub fn cardinality(&self) -> f64 {
        self.cells.values().map(|cell| cell.value).sum()
    }

    /// Folds one row value into the measure.
    pub fn accumulate(&mut self, field: &str, function: AggregateFunction, value: f64) {
        match self.cells.get_mut(field) {
            None => {
                let initial = match function {
                    AggregateFunction::Count => 1.0,
                    _ => value,
                };
                self.cells.insert(field.to_owned(), MeasureCell::new(initial));
            }
            Some(cell) => {
                let samples = cell.samples + 1;
                cell.value = match function {
                    AggregateFunction::Sum => cell.value + value,
                    AggregateFunction::Count => cell.value + 1.0,
                    AggregateFunction::First => cell.value,
                    AggregateFunction::Last => value,
                    AggregateFunction::Min => cell.value.min(value),
                    AggregateFunction::Max => cell.value.max(value),
                    AggregateFunction::Avg => cell.value + (value - cell.value) / samples as f64,
                };
                cell.samples = samples;
            }
        }
    }

    /// Merges another bucket of the same chart, honoring each measure's
    /// aggregate function. Fields without a known function are summed.
    pub fn merge_aggregated<F>(&mut self, other: &Bucket, function_of: F)
    where
        F: Fn(&str) -> Option<AggregateFunction>,
    {
        for (field, incoming) in &other.cells {
            let Some(cell) = self.cells.get_mut(field) else {
                self.cells.insert(field.clone(), *incoming);
                continue;
            };
            let samples = cell.samples + incoming.samples;
            cell.value = match function_of(field).unwrap_or(AggregateFunction::Sum) {
                AggregateFunction::Sum | AggregateFunction::Count => cell.value + incoming.value,
                AggregateFunction::First => cell.value,
                AggregateFunction::Last => incoming.value,
                AggregateFunction::Min => cell.value.min(incoming.value),
                AggregateFunction::Max => cell.value.max(incoming.value),
                AggregateFunction::Avg if samples > 0 => {
                    (cell.value * cell.samples as f64 + incoming.value * incoming.samples as f64)
                        / samples as f64
                }
                AggregateFunction::Avg => cell.value,
            };
            cell.samples = samples;
        }
    }

    /// Field-wise sum, used when collapsing buckets into `Other`.
    pub fn add_fieldwise(&mut self, other: &Bucket) {
        self.merge_aggregated(other, |_| Some(AggregateFunction::Sum));
    }

    /// Copy restricted to `fields`.
    #[must_use]
    pub fn pick<S: AsRef<str>>(&self, fields: &[S]) -> Self {
        let cells = self
            .cells
            .iter()
            .filter(|(field, _)| fields.iter().any(|f| f.as_ref() == field.as_str()))
            .map(|(field, cell)| (field.clone(), *cell))
            .collect();
        Self { cells }
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Bucket {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let cells = iter
            .into_iter()
            .map(|(field, value)| (field.into(), MeasureCell::new(value)))
            .collect();
        Self { cells }
    }
}
