use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::ChartFault;

use super::bucket::{Bucket, BucketKey};
use super::date::ChartDate;
use super::definition::ChartDefinition;
use super::types::AvailableColumn;

/// Aggregated state of one chart.
///
/// `bucket_keys` is the ordered set of distinct X keys: first-seen order while
/// rows stream in, presentation order after finalize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub rows_added: u64,
    pub buckets: IndexMap<BucketKey, Bucket>,
    pub bucket_keys: IndexSet<String>,
    pub groups: IndexSet<String>,
    pub invalid_x_rows: u64,
    pub invalid_y_rows: IndexMap<String, u64>,
    pub valid_y_rows: IndexMap<String, u64>,
    pub bucket_key_date_parsed: IndexMap<String, ChartDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_x: Option<String>,
}

impl ChartData {
    #[must_use]
    pub fn valid_y_rows(&self, field: &str) -> u64 {
        self.valid_y_rows.get(field).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn invalid_y_rows(&self, field: &str) -> u64 {
        self.invalid_y_rows.get(field).copied().unwrap_or(0)
    }

    /// `true` when any bucket is keyed with a group.
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        self.buckets.keys().any(|key| key.group.is_some())
    }

    /// Cardinality of every X key, summed over all groups in one pass.
    #[must_use]
    pub fn x_key_cardinalities(&self) -> IndexMap<&str, f64> {
        let mut totals: IndexMap<&str, f64> = IndexMap::with_capacity(self.bucket_keys.len());
        for (key, bucket) in &self.buckets {
            *totals.entry(key.x.as_str()).or_insert(0.0) += bucket.cardinality();
        }
        totals
    }

    /// Ordered X keys as string slices.
    pub fn bucket_keys_ordered(&self) -> impl Iterator<Item = &str> {
        self.bucket_keys.iter().map(String::as_str)
    }

    pub(crate) fn track_x_extent(&mut self, key: &str) {
        if self.min_x.as_deref().is_none_or(|min| key < min) {
            self.min_x = Some(key.to_owned());
        }
        if self.max_x.as_deref().is_none_or(|max| key > max) {
            self.max_x = Some(key.to_owned());
        }
    }
}

/// Lifecycle of a processed chart.
///
/// An errored chart keeps its data readable but offers no mutable access, so
/// nothing can be aggregated into it after the fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ChartState {
    Active(ChartData),
    Errored { data: ChartData, fault: ChartFault },
}

impl Default for ChartState {
    fn default() -> Self {
        Self::Active(ChartData::default())
    }
}

impl ChartState {
    #[must_use]
    pub fn data(&self) -> &ChartData {
        match self {
            Self::Active(data) | Self::Errored { data, .. } => data,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut ChartData> {
        match self {
            Self::Active(data) => Some(data),
            Self::Errored { .. } => None,
        }
    }

    #[must_use]
    pub fn fault(&self) -> Option<&ChartFault> {
        match self {
            Self::Active(_) => None,
            Self::Errored { fault, .. } => Some(fault),
        }
    }

    /// Moves an active chart into the errored state. The first fault wins.
    pub fn freeze(&mut self, fault: ChartFault) -> bool {
        match self {
            Self::Active(data) => {
                let data = std::mem::take(data);
                *self = Self::Errored { data, fault };
                true
            }
            Self::Errored { .. } => false,
        }
    }
}

/// One chart being aggregated, and the unit returned by finalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedChart {
    pub definition: ChartDefinition,
    pub is_given_definition: bool,
    state: ChartState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_columns: Vec<AvailableColumn>,
}

impl ProcessedChart {
    #[must_use]
    pub fn new(definition: ChartDefinition, is_given_definition: bool) -> Self {
        Self {
            definition,
            is_given_definition,
            state: ChartState::default(),
            available_columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn given(definition: ChartDefinition) -> Self {
        Self::new(definition, true)
    }

    #[must_use]
    pub fn auto(definition: ChartDefinition) -> Self {
        Self::new(definition, false)
    }

    #[must_use]
    pub fn state(&self) -> &ChartState {
        &self.state
    }

    #[must_use]
    pub fn data(&self) -> &ChartData {
        self.state.data()
    }

    pub fn active_data_mut(&mut self) -> Option<&mut ChartData> {
        self.state.active_mut()
    }

    /// Split borrow of the definition and the mutable data of an active chart.
    pub(crate) fn parts_mut(&mut self) -> (&mut ChartDefinition, Option<&mut ChartData>) {
        (&mut self.definition, self.state.active_mut())
    }

    #[must_use]
    pub fn fault(&self) -> Option<&ChartFault> {
        self.state.fault()
    }

    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.fault().is_some()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.fault().map(ToString::to_string)
    }

    pub fn freeze(&mut self, fault: ChartFault) -> bool {
        self.state.freeze(fault)
    }

    #[must_use]
    pub fn rows_added(&self) -> u64 {
        self.data().rows_added
    }

    /// Copy of this chart reduced to the measures in `fields`, both in the
    /// definition and in every bucket.
    #[must_use]
    pub fn restricted_to_measures<S: AsRef<str>>(&self, fields: &[S]) -> Self {
        let mut definition = self.definition.clone();
        definition.ydefs = fields
            .iter()
            .filter_map(|field| {
                self.definition
                    .ydefs
                    .iter()
                    .find(|ydef| ydef.field == field.as_ref())
                    .cloned()
            })
            .collect();

        let mut state = self.state.clone();
        let data = match &mut state {
            ChartState::Active(data) | ChartState::Errored { data, .. } => data,
        };
        for bucket in data.buckets.values_mut() {
            *bucket = bucket.pick(fields);
        }

        Self {
            definition,
            is_given_definition: self.is_given_definition,
            state,
            available_columns: self.available_columns.clone(),
        }
    }
}
