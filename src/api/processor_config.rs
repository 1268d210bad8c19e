use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Thresholds and caps of a [`super::ChartProcessor`].
///
/// Fixed for the processor's lifetime. The caps are what keeps memory bounded
/// on large or high-cardinality inputs: charts, measures, buckets and groups
/// beyond them are dropped or frozen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartProcessorConfig {
    /// Rows after which auto-detection stops growing freely and limits apply.
    #[serde(default = "default_apply_limit_after_rows")]
    pub apply_limit_after_rows: u64,
    #[serde(default = "default_autodetect_chart_limit")]
    pub autodetect_chart_limit: usize,
    #[serde(default = "default_autodetect_measures_limit")]
    pub autodetect_measures_limit: usize,
    /// Bucket count above which a chart is frozen.
    #[serde(default = "default_chart_fill_limit")]
    pub chart_fill_limit: usize,
    /// Group count above which a chart is frozen.
    #[serde(default = "default_chart_group_limit")]
    pub chart_group_limit: usize,
    /// Minimal `valid rows / rows` ratio for an auto-detected measure to survive finalize.
    #[serde(default = "default_valid_value_ratio_limit")]
    pub valid_value_ratio_limit: f64,
    #[serde(default = "default_pie_ratio_limit")]
    pub pie_ratio_limit: f64,
    #[serde(default = "default_pie_count_limit")]
    pub pie_count_limit: usize,
    #[serde(default = "default_max_pie_count_limit")]
    pub max_pie_count_limit: usize,
    /// Strings of this length or longer are not classified as string columns.
    #[serde(default = "default_max_string_length")]
    pub max_string_length: usize,
    /// Maximal number of periods a timeline spans before its unit is coarsened.
    #[serde(default = "default_timeline_bucket_limit")]
    pub timeline_bucket_limit: usize,
    /// Maximal ratio of two measure maxima that still share a chart after splitting.
    #[serde(default = "default_similar_range_ratio")]
    pub similar_range_ratio: f64,
}

impl Default for ChartProcessorConfig {
    fn default() -> Self {
        Self {
            apply_limit_after_rows: default_apply_limit_after_rows(),
            autodetect_chart_limit: default_autodetect_chart_limit(),
            autodetect_measures_limit: default_autodetect_measures_limit(),
            chart_fill_limit: default_chart_fill_limit(),
            chart_group_limit: default_chart_group_limit(),
            valid_value_ratio_limit: default_valid_value_ratio_limit(),
            pie_ratio_limit: default_pie_ratio_limit(),
            pie_count_limit: default_pie_count_limit(),
            max_pie_count_limit: default_max_pie_count_limit(),
            max_string_length: default_max_string_length(),
            timeline_bucket_limit: default_timeline_bucket_limit(),
            similar_range_ratio: default_similar_range_ratio(),
        }
    }
}

impl ChartProcessorConfig {
    #[must_use]
    pub fn with_apply_limit_after_rows(mut self, rows: u64) -> Self {
        self.apply_limit_after_rows = rows;
        self
    }

    /// Sets auto-detection caps on chart count and measures per chart.
    #[must_use]
    pub fn with_autodetect_limits(mut self, chart_limit: usize, measures_limit: usize) -> Self {
        self.autodetect_chart_limit = chart_limit;
        self.autodetect_measures_limit = measures_limit;
        self
    }

    #[must_use]
    pub fn with_chart_fill_limit(mut self, limit: usize) -> Self {
        self.chart_fill_limit = limit;
        self
    }

    #[must_use]
    pub fn with_chart_group_limit(mut self, limit: usize) -> Self {
        self.chart_group_limit = limit;
        self
    }

    #[must_use]
    pub fn with_valid_value_ratio_limit(mut self, ratio: f64) -> Self {
        self.valid_value_ratio_limit = ratio;
        self
    }

    /// Sets default long-tail collapsing limits for pie-like charts.
    #[must_use]
    pub fn with_pie_limits(mut self, ratio_limit: f64, count_limit: usize, max_count_limit: usize) -> Self {
        self.pie_ratio_limit = ratio_limit;
        self.pie_count_limit = count_limit;
        self.max_pie_count_limit = max_count_limit;
        self
    }

    #[must_use]
    pub fn with_max_string_length(mut self, length: usize) -> Self {
        self.max_string_length = length;
        self
    }

    #[must_use]
    pub fn with_timeline_bucket_limit(mut self, limit: usize) -> Self {
        self.timeline_bucket_limit = limit;
        self
    }

    #[must_use]
    pub fn with_similar_range_ratio(mut self, ratio: f64) -> Self {
        self.similar_range_ratio = ratio;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        let positive = [
            ("apply_limit_after_rows", self.apply_limit_after_rows as usize),
            ("autodetect_chart_limit", self.autodetect_chart_limit),
            ("autodetect_measures_limit", self.autodetect_measures_limit),
            ("chart_fill_limit", self.chart_fill_limit),
            ("chart_group_limit", self.chart_group_limit),
            ("max_pie_count_limit", self.max_pie_count_limit),
            ("max_string_length", self.max_string_length),
            ("timeline_bucket_limit", self.timeline_bucket_limit),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ChartError::InvalidConfig(format!("{name} must be > 0")));
        }

        for (name, ratio) in [
            ("valid_value_ratio_limit", self.valid_value_ratio_limit),
            ("pie_ratio_limit", self.pie_ratio_limit),
        ] {
            if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
                return Err(ChartError::InvalidConfig(format!(
                    "{name} must be finite and within [0, 1]"
                )));
            }
        }

        if !self.similar_range_ratio.is_finite() || self.similar_range_ratio < 1.0 {
            return Err(ChartError::InvalidConfig(
                "similar_range_ratio must be finite and >= 1".to_owned(),
            ));
        }

        Ok(self)
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON; missing fields take their defaults.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_apply_limit_after_rows() -> u64 {
    100
}

fn default_autodetect_chart_limit() -> usize {
    32
}

fn default_autodetect_measures_limit() -> usize {
    10
}

fn default_chart_fill_limit() -> usize {
    10_000
}

fn default_chart_group_limit() -> usize {
    32
}

fn default_valid_value_ratio_limit() -> f64 {
    0.5
}

fn default_pie_ratio_limit() -> f64 {
    0.05
}

fn default_pie_count_limit() -> usize {
    10
}

fn default_max_pie_count_limit() -> usize {
    50
}

fn default_max_string_length() -> usize {
    100
}

fn default_timeline_bucket_limit() -> usize {
    400
}

fn default_similar_range_ratio() -> f64 {
    10.0
}
