use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

use super::date::DateUnit;

/// Synthetic measure field counting rows per bucket.
pub const COUNT_FIELD: &str = "__count";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Timeline,
    Bar,
    Line,
    Pie,
    PolarArea,
}

impl ChartType {
    /// Proportion-style charts get long-tail collapsing.
    #[must_use]
    pub fn is_proportional(self) -> bool {
        matches!(self, Self::Pie | Self::PolarArea)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransformFunction {
    #[default]
    #[serde(rename = "identity")]
    Identity,
    #[serde(rename = "date:year")]
    DateYear,
    #[serde(rename = "date:month")]
    DateMonth,
    #[serde(rename = "date:day")]
    DateDay,
    #[serde(rename = "date:hour")]
    DateHour,
    #[serde(rename = "date:minute")]
    DateMinute,
}

impl TransformFunction {
    #[must_use]
    pub fn date_unit(self) -> Option<DateUnit> {
        match self {
            Self::Identity => None,
            Self::DateYear => Some(DateUnit::Year),
            Self::DateMonth => Some(DateUnit::Month),
            Self::DateDay => Some(DateUnit::Day),
            Self::DateHour => Some(DateUnit::Hour),
            Self::DateMinute => Some(DateUnit::Minute),
        }
    }

    #[must_use]
    pub fn from_date_unit(unit: DateUnit) -> Self {
        match unit {
            DateUnit::Year => Self::DateYear,
            DateUnit::Month => Self::DateMonth,
            DateUnit::Day => Self::DateDay,
            DateUnit::Hour => Self::DateHour,
            DateUnit::Minute => Self::DateMinute,
        }
    }

    #[must_use]
    pub fn is_date(self) -> bool {
        self.date_unit().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Natural,
    #[default]
    AscKeys,
    DescKeys,
    AscValues,
    DescValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregateFunction {
    Sum,
    First,
    Last,
    Min,
    Max,
    Count,
    Avg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartXFieldDefinition {
    pub field: String,
    #[serde(default)]
    pub transform_function: TransformFunction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl ChartXFieldDefinition {
    #[must_use]
    pub fn new(field: impl Into<String>, transform_function: TransformFunction) -> Self {
        Self {
            field: field.into(),
            transform_function,
            sort_order: None,
        }
    }

    #[must_use]
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = Some(sort_order);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartYFieldDefinition {
    pub field: String,
    pub aggregate_function: AggregateFunction,
}

impl ChartYFieldDefinition {
    #[must_use]
    pub fn new(field: impl Into<String>, aggregate_function: AggregateFunction) -> Self {
        Self {
            field: field.into(),
            aggregate_function,
        }
    }

    #[must_use]
    pub fn count() -> Self {
        Self::new(COUNT_FIELD, AggregateFunction::Count)
    }
}

/// Declarative chart description, either supplied by the host or synthesized
/// by auto-detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDefinition {
    pub chart_type: ChartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xdef: Option<ChartXFieldDefinition>,
    #[serde(default)]
    pub ydefs: Vec<ChartYFieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_transform_function: Option<TransformFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pie_ratio_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pie_count_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_x_count_limit: Option<usize>,
}

impl ChartDefinition {
    #[must_use]
    pub fn new(chart_type: ChartType, xdef: ChartXFieldDefinition) -> Self {
        Self {
            chart_type,
            xdef: Some(xdef),
            ydefs: Vec::new(),
            grouping_field: None,
            group_transform_function: None,
            pie_ratio_limit: None,
            pie_count_limit: None,
            trim_x_count_limit: None,
        }
    }

    #[must_use]
    pub fn with_ydef(mut self, ydef: ChartYFieldDefinition) -> Self {
        self.ydefs.push(ydef);
        self
    }

    #[must_use]
    pub fn with_grouping(
        mut self,
        field: impl Into<String>,
        transform_function: Option<TransformFunction>,
    ) -> Self {
        self.grouping_field = Some(field.into());
        self.group_transform_function = transform_function;
        self
    }

    #[must_use]
    pub fn with_pie_limits(mut self, ratio_limit: Option<f64>, count_limit: Option<usize>) -> Self {
        self.pie_ratio_limit = ratio_limit;
        self.pie_count_limit = count_limit;
        self
    }

    #[must_use]
    pub fn with_trim_x_count_limit(mut self, limit: usize) -> Self {
        self.trim_x_count_limit = Some(limit);
        self
    }

    /// X field name, `None` when the definition has no usable X axis.
    #[must_use]
    pub fn x_field(&self) -> Option<&str> {
        self.xdef
            .as_ref()
            .map(|xdef| xdef.field.as_str())
            .filter(|field| !field.is_empty())
    }

    #[must_use]
    pub fn x_transform(&self) -> TransformFunction {
        self.xdef
            .as_ref()
            .map(|xdef| xdef.transform_function)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.xdef
            .as_ref()
            .and_then(|xdef| xdef.sort_order)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_ydef(&self, field: &str) -> bool {
        self.ydefs.iter().any(|ydef| ydef.field == field)
    }

    #[must_use]
    pub fn aggregate_function_of(&self, field: &str) -> Option<AggregateFunction> {
        self.ydefs
            .iter()
            .find(|ydef| ydef.field == field)
            .map(|ydef| ydef.aggregate_function)
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart definition: {e}")))
    }

    /// Parses a JSON array of definitions.
    pub fn list_from_json_str(input: &str) -> ChartResult<Vec<Self>> {
        serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse chart definitions: {e}"))
        })
    }
}
