use serde::{Deserialize, Serialize};

use crate::core::{AvailableColumn, ProcessedChart};
use crate::error::{ChartError, ChartResult};

pub const CHART_OUTPUT_JSON_SCHEMA_V1: u32 = 1;

/// Result of [`super::ChartProcessor::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartProcessorOutput {
    pub charts: Vec<ProcessedChart>,
    pub available_columns: Vec<AvailableColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOutputJsonContractV1 {
    pub schema_version: u32,
    pub output: ChartProcessorOutput,
}

impl ChartProcessorOutput {
    #[must_use]
    pub fn given_charts(&self) -> impl Iterator<Item = &ProcessedChart> {
        self.charts.iter().filter(|chart| chart.is_given_definition)
    }

    #[must_use]
    pub fn auto_charts(&self) -> impl Iterator<Item = &ProcessedChart> {
        self.charts.iter().filter(|chart| !chart.is_given_definition)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize chart output: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartOutputJsonContractV1 {
            schema_version: CHART_OUTPUT_JSON_SCHEMA_V1,
            output: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize chart output contract v1: {e}"))
        })
    }

    /// Reads either a bare output or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(output) = serde_json::from_str::<Self>(input) {
            return Ok(output);
        }
        let payload: ChartOutputJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse chart output json payload: {e}"))
        })?;
        if payload.schema_version != CHART_OUTPUT_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported chart output schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.output)
    }
}
