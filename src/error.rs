use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Chart-fatal condition that freezes a single processed chart.
///
/// Faults never abort ingestion; they are stored on the chart and surfaced to
/// the consumer as data.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartFault {
    #[error("Chart has too many buckets, limit is {limit}.")]
    TooManyBuckets { limit: usize },

    #[error("Chart has too many groups, limit is {limit}.")]
    TooManyGroups { limit: usize },
}
