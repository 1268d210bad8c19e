pub mod aggregate;
pub mod bucket;
pub mod chart;
pub mod date;
pub mod definition;
pub mod range;
pub mod scoring;
pub mod timeline;
pub mod transform;
pub mod types;

pub use aggregate::aggregate_numeric_values;
pub use bucket::{Bucket, BucketKey, GROUP_KEY_SEPARATOR, MeasureCell, OTHER_BUCKET_KEY};
pub use chart::{ChartData, ChartState, ProcessedChart};
pub use date::{ChartDate, DateUnit, parse_chart_date};
pub use definition::{
    AggregateFunction, COUNT_FIELD, ChartDefinition, ChartType, ChartXFieldDefinition,
    ChartYFieldDefinition, SortOrder, TransformFunction,
};
pub use range::{YRange, chart_y_range, have_similar_range};
pub use scoring::{ChartScorer, DefaultChartScorer};
pub use timeline::{compact_timeline, fill_timeline_buckets};
pub use transform::{compute_bucket_key, run_transform_function};
pub use types::{AvailableColumn, ColumnDataType, Row, RowValue};
