mod bucket_aggregator;
mod candidate_generator;
mod finalizer;
mod limit_enforcer;
mod output;
mod pie_grouping;
mod processor;
mod processor_config;
mod row_classifier;

pub use bucket_aggregator::apply_raw_data;
pub use finalizer::split_charts_by_ydefs;
pub use limit_enforcer::apply_limits_on_charts;
pub use output::{CHART_OUTPUT_JSON_SCHEMA_V1, ChartOutputJsonContractV1, ChartProcessorOutput};
pub use pie_grouping::group_pie_other_buckets;
pub use processor::ChartProcessor;
pub use processor_config::ChartProcessorConfig;
pub use row_classifier::{ClassifiedRow, classify_row, is_identifier_field};
