use crate::core::{
    BucketKey, ProcessedChart, Row, TransformFunction, aggregate_numeric_values,
    compute_bucket_key, run_transform_function,
};
use crate::error::ChartFault;

use super::processor_config::ChartProcessorConfig;
use super::row_classifier::ClassifiedRow;

/// Applies one row to one chart.
///
/// Rows without an X value or bucket key are skipped; rows whose X value does
/// not parse as a date under a date transform count as `invalid_x_rows`.
/// Returns a fault when the row pushed the group count over the cap; the row
/// itself is still aggregated and the caller freezes the chart afterwards.
pub fn apply_raw_data(
    chart: &mut ProcessedChart,
    row: &Row,
    classified: &ClassifiedRow,
    config: &ChartProcessorConfig,
) -> Option<ChartFault> {
    let (definition, data) = chart.parts_mut();
    let data = data?;
    let x_field = definition.x_field()?;
    if row.is_null(x_field) {
        return None;
    }

    let date = classified.date_columns.get(x_field);
    if date.is_none() && definition.x_transform().is_date() {
        data.invalid_x_rows += 1;
        return None;
    }

    let (bucket_key, bucket_date) = compute_bucket_key(date, definition, row);

    let mut fault = None;
    let group = definition.grouping_field.as_deref().map(|grouping_field| {
        let transform = definition
            .group_transform_function
            .unwrap_or(TransformFunction::Identity);
        row.get(grouping_field)
            .and_then(|value| run_transform_function(value, transform))
            .unwrap_or_default()
    });
    if let Some(group) = group.as_ref().filter(|group| !group.is_empty()) {
        data.groups.insert(group.clone());
    }
    if data.groups.len() > config.chart_group_limit {
        fault = Some(ChartFault::TooManyGroups {
            limit: config.chart_group_limit,
        });
    }

    let Some(bucket_key) = bucket_key else {
        return fault;
    };

    if let Some(bucket_date) = bucket_date {
        data.bucket_key_date_parsed
            .entry(bucket_key.clone())
            .or_insert(bucket_date);
    }
    data.track_x_extent(&bucket_key);

    let storage_key = BucketKey {
        group,
        x: bucket_key.clone(),
    };
    data.buckets.entry(storage_key.clone()).or_default();
    data.bucket_keys.insert(bucket_key);

    aggregate_numeric_values(
        data,
        &storage_key,
        &definition.ydefs,
        &classified.numeric_columns,
        row,
    );
    data.rows_added += 1;

    fault
}
