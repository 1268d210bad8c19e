use indexmap::IndexMap;

use super::bucket::BucketKey;
use super::chart::ChartData;
use super::definition::{AggregateFunction, ChartYFieldDefinition};
use super::types::Row;

/// Folds the numeric cells of one row into the bucket at `key`.
///
/// `count` measures always count the row. Other measures aggregate the
/// row's finite numeric value and bump `valid_y_rows`; a present non-null
/// value without a numeric reading bumps `invalid_y_rows` instead.
pub fn aggregate_numeric_values(
    data: &mut ChartData,
    key: &BucketKey,
    ydefs: &[ChartYFieldDefinition],
    numeric_columns: &IndexMap<String, f64>,
    row: &Row,
) {
    let bucket = data.buckets.entry(key.clone()).or_default();

    for ydef in ydefs {
        let value = match ydef.aggregate_function {
            AggregateFunction::Count => 1.0,
            _ => match numeric_columns.get(&ydef.field) {
                Some(value) => *value,
                None => {
                    if !row.is_null(&ydef.field) {
                        *data.invalid_y_rows.entry(ydef.field.clone()).or_insert(0) += 1;
                    }
                    continue;
                }
            },
        };

        *data.valid_y_rows.entry(ydef.field.clone()).or_insert(0) += 1;
        bucket.accumulate(&ydef.field, ydef.aggregate_function, value);
    }
}
