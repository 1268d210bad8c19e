use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::ChartFault;

use super::bucket::{Bucket, BucketKey};
use super::chart::{ChartData, ProcessedChart};
use super::date::{ChartDate, DateUnit};
use super::definition::{ChartType, TransformFunction};

/// Coarsens a timeline chart's date transform until the `min_x..=max_x`
/// span fits within `bucket_limit` periods (minute → hour → day → month → year),
/// re-aggregating existing buckets into the coarser keys.
///
/// Returns `true` when the transform changed. Re-applying to an already
/// compact chart is a no-op.
pub fn compact_timeline(chart: &mut ProcessedChart, bucket_limit: usize) -> bool {
    if chart.definition.chart_type != ChartType::Timeline {
        return false;
    }
    let (definition, data) = chart.parts_mut();
    let Some(data) = data else {
        return false;
    };
    let Some(unit) = definition.x_transform().date_unit() else {
        return false;
    };
    let Some((min, max)) = x_extent(data, unit) else {
        return false;
    };

    let mut target = unit;
    while span_len(min, max, target) > bucket_limit {
        match target.coarser() {
            Some(coarser) => target = coarser,
            None => break,
        }
    }
    if target == unit {
        return false;
    }

    let function_of = |field: &str| definition.aggregate_function_of(field);
    let rekey = |x: &str| -> Option<ChartDate> {
        ChartDate::from_bucket_key(x, unit).map(|date| date.truncate(target))
    };

    let mut buckets: IndexMap<BucketKey, Bucket> = IndexMap::with_capacity(data.buckets.len());
    for (key, bucket) in std::mem::take(&mut data.buckets) {
        let key = match rekey(&key.x) {
            Some(date) => key.with_x(date.bucket_key(target)),
            None => key,
        };
        match buckets.get_mut(&key) {
            Some(existing) => existing.merge_aggregated(&bucket, function_of),
            None => {
                buckets.insert(key, bucket);
            }
        }
    }

    let mut bucket_keys = IndexSet::with_capacity(data.bucket_keys.len());
    let mut date_parsed = IndexMap::with_capacity(data.bucket_keys.len());
    for x in &data.bucket_keys {
        match rekey(x) {
            Some(date) => {
                let key = date.bucket_key(target);
                date_parsed.insert(key.clone(), date);
                bucket_keys.insert(key);
            }
            None => {
                bucket_keys.insert(x.clone());
            }
        }
    }

    let previous_count = data.buckets.len();
    data.buckets = buckets;
    data.bucket_keys = bucket_keys;
    data.bucket_key_date_parsed = date_parsed;
    data.min_x = Some(min.bucket_key(target));
    data.max_x = Some(max.bucket_key(target));
    if let Some(xdef) = definition.xdef.as_mut() {
        xdef.transform_function = TransformFunction::from_date_unit(target);
    }

    debug!(
        from = ?unit,
        to = ?target,
        previous_count,
        bucket_count = data.buckets.len(),
        "compacted timeline chart"
    );
    true
}

/// Inserts empty buckets for every missing period between `min_x` and
/// `max_x`, so the key set forms a contiguous series.
///
/// Grouped charts get one empty bucket per known group. Fails with
/// [`ChartFault::TooManyBuckets`] when the series would exceed `fill_limit` keys.
pub fn fill_timeline_buckets(
    data: &mut ChartData,
    unit: DateUnit,
    fill_limit: usize,
) -> Result<(), ChartFault> {
    let Some((min, max)) = x_extent(data, unit) else {
        return Ok(());
    };
    if span_len(min, max, unit) > fill_limit {
        return Err(ChartFault::TooManyBuckets { limit: fill_limit });
    }

    let grouped = data.is_grouped();
    let groups: Vec<String> = if data.groups.is_empty() {
        vec![String::new()]
    } else {
        data.groups.iter().cloned().collect()
    };

    let mut cursor = Some(min.truncate(unit));
    while let Some(date) = cursor.filter(|date| *date <= max) {
        let key = date.bucket_key(unit);
        if data.bucket_keys.insert(key.clone()) {
            if grouped {
                for group in &groups {
                    data.buckets
                        .entry(BucketKey::grouped(group.clone(), key.clone()))
                        .or_default();
                }
            } else {
                data.buckets.entry(BucketKey::ungrouped(key.clone())).or_default();
            }
            data.bucket_key_date_parsed.insert(key, date);
        }
        cursor = date.step(unit);
    }
    Ok(())
}

fn x_extent(data: &ChartData, unit: DateUnit) -> Option<(ChartDate, ChartDate)> {
    let min = ChartDate::from_bucket_key(data.min_x.as_deref()?, unit)?;
    let max = ChartDate::from_bucket_key(data.max_x.as_deref()?, unit)?;
    Some((min, max))
}

fn span_len(min: ChartDate, max: ChartDate, unit: DateUnit) -> usize {
    usize::try_from(min.units_until(max, unit).saturating_add(1)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::{
        AggregateFunction, ChartDefinition, ChartXFieldDefinition, ChartYFieldDefinition,
    };

    fn daily_chart(days: &[(&str, f64)]) -> ProcessedChart {
        let definition = ChartDefinition::new(
            ChartType::Timeline,
            ChartXFieldDefinition::new("day", TransformFunction::DateDay),
        )
        .with_ydef(ChartYFieldDefinition::new("amount", AggregateFunction::Sum));
        let mut chart = ProcessedChart::auto(definition);
        let data = chart.active_data_mut().expect("active");
        for (day, amount) in days {
            data.buckets
                .insert(BucketKey::ungrouped(*day), [("amount", *amount)].into_iter().collect());
            data.bucket_keys.insert((*day).to_owned());
            data.track_x_extent(day);
        }
        chart
    }

    #[test]
    fn compaction_merges_days_into_months() {
        let mut chart = daily_chart(&[("2024-01-05", 1.0), ("2024-01-20", 2.0), ("2024-03-01", 4.0)]);
        assert!(compact_timeline(&mut chart, 30));
        assert_eq!(chart.definition.x_transform(), TransformFunction::DateMonth);

        let data = chart.data();
        assert_eq!(data.buckets.len(), 2);
        assert_eq!(
            data.buckets.get(&BucketKey::ungrouped("2024-01")).and_then(|b| b.value("amount")),
            Some(3.0)
        );
        assert_eq!(data.min_x.as_deref(), Some("2024-01"));
        assert_eq!(data.max_x.as_deref(), Some("2024-03"));
        assert!(!compact_timeline(&mut chart, 30));
    }

    #[test]
    fn fill_inserts_missing_periods() {
        let mut chart = daily_chart(&[("2024-01-01", 1.0), ("2024-01-04", 2.0)]);
        let data = chart.active_data_mut().expect("active");
        fill_timeline_buckets(data, DateUnit::Day, 100).expect("fill");
        assert_eq!(data.bucket_keys.len(), 4);
        assert!(data.buckets.contains_key(&BucketKey::ungrouped("2024-01-02")));

        let err = fill_timeline_buckets(data, DateUnit::Day, 2).expect_err("over limit");
        assert_eq!(err, ChartFault::TooManyBuckets { limit: 2 });
    }
}
