use std::cmp::Reverse;
use std::collections::HashSet;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::core::{Bucket, BucketKey, OTHER_BUCKET_KEY, ProcessedChart};

use super::processor_config::ChartProcessorConfig;

/// Collapses the long tail of a pie/polar-area chart into an `Other` bucket.
///
/// Buckets whose share of the total cardinality is below the ratio limit are
/// merged first; if more than the count limit remain, the smallest ones are
/// merged as well. Other chart types are left untouched.
pub fn group_pie_other_buckets(chart: &mut ProcessedChart, config: &ChartProcessorConfig) {
    if !chart.definition.chart_type.is_proportional() {
        return;
    }

    let ratio_limit = chart
        .definition
        .pie_ratio_limit
        .unwrap_or(config.pie_ratio_limit);
    let mut count_limit = chart
        .definition
        .pie_count_limit
        .unwrap_or(config.pie_count_limit);
    if count_limit < 1 || count_limit > config.max_pie_count_limit {
        count_limit = config.max_pie_count_limit;
    }

    let Some(data) = chart.active_data_mut() else {
        return;
    };
    let total: f64 = data.buckets.values().map(Bucket::cardinality).sum();
    if total == 0.0 {
        return;
    }

    let mut other = Bucket::new();
    let mut kept: IndexMap<BucketKey, Bucket> = IndexMap::with_capacity(data.buckets.len());
    for (key, bucket) in std::mem::take(&mut data.buckets) {
        if bucket.cardinality() / total < ratio_limit {
            other.add_fieldwise(&bucket);
        } else {
            kept.insert(key, bucket);
        }
    }

    if kept.len() > count_limit {
        let mut ranked: Vec<(BucketKey, Bucket)> = kept.into_iter().collect();
        ranked.sort_by_key(|(_, bucket)| Reverse(OrderedFloat(bucket.cardinality())));
        for (_, bucket) in ranked.split_off(count_limit) {
            other.add_fieldwise(&bucket);
        }
        kept = ranked.into_iter().collect();
    }

    if !other.is_empty() {
        kept.entry(BucketKey::ungrouped(OTHER_BUCKET_KEY))
            .or_default()
            .add_fieldwise(&other);
        data.bucket_keys.insert(OTHER_BUCKET_KEY.to_owned());
    }

    let remaining: HashSet<&str> = kept.keys().map(|key| key.x.as_str()).collect();
    data.bucket_keys.retain(|x| remaining.contains(x.as_str()));
    data.buckets = kept;
}
