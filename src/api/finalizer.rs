use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{
    AvailableColumn, ChartScorer, ChartType, ProcessedChart, SortOrder, chart_y_range,
    compact_timeline, fill_timeline_buckets, have_similar_range,
};

use super::limit_enforcer::apply_limits_on_charts;
use super::output::ChartProcessorOutput;
use super::pie_grouping::group_pie_other_buckets;
use super::processor::ChartProcessor;
use super::processor_config::ChartProcessorConfig;

type MeasureCluster = SmallVec<[String; 4]>;

impl<S: ChartScorer> ChartProcessor<S> {
    /// Produces the render-ready chart set from the current state.
    ///
    /// Works on a copy, so the processor keeps accepting rows and repeated
    /// calls without new rows return identical output. Given charts come
    /// first in input order, followed by the surviving auto-detected charts
    /// ordered by descending score.
    #[must_use]
    pub fn finalize(&self) -> ChartProcessorOutput {
        let mut charts = split_charts_by_ydefs(&self.charts_processing, self.config.similar_range_ratio);
        apply_limits_on_charts(&mut charts, &self.config, &self.scorer);

        let available_columns: Vec<AvailableColumn> =
            self.available_columns.values().cloned().collect();

        let mut given = Vec::new();
        let mut auto = Vec::new();
        for chart in charts {
            let Some(mut chart) = finalize_chart(chart, &self.config) else {
                continue;
            };
            chart.available_columns = available_columns.clone();
            if chart.is_given_definition {
                given.push(chart);
            } else if !chart.is_errored() && !chart.definition.ydefs.is_empty() {
                auto.push(chart);
            }
        }
        auto.sort_by_cached_key(|chart| Reverse(OrderedFloat(self.scorer.chart_score(chart))));

        debug!(
            rows_added = self.rows_added,
            given_count = given.len(),
            auto_count = auto.len(),
            "finalized charts"
        );

        given.extend(auto);
        ChartProcessorOutput {
            charts: given,
            available_columns,
        }
    }
}

/// Splits every auto-detected chart into charts whose measures have similar
/// value ranges.
///
/// Clusters are built greedily: the first unassigned measure seeds a cluster
/// and every other unassigned measure whose maximum is similar to the seed's
/// joins it. Given charts pass through unchanged.
#[must_use]
pub fn split_charts_by_ydefs(charts: &[ProcessedChart], similar_range_ratio: f64) -> Vec<ProcessedChart> {
    let mut split = Vec::with_capacity(charts.len());

    for chart in charts {
        if chart.is_given_definition {
            split.push(chart.clone());
            continue;
        }

        let mut unassigned: Vec<(String, f64)> = chart
            .definition
            .ydefs
            .iter()
            .map(|ydef| {
                let max = chart_y_range(chart.data(), &ydef.field).map_or(0.0, |range| range.max);
                (ydef.field.clone(), max)
            })
            .collect();

        while !unassigned.is_empty() {
            let (seed, seed_max) = unassigned.remove(0);
            let mut cluster: MeasureCluster = SmallVec::new();
            cluster.push(seed);
            unassigned.retain(|(field, max)| {
                if have_similar_range(seed_max, *max, similar_range_ratio) {
                    cluster.push(field.clone());
                    false
                } else {
                    true
                }
            });
            split.push(chart.restricted_to_measures(cluster.as_slice()));
        }
    }

    split
}

fn finalize_chart(mut chart: ProcessedChart, config: &ChartProcessorConfig) -> Option<ProcessedChart> {
    if chart.is_errored() {
        return Some(chart);
    }
    if chart.rows_added() == 0 && !chart.is_given_definition {
        return None;
    }

    let sort_order = chart.definition.sort_order();
    match sort_order {
        SortOrder::Natural => {}
        SortOrder::AscKeys | SortOrder::DescKeys => {
            if chart.definition.chart_type == ChartType::Timeline
                && chart.definition.x_transform().is_date()
            {
                compact_timeline(&mut chart, config.timeline_bucket_limit);
                let unit = chart.definition.x_transform().date_unit();
                let filled = match (unit, chart.active_data_mut()) {
                    (Some(unit), Some(data)) => {
                        fill_timeline_buckets(data, unit, config.chart_fill_limit)
                    }
                    _ => Ok(()),
                };
                if let Err(fault) = filled {
                    warn!(error = %fault, "freezing timeline chart while filling gaps");
                    chart.freeze(fault);
                    return Some(chart);
                }
            }

            if let Some(data) = chart.active_data_mut() {
                data.bucket_keys.sort();
                if sort_order == SortOrder::DescKeys {
                    data.bucket_keys.reverse();
                }
            }
        }
        SortOrder::AscValues | SortOrder::DescValues => {
            let data = chart.data();
            let mut keys: Vec<String> = data.bucket_keys.iter().cloned().collect();
            let totals = data.x_key_cardinalities();
            keys.sort_by_cached_key(|key| {
                OrderedFloat(totals.get(key.as_str()).copied().unwrap_or(0.0))
            });
            if sort_order == SortOrder::DescValues {
                keys.reverse();
            }
            if let Some(data) = chart.active_data_mut() {
                data.bucket_keys = keys.into_iter().collect();
            }
        }
    }

    if !chart.is_given_definition {
        let data = chart.data();
        let rows = data.rows_added as f64;
        let surviving: Vec<String> = chart
            .definition
            .ydefs
            .iter()
            .filter(|ydef| {
                data.invalid_y_rows(&ydef.field) == 0
                    && data.valid_y_rows(&ydef.field) as f64 / rows >= config.valid_value_ratio_limit
            })
            .map(|ydef| ydef.field.clone())
            .collect();
        chart = chart.restricted_to_measures(&surviving);
    }

    if let Some(limit) = chart.definition.trim_x_count_limit {
        if let Some(data) = chart.active_data_mut() {
            data.bucket_keys.truncate(limit);
        }
    }

    group_pie_other_buckets(&mut chart, config);
    Some(chart)
}
