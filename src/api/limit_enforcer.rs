use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::core::{ChartScorer, ChartYFieldDefinition, ProcessedChart};

use super::processor_config::ChartProcessorConfig;

/// Trims auto-detected charts to `autodetect_chart_limit` and their measures
/// to `autodetect_measures_limit`, keeping the best-scored ones.
///
/// Given charts are never trimmed and stay first in their original order.
pub fn apply_limits_on_charts<S: ChartScorer>(
    charts: &mut Vec<ProcessedChart>,
    config: &ChartProcessorConfig,
    scorer: &S,
) {
    let auto_count = charts.iter().filter(|chart| !chart.is_given_definition).count();
    if auto_count > config.autodetect_chart_limit {
        let (given, mut auto): (Vec<_>, Vec<_>) = std::mem::take(charts)
            .into_iter()
            .partition(|chart| chart.is_given_definition);
        auto.sort_by_cached_key(|chart| Reverse(OrderedFloat(scorer.chart_score(chart))));
        auto.truncate(config.autodetect_chart_limit);
        debug!(
            auto_count,
            kept = auto.len(),
            given_count = given.len(),
            "trimmed auto-detected charts"
        );
        charts.extend(given);
        charts.extend(auto);
    }

    for chart in charts.iter_mut().filter(|chart| !chart.is_given_definition) {
        if chart.definition.ydefs.len() <= config.autodetect_measures_limit {
            continue;
        }
        let view: &ProcessedChart = chart;
        let mut ranked: Vec<(f64, ChartYFieldDefinition)> = view
            .definition
            .ydefs
            .iter()
            .map(|ydef| (scorer.measure_score(view, ydef), ydef.clone()))
            .collect();
        ranked.sort_by_key(|(score, _)| Reverse(OrderedFloat(*score)));
        ranked.truncate(config.autodetect_measures_limit);
        chart.definition.ydefs = ranked.into_iter().map(|(_, ydef)| ydef).collect();
    }
}
