use ordered_float::OrderedFloat;

use super::chart::ProcessedChart;
use super::definition::{ChartType, ChartYFieldDefinition};

/// Ranking heuristics used to trim and order auto-detected charts.
///
/// Scores are only compared with each other; their absolute value carries no
/// meaning. Implementations must be pure.
pub trait ChartScorer {
    fn chart_score(&self, chart: &ProcessedChart) -> f64;
    fn measure_score(&self, chart: &ProcessedChart, ydef: &ChartYFieldDefinition) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultChartScorer;

impl DefaultChartScorer {
    const TOP_MEASURES: usize = 5;
}

impl ChartScorer for DefaultChartScorer {
    fn chart_score(&self, chart: &ProcessedChart) -> f64 {
        let data = chart.data();
        if data.rows_added == 0 {
            return 0.0;
        }

        let mut score = (data.rows_added as f64 + 1.0).log10() * 10.0;

        score += match data.bucket_keys.len() {
            0 | 1 => 0.0,
            2..=200 => 100.0,
            _ => 30.0,
        };

        if chart.definition.grouping_field.is_some() {
            score += match data.groups.len() {
                2..=6 => 50.0,
                7..=20 => 10.0,
                _ => 0.0,
            };
        } else {
            score += 20.0;
        }

        if chart.definition.chart_type == ChartType::Timeline {
            score += 30.0;
        }

        let attempted = data.rows_added + data.invalid_x_rows;
        score -= 100.0 * data.invalid_x_rows as f64 / attempted as f64;

        let mut measure_scores: Vec<f64> = chart
            .definition
            .ydefs
            .iter()
            .map(|ydef| self.measure_score(chart, ydef))
            .collect();
        measure_scores.sort_by_key(|score| std::cmp::Reverse(OrderedFloat(*score)));
        score += measure_scores
            .iter()
            .take(Self::TOP_MEASURES)
            .sum::<f64>()
            * 0.5;

        score
    }

    fn measure_score(&self, chart: &ProcessedChart, ydef: &ChartYFieldDefinition) -> f64 {
        let data = chart.data();
        if data.rows_added == 0 {
            return 0.0;
        }

        let rows = data.rows_added as f64;
        let coverage = data.valid_y_rows(&ydef.field) as f64 / rows;
        let invalid = data.invalid_y_rows(&ydef.field) as f64 / rows;
        let mut score = (coverage * 100.0 - invalid * 200.0).max(0.0);

        let mut values = data
            .buckets
            .values()
            .filter_map(|bucket| bucket.value(&ydef.field));
        if let Some(first) = values.next() {
            if values.any(|value| value != first) {
                score += 20.0;
            }
        }

        score
    }
}
