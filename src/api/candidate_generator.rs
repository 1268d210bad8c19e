use tracing::debug;

use crate::core::{
    AggregateFunction, ChartDefinition, ChartScorer, ChartType, ChartXFieldDefinition,
    ChartYFieldDefinition, ProcessedChart, TransformFunction,
};

use super::processor::ChartProcessor;
use super::row_classifier::ClassifiedRow;

/// Kind of X axis an auto-detected chart is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateAxis {
    /// Date columns, bucketed per day (compaction may coarsen later).
    Date,
    /// Short string columns, bucketed by value.
    Category,
}

impl CandidateAxis {
    fn chart_type(self) -> ChartType {
        match self {
            Self::Date => ChartType::Timeline,
            Self::Category => ChartType::Bar,
        }
    }

    fn initial_transform(self) -> TransformFunction {
        match self {
            Self::Date => TransformFunction::DateDay,
            Self::Category => TransformFunction::Identity,
        }
    }

    fn accepts(self, transform: TransformFunction) -> bool {
        match self {
            Self::Date => transform.is_date(),
            Self::Category => transform == TransformFunction::Identity,
        }
    }
}

impl<S: ChartScorer> ChartProcessor<S> {
    /// Synthesizes chart candidates and measures from one classified row.
    ///
    /// Every (X column, optional grouping string column) pair gets a chart and
    /// every auto-detect numeric column becomes a `sum` measure on it. While
    /// fewer than `apply_limit_after_rows` rows were processed this grows
    /// freely; afterwards only up to the chart and measure caps.
    pub(super) fn run_auto_detect_charts(&mut self, classified: &ClassifiedRow) {
        self.process_candidate_axis(CandidateAxis::Date, classified.date_columns.keys(), classified);
        self.process_candidate_axis(
            CandidateAxis::Category,
            classified.string_columns.keys(),
            classified,
        );
    }

    fn process_candidate_axis<'a>(
        &mut self,
        axis: CandidateAxis,
        x_columns: impl Iterator<Item = &'a String>,
        classified: &ClassifiedRow,
    ) {
        let growing = self.rows_added < self.config.apply_limit_after_rows;

        for x_column in x_columns {
            let groupings = std::iter::once(None)
                .chain(classified.string_columns.keys().map(|field| Some(field.as_str())));

            for grouping in groupings {
                if grouping == Some(x_column.as_str()) {
                    continue;
                }

                let Some(index) = self.find_or_create_auto_chart(axis, x_column, grouping, growing)
                else {
                    continue;
                };

                let measures_limit = self.config.autodetect_measures_limit;
                let definition = &mut self.charts_processing[index].definition;
                for field in classified.numeric_columns_for_autodetect.keys() {
                    if definition.has_ydef(field) {
                        continue;
                    }
                    if growing || definition.ydefs.len() < measures_limit {
                        definition
                            .ydefs
                            .push(ChartYFieldDefinition::new(field.clone(), AggregateFunction::Sum));
                    }
                }
            }
        }
    }

    fn find_or_create_auto_chart(
        &mut self,
        axis: CandidateAxis,
        x_column: &str,
        grouping: Option<&str>,
        growing: bool,
    ) -> Option<usize> {
        let existing = self.charts_processing.iter().position(|chart| {
            !chart.is_given_definition
                && chart.definition.x_field() == Some(x_column)
                && axis.accepts(chart.definition.x_transform())
                && chart.definition.grouping_field.as_deref() == grouping
        });
        if existing.is_some() {
            return existing;
        }

        let auto_count = self
            .charts_processing
            .iter()
            .filter(|chart| !chart.is_given_definition)
            .count();
        if !growing && auto_count >= self.config.autodetect_chart_limit {
            return None;
        }

        let mut definition = ChartDefinition::new(
            axis.chart_type(),
            ChartXFieldDefinition::new(x_column, axis.initial_transform()),
        )
        .with_ydef(ChartYFieldDefinition::count());
        definition.grouping_field = grouping.map(str::to_owned);

        debug!(
            x_field = x_column,
            grouping_field = grouping.unwrap_or_default(),
            chart_type = ?definition.chart_type,
            "create auto-detected chart"
        );
        self.charts_processing.push(ProcessedChart::auto(definition));
        Some(self.charts_processing.len() - 1)
    }
}
