use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::core::{
    AvailableColumn, ChartDefinition, ChartScorer, ChartType, DefaultChartScorer, ProcessedChart,
    Row, compact_timeline,
};
use crate::error::{ChartFault, ChartResult};

use super::bucket_aggregator::apply_raw_data;
use super::limit_enforcer::apply_limits_on_charts;
use super::processor_config::ChartProcessorConfig;
use super::row_classifier::classify_row;

/// Streaming chart detection and aggregation facade.
///
/// Rows are pushed one at a time with [`ChartProcessor::add_row`]; the
/// processor classifies columns, synthesizes chart definitions when none were
/// given, and aggregates every row into all active charts. `finalize` turns
/// the current state into render-ready charts without consuming it.
///
/// The processor is a single-owner reducer: ingestion takes `&mut self` and
/// there is no internal synchronization.
pub struct ChartProcessor<S: ChartScorer = DefaultChartScorer> {
    pub(super) config: ChartProcessorConfig,
    pub(super) scorer: S,
    pub(super) charts_processing: Vec<ProcessedChart>,
    pub(super) available_columns: IndexMap<String, AvailableColumn>,
    pub(super) auto_detect_charts: bool,
    pub(super) rows_added: u64,
}

impl ChartProcessor<DefaultChartScorer> {
    /// Creates a processor for `given_definitions`; an empty list enables auto-detection.
    pub fn new(
        given_definitions: Vec<ChartDefinition>,
        config: ChartProcessorConfig,
    ) -> ChartResult<Self> {
        Self::with_scorer(given_definitions, config, DefaultChartScorer)
    }

    /// Auto-detecting processor with default limits.
    #[must_use]
    pub fn auto_detect() -> Self {
        Self::build(Vec::new(), ChartProcessorConfig::default(), DefaultChartScorer)
    }
}

impl<S: ChartScorer> ChartProcessor<S> {
    pub fn with_scorer(
        given_definitions: Vec<ChartDefinition>,
        config: ChartProcessorConfig,
        scorer: S,
    ) -> ChartResult<Self> {
        let config = config.validate()?;
        Ok(Self::build(given_definitions, config, scorer))
    }

    fn build(given_definitions: Vec<ChartDefinition>, config: ChartProcessorConfig, scorer: S) -> Self {
        let auto_detect_charts = given_definitions.is_empty();
        let charts_processing: Vec<ProcessedChart> = given_definitions
            .into_iter()
            .map(ProcessedChart::given)
            .collect();
        debug!(
            given_count = charts_processing.len(),
            auto_detect_charts, "create chart processor"
        );

        Self {
            config,
            scorer,
            charts_processing,
            available_columns: IndexMap::new(),
            auto_detect_charts,
            rows_added: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ChartProcessorConfig {
        &self.config
    }

    #[must_use]
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    #[must_use]
    pub fn rows_added(&self) -> u64 {
        self.rows_added
    }

    #[must_use]
    pub fn is_auto_detecting(&self) -> bool {
        self.auto_detect_charts
    }

    /// Charts currently being aggregated, given definitions first.
    #[must_use]
    pub fn charts_processing(&self) -> &[ProcessedChart] {
        &self.charts_processing
    }

    /// Column inference so far, in first-sighting order.
    pub fn available_columns(&self) -> impl Iterator<Item = &AvailableColumn> {
        self.available_columns.values()
    }

    #[must_use]
    pub fn available_column(&self, field: &str) -> Option<&AvailableColumn> {
        self.available_columns.get(field)
    }

    /// Ingests one row. Never fails: row anomalies become counters and
    /// capped-out charts are frozen.
    pub fn add_row(&mut self, row: &Row) {
        let classified = classify_row(row, &mut self.available_columns, self.config.max_string_length);

        if self.auto_detect_charts {
            self.run_auto_detect_charts(&classified);
        }

        let fill_limit = self.config.chart_fill_limit;
        for chart in &mut self.charts_processing {
            if chart.is_errored() {
                continue;
            }

            let fault = apply_raw_data(chart, row, &classified, &self.config);
            let fault = fault.or_else(|| {
                (chart.data().buckets.len() > fill_limit)
                    .then_some(ChartFault::TooManyBuckets { limit: fill_limit })
            });
            if let Some(fault) = fault {
                warn!(
                    x_field = chart.definition.x_field().unwrap_or_default(),
                    error = %fault,
                    "freezing chart"
                );
                chart.freeze(fault);
            }
        }

        for chart in &mut self.charts_processing {
            if chart.is_errored() || chart.definition.chart_type != ChartType::Timeline {
                continue;
            }
            compact_timeline(chart, self.config.timeline_bucket_limit);
        }

        self.rows_added += 1;
        trace!(
            rows_added = self.rows_added,
            charts = self.charts_processing.len(),
            "add row"
        );
        if self.rows_added == self.config.apply_limit_after_rows {
            apply_limits_on_charts(&mut self.charts_processing, &self.config, &self.scorer);
        }
    }

    pub fn add_rows<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'a Row>,
    {
        for row in rows {
            self.add_row(row);
        }
    }
}
