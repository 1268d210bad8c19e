use chart_autodetect::api::{ChartProcessor, ChartProcessorConfig, apply_limits_on_charts};
use chart_autodetect::core::{
    AggregateFunction, ChartDefinition, ChartScorer, ChartType, ChartXFieldDefinition,
    ChartYFieldDefinition, DefaultChartScorer, ProcessedChart, Row, TransformFunction,
};

/// Scores charts by X field name length and measures by field name length.
struct NameLengthScorer;

impl ChartScorer for NameLengthScorer {
    fn chart_score(&self, chart: &ProcessedChart) -> f64 {
        chart.definition.x_field().map_or(0.0, |field| field.len() as f64)
    }

    fn measure_score(&self, _chart: &ProcessedChart, ydef: &ChartYFieldDefinition) -> f64 {
        ydef.field.len() as f64
    }
}

fn bar(field: &str) -> ChartDefinition {
    ChartDefinition::new(
        ChartType::Bar,
        ChartXFieldDefinition::new(field, TransformFunction::Identity),
    )
    .with_ydef(ChartYFieldDefinition::count())
}

#[test]
fn best_scored_auto_charts_survive_and_given_stay_first() {
    let config = ChartProcessorConfig::default().with_autodetect_limits(2, 10);
    let mut charts = vec![
        ProcessedChart::auto(bar("a")),
        ProcessedChart::given(bar("given_x")),
        ProcessedChart::auto(bar("abcd")),
        ProcessedChart::auto(bar("ab")),
        ProcessedChart::auto(bar("abc")),
    ];

    apply_limits_on_charts(&mut charts, &config, &NameLengthScorer);

    let fields: Vec<&str> = charts
        .iter()
        .map(|chart| chart.definition.x_field().unwrap_or_default())
        .collect();
    assert_eq!(fields, vec!["given_x", "abcd", "abc"]);
    assert!(charts[0].is_given_definition);
}

#[test]
fn charts_within_limit_keep_their_order() {
    let config = ChartProcessorConfig::default().with_autodetect_limits(5, 10);
    let mut charts = vec![
        ProcessedChart::auto(bar("a")),
        ProcessedChart::given(bar("g")),
        ProcessedChart::auto(bar("abc")),
    ];
    let before = charts.clone();

    apply_limits_on_charts(&mut charts, &config, &NameLengthScorer);
    assert_eq!(charts, before);
}

#[test]
fn auto_measures_are_trimmed_by_score_but_given_measures_are_not() {
    let config = ChartProcessorConfig::default().with_autodetect_limits(5, 2);
    let mut definition = bar("x");
    for field in ["m", "mmmm", "mm", "mmm"] {
        definition = definition.with_ydef(ChartYFieldDefinition::new(field, AggregateFunction::Sum));
    }
    let mut charts = vec![
        ProcessedChart::given(definition.clone()),
        ProcessedChart::auto(definition),
    ];

    apply_limits_on_charts(&mut charts, &config, &NameLengthScorer);

    assert_eq!(charts[0].definition.ydefs.len(), 5);
    let kept: Vec<&str> = charts[1]
        .definition
        .ydefs
        .iter()
        .map(|ydef| ydef.field.as_str())
        .collect();
    assert_eq!(kept, vec!["__count", "mmmm"]);
}

#[test]
fn processor_applies_limits_at_row_threshold() {
    let config = ChartProcessorConfig::default()
        .with_apply_limit_after_rows(2)
        .with_autodetect_limits(1, 10);
    let mut processor =
        ChartProcessor::with_scorer(Vec::new(), config, NameLengthScorer).expect("processor init");

    let row = Row::new().with("a", "x").with("abcdef", "y").with("v", 1.0);
    processor.add_row(&row);
    assert!(processor.charts_processing().len() > 1);

    processor.add_row(&row);
    let charts = processor.charts_processing();
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].definition.x_field(), Some("abcdef"));
}

#[test]
fn default_scorer_prefers_varied_multi_bucket_charts() {
    let mut processor = ChartProcessor::auto_detect();
    for (i, region) in ["EU", "US", "APAC", "EU"].into_iter().enumerate() {
        processor.add_row(
            &Row::new()
                .with("region", region)
                .with("constant", "same")
                .with("amount", 5.0 * (i as f64 + 1.0)),
        );
    }

    let scorer = DefaultChartScorer;
    let charts = processor.charts_processing();
    let score_of = |x: &str| {
        charts
            .iter()
            .find(|chart| {
                chart.definition.x_field() == Some(x) && chart.definition.grouping_field.is_none()
            })
            .map(|chart| scorer.chart_score(chart))
            .expect("chart")
    };
    assert!(score_of("region") > score_of("constant"));
    assert_eq!(scorer.chart_score(&ProcessedChart::auto(bar("empty"))), 0.0);
}
