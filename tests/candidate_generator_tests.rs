use chart_autodetect::api::{ChartProcessor, ChartProcessorConfig};
use chart_autodetect::core::{
    AggregateFunction, COUNT_FIELD, ChartDefinition, ChartType, ChartXFieldDefinition,
    ChartYFieldDefinition, Row, TransformFunction,
};

fn sales_row(day: &str, region: &str, amount: f64) -> Row {
    Row::new()
        .with("order_id", 1)
        .with("day", day)
        .with("region", region)
        .with("amount", amount)
}

#[test]
fn auto_detect_proposes_timeline_and_bar_candidates() {
    let mut processor = ChartProcessor::auto_detect();
    assert!(processor.is_auto_detecting());
    processor.add_row(&sales_row("2024-01-01", "EU", 10.0));

    let charts = processor.charts_processing();
    let summary: Vec<(ChartType, &str, Option<&str>)> = charts
        .iter()
        .map(|chart| {
            (
                chart.definition.chart_type,
                chart.definition.x_field().unwrap_or_default(),
                chart.definition.grouping_field.as_deref(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (ChartType::Timeline, "day", None),
            (ChartType::Timeline, "day", Some("region")),
            (ChartType::Bar, "region", None),
        ]
    );

    for chart in charts {
        assert!(!chart.is_given_definition);
        assert_eq!(chart.definition.ydefs[0], ChartYFieldDefinition::count());
        assert!(chart.definition.has_ydef("amount"));
        assert!(!chart.definition.has_ydef("order_id"));
        assert_eq!(
            chart.definition.aggregate_function_of("amount"),
            Some(AggregateFunction::Sum)
        );
    }
    assert_eq!(
        charts[0].definition.x_transform(),
        TransformFunction::DateDay
    );
}

#[test]
fn repeated_columns_reuse_existing_candidates() {
    let mut processor = ChartProcessor::auto_detect();
    processor.add_row(&sales_row("2024-01-01", "EU", 10.0));
    processor.add_row(&sales_row("2024-01-02", "US", 3.0));
    processor.add_row(&Row::new().with("region", "EU").with("discount", 1.5));

    let charts = processor.charts_processing();
    assert_eq!(charts.len(), 3);
    let bar = charts
        .iter()
        .find(|chart| chart.definition.chart_type == ChartType::Bar)
        .expect("bar chart");
    let fields: Vec<&str> = bar.definition.ydefs.iter().map(|y| y.field.as_str()).collect();
    assert_eq!(fields, vec![COUNT_FIELD, "amount", "discount"]);
    assert_eq!(bar.rows_added(), 3);
}

#[test]
fn given_definitions_disable_auto_detection() {
    let definition = ChartDefinition::new(
        ChartType::Bar,
        ChartXFieldDefinition::new("region", TransformFunction::Identity),
    )
    .with_ydef(ChartYFieldDefinition::new("amount", AggregateFunction::Sum));
    let mut processor =
        ChartProcessor::new(vec![definition.clone()], ChartProcessorConfig::default())
            .expect("processor init");
    assert!(!processor.is_auto_detecting());

    for i in 0..20 {
        processor.add_row(&sales_row("2024-01-01", "EU", f64::from(i)));
    }

    assert_eq!(processor.charts_processing().len(), 1);
    assert_eq!(processor.charts_processing()[0].definition, definition);
    assert!(processor.charts_processing()[0].is_given_definition);
}

#[test]
fn candidate_growth_stops_at_chart_limit_after_threshold() {
    let config = ChartProcessorConfig::default()
        .with_apply_limit_after_rows(3)
        .with_autodetect_limits(2, 10);
    let mut processor = ChartProcessor::new(Vec::new(), config).expect("processor init");

    for i in 0..3 {
        processor.add_row(
            &Row::new()
                .with("day", format!("2024-01-0{}", i + 1))
                .with("region", "EU")
                .with("product", "a")
                .with("amount", 1.0),
        );
    }
    assert!(processor.charts_processing().len() <= 2);

    for i in 0..10 {
        processor.add_row(
            &Row::new()
                .with(format!("label_{i}"), "x")
                .with("amount", 2.0),
        );
        let auto = processor
            .charts_processing()
            .iter()
            .filter(|chart| !chart.is_given_definition)
            .count();
        assert!(auto <= 2);
    }
}

#[test]
fn measure_growth_stops_at_measure_limit_after_threshold() {
    let config = ChartProcessorConfig::default()
        .with_apply_limit_after_rows(1)
        .with_autodetect_limits(32, 3);
    let mut processor = ChartProcessor::new(Vec::new(), config).expect("processor init");

    processor.add_row(&Row::new().with("region", "EU").with("m1", 1.0));
    for field in ["m2", "m3", "m4", "m5"] {
        processor.add_row(&Row::new().with("region", "EU").with(field, 1.0));
    }

    let chart = &processor.charts_processing()[0];
    assert_eq!(chart.definition.ydefs.len(), 3);
}
