use chart_autodetect::api::{ChartProcessor, ChartProcessorConfig, group_pie_other_buckets};
use chart_autodetect::core::{
    BucketKey, COUNT_FIELD, ChartDefinition, ChartType, ChartXFieldDefinition,
    ChartYFieldDefinition, OTHER_BUCKET_KEY, ProcessedChart, Row, TransformFunction,
};

fn pie_definition() -> ChartDefinition {
    ChartDefinition::new(
        ChartType::Pie,
        ChartXFieldDefinition::new("label", TransformFunction::Identity),
    )
    .with_ydef(ChartYFieldDefinition::count())
}

fn pie_with_counts(definition: ChartDefinition, counts: &[(&str, f64)]) -> ProcessedChart {
    let mut chart = ProcessedChart::given(definition);
    let data = chart.active_data_mut().expect("active chart");
    for (label, count) in counts {
        data.buckets.insert(
            BucketKey::ungrouped(*label),
            [(COUNT_FIELD, *count)].into_iter().collect(),
        );
        data.bucket_keys.insert((*label).to_owned());
    }
    chart
}

fn counts_of(chart: &ProcessedChart) -> Vec<(String, f64)> {
    let data = chart.data();
    data.bucket_keys_ordered()
        .map(|x| {
            let value = data
                .buckets
                .get(&BucketKey::ungrouped(x))
                .and_then(|bucket| bucket.value(COUNT_FIELD))
                .unwrap_or_default();
            (x.to_owned(), value)
        })
        .collect()
}

#[test]
fn small_slices_collapse_into_other_after_ingestion() {
    let config = ChartProcessorConfig::default();
    let definition = pie_definition().with_pie_limits(Some(0.1), None);
    let mut processor = ChartProcessor::new(vec![definition], config).expect("processor init");
    for (label, repeats) in [("a", 50), ("b", 30), ("c", 12), ("d", 4), ("e", 4)] {
        for _ in 0..repeats {
            processor.add_row(&Row::new().with("label", label));
        }
    }

    let output = processor.finalize();
    assert_eq!(
        counts_of(&output.charts[0]),
        vec![
            ("a".to_owned(), 50.0),
            ("b".to_owned(), 30.0),
            ("c".to_owned(), 12.0),
            (OTHER_BUCKET_KEY.to_owned(), 8.0),
        ]
    );
}

#[test]
fn count_limit_folds_smallest_remaining_slices() {
    let config = ChartProcessorConfig::default().with_pie_limits(0.0, 2, 50);
    let mut chart = pie_with_counts(
        pie_definition(),
        &[("a", 10.0), ("b", 40.0), ("c", 30.0), ("d", 20.0)],
    );

    group_pie_other_buckets(&mut chart, &config);

    assert_eq!(
        counts_of(&chart),
        vec![
            ("b".to_owned(), 40.0),
            ("c".to_owned(), 30.0),
            (OTHER_BUCKET_KEY.to_owned(), 30.0),
        ]
    );
}

#[test]
fn definition_limits_override_config_and_are_clamped() {
    let config = ChartProcessorConfig::default().with_pie_limits(0.0, 10, 3);
    let mut chart = pie_with_counts(
        pie_definition().with_pie_limits(None, Some(100)),
        &[("a", 5.0), ("b", 4.0), ("c", 3.0), ("d", 2.0), ("e", 1.0)],
    );

    group_pie_other_buckets(&mut chart, &config);

    let keys: Vec<String> = counts_of(&chart).into_iter().map(|(x, _)| x).collect();
    assert_eq!(keys, vec!["a", "b", "c", OTHER_BUCKET_KEY]);
}

#[test]
fn existing_other_bucket_absorbs_the_tail() {
    let config = ChartProcessorConfig::default().with_pie_limits(0.1, 10, 50);
    let mut chart = pie_with_counts(
        pie_definition(),
        &[("a", 60.0), (OTHER_BUCKET_KEY, 35.0), ("b", 3.0), ("c", 2.0)],
    );

    group_pie_other_buckets(&mut chart, &config);

    assert_eq!(
        counts_of(&chart),
        vec![("a".to_owned(), 60.0), (OTHER_BUCKET_KEY.to_owned(), 40.0)]
    );
}

#[test]
fn non_proportional_and_empty_charts_are_untouched() {
    let config = ChartProcessorConfig::default().with_pie_limits(0.5, 1, 50);
    let bar = ChartDefinition::new(
        ChartType::Bar,
        ChartXFieldDefinition::new("label", TransformFunction::Identity),
    )
    .with_ydef(ChartYFieldDefinition::count());
    let mut chart = pie_with_counts(bar, &[("a", 1.0), ("b", 9.0)]);
    let before = chart.clone();
    group_pie_other_buckets(&mut chart, &config);
    assert_eq!(chart, before);

    let mut empty = pie_with_counts(pie_definition(), &[]);
    let before = empty.clone();
    group_pie_other_buckets(&mut empty, &config);
    assert_eq!(empty, before);
}
