use super::date::{ChartDate, parse_chart_date};
use super::definition::{ChartDefinition, TransformFunction};
use super::types::{Row, RowValue};

/// Resolves the X bucket key of a row for `definition`.
///
/// Date transforms key on the truncated `date` (the pre-parsed X value) and
/// also return the truncated date; identity keys on the X cell text. A `None`
/// key means the row has no bucket. Identical inputs always produce the same key.
#[must_use]
pub fn compute_bucket_key(
    date: Option<&ChartDate>,
    definition: &ChartDefinition,
    row: &Row,
) -> (Option<String>, Option<ChartDate>) {
    let Some(field) = definition.x_field() else {
        return (None, None);
    };

    match definition.x_transform().date_unit() {
        Some(unit) => match date {
            Some(date) => {
                let truncated = date.truncate(unit);
                (Some(truncated.bucket_key(unit)), Some(truncated))
            }
            None => (None, None),
        },
        None => {
            let key = row
                .get(field)
                .and_then(RowValue::to_key_string)
                .filter(|key| !key.is_empty());
            (key, None)
        }
    }
}

/// Applies a transform to a single cell, used for group values.
#[must_use]
pub fn run_transform_function(value: &RowValue, transform: TransformFunction) -> Option<String> {
    match transform.date_unit() {
        Some(unit) => parse_chart_date(value).map(|date| date.bucket_key(unit)),
        None => value.to_key_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::{ChartType, ChartXFieldDefinition};

    #[test]
    fn identity_key_uses_cell_text() {
        let definition = ChartDefinition::new(
            ChartType::Bar,
            ChartXFieldDefinition::new("country", TransformFunction::Identity),
        );
        let row = Row::new().with("country", "Spain");
        assert_eq!(
            compute_bucket_key(None, &definition, &row),
            (Some("Spain".to_owned()), None)
        );

        let empty = Row::new().with("country", "");
        assert_eq!(compute_bucket_key(None, &definition, &empty), (None, None));
    }

    #[test]
    fn date_key_truncates_to_unit() {
        let definition = ChartDefinition::new(
            ChartType::Timeline,
            ChartXFieldDefinition::new("created", TransformFunction::DateMonth),
        );
        let date = parse_chart_date(&RowValue::from("2024-05-17T08:00:00"));
        let (key, parsed) = compute_bucket_key(date.as_ref(), &definition, &Row::new());
        assert_eq!(key.as_deref(), Some("2024-05"));
        assert_eq!(parsed, ChartDate::from_ymd(2024, 5, 1));
    }

    #[test]
    fn group_transform_formats_dates_and_passes_text() {
        assert_eq!(
            run_transform_function(&RowValue::from("2024-05-17"), TransformFunction::DateYear),
            Some("2024".to_owned())
        );
        assert_eq!(
            run_transform_function(&RowValue::from("abc"), TransformFunction::DateYear),
            None
        );
        assert_eq!(
            run_transform_function(&RowValue::from(3.0), TransformFunction::Identity),
            Some("3".to_owned())
        );
    }
}
