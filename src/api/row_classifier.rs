use indexmap::IndexMap;

use crate::core::{AvailableColumn, ChartDate, ColumnDataType, Row, RowValue, parse_chart_date};

/// Per-row view of the cells split by inferred kind.
///
/// Maps keep the row's column order so that auto-detection is deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifiedRow {
    pub date_columns: IndexMap<String, ChartDate>,
    pub numeric_columns: IndexMap<String, f64>,
    /// Numeric columns eligible as auto-detected measures (identifiers excluded).
    pub numeric_columns_for_autodetect: IndexMap<String, f64>,
    pub string_columns: IndexMap<String, String>,
}

/// Heuristic for identifier-like columns, which are never summed by auto-detection.
#[must_use]
pub fn is_identifier_field(field: &str) -> bool {
    let lower = field.to_lowercase();
    lower.ends_with("_id") || lower == "id" || field.ends_with("Id")
}

/// Classifies every cell of `row` and widens the running column inference.
///
/// Order of attempts: date, then finite number, then short string. Nulls and
/// strings of `max_string_length` characters or more stay unclassified but
/// still register the column.
pub fn classify_row(
    row: &Row,
    columns: &mut IndexMap<String, AvailableColumn>,
    max_string_length: usize,
) -> ClassifiedRow {
    let mut classified = ClassifiedRow::default();

    for (field, value) in row.iter() {
        let column = columns
            .entry(field.to_owned())
            .or_insert_with(|| AvailableColumn::new(field));

        if let Some(date) = parse_chart_date(value) {
            classified.date_columns.insert(field.to_owned(), date);
            column.data_type = column.data_type.merge(ColumnDataType::Date);
            continue;
        }

        if let Some(number) = value.to_finite_number() {
            classified.numeric_columns.insert(field.to_owned(), number);
            if !is_identifier_field(field) {
                classified
                    .numeric_columns_for_autodetect
                    .insert(field.to_owned(), number);
            }
            column.data_type = column.data_type.merge(ColumnDataType::Number);
            continue;
        }

        if let RowValue::String(text) = value {
            if text.chars().count() < max_string_length {
                classified
                    .string_columns
                    .insert(field.to_owned(), text.clone());
                column.data_type = column.data_type.merge(ColumnDataType::String);
            }
        }
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_heuristic_matches_common_shapes() {
        assert!(is_identifier_field("id"));
        assert!(is_identifier_field("ID"));
        assert!(is_identifier_field("customer_id"));
        assert!(is_identifier_field("Customer_ID"));
        assert!(is_identifier_field("customerId"));
        assert!(!is_identifier_field("paid"));
        assert!(!is_identifier_field("identity"));
        assert!(!is_identifier_field("amount"));
    }

    #[test]
    fn long_strings_are_not_classified() {
        let mut columns = IndexMap::new();
        let row = Row::new().with("note", "x".repeat(120)).with("tag", "short");
        let classified = classify_row(&row, &mut columns, 100);

        assert!(classified.string_columns.contains_key("tag"));
        assert!(!classified.string_columns.contains_key("note"));
        assert_eq!(columns["note"].data_type, ColumnDataType::None);
    }
}
