use crate::domain::model::Row;

/// Fields worth a column: those with at least one non-blank value.
///
/// Order follows the keys of the first row. Fields that only appear in later
/// rows are not shown, because the first row defines the table's shape.
/// An empty input yields no columns.
pub fn active_columns(rows: &[Row]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    first
        .field_names()
        .filter(|field| rows.iter().any(|row| !row.get(field).is_blank()))
        .map(str::to_string)
        .collect()
}
