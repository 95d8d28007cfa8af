use crate::core::columns::active_columns;
use crate::domain::model::Row;
use crate::utils::error::Result;
use std::fmt;

/// Printed in place of a blank cell.
pub const EMPTY_MARKER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCell {
    Value(String),
    Empty,
}

impl DisplayCell {
    pub fn as_str(&self) -> &str {
        match self {
            DisplayCell::Value(text) => text,
            DisplayCell::Empty => EMPTY_MARKER,
        }
    }
}

/// Rectangular projection of mismatch rows onto their active columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffTable {
    pub fields: Vec<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<DisplayCell>>,
}

impl DiffTable {
    /// Returns `None` when there are no rows, so callers skip the table entirely.
    pub fn render(rows: &[Row]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let fields = active_columns(rows);
        Some(Self::project(fields, rows))
    }

    pub fn project(fields: Vec<String>, rows: &[Row]) -> Self {
        let headers = fields.iter().map(|field| header_label(field)).collect();
        let rows = rows
            .iter()
            .map(|row| {
                fields
                    .iter()
                    .map(|field| {
                        let value = row.get(field);
                        if value.is_blank() {
                            DisplayCell::Empty
                        } else {
                            DisplayCell::Value(value.display_text())
                        }
                    })
                    .collect::<Vec<DisplayCell>>()
            })
            .collect();

        Self {
            fields,
            headers,
            rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header line plus one record per row; blank cells become empty fields.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(|cell| match cell {
                DisplayCell::Value(text) => text.as_str(),
                DisplayCell::Empty => "",
            }))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }
}

impl fmt::Display for DiffTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.as_str().chars().count());
            }
        }

        let rules: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        let headers: Vec<&str> = self.headers.iter().map(String::as_str).collect();

        write_aligned(f, &headers, &widths)?;
        write_aligned(f, &rules.iter().map(String::as_str).collect::<Vec<_>>(), &widths)?;
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(DisplayCell::as_str).collect();
            write_aligned(f, &cells, &widths)?;
        }
        Ok(())
    }
}

fn write_aligned(f: &mut fmt::Formatter<'_>, cells: &[&str], widths: &[usize]) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(f, "{}", line.trim_end())
}

/// `settlement_date` -> `Settlement Date`, `TXN_REF` -> `Txn Ref`.
pub fn header_label(field: &str) -> String {
    let spaced = field.replace('_', " ").to_lowercase();
    let mut label = String::with_capacity(spaced.len());
    let mut previous_is_word = false;

    for ch in spaced.chars() {
        let is_word = ch.is_ascii_alphanumeric() || ch == '_';
        if is_word && !previous_is_word {
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
        previous_is_word = is_word;
    }

    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CellValue;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    #[test]
    fn test_header_label() {
        assert_eq!(header_label("amount"), "Amount");
        assert_eq!(header_label("settlement_date"), "Settlement Date");
        assert_eq!(header_label("TXN_REF_NO"), "Txn Ref No");
        assert_eq!(header_label("Recon_Status"), "Recon Status");
        assert_eq!(header_label("card-number"), "Card-Number");
        assert_eq!(header_label("__id"), "  Id");
    }

    #[test]
    fn renders_only_active_columns() {
        let rows = vec![
            Row::new().with("amount", text("100")).with("note", text("")),
            Row::new().with("amount", text("")).with("note", text("nan")),
        ];

        let table = DiffTable::render(&rows).unwrap();
        assert_eq!(table.headers, vec!["Amount"]);
        assert_eq!(table.column_count(), 1);
        assert_eq!(
            table.rows,
            vec![
                vec![DisplayCell::Value("100".to_string())],
                vec![DisplayCell::Empty],
            ]
        );
    }

    #[test]
    fn no_rows_no_table() {
        assert!(DiffTable::render(&[]).is_none());
    }

    #[test]
    fn keeps_row_order_and_stringifies_numbers() {
        let rows = vec![
            Row::new()
                .with("ref", text("B"))
                .with("amount", CellValue::Number(250.into())),
            Row::new().with("ref", text("A")).with("amount", CellValue::Absent),
            Row::new().with("ref", text("C")),
        ];

        let table = DiffTable::render(&rows).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[0][0], DisplayCell::Value("B".to_string()));
        assert_eq!(table.rows[1][0], DisplayCell::Value("A".to_string()));
        assert_eq!(table.rows[2][0], DisplayCell::Value("C".to_string()));
        assert_eq!(table.rows[0][1], DisplayCell::Value("250".to_string()));
        assert_eq!(table.rows[1][1], DisplayCell::Empty);
        assert_eq!(table.rows[2][1], DisplayCell::Empty);
    }

    #[test]
    fn csv_export_leaves_blank_cells_empty() {
        let rows = vec![
            Row::new().with("txn_id", text("T1")).with("amount", text("10")),
            Row::new().with("txn_id", text("T2")).with("amount", text("NaN")),
        ];

        let table = DiffTable::render(&rows).unwrap();
        let csv = String::from_utf8(table.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(csv, "Txn Id,Amount\nT1,10\nT2,\n");
    }

    #[test]
    fn text_rendering_aligns_columns() {
        let rows = vec![
            Row::new().with("ref", text("LONGREF")).with("amount", text("5")),
            Row::new().with("ref", text("R")).with("amount", CellValue::Absent),
        ];

        let rendered = DiffTable::render(&rows).unwrap().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Ref      Amount");
        assert_eq!(lines[2], "LONGREF  5");
        assert_eq!(lines[3], "R        -");
    }
}
