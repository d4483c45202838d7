//! Excel source reader (xlsx, xls, xlsb, ods): first worksheet, first row
//! as headers. One-way tabular import; formatting and formulas are ignored.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use unirec_engine::record::RawRecord;

use crate::SourceError;

pub fn read_excel(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| SourceError::io(path, e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SourceError::parse(path, "workbook contains no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SourceError::parse(path, e))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut raw = RawRecord::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = row.get(i).map(cell_to_string).unwrap_or_default();
            raw.fields.insert(header.clone(), value);
        }
        rows.push(raw);
    }
    Ok(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integers render without a decimal point.
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_fixture(rows: &[&[&str]]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                worksheet
                    .write_string(r as u32, c as u16, *value)
                    .unwrap();
            }
        }
        workbook.save(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn header_row_maps_fields() {
        let (_dir, path) = write_fixture(&[
            &["customer_id", "name", "email"],
            &["C1", "Jane Doe", "j@x.com"],
            &["C2", "Omar Khan", ""],
        ]);
        let rows = read_excel(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields["customer_id"], "C1");
        assert_eq!(rows[0].fields["name"], "Jane Doe");
        assert_eq!(rows[1].fields["email"], "");
    }

    #[test]
    fn numeric_cells_become_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nums.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "amount").unwrap();
        worksheet.write_number(1, 0, 1250.0).unwrap();
        worksheet.write_number(2, 0, 10.5).unwrap();
        workbook.save(&path).unwrap();

        let rows = read_excel(&path).unwrap();
        assert_eq!(rows[0].fields["amount"], "1250");
        assert_eq!(rows[1].fields["amount"], "10.5");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_excel(Path::new("/nonexistent/file.xlsx")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
