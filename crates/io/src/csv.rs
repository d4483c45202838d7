//! CSV source reader: header row → field names, delimiter sniffing, and a
//! Windows-1252 fallback for files exported by legacy spreadsheet tools.

use std::io::Read;
use std::path::Path;

use unirec_engine::record::RawRecord;

use crate::SourceError;

pub fn read_csv(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    parse_records(path, &content, delimiter)
}

/// Read a file and convert to UTF-8 if needed, stripping any BOM.
fn read_file_as_utf8(path: &Path) -> Result<String, SourceError> {
    let mut file = std::fs::File::open(path).map_err(|e| SourceError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| SourceError::io(path, e))?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            // Fall back to Windows-1252 (common for Excel-exported CSVs).
            let raw = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&raw);
            decoded.into_owned()
        }
    };
    Ok(content.strip_prefix('\u{feff}').unwrap_or(&content).to_string())
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines. The candidate producing the most consistent field count
/// (>1 field) wins; more columns breaks ties.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn parse_records(path: &Path, content: &str, delimiter: u8) -> Result<Vec<RawRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SourceError::parse(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SourceError::parse(path, e))?;
        let mut raw = RawRecord::new();
        for (i, header) in headers.iter().enumerate() {
            raw.fields
                .insert(header.clone(), record.get(i).unwrap_or("").to_string());
        }
        rows.push(raw);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_comma_csv() {
        let (_dir, path) = write_temp("a.csv", b"id,name,email\n1,Jane,j@x.com\n2,Omar,\n");
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields["name"], "Jane");
        assert_eq!(rows[1].fields["email"], "");
    }

    #[test]
    fn sniffs_semicolon_and_pipe() {
        let (_dir, path) = write_temp("a.csv", b"id;name\n1;Jane\n2;Omar\n");
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows[1].fields["name"], "Omar");

        let (_dir, path) = write_temp("b.csv", b"id|name\n1|Jane\n");
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows[0].fields["name"], "Jane");
    }

    #[test]
    fn sniffs_tab_delimited() {
        let (_dir, path) = write_temp("a.tsv", b"id\tname\n1\tJane\n");
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows[0].fields["name"], "Jane");
    }

    #[test]
    fn windows_1252_fallback() {
        // "Jos\xe9" is Windows-1252 for José; invalid as UTF-8.
        let (_dir, path) = write_temp("a.csv", b"id,name\n1,Jos\xe9\n");
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows[0].fields["name"], "Jos\u{e9}");
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let (_dir, path) = write_temp("a.csv", b"\xef\xbb\xbfid,name\n1,Jane\n");
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows[0].fields["id"], "1");
    }

    #[test]
    fn short_rows_pad_with_empty() {
        let (_dir, path) = write_temp("a.csv", b"id,name,email\n1,Jane\n");
        let rows = read_csv(&path).unwrap();
        assert_eq!(rows[0].fields["email"], "");
    }

    #[test]
    fn empty_file_yields_no_rows() {
        let (_dir, path) = write_temp("a.csv", b"");
        let rows = read_csv(&path).unwrap();
        assert!(rows.is_empty());
    }
}
