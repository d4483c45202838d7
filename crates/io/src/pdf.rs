//! Text-table PDF reader.
//!
//! Extracts text-show runs from uncompressed page content streams, then
//! parses them as a delimited table (header line first). This covers the
//! machine-generated statement PDFs this tool ingests; scanned or
//! stream-compressed PDFs are out of scope.

use std::path::Path;

use regex::Regex;
use unirec_engine::record::RawRecord;

use crate::SourceError;

pub fn read_pdf_table(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    // Plain-text exports of the same table layout are accepted as-is.
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if matches!(ext.as_str(), "txt" | "tsv" | "csv") {
        let text = std::fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
        return Ok(parse_delimited_lines(
            &text.lines().map(str::to_string).collect::<Vec<_>>(),
        ));
    }

    let bytes = std::fs::read(path).map_err(|e| SourceError::io(path, e))?;
    let content: String = bytes.iter().map(|&b| b as char).collect();
    let lines = extract_text_runs(&content);
    Ok(parse_delimited_lines(&lines))
}

/// Pull the argument of every `(…) Tj` text-show operator, unescaped.
fn extract_text_runs(content: &str) -> Vec<String> {
    let re = Regex::new(r"(?s)\(((?:[^()\\]|\\.)*)\)\s*Tj").unwrap();
    re.captures_iter(content)
        .map(|cap| unescape_pdf_string(&cap[1]))
        .collect()
}

fn unescape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(match next {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    other => other,
                });
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// The delimiter occurring most often on the first line; pipe when nothing
/// scores.
fn infer_delimiter(line: &str) -> char {
    let candidates = ['|', '\t', ';', ','];
    let best = candidates
        .into_iter()
        .max_by_key(|d| line.matches(*d).count())
        .unwrap_or('|');
    if line.matches(best).count() > 0 {
        best
    } else {
        '|'
    }
}

/// Parse delimited text lines into records. The header line is the first
/// line with at least two delimiters (tolerating title lines above the
/// table); delimiter-free lines continue the previous row's first column,
/// as OCR exports often wrap long values.
fn parse_delimited_lines(lines: &[String]) -> Vec<RawRecord> {
    let trimmed: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    let Some(first) = trimmed.first() else {
        return Vec::new();
    };

    let delim = infer_delimiter(first);
    let header_idx = trimmed
        .iter()
        .position(|l| l.matches(delim).count() >= 2)
        .unwrap_or(0);
    let headers: Vec<String> = trimmed[header_idx]
        .split(delim)
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut out: Vec<RawRecord> = Vec::new();
    for line in &trimmed[header_idx + 1..] {
        if line.matches(delim).count() == 0 {
            if let Some(last) = out.last_mut() {
                let first_key = &headers[0];
                let existing = last.fields.get(first_key).cloned().unwrap_or_default();
                let joined = format!("{existing} {line}").trim().to_string();
                last.fields.insert(first_key.clone(), joined);
            }
            continue;
        }

        let mut cols: Vec<String> = line.split(delim).map(|c| c.trim().to_string()).collect();
        if cols.len() < headers.len() {
            cols.resize(headers.len(), String::new());
        }
        if cols.len() > headers.len() {
            // Fold the overflow into the final column.
            let tail = cols.split_off(headers.len() - 1).join(" ");
            cols.push(tail);
        }

        let mut raw = RawRecord::new();
        for (i, header) in headers.iter().enumerate() {
            raw.fields.insert(header.clone(), cols[i].clone());
        }
        out.push(raw);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
