//! Table loaders for CSV files and spreadsheet workbooks

use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::RawTable;
use crate::error::{RescissionError, Result};

/// Load a table from disk, dispatching on the file extension
pub fn load_table(path: &Path) -> Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" | "txt" | "tsv" => read_csv_table(File::open(path)?)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook_table(path)?,
        _ => return Err(RescissionError::UnsupportedFormat(path.to_path_buf())),
    };

    info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Read CSV from any reader. The first record is the header row.
pub fn read_csv_table<R: Read>(mut reader: R) -> Result<RawTable> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let content = decode_text(bytes);
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let delimiter = sniff_delimiter(content);
    debug!("CSV delimiter: {:?}", delimiter as char);

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = csv_reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|h| h.to_string()).collect(),
        None => return Err(RescissionError::EmptyTable),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Read the first sheet of a workbook. The first row is the header row.
pub fn read_workbook_table(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(RescissionError::EmptyTable)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    debug!("Reading sheet '{}' from {}", sheet_name, path.display());

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let headers = rows.next().ok_or(RescissionError::EmptyTable)?;
    let rows = rows
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// Render a spreadsheet cell the way it would appear in a CSV export
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integral values without a trailing ".0"
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => datetime.date().format("%Y-%m-%d").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// UTF-8 when valid, otherwise Windows-1252 (common for Excel-exported CSVs)
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Pick the delimiter giving the most consistent field count over the first lines
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    let mut best = b',';
    let mut best_score = 0usize;

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

        let target = match counts.first() {
            Some(&n) if n > 1 => n,
            _ => continue,
        };
        let consistent = counts.iter().filter(|&&c| c == target).count();
        let score = consistent * target;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_comma_csv() {
        let data = "cliente,classe,termo\nC1,A,T1\nC2,B,T2\n";
        let table = read_csv_table(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["cliente", "classe", "termo"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][2], "T2");
    }

    #[test]
    fn test_read_semicolon_csv_with_bom() {
        let data = "\u{feff}cliente;valor mensalidade\nC1;1000,50\nC2;20\n";
        let table = read_csv_table(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["cliente", "valor mensalidade"]);
        assert_eq!(table.rows[0][1], "1000,50");
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Serviço" with ç encoded as 0xE7
        let mut data = b"Servi".to_vec();
        data.push(0xE7);
        data.extend_from_slice(b"o,cliente\nX,C1\n");
        let table = read_csv_table(data.as_slice()).unwrap();
        assert_eq!(table.headers[0], "Serviço");
    }

    #[test]
    fn test_blank_lines_skipped_and_short_rows_padded() {
        let data = "a,b,c\n1,2\n,,\n4,5,6\n";
        let table = read_csv_table(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_empty_input() {
        let err = read_csv_table("".as_bytes()).unwrap_err();
        assert!(matches!(err, RescissionError::EmptyTable));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_table(Path::new("base.pdf")).unwrap_err();
        assert!(matches!(err, RescissionError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(1000.0)), "1000");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_read_workbook_dates_and_numbers() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let path = std::env::temp_dir().join(format!("rescission_loader_{}.xlsx", std::process::id()));
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_string(0, 0, "Cliente").unwrap();
        sheet.write_string(0, 1, "Fim_Vigência").unwrap();
        sheet.write_string(0, 2, "Valor Mensalidade").unwrap();
        sheet.write_string(1, 0, "C1").unwrap();
        let end = ExcelDateTime::from_ymd(2025, 3, 1).unwrap();
        sheet.write_datetime_with_format(1, 1, &end, &date_format).unwrap();
        sheet.write_number(1, 2, 1000.0).unwrap();
        sheet.write_number(2, 2, 12.5).unwrap();
        workbook.save(&path).unwrap();

        let table = load_table(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.headers, vec!["Cliente", "Fim_Vigência", "Valor Mensalidade"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["C1", "2025-03-01", "1000"]);
        assert_eq!(table.rows[1], vec!["", "", "12.5"]);
    }
}
