//! Tabular row ingestion
//!
//! Reads the cable schedule: a header row followed by one row per cable,
//! with the five logical columns matched by name in either English or
//! Russian. CSV exports and Excel/ODS workbooks share the same row rules.
//! A row with every cell blank is kept as a blank tag so later tags stay in
//! their sheet positions; only blank rows after the last filled one are
//! dropped.

use crate::constants::MAX_QUANTITY;
use crate::types::{Result, SourceRow, TagError, TagRecord, expand_rows};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

/// Extensions read as workbooks; anything else is treated as CSV
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Logical columns and the header names accepted for each
const COLUMN_SYNONYMS: [(&str, &[&str]); 5] = [
    ("system", &["system", "sys", "система", "подсистема"]),
    ("track", &["track", "trk", "трасса"]),
    ("cable", &["cable", "cab", "кабель"]),
    ("length", &["length", "lenght", "len", "длина"]),
    ("quantity", &["quantity", "qty", "количество", "кол-во"]),
];

/// Rows read from a file plus the recoverable problems found on the way
#[derive(Debug, Default)]
pub struct LoadedRows {
    pub rows: Vec<SourceRow>,
    pub warnings: Vec<TagError>,
}

impl LoadedRows {
    /// One record per physical tag
    pub fn tags(&self) -> Vec<TagRecord> {
        expand_rows(&self.rows)
    }
}

/// Header positions of the logical columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub system: usize,
    pub track: usize,
    pub cable: usize,
    pub length: usize,
    pub quantity: usize,
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Match headers against the synonym table
pub fn resolve_columns(headers: &[String]) -> Result<ColumnMap> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let mut found = [None; 5];
    let mut missing = Vec::new();
    for (slot, (logical, synonyms)) in found.iter_mut().zip(COLUMN_SYNONYMS.iter()) {
        *slot = normalized
            .iter()
            .position(|header| synonyms.contains(&header.as_str()));
        if slot.is_none() {
            missing.push(logical.to_string());
        }
    }

    match found {
        [Some(system), Some(track), Some(cable), Some(length), Some(quantity)] => Ok(ColumnMap {
            system,
            track,
            cable,
            length,
            quantity,
        }),
        _ => Err(TagError::MissingColumns {
            missing,
            found: headers.iter().map(|h| h.trim().to_string()).collect(),
        }),
    }
}

/// Pick `;` over `,` when the header line has more of them
pub fn detect_delimiter(content: &[u8]) -> u8 {
    let header = content
        .split(|&b| b == b'\n')
        .next()
        .unwrap_or_default();
    let semicolons = header.iter().filter(|&&b| b == b';').count();
    let commas = header.iter().filter(|&&b| b == b',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Whole number of copies in `1..=MAX_QUANTITY`; `None` when the cell is not one
pub fn parse_quantity(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<usize>() {
        return (1..=MAX_QUANTITY).contains(&value).then_some(value);
    }

    let value: f64 = raw.replace(',', ".").parse().ok()?;
    if value.is_finite() && value.fract() == 0.0 && (1.0..=MAX_QUANTITY as f64).contains(&value) {
        Some(value as usize)
    } else {
        None
    }
}

/// Build source rows from a header and its data records
///
/// Shared by the CSV and workbook readers. Records may be shorter than the
/// header; missing cells read as blank.
pub fn rows_from_records<I>(headers: &[String], records: I) -> Result<LoadedRows>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let columns = resolve_columns(headers)?;

    let mut loaded = LoadedRows::default();
    let mut filled_rows = 0;
    for (i, record) in records.into_iter().enumerate() {
        // Header is line 1
        let row_number = i + 2;
        let cell = |index: usize| {
            record
                .get(index)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };

        let raw_quantity = cell(columns.quantity);
        let quantity = if raw_quantity.is_empty() {
            1
        } else {
            match parse_quantity(&raw_quantity) {
                Some(quantity) => quantity,
                None => {
                    let warning = TagError::InvalidQuantity {
                        row: row_number,
                        value: raw_quantity,
                    };
                    log::warn!("{}", warning);
                    loaded.warnings.push(warning);
                    1
                }
            }
        };

        loaded.rows.push(SourceRow {
            system: cell(columns.system),
            track: cell(columns.track),
            cable: cell(columns.cable),
            length: cell(columns.length),
            quantity,
        });
        if record.iter().any(|value| !value.trim().is_empty()) {
            filled_rows = loaded.rows.len();
        }
    }

    let trailing = loaded.rows.len() - filled_rows;
    if trailing > 0 {
        log::debug!("Dropping {} trailing blank rows", trailing);
        loaded.rows.truncate(filled_rows);
    }

    Ok(loaded)
}

/// Parse an in-memory CSV export
pub fn parse_rows(bytes: &[u8]) -> Result<LoadedRows> {
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = detect_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let records = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect::<Vec<_>>()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows_from_records(&headers, records)
}

/// Text of a workbook cell as it would appear in a CSV export
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            (*value as i64).to_string()
        }
        other => other.to_string().trim().to_string(),
    }
}

/// Parse the first worksheet of an Excel or ODS workbook
pub fn parse_workbook(path: &Path) -> Result<LoadedRows> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TagError::Workbook(calamine::Error::Msg("Workbook has no worksheets")))??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(cell_text).collect())
        .unwrap_or_default();
    let records = rows.map(|row| row.iter().map(cell_text).collect());

    rows_from_records(&headers, records)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Load rows from a CSV file
pub async fn load_rows_from_csv(path: impl AsRef<Path>) -> Result<LoadedRows> {
    let path = path.as_ref().to_owned();

    let bytes = tokio::fs::read(&path).await?;

    let loaded = tokio::task::spawn_blocking(move || parse_rows(&bytes)).await??;

    log::info!(
        "Loaded {} rows from {} ({} warnings)",
        loaded.rows.len(),
        path.display(),
        loaded.warnings.len()
    );
    Ok(loaded)
}

/// Load rows from the first worksheet of a workbook
pub async fn load_rows_from_xlsx(path: impl AsRef<Path>) -> Result<LoadedRows> {
    let path = path.as_ref().to_owned();

    let source = path.clone();
    let loaded = tokio::task::spawn_blocking(move || parse_workbook(&source)).await??;

    log::info!(
        "Loaded {} rows from workbook {} ({} warnings)",
        loaded.rows.len(),
        path.display(),
        loaded.warnings.len()
    );
    Ok(loaded)
}

/// Load rows, picking the reader from the file extension
pub async fn load_rows(path: impl AsRef<Path>) -> Result<LoadedRows> {
    let path = path.as_ref();
    if is_workbook(path) {
        load_rows_from_xlsx(path).await
    } else {
        load_rows_from_csv(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_english_headers_any_order() {
        let map =
            resolve_columns(&headers(&["Qty", "Cable", "System", " Track ", "Length"])).unwrap();
        assert_eq!(
            map,
            ColumnMap {
                system: 2,
                track: 3,
                cable: 1,
                length: 4,
                quantity: 0,
            }
        );
    }

    #[test]
    fn test_resolve_russian_headers() {
        let map = resolve_columns(&headers(&[
            "Система",
            "Трасса",
            "Кабель",
            "Длина",
            "Кол-во",
        ]))
        .unwrap();
        assert_eq!(map.quantity, 4);
    }

    #[test]
    fn test_missing_columns_reported() {
        let err = resolve_columns(&headers(&["System", "Cable", "Note"])).unwrap_err();
        match err {
            TagError::MissingColumns { missing, found } => {
                assert_eq!(missing, vec!["track", "length", "quantity"]);
                assert_eq!(found, vec!["System", "Cable", "Note"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"system;track;cable\n1,5;2;3"), b';');
        assert_eq!(detect_delimiter(b"system,track,cable\n1;2;3"), b',');
        assert_eq!(detect_delimiter(b""), b',');
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3"), Some(3));
        assert_eq!(parse_quantity(" 2 "), Some(2));
        assert_eq!(parse_quantity("3.0"), Some(3));
        assert_eq!(parse_quantity("3,0"), Some(3));
        assert_eq!(parse_quantity("0"), None);
        assert_eq!(parse_quantity("-2"), None);
        assert_eq!(parse_quantity("2.5"), None);
        assert_eq!(parse_quantity("many"), None);
    }

    #[test]
    fn test_parse_quantity_upper_bound() {
        assert_eq!(parse_quantity("10000"), Some(MAX_QUANTITY));
        assert_eq!(parse_quantity("10001"), None);
        assert_eq!(parse_quantity("1e19"), None);
        assert_eq!(parse_quantity("1e4"), Some(10_000));
        assert_eq!(parse_quantity("18446744073709551615"), None);
    }

    #[test]
    fn test_huge_quantity_becomes_one_with_warning() {
        let data = "system,track,cable,length,quantity
                    A,T,C,10,1e19
                    B,T,C,10,1e19
";
        let loaded = parse_rows(data.as_bytes()).unwrap();

        let quantities: Vec<usize> = loaded.rows.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![1, 1]);
        assert_eq!(loaded.warnings.len(), 2);
    }

    #[test]
    fn test_parse_rows_with_bom_and_semicolons() {
        let data = "\u{FEFF}Система;Трасса;Кабель;Длина;Количество\n\
                    SYS1;T1;ParLan 4x2x0,57;120,5;3\n";
        let loaded = parse_rows(data.as_bytes()).unwrap();

        assert_eq!(loaded.rows.len(), 1);
        assert!(loaded.warnings.is_empty());
        let row = &loaded.rows[0];
        assert_eq!(row.system, "SYS1");
        assert_eq!(row.cable, "ParLan 4x2x0,57");
        assert_eq!(row.length, "120,5");
        assert_eq!(row.quantity, 3);
        assert_eq!(loaded.tags().len(), 3);
    }

    #[test]
    fn test_invalid_quantity_becomes_one_with_warning() {
        let data = "system,track,cable,length,quantity\n\
                    A,T,C,10,abc\n\
                    B,T,C,10,\n\
                    C,T,C,10,0\n";
        let loaded = parse_rows(data.as_bytes()).unwrap();

        let quantities: Vec<usize> = loaded.rows.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![1, 1, 1]);
        assert_eq!(loaded.warnings.len(), 2);
        assert!(matches!(
            &loaded.warnings[0],
            TagError::InvalidQuantity { row: 2, value } if value == "abc"
        ));
        assert!(matches!(
            &loaded.warnings[1],
            TagError::InvalidQuantity { row: 4, .. }
        ));
    }

    #[test]
    fn test_short_rows_and_blank_lines() {
        let data = "system,track,cable,length,quantity\n\
                    A,T\n\
                    ,,,,\n\
                    B,T,C,5,2\n";
        let loaded = parse_rows(data.as_bytes()).unwrap();

        assert_eq!(loaded.rows.len(), 3);
        assert_eq!(loaded.rows[0].cable, "");
        assert_eq!(loaded.rows[0].quantity, 1);
        // Blank row keeps its slot as one blank tag
        assert_eq!(loaded.rows[1], SourceRow { quantity: 1, ..Default::default() });
        assert_eq!(loaded.rows[2].system, "B");
        assert_eq!(loaded.rows[2].quantity, 2);
        assert_eq!(loaded.tags().len(), 4);
    }

    #[test]
    fn test_trailing_blank_rows_dropped() {
        let data = "system,track,cable,length,quantity\n\
                    A,T,C,1,1\n\
                    ,,,,\n\
                    B,T,C,1,1\n\
                    ,,,,\n\
                    , ,\n";
        let loaded = parse_rows(data.as_bytes()).unwrap();
        let systems: Vec<&str> = loaded.rows.iter().map(|r| r.system.as_str()).collect();
        assert_eq!(systems, vec!["A", "", "B"]);
    }

    #[test]
    fn test_rows_from_records_matches_csv_rules() {
        let header = headers(&["Кабель", "Система", "Трасса", "Длина", "Кол-во"]);
        let records = vec![
            headers(&["ParLan", " SYS1 ", "T1", "120", "2"]),
            headers(&["", "", "", "", ""]),
            headers(&["X", "SYS2"]),
        ];
        let loaded = rows_from_records(&header, records).unwrap();

        assert_eq!(loaded.rows.len(), 3);
        assert_eq!(loaded.rows[0].system, "SYS1");
        assert_eq!(loaded.rows[0].quantity, 2);
        assert_eq!(loaded.rows[1].quantity, 1);
        assert_eq!(loaded.rows[2].cable, "X");
        assert_eq!(loaded.rows[2].length, "");
    }

    #[test]
    fn test_cell_text_matches_csv_export() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String(" ВРУ-1 ".to_string())), "ВРУ-1");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Float(120.0)), "120");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_workbook_extensions() {
        assert!(is_workbook(Path::new("schedule.xlsx")));
        assert!(is_workbook(Path::new("SCHEDULE.XLS")));
        assert!(is_workbook(Path::new("schedule.ods")));
        assert!(!is_workbook(Path::new("schedule.csv")));
        assert!(!is_workbook(Path::new("schedule")));
    }

    #[test]
    fn test_unreadable_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        assert!(matches!(parse_workbook(&path), Err(TagError::Workbook(_))));
    }

    #[test]
    fn test_cells_are_trimmed() {
        let data = "system,track,cable,length,quantity\n  A , T1 ,  C  , 12 , 1 \n";
        let loaded = parse_rows(data.as_bytes()).unwrap();
        assert_eq!(loaded.rows[0].system, "A");
        assert_eq!(loaded.rows[0].length, "12");
    }
}
