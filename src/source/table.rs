use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;

/// Read every record of the listing CSV, header included.
///
/// Rows may have differing field counts; short rows are dealt with by the
/// writers. Bytes that are not valid UTF-8 are replaced rather than failing
/// the whole file.
pub fn read_records(path: &Path) -> Result<Vec<StringRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    read_records_from(file).with_context(|| format!("Failed to read CSV: {}", path.display()))
}

pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<StringRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, record) in reader.byte_records().enumerate() {
        let record = record?;
        let record = match StringRecord::from_byte_record(record) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = i, "Invalid UTF-8 in row, replacing bytes");
                StringRecord::from_byte_record_lossy(e.into_byte_record())
            }
        };
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ragged_records() {
        let data = "Name,Time,Genres,Address\n\
                    The Porch Dogs,2:00pm–3:00pm,\"Rock, Blues\",12 Elm St\n\
                    Solo\n";
        let records = read_records_from(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(&records[0][3], "Address");
        assert_eq!(&records[1][2], "Rock, Blues");
        assert_eq!(records[2].len(), 1);
    }

    #[test]
    fn test_invalid_utf8_row_is_kept() {
        let mut data = b"Name,Time,Genres,Address\nA,1:00pm\xe2\x80\x932:00pm,Rock,1 Elm St\n".to_vec();
        data.extend_from_slice(b"B\xff\xfeand,2:00pm,Folk,2 Elm St\n");
        data.extend_from_slice(b"C,3:00pm,Jazz,3 Elm St\n");

        let records = read_records_from(data.as_slice()).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(&records[1][0], "A");
        assert_eq!(&records[1][1], "1:00pm–2:00pm");
        assert!(records[2][0].starts_with('B'));
        assert!(records[2][0].contains('\u{FFFD}'));
        assert_eq!(&records[2][3], "2 Elm St");
        assert_eq!(&records[3][0], "C");
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_records(&dir.path().join("input.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open input file"));
    }
}
