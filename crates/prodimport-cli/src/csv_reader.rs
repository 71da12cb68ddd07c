//! Reads the product CSV into memory.
//!
//! The header row names the columns; every field is trimmed. The whole file
//! is loaded and parsed up front, so a malformed record aborts the run before
//! any product is created.

use std::io::Read;
use std::path::Path;

use prodimport_core::ProductRow;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CsvReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed product CSV {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// A product row with the physical line its record starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceRow {
    /// 1-based line in the file; the header is line 1. A quoted field may span
    /// several lines, so this is not always the record number plus one.
    pub line: u64,
    pub product: ProductRow,
}

/// Loads every product row from the UTF-8 CSV file at `path`, in file order.
///
/// # Errors
///
/// Returns [`CsvReadError::Io`] if the file cannot be read and
/// [`CsvReadError::Parse`] if any record is malformed or lacks a required
/// column.
pub(crate) fn read_products(path: &Path) -> Result<Vec<SourceRow>, CsvReadError> {
    let content = std::fs::read_to_string(path).map_err(|e| CsvReadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_products(content.as_bytes()).map_err(|e| CsvReadError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parses product rows from any reader holding CSV with a header row.
pub(crate) fn parse_products<R: Read>(reader: R) -> Result<Vec<SourceRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, csv::Position::line);
        let product: ProductRow = record.deserialize(Some(&headers))?;
        rows.push(SourceRow { line, product });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "name,description,category,image,images,mainImage,price,brand,short-description,short-specs,condition,testing,delivery,Lens,Focal Length,Shutter Speed,ISO Range,storage,battery,Weight,Dimensions";

    #[test]
    fn parses_all_columns_and_trims_fields() {
        let csv = format!(
            "{HEADER}\n  Canon AE-1 Program , Classic SLR ,Film > 35mm, https://cdn/a.jpg ,\"https://cdn/b.jpg,https://cdn/c.jpg\",,199.99,Canon,Tested,FD mount,Excellent,Film tested,2-3 days,FD 50mm,50mm,1/1000,25-3200,,4LR44,590g,141x87x48mm\n"
        );
        let rows = parse_products(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 2);
        let row = &rows[0].product;
        assert_eq!(row.name, "Canon AE-1 Program");
        assert_eq!(row.description, "Classic SLR");
        assert_eq!(row.category, "Film > 35mm");
        assert_eq!(row.image, "https://cdn/a.jpg");
        assert_eq!(row.images, "https://cdn/b.jpg,https://cdn/c.jpg");
        assert_eq!(row.main_image, "");
        assert_eq!(row.price, "199.99");
        assert_eq!(row.short_description, "Tested");
        assert_eq!(row.focal_length, "50mm");
        assert_eq!(row.shutter_speed, "1/1000");
        assert_eq!(row.iso_range, "25-3200");
        assert_eq!(row.battery, "4LR44");
        assert_eq!(row.weight, "590g");
        assert_eq!(row.dimensions, "141x87x48mm");
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "name,category,price\nLeica M6,Film > Rangefinder,2500\nOlympus XA,Film > Compact,180\n";
        let rows = parse_products(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product.name, "Leica M6");
        assert_eq!(rows[1].product.name, "Olympus XA");
        assert_eq!(rows[1].product.brand, "");
        assert!(rows[1].product.image_urls().is_empty());
    }

    #[test]
    fn line_numbers_account_for_multiline_fields() {
        let csv = "name,description,category,price\n\
                   Canon AE-1,\"line one\nline two\nline three\",Film > 35mm,10\n\
                   Nikon FM2,x,Film > 35mm,20\n";
        let rows = parse_products(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].product.description, "line one\nline two\nline three");
        assert_eq!(rows[1].line, 5);
        assert_eq!(rows[1].product.name, "Nikon FM2");
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "name,price\nLeica M6,2500\n";
        assert!(parse_products(csv.as_bytes()).is_err());
    }

    #[test]
    fn ragged_record_is_an_error() {
        let csv = "name,category,price\nLeica M6,Film\n";
        assert!(parse_products(csv.as_bytes()).is_err());
    }

    #[test]
    fn header_only_file_yields_no_rows() {
        let csv = "name,category,price\n";
        assert!(parse_products(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn read_products_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_products(&dir.path().join("products.csv"));
        assert!(
            matches!(result, Err(CsvReadError::Io { .. })),
            "expected Io error, got: {result:?}"
        );
    }

    #[test]
    fn read_products_loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,category,price").unwrap();
        writeln!(file, "Nikon FM2,Film > SLR,320.50").unwrap();

        let rows = read_products(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product.price, "320.50");
    }

    #[test]
    fn read_products_wraps_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,price").unwrap();
        writeln!(file, "Nikon FM2,320.50").unwrap();

        let err = read_products(file.path()).unwrap_err();
        assert!(matches!(err, CsvReadError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
