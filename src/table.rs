use std::fs::File;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::collector::Columns;
use crate::error::{PipelineError, SinkError};
use crate::listing::ScrapedListing;

pub const HEADER: [&str; 6] = [
    "title",
    "company",
    "date",
    "link",
    "description",
    "description_cleaned",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub listing: ScrapedListing,
    pub description_cleaned: Vec<String>,
}

/// Row-aligned output of one run, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingTable {
    rows: Vec<ListingRow>,
}

/// One CSV record as written and as read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRecord {
    pub title: String,
    pub company: String,
    pub date: String,
    pub link: String,
    pub description: String,
    pub description_cleaned: String,
}

/// Zip the five captured columns with the cleaned column.
///
/// No sorting, filtering or deduplication; every column must have the same
/// length as `title`.
pub fn assemble(columns: Columns, cleaned: Vec<Vec<String>>) -> Result<ListingTable, PipelineError> {
    let expected = columns.title.len();
    let lengths = [
        ("company", columns.company.len()),
        ("date", columns.date.len()),
        ("link", columns.link.len()),
        ("description", columns.description.len()),
        ("description_cleaned", cleaned.len()),
    ];
    if let Some((column, found)) = lengths.into_iter().find(|(_, n)| *n != expected) {
        return Err(PipelineError::ColumnMismatch {
            column,
            expected,
            found,
        });
    }

    let rows = columns
        .title
        .into_iter()
        .zip(columns.company)
        .zip(columns.date)
        .zip(columns.link)
        .zip(columns.description)
        .zip(cleaned)
        .map(
            |(((((title, company), date), link), description), description_cleaned)| ListingRow {
                listing: ScrapedListing {
                    title,
                    company,
                    date,
                    link,
                    description,
                },
                description_cleaned,
            },
        )
        .collect();

    Ok(ListingTable { rows })
}

impl ListingTable {
    pub fn rows(&self) -> &[ListingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize as CSV with a header row and no index column.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), SinkError> {
        let mut wtr = csv::Writer::from_writer(writer);
        // serde only emits the header with the first record
        if self.rows.is_empty() {
            wtr.write_record(HEADER)?;
        }
        for row in self.rows() {
            wtr.serialize(CsvRecord::from(row))?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write to `path`, replacing any existing file.
    pub fn write_csv_file(&self, path: &Path) -> Result<(), SinkError> {
        let file = File::create(path).map_err(|source| SinkError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.write_csv(file)
    }
}

impl From<&ListingRow> for CsvRecord {
    fn from(row: &ListingRow) -> Self {
        CsvRecord {
            title: row.listing.title.clone(),
            company: row.listing.company.clone(),
            date: row.listing.date.clone(),
            link: row.listing.link.clone(),
            description: row.listing.description.clone(),
            description_cleaned: token_list_repr(&row.description_cleaned),
        }
    }
}

/// Render tokens the way a Python list of strings prints: `['a', 'b']`.
pub fn token_list_repr(tokens: &[String]) -> String {
    format!("[{}]", tokens.iter().map(|t| format!("'{t}'")).join(", "))
}

/// Read a previously written table. `description_cleaned` comes back as the
/// rendered string, not as tokens.
pub fn read_csv_file(path: &Path) -> Result<Vec<CsvRecord>, SinkError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let records = rdr.deserialize().collect::<Result<Vec<CsvRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(n: usize) -> Columns {
        let mut c = Columns::default();
        for i in 0..n {
            c.title.push(format!("Data Scientist {i}"));
            c.company.push("Acme, Inc.".to_string());
            c.date.push("2023-03-01".to_string());
            c.link.push(format!("https://www.linkedin.com/jobs/view/{i}"));
            c.description.push(format!("Line one\nline \"two\" {i}"));
        }
        c
    }

    fn cleaned(n: usize) -> Vec<Vec<String>> {
        (0..n).map(|i| vec!["line".to_string(), i.to_string()]).collect()
    }

    #[test]
    fn assemble_keeps_order_and_duplicates() {
        let mut cols = columns(2);
        cols.title.push("Data Scientist 0".into());
        cols.company.push("Acme, Inc.".into());
        cols.date.push("2023-03-01".into());
        cols.link.push("https://www.linkedin.com/jobs/view/0".into());
        cols.description.push("dup".into());
        let mut cl = cleaned(2);
        cl.push(vec!["dup".into()]);

        let table = assemble(cols, cl).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0].listing.link, table.rows()[2].listing.link);
        assert_eq!(table.rows()[1].listing.title, "Data Scientist 1");
        assert_eq!(table.rows()[2].description_cleaned, vec!["dup"]);
    }

    #[test]
    fn assemble_rejects_misaligned_columns() {
        let err = assemble(columns(3), cleaned(2)).unwrap_err();
        match err {
            PipelineError::ColumnMismatch {
                column,
                expected,
                found,
            } => {
                assert_eq!(column, "description_cleaned");
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        let mut cols = columns(3);
        cols.date.pop();
        assert!(matches!(
            assemble(cols, cleaned(3)),
            Err(PipelineError::ColumnMismatch { column: "date", .. })
        ));
    }

    #[test]
    fn token_repr_matches_python_list() {
        assert_eq!(token_list_repr(&[]), "[]");
        assert_eq!(
            token_list_repr(&["run".to_string(), "data".to_string()]),
            "['run', 'data']"
        );
    }

    #[test]
    fn header_written_first() {
        let table = assemble(columns(1), cleaned(1)).unwrap();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("title,company,date,link,description,description_cleaned\n"));
    }

    #[test]
    fn empty_table_still_has_header() {
        let table = assemble(Columns::default(), Vec::new()).unwrap();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "title,company,date,link,description,description_cleaned\n"
        );
    }

    #[test]
    fn csv_round_trip_is_lossy_for_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        let table = assemble(columns(3), cleaned(3)).unwrap();
        table.write_csv_file(&path).unwrap();
        // second write replaces, never appends
        table.write_csv_file(&path).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, HEADER);

        let records = read_csv_file(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].company, "Acme, Inc.");
        assert_eq!(records[1].description, "Line one\nline \"two\" 1");
        // tokens come back as their rendered string
        assert_eq!(records[1].description_cleaned, "['line', '1']");
    }
}
