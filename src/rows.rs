use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context as _;

use crate::error::MalformedRow;
use crate::formats::CsvRow;

const COLUMNS: usize = 3;

/// Lazy, single-pass reader over the data rows of an input CSV.
///
/// The first record is always treated as a header and discarded. Rows are
/// returned positionally (url, project name, max pages); columns past the
/// third are ignored.
///
/// An I/O error ends the iteration; it is returned by [`RowReader::finish`].
pub struct RowReader<R = File> {
    source: String,
    records: csv::StringRecordsIntoIter<R>,
    read_error: Option<csv::Error>,
}

impl RowReader<File> {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("open input csv: {}", path.display()))?;
        let metadata = file
            .metadata()
            .with_context(|| format!("open input csv: {}", path.display()))?;
        if metadata.is_dir() {
            anyhow::bail!("open input csv: {} is a directory", path.display());
        }

        Ok(Self::from_reader(file, path.display().to_string()))
    }
}

impl<R: Read> RowReader<R> {
    /// `source` names the input in error messages.
    pub fn from_reader(reader: R, source: String) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        Self {
            source,
            records: reader.into_records(),
            read_error: None,
        }
    }

    /// Surfaces the I/O error that stopped the iteration, if any.
    pub fn finish(self) -> anyhow::Result<()> {
        match self.read_error {
            Some(err) => Err(err).with_context(|| format!("read input csv: {}", self.source)),
            None => Ok(()),
        }
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<CsvRow, MalformedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.read_error.is_some() {
            return None;
        }

        let record = self.records.next()?;
        match record {
            Ok(record) => Some(parse_record(&record)),
            Err(err) if err.is_io_error() => {
                tracing::debug!(error = %err, "input csv read failed");
                self.read_error = Some(err);
                None
            }
            Err(err) => Some(Err(MalformedRow {
                line: err.position().map_or(0, |pos| pos.line()),
                reason: err.to_string(),
                fields: Vec::new(),
            })),
        }
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<CsvRow, MalformedRow> {
    let line = record.position().map_or(0, |pos| pos.line());
    if record.len() < COLUMNS {
        return Err(MalformedRow {
            line,
            reason: format!("expected {COLUMNS} columns, found {}", record.len()),
            fields: record.iter().map(str::to_owned).collect(),
        });
    }

    Ok(CsvRow {
        start_url: record[0].to_owned(),
        project_name: record[1].to_owned(),
        max_pages: record[2].to_owned(),
    })
}
