//! Purpose: Parse line-delimited export JSON into a lazy record stream.
//! Exports: `RecordLines`.
//! Role: Input boundary used by the CLI; isolates line handling from main.
//! Invariants: One record per line, parsed as the stream is consumed.
//! Invariants: Errors carry the 1-based input line number; the first bad line
//! ends the stream (fail-fast, no skip policy).

use std::io::BufRead;

use serde_json::Value;

use itemstat::core::error::{Error, ErrorKind};
use itemstat::core::item::Record;

/// Iterator over `Result<Record, Error>` read from a buffered line source.
pub struct RecordLines<R> {
    reader: R,
    line_number: u64,
    failed: bool,
}

impl<R: BufRead> RecordLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            failed: false,
        }
    }

    fn parse_line(&self, line: &str) -> Result<Record, Error> {
        let value: Value = serde_json::from_str(line.trim()).map_err(|err| {
            Error::new(ErrorKind::Malformed)
                .with_message("input line is not valid JSON")
                .with_hint("Input must be one JSON record object per line.")
                .with_source(err)
        })?;
        Record::from_json(&value)
    }
}

impl<R: BufRead> Iterator for RecordLines<R> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                let result = self
                    .parse_line(&line)
                    .map_err(|err| err.with_line(self.line_number));
                if result.is_err() {
                    self.failed = true;
                }
                Some(result)
            }
            Err(err) => {
                self.failed = true;
                Some(Err(Error::new(ErrorKind::Io)
                    .with_message("failed to read input line")
                    .with_line(self.line_number + 1)
                    .with_source(err)))
            }
        }
    }
}
