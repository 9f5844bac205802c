//! Purpose: Render statistics streams as NDJSON lines or a single CSV table.
//! Exports: `render_json`, `render_csv`.
//! Role: Output boundary used by the CLI; both modes are value-equivalent.
//! Invariants: NDJSON streams one line per record as the stream is consumed.
//! Invariants: CSV buffers all rows first; its header is the sorted union of
//! every key seen, and rows keep input order.
//! Invariants: The first stream error aborts rendering and propagates.

use std::collections::BTreeSet;
use std::io::Write;

use serde_json::Value;

use itemstat::core::error::{Error, ErrorKind};
use itemstat::core::stats::StatisticsRecord;

use crate::color_json::colorize_json_line;

pub fn render_json<I, W>(stats: I, out: &mut W, use_color: bool) -> Result<u64, Error>
where
    I: Iterator<Item = Result<StatisticsRecord, Error>>,
    W: Write,
{
    let mut count = 0u64;
    for stats_record in stats {
        let value = to_json_value(&stats_record?)?;
        let line = colorize_json_line(&value, use_color);
        writeln!(out, "{line}").map_err(write_error)?;
        count += 1;
    }
    out.flush().map_err(write_error)?;
    Ok(count)
}

pub fn render_csv<I, W>(stats: I, out: &mut W) -> Result<u64, Error>
where
    I: Iterator<Item = Result<StatisticsRecord, Error>>,
    W: Write,
{
    let mut rows = Vec::new();
    let mut fields = BTreeSet::new();
    for stats_record in stats {
        let value = to_json_value(&stats_record?)?;
        let Value::Object(map) = value else {
            return Err(Error::new(ErrorKind::Internal)
                .with_message("statistics record did not serialize to an object"));
        };
        fields.extend(map.keys().cloned());
        rows.push(map);
    }

    // No records means no columns; emit nothing rather than an empty header.
    if rows.is_empty() {
        return Ok(0);
    }

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&fields).map_err(csv_error)?;
    for row in &rows {
        let cells = fields
            .iter()
            .map(|field| row.get(field).map(cell_text).unwrap_or_default());
        writer.write_record(cells).map_err(csv_error)?;
    }
    writer.flush().map_err(write_error)?;
    Ok(rows.len() as u64)
}

fn to_json_value(stats: &StatisticsRecord) -> Result<Value, Error> {
    serde_json::to_value(stats).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode statistics record")
            .with_source(err)
    })
}

// Strings render bare (the CSV layer adds its own quoting); everything else
// uses its compact JSON rendering.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn write_error(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write output")
        .with_source(err)
}

fn csv_error(err: csv::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write CSV output")
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use itemstat::core::error::{Error, ErrorKind};
    use itemstat::core::item::Record;
    use itemstat::core::stats::{StatisticsRecord, capacity_stats};

    use super::{render_csv, render_json};

    fn stats_stream(
        values: Vec<serde_json::Value>,
        echo: &[&str],
    ) -> impl Iterator<Item = Result<StatisticsRecord, Error>> {
        let records: Vec<_> = values
            .into_iter()
            .map(|value| Record::from_json(&value))
            .collect();
        let echo: Vec<String> = echo.iter().map(|name| name.to_string()).collect();
        capacity_stats(records, echo)
    }

    #[test]
    fn ndjson_emits_one_line_per_record() {
        let stream = stats_stream(
            vec![json!({"a": {"S": "x"}}), json!({"b": {"S": "yz"}})],
            &[],
        );
        let mut out = Vec::new();
        let count = render_json(stream, &mut out, false).expect("rendered");
        assert_eq!(count, 2);

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["size"], 2);
        assert_eq!(lines[1]["size"], 3);
        assert_eq!(lines[0]["read_units"], 0.5);
    }

    #[test]
    fn csv_header_is_sorted_union_and_rows_keep_order() {
        let stream = stats_stream(
            vec![json!({"id": {"S": "abc"}}), json!({"id": {"S": "z"}})],
            &["id"],
        );
        let mut out = Vec::new();
        let count = render_csv(stream, &mut out).expect("rendered");
        assert_eq!(count, 2);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "attr.id,read_efficiency,read_excess,read_units,size,write_efficiency,write_excess,write_units"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("abc,"));
        let second = lines.next().unwrap();
        assert!(second.starts_with("z,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_and_json_modes_are_value_equivalent() {
        let values = vec![json!({"id": {"S": "abc"}, "count": {"N": "42"}})];

        let mut json_out = Vec::new();
        render_json(stats_stream(values.clone(), &["id"]), &mut json_out, false).unwrap();
        let json_row: Value =
            serde_json::from_str(String::from_utf8(json_out).unwrap().lines().next().unwrap())
                .unwrap();

        let mut csv_out = Vec::new();
        render_csv(stats_stream(values, &["id"]), &mut csv_out).unwrap();
        let csv_text = String::from_utf8(csv_out).unwrap();
        let mut lines = csv_text.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        let cells: Vec<&str> = lines.next().unwrap().split(',').collect();

        for (field, cell) in header.iter().zip(&cells) {
            let json_value = &json_row[*field];
            let json_text = match json_value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            assert_eq!(&json_text, cell, "field {field}");
        }
    }

    #[test]
    fn stream_error_aborts_csv_with_no_output() {
        let bad = vec![json!({"n": {"N": "oops"}})];
        let mut out = Vec::new();
        let err = render_csv(stats_stream(bad, &[]), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numeric);
        assert!(out.is_empty());
    }
}
