//! Purpose: Turn a stream of records into per-record capacity-unit statistics.
//! Exports: `StatisticsRecord`, `CapacityStats`, `capacity_stats`, block constants.
//! Role: Streaming aggregation layer above the item sizer.
//! Invariants: Output order matches input order, one statistics record per
//! input record, at most one record held in memory at a time.
//! Invariants: The first record error ends the stream (fail-fast, no retry).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::error::Error;
use crate::core::item::{Record, item_size};

/// Byte quantum charged per read capacity unit block.
pub const READ_BLOCK_BYTES: u64 = 4096;
/// Byte quantum charged per write capacity unit.
pub const WRITE_BLOCK_BYTES: u64 = 1024;

/// Derived statistics for one record. The echoed attribute fields flatten
/// into the serialized object under their `attr.<name>` keys, ahead of the
/// metric fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsRecord {
    #[serde(flatten)]
    pub attrs: BTreeMap<String, String>,
    pub size: u64,
    pub read_units: f64,
    pub read_efficiency: f64,
    pub read_excess: u64,
    pub write_units: u64,
    pub write_efficiency: f64,
    pub write_excess: u64,
}

impl StatisticsRecord {
    /// Sizes `record` and derives its capacity-unit metrics, echoing the
    /// payloads of the requested attributes. An absent attribute echoes as
    /// an empty string.
    pub fn compute(record: &Record, echo_attrs: &[String]) -> Result<Self, Error> {
        let mut attrs = BTreeMap::new();
        for name in echo_attrs {
            let text = record
                .get(name)
                .map(|attr| attr.payload_text())
                .unwrap_or_default();
            attrs.insert(format!("attr.{name}"), text);
        }

        let size = item_size(record)?;
        let read_blocks = size.div_ceil(READ_BLOCK_BYTES);
        let read_bytes_budget = read_blocks * READ_BLOCK_BYTES;
        let write_blocks = size.div_ceil(WRITE_BLOCK_BYTES);
        let write_bytes_budget = write_blocks * WRITE_BLOCK_BYTES;

        Ok(Self {
            attrs,
            size,
            // Fixed halving, with no consistency-mode toggle.
            read_units: read_blocks as f64 / 2.0,
            read_efficiency: efficiency(size, read_bytes_budget),
            read_excess: read_bytes_budget - size,
            write_units: write_blocks,
            write_efficiency: efficiency(size, write_bytes_budget),
            write_excess: write_bytes_budget - size,
        })
    }
}

// An empty record has a zero budget; report zero efficiency rather than NaN,
// which JSON cannot carry.
fn efficiency(size: u64, budget: u64) -> f64 {
    if budget == 0 {
        return 0.0;
    }
    size as f64 / budget as f64
}

/// Lazy adapter yielding one `StatisticsRecord` per input record, in input
/// order. Consuming it is destructive; the source is a forward-only stream.
pub struct CapacityStats<I> {
    records: I,
    echo_attrs: Vec<String>,
    failed: bool,
}

impl<I> Iterator for CapacityStats<I>
where
    I: Iterator<Item = Result<Record, Error>>,
{
    type Item = Result<StatisticsRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let record = self.records.next()?;
        let result = record.and_then(|record| StatisticsRecord::compute(&record, &self.echo_attrs));
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Wraps a record stream in the statistics aggregator.
pub fn capacity_stats<I>(records: I, echo_attrs: Vec<String>) -> CapacityStats<I::IntoIter>
where
    I: IntoIterator<Item = Result<Record, Error>>,
{
    CapacityStats {
        records: records.into_iter(),
        echo_attrs,
        failed: false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{StatisticsRecord, capacity_stats};
    use crate::core::error::{Error, ErrorKind};
    use crate::core::item::Record;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(&value).expect("valid record")
    }

    fn stats_for(value: serde_json::Value, echo: &[&str]) -> StatisticsRecord {
        let echo: Vec<String> = echo.iter().map(|name| name.to_string()).collect();
        StatisticsRecord::compute(&record(value), &echo).expect("computable")
    }

    #[test]
    fn twelve_byte_record_metrics() {
        let stats = stats_for(json!({"id": {"S": "abc"}, "count": {"N": "42"}}), &[]);
        assert_eq!(stats.size, 12);
        assert_eq!(stats.read_units, 0.5);
        assert_eq!(stats.read_excess, 4096 - 12);
        assert_eq!(stats.read_efficiency, 12.0 / 4096.0);
        assert_eq!(stats.write_units, 1);
        assert_eq!(stats.write_excess, 1024 - 12);
        assert_eq!(stats.write_efficiency, 12.0 / 1024.0);
    }

    #[test]
    fn multi_block_record_metrics() {
        // 4 ("blob") + 5000 characters of payload.
        let blob = "x".repeat(5000);
        let stats = stats_for(json!({"blob": {"S": blob}}), &[]);
        assert_eq!(stats.size, 5004);
        assert_eq!(stats.read_units, 1.0);
        assert_eq!(stats.write_units, 5);
        assert_eq!(stats.read_excess, 2 * 4096 - 5004);
        assert_eq!(stats.write_excess, 5 * 1024 - 5004);
    }

    #[test]
    fn empty_record_reports_zero_without_nan() {
        let stats = stats_for(json!({}), &[]);
        assert_eq!(stats.size, 0);
        assert_eq!(stats.read_units, 0.0);
        assert_eq!(stats.write_units, 0);
        assert_eq!(stats.read_efficiency, 0.0);
        assert_eq!(stats.write_efficiency, 0.0);
        assert_eq!(stats.read_excess, 0);
        assert_eq!(stats.write_excess, 0);
    }

    #[test]
    fn echoes_requested_attributes_as_text() {
        let stats = stats_for(
            json!({"id": {"S": "abc"}, "flag": {"BOOL": true}}),
            &["id", "flag", "missing"],
        );
        assert_eq!(stats.attrs["attr.id"], "abc");
        assert_eq!(stats.attrs["attr.flag"], "true");
        assert_eq!(stats.attrs["attr.missing"], "");
    }

    #[test]
    fn serialized_form_flattens_echoes_before_metrics() {
        let stats = stats_for(json!({"id": {"S": "abc"}}), &["id"]);
        let value = serde_json::to_value(&stats).expect("serializable");
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "attr.id",
                "size",
                "read_units",
                "read_efficiency",
                "read_excess",
                "write_units",
                "write_efficiency",
                "write_excess",
            ]
        );
    }

    #[test]
    fn preserves_count_and_order() {
        let records = vec![
            Ok(record(json!({"a": {"S": "x"}}))),
            Ok(record(json!({"ab": {"S": "xy"}}))),
            Ok(record(json!({"abc": {"S": "xyz"}}))),
        ];
        let sizes: Vec<u64> = capacity_stats(records, Vec::new())
            .map(|stats| stats.expect("computable").size)
            .collect();
        assert_eq!(sizes, [2, 4, 6]);
    }

    #[test]
    fn first_error_ends_the_stream() {
        let records = vec![
            Ok(record(json!({"a": {"S": "x"}}))),
            Err(Error::new(ErrorKind::Malformed).with_message("bad line")),
            Ok(record(json!({"b": {"S": "y"}}))),
        ];
        let mut stream = capacity_stats(records, Vec::new());
        assert!(stream.next().unwrap().is_ok());
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }

    #[test]
    fn numeric_failure_is_fail_fast() {
        let records = vec![Ok(record(json!({"n": {"N": "not-a-number"}})))];
        let mut stream = capacity_stats(records, Vec::new());
        let err = stream.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numeric);
        assert!(stream.next().is_none());
    }
}
