//! Purpose: Model whole records and compute their chargeable item size.
//! Exports: `Record`, `item_size`.
//! Role: Top of the sizing recursion; a record is the unit the engine bills.
//! Invariants: `item_size` is a pure function of record content.

use serde_json::Value;

use crate::core::attr::{AttributeValue, attr_size, string_size};
use crate::core::error::{Error, ErrorKind};

/// One persisted record: an ordered mapping of attribute name to value.
/// Built per input line, consumed, and discarded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    attributes: Vec<(String, AttributeValue)>,
}

impl Record {
    /// Parses a record from its export-JSON object form.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        let map = value.as_object().ok_or_else(|| {
            Error::new(ErrorKind::Malformed)
                .with_message("record must be a JSON object of attributes")
        })?;
        let mut attributes = Vec::with_capacity(map.len());
        for (name, attr) in map {
            attributes.push((name.clone(), AttributeValue::from_json(attr)?));
        }
        Ok(Self { attributes })
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, attr)| attr)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes
            .iter()
            .map(|(name, attr)| (name.as_str(), attr))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Returns the chargeable byte size of a whole record: the sum over all
/// attributes of the UTF-8 name length plus the attribute value size.
pub fn item_size(record: &Record) -> Result<u64, Error> {
    let mut size = 0u64;
    for (name, attr) in record.iter() {
        size += string_size(name);
        size += attr_size(attr)?;
    }
    Ok(size)
}
