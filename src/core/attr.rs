//! Purpose: Model typed attribute values and compute their chargeable sizes.
//! Exports: `AttributeValue`, `attr_size`, container size constants.
//! Role: Bridges export-JSON attribute objects into the sizing engine.
//! Invariants: Well-formed attributes carry exactly one type tag; extra keys
//! are a documented precondition violation and are ignored, not validated.
//! Invariants: Sizing traverses containers iteratively, so nesting depth is
//! bounded by heap rather than the call stack.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value};

use crate::core::error::{Error, ErrorKind};
use crate::core::number::number_size;

/// Fixed overhead of a Map or List container, even when empty.
pub const EMPTY_DOC_BASE_SIZE: u64 = 3;
/// Per-entry overhead inside a Map or List.
pub const NESTED_TYPE_BASE_SIZE: u64 = 1;

/// One typed value within a record, tagged the way export JSON tags it
/// (`S`, `N`, `B`, `BOOL`, `NULL`, `M`, `L`, `SS`, `NS`, `BS`).
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    String(String),
    Number(String),
    Binary(String),
    Bool(bool),
    Null,
    Map(Vec<(String, AttributeValue)>),
    List(Vec<AttributeValue>),
    StringSet(Vec<String>),
    NumberSet(Vec<String>),
    BinarySet(Vec<String>),
}

impl AttributeValue {
    /// Converts a single-key tagged JSON object into an attribute value.
    /// Unknown tags are fatal (`ErrorKind::UnknownType`); payloads of the
    /// wrong JSON shape are fatal (`ErrorKind::Malformed`).
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        let map = value
            .as_object()
            .ok_or_else(|| malformed("attribute value must be a tagged object"))?;
        let (tag, payload) = map
            .iter()
            .next()
            .ok_or_else(|| malformed("attribute value must carry a type tag"))?;
        match tag.as_str() {
            "S" => Ok(Self::String(string_payload(payload, tag)?)),
            "N" => Ok(Self::Number(string_payload(payload, tag)?)),
            "B" => Ok(Self::Binary(string_payload(payload, tag)?)),
            "BOOL" => payload
                .as_bool()
                .map(Self::Bool)
                .ok_or_else(|| malformed("BOOL payload must be a boolean")),
            "NULL" => Ok(Self::Null),
            "M" => {
                let entries = payload
                    .as_object()
                    .ok_or_else(|| malformed("M payload must be an object"))?;
                let mut members = Vec::with_capacity(entries.len());
                for (name, member) in entries {
                    members.push((name.clone(), Self::from_json(member)?));
                }
                Ok(Self::Map(members))
            }
            "L" => {
                let items = payload
                    .as_array()
                    .ok_or_else(|| malformed("L payload must be an array"))?;
                let elements = items.iter().map(Self::from_json).collect::<Result<_, _>>()?;
                Ok(Self::List(elements))
            }
            "SS" => Ok(Self::StringSet(string_array_payload(payload, tag)?)),
            "NS" => Ok(Self::NumberSet(string_array_payload(payload, tag)?)),
            "BS" => Ok(Self::BinarySet(string_array_payload(payload, tag)?)),
            other => Err(Error::new(ErrorKind::UnknownType)
                .with_message(format!("unknown attribute type tag: {other:?}"))),
        }
    }

    /// Renders the attribute back into its tagged JSON form.
    pub fn to_json(&self) -> Value {
        let (tag, payload) = (self.type_tag(), self.payload_json());
        let mut map = Map::new();
        map.insert(tag.to_string(), payload);
        Value::Object(map)
    }

    /// The single payload carried under the type tag, as JSON.
    pub fn payload_json(&self) -> Value {
        match self {
            Self::String(text) | Self::Number(text) | Self::Binary(text) => {
                Value::String(text.clone())
            }
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Null => Value::Bool(true),
            Self::Map(members) => {
                let mut map = Map::new();
                for (name, member) in members {
                    map.insert(name.clone(), member.to_json());
                }
                Value::Object(map)
            }
            Self::List(elements) => {
                Value::Array(elements.iter().map(AttributeValue::to_json).collect())
            }
            Self::StringSet(items) | Self::NumberSet(items) | Self::BinarySet(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// The payload rendered as text, for echoing into statistics output.
    /// String-like payloads come through verbatim; everything else uses its
    /// compact JSON rendering.
    pub fn payload_text(&self) -> String {
        match self.payload_json() {
            Value::String(text) => text,
            other => other.to_string(),
        }
    }

    fn type_tag(&self) -> &'static str {
        match self {
            Self::String(_) => "S",
            Self::Number(_) => "N",
            Self::Binary(_) => "B",
            Self::Bool(_) => "BOOL",
            Self::Null => "NULL",
            Self::Map(_) => "M",
            Self::List(_) => "L",
            Self::StringSet(_) => "SS",
            Self::NumberSet(_) => "NS",
            Self::BinarySet(_) => "BS",
        }
    }
}

/// Returns the chargeable byte size of one attribute value. Containers are
/// walked with an explicit work stack; pathological nesting cannot exhaust
/// the call stack.
pub fn attr_size(attr: &AttributeValue) -> Result<u64, Error> {
    let mut total = 0u64;
    let mut stack = vec![attr];
    while let Some(value) = stack.pop() {
        match value {
            AttributeValue::String(text) => total += string_size(text),
            AttributeValue::Number(number) => total += number_size(number)?,
            AttributeValue::Binary(encoded) => total += binary_size(encoded)?,
            AttributeValue::Bool(_) | AttributeValue::Null => total += 1,
            AttributeValue::Map(members) => {
                total += EMPTY_DOC_BASE_SIZE;
                for (name, member) in members {
                    total += string_size(name) + NESTED_TYPE_BASE_SIZE;
                    stack.push(member);
                }
            }
            AttributeValue::List(elements) => {
                total += EMPTY_DOC_BASE_SIZE;
                for element in elements {
                    total += NESTED_TYPE_BASE_SIZE;
                    stack.push(element);
                }
            }
            AttributeValue::StringSet(items) => {
                total += items.iter().map(|item| string_size(item)).sum::<u64>();
            }
            AttributeValue::NumberSet(items) => {
                for item in items {
                    total += number_size(item)?;
                }
            }
            AttributeValue::BinarySet(items) => {
                for item in items {
                    total += binary_size(item)?;
                }
            }
        }
    }
    Ok(total)
}

/// UTF-8 byte length, which is what the engine charges for strings and names.
pub fn string_size(text: &str) -> u64 {
    text.len() as u64
}

/// Decoded byte length of a base64 binary payload.
pub fn binary_size(encoded: &str) -> Result<u64, Error> {
    let decoded = BASE64.decode(encoded).map_err(|err| {
        Error::new(ErrorKind::Malformed)
            .with_message("invalid base64 in binary attribute")
            .with_source(err)
    })?;
    Ok(decoded.len() as u64)
}

fn malformed(message: &str) -> Error {
    Error::new(ErrorKind::Malformed).with_message(message)
}

fn string_payload(payload: &Value, tag: &str) -> Result<String, Error> {
    payload
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| malformed(&format!("{tag} payload must be a string")))
}

fn string_array_payload(payload: &Value, tag: &str) -> Result<Vec<String>, Error> {
    let items = payload
        .as_array()
        .ok_or_else(|| malformed(&format!("{tag} payload must be an array")))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed(&format!("{tag} elements must be strings")))
        })
        .collect()
}
