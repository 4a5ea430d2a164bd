//! ObjectRecord - one object of a dump.
//!
//! A dump is a stream of records, one per line, with a fixed key order:
//!
//! ```text
//! {"address": 140245120, "type": "str", "size": 51, "len": 3, "value": "abc", "refs": []}
//! {"address": 140245176, "type": "tuple", "size": 56, "len": 1, "refs": [140245120]}
//! ```
//!
//! `name`, `len` and `value` are optional and appear, in that order, between
//! `size` and `refs`. Writing is done by hand rather than through serde so
//! that the key order and separators are exact; reading goes through
//! serde_json and tolerates unknown keys.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{RecordError, RecordResult};
use crate::escape::write_json_str;
use crate::symbol::Interner;
use crate::Address;

/// Type name of the placeholder returned for addresses with no record
pub const UNKNOWN_TYPE: &str = "<unknown>";

/// Type name of the record standing in for stripped references
pub const EX_REFERENCE_TYPE: &str = "<ex-reference>";

/// Truncated value carried by leaf records
///
/// Integers that fit an `i64` land in `Int`; any other JSON number (floats,
/// unsigned values past `i64::MAX`) is kept verbatim in `Number`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Int(i64),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Int(v) => write!(f, "{v}"),
            RecordValue::Number(n) => write!(f, "{n}"),
            RecordValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// One object: identity, type, allocated size and outgoing references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub address: Address,
    pub type_name: Arc<str>,
    /// Allocated bytes, including any GC header
    pub size: u64,
    /// Intrinsic display name (functions, classes, modules)
    pub name: Option<String>,
    /// Logical length as reported by the object
    pub length: Option<u64>,
    pub value: Option<RecordValue>,
    /// Direct referents in discovery order; may repeat
    pub refs: Vec<Address>,
}

#[derive(Deserialize)]
struct RawRecord<'a> {
    address: Option<Address>,
    #[serde(rename = "type", borrow)]
    type_name: Option<Cow<'a, str>>,
    size: Option<u64>,
    name: Option<String>,
    len: Option<u64>,
    value: Option<RecordValue>,
    refs: Option<Vec<Address>>,
}

impl ObjectRecord {
    /// Create a record with no optional fields
    pub fn new(address: Address, type_name: impl Into<Arc<str>>, size: u64) -> Self {
        Self {
            address,
            type_name: type_name.into(),
            size,
            name: None,
            length: None,
            value: None,
            refs: Vec::new(),
        }
    }

    /// Placeholder for an address referenced but never recorded
    pub fn unknown(address: Address) -> Self {
        Self::new(address, UNKNOWN_TYPE, 0)
    }

    /// The synthetic record at address 0
    pub fn ex_reference() -> Self {
        Self::new(0, EX_REFERENCE_TYPE, 0)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_value(mut self, value: RecordValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_refs(mut self, refs: Vec<Address>) -> Self {
        self.refs = refs;
        self
    }

    /// True for records synthesized by the loader rather than read
    pub fn is_synthetic(&self) -> bool {
        &*self.type_name == UNKNOWN_TYPE || &*self.type_name == EX_REFERENCE_TYPE
    }

    /// Write the record as one line, including the trailing newline
    pub fn write_json<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{{\"address\": {}, \"type\": ", self.address)?;
        write_json_str(out, &self.type_name)?;
        write!(out, ", \"size\": {}", self.size)?;
        if let Some(name) = &self.name {
            out.write_all(b", \"name\": ")?;
            write_json_str(out, name)?;
        }
        if let Some(length) = self.length {
            write!(out, ", \"len\": {length}")?;
        }
        match &self.value {
            Some(RecordValue::Int(v)) => write!(out, ", \"value\": {v}")?,
            Some(RecordValue::Number(n)) => write!(out, ", \"value\": {n}")?,
            Some(RecordValue::Text(s)) => {
                out.write_all(b", \"value\": ")?;
                write_json_str(out, s)?;
            }
            None => {}
        }
        out.write_all(b", \"refs\": [")?;
        for (i, r) in self.refs.iter().enumerate() {
            if i > 0 {
                out.write_all(b", ")?;
            }
            write!(out, "{r}")?;
        }
        out.write_all(b"]}\n")?;
        Ok(())
    }

    /// The record as a line, including the trailing newline
    pub fn to_json_line(&self) -> String {
        let mut buf = Vec::with_capacity(64 + self.refs.len() * 16);
        // Writing into a Vec cannot fail; the output is ASCII.
        let _ = self.write_json(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Parse one line (without framing punctuation)
    pub fn from_json_line(line: &str) -> RecordResult<Self> {
        let raw: RawRecord<'_> = serde_json::from_str(line)?;
        Self::from_raw(raw, |name| Arc::from(name))
    }

    /// Parse one line, sharing the type name through `interner`
    pub fn from_json_line_interned(line: &str, interner: &mut Interner) -> RecordResult<Self> {
        let raw: RawRecord<'_> = serde_json::from_str(line)?;
        Self::from_raw(raw, |name| interner.intern(name))
    }

    fn from_raw<F>(raw: RawRecord<'_>, mut intern: F) -> RecordResult<Self>
    where
        F: FnMut(&str) -> Arc<str>,
    {
        let address = raw.address.ok_or(RecordError::MissingField("address"))?;
        let type_name = raw.type_name.ok_or(RecordError::MissingField("type"))?;
        let size = raw.size.ok_or(RecordError::MissingField("size"))?;
        Ok(Self {
            address,
            type_name: intern(&type_name),
            size,
            name: raw.name,
            length: raw.len,
            value: raw.value,
            refs: raw.refs.ok_or(RecordError::MissingField("refs"))?,
        })
    }
}

impl fmt::Display for ObjectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:x} {}B", self.type_name, self.address, self.size)?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        if let Some(length) = self.length {
            write!(f, " {length}len")?;
        }
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        write!(f, " {}refs)", self.refs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_line() {
        let record = ObjectRecord::new(1234, "object", 16);
        assert_eq!(
            record.to_json_line(),
            "{\"address\": 1234, \"type\": \"object\", \"size\": 16, \"refs\": []}\n"
        );
    }

    #[test]
    fn test_full_line_key_order() {
        let record = ObjectRecord::new(10, "function", 120)
            .with_name("f/\"g\"")
            .with_length(2)
            .with_value(RecordValue::Text("x\u{e9}".into()))
            .with_refs(vec![7, 7, 3]);
        assert_eq!(
            record.to_json_line(),
            "{\"address\": 10, \"type\": \"function\", \"size\": 120, \
             \"name\": \"f\\/\\\"g\\\"\", \"len\": 2, \"value\": \"x\\u00e9\", \
             \"refs\": [7, 7, 3]}\n"
        );
    }

    #[test]
    fn test_int_value_is_bare() {
        let record = ObjectRecord::new(5, "int", 24).with_value(RecordValue::Int(-12));
        assert!(record.to_json_line().contains(", \"value\": -12, \"refs\""));
    }

    #[test]
    fn test_parse_written_line() {
        let record = ObjectRecord::new(99, "str", 53)
            .with_length(5)
            .with_value(RecordValue::Text("a\nb\\c".into()))
            .with_refs(vec![1, 2]);
        let parsed = ObjectRecord::from_json_line(record.to_json_line().trim_end()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let parsed = ObjectRecord::from_json_line(
            r#"{"address": 3, "type": "frame", "size": 400, "extra": true, "refs": []}"#,
        )
        .unwrap();
        assert_eq!(parsed.refs, Vec::<Address>::new());
        assert_eq!(&*parsed.type_name, "frame");
    }

    #[test]
    fn test_parse_missing_refs() {
        let err = ObjectRecord::from_json_line(r#"{"address": 1, "type": "int", "size": 24}"#)
            .unwrap_err();
        assert!(matches!(err, RecordError::MissingField("refs")));
    }

    #[test]
    fn test_parse_float_value() {
        let parsed = ObjectRecord::from_json_line(
            r#"{"address": 5, "type": "float", "size": 24, "value": 1.5, "refs": []}"#,
        )
        .unwrap();
        let value = parsed.value.clone().unwrap();
        assert!(matches!(value, RecordValue::Number(_)));
        assert_eq!(value.to_string(), "1.5");
        assert!(parsed.to_json_line().contains("\"value\": 1.5,"));
    }

    #[test]
    fn test_parse_unsigned_value_past_i64() {
        let parsed = ObjectRecord::from_json_line(
            r#"{"address": 6, "type": "int", "size": 36, "value": 18446744073709551615, "refs": []}"#,
        )
        .unwrap();
        assert_eq!(parsed.value.unwrap().to_string(), "18446744073709551615");

        let small = ObjectRecord::from_json_line(
            r#"{"address": 7, "type": "int", "size": 28, "value": 7, "refs": []}"#,
        )
        .unwrap();
        assert_eq!(small.value, Some(RecordValue::Int(7)));
    }

    #[test]
    fn test_parse_missing_address() {
        let err = ObjectRecord::from_json_line(r#"{"type": "int", "size": 24, "refs": []}"#)
            .unwrap_err();
        assert!(matches!(err, RecordError::MissingField("address")));
    }

    #[test]
    fn test_parse_truncated_line() {
        let err = ObjectRecord::from_json_line(r#"{"address": 3, "type": "#).unwrap_err();
        assert!(matches!(err, RecordError::Json(_)));
    }

    #[test]
    fn test_interned_parse_shares_type_names() {
        let mut interner = Interner::new();
        let a = ObjectRecord::from_json_line_interned(
            r#"{"address": 1, "type": "dict", "size": 280, "refs": []}"#,
            &mut interner,
        )
        .unwrap();
        let b = ObjectRecord::from_json_line_interned(
            r#"{"address": 2, "type": "dict", "size": 280, "refs": [1]}"#,
            &mut interner,
        )
        .unwrap();
        assert!(Arc::ptr_eq(&a.type_name, &b.type_name));
    }

    #[test]
    fn test_synthetic_records() {
        assert!(ObjectRecord::unknown(77).is_synthetic());
        let ex = ObjectRecord::ex_reference();
        assert_eq!(ex.address, 0);
        assert!(ex.is_synthetic());
        assert!(!ObjectRecord::new(1, "int", 24).is_synthetic());
    }

    #[test]
    fn test_display() {
        let record = ObjectRecord::new(0x10, "list", 104).with_length(3).with_refs(vec![1, 2, 3]);
        assert_eq!(record.to_string(), "list(0x10 104B 3len 3refs)");
    }
}
