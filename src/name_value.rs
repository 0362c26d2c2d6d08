//! Name/value list codec
//!
//! CloudWatch events tend to represent map data as lists of name/value
//! pairs:
//!
//! ```json
//! [
//!     {"name": "instance-id", "value": "i-0abc"},
//!     {"name": "state", "value": "running"}
//! ]
//! ```
//!
//! Working with that shape directly is awkward, so payload fields opt into
//! this codec and get an insertion-ordered map instead:
//!
//! ```
//! use serde::Deserialize;
//! use cloudwatch_dispatch::name_value::{self, NameValueMap};
//!
//! #[derive(Debug, Deserialize)]
//! struct ConfigurationChanged {
//!     #[serde(with = "name_value", default)]
//!     settings: NameValueMap,
//! }
//! ```
//!
//! Decoding is permissive: records missing `name` are dropped, unknown
//! fields inside a record are ignored, and a null or non-string `value`
//! decodes to `None` for that key.

use indexmap::IndexMap;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Mapping decoded from a name/value list.
///
/// Preserves first-occurrence insertion order; duplicate names overwrite
/// the stored value without reordering.
pub type NameValueMap = IndexMap<String, Option<String>>;

#[derive(Serialize)]
struct Pair<'a> {
    name: &'a str,
    value: Option<&'a str>,
}

/// Decode one wire array into a map, tolerating malformed records.
pub fn from_wire(records: &[Value]) -> NameValueMap {
    let mut map = NameValueMap::new();

    for record in records {
        let fields = match record.as_object() {
            Some(fields) => fields,
            None => continue,
        };
        let name = match fields.get("name").and_then(Value::as_str) {
            Some(name) => name,
            None => continue,
        };
        let value = fields.get("value").and_then(Value::as_str).map(str::to_owned);

        map.insert(name.to_owned(), value);
    }

    map
}

/// Encode a map as one wire array, pairs in iteration order.
pub fn to_wire(map: &NameValueMap) -> Value {
    Value::Array(
        map.iter()
            .map(|(name, value)| {
                serde_json::json!({
                    "name": name,
                    "value": value,
                })
            })
            .collect(),
    )
}

pub fn serialize<S>(map: &NameValueMap, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(map.len()))?;
    for (name, value) in map {
        seq.serialize_element(&Pair {
            name,
            value: value.as_deref(),
        })?;
    }
    seq.end()
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NameValueMap, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Vec::<Value>::deserialize(deserializer)?;
    Ok(from_wire(&records))
}

/// serde `with` module for optional name/value fields.
///
/// `None` encodes to JSON null rather than an empty array, keeping "no
/// data" distinguishable from "empty collection" on the wire.
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use super::NameValueMap;

    pub fn serialize<S>(map: &Option<NameValueMap>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match map {
            Some(map) => super::serialize(map, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NameValueMap>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let records = Option::<Vec<Value>>::deserialize(deserializer)?;
        Ok(records.map(|records| super::from_wire(&records)))
    }
}
