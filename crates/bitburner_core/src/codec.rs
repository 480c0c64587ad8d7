//! Decoding and encoding of the engine's self-describing values.
//!
//! Every structured value the engine persists is either plain JSON or an
//! object of the form `{"ctor": <tag>, "data": <payload>}`. Two tags are
//! reserved: `JSONMap` carries an ordered list of `[key, value]` tuples and
//! `JSONSet` carries a list of items. Any other tag names a class whose
//! payload is an object of fields.

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::core_api::FormatError;

pub const DISCRIMINATOR_KEY: &str = "ctor";
pub const PAYLOAD_KEY: &str = "data";
pub const PAIR_LIST_TAG: &str = "JSONMap";
pub const ITEM_LIST_TAG: &str = "JSONSet";

// Largest integer the origin engine can represent exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub type Fields = IndexMap<String, TaggedValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum Plain {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<TaggedValue>),
    Object(Fields),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    Plain(Plain),
    ClassInstance {
        tag: String,
        fields: Fields,
    },
    OrderedPairList {
        tag: String,
        pairs: Vec<(TaggedValue, TaggedValue)>,
    },
    ItemList {
        tag: String,
        items: Vec<TaggedValue>,
    },
}

impl TaggedValue {
    pub fn null() -> Self {
        Self::Plain(Plain::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::Plain(Plain::Bool(value))
    }

    /// Numbers follow the origin engine's stringification: integral values
    /// lose their fractional part and non-finite values become `null`.
    pub fn number(value: f64) -> Self {
        match number_from_f64(value) {
            Some(number) => Self::Plain(Plain::Number(number)),
            None => Self::null(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Plain(Plain::String(value.into()))
    }

    pub fn array(items: Vec<TaggedValue>) -> Self {
        Self::Plain(Plain::Array(items))
    }

    pub fn object(fields: Fields) -> Self {
        Self::Plain(Plain::Object(fields))
    }

    pub fn class(tag: impl Into<String>, fields: Fields) -> Self {
        Self::ClassInstance {
            tag: tag.into(),
            fields,
        }
    }

    pub fn pair_list(pairs: Vec<(TaggedValue, TaggedValue)>) -> Self {
        Self::OrderedPairList {
            tag: PAIR_LIST_TAG.to_string(),
            pairs,
        }
    }

    pub fn item_list(items: Vec<TaggedValue>) -> Self {
        Self::ItemList {
            tag: ITEM_LIST_TAG.to_string(),
            items,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::ClassInstance { tag, .. }
            | Self::OrderedPairList { tag, .. }
            | Self::ItemList { tag, .. } => Some(tag),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Plain(Plain::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Plain(Plain::Number(n)) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= MAX_SAFE_INTEGER)
                    .map(|v| v as u64)
            }),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Plain(Plain::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Plain(Plain::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            Self::Plain(Plain::Object(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TaggedValue]> {
        match self {
            Self::Plain(Plain::Array(items)) => Some(items),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plain(Plain::Null) => "null",
            Self::Plain(Plain::Bool(_)) => "boolean",
            Self::Plain(Plain::Number(_)) => "number",
            Self::Plain(Plain::String(_)) => "string",
            Self::Plain(Plain::Array(_)) => "array",
            Self::Plain(Plain::Object(_)) => "object",
            Self::ClassInstance { .. } => "class instance",
            Self::OrderedPairList { .. } => "ordered pair list",
            Self::ItemList { .. } => "item list",
        }
    }

    pub fn from_json(value: &JsonValue, section: &str) -> Result<Self, FormatError> {
        decode_at(value, section, "$")
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Plain(plain) => match plain {
                Plain::Null => JsonValue::Null,
                Plain::Bool(b) => JsonValue::Bool(*b),
                Plain::Number(n) => JsonValue::Number(n.clone()),
                Plain::String(s) => JsonValue::String(s.clone()),
                Plain::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
                Plain::Object(fields) => JsonValue::Object(fields_to_json(fields)),
            },
            Self::ClassInstance { tag, fields } => {
                tagged_json(tag, JsonValue::Object(fields_to_json(fields)))
            }
            Self::OrderedPairList { tag, pairs } => tagged_json(
                tag,
                JsonValue::Array(
                    pairs
                        .iter()
                        .map(|(k, v)| JsonValue::Array(vec![k.to_json(), v.to_json()]))
                        .collect(),
                ),
            ),
            Self::ItemList { tag, items } => tagged_json(
                tag,
                JsonValue::Array(items.iter().map(Self::to_json).collect()),
            ),
        }
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

/// Parses one stringified section into a tagged value.
pub fn parse_section(raw: &str, section: &str) -> Result<TaggedValue, FormatError> {
    let value: JsonValue = serde_json::from_str(raw)
        .map_err(|e| FormatError::new(section, "$", format!("invalid JSON: {e}")))?;
    TaggedValue::from_json(&value, section)
}

pub fn number_from_f64(value: f64) -> Option<Number> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

fn tagged_json(tag: &str, payload: JsonValue) -> JsonValue {
    let mut map = JsonMap::new();
    map.insert(DISCRIMINATOR_KEY.to_string(), JsonValue::String(tag.to_string()));
    map.insert(PAYLOAD_KEY.to_string(), payload);
    JsonValue::Object(map)
}

fn fields_to_json(fields: &Fields) -> JsonMap<String, JsonValue> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}

fn decode_at(value: &JsonValue, section: &str, path: &str) -> Result<TaggedValue, FormatError> {
    match value {
        JsonValue::Null => Ok(TaggedValue::null()),
        JsonValue::Bool(b) => Ok(TaggedValue::bool(*b)),
        JsonValue::Number(n) => Ok(TaggedValue::Plain(Plain::Number(n.clone()))),
        JsonValue::String(s) => Ok(TaggedValue::string(s.clone())),
        JsonValue::Array(items) => decode_items(items, section, path).map(TaggedValue::array),
        JsonValue::Object(map) => match map.get(DISCRIMINATOR_KEY) {
            None => decode_fields(map, section, path).map(TaggedValue::object),
            Some(JsonValue::String(tag)) => decode_tagged(tag, map, section, path),
            Some(other) => Err(FormatError::new(
                section,
                format!("{path}.{DISCRIMINATOR_KEY}"),
                format!("discriminator must be a string, found {}", json_kind(other)),
            )),
        },
    }
}

fn decode_tagged(
    tag: &str,
    map: &JsonMap<String, JsonValue>,
    section: &str,
    path: &str,
) -> Result<TaggedValue, FormatError> {
    if let Some(extra) = map
        .keys()
        .find(|k| k.as_str() != DISCRIMINATOR_KEY && k.as_str() != PAYLOAD_KEY)
    {
        return Err(FormatError::new(
            section,
            format!("{path}.{extra}"),
            format!("unexpected key beside discriminator {tag:?}"),
        ));
    }

    let data_path = format!("{path}.{PAYLOAD_KEY}");
    let data = map.get(PAYLOAD_KEY).ok_or_else(|| {
        FormatError::new(section, &data_path, format!("{tag} value is missing its payload"))
    })?;

    match tag {
        PAIR_LIST_TAG => {
            let JsonValue::Array(entries) = data else {
                return Err(FormatError::new(
                    section,
                    data_path,
                    format!("{tag} payload must be an array, found {}", json_kind(data)),
                ));
            };
            let mut pairs = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                let entry_path = format!("{data_path}[{index}]");
                let pair = match entry {
                    JsonValue::Array(pair) if pair.len() == 2 => pair,
                    JsonValue::Array(pair) => {
                        return Err(FormatError::new(
                            section,
                            entry_path,
                            format!("expected a [key, value] tuple, found {} elements", pair.len()),
                        ));
                    }
                    other => {
                        return Err(FormatError::new(
                            section,
                            entry_path,
                            format!("expected a [key, value] tuple, found {}", json_kind(other)),
                        ));
                    }
                };
                let key = decode_at(&pair[0], section, &format!("{entry_path}[0]"))?;
                let value = decode_at(&pair[1], section, &format!("{entry_path}[1]"))?;
                pairs.push((key, value));
            }
            Ok(TaggedValue::OrderedPairList {
                tag: tag.to_string(),
                pairs,
            })
        }
        ITEM_LIST_TAG => {
            let JsonValue::Array(items) = data else {
                return Err(FormatError::new(
                    section,
                    data_path,
                    format!("{tag} payload must be an array, found {}", json_kind(data)),
                ));
            };
            Ok(TaggedValue::ItemList {
                tag: tag.to_string(),
                items: decode_items(items, section, &data_path)?,
            })
        }
        _ => {
            let JsonValue::Object(fields) = data else {
                return Err(FormatError::new(
                    section,
                    data_path,
                    format!("{tag} payload must be an object, found {}", json_kind(data)),
                ));
            };
            Ok(TaggedValue::ClassInstance {
                tag: tag.to_string(),
                fields: decode_fields(fields, section, &data_path)?,
            })
        }
    }
}

fn decode_items(
    items: &[JsonValue],
    section: &str,
    path: &str,
) -> Result<Vec<TaggedValue>, FormatError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| decode_at(item, section, &format!("{path}[{index}]")))
        .collect()
}

fn decode_fields(
    map: &JsonMap<String, JsonValue>,
    section: &str,
    path: &str,
) -> Result<Fields, FormatError> {
    let mut fields = Fields::with_capacity(map.len());
    for (key, value) in map {
        fields.insert(key.clone(), decode_at(value, section, &format!("{path}.{key}"))?);
    }
    Ok(fields)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
