use crate::codec::{Fields, TaggedValue};
use crate::container::SectionName;
use crate::core_api::FormatError;

/// The settings section is an open bag: the engine adds keys freely, so
/// every key survives a round trip whether this crate knows it or not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsBag {
    fields: Fields,
}

impl SettingsBag {
    pub fn decode(value: &TaggedValue) -> Result<Self, FormatError> {
        let fields = value.as_object().ok_or_else(|| {
            FormatError::new(
                SectionName::Settings.key(),
                "$",
                format!("expected an object, found {}", value.kind()),
            )
        })?;
        Ok(Self {
            fields: fields.clone(),
        })
    }

    pub fn encode(&self) -> TaggedValue {
        TaggedValue::object(self.fields.clone())
    }

    pub fn get(&self, key: &str) -> Option<&TaggedValue> {
        self.fields.get(key)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(TaggedValue::as_bool).unwrap_or(default)
    }

    pub fn get_number(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(TaggedValue::as_f64).unwrap_or(default)
    }

    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(TaggedValue::as_str).unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: TaggedValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
