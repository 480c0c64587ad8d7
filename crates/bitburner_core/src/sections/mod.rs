//! Per-section structural contracts. Each section turns the tagged value
//! decoded from its raw string into a typed record, or rejects it with a
//! `FormatError` that names the offending path.

pub mod entities;
pub mod player;
pub mod settings;

use crate::codec::{Fields, TaggedValue};
use crate::core_api::FormatError;

pub use entities::{
    CompanyRecord, CompanyTable, EntityTable, FactionRecord, FactionTable, GangRecord, GangTable,
    ServerRecord, ServerTable, is_valid_server_ram,
};
pub use player::{HealthPool, ListEncoding, OwnedAugmentation, PlayerState, SourceFileLevels};
pub use settings::SettingsBag;

/// Typed view over an object's fields that reports failures with the
/// section name and path of the field being read.
pub struct FieldReader<'a> {
    section: &'a str,
    path: String,
    fields: &'a Fields,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(section: &'a str, path: impl Into<String>, fields: &'a Fields) -> Self {
        Self {
            section,
            path: path.into(),
            fields,
        }
    }

    /// Reads a plain (untagged) object.
    pub(crate) fn plain_object(
        section: &'a str,
        path: impl Into<String>,
        value: &'a TaggedValue,
    ) -> Result<Self, FormatError> {
        let path = path.into();
        let fields = value.as_object().ok_or_else(|| {
            FormatError::new(
                section,
                path.clone(),
                format!("expected an object, found {}", value.kind()),
            )
        })?;
        Ok(Self::new(section, path, fields))
    }

    pub(crate) fn section(&self) -> &'a str {
        self.section
    }

    pub(crate) fn object(&self, key: &str) -> Result<FieldReader<'a>, FormatError> {
        Self::plain_object(self.section, self.child_path(key), self.require(key)?)
    }

    pub(crate) fn child_path(&self, key: &str) -> String {
        format!("{}.{key}", self.path)
    }

    pub(crate) fn error(&self, key: &str, detail: impl Into<String>) -> FormatError {
        FormatError::new(self.section, self.child_path(key), detail)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a TaggedValue> {
        self.fields.get(key)
    }

    pub(crate) fn require(&self, key: &str) -> Result<&'a TaggedValue, FormatError> {
        self.get(key)
            .ok_or_else(|| self.error(key, "required field is missing"))
    }

    pub(crate) fn number(&self, key: &str) -> Result<f64, FormatError> {
        let value = self.require(key)?;
        value
            .as_f64()
            .ok_or_else(|| self.error(key, format!("expected a number, found {}", value.kind())))
    }

    pub(crate) fn unsigned(&self, key: &str) -> Result<u32, FormatError> {
        let value = self.require(key)?;
        value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                self.error(
                    key,
                    format!("expected a non-negative integer, found {}", value.kind()),
                )
            })
    }

    pub(crate) fn string(&self, key: &str) -> Result<String, FormatError> {
        let value = self.require(key)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.error(key, format!("expected a string, found {}", value.kind())))
    }

    pub(crate) fn boolean(&self, key: &str) -> Result<bool, FormatError> {
        let value = self.require(key)?;
        value
            .as_bool()
            .ok_or_else(|| self.error(key, format!("expected a boolean, found {}", value.kind())))
    }

    pub(crate) fn opt_number(&self, key: &str) -> Result<Option<f64>, FormatError> {
        match self.get(key) {
            None => Ok(None),
            Some(_) => self.number(key).map(Some),
        }
    }

    pub(crate) fn opt_boolean(&self, key: &str) -> Result<Option<bool>, FormatError> {
        match self.get(key) {
            None => Ok(None),
            Some(_) => self.boolean(key).map(Some),
        }
    }

    pub(crate) fn string_list(&self, key: &str) -> Result<Vec<String>, FormatError> {
        let Some(value) = self.get(key) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.error(key, format!("expected an array, found {}", value.kind())))?;
        strings_at(self.section, &self.child_path(key), items)
    }

    /// Closed contracts reject any key outside `allowed`.
    pub(crate) fn deny_unknown(&self, allowed: &[&str]) -> Result<(), FormatError> {
        match self.fields.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(self.error(key, "unknown field in closed record")),
            None => Ok(()),
        }
    }

    pub(crate) fn key_order(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Fields outside `known`, kept opaquely for open contracts.
    pub(crate) fn remainder(&self, known: &[&str]) -> Fields {
        self.fields
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

pub(crate) fn strings_at(
    section: &str,
    path: &str,
    items: &[TaggedValue],
) -> Result<Vec<String>, FormatError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                FormatError::new(
                    section,
                    format!("{path}[{index}]"),
                    format!("expected a string, found {}", item.kind()),
                )
            })
        })
        .collect()
}

pub(crate) fn string_array(values: &[String]) -> TaggedValue {
    TaggedValue::array(values.iter().cloned().map(TaggedValue::string).collect())
}

/// Rebuilds an open object: keys keep their loaded order, typed values
/// replace their loaded counterparts, and keys that did not exist at load
/// time are appended.
pub(crate) fn assemble(
    order: &[String],
    typed: Vec<(&'static str, TaggedValue)>,
    extra: &Fields,
) -> Fields {
    let mut typed: Fields = typed
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let mut out = Fields::with_capacity(order.len() + typed.len());

    for key in order {
        if let Some(value) = typed.shift_remove(key) {
            out.insert(key.clone(), value);
        } else if let Some(value) = extra.get(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in typed {
        out.insert(key, value);
    }
    for (key, value) in extra {
        if !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}
