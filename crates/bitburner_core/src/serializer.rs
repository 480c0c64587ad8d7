use indexmap::IndexMap;
use tracing::debug;

use crate::container::{ENVELOPE_TAG, RawContainer, SectionName};
use crate::model::{LoadedSave, SaveModel};

/// Builds the export envelope for `model`.
///
/// With a baseline, every section whose value is unchanged reuses the
/// baseline's raw string byte for byte, sections keep the baseline's key
/// order, and sections that did not exist in the baseline are appended.
/// Without one, every section is stringified in canonical order. Absent
/// optional sections are written as empty strings.
pub fn export_container(model: &SaveModel, baseline: Option<&LoadedSave>) -> RawContainer {
    let discriminator = if model.discriminator.is_empty() {
        ENVELOPE_TAG.to_string()
    } else {
        model.discriminator.clone()
    };

    let Some(baseline) = baseline else {
        let mut sections = IndexMap::with_capacity(SectionName::ALL.len());
        for name in SectionName::ALL {
            sections.insert(name.key().to_string(), stringify(model, name));
        }
        for (key, text) in &model.passthrough {
            sections.insert(key.clone(), text.clone());
        }
        return RawContainer {
            discriminator,
            sections,
        };
    };

    let mut sections = IndexMap::with_capacity(baseline.raw.sections.len());
    for (key, original) in &baseline.raw.sections {
        match SectionName::from_key(key) {
            Some(name) if model.section_eq(&baseline.model, name) => {
                debug!(section = key.as_str(), "reusing unchanged section");
                sections.insert(key.clone(), original.clone());
            }
            Some(name) => {
                debug!(section = key.as_str(), "re-encoding changed section");
                sections.insert(key.clone(), stringify(model, name));
            }
            None => {
                if let Some(text) = model.passthrough.get(key) {
                    sections.insert(key.clone(), text.clone());
                }
            }
        }
    }

    for name in SectionName::ALL {
        if !sections.contains_key(name.key()) && model.has_section(name) {
            debug!(section = name.key(), "appending new section");
            sections.insert(name.key().to_string(), stringify(model, name));
        }
    }
    for (key, text) in &model.passthrough {
        if !sections.contains_key(key) {
            sections.insert(key.clone(), text.clone());
        }
    }

    RawContainer {
        discriminator,
        sections,
    }
}

/// Serializes `model` to the JSON envelope text.
pub fn serialize(model: &SaveModel, baseline: Option<&LoadedSave>) -> String {
    export_container(model, baseline).to_json_string()
}

fn stringify(model: &SaveModel, name: SectionName) -> String {
    model
        .encode_section(name)
        .map(|value| value.to_json_string())
        .unwrap_or_default()
}
