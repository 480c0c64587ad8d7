use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::codec::{DISCRIMINATOR_KEY, PAYLOAD_KEY};
use crate::core_api::FormatError;

pub const ENVELOPE_TAG: &str = "BitburnerSaveObject";
pub const ENVELOPE_SECTION: &str = "envelope";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionName {
    Player,
    AllServers,
    Companies,
    Factions,
    Aliases,
    GlobalAliases,
    StockMarket,
    Settings,
    Version,
    AllGangs,
    LastExportBonus,
    StaneksGift,
    Go,
}

impl SectionName {
    pub const ALL: [SectionName; 13] = [
        Self::Player,
        Self::AllServers,
        Self::Companies,
        Self::Factions,
        Self::Aliases,
        Self::GlobalAliases,
        Self::StockMarket,
        Self::Settings,
        Self::Version,
        Self::AllGangs,
        Self::LastExportBonus,
        Self::StaneksGift,
        Self::Go,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Player => "PlayerSave",
            Self::AllServers => "AllServersSave",
            Self::Companies => "CompaniesSave",
            Self::Factions => "FactionsSave",
            Self::Aliases => "AliasesSave",
            Self::GlobalAliases => "GlobalAliasesSave",
            Self::StockMarket => "StockMarketSave",
            Self::Settings => "SettingsSave",
            Self::Version => "VersionSave",
            Self::AllGangs => "AllGangsSave",
            Self::LastExportBonus => "LastExportBonus",
            Self::StaneksGift => "StaneksGiftSave",
            Self::Go => "GoSave",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.key() == key)
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            Self::Player | Self::AllServers | Self::Companies | Self::Factions
        )
    }
}

/// The envelope exactly as loaded: discriminator plus every section string
/// in its original key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContainer {
    pub discriminator: String,
    pub sections: IndexMap<String, String>,
}

impl RawContainer {
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let value: JsonValue = serde_json::from_str(raw).map_err(|e| {
            FormatError::new(ENVELOPE_SECTION, "$", format!("invalid JSON: {e}"))
        })?;
        let JsonValue::Object(map) = value else {
            return Err(FormatError::new(
                ENVELOPE_SECTION,
                "$",
                "save envelope must be an object",
            ));
        };

        let discriminator = match map.get(DISCRIMINATOR_KEY) {
            Some(JsonValue::String(tag)) if tag == ENVELOPE_TAG => tag.clone(),
            Some(JsonValue::String(tag)) => {
                return Err(FormatError::new(
                    ENVELOPE_SECTION,
                    format!("$.{DISCRIMINATOR_KEY}"),
                    format!("expected discriminator {ENVELOPE_TAG:?}, found {tag:?}"),
                ));
            }
            _ => {
                return Err(FormatError::new(
                    ENVELOPE_SECTION,
                    format!("$.{DISCRIMINATOR_KEY}"),
                    "save envelope is missing its discriminator",
                ));
            }
        };

        let Some(JsonValue::Object(data)) = map.get(PAYLOAD_KEY) else {
            return Err(FormatError::new(
                ENVELOPE_SECTION,
                format!("$.{PAYLOAD_KEY}"),
                "save envelope payload must be an object of section strings",
            ));
        };

        let mut sections = IndexMap::with_capacity(data.len());
        for (key, value) in data {
            let JsonValue::String(text) = value else {
                return Err(FormatError::new(
                    key.as_str(),
                    "$",
                    "section value must be a JSON-encoded string",
                ));
            };
            sections.insert(key.clone(), text.clone());
        }

        for name in SectionName::ALL {
            if name.is_required() && !sections.contains_key(name.key()) {
                return Err(FormatError::new(
                    name.key(),
                    "$",
                    "required section is missing from the envelope",
                ));
            }
        }

        Ok(Self {
            discriminator,
            sections,
        })
    }

    pub fn section(&self, name: SectionName) -> Option<&str> {
        self.sections.get(name.key()).map(String::as_str)
    }

    pub fn to_json_string(&self) -> String {
        let data: JsonMap<String, JsonValue> = self
            .sections
            .iter()
            .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
            .collect();
        let mut map = JsonMap::new();
        map.insert(
            DISCRIMINATOR_KEY.to_string(),
            JsonValue::String(self.discriminator.clone()),
        );
        map.insert(PAYLOAD_KEY.to_string(), JsonValue::Object(data));
        JsonValue::Object(map).to_string()
    }
}
