use indexmap::IndexMap;

use crate::codec::{TaggedValue, parse_section};
use crate::container::{RawContainer, SectionName};
use crate::core_api::FormatError;
use crate::sections::{
    CompanyTable, FactionTable, GangTable, PlayerState, ServerTable, SettingsBag,
};

/// The typed, in-memory form of a whole save. Optional sections that were
/// empty strings in the envelope are `None`, not defaults, so they export
/// back as empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveModel {
    pub discriminator: String,
    pub player: PlayerState,
    pub servers: ServerTable,
    pub companies: CompanyTable,
    pub factions: FactionTable,
    pub aliases: Option<TaggedValue>,
    pub global_aliases: Option<TaggedValue>,
    pub stock_market: Option<TaggedValue>,
    pub settings: Option<SettingsBag>,
    pub version: Option<TaggedValue>,
    pub gangs: Option<GangTable>,
    pub last_export_bonus: Option<TaggedValue>,
    pub staneks_gift: Option<TaggedValue>,
    pub go: Option<TaggedValue>,
    /// Envelope sections this crate has no contract for, kept as raw text.
    pub passthrough: IndexMap<String, String>,
}

/// A parsed save together with the raw envelope it came from. Once built it
/// is never mutated; it is the baseline edits are diffed against.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSave {
    pub raw: RawContainer,
    pub model: SaveModel,
}

impl LoadedSave {
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let container = RawContainer::parse(raw)?;
        let model = SaveModel::from_container(&container)?;
        Ok(Self {
            raw: container,
            model,
        })
    }
}

/// Parses a JSON save envelope into its frozen baseline.
pub fn parse(raw: &str) -> Result<LoadedSave, FormatError> {
    LoadedSave::parse(raw)
}

impl SaveModel {
    pub fn from_container(raw: &RawContainer) -> Result<Self, FormatError> {
        let player = PlayerState::decode(&required(raw, SectionName::Player)?)?;
        let servers = ServerTable::decode(&required(raw, SectionName::AllServers)?)?;
        let companies = CompanyTable::decode(&required(raw, SectionName::Companies)?)?;
        let factions = FactionTable::decode(&required(raw, SectionName::Factions)?)?;

        let settings = optional(raw, SectionName::Settings)?
            .map(|v| SettingsBag::decode(&v))
            .transpose()?;
        let gangs = optional(raw, SectionName::AllGangs)?
            .map(|v| GangTable::decode(&v))
            .transpose()?;

        let passthrough = raw
            .sections
            .iter()
            .filter(|(key, _)| SectionName::from_key(key).is_none())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            discriminator: raw.discriminator.clone(),
            player,
            servers,
            companies,
            factions,
            aliases: optional(raw, SectionName::Aliases)?,
            global_aliases: optional(raw, SectionName::GlobalAliases)?,
            stock_market: optional(raw, SectionName::StockMarket)?,
            settings,
            version: optional(raw, SectionName::Version)?,
            gangs,
            last_export_bonus: optional(raw, SectionName::LastExportBonus)?,
            staneks_gift: optional(raw, SectionName::StaneksGift)?,
            go: optional(raw, SectionName::Go)?,
            passthrough,
        })
    }

    /// Encodes one section, or `None` when an optional section is absent.
    pub fn encode_section(&self, name: SectionName) -> Option<TaggedValue> {
        match name {
            SectionName::Player => Some(self.player.encode()),
            SectionName::AllServers => Some(self.servers.encode()),
            SectionName::Companies => Some(self.companies.encode()),
            SectionName::Factions => Some(self.factions.encode()),
            SectionName::Aliases => self.aliases.clone(),
            SectionName::GlobalAliases => self.global_aliases.clone(),
            SectionName::StockMarket => self.stock_market.clone(),
            SectionName::Settings => self.settings.as_ref().map(SettingsBag::encode),
            SectionName::Version => self.version.clone(),
            SectionName::AllGangs => self.gangs.as_ref().map(GangTable::encode),
            SectionName::LastExportBonus => self.last_export_bonus.clone(),
            SectionName::StaneksGift => self.staneks_gift.clone(),
            SectionName::Go => self.go.clone(),
        }
    }

    pub fn has_section(&self, name: SectionName) -> bool {
        match name {
            SectionName::Player
            | SectionName::AllServers
            | SectionName::Companies
            | SectionName::Factions => true,
            SectionName::Aliases => self.aliases.is_some(),
            SectionName::GlobalAliases => self.global_aliases.is_some(),
            SectionName::StockMarket => self.stock_market.is_some(),
            SectionName::Settings => self.settings.is_some(),
            SectionName::Version => self.version.is_some(),
            SectionName::AllGangs => self.gangs.is_some(),
            SectionName::LastExportBonus => self.last_export_bonus.is_some(),
            SectionName::StaneksGift => self.staneks_gift.is_some(),
            SectionName::Go => self.go.is_some(),
        }
    }

    /// Deep value equality of a single section between two models.
    pub fn section_eq(&self, other: &SaveModel, name: SectionName) -> bool {
        match name {
            SectionName::Player => self.player == other.player,
            SectionName::AllServers => self.servers == other.servers,
            SectionName::Companies => self.companies == other.companies,
            SectionName::Factions => self.factions == other.factions,
            SectionName::Aliases => self.aliases == other.aliases,
            SectionName::GlobalAliases => self.global_aliases == other.global_aliases,
            SectionName::StockMarket => self.stock_market == other.stock_market,
            SectionName::Settings => self.settings == other.settings,
            SectionName::Version => self.version == other.version,
            SectionName::AllGangs => self.gangs == other.gangs,
            SectionName::LastExportBonus => self.last_export_bonus == other.last_export_bonus,
            SectionName::StaneksGift => self.staneks_gift == other.staneks_gift,
            SectionName::Go => self.go == other.go,
        }
    }
}

fn required(raw: &RawContainer, name: SectionName) -> Result<TaggedValue, FormatError> {
    match raw.section(name) {
        Some(text) if !text.is_empty() => parse_section(text, name.key()),
        _ => Err(FormatError::new(
            name.key(),
            "$",
            "required section is empty",
        )),
    }
}

fn optional(raw: &RawContainer, name: SectionName) -> Result<Option<TaggedValue>, FormatError> {
    match raw.section(name) {
        None | Some("") => Ok(None),
        Some(text) => parse_section(text, name.key()).map(Some),
    }
}
