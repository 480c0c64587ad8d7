use indexmap::IndexMap;

use crate::codec::{Fields, TaggedValue};
use crate::container::SectionName;
use crate::core_api::FormatError;

use super::{FieldReader, assemble};

/// A class-tagged record stored under a name key in one of the entity
/// tables. Typed fields are validated; everything else rides along.
pub trait EntityRecord: Sized + Clone + PartialEq {
    const SECTION: SectionName;

    fn decode(tag: &str, reader: &FieldReader<'_>) -> Result<Self, FormatError>;

    fn encode(&self) -> TaggedValue;
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityTable<R> {
    pub entries: IndexMap<String, R>,
}

impl<R> Default for EntityTable<R> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<R: EntityRecord> EntityTable<R> {
    pub fn decode(value: &TaggedValue) -> Result<Self, FormatError> {
        let section = R::SECTION.key();
        let table = FieldReader::plain_object(section, "$", value)?;

        let mut entries = IndexMap::with_capacity(table.key_order().len());
        for name in table.key_order() {
            let path = table.child_path(&name);
            let record = table.require(&name)?;
            let TaggedValue::ClassInstance { tag, fields } = record else {
                return Err(FormatError::new(
                    section,
                    path,
                    format!("expected a class instance, found {}", record.kind()),
                ));
            };
            let reader = FieldReader::new(section, format!("{path}.data"), fields);
            entries.insert(name, R::decode(tag, &reader)?);
        }
        Ok(Self { entries })
    }

    pub fn encode(&self) -> TaggedValue {
        TaggedValue::object(
            self.entries
                .iter()
                .map(|(name, record)| (name.clone(), record.encode()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&R> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut R> {
        self.entries.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type ServerTable = EntityTable<ServerRecord>;
pub type CompanyTable = EntityTable<CompanyRecord>;
pub type FactionTable = EntityTable<FactionRecord>;

/// The engine only accepts server RAM sizes that are powers of two. The
/// core does not enforce this on load; editors must check before writing.
pub fn is_valid_server_ram(ram: f64) -> bool {
    if !ram.is_finite() || ram < 1.0 || ram.fract() != 0.0 || ram > u64::MAX as f64 {
        return false;
    }
    (ram as u64).is_power_of_two()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerRecord {
    pub tag: String,
    pub hostname: String,
    pub max_ram: f64,
    pub purchased_by_player: bool,
    pub has_admin_rights: bool,
    extra: Fields,
    order: Vec<String>,
}

const SERVER_KEYS: [&str; 4] = ["hostname", "maxRam", "purchasedByPlayer", "hasAdminRights"];

impl EntityRecord for ServerRecord {
    const SECTION: SectionName = SectionName::AllServers;

    fn decode(tag: &str, r: &FieldReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            tag: tag.to_string(),
            hostname: r.string("hostname")?,
            max_ram: r.number("maxRam")?,
            purchased_by_player: r.boolean("purchasedByPlayer")?,
            has_admin_rights: r.boolean("hasAdminRights")?,
            extra: r.remainder(&SERVER_KEYS),
            order: r.key_order(),
        })
    }

    fn encode(&self) -> TaggedValue {
        let typed = vec![
            ("hostname", TaggedValue::string(self.hostname.clone())),
            ("maxRam", TaggedValue::number(self.max_ram)),
            ("purchasedByPlayer", TaggedValue::bool(self.purchased_by_player)),
            ("hasAdminRights", TaggedValue::bool(self.has_admin_rights)),
        ];
        TaggedValue::class(self.tag.clone(), assemble(&self.order, typed, &self.extra))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub tag: String,
    pub player_reputation: f64,
    pub favor: f64,
    extra: Fields,
    order: Vec<String>,
}

const COMPANY_KEYS: [&str; 2] = ["playerReputation", "favor"];

impl EntityRecord for CompanyRecord {
    const SECTION: SectionName = SectionName::Companies;

    fn decode(tag: &str, r: &FieldReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            tag: tag.to_string(),
            player_reputation: r.number("playerReputation")?,
            favor: r.number("favor")?,
            extra: r.remainder(&COMPANY_KEYS),
            order: r.key_order(),
        })
    }

    fn encode(&self) -> TaggedValue {
        let typed = vec![
            ("playerReputation", TaggedValue::number(self.player_reputation)),
            ("favor", TaggedValue::number(self.favor)),
        ];
        TaggedValue::class(self.tag.clone(), assemble(&self.order, typed, &self.extra))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactionRecord {
    pub tag: String,
    pub player_reputation: f64,
    pub favor: f64,
    pub is_member: Option<bool>,
    pub is_banned: Option<bool>,
    pub already_invited: Option<bool>,
    extra: Fields,
    order: Vec<String>,
}

const FACTION_KEYS: [&str; 5] = [
    "playerReputation",
    "favor",
    "isMember",
    "isBanned",
    "alreadyInvited",
];

impl EntityRecord for FactionRecord {
    const SECTION: SectionName = SectionName::Factions;

    fn decode(tag: &str, r: &FieldReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            tag: tag.to_string(),
            player_reputation: r.number("playerReputation")?,
            favor: r.number("favor")?,
            is_member: r.opt_boolean("isMember")?,
            is_banned: r.opt_boolean("isBanned")?,
            already_invited: r.opt_boolean("alreadyInvited")?,
            extra: r.remainder(&FACTION_KEYS),
            order: r.key_order(),
        })
    }

    fn encode(&self) -> TaggedValue {
        let mut typed = vec![
            ("playerReputation", TaggedValue::number(self.player_reputation)),
            ("favor", TaggedValue::number(self.favor)),
        ];
        for (key, flag) in [
            ("isMember", self.is_member),
            ("isBanned", self.is_banned),
            ("alreadyInvited", self.already_invited),
        ] {
            if let Some(flag) = flag {
                typed.push((key, TaggedValue::bool(flag)));
            }
        }
        TaggedValue::class(self.tag.clone(), assemble(&self.order, typed, &self.extra))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GangRecord {
    pub power: f64,
    pub territory: f64,
}

/// Gang standings. Unlike the other tables its records are plain objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GangTable {
    pub entries: IndexMap<String, GangRecord>,
}

impl GangTable {
    pub fn decode(value: &TaggedValue) -> Result<Self, FormatError> {
        let table = FieldReader::plain_object(SectionName::AllGangs.key(), "$", value)?;
        let mut entries = IndexMap::new();
        for name in table.key_order() {
            let gang = table.object(&name)?;
            gang.deny_unknown(&["power", "territory"])?;
            entries.insert(
                name,
                GangRecord {
                    power: gang.number("power")?,
                    territory: gang.number("territory")?,
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn encode(&self) -> TaggedValue {
        TaggedValue::object(
            self.entries
                .iter()
                .map(|(name, gang)| {
                    (
                        name.clone(),
                        TaggedValue::object(Fields::from([
                            ("power".to_string(), TaggedValue::number(gang.power)),
                            ("territory".to_string(), TaggedValue::number(gang.territory)),
                        ])),
                    )
                })
                .collect(),
        )
    }
}
