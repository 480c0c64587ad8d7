use indexmap::IndexMap;

use crate::codec::{Fields, TaggedValue};
use crate::container::SectionName;
use crate::core_api::FormatError;
use crate::stats::{MultiplierField, MultiplierSet, Skill, SkillSet};

use super::{FieldReader, assemble, string_array, strings_at};

pub const PLAYER_TAG: &str = "PlayerObject";

const KEY_HP: &str = "hp";
const KEY_SKILLS: &str = "skills";
const KEY_EXP: &str = "exp";
const KEY_MULTS: &str = "mults";
const KEY_AUGMENTATIONS: &str = "augmentations";
const KEY_QUEUED: &str = "queuedAugmentations";
const KEY_SOURCE_FILES: &str = "sourceFiles";
const KEY_BIT_NODE: &str = "bitNodeN";
const KEY_EXPLOITS: &str = "exploits";
const KEY_JOBS: &str = "jobs";
const KEY_FACTIONS: &str = "factions";
const KEY_INVITATIONS: &str = "factionInvitations";
const KEY_PURCHASED_SERVERS: &str = "purchasedServers";
const KEY_MONEY: &str = "money";

const TYPED_KEYS: [&str; 14] = [
    KEY_HP,
    KEY_SKILLS,
    KEY_EXP,
    KEY_MULTS,
    KEY_AUGMENTATIONS,
    KEY_QUEUED,
    KEY_SOURCE_FILES,
    KEY_BIT_NODE,
    KEY_EXPLOITS,
    KEY_JOBS,
    KEY_FACTIONS,
    KEY_INVITATIONS,
    KEY_PURCHASED_SERVERS,
    KEY_MONEY,
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HealthPool {
    pub current: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedAugmentation {
    pub name: String,
    pub level: u32,
}

impl OwnedAugmentation {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

/// Source-file levels keyed by unlock id. Insertion order is the order the
/// unlocks were earned and survives edits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFileLevels {
    entries: Vec<(u32, u32)>,
}

impl SourceFileLevels {
    pub fn level(&self, id: u32) -> u32 {
        self.entries
            .iter()
            .find(|(n, _)| *n == id)
            .map(|(_, lvl)| *lvl)
            .unwrap_or(0)
    }

    pub fn set_level(&mut self, id: u32, level: u32) {
        if level == 0 {
            self.entries.retain(|(n, _)| *n != id);
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| *n == id) {
            Some(entry) => entry.1 = level,
            None => self.entries.push((id, level)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a list of strings was encoded at load time, so it is written back
/// the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListEncoding {
    #[default]
    Array,
    ItemList(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub tag: String,
    pub hp: HealthPool,
    pub skills: SkillSet,
    pub exp: SkillSet,
    pub mults: MultiplierSet,
    pub augmentations: Vec<OwnedAugmentation>,
    pub queued_augmentations: Vec<OwnedAugmentation>,
    pub source_files: SourceFileLevels,
    pub bit_node: u32,
    pub exploits: Vec<String>,
    pub exploits_encoding: ListEncoding,
    pub jobs: IndexMap<String, String>,
    pub factions: Vec<String>,
    pub faction_invitations: Vec<String>,
    pub purchased_servers: Vec<String>,
    pub money: Option<f64>,
    extra: Fields,
    order: Vec<String>,
}

impl PlayerState {
    pub fn decode(value: &TaggedValue) -> Result<Self, FormatError> {
        let section = SectionName::Player.key();
        let TaggedValue::ClassInstance { tag, fields } = value else {
            return Err(FormatError::new(
                section,
                "$",
                format!("expected a {PLAYER_TAG} instance, found {}", value.kind()),
            ));
        };
        if tag != PLAYER_TAG {
            return Err(FormatError::new(
                section,
                "$.ctor",
                format!("expected class {PLAYER_TAG:?}, found {tag:?}"),
            ));
        }

        let r = FieldReader::new(section, "$.data", fields);

        let hp = {
            let hp = r.object(KEY_HP)?;
            hp.deny_unknown(&["current", "max"])?;
            HealthPool {
                current: hp.number("current")?,
                max: hp.number("max")?,
            }
        };
        let skills = decode_skill_set(&r, KEY_SKILLS)?;
        let exp = decode_skill_set(&r, KEY_EXP)?;
        let mults = decode_multipliers(&r)?;
        let augmentations = decode_owned(&r, KEY_AUGMENTATIONS)?;
        let queued_augmentations = decode_owned(&r, KEY_QUEUED)?;
        let source_files = decode_source_files(&r)?;

        let bit_node = r.unsigned(KEY_BIT_NODE)?;
        if bit_node == 0 {
            return Err(r.error(KEY_BIT_NODE, "bitnode number must be positive"));
        }

        let (exploits, exploits_encoding) = decode_exploits(&r)?;
        let jobs = decode_jobs(&r)?;

        Ok(Self {
            tag: tag.clone(),
            hp,
            skills,
            exp,
            mults,
            augmentations,
            queued_augmentations,
            source_files,
            bit_node,
            exploits,
            exploits_encoding,
            jobs,
            factions: r.string_list(KEY_FACTIONS)?,
            faction_invitations: r.string_list(KEY_INVITATIONS)?,
            purchased_servers: r.string_list(KEY_PURCHASED_SERVERS)?,
            money: r.opt_number(KEY_MONEY)?,
            extra: r.remainder(&TYPED_KEYS),
            order: r.key_order(),
        })
    }

    pub fn encode(&self) -> TaggedValue {
        let mut typed = vec![
            (
                KEY_HP,
                TaggedValue::object(Fields::from([
                    ("current".to_string(), TaggedValue::number(self.hp.current)),
                    ("max".to_string(), TaggedValue::number(self.hp.max)),
                ])),
            ),
            (KEY_SKILLS, encode_skill_set(&self.skills)),
            (KEY_EXP, encode_skill_set(&self.exp)),
            (
                KEY_MULTS,
                TaggedValue::object(
                    self.mults
                        .iter()
                        .map(|(field, v)| (field.key().to_string(), TaggedValue::number(v)))
                        .collect(),
                ),
            ),
            (KEY_AUGMENTATIONS, encode_owned(&self.augmentations)),
            (KEY_QUEUED, encode_owned(&self.queued_augmentations)),
            (
                KEY_SOURCE_FILES,
                TaggedValue::pair_list(
                    self.source_files
                        .iter()
                        .map(|(id, lvl)| {
                            (TaggedValue::number(id.into()), TaggedValue::number(lvl.into()))
                        })
                        .collect(),
                ),
            ),
            (KEY_BIT_NODE, TaggedValue::number(self.bit_node.into())),
        ];

        if self.keeps(KEY_EXPLOITS, self.exploits.is_empty()) {
            let items: Vec<TaggedValue> =
                self.exploits.iter().cloned().map(TaggedValue::string).collect();
            let value = match &self.exploits_encoding {
                ListEncoding::Array => TaggedValue::array(items),
                ListEncoding::ItemList(tag) => TaggedValue::ItemList {
                    tag: tag.clone(),
                    items,
                },
            };
            typed.push((KEY_EXPLOITS, value));
        }
        if self.keeps(KEY_JOBS, self.jobs.is_empty()) {
            typed.push((
                KEY_JOBS,
                TaggedValue::object(
                    self.jobs
                        .iter()
                        .map(|(company, position)| {
                            (company.clone(), TaggedValue::string(position.clone()))
                        })
                        .collect(),
                ),
            ));
        }
        for (key, list) in [
            (KEY_FACTIONS, &self.factions),
            (KEY_INVITATIONS, &self.faction_invitations),
            (KEY_PURCHASED_SERVERS, &self.purchased_servers),
        ] {
            if self.keeps(key, list.is_empty()) {
                typed.push((key, string_array(list)));
            }
        }
        if let Some(money) = self.money {
            typed.push((KEY_MONEY, TaggedValue::number(money)));
        }

        TaggedValue::class(self.tag.clone(), assemble(&self.order, typed, &self.extra))
    }

    /// Untyped player fields preserved from the loaded save.
    pub fn extra_fields(&self) -> &Fields {
        &self.extra
    }

    // Optional lists are written back when they were present at load time
    // or have gained content since.
    fn keeps(&self, key: &str, is_empty: bool) -> bool {
        !is_empty || self.order.iter().any(|k| k == key)
    }
}

fn decode_skill_set(r: &FieldReader<'_>, key: &str) -> Result<SkillSet, FormatError> {
    let set = r.object(key)?;
    let allowed: Vec<&str> = Skill::ALL.iter().map(|s| s.key()).collect();
    set.deny_unknown(&allowed)?;
    let mut out = SkillSet::default();
    for skill in Skill::ALL {
        out.set(skill, set.number(skill.key())?);
    }
    Ok(out)
}

fn encode_skill_set(set: &SkillSet) -> TaggedValue {
    TaggedValue::object(
        set.iter()
            .map(|(skill, v)| (skill.key().to_string(), TaggedValue::number(v)))
            .collect(),
    )
}

fn decode_multipliers(r: &FieldReader<'_>) -> Result<MultiplierSet, FormatError> {
    let mults = r.object(KEY_MULTS)?;
    let allowed: Vec<&str> = MultiplierField::all().map(MultiplierField::key).collect();
    mults.deny_unknown(&allowed)?;
    let mut out = MultiplierSet::default();
    for field in MultiplierField::all() {
        out.set(field, mults.number(field.key())?);
    }
    Ok(out)
}

fn decode_owned(r: &FieldReader<'_>, key: &str) -> Result<Vec<OwnedAugmentation>, FormatError> {
    let value = r.require(key)?;
    let items = value
        .as_array()
        .ok_or_else(|| r.error(key, format!("expected an array, found {}", value.kind())))?;
    let list_path = r.child_path(key);
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let entry =
                FieldReader::plain_object(r.section(), format!("{list_path}[{index}]"), item)?;
            entry.deny_unknown(&["name", "level"])?;
            Ok(OwnedAugmentation {
                name: entry.string("name")?,
                level: entry.unsigned("level")?,
            })
        })
        .collect()
}

fn encode_owned(list: &[OwnedAugmentation]) -> TaggedValue {
    TaggedValue::array(
        list.iter()
            .map(|aug| {
                TaggedValue::object(Fields::from([
                    ("name".to_string(), TaggedValue::string(aug.name.clone())),
                    ("level".to_string(), TaggedValue::number(aug.level.into())),
                ]))
            })
            .collect(),
    )
}

fn decode_source_files(r: &FieldReader<'_>) -> Result<SourceFileLevels, FormatError> {
    let value = r.require(KEY_SOURCE_FILES)?;
    let TaggedValue::OrderedPairList { pairs, .. } = value else {
        return Err(r.error(
            KEY_SOURCE_FILES,
            format!("expected an ordered pair list, found {}", value.kind()),
        ));
    };
    let path = format!("{}.data", r.child_path(KEY_SOURCE_FILES));
    let mut entries = Vec::with_capacity(pairs.len());
    for (index, (id, level)) in pairs.iter().enumerate() {
        let id = id
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                FormatError::new(
                    r.section(),
                    format!("{path}[{index}][0]"),
                    "source-file id must be a positive integer",
                )
            })?;
        let level = level
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                FormatError::new(
                    r.section(),
                    format!("{path}[{index}][1]"),
                    "source-file level must be a non-negative integer",
                )
            })?;
        if entries.iter().any(|(n, _)| *n == id) {
            return Err(FormatError::new(
                r.section(),
                format!("{path}[{index}][0]"),
                format!("duplicate source-file id {id}"),
            ));
        }
        entries.push((id, level));
    }
    Ok(SourceFileLevels { entries })
}

fn decode_exploits(r: &FieldReader<'_>) -> Result<(Vec<String>, ListEncoding), FormatError> {
    let path = r.child_path(KEY_EXPLOITS);
    match r.get(KEY_EXPLOITS) {
        None => Ok((Vec::new(), ListEncoding::Array)),
        Some(TaggedValue::ItemList { tag, items }) => Ok((
            strings_at(r.section(), &format!("{path}.data"), items)?,
            ListEncoding::ItemList(tag.clone()),
        )),
        Some(value) => {
            let items = value.as_array().ok_or_else(|| {
                r.error(
                    KEY_EXPLOITS,
                    format!("expected an array or item list, found {}", value.kind()),
                )
            })?;
            Ok((strings_at(r.section(), &path, items)?, ListEncoding::Array))
        }
    }
}

fn decode_jobs(r: &FieldReader<'_>) -> Result<IndexMap<String, String>, FormatError> {
    if r.get(KEY_JOBS).is_none() {
        return Ok(IndexMap::new());
    }
    let jobs = r.object(KEY_JOBS)?;
    jobs.key_order()
        .into_iter()
        .map(|company| {
            let position = jobs.string(&company)?;
            Ok((company, position))
        })
        .collect()
}
