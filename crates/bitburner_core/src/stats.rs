use serde::{Deserialize, Serialize};

pub const SKILL_COUNT: usize = 7;
pub const MULTIPLIER_FIELD_COUNT: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Hacking,
    Strength,
    Defense,
    Dexterity,
    Agility,
    Charisma,
    Intelligence,
}

impl Skill {
    pub const ALL: [Skill; SKILL_COUNT] = [
        Self::Hacking,
        Self::Strength,
        Self::Defense,
        Self::Dexterity,
        Self::Agility,
        Self::Charisma,
        Self::Intelligence,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Hacking => "hacking",
            Self::Strength => "strength",
            Self::Defense => "defense",
            Self::Dexterity => "dexterity",
            Self::Agility => "agility",
            Self::Charisma => "charisma",
            Self::Intelligence => "intelligence",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|skill| skill.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hacking => "Hacking",
            Self::Strength => "Strength",
            Self::Defense => "Defense",
            Self::Dexterity => "Dexterity",
            Self::Agility => "Agility",
            Self::Charisma => "Charisma",
            Self::Intelligence => "Intelligence",
        }
    }

    /// Level multiplier field feeding this skill. Intelligence has none.
    pub fn multiplier_field(self) -> Option<MultiplierField> {
        match self {
            Self::Hacking => Some(MultiplierField::Hacking),
            Self::Strength => Some(MultiplierField::Strength),
            Self::Defense => Some(MultiplierField::Defense),
            Self::Dexterity => Some(MultiplierField::Dexterity),
            Self::Agility => Some(MultiplierField::Agility),
            Self::Charisma => Some(MultiplierField::Charisma),
            Self::Intelligence => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierField {
    HackingChance,
    HackingSpeed,
    HackingMoney,
    HackingGrow,
    Hacking,
    HackingExp,
    Strength,
    StrengthExp,
    Defense,
    DefenseExp,
    Dexterity,
    DexterityExp,
    Agility,
    AgilityExp,
    Charisma,
    CharismaExp,
    HacknetNodeMoney,
    HacknetNodePurchaseCost,
    HacknetNodeRamCost,
    HacknetNodeCoreCost,
    HacknetNodeLevelCost,
    CompanyRep,
    FactionRep,
    WorkMoney,
    CrimeSuccess,
    CrimeMoney,
    BladeburnerMaxStamina,
    BladeburnerStaminaGain,
    BladeburnerAnalysis,
    BladeburnerSuccessChance,
}

#[rustfmt::skip]
const FIELD_NAMES: [(MultiplierField, &str, &str); MULTIPLIER_FIELD_COUNT] = [
    (MultiplierField::HackingChance,            "hacking_chance",             "Hacking Chance"),
    (MultiplierField::HackingSpeed,             "hacking_speed",              "Hacking Speed"),
    (MultiplierField::HackingMoney,             "hacking_money",              "Hacking Money"),
    (MultiplierField::HackingGrow,              "hacking_grow",               "Hacking Growth"),
    (MultiplierField::Hacking,                  "hacking",                    "Hacking Level"),
    (MultiplierField::HackingExp,               "hacking_exp",                "Hacking Experience"),
    (MultiplierField::Strength,                 "strength",                   "Strength Level"),
    (MultiplierField::StrengthExp,              "strength_exp",               "Strength Experience"),
    (MultiplierField::Defense,                  "defense",                    "Defense Level"),
    (MultiplierField::DefenseExp,               "defense_exp",                "Defense Experience"),
    (MultiplierField::Dexterity,                "dexterity",                  "Dexterity Level"),
    (MultiplierField::DexterityExp,             "dexterity_exp",              "Dexterity Experience"),
    (MultiplierField::Agility,                  "agility",                    "Agility Level"),
    (MultiplierField::AgilityExp,               "agility_exp",                "Agility Experience"),
    (MultiplierField::Charisma,                 "charisma",                   "Charisma Level"),
    (MultiplierField::CharismaExp,              "charisma_exp",               "Charisma Experience"),
    (MultiplierField::HacknetNodeMoney,         "hacknet_node_money",         "Hacknet Production"),
    (MultiplierField::HacknetNodePurchaseCost,  "hacknet_node_purchase_cost", "Hacknet Purchase Cost"),
    (MultiplierField::HacknetNodeRamCost,       "hacknet_node_ram_cost",      "Hacknet RAM Cost"),
    (MultiplierField::HacknetNodeCoreCost,      "hacknet_node_core_cost",     "Hacknet Core Cost"),
    (MultiplierField::HacknetNodeLevelCost,     "hacknet_node_level_cost",    "Hacknet Level Cost"),
    (MultiplierField::CompanyRep,               "company_rep",                "Company Reputation"),
    (MultiplierField::FactionRep,               "faction_rep",                "Faction Reputation"),
    (MultiplierField::WorkMoney,                "work_money",                 "Work Money"),
    (MultiplierField::CrimeSuccess,             "crime_success",              "Crime Success"),
    (MultiplierField::CrimeMoney,               "crime_money",                "Crime Money"),
    (MultiplierField::BladeburnerMaxStamina,    "bladeburner_max_stamina",    "Bladeburner Max Stamina"),
    (MultiplierField::BladeburnerStaminaGain,   "bladeburner_stamina_gain",   "Bladeburner Stamina Gain"),
    (MultiplierField::BladeburnerAnalysis,      "bladeburner_analysis",       "Bladeburner Analysis"),
    (MultiplierField::BladeburnerSuccessChance, "bladeburner_success_chance", "Bladeburner Success Chance"),
];

impl MultiplierField {
    pub fn all() -> impl Iterator<Item = MultiplierField> {
        FIELD_NAMES.iter().map(|(field, _, _)| *field)
    }

    pub fn key(self) -> &'static str {
        FIELD_NAMES[self.index()].1
    }

    pub fn label(self) -> &'static str {
        FIELD_NAMES[self.index()].2
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FIELD_NAMES
            .iter()
            .find(|(_, k, _)| *k == key)
            .map(|(field, _, _)| *field)
    }

    /// Cost fields shrink when the player gets stronger, so bonuses apply
    /// to them as reciprocals.
    pub fn is_cost(self) -> bool {
        matches!(
            self,
            Self::HacknetNodePurchaseCost
                | Self::HacknetNodeRamCost
                | Self::HacknetNodeCoreCost
                | Self::HacknetNodeLevelCost
        )
    }

    pub fn is_bladeburner(self) -> bool {
        matches!(
            self,
            Self::BladeburnerMaxStamina
                | Self::BladeburnerStaminaGain
                | Self::BladeburnerAnalysis
                | Self::BladeburnerSuccessChance
        )
    }

    pub fn exploit_eligible(self) -> bool {
        !self.is_bladeburner()
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkillSet {
    values: [f64; SKILL_COUNT],
}

impl SkillSet {
    pub fn get(&self, skill: Skill) -> f64 {
        self.values[skill.index()]
    }

    pub fn set(&mut self, skill: Skill, value: f64) {
        self.values[skill.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Skill, f64)> + '_ {
        Skill::ALL.into_iter().map(|skill| (skill, self.get(skill)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplierSet {
    values: [f64; MULTIPLIER_FIELD_COUNT],
}

impl Default for MultiplierSet {
    fn default() -> Self {
        Self {
            values: [1.0; MULTIPLIER_FIELD_COUNT],
        }
    }
}

impl MultiplierSet {
    pub fn get(&self, field: MultiplierField) -> f64 {
        self.values[field.index()]
    }

    pub fn set(&mut self, field: MultiplierField, value: f64) {
        self.values[field.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (MultiplierField, f64)> + '_ {
        MultiplierField::all().map(|field| (field, self.get(field)))
    }
}
