use crate::stats::MultiplierField;

/// How a source-file bonus percentage turns into a multiplier factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusKind {
    Additive,
    CostReduction,
}

impl BonusKind {
    pub fn factor(self, percent: f64) -> f64 {
        match self {
            Self::Additive => 1.0 + percent / 100.0,
            Self::CostReduction => 1.0 / (1.0 + percent / 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SourceFileDefinition {
    pub id: u32,
    pub name: &'static str,
    pub base_percent: f64,
    effects: &'static [(MultiplierField, BonusKind)],
}

/// Diminishing terms beyond this are below f64 resolution.
pub const MAX_STACKED_LEVELS: u32 = 64;

impl SourceFileDefinition {
    pub fn effects(&self) -> impl Iterator<Item = (MultiplierField, BonusKind)> + '_ {
        self.effects.iter().copied()
    }

    pub fn effect(&self, field: MultiplierField) -> Option<BonusKind> {
        self.effects
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, kind)| *kind)
    }

    /// `sum over i < level of base / 2^i`.
    pub fn percent(&self, level: u32) -> f64 {
        (0..level.min(MAX_STACKED_LEVELS))
            .map(|i| self.base_percent / 2f64.powi(i as i32))
            .sum()
    }

    /// Factor for `field` at `level`, or `None` when this file does not
    /// touch the field or is not owned.
    pub fn factor(&self, field: MultiplierField, level: u32) -> Option<f64> {
        if level == 0 {
            return None;
        }
        self.effect(field).map(|kind| kind.factor(self.percent(level)))
    }
}

pub fn source_file(id: u32) -> Option<&'static SourceFileDefinition> {
    SOURCE_FILES.iter().find(|def| def.id == id)
}

pub fn source_files() -> &'static [SourceFileDefinition] {
    SOURCE_FILES
}

use BonusKind::{Additive as A, CostReduction as C};
use MultiplierField as F;

const SF1_EFFECTS: &[(MultiplierField, BonusKind)] = &[
    (F::HackingChance, A),
    (F::HackingSpeed, A),
    (F::HackingMoney, A),
    (F::HackingGrow, A),
    (F::Hacking, A),
    (F::HackingExp, A),
    (F::Strength, A),
    (F::StrengthExp, A),
    (F::Defense, A),
    (F::DefenseExp, A),
    (F::Dexterity, A),
    (F::DexterityExp, A),
    (F::Agility, A),
    (F::AgilityExp, A),
    (F::Charisma, A),
    (F::CharismaExp, A),
    (F::HacknetNodeMoney, A),
    (F::HacknetNodePurchaseCost, C),
    (F::HacknetNodeRamCost, C),
    (F::HacknetNodeCoreCost, C),
    (F::HacknetNodeLevelCost, C),
    (F::CompanyRep, A),
    (F::FactionRep, A),
    (F::WorkMoney, A),
    (F::CrimeSuccess, A),
    (F::CrimeMoney, A),
];

const SF5_EFFECTS: &[(MultiplierField, BonusKind)] = &[
    (F::HackingChance, A),
    (F::HackingSpeed, A),
    (F::HackingMoney, A),
    (F::HackingGrow, A),
    (F::Hacking, A),
    (F::HackingExp, A),
];

const SF6_EFFECTS: &[(MultiplierField, BonusKind)] = &[
    (F::Strength, A),
    (F::StrengthExp, A),
    (F::Defense, A),
    (F::DefenseExp, A),
    (F::Dexterity, A),
    (F::DexterityExp, A),
    (F::Agility, A),
    (F::AgilityExp, A),
];

const SF7_EFFECTS: &[(MultiplierField, BonusKind)] = &[
    (F::BladeburnerMaxStamina, A),
    (F::BladeburnerStaminaGain, A),
    (F::BladeburnerAnalysis, A),
    (F::BladeburnerSuccessChance, A),
];

const SF9_EFFECTS: &[(MultiplierField, BonusKind)] = &[
    (F::HacknetNodeMoney, A),
    (F::HacknetNodePurchaseCost, C),
    (F::HacknetNodeRamCost, C),
    (F::HacknetNodeCoreCost, C),
    (F::HacknetNodeLevelCost, C),
];

#[rustfmt::skip]
const SOURCE_FILES: &[SourceFileDefinition] = &[
    SourceFileDefinition { id: 1,  name: "Source Genesis",          base_percent: 16.0, effects: SF1_EFFECTS },
    SourceFileDefinition { id: 2,  name: "Rise of the Underworld",  base_percent: 24.0, effects: &[(F::CrimeMoney, A), (F::CrimeSuccess, A), (F::Charisma, A)] },
    SourceFileDefinition { id: 3,  name: "Corporatocracy",          base_percent: 8.0,  effects: &[(F::Charisma, A), (F::CompanyRep, A)] },
    SourceFileDefinition { id: 4,  name: "The Singularity",         base_percent: 0.0,  effects: &[] },
    SourceFileDefinition { id: 5,  name: "Artificial Intelligence", base_percent: 8.0,  effects: SF5_EFFECTS },
    SourceFileDefinition { id: 6,  name: "Bladeburners",            base_percent: 8.0,  effects: SF6_EFFECTS },
    SourceFileDefinition { id: 7,  name: "Bladeburners 2079",       base_percent: 8.0,  effects: SF7_EFFECTS },
    SourceFileDefinition { id: 8,  name: "Ghost of Wall Street",    base_percent: 12.0, effects: &[(F::HackingGrow, A)] },
    SourceFileDefinition { id: 9,  name: "Hacktocracy",             base_percent: 12.0, effects: SF9_EFFECTS },
    SourceFileDefinition { id: 10, name: "Digital Carbon",          base_percent: 0.0,  effects: &[] },
    SourceFileDefinition { id: 11, name: "The Big Crash",           base_percent: 32.0, effects: &[(F::WorkMoney, A), (F::CompanyRep, A)] },
    SourceFileDefinition { id: 12, name: "The Recursion",           base_percent: 0.0,  effects: &[] },
    SourceFileDefinition { id: 13, name: "They're lunatics",        base_percent: 0.0,  effects: &[] },
    SourceFileDefinition { id: 14, name: "IPvGO Subnet Takeover",   base_percent: 0.0,  effects: &[] },
];
