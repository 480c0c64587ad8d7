//! Static augmentation reference data and the name resolver.
//!
//! Saves store augmentations by display name, older saves by names the
//! engine has since renamed. `AugmentationCatalog::resolve` is the one place
//! that maps any of those spellings back to a definition; status lookup,
//! removal and multiplier lookup all go through it.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{CoreError, CoreErrorCode};
use crate::stats::MultiplierField;

pub const NEUROFLUX_KEY: &str = "NeuroFluxGovernor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AugmentationDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub multipliers: IndexMap<MultiplierField, f64>,
    #[serde(default)]
    pub repeatable: bool,
}

impl AugmentationDefinition {
    pub fn matches(&self, candidate: &str) -> bool {
        self.identity_names().any(|name| name == candidate)
    }

    pub fn multiplier(&self, field: MultiplierField) -> Option<f64> {
        self.multipliers.get(&field).copied()
    }

    fn identity_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str())
            .chain(std::iter::once(self.name.as_str()))
            .chain(self.aliases.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone)]
pub struct AugmentationCatalog {
    definitions: Vec<AugmentationDefinition>,
    by_name: HashMap<String, usize>,
}

impl Default for AugmentationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AugmentationCatalog {
    pub fn builtin() -> Self {
        Self::index(BUILTIN_AUGMENTATIONS.iter().map(BuiltinAugmentation::definition).collect())
    }

    /// Builds a catalog from caller-supplied definitions. Rejects duplicate
    /// identities, dangling prerequisites, prerequisite cycles and more than
    /// one repeatable definition.
    pub fn from_definitions(definitions: Vec<AugmentationDefinition>) -> Result<Self, CoreError> {
        let catalog = Self::index(definitions);
        catalog.validate()?;
        debug!(count = catalog.len(), "loaded augmentation catalog");
        Ok(catalog)
    }

    /// Loads a catalog from a JSON array of definitions.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let definitions: Vec<AugmentationDefinition> = serde_json::from_str(text).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Catalog,
                format!("failed to parse augmentation catalog: {e}"),
            )
        })?;
        Self::from_definitions(definitions)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AugmentationDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AugmentationDefinition> {
        self.definitions.iter().find(|def| def.key == key)
    }

    /// Maps a key, display name or legacy alias to its definition.
    pub fn resolve(&self, candidate: &str) -> Option<&AugmentationDefinition> {
        self.by_name
            .get(candidate)
            .and_then(|&index| self.definitions.get(index))
            .filter(|def| def.matches(candidate))
    }

    pub fn repeatable(&self) -> Option<&AugmentationDefinition> {
        self.definitions.iter().find(|def| def.repeatable)
    }

    fn index(definitions: Vec<AugmentationDefinition>) -> Self {
        let mut by_name = HashMap::new();
        for (index, def) in definitions.iter().enumerate() {
            for name in def.identity_names() {
                by_name.entry(name.to_string()).or_insert(index);
            }
        }
        Self {
            definitions,
            by_name,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        let catalog_error = |message: String| CoreError::new(CoreErrorCode::Catalog, message);

        for (index, def) in self.definitions.iter().enumerate() {
            for name in def.identity_names() {
                match self.by_name.get(name) {
                    Some(&owner) if owner != index => {
                        return Err(catalog_error(format!(
                            "augmentation name {name:?} is claimed by both {:?} and {:?}",
                            self.definitions[owner].key, def.key
                        )));
                    }
                    _ => {}
                }
            }
            for prerequisite in &def.prerequisites {
                if self.get(prerequisite).is_none() {
                    return Err(catalog_error(format!(
                        "augmentation {:?} requires unknown augmentation {prerequisite:?}",
                        def.key
                    )));
                }
            }
        }

        let repeatable = self.definitions.iter().filter(|d| d.repeatable).count();
        if repeatable > 1 {
            return Err(catalog_error(format!(
                "catalog declares {repeatable} repeatable augmentations, expected at most one"
            )));
        }

        if let Some(cycle) = self.find_prerequisite_cycle() {
            return Err(catalog_error(format!(
                "prerequisite cycle: {}",
                cycle.join(" -> ")
            )));
        }
        Ok(())
    }

    fn find_prerequisite_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            catalog: &AugmentationCatalog,
            index: usize,
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            marks[index] = Mark::InProgress;
            stack.push(index);
            for prerequisite in &catalog.definitions[index].prerequisites {
                let Some(next) = catalog.definitions.iter().position(|d| &d.key == prerequisite)
                else {
                    continue;
                };
                match marks[next] {
                    Mark::InProgress => {
                        let start = stack.iter().position(|&i| i == next).unwrap_or(0);
                        let mut cycle: Vec<String> = stack[start..]
                            .iter()
                            .map(|&i| catalog.definitions[i].key.clone())
                            .collect();
                        cycle.push(catalog.definitions[next].key.clone());
                        return Some(cycle);
                    }
                    Mark::Unvisited => {
                        if let Some(cycle) = visit(catalog, next, marks, stack) {
                            return Some(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }
            stack.pop();
            marks[index] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::Unvisited; self.definitions.len()];
        let mut stack = Vec::new();
        for index in 0..self.definitions.len() {
            if marks[index] == Mark::Unvisited {
                if let Some(cycle) = visit(self, index, &mut marks, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}

struct BuiltinAugmentation {
    key: &'static str,
    name: &'static str,
    aliases: &'static [&'static str],
    prerequisites: &'static [&'static str],
    multipliers: &'static [(MultiplierField, f64)],
    repeatable: bool,
}

impl BuiltinAugmentation {
    fn definition(&self) -> AugmentationDefinition {
        AugmentationDefinition {
            key: self.key.to_string(),
            name: self.name.to_string(),
            aliases: self.aliases.iter().map(|a| a.to_string()).collect(),
            prerequisites: self.prerequisites.iter().map(|p| p.to_string()).collect(),
            multipliers: self.multipliers.iter().copied().collect(),
            repeatable: self.repeatable,
        }
    }
}

use MultiplierField as F;

const NEUROFLUX_MULTIPLIERS: &[(MultiplierField, f64)] = &[
    (F::HackingChance, 1.01),
    (F::HackingSpeed, 1.01),
    (F::HackingMoney, 1.01),
    (F::HackingGrow, 1.01),
    (F::Hacking, 1.01),
    (F::HackingExp, 1.01),
    (F::Strength, 1.01),
    (F::StrengthExp, 1.01),
    (F::Defense, 1.01),
    (F::DefenseExp, 1.01),
    (F::Dexterity, 1.01),
    (F::DexterityExp, 1.01),
    (F::Agility, 1.01),
    (F::AgilityExp, 1.01),
    (F::Charisma, 1.01),
    (F::CharismaExp, 1.01),
    (F::HacknetNodeMoney, 1.01),
    (F::HacknetNodePurchaseCost, 0.99),
    (F::HacknetNodeRamCost, 0.99),
    (F::HacknetNodeCoreCost, 0.99),
    (F::HacknetNodeLevelCost, 0.99),
    (F::CompanyRep, 1.01),
    (F::FactionRep, 1.01),
    (F::WorkMoney, 1.01),
    (F::CrimeSuccess, 1.01),
    (F::CrimeMoney, 1.01),
];

#[rustfmt::skip]
const BUILTIN_AUGMENTATIONS: &[BuiltinAugmentation] = &[
    BuiltinAugmentation { key: NEUROFLUX_KEY, name: "NeuroFlux Governor", aliases: &["Neuroflux Governor"], prerequisites: &[], multipliers: NEUROFLUX_MULTIPLIERS, repeatable: true },

    // Combat
    BuiltinAugmentation { key: "Targeting1", name: "Augmented Targeting I", aliases: &[], prerequisites: &[], multipliers: &[(F::Dexterity, 1.1)], repeatable: false },
    BuiltinAugmentation { key: "Targeting2", name: "Augmented Targeting II", aliases: &[], prerequisites: &["Targeting1"], multipliers: &[(F::Dexterity, 1.2)], repeatable: false },
    BuiltinAugmentation { key: "Targeting3", name: "Augmented Targeting III", aliases: &[], prerequisites: &["Targeting2"], multipliers: &[(F::Dexterity, 1.3)], repeatable: false },
    BuiltinAugmentation { key: "CombatRib1", name: "Combat Rib I", aliases: &[], prerequisites: &[], multipliers: &[(F::Strength, 1.1), (F::Defense, 1.1)], repeatable: false },
    BuiltinAugmentation { key: "CombatRib2", name: "Combat Rib II", aliases: &[], prerequisites: &["CombatRib1"], multipliers: &[(F::Strength, 1.14), (F::Defense, 1.14)], repeatable: false },
    BuiltinAugmentation { key: "CombatRib3", name: "Combat Rib III", aliases: &[], prerequisites: &["CombatRib2"], multipliers: &[(F::Strength, 1.18), (F::Defense, 1.18)], repeatable: false },
    BuiltinAugmentation { key: "GrapheneBoneLacings", name: "Graphene Bone Lacings", aliases: &[], prerequisites: &[], multipliers: &[(F::Strength, 1.7), (F::Defense, 1.7)], repeatable: false },
    BuiltinAugmentation { key: "HemoRecirculator", name: "HemoRecirculator", aliases: &[], prerequisites: &[], multipliers: &[(F::Strength, 1.08), (F::Defense, 1.08), (F::Dexterity, 1.08), (F::Agility, 1.08)], repeatable: false },
    BuiltinAugmentation { key: "WiredReflexes", name: "Wired Reflexes", aliases: &[], prerequisites: &[], multipliers: &[(F::Agility, 1.05), (F::Dexterity, 1.05)], repeatable: false },

    // Hacking
    BuiltinAugmentation { key: "SynapticEnhancement", name: "Synaptic Enhancement Implant", aliases: &[], prerequisites: &[], multipliers: &[(F::HackingSpeed, 1.03)], repeatable: false },
    BuiltinAugmentation { key: "NeuralRetentionEnhancement", name: "Neural-Retention Enhancement", aliases: &["Neural Retention Enhancement"], prerequisites: &[], multipliers: &[(F::HackingExp, 1.25)], repeatable: false },
    BuiltinAugmentation { key: "BitWire", name: "BitWire", aliases: &[], prerequisites: &[], multipliers: &[(F::Hacking, 1.05)], repeatable: false },
    BuiltinAugmentation { key: "ArtificialBioNeuralNetwork", name: "Artificial Bio-neural Network Implant", aliases: &[], prerequisites: &[], multipliers: &[(F::HackingSpeed, 1.03), (F::HackingMoney, 1.15), (F::Hacking, 1.12)], repeatable: false },
    BuiltinAugmentation { key: "CranialSignalProcessorsG1", name: "Cranial Signal Processors - Gen I", aliases: &[], prerequisites: &[], multipliers: &[(F::HackingSpeed, 1.01), (F::Hacking, 1.05)], repeatable: false },
    BuiltinAugmentation { key: "CranialSignalProcessorsG2", name: "Cranial Signal Processors - Gen II", aliases: &[], prerequisites: &["CranialSignalProcessorsG1"], multipliers: &[(F::HackingChance, 1.05), (F::Hacking, 1.07)], repeatable: false },
    BuiltinAugmentation { key: "CranialSignalProcessorsG3", name: "Cranial Signal Processors - Gen III", aliases: &[], prerequisites: &["CranialSignalProcessorsG2"], multipliers: &[(F::HackingSpeed, 1.02), (F::HackingMoney, 1.15), (F::Hacking, 1.09)], repeatable: false },
    BuiltinAugmentation { key: "NeuralAccelerator", name: "Neural Accelerator", aliases: &[], prerequisites: &[], multipliers: &[(F::Hacking, 1.1), (F::HackingExp, 1.15), (F::HackingMoney, 1.2)], repeatable: false },

    // Hacknet
    BuiltinAugmentation { key: "HacknetNodeCPUUpload", name: "Hacknet Node CPU Architecture Neural-Upload", aliases: &["Hacknet Node CPU Architecture Neural Upload"], prerequisites: &[], multipliers: &[(F::HacknetNodeMoney, 1.15), (F::HacknetNodePurchaseCost, 0.85)], repeatable: false },
    BuiltinAugmentation { key: "HacknetNodeCacheUpload", name: "Hacknet Node Cache Architecture Neural-Upload", aliases: &["Hacknet Node Cache Architecture Neural Upload"], prerequisites: &[], multipliers: &[(F::HacknetNodeMoney, 1.1), (F::HacknetNodeLevelCost, 0.85)], repeatable: false },

    // Social
    BuiltinAugmentation { key: "SpeechProcessorImplant", name: "Speech Processor Implant", aliases: &[], prerequisites: &[], multipliers: &[(F::Charisma, 1.2)], repeatable: false },
    BuiltinAugmentation { key: "ADRPheromone1", name: "ADR-V1 Pheromone Gene", aliases: &[], prerequisites: &[], multipliers: &[(F::CompanyRep, 1.1), (F::FactionRep, 1.1)], repeatable: false },
    BuiltinAugmentation { key: "ADRPheromone2", name: "ADR-V2 Pheromone Gene", aliases: &[], prerequisites: &[], multipliers: &[(F::CompanyRep, 1.2), (F::FactionRep, 1.2)], repeatable: false },

    // Bladeburner
    BuiltinAugmentation { key: "EsperEyewear", name: "EsperTech Bladeburner Eyewear", aliases: &[], prerequisites: &[], multipliers: &[(F::BladeburnerSuccessChance, 1.03), (F::Dexterity, 1.05)], repeatable: false },

    // Special
    BuiltinAugmentation { key: "TheRedPill", name: "The Red Pill", aliases: &[], prerequisites: &[], multipliers: &[], repeatable: false },
];
