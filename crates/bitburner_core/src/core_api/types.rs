use serde::{Deserialize, Serialize};

use crate::stats::{MultiplierField, Skill};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakdownEntry {
    pub label: String,
    pub factor: f64,
}

impl BreakdownEntry {
    pub fn new(label: impl Into<String>, factor: f64) -> Self {
        Self {
            label: label.into(),
            factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiplierRecord {
    pub field: MultiplierField,
    pub saved_value: f64,
    pub calculated_value: f64,
    pub breakdown: Vec<BreakdownEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillRecord {
    pub skill: Skill,
    pub experience: f64,
    pub saved: f64,
    pub calculated: f64,
    pub breakdown: Vec<BreakdownEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthField {
    Current,
    Max,
}

impl HealthField {
    pub fn key(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Max => "max",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthRecord {
    pub field: HealthField,
    pub saved: f64,
    pub calculated: f64,
    pub breakdown: Vec<BreakdownEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    None,
    Queued,
    Installed,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Queued => "queued",
            Self::Installed => "installed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "queued" => Some(Self::Queued),
            "installed" => Some(Self::Installed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AugmentationStatus {
    pub state: StatusKind,
    pub installed_level: Option<u32>,
    pub queued_level: Option<u32>,
}

impl AugmentationStatus {
    pub fn none() -> Self {
        Self {
            state: StatusKind::None,
            installed_level: None,
            queued_level: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrerequisiteState {
    pub key: String,
    pub installed: bool,
    pub queued: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrerequisiteCheck {
    pub prerequisites: Vec<PrerequisiteState>,
    pub all_owned: bool,
    pub all_installed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepOutcome {
    pub passes: usize,
    pub converged: bool,
}
