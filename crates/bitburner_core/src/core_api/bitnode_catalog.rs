use crate::stats::Skill;

use super::source_file_catalog::source_file;

/// The scenario whose level penalty grows with each completion.
pub const RECURSION_BITNODE: u32 = 12;
const RECURSION_DECAY: f64 = 1.02;

pub fn bitnode_name(bitnode: u32) -> Option<&'static str> {
    source_file(bitnode).map(|def| def.name)
}

/// Flat bonus some scenarios grant to the hacking level multiplier.
pub fn hacking_intrinsic(bitnode: u32) -> Option<f64> {
    match bitnode {
        5 => Some(1.1),
        13 => Some(1.05),
        _ => None,
    }
}

/// Scenario multiplier on skill levels. Intelligence is never scaled.
/// `completions` only matters in the recursion scenario.
pub fn skill_level_multiplier(bitnode: u32, skill: Skill, completions: u32) -> f64 {
    use Skill::*;

    if skill == Intelligence {
        return 1.0;
    }
    let combat = matches!(skill, Strength | Defense | Dexterity | Agility);
    match (bitnode, skill) {
        (2 | 3, Hacking) => 0.8,
        (6 | 7, Hacking) => 0.35,
        (9, Hacking) => 0.5,
        (9, _) => 0.45,
        (10, Hacking) => 0.35,
        (10, _) => 0.4,
        (13, Hacking) => 0.25,
        (13, _) if combat => 0.7,
        (14, Hacking) => 0.4,
        (14, Strength | Dexterity | Agility) => 0.5,
        (RECURSION_BITNODE, _) => 1.0 / RECURSION_DECAY.powi(completions.min(i32::MAX as u32) as i32),
        _ => 1.0,
    }
}
