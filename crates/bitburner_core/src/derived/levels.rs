use crate::core_api::bitnode_catalog::{RECURSION_BITNODE, skill_level_multiplier};
use crate::core_api::{
    AugmentationCatalog, BreakdownEntry, HealthField, HealthRecord, SkillRecord,
};
use crate::model::SaveModel;
use crate::sections::HealthPool;
use crate::stats::Skill;

use super::multipliers::compute_multiplier;

/// `max(1, floor(mult * (32 ln(exp + 534.6) - 200)))`
pub fn skill_level(exp: f64, mult: f64) -> f64 {
    let level = (mult * (32.0 * (exp + 534.6).ln() - 200.0)).floor();
    // NaN from a negative log argument also lands on 1.
    level.max(1.0)
}

/// Recomputes the health pool for a defense level, keeping the saved
/// current/max ratio.
pub fn health_for_defense(defense: f64, saved: HealthPool) -> HealthPool {
    let max = (10.0 + defense / 10.0).floor();
    let ratio = saved_ratio(saved);
    HealthPool {
        current: (max * ratio).round(),
        max,
    }
}

fn saved_ratio(saved: HealthPool) -> f64 {
    if saved.max <= 0.0 {
        1.0
    } else {
        (saved.current / saved.max).clamp(0.0, 1.0)
    }
}

pub fn compute_levels(model: &SaveModel, catalog: &AugmentationCatalog) -> Vec<SkillRecord> {
    Skill::ALL
        .into_iter()
        .map(|skill| skill_record(model, catalog, skill))
        .collect()
}

pub fn compute_level(model: &SaveModel, catalog: &AugmentationCatalog, skill: Skill) -> SkillRecord {
    skill_record(model, catalog, skill)
}

pub fn compute_health(model: &SaveModel, catalog: &AugmentationCatalog) -> Vec<HealthRecord> {
    let player = &model.player;
    let recomputed = skill_record(model, catalog, Skill::Defense).calculated;
    let defense = recomputed.max(player.skills.get(Skill::Defense));
    let pool = health_for_defense(defense, player.hp);

    vec![
        HealthRecord {
            field: HealthField::Current,
            saved: player.hp.current,
            calculated: pool.current,
            breakdown: vec![
                BreakdownEntry::new("Max HP", pool.max),
                BreakdownEntry::new("Saved ratio", saved_ratio(player.hp)),
            ],
        },
        HealthRecord {
            field: HealthField::Max,
            saved: player.hp.max,
            calculated: pool.max,
            breakdown: vec![BreakdownEntry::new("Defense level", defense)],
        },
    ]
}

fn skill_record(model: &SaveModel, catalog: &AugmentationCatalog, skill: Skill) -> SkillRecord {
    let player = &model.player;
    let experience = player.exp.get(skill);
    let mut breakdown = Vec::new();

    let mult = match skill.multiplier_field() {
        Some(field) => {
            let value = compute_multiplier(model, catalog, field).calculated_value;
            if value != 1.0 {
                breakdown.push(BreakdownEntry::new(field.label(), value));
            }
            let scenario = skill_level_multiplier(
                player.bit_node,
                skill,
                player.source_files.level(RECURSION_BITNODE),
            );
            if scenario != 1.0 {
                breakdown.push(BreakdownEntry::new(
                    format!("BitNode-{} level multiplier", player.bit_node),
                    scenario,
                ));
            }
            value * scenario
        }
        None => 1.0,
    };

    SkillRecord {
        skill,
        experience,
        saved: player.skills.get(skill),
        calculated: skill_level(experience, mult),
        breakdown,
    }
}
