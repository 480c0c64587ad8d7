mod common;

use bitburner_core::core_api::bitnode_catalog::skill_level_multiplier;
use bitburner_core::core_api::{AugmentationCatalog, HealthField, HealthRecord, SkillRecord};
use bitburner_core::derived::{
    compute_health, compute_levels, health_for_defense, recalculate, skill_level,
};
use bitburner_core::model::SaveModel;
use bitburner_core::parse;
use bitburner_core::sections::HealthPool;
use bitburner_core::stats::{MultiplierField, Skill};
use common::{SaveBuilder, augmentations, source_files};
use serde_json::json;

fn model(builder: SaveBuilder) -> SaveModel {
    parse(&builder.build()).unwrap().model
}

fn level_of(model: &SaveModel, skill: Skill) -> SkillRecord {
    compute_levels(model, &AugmentationCatalog::builtin())
        .into_iter()
        .find(|r| r.skill == skill)
        .unwrap()
}

fn health_of(model: &SaveModel, field: HealthField) -> HealthRecord {
    compute_health(model, &AugmentationCatalog::builtin())
        .into_iter()
        .find(|r| r.field == field)
        .unwrap()
}

#[test]
fn skill_level_formula() {
    assert_eq!(skill_level(0.0, 1.0), 1.0);
    assert_eq!(skill_level(1000.0, 1.0), 34.0);
    assert_eq!(skill_level(10_000.0, 1.0), 96.0);
    assert_eq!(skill_level(100_000.0, 1.0), 168.0);
    assert_eq!(skill_level(10_000.0, 1.16), 111.0);
    assert_eq!(skill_level(1000.0, 0.0), 1.0);
    assert_eq!(skill_level(-1000.0, 1.0), 1.0);
}

#[test]
fn levels_use_calculated_multipliers() {
    let m = model(SaveBuilder::new().player(|p| {
        p["exp"]["hacking"] = json!(10_000);
        p["sourceFiles"] = source_files(&[(1, 1)]);
    }));
    let hacking = level_of(&m, Skill::Hacking);
    assert_eq!(hacking.experience, 10_000.0);
    assert_eq!(hacking.saved, 10.0);
    assert_eq!(hacking.calculated, 111.0);
    assert_eq!(hacking.breakdown[0].label, MultiplierField::Hacking.label());
}

#[test]
fn scenario_level_multipliers() {
    assert_eq!(skill_level_multiplier(2, Skill::Hacking, 0), 0.8);
    assert_eq!(skill_level_multiplier(2, Skill::Strength, 0), 1.0);
    assert_eq!(skill_level_multiplier(7, Skill::Hacking, 0), 0.35);
    assert_eq!(skill_level_multiplier(9, Skill::Charisma, 0), 0.45);
    assert_eq!(skill_level_multiplier(10, Skill::Agility, 0), 0.4);
    assert_eq!(skill_level_multiplier(13, Skill::Defense, 0), 0.7);
    assert_eq!(skill_level_multiplier(13, Skill::Charisma, 0), 1.0);
    assert_eq!(skill_level_multiplier(14, Skill::Defense, 0), 1.0);
    assert_eq!(skill_level_multiplier(14, Skill::Dexterity, 0), 0.5);
    assert_eq!(skill_level_multiplier(9, Skill::Intelligence, 0), 1.0);
    assert_eq!(skill_level_multiplier(12, Skill::Hacking, 0), 1.0);
    assert!((skill_level_multiplier(12, Skill::Hacking, 3) - 1.0 / 1.02f64.powi(3)).abs() < 1e-15);
    assert_eq!(skill_level_multiplier(12, Skill::Intelligence, 3), 1.0);
}

#[test]
fn scenario_penalty_lowers_levels() {
    let m = model(SaveBuilder::new().player(|p| {
        p["bitNodeN"] = json!(2);
        p["exp"]["hacking"] = json!(10_000);
    }));
    let hacking = level_of(&m, Skill::Hacking);
    assert_eq!(hacking.calculated, 77.0);
    assert_eq!(hacking.breakdown.last().unwrap().factor, 0.8);
}

#[test]
fn recursion_penalty_uses_completion_count() {
    let m = model(SaveBuilder::new().player(|p| {
        p["bitNodeN"] = json!(12);
        p["sourceFiles"] = source_files(&[(12, 3)]);
        p["exp"]["hacking"] = json!(10_000);
    }));
    assert_eq!(level_of(&m, Skill::Hacking).calculated, 90.0);
}

#[test]
fn intelligence_ignores_multipliers() {
    let m = model(SaveBuilder::new().player(|p| {
        p["bitNodeN"] = json!(9);
        p["sourceFiles"] = source_files(&[(1, 3)]);
        p["exp"]["intelligence"] = json!(10_000);
    }));
    let intelligence = level_of(&m, Skill::Intelligence);
    assert_eq!(intelligence.calculated, 96.0);
    assert!(intelligence.breakdown.is_empty());
}

#[test]
fn augmentations_raise_combat_levels() {
    let m = model(SaveBuilder::new().player(|p| {
        p["augmentations"] = augmentations(&[("Combat Rib I", 1)]);
        p["exp"]["strength"] = json!(1000);
    }));
    assert_eq!(level_of(&m, Skill::Strength).calculated, 38.0);
}

#[test]
fn health_ratio_is_preserved() {
    let m = model(SaveBuilder::new().player(|p| {
        p["hp"] = json!({ "current": 50, "max": 100 });
        p["skills"]["defense"] = json!(1100);
    }));
    assert_eq!(health_of(&m, HealthField::Max).calculated, 120.0);
    assert_eq!(health_of(&m, HealthField::Current).calculated, 60.0);
    assert_eq!(health_of(&m, HealthField::Current).saved, 50.0);
}

#[test]
fn health_uses_the_higher_defense_level() {
    let m = model(SaveBuilder::new().player(|p| {
        p["skills"]["defense"] = json!(1);
        p["exp"]["defense"] = json!(100_000);
    }));
    // Recomputed defense 168 beats the stale saved level.
    assert_eq!(health_of(&m, HealthField::Max).calculated, 26.0);
}

#[test]
fn health_ratio_defaults_to_full_without_a_max() {
    let pool = health_for_defense(
        100.0,
        HealthPool {
            current: 5.0,
            max: 0.0,
        },
    );
    assert_eq!(pool, HealthPool { current: 20.0, max: 20.0 });

    let clamped = health_for_defense(
        100.0,
        HealthPool {
            current: 500.0,
            max: 10.0,
        },
    );
    assert_eq!(clamped.current, 20.0);

    let negative = health_for_defense(
        100.0,
        HealthPool {
            current: -3.0,
            max: 10.0,
        },
    );
    assert_eq!(negative.current, 0.0);
}

#[test]
fn recalculate_writes_derived_values_back() {
    let original = model(SaveBuilder::new().player(|p| {
        p["sourceFiles"] = source_files(&[(1, 1)]);
        p["exp"]["hacking"] = json!(10_000);
        p["hp"] = json!({ "current": 50, "max": 100 });
        p["skills"]["defense"] = json!(1100);
    }));
    let next = recalculate(&original, &AugmentationCatalog::builtin());

    assert!((next.player.mults.get(MultiplierField::Hacking) - 1.16).abs() < 1e-12);
    assert_eq!(next.player.skills.get(Skill::Hacking), 111.0);
    assert_eq!(next.player.hp, HealthPool { current: 60.0, max: 120.0 });
    // The saved defense level is higher than the calculated one and backs
    // the health values, so it stays.
    assert_eq!(next.player.skills.get(Skill::Defense), 1100.0);
    // The input model is untouched.
    assert_eq!(original.player.skills.get(Skill::Hacking), 10.0);
}

#[test]
fn recalculate_is_idempotent() {
    let catalog = AugmentationCatalog::builtin();
    let original = model(SaveBuilder::new().player(|p| {
        p["sourceFiles"] = source_files(&[(1, 1)]);
        p["exp"]["hacking"] = json!(10_000);
        p["exp"]["defense"] = json!(500);
        p["hp"] = json!({ "current": 50, "max": 100 });
        p["skills"]["defense"] = json!(1100);
    }));
    let once = recalculate(&original, &catalog);
    let twice = recalculate(&once, &catalog);

    assert_eq!(twice.player.hp, HealthPool { current: 60.0, max: 120.0 });
    assert_eq!(twice.player.skills, once.player.skills);
    assert_eq!(twice.player.mults, once.player.mults);
    assert_eq!(twice.player.hp, once.player.hp);
}
