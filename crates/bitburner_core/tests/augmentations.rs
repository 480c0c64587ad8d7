mod common;

use bitburner_core::augmentations::{
    DEFAULT_CONSISTENCY_PASS_LIMIT, MAX_QUEUED_REPEATABLE_LEVELS, apply_status,
    check_prerequisites, enforce_consistency, get_status, install_queued, set_repeatable_levels,
};
use bitburner_core::core_api::{
    AugmentationCatalog, AugmentationDefinition, CoreErrorCode, StatusKind,
};
use bitburner_core::model::SaveModel;
use bitburner_core::parse;
use bitburner_core::sections::OwnedAugmentation;
use common::{SaveBuilder, augmentations};
use proptest::prelude::*;

fn model_with(installed: &[(&str, u32)], queued: &[(&str, u32)]) -> SaveModel {
    let installed = augmentations(installed);
    let queued = augmentations(queued);
    parse(
        &SaveBuilder::new()
            .player(|p| {
                p["augmentations"] = installed;
                p["queuedAugmentations"] = queued;
            })
            .build(),
    )
    .unwrap()
    .model
}

fn names(list: &[OwnedAugmentation]) -> Vec<(&str, u32)> {
    list.iter().map(|a| (a.name.as_str(), a.level)).collect()
}

fn catalog() -> AugmentationCatalog {
    AugmentationCatalog::builtin()
}

fn definition(key: &str, prerequisites: &[&str]) -> AugmentationDefinition {
    AugmentationDefinition {
        key: key.to_string(),
        name: format!("{key} name"),
        aliases: Vec::new(),
        prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
        multipliers: Default::default(),
        repeatable: false,
    }
}

#[test]
fn status_is_none_for_unowned() {
    let m = model_with(&[], &[]);
    let status = get_status(&m, &catalog(), "Targeting1");
    assert_eq!(status.state, StatusKind::None);
    assert_eq!(status.installed_level, None);
}

#[test]
fn status_resolves_keys_names_and_aliases() {
    let m = model_with(&[("Neural Retention Enhancement", 1)], &[("Combat Rib I", 1)]);
    let c = catalog();
    for key in ["NeuralRetentionEnhancement", "Neural-Retention Enhancement", "Neural Retention Enhancement"] {
        assert_eq!(get_status(&m, &c, key).state, StatusKind::Installed, "{key}");
    }
    assert_eq!(get_status(&m, &c, "CombatRib1").state, StatusKind::Queued);
    assert_eq!(get_status(&m, &c, "No Such Augmentation").state, StatusKind::None);
}

#[test]
fn repeatable_status_reports_both_levels() {
    let m = model_with(
        &[("NeuroFlux Governor", 5)],
        &[("NeuroFlux Governor", 6), ("NeuroFlux Governor", 7), ("NeuroFlux Governor", 8)],
    );
    let status = get_status(&m, &catalog(), "NeuroFluxGovernor");
    assert_eq!(status.state, StatusKind::Installed);
    assert_eq!(status.installed_level, Some(5));
    assert_eq!(status.queued_level, Some(8));
}

#[test]
fn prerequisite_check_reports_each_prerequisite() {
    let m = model_with(&[("Augmented Targeting I", 1)], &[]);
    let c = catalog();
    let check = check_prerequisites(&m, &c, "Targeting2");
    assert!(check.all_installed);
    assert!(check.all_owned);
    assert_eq!(check.prerequisites.len(), 1);
    assert_eq!(check.prerequisites[0].key, "Targeting1");

    let check = check_prerequisites(&m, &c, "Targeting3");
    assert!(!check.all_owned);
    assert!(!check.all_installed);

    let queued = model_with(&[], &[("Augmented Targeting I", 1)]);
    let check = check_prerequisites(&queued, &c, "Targeting2");
    assert!(check.all_owned);
    assert!(!check.all_installed);
}

#[test]
fn install_without_prerequisite_is_rejected() {
    let m = model_with(&[], &[]);
    let next = apply_status(&m, &catalog(), "Targeting2", StatusKind::Installed);
    assert_ne!(get_status(&next, &catalog(), "Targeting2").state, StatusKind::Installed);
    assert_eq!(next, m);
}

#[test]
fn queue_requires_prerequisites_owned() {
    let c = catalog();
    let m = model_with(&[], &[]);
    assert_eq!(apply_status(&m, &c, "Targeting2", StatusKind::Queued), m);

    let queued_prereq = model_with(&[], &[("Augmented Targeting I", 1)]);
    let next = apply_status(&queued_prereq, &c, "Targeting2", StatusKind::Queued);
    assert_eq!(get_status(&next, &c, "Targeting2").state, StatusKind::Queued);
    assert_eq!(
        names(&next.player.queued_augmentations),
        vec![("Augmented Targeting I", 1), ("Augmented Targeting II", 1)]
    );
}

#[test]
fn apply_status_purges_aliases_and_writes_display_name() {
    let c = catalog();
    let m = model_with(
        &[("Neural Retention Enhancement", 1)],
        &[("NeuralRetentionEnhancement", 1)],
    );
    let next = apply_status(&m, &c, "NeuralRetentionEnhancement", StatusKind::Installed);
    assert_eq!(names(&next.player.augmentations), vec![("Neural-Retention Enhancement", 1)]);
    assert!(next.player.queued_augmentations.is_empty());

    let removed = apply_status(&next, &c, "Neural-Retention Enhancement", StatusKind::None);
    assert!(removed.player.augmentations.is_empty());
}

#[test]
fn unresolved_names_are_left_alone() {
    let c = catalog();
    let m = model_with(&[("Mystery Implant", 2)], &[("Another Mystery", 1)]);
    let next = apply_status(&m, &c, "BitWire", StatusKind::Installed);
    assert_eq!(
        names(&next.player.augmentations),
        vec![("Mystery Implant", 2), ("BitWire", 1)]
    );
    assert_eq!(names(&next.player.queued_augmentations), vec![("Another Mystery", 1)]);
    let (swept, _) = enforce_consistency(&next, &c, DEFAULT_CONSISTENCY_PASS_LIMIT);
    assert_eq!(swept, next);
    assert_eq!(apply_status(&m, &c, "Mystery Implant", StatusKind::None), m);
}

#[test]
fn cascading_demotion_removes_dependents() {
    let c = catalog();
    let m = model_with(&[], &[]);
    let m = apply_status(&m, &c, "Targeting1", StatusKind::Installed);
    let m = apply_status(&m, &c, "Targeting2", StatusKind::Installed);
    let m = apply_status(&m, &c, "Targeting3", StatusKind::Installed);
    assert_eq!(get_status(&m, &c, "Targeting3").state, StatusKind::Installed);

    let m = apply_status(&m, &c, "Targeting1", StatusKind::None);
    let (swept, outcome) = enforce_consistency(&m, &c, DEFAULT_CONSISTENCY_PASS_LIMIT);

    assert_eq!(get_status(&swept, &c, "Targeting2").state, StatusKind::None);
    assert_eq!(get_status(&swept, &c, "Targeting3").state, StatusKind::None);
    assert!(outcome.converged);
    assert!(outcome.passes >= 2);
}

#[test]
fn demotion_requeues_when_prerequisites_are_still_owned() {
    let c = catalog();
    let m = model_with(&[("Augmented Targeting II", 1)], &[("Augmented Targeting I", 1)]);
    let (swept, outcome) = enforce_consistency(&m, &c, DEFAULT_CONSISTENCY_PASS_LIMIT);
    assert_eq!(get_status(&swept, &c, "Targeting2").state, StatusKind::Queued);
    assert_eq!(get_status(&swept, &c, "Targeting1").state, StatusKind::Queued);
    assert!(swept.player.augmentations.is_empty());
    assert!(outcome.converged);
}

#[test]
fn consistent_models_converge_in_one_pass() {
    let c = catalog();
    let m = model_with(&[("Augmented Targeting I", 1)], &[("Augmented Targeting II", 1)]);
    let (swept, outcome) = enforce_consistency(&m, &c, DEFAULT_CONSISTENCY_PASS_LIMIT);
    assert_eq!(swept, m);
    assert_eq!(outcome.passes, 1);
    assert!(outcome.converged);
}

#[test]
fn sweep_reports_when_it_hits_the_cap() {
    let c = catalog();
    let m = model_with(
        &[
            ("Augmented Targeting III", 1),
            ("Augmented Targeting II", 1),
        ],
        &[],
    );
    let (_, outcome) = enforce_consistency(&m, &c, 1);
    assert_eq!(outcome.passes, 1);
    assert!(!outcome.converged);
}

#[test]
fn repeatable_install_collapses_to_highest_level() {
    let c = catalog();
    let m = model_with(
        &[("NeuroFlux Governor", 3), ("NeuroFlux Governor", 5)],
        &[("NeuroFlux Governor", 6), ("Neuroflux Governor", 7)],
    );
    let next = apply_status(&m, &c, "NeuroFluxGovernor", StatusKind::Installed);
    assert_eq!(names(&next.player.augmentations), vec![("NeuroFlux Governor", 7)]);
    assert!(next.player.queued_augmentations.is_empty());

    let fresh = apply_status(&model_with(&[], &[]), &c, "NeuroFluxGovernor", StatusKind::Installed);
    assert_eq!(names(&fresh.player.augmentations), vec![("NeuroFlux Governor", 1)]);
}

#[test]
fn repeatable_queue_appends_the_next_level() {
    let c = catalog();
    let m = model_with(
        &[("NeuroFlux Governor", 5)],
        &[("NeuroFlux Governor", 6), ("NeuroFlux Governor", 4)],
    );
    let next = apply_status(&m, &c, "NeuroFluxGovernor", StatusKind::Queued);
    assert_eq!(names(&next.player.augmentations), vec![("NeuroFlux Governor", 5)]);
    assert_eq!(
        names(&next.player.queued_augmentations),
        vec![("NeuroFlux Governor", 6), ("NeuroFlux Governor", 7)]
    );
    let status = get_status(&next, &c, "NeuroFluxGovernor");
    assert_eq!(status.queued_level, Some(7));
    assert!(status.queued_level >= status.installed_level);
}

#[test]
fn repeatable_none_purges_everything() {
    let c = catalog();
    let m = model_with(&[("NeuroFlux Governor", 5)], &[("NeuroFlux Governor", 6)]);
    let next = apply_status(&m, &c, "NeuroFluxGovernor", StatusKind::None);
    assert!(next.player.augmentations.is_empty());
    assert!(next.player.queued_augmentations.is_empty());
}

#[test]
fn repeatable_levels_are_rewritten_directly() {
    let c = catalog();
    let m = model_with(&[("NeuroFlux Governor", 2)], &[("NeuroFlux Governor", 3)]);
    let next = set_repeatable_levels(&m, &c, 10, 12);
    assert_eq!(names(&next.player.augmentations), vec![("NeuroFlux Governor", 10)]);
    assert_eq!(
        names(&next.player.queued_augmentations),
        vec![("NeuroFlux Governor", 11), ("NeuroFlux Governor", 12)]
    );

    let queue_only = set_repeatable_levels(&m, &c, 0, 2);
    assert!(queue_only.player.augmentations.is_empty());
    assert_eq!(queue_only.player.queued_augmentations.len(), 2);

    let cleared = set_repeatable_levels(&m, &c, 0, 0);
    assert!(cleared.player.augmentations.is_empty());
    assert!(cleared.player.queued_augmentations.is_empty());
}

#[test]
fn repeatable_levels_at_the_top_of_the_range() {
    let c = catalog();
    let m = model_with(&[], &[]);
    let top = set_repeatable_levels(&m, &c, u32::MAX, u32::MAX);
    assert_eq!(
        names(&top.player.augmentations),
        vec![("NeuroFlux Governor", u32::MAX)]
    );
    assert!(top.player.queued_augmentations.is_empty());

    let near_top = set_repeatable_levels(&m, &c, u32::MAX - 1, u32::MAX);
    assert_eq!(
        names(&near_top.player.queued_augmentations),
        vec![("NeuroFlux Governor", u32::MAX)]
    );
}

#[test]
fn repeatable_queue_length_is_clamped() {
    let c = catalog();
    let m = model_with(&[], &[]);
    let next = set_repeatable_levels(&m, &c, 3, 4_000_000_000);
    let queued = &next.player.queued_augmentations;
    assert_eq!(queued.len(), MAX_QUEUED_REPEATABLE_LEVELS as usize);
    assert_eq!(queued.first().map(|a| a.level), Some(4));
    assert_eq!(
        queued.last().map(|a| a.level),
        Some(3 + MAX_QUEUED_REPEATABLE_LEVELS)
    );
}

#[test]
fn repeatable_queue_stops_at_the_highest_level() {
    let c = catalog();
    let m = model_with(&[("NeuroFlux Governor", u32::MAX)], &[]);
    let next = apply_status(&m, &c, "NeuroFluxGovernor", StatusKind::Queued);
    assert_eq!(
        names(&next.player.augmentations),
        vec![("NeuroFlux Governor", u32::MAX)]
    );
    assert!(next.player.queued_augmentations.is_empty());
}

#[test]
fn install_queued_moves_owned_entries() {
    let c = catalog();
    let m = model_with(
        &[("NeuroFlux Governor", 2)],
        &[
            ("Augmented Targeting I", 1),
            ("Augmented Targeting II", 1),
            ("NeuroFlux Governor", 3),
            ("NeuroFlux Governor", 4),
            ("Unknown Thing", 1),
        ],
    );
    let next = install_queued(&m, &c, DEFAULT_CONSISTENCY_PASS_LIMIT);
    assert_eq!(
        names(&next.player.augmentations),
        vec![
            ("Augmented Targeting I", 1),
            ("Augmented Targeting II", 1),
            ("NeuroFlux Governor", 4),
        ]
    );
    assert_eq!(names(&next.player.queued_augmentations), vec![("Unknown Thing", 1)]);
}

#[test]
fn install_queued_keeps_entries_missing_prerequisites() {
    let c = catalog();
    let m = model_with(&[], &[("Augmented Targeting III", 1)]);
    let next = install_queued(&m, &c, DEFAULT_CONSISTENCY_PASS_LIMIT);
    // Not installable, and the sweep drops it because nothing it needs is owned.
    assert!(next.player.augmentations.is_empty());
    assert!(next.player.queued_augmentations.is_empty());
}

#[test]
fn catalog_rejects_cycles() {
    let err = AugmentationCatalog::from_definitions(vec![
        definition("A", &["C"]),
        definition("B", &["A"]),
        definition("C", &["B"]),
    ])
    .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Catalog);
    assert!(err.message.contains("cycle"), "{}", err.message);
}

#[test]
fn catalog_rejects_dangling_prerequisites() {
    let err = AugmentationCatalog::from_definitions(vec![definition("A", &["Missing"])]).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Catalog);
}

#[test]
fn catalog_rejects_duplicate_names() {
    let mut second = definition("B", &[]);
    second.aliases.push("A name".to_string());
    let err = AugmentationCatalog::from_definitions(vec![definition("A", &[]), second]).unwrap_err();
    assert!(err.message.contains("A name"));
}

#[test]
fn catalog_rejects_multiple_repeatables() {
    let mut a = definition("A", &[]);
    a.repeatable = true;
    let mut b = definition("B", &[]);
    b.repeatable = true;
    assert!(AugmentationCatalog::from_definitions(vec![a, b]).is_err());
}

#[test]
fn builtin_catalog_is_valid() {
    let builtin = catalog();
    let rebuilt = AugmentationCatalog::from_definitions(builtin.iter().cloned().collect()).unwrap();
    assert_eq!(rebuilt.len(), builtin.len());
    assert_eq!(builtin.repeatable().unwrap().key, "NeuroFluxGovernor");
    assert_eq!(builtin.resolve("Neuroflux Governor").unwrap().key, "NeuroFluxGovernor");
}

#[test]
fn catalog_loads_from_json() {
    let catalog = AugmentationCatalog::from_json(
        r#"[
            {"key": "Base", "name": "Base Implant", "multipliers": {"hacking": 1.5}},
            {"key": "Upgrade", "name": "Upgrade Implant", "aliases": ["Old Upgrade"],
             "prerequisites": ["Base"], "multipliers": {"hacknet_node_ram_cost": 0.9}}
        ]"#,
    )
    .unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.resolve("Old Upgrade").unwrap().key, "Upgrade");

    let m = model_with(&[], &[]);
    let rejected = apply_status(&m, &catalog, "Upgrade", StatusKind::Installed);
    assert_eq!(rejected, m);

    let bad = AugmentationCatalog::from_json(r#"[{"key": "A", "name": "A", "colour": "red"}]"#);
    assert_eq!(bad.unwrap_err().code, CoreErrorCode::Catalog);
}

#[derive(Debug, Clone)]
enum Op {
    Apply(&'static str, StatusKind),
    Sweep,
    InstallQueued,
}

fn arb_op() -> impl Strategy<Value = Op> {
    let keys = prop::sample::select(vec![
        "Targeting1",
        "Targeting2",
        "Targeting3",
        "CombatRib1",
        "CombatRib2",
        "CombatRib3",
        "CranialSignalProcessorsG1",
        "CranialSignalProcessorsG2",
        "CranialSignalProcessorsG3",
        "NeuroFluxGovernor",
    ]);
    let states = prop::sample::select(vec![StatusKind::None, StatusKind::Queued, StatusKind::Installed]);
    prop_oneof![
        6 => (keys, states).prop_map(|(k, s)| Op::Apply(k, s)),
        1 => Just(Op::Sweep),
        1 => Just(Op::InstallQueued),
    ]
}

proptest! {
    #[test]
    fn prerequisites_hold_after_sweeping_any_sequence(ops in prop::collection::vec(arb_op(), 1..40)) {
        let c = catalog();
        let mut m = model_with(&[], &[]);
        for op in ops {
            m = match op {
                Op::Apply(key, target) => apply_status(&m, &c, key, target),
                Op::Sweep => enforce_consistency(&m, &c, DEFAULT_CONSISTENCY_PASS_LIMIT).0,
                Op::InstallQueued => install_queued(&m, &c, DEFAULT_CONSISTENCY_PASS_LIMIT),
            };
            // A plain status change may strand dependents until the next sweep.
            let (swept, outcome) = enforce_consistency(&m, &c, DEFAULT_CONSISTENCY_PASS_LIMIT);
            prop_assert!(outcome.converged);
            for def in c.iter() {
                let status = get_status(&swept, &c, &def.key);
                for prerequisite in &def.prerequisites {
                    let p = get_status(&swept, &c, prerequisite).state;
                    if status.state == StatusKind::Installed {
                        prop_assert_eq!(p, StatusKind::Installed, "{} needs {}", def.key, prerequisite);
                    }
                    if status.state == StatusKind::Queued {
                        prop_assert_ne!(p, StatusKind::None, "{} needs {}", def.key, prerequisite);
                    }
                }
                if let (Some(installed), Some(queued)) = (status.installed_level, status.queued_level) {
                    prop_assert!(queued >= installed);
                }
            }
        }
    }
}
