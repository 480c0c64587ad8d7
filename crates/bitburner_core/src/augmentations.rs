//! Augmentation status model: `None`, `Queued` or `Installed` per catalog
//! entry, with prerequisite-aware transitions and a bounded repair sweep.
//!
//! Every operation takes the model by reference and returns a new one. An
//! invalid transition returns an unchanged copy instead of an error.

use tracing::{debug, warn};

use crate::core_api::{
    AugmentationCatalog, AugmentationDefinition, AugmentationStatus, PrerequisiteCheck,
    PrerequisiteState, StatusKind, SweepOutcome,
};
use crate::model::SaveModel;
use crate::sections::{OwnedAugmentation, PlayerState};

pub const DEFAULT_CONSISTENCY_PASS_LIMIT: usize = 10;

/// Most queued entries `set_repeatable_levels` writes above the installed
/// level. Higher targets are clamped.
pub const MAX_QUEUED_REPEATABLE_LEVELS: u32 = 1000;

pub fn get_status(model: &SaveModel, catalog: &AugmentationCatalog, key: &str) -> AugmentationStatus {
    match catalog.resolve(key) {
        Some(def) => status_of(&model.player, def),
        None => {
            debug!(key, "status requested for unknown augmentation");
            AugmentationStatus::none()
        }
    }
}

pub fn check_prerequisites(
    model: &SaveModel,
    catalog: &AugmentationCatalog,
    key: &str,
) -> PrerequisiteCheck {
    match catalog.resolve(key) {
        Some(def) => prerequisites_of(&model.player, catalog, def),
        None => PrerequisiteCheck {
            prerequisites: Vec::new(),
            all_owned: true,
            all_installed: true,
        },
    }
}

/// Moves `key` to `target`. Rejected transitions (installing without every
/// prerequisite installed, queueing without every prerequisite owned)
/// return the model unchanged.
pub fn apply_status(
    model: &SaveModel,
    catalog: &AugmentationCatalog,
    key: &str,
    target: StatusKind,
) -> SaveModel {
    let Some(def) = catalog.resolve(key) else {
        debug!(key, "ignoring status change for unknown augmentation");
        return model.clone();
    };
    if !transition_allowed(&model.player, catalog, def, target) {
        debug!(key = def.key.as_str(), target = target.as_str(), "prerequisites not met");
        return model.clone();
    }

    let mut next = model.clone();
    let player = &mut next.player;
    if def.repeatable {
        apply_repeatable(player, def, target);
        return next;
    }

    purge(player, def);
    match target {
        StatusKind::None => {}
        StatusKind::Installed => player.augmentations.push(OwnedAugmentation::new(&def.name, 1)),
        StatusKind::Queued => player
            .queued_augmentations
            .push(OwnedAugmentation::new(&def.name, 1)),
    }
    next
}

/// Rewrites the repeatable augmentation's entries: one installed entry at
/// `installed` (none when 0) and one queued entry per level from
/// `installed + 1` through `queued_through`, at most
/// [`MAX_QUEUED_REPEATABLE_LEVELS`] of them.
pub fn set_repeatable_levels(
    model: &SaveModel,
    catalog: &AugmentationCatalog,
    installed: u32,
    queued_through: u32,
) -> SaveModel {
    let Some(def) = catalog.repeatable() else {
        debug!("catalog has no repeatable augmentation");
        return model.clone();
    };
    let wants_install = installed > 0;
    let wants_queue = queued_through > installed;
    if (wants_install && !transition_allowed(&model.player, catalog, def, StatusKind::Installed))
        || (wants_queue && !transition_allowed(&model.player, catalog, def, StatusKind::Queued))
    {
        return model.clone();
    }

    let mut next = model.clone();
    let player = &mut next.player;
    purge(player, def);
    if wants_install {
        player
            .augmentations
            .push(OwnedAugmentation::new(&def.name, installed));
    }
    if wants_queue {
        let last = queued_through.min(installed.saturating_add(MAX_QUEUED_REPEATABLE_LEVELS));
        if last < queued_through {
            debug!(queued_through, last, "clamped queued repeatable levels");
        }
        // `queued_through > installed`, so `installed + 1` cannot overflow.
        for level in installed + 1..=last {
            player
                .queued_augmentations
                .push(OwnedAugmentation::new(&def.name, level));
        }
    }
    next
}

/// Installs every queued augmentation whose prerequisites are owned, then
/// repairs whatever that left inconsistent.
pub fn install_queued(model: &SaveModel, catalog: &AugmentationCatalog, pass_limit: usize) -> SaveModel {
    let mut next = model.clone();
    let queued = std::mem::take(&mut next.player.queued_augmentations);
    let mut repeatable_top: Option<(&AugmentationDefinition, u32)> = None;
    let mut installed = 0usize;

    for entry in queued {
        let Some(def) = catalog.resolve(&entry.name) else {
            next.player.queued_augmentations.push(entry);
            continue;
        };
        if !prerequisites_of(&model.player, catalog, def).all_owned {
            next.player.queued_augmentations.push(entry);
            continue;
        }
        installed += 1;
        if def.repeatable {
            let top = repeatable_top.map_or(entry.level, |(_, level)| level.max(entry.level));
            repeatable_top = Some((def, top));
        } else {
            next.player.augmentations.retain(|owned| !def.matches(&owned.name));
            next.player.augmentations.push(entry);
        }
    }

    if let Some((def, queued_top)) = repeatable_top {
        let level = max_level(&next.player.augmentations, def)
            .map_or(queued_top, |current| current.max(queued_top));
        next.player.augmentations.retain(|owned| !def.matches(&owned.name));
        next.player
            .augmentations
            .push(OwnedAugmentation::new(&def.name, level.max(1)));
    }

    debug!(installed, "installed queued augmentations");
    enforce_consistency(&next, catalog, pass_limit).0
}

/// Demotes or removes augmentations whose prerequisites are no longer
/// satisfied, repeating until a pass changes nothing or `pass_limit` passes
/// have run.
pub fn enforce_consistency(
    model: &SaveModel,
    catalog: &AugmentationCatalog,
    pass_limit: usize,
) -> (SaveModel, SweepOutcome) {
    let mut next = model.clone();

    for pass in 1..=pass_limit {
        let mut changed = false;
        for def in catalog.iter() {
            let status = status_of(&next.player, def);
            if status.state == StatusKind::None {
                continue;
            }
            let check = prerequisites_of(&next.player, catalog, def);
            let player = &mut next.player;
            match status.state {
                StatusKind::Installed if !check.all_installed => {
                    player.augmentations.retain(|owned| !def.matches(&owned.name));
                    if !check.all_owned {
                        player
                            .queued_augmentations
                            .retain(|owned| !def.matches(&owned.name));
                    } else if status.queued_level.is_none() {
                        let level = status.installed_level.unwrap_or(1).max(1);
                        player
                            .queued_augmentations
                            .push(OwnedAugmentation::new(&def.name, level));
                    }
                    debug!(key = def.key.as_str(), requeued = check.all_owned, "demoted installed augmentation");
                    changed = true;
                }
                StatusKind::Queued if !check.all_owned => {
                    player
                        .queued_augmentations
                        .retain(|owned| !def.matches(&owned.name));
                    debug!(key = def.key.as_str(), "removed queued augmentation");
                    changed = true;
                }
                _ => {}
            }
        }
        if !changed {
            return (
                next,
                SweepOutcome {
                    passes: pass,
                    converged: true,
                },
            );
        }
    }

    warn!(pass_limit, "augmentation consistency sweep stopped at its pass limit");
    (
        next,
        SweepOutcome {
            passes: pass_limit,
            converged: false,
        },
    )
}

fn max_level(list: &[OwnedAugmentation], def: &AugmentationDefinition) -> Option<u32> {
    list.iter()
        .filter(|owned| def.matches(&owned.name))
        .map(|owned| owned.level)
        .max()
}

fn status_of(player: &PlayerState, def: &AugmentationDefinition) -> AugmentationStatus {
    let installed_level = max_level(&player.augmentations, def);
    let queued_level = max_level(&player.queued_augmentations, def);
    let state = if installed_level.is_some() {
        StatusKind::Installed
    } else if queued_level.is_some() {
        StatusKind::Queued
    } else {
        StatusKind::None
    };
    AugmentationStatus {
        state,
        installed_level,
        queued_level,
    }
}

fn prerequisites_of(
    player: &PlayerState,
    catalog: &AugmentationCatalog,
    def: &AugmentationDefinition,
) -> PrerequisiteCheck {
    let prerequisites: Vec<PrerequisiteState> = def
        .prerequisites
        .iter()
        .map(|key| {
            let state = catalog
                .resolve(key)
                .map(|p| status_of(player, p).state)
                .unwrap_or(StatusKind::None);
            PrerequisiteState {
                key: key.clone(),
                installed: state == StatusKind::Installed,
                queued: state == StatusKind::Queued,
            }
        })
        .collect();
    let all_installed = prerequisites.iter().all(|p| p.installed);
    let all_owned = prerequisites.iter().all(|p| p.installed || p.queued);
    PrerequisiteCheck {
        prerequisites,
        all_owned,
        all_installed,
    }
}

fn transition_allowed(
    player: &PlayerState,
    catalog: &AugmentationCatalog,
    def: &AugmentationDefinition,
    target: StatusKind,
) -> bool {
    let check = prerequisites_of(player, catalog, def);
    match target {
        StatusKind::None => true,
        StatusKind::Queued => check.all_owned,
        StatusKind::Installed => check.all_installed,
    }
}

fn purge(player: &mut PlayerState, def: &AugmentationDefinition) {
    player.augmentations.retain(|owned| !def.matches(&owned.name));
    player
        .queued_augmentations
        .retain(|owned| !def.matches(&owned.name));
}

fn apply_repeatable(player: &mut PlayerState, def: &AugmentationDefinition, target: StatusKind) {
    let installed = max_level(&player.augmentations, def);
    let queued = max_level(&player.queued_augmentations, def);

    match target {
        StatusKind::None => purge(player, def),
        StatusKind::Installed => {
            let level = installed.unwrap_or(0).max(queued.unwrap_or(0)).max(1);
            purge(player, def);
            player.augmentations.push(OwnedAugmentation::new(&def.name, level));
        }
        StatusKind::Queued => {
            let floor = installed.unwrap_or(0);
            let mut kept: Vec<u32> = player
                .queued_augmentations
                .iter()
                .filter(|owned| def.matches(&owned.name) && owned.level > floor)
                .map(|owned| owned.level)
                .collect();
            kept.sort_unstable();
            kept.dedup();
            if let Some(next_level) = kept.last().copied().unwrap_or(floor).checked_add(1) {
                kept.push(next_level);
            }

            purge(player, def);
            if let Some(level) = installed {
                player.augmentations.push(OwnedAugmentation::new(&def.name, level));
            }
            for level in kept {
                player
                    .queued_augmentations
                    .push(OwnedAugmentation::new(&def.name, level));
            }
        }
    }
}
