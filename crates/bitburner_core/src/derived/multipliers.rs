use tracing::debug;

use crate::core_api::bitnode_catalog::hacking_intrinsic;
use crate::core_api::source_file_catalog::source_file;
use crate::core_api::{AugmentationCatalog, AugmentationDefinition, BreakdownEntry, MultiplierRecord};
use crate::model::SaveModel;
use crate::stats::MultiplierField;

/// Per-exploit bonus on every eligible field.
pub const EXPLOIT_BONUS: f64 = 1.001;

/// Flat bonus the repeatable augmentation gains per level from the
/// donation counter, folded into its multiplier before stacking.
pub const REPEATABLE_DONATION_BONUS: f64 = 179.0 / 1e6 / 100.0;

/// Installed augmentations that resolve against the catalog, with their
/// stored level. Unresolved names are skipped.
pub(crate) fn installed_definitions<'c>(
    model: &SaveModel,
    catalog: &'c AugmentationCatalog,
) -> Vec<(&'c AugmentationDefinition, u32)> {
    model
        .player
        .augmentations
        .iter()
        .filter_map(|owned| match catalog.resolve(&owned.name) {
            Some(def) => Some((def, owned.level)),
            None => {
                debug!(name = owned.name.as_str(), "ignoring unknown augmentation");
                None
            }
        })
        .collect()
}

pub fn compute_multipliers(
    model: &SaveModel,
    catalog: &AugmentationCatalog,
) -> Vec<MultiplierRecord> {
    let installed = installed_definitions(model, catalog);
    MultiplierField::all()
        .map(|field| multiplier_record(model, &installed, field))
        .collect()
}

pub fn compute_multiplier(
    model: &SaveModel,
    catalog: &AugmentationCatalog,
    field: MultiplierField,
) -> MultiplierRecord {
    multiplier_record(model, &installed_definitions(model, catalog), field)
}

/// Factor a single augmentation contributes to `field` at `level`.
pub fn augmentation_factor(def: &AugmentationDefinition, field: MultiplierField, level: u32) -> f64 {
    let Some(mult) = def.multiplier(field) else {
        return 1.0;
    };
    if !def.repeatable {
        return mult;
    }
    let folded = if mult > 1.0 {
        mult + REPEATABLE_DONATION_BONUS
    } else if mult < 1.0 {
        1.0 / (1.0 / mult + REPEATABLE_DONATION_BONUS)
    } else {
        mult
    };
    folded.powi(level.min(i32::MAX as u32) as i32)
}

pub fn exploit_factor(field: MultiplierField, exploits: usize) -> f64 {
    if exploits == 0 || !field.exploit_eligible() {
        return 1.0;
    }
    let count = exploits.min(i32::MAX as usize) as i32;
    if field.is_cost() {
        (1.0 / EXPLOIT_BONUS).powi(count)
    } else {
        EXPLOIT_BONUS.powi(count)
    }
}

fn multiplier_record(
    model: &SaveModel,
    installed: &[(&AugmentationDefinition, u32)],
    field: MultiplierField,
) -> MultiplierRecord {
    let player = &model.player;
    let mut breakdown = Vec::new();

    for (id, level) in player.source_files.iter() {
        let Some(def) = source_file(id) else {
            continue;
        };
        if let Some(factor) = def.factor(field, level) {
            breakdown.push(BreakdownEntry::new(
                format!("SF{id}.{level} {}", def.name),
                factor,
            ));
        }
    }

    for (def, level) in installed {
        let factor = augmentation_factor(def, field, *level);
        if factor != 1.0 {
            let label = if def.repeatable {
                format!("{} (level {level})", def.name)
            } else {
                def.name.clone()
            };
            breakdown.push(BreakdownEntry::new(label, factor));
        }
    }

    if field == MultiplierField::Hacking {
        if let Some(factor) = hacking_intrinsic(player.bit_node) {
            breakdown.push(BreakdownEntry::new(
                format!("BitNode-{} intrinsic", player.bit_node),
                factor,
            ));
        }
    }

    let exploit = exploit_factor(field, player.exploits.len());
    if exploit != 1.0 {
        breakdown.push(BreakdownEntry::new(
            format!("Exploits ({})", player.exploits.len()),
            exploit,
        ));
    }

    let calculated_value = breakdown.iter().map(|entry| entry.factor).product();
    MultiplierRecord {
        field,
        saved_value: player.mults.get(field),
        calculated_value,
        breakdown,
    }
}
