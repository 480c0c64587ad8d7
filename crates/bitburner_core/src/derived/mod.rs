//! Derived statistics. Every function here reads a model and returns
//! records; only `recalculate` produces a new model.

mod levels;
mod multipliers;

pub use levels::{
    compute_health, compute_level, compute_levels, health_for_defense, skill_level,
};
pub use multipliers::{
    EXPLOIT_BONUS, REPEATABLE_DONATION_BONUS, augmentation_factor, compute_multiplier,
    compute_multipliers, exploit_factor,
};

use crate::core_api::{AugmentationCatalog, HealthField};
use crate::model::SaveModel;
use crate::stats::Skill;

/// Returns a copy of `model` with saved multipliers, skill levels and
/// health replaced by their calculated values. A saved defense level above
/// the calculated one is kept, since health is derived from the higher of
/// the two; running this twice gives the same model as running it once.
pub fn recalculate(model: &SaveModel, catalog: &AugmentationCatalog) -> SaveModel {
    let mut next = model.clone();

    for record in compute_multipliers(model, catalog) {
        next.player.mults.set(record.field, record.calculated_value);
    }
    // Levels and health read the saved model, not the partially updated copy.
    for record in compute_levels(model, catalog) {
        let level = match record.skill {
            Skill::Defense => record.calculated.max(record.saved),
            _ => record.calculated,
        };
        next.player.skills.set(record.skill, level);
    }
    for record in compute_health(model, catalog) {
        match record.field {
            HealthField::Current => next.player.hp.current = record.calculated,
            HealthField::Max => next.player.hp.max = record.calculated,
        }
    }
    next
}
