use std::sync::Arc;

use tracing::debug;

use crate::augmentations::{self, DEFAULT_CONSISTENCY_PASS_LIMIT};
use crate::derived;
use crate::model::{LoadedSave, SaveModel};
use crate::stats::{MultiplierField, Skill};
use crate::transport::{self, Transport};

use super::augmentation_catalog::AugmentationCatalog;
use super::error::CoreError;
use super::state::StateManager;
use super::types::{
    AugmentationStatus, HealthRecord, MultiplierRecord, PrerequisiteCheck, SkillRecord,
    StatusKind, SweepOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub consistency_pass_limit: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            consistency_pass_limit: DEFAULT_CONSISTENCY_PASS_LIMIT,
        }
    }
}

/// Entry point binding the derived computations to one augmentation
/// catalog.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    catalog: Arc<AugmentationCatalog>,
    options: EngineOptions,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: AugmentationCatalog) -> Self {
        Self::new().replace_catalog(catalog)
    }

    /// Swaps the catalog, keeping the current options.
    pub fn replace_catalog(mut self, catalog: AugmentationCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &AugmentationCatalog {
        &self.catalog
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn open_str(&self, raw: &str) -> Result<StateManager, CoreError> {
        let loaded = LoadedSave::parse(raw)?;
        Ok(StateManager::from_loaded(loaded, Transport::PlainJson))
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<StateManager, CoreError> {
        let (text, transport) = transport::decode(bytes.as_ref())?;
        debug!(transport = transport.as_str(), "decoded save transport");
        let loaded = LoadedSave::parse(&text)?;
        Ok(StateManager::from_loaded(loaded, transport))
    }

    pub fn multipliers(&self, model: &SaveModel) -> Vec<MultiplierRecord> {
        derived::compute_multipliers(model, &self.catalog)
    }

    pub fn multiplier(&self, model: &SaveModel, field: MultiplierField) -> MultiplierRecord {
        derived::compute_multiplier(model, &self.catalog, field)
    }

    pub fn levels(&self, model: &SaveModel) -> Vec<SkillRecord> {
        derived::compute_levels(model, &self.catalog)
    }

    pub fn level(&self, model: &SaveModel, skill: Skill) -> SkillRecord {
        derived::compute_level(model, &self.catalog, skill)
    }

    pub fn health(&self, model: &SaveModel) -> Vec<HealthRecord> {
        derived::compute_health(model, &self.catalog)
    }

    pub fn recalculate(&self, model: &SaveModel) -> SaveModel {
        derived::recalculate(model, &self.catalog)
    }

    pub fn status(&self, model: &SaveModel, key: &str) -> AugmentationStatus {
        augmentations::get_status(model, &self.catalog, key)
    }

    pub fn prerequisites(&self, model: &SaveModel, key: &str) -> PrerequisiteCheck {
        augmentations::check_prerequisites(model, &self.catalog, key)
    }

    pub fn apply_status(&self, model: &SaveModel, key: &str, target: StatusKind) -> SaveModel {
        augmentations::apply_status(model, &self.catalog, key, target)
    }

    pub fn set_repeatable_levels(
        &self,
        model: &SaveModel,
        installed: u32,
        queued_through: u32,
    ) -> SaveModel {
        augmentations::set_repeatable_levels(model, &self.catalog, installed, queued_through)
    }

    pub fn install_queued(&self, model: &SaveModel) -> SaveModel {
        augmentations::install_queued(model, &self.catalog, self.options.consistency_pass_limit)
    }

    pub fn enforce_consistency(&self, model: &SaveModel) -> (SaveModel, SweepOutcome) {
        augmentations::enforce_consistency(
            model,
            &self.catalog,
            self.options.consistency_pass_limit,
        )
    }
}
