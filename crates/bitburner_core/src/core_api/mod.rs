mod augmentation_catalog;
pub mod bitnode_catalog;
mod engine;
mod error;
pub mod source_file_catalog;
mod state;
mod types;

pub use augmentation_catalog::{AugmentationCatalog, AugmentationDefinition, NEUROFLUX_KEY};
pub use engine::{Engine, EngineOptions};
pub use error::{CoreError, CoreErrorCode, FormatError};
pub use state::StateManager;
pub use types::{
    AugmentationStatus, BreakdownEntry, HealthField, HealthRecord, MultiplierRecord,
    PrerequisiteCheck, PrerequisiteState, SkillRecord, StatusKind, SweepOutcome,
};
