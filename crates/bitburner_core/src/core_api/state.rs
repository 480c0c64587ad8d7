use std::sync::Arc;

use tracing::info;

use crate::container::SectionName;
use crate::model::{LoadedSave, SaveModel};
use crate::serializer;
use crate::transport::{self, Transport};

use super::error::{CoreError, FormatError};

/// A frozen baseline plus the working copy edits are applied to.
///
/// Edits never touch the baseline; each one replaces the working model
/// with a new value, so a failed edit leaves the previous working copy in
/// place.
#[derive(Debug, Clone)]
pub struct StateManager {
    baseline: Arc<LoadedSave>,
    working: SaveModel,
    transport: Transport,
}

impl StateManager {
    pub fn load(raw: &str) -> Result<Self, FormatError> {
        Ok(Self::from_loaded(LoadedSave::parse(raw)?, Transport::PlainJson))
    }

    pub fn from_loaded(loaded: LoadedSave, transport: Transport) -> Self {
        info!(
            sections = loaded.raw.sections.len(),
            transport = transport.as_str(),
            "loaded save"
        );
        let working = loaded.model.clone();
        Self {
            baseline: Arc::new(loaded),
            working,
            transport,
        }
    }

    pub fn baseline(&self) -> &LoadedSave {
        &self.baseline
    }

    pub fn working(&self) -> &SaveModel {
        &self.working
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Runs a fallible reducer over the working copy. On error the working
    /// copy is left as it was.
    pub fn update<E>(
        &mut self,
        reducer: impl FnOnce(&SaveModel) -> Result<SaveModel, E>,
    ) -> Result<(), E> {
        self.working = reducer(&self.working)?;
        Ok(())
    }

    pub fn apply(&mut self, reducer: impl FnOnce(&SaveModel) -> SaveModel) {
        self.working = reducer(&self.working);
    }

    pub fn reset(&mut self) {
        self.working = self.baseline.model.clone();
    }

    /// A second manager sharing this baseline, starting from the current
    /// working copy.
    pub fn fork(&self) -> Self {
        Self {
            baseline: Arc::clone(&self.baseline),
            working: self.working.clone(),
            transport: self.transport,
        }
    }

    pub fn changed_sections(&self) -> Vec<SectionName> {
        SectionName::ALL
            .into_iter()
            .filter(|&name| !self.working.section_eq(&self.baseline.model, name))
            .collect()
    }

    pub fn is_modified(&self) -> bool {
        self.working != self.baseline.model
    }

    /// Envelope JSON for the working copy, reusing the baseline's raw text
    /// for every unchanged section.
    pub fn export(&self) -> String {
        let text = serializer::serialize(&self.working, Some(&self.baseline));
        info!(
            changed = self.changed_sections().len(),
            bytes = text.len(),
            "exported save"
        );
        text
    }

    /// `export` wrapped in the transport the save was loaded with.
    pub fn export_bytes(&self) -> Result<Vec<u8>, CoreError> {
        transport::encode(&self.export(), self.transport)
    }
}
