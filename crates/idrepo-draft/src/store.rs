//! Draft persistence.

use crate::errors::Result;
use crate::types::DraftRecord;
use idrepo_storage::{Batch, BatchExt, Storage, CF_UIN_DRAFTS};
use std::sync::Arc;

/// Draft records keyed by registration id
pub struct DraftStore<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> DraftStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub async fn exists(&self, registration_id: &str) -> Result<bool> {
        Ok(self.storage.exists(CF_UIN_DRAFTS, &registration_id).await?)
    }

    pub async fn find(&self, registration_id: &str) -> Result<Option<DraftRecord>> {
        Ok(self.storage.get(CF_UIN_DRAFTS, &registration_id).await?)
    }

    /// Stage an insert or overwrite of the draft
    pub fn save(&self, batch: &mut dyn Batch, draft: &DraftRecord) -> Result<()> {
        batch.put(CF_UIN_DRAFTS, &draft.registration_id, draft)?;
        Ok(())
    }

    /// Stage removal of the draft
    pub fn delete(&self, batch: &mut dyn Batch, registration_id: &str) -> Result<()> {
        batch.delete(CF_UIN_DRAFTS, &registration_id)?;
        Ok(())
    }
}
