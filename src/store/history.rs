//! Generation history keyed by owner.

use tracing::debug;

use super::db::Database;
use crate::types::{DataError, GenerationId, GenerationRecord, NewGeneration, UserId};

pub struct HistoryStore {
    db: Database,
}

impl HistoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a finished generation.
    pub async fn append(&self, generation: &NewGeneration) -> Result<GenerationRecord, DataError> {
        let row = self.db.insert_generation(generation).await?;
        debug!(user_id = %generation.user_id, id = %row.id, "generation recorded");
        row.try_into()
    }

    /// All of an owner's generations, newest first.
    pub async fn list(&self, owner: UserId) -> Result<Vec<GenerationRecord>, DataError> {
        self.db
            .list_generations(owner)
            .await?
            .into_iter()
            .map(GenerationRecord::try_from)
            .collect()
    }

    /// Delete one of the owner's generations.
    ///
    /// A record owned by someone else is reported exactly like a missing one.
    pub async fn delete(&self, owner: UserId, id: GenerationId) -> Result<(), DataError> {
        match self.db.delete_generation(owner, id).await? {
            0 => Err(DataError::NotFound(format!("generation {}", id))),
            _ => Ok(()),
        }
    }
}
