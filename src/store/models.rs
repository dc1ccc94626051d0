//! Row models for the relational store.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{
    DataError, GenerationRecord, GenerationResults, QuotaState, Target, Tier, Tone,
};

/// Dates are stored as ISO `YYYY-MM-DD` text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Profile Models
// ============================================================================

/// A profile row: tier flag plus the daily counter.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub tier: String,
    pub generations_today: i64,
    pub last_generation_date: Option<String>,
}

impl TryFrom<ProfileRow> for QuotaState {
    type Error = DataError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&row.user_id)
            .map_err(|e| DataError::Corrupt(format!("profile user_id {}: {}", row.user_id, e)))?;
        let tier: Tier = row.tier.parse().map_err(DataError::Corrupt)?;
        let last_generation_date = row
            .last_generation_date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT))
            .transpose()
            .map_err(|e| DataError::Corrupt(format!("last_generation_date: {}", e)))?;
        let generations_today = u32::try_from(row.generations_today).map_err(|_| {
            DataError::Corrupt(format!("generations_today {}", row.generations_today))
        })?;

        Ok(QuotaState {
            user_id,
            tier,
            generations_today,
            last_generation_date,
        })
    }
}

// ============================================================================
// Generation Models
// ============================================================================

/// A generation row. `platforms` and `results` are JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct GenerationRow {
    pub id: String,
    pub user_id: String,
    pub original_content: String,
    pub tone: String,
    pub platforms: String,
    pub results: String,
    pub created_at: String,
}

impl TryFrom<GenerationRow> for GenerationRecord {
    type Error = DataError;

    fn try_from(row: GenerationRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DataError::Corrupt(format!("generation id {}: {}", row.id, e)))?;
        let user_id = Uuid::parse_str(&row.user_id)
            .map_err(|e| DataError::Corrupt(format!("generation user_id {}: {}", row.user_id, e)))?;
        let platforms: Vec<Target> = serde_json::from_str(&row.platforms)?;
        let results: GenerationResults = serde_json::from_str(&row.results)?;
        if results.is_empty() {
            return Err(DataError::Corrupt(format!("generation {} has no results", row.id)));
        }
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| DataError::Corrupt(format!("created_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(GenerationRecord {
            id,
            user_id,
            original_content: row.original_content,
            tone: Tone::from(row.tone),
            platforms,
            results,
            created_at,
        })
    }
}
