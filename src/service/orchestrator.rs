//! The generation request handler.
//!
//! A request moves through
//! `Received -> Authenticated -> QuotaChecked -> Generating -> Persisted -> Responded`
//! and can fail at any stage. Failures before `Generating` never reach the
//! provider or the quota commit. Targets are generated one after another in
//! caller order; the first failure discards everything generated so far.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::error::GenerateError;
use crate::identity::{IdentityVerifier, bearer_token};
use crate::provider::{GenerationProvider, ProviderError};
use crate::store::{HistoryStore, QuotaCheck, QuotaLedger};
use crate::types::{
    DataError, GenerationId, GenerationRecord, GenerationResults, MAX_TEXT_CHARS, NewGeneration,
    Remaining, Target, Tier, Tone, UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Authenticated,
    QuotaChecked,
    Generating,
    Persisted,
    Responded,
}

/// Inbound payload. Missing fields deserialize empty and fail validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default, alias = "platforms")]
    pub targets: Vec<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRequest {
    pub text: String,
    pub targets: Vec<Target>,
    pub tone: Tone,
}

impl GenerateRequest {
    pub fn validate(self) -> Result<ValidRequest, GenerateError> {
        let tone = self.tone.filter(|t| !t.is_empty());

        if self.text.is_empty() || self.targets.is_empty() || tone.is_none() {
            return Err(GenerateError::Validation(
                "Missing required fields".to_string(),
            ));
        }

        // UTF-16 code units, as counted by browser clients
        if self.text.encode_utf16().count() > MAX_TEXT_CHARS {
            return Err(GenerateError::Validation(
                "Content too long (max 10,000 characters)".to_string(),
            ));
        }

        // Ordered set: first occurrence wins
        let mut targets: Vec<Target> = Vec::with_capacity(self.targets.len());
        for id in self.targets {
            let target = Target::from(id);
            if !targets.contains(&target) {
                targets.push(target);
            }
        }

        Ok(ValidRequest {
            text: self.text,
            targets,
            tone: Tone::from(tone.unwrap_or_default()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub results: GenerationResults,
    pub generations_remaining: Remaining,
}

/// Budget view that does not consume anything.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaView {
    pub tier: Tier,
    pub generations_today: u32,
    pub daily_limit: u32,
    pub generations_remaining: Remaining,
}

pub struct GenerationOrchestrator<P, I> {
    provider: P,
    identity: I,
    ledger: QuotaLedger,
    history: HistoryStore,
}

impl<P, I> GenerationOrchestrator<P, I>
where
    P: GenerationProvider,
    I: IdentityVerifier,
{
    pub fn new(provider: P, identity: I, ledger: QuotaLedger, history: HistoryStore) -> Self {
        Self {
            provider,
            identity,
            ledger,
            history,
        }
    }

    /// `Received -> Authenticated`.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<UserId, GenerateError> {
        let token = bearer_token(authorization)?;
        Ok(self.identity.verify(token).await?)
    }

    /// Full pipeline from the raw `Authorization` header.
    pub async fn generate(
        &self,
        authorization: Option<&str>,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, GenerateError> {
        let user_id = match self.authenticate(authorization).await {
            Ok(id) => id,
            Err(e) => {
                e.log(Stage::Received);
                return Err(e);
            }
        };
        self.generate_for(user_id, request).await
    }

    /// Pipeline for an already authenticated caller.
    pub async fn generate_for(
        &self,
        user_id: UserId,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, GenerateError> {
        let mut stage = Stage::Authenticated;
        let result = self.run(user_id, request, &mut stage).await;

        match &result {
            Ok(response) => info!(
                user_id = %user_id,
                targets = response.results.len(),
                remaining = %response.generations_remaining,
                "generation successful"
            ),
            Err(e) => e.log(stage),
        }

        result
    }

    async fn run(
        &self,
        user_id: UserId,
        request: GenerateRequest,
        stage: &mut Stage,
    ) -> Result<GenerateResponse, GenerateError> {
        let request = request.validate()?;

        let reservation = match self.ledger.check_and_reserve(user_id).await? {
            QuotaCheck::Allowed(reservation) => reservation,
            QuotaCheck::Exhausted { state } => {
                info!(
                    user_id = %user_id,
                    tier = %state.tier,
                    generations_today = state.generations_today,
                    "daily limit reached"
                );
                return Err(GenerateError::QuotaExceeded);
            }
        };
        *stage = Stage::QuotaChecked;

        *stage = Stage::Generating;
        let results = self.fan_out(&request).await?;

        // History is best effort: the budget is spent either way
        let generation = NewGeneration {
            user_id,
            original_content: request.text,
            tone: request.tone,
            platforms: request.targets,
            results,
        };
        if let Err(e) = self.history.append(&generation).await {
            error!(user_id = %user_id, error = %e, "failed to record generation");
        }
        *stage = Stage::Persisted;

        let expected = match reservation.tier() {
            Tier::Unlimited => Remaining::Unlimited,
            Tier::Free => Remaining::Limited(
                self.ledger
                    .limit()
                    .saturating_sub(reservation.effective_count() + 1),
            ),
        };
        let generations_remaining = match self.ledger.commit(reservation).await {
            Ok(remaining) => remaining,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "failed to commit quota");
                expected
            }
        };
        *stage = Stage::Responded;

        Ok(GenerateResponse {
            results: generation.results,
            generations_remaining,
        })
    }

    /// One provider call per target, in order. First failure wins.
    async fn fan_out(&self, request: &ValidRequest) -> Result<GenerationResults, ProviderError> {
        let mut results = GenerationResults::new();

        for target in &request.targets {
            info!(platform = %target, "generating content");
            let text = self
                .provider
                .generate(&request.text, target, &request.tone)
                .await?;
            results.insert(target.clone(), text);
        }

        Ok(results)
    }

    pub async fn quota(&self, user_id: UserId) -> Result<QuotaView, GenerateError> {
        let state = self.ledger.state(user_id).await?;
        let today = self.ledger.today();

        Ok(QuotaView {
            tier: state.tier,
            generations_today: state.effective_count(today),
            daily_limit: self.ledger.limit(),
            generations_remaining: state.remaining(today, self.ledger.limit()),
        })
    }

    pub async fn history(&self, user_id: UserId) -> Result<Vec<GenerationRecord>, GenerateError> {
        Ok(self.history.list(user_id).await?)
    }

    pub async fn delete_history(
        &self,
        user_id: UserId,
        id: GenerationId,
    ) -> Result<(), GenerateError> {
        match self.history.delete(user_id, id).await {
            Ok(()) => Ok(()),
            Err(DataError::NotFound(_)) => Err(GenerateError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
