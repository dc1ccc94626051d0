//! In-process fakes for the orchestrator and router tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

use super::orchestrator::GenerationOrchestrator;
use crate::identity::{IdentityError, IdentityVerifier};
use crate::provider::{GenerationProvider, ProviderCause, ProviderError};
use crate::store::{Database, HistoryStore, MockClock, QuotaLedger};
use crate::types::{Target, Tone, UserId};

/// Accepts a fixed set of tokens.
#[derive(Default)]
pub struct StaticIdentity {
    tokens: HashMap<String, UserId>,
}

impl StaticIdentity {
    pub fn with(mut self, token: &str, user: UserId) -> Self {
        self.tokens.insert(token.to_string(), user);
        self
    }
}

impl IdentityVerifier for StaticIdentity {
    async fn verify(&self, token: &str) -> Result<UserId, IdentityError> {
        self.tokens.get(token).copied().ok_or(IdentityError::Rejected)
    }
}

/// Echoes its inputs, records every call and fails on chosen targets.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    calls: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(targets: &[&str]) -> Self {
        Self {
            failing: targets.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Target ids in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl GenerationProvider for ScriptedProvider {
    async fn generate(&self, text: &str, target: &Target, tone: &Tone) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(target.id().to_string());

        if self.failing.contains(target.id()) {
            return Err(ProviderError::new(
                target.id(),
                ProviderCause::Status {
                    status: 500,
                    body: "upstream exploded".to_string(),
                },
            ));
        }

        Ok(format!("[{} {}] {}", tone, target, text))
    }
}

pub const TEST_TOKEN: &str = "user-token";

pub struct Fixture {
    pub db: Database,
    pub user: UserId,
    pub provider: ScriptedProvider,
    pub orchestrator: Arc<GenerationOrchestrator<ScriptedProvider, StaticIdentity>>,
    _dir: TempDir,
}

/// Fresh database, one known user behind [`TEST_TOKEN`], clock pinned to `today`.
pub async fn fixture(today: NaiveDate, provider: ScriptedProvider) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("test.sqlite")).await.unwrap();

    let mut clock = MockClock::new();
    clock.expect_today().return_const(today);

    let user = Uuid::new_v4();
    let orchestrator = GenerationOrchestrator::new(
        provider.clone(),
        StaticIdentity::default().with(TEST_TOKEN, user),
        QuotaLedger::with_clock(db.clone(), Arc::new(clock)),
        HistoryStore::new(db.clone()),
    );

    Fixture {
        db,
        user,
        provider,
        orchestrator: Arc::new(orchestrator),
        _dir: dir,
    }
}
