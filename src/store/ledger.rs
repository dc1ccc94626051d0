//! Daily generation budget per account.
//!
//! Reset is lazy: a counter from an earlier day is read as zero and is only
//! rewritten when the first generation of the new day commits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use super::db::Database;
use crate::types::{DAILY_LIMIT, DataError, QuotaState, Remaining, Tier, UserId};

/// Source of "today" for the UTC day boundary.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Outcome of a quota check.
#[derive(Debug)]
pub enum QuotaCheck {
    /// Budget available. Hand the reservation back to [`QuotaLedger::commit`].
    Allowed(Reservation),
    /// Free tier with nothing left today.
    Exhausted { state: QuotaState },
}

impl QuotaCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaCheck::Allowed(_))
    }
}

/// A passed quota check for one owner.
///
/// Holds the owner's lock until committed or dropped, so a second request
/// from the same owner waits instead of passing the same check.
#[derive(Debug)]
pub struct Reservation {
    owner: UserId,
    tier: Tier,
    effective_count: u32,
    _guard: OwnedMutexGuard<()>,
}

impl Reservation {
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Count used today before this generation.
    pub fn effective_count(&self) -> u32 {
        self.effective_count
    }
}

/// Per-owner daily counter backed by the profiles table.
pub struct QuotaLedger {
    db: Database,
    clock: Arc<dyn Clock>,
    limit: u32,
    owner_locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl QuotaLedger {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            limit: DAILY_LIMIT,
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Current stored state, creating a free-tier profile if none exists.
    pub async fn state(&self, owner: UserId) -> Result<QuotaState, DataError> {
        self.db.ensure_profile(owner).await?.try_into()
    }

    /// Check the owner's budget and, if allowed, reserve it until commit.
    pub async fn check_and_reserve(&self, owner: UserId) -> Result<QuotaCheck, DataError> {
        let guard = self.owner_lock(owner).lock_owned().await;

        let state = self.state(owner).await?;
        let effective_count = state.effective_count(self.today());

        if !state.tier.is_unlimited() && effective_count >= self.limit {
            debug!(user_id = %owner, effective_count, "daily limit reached");
            return Ok(QuotaCheck::Exhausted { state });
        }

        Ok(QuotaCheck::Allowed(Reservation {
            owner,
            tier: state.tier,
            effective_count,
            _guard: guard,
        }))
    }

    /// Record a successful generation and return what is left today.
    pub async fn commit(&self, reservation: Reservation) -> Result<Remaining, DataError> {
        let new_count = self
            .db
            .commit_generation(reservation.owner, self.today())
            .await?;

        debug!(user_id = %reservation.owner, new_count, "quota committed");

        Ok(if reservation.tier.is_unlimited() {
            Remaining::Unlimited
        } else {
            Remaining::Limited(self.limit.saturating_sub(new_count))
        })
    }

    fn owner_lock(&self, owner: UserId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .owner_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Drop locks nobody is holding or waiting on
        locks.retain(|id, lock| *id == owner || Arc::strong_count(lock) > 1);

        locks.entry(owner).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn fixed_clock(today: NaiveDate) -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_today().return_const(today);
        Arc::new(clock)
    }

    async fn ledger_on(today: NaiveDate) -> (TempDir, Database, QuotaLedger) {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("db.sqlite")).await.unwrap();
        let ledger = QuotaLedger::with_clock(db.clone(), fixed_clock(today));
        (dir, db, ledger)
    }

    async fn seed(db: &Database, owner: UserId, count: u32, on: NaiveDate) {
        db.ensure_profile(owner).await.unwrap();
        for _ in 0..count {
            db.commit_generation(owner, on).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_fresh_account_has_full_budget() {
        let (_dir, _db, ledger) = ledger_on(day(10)).await;
        let owner = Uuid::new_v4();

        let state = ledger.state(owner).await.unwrap();
        assert_eq!(state.remaining(ledger.today(), ledger.limit()), Remaining::Limited(5));

        let QuotaCheck::Allowed(reservation) = ledger.check_and_reserve(owner).await.unwrap() else {
            panic!("expected allowed");
        };
        assert_eq!(reservation.effective_count(), 0);
        assert_eq!(ledger.commit(reservation).await.unwrap(), Remaining::Limited(4));
    }

    #[tokio::test]
    async fn test_exhausted_free_tier_is_rejected() {
        let (_dir, db, ledger) = ledger_on(day(10)).await;
        let owner = Uuid::new_v4();
        seed(&db, owner, 5, day(10)).await;

        let check = ledger.check_and_reserve(owner).await.unwrap();
        assert!(!check.is_allowed());

        // Rejection leaves the stored counter alone
        let state = ledger.state(owner).await.unwrap();
        assert_eq!(state.generations_today, 5);
        assert_eq!(state.last_generation_date, Some(day(10)));
    }

    #[tokio::test]
    async fn test_lazy_reset_on_next_day() {
        let (_dir, db, ledger) = ledger_on(day(11)).await;
        let owner = Uuid::new_v4();
        seed(&db, owner, 5, day(10)).await;

        // Reading does not rewrite the stale counter
        let state = ledger.state(owner).await.unwrap();
        assert_eq!(state.remaining(ledger.today(), ledger.limit()), Remaining::Limited(5));
        assert_eq!(ledger.state(owner).await.unwrap().generations_today, 5);

        let QuotaCheck::Allowed(reservation) = ledger.check_and_reserve(owner).await.unwrap() else {
            panic!("expected allowed after rollover");
        };
        assert_eq!(ledger.commit(reservation).await.unwrap(), Remaining::Limited(4));

        let state = ledger.state(owner).await.unwrap();
        assert_eq!(state.generations_today, 1);
        assert_eq!(state.last_generation_date, Some(day(11)));
    }

    #[tokio::test]
    async fn test_unlimited_tier_always_allowed() {
        let (_dir, db, ledger) = ledger_on(day(10)).await;
        let owner = Uuid::new_v4();
        seed(&db, owner, 12, day(10)).await;
        db.set_tier(owner, Tier::Unlimited).await.unwrap();

        let QuotaCheck::Allowed(reservation) = ledger.check_and_reserve(owner).await.unwrap() else {
            panic!("unlimited tier should never be exhausted");
        };
        assert_eq!(ledger.commit(reservation).await.unwrap(), Remaining::Unlimited);
        assert_eq!(ledger.state(owner).await.unwrap().generations_today, 13);
    }

    #[tokio::test]
    async fn test_reservation_serializes_same_owner() {
        let (_dir, db, ledger) = ledger_on(day(10)).await;
        let ledger = Arc::new(ledger);
        let owner = Uuid::new_v4();
        seed(&db, owner, 4, day(10)).await;

        let QuotaCheck::Allowed(first) = ledger.check_and_reserve(owner).await.unwrap() else {
            panic!("expected allowed");
        };

        let contender = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.check_and_reserve(owner).await.unwrap().is_allowed() })
        };

        // The second check cannot run while the first reservation is held
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        assert_eq!(ledger.commit(first).await.unwrap(), Remaining::Limited(0));
        assert!(!contender.await.unwrap());
    }

    #[tokio::test]
    async fn test_other_owners_are_not_blocked() {
        let (_dir, _db, ledger) = ledger_on(day(10)).await;
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let held = ledger.check_and_reserve(alice).await.unwrap();
        let other = tokio::time::timeout(Duration::from_secs(1), ledger.check_and_reserve(bob))
            .await
            .expect("bob must not wait on alice")
            .unwrap();

        assert!(held.is_allowed());
        assert!(other.is_allowed());
    }
}
