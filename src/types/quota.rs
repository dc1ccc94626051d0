use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use super::UserId;

/// Generations a free-tier account may run per UTC calendar day.
pub const DAILY_LIMIT: u32 = 5;

/// Account capability flag. Changed only by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Unlimited,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Unlimited => "unlimited",
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Tier::Unlimited)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "unlimited" | "pro" => Ok(Tier::Unlimited),
            _ => Err(format!("unknown tier: {}", s)),
        }
    }
}

/// Persisted daily counter for one account.
///
/// `generations_today` only counts for `last_generation_date`. Reads on a
/// later day see zero; the stored row is rewritten on the next commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaState {
    pub user_id: UserId,
    pub tier: Tier,
    pub generations_today: u32,
    pub last_generation_date: Option<NaiveDate>,
}

impl QuotaState {
    /// A fresh free-tier account that has never generated.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            tier: Tier::Free,
            generations_today: 0,
            last_generation_date: None,
        }
    }

    /// Count that applies on `today`, after the lazy day rollover.
    pub fn effective_count(&self, today: NaiveDate) -> u32 {
        if self.last_generation_date == Some(today) {
            self.generations_today
        } else {
            0
        }
    }

    /// Budget left on `today` against `limit`.
    pub fn remaining(&self, today: NaiveDate, limit: u32) -> Remaining {
        if self.tier.is_unlimited() {
            Remaining::Unlimited
        } else {
            Remaining::Limited(limit.saturating_sub(self.effective_count(today)))
        }
    }
}

/// Remaining generations, rendered as an integer or `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Limited(u32),
    Unlimited,
}

impl Serialize for Remaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Remaining::Limited(n) => serializer.serialize_u32(*n),
            Remaining::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl std::fmt::Display for Remaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Remaining::Limited(n) => write!(f, "{}", n),
            Remaining::Unlimited => write!(f, "unlimited"),
        }
    }
}
