//! User profile, plan tiers and quota limits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    #[default]
    Free,
    Pro,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "free",
            PlanType::Pro => "pro",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(PlanType::Free),
            "pro" => Some(PlanType::Pro),
            _ => None,
        }
    }
}

/// Per-user quota state, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub plan: PlanType,
    pub searches_today: u32,
    pub last_search_date: NaiveDate,
    pub total_leads_extracted: u64,
    pub subscription_active: bool,
}

impl UserProfile {
    /// A fresh free-tier profile.
    pub fn new(email: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            email: email.into(),
            plan: PlanType::Free,
            searches_today: 0,
            last_search_date: today,
            total_leads_extracted: 0,
            subscription_active: false,
        }
    }

    /// Reset the daily counter if `today` is a new day. Returns true if reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_search_date == today {
            return false;
        }
        self.searches_today = 0;
        self.last_search_date = today;
        true
    }

    pub(crate) fn apply_usage(&mut self, lead_count: usize) {
        self.searches_today = self.searches_today.saturating_add(1);
        self.total_leads_extracted = self
            .total_leads_extracted
            .saturating_add(lead_count as u64);
    }

    pub(crate) fn upgrade(&mut self) {
        self.plan = PlanType::Pro;
        self.subscription_active = true;
    }
}

/// Which ceiling a quota check tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    /// Runs started today reached the plan's daily ceiling
    DailyRuns,
    /// Leads extracted over the account's lifetime reached the plan's ceiling
    LifetimeLeads,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::DailyRuns => f.write_str("daily run limit reached"),
            LimitKind::LifetimeLeads => f.write_str("lifetime lead limit reached"),
        }
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Denied(LimitKind),
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed)
    }
}

/// Ceilings for one plan. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    pub daily_runs: Option<u32>,
    pub lifetime_leads: Option<u64>,
}

impl TierLimits {
    pub const UNLIMITED: TierLimits = TierLimits {
        daily_runs: None,
        lifetime_leads: None,
    };
}

/// Ceilings for every plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub free: TierLimits,
    pub pro: TierLimits,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            free: TierLimits {
                daily_runs: Some(3),
                lifetime_leads: Some(1000),
            },
            pro: TierLimits::UNLIMITED,
        }
    }
}

impl PlanLimits {
    /// Limits for a given plan.
    pub fn for_plan(&self, plan: PlanType) -> TierLimits {
        match plan {
            PlanType::Free => self.free,
            PlanType::Pro => self.pro,
        }
    }

    /// Set the free tier's daily run ceiling.
    pub fn with_free_daily_runs(mut self, runs: Option<u32>) -> Self {
        self.free.daily_runs = runs;
        self
    }

    /// Set the free tier's lifetime lead ceiling.
    pub fn with_free_lifetime_leads(mut self, leads: Option<u64>) -> Self {
        self.free.lifetime_leads = leads;
        self
    }
}
