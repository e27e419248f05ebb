//! Quota gate trait and the plan-limit implementation.

use crate::types::profile::{LimitKind, PlanLimits, QuotaDecision, UserProfile};

/// Decides whether a user may start a run.
///
/// Checks are synchronous and side-effect free; the accumulator consults
/// the gate once, before any record-source call.
pub trait QuotaGate: Send + Sync {
    fn check(&self, profile: &UserProfile) -> QuotaDecision;
}

impl QuotaGate for PlanLimits {
    /// Daily runs are checked before lifetime leads.
    fn check(&self, profile: &UserProfile) -> QuotaDecision {
        let limits = self.for_plan(profile.plan);

        if let Some(max) = limits.daily_runs {
            if profile.searches_today >= max {
                return QuotaDecision::Denied(LimitKind::DailyRuns);
            }
        }
        if let Some(max) = limits.lifetime_leads {
            if profile.total_leads_extracted >= max {
                return QuotaDecision::Denied(LimitKind::LifetimeLeads);
            }
        }
        QuotaDecision::Allowed
    }
}

impl<T: QuotaGate + ?Sized> QuotaGate for std::sync::Arc<T> {
    fn check(&self, profile: &UserProfile) -> QuotaDecision {
        (**self).check(profile)
    }
}
