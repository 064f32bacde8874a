use crate::error::{EntitlementError, EntitlementResult};
use crate::models::*;
use crate::repository::EntitlementRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where a user stands before usage is compared against the plan limit
enum Standing {
    /// Decided without looking at usage
    Settled(EntitlementDecision),
    /// Subscribed user whose usage is metered against `limit`
    Metered { limit: Option<u32> },
}

/// Entitlement gate
///
/// Decides whether a user may generate a note, and keeps the monthly usage
/// counter. Denials are returned as values; only storage failures and
/// unknown users are errors.
pub struct EntitlementGate {
    repository: Arc<dyn EntitlementRepository>,
}

impl EntitlementGate {
    pub fn new(repository: Arc<dyn EntitlementRepository>) -> Self {
        Self { repository }
    }

    pub async fn check_entitlement(&self, user_id: Uuid) -> EntitlementResult<EntitlementDecision> {
        self.check_entitlement_at(user_id, Utc::now()).await
    }

    /// Evaluate the gate at `now`.
    ///
    /// Rules apply in order: admin, locked, whitelist, subscription, limit.
    pub async fn check_entitlement_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> EntitlementResult<EntitlementDecision> {
        let decision = match self.standing(user_id, now).await? {
            Standing::Settled(decision) => decision,
            Standing::Metered { limit } => {
                let usage = self
                    .repository
                    .get_usage(user_id, &MonthKey::from_datetime(now))
                    .await?;
                match limit {
                    Some(limit) if usage >= limit => EntitlementDecision::limit_exceeded(usage, limit),
                    _ => EntitlementDecision::allow(usage, limit),
                }
            }
        };
        log_decision(user_id, &decision);
        Ok(decision)
    }

    /// Record one billable note for the current month.
    pub async fn increment_usage(&self, user_id: Uuid) -> EntitlementResult<u32> {
        self.increment_usage_at(user_id, Utc::now()).await
    }

    pub async fn increment_usage_at(&self, user_id: Uuid, now: DateTime<Utc>) -> EntitlementResult<u32> {
        let month = MonthKey::from_datetime(now);
        let count = self.repository.increment_usage(user_id, &month).await?;
        debug!(user_id = %user_id, month = %month, usage = count, "Usage incremented");
        Ok(count)
    }

    /// Check and take one usage unit in a single step.
    pub async fn reserve_usage(&self, user_id: Uuid) -> EntitlementResult<UsageReservation> {
        self.reserve_usage_at(user_id, Utc::now()).await
    }

    /// Like [`check_entitlement_at`](Self::check_entitlement_at), but a
    /// metered user who is allowed also has their counter incremented.
    /// Limited plans use the repository's conditional increment, so
    /// concurrent reservations never push usage past the limit.
    pub async fn reserve_usage_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> EntitlementResult<UsageReservation> {
        let month = MonthKey::from_datetime(now);
        let (decision, counted) = match self.standing(user_id, now).await? {
            Standing::Settled(decision) => (decision, false),
            Standing::Metered { limit: None } => {
                let usage = self.repository.increment_usage(user_id, &month).await?;
                (EntitlementDecision::allow(usage, None), true)
            }
            Standing::Metered { limit: Some(limit) } => {
                match self.repository.try_reserve(user_id, &month, limit).await? {
                    ReserveOutcome::Reserved(usage) => {
                        (EntitlementDecision::allow(usage, Some(limit)), true)
                    }
                    ReserveOutcome::AtLimit(usage) => {
                        (EntitlementDecision::limit_exceeded(usage, limit), false)
                    }
                }
            }
        };
        log_decision(user_id, &decision);
        Ok(UsageReservation {
            user_id,
            month,
            decision,
            counted,
        })
    }

    /// Give back the unit taken by [`reserve_usage`](Self::reserve_usage).
    ///
    /// The unit returns to the month it was reserved in, even when the
    /// calendar has rolled over since. Uncounted reservations change nothing.
    pub async fn release_usage(&self, reservation: &UsageReservation) -> EntitlementResult<u32> {
        let UsageReservation { user_id, month, .. } = reservation;
        if !reservation.counted {
            return self.repository.get_usage(*user_id, month).await;
        }
        let count = self.repository.decrement_usage(*user_id, month).await?;
        debug!(user_id = %user_id, month = %month, usage = count, "Usage released");
        Ok(count)
    }

    pub async fn usage_summary(&self, user_id: Uuid) -> EntitlementResult<UsageSummary> {
        self.usage_summary_at(user_id, Utc::now()).await
    }

    /// Current month usage. Admin and whitelisted users report no limit.
    pub async fn usage_summary_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> EntitlementResult<UsageSummary> {
        let user = self.user(user_id).await?;
        let month = MonthKey::from_datetime(now);
        let usage = self.repository.get_usage(user_id, &month).await?;

        let limit = if user.is_admin() || self.repository.is_whitelisted(&user.email).await? {
            None
        } else {
            match self.repository.get_subscription(user_id).await? {
                Some(subscription) => self.plan(&subscription.plan_id).await?.monthly_limit,
                None => Some(0),
            }
        };

        Ok(UsageSummary {
            month,
            usage,
            limit,
            remaining: limit.map(|limit| limit.saturating_sub(usage)),
        })
    }

    async fn user(&self, user_id: Uuid) -> EntitlementResult<UserAccount> {
        self.repository
            .get_user(user_id)
            .await?
            .ok_or(EntitlementError::UserNotFound(user_id))
    }

    async fn plan(&self, plan_id: &str) -> EntitlementResult<Plan> {
        self.repository
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| EntitlementError::PlanNotFound(plan_id.to_string()))
    }

    async fn standing(&self, user_id: Uuid, now: DateTime<Utc>) -> EntitlementResult<Standing> {
        let user = self.user(user_id).await?;

        if user.is_admin() {
            return Ok(Standing::Settled(EntitlementDecision::unmetered()));
        }
        if user.is_locked() {
            return Ok(Standing::Settled(EntitlementDecision::deny(DenialReason::Locked)));
        }
        if self.repository.is_whitelisted(&user.email).await? {
            return Ok(Standing::Settled(EntitlementDecision::unmetered()));
        }

        let Some(subscription) = self.repository.get_subscription(user_id).await? else {
            return Ok(Standing::Settled(EntitlementDecision::deny(
                DenialReason::NoSubscription,
            )));
        };
        if let Some(reason) = subscription.standing_at(now) {
            return Ok(Standing::Settled(EntitlementDecision::deny(reason)));
        }

        let plan = self.plan(&subscription.plan_id).await?;
        Ok(Standing::Metered {
            limit: plan.monthly_limit,
        })
    }
}

fn log_decision(user_id: Uuid, decision: &EntitlementDecision) {
    match decision.reason {
        None => info!(
            user_id = %user_id,
            usage = ?decision.usage,
            limit = ?decision.limit,
            "Entitlement granted"
        ),
        Some(reason) => warn!(
            user_id = %user_id,
            reason = %reason,
            code = reason.code(),
            usage = ?decision.usage,
            limit = ?decision.limit,
            "Entitlement denied"
        ),
    }
}
