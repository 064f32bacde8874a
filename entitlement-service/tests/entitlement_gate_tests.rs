//! Gate behaviour across roles, subscriptions and months
//!
//! Scenarios:
//! 1. Whitelisted user over the plan limit is still allowed
//! 2. Limit reached returns exact usage and limit
//! 3. Admin bypasses everything, including a lock
//! 4. Locked account beats the whitelist
//! 5. Expired and inactive subscriptions are told apart
//! 6. Usage resets when the month rolls over, and a release credits the
//!    month the unit was reserved in
//! 7. Concurrent reservations never exceed the limit

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use entitlement_service::*;
use std::sync::Arc;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 14, 0, 0).unwrap()
}

struct Fixture {
    repo: Arc<InMemoryEntitlementRepository>,
    gate: Arc<EntitlementGate>,
}

impl Fixture {
    fn new() -> Self {
        let repo = Arc::new(InMemoryEntitlementRepository::new());
        repo.insert_plan(Plan {
            id: "free".to_string(),
            tier: PlanTier::Free,
            monthly_limit: Some(10),
        });
        repo.insert_plan(Plan {
            id: "enterprise".to_string(),
            tier: PlanTier::Enterprise,
            monthly_limit: None,
        });
        let gate = Arc::new(EntitlementGate::new(repo.clone()));
        Self { repo, gate }
    }

    fn user(&self, account: UserAccount) -> Uuid {
        let id = account.id;
        self.repo.insert_user(account);
        id
    }

    fn subscribe(&self, user_id: Uuid, plan_id: &str, status: SubscriptionStatus, end: Option<DateTime<Utc>>) {
        self.repo.insert_subscription(Subscription {
            user_id,
            plan_id: plan_id.to_string(),
            status,
            current_period_end: end,
        });
    }

    fn usage(&self, user_id: Uuid, count: u32) {
        self.repo
            .set_usage(user_id, MonthKey::from_datetime(now()), count);
    }
}

#[tokio::test]
async fn test_whitelisted_user_over_limit_is_allowed() {
    let fx = Fixture::new();
    let user_id = fx.user(UserAccount::new("Pilot@Clinic.org"));
    fx.subscribe(user_id, "free", SubscriptionStatus::Active, None);
    fx.usage(user_id, 50);
    fx.repo
        .add_to_whitelist(WhitelistEntry::new("pilot@clinic.org"))
        .await
        .unwrap();

    let decision = fx.gate.check_entitlement_at(user_id, now()).await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.limit, None);
    assert_eq!(decision.reason, None);

    // removing the entry puts the plan limit back in force
    assert!(fx.repo.remove_from_whitelist("PILOT@clinic.org").await.unwrap());
    let decision = fx.gate.check_entitlement_at(user_id, now()).await.unwrap();
    assert_eq!(decision.reason, Some(DenialReason::LimitExceeded));
}

#[tokio::test]
async fn test_limit_exceeded_reports_exact_values() {
    let fx = Fixture::new();
    let user_id = fx.user(UserAccount::new("dr.lee@clinic.org"));
    fx.subscribe(user_id, "free", SubscriptionStatus::Active, None);

    fx.usage(user_id, 9);
    let decision = fx.gate.check_entitlement_at(user_id, now()).await.unwrap();
    assert_eq!(decision, EntitlementDecision::allow(9, Some(10)));

    fx.usage(user_id, 10);
    let decision = fx.gate.check_entitlement_at(user_id, now()).await.unwrap();
    assert_eq!(
        serde_json::to_value(&decision).unwrap(),
        serde_json::json!({
            "allowed": false,
            "reason": "limit_exceeded",
            "usage": 10,
            "limit": 10
        })
    );
}

#[tokio::test]
async fn test_admin_bypasses_every_check() {
    let fx = Fixture::new();
    let admin = fx.user(
        UserAccount::new("ops@clinic.org")
            .with_role(UserRole::Admin)
            .with_status(AccountStatus::Locked),
    );

    let decision = fx.gate.check_entitlement_at(admin, now()).await.unwrap();
    assert!(decision.allowed);

    let reservation = fx.gate.reserve_usage_at(admin, now()).await.unwrap();
    assert!(reservation.decision.allowed);
    assert!(!reservation.counted);
}

#[tokio::test]
async fn test_locked_account_overrides_whitelist() {
    let fx = Fixture::new();
    let user_id = fx.user(UserAccount::new("locked@clinic.org").with_status(AccountStatus::Locked));
    fx.subscribe(user_id, "enterprise", SubscriptionStatus::Active, None);
    fx.repo
        .add_to_whitelist(WhitelistEntry::new("locked@clinic.org"))
        .await
        .unwrap();

    let decision = fx.gate.check_entitlement_at(user_id, now()).await.unwrap();
    assert_eq!(decision, EntitlementDecision::deny(DenialReason::Locked));
    let err = decision.denial_error().unwrap();
    assert_eq!(err.code(), "ENT_6005");
}

#[tokio::test]
async fn test_subscription_states() {
    let fx = Fixture::new();
    let cases = [
        (None, None, DenialReason::NoSubscription),
        (
            Some(SubscriptionStatus::Canceled),
            Some(now() - Duration::days(3)),
            DenialReason::SubscriptionExpired,
        ),
        (
            Some(SubscriptionStatus::PastDue),
            Some(now() + Duration::days(3)),
            DenialReason::InactiveSubscription,
        ),
        (Some(SubscriptionStatus::Inactive), None, DenialReason::InactiveSubscription),
    ];

    for (status, end, expected) in cases {
        let user_id = fx.user(UserAccount::new(format!("{}@clinic.org", Uuid::new_v4())));
        if let Some(status) = status {
            fx.subscribe(user_id, "free", status, end);
        }
        let decision = fx.gate.check_entitlement_at(user_id, now()).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(expected), "status {:?}", status);
    }

    // trial and active grant access whatever the period end says
    for (status, end) in [
        (SubscriptionStatus::Trial, now() + Duration::days(7)),
        (SubscriptionStatus::Trial, now() - Duration::hours(1)),
        (SubscriptionStatus::Active, now() - Duration::days(2)),
    ] {
        let user_id = fx.user(UserAccount::new(format!("{}@clinic.org", Uuid::new_v4())));
        fx.subscribe(user_id, "free", status, Some(end));
        let decision = fx.gate.check_entitlement_at(user_id, now()).await.unwrap();
        assert!(decision.allowed, "status {:?} ending {}", status, end);
    }
}

#[tokio::test]
async fn test_usage_resets_on_month_rollover() {
    let fx = Fixture::new();
    let user_id = fx.user(UserAccount::new("dr.park@clinic.org"));
    fx.subscribe(user_id, "free", SubscriptionStatus::Active, None);

    let end_of_october = Utc.with_ymd_and_hms(2026, 10, 31, 23, 59, 0).unwrap();
    for _ in 0..10 {
        fx.gate.increment_usage_at(user_id, end_of_october).await.unwrap();
    }
    let decision = fx.gate.check_entitlement_at(user_id, end_of_october).await.unwrap();
    assert_eq!(decision.reason, Some(DenialReason::LimitExceeded));

    let november = end_of_october + Duration::minutes(2);
    let decision = fx.gate.check_entitlement_at(user_id, november).await.unwrap();
    assert_eq!(decision, EntitlementDecision::allow(0, Some(10)));

    let summary = fx.gate.usage_summary_at(user_id, november).await.unwrap();
    assert_eq!(summary.month.as_str(), "2026-11");
    assert_eq!(summary.remaining, Some(10));
}

#[tokio::test]
async fn test_release_after_midnight_credits_reserved_month() {
    let fx = Fixture::new();
    let user_id = fx.user(UserAccount::new("late@clinic.org"));
    fx.subscribe(user_id, "free", SubscriptionStatus::Active, None);

    let reserved_at = Utc.with_ymd_and_hms(2026, 10, 31, 23, 59, 59).unwrap();
    let released_at = Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 30).unwrap();
    fx.repo
        .set_usage(user_id, MonthKey::from_datetime(released_at), 4);

    let reservation = fx.gate.reserve_usage_at(user_id, reserved_at).await.unwrap();
    assert!(reservation.counted);
    fx.gate.release_usage(&reservation).await.unwrap();

    let october = fx.gate.usage_summary_at(user_id, reserved_at).await.unwrap();
    let november = fx.gate.usage_summary_at(user_id, released_at).await.unwrap();
    assert_eq!(october.usage, 0);
    assert_eq!(november.usage, 4);
}

#[tokio::test]
async fn test_concurrent_reservations_respect_limit() {
    let fx = Fixture::new();
    let user_id = fx.user(UserAccount::new("busy@clinic.org"));
    fx.subscribe(user_id, "free", SubscriptionStatus::Active, None);
    fx.usage(user_id, 4);

    let mut handles = Vec::new();
    for _ in 0..32 {
        let gate = fx.gate.clone();
        handles.push(tokio::spawn(async move {
            gate.reserve_usage_at(user_id, now()).await.unwrap()
        }));
    }

    let mut granted = 0;
    for handle in handles {
        let reservation = handle.await.unwrap();
        if reservation.counted {
            granted += 1;
            assert!(reservation.decision.usage.unwrap() <= 10);
        } else {
            assert_eq!(reservation.decision.reason, Some(DenialReason::LimitExceeded));
        }
    }

    assert_eq!(granted, 6);
    let summary = fx.gate.usage_summary_at(user_id, now()).await.unwrap();
    assert_eq!(summary.usage, 10);
}

#[test]
fn test_unlimited_plan_summary() {
    let fx = Fixture::new();
    let user_id = fx.user(UserAccount::new("group@clinic.org"));
    fx.subscribe(user_id, "enterprise", SubscriptionStatus::Active, None);
    fx.usage(user_id, 1200);

    let summary = tokio_test::block_on(fx.gate.usage_summary_at(user_id, now())).unwrap();
    assert_eq!(summary.usage, 1200);
    assert_eq!(summary.limit, None);
    assert_eq!(summary.remaining, None);
}
