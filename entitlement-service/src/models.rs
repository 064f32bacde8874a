use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use error_common::{codes, ScribeError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Clinician,
    Admin,
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Locked,
}

/// Clinician or administrator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: AccountStatus,
}

impl UserAccount {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            role: UserRole::Clinician,
            status: AccountStatus::Active,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_locked(&self) -> bool {
        self.status == AccountStatus::Locked
    }
}

/// Plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Basic,
    Professional,
    Enterprise,
}

/// Subscription plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub tier: PlanTier,
    /// Notes per calendar month; `None` means unlimited
    #[serde(default)]
    pub monthly_limit: Option<u32>,
}

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trial,
    PastDue,
    Canceled,
    Inactive,
}

/// A user's subscription to a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: Uuid,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn period_ended(&self, now: DateTime<Utc>) -> bool {
        self.current_period_end.is_some_and(|end| end < now)
    }

    /// Denial for a subscription that does not grant access at `now`, if any.
    pub fn standing_at(&self, now: DateTime<Utc>) -> Option<DenialReason> {
        match self.status {
            SubscriptionStatus::Active | SubscriptionStatus::Trial => None,
            _ if self.period_ended(now) => Some(DenialReason::SubscriptionExpired),
            _ => Some(DenialReason::InactiveSubscription),
        }
    }
}

/// Email that bypasses plan limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub email: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl WhitelistEntry {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            note: None,
        }
    }
}

/// Normalize an email for whitelist comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Calendar month (UTC) in `YYYY-MM` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.format("%Y-%m").to_string())
    }

    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        match NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d") {
            Ok(first) if trimmed.len() == 7 => Ok(Self(first.format("%Y-%m").to_string())),
            _ => Err(format!("invalid month key '{}', expected YYYY-MM", value)),
        }
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Usage counter for one user and month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: Uuid,
    pub month: MonthKey,
    pub count: u32,
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    NoSubscription,
    InactiveSubscription,
    SubscriptionExpired,
    LimitExceeded,
    Locked,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSubscription => "no_subscription",
            Self::InactiveSubscription => "inactive_subscription",
            Self::SubscriptionExpired => "subscription_expired",
            Self::LimitExceeded => "limit_exceeded",
            Self::Locked => "locked",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSubscription => codes::entitlement::NO_SUBSCRIPTION,
            Self::InactiveSubscription => codes::entitlement::INACTIVE_SUBSCRIPTION,
            Self::SubscriptionExpired => codes::entitlement::SUBSCRIPTION_EXPIRED,
            Self::LimitExceeded => codes::entitlement::LIMIT_EXCEEDED,
            Self::Locked => codes::entitlement::ACCOUNT_LOCKED,
        }
    }

    /// User-facing explanation
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoSubscription => "No subscription found. Choose a plan to start generating notes.",
            Self::InactiveSubscription => "Your subscription is not active. Update billing to continue.",
            Self::SubscriptionExpired => "Your subscription has expired. Renew or upgrade your plan.",
            Self::LimitExceeded => "Monthly note limit reached. Upgrade your plan for more notes.",
            Self::Locked => "This account is locked. Contact support.",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gate verdict for a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementDecision {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<u32>,
    /// `null` when unlimited
    #[serde(default)]
    pub limit: Option<u32>,
}

impl EntitlementDecision {
    pub fn allow(usage: u32, limit: Option<u32>) -> Self {
        Self {
            allowed: true,
            reason: None,
            usage: Some(usage),
            limit,
        }
    }

    /// Allowed without metering (admin or whitelisted)
    pub fn unmetered() -> Self {
        Self {
            allowed: true,
            reason: None,
            usage: None,
            limit: None,
        }
    }

    pub fn deny(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            usage: None,
            limit: None,
        }
    }

    pub fn limit_exceeded(usage: u32, limit: u32) -> Self {
        Self {
            allowed: false,
            reason: Some(DenialReason::LimitExceeded),
            usage: Some(usage),
            limit: Some(limit),
        }
    }

    /// Denial as an error for API edges; `None` when allowed.
    pub fn denial_error(&self) -> Option<ScribeError> {
        self.reason.map(|reason| ScribeError::Entitlement {
            code: reason.code(),
            message: reason.message().to_string(),
        })
    }
}

/// Result of an atomic usage reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageReservation {
    pub user_id: Uuid,
    /// Month the unit was taken from; a release returns it to this month
    pub month: MonthKey,
    pub decision: EntitlementDecision,
    /// Whether a usage unit was taken and must be released if unused
    pub counted: bool,
}

/// Repository-level outcome of a conditional increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved(u32),
    AtLimit(u32),
}

/// Current month usage for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub month: MonthKey,
    pub usage: u32,
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
}
