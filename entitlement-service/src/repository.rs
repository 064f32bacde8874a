use crate::{error::EntitlementResult, models::*};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Storage collaborator for entitlement state
#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    async fn get_user(&self, user_id: Uuid) -> EntitlementResult<Option<UserAccount>>;

    async fn get_subscription(&self, user_id: Uuid) -> EntitlementResult<Option<Subscription>>;

    async fn get_plan(&self, plan_id: &str) -> EntitlementResult<Option<Plan>>;

    /// Case-insensitive whitelist lookup
    async fn is_whitelisted(&self, email: &str) -> EntitlementResult<bool>;

    async fn add_to_whitelist(&self, entry: WhitelistEntry) -> EntitlementResult<()>;

    /// Returns whether an entry was removed
    async fn remove_from_whitelist(&self, email: &str) -> EntitlementResult<bool>;

    /// Usage count for the month, zero when no record exists
    async fn get_usage(&self, user_id: Uuid, month: &MonthKey) -> EntitlementResult<u32>;

    /// Create-or-increment the month's counter, returning the new count
    async fn increment_usage(&self, user_id: Uuid, month: &MonthKey) -> EntitlementResult<u32>;

    /// Increment only while the count is below `limit` (atomic)
    async fn try_reserve(
        &self,
        user_id: Uuid,
        month: &MonthKey,
        limit: u32,
    ) -> EntitlementResult<ReserveOutcome>;

    /// Saturating decrement, returning the new count
    async fn decrement_usage(&self, user_id: Uuid, month: &MonthKey) -> EntitlementResult<u32>;
}

/// Initial contents for the in-memory repository
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositorySeed {
    #[serde(default)]
    pub users: Vec<UserAccount>,
    #[serde(default)]
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub whitelist: Vec<WhitelistEntry>,
    #[serde(default)]
    pub usage: Vec<UsageRecord>,
}

/// In-memory entitlement repository for testing and development
pub struct InMemoryEntitlementRepository {
    users: Arc<DashMap<Uuid, UserAccount>>,
    plans: Arc<DashMap<String, Plan>>,
    subscriptions: Arc<DashMap<Uuid, Subscription>>,
    whitelist: Arc<DashMap<String, WhitelistEntry>>,
    usage: Arc<DashMap<(Uuid, MonthKey), u32>>,
}

impl InMemoryEntitlementRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            plans: Arc::new(DashMap::new()),
            subscriptions: Arc::new(DashMap::new()),
            whitelist: Arc::new(DashMap::new()),
            usage: Arc::new(DashMap::new()),
        }
    }

    pub fn from_seed(seed: RepositorySeed) -> Self {
        let repo = Self::new();
        for user in seed.users {
            repo.insert_user(user);
        }
        for plan in seed.plans {
            repo.insert_plan(plan);
        }
        for subscription in seed.subscriptions {
            repo.insert_subscription(subscription);
        }
        for entry in seed.whitelist {
            repo.whitelist.insert(normalize_email(&entry.email), entry);
        }
        for record in seed.usage {
            repo.usage.insert((record.user_id, record.month), record.count);
        }
        repo
    }

    pub fn insert_user(&self, user: UserAccount) {
        self.users.insert(user.id, user);
    }

    pub fn insert_plan(&self, plan: Plan) {
        self.plans.insert(plan.id.clone(), plan);
    }

    pub fn insert_subscription(&self, subscription: Subscription) {
        self.subscriptions.insert(subscription.user_id, subscription);
    }

    pub fn set_usage(&self, user_id: Uuid, month: MonthKey, count: u32) {
        self.usage.insert((user_id, month), count);
    }
}

impl Default for InMemoryEntitlementRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntitlementRepository for InMemoryEntitlementRepository {
    async fn get_user(&self, user_id: Uuid) -> EntitlementResult<Option<UserAccount>> {
        Ok(self.users.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn get_subscription(&self, user_id: Uuid) -> EntitlementResult<Option<Subscription>> {
        Ok(self.subscriptions.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn get_plan(&self, plan_id: &str) -> EntitlementResult<Option<Plan>> {
        Ok(self.plans.get(plan_id).map(|entry| entry.value().clone()))
    }

    async fn is_whitelisted(&self, email: &str) -> EntitlementResult<bool> {
        Ok(self.whitelist.contains_key(&normalize_email(email)))
    }

    async fn add_to_whitelist(&self, entry: WhitelistEntry) -> EntitlementResult<()> {
        self.whitelist.insert(normalize_email(&entry.email), entry);
        Ok(())
    }

    async fn remove_from_whitelist(&self, email: &str) -> EntitlementResult<bool> {
        Ok(self.whitelist.remove(&normalize_email(email)).is_some())
    }

    async fn get_usage(&self, user_id: Uuid, month: &MonthKey) -> EntitlementResult<u32> {
        let key = (user_id, month.clone());
        Ok(self.usage.get(&key).map(|count| *count).unwrap_or(0))
    }

    async fn increment_usage(&self, user_id: Uuid, month: &MonthKey) -> EntitlementResult<u32> {
        let mut count = self.usage.entry((user_id, month.clone())).or_insert(0);
        *count = count.saturating_add(1);
        Ok(*count)
    }

    async fn try_reserve(
        &self,
        user_id: Uuid,
        month: &MonthKey,
        limit: u32,
    ) -> EntitlementResult<ReserveOutcome> {
        // The entry guard holds the shard lock across compare and increment.
        let mut count = self.usage.entry((user_id, month.clone())).or_insert(0);
        if *count >= limit {
            return Ok(ReserveOutcome::AtLimit(*count));
        }
        *count += 1;
        Ok(ReserveOutcome::Reserved(*count))
    }

    async fn decrement_usage(&self, user_id: Uuid, month: &MonthKey) -> EntitlementResult<u32> {
        let key = (user_id, month.clone());
        match self.usage.get_mut(&key) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                Ok(*count)
            }
            None => Ok(0),
        }
    }
}
