use std::path::Path;

use anyhow::{Context, Result};
use entitlement_service::{InMemoryEntitlementRepository, RepositorySeed};
use tracing::info;

/// Parse a YAML seed document.
pub fn parse_seed(text: &str) -> Result<RepositorySeed> {
    serde_yaml::from_str(text).context("Invalid entitlement seed file")
}

/// Build the in-memory store from the seed file at `path`.
pub async fn load_repository(path: &Path) -> Result<InMemoryEntitlementRepository> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed = parse_seed(&text)?;

    info!(
        path = %path.display(),
        users = seed.users.len(),
        plans = seed.plans.len(),
        subscriptions = seed.subscriptions.len(),
        whitelist = seed.whitelist.len(),
        "Loaded entitlement seed"
    );
    Ok(InMemoryEntitlementRepository::from_seed(seed))
}
