use anyhow::Result;
use entitlement_service::{EntitlementDecision, EntitlementGate, UsageSummary};
use error_common::{log_error, ErrorContext, ScribeError};
use note_generation::{Domain, GenerationReport, NoteGenerator};
use tracing::{info, warn};
use uuid::Uuid;

/// Result of the `generate` command
#[derive(Debug)]
pub enum GenerateOutcome {
    Denied(EntitlementDecision),
    Generated {
        report: GenerationReport,
        /// Whether the note was counted against the user's plan
        billed: bool,
    },
}

/// Reserve usage, generate, and hand the reservation back when the note
/// came from the offline template.
pub async fn generate(
    gate: &EntitlementGate,
    generator: &NoteGenerator,
    user_id: Uuid,
    domain: Domain,
    transcript: &str,
) -> Result<GenerateOutcome> {
    let reservation = gate.reserve_usage(user_id).await.map_err(ScribeError::from)?;
    if let Some(err) = reservation.decision.denial_error() {
        let context = ErrorContext::new()
            .with_user_id(user_id.to_string())
            .add_context("domain", domain.as_str());
        log_error("generate", &err, &context);
        return Ok(GenerateOutcome::Denied(reservation.decision));
    }

    let report = generator.generate_with_report(transcript, domain).await;

    let billed = if report.note.is_fallback() {
        if reservation.counted {
            let usage = gate.release_usage(&reservation).await.map_err(ScribeError::from)?;
            warn!(user_id = %user_id, usage = usage, "Offline note not billed, reservation released");
        }
        false
    } else {
        reservation.counted
    };

    info!(
        user_id = %user_id,
        domain = %domain,
        source = ?report.note.source(),
        billed = billed,
        "Generate command finished"
    );
    Ok(GenerateOutcome::Generated { report, billed })
}

pub async fn check(gate: &EntitlementGate, user_id: Uuid) -> Result<EntitlementDecision> {
    Ok(gate.check_entitlement(user_id).await.map_err(ScribeError::from)?)
}

pub async fn usage(gate: &EntitlementGate, user_id: Uuid) -> Result<UsageSummary> {
    Ok(gate.usage_summary(user_id).await.map_err(ScribeError::from)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use entitlement_service::*;
    use note_generation::ProviderPreference;
    use std::sync::Arc;

    fn setup(limit: u32, usage: u32) -> (EntitlementGate, Uuid) {
        let repo = Arc::new(InMemoryEntitlementRepository::new());
        let user = UserAccount::new("dr.lee@clinic.org");
        let user_id = user.id;
        repo.insert_user(user);
        repo.insert_plan(Plan {
            id: "free".to_string(),
            tier: PlanTier::Free,
            monthly_limit: Some(limit),
        });
        repo.insert_subscription(Subscription {
            user_id,
            plan_id: "free".to_string(),
            status: SubscriptionStatus::Active,
            current_period_end: None,
        });
        repo.set_usage(user_id, MonthKey::current(), usage);
        (EntitlementGate::new(repo), user_id)
    }

    fn offline_generator() -> NoteGenerator {
        NoteGenerator::with_providers(None, None, ProviderPreference::Auto)
    }

    #[tokio::test]
    async fn test_offline_note_is_not_billed() {
        let (gate, user_id) = setup(10, 2);
        let outcome = generate(&gate, &offline_generator(), user_id, Domain::Dental, "I'm Maria, my tooth hurts")
            .await
            .unwrap();

        match outcome {
            GenerateOutcome::Generated { report, billed } => {
                assert!(!billed);
                assert!(report.note.is_fallback());
                assert_eq!(report.note.get("patient"), Some("Maria"));
            }
            GenerateOutcome::Denied(decision) => panic!("unexpected denial {:?}", decision),
        }
        assert_eq!(usage(&gate, user_id).await.unwrap().usage, 2);
    }

    #[tokio::test]
    async fn test_denied_user_never_reaches_generator() {
        let (gate, user_id) = setup(5, 5);
        let outcome = generate(&gate, &offline_generator(), user_id, Domain::Medical, "cough")
            .await
            .unwrap();

        match outcome {
            GenerateOutcome::Denied(decision) => {
                assert_eq!(decision, EntitlementDecision::limit_exceeded(5, 5));
            }
            GenerateOutcome::Generated { .. } => panic!("limit should have been enforced"),
        }
        assert_eq!(check(&gate, user_id).await.unwrap().reason, Some(DenialReason::LimitExceeded));
    }

    #[tokio::test]
    async fn test_unknown_user_is_an_error() {
        let (gate, _) = setup(5, 0);
        let err = check(&gate, Uuid::new_v4()).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
