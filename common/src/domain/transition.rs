use std::sync::Arc;

use thiserror::Error;

use crate::domain::PublicationStatus;

use PublicationStatus::*;

/// Auxiliary data required by specific transition guards: who reviewed,
/// why something was rejected, who published.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    pub comments: Option<String>,
    pub reviewer_id: Option<String>,
    pub rejection_reason: Option<String>,
    pub publisher_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct TransitionDenied {
    pub reason: String,
}

impl TransitionDenied {
    fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Decides whether a status change is legal. Pure and stateless; the
/// orchestrator consumes it through this contract only, so variants can be
/// swapped at construction time without touching any caller.
pub trait TransitionPolicy: Send + Sync + 'static {
    /// Directed transition table: statuses reachable from `from`.
    fn allowed_targets(&self, from: PublicationStatus) -> &'static [PublicationStatus];

    fn validate(
        &self,
        from: PublicationStatus,
        to: PublicationStatus,
        context: &TransitionContext,
    ) -> Result<(), TransitionDenied>;
}

/// The transition table used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransitionPolicy;

impl TransitionPolicy for DefaultTransitionPolicy {
    fn allowed_targets(&self, from: PublicationStatus) -> &'static [PublicationStatus] {
        match from {
            Draft => &[InReview],
            InReview => &[Approved, Rejected, Draft],
            Approved => &[Published, Rejected, InReview],
            Published => &[Rejected],
            Rejected => &[Draft],
        }
    }

    fn validate(
        &self,
        from: PublicationStatus,
        to: PublicationStatus,
        context: &TransitionContext,
    ) -> Result<(), TransitionDenied> {
        check_table(self.allowed_targets(from), from, to)?;
        check_context_guards(to, context)
    }
}

/// Stricter variant: no re-entry into earlier states, and approvals must
/// carry substantial review comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictTransitionPolicy;

/// Minimum review-comment length the strict policy demands on approval.
const STRICT_MIN_REVIEW_COMMENT_CHARS: usize = 100;

impl TransitionPolicy for StrictTransitionPolicy {
    fn allowed_targets(&self, from: PublicationStatus) -> &'static [PublicationStatus] {
        match from {
            Draft => &[InReview],
            InReview => &[Approved, Rejected],
            Approved => &[Published, Rejected],
            Published => &[Rejected],
            Rejected => &[Draft],
        }
    }

    fn validate(
        &self,
        from: PublicationStatus,
        to: PublicationStatus,
        context: &TransitionContext,
    ) -> Result<(), TransitionDenied> {
        check_table(self.allowed_targets(from), from, to)?;
        check_context_guards(to, context)?;

        if to == Approved {
            let comment_chars = context
                .comments
                .as_deref()
                .map(|c| c.chars().count())
                .unwrap_or(0);
            if comment_chars < STRICT_MIN_REVIEW_COMMENT_CHARS {
                return Err(TransitionDenied::new(format!(
                    "Approval requires at least {STRICT_MIN_REVIEW_COMMENT_CHARS} character review comments"
                )));
            }
        }

        Ok(())
    }
}

fn check_table(
    targets: &[PublicationStatus],
    from: PublicationStatus,
    to: PublicationStatus,
) -> Result<(), TransitionDenied> {
    if targets.contains(&to) {
        Ok(())
    } else {
        Err(TransitionDenied::new(format!(
            "Cannot transition from {from} to {to}"
        )))
    }
}

fn check_context_guards(
    to: PublicationStatus,
    context: &TransitionContext,
) -> Result<(), TransitionDenied> {
    let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

    match to {
        Approved if !present(&context.reviewer_id) => {
            Err(TransitionDenied::new("Approval requires reviewer ID"))
        }
        Rejected if !present(&context.rejection_reason) => {
            Err(TransitionDenied::new("Rejection requires a reason"))
        }
        Published if !present(&context.publisher_id) => {
            Err(TransitionDenied::new("Publication requires publisher ID"))
        }
        _ => Ok(()),
    }
}

/// Selects the transition policy once, at construction time, keyed by a
/// configuration string. Unknown names fall back to the default policy.
pub fn transition_policy(name: &str) -> Arc<dyn TransitionPolicy> {
    match name {
        "strict" => Arc::new(StrictTransitionPolicy),
        "default" => Arc::new(DefaultTransitionPolicy),
        other => {
            tracing::warn!(policy = other, "unknown transition policy, using default");
            Arc::new(DefaultTransitionPolicy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Context that satisfies every guard, so table membership alone decides.
    fn full_context() -> TransitionContext {
        TransitionContext {
            comments: Some("c".repeat(120)),
            reviewer_id: Some("r1".into()),
            rejection_reason: Some("broken".into()),
            publisher_id: Some("p1".into()),
        }
    }

    #[test]
    fn default_table_is_exact() {
        let policy = DefaultTransitionPolicy;
        let ctx = full_context();

        for from in PublicationStatus::ALL {
            for to in PublicationStatus::ALL {
                let expected = policy.allowed_targets(from).contains(&to);
                let result = policy.validate(from, to, &ctx);
                if expected {
                    assert!(result.is_ok(), "{from} -> {to} should be allowed");
                } else {
                    let denied = result.expect_err("transition outside the table must be denied");
                    assert_eq!(denied.reason, format!("Cannot transition from {from} to {to}"));
                }
            }
        }
    }

    #[test]
    fn default_table_matches_specified_edges() {
        let policy = DefaultTransitionPolicy;
        assert_eq!(policy.allowed_targets(Draft), &[InReview]);
        assert_eq!(policy.allowed_targets(InReview), &[Approved, Rejected, Draft]);
        assert_eq!(policy.allowed_targets(Approved), &[Published, Rejected, InReview]);
        assert_eq!(policy.allowed_targets(Published), &[Rejected]);
        assert_eq!(policy.allowed_targets(Rejected), &[Draft]);
    }

    #[test]
    fn approval_requires_reviewer() {
        let policy = DefaultTransitionPolicy;
        for reviewer in [None, Some(String::new()), Some("   ".into())] {
            let ctx = TransitionContext { reviewer_id: reviewer, ..full_context() };
            let denied = policy.validate(InReview, Approved, &ctx).unwrap_err();
            assert_eq!(denied.reason, "Approval requires reviewer ID");
        }
    }

    #[test]
    fn rejection_requires_reason() {
        let policy = DefaultTransitionPolicy;
        let ctx = TransitionContext { rejection_reason: None, ..full_context() };
        let denied = policy.validate(InReview, Rejected, &ctx).unwrap_err();
        assert_eq!(denied.reason, "Rejection requires a reason");
    }

    #[test]
    fn publishing_requires_publisher() {
        let policy = DefaultTransitionPolicy;
        let ctx = TransitionContext { publisher_id: None, ..full_context() };
        let denied = policy.validate(Approved, Published, &ctx).unwrap_err();
        assert_eq!(denied.reason, "Publication requires publisher ID");
    }

    #[test]
    fn strict_policy_removes_reentry_edges() {
        let policy = StrictTransitionPolicy;
        let ctx = full_context();

        assert!(policy.validate(InReview, Draft, &ctx).is_err());
        assert!(policy.validate(Approved, InReview, &ctx).is_err());
        // The one outward edge PUBLISHED keeps.
        assert!(policy.validate(Published, Rejected, &ctx).is_ok());
        assert!(policy.validate(Published, Draft, &ctx).is_err());
    }

    #[test]
    fn strict_policy_demands_substantial_review_comments() {
        let policy = StrictTransitionPolicy;
        let short = TransitionContext { comments: Some("ok".into()), ..full_context() };
        let denied = policy.validate(InReview, Approved, &short).unwrap_err();
        assert!(denied.reason.contains("100 character"));

        assert!(policy.validate(InReview, Approved, &full_context()).is_ok());
        // The length rule applies to approvals only.
        let rejecting = TransitionContext { comments: None, ..full_context() };
        assert!(policy.validate(InReview, Rejected, &rejecting).is_ok());
    }

    #[test]
    fn factory_selects_by_name_and_falls_back() {
        let ctx = full_context();

        let strict = transition_policy("strict");
        assert!(strict.validate(InReview, Draft, &ctx).is_err());

        for name in ["default", "lenient", ""] {
            let policy = transition_policy(name);
            assert!(policy.validate(InReview, Draft, &ctx).is_ok());
        }
    }
}
