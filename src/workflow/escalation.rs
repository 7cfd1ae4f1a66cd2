use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Urgency label attached to resubmission notifications. Annotates the
/// outbound payload only; stored state and transition eligibility are
/// unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationLevel {
    Normal,
    Elevated,
    Critical,
}

impl EscalationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationLevel::Normal => "normal",
            EscalationLevel::Elevated => "elevated",
            EscalationLevel::Critical => "critical",
        }
    }
}

/// Pluggable escalation rule for resubmissions. The real business formula
/// has not been confirmed with stakeholders; implementations are injected
/// into the engine so the rule can change without touching transitions.
pub trait EscalationPolicy: Send + Sync {
    fn assess(
        &self,
        original_submitted_at: Option<DateTime<Utc>>,
        rejected_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> EscalationLevel;
}

/// Provisional default: grade by how long the rejection has been sitting.
/// Falls back to the original submission time when the rejection timestamp
/// is missing.
#[derive(Debug, Clone)]
pub struct TimeSinceRejectionPolicy {
    pub elevated_after: Duration,
    pub critical_after: Duration,
}

impl Default for TimeSinceRejectionPolicy {
    fn default() -> Self {
        Self {
            elevated_after: Duration::hours(24),
            critical_after: Duration::hours(72),
        }
    }
}

impl EscalationPolicy for TimeSinceRejectionPolicy {
    fn assess(
        &self,
        original_submitted_at: Option<DateTime<Utc>>,
        rejected_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> EscalationLevel {
        let Some(since) = rejected_at.or(original_submitted_at) else {
            return EscalationLevel::Normal;
        };

        let age = now - since;
        if age >= self.critical_after {
            EscalationLevel::Critical
        } else if age >= self.elevated_after {
            EscalationLevel::Elevated
        } else {
            EscalationLevel::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hours_ago: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Some(now - Duration::hours(hours_ago))
    }

    #[test]
    fn grades_by_rejection_age() {
        let policy = TimeSinceRejectionPolicy::default();
        let now = Utc::now();

        assert_eq!(policy.assess(None, at(1, now), now), EscalationLevel::Normal);
        assert_eq!(
            policy.assess(None, at(30, now), now),
            EscalationLevel::Elevated
        );
        assert_eq!(
            policy.assess(None, at(100, now), now),
            EscalationLevel::Critical
        );
    }

    #[test]
    fn falls_back_to_submission_time() {
        let policy = TimeSinceRejectionPolicy::default();
        let now = Utc::now();

        assert_eq!(
            policy.assess(at(100, now), None, now),
            EscalationLevel::Critical
        );
        assert_eq!(policy.assess(None, None, now), EscalationLevel::Normal);
    }
}
