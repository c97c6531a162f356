//! Optimization steps and their transitions
//!
//! A step moves Draft → Previewed → Confirmed | Rejected. Transitions are
//! pure: each returns the next step or the reason it was refused, and the
//! session decides what to do with either.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::{MortgageAccount, RepaymentMethod};
use crate::levers::{EffectSummary, LeverKind, OptimizationLever};

/// Lifecycle position of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    Draft,
    Previewed,
    Confirmed,
    Rejected,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Confirmed | StepStatus::Rejected)
    }
}

/// Terms of one account as they stood when a lever was previewed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub account_id: u32,
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub remaining_term_months: u32,
    pub repayment_method: RepaymentMethod,
    pub lever: Option<OptimizationLever>,
}

impl AccountSnapshot {
    pub fn capture(account: &MortgageAccount, kind: LeverKind) -> Self {
        Self {
            account_id: account.id,
            principal: account.principal,
            annual_rate_percent: account.annual_rate_percent,
            remaining_term_months: account.remaining_term_months,
            repayment_method: account.repayment_method,
            lever: account.lever(kind).cloned(),
        }
    }
}

/// Parameters and computed effect frozen at preview time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSnapshot {
    pub accounts: Vec<AccountSnapshot>,
    pub household: Option<OptimizationLever>,
    pub effect: EffectSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "snapshot", rename_all = "camelCase")]
enum StepState {
    Draft,
    Previewed(StepSnapshot),
    Confirmed(StepSnapshot),
    Rejected,
}

/// Why a transition was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IgnoreReason {
    /// Confirm or reject without a preview of the lever
    NoPreview,
    /// The lever is not the session's current lever
    NotCurrent,
    /// Every lever already has a terminal step
    SessionComplete,
    /// The step is already confirmed or rejected
    AlreadyTerminal,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IgnoreReason::NoPreview => "no preview for this lever",
            IgnoreReason::NotCurrent => "lever is not current",
            IgnoreReason::SessionComplete => "session is complete",
            IgnoreReason::AlreadyTerminal => "step already finished",
        };
        f.write_str(text)
    }
}

/// Result of a confirm or reject call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionOutcome {
    Applied,
    Ignored(IgnoreReason),
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied)
    }
}

/// One lever's passage through the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationStep {
    lever: LeverKind,
    state: StepState,
}

impl OptimizationStep {
    pub fn draft(lever: LeverKind) -> Self {
        Self {
            lever,
            state: StepState::Draft,
        }
    }

    pub fn lever(&self) -> LeverKind {
        self.lever
    }

    pub fn status(&self) -> StepStatus {
        match self.state {
            StepState::Draft => StepStatus::Draft,
            StepState::Previewed(_) => StepStatus::Previewed,
            StepState::Confirmed(_) => StepStatus::Confirmed,
            StepState::Rejected => StepStatus::Rejected,
        }
    }

    /// Snapshot of a previewed or confirmed step
    pub fn snapshot(&self) -> Option<&StepSnapshot> {
        match &self.state {
            StepState::Previewed(snapshot) | StepState::Confirmed(snapshot) => Some(snapshot),
            StepState::Draft | StepState::Rejected => None,
        }
    }

    /// Record a (new) preview; replaces any earlier one
    pub fn previewed(&self, snapshot: StepSnapshot) -> Result<Self, IgnoreReason> {
        match self.state {
            StepState::Draft | StepState::Previewed(_) => Ok(Self {
                lever: self.lever,
                state: StepState::Previewed(snapshot),
            }),
            StepState::Confirmed(_) | StepState::Rejected => Err(IgnoreReason::AlreadyTerminal),
        }
    }

    /// Lock in the previewed snapshot
    pub fn confirmed(&self) -> Result<Self, IgnoreReason> {
        match &self.state {
            StepState::Previewed(snapshot) => Ok(Self {
                lever: self.lever,
                state: StepState::Confirmed(snapshot.clone()),
            }),
            StepState::Draft => Err(IgnoreReason::NoPreview),
            StepState::Confirmed(_) | StepState::Rejected => Err(IgnoreReason::AlreadyTerminal),
        }
    }

    /// Skip the lever; the preview is discarded
    pub fn rejected(&self) -> Result<Self, IgnoreReason> {
        match self.state {
            StepState::Previewed(_) => Ok(Self {
                lever: self.lever,
                state: StepState::Rejected,
            }),
            StepState::Draft => Err(IgnoreReason::NoPreview),
            StepState::Confirmed(_) | StepState::Rejected => Err(IgnoreReason::AlreadyTerminal),
        }
    }

    /// Annual improvement this step contributes once confirmed
    pub fn confirmed_annual_improvement(&self) -> f64 {
        match &self.state {
            StepState::Confirmed(snapshot) => snapshot.effect.annual_improvement,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(annual: f64) -> StepSnapshot {
        let mut effect = EffectSummary::empty(LeverKind::Prepayment);
        effect.annual_improvement = annual;
        StepSnapshot {
            accounts: Vec::new(),
            household: None,
            effect,
        }
    }

    #[test]
    fn test_happy_path() {
        let step = OptimizationStep::draft(LeverKind::Prepayment);
        assert_eq!(step.status(), StepStatus::Draft);

        let previewed = step.previewed(snapshot(1_200.0)).unwrap();
        assert_eq!(previewed.status(), StepStatus::Previewed);
        assert_eq!(previewed.confirmed_annual_improvement(), 0.0);

        let confirmed = previewed.confirmed().unwrap();
        assert_eq!(confirmed.status(), StepStatus::Confirmed);
        assert_eq!(confirmed.confirmed_annual_improvement(), 1_200.0);
        assert!(confirmed.status().is_terminal());
    }

    #[test]
    fn test_confirm_requires_preview() {
        let step = OptimizationStep::draft(LeverKind::Deferment);
        assert_eq!(step.confirmed(), Err(IgnoreReason::NoPreview));
        assert_eq!(step.rejected(), Err(IgnoreReason::NoPreview));
    }

    #[test]
    fn test_terminal_steps_never_reopen() {
        let rejected = OptimizationStep::draft(LeverKind::Prepayment)
            .previewed(snapshot(10.0))
            .unwrap()
            .rejected()
            .unwrap();
        assert!(rejected.snapshot().is_none());
        assert_eq!(rejected.previewed(snapshot(5.0)), Err(IgnoreReason::AlreadyTerminal));
        assert_eq!(rejected.confirmed(), Err(IgnoreReason::AlreadyTerminal));
    }

    #[test]
    fn test_repreview_replaces_snapshot() {
        let step = OptimizationStep::draft(LeverKind::Prepayment)
            .previewed(snapshot(10.0))
            .unwrap()
            .previewed(snapshot(20.0))
            .unwrap();
        assert_eq!(step.snapshot().unwrap().effect.annual_improvement, 20.0);
    }

    #[test]
    fn test_serialized_status_tag() {
        let json = serde_json::to_value(OptimizationStep::draft(LeverKind::Deferment)).unwrap();
        assert_eq!(json["lever"], "deferment");
        assert_eq!(json["state"]["status"], "draft");
    }
}
