//! One planning flow over a household's mortgage accounts
//!
//! The session walks the configured lever order. Exactly one lever is current
//! until every lever has been confirmed or rejected. Effects are frozen at
//! preview time, so later account edits never change a confirmed step.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::step::{AccountSnapshot, IgnoreReason, OptimizationStep, StepSnapshot, StepStatus, TransitionOutcome};
use crate::account::{AccountField, FieldValue, MortgageAccount};
use crate::assumptions::Assumptions;
use crate::error::{PlannerError, Result};
use crate::levers::{EffectSummary, LeverEffect, LeverEffectCalculator, LeverKind, OptimizationLever};

/// Owned state of a session, as handed to and from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParts {
    pub accounts: Vec<MortgageAccount>,
    #[serde(default)]
    pub household: Option<OptimizationLever>,
    #[serde(default)]
    pub assumptions: Assumptions,
    /// Terminal steps, in lever order
    #[serde(default)]
    pub steps: Vec<OptimizationStep>,
    /// Step for the current lever, if any lever remains
    #[serde(default)]
    pub active: Option<OptimizationStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionParts", into = "SessionParts")]
pub struct OptimizationSession {
    accounts: Vec<MortgageAccount>,
    household: Option<OptimizationLever>,
    calculator: LeverEffectCalculator,
    steps: Vec<OptimizationStep>,
    active: Option<OptimizationStep>,
}

impl OptimizationSession {
    /// Start a fresh session positioned on the first lever
    pub fn new(accounts: Vec<MortgageAccount>, assumptions: Assumptions) -> Result<Self> {
        Self::restore(accounts, Vec::new(), assumptions)
    }

    /// Rebuild a session from a persisted step log
    ///
    /// Steps must be terminal and follow the lever order; the current lever
    /// is the first one without a step.
    pub fn restore(
        accounts: Vec<MortgageAccount>,
        steps: Vec<OptimizationStep>,
        assumptions: Assumptions,
    ) -> Result<Self> {
        assumptions.validate()?;
        validate_accounts(&accounts)?;

        let order = &assumptions.lever_order;
        if steps.len() > order.len() {
            return Err(PlannerError::validation(
                "steps",
                format!("{} steps for {} levers", steps.len(), order.len()),
            ));
        }
        for (i, step) in steps.iter().enumerate() {
            if step.lever() != order[i] {
                return Err(PlannerError::validation(
                    "steps",
                    format!("step {} is {} but lever order expects {}", i, step.lever(), order[i]),
                ));
            }
            if !step.status().is_terminal() {
                return Err(PlannerError::validation(
                    "steps",
                    format!("step {} ({}) is not confirmed or rejected", i, step.lever()),
                ));
            }
        }

        let active = order.get(steps.len()).copied().map(OptimizationStep::draft);
        Ok(Self {
            accounts,
            household: None,
            calculator: LeverEffectCalculator::new(assumptions),
            steps,
            active,
        })
    }

    /// Rebuild a session from everything the host persisted
    pub fn from_parts(parts: SessionParts) -> Result<Self> {
        let mut session = Self::restore(parts.accounts, parts.steps, parts.assumptions)?;

        if let Some(lever) = parts.household {
            session.set_household_lever(lever)?;
        }

        if let Some(active) = parts.active {
            if Some(active.lever()) != session.current_lever() || active.status().is_terminal() {
                return Err(PlannerError::validation(
                    "active",
                    format!("active step {} ({:?}) does not match the session", active.lever(), active.status()),
                ));
            }
            session.active = Some(active);
        }

        Ok(session)
    }

    /// Hand the session state back to the host
    pub fn into_parts(self) -> SessionParts {
        SessionParts {
            accounts: self.accounts,
            household: self.household,
            assumptions: self.calculator.assumptions().clone(),
            steps: self.steps,
            active: self.active,
        }
    }

    pub fn accounts(&self) -> &[MortgageAccount] {
        &self.accounts
    }

    pub fn account(&self, id: u32) -> Option<&MortgageAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.calculator.assumptions()
    }

    /// Household budget adjustment, if configured
    pub fn household_lever(&self) -> Option<&OptimizationLever> {
        self.household.as_ref()
    }

    pub fn current_lever(&self) -> Option<LeverKind> {
        self.active.as_ref().map(OptimizationStep::lever)
    }

    pub fn is_complete(&self) -> bool {
        self.active.is_none()
    }

    /// Terminal steps in the order they were decided
    pub fn steps(&self) -> &[OptimizationStep] {
        &self.steps
    }

    pub fn confirmed_steps(&self) -> impl Iterator<Item = &OptimizationStep> {
        self.steps.iter().filter(|s| s.status() == StepStatus::Confirmed)
    }

    /// Step for the current lever (draft or previewed)
    pub fn active_step(&self) -> Option<&OptimizationStep> {
        self.active.as_ref()
    }

    /// Edit one account field; unknown ids are ignored
    ///
    /// Returns whether an account was updated. Snapshots already taken are
    /// not affected.
    pub fn update_account(&mut self, id: u32, field: AccountField, value: FieldValue) -> Result<bool> {
        match self.accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.update(field, value)?;
                debug!("account {}: {} updated to {:?}", id, field, value);
                Ok(true)
            }
            None => {
                warn!("update of {} ignored: no account with id {}", field, id);
                Ok(false)
            }
        }
    }

    /// Configure the household budget adjustment (monthly amounts)
    pub fn set_budget_adjustment(&mut self, income_increase: f64, expense_reduction: f64) -> Result<()> {
        self.set_household_lever(OptimizationLever::BudgetAdjustment {
            income_increase,
            expense_reduction,
        })
    }

    fn set_household_lever(&mut self, lever: OptimizationLever) -> Result<()> {
        if !lever.kind().is_household() {
            return Err(PlannerError::validation(
                "household",
                format!("{} is configured per account", lever.kind()),
            ));
        }
        lever.validate()?;
        self.household = Some(lever);
        Ok(())
    }

    /// Price the current lever against the accounts as they stand now
    ///
    /// Previewing again replaces the earlier snapshot. Cumulative totals only
    /// change once the step is confirmed.
    pub fn preview(&mut self, kind: LeverKind) -> Result<EffectSummary> {
        let active = self.active.as_ref().ok_or(PlannerError::SessionComplete)?;
        if active.lever() != kind {
            return Err(PlannerError::OutOfSequence {
                requested: kind,
                current: Some(active.lever()),
            });
        }

        let snapshot = self.snapshot(kind);
        let summary = snapshot.effect.clone();
        let previewed = active.previewed(snapshot).map_err(|_| PlannerError::OutOfSequence {
            requested: kind,
            current: Some(kind),
        })?;
        self.active = Some(previewed);

        debug!("previewed {}: annual improvement {:.2}", kind, summary.annual_improvement);
        Ok(summary)
    }

    /// Commit the last preview of `kind` and advance
    pub fn confirm(&mut self, kind: LeverKind) -> TransitionOutcome {
        self.finish(kind, "confirm", OptimizationStep::confirmed)
    }

    /// Skip `kind` without recording any effect and advance
    pub fn reject(&mut self, kind: LeverKind) -> TransitionOutcome {
        self.finish(kind, "reject", OptimizationStep::rejected)
    }

    fn finish(
        &mut self,
        kind: LeverKind,
        action: &str,
        transition: fn(&OptimizationStep) -> std::result::Result<OptimizationStep, IgnoreReason>,
    ) -> TransitionOutcome {
        let outcome = match self.active.as_ref() {
            None => Err(IgnoreReason::SessionComplete),
            Some(active) if active.lever() != kind => Err(IgnoreReason::NotCurrent),
            Some(active) => transition(active),
        };

        match outcome {
            Ok(step) => {
                info!("{} {}: {:?}", action, kind, step.status());
                self.steps.push(step);
                self.active = self
                    .assumptions()
                    .lever_order
                    .get(self.steps.len())
                    .copied()
                    .map(OptimizationStep::draft);
                TransitionOutcome::Applied
            }
            Err(reason) => {
                warn!("{} {} ignored: {}", action, kind, reason);
                TransitionOutcome::Ignored(reason)
            }
        }
    }

    /// Sum of confirmed effects plus the current unconfirmed preview
    pub fn cumulative_effect(&self) -> LeverEffect {
        self.confirmed_steps()
            .chain(self.active.iter().filter(|s| s.status() == StepStatus::Previewed))
            .filter_map(OptimizationStep::snapshot)
            .map(|snapshot| snapshot.effect.total())
            .fold(LeverEffect::none(), |acc, effect| acc + effect)
    }

    /// Annual improvement used to lift the projection curve
    pub fn cumulative_annual_improvement(&self) -> f64 {
        self.cumulative_effect().annual_improvement
    }

    fn snapshot(&self, kind: LeverKind) -> StepSnapshot {
        let household = if kind.is_household() {
            self.household.clone()
        } else {
            None
        };
        let accounts = self
            .accounts
            .iter()
            .filter(|a| a.is_eligible(kind) && a.lever(kind).is_some())
            .map(|a| AccountSnapshot::capture(a, kind))
            .collect();
        let effect = self.calculator.summarize(kind, &self.accounts, household.as_ref());

        StepSnapshot {
            accounts,
            household,
            effect,
        }
    }
}

impl TryFrom<SessionParts> for OptimizationSession {
    type Error = PlannerError;

    fn try_from(parts: SessionParts) -> Result<Self> {
        Self::from_parts(parts)
    }
}

impl From<OptimizationSession> for SessionParts {
    fn from(session: OptimizationSession) -> Self {
        session.into_parts()
    }
}

fn validate_accounts(accounts: &[MortgageAccount]) -> Result<()> {
    for (i, account) in accounts.iter().enumerate() {
        account.validate()?;
        if accounts[..i].iter().any(|a| a.id == account.id) {
            return Err(PlannerError::validation(
                "accounts",
                format!("duplicate account id {}", account.id),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{LoanType, RateType};
    use crate::levers::PrepaymentMode;
    use approx::assert_relative_eq;

    fn sample_accounts() -> Vec<MortgageAccount> {
        let home = MortgageAccount::new(1, "Home", LoanType::Commercial, RateType::Fixed, 2_000_000.0, 4.9, 300)
            .unwrap()
            .with_lever(OptimizationLever::CommercialToFundConversion {
                convert_amount: 500_000.0,
                fund_rate_percent: 3.25,
                fee_rate_percent: 0.0,
            })
            .unwrap()
            .with_lever(OptimizationLever::Prepayment {
                amount: 200_000.0,
                mode: PrepaymentMode::ReduceTerm,
            })
            .unwrap();
        vec![home]
    }

    fn session() -> OptimizationSession {
        OptimizationSession::new(sample_accounts(), Assumptions::default_planning()).unwrap()
    }

    #[test]
    fn test_starts_on_first_lever_with_zero_improvement() {
        let session = session();
        assert_eq!(session.current_lever(), Some(LeverKind::CommercialToFundConversion));
        assert_eq!(session.cumulative_annual_improvement(), 0.0);
        assert!(session.steps().is_empty());
    }

    #[test]
    fn test_confirm_without_preview_is_ignored() {
        let mut session = session();
        let outcome = session.confirm(LeverKind::CommercialToFundConversion);
        assert_eq!(outcome, TransitionOutcome::Ignored(IgnoreReason::NoPreview));
        assert_eq!(session.confirmed_steps().count(), 0);
        assert_eq!(session.current_lever(), Some(LeverKind::CommercialToFundConversion));
    }

    #[test]
    fn test_preview_then_confirm_advances() {
        let mut session = session();
        let summary = session.preview(LeverKind::CommercialToFundConversion).unwrap();
        assert!(summary.annual_improvement > 0.0);

        // preview counts toward the what-if total before confirmation
        assert_relative_eq!(session.cumulative_annual_improvement(), summary.annual_improvement);
        assert_eq!(session.confirmed_steps().count(), 0);

        assert!(session.confirm(LeverKind::CommercialToFundConversion).is_applied());
        assert_eq!(session.confirmed_steps().count(), 1);
        assert_eq!(session.current_lever(), Some(LeverKind::FixedToFloatingConversion));
        assert_relative_eq!(session.cumulative_annual_improvement(), summary.annual_improvement);
    }

    #[test]
    fn test_preview_out_of_sequence_is_error() {
        let mut session = session();
        let err = session.preview(LeverKind::Prepayment).unwrap_err();
        assert_eq!(
            err,
            PlannerError::OutOfSequence {
                requested: LeverKind::Prepayment,
                current: Some(LeverKind::CommercialToFundConversion),
            }
        );
    }

    #[test]
    fn test_confirm_not_current_is_ignored() {
        let mut session = session();
        session.preview(LeverKind::CommercialToFundConversion).unwrap();
        assert_eq!(
            session.confirm(LeverKind::Prepayment),
            TransitionOutcome::Ignored(IgnoreReason::NotCurrent)
        );
        assert_eq!(session.current_lever(), Some(LeverKind::CommercialToFundConversion));
    }

    #[test]
    fn test_reject_records_no_effect() {
        let mut session = session();
        session.preview(LeverKind::CommercialToFundConversion).unwrap();
        assert!(session.reject(LeverKind::CommercialToFundConversion).is_applied());
        assert_eq!(session.cumulative_annual_improvement(), 0.0);
        assert_eq!(session.steps().len(), 1);
        assert_eq!(session.steps()[0].status(), StepStatus::Rejected);
    }

    #[test]
    fn test_snapshot_frozen_against_later_edits() {
        let mut session = session();
        let summary = session.preview(LeverKind::CommercialToFundConversion).unwrap();
        session.confirm(LeverKind::CommercialToFundConversion);

        session
            .update_account(1, AccountField::ConvertAmount, FieldValue::Number(1_000_000.0))
            .unwrap();
        assert_relative_eq!(session.cumulative_annual_improvement(), summary.annual_improvement);
    }

    #[test]
    fn test_confirmed_levers_add() {
        let mut session = session();
        let conversion = session.preview(LeverKind::CommercialToFundConversion).unwrap();
        session.confirm(LeverKind::CommercialToFundConversion);
        for kind in [LeverKind::FixedToFloatingConversion, LeverKind::PaymentMethodChange] {
            session.preview(kind).unwrap();
            session.reject(kind);
        }
        let prepayment = session.preview(LeverKind::Prepayment).unwrap();
        session.confirm(LeverKind::Prepayment);

        assert_relative_eq!(
            session.cumulative_annual_improvement(),
            conversion.annual_improvement + prepayment.annual_improvement,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_walk_to_completion() {
        let mut session = session();
        session.set_budget_adjustment(1_000.0, 500.0).unwrap();
        for kind in LeverKind::ALL {
            session.preview(kind).unwrap();
            assert!(session.confirm(kind).is_applied());
        }
        assert!(session.is_complete());
        assert_eq!(session.preview(LeverKind::Deferment).unwrap_err(), PlannerError::SessionComplete);
        assert_eq!(
            session.reject(LeverKind::Deferment),
            TransitionOutcome::Ignored(IgnoreReason::SessionComplete)
        );
        assert!(session.cumulative_annual_improvement() >= 18_000.0);
    }

    #[test]
    fn test_update_unknown_account_ignored() {
        let mut session = session();
        let updated = session
            .update_account(99, AccountField::Principal, FieldValue::Number(1.0))
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn test_invalid_update_leaves_account() {
        let mut session = session();
        let err = session
            .update_account(1, AccountField::Principal, FieldValue::Number(-5.0))
            .unwrap_err();
        assert!(matches!(err, PlannerError::Validation { field: "principal", .. }));
        assert_eq!(session.account(1).unwrap().principal, 2_000_000.0);
    }

    #[test]
    fn test_restore_positions_after_log() {
        let mut original = session();
        original.preview(LeverKind::CommercialToFundConversion).unwrap();
        original.confirm(LeverKind::CommercialToFundConversion);
        let improvement = original.cumulative_annual_improvement();

        let parts = original.into_parts();
        let restored = OptimizationSession::restore(parts.accounts, parts.steps, parts.assumptions).unwrap();
        assert_eq!(restored.current_lever(), Some(LeverKind::FixedToFloatingConversion));
        assert_relative_eq!(restored.cumulative_annual_improvement(), improvement);
    }

    #[test]
    fn test_restore_rejects_out_of_order_log() {
        let mut other = OptimizationSession::new(
            sample_accounts(),
            Assumptions {
                lever_order: vec![LeverKind::Prepayment],
                ..Assumptions::default_planning()
            },
        )
        .unwrap();
        other.preview(LeverKind::Prepayment).unwrap();
        other.confirm(LeverKind::Prepayment);
        let steps = other.into_parts().steps;

        let err = OptimizationSession::restore(sample_accounts(), steps, Assumptions::default_planning()).unwrap_err();
        assert!(matches!(err, PlannerError::Validation { field: "steps", .. }));
    }

    #[test]
    fn test_serde_round_trip_keeps_preview() {
        let mut session = session();
        session.preview(LeverKind::CommercialToFundConversion).unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let restored: OptimizationSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.current_lever(), session.current_lever());
        assert_eq!(restored.active_step().unwrap().status(), StepStatus::Previewed);
        assert_relative_eq!(
            restored.cumulative_annual_improvement(),
            session.cumulative_annual_improvement(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_empty_lever_order_is_complete() {
        let assumptions = Assumptions {
            lever_order: Vec::new(),
            ..Assumptions::default_planning()
        };
        let session = OptimizationSession::new(sample_accounts(), assumptions).unwrap();
        assert!(session.is_complete());
        assert_eq!(session.cumulative_annual_improvement(), 0.0);
    }
}
