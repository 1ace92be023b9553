//! Contract modification: eligibility, pro-rata cost, confirmation.
//!
//! A modification attempt is pure computation until `confirm`; abandoning an
//! attempt at any earlier point leaves the stored contract untouched.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::domain::contract::{Contract, PolicyNumber};
use crate::domain::plan::QuotedPlan;
use crate::domain::trip::TripParameters;
use crate::errors::ModificationError;
use crate::ports::{ContractStore, PlanRecommender};

/// Flat fee charged on every confirmed modification, in DZD.
pub const FIXED_MODIFICATION_FEE_DZD: i64 = 290;
/// A trip may only be modified while its start lies at least this far ahead.
pub const MODIFICATION_NOTICE_HOURS: i64 = 48;

pub fn fixed_modification_fee() -> Decimal {
    Decimal::from(FIXED_MODIFICATION_FEE_DZD)
}

/// The fields a holder may change on an issued contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripChange {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TripChange {
    /// New trip parameters for re-quoting: the changed window/destination on
    /// top of the contract's original traveler profile and budget tier. The
    /// budget tier is never renegotiated on modification.
    pub fn applied_to(&self, original: &TripParameters) -> TripParameters {
        TripParameters {
            destination: self.destination.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            ..original.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModificationState {
    Editing,
    Eligible,
    Ineligible,
    CostCalculated,
    Confirmed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModificationEvent {
    EligibilityConfirmed,
    EligibilityRejected,
    CostComputed,
    ModificationConfirmed,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("no modification transition from {from:?} on {event:?}")]
pub struct InvalidTransition {
    pub from: ModificationState,
    pub event: ModificationEvent,
}

/// Per-attempt state machine. `Ineligible` and `Confirmed` are terminal;
/// abandonment is simply dropping the attempt, from any state.
pub fn advance(
    state: ModificationState,
    event: ModificationEvent,
) -> Result<ModificationState, InvalidTransition> {
    use ModificationEvent as E;
    use ModificationState as S;

    match (state, event) {
        (S::Editing, E::EligibilityConfirmed) => Ok(S::Eligible),
        (S::Editing, E::EligibilityRejected) => Ok(S::Ineligible),
        (S::Eligible, E::CostComputed) => Ok(S::CostCalculated),
        (S::CostCalculated, E::ModificationConfirmed) => Ok(S::Confirmed),
        (from, event) => Err(InvalidTransition { from, event }),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationCostBreakdown {
    pub fixed_fee: Decimal,
    /// New inclusive duration minus original inclusive duration. Only
    /// positive values surcharge.
    pub additional_days: i64,
    /// New premium divided by new duration, present only when a surcharge
    /// applies.
    pub daily_rate: Option<Decimal>,
    pub surcharge: Decimal,
    pub total_due: Decimal,
    /// Full premium of the re-quoted plan. Informational: the premium delta
    /// between old and new plan is never itself charged.
    pub new_premium: Decimal,
}

/// Pro-rata cost of a modification. Shortening or keeping the trip length
/// never generates a refund; the surcharge is one-directional.
pub fn cost_breakdown(
    original_duration_days: i64,
    new_duration_days: i64,
    new_premium: Decimal,
) -> ModificationCostBreakdown {
    let additional_days = new_duration_days - original_duration_days;

    let (daily_rate, surcharge) = if additional_days > 0 && new_duration_days > 0 {
        let rate = new_premium / Decimal::from(new_duration_days);
        (Some(rate), rate * Decimal::from(additional_days))
    } else {
        (None, Decimal::ZERO)
    };

    ModificationCostBreakdown {
        fixed_fee: fixed_modification_fee(),
        additional_days: additional_days.max(0),
        daily_rate,
        surcharge,
        total_due: fixed_modification_fee() + surcharge,
        new_premium,
    }
}

/// The 48-hour cutoff is measured against the stored contract's *current*
/// start date, taken at midnight.
pub fn check_eligibility(
    contract_start: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), ModificationError> {
    let start = contract_start
        .and_hms_opt(0, 0, 0)
        .ok_or(ModificationError::CorruptContractDates)?
        .and_utc();
    let remaining = start - now;
    if remaining < Duration::hours(MODIFICATION_NOTICE_HOURS) {
        return Err(ModificationError::Ineligible { hours_until_start: remaining.num_hours() });
    }
    Ok(())
}

/// A costed attempt awaiting confirmation. Holds the contract as read from
/// the store so confirmation can detect a concurrent change by revision.
#[derive(Clone, Debug)]
pub struct ModificationQuote {
    pub contract: Contract,
    pub new_trip: TripParameters,
    pub new_plan: QuotedPlan,
    pub breakdown: ModificationCostBreakdown,
    state: ModificationState,
}

impl ModificationQuote {
    pub fn state(&self) -> ModificationState {
        self.state
    }
}

pub struct ModificationEngine<R, S> {
    recommender: R,
    store: S,
}

impl<R, S> ModificationEngine<R, S>
where
    R: PlanRecommender,
    S: ContractStore,
{
    pub fn new(recommender: R, store: S) -> Self {
        Self { recommender, store }
    }

    /// Compute the cost to change an existing contract. Re-quotes the plan
    /// for the new parameters under the original budget tier, then prices
    /// the change as a fixed fee plus the extra-days surcharge. No state is
    /// written.
    pub async fn quote(
        &self,
        policy_number: &PolicyNumber,
        owner_email: &str,
        change: TripChange,
        now: DateTime<Utc>,
    ) -> Result<ModificationQuote, ModificationError> {
        let contract = self
            .store
            .find(policy_number, owner_email)
            .await?
            .ok_or(ModificationError::Store(crate::ports::StoreError::NotFound))?;

        let mut state = ModificationState::Editing;
        if let Err(rejection) = check_eligibility(contract.trip.start_date, now) {
            advance(state, ModificationEvent::EligibilityRejected)?;
            info!(
                event_name = "modification.ineligible",
                policy_number = %contract.policy_number,
                "modification attempt rejected by the 48h cutoff"
            );
            return Err(rejection);
        }
        state = advance(state, ModificationEvent::EligibilityConfirmed)?;

        let new_trip = change.applied_to(&contract.trip);
        new_trip.validate()?;

        let original_duration = contract.trip.inclusive_duration_days();
        if original_duration <= 0 {
            return Err(ModificationError::CorruptContractDates);
        }

        let new_plan = self.recommender.recommend(&new_trip).await?;
        let breakdown =
            cost_breakdown(original_duration, new_trip.inclusive_duration_days(), new_plan.premium);
        state = advance(state, ModificationEvent::CostComputed)?;

        info!(
            event_name = "modification.cost_calculated",
            policy_number = %contract.policy_number,
            additional_days = breakdown.additional_days,
            total_due = %breakdown.total_due,
            "modification cost breakdown ready"
        );

        Ok(ModificationQuote { contract, new_trip, new_plan, breakdown, state })
    }

    /// Confirm a costed attempt: replace the trip and plan wholesale, record
    /// the fee paid, and persist against the revision the attempt was quoted
    /// from. Any failure leaves the stored contract unchanged.
    pub async fn confirm(
        &self,
        quote: ModificationQuote,
        now: DateTime<Utc>,
    ) -> Result<Contract, ModificationError> {
        let ModificationQuote { mut contract, new_trip, new_plan, breakdown, state } = quote;
        advance(state, ModificationEvent::ModificationConfirmed)?;

        let quoted_revision = contract.revision;
        contract.apply_modification(new_trip, new_plan, breakdown.total_due, now);
        self.store.replace(&contract.policy_number, contract.clone(), quoted_revision).await?;

        info!(
            event_name = "modification.confirmed",
            policy_number = %contract.policy_number,
            fee_paid = %breakdown.total_due,
            revision = contract.revision,
            "contract updated"
        );
        Ok(contract)
    }
}
