//! Injection points for the engine's external collaborators.
//!
//! The modification engine never touches storage or the generative service
//! directly; both arrive as trait objects supplied by the caller.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::contract::{Contract, PolicyNumber};
use crate::domain::plan::QuotedPlan;
use crate::domain::trip::TripParameters;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("generator returned no usable structured output: {0}")]
    UnusableOutput(String),
    #[error("generator call failed: {0}")]
    Transport(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("contract not found")]
    NotFound,
    #[error("policy number {0} already issued")]
    DuplicatePolicy(String),
    #[error("revision conflict: expected {expected}, stored {stored}")]
    RevisionConflict { expected: i64, stored: i64 },
    #[error("stored dates for {policy_number} are unreadable")]
    CorruptDates { policy_number: String },
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Produces a fully priced plan for a set of trip parameters. The numeric
/// premium on the returned plan always comes from the deterministic premium
/// calculator, never from the generator.
#[async_trait]
pub trait PlanRecommender: Send + Sync {
    async fn recommend(&self, trip: &TripParameters) -> Result<QuotedPlan, RecommendationError>;
}

/// Keyed collection of issued contracts. The store exclusively owns the
/// contract lifecycle; callers address records by policy number plus the
/// holder's email.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Look up a contract. An existing policy number with a different owner
    /// email resolves to `None`.
    async fn find(
        &self,
        policy_number: &PolicyNumber,
        owner_email: &str,
    ) -> Result<Option<Contract>, StoreError>;

    /// Persist a newly issued contract.
    async fn append(&self, contract: Contract) -> Result<PolicyNumber, StoreError>;

    /// Replace a stored contract, compare-and-swap on the revision counter.
    /// The caller passes the revision it read; a mismatch means another
    /// session confirmed a modification in between and nothing is written.
    async fn replace(
        &self,
        policy_number: &PolicyNumber,
        contract: Contract,
        expected_revision: i64,
    ) -> Result<(), StoreError>;
}
