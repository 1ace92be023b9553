pub mod config;
pub mod domain;
pub mod errors;
pub mod modification;
pub mod ports;
pub mod pricing;

pub use domain::contract::{Contract, Holder, PolicyNumber};
pub use domain::plan::{PolicyDocument, QuotedPlan};
pub use domain::trip::{BudgetTier, TripParameters, TripPurpose};
pub use errors::{ModificationError, QuoteError, ValidationError};
pub use modification::{
    cost_breakdown, check_eligibility, fixed_modification_fee, ModificationCostBreakdown,
    ModificationEngine, ModificationEvent, ModificationQuote, ModificationState, TripChange,
    FIXED_MODIFICATION_FEE_DZD, MODIFICATION_NOTICE_HOURS,
};
pub use ports::{ContractStore, PlanRecommender, RecommendationError, StoreError};
pub use pricing::{
    compute_premium, premium_breakdown, DeterministicPremiumEngine, PremiumBreakdown,
    PremiumEngine, BASE_RATE_PER_DAY_DZD, MINIMUM_PREMIUM_DZD,
};
