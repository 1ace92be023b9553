use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::plan::QuotedPlan;
use crate::domain::trip::TripParameters;
use crate::errors::ValidationError;

pub const POLICY_NUMBER_PREFIX: &str = "ASNI";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyNumber(pub String);

impl PolicyNumber {
    /// Assigned exactly once, at purchase time.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!("{POLICY_NUMBER_PREFIX}-{}", &suffix[..10]))
    }
}

impl std::fmt::Display for PolicyNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the insured traveler. Immutable through the modification
/// flow; profile edits happen elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    pub email: String,
    pub full_name: String,
    pub passport_number: Option<String>,
}

/// An issued policy. Created once at purchase, mutated in place on each
/// confirmed modification, never deleted by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub policy_number: PolicyNumber,
    pub holder: Holder,
    pub trip: TripParameters,
    pub plan: QuotedPlan,
    pub issue_date: NaiveDate,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_modification_fee: Option<Decimal>,
    /// Optimistic-concurrency token, checked and incremented on every
    /// replace. Starts at 1.
    pub revision: i64,
}

impl Contract {
    pub fn issue(
        trip: TripParameters,
        plan: QuotedPlan,
        holder: Holder,
        issue_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        trip.validate()?;
        Ok(Self {
            policy_number: PolicyNumber::generate(),
            holder,
            trip,
            plan,
            issue_date,
            last_modified: None,
            last_modification_fee: None,
            revision: 1,
        })
    }

    /// Apply a confirmed modification: trip window/destination and the plan
    /// are replaced wholesale, the fee paid is recorded, and the revision
    /// advances. Holder identity and issue date never change here.
    pub fn apply_modification(
        &mut self,
        new_trip: TripParameters,
        new_plan: QuotedPlan,
        fee_paid: Decimal,
        now: DateTime<Utc>,
    ) {
        self.trip = new_trip;
        self.plan = new_plan;
        self.last_modified = Some(now);
        self.last_modification_fee = Some(fee_paid);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{Contract, Holder, PolicyNumber};
    use crate::domain::plan::{PolicyDocument, QuotedPlan};
    use crate::domain::trip::{BudgetTier, TripParameters, TripPurpose};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn plan(premium: i64) -> QuotedPlan {
        QuotedPlan {
            plan_name: "Atlas Voyage Protect".to_string(),
            provider: "SaharaAssur Voyages".to_string(),
            coverage: vec!["Frais médicaux jusqu'à 30,000 EUR".to_string()],
            premium: Decimal::from(premium),
            suitability_score: 85,
            rationale: "Couverture adaptée au séjour.".to_string(),
            policy_document: PolicyDocument::Placeholder,
        }
    }

    fn trip() -> TripParameters {
        TripParameters {
            destination: "France".to_string(),
            start_date: date(2025, 7, 1),
            end_date: date(2025, 7, 16),
            traveler_count: 1,
            traveler_age: 30,
            pre_existing_conditions: "None".to_string(),
            trip_purpose: TripPurpose::Leisure,
            budget: BudgetTier::Essential,
        }
    }

    fn contract() -> Contract {
        Contract::issue(trip(), plan(1800), holder(), date(2025, 6, 1)).expect("issue")
    }

    fn holder() -> Holder {
        Holder {
            email: "amel@example.dz".to_string(),
            full_name: "Amel B.".to_string(),
            passport_number: Some("123456789".to_string()),
        }
    }

    #[test]
    fn issue_assigns_prefixed_policy_number_and_first_revision() {
        let contract = contract();
        assert!(contract.policy_number.0.starts_with("ASNI-"));
        assert_eq!(contract.revision, 1);
        assert_eq!(contract.last_modified, None);
        assert_eq!(contract.last_modification_fee, None);
    }

    #[test]
    fn policy_numbers_are_unique_across_issues() {
        assert_ne!(PolicyNumber::generate(), PolicyNumber::generate());
    }

    #[test]
    fn issue_rejects_invalid_trip() {
        let mut bad_trip = trip();
        bad_trip.traveler_age = 0;
        assert!(Contract::issue(bad_trip, plan(1800), holder(), date(2025, 6, 1)).is_err());
    }

    #[test]
    fn modification_replaces_trip_and_plan_and_bumps_revision() {
        let mut contract = contract();
        let mut new_trip = trip();
        new_trip.destination = "Canada".to_string();
        new_trip.end_date = date(2025, 7, 21);
        let now = Utc::now();

        contract.apply_modification(new_trip.clone(), plan(2200), Decimal::from(840), now);

        assert_eq!(contract.trip, new_trip);
        assert_eq!(contract.plan.premium, Decimal::from(2200));
        assert_eq!(contract.last_modified, Some(now));
        assert_eq!(contract.last_modification_fee, Some(Decimal::from(840)));
        assert_eq!(contract.revision, 2);
        // identity and issue date untouched
        assert_eq!(contract.holder, holder());
        assert_eq!(contract.issue_date, date(2025, 6, 1));
    }
}
