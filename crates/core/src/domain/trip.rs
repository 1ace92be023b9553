use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// The three fixed budget ceilings a traveler can pick from, in DZD. The
/// computed premium must always land materially below the chosen tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Essential,
    Comfort,
    Premium,
}

impl BudgetTier {
    pub fn amount(self) -> Decimal {
        Decimal::from(self.amount_dzd())
    }

    pub fn amount_dzd(self) -> i64 {
        match self {
            Self::Essential => 150_000,
            Self::Comfort => 300_000,
            Self::Premium => 600_000,
        }
    }

    pub fn try_from_amount(amount_dzd: i64) -> Result<Self, ValidationError> {
        match amount_dzd {
            150_000 => Ok(Self::Essential),
            300_000 => Ok(Self::Comfort),
            600_000 => Ok(Self::Premium),
            other => Err(ValidationError::UnsupportedBudget(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPurpose {
    Leisure,
    Business,
    Study,
    FamilyVisit,
    Other,
}

impl TripPurpose {
    /// Stable storage key. Persisted records depend on these exact values.
    pub fn key(self) -> &'static str {
        match self {
            Self::Leisure => "leisure",
            Self::Business => "business",
            Self::Study => "study",
            Self::FamilyVisit => "family_visit",
            Self::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "leisure" => Some(Self::Leisure),
            "business" => Some(Self::Business),
            "study" => Some(Self::Study),
            "family_visit" => Some(Self::FamilyVisit),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// French label as shown to the traveler.
    pub fn label(self) -> &'static str {
        match self {
            Self::Leisure => "Loisirs",
            Self::Business => "Affaires",
            Self::Study => "Études",
            Self::FamilyVisit => "Visite Familiale",
            Self::Other => "Autre",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripParameters {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub traveler_count: u32,
    pub traveler_age: u32,
    pub pre_existing_conditions: String,
    pub trip_purpose: TripPurpose,
    pub budget: BudgetTier,
}

impl TripParameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.destination.trim().is_empty() {
            return Err(ValidationError::BlankDestination);
        }
        if self.traveler_count == 0 {
            return Err(ValidationError::NonPositiveTravelerCount);
        }
        if self.traveler_age == 0 {
            return Err(ValidationError::NonPositiveTravelerAge);
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Billed trip length for pricing: calendar-day difference, floored at
    /// one so a same-day trip is still billed as a single day.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days().max(1)
    }

    /// Covered trip length for proration, counting both endpoints.
    pub fn inclusive_duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{BudgetTier, TripParameters, TripPurpose};
    use crate::errors::ValidationError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn trip() -> TripParameters {
        TripParameters {
            destination: "France".to_string(),
            start_date: date(2025, 7, 1),
            end_date: date(2025, 7, 16),
            traveler_count: 2,
            traveler_age: 30,
            pre_existing_conditions: "None".to_string(),
            trip_purpose: TripPurpose::Leisure,
            budget: BudgetTier::Comfort,
        }
    }

    #[test]
    fn valid_parameters_pass() {
        trip().validate().expect("trip should validate");
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut trip = trip();
        trip.end_date = date(2025, 6, 30);
        assert!(matches!(
            trip.validate(),
            Err(ValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn zero_travelers_is_rejected() {
        let mut trip = trip();
        trip.traveler_count = 0;
        assert_eq!(trip.validate(), Err(ValidationError::NonPositiveTravelerCount));
    }

    #[test]
    fn blank_destination_is_rejected() {
        let mut trip = trip();
        trip.destination = "   ".to_string();
        assert_eq!(trip.validate(), Err(ValidationError::BlankDestination));
    }

    #[test]
    fn same_day_trip_is_billed_one_day() {
        let mut trip = trip();
        trip.end_date = trip.start_date;
        assert_eq!(trip.duration_days(), 1);
        assert_eq!(trip.inclusive_duration_days(), 1);
    }

    #[test]
    fn inclusive_duration_counts_both_endpoints() {
        assert_eq!(trip().duration_days(), 15);
        assert_eq!(trip().inclusive_duration_days(), 16);
    }

    #[test]
    fn only_the_three_tiers_parse() {
        assert_eq!(BudgetTier::try_from_amount(150_000), Ok(BudgetTier::Essential));
        assert_eq!(BudgetTier::try_from_amount(600_000), Ok(BudgetTier::Premium));
        assert_eq!(
            BudgetTier::try_from_amount(200_000),
            Err(ValidationError::UnsupportedBudget(200_000))
        );
    }
}
