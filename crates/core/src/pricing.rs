//! Deterministic premium calculation.
//!
//! This value is authoritative: whatever price the generative service
//! narrates is discarded and replaced by the result computed here before a
//! plan is ever shown to a traveler.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::trip::{BudgetTier, TripParameters};

/// Base rate per billed day, in DZD.
pub const BASE_RATE_PER_DAY_DZD: i64 = 80;
/// Floor premium, in DZD.
pub const MINIMUM_PREMIUM_DZD: i64 = 800;

/// Hard ceiling: 2% of the top budget tier (12 000 DZD), regardless of input.
pub fn premium_ceiling() -> Decimal {
    BudgetTier::Premium.amount() * Decimal::new(2, 2)
}

/// Destination keyword tiers, first match wins. Matching is substring-based
/// and deliberately not exhaustive; anything unmatched gets the neutral
/// coefficient. French spellings are listed alongside English ones because
/// the destination field is free text from a French-language form.
const DESTINATION_TIERS: &[(&[&str], (i64, u32))] = &[
    (
        &["france", "italy", "italie", "spain", "espagne", "schengen"],
        (15, 1),
    ),
    (
        &["turkey", "turquie", "tunisia", "tunisie", "morocco", "maroc", "maghreb"],
        (11, 1),
    ),
    (
        &[
            "usa",
            "etats-unis",
            "états-unis",
            "canada",
            "japan",
            "japon",
            "australia",
            "australie",
            "america",
            "amerique",
            "amérique",
        ],
        (17, 1),
    ),
    (
        &["africa", "afrique", "nigeria", "ghana", "kenya"],
        (13, 1),
    ),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub billed_days: i64,
    pub base_rate_per_day: Decimal,
    pub destination_coefficient: Decimal,
    pub age_coefficient: Decimal,
    /// Rounded product before clamping.
    pub raw_premium: Decimal,
    /// Final amount, clamped to [800, 12000].
    pub premium: Decimal,
}

pub trait PremiumEngine: Send + Sync {
    fn premium(&self, trip: &TripParameters) -> PremiumBreakdown;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPremiumEngine;

impl PremiumEngine for DeterministicPremiumEngine {
    fn premium(&self, trip: &TripParameters) -> PremiumBreakdown {
        premium_breakdown(trip)
    }
}

pub fn destination_coefficient(destination: &str) -> Decimal {
    let needle = destination.to_lowercase();
    for (keywords, (mantissa, scale)) in DESTINATION_TIERS {
        if keywords.iter().any(|keyword| needle.contains(keyword)) {
            return Decimal::new(*mantissa, *scale);
        }
    }
    Decimal::ONE
}

pub fn age_coefficient(traveler_age: u32) -> Decimal {
    if traveler_age >= 60 {
        Decimal::new(15, 1)
    } else if traveler_age >= 40 {
        Decimal::new(12, 1)
    } else if traveler_age <= 18 {
        Decimal::new(9, 1)
    } else {
        Decimal::ONE
    }
}

pub fn premium_breakdown(trip: &TripParameters) -> PremiumBreakdown {
    let billed_days = trip.duration_days();
    let base_rate_per_day = Decimal::from(BASE_RATE_PER_DAY_DZD);
    let destination_coefficient = destination_coefficient(&trip.destination);
    let age_coefficient = age_coefficient(trip.traveler_age);

    let raw_premium = (base_rate_per_day
        * Decimal::from(billed_days)
        * destination_coefficient
        * age_coefficient)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let premium = raw_premium
        .max(Decimal::from(MINIMUM_PREMIUM_DZD))
        .min(premium_ceiling());

    PremiumBreakdown {
        billed_days,
        base_rate_per_day,
        destination_coefficient,
        age_coefficient,
        raw_premium,
        premium,
    }
}

/// `compute_premium(trip)` → positive integral DZD amount in [800, 12000].
pub fn compute_premium(trip: &TripParameters) -> Decimal {
    premium_breakdown(trip).premium
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{compute_premium, destination_coefficient, premium_breakdown, premium_ceiling};
    use crate::domain::trip::{BudgetTier, TripParameters, TripPurpose};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn trip(destination: &str, days: i64, age: u32) -> TripParameters {
        let start = date(2025, 7, 1);
        TripParameters {
            destination: destination.to_string(),
            start_date: start,
            end_date: start + chrono::Duration::days(days),
            traveler_count: 1,
            traveler_age: age,
            pre_existing_conditions: "None".to_string(),
            trip_purpose: TripPurpose::Leisure,
            budget: BudgetTier::Essential,
        }
    }

    #[test]
    fn schengen_fifteen_days_age_thirty() {
        // round(80 * 15 * 1.5 * 1.0) = 1800
        assert_eq!(compute_premium(&trip("France", 15, 30)), Decimal::from(1800));
    }

    #[test]
    fn maghreb_ninety_days_senior() {
        // round(80 * 90 * 1.1 * 1.5) = 11880, inside the ceiling
        assert_eq!(compute_premium(&trip("Tunisie", 90, 65)), Decimal::from(11_880));
    }

    #[test]
    fn long_haul_short_trip_child_clamps_to_floor() {
        // round(80 * 5 * 1.7 * 0.9) = 612 -> floor 800
        assert_eq!(compute_premium(&trip("Canada", 5, 10)), Decimal::from(800));
    }

    #[test]
    fn extreme_inputs_clamp_to_ceiling() {
        let premium = compute_premium(&trip("USA", 365, 70));
        assert_eq!(premium, premium_ceiling());
        assert_eq!(premium, Decimal::from(12_000));
    }

    #[test]
    fn unknown_destination_gets_neutral_coefficient() {
        assert_eq!(destination_coefficient("Atlantis"), Decimal::ONE);
        // round(80 * 10 * 1.0 * 1.0) = 800
        assert_eq!(compute_premium(&trip("Atlantis", 10, 30)), Decimal::from(800));
    }

    #[test]
    fn destination_match_is_case_insensitive_and_substring_based() {
        assert_eq!(destination_coefficient("FRANCE (Paris)"), Decimal::new(15, 1));
        assert_eq!(destination_coefficient("voyage au maroc"), Decimal::new(11, 1));
        assert_eq!(destination_coefficient("Kenya safari"), Decimal::new(13, 1));
    }

    #[test]
    fn first_matching_tier_wins() {
        // "france" appears before "africa" in tier priority
        assert_eq!(destination_coefficient("France via Africa"), Decimal::new(15, 1));
    }

    #[test]
    fn output_stays_within_bounds_for_a_grid_of_inputs() {
        for destination in ["France", "Tunisie", "USA", "Nigeria", "Atlantis"] {
            for days in [1, 7, 30, 180, 400] {
                for age in [5, 18, 19, 39, 40, 59, 60, 95] {
                    let premium = compute_premium(&trip(destination, days, age));
                    assert!(premium >= Decimal::from(800), "floor violated: {premium}");
                    assert!(premium <= Decimal::from(12_000), "ceiling violated: {premium}");
                    assert_eq!(premium, premium.trunc(), "premium must be integral");
                }
            }
        }
    }

    #[test]
    fn premium_is_non_decreasing_in_duration() {
        let mut previous = Decimal::ZERO;
        for days in 1..=120 {
            let premium = compute_premium(&trip("France", days, 30));
            assert!(premium >= previous, "premium decreased at {days} days");
            previous = premium;
        }
    }

    #[test]
    fn premium_is_monotonic_in_age_coefficient() {
        let senior = compute_premium(&trip("France", 15, 65));
        let adult = compute_premium(&trip("France", 15, 30));
        assert!(senior >= adult);
    }

    #[test]
    fn same_input_yields_same_output() {
        let input = trip("Tunisie", 21, 44);
        assert_eq!(compute_premium(&input), compute_premium(&input));
    }

    #[test]
    fn breakdown_traces_every_factor() {
        let breakdown = premium_breakdown(&trip("France", 15, 30));
        assert_eq!(breakdown.billed_days, 15);
        assert_eq!(breakdown.base_rate_per_day, Decimal::from(80));
        assert_eq!(breakdown.destination_coefficient, Decimal::new(15, 1));
        assert_eq!(breakdown.age_coefficient, Decimal::ONE);
        assert_eq!(breakdown.raw_premium, Decimal::from(1800));
        assert_eq!(breakdown.premium, Decimal::from(1800));
    }
}
