//! Prompt construction for the plan recommendation call.
//!
//! The prompt carries the pricing policy as *narrative context only* so the
//! rationale the model writes stays consistent with the numbers the
//! deterministic calculator will attach. It never asks the model for a price.

use assurini_core::TripParameters;

const ROLE_PREAMBLE: &str = "You are a travel insurance expert advising Algerian residents. \
Based on the trip details below, recommend the most suitable travel insurance plan. \
Plan details, coverage lines and rationale must be written in French.";

const COVERAGE_GUIDANCE: &str = "\
The recommended plan should offer comprehensive coverage. For the coverage \
list, provide key guarantees similar to what a traditional insurer would \
offer, for example:
- Frais médicaux et hospitalisation à l'étranger (avec un plafond)
- Rapatriement médical ou en cas de décès
- Soins dentaires d'urgence
- Perte, vol ou détérioration de bagages
- Assistance juridique à l'étranger
- Responsabilité civile à l'étranger";

const PRICING_POLICY: &str = "\
Pricing context (do NOT output a price; the application computes the premium \
deterministically and will attach it to your recommendation):
- Premiums scale with trip duration, traveler age and destination risk.
- Maghreb destinations are the most affordable tier, Schengen sits in the \
middle, the Americas, Japan and Australia are the most expensive tier.
- The premium always stays far below the traveler's budget tier, between \
800 and 12000 DZD.
Write the rationale so it is consistent with this policy.";

const OUTPUT_CONTRACT: &str = "\
Respond with a single JSON object and nothing else, using exactly these keys:
{
  \"planName\": string,
  \"provider\": string,
  \"coverageDetails\": string (one guarantee per line),
  \"suitabilityScore\": integer 0-100,
  \"rationale\": string,
  \"policyDocumentLink\": string (use \"MOCK_POLICY_LINK_PLACEHOLDER\" if no real document is known)
}
If you do not know a real provider, invent a plausible Algerian one \
(e.g. \"SaharaAssur Voyages\", \"Atlas Voyage Protect\").";

pub fn recommendation_prompt(trip: &TripParameters) -> String {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(ROLE_PREAMBLE);
    prompt.push_str("\n\nTrip Details:\n");
    prompt.push_str(&format!("- Destination: {}\n", trip.destination));
    prompt.push_str(&format!("- Start Date: {}\n", trip.start_date));
    prompt.push_str(&format!("- End Date: {}\n", trip.end_date));
    prompt.push_str(&format!("- Number of Travelers: {}\n", trip.traveler_count));
    prompt.push_str(&format!("- Traveler Age: {}\n", trip.traveler_age));
    prompt.push_str(&format!(
        "- Pre-existing Conditions: {}\n",
        trip.pre_existing_conditions
    ));
    prompt.push_str(&format!("- Trip Purpose: {}\n", trip.trip_purpose.label()));
    prompt.push_str(&format!("- Budget: {} DZD\n", trip.budget.amount()));
    prompt.push('\n');
    prompt.push_str(COVERAGE_GUIDANCE);
    prompt.push_str("\n\n");
    prompt.push_str(PRICING_POLICY);
    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_CONTRACT);
    prompt
}
