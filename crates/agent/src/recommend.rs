use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use assurini_core::ports::{PlanRecommender, RecommendationError};
use assurini_core::pricing::{DeterministicPremiumEngine, PremiumEngine};
use assurini_core::{PolicyDocument, QuoteError, QuotedPlan, TripParameters};

use crate::llm::LlmClient;
use crate::prompt::recommendation_prompt;

/// Token the generator returns when it has no real document URL.
pub const POLICY_LINK_PLACEHOLDER: &str = "MOCK_POLICY_LINK_PLACEHOLDER";
/// Bundled policy wording the placeholder resolves to.
pub const DEFAULT_POLICY_DOCUMENT_URL: &str = "/documents/mock-policy-fr.pdf";

/// The structured narrative parsed out of the generator's response.
///
/// Deliberately has no price field: serde drops whatever number the model
/// emits, so calling code cannot read an advisory price even by accident.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanNarrative {
    plan_name: String,
    provider: String,
    coverage_details: String,
    suitability_score: i64,
    rationale: String,
    #[serde(default)]
    policy_document_link: Option<String>,
}

/// Plan recommendation with the deterministic price override applied.
pub struct RecommendationService<C, P = DeterministicPremiumEngine> {
    llm: C,
    premium_engine: P,
}

impl<C> RecommendationService<C>
where
    C: LlmClient,
{
    pub fn new(llm: C) -> Self {
        Self { llm, premium_engine: DeterministicPremiumEngine }
    }
}

impl<C, P> RecommendationService<C, P>
where
    C: LlmClient,
    P: PremiumEngine,
{
    pub fn with_premium_engine(llm: C, premium_engine: P) -> Self {
        Self { llm, premium_engine }
    }
}

#[async_trait]
impl<C, P> PlanRecommender for RecommendationService<C, P>
where
    C: LlmClient,
    P: PremiumEngine,
{
    async fn recommend(&self, trip: &TripParameters) -> Result<QuotedPlan, RecommendationError> {
        let prompt = recommendation_prompt(trip);
        let raw = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|error| RecommendationError::Transport(error.to_string()))?;
        let narrative = match parse_narrative(&raw) {
            Ok(narrative) => narrative,
            Err(error) => {
                warn!(
                    event_name = "recommendation.unusable_output",
                    destination = %trip.destination,
                    %error,
                    "generator response could not be parsed"
                );
                return Err(error);
            }
        };

        let breakdown = self.premium_engine.premium(trip);
        info!(
            event_name = "recommendation.plan_generated",
            destination = %trip.destination,
            plan_name = %narrative.plan_name,
            premium = %breakdown.premium,
            "plan narrative generated, deterministic premium attached"
        );

        Ok(QuotedPlan {
            plan_name: narrative.plan_name,
            provider: narrative.provider,
            coverage: coverage_lines(&narrative.coverage_details),
            premium: breakdown.premium,
            suitability_score: narrative.suitability_score.clamp(0, 100) as u8,
            rationale: narrative.rationale,
            policy_document: policy_document(narrative.policy_document_link),
        })
    }
}

/// Quote entry point: validates the trip parameters before any pricing or
/// recommendation work happens.
pub struct QuoteService<R> {
    recommender: R,
}

impl<R> QuoteService<R>
where
    R: PlanRecommender,
{
    pub fn new(recommender: R) -> Self {
        Self { recommender }
    }

    pub async fn quote(&self, trip: &TripParameters) -> Result<QuotedPlan, QuoteError> {
        trip.validate()?;
        let plan = self.recommender.recommend(trip).await?;
        Ok(plan)
    }
}

fn parse_narrative(raw: &str) -> Result<PlanNarrative, RecommendationError> {
    let json = extract_json_object(raw).ok_or_else(|| {
        RecommendationError::UnusableOutput("no JSON object in response".to_string())
    })?;
    serde_json::from_str(json)
        .map_err(|error| RecommendationError::UnusableOutput(error.to_string()))
}

/// Models often wrap JSON in prose or code fences; take the outermost braces.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn coverage_lines(details: &str) -> Vec<String> {
    details
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn policy_document(link: Option<String>) -> PolicyDocument {
    match link {
        Some(url) if url != POLICY_LINK_PLACEHOLDER && !url.trim().is_empty() => {
            PolicyDocument::Link(url)
        }
        _ => PolicyDocument::Placeholder,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use assurini_core::ports::{PlanRecommender, RecommendationError};
    use assurini_core::pricing::compute_premium;
    use assurini_core::{BudgetTier, PolicyDocument, QuoteError, TripParameters, TripPurpose};

    use super::{QuoteService, RecommendationService, DEFAULT_POLICY_DOCUMENT_URL};
    use crate::llm::LlmClient;

    struct ScriptedLlm {
        response: Result<String, String>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn replying(response: &str) -> Self {
            Self { response: Ok(response.to_string()), calls: AtomicUsize::new(0) }
        }

        fn failing(message: &str) -> Self {
            Self { response: Err(message.to_string()), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl LlmClient for &ScriptedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().map_err(|message| anyhow!(message))
        }
    }

    fn trip() -> TripParameters {
        TripParameters {
            destination: "France".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 7, 1).expect("date"),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 16).expect("date"),
            traveler_count: 1,
            traveler_age: 30,
            pre_existing_conditions: "None".to_string(),
            trip_purpose: TripPurpose::Leisure,
            budget: BudgetTier::Essential,
        }
    }

    const NARRATIVE_WITH_ADVISORY_PRICE: &str = r#"{
        "planName": "Atlas Voyage Protect",
        "provider": "SaharaAssur Voyages",
        "coverageDetails": "- Frais médicaux jusqu'à 30,000 EUR\n- Rapatriement médical\n\n- Bagages jusqu'à 500 EUR",
        "price": 99999,
        "suitabilityScore": 88,
        "rationale": "Couverture complète pour un séjour Schengen.",
        "policyDocumentLink": "MOCK_POLICY_LINK_PLACEHOLDER"
    }"#;

    #[tokio::test]
    async fn generator_price_is_always_overridden() {
        let llm = ScriptedLlm::replying(NARRATIVE_WITH_ADVISORY_PRICE);
        let service = RecommendationService::new(&llm);
        let input = trip();

        let plan = service.recommend(&input).await.expect("recommendation");

        // the advisory 99999 never survives; only the calculator's value does
        assert_eq!(plan.premium, compute_premium(&input));
        assert_eq!(plan.premium, Decimal::from(1800));
        assert_eq!(plan.plan_name, "Atlas Voyage Protect");
        assert_eq!(plan.suitability_score, 88);
    }

    #[tokio::test]
    async fn coverage_lines_are_split_and_cleaned() {
        let llm = ScriptedLlm::replying(NARRATIVE_WITH_ADVISORY_PRICE);
        let service = RecommendationService::new(&llm);

        let plan = service.recommend(&trip()).await.expect("recommendation");

        assert_eq!(
            plan.coverage,
            vec![
                "Frais médicaux jusqu'à 30,000 EUR".to_string(),
                "Rapatriement médical".to_string(),
                "Bagages jusqu'à 500 EUR".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn placeholder_link_stays_a_placeholder_until_resolved() {
        let llm = ScriptedLlm::replying(NARRATIVE_WITH_ADVISORY_PRICE);
        let service = RecommendationService::new(&llm);

        let plan = service.recommend(&trip()).await.expect("recommendation");

        assert_eq!(plan.policy_document, PolicyDocument::Placeholder);
        assert_eq!(
            plan.policy_document.clone().resolve(DEFAULT_POLICY_DOCUMENT_URL),
            DEFAULT_POLICY_DOCUMENT_URL
        );
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let fenced = format!("Voici la recommandation:\n```json\n{NARRATIVE_WITH_ADVISORY_PRICE}\n```");
        let llm = ScriptedLlm::replying(&fenced);
        let service = RecommendationService::new(&llm);

        let plan = service.recommend(&trip()).await.expect("recommendation");
        assert_eq!(plan.provider, "SaharaAssur Voyages");
    }

    #[tokio::test]
    async fn out_of_range_score_is_clamped() {
        let response = r#"{
            "planName": "P", "provider": "Q",
            "coverageDetails": "Assistance",
            "suitabilityScore": 150,
            "rationale": "ok"
        }"#;
        let llm = ScriptedLlm::replying(response);
        let service = RecommendationService::new(&llm);

        let plan = service.recommend(&trip()).await.expect("recommendation");
        assert_eq!(plan.suitability_score, 100);
    }

    #[tokio::test]
    async fn prose_without_json_is_unusable() {
        let llm = ScriptedLlm::replying("Je ne peux pas répondre en JSON aujourd'hui.");
        let service = RecommendationService::new(&llm);

        let error = service.recommend(&trip()).await.expect_err("unusable");
        assert!(matches!(error, RecommendationError::UnusableOutput(_)));
    }

    #[tokio::test]
    async fn json_missing_required_fields_is_unusable() {
        let llm = ScriptedLlm::replying(r#"{ "planName": "P" }"#);
        let service = RecommendationService::new(&llm);

        let error = service.recommend(&trip()).await.expect_err("unusable");
        assert!(matches!(error, RecommendationError::UnusableOutput(_)));
    }

    #[tokio::test]
    async fn transport_failure_maps_to_recommendation_error() {
        let llm = ScriptedLlm::failing("connection refused");
        let service = RecommendationService::new(&llm);

        let error = service.recommend(&trip()).await.expect_err("transport");
        assert!(matches!(error, RecommendationError::Transport(_)));
    }

    #[tokio::test]
    async fn invalid_trip_is_rejected_before_the_generator_is_called() {
        let llm = ScriptedLlm::replying(NARRATIVE_WITH_ADVISORY_PRICE);
        let service = QuoteService::new(RecommendationService::new(&llm));

        let mut invalid = trip();
        invalid.traveler_count = 0;
        let error = service.quote(&invalid).await.expect_err("validation");

        assert!(matches!(error, QuoteError::Validation(_)));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0, "generator must not be called");
    }

    #[tokio::test]
    async fn valid_trip_flows_through_the_quote_service() {
        let llm = ScriptedLlm::replying(NARRATIVE_WITH_ADVISORY_PRICE);
        let service = QuoteService::new(RecommendationService::new(&llm));

        let plan = service.quote(&trip()).await.expect("quote");
        assert_eq!(plan.premium, Decimal::from(1800));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }
}
