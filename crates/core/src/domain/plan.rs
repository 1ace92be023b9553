use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reference to the plan's policy wording. The generator may not know a real
/// URL, in which case it hands back a placeholder the caller resolves to the
/// bundled document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "url")]
pub enum PolicyDocument {
    Link(String),
    Placeholder,
}

impl PolicyDocument {
    pub fn resolve(self, default_url: &str) -> String {
        match self {
            Self::Link(url) => url,
            Self::Placeholder => default_url.to_string(),
        }
    }
}

/// A finalized plan offer. `premium` is always the deterministic calculator's
/// value; the generator only contributes the prose around it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedPlan {
    pub plan_name: String,
    pub provider: String,
    /// Ordered guarantee lines (medical expenses, repatriation, baggage, ...).
    pub coverage: Vec<String>,
    /// Integral DZD amount in [800, 12000], strictly below the budget tier.
    pub premium: Decimal,
    /// Narrative fit metric, 0-100. Never used in pricing.
    pub suitability_score: u8,
    pub rationale: String,
    pub policy_document: PolicyDocument,
}
