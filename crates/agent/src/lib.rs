//! Recommendation adapter - LLM-backed plan prose with deterministic pricing
//!
//! This crate turns trip parameters into a fully priced [`QuotedPlan`]:
//! - builds a prompt describing the trip and the pricing policy (`prompt`)
//! - calls a generative text service through the pluggable `LlmClient` trait
//! - parses the structured narrative out of the response (`recommend`)
//!
//! # Safety Principle
//!
//! The LLM is strictly a copywriter. It NEVER decides the premium: the parsed
//! narrative type has no price field, so whatever number the generator emits
//! is dropped at the serde boundary, and the final plan always carries the
//! deterministic premium calculator's value.
//!
//! [`QuotedPlan`]: assurini_core::QuotedPlan

pub mod llm;
pub mod prompt;
pub mod recommend;

pub use llm::{HttpLlmClient, LlmClient};
pub use recommend::{
    QuoteService, RecommendationService, DEFAULT_POLICY_DOCUMENT_URL, POLICY_LINK_PLACEHOLDER,
};
