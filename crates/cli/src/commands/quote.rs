use chrono::Utc;

use assurini_agent::{HttpLlmClient, QuoteService, RecommendationService, DEFAULT_POLICY_DOCUMENT_URL};
use assurini_core::config::{AppConfig, LoadOptions};
use assurini_core::{Contract, ContractStore, Holder, QuoteError, QuotedPlan};
use assurini_db::{connect, migrations, SqliteContractStore};

use crate::commands::CommandResult;
use crate::QuoteArgs;

pub fn run(args: QuoteArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    runtime.block_on(async move {
        let llm = match HttpLlmClient::new(&config.llm) {
            Ok(llm) => llm,
            Err(error) => {
                return CommandResult::failure(
                    "quote",
                    "llm_client",
                    format!("failed to build generator client: {error}"),
                    3,
                );
            }
        };
        let service = QuoteService::new(RecommendationService::new(llm));

        let trip = args.trip.to_trip();
        let plan = match service.quote(&trip).await {
            Ok(plan) => plan,
            Err(error) => {
                let (error_class, exit_code) = match &error {
                    QuoteError::Validation(_) => ("validation", 2),
                    QuoteError::Recommendation(_) => ("recommendation", 4),
                };
                return CommandResult::failure(
                    "quote",
                    error_class,
                    format!("{} ({error})", error.user_message()),
                    exit_code,
                );
            }
        };

        let mut message = render_plan(&plan);

        if args.issue {
            let (Some(email), Some(full_name)) = (args.email, args.full_name) else {
                return CommandResult::failure(
                    "quote",
                    "validation",
                    "--issue requires --email and --full-name",
                    2,
                );
            };
            let holder = Holder { email, full_name, passport_number: args.passport };
            let contract = match Contract::issue(trip, plan, holder, Utc::now().date_naive()) {
                Ok(contract) => contract,
                Err(error) => {
                    return CommandResult::failure("quote", "validation", error.to_string(), 2);
                }
            };

            let pool = match connect(&config.store).await {
                Ok(pool) => pool,
                Err(error) => {
                    return CommandResult::failure(
                        "quote",
                        "db_connectivity",
                        error.to_string(),
                        5,
                    );
                }
            };
            if let Err(error) = migrations::run_pending(&pool).await {
                return CommandResult::failure("quote", "migration", error.to_string(), 5);
            }

            let store = SqliteContractStore::new(pool);
            match store.append(contract).await {
                Ok(policy_number) => {
                    message.push_str(&format!("\n  - policy_number: {policy_number}"));
                }
                Err(error) => {
                    return CommandResult::failure("quote", "store", error.to_string(), 6);
                }
            }
        }

        CommandResult::success("quote", message)
    })
}

fn render_plan(plan: &QuotedPlan) -> String {
    let mut lines = vec![
        format!("recommended plan: {} ({})", plan.plan_name, plan.provider),
        format!("  - premium: {} DZD", plan.premium),
        format!("  - suitability_score: {}/100", plan.suitability_score),
    ];
    for item in &plan.coverage {
        lines.push(format!("  - coverage: {item}"));
    }
    lines.push(format!("  - rationale: {}", plan.rationale));
    lines.push(format!(
        "  - policy_document: {}",
        plan.policy_document.clone().resolve(DEFAULT_POLICY_DOCUMENT_URL)
    ));
    lines.join("\n")
}
