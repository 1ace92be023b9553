use chrono::Utc;

use assurini_agent::{HttpLlmClient, RecommendationService};
use assurini_core::config::{AppConfig, LoadOptions};
use assurini_core::{
    ModificationEngine, ModificationError, ModificationQuote, PolicyNumber, StoreError, TripChange,
};
use assurini_db::{connect, migrations, SqliteContractStore};

use crate::commands::CommandResult;
use crate::ModifyArgs;

pub fn run(args: ModifyArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "modify",
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
                "modify",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    runtime.block_on(async move {
        let pool = match connect(&config.store).await {
            Ok(pool) => pool,
            Err(error) => {
                return CommandResult::failure("modify", "db_connectivity", error.to_string(), 5);
            }
        };
        if let Err(error) = migrations::run_pending(&pool).await {
            return CommandResult::failure("modify", "migration", error.to_string(), 5);
        }

        let llm = match HttpLlmClient::new(&config.llm) {
            Ok(llm) => llm,
            Err(error) => {
                return CommandResult::failure(
                    "modify",
                    "llm_client",
                    format!("failed to build generator client: {error}"),
                    3,
                );
            }
        };
        let engine =
            ModificationEngine::new(RecommendationService::new(llm), SqliteContractStore::new(pool));

        let change = TripChange {
            destination: args.destination,
            start_date: args.start,
            end_date: args.end,
        };
        let quote = match engine
            .quote(&PolicyNumber(args.policy.clone()), &args.email, change, Utc::now())
            .await
        {
            Ok(quote) => quote,
            Err(error) => return failure(&error),
        };

        let mut message = render_breakdown(&quote);

        if args.confirm {
            match engine.confirm(quote, Utc::now()).await {
                Ok(updated) => {
                    message.push_str(&format!(
                        "\ncontract {} updated (revision {})",
                        updated.policy_number, updated.revision
                    ));
                }
                Err(error) => return failure(&error),
            }
        } else {
            message.push_str("\ndry run: pass --confirm to apply the modification");
        }

        CommandResult::success("modify", message)
    })
}

fn failure(error: &ModificationError) -> CommandResult {
    let (error_class, exit_code) = match error {
        ModificationError::Validation(_) => ("validation", 2),
        ModificationError::Ineligible { .. } => ("ineligible", 4),
        ModificationError::Recommendation(_) => ("recommendation", 4),
        ModificationError::CorruptContractDates => ("corrupt_dates", 5),
        ModificationError::Store(StoreError::NotFound) => ("not_found", 6),
        ModificationError::Store(StoreError::RevisionConflict { .. }) => ("revision_conflict", 6),
        ModificationError::Store(_) | ModificationError::Transition(_) => ("store", 6),
    };
    CommandResult::failure(
        "modify",
        error_class,
        format!("{} ({error})", error.user_message()),
        exit_code,
    )
}

fn render_breakdown(quote: &ModificationQuote) -> String {
    let breakdown = &quote.breakdown;
    let mut lines = vec![
        format!("modification quote for {}:", quote.contract.policy_number),
        format!("  - new_plan: {} ({})", quote.new_plan.plan_name, quote.new_plan.provider),
        format!("  - new_premium: {} DZD", breakdown.new_premium),
        format!("  - fixed_fee: {} DZD", breakdown.fixed_fee),
        format!("  - additional_days: {}", breakdown.additional_days),
    ];
    if let Some(rate) = breakdown.daily_rate {
        lines.push(format!("  - daily_rate: {rate} DZD"));
    }
    lines.push(format!("  - surcharge: {} DZD", breakdown.surcharge));
    lines.push(format!("  - total_due: {} DZD", breakdown.total_due));
    lines.join("\n")
}
