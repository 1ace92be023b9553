use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;

use assurini_core::domain::contract::{Contract, Holder, PolicyNumber};
use assurini_core::domain::plan::{PolicyDocument, QuotedPlan};
use assurini_core::domain::trip::{BudgetTier, TripParameters, TripPurpose};
use assurini_core::ports::{ContractStore, StoreError};

use crate::DbPool;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteContractStore {
    pool: DbPool,
}

impl SqliteContractStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn backend(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(backend)
}

fn trip_date(row: &SqliteRow, name: &str, policy_number: &str) -> Result<NaiveDate, StoreError> {
    let raw: String = column(row, name)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|_| StoreError::CorruptDates { policy_number: policy_number.to_string() })
}

fn decode_contract(row: &SqliteRow) -> Result<Contract, StoreError> {
    let policy_number: String = column(row, "policy_number")?;

    let start_date = trip_date(row, "start_date", &policy_number)?;
    let end_date = trip_date(row, "end_date", &policy_number)?;
    let issue_date = trip_date(row, "issue_date", &policy_number)?;

    let trip_purpose_key: String = column(row, "trip_purpose")?;
    let trip_purpose = TripPurpose::from_key(&trip_purpose_key).ok_or_else(|| {
        StoreError::Backend(format!("unknown trip purpose `{trip_purpose_key}`"))
    })?;

    let budget_dzd: i64 = column(row, "budget_dzd")?;
    let budget = BudgetTier::try_from_amount(budget_dzd)
        .map_err(|error| StoreError::Backend(error.to_string()))?;

    let premium_raw: String = column(row, "premium_dzd")?;
    let premium: Decimal = premium_raw
        .parse()
        .map_err(|_| StoreError::Backend(format!("unreadable premium `{premium_raw}`")))?;

    let last_modified: Option<String> = column(row, "last_modified")?;
    let last_modified = last_modified
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|value| value.with_timezone(&Utc))
                .map_err(|_| StoreError::Backend(format!("unreadable timestamp `{raw}`")))
        })
        .transpose()?;

    let last_modification_fee: Option<String> = column(row, "last_modification_fee")?;
    let last_modification_fee = last_modification_fee
        .map(|raw| {
            raw.parse::<Decimal>()
                .map_err(|_| StoreError::Backend(format!("unreadable fee `{raw}`")))
        })
        .transpose()?;

    let coverage_raw: String = column(row, "coverage")?;
    let coverage =
        coverage_raw.lines().filter(|line| !line.is_empty()).map(str::to_string).collect();

    let policy_document_url: Option<String> = column(row, "policy_document_url")?;
    let policy_document = match policy_document_url {
        Some(url) => PolicyDocument::Link(url),
        None => PolicyDocument::Placeholder,
    };

    let traveler_count: i64 = column(row, "traveler_count")?;
    let traveler_age: i64 = column(row, "traveler_age")?;

    Ok(Contract {
        policy_number: PolicyNumber(policy_number),
        holder: Holder {
            email: column(row, "owner_email")?,
            full_name: column(row, "holder_full_name")?,
            passport_number: column(row, "holder_passport")?,
        },
        trip: TripParameters {
            destination: column(row, "destination")?,
            start_date,
            end_date,
            traveler_count: traveler_count
                .try_into()
                .map_err(|_| StoreError::Backend("negative traveler count".to_string()))?,
            traveler_age: traveler_age
                .try_into()
                .map_err(|_| StoreError::Backend("negative traveler age".to_string()))?,
            pre_existing_conditions: column(row, "pre_existing_conditions")?,
            trip_purpose,
            budget,
        },
        plan: QuotedPlan {
            plan_name: column(row, "plan_name")?,
            provider: column(row, "provider")?,
            coverage,
            premium,
            suitability_score: column::<i64>(row, "suitability_score")?.clamp(0, 100) as u8,
            rationale: column(row, "rationale")?,
            policy_document,
        },
        issue_date,
        last_modified,
        last_modification_fee,
        revision: column(row, "revision")?,
    })
}

fn document_url(document: &PolicyDocument) -> Option<&str> {
    match document {
        PolicyDocument::Link(url) => Some(url.as_str()),
        PolicyDocument::Placeholder => None,
    }
}

#[async_trait::async_trait]
impl ContractStore for SqliteContractStore {
    async fn find(
        &self,
        policy_number: &PolicyNumber,
        owner_email: &str,
    ) -> Result<Option<Contract>, StoreError> {
        let row = sqlx::query(
            "SELECT * FROM contract WHERE policy_number = ? AND owner_email = ?",
        )
        .bind(&policy_number.0)
        .bind(owner_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(decode_contract).transpose()
    }

    async fn append(&self, contract: Contract) -> Result<PolicyNumber, StoreError> {
        let result = sqlx::query(
            "INSERT INTO contract (
                policy_number, owner_email, holder_full_name, holder_passport,
                destination, start_date, end_date, traveler_count, traveler_age,
                pre_existing_conditions, trip_purpose, budget_dzd,
                plan_name, provider, coverage, premium_dzd, suitability_score,
                rationale, policy_document_url,
                issue_date, last_modified, last_modification_fee, revision
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&contract.policy_number.0)
        .bind(&contract.holder.email)
        .bind(&contract.holder.full_name)
        .bind(&contract.holder.passport_number)
        .bind(&contract.trip.destination)
        .bind(contract.trip.start_date.format(DATE_FORMAT).to_string())
        .bind(contract.trip.end_date.format(DATE_FORMAT).to_string())
        .bind(i64::from(contract.trip.traveler_count))
        .bind(i64::from(contract.trip.traveler_age))
        .bind(&contract.trip.pre_existing_conditions)
        .bind(contract.trip.trip_purpose.key())
        .bind(contract.trip.budget.amount_dzd())
        .bind(&contract.plan.plan_name)
        .bind(&contract.plan.provider)
        .bind(contract.plan.coverage.join("\n"))
        .bind(contract.plan.premium.to_string())
        .bind(i64::from(contract.plan.suitability_score))
        .bind(&contract.plan.rationale)
        .bind(document_url(&contract.plan.policy_document))
        .bind(contract.issue_date.format(DATE_FORMAT).to_string())
        .bind(contract.last_modified.map(|value| value.to_rfc3339()))
        .bind(contract.last_modification_fee.map(|value| value.to_string()))
        .bind(contract.revision)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(
                    event_name = "store.contract_appended",
                    policy_number = %contract.policy_number,
                    "contract persisted"
                );
                Ok(contract.policy_number)
            }
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                Err(StoreError::DuplicatePolicy(contract.policy_number.0))
            }
            Err(error) => Err(backend(error)),
        }
    }

    async fn replace(
        &self,
        policy_number: &PolicyNumber,
        contract: Contract,
        expected_revision: i64,
    ) -> Result<(), StoreError> {
        // Single compare-and-swap: the revision predicate makes concurrent
        // confirmations lose cleanly instead of overwriting each other.
        let result = sqlx::query(
            "UPDATE contract SET
                destination = ?, start_date = ?, end_date = ?,
                traveler_count = ?, traveler_age = ?, pre_existing_conditions = ?,
                trip_purpose = ?, budget_dzd = ?,
                plan_name = ?, provider = ?, coverage = ?, premium_dzd = ?,
                suitability_score = ?, rationale = ?, policy_document_url = ?,
                last_modified = ?, last_modification_fee = ?, revision = ?
             WHERE policy_number = ? AND revision = ?",
        )
        .bind(&contract.trip.destination)
        .bind(contract.trip.start_date.format(DATE_FORMAT).to_string())
        .bind(contract.trip.end_date.format(DATE_FORMAT).to_string())
        .bind(i64::from(contract.trip.traveler_count))
        .bind(i64::from(contract.trip.traveler_age))
        .bind(&contract.trip.pre_existing_conditions)
        .bind(contract.trip.trip_purpose.key())
        .bind(contract.trip.budget.amount_dzd())
        .bind(&contract.plan.plan_name)
        .bind(&contract.plan.provider)
        .bind(contract.plan.coverage.join("\n"))
        .bind(contract.plan.premium.to_string())
        .bind(i64::from(contract.plan.suitability_score))
        .bind(&contract.plan.rationale)
        .bind(document_url(&contract.plan.policy_document))
        .bind(contract.last_modified.map(|value| value.to_rfc3339()))
        .bind(contract.last_modification_fee.map(|value| value.to_string()))
        .bind(contract.revision)
        .bind(&policy_number.0)
        .bind(expected_revision)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() > 0 {
            info!(
                event_name = "store.contract_replaced",
                policy_number = %policy_number,
                revision = contract.revision,
                "contract updated"
            );
            return Ok(());
        }

        let stored: Option<i64> =
            sqlx::query_scalar("SELECT revision FROM contract WHERE policy_number = ?")
                .bind(&policy_number.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        match stored {
            Some(stored) => {
                Err(StoreError::RevisionConflict { expected: expected_revision, stored })
            }
            None => Err(StoreError::NotFound),
        }
    }
}
