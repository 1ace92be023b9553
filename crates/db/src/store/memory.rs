use std::collections::HashMap;

use tokio::sync::RwLock;

use assurini_core::domain::contract::{Contract, PolicyNumber};
use assurini_core::ports::{ContractStore, StoreError};

/// Volatile store for tests and the demo path. Same contract semantics as
/// the SQLite store, including the revision compare-and-swap.
#[derive(Default)]
pub struct InMemoryContractStore {
    contracts: RwLock<HashMap<String, Contract>>,
}

#[async_trait::async_trait]
impl ContractStore for InMemoryContractStore {
    async fn find(
        &self,
        policy_number: &PolicyNumber,
        owner_email: &str,
    ) -> Result<Option<Contract>, StoreError> {
        let contracts = self.contracts.read().await;
        Ok(contracts
            .get(&policy_number.0)
            .filter(|contract| contract.holder.email == owner_email)
            .cloned())
    }

    async fn append(&self, contract: Contract) -> Result<PolicyNumber, StoreError> {
        let mut contracts = self.contracts.write().await;
        let policy_number = contract.policy_number.clone();
        if contracts.contains_key(&policy_number.0) {
            return Err(StoreError::DuplicatePolicy(policy_number.0));
        }
        contracts.insert(policy_number.0.clone(), contract);
        Ok(policy_number)
    }

    async fn replace(
        &self,
        policy_number: &PolicyNumber,
        contract: Contract,
        expected_revision: i64,
    ) -> Result<(), StoreError> {
        let mut contracts = self.contracts.write().await;
        let stored = contracts.get_mut(&policy_number.0).ok_or(StoreError::NotFound)?;
        if stored.revision != expected_revision {
            return Err(StoreError::RevisionConflict {
                expected: expected_revision,
                stored: stored.revision,
            });
        }
        *stored = contract;
        Ok(())
    }
}
