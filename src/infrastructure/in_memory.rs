use crate::domain::contract::Contract;
use crate::domain::movement::MovementRecord;
use crate::domain::ports::{AuditStore, ContractStore};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory contract store with optimistic versioning.
///
/// `save` and `delete` compare the caller's version against the stored one
/// while holding the write lock, so the check-and-write is atomic and a
/// stale writer always observes `Conflict` instead of silently overwriting.
#[derive(Default, Clone)]
pub struct InMemoryContractStore {
    contracts: Arc<RwLock<HashMap<String, Contract>>>,
}

impl InMemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractStore for InMemoryContractStore {
    async fn find(&self, account_id: &str) -> Result<Option<Contract>> {
        let contracts = self.contracts.read().await;
        Ok(contracts.get(account_id).cloned())
    }

    async fn save(&self, mut contract: Contract) -> Result<Contract> {
        let mut contracts = self.contracts.write().await;
        match contracts.get(&contract.account_id) {
            None if contract.version == 0 => {}
            None => {
                // The row vanished under us (concurrent cancel).
                return Err(LedgerError::Conflict(contract.account_id.clone()));
            }
            Some(_) if contract.version == 0 => {
                return Err(LedgerError::AlreadyExists(contract.account_id.clone()));
            }
            Some(current) if current.version != contract.version => {
                return Err(LedgerError::Conflict(contract.account_id.clone()));
            }
            Some(_) => {}
        }
        contract.version += 1;
        contracts.insert(contract.account_id.clone(), contract.clone());
        Ok(contract)
    }

    async fn delete(&self, contract: &Contract) -> Result<()> {
        let mut contracts = self.contracts.write().await;
        match contracts.get(&contract.account_id) {
            None => Err(LedgerError::Conflict(contract.account_id.clone())),
            Some(current) if current.version != contract.version => {
                Err(LedgerError::Conflict(contract.account_id.clone()))
            }
            Some(_) => {
                contracts.remove(&contract.account_id);
                Ok(())
            }
        }
    }
}

/// A thread-safe in-memory append-only movement log.
#[derive(Default, Clone)]
pub struct InMemoryAuditStore {
    records: Arc<RwLock<Vec<MovementRecord>>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, in append order. Not part of
    /// the `AuditStore` port; used by tests and the CLI summary.
    pub async fn records(&self) -> Vec<MovementRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, record: MovementRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }
}
