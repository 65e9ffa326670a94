use crate::domain::contract::Contract;
use crate::domain::movement::MovementRecord;
use crate::domain::ports::{AuditStore, ContractStore};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column family for contract records, keyed by account id.
pub const CF_CONTRACTS: &str = "contracts";
/// Column family for movement audit records, keyed by record id.
pub const CF_MOVEMENTS: &str = "movements";

/// Persistent store backed by RocksDB.
///
/// Serves both ports: contracts live in one column family, the audit log in
/// another. RocksDB has no native compare-and-swap, so contract writes are
/// funneled through an async mutex; the version check and the put happen
/// under the same guard, giving the same conflict semantics as the
/// in-memory store. Reads and audit appends bypass the gate.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_gate: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the given path, ensuring both
    /// column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_contracts = ColumnFamilyDescriptor::new(CF_CONTRACTS, Options::default());
        let cf_movements = ColumnFamilyDescriptor::new(CF_MOVEMENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_contracts, cf_movements])
            .map_err(|e| LedgerError::Internal(Box::new(e)))?;

        Ok(Self {
            db: Arc::new(db),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    fn cf_handle(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LedgerError::Internal(Box::new(std::io::Error::other(format!(
                "column family {name} not found"
            ))))
        })
    }

    fn read_contract(&self, account_id: &str) -> Result<Option<Contract>> {
        let cf = self.cf_handle(CF_CONTRACTS)?;
        let bytes = self
            .db
            .get_cf(cf, account_id.as_bytes())
            .map_err(|e| LedgerError::Internal(Box::new(e)))?;
        match bytes {
            Some(bytes) => {
                let contract = serde_json::from_slice(&bytes)
                    .map_err(|e| LedgerError::Internal(Box::new(e)))?;
                Ok(Some(contract))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ContractStore for RocksDbStore {
    async fn find(&self, account_id: &str) -> Result<Option<Contract>> {
        self.read_contract(account_id)
    }

    async fn save(&self, mut contract: Contract) -> Result<Contract> {
        let _gate = self.write_gate.lock().await;

        match self.read_contract(&contract.account_id)? {
            None if contract.version == 0 => {}
            None => return Err(LedgerError::Conflict(contract.account_id.clone())),
            Some(_) if contract.version == 0 => {
                return Err(LedgerError::AlreadyExists(contract.account_id.clone()));
            }
            Some(current) if current.version != contract.version => {
                return Err(LedgerError::Conflict(contract.account_id.clone()));
            }
            Some(_) => {}
        }

        contract.version += 1;
        let cf = self.cf_handle(CF_CONTRACTS)?;
        let value =
            serde_json::to_vec(&contract).map_err(|e| LedgerError::Internal(Box::new(e)))?;
        self.db
            .put_cf(cf, contract.account_id.as_bytes(), value)
            .map_err(|e| LedgerError::Internal(Box::new(e)))?;
        Ok(contract)
    }

    async fn delete(&self, contract: &Contract) -> Result<()> {
        let _gate = self.write_gate.lock().await;

        match self.read_contract(&contract.account_id)? {
            None => return Err(LedgerError::Conflict(contract.account_id.clone())),
            Some(current) if current.version != contract.version => {
                return Err(LedgerError::Conflict(contract.account_id.clone()));
            }
            Some(_) => {}
        }

        let cf = self.cf_handle(CF_CONTRACTS)?;
        self.db
            .delete_cf(cf, contract.account_id.as_bytes())
            .map_err(|e| LedgerError::Internal(Box::new(e)))
    }
}

#[async_trait]
impl AuditStore for RocksDbStore {
    async fn append(&self, record: MovementRecord) -> Result<()> {
        let cf = self.cf_handle(CF_MOVEMENTS)?;
        let value = serde_json::to_vec(&record).map_err(|e| LedgerError::Internal(Box::new(e)))?;
        self.db
            .put_cf(cf, record.id.as_bytes(), value)
            .map_err(|e| LedgerError::Internal(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::Amount;
    use crate::domain::movement::{MovementIntent, MovementKind};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).expect("failed to open RocksDB");
        assert!(store.db.cf_handle(CF_CONTRACTS).is_some());
        assert!(store.db.cf_handle(CF_MOVEMENTS).is_some());
    }

    #[tokio::test]
    async fn test_contract_roundtrip_and_versioning() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        let contract = Contract::open("acc-1", Amount::new(dec!(1000.00)).unwrap());
        let saved = store.save(contract).await.unwrap();
        assert_eq!(saved.version, 1);

        let found = store.find("acc-1").await.unwrap().unwrap();
        assert_eq!(found, saved);

        // A second insert for the same account is a duplicate.
        let duplicate = Contract::open("acc-1", Amount::new(dec!(2000.00)).unwrap());
        assert!(matches!(
            store.save(duplicate).await,
            Err(LedgerError::AlreadyExists(_))
        ));

        let mut current = saved.clone();
        current.outstanding_debt = dec!(10.00);
        let updated = store.save(current).await.unwrap();
        assert_eq!(updated.version, 2);

        // Writers still holding version 1 are stale.
        let mut stale = saved.clone();
        stale.outstanding_debt = dec!(99.00);
        assert!(matches!(
            store.save(stale).await,
            Err(LedgerError::Conflict(_))
        ));
        assert!(matches!(
            store.delete(&saved).await,
            Err(LedgerError::Conflict(_))
        ));
        store.delete(&updated).await.unwrap();
        assert!(store.find("acc-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_audit_append() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        let intent = MovementIntent {
            account_id: "acc-1".to_string(),
            amount: dec!(5.00),
            kind: MovementKind::Credit,
        };
        store
            .append(MovementRecord::applied(&intent))
            .await
            .unwrap();
    }
}
