use crate::domain::contract::{Amount, Contract, ContractView};
use crate::domain::ports::ContractStoreRef;
use crate::error::{LedgerError, Result};

/// Attempts per read-modify-write cycle before giving up. A conflict means
/// another writer committed first, so every retry observes fresh state and
/// the loop makes progress system-wide.
const MAX_WRITE_ATTEMPTS: usize = 16;

/// The single authoritative owner of the ledger invariant.
///
/// Both entry points — the synchronous gateway and the movement applier —
/// converge here. Each operation is one logical read-modify-write against
/// the contract store: fetch the current contract, run the invariant-checked
/// mutation from the domain model, and persist through the version-checked
/// `save`. On `Conflict` the cycle reloads and retries, so concurrent
/// mutations of one account serialize without a process-wide lock and
/// different accounts never contend.
pub struct LedgerEngine {
    contracts: ContractStoreRef,
}

impl LedgerEngine {
    pub fn new(contracts: ContractStoreRef) -> Self {
        Self { contracts }
    }

    /// Opens a new contract with zero outstanding debt.
    pub async fn create(&self, account_id: &str, limit: Amount) -> Result<ContractView> {
        if self.contracts.find(account_id).await?.is_some() {
            return Err(LedgerError::AlreadyExists(account_id.to_string()));
        }
        // The store enforces uniqueness again at insert, so a racing create
        // still fails cleanly instead of overwriting.
        let saved = self.contracts.save(Contract::open(account_id, limit)).await?;
        Ok(saved.view())
    }

    pub async fn get(&self, account_id: &str) -> Result<ContractView> {
        let contract = self.fetch(account_id).await?;
        Ok(contract.view())
    }

    pub async fn alter_limit(&self, account_id: &str, new_limit: Amount) -> Result<ContractView> {
        self.update(account_id, move |contract| contract.alter_limit(new_limit))
            .await
    }

    pub async fn debit(&self, account_id: &str, amount: Amount) -> Result<ContractView> {
        self.update(account_id, move |contract| contract.apply_debit(amount))
            .await
    }

    pub async fn credit(&self, account_id: &str, amount: Amount) -> Result<ContractView> {
        self.update(account_id, move |contract| {
            contract.apply_credit(amount);
            Ok(())
        })
        .await
    }

    /// Deletes the contract. Only permitted with zero outstanding debt.
    pub async fn cancel(&self, account_id: &str) -> Result<()> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let contract = self.fetch(account_id).await?;
            contract.ensure_cancellable()?;
            match self.contracts.delete(&contract).await {
                Ok(()) => return Ok(()),
                Err(LedgerError::Conflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(LedgerError::Conflict(account_id.to_string()))
    }

    async fn fetch(&self, account_id: &str) -> Result<Contract> {
        self.contracts
            .find(account_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(account_id.to_string()))
    }

    /// One atomic read-modify-write with optimistic retry.
    async fn update<F>(&self, account_id: &str, mutate: F) -> Result<ContractView>
    where
        F: Fn(&mut Contract) -> Result<()> + Send + Sync,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut contract = self.fetch(account_id).await?;
            mutate(&mut contract)?;
            match self.contracts.save(contract).await {
                Ok(saved) => return Ok(saved.view()),
                Err(LedgerError::Conflict(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(LedgerError::Conflict(account_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryContractStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn engine() -> LedgerEngine {
        LedgerEngine::new(Arc::new(InMemoryContractStore::new()))
    }

    fn amount(value: rust_decimal::Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let engine = engine();
        let view = engine.create("acc-1", amount(dec!(1000.00))).await.unwrap();
        assert_eq!(view.limit_amount, dec!(1000.00));
        assert_eq!(view.outstanding_debt, dec!(0));
        assert_eq!(view.available_limit, dec!(1000.00));

        let fetched = engine.get("acc-1").await.unwrap();
        assert_eq!(fetched, view);
    }

    #[tokio::test]
    async fn test_duplicate_create_leaves_original_unmodified() {
        let engine = engine();
        engine.create("acc-1", amount(dec!(1000.00))).await.unwrap();

        let result = engine.create("acc-1", amount(dec!(500.00))).await;
        assert!(matches!(result, Err(LedgerError::AlreadyExists(_))));

        let view = engine.get("acc-1").await.unwrap();
        assert_eq!(view.limit_amount, dec!(1000.00));
    }

    #[tokio::test]
    async fn test_get_unknown_account() {
        let engine = engine();
        assert!(matches!(
            engine.get("ghost").await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_debit_and_credit_cycle() {
        let engine = engine();
        engine.create("acc-1", amount(dec!(1000.00))).await.unwrap();

        let view = engine.debit("acc-1", amount(dec!(200.00))).await.unwrap();
        assert_eq!(view.outstanding_debt, dec!(200.00));
        assert_eq!(view.available_limit, dec!(800.00));

        let view = engine.credit("acc-1", amount(dec!(300.00))).await.unwrap();
        assert_eq!(view.outstanding_debt, dec!(0));
        assert_eq!(view.available_limit, dec!(1000.00));
    }

    #[tokio::test]
    async fn test_rejected_debit_persists_nothing() {
        let engine = engine();
        engine.create("acc-1", amount(dec!(100.00))).await.unwrap();

        let result = engine.debit("acc-1", amount(dec!(150.00))).await;
        assert!(matches!(result, Err(LedgerError::InvariantViolation(_))));

        let view = engine.get("acc-1").await.unwrap();
        assert_eq!(view.outstanding_debt, dec!(0));
    }

    #[tokio::test]
    async fn test_cancel_requires_settled_debt() {
        let engine = engine();
        engine.create("acc-1", amount(dec!(1000.00))).await.unwrap();
        engine.debit("acc-1", amount(dec!(10.00))).await.unwrap();

        let result = engine.cancel("acc-1").await;
        assert!(matches!(result, Err(LedgerError::InvariantViolation(_))));
        assert!(engine.get("acc-1").await.is_ok());

        engine.credit("acc-1", amount(dec!(10.00))).await.unwrap();
        engine.cancel("acc-1").await.unwrap();
        assert!(matches!(
            engine.get("acc-1").await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_alter_limit_guard() {
        let engine = engine();
        engine.create("acc-1", amount(dec!(1000.00))).await.unwrap();
        engine.debit("acc-1", amount(dec!(200.00))).await.unwrap();

        let result = engine.alter_limit("acc-1", amount(dec!(100.00))).await;
        assert!(matches!(result, Err(LedgerError::InvariantViolation(_))));

        let view = engine
            .alter_limit("acc-1", amount(dec!(1500.00)))
            .await
            .unwrap();
        assert_eq!(view.limit_amount, dec!(1500.00));
        assert_eq!(view.available_limit, dec!(1300.00));
    }
}
