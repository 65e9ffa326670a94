use super::ledger::LedgerEngine;
use crate::domain::contract::{Amount, ContractView};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Request/response adapter over the ledger engine.
///
/// Validates raw request data into domain types and forwards; no invariant
/// logic lives here. Every call blocks for the full read-modify-write cycle
/// and either returns the persisted result or an error with nothing
/// persisted. Synchronous debit/credit return the updated view, in contrast
/// to the intake path which only acknowledges acceptance.
pub struct SynchronousGateway {
    ledger: Arc<LedgerEngine>,
}

impl SynchronousGateway {
    pub fn new(ledger: Arc<LedgerEngine>) -> Self {
        Self { ledger }
    }

    pub async fn create_contract(
        &self,
        account_id: &str,
        limit_amount: Decimal,
    ) -> Result<ContractView> {
        let account_id = validated_account(account_id)?;
        self.ledger
            .create(account_id, Amount::new(limit_amount)?)
            .await
    }

    pub async fn contract(&self, account_id: &str) -> Result<ContractView> {
        self.ledger.get(validated_account(account_id)?).await
    }

    pub async fn alter_limit(&self, account_id: &str, new_limit: Decimal) -> Result<ContractView> {
        let account_id = validated_account(account_id)?;
        self.ledger
            .alter_limit(account_id, Amount::new(new_limit)?)
            .await
    }

    pub async fn cancel_contract(&self, account_id: &str) -> Result<()> {
        self.ledger.cancel(validated_account(account_id)?).await
    }

    pub async fn debit(&self, account_id: &str, amount: Decimal) -> Result<ContractView> {
        let account_id = validated_account(account_id)?;
        self.ledger.debit(account_id, Amount::new(amount)?).await
    }

    pub async fn credit(&self, account_id: &str, amount: Decimal) -> Result<ContractView> {
        let account_id = validated_account(account_id)?;
        self.ledger.credit(account_id, Amount::new(amount)?).await
    }
}

/// Normalizes an account id: surrounding whitespace is never part of the
/// business key, so `" acc-1"` and `"acc-1"` address the same contract.
pub(crate) fn validated_account(account_id: &str) -> Result<&str> {
    let account_id = account_id.trim();
    if account_id.is_empty() {
        return Err(LedgerError::InvalidInput(
            "account id must not be blank".to_string(),
        ));
    }
    Ok(account_id)
}
