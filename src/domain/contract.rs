use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a positive monetary amount.
///
/// This is a wrapper around `rust_decimal::Decimal` that guarantees
/// positivity; it is the only way monetary input enters the domain.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidInput(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// A credit-limit agreement for one account.
///
/// Invariant: `0 <= outstanding_debt <= limit_amount` holds after every
/// successful mutation. All mutating methods enforce it and leave the
/// contract untouched on rejection.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Contract {
    /// Unique identifier, generated on creation, immutable.
    pub id: Uuid,
    /// Business key; one contract per account.
    pub account_id: String,
    /// Contracted limit. Strictly positive.
    pub limit_amount: Decimal,
    /// Debt currently held against the limit.
    pub outstanding_debt: Decimal,
    /// Optimistic-concurrency token. Zero until first persisted; bumped by
    /// the store on every successful save.
    #[serde(default)]
    pub version: u64,
}

impl Contract {
    /// Opens a new, not-yet-persisted contract with zero debt.
    pub fn open(account_id: impl Into<String>, limit: Amount) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: account_id.into(),
            limit_amount: limit.value(),
            outstanding_debt: Decimal::ZERO,
            version: 0,
        }
    }

    /// Limit still available for debits, floored at zero.
    pub fn available_limit(&self) -> Decimal {
        let available = self.limit_amount - self.outstanding_debt;
        if available < Decimal::ZERO {
            Decimal::ZERO
        } else {
            available
        }
    }

    /// Replaces the contracted limit. The new limit must cover the debt
    /// already outstanding.
    pub fn alter_limit(&mut self, new_limit: Amount) -> Result<(), LedgerError> {
        if new_limit.value() < self.outstanding_debt {
            return Err(LedgerError::InvariantViolation(format!(
                "new limit {} is below outstanding debt {}",
                new_limit.value(),
                self.outstanding_debt
            )));
        }
        self.limit_amount = new_limit.value();
        Ok(())
    }

    /// Increases outstanding debt. Rejected if the debit would push the debt
    /// above the contracted limit.
    pub fn apply_debit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if amount.value() > self.available_limit() {
            return Err(LedgerError::InvariantViolation(format!(
                "debit {} exceeds available limit {}",
                amount.value(),
                self.available_limit()
            )));
        }
        self.outstanding_debt += amount.value();
        Ok(())
    }

    /// Decreases outstanding debt, clamped at zero. A credit larger than the
    /// debt is accepted and simply zeroes the balance.
    pub fn apply_credit(&mut self, amount: Amount) {
        let next = self.outstanding_debt - amount.value();
        self.outstanding_debt = if next < Decimal::ZERO {
            Decimal::ZERO
        } else {
            next
        };
    }

    /// Checks that the contract may be cancelled (no debt outstanding).
    pub fn ensure_cancellable(&self) -> Result<(), LedgerError> {
        if self.outstanding_debt > Decimal::ZERO {
            return Err(LedgerError::InvariantViolation(format!(
                "cannot cancel contract with outstanding debt {}",
                self.outstanding_debt
            )));
        }
        Ok(())
    }

    pub fn view(&self) -> ContractView {
        ContractView {
            account_id: self.account_id.clone(),
            limit_amount: self.limit_amount,
            outstanding_debt: self.outstanding_debt,
            available_limit: self.available_limit(),
        }
    }
}

/// Read model returned by every request/response operation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ContractView {
    pub account_id: String,
    pub limit_amount: Decimal,
    pub outstanding_debt: Decimal,
    pub available_limit: Decimal,
}
