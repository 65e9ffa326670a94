use super::contract::Contract;
use super::movement::{MovementIntent, MovementRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Key-value-by-account persistence for contracts.
///
/// `save` and `delete` are version-checked: the store compares the caller's
/// `version` against the stored one and fails with `LedgerError::Conflict`
/// on mismatch, so interleaved read-modify-write cycles cannot lose updates.
/// A contract with `version == 0` is an insert; the store enforces
/// uniqueness on `account_id`.
#[async_trait]
pub trait ContractStore: Send + Sync {
    async fn find(&self, account_id: &str) -> Result<Option<Contract>>;
    /// Persists the contract and returns it with the bumped version.
    async fn save(&self, contract: Contract) -> Result<Contract>;
    async fn delete(&self, contract: &Contract) -> Result<()>;
}

/// Append-only persistence for movement audit records. The core never reads
/// it back.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, record: MovementRecord) -> Result<()>;
}

/// At-least-once publish channel keyed by account id. Publishing is
/// fire-and-forget: a successful return means accepted, not applied, and the
/// intent cannot be recalled afterwards.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, intent: MovementIntent) -> Result<()>;
}

/// Consumer side of the bus. An `Err` tells the transport the handler itself
/// broke; business rejections are the handler's own concern and must not be
/// reported as transport failures.
#[async_trait]
pub trait MovementHandler: Send + Sync {
    async fn handle(&self, intent: MovementIntent) -> Result<()>;
}

pub type ContractStoreRef = Arc<dyn ContractStore>;
pub type AuditStoreRef = Arc<dyn AuditStore>;
pub type EventBusRef = Arc<dyn EventBus>;
pub type MovementHandlerRef = Arc<dyn MovementHandler>;
